//! Courses.
//!
//! A course is either a group course (a date range) or an individual course
//! (a duration). Each variant is stored in its own table, and the identity is
//! a random 128-bit id generated when the value is constructed, before any
//! store has seen it.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Client-generated course identity.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CourseId(Uuid);

impl CourseId {
  fn generate() -> Self { Self(Uuid::new_v4()) }

  pub fn as_uuid(&self) -> Uuid { self.0 }

  /// The compact 16-byte form used at the storage boundary.
  pub fn as_bytes(&self) -> &[u8; 16] { self.0.as_bytes() }
}

impl From<Uuid> for CourseId {
  fn from(id: Uuid) -> Self { Self(id) }
}

impl fmt::Display for CourseId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.hyphenated())
  }
}

/// Variant-specific attributes. The variant doubles as the table selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CourseKind {
  Group { start: NaiveDate, end: NaiveDate },
  Individual { duration_days: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
  id:   CourseId,
  name: String,
  kind: CourseKind,
}

impl Course {
  /// A group course running from `start` through `end` inclusive.
  pub fn group(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Result<Self> {
    if start > end {
      return Err(Error::InvalidDateRange { start, end });
    }
    Ok(Self {
      id:   CourseId::generate(),
      name: name.into(),
      kind: CourseKind::Group { start, end },
    })
  }

  pub fn individual(name: impl Into<String>, duration_days: u32) -> Result<Self> {
    if duration_days == 0 {
      return Err(Error::InvalidDuration);
    }
    Ok(Self {
      id:   CourseId::generate(),
      name: name.into(),
      kind: CourseKind::Individual { duration_days },
    })
  }

  /// Rebuild a persisted course. Used by storage backends.
  pub fn from_parts(id: CourseId, name: String, kind: CourseKind) -> Self {
    Self { id, name, kind }
  }

  pub fn id(&self) -> CourseId { self.id }

  pub fn name(&self) -> &str { &self.name }

  pub fn kind(&self) -> &CourseKind { &self.kind }
}
