//! Instructor — the owning side of the campus/instructor association.

use std::{
  collections::BTreeSet,
  hash::{Hash, Hasher},
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  campus::{Campus, CampusId},
  scope::ScopeToken,
  value::{Gender, Percentage},
};

/// Store-assigned surrogate key.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct InstructorId(pub i64);

/// The case-folded form of an email address, the instructor's identity.
pub fn email_key(email: &str) -> String { email.to_lowercase() }

// ─── CampusRef ───────────────────────────────────────────────────────────────

/// The instructor's recorded campus.
///
/// Only the key columns are held here. The full [`Campus`] is fetched on
/// demand through the repository, which refuses to do so once the session
/// that produced this reference has been closed.
#[derive(Debug, Clone, Serialize)]
pub struct CampusRef {
  id:     Option<CampusId>,
  name:   String,
  #[serde(skip)]
  origin: Option<ScopeToken>,
}

impl CampusRef {
  /// Reference an in-memory campus.
  pub fn to(campus: &Campus) -> Self {
    Self { id: campus.id(), name: campus.name().to_owned(), origin: None }
  }

  /// Reference produced while loading inside a session.
  pub fn loaded(id: CampusId, name: String, origin: ScopeToken) -> Self {
    Self { id: Some(id), name, origin: Some(origin) }
  }

  pub fn id(&self) -> Option<CampusId> { self.id }

  pub fn name(&self) -> &str { &self.name }

  /// Fails with [`crate::Error::StaleAccess`] when the originating session
  /// has ended. References built in memory are always readable.
  pub fn ensure_readable(&self) -> Result<()> {
    match &self.origin {
      Some(token) => token.ensure_open(),
      None => Ok(()),
    }
  }
}

// ─── Instructor ──────────────────────────────────────────────────────────────

/// An instructor ("docent").
///
/// Equality and hashing use the lowercase email address, so an instructor
/// keeps its identity before and after it is first stored.
#[derive(Debug, Clone, Serialize)]
pub struct Instructor {
  id:         Option<InstructorId>,
  first_name: String,
  last_name:  String,
  salary:     Decimal,
  email:      String,
  gender:     Gender,
  nicknames:  BTreeSet<String>,
  campus:     Option<CampusRef>,
}

impl Instructor {
  /// Create an instructor and attach it to `campus`.
  pub fn new(
    first_name: impl Into<String>,
    last_name: impl Into<String>,
    salary: Decimal,
    email: impl Into<String>,
    gender: Gender,
    campus: &mut Campus,
  ) -> Self {
    let mut instructor = Self {
      id: None,
      first_name: first_name.into(),
      last_name: last_name.into(),
      salary,
      email: email.into(),
      gender,
      nicknames: BTreeSet::new(),
      campus: None,
    };
    campus.attach(&mut instructor, None);
    instructor
  }

  /// Rebuild a persisted instructor. Used by storage backends.
  #[allow(clippy::too_many_arguments)]
  pub fn from_parts(
    id: InstructorId,
    first_name: String,
    last_name: String,
    salary: Decimal,
    email: String,
    gender: Gender,
    nicknames: BTreeSet<String>,
    campus: CampusRef,
  ) -> Self {
    Self {
      id: Some(id),
      first_name,
      last_name,
      salary,
      email,
      gender,
      nicknames,
      campus: Some(campus),
    }
  }

  pub fn id(&self) -> Option<InstructorId> { self.id }

  /// Record the store-assigned id. An id, once set, is never replaced.
  pub fn assign_id(&mut self, id: InstructorId) {
    self.id.get_or_insert(id);
  }

  pub fn first_name(&self) -> &str { &self.first_name }

  pub fn last_name(&self) -> &str { &self.last_name }

  pub fn salary(&self) -> Decimal { self.salary }

  pub fn email(&self) -> &str { &self.email }

  pub fn email_key(&self) -> String { email_key(&self.email) }

  pub fn gender(&self) -> Gender { self.gender }

  pub fn nicknames(&self) -> &BTreeSet<String> { &self.nicknames }

  pub fn add_nickname(&mut self, nickname: impl Into<String>) -> bool {
    self.nicknames.insert(nickname.into())
  }

  pub fn remove_nickname(&mut self, nickname: &str) -> bool {
    self.nicknames.remove(nickname)
  }

  /// `None` only while the instructor is being constructed.
  pub fn campus(&self) -> Option<&CampusRef> { self.campus.as_ref() }

  /// Only [`Campus`] changes this, keeping both sides in step.
  pub(crate) fn set_campus(&mut self, campus: CampusRef) {
    self.campus = Some(campus);
  }

  /// Raise the salary by `percentage` percent.
  pub fn raise(&mut self, percentage: &Percentage) {
    self.salary = percentage.apply_to(self.salary);
  }
}

impl PartialEq for Instructor {
  fn eq(&self, other: &Self) -> bool { self.email_key() == other.email_key() }
}

impl Eq for Instructor {}

impl Hash for Instructor {
  fn hash<H: Hasher>(&self, state: &mut H) { self.email_key().hash(state); }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Error, scope::Scope, value::Address};

  fn gent() -> Campus {
    Campus::new("Gent", Address::new("Straat", "1", "9000", "Gent"))
  }

  fn ann(campus: &mut Campus) -> Instructor {
    Instructor::new(
      "Ann",
      "Peeters",
      Decimal::from(1000),
      "Ann@Academy.be",
      Gender::Woman,
      campus,
    )
  }

  #[test]
  fn raise_by_ten_percent() {
    let mut campus = gent();
    let mut d = ann(&mut campus);
    d.raise(&Percentage::new(Decimal::TEN).unwrap());
    assert_eq!(d.salary(), Decimal::from(1100));
  }

  #[test]
  fn nicknames_have_set_semantics() {
    let mut campus = gent();
    let mut d = ann(&mut campus);
    assert!(d.add_nickname("Annie"));
    assert!(!d.add_nickname("Annie"));
    assert!(d.add_nickname("Nana"));
    assert_eq!(d.nicknames().len(), 2);
    assert!(d.remove_nickname("Annie"));
    assert!(!d.remove_nickname("Annie"));
  }

  #[test]
  fn identity_is_the_email_address_ignoring_case() {
    let mut campus = gent();
    let a = ann(&mut campus);
    let b = Instructor::new(
      "Someone",
      "Else",
      Decimal::ONE,
      "ann@academy.BE",
      Gender::Man,
      &mut campus,
    );
    assert_eq!(a, b);
  }

  #[test]
  fn in_memory_campus_reference_is_always_readable() {
    let mut campus = gent();
    let d = ann(&mut campus);
    assert!(d.campus().unwrap().ensure_readable().is_ok());
  }

  #[test]
  fn loaded_campus_reference_goes_stale_with_its_scope() {
    let scope = Scope::new();
    let r = CampusRef::loaded(CampusId(1), "Gent".into(), scope.token());
    assert!(r.ensure_readable().is_ok());
    drop(scope);
    assert!(matches!(r.ensure_readable(), Err(Error::StaleAccess)));
    // The key columns stay available.
    assert_eq!(r.name(), "Gent");
    assert_eq!(r.id(), Some(CampusId(1)));
  }
}
