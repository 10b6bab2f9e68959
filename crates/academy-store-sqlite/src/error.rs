//! Error type for `academy-store-sqlite`.

use academy_core::instructor::InstructorId;
use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] academy_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  /// A row points at a parent that is not stored.
  #[error("referential integrity violation: {0}")]
  ReferentialIntegrity(String),

  /// A unique or primary key is already taken.
  #[error("constraint violation: {0}")]
  Constraint(String),

  #[error("entity has not been stored yet")]
  NotPersisted,

  #[error("instructor not found: {0:?}")]
  InstructorNotFound(InstructorId),

  #[error("campus not found: {0}")]
  CampusNotFound(String),

  /// A column held something the domain types cannot represent.
  #[error("encoding error: {0}")]
  Encoding(String),
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
      failure,
      message,
    )) = &e
    {
      let detail = message.clone().unwrap_or_else(|| failure.to_string());
      match failure.extended_code {
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
          return Error::ReferentialIntegrity(detail);
        }
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
          return Error::Constraint(detail);
        }
        _ => {}
      }
    }
    Error::Database(e)
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
