//! [`SqliteStore`] and the [`Session`] through which repositories are used.

use std::{path::Path, str::FromStr as _};

use academy_core::{scope::Scope, value::Percentage};
use rusqlite::functions::FunctionFlags;
use rust_decimal::Decimal;

use crate::{
  Result,
  encode::{decode_salary, encode_salary},
  schema::SCHEMA,
};

/// Name of the SQL function used by bulk raises:
/// `raise_salary(wedde, percentage_text) -> wedde`.
pub(crate) const RAISE_SALARY_FN: &str = "raise_salary";

// ─── Store ───────────────────────────────────────────────────────────────────

/// An academy store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init().await?;
    Ok(store)
  }

  async fn init(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        conn.create_scalar_function(
          RAISE_SALARY_FN,
          2,
          FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
          |ctx| {
            let hundredths: i64 = ctx.get(0)?;
            let text: String = ctx.get(1)?;
            let percentage = Decimal::from_str(&text)
              .map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))
              .and_then(|d| {
                Percentage::new(d)
                  .map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))
              })?;
            encode_salary(percentage.apply_to(decode_salary(hundredths)))
              .map_err(|e| rusqlite::Error::UserFunctionError(e.to_string().into()))
          },
        )?;
        Ok(())
      })
      .await?;
    tracing::debug!("store schema ready");
    Ok(())
  }

  /// Begin a unit of work.
  pub fn session(&self) -> Session {
    Session { conn: self.conn.clone(), scope: Scope::new() }
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// A unit of work over the store.
///
/// Implements [`CampusRepository`](academy_core::repository::CampusRepository),
/// [`InstructorRepository`](academy_core::repository::InstructorRepository)
/// and [`CourseRepository`](academy_core::repository::CourseRepository).
/// Every mutating call runs in its own transaction. Campus references on
/// instructors loaded here can be resolved only while the session is open.
pub struct Session {
  pub(crate) conn:  tokio_rusqlite::Connection,
  pub(crate) scope: Scope,
}

impl Session {
  /// End the unit of work, invalidating its lazy references.
  pub fn close(self) { self.scope.close(); }
}
