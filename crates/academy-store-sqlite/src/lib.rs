//! SQLite backend for the academy repositories.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Open a [`SqliteStore`], then work
//! through a [`Session`], which implements every repository trait.

mod campuses;
mod courses;
mod encode;
mod instructors;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{Session, SqliteStore};
