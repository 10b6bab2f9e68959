//! Error types for `academy-core`.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("percentage must be positive, got {0}")]
  InvalidPercentage(Decimal),

  #[error("course starts on {start} but ends on {end}")]
  InvalidDateRange {
    start: chrono::NaiveDate,
    end:   chrono::NaiveDate,
  },

  #[error("course duration must be at least one day")]
  InvalidDuration,

  /// The instructor is attached to another campus, which must be handed in
  /// so its roster can be updated in the same operation.
  #[error("instructor belongs to campus {0:?}; pass it as the previous campus")]
  PreviousCampusRequired(String),

  #[error("lazy reference read after its session was closed")]
  StaleAccess,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
