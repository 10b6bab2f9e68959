//! Value objects embedded in the entities.
//!
//! None of these carry an identity of their own; two values are the same
//! value when all their fields match.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Address ─────────────────────────────────────────────────────────────────

/// A postal address, stored inline in the `campussen` row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
  pub street:       String,
  pub house_number: String,
  pub postal_code:  String,
  pub municipality: String,
}

impl Address {
  pub fn new(
    street: impl Into<String>,
    house_number: impl Into<String>,
    postal_code: impl Into<String>,
    municipality: impl Into<String>,
  ) -> Self {
    Self {
      street:       street.into(),
      house_number: house_number.into(),
      postal_code:  postal_code.into(),
      municipality: municipality.into(),
    }
  }
}

// ─── PhoneNumber ─────────────────────────────────────────────────────────────

/// A campus telephone or fax line.
///
/// The derived ordering puts voice lines before fax lines, which is the order
/// a campus lists them in.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PhoneNumber {
  pub fax:    bool,
  pub number: String,
  pub remark: Option<String>,
}

impl PhoneNumber {
  pub fn voice(number: impl Into<String>) -> Self {
    Self { fax: false, number: number.into(), remark: None }
  }

  pub fn fax(number: impl Into<String>) -> Self {
    Self { fax: true, number: number.into(), remark: None }
  }

  pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
    self.remark = Some(remark.into());
    self
  }
}

// ─── Gender ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Man,
  Woman,
}

// ─── Percentage ──────────────────────────────────────────────────────────────

/// A strictly positive percentage used for salary raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percentage(Decimal);

impl Percentage {
  pub fn new(value: Decimal) -> Result<Self> {
    if value <= Decimal::ZERO {
      return Err(Error::InvalidPercentage(value));
    }
    Ok(Self(value))
  }

  pub fn value(&self) -> Decimal { self.0 }

  /// `salary + salary * pct / 100`, rounded to whole cents.
  ///
  /// Every raise, single or bulk, goes through this function.
  pub fn apply_to(&self, salary: Decimal) -> Decimal {
    let raised = salary + salary * self.0 / Decimal::ONE_HUNDRED;
    raised.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
  }
}

impl TryFrom<Decimal> for Percentage {
  type Error = Error;

  fn try_from(value: Decimal) -> Result<Self> { Self::new(value) }
}

impl From<Percentage> for Decimal {
  fn from(p: Percentage) -> Self { p.0 }
}

impl fmt::Display for Percentage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}%", self.0)
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use rust_decimal::Decimal;

  use super::*;

  #[test]
  fn ten_percent_of_a_thousand() {
    let pct = Percentage::new(Decimal::TEN).unwrap();
    assert_eq!(pct.apply_to(Decimal::from(1000)), Decimal::from(1100));
  }

  #[test]
  fn raise_rounds_half_cents_away_from_zero() {
    // 1000.05 * 1.5% = 15.00075 -> 1015.05075 -> 1015.05
    let pct = Percentage::new(Decimal::new(15, 1)).unwrap();
    assert_eq!(
      pct.apply_to(Decimal::new(100005, 2)),
      Decimal::new(101505, 2)
    );
    // 0.10 * 5% = 0.005 -> 0.105 -> 0.11
    let pct = Percentage::new(Decimal::from(5)).unwrap();
    assert_eq!(pct.apply_to(Decimal::new(10, 2)), Decimal::new(11, 2));
  }

  #[test]
  fn zero_and_negative_percentages_are_rejected() {
    assert!(matches!(
      Percentage::new(Decimal::ZERO),
      Err(Error::InvalidPercentage(_))
    ));
    assert!(matches!(
      Percentage::new(Decimal::from(-3)),
      Err(Error::InvalidPercentage(_))
    ));
  }

  #[test]
  fn voice_lines_sort_before_fax_lines() {
    let set: BTreeSet<_> = [
      PhoneNumber::fax("09 000 00 01"),
      PhoneNumber::voice("09 000 00 09"),
      PhoneNumber::voice("09 000 00 02"),
    ]
    .into_iter()
    .collect();

    let order: Vec<_> = set.iter().map(|p| (p.fax, p.number.as_str())).collect();
    assert_eq!(
      order,
      vec![
        (false, "09 000 00 02"),
        (false, "09 000 00 09"),
        (true, "09 000 00 01"),
      ]
    );
  }
}
