//! Encoding and decoding helpers between domain types and the plain
//! representations stored in SQLite columns.
//!
//! Salaries are stored as integer hundredths, dates as `YYYY-MM-DD` text,
//! course ids as 16-byte blobs and gender as `'M'` / `'V'`.

use std::collections::{BTreeSet, HashMap};

use academy_core::{
  campus::{Campus, CampusId, RosterEntry},
  course::{Course, CourseId, CourseKind},
  instructor::{CampusRef, Instructor, InstructorId},
  scope::ScopeToken,
  value::{Address, Gender, PhoneNumber},
};
use chrono::NaiveDate;
use rust_decimal::{Decimal, prelude::ToPrimitive as _};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Salary ──────────────────────────────────────────────────────────────────

const SALARY_SCALE: u32 = 2;

pub fn encode_salary(salary: Decimal) -> Result<i64> {
  let scaled = salary
    .checked_mul(Decimal::ONE_HUNDRED)
    .ok_or_else(|| Error::Encoding(format!("salary {salary} is out of range")))?;
  if !scaled.fract().is_zero() {
    return Err(Error::Encoding(format!(
      "salary {salary} has more than {SALARY_SCALE} decimals"
    )));
  }
  scaled
    .to_i64()
    .ok_or_else(|| Error::Encoding(format!("salary {salary} is out of range")))
}

pub fn decode_salary(hundredths: i64) -> Decimal {
  Decimal::new(hundredths, SALARY_SCALE)
}

// ─── Gender ──────────────────────────────────────────────────────────────────

pub fn encode_gender(g: Gender) -> &'static str {
  match g {
    Gender::Man => "M",
    Gender::Woman => "V",
  }
}

pub fn decode_gender(s: &str) -> Result<Gender> {
  match s {
    "M" => Ok(Gender::Man),
    "V" => Ok(Gender::Woman),
    other => Err(Error::Encoding(format!("unknown gender: {other:?}"))),
  }
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Encoding(format!("bad date {s:?}: {e}")))
}

// ─── CourseId ────────────────────────────────────────────────────────────────

pub fn encode_course_id(id: CourseId) -> Vec<u8> { id.as_bytes().to_vec() }

pub fn decode_course_id(bytes: &[u8]) -> Result<CourseId> {
  Uuid::from_slice(bytes)
    .map(CourseId::from)
    .map_err(|e| Error::Encoding(format!("bad course id: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// A `docenten` row joined with its campus name.
pub struct RawInstructor {
  pub id:          i64,
  pub first_name:  String,
  pub last_name:   String,
  pub salary:      i64,
  pub email:       String,
  pub gender:      String,
  pub campus_id:   i64,
  pub campus_name: String,
}

impl RawInstructor {
  pub const COLUMNS: &'static str = "d.id, d.voornaam, d.familienaam, d.wedde, \
                                      d.emailadres, d.geslacht, d.campusid, c.naam";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      first_name:  row.get(1)?,
      last_name:   row.get(2)?,
      salary:      row.get(3)?,
      email:       row.get(4)?,
      gender:      row.get(5)?,
      campus_id:   row.get(6)?,
      campus_name: row.get(7)?,
    })
  }

  pub fn into_instructor(
    self,
    nicknames: &mut HashMap<i64, BTreeSet<String>>,
    origin: &ScopeToken,
  ) -> Result<Instructor> {
    Ok(Instructor::from_parts(
      InstructorId(self.id),
      self.first_name,
      self.last_name,
      decode_salary(self.salary),
      self.email,
      decode_gender(&self.gender)?,
      nicknames.remove(&self.id).unwrap_or_default(),
      CampusRef::loaded(CampusId(self.campus_id), self.campus_name, origin.clone()),
    ))
  }
}

/// A `campuses` row with its phone numbers and roster already attached.
pub struct RawCampus {
  pub id:            i64,
  pub name:          String,
  pub street:        String,
  pub house_number:  String,
  pub postal_code:   String,
  pub municipality:  String,
  pub phone_numbers: BTreeSet<PhoneNumber>,
  pub roster:        BTreeSet<RosterEntry>,
}

impl RawCampus {
  pub fn into_campus(self) -> Campus {
    Campus::from_parts(
      CampusId(self.id),
      self.name,
      Address {
        street:       self.street,
        house_number: self.house_number,
        postal_code:  self.postal_code,
        municipality: self.municipality,
      },
      self.phone_numbers,
      self.roster,
    )
  }
}

/// A course row from either variant table, tagged with its origin.
pub struct RawCourse {
  pub id:            Vec<u8>,
  pub name:          String,
  pub kind:          String,
  pub start:         Option<String>,
  pub end:           Option<String>,
  pub duration_days: Option<i64>,
}

impl RawCourse {
  pub fn into_course(self) -> Result<Course> {
    let id = decode_course_id(&self.id)?;
    let kind = match (self.kind.as_str(), self.start, self.end, self.duration_days) {
      ("G", Some(start), Some(end), _) => CourseKind::Group {
        start: decode_date(&start)?,
        end:   decode_date(&end)?,
      },
      ("I", _, _, Some(days)) => CourseKind::Individual {
        duration_days: u32::try_from(days)
          .map_err(|_| Error::Encoding(format!("bad duration: {days}")))?,
      },
      (other, ..) => {
        return Err(Error::Encoding(format!("malformed course row of kind {other:?}")));
      }
    };
    Ok(Course::from_parts(id, self.name, kind))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn salary_is_stored_in_hundredths() {
    assert_eq!(encode_salary(Decimal::new(123456, 2)).unwrap(), 123456);
    assert_eq!(encode_salary(Decimal::from(1000)).unwrap(), 100000);
    assert_eq!(decode_salary(110000), Decimal::from(1100));
  }

  #[test]
  fn sub_cent_salaries_are_refused() {
    assert!(matches!(
      encode_salary(Decimal::new(10001, 3)),
      Err(Error::Encoding(_))
    ));
  }

  #[test]
  fn trailing_zero_decimals_are_fine() {
    assert_eq!(encode_salary(Decimal::new(1_000_000, 4)).unwrap(), 10_000);
  }

  #[test]
  fn unknown_gender_code_is_an_encoding_error() {
    assert!(decode_gender("X").is_err());
    assert_eq!(decode_gender(encode_gender(Gender::Woman)).unwrap(), Gender::Woman);
  }
}
