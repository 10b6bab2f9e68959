//! Repository traits, one per aggregate root, plus the projection types
//! they return.
//!
//! Backends (e.g. `academy-store-sqlite`) implement these; the service layer
//! and the CLI depend only on the traits.
//!
//! Lookups by key never treat absence as an error: they return `None`, and
//! deletes of unknown keys are no-ops. Every mutating method is atomic.

use std::future::Future;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
  campus::{Campus, CampusId},
  course::{Course, CourseId},
  instructor::{Instructor, InstructorId},
  value::Percentage,
};

// ─── Projections ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdAndEmail {
  pub id:    InstructorId,
  pub email: String,
}

/// How many instructors earn exactly `salary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalaryCount {
  pub salary: Decimal,
  pub count:  u64,
}

// ─── Campus ──────────────────────────────────────────────────────────────────

pub trait CampusRepository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load a campus together with its phone numbers and roster.
  fn find_by_id(
    &self,
    id: CampusId,
  ) -> impl Future<Output = Result<Option<Campus>, Self::Error>> + Send + '_;

  /// Case-insensitive lookup on the unique campus name.
  fn find_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Campus>, Self::Error>> + Send + 'a;

  /// All campuses, ordered by name.
  fn find_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Campus>, Self::Error>> + Send + '_;

  /// Insert the campus and its phone numbers; assigns the id on success.
  fn create<'a>(
    &'a self,
    campus: &'a mut Campus,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Write back name, address and phone numbers of a stored campus. The
  /// stored phone numbers are replaced by the campus's current set.
  fn update<'a>(
    &'a self,
    campus: &'a Campus,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── Instructor ──────────────────────────────────────────────────────────────

pub trait InstructorRepository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load an instructor and its nicknames. The campus is left as a
  /// [`crate::instructor::CampusRef`]; see [`Self::load_campus`].
  fn find_by_id(
    &self,
    id: InstructorId,
  ) -> impl Future<Output = Result<Option<Instructor>, Self::Error>> + Send + '_;

  /// Insert a new instructor and its nicknames, assigning the id.
  ///
  /// The instructor's campus must already be stored.
  fn create<'a>(
    &'a self,
    instructor: &'a mut Instructor,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Write back salary, campus and nicknames of a stored instructor.
  fn update<'a>(
    &'a self,
    instructor: &'a Instructor,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove the instructor and its nicknames. Unknown ids are ignored.
  fn delete(
    &self,
    id: InstructorId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Fetch the full campus behind an instructor's campus reference.
  fn load_campus<'a>(
    &'a self,
    instructor: &'a Instructor,
  ) -> impl Future<Output = Result<Campus, Self::Error>> + Send + 'a;

  /// All instructors, lowest salary first.
  fn find_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Instructor>, Self::Error>> + Send + '_;

  /// Instructors earning between `low` and `high`, both inclusive.
  fn find_by_salary_between(
    &self,
    low: Decimal,
    high: Decimal,
  ) -> impl Future<Output = Result<Vec<Instructor>, Self::Error>> + Send + '_;

  fn find_email_addresses(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  fn find_ids_and_email_addresses(
    &self,
  ) -> impl Future<Output = Result<Vec<IdAndEmail>, Self::Error>> + Send + '_;

  /// The highest salary, or `None` when there are no instructors.
  fn find_max_salary(
    &self,
  ) -> impl Future<Output = Result<Option<Decimal>, Self::Error>> + Send + '_;

  /// Instructor count per distinct salary, lowest salary first.
  fn find_count_per_salary(
    &self,
  ) -> impl Future<Output = Result<Vec<SalaryCount>, Self::Error>> + Send + '_;

  /// Raise every salary in one statement; returns the number of rows
  /// touched. Either all rows change or none do.
  fn general_raise<'a>(
    &'a self,
    percentage: &'a Percentage,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;
}

// ─── Course ──────────────────────────────────────────────────────────────────

pub trait CourseRepository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn find_by_id(
    &self,
    id: CourseId,
  ) -> impl Future<Output = Result<Option<Course>, Self::Error>> + Send + '_;

  /// All courses of either kind, ordered by name.
  fn find_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + '_;

  fn create<'a>(
    &'a self,
    course: &'a Course,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Unknown ids are ignored.
  fn delete(
    &self,
    id: CourseId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
