//! Business operations that span a load, a domain rule, and a write-back.

use thiserror::Error;

use crate::{
  instructor::{Instructor, InstructorId},
  repository::InstructorRepository,
  value::Percentage,
};

#[derive(Debug, Error)]
pub enum ServiceError<E: std::error::Error + 'static> {
  #[error("instructor {0:?} not found")]
  InstructorNotFound(InstructorId),

  #[error(transparent)]
  Repository(#[from] E),
}

pub struct InstructorService<'r, R> {
  repository: &'r R,
}

impl<'r, R: InstructorRepository> InstructorService<'r, R> {
  pub fn new(repository: &'r R) -> Self { Self { repository } }

  /// Raise one instructor's salary and commit the change.
  ///
  /// The arithmetic is the entity's; this only loads, applies and writes
  /// back. Returns the instructor as stored.
  pub async fn raise(
    &self,
    id: InstructorId,
    percentage: &Percentage,
  ) -> Result<Instructor, ServiceError<R::Error>> {
    let mut instructor = self
      .repository
      .find_by_id(id)
      .await?
      .ok_or(ServiceError::InstructorNotFound(id))?;

    instructor.raise(percentage);
    self.repository.update(&instructor).await?;

    Ok(instructor)
  }
}
