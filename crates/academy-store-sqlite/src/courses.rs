//! [`CourseRepository`] for [`Session`].
//!
//! Each course variant lives in its own table. Reads go through a
//! `UNION ALL` view that tags every row with its variant, so callers never
//! need to know which table a course came from.

use academy_core::{
  course::{Course, CourseId, CourseKind},
  repository::CourseRepository,
};
use rusqlite::types::Value;

use crate::{
  Error, Result, Session,
  encode::{RawCourse, encode_course_id, encode_date},
};

const ALL_COURSES: &str = "
  SELECT id, naam, 'G' AS soort, van, tot, NULL AS duurtijd FROM groepscursussen
  UNION ALL
  SELECT id, naam, 'I' AS soort, NULL, NULL, duurtijd FROM individuelecursussen";

impl Session {
  async fn select_courses(&self, clause: &'static str, values: Vec<Value>) -> Result<Vec<Course>> {
    let raws: Vec<RawCourse> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT id, naam, soort, van, tot, duurtijd
           FROM ({ALL_COURSES})
           WHERE {clause}
           ORDER BY naam"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(&values), |row| {
            Ok(RawCourse {
              id:            row.get(0)?,
              name:          row.get(1)?,
              kind:          row.get(2)?,
              start:         row.get(3)?,
              end:           row.get(4)?,
              duration_days: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCourse::into_course).collect()
  }
}

impl CourseRepository for Session {
  type Error = Error;

  async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>> {
    let mut found = self
      .select_courses("id = ?1", vec![Value::Blob(encode_course_id(id))])
      .await?;
    Ok(found.pop())
  }

  async fn find_all(&self) -> Result<Vec<Course>> {
    self.select_courses("1 = 1", Vec::new()).await
  }

  async fn create(&self, course: &Course) -> Result<()> {
    let id   = encode_course_id(course.id());
    let name = course.name().to_owned();
    let kind = course.kind().clone();

    self
      .conn
      .call(move |conn| {
        match kind {
          CourseKind::Group { start, end } => conn.execute(
            "INSERT INTO groepscursussen (id, naam, van, tot) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id, name, encode_date(start), encode_date(end)],
          )?,
          CourseKind::Individual { duration_days } => conn.execute(
            "INSERT INTO individuelecursussen (id, naam, duurtijd) VALUES (?1, ?2, ?3)",
            rusqlite::params![id, name, duration_days],
          )?,
        };
        Ok(())
      })
      .await?;

    tracing::debug!(id = %course.id(), name = course.name(), "course created");
    Ok(())
  }

  async fn delete(&self, id: CourseId) -> Result<()> {
    let bytes = encode_course_id(id);

    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let removed = tx.execute(
          "DELETE FROM groepscursussen WHERE id = ?1",
          rusqlite::params![bytes],
        )? + tx.execute(
          "DELETE FROM individuelecursussen WHERE id = ?1",
          rusqlite::params![bytes],
        )?;
        tx.commit()?;
        Ok(removed)
      })
      .await?;

    if removed > 0 {
      tracing::debug!(%id, "course deleted");
    }
    Ok(())
  }
}
