//! [`InstructorRepository`] for [`Session`].

use std::collections::{BTreeSet, HashMap};

use academy_core::{
  campus::Campus,
  instructor::{Instructor, InstructorId},
  repository::{IdAndEmail, InstructorRepository, SalaryCount},
  value::Percentage,
};
use rusqlite::types::Value;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
  Error, Result, Session,
  campuses::{resolve_campus_id, select_campuses},
  encode::{RawInstructor, decode_salary, encode_gender, encode_salary},
  store::RAISE_SALARY_FN,
};

/// Which instructors a read selects, as a clause over alias `d`.
enum Filter {
  Id(i64),
  SalaryBetween(i64, i64),
  All,
}

impl Filter {
  fn clause(&self) -> &'static str {
    match self {
      Self::Id(_) => "d.id = ?1",
      Self::SalaryBetween(..) => "d.wedde BETWEEN ?1 AND ?2",
      Self::All => "1 = 1",
    }
  }

  fn values(&self) -> Vec<Value> {
    match self {
      Self::Id(id) => vec![Value::Integer(*id)],
      Self::SalaryBetween(low, high) => vec![Value::Integer(*low), Value::Integer(*high)],
      Self::All => Vec::new(),
    }
  }
}

/// The columns of an instructor that `create` and `update` write.
struct InstructorRow {
  first_name:  String,
  last_name:   String,
  salary:      i64,
  email:       String,
  email_key:   String,
  gender:      &'static str,
  campus_id:   Option<i64>,
  campus_name: String,
  nicknames:   BTreeSet<String>,
}

impl InstructorRow {
  fn of(instructor: &Instructor) -> Result<Self> {
    let campus = instructor
      .campus()
      .ok_or_else(|| Error::ReferentialIntegrity("instructor has no campus".into()))?;
    Ok(Self {
      first_name:  instructor.first_name().to_owned(),
      last_name:   instructor.last_name().to_owned(),
      salary:      encode_salary(instructor.salary())?,
      email:       instructor.email().to_owned(),
      email_key:   instructor.email_key(),
      gender:      encode_gender(instructor.gender()),
      campus_id:   campus.id().map(|id| id.0),
      campus_name: campus.name().to_owned(),
      nicknames:   instructor.nicknames().clone(),
    })
  }
}

impl Session {
  /// Core fetch plus the nickname side table, in one read transaction.
  async fn select_instructors(&self, filter: Filter, order: &'static str) -> Result<Vec<Instructor>> {
    let clause = filter.clause();
    let values = filter.values();

    let (raws, mut nicknames) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let raws = {
          let mut stmt = tx.prepare(&format!(
            "SELECT {}
             FROM docenten d
             JOIN campuses c ON c.id = d.campusid
             WHERE {clause}
             ORDER BY {order}",
            RawInstructor::COLUMNS,
          ))?;
          let rows = stmt
            .query_map(rusqlite::params_from_iter(&values), RawInstructor::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          rows
        };

        let mut nicknames: HashMap<i64, BTreeSet<String>> = HashMap::new();
        {
          let mut stmt = tx.prepare(&format!(
            "SELECT b.docentid, b.bijnaam
             FROM docentenbijnamen b
             JOIN docenten d ON d.id = b.docentid
             WHERE {clause}"
          ))?;
          let rows = stmt.query_map(rusqlite::params_from_iter(&values), |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
          })?;
          for row in rows {
            let (id, nickname) = row?;
            nicknames.entry(id).or_default().insert(nickname);
          }
        }

        tx.commit()?;
        Ok((raws, nicknames))
      })
      .await?;

    let origin = self.scope.token();
    raws
      .into_iter()
      .map(|raw| raw.into_instructor(&mut nicknames, &origin))
      .collect()
  }
}

impl InstructorRepository for Session {
  type Error = Error;

  async fn find_by_id(&self, id: InstructorId) -> Result<Option<Instructor>> {
    let mut found = self.select_instructors(Filter::Id(id.0), "d.id").await?;
    Ok(found.pop())
  }

  async fn create(&self, instructor: &mut Instructor) -> Result<()> {
    let row = InstructorRow::of(instructor)?;
    let campus_name = row.campus_name.clone();

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(campus_id) = resolve_campus_id(&tx, row.campus_id, &row.campus_name)? else {
          return Ok(None);
        };
        tx.execute(
          "INSERT INTO docenten
             (voornaam, familienaam, wedde, emailadres, emailkey, geslacht, campusid)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            row.first_name,
            row.last_name,
            row.salary,
            row.email,
            row.email_key,
            row.gender,
            campus_id,
          ],
        )?;
        let id = tx.last_insert_rowid();
        for nickname in &row.nicknames {
          tx.execute(
            "INSERT INTO docentenbijnamen (docentid, bijnaam) VALUES (?1, ?2)",
            rusqlite::params![id, nickname],
          )?;
        }
        tx.commit()?;
        Ok(Some(id))
      })
      .await?;

    let id = id.ok_or_else(|| {
      Error::ReferentialIntegrity(format!("campus {campus_name:?} is not stored"))
    })?;
    instructor.assign_id(InstructorId(id));
    tracing::debug!(id, email = instructor.email(), "instructor created");
    Ok(())
  }

  async fn update(&self, instructor: &Instructor) -> Result<()> {
    let id = instructor.id().ok_or(Error::NotPersisted)?;
    let row = InstructorRow::of(instructor)?;
    let campus_name = row.campus_name.clone();

    #[derive(Debug)]
    enum Outcome {
      Updated { added: usize, removed: usize },
      MissingCampus,
      MissingInstructor,
    }

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(campus_id) = resolve_campus_id(&tx, row.campus_id, &row.campus_name)? else {
          return Ok(Outcome::MissingCampus);
        };
        let changed = tx.execute(
          "UPDATE docenten
           SET voornaam = ?1, familienaam = ?2, wedde = ?3,
               emailadres = ?4, emailkey = ?5, geslacht = ?6, campusid = ?7
           WHERE id = ?8",
          rusqlite::params![
            row.first_name,
            row.last_name,
            row.salary,
            row.email,
            row.email_key,
            row.gender,
            campus_id,
            id.0,
          ],
        )?;
        if changed == 0 {
          return Ok(Outcome::MissingInstructor);
        }

        // Sync the nickname side table: only the difference is written.
        let stored: BTreeSet<String> = {
          let mut stmt =
            tx.prepare("SELECT bijnaam FROM docentenbijnamen WHERE docentid = ?1")?;
          let rows = stmt
            .query_map(rusqlite::params![id.0], |r| r.get(0))?
            .collect::<rusqlite::Result<_>>()?;
          rows
        };
        let mut added = 0;
        for nickname in row.nicknames.difference(&stored) {
          added += tx.execute(
            "INSERT INTO docentenbijnamen (docentid, bijnaam) VALUES (?1, ?2)",
            rusqlite::params![id.0, nickname],
          )?;
        }
        let mut removed = 0;
        for nickname in stored.difference(&row.nicknames) {
          removed += tx.execute(
            "DELETE FROM docentenbijnamen WHERE docentid = ?1 AND bijnaam = ?2",
            rusqlite::params![id.0, nickname],
          )?;
        }

        tx.commit()?;
        Ok(Outcome::Updated { added, removed })
      })
      .await?;

    match outcome {
      Outcome::Updated { added, removed } => {
        tracing::debug!(id = id.0, added, removed, "instructor updated");
        Ok(())
      }
      Outcome::MissingCampus => Err(Error::ReferentialIntegrity(format!(
        "campus {campus_name:?} is not stored"
      ))),
      Outcome::MissingInstructor => Err(Error::InstructorNotFound(id)),
    }
  }

  async fn delete(&self, id: InstructorId) -> Result<()> {
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM docentenbijnamen WHERE docentid = ?1",
          rusqlite::params![id.0],
        )?;
        let removed = tx.execute("DELETE FROM docenten WHERE id = ?1", rusqlite::params![id.0])?;
        tx.commit()?;
        Ok(removed)
      })
      .await?;

    if removed > 0 {
      tracing::debug!(id = id.0, "instructor deleted");
    }
    Ok(())
  }

  async fn load_campus(&self, instructor: &Instructor) -> Result<Campus> {
    let campus = instructor
      .campus()
      .ok_or_else(|| Error::CampusNotFound("instructor has no campus".into()))?;
    campus.ensure_readable()?;

    let id = campus.id().map(|id| id.0);
    let name = campus.name().to_owned();
    let lookup_name = name.clone();

    let mut found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raws = match resolve_campus_id(&tx, id, &lookup_name)? {
          Some(id) => select_campuses(&tx, "c.id = ?1", &[Value::Integer(id)])?,
          None => Vec::new(),
        };
        tx.commit()?;
        Ok(raws)
      })
      .await?;

    found
      .pop()
      .map(|raw| raw.into_campus())
      .ok_or(Error::CampusNotFound(name))
  }

  async fn find_all(&self) -> Result<Vec<Instructor>> {
    self.select_instructors(Filter::All, "d.wedde, d.id").await
  }

  async fn find_by_salary_between(&self, low: Decimal, high: Decimal) -> Result<Vec<Instructor>> {
    // Stored salaries are whole cents: narrow sub-cent bounds inward.
    let low = low.round_dp_with_strategy(2, RoundingStrategy::ToPositiveInfinity);
    let high = high.round_dp_with_strategy(2, RoundingStrategy::ToNegativeInfinity);
    let filter = Filter::SalaryBetween(encode_salary(low)?, encode_salary(high)?);
    self.select_instructors(filter, "d.id").await
  }

  async fn find_email_addresses(&self) -> Result<Vec<String>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare("SELECT emailadres FROM docenten")?;
          let rows = stmt
            .query_map([], |r| r.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn find_ids_and_email_addresses(&self) -> Result<Vec<IdAndEmail>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare("SELECT id, emailadres FROM docenten")?;
          let rows = stmt
            .query_map([], |r| {
              Ok(IdAndEmail { id: InstructorId(r.get(0)?), email: r.get(1)? })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn find_max_salary(&self) -> Result<Option<Decimal>> {
    let max: Option<i64> = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT MAX(wedde) FROM docenten", [], |r| r.get(0))?))
      .await?;
    Ok(max.map(decode_salary))
  }

  async fn find_count_per_salary(&self) -> Result<Vec<SalaryCount>> {
    let rows: Vec<(i64, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT wedde, COUNT(*) FROM docenten GROUP BY wedde ORDER BY wedde",
        )?;
        let rows = stmt
          .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(salary, count)| SalaryCount {
          salary: decode_salary(salary),
          count:  count.unsigned_abs(),
        })
        .collect(),
    )
  }

  async fn general_raise(&self, percentage: &Percentage) -> Result<u64> {
    let pct = percentage.value().to_string();

    let touched = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let touched = tx.execute(
          &format!("UPDATE docenten SET wedde = {RAISE_SALARY_FN}(wedde, ?1)"),
          rusqlite::params![pct],
        )?;
        tx.commit()?;
        Ok(touched)
      })
      .await?;

    tracing::info!(%percentage, touched, "general raise applied");
    Ok(touched as u64)
  }
}
