//! [`CampusRepository`] for [`Session`].

use std::collections::{BTreeSet, HashMap};

use academy_core::{
  campus::{Campus, CampusId, RosterEntry, name_key},
  repository::CampusRepository,
  value::PhoneNumber,
};
use rusqlite::{OptionalExtension as _, types::Value};

use crate::{Error, Result, Session, encode::RawCampus};

/// Load campuses matching `clause` (over alias `c`) with their phone numbers
/// and rosters, in three queries over one connection borrow.
pub(crate) fn select_campuses(
  conn: &rusqlite::Connection,
  clause: &str,
  values: &[Value],
) -> rusqlite::Result<Vec<RawCampus>> {
  let mut phones: HashMap<i64, BTreeSet<PhoneNumber>> = HashMap::new();
  let mut stmt = conn.prepare(&format!(
    "SELECT t.campusid, t.nummer, t.fax, t.opmerking
     FROM campussentelefoonnrs t
     JOIN campuses c ON c.id = t.campusid
     WHERE {clause}"
  ))?;
  let rows = stmt.query_map(rusqlite::params_from_iter(values), |row| {
    Ok((
      row.get::<_, i64>(0)?,
      PhoneNumber {
        number: row.get(1)?,
        fax:    row.get(2)?,
        remark: row.get(3)?,
      },
    ))
  })?;
  for row in rows {
    let (campus_id, phone) = row?;
    phones.entry(campus_id).or_default().insert(phone);
  }

  let mut rosters: HashMap<i64, BTreeSet<RosterEntry>> = HashMap::new();
  let mut stmt = conn.prepare(&format!(
    "SELECT d.campusid, d.voornaam, d.familienaam, d.emailkey
     FROM docenten d
     JOIN campuses c ON c.id = d.campusid
     WHERE {clause}"
  ))?;
  let rows = stmt.query_map(rusqlite::params_from_iter(values), |row| {
    Ok((
      row.get::<_, i64>(0)?,
      RosterEntry {
        first_name: row.get(1)?,
        last_name:  row.get(2)?,
        email:      row.get(3)?,
      },
    ))
  })?;
  for row in rows {
    let (campus_id, entry) = row?;
    rosters.entry(campus_id).or_default().insert(entry);
  }

  let mut stmt = conn.prepare(&format!(
    "SELECT c.id, c.naam, c.straat, c.huisnr, c.postcode, c.gemeente
     FROM campuses c
     WHERE {clause}
     ORDER BY c.naam"
  ))?;
  let rows = stmt
    .query_map(rusqlite::params_from_iter(values), |row| {
      let id: i64 = row.get(0)?;
      Ok(RawCampus {
        id,
        name: row.get(1)?,
        street: row.get(2)?,
        house_number: row.get(3)?,
        postal_code: row.get(4)?,
        municipality: row.get(5)?,
        phone_numbers: phones.remove(&id).unwrap_or_default(),
        roster: rosters.remove(&id).unwrap_or_default(),
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(rows)
}

/// Resolve a campus id, trusting `id` when present and otherwise looking the
/// campus up by its unique name key.
pub(crate) fn resolve_campus_id(
  conn: &rusqlite::Connection,
  id: Option<i64>,
  name: &str,
) -> rusqlite::Result<Option<i64>> {
  match id {
    Some(id) => Ok(Some(id)),
    None => conn
      .query_row(
        "SELECT id FROM campuses WHERE naamkey = ?1",
        rusqlite::params![name_key(name)],
        |r| r.get(0),
      )
      .optional(),
  }
}

fn insert_phone_numbers(
  conn: &rusqlite::Connection,
  campus_id: i64,
  phones: &[PhoneNumber],
) -> rusqlite::Result<()> {
  for phone in phones {
    conn.execute(
      "INSERT INTO campussentelefoonnrs (campusid, nummer, fax, opmerking)
       VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![campus_id, phone.number, phone.fax, phone.remark],
    )?;
  }
  Ok(())
}

impl Session {
  async fn load_campuses(&self, clause: &'static str, values: Vec<Value>) -> Result<Vec<Campus>> {
    let raws = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raws = select_campuses(&tx, clause, &values)?;
        tx.commit()?;
        Ok(raws)
      })
      .await?;
    Ok(raws.into_iter().map(RawCampus::into_campus).collect())
  }
}

impl CampusRepository for Session {
  type Error = Error;

  async fn find_by_id(&self, id: CampusId) -> Result<Option<Campus>> {
    let mut found = self
      .load_campuses("c.id = ?1", vec![Value::Integer(id.0)])
      .await?;
    Ok(found.pop())
  }

  async fn find_by_name(&self, name: &str) -> Result<Option<Campus>> {
    let mut found = self
      .load_campuses("c.naamkey = ?1", vec![Value::Text(name_key(name))])
      .await?;
    Ok(found.pop())
  }

  async fn find_all(&self) -> Result<Vec<Campus>> {
    self.load_campuses("1 = 1", Vec::new()).await
  }

  async fn create(&self, campus: &mut Campus) -> Result<()> {
    let name         = campus.name().to_owned();
    let key          = campus.name_key();
    let address      = campus.address().clone();
    let phones: Vec<PhoneNumber> = campus.phone_numbers().iter().cloned().collect();

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO campuses (naam, naamkey, straat, huisnr, postcode, gemeente)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            name,
            key,
            address.street,
            address.house_number,
            address.postal_code,
            address.municipality,
          ],
        )?;
        let id = tx.last_insert_rowid();
        insert_phone_numbers(&tx, id, &phones)?;
        tx.commit()?;
        Ok(id)
      })
      .await?;

    campus.assign_id(CampusId(id));
    tracing::debug!(campus = campus.name(), id, "campus created");
    Ok(())
  }

  async fn update(&self, campus: &Campus) -> Result<()> {
    let id = campus.id().ok_or(Error::NotPersisted)?.0;
    let name    = campus.name().to_owned();
    let key     = campus.name_key();
    let address = campus.address().clone();
    let phones: Vec<PhoneNumber> = campus.phone_numbers().iter().cloned().collect();

    let found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE campuses
           SET naam = ?1, naamkey = ?2, straat = ?3, huisnr = ?4,
               postcode = ?5, gemeente = ?6
           WHERE id = ?7",
          rusqlite::params![
            name,
            key,
            address.street,
            address.house_number,
            address.postal_code,
            address.municipality,
            id,
          ],
        )?;
        if changed == 0 {
          return Ok(false);
        }
        // The phone numbers are a value collection: replaced wholesale.
        tx.execute(
          "DELETE FROM campussentelefoonnrs WHERE campusid = ?1",
          rusqlite::params![id],
        )?;
        insert_phone_numbers(&tx, id, &phones)?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !found {
      return Err(Error::CampusNotFound(campus.name().to_owned()));
    }
    tracing::debug!(campus = campus.name(), id, "campus updated");
    Ok(())
  }
}
