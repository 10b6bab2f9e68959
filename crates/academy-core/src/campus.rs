//! Campus — a training location and the inverse side of the
//! campus/instructor association.
//!
//! The instructor row owns the association (it carries the foreign key).
//! The roster kept here mirrors it, and [`Campus::add_instructor`] is the one
//! place where both sides are changed together.

use std::{
  collections::BTreeSet,
  hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  instructor::{CampusRef, Instructor},
  value::{Address, PhoneNumber},
};

/// Store-assigned surrogate key.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CampusId(pub i64);

/// The case-folded form of a campus name. Two campuses with the same key are
/// the same campus, and stores keep the key unique.
pub fn name_key(name: &str) -> String { name.to_uppercase() }

/// One line of a campus roster.
///
/// Ordered by first name, then last name; the lowercase email address breaks
/// ties and is what makes two entries the same instructor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RosterEntry {
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
}

impl RosterEntry {
  pub fn of(instructor: &Instructor) -> Self {
    Self {
      first_name: instructor.first_name().to_owned(),
      last_name:  instructor.last_name().to_owned(),
      email:      instructor.email_key(),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Campus {
  id:            Option<CampusId>,
  name:          String,
  address:       Address,
  phone_numbers: BTreeSet<PhoneNumber>,
  instructors:   BTreeSet<RosterEntry>,
}

impl Campus {
  pub fn new(name: impl Into<String>, address: Address) -> Self {
    Self {
      id: None,
      name: name.into(),
      address,
      phone_numbers: BTreeSet::new(),
      instructors: BTreeSet::new(),
    }
  }

  /// Rebuild a persisted campus. Used by storage backends.
  pub fn from_parts(
    id: CampusId,
    name: String,
    address: Address,
    phone_numbers: BTreeSet<PhoneNumber>,
    instructors: BTreeSet<RosterEntry>,
  ) -> Self {
    Self { id: Some(id), name, address, phone_numbers, instructors }
  }

  pub fn id(&self) -> Option<CampusId> { self.id }

  /// Record the store-assigned id. An id, once set, is never replaced.
  pub fn assign_id(&mut self, id: CampusId) {
    self.id.get_or_insert(id);
  }

  pub fn name(&self) -> &str { &self.name }

  pub fn name_key(&self) -> String { name_key(&self.name) }

  pub fn address(&self) -> &Address { &self.address }

  pub fn phone_numbers(&self) -> &BTreeSet<PhoneNumber> { &self.phone_numbers }

  pub fn add_phone_number(&mut self, phone: PhoneNumber) -> bool {
    self.phone_numbers.insert(phone)
  }

  pub fn remove_phone_number(&mut self, phone: &PhoneNumber) -> bool {
    self.phone_numbers.remove(phone)
  }

  /// The roster, ordered by first and last name.
  pub fn instructors(&self) -> &BTreeSet<RosterEntry> { &self.instructors }

  pub fn has_instructor(&self, instructor: &Instructor) -> bool {
    self.instructors.contains(&RosterEntry::of(instructor))
  }

  /// Whether `name` names this campus, ignoring case.
  pub fn is_named(&self, name: &str) -> bool {
    name_key(name) == self.name_key()
  }

  /// Attach `instructor` to this campus.
  ///
  /// Returns whether the roster changed. When the instructor currently
  /// belongs to a different campus, that campus must be passed as `previous`:
  /// it loses the instructor in the same call. Anything else fails with
  /// [`Error::PreviousCampusRequired`] and changes nothing.
  pub fn add_instructor(
    &mut self,
    instructor: &mut Instructor,
    previous: Option<&mut Campus>,
  ) -> Result<bool> {
    let moving_from = instructor
      .campus()
      .filter(|current| !self.is_named(current.name()))
      .map(|current| current.name().to_owned());

    let previous = match moving_from {
      None => None,
      Some(name) => match previous {
        Some(p) if p.is_named(&name) => Some(p),
        _ => return Err(Error::PreviousCampusRequired(name)),
      },
    };

    Ok(self.attach(instructor, previous))
  }

  pub(crate) fn attach(
    &mut self,
    instructor: &mut Instructor,
    previous: Option<&mut Campus>,
  ) -> bool {
    let entry = RosterEntry::of(instructor);
    let added = self.instructors.insert(entry.clone());

    if let Some(previous) = previous {
      previous.instructors.remove(&entry);
    }

    let already_here =
      instructor.campus().is_some_and(|c| self.is_named(c.name()));
    if !already_here {
      instructor.set_campus(CampusRef::to(self));
    }

    added
  }
}

impl PartialEq for Campus {
  fn eq(&self, other: &Self) -> bool {
    self.name_key() == other.name_key()
  }
}

impl Eq for Campus {}

impl Hash for Campus {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.name_key().hash(state);
  }
}

#[cfg(test)]
mod tests {
  use std::{
    collections::{HashSet, hash_map::DefaultHasher},
    hash::{Hash, Hasher},
  };

  use rust_decimal::Decimal;

  use super::*;
  use crate::value::Gender;

  fn campus(name: &str) -> Campus {
    Campus::new(name, Address::new("Straat", "1", "9000", "Gent"))
  }

  fn instructor(first: &str, email: &str, campus: &mut Campus) -> Instructor {
    Instructor::new(
      first,
      "Peeters",
      Decimal::from(2000),
      email,
      Gender::Woman,
      campus,
    )
  }

  fn hash_of(c: &Campus) -> u64 {
    let mut h = DefaultHasher::new();
    c.hash(&mut h);
    h.finish()
  }

  #[test]
  fn names_compare_case_insensitively() {
    let a = campus("Gent");
    let b = Campus::new("GENT", Address::new("Elders", "99", "1000", "Brussel"));
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));

    let set: HashSet<_> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
  }

  #[test]
  fn accented_names_compare_case_insensitively() {
    let a = campus("évora");
    let b = campus("ÉVORA");
    assert_eq!(a, b);
    assert_eq!(a.name_key(), "ÉVORA");
    assert!(a.is_named("Évora"));
  }

  #[test]
  fn different_names_are_different_campuses() {
    assert_ne!(campus("Gent"), campus("Brugge"));
  }

  #[test]
  fn equality_ignores_id_and_contents() {
    let mut a = campus("Gent");
    a.assign_id(CampusId(1));
    a.add_phone_number(PhoneNumber::voice("09 123 45 67"));
    let mut b = campus("gent");
    b.assign_id(CampusId(2));
    assert_eq!(a, b);
  }

  #[test]
  fn assigned_id_is_never_replaced() {
    let mut a = campus("Gent");
    a.assign_id(CampusId(7));
    a.assign_id(CampusId(8));
    assert_eq!(a.id(), Some(CampusId(7)));
  }

  #[test]
  fn construction_attaches_instructor() {
    let mut gent = campus("Gent");
    let d = instructor("Ann", "ann@academy.be", &mut gent);

    assert!(gent.has_instructor(&d));
    assert_eq!(d.campus().map(|c| c.name()), Some("Gent"));
  }

  #[test]
  fn moving_updates_both_campuses() {
    let mut gent = campus("Gent");
    let mut brugge = campus("Brugge");
    let mut d = instructor("Ann", "ann@academy.be", &mut gent);

    let added = brugge.add_instructor(&mut d, Some(&mut gent)).unwrap();

    assert!(added);
    assert!(!gent.has_instructor(&d));
    assert!(brugge.has_instructor(&d));
    assert_eq!(d.campus().map(|c| c.name()), Some("Brugge"));
  }

  #[test]
  fn readding_is_a_noop() {
    let mut gent = campus("Gent");
    let mut d = instructor("Ann", "ann@academy.be", &mut gent);

    assert!(!gent.add_instructor(&mut d, None).unwrap());
    assert_eq!(gent.instructors().len(), 1);
  }

  #[test]
  fn readding_under_other_casing_is_a_noop() {
    let mut gent = campus("Gent");
    let mut d = instructor("Ann", "ann@academy.be", &mut gent);
    let mut shouting = campus("GENT");

    // Same campus by equality: nothing to detach from.
    shouting.add_instructor(&mut d, None).unwrap();
    assert_eq!(d.campus().map(|c| c.name()), Some("Gent"));
  }

  #[test]
  fn moving_without_previous_campus_fails_and_changes_nothing() {
    let mut gent = campus("Gent");
    let mut brugge = campus("Brugge");
    let mut d = instructor("Ann", "ann@academy.be", &mut gent);

    let err = brugge.add_instructor(&mut d, None).unwrap_err();
    assert!(matches!(err, Error::PreviousCampusRequired(ref n) if n == "Gent"));
    assert!(brugge.instructors().is_empty());
    assert!(gent.has_instructor(&d));
    assert_eq!(d.campus().map(|c| c.name()), Some("Gent"));
  }

  #[test]
  fn moving_with_wrong_previous_campus_fails() {
    let mut gent = campus("Gent");
    let mut brugge = campus("Brugge");
    let mut leuven = campus("Leuven");
    let mut d = instructor("Ann", "ann@academy.be", &mut gent);

    assert!(brugge.add_instructor(&mut d, Some(&mut leuven)).is_err());
  }

  #[test]
  fn roster_is_ordered_by_first_then_last_name() {
    let mut gent = campus("Gent");
    Instructor::new(
      "Bart",
      "Aerts",
      Decimal::from(1500),
      "bart@academy.be",
      Gender::Man,
      &mut gent,
    );
    instructor("Ann", "ann@academy.be", &mut gent);
    Instructor::new(
      "Ann",
      "Claes",
      Decimal::from(1500),
      "ann.claes@academy.be",
      Gender::Woman,
      &mut gent,
    );

    let names: Vec<_> = gent
      .instructors()
      .iter()
      .map(|e| format!("{} {}", e.first_name, e.last_name))
      .collect();
    assert_eq!(names, vec!["Ann Claes", "Ann Peeters", "Bart Aerts"]);
  }
}
