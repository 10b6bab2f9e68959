//! Subcommands and their handlers.
//!
//! Each handler works through one [`Session`] and the repository traits; the
//! binary never issues SQL itself.

use academy_core::{
  campus::Campus,
  course::{Course, CourseId, CourseKind},
  instructor::{Instructor, InstructorId},
  repository::{CampusRepository, CourseRepository, InstructorRepository},
  service::InstructorService,
  value::{Address, Gender, Percentage, PhoneNumber},
};
use academy_store_sqlite::Session;
use anyhow::{Context as _, anyhow};
use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

// ─── Command tree ─────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum Command {
  #[command(subcommand)]
  Campus(CampusCommand),
  #[command(subcommand)]
  Instructor(InstructorCommand),
  #[command(subcommand)]
  Course(CourseCommand),
}

#[derive(Subcommand, Debug)]
pub enum CampusCommand {
  /// Store a new campus.
  Add {
    #[arg(long)]
    name:         String,
    #[arg(long)]
    street:       String,
    #[arg(long)]
    number:       String,
    #[arg(long)]
    postal_code:  String,
    #[arg(long)]
    municipality: String,
    /// Voice line; may be repeated.
    #[arg(long = "phone")]
    phones:       Vec<String>,
    /// Fax line; may be repeated.
    #[arg(long = "fax")]
    faxes:        Vec<String>,
  },
  /// List all campuses.
  List,
  /// Show one campus with its phone numbers and roster.
  Show {
    #[arg(long)]
    name: String,
  },
  /// Add or remove a phone number of a campus.
  Phone {
    #[arg(long)]
    name:   String,
    #[arg(long)]
    number: String,
    #[arg(long)]
    fax:    bool,
    #[arg(long)]
    remark: Option<String>,
    #[arg(long)]
    remove: bool,
  },
}

#[derive(Subcommand, Debug)]
pub enum InstructorCommand {
  /// Store a new instructor on an existing campus.
  Add {
    #[arg(long)]
    first:  String,
    #[arg(long)]
    last:   String,
    #[arg(long)]
    salary: Decimal,
    #[arg(long)]
    email:  String,
    #[arg(long, value_enum)]
    gender: GenderArg,
    /// Campus name.
    #[arg(long)]
    campus: String,
  },
  /// List instructors by salary, optionally within an inclusive range.
  List {
    #[arg(long, requires = "max")]
    min: Option<Decimal>,
    #[arg(long, requires = "min")]
    max: Option<Decimal>,
  },
  /// Ids and email addresses of every instructor.
  Emails,
  /// Highest salary and head count per salary.
  Stats,
  /// Raise one instructor's salary.
  Raise {
    #[arg(long)]
    id:         i64,
    #[arg(long)]
    percentage: Decimal,
  },
  /// Raise every instructor's salary.
  GeneralRaise {
    #[arg(long)]
    percentage: Decimal,
  },
  /// Move an instructor to another campus.
  Move {
    #[arg(long)]
    id:     i64,
    #[arg(long)]
    campus: String,
  },
  /// Add or remove a nickname.
  Nickname {
    #[arg(long)]
    id:     i64,
    #[arg(long)]
    name:   String,
    #[arg(long)]
    remove: bool,
  },
  Delete {
    #[arg(long)]
    id: i64,
  },
}

#[derive(Subcommand, Debug)]
pub enum CourseCommand {
  /// Store a group course running from START through END.
  AddGroup {
    #[arg(long)]
    name:  String,
    #[arg(long)]
    start: NaiveDate,
    #[arg(long)]
    end:   NaiveDate,
  },
  /// Store an individual course lasting DAYS days.
  AddIndividual {
    #[arg(long)]
    name: String,
    #[arg(long)]
    days: u32,
  },
  List,
  Show {
    #[arg(long)]
    id: Uuid,
  },
  Delete {
    #[arg(long)]
    id: Uuid,
  },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum GenderArg {
  Man,
  Woman,
}

impl From<GenderArg> for Gender {
  fn from(g: GenderArg) -> Self {
    match g {
      GenderArg::Man => Gender::Man,
      GenderArg::Woman => Gender::Woman,
    }
  }
}

// ─── Output ───────────────────────────────────────────────────────────────────

pub struct Printer {
  pub json: bool,
}

impl Printer {
  fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
    if self.json {
      println!("{}", serde_json::to_string_pretty(value)?);
    } else {
      println!("{}", human(value));
    }
    Ok(())
  }
}

fn instructor_line(d: &Instructor) -> String {
  let id = d.id().map(|id| id.0.to_string()).unwrap_or_else(|| "-".into());
  let campus = d.campus().map(|c| c.name()).unwrap_or("-");
  format!(
    "{id:>4}  {:<12} {:<16} {:>10}  {:<28} {campus}",
    d.first_name(),
    d.last_name(),
    d.salary(),
    d.email(),
  )
}

fn course_line(c: &Course) -> String {
  match c.kind() {
    CourseKind::Group { start, end } => {
      format!("{}  {:<24} group      {start} .. {end}", c.id(), c.name())
    }
    CourseKind::Individual { duration_days } => {
      format!("{}  {:<24} individual {duration_days} days", c.id(), c.name())
    }
  }
}

fn percentage(value: Decimal) -> anyhow::Result<Percentage> {
  Ok(Percentage::new(value)?)
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

pub async fn run(session: &Session, command: Command, out: Printer) -> anyhow::Result<()> {
  match command {
    Command::Campus(cmd) => campus(session, cmd, &out).await,
    Command::Instructor(cmd) => instructor(session, cmd, &out).await,
    Command::Course(cmd) => course(session, cmd, &out).await,
  }
}

async fn find_campus(session: &Session, name: &str) -> anyhow::Result<Campus> {
  session
    .find_by_name(name)
    .await?
    .ok_or_else(|| anyhow!("no campus named {name:?}"))
}

async fn find_instructor(session: &Session, id: i64) -> anyhow::Result<Instructor> {
  InstructorRepository::find_by_id(session, InstructorId(id))
    .await?
    .ok_or_else(|| anyhow!("no instructor with id {id}"))
}

async fn campus(session: &Session, cmd: CampusCommand, out: &Printer) -> anyhow::Result<()> {
  match cmd {
    CampusCommand::Add { name, street, number, postal_code, municipality, phones, faxes } => {
      let mut campus =
        Campus::new(name, Address::new(street, number, postal_code, municipality));
      for phone in phones {
        campus.add_phone_number(PhoneNumber::voice(phone));
      }
      for fax in faxes {
        campus.add_phone_number(PhoneNumber::fax(fax));
      }
      CampusRepository::create(session, &mut campus)
        .await
        .context("failed to store campus")?;
      out.emit(&campus, |c| format!("stored campus {} ({:?})", c.name(), c.id()))
    }
    CampusCommand::List => {
      let campuses = CampusRepository::find_all(session).await?;
      out.emit(&campuses, |cs| {
        cs.iter()
          .map(|c| {
            format!(
              "{:<16} {} {}, {} {}  ({} instructors)",
              c.name(),
              c.address().street,
              c.address().house_number,
              c.address().postal_code,
              c.address().municipality,
              c.instructors().len(),
            )
          })
          .collect::<Vec<_>>()
          .join("\n")
      })
    }
    CampusCommand::Show { name } => {
      let campus = find_campus(session, &name).await?;
      out.emit(&campus, |c| {
        let mut lines = vec![c.name().to_owned()];
        for phone in c.phone_numbers() {
          let kind = if phone.fax { "fax" } else { "tel" };
          lines.push(format!("  {kind} {}", phone.number));
        }
        for entry in c.instructors() {
          lines.push(format!("  {} {} <{}>", entry.first_name, entry.last_name, entry.email));
        }
        lines.join("\n")
      })
    }
    CampusCommand::Phone { name, number, fax, remark, remove } => {
      let mut campus = find_campus(session, &name).await?;
      let phone = PhoneNumber { number, fax, remark };
      let changed = if remove {
        campus.remove_phone_number(&phone)
      } else {
        campus.add_phone_number(phone)
      };
      if changed {
        CampusRepository::update(session, &campus)
          .await
          .context("failed to store campus")?;
      }
      out.emit(campus.phone_numbers(), |ps| {
        ps.iter().map(|p| p.number.clone()).collect::<Vec<_>>().join(", ")
      })
    }
  }
}

async fn instructor(
  session: &Session,
  cmd: InstructorCommand,
  out: &Printer,
) -> anyhow::Result<()> {
  match cmd {
    InstructorCommand::Add { first, last, salary, email, gender, campus } => {
      let mut campus = find_campus(session, &campus).await?;
      let mut instructor =
        Instructor::new(first, last, salary, email, gender.into(), &mut campus);
      InstructorRepository::create(session, &mut instructor)
        .await
        .context("failed to store instructor")?;
      out.emit(&instructor, instructor_line)
    }
    InstructorCommand::List { min, max } => {
      let instructors = match (min, max) {
        (Some(low), Some(high)) => session.find_by_salary_between(low, high).await?,
        _ => InstructorRepository::find_all(session).await?,
      };
      out.emit(&instructors, |ds| {
        ds.iter().map(instructor_line).collect::<Vec<_>>().join("\n")
      })
    }
    InstructorCommand::Emails => {
      let pairs = session.find_ids_and_email_addresses().await?;
      out.emit(&pairs, |ps| {
        ps.iter()
          .map(|p| format!("{:>4}  {}", p.id.0, p.email))
          .collect::<Vec<_>>()
          .join("\n")
      })
    }
    InstructorCommand::Stats => {
      #[derive(Serialize)]
      struct Stats {
        max_salary: Option<Decimal>,
        per_salary: Vec<academy_core::repository::SalaryCount>,
      }
      let stats = Stats {
        max_salary: session.find_max_salary().await?,
        per_salary: session.find_count_per_salary().await?,
      };
      out.emit(&stats, |s| {
        let mut lines = vec![match s.max_salary {
          Some(max) => format!("highest salary: {max}"),
          None => "no instructors".to_owned(),
        }];
        for row in &s.per_salary {
          lines.push(format!("{:>10}  x{}", row.salary, row.count));
        }
        lines.join("\n")
      })
    }
    InstructorCommand::Raise { id, percentage: pct } => {
      let pct = percentage(pct)?;
      let raised = InstructorService::new(session)
        .raise(InstructorId(id), &pct)
        .await?;
      out.emit(&raised, instructor_line)
    }
    InstructorCommand::GeneralRaise { percentage: pct } => {
      let pct = percentage(pct)?;
      let touched = session.general_raise(&pct).await?;
      out.emit(&touched, |n| format!("raised {n} salaries by {pct}"))
    }
    InstructorCommand::Move { id, campus } => {
      let mut instructor = find_instructor(session, id).await?;
      let mut current = session.load_campus(&instructor).await?;
      let mut target = find_campus(session, &campus).await?;
      target.add_instructor(&mut instructor, Some(&mut current))?;
      InstructorRepository::update(session, &instructor).await?;
      out.emit(&instructor, instructor_line)
    }
    InstructorCommand::Nickname { id, name, remove } => {
      let mut instructor = find_instructor(session, id).await?;
      let changed = if remove {
        instructor.remove_nickname(&name)
      } else {
        instructor.add_nickname(name)
      };
      if changed {
        InstructorRepository::update(session, &instructor).await?;
      }
      out.emit(instructor.nicknames(), |ns| {
        ns.iter().cloned().collect::<Vec<_>>().join(", ")
      })
    }
    InstructorCommand::Delete { id } => {
      InstructorRepository::delete(session, InstructorId(id)).await?;
      out.emit(&id, |id| format!("deleted instructor {id} (if it existed)"))
    }
  }
}

async fn course(session: &Session, cmd: CourseCommand, out: &Printer) -> anyhow::Result<()> {
  match cmd {
    CourseCommand::AddGroup { name, start, end } => {
      let course = Course::group(name, start, end)?;
      CourseRepository::create(session, &course).await?;
      out.emit(&course, course_line)
    }
    CourseCommand::AddIndividual { name, days } => {
      let course = Course::individual(name, days)?;
      CourseRepository::create(session, &course).await?;
      out.emit(&course, course_line)
    }
    CourseCommand::List => {
      let courses = CourseRepository::find_all(session).await?;
      out.emit(&courses, |cs| cs.iter().map(course_line).collect::<Vec<_>>().join("\n"))
    }
    CourseCommand::Show { id } => {
      let course = CourseRepository::find_by_id(session, CourseId::from(id))
        .await?
        .ok_or_else(|| anyhow!("no course with id {id}"))?;
      out.emit(&course, course_line)
    }
    CourseCommand::Delete { id } => {
      CourseRepository::delete(session, CourseId::from(id)).await?;
      out.emit(&id, |id| format!("deleted course {id} (if it existed)"))
    }
  }
}

#[cfg(test)]
mod tests {
  use academy_store_sqlite::SqliteStore;

  use super::*;

  async fn session() -> Session {
    SqliteStore::open_in_memory()
      .await
      .expect("in-memory store")
      .session()
  }

  fn json() -> Printer { Printer { json: true } }

  fn add_campus(name: &str) -> Command {
    Command::Campus(CampusCommand::Add {
      name:         name.into(),
      street:       "Straat".into(),
      number:       "1".into(),
      postal_code:  "9000".into(),
      municipality: "Gent".into(),
      phones:       vec!["09 111 11 11".into()],
      faxes:        Vec::new(),
    })
  }

  fn add_instructor(campus: &str) -> Command {
    Command::Instructor(InstructorCommand::Add {
      first:  "Ann".into(),
      last:   "Peeters".into(),
      salary: Decimal::from(2400),
      email:  "ann@academy.be".into(),
      gender: GenderArg::Woman,
      campus: campus.into(),
    })
  }

  fn nickname(name: &str, remove: bool) -> Command {
    Command::Instructor(InstructorCommand::Nickname { id: 1, name: name.into(), remove })
  }

  #[tokio::test]
  async fn move_updates_instructor_and_both_rosters() {
    let s = session().await;
    run(&s, add_campus("Gent"), json()).await.unwrap();
    run(&s, add_campus("Brugge"), json()).await.unwrap();
    run(&s, add_instructor("Gent"), json()).await.unwrap();

    let to_brugge =
      Command::Instructor(InstructorCommand::Move { id: 1, campus: "brugge".into() });
    run(&s, to_brugge, json()).await.unwrap();

    let moved = find_instructor(&s, 1).await.unwrap();
    assert_eq!(moved.campus().map(|c| c.name()), Some("Brugge"));
    assert!(find_campus(&s, "Gent").await.unwrap().instructors().is_empty());
    assert_eq!(find_campus(&s, "Brugge").await.unwrap().instructors().len(), 1);
  }

  #[tokio::test]
  async fn move_to_unknown_campus_changes_nothing() {
    let s = session().await;
    run(&s, add_campus("Gent"), json()).await.unwrap();
    run(&s, add_instructor("Gent"), json()).await.unwrap();

    let to_nowhere =
      Command::Instructor(InstructorCommand::Move { id: 1, campus: "Antwerpen".into() });
    assert!(run(&s, to_nowhere, json()).await.is_err());

    let stayed = find_instructor(&s, 1).await.unwrap();
    assert_eq!(stayed.campus().map(|c| c.name()), Some("Gent"));
  }

  #[tokio::test]
  async fn nickname_add_and_remove() {
    let s = session().await;
    run(&s, add_campus("Gent"), json()).await.unwrap();
    run(&s, add_instructor("Gent"), json()).await.unwrap();

    run(&s, nickname("Annie", false), json()).await.unwrap();
    run(&s, nickname("Annie", false), json()).await.unwrap();
    run(&s, nickname("Nan", false), json()).await.unwrap();
    let names: Vec<_> =
      find_instructor(&s, 1).await.unwrap().nicknames().iter().cloned().collect();
    assert_eq!(names, vec!["Annie", "Nan"]);

    run(&s, nickname("Annie", true), json()).await.unwrap();
    let names: Vec<_> =
      find_instructor(&s, 1).await.unwrap().nicknames().iter().cloned().collect();
    assert_eq!(names, vec!["Nan"]);
  }

  #[tokio::test]
  async fn nickname_of_unknown_instructor_fails() {
    let s = session().await;
    assert!(run(&s, nickname("Annie", false), json()).await.is_err());
  }

  #[tokio::test]
  async fn phone_numbers_are_stored_after_creation() {
    let s = session().await;
    run(&s, add_campus("Gent"), json()).await.unwrap();

    let fax = Command::Campus(CampusCommand::Phone {
      name:   "gent".into(),
      number: "09 222 22 22".into(),
      fax:    true,
      remark: None,
      remove: false,
    });
    run(&s, fax, json()).await.unwrap();
    assert_eq!(find_campus(&s, "Gent").await.unwrap().phone_numbers().len(), 2);

    let drop_voice = Command::Campus(CampusCommand::Phone {
      name:   "Gent".into(),
      number: "09 111 11 11".into(),
      fax:    false,
      remark: None,
      remove: true,
    });
    run(&s, drop_voice, json()).await.unwrap();
    let gent = find_campus(&s, "Gent").await.unwrap();
    let phones: Vec<_> = gent.phone_numbers().iter().cloned().collect();
    assert_eq!(phones, vec![PhoneNumber::fax("09 222 22 22")]);
  }
}
