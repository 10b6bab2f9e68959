//! SQL schema for the academy SQLite store.
//!
//! Executed once at connection startup. Salaries are stored as whole
//! hundredths so that ordering, ranges and aggregates stay exact. Campus names
//! and email addresses are unique on a case-folded key column filled by the
//! repositories, since `NOCASE` only folds ASCII.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS campuses (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    naam      TEXT NOT NULL COLLATE NOCASE,
    naamkey   TEXT NOT NULL UNIQUE,   -- uppercased naam
    straat    TEXT NOT NULL,
    huisnr    TEXT NOT NULL,
    postcode  TEXT NOT NULL,
    gemeente  TEXT NOT NULL
);

-- Value collection of a campus; no identity of its own.
CREATE TABLE IF NOT EXISTS campussentelefoonnrs (
    campusid  INTEGER NOT NULL REFERENCES campuses(id) ON DELETE CASCADE,
    nummer    TEXT NOT NULL,
    fax       INTEGER NOT NULL,   -- 0 | 1
    opmerking TEXT,
    UNIQUE (campusid, fax, nummer)
);

CREATE TABLE IF NOT EXISTS docenten (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    voornaam    TEXT NOT NULL,
    familienaam TEXT NOT NULL,
    wedde       INTEGER NOT NULL,   -- hundredths
    emailadres  TEXT NOT NULL,
    emailkey    TEXT NOT NULL UNIQUE,   -- lowercased emailadres
    geslacht    TEXT NOT NULL CHECK (geslacht IN ('M', 'V')),
    campusid    INTEGER NOT NULL REFERENCES campuses(id)
);

CREATE TABLE IF NOT EXISTS docentenbijnamen (
    docentid  INTEGER NOT NULL REFERENCES docenten(id) ON DELETE CASCADE,
    bijnaam   TEXT NOT NULL,
    PRIMARY KEY (docentid, bijnaam)
);

-- One table per course variant; ids are 16-byte UUIDs chosen by the client.
CREATE TABLE IF NOT EXISTS groepscursussen (
    id    BLOB PRIMARY KEY CHECK (length(id) = 16),
    naam  TEXT NOT NULL,
    van   TEXT NOT NULL,   -- YYYY-MM-DD
    tot   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS individuelecursussen (
    id        BLOB PRIMARY KEY CHECK (length(id) = 16),
    naam      TEXT NOT NULL,
    duurtijd  INTEGER NOT NULL CHECK (duurtijd > 0)
);

CREATE INDEX IF NOT EXISTS docenten_wedde_idx  ON docenten(wedde);
CREATE INDEX IF NOT EXISTS docenten_campus_idx ON docenten(campusid);

PRAGMA user_version = 2;
";
