//! Shared PostgreSQL harness for repository and HTTP tests.
//!
//! Tests run against the database named by `TEST_DATABASE_URL` inside a
//! Diesel test transaction, so nothing they write survives. Without the
//! variable the tests return early.

#![allow(dead_code)]

use std::sync::{Mutex, MutexGuard, OnceLock};

use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, Pool};
use diesel::PgConnection;
use medirecords::db::{self, DbPool};
use medirecords::models::{AppointmentFields, Patient, PatientFields};
use medirecords::repository::PatientRepository;

static SCHEMA: OnceLock<()> = OnceLock::new();
static SERIAL: Mutex<()> = Mutex::new(());

/// One test's view of the database: an open test transaction on emptied
/// tables, held exclusively for the duration of the test.
pub struct TestDb {
    conn: PgConnection,
    _guard: MutexGuard<'static, ()>,
}

// Takes the test lock and makes sure the tables exist.
fn prepare() -> Option<(String, MutexGuard<'static, ()>)> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping database test");
        return None;
    };

    let guard = SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    SCHEMA.get_or_init(|| {
        let mut conn = PgConnection::establish(&url).expect("connect to test database");
        db::ensure_schema(&mut conn).expect("create schema");
    });

    Some((url, guard))
}

fn isolate(conn: &mut PgConnection) -> QueryResult<()> {
    conn.begin_test_transaction()?;
    diesel::sql_query("DELETE FROM appointments").execute(conn)?;
    diesel::sql_query("DELETE FROM patients").execute(conn)?;
    Ok(())
}

impl TestDb {
    pub fn connect() -> Option<Self> {
        let (url, guard) = prepare()?;

        let mut conn = PgConnection::establish(&url).expect("connect to test database");
        isolate(&mut conn).expect("open test transaction");

        Some(Self {
            conn,
            _guard: guard,
        })
    }

    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.conn
    }
}

#[derive(Debug)]
struct Isolated;

impl CustomizeConnection<PgConnection, r2d2::Error> for Isolated {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), r2d2::Error> {
        isolate(conn).map_err(r2d2::Error::QueryError)
    }
}

/// A single-connection pool for driving the HTTP handlers, its one
/// connection inside a test transaction on emptied tables.
///
/// A statement that fails leaves that transaction aborted, so a test should
/// make its failing request last.
pub struct TestPool {
    pool: DbPool,
    _guard: MutexGuard<'static, ()>,
}

impl TestPool {
    pub fn connect() -> Option<Self> {
        let (url, guard) = prepare()?;

        let pool = Pool::builder()
            .max_size(1)
            .connection_customizer(Box::new(Isolated))
            .build(ConnectionManager::<PgConnection>::new(url))
            .expect("build test pool");

        Some(Self {
            pool,
            _guard: guard,
        })
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

pub fn alice() -> PatientFields {
    PatientFields::new(
        "Alice",
        Some(30),
        Some("555-1111".into()),
        Some("a@x.com".into()),
        Some("1 Main St".into()),
    )
}

pub fn insert_patient(conn: &mut PgConnection, name: &str) -> Patient {
    let fields = PatientFields::new(name, Some(40), Some("555-0000".into()), None, None);
    PatientRepository::insert(conn, &fields).expect("insert patient")
}

pub fn checkup(patient_id: i32, doctor: &str, hour: u32) -> AppointmentFields {
    AppointmentFields::new(
        patient_id,
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        NaiveTime::from_hms_opt(hour, 30, 0).unwrap(),
        Some(doctor.into()),
        Some("checkup".into()),
    )
}
