//! Connection provider and schema initializer.
//!
//! The process talks to PostgreSQL over exactly one connection: either a
//! bare [`PgConnection`] from [`open`], or a pool capped at one connection
//! from [`create_pool`] when the HTTP server needs to share it.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::error::{Result, StoreError};

/// Pool holding the single shared connection.
pub type DbPool = Pool<ConnectionManager<PgConnection>>;

const CREATE_PATIENTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS patients (
        patient_id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        age INT,
        contact_number VARCHAR(15),
        address VARCHAR(255),
        date_added TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        email VARCHAR(255)
    )";

const CREATE_APPOINTMENTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS appointments (
        appointment_id SERIAL PRIMARY KEY,
        patient_id INT NOT NULL REFERENCES patients (patient_id),
        appointment_date DATE NOT NULL,
        appointment_time TIME(0) NOT NULL,
        doctor_name VARCHAR(255),
        notes TEXT
    )";

fn database_url(config: &DatabaseConfig) -> Result<String> {
    config
        .database_url()
        .map_err(|e| StoreError::Connection(e.to_string()))
}

/// Open a single connection using the configured parameters.
///
/// # Errors
/// Returns [`StoreError::Connection`] if the server is unreachable or
/// rejects the credentials.
pub fn open(config: &DatabaseConfig) -> Result<PgConnection> {
    let url = database_url(config)?;
    let conn = PgConnection::establish(&url)?;
    info!(host = %config.host, port = config.port, database = %config.database, "database connection established");
    Ok(conn)
}

/// Create a pool that never holds more than one connection.
///
/// The connection is established eagerly, so an unreachable database fails
/// here rather than on the first request.
///
/// # Errors
/// Returns [`StoreError::Connection`] if the connection cannot be established.
pub fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url(config)?);
    let pool = Pool::builder().max_size(1).build(manager)?;
    info!(host = %config.host, port = config.port, database = %config.database, "database pool ready");
    Ok(pool)
}

/// Create the `patients` table if it does not exist yet.
pub fn ensure_patients_table(conn: &mut PgConnection) -> Result<()> {
    diesel::sql_query(CREATE_PATIENTS_TABLE).execute(conn)?;
    debug!("patients table ensured");
    Ok(())
}

/// Create the `appointments` table if it does not exist yet.
///
/// Requires `patients` to exist because of the foreign key on `patient_id`.
pub fn ensure_appointments_table(conn: &mut PgConnection) -> Result<()> {
    diesel::sql_query(CREATE_APPOINTMENTS_TABLE).execute(conn)?;
    debug!("appointments table ensured");
    Ok(())
}

/// Create both tables in dependency order. Safe to call repeatedly.
pub fn ensure_schema(conn: &mut PgConnection) -> Result<()> {
    ensure_patients_table(conn)?;
    ensure_appointments_table(conn)?;
    info!("database schema ready");
    Ok(())
}
