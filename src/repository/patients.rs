use diesel::PgConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{DeleteCriterion, Patient, PatientFields};
use crate::schema::patients;

pub struct PatientRepository;

impl PatientRepository {
    /// Insert a patient; the id and `date_added` come from the database.
    pub fn insert(conn: &mut PgConnection, fields: &PatientFields) -> Result<Patient> {
        let patient = diesel::insert_into(patients::table)
            .values(fields)
            .returning(Patient::as_returning())
            .get_result(conn)?;
        info!(patient_id = patient.id, "patient record inserted");
        Ok(patient)
    }

    /// All patients in insertion order.
    pub fn fetch_all(conn: &mut PgConnection) -> Result<Vec<Patient>> {
        let rows = patients::table
            .order(patients::patient_id.asc())
            .select(Patient::as_select())
            .load(conn)?;
        Ok(rows)
    }

    pub fn fetch_by_id(conn: &mut PgConnection, id: i32) -> Result<Option<Patient>> {
        let row = patients::table
            .find(id)
            .select(Patient::as_select())
            .first(conn)
            .optional()?;
        Ok(row)
    }

    /// First patient (lowest id) registered with this contact number.
    pub fn fetch_by_contact(conn: &mut PgConnection, contact: &str) -> Result<Option<Patient>> {
        let row = patients::table
            .filter(patients::contact_number.eq(contact))
            .order(patients::patient_id.asc())
            .select(Patient::as_select())
            .first(conn)
            .optional()?;
        Ok(row)
    }

    /// Overwrite every mutable field of the patient with this id.
    ///
    /// Returns the number of rows changed; an unknown id changes nothing and
    /// is not an error.
    pub fn update(conn: &mut PgConnection, id: i32, fields: &PatientFields) -> Result<usize> {
        let updated = diesel::update(patients::table.find(id))
            .set(fields)
            .execute(conn)?;
        if updated == 0 {
            debug!(patient_id = id, "patient update matched no row");
        } else {
            info!(patient_id = id, "patient record updated");
        }
        Ok(updated)
    }

    /// Delete every patient matching the criterion and return how many went.
    ///
    /// Deleting by name removes all patients sharing that name. A patient
    /// that still has appointments is protected by the foreign key and the
    /// delete fails with a constraint error.
    pub fn delete(conn: &mut PgConnection, criterion: &DeleteCriterion) -> Result<usize> {
        let deleted = match criterion {
            DeleteCriterion::Id(id) => diesel::delete(patients::table.find(*id)).execute(conn)?,
            DeleteCriterion::Name(name) => {
                diesel::delete(patients::table.filter(patients::name.eq(name))).execute(conn)?
            }
        };
        info!(?criterion, deleted, "patient records deleted");
        Ok(deleted)
    }
}
