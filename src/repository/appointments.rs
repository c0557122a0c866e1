use diesel::PgConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{Appointment, AppointmentFields};
use crate::schema::appointments;

pub struct AppointmentRepository;

impl AppointmentRepository {
    /// Insert an appointment for an existing patient.
    ///
    /// An unknown `patient_id` violates the foreign key and nothing is
    /// written.
    pub fn insert(conn: &mut PgConnection, fields: &AppointmentFields) -> Result<Appointment> {
        let appointment = diesel::insert_into(appointments::table)
            .values(fields)
            .returning(Appointment::as_returning())
            .get_result(conn)?;
        info!(
            appointment_id = appointment.id,
            patient_id = appointment.patient_id,
            date = %appointment.date_label(),
            time = %appointment.time_label(),
            "appointment record inserted"
        );
        Ok(appointment)
    }

    pub fn fetch_all(conn: &mut PgConnection) -> Result<Vec<Appointment>> {
        let rows = appointments::table
            .order(appointments::appointment_id.asc())
            .select(Appointment::as_select())
            .load(conn)?;
        Ok(rows)
    }

    pub fn fetch_by_id(conn: &mut PgConnection, id: i32) -> Result<Option<Appointment>> {
        let row = appointments::table
            .find(id)
            .select(Appointment::as_select())
            .first(conn)
            .optional()?;
        Ok(row)
    }

    /// The earliest-created appointment for the patient, ignoring any others.
    /// Use [`Self::list_by_patient_id`] to see all of them.
    pub fn fetch_by_patient_id(
        conn: &mut PgConnection,
        patient_id: i32,
    ) -> Result<Option<Appointment>> {
        let row = appointments::table
            .filter(appointments::patient_id.eq(patient_id))
            .order(appointments::appointment_id.asc())
            .select(Appointment::as_select())
            .first(conn)
            .optional()?;
        Ok(row)
    }

    /// The earliest-created appointment with this doctor, ignoring any others.
    /// Use [`Self::list_by_doctor_name`] to see all of them.
    pub fn fetch_by_doctor_name(
        conn: &mut PgConnection,
        doctor_name: &str,
    ) -> Result<Option<Appointment>> {
        let row = appointments::table
            .filter(appointments::doctor_name.eq(doctor_name))
            .order(appointments::appointment_id.asc())
            .select(Appointment::as_select())
            .first(conn)
            .optional()?;
        Ok(row)
    }

    pub fn list_by_patient_id(conn: &mut PgConnection, patient_id: i32) -> Result<Vec<Appointment>> {
        let rows = appointments::table
            .filter(appointments::patient_id.eq(patient_id))
            .order(appointments::appointment_id.asc())
            .select(Appointment::as_select())
            .load(conn)?;
        Ok(rows)
    }

    pub fn list_by_doctor_name(
        conn: &mut PgConnection,
        doctor_name: &str,
    ) -> Result<Vec<Appointment>> {
        let rows = appointments::table
            .filter(appointments::doctor_name.eq(doctor_name))
            .order(appointments::appointment_id.asc())
            .select(Appointment::as_select())
            .load(conn)?;
        Ok(rows)
    }

    /// Overwrite every writable field of the appointment with this id.
    ///
    /// Same contract as `PatientRepository::update`: zero rows for an unknown
    /// id, constraint error if the new `patient_id` does not exist.
    pub fn update(conn: &mut PgConnection, id: i32, fields: &AppointmentFields) -> Result<usize> {
        let updated = diesel::update(appointments::table.find(id))
            .set(fields)
            .execute(conn)?;
        if updated == 0 {
            debug!(appointment_id = id, "appointment update matched no row");
        } else {
            info!(appointment_id = id, "appointment record updated");
        }
        Ok(updated)
    }
}
