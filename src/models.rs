use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{appointments, patients};

/// Format appointment dates are stored and rendered in.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Format appointment times are stored and rendered in.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// A stored patient row.
#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = patients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Patient {
    #[diesel(column_name = patient_id)]
    #[serde(rename = "patient_id")]
    pub id: i32,
    pub name: String,
    pub age: Option<i32>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub date_added: NaiveDateTime,
    pub email: Option<String>,
}

/// The mutable fields of a patient.
///
/// Used both to insert a new row and to overwrite an existing one; `None`
/// clears the column on update.
#[derive(Insertable, AsChangeset, Deserialize, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = patients)]
#[diesel(treat_none_as_null = true)]
pub struct PatientFields {
    pub name: String,
    pub age: Option<i32>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl PatientFields {
    pub fn new(
        name: impl Into<String>,
        age: Option<i32>,
        contact_number: Option<String>,
        email: Option<String>,
        address: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            contact_number,
            email,
            address,
        }
    }
}

impl From<&Patient> for PatientFields {
    fn from(patient: &Patient) -> Self {
        Self {
            name: patient.name.clone(),
            age: patient.age,
            contact_number: patient.contact_number.clone(),
            email: patient.email.clone(),
            address: patient.address.clone(),
        }
    }
}

/// Which patients a delete targets.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteCriterion {
    Id(i32),
    /// Every patient with exactly this name.
    Name(String),
}

/// A stored appointment row.
#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Appointment {
    #[diesel(column_name = appointment_id)]
    #[serde(rename = "appointment_id")]
    pub id: i32,
    pub patient_id: i32,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub doctor_name: Option<String>,
    pub notes: Option<String>,
}

impl Appointment {
    /// Date as `YYYY-MM-DD`.
    pub fn date_label(&self) -> String {
        self.appointment_date.format(DATE_FORMAT).to_string()
    }

    /// Time as `HH:MM:SS`.
    pub fn time_label(&self) -> String {
        self.appointment_time.format(TIME_FORMAT).to_string()
    }
}

/// The writable fields of an appointment, with the time already truncated to
/// whole seconds.
#[derive(Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = appointments)]
#[diesel(treat_none_as_null = true)]
pub struct AppointmentFields {
    pub patient_id: i32,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub doctor_name: Option<String>,
    pub notes: Option<String>,
}

impl AppointmentFields {
    pub fn new(
        patient_id: i32,
        appointment_date: NaiveDate,
        appointment_time: NaiveTime,
        doctor_name: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            patient_id,
            appointment_date,
            appointment_time: truncate_to_seconds(appointment_time),
            doctor_name,
            notes,
        }
    }
}

/// Drop sub-second precision so the stored time always renders as `HH:MM:SS`.
pub fn truncate_to_seconds(time: NaiveTime) -> NaiveTime {
    time.with_nanosecond(0).unwrap_or(time)
}
