//! Request bodies and query parameters accepted by the HTTP handlers, and the
//! light checks applied to them before anything reaches the database.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use thiserror::Error;

use crate::models::{AppointmentFields, DATE_FORMAT, DeleteCriterion, PatientFields, TIME_FORMAT};

pub const MIN_AGE: i32 = 1;
pub const MAX_AGE: i32 = 150;

/// Character limits of the `VARCHAR` columns.
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_CONTACT_LEN: usize = 15;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_ADDRESS_LEN: usize = 255;
pub const MAX_DOCTOR_NAME_LEN: usize = 255;

/// Rejected user input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("patient name is required")]
    MissingName,

    #[error("age must be between 1 and 150, got {0}")]
    AgeOutOfRange(i32),

    #[error("invalid {field} '{value}'")]
    InvalidId { field: &'static str, value: String },

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid time '{0}', expected HH:MM:SS or HH:MM")]
    InvalidTime(String),

    #[error("{field} is longer than {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("unsupported {kind} '{value}'")]
    UnsupportedCriterion { kind: &'static str, value: String },
}

/// Check a patient form the way the entry form does.
pub fn validate_patient(fields: &PatientFields) -> Result<(), InputError> {
    if fields.name.trim().is_empty() {
        return Err(InputError::MissingName);
    }
    if let Some(age) = fields.age {
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(InputError::AgeOutOfRange(age));
        }
    }
    check_len("name", Some(fields.name.as_str()), MAX_NAME_LEN)?;
    check_len("contact_number", fields.contact_number.as_deref(), MAX_CONTACT_LEN)?;
    check_len("email", fields.email.as_deref(), MAX_EMAIL_LEN)?;
    check_len("address", fields.address.as_deref(), MAX_ADDRESS_LEN)?;
    Ok(())
}

fn check_len(field: &'static str, value: Option<&str>, max: usize) -> Result<(), InputError> {
    match value {
        Some(v) if v.chars().count() > max => Err(InputError::TooLong { field, max }),
        _ => Ok(()),
    }
}

/// Appointment body with the date and time as text.
#[derive(Deserialize, Debug, Clone)]
pub struct AppointmentForm {
    pub patient_id: i32,
    pub appointment_date: String,
    pub appointment_time: String,
    pub doctor_name: Option<String>,
    pub notes: Option<String>,
}

impl AppointmentForm {
    /// Parse date and time and build the normalized fields.
    pub fn into_fields(self) -> Result<AppointmentFields, InputError> {
        if self.patient_id < 1 {
            return Err(InputError::InvalidId {
                field: "patient_id",
                value: self.patient_id.to_string(),
            });
        }
        check_len("doctor_name", self.doctor_name.as_deref(), MAX_DOCTOR_NAME_LEN)?;
        let date = parse_date(&self.appointment_date)?;
        let time = parse_time(&self.appointment_time)?;
        Ok(AppointmentFields::new(
            self.patient_id,
            date,
            time,
            self.doctor_name,
            self.notes,
        ))
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| InputError::InvalidDate(raw.to_string()))
}

/// Accepts `HH:MM:SS`, `HH:MM:SS.fff` and `HH:MM`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, InputError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f"))
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| InputError::InvalidTime(raw.to_string()))
}

fn parse_id(field: &'static str, raw: &str) -> Result<i32, InputError> {
    raw.trim()
        .parse()
        .map_err(|_| InputError::InvalidId {
            field,
            value: raw.to_string(),
        })
}

fn normalize_key(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace([' ', '-'], "_")
}

impl DeleteCriterion {
    /// `by` is `id` (or `patient_id`) or `name`.
    pub fn parse(by: &str, value: &str) -> Result<Self, InputError> {
        match normalize_key(by).as_str() {
            "id" | "patient_id" => Ok(Self::Id(parse_id("patient_id", value)?)),
            "name" => Ok(Self::Name(value.to_string())),
            _ => Err(InputError::UnsupportedCriterion {
                kind: "delete option",
                value: by.to_string(),
            }),
        }
    }
}

/// Which appointments a search targets.
#[derive(Debug, Clone, PartialEq)]
pub enum AppointmentSearch {
    AppointmentId(i32),
    PatientId(i32),
    DoctorName(String),
}

impl AppointmentSearch {
    /// `by` is `appointment_id`, `patient_id` or `doctor_name`.
    pub fn parse(by: &str, value: &str) -> Result<Self, InputError> {
        match normalize_key(by).as_str() {
            "appointment_id" | "id" => Ok(Self::AppointmentId(parse_id("appointment_id", value)?)),
            "patient_id" => Ok(Self::PatientId(parse_id("patient_id", value)?)),
            "doctor_name" | "doctor" => Ok(Self::DoctorName(value.to_string())),
            _ => Err(InputError::UnsupportedCriterion {
                kind: "search option",
                value: by.to_string(),
            }),
        }
    }
}

/// `?by=...&value=...`
#[derive(Deserialize, Debug, Clone)]
pub struct CriterionQuery {
    pub by: String,
    pub value: String,
}

/// `?contact=...`
#[derive(Deserialize, Debug, Clone)]
pub struct ContactQuery {
    pub contact: String,
}
