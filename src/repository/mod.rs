//! Data-access operations over the `patients` and `appointments` tables.
//!
//! Every operation runs a single statement on the connection it is given and
//! relies on autocommit; nothing here opens a transaction.

mod appointments;
mod patients;

pub use appointments::AppointmentRepository;
pub use patients::PatientRepository;
