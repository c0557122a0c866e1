use actix_web::error::{BlockingError, InternalError, PathError};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use diesel::PgConnection;
use serde_json::json;
use tracing::{error, warn};

use crate::db::DbPool;
use crate::error::StoreError;
use crate::forms::{
    AppointmentForm, AppointmentSearch, ContactQuery, CriterionQuery, InputError, validate_patient,
};
use crate::models::{DeleteCriterion, PatientFields};
use crate::repository::{AppointmentRepository, PatientRepository};

/// Register every route on an `App`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PathConfig::default().error_handler(invalid_path))
        .route("/", web::get().to(hello))
        .service(
            web::scope("/patients")
                .route("", web::post().to(create_patient))
                .route("", web::get().to(list_patients))
                .route("", web::delete().to(delete_patients))
                .route("/search", web::get().to(find_patient_by_contact))
                .route("/{patient_id}", web::get().to(get_patient))
                .route("/{patient_id}", web::put().to(update_patient))
                .route("/{patient_id}/appointments", web::get().to(get_appointments_for_patient)),
        )
        .service(
            web::scope("/appointments")
                .route("", web::post().to(create_appointment))
                .route("", web::get().to(list_appointments))
                .route("/search", web::get().to(search_appointments))
                .route("/{appointment_id}", web::get().to(get_appointment))
                .route("/{appointment_id}", web::put().to(update_appointment)),
        );
}

// A non-numeric id is bad input, not a missing route.
fn invalid_path(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    let body = format!("invalid path parameter: {err}");
    InternalError::from_response(err, HttpResponse::BadRequest().body(body)).into()
}

async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Welcome to the Patient Management System!")
}

// Runs `f` on the blocking pool with the shared connection.
async fn with_connection<T, F>(
    pool: web::Data<DbPool>,
    f: F,
) -> Result<Result<T, StoreError>, BlockingError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    web::block(move || -> Result<T, StoreError> {
        let mut conn = pool.get()?;
        f(&mut *conn)
    })
    .await
}

fn bad_request(err: InputError) -> HttpResponse {
    HttpResponse::BadRequest().body(err.to_string())
}

fn store_failure(action: &str, err: StoreError) -> HttpResponse {
    match err {
        StoreError::Constraint(_) => {
            warn!(error = %err, "{action} rejected by a constraint");
            HttpResponse::Conflict().body(format!("Error {action}: {err}"))
        }
        StoreError::Connection(_) => {
            error!(error = %err, "{action} failed: database unavailable");
            HttpResponse::ServiceUnavailable().body(format!("Error {action}: {err}"))
        }
        StoreError::Database(_) => {
            error!(error = %err, "{action} failed");
            HttpResponse::InternalServerError().body(format!("Error {action}: {err}"))
        }
    }
}

fn blocking_failure(err: BlockingError) -> HttpResponse {
    error!(error = %err, "blocking task failed");
    HttpResponse::InternalServerError().body(format!("Error blocking thread: {err:?}"))
}

// Handler to create a new patient
pub async fn create_patient(
    pool: web::Data<DbPool>,
    new_patient: web::Json<PatientFields>,
) -> impl Responder {
    let fields = new_patient.into_inner();
    if let Err(e) = validate_patient(&fields) {
        return bad_request(e);
    }

    match with_connection(pool, move |conn| PatientRepository::insert(conn, &fields)).await {
        Ok(Ok(patient)) => HttpResponse::Created().json(patient),
        Ok(Err(e)) => store_failure("creating patient", e),
        Err(e) => blocking_failure(e),
    }
}

pub async fn list_patients(pool: web::Data<DbPool>) -> impl Responder {
    match with_connection(pool, PatientRepository::fetch_all).await {
        Ok(Ok(patients)) => HttpResponse::Ok().json(patients),
        Ok(Err(e)) => store_failure("listing patients", e),
        Err(e) => blocking_failure(e),
    }
}

// Handler to get a patient by ID
pub async fn get_patient(pool: web::Data<DbPool>, patient_id: web::Path<i32>) -> impl Responder {
    let id = patient_id.into_inner();
    match with_connection(pool, move |conn| PatientRepository::fetch_by_id(conn, id)).await {
        Ok(Ok(Some(patient))) => HttpResponse::Ok().json(patient),
        Ok(Ok(None)) => HttpResponse::NotFound().body("Patient not found"),
        Ok(Err(e)) => store_failure("getting patient", e),
        Err(e) => blocking_failure(e),
    }
}

pub async fn find_patient_by_contact(
    pool: web::Data<DbPool>,
    query: web::Query<ContactQuery>,
) -> impl Responder {
    let contact = query.into_inner().contact;
    match with_connection(pool, move |conn| {
        PatientRepository::fetch_by_contact(conn, &contact)
    })
    .await
    {
        Ok(Ok(Some(patient))) => HttpResponse::Ok().json(patient),
        Ok(Ok(None)) => HttpResponse::NotFound().body("Patient not found"),
        Ok(Err(e)) => store_failure("searching patients", e),
        Err(e) => blocking_failure(e),
    }
}

// The client sends back the full edited record; nothing about the edit is
// kept between requests.
pub async fn update_patient(
    pool: web::Data<DbPool>,
    patient_id: web::Path<i32>,
    edited: web::Json<PatientFields>,
) -> impl Responder {
    let id = patient_id.into_inner();
    let fields = edited.into_inner();
    if let Err(e) = validate_patient(&fields) {
        return bad_request(e);
    }

    match with_connection(pool, move |conn| {
        if PatientRepository::update(conn, id, &fields)? == 0 {
            return Ok(None);
        }
        PatientRepository::fetch_by_id(conn, id)
    })
    .await
    {
        Ok(Ok(Some(patient))) => HttpResponse::Ok().json(patient),
        Ok(Ok(None)) => HttpResponse::NotFound().body("Patient not found"),
        Ok(Err(e)) => store_failure("updating patient", e),
        Err(e) => blocking_failure(e),
    }
}

pub async fn delete_patients(
    pool: web::Data<DbPool>,
    query: web::Query<CriterionQuery>,
) -> impl Responder {
    let criterion = match DeleteCriterion::parse(&query.by, &query.value) {
        Ok(criterion) => criterion,
        Err(e) => return bad_request(e),
    };

    match with_connection(pool, move |conn| PatientRepository::delete(conn, &criterion)).await {
        Ok(Ok(deleted)) => HttpResponse::Ok().json(json!({ "deleted": deleted })),
        Ok(Err(e)) => store_failure("deleting patients", e),
        Err(e) => blocking_failure(e),
    }
}

// Handler to get all appointments for a specific patient
pub async fn get_appointments_for_patient(
    pool: web::Data<DbPool>,
    patient_id: web::Path<i32>,
) -> impl Responder {
    let id = patient_id.into_inner();
    match with_connection(pool, move |conn| {
        AppointmentRepository::list_by_patient_id(conn, id)
    })
    .await
    {
        Ok(Ok(appointments)) => HttpResponse::Ok().json(appointments),
        Ok(Err(e)) => store_failure("getting appointments", e),
        Err(e) => blocking_failure(e),
    }
}

pub async fn create_appointment(
    pool: web::Data<DbPool>,
    form: web::Json<AppointmentForm>,
) -> impl Responder {
    let fields = match form.into_inner().into_fields() {
        Ok(fields) => fields,
        Err(e) => return bad_request(e),
    };

    match with_connection(pool, move |conn| AppointmentRepository::insert(conn, &fields)).await {
        Ok(Ok(appointment)) => HttpResponse::Created().json(appointment),
        Ok(Err(e)) => store_failure("creating appointment", e),
        Err(e) => blocking_failure(e),
    }
}

pub async fn list_appointments(pool: web::Data<DbPool>) -> impl Responder {
    match with_connection(pool, AppointmentRepository::fetch_all).await {
        Ok(Ok(appointments)) => HttpResponse::Ok().json(appointments),
        Ok(Err(e)) => store_failure("listing appointments", e),
        Err(e) => blocking_failure(e),
    }
}

pub async fn get_appointment(
    pool: web::Data<DbPool>,
    appointment_id: web::Path<i32>,
) -> impl Responder {
    let id = appointment_id.into_inner();
    match with_connection(pool, move |conn| AppointmentRepository::fetch_by_id(conn, id)).await {
        Ok(Ok(Some(appointment))) => HttpResponse::Ok().json(appointment),
        Ok(Ok(None)) => HttpResponse::NotFound().body("Appointment not found"),
        Ok(Err(e)) => store_failure("getting appointment", e),
        Err(e) => blocking_failure(e),
    }
}

pub async fn search_appointments(
    pool: web::Data<DbPool>,
    query: web::Query<CriterionQuery>,
) -> impl Responder {
    let search = match AppointmentSearch::parse(&query.by, &query.value) {
        Ok(search) => search,
        Err(e) => return bad_request(e),
    };

    match with_connection(pool, move |conn| match search {
        AppointmentSearch::AppointmentId(id) => AppointmentRepository::fetch_by_id(conn, id)
            .map(|found| found.into_iter().collect::<Vec<_>>()),
        AppointmentSearch::PatientId(id) => AppointmentRepository::list_by_patient_id(conn, id),
        AppointmentSearch::DoctorName(name) => {
            AppointmentRepository::list_by_doctor_name(conn, &name)
        }
    })
    .await
    {
        Ok(Ok(appointments)) => HttpResponse::Ok().json(appointments),
        Ok(Err(e)) => store_failure("searching appointments", e),
        Err(e) => blocking_failure(e),
    }
}

pub async fn update_appointment(
    pool: web::Data<DbPool>,
    appointment_id: web::Path<i32>,
    form: web::Json<AppointmentForm>,
) -> impl Responder {
    let id = appointment_id.into_inner();
    let fields = match form.into_inner().into_fields() {
        Ok(fields) => fields,
        Err(e) => return bad_request(e),
    };

    match with_connection(pool, move |conn| {
        if AppointmentRepository::update(conn, id, &fields)? == 0 {
            return Ok(None);
        }
        AppointmentRepository::fetch_by_id(conn, id)
    })
    .await
    {
        Ok(Ok(Some(appointment))) => HttpResponse::Ok().json(appointment),
        Ok(Ok(None)) => HttpResponse::NotFound().body("Appointment not found"),
        Ok(Err(e)) => store_failure("updating appointment", e),
        Err(e) => blocking_failure(e),
    }
}
