mod support;

use diesel::prelude::*;
use medirecords::error::StoreError;
use medirecords::models::{DeleteCriterion, PatientFields};
use medirecords::repository::{AppointmentRepository, PatientRepository};

use support::{TestDb, alice, checkup, insert_patient};

#[test]
fn inserted_patient_round_trips_by_id() {
    let Some(mut db) = TestDb::connect() else { return };
    let conn = db.conn();

    let inserted = PatientRepository::insert(conn, &alice()).unwrap();
    let fetched = PatientRepository::fetch_by_id(conn, inserted.id)
        .unwrap()
        .expect("patient present");

    assert_eq!(fetched, inserted);
    assert_eq!(PatientFields::from(&fetched), alice());
}

#[test]
fn fetch_all_lists_the_single_inserted_patient() {
    let Some(mut db) = TestDb::connect() else { return };
    let conn = db.conn();

    PatientRepository::insert(conn, &alice()).unwrap();
    let all = PatientRepository::fetch_all(conn).unwrap();

    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Alice");
    assert_eq!(all[0].age, Some(30));
}

#[test]
fn fetch_all_keeps_insertion_order_and_allows_duplicates() {
    let Some(mut db) = TestDb::connect() else { return };
    let conn = db.conn();

    let first = insert_patient(conn, "Bob");
    let second = insert_patient(conn, "Bob");
    let ids: Vec<i32> = PatientRepository::fetch_all(conn)
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();

    assert_eq!(ids, vec![first.id, second.id]);
    assert!(second.id > first.id);
}

#[test]
fn fetch_by_missing_id_is_none() {
    let Some(mut db) = TestDb::connect() else { return };
    assert!(PatientRepository::fetch_by_id(db.conn(), 987_654).unwrap().is_none());
}

#[test]
fn fetch_by_contact_returns_first_match() {
    let Some(mut db) = TestDb::connect() else { return };
    let conn = db.conn();

    let first = insert_patient(conn, "Dora");
    insert_patient(conn, "Eve");

    let found = PatientRepository::fetch_by_contact(conn, "555-0000")
        .unwrap()
        .expect("patient present");
    assert_eq!(found.id, first.id);
    assert!(PatientRepository::fetch_by_contact(conn, "000").unwrap().is_none());
}

#[test]
fn update_overwrites_every_mutable_field() {
    let Some(mut db) = TestDb::connect() else { return };
    let conn = db.conn();

    let inserted = PatientRepository::insert(conn, &alice()).unwrap();
    let changes = PatientFields::new("Alice Smith", Some(31), None, Some("as@x.com".into()), None);

    assert_eq!(PatientRepository::update(conn, inserted.id, &changes).unwrap(), 1);

    let fetched = PatientRepository::fetch_by_id(conn, inserted.id).unwrap().unwrap();
    assert_eq!(PatientFields::from(&fetched), changes);
    assert_eq!(fetched.date_added, inserted.date_added);
}

#[test]
fn update_of_missing_id_changes_nothing() {
    let Some(mut db) = TestDb::connect() else { return };
    let conn = db.conn();

    let inserted = PatientRepository::insert(conn, &alice()).unwrap();
    let changes = PatientFields::new("Nobody", None, None, None, None);

    assert_eq!(PatientRepository::update(conn, inserted.id + 1000, &changes).unwrap(), 0);
    assert_eq!(PatientRepository::fetch_all(conn).unwrap(), vec![inserted]);
}

#[test]
fn delete_by_id_removes_exactly_that_patient() {
    let Some(mut db) = TestDb::connect() else { return };
    let conn = db.conn();

    let gone = insert_patient(conn, "Frank");
    let kept = insert_patient(conn, "Frank");

    let deleted = PatientRepository::delete(conn, &DeleteCriterion::Id(gone.id)).unwrap();

    assert_eq!(deleted, 1);
    assert_eq!(PatientRepository::fetch_all(conn).unwrap(), vec![kept]);
}

#[test]
fn delete_by_name_removes_every_namesake() {
    let Some(mut db) = TestDb::connect() else { return };
    let conn = db.conn();

    insert_patient(conn, "Grace");
    insert_patient(conn, "Grace");
    let other = insert_patient(conn, "Heidi");

    let deleted =
        PatientRepository::delete(conn, &DeleteCriterion::Name("Grace".into())).unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(PatientRepository::fetch_all(conn).unwrap(), vec![other]);

    let none = PatientRepository::delete(conn, &DeleteCriterion::Name("Grace".into())).unwrap();
    assert_eq!(none, 0);
}

#[test]
fn delete_of_patient_with_appointments_is_blocked() {
    let Some(mut db) = TestDb::connect() else { return };
    let conn = db.conn();

    let patient = insert_patient(conn, "Ivan");
    AppointmentRepository::insert(conn, &checkup(patient.id, "Dr. Lee", 9)).unwrap();

    // savepoint so the failed statement does not poison the test transaction
    let result = conn.transaction::<_, StoreError, _>(|conn| {
        PatientRepository::delete(conn, &DeleteCriterion::Id(patient.id))
    });

    assert!(matches!(result, Err(StoreError::Constraint(_))));
    assert!(PatientRepository::fetch_by_id(conn, patient.id).unwrap().is_some());
}

#[test]
fn over_long_contact_number_is_a_constraint_error() {
    let Some(mut db) = TestDb::connect() else { return };
    let conn = db.conn();

    let fields = PatientFields::new("Judy", None, Some("+1 (555) 123-4567".into()), None, None);
    let result =
        conn.transaction::<_, StoreError, _>(|conn| PatientRepository::insert(conn, &fields));

    assert!(matches!(result, Err(StoreError::Constraint(_))));
    assert!(PatientRepository::fetch_all(conn).unwrap().is_empty());
}

#[test]
fn ensure_schema_is_idempotent() {
    let Some(mut db) = TestDb::connect() else { return };
    let conn = db.conn();

    medirecords::db::ensure_schema(conn).unwrap();
    medirecords::db::ensure_patients_table(conn).unwrap();
    medirecords::db::ensure_appointments_table(conn).unwrap();

    assert!(PatientRepository::fetch_all(conn).unwrap().is_empty());
}
