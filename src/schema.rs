// Kept in sync with the DDL in `db::ensure_patients_table` and
// `db::ensure_appointments_table`.

diesel::table! {
    appointments (appointment_id) {
        appointment_id -> Int4,
        patient_id -> Int4,
        appointment_date -> Date,
        appointment_time -> Time,
        #[max_length = 255]
        doctor_name -> Nullable<Varchar>,
        notes -> Nullable<Text>,
    }
}

diesel::table! {
    patients (patient_id) {
        patient_id -> Int4,
        #[max_length = 255]
        name -> Varchar,
        age -> Nullable<Int4>,
        #[max_length = 15]
        contact_number -> Nullable<Varchar>,
        #[max_length = 255]
        address -> Nullable<Varchar>,
        date_added -> Timestamp,
        #[max_length = 255]
        email -> Nullable<Varchar>,
    }
}

diesel::joinable!(appointments -> patients (patient_id));

diesel::allow_tables_to_appear_in_same_query!(
    appointments,
    patients,
);
