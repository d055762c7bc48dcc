//! Generative properties of the patient query engine.

use proptest::prelude::*;

use meditrack_core::{
    Barangay, Database, PatientDraft, PatientRecords, PatientUpdate, Principal,
};
use meditrack_core::models::{NewUser, Role};

fn setup() -> (Database, Principal) {
    let db = Database::open_in_memory().unwrap();
    let user = db
        .insert_user(&NewUser {
            username: "staff1".into(),
            password_hash: "salt$digest".into(),
            full_name: "Staff One".into(),
            role: Role::Staff,
            profile_picture: None,
        })
        .unwrap();
    let principal = user.principal();
    (db, principal)
}

fn make_draft(first: &str, last: &str) -> PatientDraft {
    PatientDraft {
        first_name: first.into(),
        last_name: last.into(),
        age: 30,
        gender: "Female".into(),
        address: "123 Rd".into(),
        barangay: Some(Barangay::B191),
        ..Default::default()
    }
}

fn update_strategy() -> impl Strategy<Value = PatientUpdate> {
    (
        proptest::option::of("[A-Za-z]{1,10}"),
        proptest::option::of("[A-Za-z]{1,10}"),
        proptest::option::of(proptest::option::of("[A-Za-z]{0,10}")),
        proptest::option::of(0i64..120),
        proptest::option::of("[A-Za-z]{1,8}"),
        proptest::option::of("[A-Za-z0-9 ]{1,20}"),
        proptest::option::of(prop::sample::select(&Barangay::ALL[..])),
        proptest::option::of(proptest::option::of("[0-9]{7,11}")),
    )
        .prop_map(
            |(first_name, last_name, middle_name, age, gender, address, barangay, contact)| {
                PatientUpdate {
                    first_name,
                    last_name,
                    middle_name,
                    age,
                    gender,
                    address,
                    barangay,
                    contact_number: contact,
                    ..Default::default()
                }
            },
        )
}

proptest! {
    #[test]
    fn generated_patient_ids_are_unique_and_well_formed(count in 1usize..25) {
        let (db, principal) = setup();
        let records = PatientRecords::new(&db);

        let mut seen = std::collections::HashSet::new();
        for i in 0..count {
            let patient = records
                .create(&principal, "127.0.0.1", &make_draft(&format!("P{}", i), "Test"))
                .unwrap();

            prop_assert!(patient.patient_id.starts_with("PT-"));
            let digits = &patient.patient_id[3..];
            prop_assert_eq!(digits.len(), 4);
            prop_assert!(digits.chars().all(|c| c.is_ascii_digit()));
            prop_assert!(seen.insert(patient.patient_id.clone()));
        }
    }

    #[test]
    fn update_never_touches_created_fields(changes in update_strategy()) {
        let (db, principal) = setup();
        let records = PatientRecords::new(&db);

        let patient = records
            .create(&principal, "127.0.0.1", &make_draft("Ana", "Cruz"))
            .unwrap();
        let updated = records
            .update(&principal, "127.0.0.1", patient.id, &changes)
            .unwrap();

        prop_assert_eq!(updated.created_at, patient.created_at);
        prop_assert_eq!(updated.created_by, patient.created_by);
        prop_assert_eq!(updated.id, patient.id);
    }

    #[test]
    fn search_results_are_a_subset_matching_the_query(query in "[A-Za-z]{1,4}") {
        let (db, principal) = setup();
        let records = PatientRecords::new(&db);

        for (first, last) in [("Ana", "Cruz"), ("Ben", "Reyes"), ("Carla", "Santos")] {
            records
                .create(&principal, "127.0.0.1", &make_draft(first, last))
                .unwrap();
        }

        let needle = query.to_lowercase();
        for hit in records.search(&query).unwrap() {
            let matched = hit.first_name.to_lowercase().contains(&needle)
                || hit.last_name.to_lowercase().contains(&needle)
                || hit.patient_id.to_lowercase().contains(&needle);
            prop_assert!(matched, "{:?} should not match {:?}", hit.first_name, query);
        }
    }
}
