use std::sync::atomic::Ordering;

use super::*;
use crate::state::ui::Notice;
use crate::test_helpers::{Call, MockApi, signed_in_session};

fn open_modal(api: &Arc<MockApi>, session: Session) -> (AddPatientModal, Notices) {
    let notices = Notices::new();
    let modal = AddPatientModal::new(api.clone(), session, notices.clone());
    (modal, notices)
}

fn fill(modal: &mut AddPatientModal, name: &str, age: &str, gender: &str) {
    name.clone_into(&mut modal.name);
    age.clone_into(&mut modal.age);
    gender.clone_into(&mut modal.gender);
}

#[test]
fn validate_new_patient_trims_and_parses_age() {
    assert_eq!(
        validate_new_patient("  Ada Obi ", " 42 ", " female "),
        Ok(NewPatient { name: "Ada Obi".to_owned(), age: 42, gender: "female".to_owned() })
    );
}

#[test]
fn validate_new_patient_rejects_bad_fields() {
    assert_eq!(validate_new_patient("  ", "42", "male"), Err("Enter the patient's name."));
    assert_eq!(validate_new_patient("Ada", "forty", "male"), Err("Age must be a whole number."));
    assert_eq!(validate_new_patient("Ada", "-3", "male"), Err("Age must be a whole number."));
    assert_eq!(validate_new_patient("Ada", "42", ""), Err("Enter the patient's sex."));
}

#[tokio::test]
async fn submit_creates_patient_and_succeeds() {
    let api = Arc::new(MockApi::new());
    let (mut modal, notices) = open_modal(&api, signed_in_session());
    fill(&mut modal, "Ada Obi", "42", "female");

    let created = modal.submit().await.unwrap();
    assert_eq!(created.name, "Ada Obi");
    assert_eq!(created.age, Some(42));
    assert_eq!(modal.status(), ModalStatus::Succeeded);
    assert_eq!(notices.drain(), vec![Notice::info(PATIENT_ADDED)]);
    assert_eq!(api.calls(), vec![Call::CreatePatient("Ada Obi".to_owned())]);
}

#[tokio::test]
async fn submit_after_success_is_ignored() {
    let api = Arc::new(MockApi::new());
    let (mut modal, _notices) = open_modal(&api, signed_in_session());
    fill(&mut modal, "Ada Obi", "42", "female");

    assert!(modal.submit().await.is_some());
    assert!(modal.submit().await.is_none());
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn invalid_age_sends_nothing() {
    let api = Arc::new(MockApi::new());
    let (mut modal, notices) = open_modal(&api, signed_in_session());
    fill(&mut modal, "Ada Obi", "old", "female");

    assert!(modal.submit().await.is_none());
    assert!(api.calls().is_empty());
    assert_eq!(notices.drain(), vec![Notice::error("Age must be a whole number.")]);
    assert_eq!(modal.status(), ModalStatus::Editing);
}

#[tokio::test]
async fn signed_out_submit_sends_nothing() {
    let api = Arc::new(MockApi::new());
    let (mut modal, notices) = open_modal(&api, Session::in_memory());
    fill(&mut modal, "Ada Obi", "42", "female");

    assert!(modal.submit().await.is_none());
    assert!(api.calls().is_empty());
    assert_eq!(notices.drain(), vec![Notice::error(MISSING_TOKEN_NOTICE)]);
}

#[tokio::test]
async fn failed_submit_stays_editable() {
    let api = Arc::new(MockApi::new());
    api.fail_create.store(true, Ordering::SeqCst);
    let (mut modal, notices) = open_modal(&api, signed_in_session());
    fill(&mut modal, "Ada Obi", "42", "female");

    assert!(modal.submit().await.is_none());
    assert_eq!(modal.status(), ModalStatus::Editing);
    assert_eq!(notices.drain(), vec![Notice::error(ADD_PATIENT_FAILED)]);

    api.fail_create.store(false, Ordering::SeqCst);
    assert!(modal.submit().await.is_some());
}
