use super::*;
use crate::net::types::PatientId;

fn patient(id: &str, name: &str) -> Patient {
    Patient { id: PatientId::new(id), name: name.to_owned(), age: Some(40), gender: Some("female".to_owned()) }
}

#[test]
fn fresh_state_shows_no_data() {
    assert_eq!(PatientListState::default().view(), ListView::NoData);
}

#[test]
fn loading_with_no_items_shows_fetching() {
    let mut state = PatientListState::default();
    state.begin_fetch();
    assert_eq!(state.view(), ListView::Fetching);
}

#[test]
fn results_replace_items_wholesale() {
    let mut state = PatientListState::default();
    state.apply_results(String::new(), vec![patient("1", "Ann"), patient("2", "Bob")]);
    state.apply_results("jo".to_owned(), vec![patient("3", "John")]);

    assert_eq!(state.view(), ListView::Rows(vec![patient("3", "John")]));
    assert_eq!(state.query, "jo");
    assert_eq!(state.revision, 2);
}

#[test]
fn empty_results_show_no_data() {
    let mut state = PatientListState::default();
    state.begin_fetch();
    state.apply_results("zzz".to_owned(), Vec::new());
    assert_eq!(state.view(), ListView::NoData);
}

#[test]
fn failure_clears_items() {
    let mut state = PatientListState::default();
    state.apply_results(String::new(), vec![patient("1", "Ann")]);
    state.begin_fetch();
    state.apply_failure("an".to_owned());
    assert!(state.items.is_empty());
    assert!(!state.loading);
    assert_eq!(state.view(), ListView::NoData);
}

#[test]
fn settle_keeps_items() {
    let mut state = PatientListState::default();
    state.apply_results(String::new(), vec![patient("1", "Ann")]);
    state.begin_fetch();
    state.settle();
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.revision, 1);
}
