use super::*;
use medlink::net::types::{Patient, Record};

fn patient(id: &str, name: &str) -> Patient {
    Patient { id: PatientId::new(id), name: name.to_owned(), age: Some(51), gender: Some("male".to_owned()) }
}

fn detail_with(records: Vec<Record>) -> DetailView {
    let mut state = DetailState::default();
    state.select(patient("4", "Tunde Ade"));
    state.apply_records(records);
    state.view().unwrap()
}

#[test]
fn plain_lines_are_queries() {
    assert_eq!(parse_browse_input("john"), BrowseInput::Query("john".to_owned()));
    assert_eq!(parse_browse_input(""), BrowseInput::Query(String::new()));
}

#[test]
fn colon_commands_parse() {
    assert_eq!(parse_browse_input(":quit"), BrowseInput::Quit);
    assert_eq!(parse_browse_input(" :q "), BrowseInput::Quit);
    assert_eq!(parse_browse_input(":refresh"), BrowseInput::Refresh);
    assert_eq!(parse_browse_input(":open 3"), BrowseInput::Open(3));
    assert_eq!(
        parse_browse_input(":add-patient 34 female Ada Obi"),
        BrowseInput::AddPatient { age: "34".to_owned(), gender: "female".to_owned(), name: "Ada Obi".to_owned() }
    );
    assert_eq!(
        parse_browse_input(":add-report LabResult https://x.test/a.pdf Blood panel"),
        BrowseInput::AddReport {
            record_type: RecordType::LabResult,
            url: "https://x.test/a.pdf".to_owned(),
            name: "Blood panel".to_owned(),
        }
    );
}

#[test]
fn malformed_commands_are_invalid() {
    assert!(matches!(parse_browse_input(":open"), BrowseInput::Invalid(_)));
    assert!(matches!(parse_browse_input(":open 0"), BrowseInput::Invalid(_)));
    assert!(matches!(parse_browse_input(":open two"), BrowseInput::Invalid(_)));
    assert!(matches!(parse_browse_input(":add-report xray https://x.test"), BrowseInput::Invalid(_)));
    assert!(matches!(parse_browse_input(":add-patient 34"), BrowseInput::Invalid(_)));
    assert!(matches!(parse_browse_input(":dance"), BrowseInput::Invalid(_)));
    assert!(matches!(parse_browse_input(":"), BrowseInput::Invalid(_)));
}

#[test]
fn list_renders_placeholders_and_highlights() {
    assert_eq!(render_list(&ListView::Fetching, &[]), FETCHING_DATA);
    assert_eq!(render_list(&ListView::NoData, &[]), NO_PATIENT_DATA);

    let rows = vec![patient("1", "John Smith"), patient("2", "Mary Jones")];
    let names: Vec<Vec<Segment>> = rows.iter().map(|p| highlight_match(&p.name, "jo")).collect();
    assert_eq!(
        render_list(&ListView::Rows(rows), &names),
        "  1. [Jo]hn Smith\n  2. Mary [Jo]nes"
    );
}

#[test]
fn detail_without_records_shows_placeholder_and_no_tags_line() {
    let rendered = render_detail(&detail_with(Vec::new()));
    assert!(rendered.contains(NO_RECORDS));
    assert!(rendered.contains("Summary: Summary not available"));
    assert!(!rendered.contains("Tags:"));
}

#[test]
fn detail_lists_each_record() {
    let record = Record {
        id: None,
        patient: None,
        name: "diagnoses".to_owned(),
        record_type: Some(RecordType::Diagnoses),
        date: Some("2024-03-01".to_owned()),
        summary: Some("Mild asthma".to_owned()),
        tags: None,
        url: Some("https://docs.example.test/d.pdf".to_owned()),
    };
    let rendered = render_detail(&detail_with(vec![record]));
    assert!(rendered.contains("- diagnoses (2024-03-01)"));
    assert!(rendered.contains("Mild asthma"));
    assert!(rendered.contains(NO_TAGS));
    assert!(rendered.contains("https://docs.example.test/d.pdf"));
}

#[test]
fn notices_render_by_level() {
    assert_eq!(render_notice(&Notice::error("Key not found...")), "! Key not found...");
    assert_eq!(render_notice(&Notice::info("Patient added.")), "* Patient added.");
}

#[test]
fn missing_token_reads_as_the_sign_in_notice() {
    let err = CliError::from(ApiError::MissingToken);
    assert!(matches!(err, CliError::NotSignedIn));
    assert_eq!(err.to_string(), MISSING_TOKEN_NOTICE);

    let other = CliError::from(ApiError::Status { status: 500, message: None });
    assert!(matches!(other, CliError::Api(_)));
}
