use csv_user_ingest::ingestion::{read_records_from_path, read_records_from_str, SourceReader};
use csv_user_ingest::types::RecordValue;
use csv_user_ingest::IngestionError;

fn text(s: &str) -> RecordValue {
    RecordValue::Text(s.to_string())
}

#[test]
fn flat_fixture_counts_blank_and_mismatched_lines() {
    let (records, stats) = read_records_from_path("tests/fixtures/users.csv").unwrap();

    assert_eq!(stats.records, 8);
    assert_eq!(stats.blank_lines, 1);
    assert_eq!(stats.shape_mismatches, 1);
    assert_eq!(records.len(), 8);

    assert_eq!(records[0].get("name"), Some(&text("Alice")));
    assert_eq!(records[0].get("age"), Some(&RecordValue::Int(30)));
    assert_eq!(records[1].get("name"), Some(&text("Smith, John")));
    // the mismatched "Frank,17" line is skipped, so the nameless row follows Eve
    assert_eq!(records[6].get("name"), Some(&RecordValue::Null));
    assert_eq!(records[6].get("age"), Some(&RecordValue::Int(25)));
}

#[test]
fn nested_fixture_builds_maps_from_dotted_headers() {
    let (records, stats) = read_records_from_path("tests/fixtures/nested_users.csv").unwrap();
    assert_eq!(stats.records, 4);
    assert_eq!(stats.shape_mismatches, 0);

    let first = &records[0];
    let name = first.get("name").and_then(RecordValue::as_map).unwrap();
    assert_eq!(name.get("firstName"), Some(&text("Rohit")));
    assert_eq!(name.get("lastName"), Some(&text("Prasad")));

    let address = first.get("address").and_then(RecordValue::as_map).unwrap();
    assert_eq!(address.len(), 4);
    assert_eq!(address.get("line1"), Some(&text("A-563 Rakshak Society")));

    let second = &records[1];
    let last = second
        .get("name")
        .and_then(RecordValue::as_map)
        .and_then(|m| m.get("lastName"))
        .cloned();
    assert_eq!(last, Some(text(r#"Sharma "PS""#)));
    let line2 = second
        .get("address")
        .and_then(RecordValue::as_map)
        .and_then(|m| m.get("line2"))
        .cloned();
    assert_eq!(line2, Some(RecordValue::Null));
}

#[test]
fn header_only_or_empty_input_yields_nothing() {
    let (records, stats) = read_records_from_str("name,age\n").unwrap();
    assert!(records.is_empty());
    assert_eq!(stats.records, 0);

    let (records, stats) = read_records_from_str("\n   \n").unwrap();
    assert!(records.is_empty());
    assert_eq!(stats.blank_lines, 2);
}

#[test]
fn reader_is_lazy_and_exposes_the_header() {
    let input = "name,age\nAlice,30\nBob,31\n";
    let mut reader = SourceReader::new(input.as_bytes());
    assert!(reader.header().is_none());

    let first = reader.next().unwrap().unwrap();
    assert_eq!(first.get("name"), Some(&text("Alice")));
    assert_eq!(reader.header().map(|h| h.width()), Some(2));
    assert_eq!(reader.stats().records, 1);

    assert_eq!(reader.by_ref().count(), 1);
    assert_eq!(reader.stats().records, 2);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = read_records_from_path("tests/fixtures/does_not_exist.csv").unwrap_err();
    assert!(matches!(err, IngestionError::Io(_)));
}
