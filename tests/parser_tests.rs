use std::io::Cursor;
use user_aggregate::parser::{Record, RecordStream, StreamSummary};
use user_aggregate::utils::{CancelToken, SourceError};

const INPUT: &str = r#"{"id":"1","type":"attributes","user_id":"u1","data":{"plan":"free"},"timestamp":1}
{"id":"a","type":"event","name":"login","user_id":"u1","data":{},"timestamp":2}

{"id":"2","type":"attributes","user_id":"","data":{"plan":"pro"},"timestamp":3}
"#;

fn open(input: &str) -> Result<RecordStream, SourceError> {
    RecordStream::open(Cursor::new(input.as_bytes().to_vec()), CancelToken::new())
}

#[test]
fn test_stream_yields_records_in_order() {
    let mut stream = open(INPUT).unwrap();
    let records: Vec<Record> = stream.by_ref().collect();

    assert_eq!(
        records,
        vec![
            Record::attributes("u1", 1, [("plan", "free")]),
            Record::event("u1", 2, "login", "a"),
            Record::attributes("", 3, [("plan", "pro")]),
        ]
    );
    assert_eq!(
        stream.finish().unwrap(),
        StreamSummary {
            records: 3,
            skipped_lines: 0
        }
    );
}

#[test]
fn test_stream_rewinds_before_reading() {
    let mut cursor = Cursor::new(INPUT.as_bytes().to_vec());
    cursor.set_position(10);

    let stream = RecordStream::open(cursor, CancelToken::new()).unwrap();
    assert_eq!(stream.count(), 3);
}

#[test]
fn test_setup_rejects_empty_input() {
    assert!(matches!(open(""), Err(SourceError::EmptyInput)));
}

#[test]
fn test_setup_rejects_non_json_header() {
    assert!(matches!(
        open("user_id,plan\n"),
        Err(SourceError::InvalidHeader('u'))
    ));
}

#[test]
fn test_undecodable_line_is_skipped() {
    let input = format!("{}not-a-record\n{}", INPUT, INPUT);
    let mut stream = open(&input).unwrap();

    let records: Vec<Record> = stream.by_ref().collect();

    assert_eq!(records.len(), 6);
    assert_eq!(records[3], Record::attributes("u1", 1, [("plan", "free")]));
    assert_eq!(stream.finish().unwrap().skipped_lines, 1);
}

#[test]
fn test_read_error_ends_sequence() {
    let mut input = INPUT.as_bytes().to_vec();
    input.extend_from_slice(b"\xff\xfe\n");
    input.extend_from_slice(INPUT.as_bytes());
    let mut stream = RecordStream::open(Cursor::new(input), CancelToken::new()).unwrap();

    let records: Vec<Record> = stream.by_ref().collect();

    assert_eq!(records.len(), 3);
    assert!(matches!(stream.finish(), Err(SourceError::Io(_))));
}

#[test]
fn test_null_data_and_unknown_type_keep_streaming() {
    let input = concat!(
        r#"{"id":"a","type":"event","name":"login","user_id":"u1","data":null,"timestamp":1}"#,
        "\n",
        r#"{"id":"p","type":"page","name":"home","user_id":"u1","data":{},"timestamp":2}"#,
        "\n",
        r#"{"id":"1","type":"attributes","user_id":"u2","data":{"plan":"pro"},"timestamp":3}"#,
        "\n",
    );
    let mut stream = open(input).unwrap();

    let records: Vec<Record> = stream.by_ref().collect();

    assert_eq!(
        records,
        vec![
            Record::event("u1", 1, "login", "a"),
            Record::event("u1", 2, "home", "p"),
            Record::attributes("u2", 3, [("plan", "pro")]),
        ]
    );
    assert_eq!(stream.finish().unwrap().skipped_lines, 0);
}

#[test]
fn test_bom_prefixed_input() {
    let input = format!("\u{feff}{}", INPUT);
    let records: Vec<Record> = open(&input).unwrap().collect();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0], Record::attributes("u1", 1, [("plan", "free")]));
}

#[test]
fn test_cancelled_token_produces_nothing() {
    let token = CancelToken::new();
    token.cancel();

    let stream = RecordStream::open(Cursor::new(INPUT.as_bytes().to_vec()), token).unwrap();

    assert_eq!(stream.count(), 0);
}

#[test]
fn test_finish_before_draining() {
    let input = INPUT.repeat(2_000);
    let mut stream = open(&input).unwrap();

    assert!(stream.next().is_some());
    assert!(stream.finish().is_ok());
}
