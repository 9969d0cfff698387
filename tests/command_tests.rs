use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};
use user_aggregate::commands::{execute_process, ProcessArgs, ProcessReport};
use user_aggregate::utils::CancelToken;

const RECORDS: &str = r#"{"id":"1","type":"attributes","user_id":"u1","data":{"plan":"free"},"timestamp":1}
{"id":"2","type":"attributes","user_id":"u1","data":{"plan":"pro"},"timestamp":5}
{"id":"a","type":"event","name":"login","user_id":"u1","data":{},"timestamp":6}
{"id":"a","type":"event","name":"login","user_id":"u1","data":{},"timestamp":6}
{"id":"b","type":"event","name":"login","user_id":"u1","data":{},"timestamp":7}
{"id":"3","type":"attributes","user_id":"","data":{"plan":"enterprise"},"timestamp":9}
{"id":"c","type":"event","name":"signup","user_id":"u0","data":{},"timestamp":2}
"#;

const EXPECTED: &str = "u0,signup=1\nu1,plan=pro,login=2\n";

fn setup(dir: &TempDir) -> ProcessArgs {
    let input = dir.path().join("records.jsonl");
    fs::write(&input, RECORDS).unwrap();

    ProcessArgs {
        input,
        output: dir.path().join("data.csv"),
        ..Default::default()
    }
}

fn reference(dir: &TempDir, contents: &str) -> Option<PathBuf> {
    let path = dir.path().join("expected.csv");
    fs::write(&path, contents).unwrap();
    Some(path)
}

#[test]
fn test_process_writes_sorted_export() {
    let dir = tempdir().unwrap();
    let args = setup(&dir);
    let output = args.output.clone();

    let report = execute_process(args, &CancelToken::new()).unwrap();

    assert_eq!(fs::read_to_string(output).unwrap(), EXPECTED);
    assert_eq!(report.users, 2);
    assert_eq!(report.lines_written, 2);
    assert_eq!(report.stats.records_seen, 7);
    assert_eq!(report.stats.dropped_missing_user, 1);
}

#[test]
fn test_process_validates_against_reference() {
    let dir = tempdir().unwrap();
    let args = ProcessArgs {
        verify: reference(&dir, EXPECTED),
        ..setup(&dir)
    };

    assert!(execute_process(args, &CancelToken::new()).is_ok());
}

#[test]
fn test_validation_failure_keeps_output() {
    let dir = tempdir().unwrap();
    let args = ProcessArgs {
        verify: reference(&dir, "u0,signup=1\n"),
        ..setup(&dir)
    };
    let output = args.output.clone();

    let err = execute_process(args, &CancelToken::new()).unwrap_err();

    assert!(format!("{:#}", err).contains("failed validation"));
    assert_eq!(fs::read_to_string(output).unwrap(), EXPECTED);
}

#[test]
fn test_missing_input_fails_without_output() {
    let dir = tempdir().unwrap();
    let args = ProcessArgs {
        input: dir.path().join("missing.jsonl"),
        output: dir.path().join("data.csv"),
        ..Default::default()
    };
    let output = args.output.clone();

    assert!(execute_process(args, &CancelToken::new()).is_err());
    assert!(!output.exists());
}

#[test]
fn test_malformed_header_fails_without_output() {
    let dir = tempdir().unwrap();
    let args = setup(&dir);
    fs::write(&args.input, "user_id,plan\n").unwrap();
    let output = args.output.clone();

    assert!(execute_process(args, &CancelToken::new()).is_err());
    assert!(!output.exists());
}

#[test]
fn test_cancelled_run_writes_nothing() {
    let dir = tempdir().unwrap();
    let args = setup(&dir);
    let output = args.output.clone();
    let token = CancelToken::new();
    token.cancel();

    let err = execute_process(args, &token).unwrap_err();

    assert!(err.to_string().contains("Interrupted"));
    assert!(!output.exists());
}

fn run_with_input(contents: &[u8]) -> (anyhow::Result<ProcessReport>, PathBuf, TempDir) {
    let dir = tempdir().unwrap();
    let args = setup(&dir);
    fs::write(&args.input, contents).unwrap();
    let output = args.output.clone();
    (execute_process(args, &CancelToken::new()), output, dir)
}

#[test]
fn test_null_data_keeps_every_user() {
    let input = concat!(
        r#"{"id":"a","type":"event","name":"login","user_id":"u1","data":null,"timestamp":1}"#,
        "\n",
        r#"{"id":"b","type":"event","name":"login","user_id":"u2","data":{},"timestamp":2}"#,
        "\n",
        r#"{"id":"c","type":"attributes","user_id":"u3","data":null,"timestamp":3}"#,
        "\n",
    );

    let (result, output, _dir) = run_with_input(input.as_bytes());

    assert_eq!(result.unwrap().users, 3);
    assert_eq!(fs::read_to_string(output).unwrap(), "u1,login=1\nu2,login=1\nu3\n");
}

#[test]
fn test_unknown_type_is_counted_as_event() {
    let input = concat!(
        r#"{"id":"a","type":"event","name":"login","user_id":"u1","data":{},"timestamp":1}"#,
        "\n",
        r#"{"id":"p","type":"page","name":"home","user_id":"u1","data":{},"timestamp":2}"#,
        "\n",
        r#"{"id":"1","type":"attributes","user_id":"u2","data":{"plan":"pro"},"timestamp":3}"#,
        "\n",
    );

    let (result, output, _dir) = run_with_input(input.as_bytes());

    let report = result.unwrap();
    assert_eq!(report.stats.event_occurrences, 2);
    assert_eq!(report.stats.attribute_updates, 1);
    assert_eq!(
        fs::read_to_string(output).unwrap(),
        "u1,home=1,login=1\nu2,plan=pro\n"
    );
}

#[test]
fn test_corrupt_middle_line_is_skipped() {
    let input = format!(
        "{}\n{{\"type\":\"event\",\"user_id\":\n{}\n",
        r#"{"id":"a","type":"event","name":"login","user_id":"u1","data":{},"timestamp":1}"#,
        r#"{"id":"1","type":"attributes","user_id":"u2","data":{"plan":"pro"},"timestamp":3}"#,
    );

    let (result, output, _dir) = run_with_input(input.as_bytes());

    let report = result.unwrap();
    assert_eq!(report.skipped_lines, 1);
    assert_eq!(report.users, 2);
    assert_eq!(
        fs::read_to_string(output).unwrap(),
        "u1,login=1\nu2,plan=pro\n"
    );
}

#[test]
fn test_read_error_mid_stream_fails_without_output() {
    let mut input = Vec::new();
    input.extend_from_slice(
        br#"{"id":"a","type":"event","name":"login","user_id":"u1","data":{},"timestamp":1}"#,
    );
    input.extend_from_slice(b"\n\xff\xfe\n");
    input.extend_from_slice(
        br#"{"id":"b","type":"event","name":"login","user_id":"u2","data":{},"timestamp":2}"#,
    );
    input.push(b'\n');

    let (result, output, _dir) = run_with_input(&input);

    let err = result.unwrap_err();
    assert!(format!("{:#}", err).contains("no output written"));
    assert!(!output.exists());
}

#[test]
fn test_summary_run_succeeds() {
    let dir = tempdir().unwrap();
    let args = ProcessArgs {
        print_summary: true,
        ..setup(&dir)
    };
    let output = args.output.clone();

    let report = execute_process(args, &CancelToken::new()).unwrap();

    assert_eq!(report.skipped_lines, 0);
    assert_eq!(fs::read_to_string(output).unwrap(), EXPECTED);
}
