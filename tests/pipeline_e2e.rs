//! End-to-end shell flows: tokenize, parse, execute, observe the sink.

use std::fs;

use arbsh::{ExecutionOptions, RecordingSink, SessionState, execute, parse, tokenize};

fn run(line: &str, session: &mut SessionState) -> RecordingSink {
    let sink = RecordingSink::new();
    let statements = parse(&tokenize(line).expect("tokenize")).expect("parse");
    execute(&statements, &sink, &ExecutionOptions::default(), session);
    sink
}

#[test]
fn pipeline_flows_objects_between_stages() {
    let mut session = SessionState::with_working_dir("/tmp");
    let sink = run("write-output one two three | measure-object", &mut session);
    assert_eq!(sink.lines(), vec!["count : 3"]);
    assert!(sink.errors().is_empty());
}

#[test]
fn sink_receives_logical_order_text() {
    // The core hands the sink logical order; visual reordering is the
    // rendering host's concern, not the pipeline's.
    let mut session = SessionState::with_working_dir("/tmp");
    let sink = run("write-output \u{0633}\u{0644}\u{0627}\u{0645}", &mut session);
    assert_eq!(sink.lines(), vec!["\u{0633}\u{0644}\u{0627}\u{0645}"]);
}

#[test]
fn output_redirection_writes_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = SessionState::with_working_dir(dir.path());
    let sink = run("write-output a b > out.txt", &mut session);
    assert!(sink.lines().is_empty());
    let written = fs::read_to_string(dir.path().join("out.txt")).expect("read out.txt");
    assert_eq!(written, "a\nb\n");
}

#[test]
fn append_redirection_accumulates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = SessionState::with_working_dir(dir.path());
    run("write-output first > log.txt", &mut session);
    run("write-output second >> log.txt", &mut session);
    let written = fs::read_to_string(dir.path().join("log.txt")).expect("read log.txt");
    assert_eq!(written, "first\nsecond\n");
}

#[test]
fn error_redirection_captures_error_stream() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = SessionState::with_working_dir(dir.path());
    let sink = run("write-error boom 2> err.txt", &mut session);
    assert!(sink.errors().is_empty(), "error went to the file instead");
    let written = fs::read_to_string(dir.path().join("err.txt")).expect("read err.txt");
    assert_eq!(written, "boom\n");
}

#[test]
fn merged_error_stream_reaches_output_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = SessionState::with_working_dir(dir.path());
    run("write-error boom 2>&1 > all.txt", &mut session);
    let written = fs::read_to_string(dir.path().join("all.txt")).expect("read all.txt");
    assert_eq!(written, "boom\n");
}

#[test]
fn input_redirection_feeds_first_stage() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("in.txt"), "x\ny\nz\n").expect("write fixture");
    let mut session = SessionState::with_working_dir(dir.path());
    let sink = run("measure-object < in.txt", &mut session);
    assert_eq!(sink.lines(), vec!["count : 3"]);
}

#[test]
fn get_content_streams_lines_through_pipe() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("data.txt"), "alpha\nbeta\n").expect("write fixture");
    let mut session = SessionState::with_working_dir(dir.path());
    let sink = run("get-content data.txt | write-output", &mut session);
    assert_eq!(sink.lines(), vec!["alpha", "beta"]);
}

#[test]
fn missing_file_fails_the_stage_but_not_the_next_statement() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = SessionState::with_working_dir(dir.path());
    let sink = run("get-content nope.txt; write-output after", &mut session);
    assert_eq!(sink.lines(), vec!["after"]);
    assert_eq!(sink.errors().len(), 1);
    assert!(sink.errors()[0].contains("get-content"));
}

#[test]
fn set_location_affects_later_statements() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join("sub")).expect("mkdir");
    let mut session = SessionState::with_working_dir(dir.path());
    let sink = run("set-location sub; get-location", &mut session);
    assert_eq!(sink.lines().len(), 1);
    assert!(sink.lines()[0].ends_with("sub"));
    assert!(session.working_dir().ends_with("sub"));
}

#[test]
fn variables_set_in_one_statement_expand_in_the_next() {
    let mut session = SessionState::with_working_dir("/tmp");
    let sink = run(
        "set-variable اسم سلام; write-output \"---$اسم---\"",
        &mut session,
    );
    assert_eq!(sink.lines(), vec!["---سلام---"]);
}

#[test]
fn subexpression_result_binds_as_argument() {
    let mut session = SessionState::with_working_dir("/tmp");
    let sink = run(
        "write-output $(write-output a b | measure-object)",
        &mut session,
    );
    assert_eq!(sink.lines(), vec!["count : 2"]);
}

#[test]
fn tokenizer_and_parser_errors_surface_before_execution() {
    assert!(tokenize("write-output 'unterminated").is_err());
    let tokens = tokenize("write-output |").expect("tokenize");
    assert!(parse(&tokens).is_err());
}

#[test]
fn single_quotes_suppress_expansion_double_quotes_allow_it() {
    let mut session = SessionState::with_working_dir("/tmp");
    session.set("x", "value");
    let sink = run("write-output '$x' \"$x\"", &mut session);
    assert_eq!(sink.lines(), vec!["$x", "value"]);
}
