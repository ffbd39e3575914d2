/// End-to-end tests: run the `sqlpath` binary and compare output.
use std::process::Command;

fn sqlpath(args: &[&str], input: &str) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_sqlpath"))
        .args(args)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .and_then(|mut child| {
            use std::io::Write;
            child
                .stdin
                .take()
                .unwrap()
                .write_all(input.as_bytes())
                .unwrap();
            child.wait_with_output()
        })
        .expect("failed to run sqlpath");

    (
        String::from_utf8(output.stdout).expect("stdout was not valid UTF-8"),
        String::from_utf8(output.stderr).expect("stderr was not valid UTF-8"),
        output.status.success(),
    )
}

fn ok(args: &[&str], input: &str) -> String {
    let (stdout, stderr, success) = sqlpath(args, input);
    assert!(success, "sqlpath failed: {stderr}");
    stdout
}

#[test]
fn query_prints_one_value_per_line() {
    let out = ok(&["$[*]"], "[1, 2, 3]");
    assert_eq!(out, "1\n2\n3\n");
}

#[test]
fn key_access_object_output() {
    let out = ok(&["$.a"], r#"{"a": {"b": [1, null]}}"#);
    assert_eq!(out, "{\"b\":[1,null]}\n");
}

#[test]
fn first_flag_prints_head_only() {
    let out = ok(&["--first", "$[*]"], "[10, 20]");
    assert_eq!(out, "10\n");
}

#[test]
fn exists_flag_prints_boolean() {
    assert_eq!(ok(&["--exists", "$.a"], r#"{"a": 1}"#), "true\n");
    assert_eq!(ok(&["--exists", "$.b"], r#"{"a": 1}"#), "false\n");
}

#[test]
fn match_flag_prints_tristate() {
    assert_eq!(ok(&["--match", "$.a == 1"], r#"{"a": 1}"#), "true\n");
    assert_eq!(ok(&["--match", r#"$.a == "s""#], r#"{"a": 1}"#), "null\n");
}

#[test]
fn vars_flag_binds_variables() {
    let out = ok(
        &["--vars", r#"{"min": 2}"#, "$[*] ?(@ >= $min)"],
        "[1, 2, 3]",
    );
    assert_eq!(out, "2\n3\n");
}

#[test]
fn soft_errors_exit_nonzero_with_message() {
    let (_, stderr, success) = sqlpath(&["strict $.a"], "{}");
    assert!(!success);
    assert!(
        stderr.contains("exec: JSON object does not contain key \"a\""),
        "stderr was: {stderr}"
    );
}

#[test]
fn silent_flag_suppresses_soft_errors() {
    let out = ok(&["--silent", "strict $.a"], "{}");
    assert_eq!(out, "");
}

#[test]
fn tz_flag_enables_zone_dependent_casts() {
    let (_, stderr, success) = sqlpath(&["$.timestamp().timestamp_tz()"], r#""2024-05-05 12:00:00""#);
    assert!(!success);
    assert!(stderr.contains("without time zone usage"));
    let out = ok(&["--tz", "$.timestamp().timestamp_tz()"], r#""2024-05-05 12:00:00""#);
    assert_eq!(out, "\"2024-05-05T12:00:00+00:00\"\n");
}
