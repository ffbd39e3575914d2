/// Datetime method conformance: parsing, precision, the cast table, and
/// time-zone gating, exercised through whole path expressions.
use sqlpath::{Options, Value, parse, query};

fn json(text: &str) -> Value {
    Value::from_json(&serde_json::from_str(text).expect("test JSON must parse"))
}

fn run_opts(path: &str, doc: &str, opts: &Options) -> Vec<Value> {
    query(&parse(path).expect("path must parse"), &json(doc), opts)
        .unwrap_or_else(|e| panic!("query {path:?} failed: {e}"))
}

fn run(path: &str, doc: &str) -> Vec<Value> {
    run_opts(path, doc, &Options::new())
}

fn run_err(path: &str, doc: &str) -> String {
    query(&parse(path).expect("path must parse"), &json(doc), &Options::new())
        .expect_err("query should fail")
        .to_string()
}

fn canonical(values: Vec<Value>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| match v {
            Value::Datetime(dt) => dt.to_string(),
            other => panic!("expected datetime, got {other:?}"),
        })
        .collect()
}

// --- Parsing through the cast methods ---

#[test]
fn date_parses_iso_form() {
    assert_eq!(canonical(run("$.date()", r#""2024-05-05""#)), vec!["2024-05-05"]);
}

#[test]
fn time_tz_keeps_fraction_and_offset() {
    let out = run("$.time_tz()", r#""20:59:19.79142-04""#);
    let [Value::Datetime(sqlpath::datetime::Datetime::TimeTz(time, offset))] = &out[..] else {
        panic!("expected one TimeTz, got {out:?}");
    };
    assert_eq!(time.subsec_nanosecond(), 791_420_000);
    assert_eq!(offset.seconds(), -14400);
}

#[test]
fn timestamp_accepts_space_and_t_separators() {
    assert_eq!(
        run("$.timestamp()", r#""2024-05-05 12:34:56""#),
        run("$.timestamp()", r#""2024-05-05T12:34:56""#)
    );
}

#[test]
fn datetime_selects_most_specific_variant() {
    assert_eq!(
        run("$[*].datetime().type()", r#"["2024-05-05", "12:00:00", "2024-05-05 12:00:00Z"]"#),
        vec![
            Value::String("date".into()),
            Value::String("time without time zone".into()),
            Value::String("timestamp with time zone".into()),
        ]
    );
}

#[test]
fn datetime_template_is_unsupported() {
    assert_eq!(
        run_err(r#"$.datetime("HH24:MI")"#, r#""12:00""#),
        "exec: .datetime(template) is not yet supported"
    );
}

#[test]
fn unrecognized_formats() {
    assert_eq!(
        run_err("$.date()", r#""not a date""#),
        "exec: date format is not recognized: \"not a date\""
    );
    assert_eq!(
        run_err("$.datetime()", r#""nope""#),
        "exec: datetime format is not recognized: \"nope\""
    );
    // A time string cannot become a date
    assert_eq!(
        run_err("$.date()", r#""12:00:00""#),
        "exec: date format is not recognized: \"12:00:00\""
    );
}

#[test]
fn datetime_method_requires_string_input() {
    assert_eq!(
        run_err("$.date()", "1"),
        "exec: jsonpath item method .date() can only be applied to a string"
    );
}

// --- Precision argument ---

#[test]
fn time_precision_truncates_with_rounding() {
    assert_eq!(
        canonical(run("$.time(2)", r#""12:34:56.789""#)),
        vec!["12:34:56.79"]
    );
    assert_eq!(
        canonical(run("$.timestamp(0)", r#""2024-05-05 12:34:56.5""#)),
        vec!["2024-05-05T12:34:57"]
    );
}

#[test]
fn time_precision_above_six_is_clamped() {
    assert_eq!(
        canonical(run("$.time(9)", r#""12:00:00.123456789""#)),
        vec!["12:00:00.123457"]
    );
}

#[test]
fn time_precision_validation() {
    assert_eq!(
        run_err("$.time(4000000000)", r#""12:00:00""#),
        "exec: time precision of jsonpath item method .time() is out of integer range"
    );
    assert_eq!(
        run_err("$.time(-1)", r#""12:00:00""#),
        "exec: time precision of jsonpath item method .time() is invalid"
    );
    assert_eq!(
        run_err(r#"$.time("2")"#, r#""12:00:00""#),
        "exec: invalid jsonpath item type for .time() time precision"
    );
}

// --- Cast table ---

#[test]
fn timestamp_truncates_to_date_and_time() {
    assert_eq!(
        canonical(run("$.timestamp().date()", r#""2024-05-05 12:34:56""#)),
        vec!["2024-05-05"]
    );
    assert_eq!(
        canonical(run("$.timestamp().time()", r#""2024-05-05 12:34:56""#)),
        vec!["12:34:56"]
    );
}

#[test]
fn date_to_timestamp_is_midnight() {
    assert_eq!(
        canonical(run("$.date().timestamp()", r#""2024-05-05""#)),
        vec!["2024-05-05T00:00:00"]
    );
}

#[test]
fn date_to_time_is_unrepresentable() {
    assert_eq!(
        run_err("$.date().time()", r#""2024-05-05""#),
        "exec: time format is not recognized: \"2024-05-05\""
    );
}

#[test]
fn timestamptz_to_timetz_derives_without_tz() {
    assert_eq!(
        canonical(run("$.timestamp_tz().time_tz()", r#""2024-05-05 12:34:56+02""#)),
        vec!["12:34:56+02:00"]
    );
}

#[test]
fn tz_required_casts_are_gated() {
    let err = run_err("$.timestamp().timestamp_tz()", r#""2024-05-05 12:00:00""#);
    assert_eq!(
        err,
        "exec: cannot convert value from timestamp to timestamptz without time zone usage. \
         HINT: Use WithTZ() option for time zone support"
    );
    let tz = Options::new().with_tz(true);
    assert_eq!(
        canonical(run_opts(
            "$.timestamp().timestamp_tz()",
            r#""2024-05-05 12:00:00""#,
            &tz
        )),
        vec!["2024-05-05T12:00:00+00:00"]
    );
}

#[test]
fn timestamptz_to_timestamp_shifts_into_utc() {
    let tz = Options::new().with_tz(true);
    assert_eq!(
        canonical(run_opts(
            "$.timestamp_tz().timestamp()",
            r#""2024-05-05 12:00:00+02""#,
            &tz
        )),
        vec!["2024-05-05T10:00:00"]
    );
}

#[test]
fn time_to_timetz_gated_and_utc() {
    assert_eq!(
        run_err("$.time().time_tz()", r#""12:00:00""#),
        "exec: cannot convert value from time to timetz without time zone usage. \
         HINT: Use WithTZ() option for time zone support"
    );
    let tz = Options::new().with_tz(true);
    assert_eq!(
        canonical(run_opts("$.time().time_tz()", r#""12:00:00""#, &tz)),
        vec!["12:00:00+00:00"]
    );
}

// --- Comparison semantics ---

#[test]
fn same_kind_comparisons() {
    assert_eq!(
        run("$.a.date() < $.b.date()", r#"{"a": "2024-05-04", "b": "2024-05-05"}"#),
        vec![Value::Bool(true)]
    );
    assert_eq!(
        run("$.a.time() == $.b.time()", r#"{"a": "12:00:00", "b": "12:00:00.000"}"#),
        vec![Value::Bool(true)]
    );
}

#[test]
fn timetz_comparison_normalizes_offsets() {
    assert_eq!(
        run(
            "$.a.time_tz() == $.b.time_tz()",
            r#"{"a": "12:00:00+02", "b": "10:00:00Z"}"#
        ),
        vec![Value::Bool(true)]
    );
}

#[test]
fn timestamptz_comparison_uses_instants() {
    assert_eq!(
        run(
            "$.a.timestamp_tz() == $.b.timestamp_tz()",
            r#"{"a": "2024-05-05 12:00:00+02", "b": "2024-05-05 10:00:00Z"}"#
        ),
        vec![Value::Bool(true)]
    );
}

#[test]
fn cross_kind_comparison_with_tz_enabled() {
    let tz = Options::new().with_tz(true);
    assert_eq!(
        run_opts(
            "$.a.timestamp() < $.b.timestamp_tz()",
            r#"{"a": "2024-05-05 09:59:00", "b": "2024-05-05 12:00:00+02"}"#,
            &tz
        ),
        vec![Value::Bool(true)]
    );
}

#[test]
fn undefined_datetime_pairs_are_null() {
    assert_eq!(
        run(
            "$.a.time() == $.b.date()",
            r#"{"a": "12:00:00", "b": "2024-05-05"}"#
        ),
        vec![Value::Null]
    );
}
