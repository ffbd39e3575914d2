/// End-to-end path evaluation: parse an expression, run it against a
/// JSON document, compare the matched values or the error text.
use sqlpath::{Options, Value, exists, matches, parse, query};

fn json(text: &str) -> Value {
    Value::from_json(&serde_json::from_str(text).expect("test JSON must parse"))
}

fn run(path: &str, doc: &str) -> Vec<Value> {
    query(&parse(path).expect("path must parse"), &json(doc), &Options::new())
        .unwrap_or_else(|e| panic!("query {path:?} failed: {e}"))
}

fn run_err(path: &str, doc: &str) -> String {
    query(&parse(path).expect("path must parse"), &json(doc), &Options::new())
        .expect_err("query should fail")
        .to_string()
}

fn run_tz(path: &str, doc: &str) -> Vec<Value> {
    let opts = Options::new().with_tz(true);
    query(&parse(path).unwrap(), &json(doc), &opts)
        .unwrap_or_else(|e| panic!("query {path:?} failed: {e}"))
}

// --- Key access ---

#[test]
fn key_access() {
    assert_eq!(run("$.x", r#"{"x": 42}"#), vec![Value::Int(42)]);
}

#[test]
fn nested_key_chain() {
    assert_eq!(
        run("$.a.b.c", r#"{"a": {"b": {"c": "deep"}}}"#),
        vec![Value::String("deep".into())]
    );
}

#[test]
fn missing_key_lax_is_silent() {
    assert_eq!(run("$.nope", r#"{"x": 1}"#), vec![]);
}

#[test]
fn missing_key_strict_errors() {
    assert_eq!(
        run_err("strict $.a", "{}"),
        "exec: JSON object does not contain key \"a\""
    );
}

#[test]
fn member_accessor_on_scalar_strict() {
    assert_eq!(
        run_err("strict $.a", "42"),
        "exec: jsonpath member accessor can only be applied to an object"
    );
}

#[test]
fn key_access_unwraps_arrays_in_lax() {
    assert_eq!(
        run("$.x", r#"[{"x": 1}, {"x": 2}]"#),
        vec![Value::Int(1), Value::Int(2)]
    );
}

#[test]
fn quoted_key_access() {
    assert_eq!(
        run(r#"$."two words""#, r#"{"two words": 7}"#),
        vec![Value::Int(7)]
    );
}

// --- Wildcards and array access ---

#[test]
fn wildcard_array_preserves_order() {
    assert_eq!(
        run("$[*]", r#"["hi", 42, true, {"x": 1}, null]"#),
        vec![
            Value::String("hi".into()),
            Value::Int(42),
            Value::Bool(true),
            Value::Object(vec![("x".into(), Value::Int(1))]),
            Value::Null,
        ]
    );
}

#[test]
fn wildcard_array_auto_wraps_scalar_in_lax() {
    assert_eq!(run("$[*]", "5"), vec![Value::Int(5)]);
    assert_eq!(
        run_err("strict $[*]", "5"),
        "exec: jsonpath wildcard array accessor can only be applied to an array"
    );
}

#[test]
fn wildcard_members() {
    assert_eq!(
        run("$.*", r#"{"a": 1, "b": 2}"#),
        vec![Value::Int(1), Value::Int(2)]
    );
    assert_eq!(
        run_err("strict $.*", "[1]"),
        "exec: jsonpath wildcard member accessor can only be applied to an object"
    );
}

#[test]
fn array_index() {
    assert_eq!(run("$[1]", "[10, 20, 30]"), vec![Value::Int(20)]);
}

#[test]
fn array_index_range() {
    assert_eq!(
        run("$[1 to 2]", "[10, 20, 30, 40]"),
        vec![Value::Int(20), Value::Int(30)]
    );
}

#[test]
fn array_index_list() {
    assert_eq!(
        run("$[0, 2 to last]", "[10, 20, 30, 40]"),
        vec![Value::Int(10), Value::Int(30), Value::Int(40)]
    );
}

#[test]
fn array_index_last_expression() {
    assert_eq!(run("$[last]", "[10, 20, 30]"), vec![Value::Int(30)]);
    assert_eq!(run("$[last - 1]", "[10, 20, 30]"), vec![Value::Int(20)]);
}

#[test]
fn array_index_clamps_in_lax() {
    assert_eq!(run("$[1 to 100]", "[10, 20]"), vec![Value::Int(20)]);
    // Inverted after clamping: skipped without error
    assert_eq!(run("$[5 to 100]", "[10, 20]"), vec![]);
}

#[test]
fn array_index_out_of_bounds_strict() {
    assert_eq!(
        run_err("strict $[5]", "[10, 20]"),
        "exec: jsonpath array subscript is out of bounds"
    );
}

#[test]
fn array_index_auto_wraps_in_lax() {
    assert_eq!(run("$[0]", "42"), vec![Value::Int(42)]);
    assert_eq!(
        run_err("strict $[0]", "42"),
        "exec: jsonpath array accessor can only be applied to an array"
    );
}

#[test]
fn array_subscript_must_be_single_numeric() {
    assert_eq!(
        run_err("$[$.idx]", r#"{"idx": "x"}"#),
        "exec: jsonpath array subscript is not a single numeric value"
    );
}

#[test]
fn array_emits_null_holes() {
    assert_eq!(run("$[0 to 1]", "[null, 2]"), vec![Value::Null, Value::Int(2)]);
}

// --- Recursive descent ---

#[test]
fn recursive_any_document_order() {
    let doc = r#"{"a": {"b": 1}, "c": [2, 3]}"#;
    assert_eq!(
        run("$.**", doc),
        vec![
            json(doc),
            json(r#"{"b": 1}"#),
            Value::Int(1),
            json("[2, 3]"),
            Value::Int(2),
            Value::Int(3),
        ]
    );
}

#[test]
fn recursive_any_depth_bounds() {
    let doc = r#"{"a": {"b": 1}}"#;
    assert_eq!(run("$.**{1}", doc), vec![json(r#"{"b": 1}"#)]);
    assert_eq!(
        run("$.**{1 to last}", doc),
        vec![json(r#"{"b": 1}"#), Value::Int(1)]
    );
    assert_eq!(run("$.**{2}", doc), vec![Value::Int(1)]);
}

#[test]
fn recursive_any_finds_nested_keys() {
    assert_eq!(
        run("$.**.b", r#"{"a": {"b": 1}, "b": 2}"#),
        vec![Value::Int(2), Value::Int(1)]
    );
}

// --- Filters ---

#[test]
fn filter_equality() {
    assert_eq!(
        run(r#"$ ?(@ == "hi")"#, r#""hi""#),
        vec![Value::String("hi".into())]
    );
    assert_eq!(run(r#"$ ?(@ == "hi")"#, r#""bye""#), vec![]);
}

#[test]
fn filter_over_array_elements() {
    assert_eq!(
        run("$[*] ?(@ > 2)", "[1, 2, 3, 4]"),
        vec![Value::Int(3), Value::Int(4)]
    );
}

#[test]
fn filter_with_key_predicate() {
    assert_eq!(
        run("$[*] ?(@.price < 10).name", r#"[{"name": "a", "price": 5}, {"name": "b", "price": 15}]"#),
        vec![Value::String("a".into())]
    );
}

#[test]
fn filter_missing_key_is_false_not_error() {
    assert_eq!(run("strict $[*] ?(@.x == 1)", r#"[{"y": 1}]"#), vec![]);
}

#[test]
fn filter_boolean_connectives() {
    let doc = "[1, 2, 3, 4, 5]";
    assert_eq!(
        run("$[*] ?(@ > 1 && @ < 4)", doc),
        vec![Value::Int(2), Value::Int(3)]
    );
    assert_eq!(
        run("$[*] ?(@ == 1 || @ == 5)", doc),
        vec![Value::Int(1), Value::Int(5)]
    );
    assert_eq!(
        run("$[*] ?(!(@ == 3))", doc),
        vec![Value::Int(1), Value::Int(2), Value::Int(4), Value::Int(5)]
    );
}

#[test]
fn filter_exists() {
    assert_eq!(
        run("$[*] ?(exists(@.x))", r#"[{"x": 1}, {"y": 2}]"#),
        vec![json(r#"{"x": 1}"#)]
    );
}

#[test]
fn filter_is_unknown() {
    // Comparing a number to a string is Unknown, which `is unknown` turns true
    assert_eq!(
        run(r#"$[*] ?((@ == "s") is unknown)"#, "[1, 2]"),
        vec![Value::Int(1), Value::Int(2)]
    );
}

#[test]
fn filter_starts_with() {
    assert_eq!(
        run(r#"$[*] ?(@ starts with "ab")"#, r#"["abc", "abd", "xbc"]"#),
        vec![Value::String("abc".into()), Value::String("abd".into())]
    );
}

// --- Predicate paths (bare predicates at the root) ---

#[test]
fn predicate_path_yields_boolean() {
    assert_eq!(run("$.x == 42", r#"{"x": 42}"#), vec![Value::Bool(true)]);
    assert_eq!(run("$.x == 43", r#"{"x": 42}"#), vec![Value::Bool(false)]);
}

#[test]
fn predicate_path_unknown_yields_null() {
    // Cross-type comparison has no defined outcome
    assert_eq!(run(r#"$.x == "s""#, r#"{"x": 42}"#), vec![Value::Null]);
}

#[test]
fn like_regex_case_insensitive() {
    assert_eq!(
        run(r#"$.x like_regex "^hi" flag "i""#, r#"{"x": "HIGH"}"#),
        vec![Value::Bool(true)]
    );
}

#[test]
fn like_regex_is_unanchored_contains() {
    assert_eq!(
        run(r#"$.x like_regex "gh""#, r#"{"x": "high"}"#),
        vec![Value::Bool(true)]
    );
}

#[test]
fn like_regex_non_string_subject_is_null() {
    assert_eq!(run(r#"$.x like_regex "^hi""#, r#"{"x": 5}"#), vec![Value::Null]);
}

#[test]
fn like_regex_quote_flag_literal() {
    assert_eq!(
        run(r#"$.x like_regex "a.b" flag "q""#, r#"{"x": "xa.by"}"#),
        vec![Value::Bool(true)]
    );
    assert_eq!(
        run(r#"$.x like_regex "a.b" flag "q""#, r#"{"x": "aXb"}"#),
        vec![Value::Bool(false)]
    );
}

#[test]
fn like_regex_unknown_flag_errors() {
    assert_eq!(
        run_err(r#"$.x like_regex "a" flag "z""#, r#"{"x": "a"}"#),
        "exec: unrecognized flag character \"z\" in LIKE_REGEX predicate"
    );
}

// --- Arithmetic ---

#[test]
fn arithmetic_integer_rules() {
    assert_eq!(run("$.x + 1", r#"{"x": 2}"#), vec![Value::Int(3)]);
    assert_eq!(run("$.x % 3", r#"{"x": 7}"#), vec![Value::Int(1)]);
    assert_eq!(run("-$.x", r#"{"x": 2}"#), vec![Value::Int(-2)]);
    assert_eq!(run("$.x * 2.5", r#"{"x": 2}"#), vec![Value::Double(5.0)]);
}

#[test]
fn arithmetic_division_by_zero() {
    assert_eq!(run_err("$.x / 0", r#"{"x": 1}"#), "exec: division by zero");
}

#[test]
fn arithmetic_overflow() {
    assert_eq!(
        run_err("$.x + 1", &format!(r#"{{"x": {}}}"#, i64::MAX)),
        "exec: integer out of range"
    );
}

#[test]
fn arithmetic_unwraps_arrays() {
    assert_eq!(
        run("$.x + 3", r#"{"x": [4]}"#),
        vec![Value::Int(7)]
    );
}

#[test]
fn unary_plus_requires_numeric() {
    assert_eq!(
        run_err("-$.x", r#"{"x": "s"}"#),
        "exec: operand of unary jsonpath operator - is not a numeric value"
    );
}

#[test]
fn binary_operand_must_be_single_numeric() {
    assert_eq!(
        run_err("$.x + 1", r#"{"x": "s"}"#),
        "exec: left operand of jsonpath operator + is not a single numeric value"
    );
}

// --- Variables ---

#[test]
fn variable_binding() {
    let path = parse("$[*] ?(@ > $min)").unwrap();
    let opts = Options::new().with_vars(vec![("min".into(), Value::Int(2))]);
    assert_eq!(
        query(&path, &json("[1, 2, 3]"), &opts).unwrap(),
        vec![Value::Int(3)]
    );
}

#[test]
fn missing_variable_is_execution_error() {
    assert_eq!(
        run_err("$ ?(@ > $min)", "[1]"),
        "exec: could not find jsonpath variable \"min\""
    );
}

// --- keyvalue ---

#[test]
fn keyvalue_root_object() {
    assert_eq!(
        run("$.keyvalue()", r#"{"x": true}"#),
        vec![Value::Object(vec![
            ("key".into(), Value::String("x".into())),
            ("value".into(), Value::Bool(true)),
            ("id".into(), Value::Int(0)),
        ])]
    );
}

#[test]
fn keyvalue_pairs_share_source_id() {
    let out = run("$.keyvalue().id", r#"{"a": 1, "b": 2, "c": 3}"#);
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|v| v == &out[0]));
}

#[test]
fn keyvalue_distinct_sources_get_distinct_ids() {
    let out = run("$[*].keyvalue().id", r#"[{"a": 1}, {"b": 2}]"#);
    assert_eq!(out.len(), 2);
    assert_ne!(out[0], out[1]);
}

#[test]
fn keyvalue_empty_object_is_empty() {
    assert_eq!(run("$.keyvalue()", "{}"), vec![]);
}

#[test]
fn keyvalue_on_scalar_errors() {
    assert_eq!(
        run_err("$.keyvalue()", "1"),
        "exec: jsonpath item method .keyvalue() can only be applied to an object"
    );
}

#[test]
fn keyvalue_chained_rebases_ids() {
    // Outer keyvalue sees each generated pair object as its own base
    let out = run("$.keyvalue().keyvalue()", r#"{"x": {"y": 1}}"#);
    assert_eq!(out.len(), 3); // key, value, id of the single pair
    for pair in &out {
        let id = pair.object_key("id").expect("pair has id");
        assert_eq!(id, &out[0].object_key("id").unwrap().clone());
    }
}

#[test]
fn keyvalue_strict_array_errors() {
    assert_eq!(
        run_err("strict $.keyvalue()", r#"[{"a": 1}]"#),
        "exec: jsonpath item method .keyvalue() can only be applied to an object"
    );
    // Lax unwraps the array first
    let out = run("$.keyvalue()", r#"[{"a": 1}]"#);
    assert_eq!(out.len(), 1);
}

// --- Datetime comparison scenarios ---

#[test]
fn date_equals_timestamp_midnight() {
    assert_eq!(
        run(
            "$.x.date() == $.y.timestamp()",
            r#"{"x": "2024-05-03", "y": "2024-05-03 00:00:00"}"#
        ),
        vec![Value::Bool(true)]
    );
}

#[test]
fn timestamptz_cast_requires_tz() {
    let doc = r#"{"x": "2024-05-03", "y": "2024-05-03 00:00:00"}"#;
    let err = run_err("$.x.date() == $.y.timestamp_tz()", doc);
    assert_eq!(
        err,
        "exec: cannot convert value from timestamp to timestamptz without time zone usage. \
         HINT: Use WithTZ() option for time zone support"
    );
    // With TZ enabled both sides land on midnight UTC
    assert_eq!(
        run_tz("$.x.date() == $.y.timestamp_tz()", doc),
        vec![Value::Bool(true)]
    );
}

#[test]
fn date_vs_time_comparison_is_null() {
    assert_eq!(
        run(
            "$.x.date() == $.y.time()",
            r#"{"x": "2024-05-03", "y": "12:00:00"}"#
        ),
        vec![Value::Null]
    );
}

// --- Facade behavior ---

#[test]
fn exists_matches_query_cardinality() {
    let doc = json(r#"{"a": [1, 2]}"#);
    let opts = Options::new();
    for path_text in ["$.a[*]", "$.b", "$.a ?(@[0] == 1)"] {
        let path = parse(path_text).unwrap();
        let found = query(&path, &doc, &opts).unwrap();
        assert_eq!(
            exists(&path, &doc, &opts).unwrap(),
            Some(!found.is_empty()),
            "exists disagrees with query for {path_text}"
        );
    }
}

#[test]
fn matches_on_predicate_paths() {
    let doc = json(r#"{"x": 1}"#);
    let opts = Options::new();
    assert_eq!(
        matches(&parse("$.x == 1").unwrap(), &doc, &opts).unwrap(),
        Some(true)
    );
    assert_eq!(
        matches(&parse(r#"$.x == "s""#).unwrap(), &doc, &opts).unwrap(),
        None
    );
}

#[test]
fn strict_results_subset_of_lax() {
    let doc = r#"{"a": [{"b": 1}, {"b": 2}]}"#;
    let lax = run("$.a.b", doc);
    assert_eq!(lax, vec![Value::Int(1), Value::Int(2)]);
    // Strict refuses to unwrap: an error, which is a valid subset outcome
    assert_eq!(
        run_err("strict $.a.b", doc),
        "exec: jsonpath member accessor can only be applied to an object"
    );
}
