/// Scalar conversion methods: `.string()` and `.boolean()`.
use crate::exec::eval::{ExecResult, Executor};
use crate::path::{Method, Node};
use crate::value::{Value, format_f64};

pub(super) fn execute(
    exec: &mut Executor,
    node: &Node,
    method: Method,
    value: &Value,
    found: Option<&mut Vec<Value>>,
    unwrap: bool,
) -> ExecResult {
    if unwrap && let Value::Array(arr) = value {
        return exec.execute_unwrap_target_array(node, arr, found, false);
    }
    match method {
        Method::String => string(exec, node, value, found),
        _ => boolean(exec, node, value, found),
    }
}

fn string(
    exec: &mut Executor,
    node: &Node,
    value: &Value,
    found: Option<&mut Vec<Value>>,
) -> ExecResult {
    let s = match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => {
            let mut buf = itoa::Buffer::new();
            buf.format(*n).to_string()
        }
        Value::Double(f) => format_f64(*f),
        // Lazy decimals keep their exact literal text
        Value::Numeric(s) => s.clone(),
        Value::Datetime(dt) => dt.to_string(),
        _ => {
            return exec.soft_error(
                "jsonpath item method .string() can only be applied to a boolean, string, \
                 numeric, or datetime value"
                    .into(),
            );
        }
    };
    exec.execute_next(node, &Value::String(s), found)
}

fn boolean(
    exec: &mut Executor,
    node: &Node,
    value: &Value,
    found: Option<&mut Vec<Value>>,
) -> ExecResult {
    let b = match value {
        Value::Bool(b) => *b,
        Value::Int(n) => *n != 0,
        Value::Double(_) | Value::Numeric(_) => {
            // Floats must be exact integers to cast
            match value.as_i64() {
                Some(n) => n != 0,
                None => match value.as_f64() {
                    Some(f) if f.trunc() == f && f.is_finite() => f != 0.0,
                    _ => {
                        return exec.soft_error(format!(
                            "argument \"{}\" of jsonpath item method .boolean() is invalid for \
                             type boolean",
                            super::number_arg_text(value)
                        ));
                    }
                },
            }
        }
        Value::String(s) => match parse_boolean_string(s) {
            Some(b) => b,
            None => {
                return exec.soft_error(format!(
                    "argument \"{s}\" of jsonpath item method .boolean() is invalid for type \
                     boolean"
                ));
            }
        },
        _ => {
            return exec.soft_error(
                "jsonpath item method .boolean() can only be applied to a boolean, string, or \
                 numeric value"
                    .into(),
            );
        }
    };
    exec.execute_next(node, &Value::Bool(b), found)
}

/// SQL boolean literal recognition: single letters `t f y n 1 0` and the
/// whole words `true false yes no on off`, case-insensitively. Matching
/// switches on the first character, then requires either length 1 or a
/// full case-fold of the canonical word.
fn parse_boolean_string(s: &str) -> Option<bool> {
    let first = *s.as_bytes().first()?;
    match first.to_ascii_lowercase() {
        b't' => (s.len() == 1 || s.eq_ignore_ascii_case("true")).then_some(true),
        b'f' => (s.len() == 1 || s.eq_ignore_ascii_case("false")).then_some(false),
        b'y' => (s.len() == 1 || s.eq_ignore_ascii_case("yes")).then_some(true),
        b'n' => (s.len() == 1 || s.eq_ignore_ascii_case("no")).then_some(false),
        b'o' => {
            if s.eq_ignore_ascii_case("on") {
                Some(true)
            } else if s.eq_ignore_ascii_case("off") {
                Some(false)
            } else {
                None
            }
        }
        b'1' => (s == "1").then_some(true),
        b'0' => (s == "0").then_some(false),
        _ => None,
    }
}
