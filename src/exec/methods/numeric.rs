/// Numeric item methods: `.number()`, `.decimal(p, s)`, `.double()`,
/// `.integer()`, `.bigint()`, `.abs()`, `.floor()`, `.ceiling()`.
use super::{int_literal, number_arg_text};
use crate::exec::error::Error;
use crate::exec::eval::{ExecResult, Executor};
use crate::path::{Method, Node};
use crate::value::Value;

pub(super) fn execute(
    exec: &mut Executor,
    node: &Node,
    method: Method,
    args: &[Node],
    value: &Value,
    found: Option<&mut Vec<Value>>,
    unwrap: bool,
) -> ExecResult {
    if unwrap && let Value::Array(arr) = value {
        return exec.execute_unwrap_target_array(node, arr, found, false);
    }
    match method {
        Method::Number => number(exec, node, value, found),
        Method::Decimal => decimal(exec, node, args, value, found),
        Method::Double => double(exec, node, value, found),
        Method::Integer => integer(exec, node, value, found, false),
        Method::Bigint => integer(exec, node, value, found, true),
        Method::Abs | Method::Floor | Method::Ceiling => {
            rounding(exec, node, method, value, found)
        }
        _ => Err(Error::Invalid(format!(
            "unexpected numeric item method .{}()",
            method.name()
        ))),
    }
}

fn number(
    exec: &mut Executor,
    node: &Node,
    value: &Value,
    found: Option<&mut Vec<Value>>,
) -> ExecResult {
    let Some(f) = read_number(value) else {
        return match value {
            Value::String(s) => exec.soft_error(format!(
                "argument \"{s}\" of jsonpath item method .number() is invalid for type numeric"
            )),
            _ => exec.soft_error(
                "jsonpath item method .number() can only be applied to a string or numeric value"
                    .into(),
            ),
        };
    };
    if !f.is_finite() {
        return exec.soft_error(format!(
            "argument \"{}\" of jsonpath item method .number() is invalid for type numeric",
            number_arg_text(value)
        ));
    }
    exec.execute_next(node, &Value::Double(f), found)
}

fn decimal(
    exec: &mut Executor,
    node: &Node,
    args: &[Node],
    value: &Value,
    found: Option<&mut Vec<Value>>,
) -> ExecResult {
    // Precision and scale come from the path text, never from the data.
    let precision = match args.first() {
        None => None,
        Some(arg) => match int_literal(arg) {
            Some(n) => Some(n),
            None => {
                return Err(Error::Execution(
                    "invalid jsonpath item type for .decimal() precision".into(),
                ));
            }
        },
    };
    let scale = match args.get(1) {
        None => None,
        Some(arg) => match int_literal(arg) {
            Some(n) => Some(n),
            None => {
                return Err(Error::Execution(
                    "invalid jsonpath item type for .decimal() scale".into(),
                ));
            }
        },
    };

    let Some(f) = read_number(value) else {
        return match value {
            Value::String(s) => exec.soft_error(format!(
                "argument \"{s}\" of jsonpath item method .decimal() is invalid for type numeric"
            )),
            _ => exec.soft_error(
                "jsonpath item method .decimal() can only be applied to a string or numeric value"
                    .into(),
            ),
        };
    };
    if !f.is_finite() {
        return exec.soft_error(format!(
            "argument \"{}\" of jsonpath item method .decimal() is invalid for type numeric",
            number_arg_text(value)
        ));
    }

    let Some(p) = precision else {
        return exec.execute_next(node, &Value::Double(f), found);
    };
    if !(1..=1000).contains(&p) {
        return exec.soft_error(format!("NUMERIC precision {p} must be between 1 and 1000"));
    }
    let s = scale.unwrap_or(0);
    if !(-1000..=1000).contains(&s) {
        return exec.soft_error(format!("NUMERIC scale {s} must be between -1000 and 1000"));
    }

    // Round to the scale, then check the integral digits fit p - s.
    let factor = 10f64.powi(s as i32);
    let rounded = (f * factor).round() / factor;
    let magnitude = rounded.abs();
    let int_digits = if magnitude < 1.0 {
        0
    } else {
        magnitude.log10().floor() as i64 + 1
    };
    if int_digits > p - s {
        return exec.soft_error(format!(
            "argument \"{}\" of jsonpath item method .decimal() is invalid for type numeric",
            number_arg_text(value)
        ));
    }
    exec.execute_next(node, &Value::Double(rounded), found)
}

fn double(
    exec: &mut Executor,
    node: &Node,
    value: &Value,
    found: Option<&mut Vec<Value>>,
) -> ExecResult {
    let f = match value {
        Value::Int(n) => *n as f64,
        Value::Double(f) => *f,
        Value::Numeric(s) => match s.parse::<f64>() {
            Ok(f) => f,
            Err(_) => {
                return exec.soft_error(format!(
                    "argument \"{s}\" of jsonpath item method .double() is invalid for type \
                     double precision"
                ));
            }
        },
        // An unparsable string is a hard error; out-of-range is soft.
        Value::String(s) => match s.parse::<f64>() {
            Ok(f) => f,
            Err(_) => {
                return Err(Error::Execution(format!(
                    "argument \"{s}\" of jsonpath item method .double() is invalid for type \
                     double precision"
                )));
            }
        },
        _ => {
            return exec.soft_error(
                "jsonpath item method .double() can only be applied to a string or numeric value"
                    .into(),
            );
        }
    };
    if !f.is_finite() {
        return exec.soft_error(format!(
            "argument \"{}\" of jsonpath item method .double() is invalid for type double \
             precision",
            number_arg_text(value)
        ));
    }
    exec.execute_next(node, &Value::Double(f), found)
}

fn integer(
    exec: &mut Executor,
    node: &Node,
    value: &Value,
    found: Option<&mut Vec<Value>>,
    big: bool,
) -> ExecResult {
    let type_name = if big { "bigint" } else { "integer" };
    let parsed: Option<i64> = match value {
        Value::Int(n) => Some(*n),
        Value::Double(f) => round_to_i64(*f),
        Value::Numeric(s) => match s.parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => s.parse::<f64>().ok().and_then(round_to_i64),
        },
        Value::String(s) => match s.parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => s.parse::<f64>().ok().and_then(round_to_i64),
        },
        _ => {
            return exec.soft_error(format!(
                "jsonpath item method .{type_name}() can only be applied to a string or numeric \
                 value"
            ));
        }
    };
    let in_range = match parsed {
        Some(n) if !big => n >= i32::MIN as i64 && n <= i32::MAX as i64,
        Some(_) => true,
        None => false,
    };
    if !in_range {
        return exec.soft_error(format!(
            "argument \"{}\" of jsonpath item method .{type_name}() is invalid for type \
             {type_name}",
            number_arg_text(value)
        ));
    }
    let Some(n) = parsed else {
        return Err(Error::Invalid("unreachable integer conversion".into()));
    };
    exec.execute_next(node, &Value::Int(n), found)
}

fn rounding(
    exec: &mut Executor,
    node: &Node,
    method: Method,
    value: &Value,
    found: Option<&mut Vec<Value>>,
) -> ExecResult {
    let out = match value {
        v if v.is_number() => match v.as_i64() {
            Some(n) => match method {
                // Integer inputs keep their integer-ness
                Method::Abs => match n.checked_abs() {
                    Some(a) => Value::Int(a),
                    None => Value::Double((n as f64).abs()),
                },
                _ => Value::Int(n),
            },
            None => match v.as_f64() {
                Some(f) => Value::Double(match method {
                    Method::Abs => f.abs(),
                    Method::Floor => f.floor(),
                    _ => f.ceil(),
                }),
                None => {
                    return exec.soft_error(format!(
                        "jsonpath item method .{}() can only be applied to a numeric value",
                        method.name()
                    ));
                }
            },
        },
        _ => {
            return exec.soft_error(format!(
                "jsonpath item method .{}() can only be applied to a numeric value",
                method.name()
            ));
        }
    };
    exec.execute_next(node, &out, found)
}

/// Half-away-from-zero rounding into i64; `None` when out of range.
fn round_to_i64(f: f64) -> Option<i64> {
    let r = f.round();
    if r.is_finite() && r >= i64::MIN as f64 && r < i64::MAX as f64 {
        Some(r as i64)
    } else {
        None
    }
}

/// Read a numeric-conversion input as f64: numbers pass through, strings
/// parse. `None` means the input cannot be coerced at all.
fn read_number(value: &Value) -> Option<f64> {
    match value {
        v if v.is_number() => v.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_i64_half_away_from_zero() {
        assert_eq!(round_to_i64(2.5), Some(3));
        assert_eq!(round_to_i64(-2.5), Some(-3));
        assert_eq!(round_to_i64(2.4), Some(2));
    }

    #[test]
    fn round_to_i64_range() {
        assert_eq!(round_to_i64(9.3e18), None);
        assert_eq!(round_to_i64(f64::NAN), None);
        assert_eq!(round_to_i64(f64::INFINITY), None);
        assert_eq!(round_to_i64(i64::MIN as f64), Some(i64::MIN));
    }

    #[test]
    fn read_number_forms() {
        assert_eq!(read_number(&Value::Int(3)), Some(3.0));
        assert_eq!(read_number(&Value::Numeric("1.5".into())), Some(1.5));
        assert_eq!(read_number(&Value::String("12.233".into())), Some(12.233));
        assert_eq!(read_number(&Value::String("nope".into())), None);
        assert_eq!(read_number(&Value::Bool(true)), None);
    }
}
