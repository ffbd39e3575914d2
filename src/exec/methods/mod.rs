/// Item method dispatch.
///
/// Array handling is uniform: when the input is an array and the mode
/// permits unwrapping, the method applies elementwise; `.type()` and
/// `.size()` are the exceptions that consume arrays whole.
mod convert;
mod datetime;
mod numeric;

use super::eval::{ExecResult, Executor, Status};
use crate::path::{Method, Node, NodeKind};
use crate::value::Value;

pub(crate) fn execute_method(
    exec: &mut Executor,
    node: &Node,
    method: Method,
    args: &[Node],
    value: &Value,
    found: Option<&mut Vec<Value>>,
    unwrap: bool,
) -> ExecResult {
    match method {
        Method::Type => execute_type(exec, node, value, found),
        Method::Size => execute_size(exec, node, value, found),
        Method::Keyvalue => execute_keyvalue(exec, node, value, found, unwrap),
        Method::String | Method::Boolean => {
            convert::execute(exec, node, method, value, found, unwrap)
        }
        Method::Number
        | Method::Decimal
        | Method::Double
        | Method::Integer
        | Method::Bigint
        | Method::Abs
        | Method::Floor
        | Method::Ceiling => numeric::execute(exec, node, method, args, value, found, unwrap),
        Method::Date
        | Method::Time
        | Method::TimeTz
        | Method::Timestamp
        | Method::TimestampTz
        | Method::Datetime => datetime::execute(exec, node, method, args, value, found, unwrap),
    }
}

/// `.type()` — reports the value's own type; arrays stay arrays.
fn execute_type(
    exec: &mut Executor,
    node: &Node,
    value: &Value,
    found: Option<&mut Vec<Value>>,
) -> ExecResult {
    let v = Value::String(value.type_name().to_string());
    exec.execute_next(node, &v, found)
}

/// `.size()` — array length; non-arrays count as 1 in lax mode.
fn execute_size(
    exec: &mut Executor,
    node: &Node,
    value: &Value,
    found: Option<&mut Vec<Value>>,
) -> ExecResult {
    let size = match value {
        Value::Array(arr) => arr.len() as i64,
        _ => {
            if !exec.lax {
                return exec.structural_error(
                    "jsonpath item method .size() can only be applied to an array".into(),
                );
            }
            1
        }
    };
    exec.execute_next(node, &Value::Int(size), found)
}

/// `.keyvalue()` — explode an object into `{key, value, id}` triples.
/// Ids are deterministic per source object; each emitted pair becomes a
/// fresh keyvalue base so chained calls re-derive ids from it.
fn execute_keyvalue(
    exec: &mut Executor,
    node: &Node,
    value: &Value,
    mut found: Option<&mut Vec<Value>>,
    unwrap: bool,
) -> ExecResult {
    let Value::Object(pairs) = value else {
        if unwrap && let Value::Array(arr) = value {
            return exec.execute_unwrap_target_array(node, arr, found, false);
        }
        return exec.soft_error(
            "jsonpath item method .keyvalue() can only be applied to an object".into(),
        );
    };
    if pairs.is_empty() {
        return Ok(Status::NotFound);
    }
    let id = exec.keyvalue_id(value);
    let mut result = Status::NotFound;
    for (k, v) in pairs {
        let pair = Value::Object(vec![
            ("key".to_string(), Value::String(k.clone())),
            ("value".to_string(), v.clone()),
            ("id".to_string(), Value::Int(id)),
        ]);
        let base_id = exec.next_generated_object_id();
        let res = exec.with_base_object(&pair, base_id, |exec| {
            exec.execute_next(node, &pair, found.as_deref_mut())
        })?;
        match res {
            Status::Failed => return Ok(res),
            Status::Ok => {
                if found.is_none() {
                    return Ok(Status::Ok);
                }
                result = Status::Ok;
            }
            Status::NotFound => {}
        }
    }
    Ok(result)
}

/// Text form of a numeric-method argument for error messages.
pub(super) fn number_arg_text(value: &Value) -> String {
    match value {
        Value::String(s) | Value::Numeric(s) => s.clone(),
        Value::Int(n) => n.to_string(),
        Value::Double(f) => crate::value::format_f64(*f),
        other => other.type_name().to_string(),
    }
}

/// Read a signed integer literal from a method-argument node.
pub(super) fn int_literal(node: &Node) -> Option<i64> {
    match &node.kind {
        NodeKind::Int(n) => Some(*n),
        NodeKind::Plus(inner) => match &inner.kind {
            NodeKind::Int(n) => Some(*n),
            _ => None,
        },
        NodeKind::Minus(inner) => match &inner.kind {
            NodeKind::Int(n) => n.checked_neg(),
            _ => None,
        },
        _ => None,
    }
}
