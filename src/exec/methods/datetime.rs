/// Datetime cast methods: `.date()`, `.time()`, `.time_tz()`,
/// `.timestamp()`, `.timestamp_tz()`, and the generic `.datetime()`.
///
/// String inputs run through the shared ISO parser first, then cast to
/// the target kind; datetime inputs (from an earlier step) cast directly.
use super::int_literal;
use crate::datetime::{self, Kind};
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

    let target = match method {
        Method::Date => Some(Kind::Date),
        Method::Time => Some(Kind::Time),
        Method::TimeTz => Some(Kind::TimeTz),
        Method::Timestamp => Some(Kind::Timestamp),
        Method::TimestampTz => Some(Kind::TimestampTz),
        _ => None,
    };

    // `.datetime(template)` is detected but not implemented.
    if method == Method::Datetime && !args.is_empty() {
        return Err(Error::Execution(
            ".datetime(template) is not yet supported".into(),
        ));
    }

    let mut precision = None;
    if let Some(arg) = args.first() {
        let m = method.name();
        let Some(n) = int_literal(arg) else {
            return Err(Error::Execution(format!(
                "invalid jsonpath item type for .{m}() time precision"
            )));
        };
        if n < i32::MIN as i64 || n > i32::MAX as i64 {
            return exec.soft_error(format!(
                "time precision of jsonpath item method .{m}() is out of integer range"
            ));
        }
        if n < 0 {
            return Err(Error::Execution(format!(
                "time precision of jsonpath item method .{m}() is invalid"
            )));
        }
        precision = Some((n as u32).min(6));
    }

    let parsed = match value {
        Value::Datetime(dt) => *dt,
        Value::String(s) => match datetime::parse_any(s) {
            Some(dt) => dt,
            None => {
                let target_name = target.map_or("datetime", Kind::method_name);
                return exec.soft_error(format!(
                    "{target_name} format is not recognized: \"{s}\""
                ));
            }
        },
        _ => {
            return exec.soft_error(format!(
                "jsonpath item method .{}() can only be applied to a string",
                method.name()
            ));
        }
    };

    let cast = match target {
        Some(kind) => match parsed.cast(kind, exec.use_tz) {
            Ok(dt) => dt,
            Err(e) => return exec.raise(Error::from_datetime(e)),
        },
        None => parsed,
    };
    let out = match precision {
        Some(p) => cast.round_precision(p),
        None => cast,
    };
    exec.execute_next(node, &Value::Datetime(out), found)
}
