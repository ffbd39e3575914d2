/// Tri-valued predicate engine.
///
/// Predicates follow SQL's Kleene logic: `True`, `False`, `Unknown`.
/// Comparison operands each evaluate to a sequence (auto-unwrapped in lax
/// mode) and the predicate holds iff some pair from the cross product
/// satisfies it. Error handling interlocks with the mode: strict returns
/// `Unknown` on the first errored pair, lax keeps scanning and reports
/// `Unknown` only when nothing matched.
use std::cmp::Ordering;

use super::error::Error;
use super::eval::{Executor, Status};
use crate::path::{CmpOp, Node, NodeKind};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    pub(crate) fn from_bool(b: bool) -> Truth {
        if b { Truth::True } else { Truth::False }
    }

    pub(crate) fn and(self, other: Truth) -> Truth {
        match (self, other) {
            (Truth::False, _) | (_, Truth::False) => Truth::False,
            (Truth::True, Truth::True) => Truth::True,
            _ => Truth::Unknown,
        }
    }

    pub(crate) fn or(self, other: Truth) -> Truth {
        match (self, other) {
            (Truth::True, _) | (_, Truth::True) => Truth::True,
            (Truth::False, Truth::False) => Truth::False,
            _ => Truth::Unknown,
        }
    }

    pub(crate) fn not(self) -> Truth {
        match self {
            Truth::True => Truth::False,
            Truth::False => Truth::True,
            Truth::Unknown => Truth::Unknown,
        }
    }
}

impl Executor<'_> {
    /// Evaluate a predicate node to its tri-state outcome.
    pub(crate) fn execute_bool(&mut self, node: &Node, value: &Value) -> Result<Truth, Error> {
        match &node.kind {
            NodeKind::And(left, right) => {
                let lt = self.execute_bool(left, value)?;
                if lt == Truth::False {
                    return Ok(Truth::False);
                }
                let rt = self.execute_bool(right, value)?;
                Ok(lt.and(rt))
            }
            NodeKind::Or(left, right) => {
                let lt = self.execute_bool(left, value)?;
                if lt == Truth::True {
                    return Ok(Truth::True);
                }
                let rt = self.execute_bool(right, value)?;
                Ok(lt.or(rt))
            }
            NodeKind::Not(arg) => Ok(self.execute_bool(arg, value)?.not()),
            NodeKind::IsUnknown(arg) => {
                let st = self.execute_bool(arg, value)?;
                Ok(Truth::from_bool(st == Truth::Unknown))
            }
            NodeKind::Exists(arg) => self.execute_exists(arg, value),
            NodeKind::Compare(op, left, right) => {
                let op = *op;
                self.execute_predicate(left, Some(right), value, true, |exec, l, r| {
                    exec.compare_items(op, l, r)
                })
            }
            NodeKind::StartsWith(left, right) => {
                self.execute_predicate(left, Some(right), value, false, |_, whole, prefix| {
                    Ok(match (whole, prefix) {
                        (Value::String(w), Value::String(p)) => {
                            Truth::from_bool(w.starts_with(p.as_str()))
                        }
                        _ => Truth::Unknown,
                    })
                })
            }
            NodeKind::LikeRegex {
                expr,
                pattern,
                flags,
            } => {
                let key = node as *const Node as usize;
                let re = match self.regex_cache.get(&key) {
                    Some(re) => re.clone(),
                    None => match build_regex(pattern, flags) {
                        Ok(re) => {
                            self.regex_cache.insert(key, re.clone());
                            re
                        }
                        Err(msg) => {
                            return match self.soft_error(msg) {
                                Err(e) => Err(e),
                                Ok(_) => Ok(Truth::Unknown),
                            };
                        }
                    },
                };
                self.execute_predicate(expr, None, value, false, |_, subject, _| {
                    Ok(match subject {
                        Value::String(s) => Truth::from_bool(re.is_match(s)),
                        _ => Truth::Unknown,
                    })
                })
            }
            _ => Err(Error::Invalid("invalid jsonpath boolean expression".into())),
        }
    }

    /// `exists(path)`: true iff the argument yields at least one value
    /// without error. Strict mode evaluates the whole sequence so hidden
    /// errors still produce `Unknown`.
    fn execute_exists(&mut self, arg: &Node, value: &Value) -> Result<Truth, Error> {
        if self.lax {
            let st = self.with_suppressed(|exec| exec.execute_item(arg, value, None))?;
            Ok(match st {
                Status::Ok => Truth::True,
                Status::NotFound => Truth::False,
                Status::Failed => Truth::Unknown,
            })
        } else {
            let mut seq = Vec::new();
            let st = self.with_suppressed(|exec| {
                exec.execute_item_opt_unwrap_result(arg, value, false, &mut seq)
            })?;
            if st == Status::Failed {
                return Ok(Truth::Unknown);
            }
            Ok(Truth::from_bool(!seq.is_empty()))
        }
    }

    /// Cross-product predicate evaluation shared by comparisons,
    /// `starts with`, and `like_regex` (which has no right operand).
    fn execute_predicate(
        &mut self,
        left: &Node,
        right: Option<&Node>,
        value: &Value,
        unwrap_right: bool,
        mut check: impl FnMut(&mut Self, &Value, &Value) -> Result<Truth, Error>,
    ) -> Result<Truth, Error> {
        let mut lseq = Vec::new();
        let st = self.with_suppressed(|exec| {
            exec.execute_item_opt_unwrap_result(left, value, true, &mut lseq)
        })?;
        if st == Status::Failed {
            return Ok(Truth::Unknown);
        }

        let mut rseq = Vec::new();
        if let Some(right) = right {
            let st = self.with_suppressed(|exec| {
                exec.execute_item_opt_unwrap_result(right, value, unwrap_right, &mut rseq)
            })?;
            if st == Status::Failed {
                return Ok(Truth::Unknown);
            }
        } else {
            // Single-operand predicates still run the pair loop once.
            rseq.push(Value::Null);
        }

        let strict_absence_of_errors = !self.lax;
        let mut had_error = false;
        let mut found = false;
        for l in &lseq {
            for r in &rseq {
                match check(self, l, r)? {
                    Truth::Unknown => {
                        if strict_absence_of_errors {
                            return Ok(Truth::Unknown);
                        }
                        had_error = true;
                    }
                    Truth::True => {
                        if !strict_absence_of_errors {
                            return Ok(Truth::True);
                        }
                        found = true;
                    }
                    Truth::False => {}
                }
            }
        }
        if found {
            return Ok(Truth::True);
        }
        if had_error {
            return Ok(Truth::Unknown);
        }
        Ok(Truth::False)
    }

    /// Compare one pair of scalars. Numbers unify across the three
    /// numeric variants, strings compare bytewise, booleans as 0/1,
    /// datetimes via the cast lattice. Mixed or non-scalar pairs are
    /// `Unknown`; null pairs only define equality.
    fn compare_items(&mut self, op: CmpOp, l: &Value, r: &Value) -> Result<Truth, Error> {
        let ord: Option<Ordering> = match (l, r) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Null, _) | (_, Value::Null) => {
                return Ok(match op {
                    CmpOp::Eq => Truth::False,
                    CmpOp::Ne => Truth::True,
                    _ => Truth::Unknown,
                });
            }
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (a, b) if a.is_number() && b.is_number() => match (a.as_i64(), b.as_i64()) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => match (a.as_f64(), b.as_f64()) {
                    (Some(x), Some(y)) => x.partial_cmp(&y),
                    _ => None,
                },
            },
            (Value::String(a), Value::String(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            (Value::Datetime(a), Value::Datetime(b)) => match a.compare(b, self.use_tz) {
                Ok(ord) => ord,
                Err(e) => return Err(Error::from_datetime(e)),
            },
            _ => None,
        };
        let Some(ord) = ord else {
            return Ok(Truth::Unknown);
        };
        Ok(Truth::from_bool(match op {
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Ne => ord != Ordering::Equal,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Le => ord != Ordering::Greater,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Ge => ord != Ordering::Less,
        }))
    }
}

/// Compile a `like_regex` pattern with its XQuery flag string. Flags map
/// onto the regex crate's inline groups; `q` quotes the whole pattern.
fn build_regex(pattern: &str, flags: &str) -> Result<regex::Regex, String> {
    let mut case_insensitive = false;
    let mut dot_matches_newline = false;
    let mut multiline = false;
    let mut extended = false;
    let mut literal = false;
    for c in flags.chars() {
        match c {
            'i' => case_insensitive = true,
            's' => dot_matches_newline = true,
            'm' => multiline = true,
            'x' => extended = true,
            'q' => literal = true,
            _ => {
                return Err(format!(
                    "unrecognized flag character \"{c}\" in LIKE_REGEX predicate"
                ));
            }
        }
    }
    let mut p = String::new();
    let mut inline = String::new();
    if case_insensitive {
        inline.push('i');
    }
    if dot_matches_newline {
        inline.push('s');
    }
    if multiline {
        inline.push('m');
    }
    if extended && !literal {
        inline.push('x');
    }
    if !inline.is_empty() {
        p.push_str("(?");
        p.push_str(&inline);
        p.push(')');
    }
    if literal {
        p.push_str(&regex::escape(pattern));
    } else {
        p.push_str(pattern);
    }
    regex::Regex::new(&p).map_err(|e| format!("invalid regular expression: {e}"))
}
