/// Path evaluator — a recursive walk over the node chain.
///
/// Three mutually recursive entry points, mirroring how operators consume
/// their operands:
///   * `execute_item` — canonical step with the mode's auto-unwrap;
///   * `execute_item_opt_unwrap_result` — post-hoc unwrapping of whatever
///     the subtree produced (comparison and arithmetic operands);
///   * `execute_item_opt_unwrap_target` — the variant switch; fans out
///     over array elements when unwrapping applies.
///
/// Results accumulate into an optional found list; passing `None` asks
/// only for existence and lets matching short-circuit. Every entry checks
/// the cooperative cancellation flag.
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use super::Options;
use super::error::Error;
use super::methods;
use crate::path::{ArithOp, Node, NodeKind, Path, Subscript};
use crate::value::Value;

const MAX_EVAL_DEPTH: usize = 512;

/// Multiplier separating the keyvalue base-object id from the member
/// sequence within it.
pub(crate) const KEYVALUE_ID_STRIDE: i64 = 10_000_000_000;

/// Outcome of one evaluation step. `Failed` carries a soft error that
/// silent mode swallowed; `NotFound` is not an error, just "no matches".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Status {
    Ok,
    NotFound,
    Failed,
}

pub(crate) type ExecResult = Result<Status, Error>;

/// The active `.keyvalue()` base: identity of the owning object plus its
/// assigned id.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BaseObject {
    addr: usize,
    id: i64,
}

pub(crate) struct Executor<'a> {
    path: &'a Path,
    pub(crate) lax: bool,
    root: &'a Value,
    /// `@` inside the innermost filter.
    current: Value,
    vars: &'a Value,
    pub(crate) use_tz: bool,
    /// False under silent evaluation: soft errors become `Failed`.
    verbose: bool,
    /// Structural errors are skipped instead of raised. Derived from the
    /// mode, temporarily forced on inside `.**`.
    ignore_structural_errors: bool,
    /// Soft errors are demoted while evaluating predicate operands.
    suppress_errors: bool,
    /// Length of the nearest enclosing array under subscript evaluation;
    /// -1 outside, so `last` can detect misuse.
    innermost_array_size: i64,
    base_object: BaseObject,
    last_generated_object_id: i64,
    /// Member-sequence memo for keyvalue ids, keyed by object identity.
    object_ids: HashMap<usize, i64>,
    next_member_seq: i64,
    /// Compiled `like_regex` patterns, keyed by node identity.
    pub(crate) regex_cache: HashMap<usize, regex::Regex>,
    cancel: Option<Arc<AtomicBool>>,
    depth: usize,
}

fn object_addr(v: &Value) -> usize {
    match v {
        Value::Object(pairs) => pairs.as_ptr() as usize,
        _ => 0,
    }
}

impl<'a> Executor<'a> {
    pub(crate) fn new(path: &'a Path, root: &'a Value, opts: &'a Options) -> Executor<'a> {
        Executor {
            path,
            lax: path.is_lax(),
            root,
            current: Value::Null,
            vars: &opts.vars,
            use_tz: opts.use_tz,
            verbose: !opts.silent,
            ignore_structural_errors: path.is_lax(),
            suppress_errors: false,
            innermost_array_size: -1,
            base_object: BaseObject { addr: 0, id: 0 },
            last_generated_object_id: 1,
            object_ids: HashMap::new(),
            next_member_seq: 0,
            regex_cache: HashMap::new(),
            cancel: opts.cancel.clone(),
            depth: 0,
        }
    }

    /// Run the whole path against the root value. With `collect` false,
    /// only existence is determined and matching short-circuits.
    pub(crate) fn execute(&mut self, collect: bool) -> Result<(Status, Vec<Value>), Error> {
        let path = self.path;
        let root = self.root;
        let mut found = Vec::new();
        let status = self.execute_item(
            &path.root,
            root,
            if collect { Some(&mut found) } else { None },
        )?;
        Ok((status, found))
    }

    fn check_signals(&self) -> Result<(), Error> {
        if let Some(cancel) = &self.cancel
            && cancel.load(AtomicOrdering::Relaxed)
        {
            return Err(Error::Execution("context canceled".into()));
        }
        Ok(())
    }

    /// Raise a soft type error: surfaced when verbose, `Failed` otherwise.
    pub(crate) fn soft_error(&self, msg: String) -> ExecResult {
        if self.verbose && !self.suppress_errors {
            Err(Error::Verbose(msg))
        } else {
            Ok(Status::Failed)
        }
    }

    /// Raise an already-built error, demoting `Verbose` per the flags.
    pub(crate) fn raise(&self, err: Error) -> ExecResult {
        match err {
            Error::Verbose(msg) => self.soft_error(msg),
            other => Err(other),
        }
    }

    /// Structural mismatch: skipped in lax mode, soft error in strict.
    pub(crate) fn structural_error(&self, msg: String) -> ExecResult {
        if self.ignore_structural_errors {
            Ok(Status::NotFound)
        } else {
            self.soft_error(msg)
        }
    }

    /// Run `f` with soft errors demoted to `Failed` (predicate operands).
    pub(crate) fn with_suppressed<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.suppress_errors;
        self.suppress_errors = true;
        let res = f(self);
        self.suppress_errors = saved;
        res
    }

    fn set_base_object(&mut self, value: &Value, id: i64) -> BaseObject {
        std::mem::replace(
            &mut self.base_object,
            BaseObject {
                addr: object_addr(value),
                id,
            },
        )
    }

    /// The keyvalue id for a source object: members of the current base
    /// get `base_id * stride + member_seq`, the base itself gets offset 0.
    pub(crate) fn keyvalue_id(&mut self, value: &Value) -> i64 {
        let addr = object_addr(value);
        let offset = if addr == self.base_object.addr {
            0
        } else {
            match self.object_ids.get(&addr) {
                Some(&seq) => seq,
                None => {
                    self.next_member_seq += 1;
                    self.object_ids.insert(addr, self.next_member_seq);
                    self.next_member_seq
                }
            }
        };
        self.base_object.id * KEYVALUE_ID_STRIDE + offset
    }

    /// Fresh base id for a generated keyvalue pair object.
    pub(crate) fn next_generated_object_id(&mut self) -> i64 {
        self.last_generated_object_id += 1;
        self.last_generated_object_id
    }

    pub(crate) fn with_base_object<T>(
        &mut self,
        value: &Value,
        id: i64,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = self.set_base_object(value, id);
        let res = f(self);
        self.base_object = saved;
        res
    }

    // -----------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------

    pub(crate) fn execute_item(
        &mut self,
        node: &Node,
        value: &Value,
        found: Option<&mut Vec<Value>>,
    ) -> ExecResult {
        let unwrap = self.lax;
        self.execute_item_opt_unwrap_target(node, value, found, unwrap)
    }

    /// Evaluate a subtree and optionally unwrap arrays in its result
    /// sequence (one level), as comparison and arithmetic operands do.
    pub(crate) fn execute_item_opt_unwrap_result(
        &mut self,
        node: &Node,
        value: &Value,
        unwrap: bool,
        found: &mut Vec<Value>,
    ) -> ExecResult {
        if unwrap && self.lax {
            let mut seq = Vec::new();
            let res = self.execute_item(node, value, Some(&mut seq))?;
            for v in seq {
                match v {
                    Value::Array(elems) => found.extend(elems),
                    other => found.push(other),
                }
            }
            return Ok(res);
        }
        self.execute_item(node, value, Some(found))
    }

    /// Continue with the node's `next` step, or record `value` as a match.
    pub(crate) fn execute_next(
        &mut self,
        node: &Node,
        value: &Value,
        found: Option<&mut Vec<Value>>,
    ) -> ExecResult {
        match node.next.as_deref() {
            Some(next) => self.execute_item(next, value, found),
            None => {
                if let Some(found) = found {
                    found.push(value.clone());
                }
                Ok(Status::Ok)
            }
        }
    }

    /// Re-dispatch the current node over each element of an array (lax
    /// auto-unwrap of the target).
    pub(crate) fn execute_unwrap_target_array(
        &mut self,
        node: &Node,
        array: &[Value],
        mut found: Option<&mut Vec<Value>>,
        unwrap_elements: bool,
    ) -> ExecResult {
        let mut result = Status::NotFound;
        for v in array {
            let res = self.execute_item_opt_unwrap_target(node, v, found.as_deref_mut(), unwrap_elements)?;
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

    /// The variant switch.
    pub(crate) fn execute_item_opt_unwrap_target(
        &mut self,
        node: &Node,
        value: &Value,
        found: Option<&mut Vec<Value>>,
        unwrap: bool,
    ) -> ExecResult {
        self.check_signals()?;
        if self.depth >= MAX_EVAL_DEPTH {
            return Err(Error::Execution("evaluation depth limit exceeded".into()));
        }
        self.depth += 1;
        let res = self.dispatch(node, value, found, unwrap);
        self.depth -= 1;
        res
    }

    fn dispatch(
        &mut self,
        node: &Node,
        value: &Value,
        mut found: Option<&mut Vec<Value>>,
        unwrap: bool,
    ) -> ExecResult {
        match &node.kind {
            NodeKind::Root => {
                let root = self.root;
                self.with_base_object(root, 0, |exec| exec.execute_next(node, root, found))
            }

            NodeKind::Current => {
                let current = self.current.clone();
                self.execute_next(node, &current, found)
            }

            NodeKind::Variable(name) => {
                let vars = self.vars;
                let Some(v) = vars.object_key(name) else {
                    return Err(Error::Execution(format!(
                        "could not find jsonpath variable \"{name}\""
                    )));
                };
                self.with_base_object(vars, 1, |exec| exec.execute_next(node, v, found))
            }

            NodeKind::Last => {
                if self.innermost_array_size < 0 {
                    return Err(Error::Execution(
                        "evaluating jsonpath LAST outside of array subscript".into(),
                    ));
                }
                let last = Value::Int(self.innermost_array_size - 1);
                self.execute_next(node, &last, found)
            }

            NodeKind::Null => self.execute_next(node, &Value::Null, found),
            NodeKind::Bool(b) => self.execute_next(node, &Value::Bool(*b), found),
            NodeKind::Int(n) => self.execute_next(node, &Value::Int(*n), found),
            NodeKind::Numeric(s) => {
                let v = Value::Numeric(s.clone());
                self.execute_next(node, &v, found)
            }
            NodeKind::String(s) => {
                let v = Value::String(s.clone());
                self.execute_next(node, &v, found)
            }

            NodeKind::Key(name) => match value {
                Value::Object(_) => match value.object_key(name) {
                    Some(v) => self.execute_next(node, v, found),
                    None => self.structural_error(format!(
                        "JSON object does not contain key \"{name}\""
                    )),
                },
                Value::Array(arr) if unwrap => {
                    self.execute_unwrap_target_array(node, arr, found, false)
                }
                _ => self.structural_error(
                    "jsonpath member accessor can only be applied to an object".into(),
                ),
            },

            NodeKind::AnyKey => match value {
                Value::Object(_) => {
                    let unwrap_next = self.lax;
                    self.execute_any_item(node.next.as_deref(), value, found, 1, 1, 1, false, unwrap_next)
                }
                Value::Array(arr) if unwrap => {
                    self.execute_unwrap_target_array(node, arr, found, false)
                }
                _ => self.structural_error(
                    "jsonpath wildcard member accessor can only be applied to an object".into(),
                ),
            },

            NodeKind::AnyArray => match value {
                Value::Array(_) => {
                    let unwrap_next = self.lax;
                    self.execute_any_item(node.next.as_deref(), value, found, 1, 1, 1, false, unwrap_next)
                }
                _ if self.lax => self.execute_next(node, value, found),
                _ => self.structural_error(
                    "jsonpath wildcard array accessor can only be applied to an array".into(),
                ),
            },

            NodeKind::Any { first, last } => {
                let mut result = Status::NotFound;
                // Depth 0 is the value itself; structural errors never
                // escape a recursive descent.
                if *first == 0 {
                    let saved = self.ignore_structural_errors;
                    self.ignore_structural_errors = true;
                    let res = self.execute_next(node, value, found.as_deref_mut());
                    self.ignore_structural_errors = saved;
                    match res? {
                        Status::Failed => return Ok(Status::Failed),
                        Status::Ok => {
                            if found.is_none() {
                                return Ok(Status::Ok);
                            }
                            result = Status::Ok;
                        }
                        Status::NotFound => {}
                    }
                }
                if matches!(value, Value::Object(_) | Value::Array(_)) {
                    let unwrap_next = self.lax;
                    let res = self.execute_any_item(
                        node.next.as_deref(),
                        value,
                        found,
                        1,
                        (*first).max(1),
                        *last,
                        true,
                        unwrap_next,
                    )?;
                    if res != Status::NotFound {
                        result = res;
                    }
                }
                Ok(result)
            }

            NodeKind::IndexArray(subscripts) => self.execute_index_array(node, subscripts, value, found),

            NodeKind::Filter(pred) => {
                if unwrap && let Value::Array(arr) = value {
                    return self.execute_unwrap_target_array(node, arr, found, false);
                }
                let st = self.execute_nested_bool(pred, value)?;
                if st != super::predicate::Truth::True {
                    return Ok(Status::NotFound);
                }
                self.execute_next(node, value, found)
            }

            NodeKind::Method(method, args) => {
                methods::execute_method(self, node, *method, args, value, found, unwrap)
            }

            NodeKind::Plus(operand) => self.execute_unary_arith(node, operand, value, found, false),
            NodeKind::Minus(operand) => self.execute_unary_arith(node, operand, value, found, true),

            NodeKind::Arith(op, left, right) => {
                self.execute_binary_arith(node, *op, left, right, value, found)
            }

            NodeKind::And(..)
            | NodeKind::Or(..)
            | NodeKind::Not(_)
            | NodeKind::IsUnknown(_)
            | NodeKind::Exists(_)
            | NodeKind::Compare(..)
            | NodeKind::StartsWith(..)
            | NodeKind::LikeRegex { .. } => {
                let st = self.execute_bool(node, value)?;
                self.append_bool_result(node, found, st)
            }
        }
    }

    /// Recursive descent helper: walk members of `value`, executing the
    /// chain continuation at every level within `[first, last]`.
    #[allow(clippy::too_many_arguments)]
    fn execute_any_item(
        &mut self,
        next: Option<&Node>,
        value: &Value,
        mut found: Option<&mut Vec<Value>>,
        level: u32,
        first: u32,
        last: u32,
        ignore_structural: bool,
        unwrap_next: bool,
    ) -> ExecResult {
        let mut result = Status::NotFound;
        if level > last {
            return Ok(result);
        }
        let members: Vec<&Value> = match value {
            Value::Object(pairs) => pairs.iter().map(|(_, v)| v).collect(),
            Value::Array(arr) => arr.iter().collect(),
            _ => return Ok(result),
        };
        for v in members {
            if level >= first {
                let res = match next {
                    Some(next) => {
                        if ignore_structural {
                            let saved = self.ignore_structural_errors;
                            self.ignore_structural_errors = true;
                            let res = self.execute_item_opt_unwrap_target(
                                next,
                                v,
                                found.as_deref_mut(),
                                unwrap_next,
                            );
                            self.ignore_structural_errors = saved;
                            res?
                        } else {
                            self.execute_item_opt_unwrap_target(
                                next,
                                v,
                                found.as_deref_mut(),
                                unwrap_next,
                            )?
                        }
                    }
                    None => {
                        if let Some(found) = found.as_deref_mut() {
                            found.push(v.clone());
                        }
                        Status::Ok
                    }
                };
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
            if level < last && matches!(v, Value::Object(_) | Value::Array(_)) {
                let res = self.execute_any_item(
                    next,
                    v,
                    found.as_deref_mut(),
                    level + 1,
                    first,
                    last,
                    ignore_structural,
                    unwrap_next,
                )?;
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
        }
        Ok(result)
    }

    // -----------------------------------------------------------------
    // Array subscripts
    // -----------------------------------------------------------------

    fn execute_index_array(
        &mut self,
        node: &Node,
        subscripts: &[Subscript],
        value: &Value,
        found: Option<&mut Vec<Value>>,
    ) -> ExecResult {
        if !matches!(value, Value::Array(_)) && !self.lax {
            return self.structural_error(
                "jsonpath array accessor can only be applied to an array".into(),
            );
        }
        let size = match value {
            Value::Array(arr) => arr.len() as i64,
            _ => 1, // lax auto-wrap of a scalar
        };
        let saved = self.innermost_array_size;
        self.innermost_array_size = size;
        let res = self.execute_subscripts(node, subscripts, value, size, found);
        self.innermost_array_size = saved;
        res
    }

    fn execute_subscripts(
        &mut self,
        node: &Node,
        subscripts: &[Subscript],
        value: &Value,
        size: i64,
        mut found: Option<&mut Vec<Value>>,
    ) -> ExecResult {
        let mut result = Status::NotFound;
        for sub in subscripts {
            let index_from = self.get_array_index(&sub.from, value)?;
            let index_to = match &sub.to {
                Some(to) => self.get_array_index(to, value)?,
                None => index_from,
            };
            if !self.ignore_structural_errors
                && (index_from < 0 || index_from > index_to || index_to >= size)
            {
                let res = self.soft_error("jsonpath array subscript is out of bounds".into())?;
                return Ok(res);
            }
            let index_from = index_from.max(0);
            let index_to = index_to.min(size - 1);
            for index in index_from..=index_to {
                let v = match value {
                    Value::Array(arr) => &arr[index as usize],
                    other => other, // auto-wrapped singleton
                };
                let res = self.execute_next(node, v, found.as_deref_mut())?;
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
        }
        Ok(result)
    }

    /// Evaluate a subscript expression to a single array index, with the
    /// enclosing array installed so `last` resolves.
    fn get_array_index(&mut self, node: &Node, value: &Value) -> Result<i64, Error> {
        let mut seq = Vec::new();
        self.execute_item(node, value, Some(&mut seq))?;
        if seq.len() != 1 || !seq[0].is_number() {
            return Err(Error::Execution(
                "jsonpath array subscript is not a single numeric value".into(),
            ));
        }
        let Some(f) = seq[0].as_f64() else {
            return Err(Error::Execution(
                "jsonpath array subscript is not a single numeric value".into(),
            ));
        };
        let rounded = f.round();
        if !rounded.is_finite() || rounded < i32::MIN as f64 || rounded > i32::MAX as f64 {
            return Err(Error::Execution(
                "jsonpath array subscript is out of integer range".into(),
            ));
        }
        Ok(rounded as i64)
    }

    // -----------------------------------------------------------------
    // Arithmetic
    // -----------------------------------------------------------------

    fn execute_unary_arith(
        &mut self,
        node: &Node,
        operand: &Node,
        value: &Value,
        mut found: Option<&mut Vec<Value>>,
        negate: bool,
    ) -> ExecResult {
        let mut seq = Vec::new();
        let st = self.execute_item_opt_unwrap_result(operand, value, true, &mut seq)?;
        if st == Status::Failed {
            return Ok(st);
        }
        let mut result = Status::NotFound;
        for v in seq {
            let out = if !v.is_number() {
                let op = if negate { "-" } else { "+" };
                return self.soft_error(format!(
                    "operand of unary jsonpath operator {op} is not a numeric value"
                ));
            } else if !negate {
                v
            } else if let Some(n) = v.as_i64() {
                match n.checked_neg() {
                    Some(m) => Value::Int(m),
                    None => return Err(Error::Execution("integer out of range".into())),
                }
            } else {
                match v.as_f64() {
                    Some(f) => Value::Double(-f),
                    None => {
                        return self.soft_error(
                            "operand of unary jsonpath operator - is not a numeric value".into(),
                        );
                    }
                }
            };
            let res = self.execute_next(node, &out, found.as_deref_mut())?;
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

    fn execute_binary_arith(
        &mut self,
        node: &Node,
        op: ArithOp,
        left: &Node,
        right: &Node,
        value: &Value,
        found: Option<&mut Vec<Value>>,
    ) -> ExecResult {
        let mut lseq = Vec::new();
        let st = self.execute_item_opt_unwrap_result(left, value, true, &mut lseq)?;
        if st == Status::Failed {
            return Ok(st);
        }
        if lseq.len() != 1 || !lseq[0].is_number() {
            return self.soft_error(format!(
                "left operand of jsonpath operator {} is not a single numeric value",
                op.symbol()
            ));
        }
        let mut rseq = Vec::new();
        let st = self.execute_item_opt_unwrap_result(right, value, true, &mut rseq)?;
        if st == Status::Failed {
            return Ok(st);
        }
        if rseq.len() != 1 || !rseq[0].is_number() {
            return self.soft_error(format!(
                "right operand of jsonpath operator {} is not a single numeric value",
                op.symbol()
            ));
        }
        let out = binary_arith(op, &lseq[0], &rseq[0])?;
        self.execute_next(node, &out, found)
    }

    // -----------------------------------------------------------------
    // Predicates as items
    // -----------------------------------------------------------------

    /// Evaluate a filter's predicate with `@` bound to `value`.
    pub(crate) fn execute_nested_bool(
        &mut self,
        pred: &Node,
        value: &Value,
    ) -> Result<super::predicate::Truth, Error> {
        let saved = std::mem::replace(&mut self.current, value.clone());
        let res = self.execute_bool(pred, value);
        self.current = saved;
        res
    }

    /// Append a predicate outcome as a JSON value (`Unknown` becomes
    /// null) and continue the chain.
    fn append_bool_result(
        &mut self,
        node: &Node,
        found: Option<&mut Vec<Value>>,
        st: super::predicate::Truth,
    ) -> ExecResult {
        if node.next.is_none() && found.is_none() {
            return Ok(Status::Ok);
        }
        let v = match st {
            super::predicate::Truth::True => Value::Bool(true),
            super::predicate::Truth::False => Value::Bool(false),
            super::predicate::Truth::Unknown => Value::Null,
        };
        self.execute_next(node, &v, found)
    }
}

/// Scalar arithmetic with the dialect's type rules: two integers stay
/// integer (checked), anything else goes through f64.
fn binary_arith(op: ArithOp, l: &Value, r: &Value) -> Result<Value, Error> {
    if let (Some(a), Some(b)) = (l.as_i64(), r.as_i64()) {
        let out = match op {
            ArithOp::Add => a.checked_add(b),
            ArithOp::Sub => a.checked_sub(b),
            ArithOp::Mul => a.checked_mul(b),
            ArithOp::Div => {
                if b == 0 {
                    return Err(Error::Execution("division by zero".into()));
                }
                a.checked_div(b)
            }
            ArithOp::Mod => {
                if b == 0 {
                    return Err(Error::Execution("division by zero".into()));
                }
                a.checked_rem(b)
            }
        };
        return match out {
            Some(n) => Ok(Value::Int(n)),
            None => Err(Error::Execution("integer out of range".into())),
        };
    }
    let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) else {
        return Err(Error::Invalid("non-numeric operand in arithmetic".into()));
    };
    let out = match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => {
            if b == 0.0 {
                return Err(Error::Execution("division by zero".into()));
            }
            a / b
        }
        ArithOp::Mod => {
            if b == 0.0 {
                return Err(Error::Execution("division by zero".into()));
            }
            a % b
        }
    };
    Ok(Value::Double(out))
}
