/// Path execution: the public entry points and their options.
///
/// An executor instance lives for exactly one invocation; the parsed path
/// and the variable bindings are borrowed read-only, so callers may share
/// them freely across concurrent evaluations.
mod error;
mod eval;
mod methods;
mod predicate;

pub use error::Error;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::path::Path;
use crate::value::Value;
use eval::{Executor, Status};

/// Evaluation options: `$name` bindings, time-zone-dependent cast
/// enablement, silent suppression of soft errors, and a cooperative
/// cancellation flag.
#[derive(Debug, Clone)]
pub struct Options {
    pub(crate) vars: Value,
    pub(crate) use_tz: bool,
    pub(crate) silent: bool,
    pub(crate) cancel: Option<Arc<AtomicBool>>,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            vars: Value::Object(Vec::new()),
            use_tz: false,
            silent: false,
            cancel: None,
        }
    }
}

impl Options {
    pub fn new() -> Options {
        Options::default()
    }

    /// Bind `$name` variables for the evaluation.
    pub fn with_vars(mut self, vars: Vec<(String, Value)>) -> Options {
        self.vars = Value::Object(vars);
        self
    }

    /// Permit casts that depend on a time zone (session zone is UTC).
    pub fn with_tz(mut self, use_tz: bool) -> Options {
        self.use_tz = use_tz;
        self
    }

    /// Demote soft errors to SQL-NULL instead of surfacing them.
    pub fn silent(mut self, silent: bool) -> Options {
        self.silent = silent;
        self
    }

    /// Install a cancellation flag checked at every evaluation step.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Options {
        self.cancel = Some(cancel);
        self
    }
}

/// Evaluate the path and return every matched value in path order.
pub fn query(path: &Path, json: &Value, opts: &Options) -> Result<Vec<Value>, Error> {
    let mut exec = Executor::new(path, json, opts);
    let (status, found) = exec.execute(true)?;
    if status == Status::Failed {
        // A silently swallowed soft error: nothing trustworthy matched.
        return Ok(Vec::new());
    }
    Ok(found)
}

/// Evaluate the path and return only the first match.
pub fn first(path: &Path, json: &Value, opts: &Options) -> Result<Option<Value>, Error> {
    let mut found = query(path, json, opts)?;
    if found.is_empty() {
        Ok(None)
    } else {
        Ok(Some(found.remove(0)))
    }
}

/// Whether the path selects at least one value. `Ok(None)` is the
/// SQL-NULL outcome of a silently swallowed soft error.
pub fn exists(path: &Path, json: &Value, opts: &Options) -> Result<Option<bool>, Error> {
    let mut exec = Executor::new(path, json, opts);
    let (status, _) = exec.execute(false)?;
    Ok(match status {
        Status::Ok => Some(true),
        Status::NotFound => Some(false),
        Status::Failed => None,
    })
}

/// Evaluate the path as a predicate. The expression must produce exactly
/// one boolean; a single SQL/JSON null maps to `Ok(None)`, and any other
/// shape is a soft error (`None` when silent).
pub fn matches(path: &Path, json: &Value, opts: &Options) -> Result<Option<bool>, Error> {
    let mut exec = Executor::new(path, json, opts);
    let (status, found) = exec.execute(true)?;
    if status != Status::Failed && found.len() == 1 {
        match &found[0] {
            Value::Bool(b) => return Ok(Some(*b)),
            Value::Null => return Ok(None),
            _ => {}
        }
    }
    if status == Status::Failed || opts.silent {
        return Ok(None);
    }
    Err(Error::Verbose("single boolean result is expected".into()))
}
