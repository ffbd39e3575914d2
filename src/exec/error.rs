/// Evaluation error taxonomy.
///
/// Three kinds with stable, byte-for-byte message prefixes: `Execution`
/// and `Verbose` render as `exec: ...`, `Invalid` as `exec invalid: ...`.
/// `Verbose` errors are the "soft" type errors that silent evaluation
/// demotes to a failed status instead of surfacing.
use crate::datetime::DatetimeError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Hard failure: always surfaced to the caller.
    #[error("exec: {0}")]
    Execution(String),
    /// Soft type error: surfaced only when the caller did not request
    /// silent evaluation.
    #[error("exec: {0}")]
    Verbose(String),
    /// Internal consistency violation.
    #[error("exec invalid: {0}")]
    Invalid(String),
}

impl Error {
    pub(crate) fn from_datetime(e: DatetimeError) -> Error {
        match e {
            DatetimeError::NoTz { from, to } => Error::Execution(format!(
                "cannot convert value from {from} to {to} without time zone usage. \
                 HINT: Use WithTZ() option for time zone support"
            )),
            DatetimeError::Format { target, input } => {
                Error::Verbose(format!("{target} format is not recognized: \"{input}\""))
            }
        }
    }
}
