pub mod datetime;
pub mod exec;
pub mod output;
pub mod path;
pub mod value;

pub use exec::{Error, Options, exists, first, matches, query};
pub use path::{Path, parse};
pub use value::Value;
