/// SQL/JSON value representation.
///
/// Uses `Int(i64)` for integers and keeps non-integer number literals as
/// their exact source text in `Numeric` (re-parsed on demand, integer
/// first, float on fallback). `Object` uses `Vec<(String, Value)>` to
/// preserve key insertion order. The five date/time variants produced by
/// the datetime item methods live behind the `Datetime` sum.
use crate::datetime::Datetime;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    /// Exact decimal literal from the input document, e.g. `"1.50"`.
    Numeric(String),
    String(String),
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
    Datetime(Datetime),
}

impl Value {
    /// Returns the SQL/JSON `.type()` name string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Double(_) | Value::Numeric(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Datetime(dt) => dt.type_name(),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Double(_) | Value::Numeric(_))
    }

    /// Numeric reading as f64. `Numeric` re-parses its literal text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Double(f) => Some(*f),
            Value::Numeric(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Numeric reading as i64, without rounding. `Int` passes through and
    /// `Numeric` must re-parse as an exact integer literal.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Numeric(s) => s.parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Object member lookup by key.
    pub fn object_key(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Convert a decoded `serde_json::Value` into the executor's value
    /// model. Integer literals become `Int`; everything else numeric keeps
    /// its source text as a lazy `Numeric`.
    pub fn from_json(v: &serde_json::Value) -> Value {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Numeric(n.to_string()),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(obj) => Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

/// Format an f64 the way `.string()` and the serializer emit numbers:
/// integer-valued doubles drop the fraction, everything else uses the
/// shortest round-trip form.
///
/// Strict `<` for the upper bound: i64::MAX as f64 rounds up to 2^63 which
/// doesn't fit in i64, so `f as i64` would saturate.
pub fn format_f64(f: f64) -> String {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        let mut buf = itoa::Buffer::new();
        buf.format(f as i64).to_string()
    } else {
        let mut buf = ryu::Buffer::new();
        buf.format(f).to_string()
    }
}
