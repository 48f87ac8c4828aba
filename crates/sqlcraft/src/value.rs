//! Dynamic values carried by conditions and data assignments.

use std::rc::Rc;

use crate::expr::Expr;
use crate::query::Query;

/// A deferred sub-builder.
///
/// The closure receives a fresh builder sharing the parent's dialect and is
/// compiled only when the enclosing statement renders. Clone-friendly via
/// [`Rc`], same as the parameter wrappers used elsewhere in the crate.
#[derive(Clone)]
pub struct SubQuery(Rc<dyn Fn(Query) -> Query>);

impl SubQuery {
    /// Wrap a sub-builder closure.
    pub fn new(f: impl Fn(Query) -> Query + 'static) -> Self {
        SubQuery(Rc::new(f))
    }

    /// Run the closure against a seed builder.
    pub(crate) fn apply(&self, seed: Query) -> Query {
        (self.0)(seed)
    }
}

impl std::fmt::Debug for SubQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SubQuery").field(&"<closure>").finish()
    }
}

/// A condition or data value.
///
/// Scalars bind as parameters; [`Value::Expr`] is emitted verbatim;
/// [`Value::Sub`] compiles to an embedded subquery at render time.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Expr(Expr),
    Sub(SubQuery),
}

impl Value {
    /// Wrap a deferred sub-builder as a value.
    pub fn sub(f: impl Fn(Query) -> Query + 'static) -> Self {
        Value::Sub(SubQuery::new(f))
    }

    /// Render the value as a SQL literal for debug substitution.
    ///
    /// Numeric values (including numeric-looking strings) stay unquoted;
    /// strings are single-quoted with backslash escaping.
    pub fn literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => {
                if s.parse::<i64>().is_ok() || s.parse::<f64>().is_ok() {
                    s.clone()
                } else {
                    format!("'{}'", escape(s))
                }
            }
            Value::List(items) => items
                .iter()
                .map(Value::literal)
                .collect::<Vec<_>>()
                .join(","),
            Value::Expr(e) => e.as_str().to_string(),
            Value::Sub(_) => "NULL".to_string(),
        }
    }

    /// Flatten into a candidate list for IN / BETWEEN compilation.
    ///
    /// Comma-separated strings split into one entry per segment; `Null`
    /// yields the empty list; any other scalar is a single-element list.
    pub(crate) fn into_list(self) -> Vec<Value> {
        match self {
            Value::List(items) => items,
            Value::Str(s) => s
                .split(',')
                .map(|part| Value::Str(part.trim().to_string()))
                .collect(),
            Value::Null => Vec::new(),
            other => vec![other],
        }
    }

    /// Convert to a `serde_json::Value` for JSON column encoding.
    pub(crate) fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Expr(e) => serde_json::Value::String(e.as_str().to_string()),
            Value::Sub(_) => serde_json::Value::Null,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Expr(a), Value::Expr(b)) => a == b,
            // Closures have no identity worth comparing.
            _ => false,
        }
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' | '\'' | '"' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

// ==================== Conversions ====================

macro_rules! value_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Expr> for Value {
    fn from(v: Expr) -> Self {
        Value::Expr(v)
    }
}

impl From<SubQuery> for Value {
    fn from(v: SubQuery) -> Self {
        Value::Sub(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            obj @ serde_json::Value::Object(_) => Value::Str(obj.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_scalars() {
        assert_eq!(Value::Null.literal(), "NULL");
        assert_eq!(Value::Bool(true).literal(), "1");
        assert_eq!(Value::Bool(false).literal(), "0");
        assert_eq!(Value::Int(42).literal(), "42");
        assert_eq!(Value::Float(0.5).literal(), "0.5");
    }

    #[test]
    fn literal_strings() {
        assert_eq!(Value::from("alice").literal(), "'alice'");
        // Numeric-looking strings stay unquoted.
        assert_eq!(Value::from("42").literal(), "42");
        assert_eq!(Value::from("O'Neil").literal(), r"'O\'Neil'");
    }

    #[test]
    fn into_list_splits_comma_strings() {
        let items = Value::from("1, 5,8").into_list();
        assert_eq!(
            items,
            vec![Value::from("1"), Value::from("5"), Value::from("8")]
        );
    }

    #[test]
    fn into_list_scalar_and_null() {
        assert_eq!(Value::Int(1).into_list(), vec![Value::Int(1)]);
        assert!(Value::Null.into_list().is_empty());
    }

    #[test]
    fn from_json() {
        let v: Value = serde_json::json!({"a": 1}).into();
        assert_eq!(v, Value::from(r#"{"a":1}"#));
        let v: Value = serde_json::json!([1, "x"]).into();
        assert_eq!(v, Value::List(vec![Value::Int(1), Value::from("x")]));
    }
}
