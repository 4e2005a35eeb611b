//! Value model for resulting variable bindings.
//!
//! The restricted interpreter converts Python objects into this closed set
//! so the check evaluator can compare them without holding a VM reference.
//! Equality follows Python semantics (`5 == 5.0`, `True == 1`), matching
//! what learners observe in the language itself.

use std::fmt;

use serde_json::Value as JsonValue;

/// A Python value captured from the execution scope.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// A lazily-produced sequence (`map`, `range`, a generator) that was
    /// materialized during capture. `class` is the Python type name, kept so
    /// the evaluator can tell the learner their result needed conversion.
    Lazy { class: String, items: Vec<Value> },
    /// Anything else; only its repr survives. Never compares equal.
    Opaque(String),
}

impl Value {
    /// Convert an expected literal from the catalog.
    pub fn from_json(value: &JsonValue) -> Value {
        match value {
            JsonValue::Null => Value::None,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => Value::Str(s.clone()),
            JsonValue::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            // Mappings are not part of the check vocabulary; keep the
            // literal text so a mismatch message stays readable.
            JsonValue::Object(_) => Value::Opaque(render_json_literal(value)),
        }
    }

    /// Python `==` semantics across the captured value set.
    pub fn python_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.python_eq(y))
            }
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Numeric view, with `bool` counting as 1/0 like in Python.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Python-repr-style rendering, used in learner-facing messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{}", quote_python(s)),
            Value::List(items) | Value::Lazy { items, .. } => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Opaque(repr) => write!(f, "{repr}"),
        }
    }
}

/// Render a JSON literal as Python source. Used both for synthesizing setup
/// assignments in the process sandbox and for quoting expected values in
/// feedback messages.
pub fn render_json_literal(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "None".to_string(),
        JsonValue::Bool(true) => "True".to_string(),
        JsonValue::Bool(false) => "False".to_string(),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else {
                format!("{:?}", n.as_f64().unwrap_or(f64::NAN))
            }
        }
        JsonValue::String(s) => quote_python(s),
        JsonValue::Array(items) => {
            let rendered: Vec<String> = items.iter().map(render_json_literal).collect();
            format!("[{}]", rendered.join(", "))
        }
        JsonValue::Object(map) => {
            let rendered: Vec<String> = map
                .iter()
                .map(|(key, val)| format!("{}: {}", quote_python(key), render_json_literal(val)))
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
    }
}

/// Single-quoted Python string literal with escapes.
fn quote_python(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn python_equality_crosses_numeric_types() {
        assert!(Value::Int(5).python_eq(&Value::Float(5.0)));
        assert!(Value::Bool(true).python_eq(&Value::Int(1)));
        assert!(!Value::Bool(false).python_eq(&Value::Int(2)));
        assert!(!Value::Str("5".into()).python_eq(&Value::Int(5)));
    }

    #[test]
    fn python_equality_on_lists_is_elementwise() {
        let a = Value::from_json(&json!([1, 2.0, "x"]));
        let b = Value::List(vec![
            Value::Float(1.0),
            Value::Int(2),
            Value::Str("x".into()),
        ]);
        assert!(a.python_eq(&b));
        assert!(!a.python_eq(&Value::List(vec![Value::Int(1)])));
    }

    #[test]
    fn lazy_and_opaque_never_compare_equal() {
        let lazy = Value::Lazy {
            class: "map".into(),
            items: vec![Value::Int(1)],
        };
        assert!(!lazy.python_eq(&Value::List(vec![Value::Int(1)])));
        assert!(!Value::Opaque("<f>".into()).python_eq(&Value::Opaque("<f>".into())));
    }

    #[test]
    fn renders_python_literals() {
        assert_eq!(render_json_literal(&json!(null)), "None");
        assert_eq!(render_json_literal(&json!(true)), "True");
        assert_eq!(render_json_literal(&json!(42)), "42");
        assert_eq!(render_json_literal(&json!(1.5)), "1.5");
        assert_eq!(render_json_literal(&json!("it's")), "'it\\'s'");
        assert_eq!(render_json_literal(&json!([1, "a"])), "[1, 'a']");
        assert_eq!(render_json_literal(&json!({"k": 1})), "{'k': 1}");
    }

    #[test]
    fn float_literals_keep_a_decimal_point() {
        assert_eq!(render_json_literal(&json!(32.0)), "32.0");
        assert_eq!(Value::Float(32.0).to_string(), "32.0");
    }

    #[test]
    fn display_matches_python_repr_shape() {
        let value = Value::List(vec![
            Value::Str("a".into()),
            Value::Int(1),
            Value::Bool(false),
            Value::None,
        ]);
        assert_eq!(value.to_string(), "['a', 1, False, None]");
    }
}
