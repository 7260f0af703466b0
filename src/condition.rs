//! WHERE conditions
//!
//! Structured comparisons render as `column op ?` with the value bound, so
//! field data always goes through parameter binding. `Condition::Raw` is the
//! escape hatch: its text is concatenated into the statement unescaped and
//! the caller is responsible for its safety.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::value::Value;

/// Comparison operator of a structured condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Like => "LIKE",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Trusted SQL text, inserted verbatim
    Raw(String),
    Compare {
        column: String,
        op: Operator,
        value: Value,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

static SIMPLE_COMPARISON: OnceLock<Regex> = OnceLock::new();

fn simple_comparison() -> &'static Regex {
    SIMPLE_COMPARISON.get_or_init(|| {
        Regex::new(
            r"\A\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(-?\d+|-?\d+\.\d*|'[^']*')\s*;?\s*\z",
        )
        .expect("static pattern")
    })
}

impl Condition {
    pub fn raw(text: impl Into<String>) -> Self {
        Condition::Raw(text.into())
    }

    pub fn compare(column: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Condition::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Eq, value)
    }

    pub fn and(self, other: Condition) -> Self {
        match self {
            Condition::And(mut parts) => {
                parts.push(other);
                Condition::And(parts)
            }
            first => Condition::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Condition) -> Self {
        match self {
            Condition::Or(mut parts) => {
                parts.push(other);
                Condition::Or(parts)
            }
            first => Condition::Or(vec![first, other]),
        }
    }

    /// Lift a raw `column = literal` text into a bound comparison.
    ///
    /// Only a single equality against an integer, real or single-quoted
    /// string literal qualifies; anything else returns `None`. A
    /// double-quoted token names a column in SQLite and is left alone.
    pub fn parse_simple(text: &str) -> Option<Condition> {
        let caps = simple_comparison().captures(text)?;
        let column = caps.get(1)?.as_str();
        let literal = caps.get(2)?.as_str();

        let value = if let Ok(i) = literal.parse::<i64>() {
            Value::Integer(i)
        } else if let Ok(r) = literal.parse::<f64>() {
            Value::Real(r)
        } else {
            Value::Text(literal[1..literal.len() - 1].to_string())
        };

        Some(Condition::eq(column, value))
    }

    /// Raw conditions that are a simple equality become bound comparisons;
    /// everything else is returned unchanged.
    pub fn into_bindable(self) -> Condition {
        match self {
            Condition::Raw(text) => Condition::parse_simple(&text).unwrap_or(Condition::Raw(text)),
            other => other,
        }
    }

    /// Render to SQL text plus the values bound to its placeholders, in order
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut values = Vec::new();
        let sql = self.render(&mut values);
        (sql, values)
    }

    fn render(&self, values: &mut Vec<Value>) -> String {
        match self {
            Condition::Raw(text) => text.clone(),
            Condition::Compare { column, op, value } => {
                let op = match (op, value) {
                    (Operator::Eq, Value::Null) => "IS",
                    (Operator::NotEq, Value::Null) => "IS NOT",
                    (op, _) => op.as_str(),
                };
                values.push(value.clone());
                format!("{} {} ?", column, op)
            }
            Condition::And(parts) => Self::join(parts, " AND ", values),
            Condition::Or(parts) => Self::join(parts, " OR ", values),
        }
    }

    fn join(parts: &[Condition], separator: &str, values: &mut Vec<Value>) -> String {
        let rendered: Vec<String> = parts
            .iter()
            .map(|part| match part {
                Condition::And(_) | Condition::Or(_) => format!("({})", part.render(values)),
                _ => part.render(values),
            })
            .collect();
        rendered.join(separator)
    }
}

impl From<&str> for Condition {
    fn from(text: &str) -> Self {
        Condition::Raw(text.to_string())
    }
}

impl From<String> for Condition {
    fn from(text: String) -> Self {
        Condition::Raw(text)
    }
}
