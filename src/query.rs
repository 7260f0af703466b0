//! Fragment-based SELECT builder
//!
//! Builds read statements that the CRUD helpers do not cover, such as
//! joins across two tables. Fragments are kept in call order and joined
//! with spaces; nothing is reordered.
//!
//! ```
//! use mrdb::{Order, Query};
//!
//! let sql = Query::select(["id", "firstName"])
//!     .from("Person")
//!     .order_by([Order::asc("id"), Order::desc("firstName")])
//!     .build();
//! assert_eq!(sql, "SELECT id, firstName FROM Person ORDER BY id ASC, firstName DESC;");
//! ```

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::schema::TableRef;

static LIKE_PATTERN: OnceLock<Regex> = OnceLock::new();
static LIKE_REJECTED: OnceLock<Regex> = OnceLock::new();

fn like_pattern() -> &'static Regex {
    LIKE_PATTERN.get_or_init(|| Regex::new(r"\A[A-Za-z0-9_%/]+\z").expect("static pattern"))
}

fn like_rejected() -> &'static Regex {
    LIKE_REJECTED.get_or_init(|| Regex::new(r"[^A-Za-z0-9_%/]+").expect("static pattern"))
}

/// One ORDER BY term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.descending { "DESC" } else { "ASC" };
        write!(f, "{} {}", self.column, direction)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    fragments: Vec<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `SELECT <columns>`
    pub fn select<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new().push(format!("SELECT {}", join(columns)))
    }

    pub fn from<'a>(self, table: impl Into<TableRef<'a>>) -> Self {
        let table = table.into();
        self.push(format!("FROM {}", table.name()))
    }

    pub fn where_(self) -> Self {
        self.push("WHERE".to_string())
    }

    pub fn and(self) -> Self {
        self.push("AND".to_string())
    }

    pub fn or(self) -> Self {
        self.push("OR".to_string())
    }

    pub fn not(self) -> Self {
        self.push("NOT".to_string())
    }

    /// `<column> LIKE '<pattern>'`. Characters outside `[A-Za-z0-9_%/]`
    /// are stripped from the pattern before it is quoted.
    pub fn like(self, column: &str, pattern: &str) -> Self {
        let pattern = if like_pattern().is_match(pattern) {
            pattern.to_string()
        } else {
            like_rejected().replace_all(pattern, "").into_owned()
        };
        self.push(format!("{} LIKE '{}'", column, pattern))
    }

    /// `INNER JOIN <target> ON <target>.<target_column> = <source>.<source_column>`
    pub fn inner_join<'a, 'b>(
        self,
        source: impl Into<TableRef<'a>>,
        source_column: &str,
        target: impl Into<TableRef<'b>>,
        target_column: &str,
    ) -> Self {
        let (source, target) = (source.into(), target.into());
        self.push(format!(
            "INNER JOIN {target} ON {target}.{target_column} = {source}.{source_column}",
            target = target.name(),
            source = source.name(),
        ))
    }

    pub fn order_by(self, orders: impl IntoIterator<Item = Order>) -> Self {
        let terms: Vec<String> = orders.into_iter().map(|o| o.to_string()).collect();
        self.push(format!("ORDER BY {}", terms.join(", ")))
    }

    /// Append trusted SQL text verbatim
    pub fn expression(self, text: impl Into<String>) -> Self {
        self.push(text.into())
    }

    /// Single-line statement, terminated with `;`
    pub fn build(&self) -> String {
        format!("{};", self.fragments.join(" "))
    }

    fn push(mut self, fragment: String) -> Self {
        self.fragments.push(fragment);
        self
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{};", self.fragments.join("\n"))
    }
}

fn join<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
