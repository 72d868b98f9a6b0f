//! Column expressions evaluated row by row.
//!
//! Expressions follow SQL null semantics: comparisons and arithmetic with a
//! null operand yield null, `AND`/`OR` use three-valued logic, and a filter
//! keeps a row only when its predicate is `true`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::models::{ColumnType, Schema, Value};
use crate::table::Row;

/// A column expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expr {
    /// Value of a named column
    Column { name: String },

    /// Constant value
    Literal { value: Value },

    /// True when the operand is not null
    IsNotNull { expr: Box<Expr> },

    /// Equality
    Eq { left: Box<Expr>, right: Box<Expr> },

    /// Strictly greater than
    Gt { left: Box<Expr>, right: Box<Expr> },

    /// Strictly less than
    Lt { left: Box<Expr>, right: Box<Expr> },

    /// Floating-point division; null on a zero divisor
    Div { left: Box<Expr>, right: Box<Expr> },

    /// Logical conjunction
    And { left: Box<Expr>, right: Box<Expr> },

    /// Logical disjunction
    Or { left: Box<Expr>, right: Box<Expr> },
}

/// Reference a column by name.
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Column { name: name.into() }
}

/// A literal value.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal {
        value: value.into(),
    }
}

impl Expr {
    pub fn is_not_null(self) -> Expr {
        Expr::IsNotNull {
            expr: Box::new(self),
        }
    }

    pub fn equal_to(self, other: Expr) -> Expr {
        Expr::Eq {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn gt(self, other: Expr) -> Expr {
        Expr::Gt {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn lt(self, other: Expr) -> Expr {
        Expr::Lt {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn divide(self, other: Expr) -> Expr {
        Expr::Div {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn and(self, other: Expr) -> Expr {
        Expr::And {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn or(self, other: Expr) -> Expr {
        Expr::Or {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// Names of all columns this expression reads.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Column { name } => out.push(name),
            Expr::Literal { .. } => {}
            Expr::IsNotNull { expr } => expr.collect_columns(out),
            Expr::Eq { left, right }
            | Expr::Gt { left, right }
            | Expr::Lt { left, right }
            | Expr::Div { left, right }
            | Expr::And { left, right }
            | Expr::Or { left, right } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
        }
    }

    /// Type of the values this expression produces against `schema`.
    pub fn output_type(&self, schema: &Schema) -> ColumnType {
        match self {
            Expr::Column { name } => schema
                .index_of(name)
                .map(|i| schema.fields[i].column_type)
                .unwrap_or(ColumnType::Str),
            Expr::Literal { value } => value.column_type().unwrap_or(ColumnType::Str),
            Expr::Div { .. } => ColumnType::Float,
            Expr::IsNotNull { .. }
            | Expr::Eq { .. }
            | Expr::Gt { .. }
            | Expr::Lt { .. }
            | Expr::And { .. }
            | Expr::Or { .. } => ColumnType::Bool,
        }
    }

    /// Evaluate against one row. Unknown columns read as null; callers check
    /// [`Expr::columns`] against the schema first.
    pub fn eval(&self, schema: &Schema, row: &Row) -> Value {
        match self {
            Expr::Column { name } => schema
                .index_of(name)
                .and_then(|i| row.get(i))
                .cloned()
                .unwrap_or(Value::Null),
            Expr::Literal { value } => value.clone(),
            Expr::IsNotNull { expr } => Value::Bool(!expr.eval(schema, row).is_null()),
            Expr::Eq { left, right } => compare_with(left, right, schema, row, |o| o == Ordering::Equal),
            Expr::Gt { left, right } => compare_with(left, right, schema, row, |o| o == Ordering::Greater),
            Expr::Lt { left, right } => compare_with(left, right, schema, row, |o| o == Ordering::Less),
            Expr::Div { left, right } => {
                let numerator = left.eval(schema, row).as_f64();
                let denominator = right.eval(schema, row).as_f64();
                match (numerator, denominator) {
                    (Some(_), Some(d)) if d == 0.0 => Value::Null,
                    (Some(n), Some(d)) => Value::Float(n / d),
                    _ => Value::Null,
                }
            }
            Expr::And { left, right } => {
                let l = left.eval(schema, row).as_bool();
                let r = right.eval(schema, row).as_bool();
                match (l, r) {
                    (Some(false), _) | (_, Some(false)) => Value::Bool(false),
                    (Some(true), Some(true)) => Value::Bool(true),
                    _ => Value::Null,
                }
            }
            Expr::Or { left, right } => {
                let l = left.eval(schema, row).as_bool();
                let r = right.eval(schema, row).as_bool();
                match (l, r) {
                    (Some(true), _) | (_, Some(true)) => Value::Bool(true),
                    (Some(false), Some(false)) => Value::Bool(false),
                    _ => Value::Null,
                }
            }
        }
    }

    /// True only when the expression evaluates to boolean `true`.
    pub fn matches(&self, schema: &Schema, row: &Row) -> bool {
        self.eval(schema, row).as_bool().unwrap_or(false)
    }
}

fn compare_with(
    left: &Expr,
    right: &Expr,
    schema: &Schema,
    row: &Row,
    test: impl Fn(Ordering) -> bool,
) -> Value {
    let l = left.eval(schema, row);
    let r = right.eval(schema, row);
    l.compare(&r)
        .map(|ordering| Value::Bool(test(ordering)))
        .unwrap_or(Value::Null)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column { name } => write!(f, "{}", name),
            Expr::Literal { value: Value::Str(s) } => write!(f, "'{}'", s),
            Expr::Literal { value } => write!(f, "{}", value),
            Expr::IsNotNull { expr } => write!(f, "({} IS NOT NULL)", expr),
            Expr::Eq { left, right } => write!(f, "({} = {})", left, right),
            Expr::Gt { left, right } => write!(f, "({} > {})", left, right),
            Expr::Lt { left, right } => write!(f, "({} < {})", left, right),
            Expr::Div { left, right } => write!(f, "({} / {})", left, right),
            Expr::And { left, right } => write!(f, "({} AND {})", left, right),
            Expr::Or { left, right } => write!(f, "({} OR {})", left, right),
        }
    }
}
