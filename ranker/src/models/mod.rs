//! Domain models for the player ranking pipeline.
//!
//! This module contains the core data structures shared by every stage:
//!
//! - [`Value`] - A single nullable cell
//! - [`ColumnType`] - Inferred type of a column
//! - [`Field`] / [`Schema`] - Ordered column descriptions
//! - [`columns`] - Names of the input and derived columns

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// =============================================================================
// Column names
// =============================================================================

/// Column names read from the players file and added by the pipeline.
pub mod columns {
    pub const SHORT_NAME: &str = "short_name";
    pub const LONG_NAME: &str = "long_name";
    pub const AGE: &str = "age";
    pub const HEIGHT_CM: &str = "height_cm";
    pub const WEIGHT_KG: &str = "weight_kg";
    pub const NATIONALITY: &str = "nationality";
    pub const CLUB_NAME: &str = "club_name";
    pub const OVERALL: &str = "overall";
    pub const POTENTIAL: &str = "potential";
    pub const TEAM_POSITION: &str = "team_position";

    pub const CAT_HEIGHT_BY_POSITION: &str = "cat_height_by_position";
    pub const PLAYER_CAT: &str = "player_cat";
    pub const POTENTIAL_VS_OVERALL: &str = "potential_vs_overall";

    /// Columns the input file must provide.
    pub const REQUIRED_INPUT: [&str; 10] = [
        SHORT_NAME,
        LONG_NAME,
        AGE,
        HEIGHT_CM,
        WEIGHT_KG,
        NATIONALITY,
        CLUB_NAME,
        OVERALL,
        POTENTIAL,
        TEAM_POSITION,
    ];

    /// Final output columns, in order.
    pub const OUTPUT: [&str; 13] = [
        SHORT_NAME,
        LONG_NAME,
        AGE,
        HEIGHT_CM,
        WEIGHT_KG,
        NATIONALITY,
        CLUB_NAME,
        OVERALL,
        POTENTIAL,
        TEAM_POSITION,
        PLAYER_CAT,
        POTENTIAL_VS_OVERALL,
        CAT_HEIGHT_BY_POSITION,
    ];
}

// =============================================================================
// Cell values
// =============================================================================

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value. Strings holding a number are coerced.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(s) => s.trim().parse::<f64>().ok(),
            Value::Bool(_) | Value::Null => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Compare two non-null values. Returns `None` if either side is null.
    ///
    /// Numbers compare numerically, strings lexicographically. A string
    /// against a number compares their textual forms.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                let (a, b) = (self.as_f64()?, other.as_f64()?);
                Some(a.total_cmp(&b))
            }
            _ => Some(self.to_string().cmp(&other.to_string())),
        }
    }

    /// Key used to group rows into partitions. Nulls share one group, as do
    /// `0.0`/`-0.0` and every NaN.
    pub fn group_key(&self) -> GroupKey {
        match self {
            Value::Null => GroupKey::Null,
            Value::Bool(b) => GroupKey::Bool(*b),
            Value::Int(i) => GroupKey::Int(*i),
            Value::Float(f) => GroupKey::Float(canonical_bits(*f)),
            Value::Str(s) => GroupKey::Str(s.clone()),
        }
    }

    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ColumnType::Bool),
            Value::Int(_) => Some(ColumnType::Int),
            Value::Float(_) => Some(ColumnType::Float),
            Value::Str(_) => Some(ColumnType::Str),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

fn canonical_bits(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0.0f64.to_bits()
    } else {
        f.to_bits()
    }
}

/// Hashable partition key derived from a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(String),
}

// =============================================================================
// Schema
// =============================================================================

/// Type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Bool,
    Int,
    Float,
    Str,
}

impl ColumnType {
    /// Name used when printing a schema.
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Bool => "boolean",
            ColumnType::Int => "integer",
            ColumnType::Float => "double",
            ColumnType::Str => "string",
        }
    }
}

/// A named, typed column. Every column is nullable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub column_type: ColumnType,
}

impl Field {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Ordered list of fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names from `required` that are not in this schema, in the given order.
    pub fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|name| !self.contains(name))
            .collect()
    }

    /// Render as a tree, one line per column.
    pub fn tree_string(&self) -> String {
        let mut out = String::from("root\n");
        for field in &self.fields {
            out.push_str(&format!(
                " |-- {}: {} (nullable = true)\n",
                field.name,
                field.column_type.type_name()
            ));
        }
        out
    }
}
