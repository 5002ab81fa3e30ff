//! Structured model of a filter expression.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{FilterError, Result};

/// Comparison operator of a single filter item.
///
/// The structured view only ever reports the two family operators (`Like`
/// and `Equal`); negation and null checks travel in the value as a `!`
/// prefix or the literal `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonOperator {
    #[serde(alias = "=like=")]
    Like,
    #[serde(alias = "=notlike=")]
    NotLike,
    #[serde(alias = "==")]
    Equal,
    #[serde(alias = "!=")]
    NotEqual,
    #[serde(alias = "=isnull=")]
    IsNull,
}

impl ComparisonOperator {
    /// Wire token, e.g. `=like=`.
    pub fn token(self) -> &'static str {
        match self {
            ComparisonOperator::Like => "=like=",
            ComparisonOperator::NotLike => "=notlike=",
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::IsNull => "=isnull=",
        }
    }

    /// Family operator used by the structured view.
    pub fn base(self) -> ComparisonOperator {
        match self {
            ComparisonOperator::Like | ComparisonOperator::NotLike => ComparisonOperator::Like,
            _ => ComparisonOperator::Equal,
        }
    }

    /// Positive equalities are alternatives, everything else narrows.
    pub fn logical_operator(self) -> LogicalOperator {
        match self {
            ComparisonOperator::Equal | ComparisonOperator::IsNull => LogicalOperator::Or,
            _ => LogicalOperator::And,
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ComparisonOperator {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "=like=" | "like" => Ok(ComparisonOperator::Like),
            "=notlike=" | "notlike" | "not_like" => Ok(ComparisonOperator::NotLike),
            "==" | "equal" | "eq" => Ok(ComparisonOperator::Equal),
            "!=" | "notequal" | "not_equal" | "ne" => Ok(ComparisonOperator::NotEqual),
            "=isnull=" | "isnull" | "is_null" => Ok(ComparisonOperator::IsNull),
            _ => Err(format!("invalid comparison operator: {value}")),
        }
    }
}

/// How items of one attribute group are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    And, // ;
    Or,  // ,
}

impl LogicalOperator {
    pub fn separator(self) -> char {
        match self {
            LogicalOperator::And => ';',
            LogicalOperator::Or => ',',
        }
    }

    /// A group stays `Or` only while every member is `Or`.
    pub fn combine(self, other: LogicalOperator) -> LogicalOperator {
        match (self, other) {
            (LogicalOperator::Or, LogicalOperator::Or) => LogicalOperator::Or,
            _ => LogicalOperator::And,
        }
    }
}

/// A single `attribute operator value` fragment in canonical wire form.
///
/// `raw_value` keeps the exact wire literal (quotes, `%` wildcards and
/// escapes included), so two items are equal exactly when they serialize
/// to the same fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterItem {
    pub attribute_id: String,
    pub operator: ComparisonOperator,
    pub raw_value: String,
}

/// Structured view of every value filtered on one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRecord {
    pub operator: ComparisonOperator,
    pub logical_operator: LogicalOperator,
    pub values: Vec<String>,
}

/// Attribute id to filter record mapping, rebuilt on every parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedFilter {
    records: BTreeMap<String, FilterRecord>,
}

impl ParsedFilter {
    pub fn get(&self, attribute_id: &str) -> Option<&FilterRecord> {
        self.records.get(attribute_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterRecord)> {
        self.records.iter().map(|(id, record)| (id.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fold one item into the view.
    ///
    /// The first item of an attribute fixes its family operator; an item
    /// from the other family is refused and leaves the view untouched.
    pub fn push(&mut self, item: &FilterItem) -> Result<()> {
        let operator = item.operator.base();
        let value = item.canonical_value();

        match self.records.get_mut(&item.attribute_id) {
            Some(record) if record.operator != operator => Err(FilterError::MixedOperators {
                attribute_id: item.attribute_id.clone(),
                existing: record.operator,
                requested: operator,
            }),
            Some(record) => {
                record.logical_operator = record
                    .logical_operator
                    .combine(item.operator.logical_operator());
                record.values.push(value);
                Ok(())
            }
            None => {
                self.records.insert(
                    item.attribute_id.clone(),
                    FilterRecord {
                        operator,
                        logical_operator: item.operator.logical_operator(),
                        values: vec![value],
                    },
                );
                Ok(())
            }
        }
    }
}

/// Textual wire form of a value handed to the engine.
///
/// Booleans and numbers are rendered once here so the rest of the pipeline
/// only deals in strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WireLiteral(String);

impl WireLiteral {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for WireLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WireLiteral {
    fn from(value: &str) -> Self {
        WireLiteral(value.to_string())
    }
}

impl From<String> for WireLiteral {
    fn from(value: String) -> Self {
        WireLiteral(value)
    }
}

impl From<&String> for WireLiteral {
    fn from(value: &String) -> Self {
        WireLiteral(value.clone())
    }
}

impl From<bool> for WireLiteral {
    fn from(value: bool) -> Self {
        WireLiteral(value.to_string())
    }
}

impl From<f64> for WireLiteral {
    fn from(value: f64) -> Self {
        WireLiteral(value.to_string())
    }
}

macro_rules! wire_literal_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for WireLiteral {
                fn from(value: $ty) -> Self {
                    WireLiteral(value.to_string())
                }
            }
        )*
    };
}

wire_literal_from_int!(i32, i64, u32, u64, usize);
