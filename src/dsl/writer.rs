//! Wire construction and grouping serializer.

use std::fmt;

use super::ast::{ComparisonOperator, FilterItem, LogicalOperator, ParsedFilter, WireLiteral};
use super::parser::parse_items;

impl FilterItem {
    /// Build an item from a canonical value.
    ///
    /// A leading `!` on the value selects the negated operator and `null`
    /// on an equality selects `=isnull=`. `NotLike` and `NotEqual` negate
    /// the given value, `IsNull` ignores it.
    pub fn new(
        attribute_id: impl Into<String>,
        operator: ComparisonOperator,
        value: impl Into<WireLiteral>,
    ) -> Self {
        let attribute_id = attribute_id.into();
        let value = value.into();
        let value = value.as_str();

        match operator {
            ComparisonOperator::Like => like_item(attribute_id, value),
            ComparisonOperator::NotLike => like_item(attribute_id, &format!("!{value}")),
            ComparisonOperator::Equal => equal_item(attribute_id, value),
            ComparisonOperator::NotEqual => equal_item(attribute_id, &format!("!{value}")),
            ComparisonOperator::IsNull => equal_item(attribute_id, "null"),
        }
    }
}

fn like_item(attribute_id: String, value: &str) -> FilterItem {
    let (operator, value) = match value.strip_prefix('!') {
        Some(rest) => (ComparisonOperator::NotLike, rest),
        None => (ComparisonOperator::Like, value),
    };

    FilterItem {
        attribute_id,
        operator,
        raw_value: format!("\"%{}%\"", escape(value)),
    }
}

fn equal_item(attribute_id: String, value: &str) -> FilterItem {
    let (negated, value) = match value.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, value),
    };

    if value.eq_ignore_ascii_case("null") {
        return FilterItem {
            attribute_id,
            operator: ComparisonOperator::IsNull,
            raw_value: if negated { "false" } else { "true" }.to_string(),
        };
    }

    let raw_value = if needs_quotes(value) {
        format!("\"{}\"", escape(value))
    } else {
        value.to_string()
    };

    FilterItem {
        attribute_id,
        operator: if negated {
            ComparisonOperator::NotEqual
        } else {
            ComparisonOperator::Equal
        },
        raw_value,
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Bare equality values must not contain anything the tokenizer splits on.
fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| matches!(c, ';' | ',' | '"' | '\\' | '(' | ')') || c.is_whitespace())
}

impl fmt::Display for FilterItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.attribute_id, self.operator, self.raw_value)
    }
}

/// Serialize items into a wire expression.
///
/// Items are grouped by attribute in first-seen order; a group is joined
/// with `,` when every member is a positive equality and with `;`
/// otherwise, and groups are joined with `;`.
pub fn serialize_items(items: &[FilterItem]) -> String {
    let mut groups: Vec<(&str, Vec<&FilterItem>)> = Vec::new();

    for item in items {
        match groups
            .iter_mut()
            .find(|(attribute_id, _)| *attribute_id == item.attribute_id)
        {
            Some((_, members)) => members.push(item),
            None => groups.push((item.attribute_id.as_str(), vec![item])),
        }
    }

    groups
        .iter()
        .map(|(_, members)| {
            let logical = members
                .iter()
                .map(|item| item.operator.logical_operator())
                .fold(LogicalOperator::Or, LogicalOperator::combine);
            let joined = members
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(&logical.separator().to_string());
            format!("({joined})")
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Rewrite an expression in canonical wire form.
pub fn normalize_expression(input: &str) -> String {
    serialize_items(&parse_items(input))
}

impl ParsedFilter {
    /// Serialize the structured view back to a wire expression.
    ///
    /// Group separators are derived from the values, so a stored
    /// `logical_operator` that disagrees with them is ignored.
    pub fn to_expression(&self) -> String {
        let items: Vec<FilterItem> = self
            .iter()
            .flat_map(|(attribute_id, record)| {
                record
                    .values
                    .iter()
                    .map(move |value| FilterItem::new(attribute_id, record.operator, value))
            })
            .collect();

        serialize_items(&items)
    }
}
