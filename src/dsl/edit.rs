//! Add/remove primitives over wire expressions.

use super::ast::{ComparisonOperator, FilterItem, WireLiteral};
use super::parser::parse_items;
use super::writer::serialize_items;
use crate::error::{FilterError, Result};

/// Result of [`add_item`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The item was added; carries the new expression.
    Changed(String),
    /// The exact item was already present, nothing to do.
    Duplicate,
}

impl AddOutcome {
    pub fn changed(&self) -> Option<&str> {
        match self {
            AddOutcome::Changed(expression) => Some(expression),
            AddOutcome::Duplicate => None,
        }
    }
}

/// Add an item to an expression.
///
/// With `replace_existing`, equality items already present for the
/// attribute are dropped first (single-select filters).
pub fn add_item(
    attribute_id: &str,
    value: impl Into<WireLiteral>,
    operator: ComparisonOperator,
    expression: &str,
    replace_existing: bool,
) -> Result<AddOutcome> {
    let mut items = parse_items(expression);
    if replace_existing {
        items.retain(|item| {
            item.attribute_id != attribute_id || item.operator.base() != ComparisonOperator::Equal
        });
    }

    let item = FilterItem::new(attribute_id, operator, value);
    if items.contains(&item) {
        tracing::debug!("Filter: '{}' already present", item);
        return Ok(AddOutcome::Duplicate);
    }

    if let Some(existing) = items
        .iter()
        .find(|other| other.attribute_id == item.attribute_id && other.operator.base() != item.operator.base())
    {
        return Err(FilterError::MixedOperators {
            attribute_id: item.attribute_id.clone(),
            existing: existing.operator.base(),
            requested: item.operator.base(),
        });
    }

    tracing::debug!("Filter: adding '{}'", item);
    items.push(item);
    Ok(AddOutcome::Changed(serialize_items(&items)))
}

/// Remove the first occurrence of an item, failing when it is absent.
pub fn try_remove_item(
    attribute_id: &str,
    value: impl Into<WireLiteral>,
    operator: ComparisonOperator,
    expression: &str,
) -> Result<String> {
    let mut items = parse_items(expression);
    let target = FilterItem::new(attribute_id, operator, value);

    let Some(position) = items.iter().position(|item| *item == target) else {
        return Err(FilterError::ItemNotFound {
            fragment: target.to_string(),
        });
    };

    tracing::debug!("Filter: removing '{}'", target);
    items.remove(position);
    Ok(serialize_items(&items))
}

/// Remove an item; an absent item is logged and the input returned as is.
pub fn remove_item(
    attribute_id: &str,
    value: impl Into<WireLiteral>,
    operator: ComparisonOperator,
    expression: &str,
) -> String {
    match try_remove_item(attribute_id, value, operator, expression) {
        Ok(updated) => updated,
        Err(err) => {
            tracing::warn!("Filter: {}", err);
            expression.to_string()
        }
    }
}

/// Drop every item of one attribute.
pub fn remove_attribute(attribute_id: &str, expression: &str) -> String {
    let mut items = parse_items(expression);
    let before = items.len();
    items.retain(|item| item.attribute_id != attribute_id);

    if items.len() == before {
        tracing::debug!("Filter: no items for '{}'", attribute_id);
        return expression.to_string();
    }
    serialize_items(&items)
}
