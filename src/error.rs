use thiserror::Error;

use crate::dsl::ComparisonOperator;

/// Errors produced while decomposing or editing a filter expression.
///
/// None of these are fatal: the lenient entry points log them and carry on
/// with the rest of the expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("no comparison operator in fragment '{fragment}'")]
    UnknownOperator { fragment: String },

    #[error("missing attribute name in fragment '{fragment}'")]
    MissingAttribute { fragment: String },

    #[error("invalid value in fragment '{fragment}': {reason}")]
    InvalidValue { fragment: String, reason: String },

    #[error(
        "attribute '{attribute_id}' already filtered with {existing}, cannot mix with {requested}"
    )]
    MixedOperators {
        attribute_id: String,
        existing: ComparisonOperator,
        requested: ComparisonOperator,
    },

    #[error("fragment '{fragment}' is not present in the expression")]
    ItemNotFound { fragment: String },
}

pub type Result<T> = std::result::Result<T, FilterError>;
