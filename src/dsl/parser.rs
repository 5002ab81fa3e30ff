//! Normalizer and deep parser for wire expressions.
//!
//! Operator variants are folded into the canonical convention on the way in:
//!
//! | wire                 | canonical operator | canonical value |
//! |----------------------|--------------------|-----------------|
//! | `a=like="%V%"`       | `Like`             | `V`             |
//! | `a=like="%!V%"`      | `Like`             | `!V`            |
//! | `a=notlike="%V%"`    | `Like`             | `!V`            |
//! | `a==V`               | `Equal`            | `V`             |
//! | `a==!V`, `a!=V`      | `Equal`            | `!V`            |
//! | `a==null`            | `Equal`            | `null`          |
//! | `a=isnull=true`      | `Equal`            | `null`          |
//! | `a=isnull=false`     | `Equal`            | `!null`         |

use super::ast::{ComparisonOperator, FilterItem, ParsedFilter};
use super::lexer::{lex_item, tokenize, unquote};
use crate::error::{FilterError, Result};

/// Normalize a single fragment into a [`FilterItem`].
pub fn parse_item(fragment: &str) -> Result<FilterItem> {
    let raw = lex_item(fragment)?;
    let value = decode_value(raw.operator, raw.value).map_err(|reason| {
        FilterError::InvalidValue {
            fragment: fragment.to_string(),
            reason: reason.to_string(),
        }
    })?;

    Ok(FilterItem::new(
        raw.attribute,
        raw.operator.base(),
        value,
    ))
}

/// Tokenize and normalize an expression, dropping fragments that do not
/// parse.
pub fn parse_items(input: &str) -> Vec<FilterItem> {
    tokenize(input)
        .iter()
        .filter_map(|fragment| match parse_item(fragment) {
            Ok(item) => Some(item),
            Err(err) => {
                tracing::warn!("Filter: skipping fragment: {}", err);
                None
            }
        })
        .collect()
}

/// Parse an expression into its structured view.
///
/// Malformed fragments and items mixing operator families on an attribute
/// are logged and skipped; everything else is kept.
pub fn parse_filter(input: &str) -> ParsedFilter {
    let mut parsed = ParsedFilter::default();

    for item in parse_items(input) {
        if let Err(err) = parsed.push(&item) {
            tracing::warn!("Filter: skipping item '{}': {}", item, err);
        }
    }

    parsed
}

impl FilterItem {
    /// Value in the canonical `!`/`null` convention, e.g. `!CANCELLED`.
    pub fn canonical_value(&self) -> String {
        decode_value(self.operator, &self.raw_value).unwrap_or_else(|_| self.raw_value.clone())
    }
}

/// Turn a wire literal into its canonical value for the given operator.
fn decode_value(operator: ComparisonOperator, raw: &str) -> std::result::Result<String, &'static str> {
    match operator {
        ComparisonOperator::Like => decode_like(raw),
        ComparisonOperator::NotLike => decode_like(raw).map(|value| format!("!{value}")),
        ComparisonOperator::Equal => decode_bare(raw),
        ComparisonOperator::NotEqual => decode_bare(raw).map(|value| format!("!{value}")),
        ComparisonOperator::IsNull => match raw.to_ascii_lowercase().as_str() {
            "true" => Ok("null".to_string()),
            "false" => Ok("!null".to_string()),
            _ => Err("expected true or false"),
        },
    }
}

fn decode_like(raw: &str) -> std::result::Result<String, &'static str> {
    let value = decode_bare(raw)?;
    let value = value.strip_prefix('%').unwrap_or(&value);
    let value = value.strip_suffix('%').unwrap_or(value);
    Ok(value.to_string())
}

fn decode_bare(raw: &str) -> std::result::Result<String, &'static str> {
    if raw.starts_with('"') {
        return unquote(raw).ok_or("unterminated quoted value");
    }
    if raw.is_empty() {
        return Err("empty value");
    }
    Ok(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::ast::LogicalOperator;

    fn canonical(fragment: &str) -> (ComparisonOperator, String) {
        let item = parse_item(fragment).unwrap();
        (item.operator.base(), item.canonical_value())
    }

    #[test]
    fn test_normalize_like() {
        assert_eq!(
            canonical("name=like=\"%al%\""),
            (ComparisonOperator::Like, "al".into())
        );
    }

    #[test]
    fn test_normalize_not_like_variants() {
        let expected = (ComparisonOperator::Like, "!al".to_string());
        assert_eq!(canonical("name=like=\"%!al%\""), expected);
        assert_eq!(canonical("name=notlike=\"%al%\""), expected);
    }

    #[test]
    fn test_normalize_not_equal_variants() {
        let expected = (ComparisonOperator::Equal, "!CANCELLED".to_string());
        assert_eq!(canonical("status==!CANCELLED"), expected);
        assert_eq!(canonical("status!=CANCELLED"), expected);
    }

    #[test]
    fn test_normalize_null_variants() {
        let expected = (ComparisonOperator::Equal, "null".to_string());
        assert_eq!(canonical("env==null"), expected);
        assert_eq!(canonical("env==NULL"), expected);
        assert_eq!(canonical("env=isnull=true"), expected);
        assert_eq!(
            canonical("env=isnull=false"),
            (ComparisonOperator::Equal, "!null".into())
        );
    }

    #[test]
    fn test_normalize_rewrites_wire_form() {
        assert_eq!(parse_item("env==null").unwrap().to_string(), "env=isnull=true");
        assert_eq!(parse_item("status==!X").unwrap().to_string(), "status!=X");
        assert_eq!(
            parse_item("name=like=\"%!x%\"").unwrap().to_string(),
            "name=notlike=\"%x%\""
        );
        assert_eq!(
            parse_item("name=like=x").unwrap().to_string(),
            "name=like=\"%x%\""
        );
    }

    #[test]
    fn test_quoted_equal_value() {
        assert_eq!(
            canonical("env==\"a;b\""),
            (ComparisonOperator::Equal, "a;b".into())
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            parse_item("env=isnull=maybe"),
            Err(FilterError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse_item("status=="),
            Err(FilterError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse_item("name=like=\"%open"),
            Err(FilterError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_parse_filter_groups_values() {
        let parsed = parse_filter("(status==SUCCESS,status==FAILED);(user.username=like=\"%al%\")");
        assert_eq!(parsed.len(), 2);

        let status = parsed.get("status").unwrap();
        assert_eq!(status.operator, ComparisonOperator::Equal);
        assert_eq!(status.logical_operator, LogicalOperator::Or);
        assert_eq!(status.values, vec!["SUCCESS", "FAILED"]);

        let user = parsed.get("user.username").unwrap();
        assert_eq!(user.operator, ComparisonOperator::Like);
        assert_eq!(user.logical_operator, LogicalOperator::And);
        assert_eq!(user.values, vec!["al"]);
    }

    #[test]
    fn test_parse_filter_skips_malformed_fragment() {
        let parsed = parse_filter("(status==SUCCESS);(bogus);(name=like=\"%x%\")");
        assert_eq!(parsed.len(), 2);
        assert!(parsed.get("bogus").is_none());
    }

    #[test]
    fn test_parse_filter_first_family_wins() {
        let parsed = parse_filter("status==SUCCESS;status=like=\"%F%\"");
        let status = parsed.get("status").unwrap();
        assert_eq!(status.operator, ComparisonOperator::Equal);
        assert_eq!(status.values, vec!["SUCCESS"]);
    }

    #[test]
    fn test_parse_filter_empty() {
        assert!(parse_filter("").is_empty());
    }
}
