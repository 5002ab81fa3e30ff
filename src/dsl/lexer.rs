//! Lexer for wire expressions.
//!
//! `tokenize` splits a whole expression into item fragments; `lex_item`
//! then splits one fragment into attribute, operator and raw value.

use winnow::combinator::alt;
use winnow::prelude::*;
use winnow::token::take_till;

use super::ast::ComparisonOperator;
use crate::error::{FilterError, Result};

// Manually define PResult for resilience against winnow version changes
type PResult<T> = std::result::Result<T, winnow::error::ErrMode<winnow::error::ContextError>>;

/// One fragment split into its three parts, value still in wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawItem<'a> {
    pub attribute: &'a str,
    pub operator: ComparisonOperator,
    pub value: &'a str,
}

/// Split an expression into item fragments.
///
/// `;` and `,` separate items and structural parentheses are dropped, but
/// only outside quoted values. Inside quotes a backslash escapes the next
/// character, so `\"` never closes the value.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' if quoted => {
                current.push(c);
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '"' => {
                quoted = !quoted;
                current.push(c);
            }
            '(' | ')' if !quoted => {}
            ';' | ',' if !quoted => flush(&mut items, &mut current),
            _ => current.push(c),
        }
    }
    flush(&mut items, &mut current);

    items
}

fn flush(items: &mut Vec<String>, current: &mut String) {
    let item = current.trim();
    if !item.is_empty() {
        items.push(item.to_string());
    }
    current.clear();
}

/// Lex the attribute id: everything up to the first operator character.
fn lex_attribute<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_till(0.., ['=', '!']).parse_next(input)
}

/// Lex a comparison operator token.
fn lex_operator(input: &mut &str) -> PResult<ComparisonOperator> {
    alt((
        "=like=".value(ComparisonOperator::Like),
        "=notlike=".value(ComparisonOperator::NotLike),
        "=isnull=".value(ComparisonOperator::IsNull),
        "==".value(ComparisonOperator::Equal),
        "!=".value(ComparisonOperator::NotEqual),
    ))
    .parse_next(input)
}

/// Split one fragment, e.g. `status==SUCCESS`.
pub fn lex_item(fragment: &str) -> Result<RawItem<'_>> {
    let mut input = fragment;

    let attribute = lex_attribute(&mut input).map_err(|_| FilterError::MissingAttribute {
        fragment: fragment.to_string(),
    })?;
    let operator = lex_operator(&mut input).map_err(|_| FilterError::UnknownOperator {
        fragment: fragment.to_string(),
    })?;
    let attribute = attribute.trim();
    if attribute.is_empty() {
        return Err(FilterError::MissingAttribute {
            fragment: fragment.to_string(),
        });
    }

    Ok(RawItem {
        attribute,
        operator,
        value: input.trim(),
    })
}

/// Strip the surrounding quotes of a quoted literal and resolve escapes.
///
/// Returns `None` when the literal is unterminated or carries a bare quote.
pub fn unquote(raw: &str) -> Option<String> {
    let inner = raw.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                escaped @ ('"' | '\\') => out.push(escaped),
                other => {
                    out.push('\\');
                    out.push(other);
                }
            },
            '"' => return None,
            _ => out.push(c),
        }
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_groups() {
        let items = tokenize("(status==SUCCESS,status==FAILED);(user.username=like=\"%al%\")");
        assert_eq!(
            items,
            vec![
                "status==SUCCESS",
                "status==FAILED",
                "user.username=like=\"%al%\"",
            ]
        );
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("();,").is_empty());
    }

    #[test]
    fn test_tokenize_keeps_separators_inside_quotes() {
        let items = tokenize(r#"(description=like="%a;b,c\"d%");(status==RUNNING)"#);
        assert_eq!(
            items,
            vec![r#"description=like="%a;b,c\"d%""#, "status==RUNNING"]
        );
    }

    #[test]
    fn test_tokenize_keeps_parentheses_inside_quotes() {
        let items = tokenize(r#"(name=like="%f(x)%")"#);
        assert_eq!(items, vec![r#"name=like="%f(x)%""#]);
    }

    #[test]
    fn test_lex_item_operators() {
        let cases = [
            ("status==SUCCESS", ComparisonOperator::Equal, "SUCCESS"),
            ("status!=FAILED", ComparisonOperator::NotEqual, "FAILED"),
            ("name=like=\"%x%\"", ComparisonOperator::Like, "\"%x%\""),
            ("name=notlike=\"%x%\"", ComparisonOperator::NotLike, "\"%x%\""),
            ("build.env=isnull=true", ComparisonOperator::IsNull, "true"),
        ];
        for (fragment, operator, value) in cases {
            let item = lex_item(fragment).unwrap();
            assert_eq!(item.operator, operator, "{fragment}");
            assert_eq!(item.value, value, "{fragment}");
        }
    }

    #[test]
    fn test_lex_item_nested_attribute() {
        let item = lex_item("build.user.username==alice").unwrap();
        assert_eq!(item.attribute, "build.user.username");
    }

    #[test]
    fn test_lex_item_unknown_operator() {
        let err = lex_item("status=gt=3").unwrap_err();
        assert!(matches!(err, FilterError::UnknownOperator { .. }));

        let err = lex_item("status").unwrap_err();
        assert!(matches!(err, FilterError::UnknownOperator { .. }));
    }

    #[test]
    fn test_lex_item_missing_attribute() {
        let err = lex_item("==SUCCESS").unwrap_err();
        assert!(matches!(err, FilterError::MissingAttribute { .. }));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""a;b""#).as_deref(), Some("a;b"));
        assert_eq!(unquote(r#""say \"hi\"""#).as_deref(), Some("say \"hi\""));
        assert_eq!(unquote(r#""back\\slash""#).as_deref(), Some("back\\slash"));
        assert_eq!(unquote(r#""open"#), None);
        assert_eq!(unquote(r#""a"b""#), None);
        assert_eq!(unquote("bare"), None);
    }
}
