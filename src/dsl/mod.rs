//! Filter expressions exchanged with the search API (`q` parameter).
//!
//! Syntax (an RSQL subset):
//!   attr=like="%V%"           - contains V
//!   attr=notlike="%V%"        - does not contain V
//!   attr==V                   - equals V
//!   attr!=V                   - differs from V
//!   attr=isnull=true          - has no value
//!   (item,item)               - OR within one attribute group
//!   (item;item)               - AND within one attribute group
//!   (group);(group)           - AND across attributes
//!
//! Values containing separators, quotes or parentheses are double-quoted,
//! with `\"` and `\\` as escapes.

mod ast;
mod edit;
mod lexer;
mod parser;
mod writer;

pub use ast::*;
pub use edit::{AddOutcome, add_item, remove_attribute, remove_item, try_remove_item};
pub use lexer::tokenize;
pub use parser::{parse_filter, parse_item, parse_items};
pub use writer::{normalize_expression, serialize_items};
