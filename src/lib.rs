//! Build, edit and decompose search filter expressions.

pub mod dsl;
pub mod error;

pub use dsl::*;
pub use error::{FilterError, Result};
