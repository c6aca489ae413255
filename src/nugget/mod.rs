//! Nugget module for Nugget Extract
//!
//! Handles recognition of translatable markers ("nuggets") in free-form text:
//! - Token set configuration and validation
//! - Lazy left-to-right tokenizing with escape-aware token matching
//! - Rewriting text around parsed nuggets

mod parser;
mod transform;

pub use parser::{
    Nugget, NuggetParser, NuggetSpan, NuggetTokens, Nuggets, DEFAULT_BEGIN_TOKEN,
    DEFAULT_COMMENT_TOKEN, DEFAULT_DELIMITER_TOKEN, DEFAULT_END_TOKEN,
};
pub use transform::transform;
