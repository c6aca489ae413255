//! Text rewriting on top of the tokenizer
//!
//! The tokenizer only produces nuggets. Replacing markers in the source text
//! is layered here as a separate pass.

use super::{Nugget, NuggetParser};

/// Rebuild `text`, replacing each well-formed marker with the callback's
/// result. `None` keeps the marker verbatim; malformed regions are copied as-is.
pub fn transform<F>(parser: &NuggetParser, text: &str, mut replace: F) -> String
where
    F: FnMut(&Nugget, usize) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;

    for span in parser.spans(text) {
        if let Some(replacement) = replace(&span.nugget, span.range.start) {
            out.push_str(&text[copied..span.range.start]);
            out.push_str(&replacement);
            copied = span.range.end;
        }
    }

    out.push_str(&text[copied..]);
    out
}
