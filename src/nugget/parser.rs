//! Nugget tokenizer
//!
//! Scans text for markers of the form
//! `BEGIN msgid [DELIM param]* [DELIM COMMENT comment] END`, for example
//! `[[[Hello %0|||name|||///greeting]]]`.
//!
//! A token occurrence preceded by an odd number of backslashes is escaped and
//! does not count as a token. Every field is C-unescaped once the marker has
//! been split, which also drops the backslash from escaped tokens.

use crate::error::{NuggetError, NuggetResult};
use crate::utils::escape::{escape, unescape};
use std::ops::Range;

/// Default nugget begin token
pub const DEFAULT_BEGIN_TOKEN: &str = "[[[";

/// Default nugget end token
pub const DEFAULT_END_TOKEN: &str = "]]]";

/// Default parameter delimiter token
pub const DEFAULT_DELIMITER_TOKEN: &str = "|||";

/// Default comment marker token
pub const DEFAULT_COMMENT_TOKEN: &str = "///";

/// Literal strings delimiting a nugget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuggetTokens {
    begin: String,
    end: String,
    delimiter: String,
    comment: String,
}

impl NuggetTokens {
    /// Build a validated token set.
    ///
    /// Fails on empty tokens and on identical begin/end tokens.
    pub fn new(
        begin: impl Into<String>,
        end: impl Into<String>,
        delimiter: impl Into<String>,
        comment: impl Into<String>,
    ) -> NuggetResult<Self> {
        let tokens = Self {
            begin: begin.into(),
            end: end.into(),
            delimiter: delimiter.into(),
            comment: comment.into(),
        };

        for (which, token) in [
            ("begin", &tokens.begin),
            ("end", &tokens.end),
            ("delimiter", &tokens.delimiter),
            ("comment", &tokens.comment),
        ] {
            if token.is_empty() {
                return Err(NuggetError::EmptyToken { which });
            }
        }
        if tokens.begin == tokens.end {
            return Err(NuggetError::AmbiguousTokens {
                token: tokens.begin.clone(),
            });
        }

        Ok(tokens)
    }

    pub fn begin(&self) -> &str {
        &self.begin
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    fn contains_token_char(&self, c: char) -> bool {
        [&self.begin, &self.end, &self.delimiter, &self.comment]
            .iter()
            .any(|t| t.contains(c))
    }
}

impl Default for NuggetTokens {
    fn default() -> Self {
        Self {
            begin: DEFAULT_BEGIN_TOKEN.to_string(),
            end: DEFAULT_END_TOKEN.to_string(),
            delimiter: DEFAULT_DELIMITER_TOKEN.to_string(),
            comment: DEFAULT_COMMENT_TOKEN.to_string(),
        }
    }
}

/// A parsed marker instance
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Nugget {
    /// Decoded message id
    pub msgid: String,
    /// Disambiguating context comment, never `Some("")`
    pub comment: Option<String>,
    /// Format parameters in order of appearance
    pub params: Vec<String>,
}

impl Nugget {
    /// Create a nugget with only a message id
    pub fn new(msgid: impl Into<String>) -> Self {
        Self {
            msgid: msgid.into(),
            ..Self::default()
        }
    }

    /// Set the comment; an empty comment clears it
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        let comment = comment.into();
        self.comment = (!comment.is_empty()).then_some(comment);
        self
    }

    /// Append a format parameter
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn has_comment(&self) -> bool {
        self.comment.is_some()
    }

    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }

    /// Re-emit this nugget in marker syntax for the given tokens.
    ///
    /// Characters that appear in any token are written as `\uXXXX` so the
    /// output parses back to an identical nugget.
    pub fn to_marker(&self, tokens: &NuggetTokens) -> String {
        let mut out = String::with_capacity(self.msgid.len() + 16);
        out.push_str(tokens.begin());
        push_escaped(&mut out, &self.msgid, tokens);
        for param in &self.params {
            out.push_str(tokens.delimiter());
            push_escaped(&mut out, param, tokens);
        }
        if let Some(comment) = &self.comment {
            out.push_str(tokens.delimiter());
            out.push_str(tokens.comment());
            push_escaped(&mut out, comment, tokens);
        }
        out.push_str(tokens.end());
        out
    }
}

fn push_escaped(out: &mut String, field: &str, tokens: &NuggetTokens) {
    let mut buf = [0u8; 4];
    for c in field.chars() {
        if tokens.contains_token_char(c) && (c as u32) <= 0xFFFF {
            out.push_str(&format!("\\u{:04x}", c as u32));
        } else {
            out.push_str(&escape(c.encode_utf8(&mut buf)));
        }
    }
}

/// A well-formed nugget together with the byte range of its marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuggetSpan {
    /// Byte range from the start of the begin token to the end of the end token
    pub range: Range<usize>,
    pub nugget: Nugget,
}

/// Tokenizer over a fixed token set, shareable across threads
#[derive(Debug, Clone, Default)]
pub struct NuggetParser {
    tokens: NuggetTokens,
}

impl NuggetParser {
    pub fn new(tokens: NuggetTokens) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &NuggetTokens {
        &self.tokens
    }

    /// Lazily yield `(nugget, offset)` pairs, offset being the byte position
    /// of the begin token. Malformed markers are skipped.
    pub fn parse<'p, 't>(&'p self, text: &'t str) -> Nuggets<'p, 't> {
        Nuggets {
            parser: self,
            text,
            pos: 0,
        }
    }

    /// Collect every well-formed nugget with its marker range
    pub fn spans(&self, text: &str) -> Vec<NuggetSpan> {
        let mut nuggets = self.parse(text);
        std::iter::from_fn(|| nuggets.next_span()).collect()
    }

    /// Parse the content between a begin and an end token
    pub fn parse_inner(&self, inner: &str) -> Option<Nugget> {
        let segments = split_unescaped(inner, &self.tokens.delimiter);
        let (msgid, mut rest) = segments.split_first()?;

        let mut comment = None;
        if let Some((last, middle)) = rest.split_last() {
            if let Some(text) = last.strip_prefix(self.tokens.comment.as_str()) {
                comment = Some(unescape(text)).filter(|c| !c.is_empty());
                rest = middle;
            }
        }

        // The comment must be the final segment.
        if rest
            .iter()
            .any(|segment| segment.starts_with(self.tokens.comment.as_str()))
        {
            return None;
        }

        Some(Nugget {
            msgid: unescape(msgid),
            comment,
            params: rest.iter().map(|p| unescape(p)).collect(),
        })
    }
}

/// Iterator returned by [`NuggetParser::parse`]
#[derive(Debug, Clone)]
pub struct Nuggets<'p, 't> {
    parser: &'p NuggetParser,
    text: &'t str,
    pos: usize,
}

impl Nuggets<'_, '_> {
    fn next_span(&mut self) -> Option<NuggetSpan> {
        let tokens = &self.parser.tokens;
        loop {
            let begin = find_unescaped(self.text, &tokens.begin, self.pos)?;
            let content_start = begin + tokens.begin.len();

            // Unterminated: no later begin can be terminated either.
            let Some(end) = find_unescaped(self.text, &tokens.end, content_start) else {
                self.pos = self.text.len();
                return None;
            };

            let inner = &self.text[content_start..end];
            if let Some(nested) = find_unescaped(inner, &tokens.begin, 0) {
                log::trace!("Skipping unterminated nugget at offset {}", begin);
                self.pos = content_start + nested;
                continue;
            }

            self.pos = end + tokens.end.len();
            match self.parser.parse_inner(inner) {
                Some(nugget) => {
                    return Some(NuggetSpan {
                        range: begin..self.pos,
                        nugget,
                    })
                }
                None => log::trace!("Skipping malformed nugget at offset {}", begin),
            }
        }
    }
}

impl Iterator for Nuggets<'_, '_> {
    type Item = (Nugget, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_span()
            .map(|span| (span.nugget, span.range.start))
    }
}

/// Whether the byte at `idx` is preceded by an odd run of backslashes
fn is_escaped(haystack: &str, idx: usize) -> bool {
    let run = haystack.as_bytes()[..idx]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count();
    run % 2 == 1
}

/// Find the first unescaped occurrence of `needle` at or after `from`
fn find_unescaped(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let step = needle.chars().next().map_or(1, char::len_utf8);
    let mut from = from;
    while from <= haystack.len() {
        let idx = from + haystack[from..].find(needle)?;
        if !is_escaped(haystack, idx) {
            return Some(idx);
        }
        from = idx + step;
    }
    None
}

/// Split on every unescaped occurrence of `delimiter`
fn split_unescaped<'a>(s: &'a str, delimiter: &str) -> Vec<&'a str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut from = 0;
    while let Some(idx) = find_unescaped(s, delimiter, from) {
        segments.push(&s[start..idx]);
        start = idx + delimiter.len();
        from = start;
    }
    segments.push(&s[start..]);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> NuggetParser {
        NuggetParser::default()
    }

    fn collect(text: &str) -> Vec<(Nugget, usize)> {
        parser().parse(text).collect()
    }

    #[test]
    fn test_empty_tokens_rejected() {
        assert_eq!(
            NuggetTokens::new("", "]]]", "|||", "///"),
            Err(NuggetError::EmptyToken { which: "begin" })
        );
        assert_eq!(
            NuggetTokens::new("[[[", "]]]", "", "///"),
            Err(NuggetError::EmptyToken { which: "delimiter" })
        );
        assert!(matches!(
            NuggetTokens::new("##", "##", "|", "//"),
            Err(NuggetError::AmbiguousTokens { .. })
        ));
    }

    #[test]
    fn test_parse_simple() {
        let found = collect("<p>[[[Hello]]]</p>");
        assert_eq!(found, vec![(Nugget::new("Hello"), 3)]);
    }

    #[test]
    fn test_parse_params_and_comment() {
        let found = collect("[[[Hello %0, you are %1|||Bob|||42|||///greeting]]]");
        assert_eq!(found.len(), 1);
        let nugget = &found[0].0;
        assert_eq!(nugget.msgid, "Hello %0, you are %1");
        assert_eq!(nugget.params, vec!["Bob", "42"]);
        assert_eq!(nugget.comment.as_deref(), Some("greeting"));
    }

    #[test]
    fn test_custom_tokens() {
        let tokens = NuggetTokens::new("[[[", "]]]", "|||", "ctx:").unwrap();
        let parser = NuggetParser::new(tokens);
        let found: Vec<_> = parser
            .parse("[[[Hello]]] and [[[Hello|||ctx: greeting]]]")
            .collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0.comment, None);
        assert_eq!(found[1].0.comment.as_deref(), Some(" greeting"));
        assert_eq!(found[1].1, 16);
    }

    #[test]
    fn test_empty_msgid_is_legal() {
        let found = collect("[[[]]]");
        assert_eq!(found, vec![(Nugget::new(""), 0)]);
    }

    #[test]
    fn test_whitespace_preserved() {
        let found = collect("[[[  spaced\tout  ]]]");
        assert_eq!(found[0].0.msgid, "  spaced\tout  ");
    }

    #[test]
    fn test_escaped_end_token() {
        let found = collect(r"[[[a\]]] b]]]");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0.msgid, "a]]] b");
    }

    #[test]
    fn test_escaped_delimiter() {
        let found = collect(r"[[[x \||| y|||p]]]");
        assert_eq!(found[0].0.msgid, "x ||| y");
        assert_eq!(found[0].0.params, vec!["p"]);
    }

    #[test]
    fn test_even_backslashes_do_not_escape() {
        let found = collect(r"[[[path\\]]]");
        assert_eq!(found[0].0.msgid, "path\\");
    }

    #[test]
    fn test_c_escapes_decoded() {
        let found = collect(r"[[[line\none]]]");
        assert_eq!(found[0].0.msgid, "line\none");
    }

    #[test]
    fn test_unterminated_is_dropped() {
        assert!(collect("text [[[never closed").is_empty());
    }

    #[test]
    fn test_nested_begin_restarts_scan() {
        let found = collect("[[[broken [[[Good]]] [[[Also]]]");
        let ids: Vec<_> = found.iter().map(|(n, _)| n.msgid.as_str()).collect();
        assert_eq!(ids, vec!["Good", "Also"]);
        assert_eq!(found[0].1, 10);
    }

    #[test]
    fn test_misplaced_comment_is_dropped() {
        let found = collect("[[[Bad|||///c|||p]]] [[[Fine]]]");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0.msgid, "Fine");
    }

    #[test]
    fn test_empty_comment_is_unset() {
        let found = collect("[[[Hi|||///]]]");
        assert_eq!(found[0].0.comment, None);
    }

    #[test]
    fn test_parse_is_restartable() {
        let parser = parser();
        let text = "[[[One]]] [[[Two]]]";
        let first: Vec<_> = parser.parse(text).collect();
        let second: Vec<_> = parser.parse(text).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_multibyte_text() {
        let found = collect("héllo [[[Grüße]]] wörld");
        assert_eq!(found[0].0.msgid, "Grüße");
        assert_eq!(found[0].1, "héllo ".len());
    }

    #[test]
    fn test_spans_cover_marker() {
        let text = "ab[[[X|||///c]]]cd";
        let spans = parser().spans(text);
        assert_eq!(&text[spans[0].range.clone()], "[[[X|||///c]]]");
    }

    #[test]
    fn test_to_marker_reparses() {
        let tokens = NuggetTokens::default();
        let nugget = Nugget::new("Close ]]] with | and \"quotes\"\n")
            .with_param("a|||b")
            .with_comment("note ///");
        let marker = nugget.to_marker(&tokens);
        let found: Vec<_> = NuggetParser::new(tokens).parse(&marker).collect();
        assert_eq!(found, vec![(nugget, 0)]);
    }
}
