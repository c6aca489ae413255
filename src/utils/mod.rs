//! Utilities module for Nugget Extract
//!
//! Shared helper functions and utilities including:
//! - C-style escape decoding and encoding
//! - Quote extraction
//! - Text position helpers
//! - Path utilities

use std::path::{Path, PathBuf};

/// Escape handling for nugget content
pub mod escape {
    use std::iter::Peekable;
    use std::str::Chars;

    /// Decode standard C escape sequences into their character counterparts.
    ///
    /// Recognises `\a \b \f \n \r \t \v \\ \' \" \?`, octal escapes of one to
    /// three digits (`\0`, `\12`, `\377`) and `\uXXXX` with hex digits of either
    /// case. A `\uXXXX\uXXXX` surrogate pair decodes to one character. Any other
    /// escaped character stands for itself, and a trailing lone backslash is kept.
    pub fn unescape(s: &str) -> String {
        if !s.contains('\\') {
            return s.to_string();
        }

        let mut out = String::with_capacity(s.len());
        let mut chars = s.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }

            let Some(next) = chars.next() else {
                out.push('\\');
                break;
            };

            match next {
                'a' => out.push('\u{7}'),
                'b' => out.push('\u{8}'),
                'f' => out.push('\u{c}'),
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                'v' => out.push('\u{b}'),
                '0'..='7' => {
                    // A leading 0-3 allows a three digit form, 4-7 caps at two.
                    let max_digits = if next <= '3' { 3 } else { 2 };
                    let mut value = next as u32 - '0' as u32;
                    let mut digits = 1;
                    while digits < max_digits {
                        match chars.peek() {
                            Some(&d @ '0'..='7') => {
                                value = value * 8 + (d as u32 - '0' as u32);
                                chars.next();
                                digits += 1;
                            }
                            _ => break,
                        }
                    }
                    out.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
                }
                'u' => match read_hex4(&mut chars) {
                    Some(unit) => out.push(decode_unit(unit, &mut chars)),
                    None => out.push('u'),
                },
                other => out.push(other),
            }
        }

        out
    }

    /// Consume four hex digits if they come next
    fn read_hex4(chars: &mut Peekable<Chars<'_>>) -> Option<u32> {
        let hex: String = chars.clone().take(4).collect();
        if hex.len() != 4 || !hex.chars().all(|h| h.is_ascii_hexdigit()) {
            return None;
        }
        for _ in 0..4 {
            chars.next();
        }
        u32::from_str_radix(&hex, 16).ok()
    }

    /// Turn a UTF-16 code unit into a char. A high surrogate directly
    /// followed by a `\u` low surrogate combines with it; any other lone
    /// surrogate becomes U+FFFD.
    fn decode_unit(unit: u32, chars: &mut Peekable<Chars<'_>>) -> char {
        if (0xD800..=0xDBFF).contains(&unit) {
            let mut ahead = chars.clone();
            if ahead.next() == Some('\\') && ahead.next() == Some('u') {
                if let Some(low @ 0xDC00..=0xDFFF) = read_hex4(&mut ahead) {
                    *chars = ahead;
                    let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(code).unwrap_or('\u{FFFD}');
                }
            }
        }
        char::from_u32(unit).unwrap_or('\u{FFFD}')
    }

    /// Encode a string so that [`unescape`] returns it unchanged.
    pub fn escape(s: &str) -> String {
        let mut out = String::with_capacity(s.len() + s.len() / 8);
        for c in s.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '"' => out.push_str("\\\""),
                '\'' => out.push_str("\\'"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\u{7}' => out.push_str("\\a"),
                '\u{8}' => out.push_str("\\b"),
                '\u{b}' => out.push_str("\\v"),
                '\u{c}' => out.push_str("\\f"),
                c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
        }
        out
    }
}

/// Text utilities
pub mod text {
    /// Whether an optional string holds a non-empty value
    pub fn is_set(s: Option<&str>) -> bool {
        s.is_some_and(|s| !s.is_empty())
    }

    /// Count occurrences of a character
    pub fn count_of_char(text: &str, ch: char) -> usize {
        text.chars().filter(|&c| c == ch).count()
    }

    /// 1-based line number of a byte offset: newlines before it, plus one.
    ///
    /// Offsets past the end of the text are clamped.
    pub fn line_from_pos(text: &str, offset: usize) -> usize {
        let mut end = offset.min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        count_of_char(&text[..end], '\n') + 1
    }

    /// ASCII case-insensitive prefix test
    pub fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
        haystack.len() >= prefix.len()
            && haystack.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
    }

    /// Isolate the character sequence between the first and last `quote`.
    ///
    /// Returns an empty string when the two occurrences are adjacent and
    /// `None` when there are not two non-overlapping occurrences.
    pub fn unquote<'a>(s: &'a str, quote: &str) -> Option<&'a str> {
        if quote.is_empty() {
            return None;
        }
        let begin = s.find(quote)?;
        let end = s.rfind(quote)?;
        let inner_start = begin + quote.len();
        if end < inner_start {
            return None;
        }
        Some(&s[inner_start..end])
    }

    /// [`unquote`] with double quotes
    pub fn unquote_default(s: &str) -> Option<&str> {
        unquote(s, "\"")
    }
}

/// Path utilities
pub mod path {
    use super::*;

    /// Expand tilde to home directory
    pub fn expand_tilde(path: &Path) -> PathBuf {
        if let Ok(stripped) = path.strip_prefix("~") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        }
        path.to_path_buf()
    }

    /// Make a path absolute without touching the filesystem; `.` components
    /// are dropped, symlinks and `..` are left alone.
    pub fn absolute(path: &Path) -> PathBuf {
        std::path::absolute(path)
            .unwrap_or_else(|_| path.to_path_buf())
            .components()
            .collect()
    }

    /// Whether the path as written ends in a separator (`bin/`)
    pub fn ends_with_separator(path: &Path) -> bool {
        path.to_string_lossy().ends_with(std::path::is_separator)
    }

    /// Append the platform separator unless one is already there
    pub fn with_trailing_separator(path: PathBuf) -> PathBuf {
        if ends_with_separator(&path) {
            return path;
        }
        let mut raw = path.into_os_string();
        raw.push(std::path::MAIN_SEPARATOR_STR);
        PathBuf::from(raw)
    }

    /// Resolve a configured path against a base directory
    pub fn resolve_against(path: &Path, base: Option<&Path>) -> PathBuf {
        let path = expand_tilde(path);
        match base {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }

    /// Reference form of a file path: relative to `project_dir` when the path
    /// starts with it (ASCII case-insensitive), otherwise unchanged.
    pub fn reference_path(file: &Path, project_dir: Option<&Path>) -> String {
        let full = file.to_string_lossy();
        let Some(project_dir) = project_dir else {
            return full.into_owned();
        };

        let prefix = project_dir.to_string_lossy();
        let prefix = prefix.trim_end_matches(std::path::is_separator);
        if prefix.is_empty() || !text::starts_with_ignore_case(&full, prefix) {
            return full.into_owned();
        }

        match full.get(prefix.len()..) {
            Some(rest) if rest.is_empty() || rest.starts_with(std::path::is_separator) => {
                rest.trim_start_matches(std::path::is_separator).to_string()
            }
            // A sibling such as `/src/app2` under project `/src/app`.
            _ => full.into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::escape::{escape, unescape};
    use super::path;
    use super::text::{self, unquote, unquote_default};
    use proptest::prelude::*;
    use std::path::Path;

    #[test]
    fn test_unescape_named() {
        assert_eq!(unescape(r"a\nb\tc"), "a\nb\tc");
        assert_eq!(unescape(r#"\"quoted\""#), "\"quoted\"");
        assert_eq!(unescape(r"\a\b\f\v\r"), "\u{7}\u{8}\u{c}\u{b}\r");
        assert_eq!(unescape(r"back\\slash"), "back\\slash");
        assert_eq!(unescape(r"\'\?"), "'?");
    }

    #[test]
    fn test_unescape_octal() {
        assert_eq!(unescape(r"\101"), "A");
        assert_eq!(unescape(r"\0"), "\0");
        assert_eq!(unescape(r"\12x"), "\nx");
        // 4-7 leads cap the escape at two digits.
        assert_eq!(unescape(r"\777"), "?7");
    }

    #[test]
    fn test_unescape_unicode_case_insensitive() {
        assert_eq!(unescape(r"\u00e9"), "\u{e9}");
        assert_eq!(unescape(r"\u00E9"), "\u{e9}");
        assert_eq!(unescape(r"\u00eA"), "\u{ea}");
        assert_eq!(unescape(r"\u12G4"), "u12G4");
    }

    #[test]
    fn test_unescape_surrogate_pairs() {
        assert_eq!(unescape(r"\uD83D\uDE00"), "\u{1F600}");
        assert_eq!(unescape(r"\ud83d\ude1e!"), "\u{1F61E}!");
        assert_eq!(unescape(r"\uD83D x"), "\u{FFFD} x");
        assert_eq!(unescape(r"\uDE00\uD83D"), "\u{FFFD}\u{FFFD}");
        assert_eq!(unescape(r"\uD83D\n"), "\u{FFFD}\n");
    }

    #[test]
    fn test_unescape_passthrough() {
        assert_eq!(unescape("plain text"), "plain text");
        assert_eq!(unescape(r"\]]]"), "]]]");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a\"b\n"), r#"a\"b\n"#);
        assert_eq!(escape("\u{1}"), r"\u0001");
    }

    proptest! {
        #[test]
        fn prop_unescape_inverts_escape(s in any::<String>()) {
            prop_assert_eq!(unescape(&escape(&s)), s);
        }

        #[test]
        fn prop_unescape_without_backslash_is_identity(s in "[^\\\\]*") {
            prop_assert_eq!(unescape(&s), s);
        }
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote_default("a\"b\"c"), Some("b"));
        assert_eq!(unquote_default("ab"), None);
        assert_eq!(unquote_default("\"\""), Some(""));
        assert_eq!(unquote_default("only\"one"), None);
        assert_eq!(unquote("x<<inner>>y<<", "<<"), Some("inner>>y"));
        assert_eq!(unquote("'''", "''"), None);
    }

    #[test]
    fn test_line_from_pos() {
        let text = "one\ntwo\nthree";
        assert_eq!(text::line_from_pos(text, 0), 1);
        assert_eq!(text::line_from_pos(text, 4), 2);
        assert_eq!(text::line_from_pos(text, 8), 3);
        assert_eq!(text::line_from_pos(text, 1000), 3);
        // Offsets inside a multibyte char count the line it sits on.
        assert_eq!(text::line_from_pos("é\né", 4), 2);
    }

    #[test]
    fn test_starts_with_ignore_case() {
        assert!(text::starts_with_ignore_case("/Src/Views", "/src/views"));
        assert!(!text::starts_with_ignore_case("/src", "/src/views"));
    }

    #[test]
    fn test_is_set() {
        assert!(text::is_set(Some("x")));
        assert!(!text::is_set(Some("")));
        assert!(!text::is_set(None));
        assert_eq!(text::count_of_char("a\nb\n", '\n'), 2);
    }

    #[test]
    fn test_reference_path() {
        let project = Path::new("/Work/App");
        assert_eq!(
            path::reference_path(Path::new("/work/app/Views/Index.cshtml"), Some(project)),
            "Views/Index.cshtml"
        );
        assert_eq!(
            path::reference_path(Path::new("/work/app2/x.js"), Some(project)),
            "/work/app2/x.js"
        );
        assert_eq!(
            path::reference_path(Path::new("/other/x.js"), None),
            "/other/x.js"
        );
    }

    #[test]
    fn test_trailing_separator() {
        assert!(path::ends_with_separator(Path::new("bin/")));
        assert!(!path::ends_with_separator(Path::new("bin")));
        let dir = path::with_trailing_separator(Path::new("/proj/bin").to_path_buf());
        assert!(path::ends_with_separator(&dir));
        assert_eq!(path::with_trailing_separator(dir.clone()), dir);
    }

    #[test]
    fn test_resolve_against() {
        let base = Path::new("/proj");
        assert_eq!(
            path::resolve_against(Path::new("views"), Some(base)),
            Path::new("/proj/views")
        );
        assert_eq!(
            path::resolve_against(Path::new("/abs"), Some(base)),
            Path::new("/abs")
        );
    }
}
