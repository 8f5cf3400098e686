//! Directive scanning.
//!
//! Recognizes inline directives of the form `--key value`, `--key=value` and
//! `\u{2014}key value` (em-dash) inside free text:
//!
//! ```text
//! directive := delimiter key [ (' ' | '=') value ]
//! delimiter := "--" | "\u{2014}"
//! key       := word-char+
//! value     := any text, lazily terminated by the next delimiter or end of input
//! ```
//!
//! A key that is followed by anything other than a separator, a delimiter or
//! the end of the input does not form a directive; scanning then resumes one
//! character further on. Trailing whitespace after a key counts as the end of
//! the input, so `"a cat --hq\n"` read from stdin still yields `hq`.
//!
//! Values are not line-bounded: `"--neg ugly\nblurry --steps 4"` gives `neg`
//! the value `"ugly\nblurry "`. A multi-line `command_text` with one
//! directive per line therefore parses the same as its single-line form.

use std::ops::Range;

/// Two-character ASCII delimiter.
const DOUBLE_DASH: &str = "--";

/// Single-character Unicode delimiter (U+2014).
const EM_DASH: char = '\u{2014}';

/// A single directive occurrence found by [`tokenize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Directive key without the delimiter.
    pub key: String,
    /// Raw value as written, `None` when no separator followed the key.
    pub value: Option<String>,
    /// Byte range of the whole directive in the scanned text.
    pub span: Range<usize>,
}

impl Directive {
    /// Trimmed value. An absent value reads as the empty string.
    #[must_use]
    pub fn value_str(&self) -> &str {
        self.value.as_deref().unwrap_or_default().trim()
    }
}

/// Result of scanning a text for directives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenized {
    /// Directives in order of appearance.
    pub directives: Vec<Directive>,
    /// Input with directives removed and whitespace normalized.
    pub residual: String,
}

impl Tokenized {
    /// Last occurrence of `key`, if any.
    #[must_use]
    pub fn last(&self, key: &str) -> Option<&Directive> {
        self.directives.iter().rev().find(|d| d.key == key)
    }
}

/// Scan `text` for directives.
///
/// Directives and the residual text are produced by the same pass: the
/// residual is `text` with every matched span removed, trimmed, with
/// whitespace runs of two or more characters collapsed to a single space.
///
/// # Example
///
/// ```
/// use pd_directive::tokenize;
///
/// let tokens = tokenize("a cat --steps 30 --hires");
/// assert_eq!(tokens.residual, "a cat");
/// assert_eq!(tokens.directives[0].key, "steps");
/// assert_eq!(tokens.directives[0].value_str(), "30");
/// assert_eq!(tokens.directives[1].value, None);
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Tokenized {
    let mut directives = Vec::new();
    let mut stripped = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;

    while let Some(c) = text[pos..].chars().next() {
        if let Some(directive) = scan_directive(text, pos) {
            stripped.push_str(&text[copied..directive.span.start]);
            pos = directive.span.end;
            copied = pos;
            directives.push(directive);
        } else {
            pos += c.len_utf8();
        }
    }
    stripped.push_str(&text[copied..]);

    Tokenized {
        directives,
        residual: collapse_whitespace(stripped.trim()),
    }
}

/// Try to read a directive starting exactly at byte offset `start`.
fn scan_directive(text: &str, start: usize) -> Option<Directive> {
    let key_start = start + delimiter_len(&text[start..])?;
    let key_len = text[key_start..]
        .find(|c: char| !is_word_char(c))
        .unwrap_or(text.len() - key_start);
    if key_len == 0 {
        return None;
    }
    let key_end = key_start + key_len;
    let after_key = &text[key_end..];

    let (value, end) = match after_key.chars().next() {
        None => (None, key_end),
        Some(' ' | '=') => {
            let value_start = key_end + 1;
            let value_end =
                find_delimiter(&text[value_start..]).map_or(text.len(), |i| value_start + i);
            (Some(text[value_start..value_end].to_owned()), value_end)
        }
        Some(_) if delimiter_len(after_key).is_some() => (None, key_end),
        Some(_) if after_key.trim_start().is_empty() => (None, key_end),
        Some(_) => return None,
    };

    Some(Directive {
        key: text[key_start..key_end].to_owned(),
        value,
        span: start..end,
    })
}

/// Byte length of the delimiter at the start of `s`.
fn delimiter_len(s: &str) -> Option<usize> {
    if s.starts_with(DOUBLE_DASH) {
        Some(DOUBLE_DASH.len())
    } else if s.starts_with(EM_DASH) {
        Some(EM_DASH.len_utf8())
    } else {
        None
    }
}

/// Byte offset of the first delimiter in `s`.
fn find_delimiter(s: &str) -> Option<usize> {
    s.char_indices()
        .map(|(i, _)| i)
        .find(|&i| delimiter_len(&s[i..]).is_some())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Collapse every whitespace run of length two or more to a single space.
///
/// Single whitespace characters (including a lone newline) are kept as is.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() && chars.peek().is_some_and(|n| n.is_whitespace()) {
            while chars.next_if(|n| n.is_whitespace()).is_some() {}
            out.push(' ');
        } else {
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(tokens: &Tokenized) -> Vec<(&str, Option<&str>)> {
        tokens
            .directives
            .iter()
            .map(|d| (d.key.as_str(), d.value.as_deref()))
            .collect()
    }

    #[test]
    fn test_plain_text_has_no_directives() {
        let tokens = tokenize("a cat on a mat");
        assert!(tokens.directives.is_empty());
        assert_eq!(tokens.residual, "a cat on a mat");
    }

    #[test]
    fn test_space_and_equals_separators() {
        let tokens = tokenize("--steps 30 --cfg=7.5");
        assert_eq!(
            pairs(&tokens),
            vec![("steps", Some("30 ")), ("cfg", Some("7.5"))]
        );
        assert_eq!(tokens.residual, "");
    }

    #[test]
    fn test_em_dash_delimiter() {
        let tokens = tokenize("portrait \u{2014}steps 12 \u{2014}seed=4");
        assert_eq!(
            pairs(&tokens),
            vec![("steps", Some("12 ")), ("seed", Some("4"))]
        );
        assert_eq!(tokens.residual, "portrait");
    }

    #[test]
    fn test_adjacent_directives_parse_independently() {
        let tokens = tokenize("--a --b 1");
        assert_eq!(pairs(&tokens), vec![("a", Some("")), ("b", Some("1"))]);
        assert_eq!(tokens.directives[0].value_str(), "");
    }

    #[test]
    fn test_key_without_separator_has_absent_value() {
        let tokens = tokenize("text --flag");
        assert_eq!(pairs(&tokens), vec![("flag", None)]);

        let tokens = tokenize("--a--b 2");
        assert_eq!(pairs(&tokens), vec![("a", None), ("b", Some("2"))]);
    }

    #[test]
    fn test_value_runs_until_next_delimiter() {
        let tokens = tokenize("--neg blurry, low quality --steps 4");
        assert_eq!(tokens.directives[0].value_str(), "blurry, low quality");
    }

    #[test]
    fn test_value_stops_at_bare_delimiter() {
        // "-- b" is not a directive but still terminates the value
        let tokens = tokenize("--neg ugly -- blurry");
        assert_eq!(pairs(&tokens), vec![("neg", Some("ugly "))]);
        assert_eq!(tokens.residual, "-- blurry");
    }

    #[test]
    fn test_key_followed_by_other_char_is_not_a_directive() {
        let tokens = tokenize("range --steps:30 ok");
        assert!(tokens.directives.is_empty());
        assert_eq!(tokens.residual, "range --steps:30 ok");
    }

    #[test]
    fn test_triple_dash_matches_from_second_dash() {
        let tokens = tokenize("x ---seed 5");
        assert_eq!(pairs(&tokens), vec![("seed", Some("5"))]);
        assert_eq!(tokens.residual, "x -");
    }

    #[test]
    fn test_unicode_word_keys_and_values() {
        let tokens = tokenize("château --modèle=ünï --x 1");
        assert_eq!(
            pairs(&tokens),
            vec![("modèle", Some("ünï ")), ("x", Some("1"))]
        );
        assert_eq!(tokens.residual, "château");
    }

    #[test]
    fn test_flag_before_trailing_whitespace() {
        for text in ["a cat --hq\n", "a cat --hq\t", "a cat --hq\r\n"] {
            let tokens = tokenize(text);
            assert_eq!(pairs(&tokens), vec![("hq", None)], "{text:?}");
            assert_eq!(tokens.residual, "a cat", "{text:?}");
        }
    }

    #[test]
    fn test_value_spans_lines() {
        let tokens = tokenize("masterpiece\n--steps 4\n--cfg 1.5");
        assert_eq!(tokens.directives[0].value_str(), "4");
        assert_eq!(tokens.directives[1].value_str(), "1.5");
        assert_eq!(tokens.residual, "masterpiece");

        let tokens = tokenize("--neg ugly\nblurry --steps 4");
        assert_eq!(
            pairs(&tokens),
            vec![("neg", Some("ugly\nblurry ")), ("steps", Some("4"))]
        );
    }

    #[test]
    fn test_residual_whitespace_is_collapsed() {
        let tokens = tokenize("  a   cat --steps 2 \t on\n\na mat  ");
        assert_eq!(tokens.residual, "a cat");

        let tokens = tokenize("  a   cat\ton\nmat ");
        assert_eq!(tokens.residual, "a cat\ton\nmat");
    }

    #[test]
    fn test_spans_cover_removed_text() {
        let text = "a --b 1 c";
        let tokens = tokenize(text);
        assert_eq!(&text[tokens.directives[0].span.clone()], "--b 1 c");
        assert_eq!(tokens.residual, "a");
    }

    #[test]
    fn test_last_returns_final_occurrence() {
        let tokens = tokenize("--steps 10 --steps 30");
        assert_eq!(tokens.last("steps").map(Directive::value_str), Some("30"));
        assert!(tokens.last("seed").is_none());
    }

    #[test]
    fn test_residual_never_contains_directives() {
        let grammar = regex::Regex::new(r"(?:--|\x{2014})\w+(?:[ =]|--|\x{2014}|$)").unwrap();
        let inputs = [
            "a cat --steps 30 --seed -1",
            "x ---seed 5 -- y",
            "--a --b 1 tail",
            "-\u{2014}k v --",
            "pre--fix --neg=bad\u{2014}pos_ good",
            "   spaced    out --   text --w",
            "a cat --hq\n",
            "a cat --hq\t",
            "--neg ugly\nblurry --steps 4",
        ];
        for input in inputs {
            let residual = tokenize(input).residual;
            assert!(!grammar.is_match(&residual), "{input:?} -> {residual:?}");
            assert!(!residual.contains("  "), "{input:?} -> {residual:?}");
        }
    }
}
