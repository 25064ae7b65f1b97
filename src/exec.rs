//! Splitting of `Exec` values into their whitespace-separated arguments.
//!
//! Tokens are returned as raw slices of the input: quotes and escapes are kept verbatim, so the
//! reported offsets can be used to edit the original string in place.

use std::iter::FusedIterator;
use std::ops::Range;

/// A single argument of a command line, positioned within the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    text: &'a str,
    start: usize,
}

impl<'a> Token<'a> {
    #[must_use]
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Byte offset of the first character of the token.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len()
    }
}

/// Lenient, forward-only tokenizer for `Exec`-style command lines.
///
/// Outside double quotes, spaces and tabs separate tokens. A backslash escapes the character
/// after it, so `\"` never toggles quoting and `\ ` never ends a token. Unbalanced quotes are not
/// an error: the token simply runs to the end of the input.
///
/// ```
/// use desktopfile::ExecTokenizer;
///
/// let tokens = ExecTokenizer::new("echo %F")
///     .map(|token| (token.text(), token.start()))
///     .collect::<Vec<_>>();
///
/// assert_eq!(tokens, [("echo", 0), ("%F", 5)]);
/// ```
#[derive(Debug, Clone)]
pub struct ExecTokenizer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> ExecTokenizer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    #[must_use]
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Restart tokenization from the beginning of the input.
    pub fn reset(&mut self) {
        self.position = 0;
    }
}

impl<'a> Iterator for ExecTokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.input.get(self.position..)?;
        let skipped = rest.len() - rest.trim_start_matches(is_separator).len();
        let start = self.position + skipped;

        if start >= self.input.len() {
            self.position = self.input.len();
            return None;
        }

        let mut end = self.input.len();
        let mut quoted = false;
        let mut chars = rest[skipped..].char_indices();

        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    _ = chars.next();
                }
                '"' => quoted = !quoted,
                c if !quoted && is_separator(c) => {
                    end = start + i;
                    break;
                }
                _ => {}
            }
        }

        self.position = end;

        Some(Token {
            text: &self.input[start..end],
            start,
        })
    }
}

impl FusedIterator for ExecTokenizer<'_> {}

fn is_separator(c: char) -> bool {
    c == ' ' || c == '\t'
}
