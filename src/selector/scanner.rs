//! Byte scanner for selector text
//!
//! Uses memchr for delimiter detection. Quoted runs inside brackets and
//! parentheses are skipped as a unit, so `[title="a]b"]` closes at the last
//! bracket.

use memchr::{memchr, memchr3};

/// Cursor over selector text
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given input
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Scanner { input, pos: 0 }
    }

    /// Get the current position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Check if we've reached the end
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Get remaining text
    #[inline]
    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Peek at current byte without advancing
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    /// Advance by n bytes
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Consume `b` if it is the current byte
    #[inline]
    pub fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skip whitespace characters (space, tab, newline, carriage return, form feed)
    #[inline]
    pub fn skip_whitespace(&mut self) -> usize {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.pos - start
    }

    /// Read a run of name characters (`[A-Za-z0-9_-]` and non-ASCII)
    pub fn read_name(&mut self) -> Option<&'a str> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && is_name_char(bytes[self.pos]) {
            self.pos += 1;
        }
        if self.pos > start {
            Some(&self.input[start..self.pos])
        } else {
            None
        }
    }

    /// Read the body of a `[...]` block. The opening bracket must already be
    /// consumed; the closing bracket is consumed and not returned.
    pub fn read_bracketed(&mut self) -> Option<&'a str> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        let mut at = start;

        loop {
            let offset = memchr3(b']', b'"', b'\'', &bytes[at..])?;
            let found = at + offset;
            match bytes[found] {
                b']' => {
                    self.pos = found + 1;
                    return Some(&self.input[start..found]);
                }
                quote => at = skip_quoted(bytes, found, quote)?,
            }
        }
    }

    /// Read the body of a `(...)` group, honouring nested parentheses. The
    /// opening parenthesis must already be consumed.
    pub fn read_parenthesized(&mut self) -> Option<&'a str> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        let mut depth = 1usize;
        let mut at = start;

        while at < bytes.len() {
            match bytes[at] {
                b'(' => {
                    depth += 1;
                    at += 1;
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos = at + 1;
                        return Some(&self.input[start..at]);
                    }
                    at += 1;
                }
                quote @ (b'"' | b'\'') => at = skip_quoted(bytes, at, quote)?,
                _ => at += 1,
            }
        }
        None
    }
}

/// Position just past the closing quote of the quoted run starting at `open`
fn skip_quoted(bytes: &[u8], open: usize, quote: u8) -> Option<usize> {
    memchr(quote, &bytes[open + 1..]).map(|len| open + len + 2)
}

/// Split `input` on `delimiter` at nesting depth zero, outside quotes
pub fn split_top_level(input: &str, delimiter: u8) -> Option<Vec<&str>> {
    let bytes = input.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut at = 0;

    while at < bytes.len() {
        match bytes[at] {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            quote @ (b'"' | b'\'') => {
                at = skip_quoted(bytes, at, quote)?;
                continue;
            }
            b if b == delimiter && depth == 0 => {
                parts.push(&input[start..at]);
                start = at + 1;
            }
            _ => {}
        }
        at += 1;
    }
    parts.push(&input[start..]);
    Some(parts)
}

/// Byte offset of the last `pattern` at nesting depth zero, outside quotes.
/// Scanning stops at an unterminated quote.
pub fn rfind_top_level(input: &str, pattern: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    let needle = pattern.as_bytes();
    let mut depth = 0usize;
    let mut found = None;
    let mut at = 0;

    while at < bytes.len() {
        match bytes[at] {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            quote @ (b'"' | b'\'') => match skip_quoted(bytes, at, quote) {
                Some(next) => {
                    at = next;
                    continue;
                }
                None => break,
            },
            _ if depth == 0 && bytes[at..].starts_with(needle) => found = Some(at),
            _ => {}
        }
        at += 1;
    }
    found
}

/// Strip one pair of surrounding quotes, if present
pub fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0c)
}

/// Check if byte is valid in a selector name
/// Allows ASCII alphanumeric, `_`, `-` and non-ASCII (UTF-8 Unicode)
#[inline]
pub fn is_name_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-') || b >= 0x80
}
