//! Selector Segments
//!
//! A segment is one compound selector such as `li.item[data-id]:first-child`,
//! plus the combinator that links it to the next segment. Parsing is a fixed
//! sequence of states: tag, id, classes, attributes, pseudo-class,
//! combinator.

use super::scanner::{is_name_char, unquote, Scanner};
use crate::error::{Error, Result};

/// Relation between a segment and the one that follows it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    /// Whitespace: the next segment may be at any depth
    #[default]
    Descendant,
    /// `>`: the next segment must be a direct child
    Child,
}

/// Operator of a bracketed attribute test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOp {
    /// `[name]` or `[name=value]`
    Plain,
    /// `[^name]`: some attribute name starts with `name`
    NamePrefix,
    /// `[!name]`: attribute is absent
    Absent,
    /// `[name^=value]`
    StartsWith,
    /// `[name$=value]`
    EndsWith,
    /// `[name*=value]`
    Contains,
    /// `[name!=value]`
    NotEquals,
    /// `[name~=value]`: whitespace-separated token
    Includes,
}

impl AttributeOp {
    fn from_suffix(b: u8) -> Option<Self> {
        match b {
            b'^' => Some(AttributeOp::StartsWith),
            b'$' => Some(AttributeOp::EndsWith),
            b'*' => Some(AttributeOp::Contains),
            b'!' => Some(AttributeOp::NotEquals),
            b'~' => Some(AttributeOp::Includes),
            _ => None,
        }
    }

    /// Operators that compare against a value and cannot be used without one
    pub fn requires_value(self) -> bool {
        !matches!(
            self,
            AttributeOp::Plain | AttributeOp::NamePrefix | AttributeOp::Absent
        )
    }
}

/// One `[...]` test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTest {
    pub name: String,
    pub op: AttributeOp,
    pub value: Option<String>,
}

/// `:name` or `:name(args)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pseudo {
    pub name: String,
    /// Raw argument text with surrounding whitespace removed
    pub args: Option<String>,
}

/// A parsed compound selector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeTest>,
    pub pseudo: Option<Pseudo>,
    /// Applies to the next segment in the chain
    pub combinator: Combinator,
}

impl Segment {
    /// Parse the leading segment of `text`.
    ///
    /// Returns the segment and the number of bytes consumed, including the
    /// whitespace and `>` that separate it from the next segment.
    pub fn parse(text: &str) -> Result<(Segment, usize)> {
        parse_segment(text, 0, text)
    }

    /// True when the segment constrains nothing beyond its tag
    pub fn has_constraints(&self) -> bool {
        self.id.is_some()
            || !self.classes.is_empty()
            || !self.attributes.is_empty()
            || self.pseudo.is_some()
    }
}

/// Parse one segment of `text` starting at byte `start`. Errors report
/// `source`, the full clause being compiled.
pub(crate) fn parse_segment(text: &str, start: usize, source: &str) -> Result<(Segment, usize)> {
    let mut scanner = Scanner::new(text);
    scanner.advance(start);
    scanner.skip_whitespace();

    if scanner.is_eof() {
        return Err(Error::malformed(source, "selector must not be empty"));
    }

    let mut segment = Segment::default();

    // tag
    if scanner.eat(b'*') {
        segment.tag = Some("*".to_string());
    } else if let Some(tag) = scanner.read_name() {
        segment.tag = Some(tag.to_string());
    }

    // id
    if scanner.eat(b'#') {
        let id = scanner
            .read_name()
            .ok_or_else(|| Error::malformed(source, "expected an id after '#'"))?;
        segment.id = Some(id.to_string());
    }

    // classes
    while scanner.eat(b'.') {
        let class = scanner
            .read_name()
            .ok_or_else(|| Error::malformed(source, "expected a class name after '.'"))?;
        segment.classes.push(class.to_string());
    }

    // attributes
    while scanner.eat(b'[') {
        let body = scanner
            .read_bracketed()
            .ok_or_else(|| Error::malformed(source, "unterminated '['"))?;
        segment.attributes.push(parse_attribute(body, source)?);
    }

    // pseudo-class
    if scanner.peek() == Some(b':') {
        scanner.advance(1);
        if scanner.peek() == Some(b':') {
            return Err(Error::malformed(
                source,
                "a '::' property must end the selector",
            ));
        }
        let name = scanner
            .read_name()
            .ok_or_else(|| Error::malformed(source, "pseudo-class name must not be empty"))?;
        let args = if scanner.eat(b'(') {
            let raw = scanner
                .read_parenthesized()
                .ok_or_else(|| Error::malformed(source, "unterminated '('"))?;
            Some(raw.trim().to_string())
        } else {
            None
        };
        segment.pseudo = Some(Pseudo {
            name: name.to_string(),
            args,
        });
    }

    if segment.tag.is_none() && !segment.has_constraints() {
        let reason = match scanner.remaining().chars().next() {
            Some(c) => format!("unexpected character {c:?}"),
            None => "segment has no tag or constraint".to_string(),
        };
        return Err(Error::malformed(source, reason));
    }

    // combinator
    let spaced = scanner.skip_whitespace() > 0;
    if scanner.eat(b'>') {
        segment.combinator = Combinator::Child;
        scanner.skip_whitespace();
    } else if !spaced && !scanner.is_eof() {
        let c = scanner.remaining().chars().next().unwrap_or_default();
        return Err(Error::malformed(source, format!("unexpected character {c:?}")));
    }

    Ok((segment, scanner.position() - start))
}

/// Parse the body of `[...]`
fn parse_attribute(body: &str, source: &str) -> Result<AttributeTest> {
    let (lhs, value) = match body.find('=') {
        Some(eq) => (&body[..eq], Some(unquote(body[eq + 1..].trim()).to_string())),
        None => (body, None),
    };
    let mut name = lhs.trim();

    let mut op = AttributeOp::Plain;
    if let Some(rest) = name.strip_prefix('^') {
        op = AttributeOp::NamePrefix;
        name = rest;
    } else if let Some(rest) = name.strip_prefix('!') {
        op = AttributeOp::Absent;
        name = rest;
    }

    if let Some(suffix) = name.as_bytes().last().copied().and_then(AttributeOp::from_suffix) {
        if op != AttributeOp::Plain {
            return Err(Error::malformed(
                source,
                format!("attribute test [{body}] combines a prefix and a suffix operator"),
            ));
        }
        op = suffix;
        name = &name[..name.len() - 1];
    }

    let name = name.trim_end();
    if name.is_empty() {
        return Err(Error::malformed(source, "attribute name must not be empty"));
    }
    if !name.bytes().all(|b| is_name_char(b) || b == b':') {
        return Err(Error::malformed(
            source,
            format!("invalid attribute name {name:?}"),
        ));
    }
    if op.requires_value() && value.is_none() {
        return Err(Error::malformed(
            source,
            format!("attribute test [{body}] needs a value"),
        ));
    }
    if op == AttributeOp::Absent && value.is_some() {
        return Err(Error::malformed(
            source,
            format!("attribute test [{body}] cannot take a value"),
        ));
    }

    Ok(AttributeTest {
        name: name.to_string(),
        op,
        value,
    })
}
