//! Element Templates
//!
//! Describes the element a simple selector would match, so a host can create
//! it: `a#home.nav[rel=next]` becomes `<a rel="next" id="home" class="nav">`.

use crate::error::{Error, Result};
use crate::selector::{AttributeOp, Combinator, Segment};

const DEFAULT_TAG: &str = "div";

/// Tag and attributes for a new element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTemplate {
    pub tag: String,
    /// In insertion order; each name appears once
    pub attributes: Vec<(String, String)>,
}

impl ElementTemplate {
    /// Build a template from a single compound selector.
    ///
    /// Only the tag, `#id`, `.class` and plain `[name]` / `[name=value]`
    /// tests can be turned into an element; anything else is rejected.
    pub fn from_selector(selector: &str) -> Result<Self> {
        let text = selector.trim();
        let (segment, consumed) = Segment::parse(text)?;

        if consumed < text.len() || segment.combinator == Combinator::Child {
            return Err(Error::malformed(
                selector,
                "an element template takes a single segment",
            ));
        }
        if segment.pseudo.is_some() {
            return Err(Error::malformed(
                selector,
                "pseudo-classes cannot describe an element",
            ));
        }

        let tag = match segment.tag.as_deref() {
            None => DEFAULT_TAG.to_string(),
            Some("*") => {
                return Err(Error::malformed(selector, "'*' is not an element name"));
            }
            Some(tag) => tag.to_string(),
        };

        let mut template = ElementTemplate {
            tag,
            attributes: Vec::new(),
        };

        for test in segment.attributes {
            if test.op != AttributeOp::Plain {
                return Err(Error::malformed(
                    selector,
                    format!("attribute test on {:?} cannot describe an element", test.name),
                ));
            }
            template.set(test.name, test.value.unwrap_or_default());
        }
        if let Some(id) = segment.id {
            template.set("id".to_string(), id);
        }
        if !segment.classes.is_empty() {
            template.set("class".to_string(), segment.classes.join(" "));
        }

        Ok(template)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn set(&mut self, name: String, value: String) {
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }
}
