//! Attribute parsing for start and end tags.

use std::borrow::Cow;

use super::scan::{find_byte, is_html_whitespace, run_len};
use super::span::Span;

/// Attribute as found in the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AttributeToken {
    pub(crate) name: Span,
    /// `None` for boolean attributes written without `=`.
    pub(crate) value: Option<Span>,
}

/// Value reported for an attribute lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeValue<'a> {
    /// Boolean attribute, e.g. `<input disabled>`.
    Present,
    /// Decoded attribute value; `<a href="">` yields an empty string.
    Value(Cow<'a, str>),
}

impl AttributeValue<'_> {
    /// String value, treating boolean attributes as the empty string.
    pub fn as_str(&self) -> &str {
        match self {
            AttributeValue::Present => "",
            AttributeValue::Value(value) => value,
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, AttributeValue::Present)
    }
}

/// Result of parsing everything between the tag name and the closing `>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TagTail {
    pub(crate) attributes: Vec<AttributeToken>,
    pub(crate) has_self_closing_flag: bool,
    /// Offset just past the closing `>`.
    pub(crate) end: usize,
}

/// Parses attributes starting at `at` until the tag's `>`.
///
/// Returns `None` when the buffer ends before the tag does.
pub(crate) fn parse_tag_tail(html: &[u8], mut at: usize) -> Option<TagTail> {
    let mut tail = TagTail::default();
    loop {
        at += run_len(html, at, is_html_whitespace);
        match *html.get(at)? {
            b'>' => {
                tail.end = at + 1;
                return Some(tail);
            }
            b'/' => {
                if html.get(at + 1) == Some(&b'>') {
                    tail.has_self_closing_flag = true;
                    tail.end = at + 2;
                    return Some(tail);
                }
                at += 1;
                continue;
            }
            _ => {}
        }

        // A leading `=` belongs to the name.
        let name_start = at;
        at += 1;
        at += run_len(html, at, |b| {
            !(is_html_whitespace(b) || matches!(b, b'/' | b'>' | b'='))
        });
        let name = Span::new(name_start, at);

        at += run_len(html, at, is_html_whitespace);
        if *html.get(at)? != b'=' {
            tail.attributes.push(AttributeToken { name, value: None });
            continue;
        }
        at += 1;
        at += run_len(html, at, is_html_whitespace);
        let value = match *html.get(at)? {
            quote @ (b'"' | b'\'') => {
                let close = find_byte(html, quote, at + 1)?;
                let value = Span::new(at + 1, close);
                at = close + 1;
                value
            }
            _ => {
                let start = at;
                at += run_len(html, at, |b| !(is_html_whitespace(b) || b == b'>'));
                Span::new(start, at)
            }
        };
        tail.attributes.push(AttributeToken {
            name,
            value: Some(value),
        });
    }
}
