//! Balance check gating the navigation and editing APIs.

use super::HtmlProcessor;
use crate::elements;
use crate::tag_processor::{ParserState, TagProcessor, TagQuery};

impl HtmlProcessor {
    /// Whether every element in the document is closed explicitly and in
    /// order, which is what depth-based navigation relies on. Void elements
    /// and self-closed foreign elements need no closer.
    ///
    /// The scan runs once; the answer is cached. Navigation and content
    /// methods return their "not found" value on unsupported documents.
    pub fn ensure_support(&mut self) -> bool {
        if let Some(supported) = self.support {
            return supported;
        }
        let supported = is_balanced(self.tags.html());
        if !supported {
            log::debug!(target: "html_api.tree", "document is not explicitly balanced");
        }
        self.support = Some(supported);
        supported
    }
}

/// Bracket-matches the tags of `html`: each closer must close the most
/// recent unclosed opener.
pub(super) fn is_balanced(html: &str) -> bool {
    let mut scanner = TagProcessor::new(html);
    let mut open: Vec<String> = Vec::new();
    while scanner.next_tag(TagQuery::VISIT_CLOSERS) {
        let Some(tag) = scanner.get_tag() else {
            continue;
        };
        if scanner.is_tag_closer() {
            if open.last().map(String::as_str) != Some(tag) {
                return false;
            }
            open.pop();
        } else if !elements::closes_itself(elements::classify(tag), scanner.has_self_closing_flag())
        {
            open.push(tag.to_owned());
        }
    }
    scanner.parser_state() == ParserState::Complete && open.is_empty()
}
