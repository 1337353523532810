//! Shared tree-construction algorithms.

use super::HtmlProcessor;
use super::formatting::FormattingEntry;
use super::modes::InsertionMode;
use super::stack::StackEntry;
use crate::elements;
use crate::tag_processor::BookmarkId;

/// Elements closed by "generate implied end tags".
const IMPLIED_END_TAGS: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
];

/// Elements closed by "generate all implied end tags thoroughly".
const THOROUGH_IMPLIED_END_TAGS: &[&str] = &[
    "caption", "colgroup", "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
    "tbody", "td", "tfoot", "th", "thead", "tr",
];

impl HtmlProcessor {
    /// Pops until an element with this tag has been popped. Returns false
    /// when no such element was open; the stack is then unchanged.
    pub(super) fn pop_until(&mut self, tag: &str) -> bool {
        if !self.state.open_elements.has_element(tag) {
            return false;
        }
        while let Some(entry) = self.pop_element() {
            if entry.tag() == tag {
                break;
            }
        }
        true
    }

    /// Pops until this specific entry has been popped.
    pub(super) fn pop_until_entry(&mut self, id: BookmarkId) -> bool {
        if !self.state.open_elements.contains(id) {
            return false;
        }
        while let Some(entry) = self.pop_element() {
            if entry.bookmark == id {
                break;
            }
        }
        true
    }

    pub(super) fn pop_until_any_heading(&mut self) {
        while let Some(entry) = self.pop_element() {
            if elements::is_heading(entry.tag()) {
                break;
            }
        }
    }

    pub(super) fn generate_implied_end_tags(&mut self, except: Option<&str>) {
        while let Some(current) = self.state.open_elements.current_node() {
            let tag = current.tag();
            if Some(tag) == except || !IMPLIED_END_TAGS.contains(&tag) {
                break;
            }
            self.pop_element();
        }
    }

    pub(super) fn generate_implied_end_tags_thoroughly(&mut self) {
        while let Some(current) = self.state.open_elements.current_node() {
            if !THOROUGH_IMPLIED_END_TAGS.contains(&current.tag()) {
                break;
            }
            self.pop_element();
        }
    }

    /// Closes everything still open once the input is exhausted.
    pub(super) fn stop_parsing(&mut self) {
        self.generate_implied_end_tags_thoroughly();
        if self
            .state
            .open_elements
            .iter()
            .any(|entry| !matches!(entry.tag(), "html" | "body"))
        {
            log::trace!(target: "html_api.tree", "parse error: end of input with open elements");
        }
        while self.pop_element().is_some() {}
    }

    pub(super) fn close_a_p_element(&mut self) {
        self.generate_implied_end_tags(Some("p"));
        if self.current_node_tag() != Some("p") {
            log::trace!(target: "html_api.tree", "parse error: p closed with other elements open");
        }
        self.pop_until("p");
    }

    /// Closes an open `p` in button scope, as block-level start tags do.
    pub(super) fn close_p_in_button_scope(&mut self) {
        if self.state.open_elements.has_element_in_button_scope("p") {
            self.close_a_p_element();
        }
    }

    pub(super) fn current_node_tag(&self) -> Option<&str> {
        self.state.open_elements.current_node().map(StackEntry::tag)
    }

    /// Pushes the current start tag onto the list of active formatting
    /// elements.
    pub(super) fn push_active_formatting_element(&mut self, id: BookmarkId) {
        let tag = self.tags.get_tag().unwrap_or_default().to_owned();
        let attributes = self.tags.attribute_pairs();
        self.state
            .active_formatting
            .push_element(id, &tag, attributes);
    }

    /// Reopens formatting elements that were closed implicitly while still
    /// active, from the first one missing from the stack onwards.
    pub(super) fn reconstruct_active_formatting_elements(&mut self) {
        let list = &self.state.active_formatting;
        if list.is_empty() {
            return;
        }
        let last = list.len() - 1;
        let needs_reopen = |index: usize| match list.get(index) {
            Some(FormattingEntry::Element { id, .. }) => !self.state.open_elements.contains(*id),
            _ => false,
        };
        if !needs_reopen(last) {
            return;
        }

        let mut index = last;
        while index > 0 {
            index -= 1;
            if !needs_reopen(index) {
                index += 1;
                break;
            }
        }

        for index in index..=last {
            let Some(FormattingEntry::Element { tag, .. }) = self.state.active_formatting.get(index)
            else {
                continue;
            };
            let tag = tag.clone();
            let new_id = self.push_implied(&tag);
            self.state.active_formatting.replace_id(index, new_id);
            log::trace!(target: "html_api.tree", "reconstructed formatting element {tag}");
        }
    }

    /// Picks the insertion mode from the innermost structurally significant
    /// open element, with the fragment context standing in for the root.
    pub(super) fn reset_insertion_mode(&mut self) {
        let mode = self.appropriate_insertion_mode();
        if mode != self.state.insertion_mode {
            log::trace!(
                target: "html_api.tree",
                "reset insertion mode {} -> {}",
                self.state.insertion_mode.name(),
                mode.name()
            );
        }
        self.state.insertion_mode = mode;
    }

    fn appropriate_insertion_mode(&self) -> InsertionMode {
        let stack = &self.state.open_elements;
        let context = self.state.context_node.as_ref();
        for index in (0..stack.count()).rev() {
            let Some(entry) = stack.get(index) else {
                continue;
            };
            let last = index == 0;
            let tag = match (last, context) {
                (true, Some(context)) => &*context.tag,
                _ => entry.tag(),
            };
            match tag {
                "select" => {
                    if !last {
                        for ancestor in stack.iter().take(index).rev() {
                            match ancestor.tag() {
                                "template" => break,
                                "table" => return InsertionMode::InSelectInTable,
                                _ => {}
                            }
                        }
                    }
                    return InsertionMode::InSelect;
                }
                "td" | "th" if !last => return InsertionMode::InCell,
                "tr" => return InsertionMode::InRow,
                "tbody" | "thead" | "tfoot" => return InsertionMode::InTableBody,
                "caption" => return InsertionMode::InCaption,
                "colgroup" => return InsertionMode::InColumnGroup,
                "table" => return InsertionMode::InTable,
                "template" => {
                    return self
                        .state
                        .template_insertion_modes
                        .last()
                        .copied()
                        .unwrap_or(InsertionMode::InTemplate);
                }
                "head" if !last => return InsertionMode::InHead,
                "body" => return InsertionMode::InBody,
                "frameset" => return InsertionMode::InFrameset,
                "html" => {
                    return if self.state.head_element.is_none() {
                        InsertionMode::BeforeHead
                    } else {
                        InsertionMode::AfterHead
                    };
                }
                _ if last => return InsertionMode::InBody,
                _ => {}
            }
        }
        InsertionMode::InBody
    }
}
