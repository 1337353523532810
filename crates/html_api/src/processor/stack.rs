//! Stack of open elements and the HTML scope predicates.

use crate::elements::{self, ElementCategory};
use crate::tag_processor::BookmarkId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntryFlags {
    pub is_closer: bool,
    pub has_self_closing_flag: bool,
}

/// Entry on one of the processor's element stacks.
///
/// `bookmark` is the entry's identity. Two entries for the same tag name are
/// distinct; removal and scope checks by identity never confuse them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackEntry {
    pub bookmark: BookmarkId,
    pub tag: Box<str>,
    pub category: ElementCategory,
    pub flags: EntryFlags,
    /// For closer entries: the opener this entry closed. Lookup only.
    pub related_entry: Option<BookmarkId>,
}

impl StackEntry {
    pub(crate) fn opener(bookmark: BookmarkId, tag: &str, has_self_closing_flag: bool) -> Self {
        Self {
            bookmark,
            tag: tag.into(),
            category: elements::classify(tag),
            flags: EntryFlags {
                is_closer: false,
                has_self_closing_flag,
            },
            related_entry: None,
        }
    }

    pub(crate) fn closer_of(bookmark: BookmarkId, opener: &StackEntry) -> Self {
        Self {
            bookmark,
            tag: opener.tag.clone(),
            category: opener.category,
            flags: EntryFlags {
                is_closer: true,
                has_self_closing_flag: false,
            },
            related_entry: Some(opener.bookmark),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Void elements and self-closed foreign elements never see a closer.
    pub fn closes_itself(&self) -> bool {
        elements::closes_itself(self.category, self.flags.has_self_closing_flag)
    }
}

/// Terminators shared by every scope except table and select scope.
const PARTICULAR_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
];
const LIST_ITEM_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "ol", "ul",
];
const BUTTON_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "button",
];
const TABLE_SCOPE: &[&str] = &["html", "table", "template"];

/// Stack of open elements; top is the most recently pushed entry.
#[derive(Clone, Debug, Default)]
pub struct ElementStack {
    items: Vec<StackEntry>,
    max_depth: usize,
}

impl ElementStack {
    pub fn push(&mut self, entry: StackEntry) {
        self.items.push(entry);
        self.max_depth = self.max_depth.max(self.items.len());
    }

    pub fn pop(&mut self) -> Option<StackEntry> {
        self.items.pop()
    }

    /// Entry `n_from_top` below the top; `0` is the current node.
    pub fn peek(&self, n_from_top: usize) -> Option<&StackEntry> {
        let index = self.items.len().checked_sub(n_from_top + 1)?;
        self.items.get(index)
    }

    pub fn current_node(&self) -> Option<&StackEntry> {
        self.items.last()
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Bottom-to-top iteration.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &StackEntry> + ExactSizeIterator + '_ {
        self.items.iter()
    }

    /// Entry at `index`, counted from the bottom.
    pub fn get(&self, index: usize) -> Option<&StackEntry> {
        self.items.get(index)
    }

    pub fn has_element(&self, tag: &str) -> bool {
        self.items.iter().any(|entry| *entry.tag == *tag)
    }

    pub fn contains(&self, id: BookmarkId) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: BookmarkId) -> Option<usize> {
        self.items.iter().rposition(|entry| entry.bookmark == id)
    }

    /// Removes the entry with this identity, wherever it sits.
    pub fn remove(&mut self, id: BookmarkId) -> Option<StackEntry> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    /// Scans from the top: the target wins over a terminator on the same
    /// entry, so `has_element_in_specific_scope("table", TABLE_SCOPE)` holds
    /// with a `table` on top.
    pub fn has_element_in_specific_scope(&self, target: &str, termination: &[&str]) -> bool {
        for entry in self.items.iter().rev() {
            if *entry.tag == *target {
                return true;
            }
            if termination.contains(&entry.tag()) {
                return false;
            }
        }
        false
    }

    pub fn has_element_in_scope(&self, target: &str) -> bool {
        self.has_element_in_specific_scope(target, PARTICULAR_SCOPE)
    }

    pub fn has_element_in_list_item_scope(&self, target: &str) -> bool {
        self.has_element_in_specific_scope(target, LIST_ITEM_SCOPE)
    }

    pub fn has_element_in_button_scope(&self, target: &str) -> bool {
        self.has_element_in_specific_scope(target, BUTTON_SCOPE)
    }

    pub fn has_element_in_table_scope(&self, target: &str) -> bool {
        self.has_element_in_specific_scope(target, TABLE_SCOPE)
    }

    /// Select scope terminates on everything except `optgroup` and `option`.
    pub fn has_element_in_select_scope(&self, target: &str) -> bool {
        for entry in self.items.iter().rev() {
            if *entry.tag == *target {
                return true;
            }
            if !matches!(entry.tag(), "optgroup" | "option") {
                return false;
            }
        }
        false
    }

    /// Whether any of h1..h6 is in scope.
    pub fn has_heading_in_scope(&self) -> bool {
        for entry in self.items.iter().rev() {
            if elements::is_heading(entry.tag()) {
                return true;
            }
            if PARTICULAR_SCOPE.contains(&entry.tag()) {
                return false;
            }
        }
        false
    }

    /// Whether this specific entry is in scope.
    pub fn has_entry_in_scope(&self, id: BookmarkId) -> bool {
        for entry in self.items.iter().rev() {
            if entry.bookmark == id {
                return true;
            }
            if PARTICULAR_SCOPE.contains(&entry.tag()) {
                return false;
            }
        }
        false
    }
}
