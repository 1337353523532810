//! Bookmark storage.
//!
//! Two independent maps share one lifecycle:
//! - `named`: spans the caller (or a processor scan) asked to remember by
//!   name. Caller names and the processor's private scan marks live in
//!   separate key variants, so they can never collide.
//! - `elements`: one mark per element pushed on a stack of open elements,
//!   tagged with the stack depth at which it was opened. Marks outlive the
//!   element while a named bookmark still points inside it, so a later seek
//!   can rebuild the ancestor chain at that bookmark.
//!
//! Every span refers to the current buffer. Lexical edits go through
//! [`BookmarkStore::apply_edits`], which shifts or invalidates spans.

use std::collections::{BTreeMap, HashMap};

use super::replacements::AppliedEdit;
use super::span::Span;

/// Private marks used by processor scans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum ScanMark {
    /// Tag a content operation started from.
    Start,
    /// Closer found by a content operation.
    End,
    /// Position a failed sibling/child search returns to.
    Origin,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum BookmarkName {
    Caller(Box<str>),
    Scan(ScanMark),
}

/// Identity of a stack entry and key of its element mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookmarkId(u32);

/// Stack-position marker for one element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ElementMark {
    pub(crate) depth: usize,
    pub(crate) tag: Box<str>,
    pub(crate) opener: Span,
    /// Set once the element is popped.
    pub(crate) closer: Option<Span>,
    pub(crate) has_self_closing_flag: bool,
}

/// Position a seek lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SeekPoint {
    /// On the token starting at this offset, after it was processed.
    Token(usize),
    /// Between tokens, before anything at this offset was processed.
    Gap(usize),
}

impl SeekPoint {
    pub(crate) fn of(span: Span) -> Self {
        if span.is_empty() {
            SeekPoint::Gap(span.start)
        } else {
            SeekPoint::Token(span.start)
        }
    }

    /// Whether the element was opened at or before this point.
    pub(crate) fn has_opened(self, mark: &ElementMark) -> bool {
        match self {
            SeekPoint::Token(at) => mark.opener.start <= at,
            SeekPoint::Gap(at) => mark.opener.start < at,
        }
    }

    /// Whether the element was still open at this point.
    pub(crate) fn sees_open(self, mark: &ElementMark) -> bool {
        if !self.has_opened(mark) {
            return false;
        }
        let Some(closer) = mark.closer else {
            return true;
        };
        match self {
            SeekPoint::Token(at) => at < closer.start,
            // A zero-width closer marks a void pop that already happened here.
            SeekPoint::Gap(at) if closer.is_empty() => at < closer.start,
            SeekPoint::Gap(at) => at <= closer.start,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct BookmarkStore {
    named: HashMap<BookmarkName, Span>,
    elements: BTreeMap<BookmarkId, ElementMark>,
    next_id: u32,
}

impl BookmarkStore {
    pub(crate) fn get(&self, name: &BookmarkName) -> Option<Span> {
        self.named.get(name).copied()
    }

    pub(crate) fn insert(&mut self, name: BookmarkName, span: Span) {
        self.named.insert(name, span);
    }

    pub(crate) fn remove(&mut self, name: &BookmarkName) -> bool {
        let removed = self.named.remove(name).is_some();
        if removed {
            self.prune_closed_elements();
        }
        removed
    }

    pub(crate) fn caller_count(&self) -> usize {
        self.named
            .keys()
            .filter(|name| matches!(name, BookmarkName::Caller(_)))
            .count()
    }

    /// Fresh identity with no mark attached, for entries with no token of
    /// their own: implied elements and recorded closers.
    pub(crate) fn allocate_id(&mut self) -> BookmarkId {
        let id = BookmarkId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    pub(crate) fn open_element(
        &mut self,
        depth: usize,
        tag: &str,
        opener: Span,
        has_self_closing_flag: bool,
    ) -> BookmarkId {
        let id = self.allocate_id();
        self.elements.insert(
            id,
            ElementMark {
                depth,
                tag: tag.into(),
                opener,
                closer: None,
                has_self_closing_flag,
            },
        );
        id
    }

    /// Records the closer of an element, dropping the mark unless a named
    /// bookmark can still seek inside the element.
    pub(crate) fn close_element(&mut self, id: BookmarkId, closer: Span) {
        if let Some(mark) = self.elements.get_mut(&id) {
            mark.closer = Some(closer);
        }
        if !self.is_needed(id) {
            self.elements.remove(&id);
        }
    }

    pub(crate) fn element(&self, id: BookmarkId) -> Option<&ElementMark> {
        self.elements.get(&id)
    }

    pub(crate) fn clear_elements(&mut self) {
        self.elements.clear();
    }

    /// Rewinds element marks to `point`.
    ///
    /// Marks opened after the point are released; marks still open at the
    /// point are reopened. Returns the reopened marks, ordered by depth.
    pub(crate) fn rewind_elements(&mut self, point: SeekPoint) -> Vec<(BookmarkId, ElementMark)> {
        self.elements.retain(|_, mark| point.has_opened(mark));
        let mut reopened = Vec::new();
        for (&id, mark) in self.elements.iter_mut() {
            if mark.closer.is_some() && point.sees_open(mark) {
                mark.closer = None;
                reopened.push((id, mark.clone()));
            }
        }
        reopened.sort_by_key(|(_, mark)| mark.depth);
        self.prune_closed_elements();
        reopened
    }

    /// Maximum depth among marks that are still open.
    pub(crate) fn max_open_depth(&self) -> usize {
        self.elements
            .values()
            .filter(|mark| mark.closer.is_none())
            .map(|mark| mark.depth)
            .max()
            .unwrap_or(0)
    }

    /// Shifts every span past the edits and drops spans that overlapped one.
    pub(crate) fn apply_edits(&mut self, edits: &[AppliedEdit]) {
        if edits.is_empty() {
            return;
        }
        self.named.retain(|name, span| match shift_span(*span, edits) {
            Some(shifted) => {
                *span = shifted;
                true
            }
            None => {
                log::trace!(target: "html_api.bookmarks", "edit invalidated bookmark {name:?}");
                false
            }
        });
        self.elements.retain(|_, mark| {
            let Some(opener) = shift_span(mark.opener, edits) else {
                return false;
            };
            let closer = match mark.closer {
                Some(closer) => match shift_span(closer, edits) {
                    Some(shifted) => Some(shifted),
                    None => return false,
                },
                None => None,
            };
            mark.opener = opener;
            mark.closer = closer;
            true
        });
    }

    fn is_needed(&self, id: BookmarkId) -> bool {
        let Some(mark) = self.elements.get(&id) else {
            return false;
        };
        let Some(closer) = mark.closer else {
            return true;
        };
        self.named
            .values()
            .any(|span| mark.opener.start <= span.start && span.start <= closer.start)
    }

    fn prune_closed_elements(&mut self) {
        let unneeded: Vec<BookmarkId> = self
            .elements
            .keys()
            .copied()
            .filter(|&id| !self.is_needed(id))
            .collect();
        for id in unneeded {
            self.elements.remove(&id);
        }
    }

    #[cfg(test)]
    pub(crate) fn element_count(&self) -> usize {
        self.elements.len()
    }
}

/// Maps an offset in the old buffer to the new one. An insertion exactly at
/// `offset` lands before it.
pub(crate) fn shift_offset(offset: usize, edits: &[AppliedEdit]) -> usize {
    let mut shifted = offset as isize;
    for edit in edits {
        if edit.old.end <= offset {
            shifted += edit.delta();
        }
    }
    shifted.max(0) as usize
}

/// Maps a span to the new buffer, or `None` when an edit rewrote part of it.
pub(crate) fn shift_span(span: Span, edits: &[AppliedEdit]) -> Option<Span> {
    if edits.iter().any(|edit| overlaps(span, edit.old)) {
        return None;
    }
    let start = shift_offset(span.start, edits);
    Some(Span::new(start, start + span.len()))
}

fn overlaps(span: Span, edited: Span) -> bool {
    if edited.is_empty() {
        span.start < edited.start && edited.start < span.end
    } else if span.is_empty() {
        edited.start < span.start && span.start < edited.end
    } else {
        span.start < edited.end && edited.start < span.end
    }
}
