//! Depth-aware navigation over balanced markup, and seeking.

use super::stack::StackEntry;
use super::{Driver, HtmlProcessor, StepAction};
use crate::error::ProcessorError;
use crate::tag_processor::{BookmarkName, ScanMark, SeekPoint, TagQuery};

impl HtmlProcessor {
    /// Advances to the next tag, opener or closer, keeping the stack of open
    /// elements in step with explicit tag nesting.
    ///
    /// Returns false at the end of input and for documents that fail
    /// [`HtmlProcessor::ensure_support`].
    pub fn next_tag(&mut self) -> bool {
        if !self.ensure_support() {
            return false;
        }
        self.driver = Driver::Navigation;
        self.state.tag_closers.clear();
        self.pop_self_closed_current();
        if !self.tags.next_tag(TagQuery::VISIT_CLOSERS) {
            return false;
        }
        if self.tags.is_tag_closer() {
            let tag = self.tags.get_tag().unwrap_or_default().to_owned();
            if self.current_node_tag() == Some(tag.as_str()) {
                self.pop_element();
            } else {
                log::trace!(target: "html_api.tree", "closer {tag} does not match the open element");
            }
        } else {
            self.insert_current_element();
        }
        true
    }

    /// Moves to the next element sharing the current element's parent.
    ///
    /// Returns false, staying on the current tag, when the parent closes
    /// first or the processor is not on a start tag.
    pub fn next_sibling(&mut self) -> bool {
        if !self.ensure_support() || !self.is_on_opener() {
            return false;
        }
        let depth = self.get_current_depth();
        self.search_from_here(depth, depth.saturating_sub(1))
    }

    /// Moves to the first element nested inside the current one.
    ///
    /// Returns false, staying on the current tag, for void and self-closed
    /// elements and for elements without element children.
    pub fn first_child(&mut self) -> bool {
        if !self.ensure_support() || !self.is_on_opener() {
            return false;
        }
        if self
            .state
            .open_elements
            .current_node()
            .is_some_and(StackEntry::closes_itself)
        {
            return false;
        }
        let depth = self.get_current_depth();
        self.search_from_here(depth + 1, depth)
    }

    /// Scans forward for a start tag at `target_depth`, giving up once a
    /// closer leaves fewer than `floor` elements open or a start tag lands
    /// above the target. On failure the processor returns to where it was.
    fn search_from_here(&mut self, target_depth: usize, floor: usize) -> bool {
        let origin = BookmarkName::Scan(ScanMark::Origin);
        if !self.tags.set_named(origin.clone()) {
            return false;
        }
        let found = loop {
            if !self.next_tag() {
                break false;
            }
            let depth = self.get_current_depth();
            if self.tags.is_tag_closer() {
                if depth < floor {
                    break false;
                }
                continue;
            }
            if depth == target_depth {
                break true;
            }
            if depth < target_depth {
                break false;
            }
        };
        if !found {
            self.return_to(&origin);
        }
        self.tags.release_named(&origin);
        found
    }

    /// Moves to a caller bookmark, rebuilding the open elements at that
    /// position.
    pub fn seek(&mut self, name: &str) -> bool {
        let name = BookmarkName::Caller(name.into());
        if self.tags.named_span(&name).is_none() {
            return false;
        }
        if !self.tags.seek_budget_left() {
            log::debug!(target: "html_api.bookmarks", "seek budget exhausted");
            self.last_error = Some(ProcessorError::ExceededMaxSeeks);
            return false;
        }
        match self.driver {
            Driver::TreeConstruction => {
                self.tags.count_seek();
                self.replay_to(&name)
            }
            Driver::Idle | Driver::Navigation => {
                self.tags.count_seek();
                let ahead = self
                    .tags
                    .named_span(&name)
                    .is_some_and(|span| span.start >= self.tags.position());
                if ahead {
                    self.advance_to(&name)
                } else {
                    self.return_to(&name)
                }
            }
        }
    }

    /// Walks forward to a bookmark past the current position. Marks of the
    /// elements in between were released by an earlier backward seek, so
    /// the stack is rebuilt by visiting them again.
    fn advance_to(&mut self, name: &BookmarkName) -> bool {
        let Some(target) = self.tags.named_span(name) else {
            return false;
        };
        loop {
            match self.tags.token_span() {
                Some(span) if span.start == target.start => return true,
                Some(span) if span.start > target.start => return self.return_to(name),
                _ => {}
            }
            if !self.next_tag() {
                return false;
            }
        }
    }

    /// Repositions on a named bookmark and rebuilds the navigation stack from
    /// the element marks that were open there.
    pub(super) fn return_to(&mut self, name: &BookmarkName) -> bool {
        let Some(span) = self.tags.named_span(name) else {
            return false;
        };
        if !self.tags.reposition(name) {
            return false;
        }
        self.state.tag_closers.clear();
        self.rebuild_open_elements(SeekPoint::of(span));
        true
    }

    fn rebuild_open_elements(&mut self, point: SeekPoint) {
        let marks = self.tags.bookmarks();
        let kept: Vec<StackEntry> = self
            .state
            .open_elements
            .iter()
            .filter(|entry| match marks.element(entry.bookmark) {
                Some(mark) => point.has_opened(mark),
                // Implied elements (the fragment root) have no token.
                None => true,
            })
            .cloned()
            .collect();
        let reopened = self.tags.bookmarks_mut().rewind_elements(point);

        self.state.open_elements.clear();
        for entry in kept {
            self.state.open_elements.push(entry);
        }
        for (id, mark) in reopened {
            self.state
                .open_elements
                .push(StackEntry::opener(id, &mark.tag, mark.has_self_closing_flag));
        }
        log::trace!(
            target: "html_api.bookmarks",
            "rebuilt {} open elements, deepest mark at {}",
            self.state.open_elements.count(),
            self.tags.bookmarks().max_open_depth()
        );
    }

    /// Restarts tree construction from the top and steps until the
    /// bookmarked token is current again.
    fn replay_to(&mut self, name: &BookmarkName) -> bool {
        let Some(target) = self.tags.named_span(name) else {
            return false;
        };
        self.tags.rewind();
        self.state = self.initial_state.clone();
        self.last_error = None;
        while self.step(StepAction::Advance) {
            if self.tags.token_span().map(|span| span.start) == Some(target.start) {
                return true;
            }
        }
        false
    }
}
