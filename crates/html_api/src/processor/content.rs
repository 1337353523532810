//! Reading and replacing the markup of the current element.
//!
//! Each operation brackets the current element between two private scan
//! bookmarks: `Start` on its opener and `End` on the closer that brings the
//! depth back below the opener's. Both are released on every exit path.
//! After a read or a replacement the processor is back on the opener (or,
//! when the opener itself was replaced, right before the new markup).

use super::HtmlProcessor;
use super::stack::StackEntry;
use super::support::is_balanced;
use crate::tag_processor::{self, BookmarkName, ScanMark, Span};

const START: BookmarkName = BookmarkName::Scan(ScanMark::Start);
const END: BookmarkName = BookmarkName::Scan(ScanMark::End);

/// Which part of the element a content operation covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Extent {
    /// Between the opener and the closer.
    Inner,
    /// Opener and closer included.
    Outer,
}

impl Extent {
    fn span(self, opener: Span, closer: Span) -> Span {
        match self {
            Extent::Inner => Span::new(opener.end, closer.start),
            Extent::Outer => Span::new(opener.start, closer.end),
        }
    }
}

impl HtmlProcessor {
    /// Markup between the current element's opener and its closer.
    ///
    /// `None` when the processor is not on a start tag, the element closes
    /// itself, or no closer follows.
    pub fn get_inner_content(&mut self) -> Option<String> {
        self.read_content(Extent::Inner)
    }

    /// Markup of the current element including its opener and closer.
    pub fn get_outer_content(&mut self) -> Option<String> {
        self.read_content(Extent::Outer)
    }

    /// Replaces the current element's contents. `html` must itself be
    /// balanced markup; otherwise nothing changes and false is returned.
    /// Inside raw text and RCDATA elements such as `script` or `title` any
    /// text is accepted that does not end the element early.
    pub fn set_inner_content(&mut self, html: &str) -> bool {
        self.replace_content(Extent::Inner, html)
    }

    /// Replaces the current element, tags included. Afterwards the
    /// processor sits right before the replacement, so `next_tag` visits
    /// its first tag.
    pub fn set_outer_content(&mut self, html: &str) -> bool {
        self.replace_content(Extent::Outer, html)
    }

    fn read_content(&mut self, extent: Extent) -> Option<String> {
        let bracket = self.find_closing_tag();
        let content = bracket.and_then(|(opener, closer)| {
            let span = extent.span(opener, closer);
            self.tags
                .slice_between(span.start, span.end)
                .map(str::to_owned)
        });
        if bracket.is_some() {
            self.return_to(&START);
        }
        self.release_scan_marks();
        content
    }

    fn replace_content(&mut self, extent: Extent, html: &str) -> bool {
        if !self.accepts_replacement(extent, html) {
            log::debug!(target: "html_api.tree", "rejected replacement markup");
            return false;
        }
        let Some((opener, closer)) = self.find_closing_tag() else {
            self.release_scan_marks();
            return false;
        };
        let span = extent.span(opener, closer);
        if !self.tags.enqueue_text_replacement(span.start, span.end, html) {
            self.return_to(&START);
            self.release_scan_marks();
            return false;
        }
        if extent == Extent::Outer {
            // The opener is rewritten; keep a point right before the new markup.
            self.tags.set_named_span(START, Span::empty_at(opener.start));
        }
        self.tags.get_updated_html();
        self.return_to(&START);
        self.release_scan_marks();
        true
    }

    fn accepts_replacement(&self, extent: Extent, html: &str) -> bool {
        match self.get_tag() {
            Some(tag) if extent == Extent::Inner && tag_processor::has_text_contents(tag) => {
                // The element's own closer must stay the first one found.
                let mut contents = String::with_capacity(html.len() + tag.len() + 3);
                contents.push_str(html);
                contents.push_str("</");
                contents.push_str(tag);
                contents.push('>');
                tag_processor::find_contents_closer(contents.as_bytes(), tag, 0) == Some(html.len())
            }
            _ => is_balanced(html),
        }
    }

    /// Bookmarks the current opener and scans forward to its closer.
    /// Returns the opener and closer spans; the processor is left on the
    /// closer.
    fn find_closing_tag(&mut self) -> Option<(Span, Span)> {
        if !self.ensure_support() || !self.is_on_opener() {
            return None;
        }
        if self
            .state
            .open_elements
            .current_node()
            .is_some_and(StackEntry::closes_itself)
        {
            return None;
        }
        let opener = self.tags.token_span()?;
        let depth = self.get_current_depth();
        if !self.tags.set_named(START) {
            return None;
        }
        while self.next_tag() {
            if self.tags.is_tag_closer() && self.get_current_depth() < depth {
                let closer = self.tags.token_span()?;
                self.tags.set_named(END);
                return Some((opener, closer));
            }
        }
        // Out of tags: put the processor back on the opener.
        self.return_to(&START);
        None
    }

    fn release_scan_marks(&mut self) {
        self.tags.release_named(&START);
        self.tags.release_named(&END);
    }
}
