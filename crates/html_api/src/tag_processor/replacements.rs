//! Queue of pending text replacements.
//!
//! Replacements are recorded against the current buffer and applied together.
//! Applying them yields the list of edits, which the bookmark store and the
//! scanner cursor use to re-map their offsets.

use super::span::Span;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TextReplacement {
    pub(crate) span: Span,
    pub(crate) text: String,
}

/// One applied replacement, described in old-buffer offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AppliedEdit {
    pub(crate) old: Span,
    pub(crate) new_len: usize,
}

impl AppliedEdit {
    pub(crate) fn delta(self) -> isize {
        self.new_len as isize - self.old.len() as isize
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct ReplacementQueue {
    pending: Vec<TextReplacement>,
}

impl ReplacementQueue {
    pub(crate) fn push(&mut self, span: Span, text: &str) {
        self.pending.push(TextReplacement {
            span,
            text: text.to_owned(),
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether a pending replacement touches bytes at or after `offset`.
    pub(crate) fn reaches(&self, offset: usize) -> bool {
        self.pending.iter().any(|r| r.span.end >= offset)
    }

    /// Rewrites `html` and returns the edits in ascending offset order.
    ///
    /// Replacements are ordered by start offset, earliest enqueued first on
    /// ties. A replacement overlapping an earlier one is dropped.
    pub(crate) fn apply(&mut self, html: &mut String) -> Vec<AppliedEdit> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        let mut pending = std::mem::take(&mut self.pending);
        pending.sort_by_key(|r| r.span.start);

        let mut out = String::with_capacity(html.len());
        let mut edits = Vec::with_capacity(pending.len());
        let mut copied_to = 0;
        for replacement in pending {
            let span = replacement.span;
            if span.start < copied_to || span.end > html.len() {
                log::trace!(
                    target: "html_api.bookmarks",
                    "dropping replacement {}..{}: overlaps or out of range",
                    span.start,
                    span.end
                );
                continue;
            }
            out.push_str(&html[copied_to..span.start]);
            out.push_str(&replacement.text);
            copied_to = span.end;
            edits.push(AppliedEdit {
                old: span,
                new_len: replacement.text.len(),
            });
        }
        out.push_str(&html[copied_to..]);
        *html = out;
        edits
    }
}

#[cfg(test)]
mod tests {
    use super::{AppliedEdit, ReplacementQueue};
    use crate::tag_processor::span::Span;

    #[test]
    fn applies_in_offset_order() {
        let mut html = String::from("<div>old</div><p>x</p>");
        let mut queue = ReplacementQueue::default();
        queue.push(Span::new(17, 18), "yz");
        queue.push(Span::new(5, 8), "new text");
        let edits = queue.apply(&mut html);
        assert_eq!(html, "<div>new text</div><p>yz</p>");
        assert_eq!(
            edits,
            vec![
                AppliedEdit {
                    old: Span::new(5, 8),
                    new_len: 8
                },
                AppliedEdit {
                    old: Span::new(17, 18),
                    new_len: 2
                },
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn overlapping_replacement_is_dropped() {
        let mut html = String::from("abcdef");
        let mut queue = ReplacementQueue::default();
        queue.push(Span::new(1, 4), "X");
        queue.push(Span::new(2, 5), "Y");
        let edits = queue.apply(&mut html);
        assert_eq!(html, "aXef");
        assert_eq!(edits.len(), 1);
    }
}
