//! Byte spans into the processor's buffer.

/// Half-open byte range `start..end` into the current buffer.
///
/// Invariant: both ends sit on UTF-8 char boundaries of the buffer version the
/// span was produced for. Lexical edits re-map spans; a span is never reused
/// across an edit without going through the bookmark store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must be <= end");
        Self { start, end }
    }

    pub fn empty_at(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn len(self) -> usize {
        self.end - self.start
    }
}
