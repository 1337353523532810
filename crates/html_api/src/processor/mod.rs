//! HTML processor: tree-construction bookkeeping on top of [`TagProcessor`].
//!
//! The processor can be driven two ways:
//! - `step` runs the HTML5 tree-construction rules one token at a time,
//!   maintaining the stack of open elements, the list of active formatting
//!   elements and the insertion mode. Constructs whose rules are not
//!   implemented halt the processor with [`ProcessorError::Unsupported`].
//! - `next_tag`, `next_sibling`, `first_child` and the content operations
//!   navigate documents whose tags are explicitly balanced (see
//!   [`HtmlProcessor::ensure_support`]). Depth there is a plain bracket
//!   count: openers push, closers pop, void and self-closed foreign
//!   elements are popped before the next token.
//!
//! Every element opened from a token carries an element mark in the tag
//! processor's bookmark store, keyed by the entry's [`BookmarkId`]. Marks
//! let `seek` rebuild the stack at an earlier position and survive edits
//! made through the content operations.

mod algorithms;
mod content;
mod formatting;
mod in_body;
mod modes;
mod navigate;
mod stack;
mod state;
mod step;
mod support;

#[cfg(test)]
mod tests;

use std::borrow::Cow;

pub use modes::InsertionMode;
pub use stack::{ElementStack, EntryFlags, StackEntry};

use crate::config::ProcessorConfig;
use crate::error::ProcessorError;
use crate::tag_processor::{
    AttributeValue, BookmarkId, ScanStats, Span, TagProcessor, TagQuery, TextMode, TokenKind,
};
use state::{ContextNode, ProcessorState};

/// Whether `step` reads a new token or reprocesses the current one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StepAction {
    #[default]
    Advance,
    Reprocess,
}

/// Which API moved the processor last. Seeks rebuild state the same way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Driver {
    #[default]
    Idle,
    Navigation,
    TreeConstruction,
}

pub struct HtmlProcessor {
    tags: TagProcessor,
    state: ProcessorState,
    /// State right after construction; tree-construction seeks replay from it.
    initial_state: ProcessorState,
    driver: Driver,
    last_error: Option<ProcessorError>,
    /// Cached `ensure_support` result.
    support: Option<bool>,
}

/// Parses a full document. Only UTF-8 input is supported.
pub fn create_document(html: &str, encoding: &str) -> Option<HtmlProcessor> {
    HtmlProcessor::create_document(html, encoding)
}

/// Parses `html` as the children of the `context` start tag, e.g. `"<body>"`.
pub fn create_fragment(html: &str, context: &str, encoding: &str) -> Option<HtmlProcessor> {
    HtmlProcessor::create_fragment(html, context, encoding)
}

fn is_supported_encoding(encoding: &str) -> bool {
    encoding.eq_ignore_ascii_case("utf-8") || encoding.eq_ignore_ascii_case("utf8")
}

/// Tokenizer state for the children of a fragment context element.
fn text_mode_for_context(tag: &str) -> TextMode {
    match tag {
        "title" | "textarea" => TextMode::RcData,
        "style" | "xmp" | "iframe" | "noembed" | "noframes" => TextMode::RawText,
        "script" => TextMode::ScriptData,
        "plaintext" => TextMode::PlainText,
        _ => TextMode::Data,
    }
}

impl HtmlProcessor {
    /// Processor over a whole buffer, for navigation and editing. When
    /// stepped, tokens are processed in the in-body insertion mode.
    pub fn new(html: &str) -> Self {
        Self::with_config(html, ProcessorConfig::default())
    }

    pub fn with_config(html: &str, config: ProcessorConfig) -> Self {
        let state = ProcessorState {
            insertion_mode: InsertionMode::InBody,
            ..ProcessorState::default()
        };
        Self {
            tags: TagProcessor::with_config(html, config),
            initial_state: state.clone(),
            state,
            driver: Driver::Idle,
            last_error: None,
            support: None,
        }
    }

    pub fn create_document(html: &str, encoding: &str) -> Option<Self> {
        Self::create_document_with_config(html, encoding, ProcessorConfig::default())
    }

    pub fn create_document_with_config(
        html: &str,
        encoding: &str,
        config: ProcessorConfig,
    ) -> Option<Self> {
        if !is_supported_encoding(encoding) {
            log::debug!(target: "html_api.tree", "unsupported encoding {encoding:?}");
            return None;
        }
        let mut processor = Self::with_config(html, config);
        processor.state = ProcessorState::default();
        processor.initial_state = processor.state.clone();
        Some(processor)
    }

    pub fn create_document_from_bytes(html: &[u8], encoding: &str) -> Option<Self> {
        let html = std::str::from_utf8(html).ok()?;
        Self::create_document(html, encoding)
    }

    pub fn create_fragment(html: &str, context: &str, encoding: &str) -> Option<Self> {
        Self::create_fragment_with_config(html, context, encoding, ProcessorConfig::default())
    }

    pub fn create_fragment_with_config(
        html: &str,
        context: &str,
        encoding: &str,
        config: ProcessorConfig,
    ) -> Option<Self> {
        if !is_supported_encoding(encoding) {
            log::debug!(target: "html_api.tree", "unsupported encoding {encoding:?}");
            return None;
        }
        let context = parse_context(context)?;
        let mut processor = Self::with_config(html, config);
        processor.state = ProcessorState::default();
        processor
            .tags
            .set_text_mode(text_mode_for_context(&context.tag));
        match &*context.tag {
            "template" => processor
                .state
                .template_insertion_modes
                .push(InsertionMode::InTemplate),
            "form" => {
                let form = processor.tags.bookmarks_mut().allocate_id();
                processor.state.form_element = Some(form);
            }
            _ => {}
        }
        processor.state.context_node = Some(context);
        processor.push_implied("html");
        processor.reset_insertion_mode();
        processor.state.tag_closers.clear();
        processor.initial_state = processor.state.clone();
        Some(processor)
    }

    pub fn create_fragment_from_bytes(html: &[u8], context: &str, encoding: &str) -> Option<Self> {
        let html = std::str::from_utf8(html).ok()?;
        Self::create_fragment(html, context, encoding)
    }

    /// Why the last `step` stopped, when it did not reach the end of input.
    pub fn last_error(&self) -> Option<&ProcessorError> {
        self.last_error.as_ref()
    }

    pub fn insertion_mode(&self) -> InsertionMode {
        self.state.insertion_mode
    }

    /// Stack of open elements, bottom to top.
    pub fn open_elements(&self) -> &ElementStack {
        &self.state.open_elements
    }

    /// Tag names of the open elements, outermost first.
    pub fn get_breadcrumbs(&self) -> Vec<&str> {
        self.state
            .open_elements
            .iter()
            .map(StackEntry::tag)
            .collect()
    }

    pub fn get_current_depth(&self) -> usize {
        self.state.open_elements.count()
    }

    /// Elements closed while processing the most recent token, explicitly
    /// or implicitly, in the order they were popped.
    pub fn closed_by_last_step(&self) -> &[StackEntry] {
        &self.state.tag_closers
    }

    pub fn stats(&self) -> &ScanStats {
        self.tags.stats()
    }

    pub fn token_kind(&self) -> Option<TokenKind> {
        self.tags.token_kind()
    }

    pub fn get_tag(&self) -> Option<&str> {
        self.tags.get_tag()
    }

    pub fn is_tag_closer(&self) -> bool {
        self.tags.is_tag_closer()
    }

    pub fn has_self_closing_flag(&self) -> bool {
        self.tags.has_self_closing_flag()
    }

    pub fn get_attribute(&self, name: &str) -> Option<AttributeValue<'_>> {
        self.tags.get_attribute(name)
    }

    pub fn get_attribute_names_with_prefix(&self, prefix: &str) -> Option<Vec<String>> {
        self.tags.get_attribute_names_with_prefix(prefix)
    }

    pub fn get_modifiable_text(&self) -> Cow<'_, str> {
        self.tags.get_modifiable_text()
    }

    /// Applies pending edits and returns the rewritten buffer.
    pub fn get_updated_html(&mut self) -> &str {
        self.tags.get_updated_html()
    }

    pub fn set_bookmark(&mut self, name: &str) -> bool {
        self.tags.set_bookmark(name)
    }

    pub fn release_bookmark(&mut self, name: &str) -> bool {
        self.tags.release_bookmark(name)
    }

    pub fn has_bookmark(&self, name: &str) -> bool {
        self.tags.has_bookmark(name)
    }

    /// Whether the processor is paused on a start tag.
    fn is_on_opener(&self) -> bool {
        self.tags.token_kind() == Some(TokenKind::Tag) && !self.tags.is_tag_closer()
    }

    /// Pushes an element for the current start tag, under its own name.
    fn insert_current_element(&mut self) -> BookmarkId {
        let tag = self.tags.get_tag().unwrap_or_default().to_owned();
        self.insert_element_as(&tag)
    }

    /// Pushes an element for the current token under `tag`; `<image>` is
    /// inserted as `img`.
    fn insert_element_as(&mut self, tag: &str) -> BookmarkId {
        let opener = self.tags.token_span().unwrap_or_default();
        let has_self_closing_flag = self.tags.has_self_closing_flag();
        let depth = self.state.open_elements.count() + 1;
        let id = self
            .tags
            .bookmarks_mut()
            .open_element(depth, tag, opener, has_self_closing_flag);
        self.state
            .open_elements
            .push(StackEntry::opener(id, tag, has_self_closing_flag));
        id
    }

    /// Pushes an element that has no token of its own.
    fn push_implied(&mut self, tag: &str) -> BookmarkId {
        let id = self.tags.bookmarks_mut().allocate_id();
        self.state
            .open_elements
            .push(StackEntry::opener(id, tag, false));
        id
    }

    /// Pops the current node, closed by the current token when it is the
    /// matching closer and implicitly right before the current token
    /// otherwise.
    fn pop_element(&mut self) -> Option<StackEntry> {
        let entry = self.state.open_elements.current_node()?;
        let closer = match self.tags.token_span() {
            Some(span) if self.tags.is_tag_closer() && self.tags.get_tag() == Some(entry.tag()) => {
                span
            }
            Some(span) => Span::empty_at(span.start),
            None => Span::empty_at(self.tags.position()),
        };
        self.pop_element_closed_at(closer)
    }

    fn pop_element_closed_at(&mut self, closer: Span) -> Option<StackEntry> {
        let entry = self.state.open_elements.pop()?;
        self.record_close(&entry, closer);
        Some(entry)
    }

    fn record_close(&mut self, entry: &StackEntry, closer: Span) {
        self.tags
            .bookmarks_mut()
            .close_element(entry.bookmark, closer);
        let closer_id = self.tags.bookmarks_mut().allocate_id();
        self.state
            .tag_closers
            .push(StackEntry::closer_of(closer_id, entry));
    }

    /// Removes an entry from anywhere in the stack.
    fn remove_element(&mut self, id: BookmarkId) -> bool {
        let Some(entry) = self.state.open_elements.remove(id) else {
            return false;
        };
        let closer = Span::empty_at(
            self.tags
                .token_span()
                .map_or(self.tags.position(), |span| span.start),
        );
        self.record_close(&entry, closer);
        true
    }

    /// Pops a void or self-closed current node left over from the previous
    /// token. Its closer is the zero-width position right after its opener.
    fn pop_self_closed_current(&mut self) {
        let Some(entry) = self.state.open_elements.current_node() else {
            return;
        };
        if !entry.closes_itself() {
            return;
        }
        let id = entry.bookmark;
        let closer_at = match self.tags.bookmarks().element(id) {
            Some(mark) => mark.opener.end,
            None => self.tags.position(),
        };
        self.pop_element_closed_at(Span::empty_at(closer_at));
    }
}

fn parse_context(context: &str) -> Option<ContextNode> {
    let mut scanner = TagProcessor::new(context);
    if !scanner.next_tag(TagQuery::default()) {
        log::debug!(target: "html_api.tree", "fragment context {context:?} is not a start tag");
        return None;
    }
    let tag: Box<str> = scanner.get_tag()?.into();
    Some(ContextNode {
        tag,
        attributes: scanner.attribute_pairs(),
    })
}
