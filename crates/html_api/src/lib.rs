//! Streaming HTML processor with in-place editing.
//!
//! [`TagProcessor`] scans a buffer token by token and rewrites byte ranges
//! of it while keeping bookmarks valid. [`HtmlProcessor`] adds the HTML5
//! tree-construction bookkeeping on top: the stack of open elements, the
//! list of active formatting elements and the insertion mode, plus
//! depth-aware navigation and inner/outer content editing.

pub mod config;
pub mod elements;
pub mod error;
pub mod processor;
pub mod tag_processor;

pub use config::ProcessorConfig;
pub use elements::{ElementCategory, classify};
pub use error::{ProcessorError, UnsupportedConstruct};
pub use processor::{
    ElementStack, EntryFlags, HtmlProcessor, InsertionMode, StackEntry, StepAction,
    create_document, create_fragment,
};
pub use tag_processor::{
    AttributeValue, BookmarkId, ParserState, ScanStats, Span, TagProcessor, TagQuery, TokenKind,
};
