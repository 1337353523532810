use super::formatting::{ActiveFormattingList, AttributeSet};
use super::modes::InsertionMode;
use super::stack::{ElementStack, StackEntry};
use crate::tag_processor::BookmarkId;

/// Element a fragment is parsed inside of. It never appears on the stack of
/// open elements but takes part in resetting the insertion mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ContextNode {
    pub(crate) tag: Box<str>,
    pub(crate) attributes: AttributeSet,
}

/// Tree-construction state. Cloned to restart parsing from the top.
#[derive(Clone, Debug)]
pub(crate) struct ProcessorState {
    pub(crate) open_elements: ElementStack,
    pub(crate) active_formatting: ActiveFormattingList,
    pub(crate) insertion_mode: InsertionMode,
    /// Mode to return to when a `Text` mode element closes.
    pub(crate) original_insertion_mode: Option<InsertionMode>,
    pub(crate) template_insertion_modes: Vec<InsertionMode>,
    pub(crate) head_element: Option<BookmarkId>,
    pub(crate) form_element: Option<BookmarkId>,
    pub(crate) frameset_ok: bool,
    pub(crate) context_node: Option<ContextNode>,
    /// Closers recorded by the most recent step, in pop order.
    pub(crate) tag_closers: Vec<StackEntry>,
}

impl Default for ProcessorState {
    fn default() -> Self {
        Self {
            open_elements: ElementStack::default(),
            active_formatting: ActiveFormattingList::default(),
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: None,
            template_insertion_modes: Vec::new(),
            head_element: None,
            form_element: None,
            frameset_ok: true,
            context_node: None,
            tag_closers: Vec::new(),
        }
    }
}
