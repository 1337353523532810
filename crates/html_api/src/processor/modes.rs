//! HTML5 insertion modes driving the tree-construction state machine.
//!
//! The enum is complete so reset and transitions can name every mode. Modes
//! outside the supported subset report an unsupported construct as soon as a
//! token is dispatched to them.

/// HTML5 tree-construction insertion mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InsertionMode {
    #[default]
    Initial,
    BeforeHtml,
    BeforeHead,
    InHead,
    InHeadNoscript,
    AfterHead,
    InBody,
    Text,
    InTable,
    InTableText,
    InCaption,
    InColumnGroup,
    InTableBody,
    InRow,
    InCell,
    InSelect,
    InSelectInTable,
    InTemplate,
    AfterBody,
    InFrameset,
    AfterFrameset,
    AfterAfterBody,
    AfterAfterFrameset,
}

impl InsertionMode {
    pub fn name(self) -> &'static str {
        match self {
            InsertionMode::Initial => "initial",
            InsertionMode::BeforeHtml => "before html",
            InsertionMode::BeforeHead => "before head",
            InsertionMode::InHead => "in head",
            InsertionMode::InHeadNoscript => "in head noscript",
            InsertionMode::AfterHead => "after head",
            InsertionMode::InBody => "in body",
            InsertionMode::Text => "text",
            InsertionMode::InTable => "in table",
            InsertionMode::InTableText => "in table text",
            InsertionMode::InCaption => "in caption",
            InsertionMode::InColumnGroup => "in column group",
            InsertionMode::InTableBody => "in table body",
            InsertionMode::InRow => "in row",
            InsertionMode::InCell => "in cell",
            InsertionMode::InSelect => "in select",
            InsertionMode::InSelectInTable => "in select in table",
            InsertionMode::InTemplate => "in template",
            InsertionMode::AfterBody => "after body",
            InsertionMode::InFrameset => "in frameset",
            InsertionMode::AfterFrameset => "after frameset",
            InsertionMode::AfterAfterBody => "after after body",
            InsertionMode::AfterAfterFrameset => "after after frameset",
        }
    }
}
