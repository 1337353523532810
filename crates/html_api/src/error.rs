//! Error values surfaced by the processor.
//!
//! HTML parse errors are not represented here: the tree-construction rules
//! define a recovery for each of them and processing continues. What remains
//! are the conditions under which the processor has to stop.

use std::fmt;

/// Legal HTML whose tree-construction algorithm is not implemented.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnsupportedConstruct {
    /// A token arrived in an insertion mode that has no step function.
    InsertionMode(&'static str),
    /// `<html>` start tag outside a template; it would alter the root element.
    HtmlAttributeMerge,
    /// `<body>` start tag whose attributes would merge onto an open body.
    BodyAttributeMerge,
    /// `<frameset>` replacing an open body.
    FramesetReplacement,
    /// Template contents and the template insertion-mode stack.
    Template,
    /// Adoption agency cases that reparent nodes.
    AdoptionAgency(Box<str>),
    /// Table, select, and foreign content (SVG / MathML) subtrees.
    Subtree(Box<str>),
}

impl fmt::Display for UnsupportedConstruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedConstruct::InsertionMode(mode) => {
                write!(f, "insertion mode {mode} is not implemented")
            }
            UnsupportedConstruct::HtmlAttributeMerge => {
                write!(f, "cannot merge attributes onto the html element")
            }
            UnsupportedConstruct::BodyAttributeMerge => {
                write!(f, "cannot merge attributes onto the body element")
            }
            UnsupportedConstruct::FramesetReplacement => {
                write!(f, "cannot replace the body with a frameset")
            }
            UnsupportedConstruct::Template => write!(f, "template contents are not supported"),
            UnsupportedConstruct::AdoptionAgency(tag) => {
                write!(f, "adoption agency algorithm required to close '{tag}'")
            }
            UnsupportedConstruct::Subtree(tag) => {
                write!(f, "content inside '{tag}' is not supported")
            }
        }
    }
}

/// Reason a `step` stopped without processing a token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessorError {
    Unsupported(UnsupportedConstruct),
    /// The buffer ends inside a tag, comment, or raw text element.
    IncompleteInput,
    /// Seek budget from `ProcessorConfig::max_seek_ops` exhausted.
    ExceededMaxSeeks,
}

impl fmt::Display for ProcessorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessorError::Unsupported(construct) => write!(f, "unsupported: {construct}"),
            ProcessorError::IncompleteInput => write!(f, "input ends inside a token"),
            ProcessorError::ExceededMaxSeeks => write!(f, "too many seek operations"),
        }
    }
}

impl std::error::Error for ProcessorError {}

impl From<UnsupportedConstruct> for ProcessorError {
    fn from(construct: UnsupportedConstruct) -> Self {
        ProcessorError::Unsupported(construct)
    }
}

/// Internal result for tree-construction helpers; `?` unwinds to `step`.
pub(crate) type StepResult<T> = Result<T, UnsupportedConstruct>;
