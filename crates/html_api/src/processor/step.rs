//! Token dispatch and the insertion modes outside of "in body".
//!
//! Each mode function consumes the current token and returns a
//! [`Transition`]. Delegation to another mode's rules is a transition too,
//! so the dispatcher loop handles it without recursing and without changing
//! the current insertion mode.

use super::modes::InsertionMode;
use super::stack::StackEntry;
use super::{Driver, HtmlProcessor, StepAction};
use crate::error::{ProcessorError, StepResult, UnsupportedConstruct};
use crate::tag_processor::{ParserState, TokenKind};

/// Outcome of processing the current token in one insertion mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Transition {
    /// The token was consumed.
    Done,
    /// The insertion mode changed; process the same token in the new mode.
    Reprocess,
    /// Process the same token using another mode's rules, keeping the
    /// current insertion mode.
    ReprocessUsing(InsertionMode),
}

/// Current token as seen by the insertion modes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum Token {
    Start(Box<str>),
    End(Box<str>),
    Text { whitespace_only: bool },
    Comment,
    Doctype,
    /// `</>`, which produces nothing.
    Ignored,
}

impl Token {
    pub(super) fn is_whitespace(&self) -> bool {
        matches!(self, Token::Text { whitespace_only: true })
    }

    fn is_start(&self, names: &[&str]) -> bool {
        matches!(self, Token::Start(tag) if names.contains(&&**tag))
    }

    fn is_end(&self, names: &[&str]) -> bool {
        matches!(self, Token::End(tag) if names.contains(&&**tag))
    }
}

/// Start tags the in-head rules insert as elements.
pub(super) const IN_HEAD_START_TAGS: &[&str] = &[
    "base", "basefont", "bgsound", "link", "meta", "noframes", "script", "style", "template",
    "title",
];

fn is_html_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0c' | '\r')
}

impl HtmlProcessor {
    /// Processes one token with the tree-construction rules.
    ///
    /// Returns false at the end of input and when the token needs an
    /// unsupported construct; [`HtmlProcessor::last_error`] tells the two
    /// apart. After an unsupported construct every further step returns
    /// false.
    pub fn step(&mut self, action: StepAction) -> bool {
        if self.last_error.is_some() {
            return false;
        }
        self.driver = Driver::TreeConstruction;
        self.state.tag_closers.clear();
        match self.try_step(action) {
            Ok(processed) => processed,
            Err(err) => {
                log::debug!(target: "html_api.tree", "step halted: {err}");
                self.last_error = Some(err);
                false
            }
        }
    }

    fn try_step(&mut self, action: StepAction) -> Result<bool, ProcessorError> {
        match action {
            StepAction::Advance => {
                self.pop_self_closed_current();
                if !self.tags.next_token() {
                    if self.tags.parser_state() == ParserState::IncompleteInput {
                        return Err(ProcessorError::IncompleteInput);
                    }
                    self.stop_parsing();
                    return Ok(false);
                }
            }
            StepAction::Reprocess => {
                if self.tags.token_kind().is_none() {
                    return Ok(false);
                }
            }
        }

        let token = self.current_token();
        let mut mode = self.state.insertion_mode;
        // Every reprocess moves forward through the document-level modes
        // or into "in body", so the loop ends after a few rounds.
        loop {
            let transition = self.step_in_mode(mode, &token)?;
            match transition {
                Transition::Done => return Ok(true),
                Transition::Reprocess => {
                    log::trace!(
                        target: "html_api.tree",
                        "reprocess in {}",
                        self.state.insertion_mode.name()
                    );
                    mode = self.state.insertion_mode;
                }
                Transition::ReprocessUsing(using) => mode = using,
            }
        }
    }

    pub(super) fn current_token(&self) -> Token {
        match self.tags.token_kind() {
            Some(TokenKind::Tag) => {
                let tag: Box<str> = self.tags.get_tag().unwrap_or_default().into();
                if self.tags.is_tag_closer() {
                    Token::End(tag)
                } else {
                    Token::Start(tag)
                }
            }
            Some(TokenKind::Text) => Token::Text {
                whitespace_only: self.tags.get_modifiable_text().chars().all(is_html_whitespace),
            },
            Some(TokenKind::Doctype) => Token::Doctype,
            Some(
                TokenKind::Comment
                | TokenKind::CData
                | TokenKind::ProcessingInstruction
                | TokenKind::FunkyComment,
            ) => Token::Comment,
            Some(TokenKind::PresumptuousTag) | None => Token::Ignored,
        }
    }

    fn step_in_mode(&mut self, mode: InsertionMode, token: &Token) -> StepResult<Transition> {
        match mode {
            InsertionMode::Initial => Ok(self.step_initial(token)),
            InsertionMode::BeforeHtml => Ok(self.step_before_html(token)),
            InsertionMode::BeforeHead => Ok(self.step_before_head(token)),
            InsertionMode::InHead => self.step_in_head(token),
            InsertionMode::AfterHead => self.step_after_head(token),
            InsertionMode::InBody => self.step_in_body(token),
            InsertionMode::Text => Ok(self.step_text(token)),
            InsertionMode::AfterBody => Ok(self.step_after_body(token)),
            InsertionMode::AfterAfterBody => Ok(self.step_after_after_body(token)),
            other => Err(UnsupportedConstruct::InsertionMode(other.name())),
        }
    }

    pub(super) fn switch_to(&mut self, mode: InsertionMode) {
        log::trace!(
            target: "html_api.tree",
            "insertion mode {} -> {}",
            self.state.insertion_mode.name(),
            mode.name()
        );
        self.state.insertion_mode = mode;
    }

    /// Enters the text insertion mode for a raw text or RCDATA element.
    pub(super) fn enter_text_mode(&mut self) {
        self.state.original_insertion_mode = Some(self.state.insertion_mode);
        self.switch_to(InsertionMode::Text);
    }

    fn step_initial(&mut self, token: &Token) -> Transition {
        match token {
            Token::Comment | Token::Ignored => Transition::Done,
            _ if token.is_whitespace() => Transition::Done,
            Token::Doctype => {
                self.switch_to(InsertionMode::BeforeHtml);
                Transition::Done
            }
            _ => {
                log::trace!(target: "html_api.tree", "parse error: missing doctype");
                self.switch_to(InsertionMode::BeforeHtml);
                Transition::Reprocess
            }
        }
    }

    fn step_before_html(&mut self, token: &Token) -> Transition {
        match token {
            Token::Doctype | Token::Comment | Token::Ignored => Transition::Done,
            _ if token.is_whitespace() => Transition::Done,
            Token::Start(tag) if &**tag == "html" => {
                self.insert_current_element();
                self.switch_to(InsertionMode::BeforeHead);
                Transition::Done
            }
            Token::End(tag) if !matches!(&**tag, "head" | "body" | "html" | "br") => {
                Transition::Done
            }
            _ => {
                self.push_implied("html");
                self.switch_to(InsertionMode::BeforeHead);
                Transition::Reprocess
            }
        }
    }

    fn step_before_head(&mut self, token: &Token) -> Transition {
        match token {
            Token::Doctype | Token::Comment | Token::Ignored => Transition::Done,
            _ if token.is_whitespace() => Transition::Done,
            Token::Start(tag) if &**tag == "html" => {
                Transition::ReprocessUsing(InsertionMode::InBody)
            }
            Token::Start(tag) if &**tag == "head" => {
                let head = self.insert_current_element();
                self.state.head_element = Some(head);
                self.switch_to(InsertionMode::InHead);
                Transition::Done
            }
            Token::End(tag) if !matches!(&**tag, "head" | "body" | "html" | "br") => {
                Transition::Done
            }
            _ => {
                let head = self.push_implied("head");
                self.state.head_element = Some(head);
                self.switch_to(InsertionMode::InHead);
                Transition::Reprocess
            }
        }
    }

    pub(super) fn step_in_head(&mut self, token: &Token) -> StepResult<Transition> {
        let transition = match token {
            Token::Text { .. } if token.is_whitespace() => Transition::Done,
            Token::Comment | Token::Doctype | Token::Ignored => Transition::Done,
            Token::Start(tag) => match &**tag {
                "html" => Transition::ReprocessUsing(InsertionMode::InBody),
                "base" | "basefont" | "bgsound" | "link" | "meta" => {
                    // Void; popped before the next token.
                    self.insert_current_element();
                    Transition::Done
                }
                "title" | "noframes" | "style" | "script" => {
                    self.insert_current_element();
                    self.enter_text_mode();
                    Transition::Done
                }
                "noscript" => {
                    self.insert_current_element();
                    self.switch_to(InsertionMode::InHeadNoscript);
                    Transition::Done
                }
                "template" => return Err(UnsupportedConstruct::Template),
                "head" => {
                    log::trace!(target: "html_api.tree", "parse error: nested head");
                    Transition::Done
                }
                _ => self.leave_head(),
            },
            Token::End(tag) => match &**tag {
                "head" => {
                    self.pop_element();
                    self.switch_to(InsertionMode::AfterHead);
                    Transition::Done
                }
                "body" | "html" | "br" => self.leave_head(),
                "template" => {
                    if self.state.open_elements.has_element("template") {
                        return Err(UnsupportedConstruct::Template);
                    }
                    log::trace!(target: "html_api.tree", "parse error: stray template end tag");
                    Transition::Done
                }
                _ => Transition::Done,
            },
            Token::Text { .. } => self.leave_head(),
        };
        Ok(transition)
    }

    /// "Anything else" in head: close the head and reprocess after it.
    fn leave_head(&mut self) -> Transition {
        self.pop_element();
        self.switch_to(InsertionMode::AfterHead);
        Transition::Reprocess
    }

    fn step_after_head(&mut self, token: &Token) -> StepResult<Transition> {
        let transition = match token {
            Token::Text { .. } if token.is_whitespace() => Transition::Done,
            Token::Comment | Token::Doctype | Token::Ignored => Transition::Done,
            Token::Start(tag) => match &**tag {
                "html" => Transition::ReprocessUsing(InsertionMode::InBody),
                "body" => {
                    self.insert_current_element();
                    self.state.frameset_ok = false;
                    self.switch_to(InsertionMode::InBody);
                    Transition::Done
                }
                "frameset" => return Err(UnsupportedConstruct::Subtree("frameset".into())),
                "template" => return Err(UnsupportedConstruct::Template),
                name if IN_HEAD_START_TAGS.contains(&name) => {
                    log::trace!(target: "html_api.tree", "parse error: {name} after head");
                    self.process_in_reopened_head(token)?
                }
                "head" => Transition::Done,
                _ => self.open_implied_body(),
            },
            Token::End(tag) => match &**tag {
                "body" | "html" | "br" => self.open_implied_body(),
                "template" => return Err(UnsupportedConstruct::Template),
                _ => Transition::Done,
            },
            Token::Text { .. } => self.open_implied_body(),
        };
        Ok(transition)
    }

    /// Processes a head-only element that showed up after the head closed:
    /// the head is pushed back for the duration of the token.
    fn process_in_reopened_head(&mut self, token: &Token) -> StepResult<Transition> {
        let Some(head) = self.state.head_element else {
            return self.step_in_head(token);
        };
        self.state
            .open_elements
            .push(StackEntry::opener(head, "head", false));
        let transition = self.step_in_head(token);
        self.state.open_elements.remove(head);
        transition
    }

    fn open_implied_body(&mut self) -> Transition {
        self.push_implied("body");
        self.switch_to(InsertionMode::InBody);
        Transition::Reprocess
    }

    fn step_text(&mut self, token: &Token) -> Transition {
        if let Token::End(_) = token {
            self.pop_element();
            let mode = self
                .state
                .original_insertion_mode
                .take()
                .unwrap_or(InsertionMode::InBody);
            self.switch_to(mode);
        }
        Transition::Done
    }

    fn step_after_body(&mut self, token: &Token) -> Transition {
        match token {
            Token::Text { .. } if token.is_whitespace() => {
                Transition::ReprocessUsing(InsertionMode::InBody)
            }
            Token::Comment | Token::Doctype | Token::Ignored => Transition::Done,
            _ if token.is_start(&["html"]) => Transition::ReprocessUsing(InsertionMode::InBody),
            _ if token.is_end(&["html"]) => {
                if self.state.context_node.is_none() {
                    self.switch_to(InsertionMode::AfterAfterBody);
                } else {
                    log::trace!(target: "html_api.tree", "parse error: html end tag in fragment");
                }
                Transition::Done
            }
            _ => {
                log::trace!(target: "html_api.tree", "parse error: content after body");
                self.switch_to(InsertionMode::InBody);
                Transition::Reprocess
            }
        }
    }

    fn step_after_after_body(&mut self, token: &Token) -> Transition {
        match token {
            Token::Comment | Token::Ignored => Transition::Done,
            Token::Doctype => Transition::ReprocessUsing(InsertionMode::InBody),
            _ if token.is_whitespace() || token.is_start(&["html"]) => {
                Transition::ReprocessUsing(InsertionMode::InBody)
            }
            _ => {
                log::trace!(target: "html_api.tree", "parse error: content after html");
                self.switch_to(InsertionMode::InBody);
                Transition::Reprocess
            }
        }
    }

    /// Whether the second open element is a `body` outside any template,
    /// the only case where `+body` and `+frameset` touch the open body.
    pub(super) fn body_is_second(&self) -> bool {
        self.state.open_elements.count() > 1
            && self
                .state
                .open_elements
                .get(1)
                .is_some_and(|entry| entry.tag() == "body")
            && !self.state.open_elements.has_element("template")
    }
}
