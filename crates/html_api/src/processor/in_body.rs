//! The "in body" insertion mode.

use super::HtmlProcessor;
use super::modes::InsertionMode;
use super::step::{IN_HEAD_START_TAGS, Token, Transition};
use crate::elements;
use crate::error::{StepResult, UnsupportedConstruct};

/// Block-level elements that close an open `p` and nest freely.
const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "center",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "header",
    "hgroup",
    "main",
    "menu",
    "nav",
    "ol",
    "p",
    "search",
    "section",
    "summary",
    "ul",
];

/// End tags closing the matching element once it is in scope.
const SCOPED_END_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "button",
    "center",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "header",
    "hgroup",
    "listing",
    "main",
    "menu",
    "nav",
    "ol",
    "pre",
    "search",
    "section",
    "summary",
    "ul",
];

impl HtmlProcessor {
    pub(super) fn step_in_body(&mut self, token: &Token) -> StepResult<Transition> {
        match token {
            Token::Text { whitespace_only } => {
                self.reconstruct_active_formatting_elements();
                if !whitespace_only {
                    self.state.frameset_ok = false;
                }
                Ok(Transition::Done)
            }
            Token::Comment | Token::Ignored => Ok(Transition::Done),
            Token::Doctype => {
                log::trace!(target: "html_api.tree", "parse error: doctype in body");
                Ok(Transition::Done)
            }
            Token::Start(tag) => self.start_tag_in_body(tag),
            Token::End(tag) => self.end_tag_in_body(tag),
        }
    }

    fn start_tag_in_body(&mut self, tag: &str) -> StepResult<Transition> {
        match tag {
            "html" => {
                if self.state.open_elements.has_element("template") {
                    return Ok(Transition::Done);
                }
                return Err(UnsupportedConstruct::HtmlAttributeMerge);
            }
            name if IN_HEAD_START_TAGS.contains(&name) => {
                return Ok(Transition::ReprocessUsing(InsertionMode::InHead));
            }
            "body" => {
                if !self.body_is_second() {
                    log::trace!(target: "html_api.tree", "parse error: ignored body start tag");
                    return Ok(Transition::Done);
                }
                self.state.frameset_ok = false;
                let has_attributes = self
                    .tags
                    .get_attribute_names_with_prefix("")
                    .is_some_and(|names| !names.is_empty());
                if has_attributes {
                    return Err(UnsupportedConstruct::BodyAttributeMerge);
                }
            }
            "frameset" => {
                if !self.body_is_second() || !self.state.frameset_ok {
                    log::trace!(target: "html_api.tree", "parse error: ignored frameset start tag");
                    return Ok(Transition::Done);
                }
                return Err(UnsupportedConstruct::FramesetReplacement);
            }
            name if BLOCK_ELEMENTS.contains(&name) => {
                self.close_p_in_button_scope();
                self.insert_current_element();
            }
            name if elements::is_heading(name) => {
                self.close_p_in_button_scope();
                if self
                    .current_node_tag()
                    .is_some_and(elements::is_heading)
                {
                    log::trace!(target: "html_api.tree", "parse error: nested heading");
                    self.pop_element();
                }
                self.insert_current_element();
            }
            "pre" | "listing" => {
                // The tag processor drops the newline right after the opener.
                self.close_p_in_button_scope();
                self.insert_current_element();
                self.state.frameset_ok = false;
            }
            "form" => {
                let in_template = self.state.open_elements.has_element("template");
                if self.state.form_element.is_some() && !in_template {
                    log::trace!(target: "html_api.tree", "parse error: nested form");
                    return Ok(Transition::Done);
                }
                self.close_p_in_button_scope();
                let form = self.insert_current_element();
                if !in_template {
                    self.state.form_element = Some(form);
                }
            }
            "li" => {
                self.state.frameset_ok = false;
                self.close_list_item(&["li"]);
                self.close_p_in_button_scope();
                self.insert_current_element();
            }
            "dd" | "dt" => {
                self.state.frameset_ok = false;
                self.close_list_item(&["dd", "dt"]);
                self.close_p_in_button_scope();
                self.insert_current_element();
            }
            "plaintext" => {
                self.close_p_in_button_scope();
                self.insert_current_element();
            }
            "button" => {
                if self.state.open_elements.has_element_in_scope("button") {
                    log::trace!(target: "html_api.tree", "parse error: nested button");
                    self.generate_implied_end_tags(None);
                    self.pop_until("button");
                }
                self.reconstruct_active_formatting_elements();
                self.insert_current_element();
                self.state.frameset_ok = false;
            }
            "a" => {
                if let Some(open_a) = self.state.active_formatting.find_after_last_marker("a") {
                    log::trace!(target: "html_api.tree", "parse error: a inside a");
                    self.close_formatting_element("a")?;
                    self.state.active_formatting.remove(open_a);
                    self.remove_element(open_a);
                }
                self.insert_formatting_element();
            }
            "b" | "big" | "code" | "em" | "font" | "i" | "s" | "small" | "strike" | "strong"
            | "tt" | "u" => {
                self.insert_formatting_element();
            }
            "nobr" => {
                self.reconstruct_active_formatting_elements();
                if self.state.open_elements.has_element_in_scope("nobr") {
                    log::trace!(target: "html_api.tree", "parse error: nobr inside nobr");
                    self.close_formatting_element("nobr")?;
                    self.reconstruct_active_formatting_elements();
                }
                let id = self.insert_current_element();
                self.push_active_formatting_element(id);
            }
            "applet" | "marquee" | "object" => {
                self.reconstruct_active_formatting_elements();
                self.insert_current_element();
                self.state.active_formatting.push_marker();
                self.state.frameset_ok = false;
            }
            "table" | "select" | "svg" | "math" => {
                return Err(UnsupportedConstruct::Subtree(tag.into()));
            }
            "area" | "br" | "embed" | "img" | "keygen" | "wbr" => {
                self.reconstruct_active_formatting_elements();
                self.insert_current_element();
                self.state.frameset_ok = false;
            }
            "input" => {
                self.reconstruct_active_formatting_elements();
                self.insert_current_element();
                let hidden = self
                    .tags
                    .get_attribute("type")
                    .is_some_and(|kind| kind.as_str().eq_ignore_ascii_case("hidden"));
                if !hidden {
                    self.state.frameset_ok = false;
                }
            }
            "param" | "source" | "track" => {
                self.insert_current_element();
            }
            "hr" => {
                self.close_p_in_button_scope();
                self.insert_current_element();
                self.state.frameset_ok = false;
            }
            "image" => {
                log::trace!(target: "html_api.tree", "parse error: image start tag");
                self.reconstruct_active_formatting_elements();
                self.insert_element_as("img");
                self.state.frameset_ok = false;
            }
            "textarea" => {
                self.insert_current_element();
                self.state.frameset_ok = false;
                self.enter_text_mode();
            }
            "xmp" => {
                self.close_p_in_button_scope();
                self.reconstruct_active_formatting_elements();
                self.state.frameset_ok = false;
                self.insert_current_element();
                self.enter_text_mode();
            }
            "iframe" => {
                self.state.frameset_ok = false;
                self.insert_current_element();
                self.enter_text_mode();
            }
            "noembed" => {
                self.insert_current_element();
                self.enter_text_mode();
            }
            "optgroup" | "option" => {
                if self.current_node_tag() == Some("option") {
                    self.pop_element();
                }
                self.reconstruct_active_formatting_elements();
                self.insert_current_element();
            }
            "rb" | "rtc" => {
                if self.state.open_elements.has_element_in_scope("ruby") {
                    self.generate_implied_end_tags(None);
                }
                self.insert_current_element();
            }
            "rp" | "rt" => {
                if self.state.open_elements.has_element_in_scope("ruby") {
                    self.generate_implied_end_tags(Some("rtc"));
                }
                self.insert_current_element();
            }
            "caption" | "col" | "colgroup" | "frame" | "head" | "tbody" | "td" | "tfoot"
            | "th" | "thead" | "tr" => {
                log::trace!(target: "html_api.tree", "parse error: {tag} start tag in body");
            }
            _ => {
                self.reconstruct_active_formatting_elements();
                self.insert_current_element();
            }
        }
        Ok(Transition::Done)
    }

    fn insert_formatting_element(&mut self) {
        self.reconstruct_active_formatting_elements();
        let id = self.insert_current_element();
        self.push_active_formatting_element(id);
    }

    /// Closes an open list item (`li`, or `dd`/`dt`) before a new one opens.
    /// Stops at special elements other than `address`, `div` and `p`.
    fn close_list_item(&mut self, items: &[&str]) {
        let mut found = None;
        for entry in self.state.open_elements.iter().rev() {
            if items.contains(&entry.tag()) {
                found = Some(entry.tag.clone());
                break;
            }
            if entry.category.is_special && !matches!(entry.tag(), "address" | "div" | "p") {
                break;
            }
        }
        let Some(item) = found else {
            return;
        };
        self.generate_implied_end_tags(Some(&*item));
        if self.current_node_tag() != Some(&*item) {
            log::trace!(target: "html_api.tree", "parse error: unclosed elements in {item}");
        }
        self.pop_until(&item);
    }

    fn end_tag_in_body(&mut self, tag: &str) -> StepResult<Transition> {
        match tag {
            "template" => return Ok(Transition::ReprocessUsing(InsertionMode::InHead)),
            "body" | "html" => {
                if !self.state.open_elements.has_element_in_scope("body") {
                    log::trace!(target: "html_api.tree", "parse error: {tag} end tag without body");
                    return Ok(Transition::Done);
                }
                self.switch_to(InsertionMode::AfterBody);
                if tag == "html" {
                    return Ok(Transition::Reprocess);
                }
            }
            name if SCOPED_END_TAGS.contains(&name) => {
                if !self.state.open_elements.has_element_in_scope(name) {
                    log::trace!(target: "html_api.tree", "parse error: stray {name} end tag");
                    return Ok(Transition::Done);
                }
                self.generate_implied_end_tags(None);
                self.pop_until(name);
            }
            "form" => self.close_form(),
            "p" => {
                if !self.state.open_elements.has_element_in_button_scope("p") {
                    log::trace!(target: "html_api.tree", "parse error: p end tag without p");
                    self.push_implied("p");
                }
                self.close_a_p_element();
            }
            "li" => {
                if !self.state.open_elements.has_element_in_list_item_scope("li") {
                    return Ok(Transition::Done);
                }
                self.generate_implied_end_tags(Some("li"));
                self.pop_until("li");
            }
            "dd" | "dt" => {
                if !self.state.open_elements.has_element_in_scope(tag) {
                    return Ok(Transition::Done);
                }
                self.generate_implied_end_tags(Some(tag));
                self.pop_until(tag);
            }
            name if elements::is_heading(name) => {
                if !self.state.open_elements.has_heading_in_scope() {
                    return Ok(Transition::Done);
                }
                self.generate_implied_end_tags(None);
                self.pop_until_any_heading();
            }
            name if elements::is_formatting_element(name) => self.close_formatting_element(name)?,
            "applet" | "marquee" | "object" => {
                if !self.state.open_elements.has_element_in_scope(tag) {
                    return Ok(Transition::Done);
                }
                self.generate_implied_end_tags(None);
                self.pop_until(tag);
                self.state.active_formatting.clear_to_last_marker();
            }
            "br" => {
                log::trace!(target: "html_api.tree", "parse error: br end tag");
                self.reconstruct_active_formatting_elements();
                // Acts as `<br>`: popped before the next token.
                self.push_implied("br");
                self.state.frameset_ok = false;
            }
            _ => self.close_any_other_element(tag),
        }
        Ok(Transition::Done)
    }

    fn close_form(&mut self) {
        if self.state.open_elements.has_element("template") {
            if !self.state.open_elements.has_element_in_scope("form") {
                return;
            }
            self.generate_implied_end_tags(None);
            self.pop_until("form");
            return;
        }
        let Some(form) = self.state.form_element.take() else {
            log::trace!(target: "html_api.tree", "parse error: form end tag without form");
            return;
        };
        if !self.state.open_elements.has_entry_in_scope(form) {
            return;
        }
        self.generate_implied_end_tags(None);
        // The form may be closed out of order; the elements above it stay.
        self.remove_element(form);
    }

    /// Adoption agency algorithm, for the cases that close elements
    /// without reparenting anything.
    fn close_formatting_element(&mut self, tag: &str) -> StepResult<()> {
        if let Some(current) = self.state.open_elements.current_node() {
            if current.tag() == tag && !self.state.active_formatting.contains(current.bookmark) {
                self.pop_element();
                return Ok(());
            }
        }

        let Some(formatting) = self.state.active_formatting.find_after_last_marker(tag) else {
            self.close_any_other_element(tag);
            return Ok(());
        };
        let Some(position) = self.state.open_elements.position(formatting) else {
            log::trace!(target: "html_api.tree", "parse error: {tag} is no longer open");
            self.state.active_formatting.remove(formatting);
            return Ok(());
        };
        if !self.state.open_elements.has_entry_in_scope(formatting) {
            log::trace!(target: "html_api.tree", "parse error: {tag} is out of scope");
            return Ok(());
        }

        let has_furthest_block = self
            .state
            .open_elements
            .iter()
            .skip(position + 1)
            .any(|entry| entry.category.is_special);
        if has_furthest_block {
            return Err(UnsupportedConstruct::AdoptionAgency(tag.into()));
        }
        if self.state.open_elements.current_node().map(|entry| entry.bookmark) != Some(formatting)
        {
            log::trace!(target: "html_api.tree", "parse error: misnested {tag}");
        }
        self.pop_until_entry(formatting);
        self.state.active_formatting.remove(formatting);
        Ok(())
    }

    /// "Any other end tag": closes the nearest matching element unless a
    /// special element sits in between.
    fn close_any_other_element(&mut self, tag: &str) {
        let mut target = None;
        for entry in self.state.open_elements.iter().rev() {
            if entry.tag() == tag {
                target = Some(entry.bookmark);
                break;
            }
            if entry.category.is_special {
                log::trace!(target: "html_api.tree", "parse error: stray {tag} end tag");
                return;
            }
        }
        let Some(target) = target else {
            return;
        };
        self.generate_implied_end_tags(Some(tag));
        if self.state.open_elements.current_node().map(|entry| entry.bookmark) != Some(target) {
            log::trace!(target: "html_api.tree", "parse error: unclosed elements in {tag}");
        }
        self.pop_until_entry(target);
    }
}
