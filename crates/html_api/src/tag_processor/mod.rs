//! Linear tag scanner with bookmarks and in-place text replacement.
//!
//! `TagProcessor` walks an HTML buffer one token at a time without building a
//! tree. It recognizes tags (with attributes and the self-closing flag), text,
//! comments and their lookalikes, and doctypes. Elements whose contents are
//! not markup (`script`, `style`, `title`, `textarea`, ...) are skipped in one
//! step: the scanner reports the opener, exposes the skipped range as its
//! modifiable text, and continues with the matching closer.
//!
//! Invariants:
//! - The cursor only moves forward, except through `seek`.
//! - All spans (tokens, bookmarks, element marks) refer to the current
//!   buffer. Applying replacements re-maps every one of them.
//! - Incomplete input (a token cut off by the end of the buffer) stops the
//!   scanner; nothing after it is reported.

mod attributes;
mod bookmarks;
mod entities;
mod replacements;
mod scan;
mod span;


use std::borrow::Cow;

pub use attributes::AttributeValue;
pub use bookmarks::BookmarkId;
pub use span::Span;

pub(crate) use bookmarks::{BookmarkName, BookmarkStore, ScanMark, SeekPoint};

use crate::config::ProcessorConfig;
use attributes::{AttributeToken, parse_tag_tail};
use bookmarks::shift_offset;
use replacements::ReplacementQueue;
use scan::{
    ends_name, find_byte, find_bytes, find_raw_text_closer, find_script_closer,
    is_html_whitespace, run_len, starts_with_ignore_case,
};

/// Whether `tag`'s contents are raw text or RCDATA, ending only at a
/// matching closer.
pub(crate) fn has_text_contents(tag: &str) -> bool {
    matches!(
        tag,
        "script" | "style" | "xmp" | "iframe" | "noembed" | "noframes" | "title" | "textarea"
    )
}

/// Offset of the closer that ends the text contents of `tag` starting at
/// `from`.
pub(crate) fn find_contents_closer(html: &[u8], tag: &str, from: usize) -> Option<usize> {
    if tag == "script" {
        find_script_closer(html, from)
    } else {
        find_raw_text_closer(html, tag, from)
    }
}

/// Kind of the token the processor is paused on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Tag,
    Text,
    /// `<!-- ... -->`, including abruptly closed and bogus `<!...>` comments.
    Comment,
    Doctype,
    /// `<![CDATA[ ... ]]>`, which HTML parses as a bogus comment.
    CData,
    /// `<?target ... ?>`, which HTML parses as a bogus comment.
    ProcessingInstruction,
    /// `</` followed by a non-letter, e.g. `</%name>`.
    FunkyComment,
    /// `</>`, which HTML ignores entirely.
    PresumptuousTag,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParserState {
    #[default]
    Ready,
    /// Paused on a token.
    Matched,
    /// The whole buffer was consumed.
    Complete,
    /// The buffer ends inside a token.
    IncompleteInput,
}

/// Tokenizer state the buffer starts in.
///
/// Fragments parsed in the context of a raw text element start in a non-data
/// state; no markup is recognized in them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextMode {
    #[default]
    Data,
    RcData,
    RawText,
    ScriptData,
    PlainText,
}

/// Filter for [`TagProcessor::next_tag`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TagQuery<'a> {
    /// Only stop on tags with this name (ASCII case-insensitive).
    pub tag_name: Option<&'a str>,
    /// Also stop on closing tags.
    pub visit_closers: bool,
}

impl<'a> TagQuery<'a> {
    pub const VISIT_CLOSERS: Self = Self {
        tag_name: None,
        visit_closers: true,
    };
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub tokens: u64,
    pub tags: u64,
    pub replacements_applied: u64,
    pub seeks: u64,
}

#[derive(Clone, Debug)]
struct Token {
    kind: TokenKind,
    span: Span,
    /// Lowercased tag name, for tags only.
    tag: Option<Box<str>>,
    /// Text content: text nodes, comment bodies, raw text element contents.
    text: Option<Span>,
    is_closer: bool,
    has_self_closing_flag: bool,
    attributes: Vec<AttributeToken>,
}

impl Token {
    fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            tag: None,
            text: None,
            is_closer: false,
            has_self_closing_flag: false,
            attributes: Vec::new(),
        }
    }

    fn with_text(mut self, text: Span) -> Self {
        self.text = Some(text);
        self
    }
}

enum Scanned {
    Token(Token),
    End,
    Incomplete,
}

pub struct TagProcessor {
    html: String,
    cursor: usize,
    state: ParserState,
    token: Option<Token>,
    /// Everything from this offset on is a single text token.
    plaintext_from: Option<usize>,
    /// One leading newline of a text token starting here is dropped.
    skip_newline_at: Option<usize>,
    bookmarks: BookmarkStore,
    replacements: ReplacementQueue,
    config: ProcessorConfig,
    seek_count: usize,
    stats: ScanStats,
}

impl TagProcessor {
    pub fn new(html: &str) -> Self {
        Self::with_config(html, ProcessorConfig::default())
    }

    pub fn with_config(html: &str, config: ProcessorConfig) -> Self {
        Self {
            html: html.to_owned(),
            cursor: 0,
            state: ParserState::Ready,
            token: None,
            plaintext_from: None,
            skip_newline_at: None,
            bookmarks: BookmarkStore::default(),
            replacements: ReplacementQueue::default(),
            config,
            seek_count: 0,
            stats: ScanStats::default(),
        }
    }

    /// Starts the buffer in a non-data tokenizer state.
    pub(crate) fn set_text_mode(&mut self, mode: TextMode) {
        self.plaintext_from = match mode {
            TextMode::Data => None,
            _ => Some(self.cursor),
        };
    }

    pub fn parser_state(&self) -> ParserState {
        self.state
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// Current buffer, without pending replacements.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Advances to the next token of any kind.
    pub fn next_token(&mut self) -> bool {
        if matches!(
            self.state,
            ParserState::Complete | ParserState::IncompleteInput
        ) {
            return false;
        }
        if !self.replacements.is_empty()
            && (self.replacements.len() > self.config.max_pending_replacements
                || self.replacements.reaches(self.cursor))
        {
            self.apply_replacements();
        }
        self.advance()
    }

    /// Advances to the next tag matching `query`.
    pub fn next_tag(&mut self, query: TagQuery<'_>) -> bool {
        while self.next_token() {
            let Some(token) = &self.token else {
                continue;
            };
            if token.kind != TokenKind::Tag || (token.is_closer && !query.visit_closers) {
                continue;
            }
            if let (Some(wanted), Some(tag)) = (query.tag_name, token.tag.as_deref()) {
                if !wanted.eq_ignore_ascii_case(tag) {
                    continue;
                }
            }
            return true;
        }
        false
    }

    fn advance(&mut self) -> bool {
        self.token = None;
        loop {
            let was_at = self.cursor;
            match scan_token(self.html.as_bytes(), was_at, self.plaintext_from) {
                Scanned::End => {
                    self.state = ParserState::Complete;
                    self.skip_newline_at = None;
                    return false;
                }
                Scanned::Incomplete => {
                    self.state = ParserState::IncompleteInput;
                    self.skip_newline_at = None;
                    return false;
                }
                Scanned::Token(mut token) => {
                    self.cursor = token.span.end;
                    let skip_newline_at = self.skip_newline_at.take();
                    if token.kind == TokenKind::Text && skip_newline_at == Some(token.span.start) {
                        if let Some(text) = token.text.as_mut() {
                            text.start += leading_newline_len(&self.html.as_bytes()[text.start..text.end]);
                            if text.is_empty() {
                                continue;
                            }
                        }
                    }
                    if token.kind == TokenKind::Tag && !token.is_closer {
                        if !self.enter_special_element(&mut token) {
                            self.cursor = was_at;
                            self.state = ParserState::IncompleteInput;
                            return false;
                        }
                    }
                    self.state = ParserState::Matched;
                    self.stats.tokens += 1;
                    if token.kind == TokenKind::Tag {
                        self.stats.tags += 1;
                    }
                    #[cfg(any(test, feature = "debug-stats"))]
                    log::trace!(
                        target: "html_api.tokenizer",
                        "token {:?} {:?} at {}..{}",
                        token.kind,
                        token.tag,
                        token.span.start,
                        token.span.end
                    );
                    self.token = Some(token);
                    return true;
                }
            }
        }
    }

    /// Applies the tokenizer state change a start tag causes. Returns false
    /// when a raw text element has no closer in the buffer.
    fn enter_special_element(&mut self, token: &mut Token) -> bool {
        let Some(tag) = token.tag.as_deref() else {
            return true;
        };
        let html = self.html.as_bytes();
        let contents_at = token.span.end;
        match tag {
            "pre" | "listing" => {
                self.skip_newline_at = Some(contents_at);
                return true;
            }
            "plaintext" => {
                self.plaintext_from = Some(contents_at);
                return true;
            }
            _ if !has_text_contents(tag) => return true,
            _ => {}
        }
        let Some(closer_at) = find_contents_closer(html, tag, contents_at) else {
            return false;
        };
        let mut text = Span::new(contents_at, closer_at);
        if tag == "textarea" {
            text.start += leading_newline_len(&html[text.start..text.end]);
        }
        token.text = Some(text);
        self.cursor = closer_at;
        true
    }

    pub fn token_kind(&self) -> Option<TokenKind> {
        self.token.as_ref().map(|token| token.kind)
    }

    pub fn token_span(&self) -> Option<Span> {
        self.token.as_ref().map(|token| token.span)
    }

    /// Lowercased name of the current tag.
    pub fn get_tag(&self) -> Option<&str> {
        self.token.as_ref()?.tag.as_deref()
    }

    pub fn is_tag_closer(&self) -> bool {
        self.token.as_ref().is_some_and(|token| token.is_closer)
    }

    /// Whether the current start tag ends in `/>`.
    pub fn has_self_closing_flag(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|token| token.has_self_closing_flag)
    }

    /// Looks up an attribute on the current start tag. The first occurrence
    /// of a duplicated name wins.
    pub fn get_attribute(&self, name: &str) -> Option<AttributeValue<'_>> {
        let token = self.token.as_ref()?;
        if token.kind != TokenKind::Tag || token.is_closer {
            return None;
        }
        let attr = token
            .attributes
            .iter()
            .find(|attr| self.slice(attr.name).eq_ignore_ascii_case(name))?;
        Some(self.attribute_value(attr))
    }

    /// Lowercased names of the current tag's attributes starting with
    /// `prefix`, in source order without duplicates.
    pub fn get_attribute_names_with_prefix(&self, prefix: &str) -> Option<Vec<String>> {
        let token = self.token.as_ref()?;
        if token.kind != TokenKind::Tag || token.is_closer {
            return None;
        }
        let prefix = prefix.to_ascii_lowercase();
        let mut names: Vec<String> = Vec::new();
        for attr in &token.attributes {
            let name = self.slice(attr.name).to_ascii_lowercase();
            if name.starts_with(&prefix) && !names.contains(&name) {
                names.push(name);
            }
        }
        Some(names)
    }

    /// Lowercased name / decoded value pairs of the current start tag, first
    /// occurrence per name, sorted by name.
    pub(crate) fn attribute_pairs(&self) -> Vec<(Box<str>, Box<str>)> {
        let Some(token) = self.token.as_ref() else {
            return Vec::new();
        };
        let mut pairs: Vec<(Box<str>, Box<str>)> = Vec::with_capacity(token.attributes.len());
        for attr in &token.attributes {
            let name: Box<str> = self.slice(attr.name).to_ascii_lowercase().into();
            if pairs.iter().any(|(seen, _)| *seen == name) {
                continue;
            }
            let value: Box<str> = self.attribute_value(attr).as_str().into();
            pairs.push((name, value));
        }
        pairs.sort();
        pairs
    }

    fn attribute_value(&self, attr: &AttributeToken) -> AttributeValue<'_> {
        match attr.value {
            None => AttributeValue::Present,
            Some(span) => AttributeValue::Value(entities::decode_attribute_value(self.slice(span))),
        }
    }

    /// Raw text of the current token: text node contents, comment body, or
    /// the contents of a raw text element on its opener.
    pub fn get_modifiable_text(&self) -> Cow<'_, str> {
        match self.token.as_ref().and_then(|token| token.text) {
            Some(span) => Cow::Borrowed(self.slice(span)),
            None => Cow::Borrowed(""),
        }
    }

    fn slice(&self, span: Span) -> &str {
        self.html.get(span.start..span.end).unwrap_or("")
    }

    /// Offset the next token will be read from.
    pub(crate) fn position(&self) -> usize {
        self.cursor
    }

    pub(crate) fn slice_between(&self, start: usize, end: usize) -> Option<&str> {
        self.html.get(start..end)
    }

    /// Queues a replacement of `start..end`. Offsets must be char boundaries
    /// of the current buffer.
    pub fn enqueue_text_replacement(&mut self, start: usize, end: usize, text: &str) -> bool {
        if start > end || !self.html.is_char_boundary(start) || !self.html.is_char_boundary(end) {
            return false;
        }
        self.replacements.push(Span::new(start, end), text);
        true
    }

    /// Applies pending replacements and returns the rewritten buffer.
    pub fn get_updated_html(&mut self) -> &str {
        self.apply_replacements();
        &self.html
    }

    fn apply_replacements(&mut self) {
        let edits = self.replacements.apply(&mut self.html);
        if edits.is_empty() {
            return;
        }
        self.stats.replacements_applied += edits.len() as u64;
        self.bookmarks.apply_edits(&edits);
        self.plaintext_from = self.plaintext_from.map(|at| shift_offset(at, &edits));

        let token_start = self.token.as_ref().map(|token| token.span.start);
        let was_done = matches!(
            self.state,
            ParserState::Complete | ParserState::IncompleteInput
        );
        match token_start {
            Some(start) => {
                // Re-read the current token at its new position.
                self.cursor = shift_offset(start, &edits);
                self.skip_newline_at = None;
                self.state = ParserState::Ready;
                self.advance();
            }
            None => {
                self.cursor = shift_offset(self.cursor, &edits);
                self.skip_newline_at = self.skip_newline_at.map(|at| shift_offset(at, &edits));
                if !was_done {
                    self.state = ParserState::Ready;
                }
            }
        }
    }

    /// Bookmarks the current token under a caller-chosen name.
    pub fn set_bookmark(&mut self, name: &str) -> bool {
        let key = BookmarkName::Caller(name.into());
        if self.bookmarks.get(&key).is_none()
            && self.bookmarks.caller_count() >= self.config.max_bookmarks
        {
            return false;
        }
        self.set_named(key)
    }

    pub fn release_bookmark(&mut self, name: &str) -> bool {
        self.bookmarks.remove(&BookmarkName::Caller(name.into()))
    }

    pub fn has_bookmark(&self, name: &str) -> bool {
        self.bookmarks
            .get(&BookmarkName::Caller(name.into()))
            .is_some()
    }

    /// Moves back (or forward) to a bookmarked token.
    pub fn seek(&mut self, name: &str) -> bool {
        self.seek_named(&BookmarkName::Caller(name.into()))
    }

    pub(crate) fn set_named(&mut self, name: BookmarkName) -> bool {
        let Some(span) = self.token_span() else {
            return false;
        };
        self.bookmarks.insert(name, span);
        true
    }

    pub(crate) fn set_named_span(&mut self, name: BookmarkName, span: Span) {
        self.bookmarks.insert(name, span);
    }

    pub(crate) fn named_span(&self, name: &BookmarkName) -> Option<Span> {
        self.bookmarks.get(name)
    }

    pub(crate) fn release_named(&mut self, name: &BookmarkName) -> bool {
        self.bookmarks.remove(name)
    }

    /// Repositions on a named bookmark. A zero-width bookmark leaves the
    /// processor between tokens, with nothing matched.
    pub(crate) fn seek_named(&mut self, name: &BookmarkName) -> bool {
        if self.bookmarks.get(name).is_none() {
            return false;
        }
        if self.seek_count >= self.config.max_seek_ops {
            log::debug!(target: "html_api.bookmarks", "seek budget exhausted at {name:?}");
            return false;
        }
        self.count_seek();
        self.reposition(name)
    }

    /// Same as `seek_named`, without charging the seek budget. Used by
    /// scans that return to where they started.
    pub(crate) fn reposition(&mut self, name: &BookmarkName) -> bool {
        let Some(span) = self.bookmarks.get(name) else {
            return false;
        };
        log::trace!(target: "html_api.bookmarks", "seek {name:?} to {}..{}", span.start, span.end);

        self.token = None;
        self.skip_newline_at = None;
        self.state = ParserState::Ready;
        self.cursor = span.start;
        if span.is_empty() {
            return true;
        }
        self.advance()
    }

    /// Rewinds to the start of the buffer, dropping element marks.
    pub(crate) fn rewind(&mut self) {
        self.apply_replacements();
        self.token = None;
        self.skip_newline_at = None;
        self.state = ParserState::Ready;
        self.cursor = 0;
        self.bookmarks.clear_elements();
    }

    pub(crate) fn seek_budget_left(&self) -> bool {
        self.seek_count < self.config.max_seek_ops
    }

    pub(crate) fn count_seek(&mut self) {
        self.seek_count += 1;
        self.stats.seeks += 1;
    }

    pub(crate) fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    pub(crate) fn bookmarks_mut(&mut self) -> &mut BookmarkStore {
        &mut self.bookmarks
    }
}

/// Length of a leading `\n`, `\r\n`, or `\r`.
fn leading_newline_len(text: &[u8]) -> usize {
    match text {
        [b'\r', b'\n', ..] => 2,
        [b'\n', ..] | [b'\r', ..] => 1,
        _ => 0,
    }
}

/// Whether `<` at `at` can start a token.
fn opens_token(html: &[u8], at: usize) -> bool {
    matches!(html.get(at + 1), Some(b'!' | b'/' | b'?' | b'a'..=b'z' | b'A'..=b'Z'))
}

fn scan_token(html: &[u8], at: usize, plaintext_from: Option<usize>) -> Scanned {
    if at >= html.len() {
        return Scanned::End;
    }
    if plaintext_from.is_some_and(|from| at >= from) {
        let span = Span::new(at, html.len());
        return Scanned::Token(Token::new(TokenKind::Text, span).with_text(span));
    }

    let mut lt = at;
    loop {
        match find_byte(html, b'<', lt) {
            Some(found) if opens_token(html, found) => {
                lt = found;
                break;
            }
            Some(found) => lt = found + 1,
            None => {
                lt = html.len();
                break;
            }
        }
    }
    if lt > at {
        let span = Span::new(at, lt);
        return Scanned::Token(Token::new(TokenKind::Text, span).with_text(span));
    }

    match html.get(at + 1) {
        Some(b'a'..=b'z' | b'A'..=b'Z') => scan_tag(html, at, false),
        Some(b'/') => match html.get(at + 2) {
            Some(b'a'..=b'z' | b'A'..=b'Z') => scan_tag(html, at, true),
            Some(b'>') => Scanned::Token(Token::new(
                TokenKind::PresumptuousTag,
                Span::new(at, at + 3),
            )),
            Some(_) => scan_until_gt(html, at, at + 2, TokenKind::FunkyComment),
            None => Scanned::Incomplete,
        },
        Some(b'!') => scan_markup_declaration(html, at),
        Some(b'?') => scan_processing_instruction(html, at),
        _ => Scanned::Incomplete,
    }
}

fn scan_tag(html: &[u8], at: usize, is_closer: bool) -> Scanned {
    let name_start = at + if is_closer { 2 } else { 1 };
    let name_end = name_start + run_len(html, name_start, |b| !ends_name(b));
    let Some(tail) = parse_tag_tail(html, name_end) else {
        return Scanned::Incomplete;
    };
    let name = String::from_utf8_lossy(&html[name_start..name_end]).to_ascii_lowercase();
    let mut token = Token::new(TokenKind::Tag, Span::new(at, tail.end));
    token.tag = Some(name.into_boxed_str());
    token.is_closer = is_closer;
    if !is_closer {
        token.has_self_closing_flag = tail.has_self_closing_flag;
        token.attributes = tail.attributes;
    }
    Scanned::Token(token)
}

fn scan_until_gt(html: &[u8], at: usize, text_at: usize, kind: TokenKind) -> Scanned {
    match find_byte(html, b'>', text_at) {
        Some(gt) => Scanned::Token(
            Token::new(kind, Span::new(at, gt + 1)).with_text(Span::new(text_at, gt)),
        ),
        None => Scanned::Incomplete,
    }
}

fn scan_markup_declaration(html: &[u8], at: usize) -> Scanned {
    if html.get(at + 2..at + 4) == Some(b"--".as_slice()) {
        return scan_comment(html, at);
    }
    if starts_with_ignore_case(html, at + 2, b"doctype") {
        let text_at = at + 9 + run_len(html, at + 9, is_html_whitespace);
        return scan_until_gt(html, at, text_at, TokenKind::Doctype);
    }
    let Scanned::Token(mut token) = scan_until_gt(html, at, at + 2, TokenKind::Comment) else {
        return Scanned::Incomplete;
    };
    let gt = token.span.end - 1;
    if html.get(at + 2..at + 9) == Some(b"[CDATA[".as_slice())
        && gt >= at + 11
        && html.get(gt - 2..gt) == Some(b"]]".as_slice())
    {
        token.kind = TokenKind::CData;
        token.text = Some(Span::new(at + 9, gt - 2));
    }
    Scanned::Token(token)
}

fn scan_comment(html: &[u8], at: usize) -> Scanned {
    let body_at = at + 4;
    // `<!-->` and `<!--->` close immediately.
    let dashes = run_len(html, body_at, |b| b == b'-');
    if dashes <= 1 && html.get(body_at + dashes) == Some(&b'>') {
        let end = body_at + dashes + 1;
        return Scanned::Token(
            Token::new(TokenKind::Comment, Span::new(at, end)).with_text(Span::empty_at(body_at)),
        );
    }
    let mut search_at = body_at;
    loop {
        let Some(dash) = find_bytes(html, b"--", search_at) else {
            return Scanned::Incomplete;
        };
        let closer_len = match html.get(dash + 2) {
            Some(b'>') => 3,
            Some(b'!') if html.get(dash + 3) == Some(&b'>') => 4,
            Some(_) => 0,
            None => return Scanned::Incomplete,
        };
        if closer_len > 0 {
            let end = dash + closer_len;
            return Scanned::Token(
                Token::new(TokenKind::Comment, Span::new(at, end))
                    .with_text(Span::new(body_at, dash.max(body_at))),
            );
        }
        search_at = dash + 1;
    }
}

fn scan_processing_instruction(html: &[u8], at: usize) -> Scanned {
    let Scanned::Token(mut token) = scan_until_gt(html, at, at + 2, TokenKind::Comment) else {
        return Scanned::Incomplete;
    };
    let gt = token.span.end - 1;
    let target_len = run_len(html, at + 2, |b| b.is_ascii_alphabetic() || b == b':' || b == b'_');
    if target_len > 0 && gt >= at + 3 && html[gt - 1] == b'?' {
        token.kind = TokenKind::ProcessingInstruction;
    }
    Scanned::Token(token)
}
