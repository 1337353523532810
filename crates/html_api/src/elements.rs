//! Element classification table.
//!
//! Maps a tag name to the handful of flags the processor needs: whether the
//! element is void, whether it is a recognized HTML element, and whether it
//! belongs to the HTML "special" category used by scope and list-item rules.
//!
//! The table is a pure function over ASCII-folded names. Nothing here
//! allocates unless the caller passes a name containing uppercase letters.

use std::borrow::Cow;

/// Category flags for a tag name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementCategory {
    /// The element never has content or a closing tag.
    pub is_void: bool,
    /// Recognized HTML element (or valid custom element name).
    pub is_html: bool,
    /// Member of the HTML "special" category.
    pub is_special: bool,
}

impl ElementCategory {
    /// Ordinary HTML element: may hold content, not special.
    pub const GENERIC: Self = Self {
        is_void: false,
        is_html: true,
        is_special: false,
    };

    /// HTML element in the special category.
    pub const SPECIAL: Self = Self {
        is_void: false,
        is_html: true,
        is_special: true,
    };

    /// Void HTML element. Every void element is also special.
    pub const VOID: Self = Self {
        is_void: true,
        is_html: true,
        is_special: true,
    };

    /// Name that is neither HTML nor a custom element, e.g. SVG `circle`.
    pub const UNKNOWN: Self = Self {
        is_void: false,
        is_html: false,
        is_special: false,
    };
}

/// Classifies `tag_name`, ignoring ASCII case.
pub fn classify(tag_name: &str) -> ElementCategory {
    let name = fold(tag_name);
    match name.as_ref() {
        "area" | "base" | "basefont" | "bgsound" | "br" | "col" | "embed" | "frame" | "hr"
        | "img" | "input" | "keygen" | "link" | "meta" | "param" | "source" | "track"
        | "wbr" => ElementCategory::VOID,

        "address" | "applet" | "article" | "aside" | "blockquote" | "body" | "button"
        | "caption" | "center" | "colgroup" | "dd" | "details" | "dir" | "div" | "dl" | "dt"
        | "fieldset" | "figcaption" | "figure" | "footer" | "form" | "frameset" | "h1" | "h2"
        | "h3" | "h4" | "h5" | "h6" | "head" | "header" | "hgroup" | "html" | "iframe" | "li"
        | "main" | "marquee" | "menu" | "nav" | "noembed" | "noframes" | "noscript"
        | "object" | "ol" | "p" | "plaintext" | "script" | "search" | "section" | "select"
        | "style" | "summary" | "table" | "tbody" | "td" | "template" | "textarea" | "tfoot"
        | "th" | "thead" | "title" | "tr" | "ul" => ElementCategory::SPECIAL,

        // `listing` and `xmp` behave as `pre`.
        "pre" | "listing" | "xmp" => ElementCategory::SPECIAL,

        "a" | "abbr" | "audio" | "b" | "bdi" | "bdo" | "canvas" | "cite" | "code" | "data"
        | "datalist" | "del" | "dfn" | "dialog" | "em" | "font" | "i" | "image" | "ins"
        | "kbd" | "label" | "legend" | "map" | "mark" | "math" | "meter" | "optgroup"
        | "option" | "output" | "picture" | "progress" | "q" | "rp" | "rt" | "ruby" | "s"
        | "samp" | "slot" | "small" | "span" | "strong" | "sub" | "sup" | "svg" | "time"
        | "u" | "var" | "video" => ElementCategory::GENERIC,

        // Deprecated and neutralized names parse as plain HTML elements.
        "acronym" | "big" | "blink" | "isindex" | "multicol" | "nextid" | "nobr" | "rb"
        | "rtc" | "spacer" | "strike" | "tt" => ElementCategory::GENERIC,

        other if is_custom_element_name(other) => ElementCategory::GENERIC,
        _ => ElementCategory::UNKNOWN,
    }
}

/// Formatting elements tracked by the active formatting list.
pub fn is_formatting_element(tag_name: &str) -> bool {
    matches!(
        tag_name,
        "a" | "b"
            | "big"
            | "code"
            | "em"
            | "font"
            | "i"
            | "nobr"
            | "s"
            | "small"
            | "strike"
            | "strong"
            | "tt"
            | "u"
    )
}

pub fn is_heading(tag_name: &str) -> bool {
    matches!(tag_name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Whether a tag with this category never receives a closing event.
///
/// The self-closing flag only closes non-HTML elements; on HTML elements it is
/// ignored (`<div/>` opens a `div`).
pub fn closes_itself(category: ElementCategory, has_self_closing_flag: bool) -> bool {
    category.is_void || (!category.is_html && has_self_closing_flag)
}

/// Valid custom element names start with a lowercase ASCII letter and contain a hyphen.
fn is_custom_element_name(name: &str) -> bool {
    name.as_bytes().first().is_some_and(u8::is_ascii_lowercase) && name.contains('-')
}

fn fold(tag_name: &str) -> Cow<'_, str> {
    if tag_name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(tag_name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(tag_name)
    }
}
