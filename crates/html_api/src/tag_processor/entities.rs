//! Character reference decoding for attribute values.
//!
//! Contract:
//! - Named references decode only from the table below and only when
//!   terminated by `;`.
//! - Numeric references (`&#38;`, `&#x26;`) decode when semicolon-terminated
//!   and within the digit limits. `&#0;`, surrogates, and out-of-range values
//!   decode to U+FFFD; the C1 range 0x80..=0x9F is remapped through
//!   Windows-1252 as browsers do.
//! - Everything else is copied through unchanged.

use std::borrow::Cow;

const NAMED: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{00A0}'),
    ("copy", '\u{00A9}'),
    ("reg", '\u{00AE}'),
    ("trade", '\u{2122}'),
    ("hellip", '\u{2026}'),
    ("ndash", '\u{2013}'),
    ("mdash", '\u{2014}'),
    ("lsquo", '\u{2018}'),
    ("rsquo", '\u{2019}'),
    ("ldquo", '\u{201C}'),
    ("rdquo", '\u{201D}'),
];

const MAX_NAME_LEN: usize = 6;
const MAX_HEX_DIGITS: usize = 6;
const MAX_DEC_DIGITS: usize = 7;

const WINDOWS_1252_C1: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

/// Decodes character references in `raw`, borrowing when there are none.
pub(crate) fn decode_attribute_value(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut copied_to = 0;
    let mut at = 0;
    while let Some(rel) = memchr::memchr(b'&', &bytes[at..]) {
        let amp = at + rel;
        match decode_reference(bytes, amp) {
            Some((ch, consumed)) => {
                out.push_str(&raw[copied_to..amp]);
                out.push(ch);
                at = amp + consumed;
                copied_to = at;
            }
            None => at = amp + 1,
        }
    }
    out.push_str(&raw[copied_to..]);
    Cow::Owned(out)
}

/// Decodes the reference starting at `amp`, returning the char and the number
/// of bytes consumed including `&` and `;`.
fn decode_reference(bytes: &[u8], amp: usize) -> Option<(char, usize)> {
    let body = bytes.get(amp + 1..)?;
    match body.first()? {
        b'#' => {
            let (radix, digits_at, max) = match body.get(1) {
                Some(b'x' | b'X') => (16, 2, MAX_HEX_DIGITS),
                _ => (10, 1, MAX_DEC_DIGITS),
            };
            let digits = body
                .get(digits_at..)?
                .iter()
                .take(max + 1)
                .take_while(|b| b.is_ascii_hexdigit() && (radix == 16 || b.is_ascii_digit()))
                .count();
            if digits == 0 || digits > max || body.get(digits_at + digits) != Some(&b';') {
                return None;
            }
            let text = std::str::from_utf8(&body[digits_at..digits_at + digits]).ok()?;
            let code = u32::from_str_radix(text, radix).ok()?;
            Some((numeric_char(code), 1 + digits_at + digits + 1))
        }
        _ => {
            let name_len = body
                .iter()
                .take(MAX_NAME_LEN + 1)
                .take_while(|b| b.is_ascii_alphanumeric())
                .count();
            if body.get(name_len) != Some(&b';') {
                return None;
            }
            let name = &body[..name_len];
            NAMED
                .iter()
                .find(|(candidate, _)| candidate.as_bytes() == name)
                .map(|&(_, ch)| (ch, 1 + name_len + 1))
        }
    }
}

fn numeric_char(code: u32) -> char {
    match code {
        0x80..=0x9F => WINDOWS_1252_C1[(code - 0x80) as usize],
        0 => char::REPLACEMENT_CHARACTER,
        _ => char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
    }
}

#[cfg(test)]
mod tests {
    use super::decode_attribute_value;
    use std::borrow::Cow;

    #[test]
    fn borrows_when_nothing_to_decode() {
        assert!(matches!(decode_attribute_value("plain ×"), Cow::Borrowed(_)));
    }

    #[test]
    fn decodes_named_and_numeric_references() {
        assert_eq!(decode_attribute_value("a &amp; b"), "a & b");
        assert_eq!(decode_attribute_value("&lt;p&gt;"), "<p>");
        assert_eq!(decode_attribute_value("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(decode_attribute_value("&#x1F4A9;"), "\u{1F4A9}");
    }

    #[test]
    fn leaves_malformed_references_alone() {
        assert_eq!(decode_attribute_value("&amp"), "&amp");
        assert_eq!(decode_attribute_value("&unknown;"), "&unknown;");
        assert_eq!(decode_attribute_value("&#;"), "&#;");
        assert_eq!(decode_attribute_value("&#x;"), "&#x;");
        assert_eq!(decode_attribute_value("&#12345678;"), "&#12345678;");
        assert_eq!(decode_attribute_value("&&amp;"), "&&");
    }

    #[test]
    fn maps_invalid_scalars_and_c1_controls() {
        assert_eq!(decode_attribute_value("&#0;"), "\u{FFFD}");
        assert_eq!(decode_attribute_value("&#xD800;"), "\u{FFFD}");
        assert_eq!(decode_attribute_value("&#x110000;"), "\u{FFFD}");
        assert_eq!(decode_attribute_value("&#128;"), "\u{20AC}");
    }
}
