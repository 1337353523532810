//! Byte scanning helpers.
//!
//! All offsets are byte offsets into the UTF-8 buffer. Helpers only stop on
//! ASCII bytes, so every returned offset is a char boundary.

use memchr::{memchr, memchr2, memmem};

#[inline]
pub(crate) fn is_html_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0c)
}

/// Bytes that end a tag name or an unquoted attribute name.
#[inline]
pub(crate) fn ends_name(b: u8) -> bool {
    is_html_whitespace(b) || b == b'/' || b == b'>'
}

#[inline]
pub(crate) fn find_byte(hay: &[u8], needle: u8, from: usize) -> Option<usize> {
    let tail = hay.get(from..)?;
    memchr(needle, tail).map(|rel| from + rel)
}

#[inline]
pub(crate) fn find_bytes(hay: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    let tail = hay.get(from..)?;
    memmem::find(tail, needle).map(|rel| from + rel)
}

/// Length of the run starting at `from` whose bytes satisfy `pred`.
#[inline]
pub(crate) fn run_len(hay: &[u8], from: usize, pred: impl Fn(u8) -> bool) -> usize {
    hay.get(from..)
        .map_or(0, |tail| tail.iter().take_while(|&&b| pred(b)).count())
}

/// ASCII case-insensitive prefix test at `at`. `lower` must be lowercase.
#[inline]
pub(crate) fn starts_with_ignore_case(hay: &[u8], at: usize, lower: &[u8]) -> bool {
    hay.get(at..at + lower.len())
        .is_some_and(|window| window.eq_ignore_ascii_case(lower))
}

/// Finds the start of the `</tag` sequence that closes an RCDATA or RAWTEXT
/// element. The tag name must be followed by whitespace, `/`, or `>` to count.
pub(crate) fn find_raw_text_closer(hay: &[u8], tag: &str, from: usize) -> Option<usize> {
    let tag = tag.as_bytes();
    let mut at = from;
    loop {
        let lt = find_bytes(hay, b"</", at)?;
        let name_at = lt + 2;
        if starts_with_ignore_case(hay, name_at, tag) {
            match hay.get(name_at + tag.len()) {
                Some(&b) if ends_name(b) => return Some(lt),
                // `</title` at the very end still needs a `>` to close.
                None => return None,
                _ => {}
            }
        }
        at = lt + 2;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScriptState {
    Unescaped,
    Escaped,
    DoubleEscaped,
}

/// Finds the `</script` closer that ends script data starting at `from`.
///
/// Tracks the `<!--` escape and `<script>` double-escape states so that
/// `</script>` inside a commented-out nested script does not end the element.
pub(crate) fn find_script_closer(hay: &[u8], from: usize) -> Option<usize> {
    let mut state = ScriptState::Unescaped;
    let mut at = from;
    while at < hay.len() {
        let rel = memchr2(b'-', b'<', &hay[at..])?;
        at += rel;

        if hay[at] == b'-' {
            if hay.get(at..at + 3) == Some(b"-->".as_slice()) {
                state = ScriptState::Unescaped;
                at += 3;
            } else {
                at += 1;
            }
            continue;
        }

        // hay[at] == b'<'
        if hay.get(at + 1..at + 4) == Some(b"!--".as_slice()) {
            if state == ScriptState::Unescaped {
                state = ScriptState::Escaped;
            }
            at += 4;
            continue;
        }

        let is_closer = hay.get(at + 1) == Some(&b'/');
        let name_at = at + if is_closer { 2 } else { 1 };
        let names_script = starts_with_ignore_case(hay, name_at, b"script")
            && hay.get(name_at + 6).is_some_and(|&b| ends_name(b));
        if !names_script {
            at += 1;
            continue;
        }

        match (state, is_closer) {
            (ScriptState::Escaped, false) => state = ScriptState::DoubleEscaped,
            (ScriptState::DoubleEscaped, true) => state = ScriptState::Escaped,
            (ScriptState::Unescaped | ScriptState::Escaped, true) => return Some(at),
            _ => {}
        }
        at = name_at + 6;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{find_raw_text_closer, find_script_closer, run_len};

    #[test]
    fn raw_text_closer_requires_name_boundary() {
        let hay = b"a</titlex></title >";
        assert_eq!(find_raw_text_closer(hay, "title", 0), Some(10));
        assert_eq!(find_raw_text_closer(b"abc</title", "title", 0), None);
    }

    #[test]
    fn script_closer_honours_escapes() {
        let plain = b"var a = 1;</script>";
        assert_eq!(find_script_closer(plain, 0), Some(10));

        let escaped = b"<!-- <script>x</script> --></script>";
        assert_eq!(find_script_closer(escaped, 0), Some(27));

        let lookalike = b"if (a </scripts) {}</SCRIPT>";
        assert_eq!(find_script_closer(lookalike, 0), Some(19));
    }

    #[test]
    fn run_len_counts_matching_prefix() {
        assert_eq!(run_len(b"   x", 0, |b| b == b' '), 3);
        assert_eq!(run_len(b"abc", 5, |_| true), 0);
    }
}
