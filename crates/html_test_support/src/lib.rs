//! Fixture loading and failure reporting shared by the `html_api` test
//! suites.

use std::fmt::Write;

pub mod fixtures;

/// Escapes control characters and quotes so a snapshot line stays on one
/// line in failure output.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch < ' ' => {
                let _ = write!(&mut out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// One breadcrumb snapshot line: the open elements, outermost first.
pub fn format_breadcrumbs<S: AsRef<str>>(crumbs: &[S]) -> String {
    if crumbs.is_empty() {
        return "(empty)".to_string();
    }
    crumbs
        .iter()
        .map(|crumb| crumb.as_ref())
        .collect::<Vec<&str>>()
        .join(" > ")
}

fn line(lines: &[String], i: usize) -> &str {
    lines.get(i).map_or("<missing>", String::as_str)
}

/// Describes where two snapshots diverge, with two lines of context on
/// either side of the first mismatch. Returns an empty string when they
/// are equal.
pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    if expected == actual {
        return String::new();
    }
    let max = expected.len().max(actual.len());

    let mut out = String::new();
    match (0..max).find(|&i| line(expected, i) != line(actual, i)) {
        Some(i) => {
            let start = i.saturating_sub(2);
            let end = (i + 3).min(max);
            let _ = writeln!(
                &mut out,
                "first mismatch at step {} (showing {}..={}):",
                i + 1,
                start + 1,
                end
            );
            for at in start..end {
                let marker = if at == i { ">" } else { " " };
                let _ = writeln!(&mut out, "{marker} {:>4}  expected: {}", at + 1, line(expected, at));
                let _ = writeln!(&mut out, "{marker} {:>4}    actual: {}", at + 1, line(actual, at));
            }
        }
        None => {
            let _ = writeln!(&mut out, "prefix matched but lengths differ");
        }
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_control_characters() {
        assert_eq!(escape_text("a\"b\n\u{1}"), "a\\\"b\\n\\u{01}");
    }

    #[test]
    fn formats_breadcrumbs() {
        assert_eq!(format_breadcrumbs(&["html", "body", "p"]), "html > body > p");
        assert_eq!(format_breadcrumbs::<&str>(&[]), "(empty)");
    }

    #[test]
    fn reports_first_mismatch() {
        let expected = vec!["a".to_string(), "b".to_string()];
        let actual = vec!["a".to_string(), "c".to_string(), "d".to_string()];
        let report = diff_lines(&expected, &actual);
        assert!(report.contains("first mismatch at step 2"));
        assert!(report.contains("expected: <missing>"));
        assert!(diff_lines(&expected, &expected).is_empty());
    }
}
