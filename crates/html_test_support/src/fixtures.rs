use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const SUPPORT_FORMAT_V1: &str = "html-api-support-v1";
pub const TREE_FORMAT_V1: &str = "html-api-tree-v1";

/// Balance, navigation and content cases, loaded from TOML.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SupportFixtures {
    pub format: String,
    #[serde(default)]
    pub balance: Vec<BalanceCase>,
    #[serde(default)]
    pub navigation: Vec<NavigationCase>,
    #[serde(default)]
    pub content: Vec<ContentCase>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct BalanceCase {
    pub name: String,
    pub html: String,
    pub supported: bool,
}

/// Starting on the element carrying a `start` attribute, apply `moves`.
/// When `found`, the processor must end on the element carrying `end`;
/// otherwise the last move fails and it stays on `start`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct NavigationCase {
    pub name: String,
    pub html: String,
    pub moves: Vec<Move>,
    pub found: bool,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    NextTag,
    NextSibling,
    FirstChild,
}

/// `before + old + after` is the document; the element carrying `start`
/// is read, or rewritten with `replacement` when one is given.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ContentCase {
    pub name: String,
    pub extent: Extent,
    #[serde(default)]
    pub before: String,
    pub old: String,
    #[serde(default)]
    pub after: String,
    pub replacement: Option<String>,
}

impl ContentCase {
    pub fn html(&self) -> String {
        format!("{}{}{}", self.before, self.old, self.after)
    }

    pub fn expected_html(&self) -> Option<String> {
        let replacement = self.replacement.as_ref()?;
        Some(format!("{}{}{}", self.before, replacement, self.after))
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Extent {
    Inner,
    Outer,
}

/// Step-by-step breadcrumb snapshots, loaded from JSON.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct TreeFixtures {
    pub format: String,
    pub cases: Vec<TreeCase>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct TreeCase {
    pub name: String,
    pub html: String,
    /// Fragment context start tag; full document when absent.
    #[serde(default)]
    pub context: Option<String>,
    /// Breadcrumbs after every successful step, formatted with
    /// [`crate::format_breadcrumbs`].
    pub steps: Vec<String>,
    /// Display text of the error that halted stepping, if any.
    #[serde(default)]
    pub error: Option<String>,
}

pub fn load_support_fixtures(path: &Path) -> SupportFixtures {
    let fixtures: SupportFixtures = load_toml(path);
    assert_eq!(
        fixtures.format, SUPPORT_FORMAT_V1,
        "unsupported fixture format in {path:?}"
    );
    assert_unique_names(
        fixtures
            .balance
            .iter()
            .map(|case| case.name.as_str())
            .chain(fixtures.navigation.iter().map(|case| case.name.as_str()))
            .chain(fixtures.content.iter().map(|case| case.name.as_str())),
        path,
    );
    for case in &fixtures.navigation {
        assert!(!case.moves.is_empty(), "case '{}' has no moves in {path:?}", case.name);
    }
    fixtures
}

pub fn load_tree_fixtures(path: &Path) -> TreeFixtures {
    let fixtures: TreeFixtures = load_json(path);
    assert_eq!(
        fixtures.format, TREE_FORMAT_V1,
        "unsupported fixture format in {path:?}"
    );
    assert_unique_names(fixtures.cases.iter().map(|case| case.name.as_str()), path);
    fixtures
}

pub fn load_toml<T: DeserializeOwned>(path: &Path) -> T {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read fixture TOML {path:?}: {err}"));
    toml::from_str(&content)
        .unwrap_or_else(|err| panic!("failed to parse fixture TOML {path:?}: {err}"))
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> T {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read fixture JSON {path:?}: {err}"));
    serde_json::from_str(&content)
        .unwrap_or_else(|err| panic!("failed to parse fixture JSON {path:?}: {err}"))
}

fn assert_unique_names<'a>(names: impl Iterator<Item = &'a str>, path: &Path) {
    let mut seen = BTreeSet::new();
    for name in names {
        assert!(seen.insert(name), "duplicate case name '{name}' in {path:?}");
    }
}

/// Case-name filter from `HTML_API_CASE`, for running a single fixture.
pub fn case_filter() -> Option<String> {
    std::env::var("HTML_API_CASE")
        .ok()
        .filter(|value| !value.trim().is_empty())
}

pub fn selected(name: &str, filter: Option<&str>) -> bool {
    filter.is_none_or(|wanted| name.contains(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_support_cases_from_toml() {
        let fixtures: SupportFixtures = toml::from_str(
            r#"
format = "html-api-support-v1"

[[navigation]]
name = "sibling"
html = "<img start><img end>"
moves = ["next_sibling"]
found = true

[[content]]
name = "inner"
extent = "inner"
before = "<div start>"
old = "text"
after = "</div>"
replacement = "new"
"#,
        )
        .expect("valid TOML");
        assert!(fixtures.balance.is_empty());
        assert_eq!(fixtures.navigation[0].moves, vec![Move::NextSibling]);
        let content = &fixtures.content[0];
        assert_eq!(content.extent, Extent::Inner);
        assert_eq!(content.html(), "<div start>text</div>");
        assert_eq!(content.expected_html().as_deref(), Some("<div start>new</div>"));
    }

    #[test]
    fn parses_tree_cases_from_json() {
        let fixtures: TreeFixtures = serde_json::from_str(
            r#"{"format": "html-api-tree-v1", "cases": [
                {"name": "p", "html": "<p>", "context": "<body>", "steps": ["html > p"]}
            ]}"#,
        )
        .expect("valid JSON");
        let case = &fixtures.cases[0];
        assert_eq!(case.context.as_deref(), Some("<body>"));
        assert_eq!(case.error, None);
    }

    #[test]
    fn filter_matches_substrings() {
        assert!(selected("nested siblings", None));
        assert!(selected("nested siblings", Some("sibling")));
        assert!(!selected("nested siblings", Some("child")));
    }
}
