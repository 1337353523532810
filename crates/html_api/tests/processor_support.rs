use html_api::HtmlProcessor;
use html_test_support::fixtures::{
    self, ContentCase, Extent, Move, NavigationCase, SupportFixtures,
};
use std::path::PathBuf;

fn support_fixtures() -> SupportFixtures {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/support.toml");
    fixtures::load_support_fixtures(&path)
}

fn at_start(html: &str, case: &str) -> HtmlProcessor {
    let mut p = HtmlProcessor::new(html);
    while p.get_attribute("start").is_none() {
        assert!(p.next_tag(), "case '{case}': no element marked `start`");
    }
    p
}

fn apply(p: &mut HtmlProcessor, step: Move) -> bool {
    match step {
        Move::NextTag => p.next_tag(),
        Move::NextSibling => p.next_sibling(),
        Move::FirstChild => p.first_child(),
    }
}

fn run_navigation(case: &NavigationCase) {
    let mut p = at_start(&case.html, &case.name);
    let (last, leading) = case.moves.split_last().expect("validated non-empty");
    for &step in leading {
        assert!(apply(&mut p, step), "case '{}': {step:?} failed", case.name);
    }
    let tag_before = p.get_tag().map(str::to_owned);
    let depth_before = p.get_current_depth();

    let moved = apply(&mut p, *last);
    assert_eq!(moved, case.found, "case '{}': {last:?}", case.name);
    if case.found {
        assert!(
            p.get_attribute("end").is_some(),
            "case '{}': landed on {:?}",
            case.name,
            p.get_tag()
        );
    } else {
        assert_eq!(p.get_tag().map(str::to_owned), tag_before, "case '{}'", case.name);
        assert_eq!(p.get_current_depth(), depth_before, "case '{}'", case.name);
    }
}

fn run_content(case: &ContentCase) {
    let html = case.html();
    let mut p = at_start(&html, &case.name);
    match (&case.replacement, case.extent) {
        (None, Extent::Inner) => {
            assert_eq!(p.get_inner_content().as_deref(), Some(case.old.as_str()), "case '{}'", case.name);
        }
        (None, Extent::Outer) => {
            assert_eq!(p.get_outer_content().as_deref(), Some(case.old.as_str()), "case '{}'", case.name);
        }
        (Some(replacement), extent) => {
            let replaced = match extent {
                Extent::Inner => p.set_inner_content(replacement),
                Extent::Outer => p.set_outer_content(replacement),
            };
            assert!(replaced, "case '{}': replacement refused", case.name);
            let expected = case.expected_html().expect("replacement present");
            assert_eq!(p.get_updated_html(), expected, "case '{}'", case.name);
        }
    }
}

#[test]
fn balance_fixtures() {
    let filter = fixtures::case_filter();
    let fixtures = support_fixtures();
    for case in &fixtures.balance {
        if !fixtures::selected(&case.name, filter.as_deref()) {
            continue;
        }
        let mut p = HtmlProcessor::new(&case.html);
        assert_eq!(p.ensure_support(), case.supported, "case '{}'", case.name);
        if !case.supported {
            assert!(!p.next_tag(), "case '{}': navigated unsupported markup", case.name);
        }
    }
}

#[test]
fn navigation_fixtures() {
    let filter = fixtures::case_filter();
    for case in &support_fixtures().navigation {
        if fixtures::selected(&case.name, filter.as_deref()) {
            run_navigation(case);
        }
    }
}

#[test]
fn content_fixtures() {
    let filter = fixtures::case_filter();
    for case in &support_fixtures().content {
        if fixtures::selected(&case.name, filter.as_deref()) {
            run_content(case);
        }
    }
}

#[test]
fn bookmarks_move_with_edits_before_them() {
    let mut p = at_start("<div><p start>one</p><p>two</p><p mark>three</p></div>", "bookmarks");
    assert!(p.set_bookmark("first"));
    while p.get_attribute("mark").is_none() {
        assert!(p.next_tag());
    }
    assert!(p.set_bookmark("mark"));

    assert!(p.seek("first"));
    assert!(p.set_outer_content("<p>one, two</p>"));
    assert!(!p.has_bookmark("first"), "replaced element's bookmark is dropped");

    assert!(p.seek("mark"));
    assert_eq!(p.get_tag(), Some("p"));
    assert!(p.get_attribute("mark").is_some());
    assert_eq!(p.get_breadcrumbs(), vec!["div", "p"]);
    assert!(p.release_bookmark("mark"));
    assert!(!p.seek("mark"));
}
