use super::{HtmlProcessor, InsertionMode, StepAction, create_document, create_fragment};
use crate::config::ProcessorConfig;
use crate::error::{ProcessorError, UnsupportedConstruct};

fn at_start(html: &str) -> HtmlProcessor {
    let mut p = HtmlProcessor::new(html);
    while p.get_attribute("start").is_none() {
        assert!(p.next_tag(), "no element marked `start` in {html:?}");
    }
    p
}

fn body_fragment(html: &str) -> HtmlProcessor {
    create_fragment(html, "<body>", "UTF-8").expect("body fragment")
}

fn step_to_end(p: &mut HtmlProcessor) -> Vec<Vec<String>> {
    let mut crumbs = Vec::new();
    while p.step(StepAction::Advance) {
        crumbs.push(p.get_breadcrumbs().iter().map(|tag| tag.to_string()).collect());
    }
    crumbs
}

fn step_through(p: &mut HtmlProcessor, tokens: usize) {
    for _ in 0..tokens {
        assert!(p.step(StepAction::Advance), "stopped early: {:?}", p.last_error());
    }
}

#[test]
fn detects_balanced_markup() {
    for html in [
        "<div><p><strong>Test</strong></p></div>",
        "<ul><li>One</li><li>Two</li><li>Three</li></ul>",
        "<li>One</li><li>Two</li><li>Three</li>",
        "<img><br><hr>",
        "<img /><br/><hr />",
        "This <div/> is (not) empty.</div>",
        "<div><p><img>Text<br>More Text</p></div>",
        "<svg><circle /></svg>",
    ] {
        assert!(HtmlProcessor::new(html).ensure_support(), "{html}");
    }
}

#[test]
fn detects_unbalanced_markup_and_refuses_to_navigate() {
    for html in [
        "<p>Unclosed paragraph",
        "<div><p>Unclosed paragraph</div>",
        "<strong><p>Important</strong></p>",
        "<div><strong><p>Important</strong></p></div>",
        "This <div/> is (not) empty.",
        "<svg><circle></svg>",
        "<svg><circle /></circle></svg>",
    ] {
        let mut p = HtmlProcessor::new(html);
        assert!(!p.ensure_support(), "{html}");
        assert!(!p.next_tag(), "{html}");
        assert!(!p.first_child(), "{html}");
        assert_eq!(p.get_inner_content(), None, "{html}");
    }
}

#[test]
fn finds_next_sibling() {
    for html in [
        "before<img start><img end><img>",
        "<img start><img end><img>",
        "<ul><li>One</li><li start>Two</li><li end>Three</li><li>Four</li></ul>",
        "<img start><ul end><li><div><p><strong><a><img></a></strong></p></div></li></ul><div></div><footer></footer>",
    ] {
        let mut p = at_start(html);
        assert!(p.next_sibling(), "{html}");
        assert!(p.get_attribute("end").is_some(), "{html}");
    }
}

#[test]
fn stays_put_without_next_sibling() {
    for html in [
        "before<div><img start></div><img end><img>",
        "<ul><li></li><li start></li></ul><ul><li end></li></ul>",
        "<ul><li><div><p><strong><a><img start></a></strong></p></div></li></ul><div end></div><footer></footer>",
    ] {
        let mut p = at_start(html);
        let depth = p.get_current_depth();
        assert!(!p.next_sibling(), "{html}");
        assert!(p.get_attribute("start").is_some(), "{html}");
        assert_eq!(p.get_current_depth(), depth, "{html}");
    }
}

#[test]
fn finds_first_child() {
    for html in [
        "this is not tag content<div start><img end></div>afterwards",
        "<ul><li></li><li><p start>text<img end></p></li><li></li></ul>",
    ] {
        let mut p = at_start(html);
        assert!(p.first_child(), "{html}");
        assert!(p.get_attribute("end").is_some(), "{html}");
    }
}

#[test]
fn finds_no_first_child() {
    for html in [
        "this is not tag content<div start></div><img end>afterwards",
        "<img start>",
    ] {
        let mut p = at_start(html);
        assert!(!p.first_child(), "{html}");
        assert!(p.get_attribute("start").is_some(), "{html}");
    }
}

const RECIPE: &str = "<main>
  <h2>Things I could be eating right now</h2>
  <ul>
    <li>Apples</li>
    <li>Pears</li>
    <li><em>Prickly</em> pears</li>
    <li>
      <img src=\"yum.avif\">
      <details>
        <summary>Schwarzwälder Kirschtorte</summary>
        <ul>
          <li>Flour</li>
          <li>Eggs</li>
          <li this-one>Sugar</li>
          <li>Cream</li>
        </ul>
      </details>
    </li>
  </ul>
</main>";

#[test]
fn follows_a_chain_of_children_and_siblings() {
    let mut p = HtmlProcessor::new(RECIPE);
    assert!(p.next_tag());
    assert_eq!(p.get_tag(), Some("main"));

    let moves: [(fn(&mut HtmlProcessor) -> bool, &str); 13] = [
        (HtmlProcessor::first_child, "h2"),
        (HtmlProcessor::next_sibling, "ul"),
        (HtmlProcessor::first_child, "li"),
        (HtmlProcessor::next_sibling, "li"),
        (HtmlProcessor::next_sibling, "li"),
        (HtmlProcessor::next_sibling, "li"),
        (HtmlProcessor::first_child, "img"),
        (HtmlProcessor::next_sibling, "details"),
        (HtmlProcessor::first_child, "summary"),
        (HtmlProcessor::next_sibling, "ul"),
        (HtmlProcessor::first_child, "li"),
        (HtmlProcessor::next_sibling, "li"),
        (HtmlProcessor::next_sibling, "li"),
    ];
    for (step, tag) in moves {
        assert!(step(&mut p));
        assert_eq!(p.get_tag(), Some(tag));
    }
    assert!(p.get_attribute("this-one").is_some());
    assert_eq!(
        p.get_breadcrumbs(),
        vec!["main", "ul", "li", "details", "ul", "li"]
    );
}

#[test]
fn reads_inner_content() {
    let cases = [
        ("<!-- when will this start? --><div start>", "text", "</div>"),
        ("<div start>", "text", "</div>"),
        (
            "<div start>",
            "<ul><li>One</li><li><strong>Two<img></strong></li></ul>",
            "</div>",
        ),
        (
            "<main>\n  <ul>\n    <li>\n      <img src=\"yum.avif\">\n      <details start>",
            "\n        <summary>Kirschtorte</summary>\n        <ul>\n          <li>Flour</li>\n        </ul>\n",
            "</details>\n    </li>\n  </ul>\n</main>",
        ),
    ];
    for (before, inner, after) in cases {
        let html = format!("{before}{inner}{after}");
        let mut p = at_start(&html);
        assert_eq!(p.get_inner_content().as_deref(), Some(inner), "{html}");
        // Reading leaves the processor on the opener.
        assert!(p.get_attribute("start").is_some());
    }
}

#[test]
fn reads_outer_content() {
    let cases = [
        (
            "<!-- when will this start? -->",
            "<div start>text</div>",
            "when will it end?",
        ),
        ("", "<div start>text</div>", ""),
        (
            "<div>",
            "<ul start><li>One</li><li><strong>Two<img></strong></li></ul>",
            "</div>",
        ),
    ];
    for (before, outer, after) in cases {
        let html = format!("{before}{outer}{after}");
        let mut p = at_start(&html);
        assert_eq!(p.get_outer_content().as_deref(), Some(outer), "{html}");
    }
}

#[test]
fn void_elements_have_no_content() {
    let mut p = at_start("<div><img start></div>");
    assert_eq!(p.get_inner_content(), None);
    assert_eq!(p.get_outer_content(), None);
    assert!(!p.set_inner_content("text"));
    assert_eq!(p.get_tag(), Some("img"));
}

#[test]
fn replaces_inner_content() {
    let cases = [
        ("before", "<div start>", "boring text", "exciting text", "</div>", "after"),
        (
            "<div><ul>",
            "<li start>",
            "<p><img>This is <strong>neat</strong></p>",
            "this<br>is<br>not",
            "</li>",
            "</ul></div>",
        ),
    ];
    for (before, open, old, new, close, after) in cases {
        let mut p = at_start(&format!("{before}{open}{old}{close}{after}"));
        let tag = p.get_tag().map(str::to_owned);
        assert!(p.set_inner_content(new));
        assert_eq!(p.get_updated_html(), format!("{before}{open}{new}{close}{after}"));

        // Still on the opener, and reads see the rewritten markup.
        assert_eq!(p.get_tag().map(str::to_owned), tag);
        assert!(!p.is_tag_closer());
        assert_eq!(p.get_outer_content(), Some(format!("{open}{new}{close}")));

        assert!(p.set_inner_content("second"));
        assert_eq!(p.get_inner_content().as_deref(), Some("second"));
        assert_eq!(p.get_updated_html(), format!("{before}{open}second{close}{after}"));
    }
}

#[test]
fn replaces_text_inside_raw_text_and_rcdata_elements() {
    let cases = [
        ("<div><script start>old()</script></div>", "if (a<b) run()"),
        ("<div><style start>p {}</style></div>", "a > b < c {}"),
        ("<form><textarea start>old</textarea></form>", "x <y"),
        ("<head><title start>Old</title></head>", "<p>not markup here"),
        ("<xmp start></xmp>", "</xm> <b>"),
    ];
    for (html, new) in cases {
        let mut p = at_start(html);
        assert!(p.set_inner_content(new), "{html:?} refused {new:?}");
        assert_eq!(p.get_inner_content().as_deref(), Some(new));
    }
}

#[test]
fn rejects_text_that_closes_a_raw_text_element_early() {
    let cases = [
        ("<script start>old()</script>", "x</SCRIPT >y"),
        ("<script start>old()</script>", "<!--<script>"),
        ("<title start>Old</title>", "a</title>b"),
        ("<textarea start>old</textarea>", "</TextArea\n"),
    ];
    for (html, new) in cases {
        let mut p = at_start(html);
        assert!(!p.set_inner_content(new), "{html:?} accepted {new:?}");
        assert_eq!(p.get_updated_html(), html);
    }
}

#[test]
fn replaces_outer_content() {
    let cases = [
        ("", "<div start>boring text</div>", "exciting text", ""),
        (
            "<div><ul>",
            "<li start><p><img>This is <strong>neat</strong></p></li>",
            "<li>this is<br>not</li>",
            "<li></li></ul></div>",
        ),
    ];
    for (before, old, new, after) in cases {
        let mut p = at_start(&format!("{before}{old}{after}"));
        assert!(p.set_outer_content(new));
        assert_eq!(p.get_updated_html(), format!("{before}{new}{after}"));
    }
}

#[test]
fn next_tag_after_outer_replacement_visits_new_markup() {
    let mut p = at_start("<div><p start>old</p><hr></div>");
    assert!(p.set_outer_content("<section new>fresh</section>"));
    assert!(p.next_tag());
    assert_eq!(p.get_tag(), Some("section"));
    assert!(p.get_attribute("new").is_some());
}

#[test]
fn rejects_unbalanced_replacement() {
    let html = "<div start>text</div>";
    let mut p = at_start(html);
    assert!(!p.set_inner_content("<p>unclosed"));
    assert!(!p.set_outer_content("</div>"));
    assert_eq!(p.get_updated_html(), html);
}

#[test]
fn bookmarks_survive_content_edits() {
    let mut p = at_start("<div><p start>one</p><p mark>two</p></div>");
    assert!(p.set_bookmark("start"));
    assert!(p.next_sibling());
    assert!(p.set_bookmark("mark"));

    assert!(p.seek("start"));
    assert!(p.get_attribute("start").is_some());
    assert_eq!(p.get_breadcrumbs(), vec!["div", "p"]);
    assert!(p.set_inner_content("uno, uno"));

    assert!(p.seek("mark"));
    assert!(p.get_attribute("mark").is_some());
    assert_eq!(p.get_breadcrumbs(), vec!["div", "p"]);
    assert_eq!(
        p.get_updated_html(),
        "<div><p start>uno, uno</p><p mark>two</p></div>"
    );
}

#[test]
fn seek_backwards_rebuilds_open_elements() {
    let mut p = HtmlProcessor::new("<ul><li one>a</li></ul><div><p two></p></div>");
    while p.get_attribute("one").is_none() {
        assert!(p.next_tag());
    }
    assert!(p.set_bookmark("one"));
    while p.get_attribute("two").is_none() {
        assert!(p.next_tag());
    }
    assert_eq!(p.get_breadcrumbs(), vec!["div", "p"]);

    assert!(p.seek("one"));
    assert_eq!(p.get_tag(), Some("li"));
    assert_eq!(p.get_breadcrumbs(), vec!["ul", "li"]);
    assert!(!p.seek("never-set"));
}

#[test]
fn seek_budget_is_enforced() {
    let config = ProcessorConfig {
        max_seek_ops: 1,
        ..ProcessorConfig::default()
    };
    let mut p = HtmlProcessor::with_config("<div mark></div><hr>", config);
    assert!(p.next_tag());
    assert!(p.set_bookmark("mark"));
    assert!(p.next_tag());
    assert!(p.seek("mark"));
    assert!(!p.seek("mark"));
    assert_eq!(p.last_error(), Some(&ProcessorError::ExceededMaxSeeks));
}

#[test]
fn steps_through_a_document() {
    let mut p = create_document("<!DOCTYPE html><title>x</title><p>One<p>Two", "UTF-8")
        .expect("document");
    assert_eq!(p.insertion_mode(), InsertionMode::Initial);

    step_through(&mut p, 2);
    assert_eq!(p.get_breadcrumbs(), vec!["html", "head", "title"]);
    assert_eq!(p.insertion_mode(), InsertionMode::Text);

    // Title text travels with the start tag; the next token is its closer.
    step_through(&mut p, 2);
    assert_eq!(p.get_tag(), Some("p"));
    assert_eq!(p.get_breadcrumbs(), vec!["html", "body", "p"]);
    assert_eq!(p.insertion_mode(), InsertionMode::InBody);

    step_through(&mut p, 2);
    assert_eq!(p.get_breadcrumbs(), vec!["html", "body", "p"]);
    let closed: Vec<&str> = p.closed_by_last_step().iter().map(|e| e.tag()).collect();
    assert_eq!(closed, vec!["p"]);
    assert!(p.closed_by_last_step()[0].flags.is_closer);

    step_through(&mut p, 1);
    assert!(!p.step(StepAction::Advance));
    assert_eq!(p.last_error(), None);
    assert_eq!(p.get_current_depth(), 0);
}

#[test]
fn rejects_unknown_encodings_and_bad_contexts() {
    assert!(create_document("<p>", "ISO-8859-1").is_none());
    assert!(create_fragment("<p>", "<body>", "windows-1252").is_none());
    assert!(create_fragment("<p>", "body", "UTF-8").is_none());
    assert!(create_fragment("<p>", "</body>", "UTF-8").is_none());
}

#[test]
fn fragment_starts_inside_the_context() {
    let p = body_fragment("<p>");
    assert_eq!(p.get_breadcrumbs(), vec!["html"]);
    assert_eq!(p.insertion_mode(), InsertionMode::InBody);
}

#[test]
fn block_elements_close_open_paragraphs() {
    let mut p = body_fragment("<p>One<div>Two</div>");
    let crumbs = step_to_end(&mut p);
    assert_eq!(crumbs[2], vec!["html", "div"]);
    assert_eq!(p.last_error(), None);
}

#[test]
fn list_items_close_their_open_siblings() {
    let mut p = body_fragment("<ul><li>One<li>Two");
    step_through(&mut p, 4);
    assert_eq!(p.get_breadcrumbs(), vec!["html", "ul", "li"]);
    let closed: Vec<&str> = p.closed_by_last_step().iter().map(|e| e.tag()).collect();
    assert_eq!(closed, vec!["li"]);

    let mut p = body_fragment("<dl><dt>Term<dd>Definition<dt>Next");
    step_through(&mut p, 6);
    assert_eq!(p.get_breadcrumbs(), vec!["html", "dl", "dt"]);
}

#[test]
fn headings_do_not_nest() {
    let mut p = body_fragment("<h1>One<h2>Two</h3>after");
    step_through(&mut p, 3);
    assert_eq!(p.get_breadcrumbs(), vec!["html", "h2"]);
    step_through(&mut p, 2);
    assert_eq!(p.get_breadcrumbs(), vec!["html"]);
}

#[test]
fn stray_p_end_tag_opens_and_closes_an_empty_p() {
    let mut p = body_fragment("<div></p></div>");
    step_through(&mut p, 2);
    assert_eq!(p.get_breadcrumbs(), vec!["html", "div"]);
    let closed: Vec<&str> = p.closed_by_last_step().iter().map(|e| e.tag()).collect();
    assert_eq!(closed, vec!["p"]);
}

#[test]
fn reconstructs_implicitly_closed_formatting_elements() {
    let mut p = body_fragment("<p><b>bold<p>again");
    step_through(&mut p, 4);
    assert_eq!(p.get_breadcrumbs(), vec!["html", "p"]);
    step_through(&mut p, 1);
    assert_eq!(p.get_breadcrumbs(), vec!["html", "p", "b"]);
}

#[test]
fn misnested_formatting_closes_and_reopens() {
    let mut p = body_fragment("<b><i>x</b>y");
    step_through(&mut p, 4);
    assert_eq!(p.get_breadcrumbs(), vec!["html"]);
    let closed: Vec<&str> = p.closed_by_last_step().iter().map(|e| e.tag()).collect();
    assert_eq!(closed, vec!["i", "b"]);
    step_through(&mut p, 1);
    assert_eq!(p.get_breadcrumbs(), vec!["html", "i"]);
}

#[test]
fn noahs_ark_keeps_three_identical_entries() {
    let mut p = body_fragment("<p><b><b><b><b>text");
    step_through(&mut p, 6);
    assert_eq!(p.state.active_formatting.len(), 3);

    let mut p = body_fragment("<p><b><b class=x><b><b>text");
    step_through(&mut p, 6);
    assert_eq!(p.state.active_formatting.len(), 4);
}

#[test]
fn nested_anchor_closes_the_outer_one() {
    let mut p = body_fragment("<a href=1>one<a href=2>two");
    step_through(&mut p, 3);
    assert_eq!(p.get_breadcrumbs(), vec!["html", "a"]);
    assert_eq!(p.state.active_formatting.len(), 1);
    assert_eq!(p.last_error(), None);
}

#[test]
fn halts_on_unsupported_constructs() {
    let mut p = body_fragment("<div><table><tr><td>cell");
    step_through(&mut p, 1);
    assert!(!p.step(StepAction::Advance));
    assert_eq!(
        p.last_error(),
        Some(&ProcessorError::Unsupported(UnsupportedConstruct::Subtree(
            "table".into()
        )))
    );
    assert!(!p.step(StepAction::Advance));
    assert_eq!(p.get_breadcrumbs(), vec!["html", "div"]);

    let mut p = body_fragment("<b><p>x</b>");
    step_through(&mut p, 3);
    assert!(!p.step(StepAction::Advance));
    assert_eq!(
        p.last_error(),
        Some(&ProcessorError::Unsupported(
            UnsupportedConstruct::AdoptionAgency("b".into())
        ))
    );
}

#[test]
fn truncated_input_is_an_error() {
    let mut p = body_fragment("<div><span");
    step_through(&mut p, 1);
    assert!(!p.step(StepAction::Advance));
    assert_eq!(p.last_error(), Some(&ProcessorError::IncompleteInput));
}

#[test]
fn rcdata_context_produces_only_text() {
    let mut p = create_fragment("<p>not a tag</p>", "<title>", "UTF-8").expect("fragment");
    let crumbs = step_to_end(&mut p);
    assert!(crumbs.iter().all(|crumbs| crumbs == &["html"]));
    assert_eq!(p.last_error(), None);
}

#[test]
fn seek_replays_tree_construction() {
    let mut p = body_fragment("<div><p mark>one</p><p>two</p></div>");
    while p.get_attribute("mark").is_none() {
        assert!(p.step(StepAction::Advance));
    }
    assert!(p.set_bookmark("mark"));
    step_to_end(&mut p);
    assert_eq!(p.get_current_depth(), 0);

    assert!(p.seek("mark"));
    assert!(p.get_attribute("mark").is_some());
    assert_eq!(p.get_breadcrumbs(), vec!["html", "div", "p"]);
    step_through(&mut p, 2);
    assert_eq!(p.get_breadcrumbs(), vec!["html", "div"]);
}
