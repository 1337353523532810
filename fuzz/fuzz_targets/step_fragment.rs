#![no_main]

use html_api::{StepAction, create_document, create_fragment};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(html) = std::str::from_utf8(data) else {
        return;
    };
    let processors = [
        create_document(html, "UTF-8"),
        create_fragment(html, "<body>", "UTF-8"),
        create_fragment(html, "<textarea>", "UTF-8"),
    ];
    for mut p in processors.into_iter().flatten() {
        let mut steps = 0usize;
        while p.step(StepAction::Advance) {
            steps += 1;
            assert!(steps <= html.len() + 1, "more steps than input bytes");
            assert!(p.get_current_depth() <= p.open_elements().max_depth());
        }
        if p.last_error().is_none() {
            assert_eq!(p.get_current_depth(), 0, "elements left open at end of input");
        }
    }
});
