#![no_main]

use html_api::HtmlProcessor;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(html) = std::str::from_utf8(data) else {
        return;
    };
    let mut p = HtmlProcessor::new(html);
    let mut moves = 0usize;
    while p.next_tag() && moves < 4096 {
        moves += 1;
        match moves % 4 {
            0 => {
                p.first_child();
            }
            1 => {
                p.next_sibling();
            }
            2 => {
                let depth = p.get_current_depth();
                let _ = p.get_outer_content();
                assert_eq!(p.get_current_depth(), depth, "reading moved the processor");
            }
            _ => {
                if p.get_tag() == Some("div") {
                    p.set_inner_content("<b>x</b>");
                }
            }
        }
    }
    let _ = p.get_updated_html();
});
