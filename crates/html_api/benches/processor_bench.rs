use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use html_api::{HtmlProcessor, StepAction, TagProcessor, TagQuery, create_fragment};

const SMALL_BLOCKS: usize = 64;
const LARGE_BLOCKS: usize = 20_000;

fn make_blocks(count: usize) -> String {
    let block = "<div class=box><p>hello <b>world</b><img src=x></p></div>";
    let mut html = String::with_capacity(block.len() * count);
    for _ in 0..count {
        html.push_str(block);
    }
    html
}

fn bench_scan_tags_large(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    c.bench_function("bench_scan_tags_large", |b| {
        b.iter(|| {
            let mut tags = TagProcessor::new(black_box(&input));
            let mut count = 0usize;
            while tags.next_tag(TagQuery::VISIT_CLOSERS) {
                count += 1;
            }
            black_box(count);
        });
    });
}

fn bench_navigate_small(c: &mut Criterion) {
    let input = make_blocks(SMALL_BLOCKS);
    c.bench_function("bench_navigate_small", |b| {
        b.iter(|| {
            let mut p = HtmlProcessor::new(black_box(&input));
            let mut depth = 0usize;
            while p.next_tag() {
                depth = depth.max(p.get_current_depth());
            }
            black_box(depth);
        });
    });
}

fn bench_step_large(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    c.bench_function("bench_step_large", |b| {
        b.iter_batched(
            || create_fragment(&input, "<body>", "UTF-8").expect("fragment"),
            |mut p| {
                while p.step(StepAction::Advance) {}
                black_box(p.last_error().is_none());
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_set_inner_content(c: &mut Criterion) {
    let input = make_blocks(SMALL_BLOCKS);
    c.bench_function("bench_set_inner_content", |b| {
        b.iter_batched(
            || HtmlProcessor::new(&input),
            |mut p| {
                while p.next_tag() {
                    if p.get_tag() == Some("p") && !p.is_tag_closer() {
                        p.set_inner_content("bye");
                    }
                }
                black_box(p.get_updated_html().len());
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_scan_tags_large,
    bench_navigate_small,
    bench_step_large,
    bench_set_inner_content
);
criterion_main!(benches);
