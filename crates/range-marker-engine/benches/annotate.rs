use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use range_marker_engine::{Action, Annotator, HostRange, parse_fragment};

fn generate_fragment(paragraphs: usize) -> String {
    let base = r#"<p>Paragraph with <b>bold</b> text, a <span class="rtm-mark-1">comment</span> and an image <img src="pic.png"> followed by a <span class="ql-formula">x<sup>2</sup></span> formula.</p>"#;
    let mut markup = String::new();
    for _ in 0..paragraphs {
        markup.push_str(base);
        markup.push('\n');
    }
    markup
}

fn bench_cycles(c: &mut Criterion) {
    let mut group = c.benchmark_group("annotate");
    group.sample_size(10);

    let annotator = Annotator::default();
    for paragraphs in [10, 100] {
        let markup = generate_fragment(paragraphs);
        let tree = parse_fragment(&markup).unwrap();
        let text_len = tree.text_content(tree.root()).chars().count();
        let range =
            HostRange::from_char_range(&tree, 5..text_len / 2, annotator.options()).unwrap();
        let apply = Action::apply("rtm-underline");

        group.bench_with_input(BenchmarkId::new("parse", paragraphs), &markup, |b, markup| {
            b.iter(|| std::hint::black_box(parse_fragment(markup).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("apply", paragraphs), &markup, |b, markup| {
            b.iter(|| std::hint::black_box(annotator.run(markup, &range, &apply).unwrap()));
        });

        let applied = annotator
            .run(&markup, &range, &apply)
            .unwrap()
            .markup()
            .map(str::to_string)
            .unwrap_or(markup.clone());
        let applied_tree = parse_fragment(&applied).unwrap();
        let applied_range =
            HostRange::from_char_range(&applied_tree, 5..text_len / 2, annotator.options())
                .unwrap();
        let remove = Action::remove("rtm-underline");
        group.bench_with_input(BenchmarkId::new("remove", paragraphs), &applied, |b, markup| {
            b.iter(|| {
                std::hint::black_box(annotator.run(markup, &applied_range, &remove).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cycles);
criterion_main!(benches);
