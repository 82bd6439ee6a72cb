use criterion::{Criterion, criterion_group, criterion_main};
use nostr_content_engine::matching::{MatchContext, match_text};
use nostr_content_engine::{Block, Doc, Event, MatchSession, Operation, parse_content};
mod common;

fn bench_match_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("matching");
    group.sample_size(20);
    let ctx = MatchContext::default();

    let note = common::generate_note(200);
    group.bench_function("note_200_lines", |b| {
        b.iter(|| std::hint::black_box(match_text(std::hint::black_box(&note), &ctx)));
    });

    let adversarial = common::generate_adversarial(64 * 1024);
    group.bench_function("adversarial_64k", |b| {
        b.iter(|| std::hint::black_box(match_text(std::hint::black_box(&adversarial), &ctx)));
    });

    group.finish();
}

fn bench_parse_content(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_content");
    group.sample_size(20);

    let event = Event::text_note(common::generate_note(200));
    group.bench_function("text_note", |b| {
        b.iter(|| std::hint::black_box(parse_content(std::hint::black_box(&event), None, None)));
    });

    group.finish();
}

/// One keystroke at the end of a long paragraph should cost about the
/// same as one in a short one.
fn bench_keystroke(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental");
    group.sample_size(20);
    let session = MatchSession::default();

    let doc = Doc::new(vec![Block::paragraph_text(&common::generate_note(200).replace('\n', " "))]);
    let at = doc.content_size() - 1;
    group.bench_function("keystroke_long_paragraph", |b| {
        b.iter(|| {
            let patch = doc
                .apply(&[Operation::InsertText {
                    at,
                    text: "x".into(),
                }])
                .unwrap();
            std::hint::black_box(session.on_edit(&doc, &patch.transform, &patch.doc));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_match_text, bench_parse_content, bench_keystroke);
criterion_main!(benches);
