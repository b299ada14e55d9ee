//! Bidirectional resolution and shaping performance benchmarks.

use arbsh::unicode::{classify, process, resolve, shape};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn classify_chars(c: &mut Criterion) {
    let mixed = "The quick سلام עליכם 12345 (brown) fox";

    c.bench_function("classify_mixed_line", |b| {
        b.iter(|| {
            for ch in black_box(mixed).chars() {
                black_box(classify(ch));
            }
        });
    });
}

fn resolve_levels(c: &mut Criterion) {
    let ascii = "plain left to right text with numbers 12345 and punctuation.";
    c.bench_function("resolve_ascii", |b| {
        b.iter(|| resolve(black_box(ascii), -1));
    });

    let mixed = "start \u{05D0}\u{05D1}\u{05D2} middle \u{0627}\u{0644}\u{0633}\u{0644}\u{0627}\u{0645} 123 (end)";
    c.bench_function("resolve_mixed", |b| {
        b.iter(|| resolve(black_box(mixed), -1));
    });

    let nested = "a\u{2067}b\u{2066}c\u{05D0}\u{2069}d\u{2069}e".repeat(8);
    c.bench_function("resolve_nested_isolates", |b| {
        b.iter(|| resolve(black_box(&nested), -1));
    });
}

fn reorder(c: &mut Criterion) {
    let mixed = "abc \u{05D0}\u{05D1}\u{05D2} def \u{0627}\u{0628} 123".repeat(4);
    c.bench_function("process_mixed_paragraph", |b| {
        b.iter(|| process(black_box(&mixed), -1));
    });
}

fn shaping(c: &mut Criterion) {
    let arabic = "\u{0628}\u{0633}\u{0645} \u{0627}\u{0644}\u{0644}\u{0647} \
                  \u{0627}\u{0644}\u{0631}\u{062D}\u{0645}\u{0646}";
    c.bench_function("shape_arabic_phrase", |b| {
        b.iter(|| shape(black_box(arabic)));
    });

    let ascii = "no arabic content here at all, just latin text";
    c.bench_function("shape_ascii_passthrough", |b| {
        b.iter(|| shape(black_box(ascii)));
    });
}

criterion_group!(benches, classify_chars, resolve_levels, reorder, shaping);
criterion_main!(benches);
