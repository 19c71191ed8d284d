use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mysterd::game::{self, AttemptState};
use mysterd::score::{self, Digits};

fn bench_digits_from_number(c: &mut Criterion) {
    c.bench_function("digits_from_number(4271)", |b| {
        b.iter(|| Digits::from_number(black_box(4271)));
    });
}

fn bench_parse_guess(c: &mut Criterion) {
    c.bench_function("parse_guess(\"0042\")", |b| {
        b.iter(|| score::parse_guess(black_box("0042")));
    });
}

fn bench_score_miss(c: &mut Criterion) {
    // Mixed case: one bull, two cows
    let guess = Digits::from_number(1234).unwrap();
    let target = Digits::from_number(4271).unwrap();
    c.bench_function("score(1234, 4271)", |b| {
        b.iter(|| score::score(black_box(guess), black_box(target)));
    });
}

fn bench_score_exact(c: &mut Criterion) {
    let target = Digits::from_number(9999).unwrap();
    c.bench_function("score(9999, 9999)", |b| {
        b.iter(|| score::score(black_box(target), black_box(target)));
    });
}

fn bench_evaluate_guess(c: &mut Criterion) {
    let guess = Digits::from_number(1234).unwrap();
    let target = Digits::from_number(4271).unwrap();
    c.bench_function("evaluate_guess(fresh miss)", |b| {
        b.iter(|| {
            game::evaluate_guess(
                black_box(AttemptState::new()),
                black_box(guess),
                black_box(target),
                black_box(3),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_digits_from_number,
    bench_parse_guess,
    bench_score_miss,
    bench_score_exact,
    bench_evaluate_guess,
);
criterion_main!(benches);
