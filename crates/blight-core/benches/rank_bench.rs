use blight_core::fuzzy;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::distributions::Alphanumeric;
use rand::prelude::*;
use rand::rngs::SmallRng;

const WORDS: &[&str] = &[
    "Visual", "Studio", "Code", "Notepad", "Firefox", "Terminal", "Paint", "Calculator",
    "Settings", "Explorer", "Chrome", "Spotify", "Discord", "Steam", "Word", "Excel",
    "PowerPoint", "Outlook", "Teams", "Slack", "Zoom", "Blender", "GIMP", "Audacity",
];

fn random_token(rng: &mut SmallRng) -> String {
    let len = rng.gen_range(3..10);
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// App-like names: mostly two or three dictionary words, some noise.
fn generate_catalog(size: usize, rng: &mut SmallRng) -> (Vec<String>, Vec<u32>) {
    let mut names = Vec::with_capacity(size);
    let mut usage = Vec::with_capacity(size);

    for _ in 0..size {
        let words = rng.gen_range(1..=3);
        let mut name: Vec<String> = (0..words)
            .map(|_| WORDS.choose(rng).map_or_else(String::new, |w| w.to_string()))
            .collect();
        if rng.gen_bool(0.3) {
            name.push(random_token(rng));
        }
        names.push(name.join(" "));
        usage.push(if rng.gen_bool(0.1) { rng.gen_range(1..50) } else { 0 });
    }

    (names, usage)
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");
    let mut rng = SmallRng::seed_from_u64(42);

    for size in [100usize, 1_000, 10_000].iter() {
        let (names, usage) = generate_catalog(*size, &mut rng);

        for query in ["code", "vsc", "fire", "zz"] {
            group.bench_with_input(BenchmarkId::new(query, size), size, |b, _| {
                b.iter(|| fuzzy::rank(black_box(query), black_box(&names), black_box(&usage)))
            });
        }
    }

    group.finish();
}

fn bench_empty_query(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(7);
    let (names, usage) = generate_catalog(1_000, &mut rng);

    c.bench_function("rank_empty_query_1000", |b| {
        b.iter(|| fuzzy::rank(black_box(""), black_box(&names), black_box(&usage)))
    });
}

fn bench_score(c: &mut Criterion) {
    c.bench_function("score_subsequence", |b| {
        b.iter(|| fuzzy::score(black_box("vsc"), black_box("Visual Studio Code")))
    });
}

criterion_group!(benches, bench_rank, bench_empty_query, bench_score);
criterion_main!(benches);
