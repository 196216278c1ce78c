use criterion::{black_box, criterion_group, criterion_main, Criterion};
use phytosample::batch::run_batch;
use phytosample::selection::{seeded_rng, select_random_boxes_with};
use phytosample::stage::{distribute_proportionally, validate_stage_sampling};
use phytosample::{resolve_sample_size, run_sampling, SamplingRequest, TableFamily};

fn bench_resolve_sample_size(c: &mut Criterion) {
    c.bench_function("resolve_sample_size(1200, h6)", |b| {
        b.iter(|| resolve_sample_size(black_box(1200), black_box(TableFamily::Hypergeometric6)));
    });
}

fn bench_select_small_sample(c: &mut Criterion) {
    let mut rng = seeded_rng(1);
    c.bench_function("select_random_boxes(100000, 49)", |b| {
        b.iter(|| select_random_boxes_with(&mut rng, black_box(100_000), black_box(49)).unwrap());
    });
}

fn bench_select_full_lot(c: &mut Criterion) {
    // 3% table inspects every unit up to 900 boxes
    let mut rng = seeded_rng(1);
    c.bench_function("select_random_boxes(900, 900)", |b| {
        b.iter(|| select_random_boxes_with(&mut rng, black_box(900), black_box(900)).unwrap());
    });
}

fn bench_validate_stage(c: &mut Criterion) {
    let boxes: Vec<u32> = (0..40).map(|i| 48 + i % 5).collect();
    let total: u32 = boxes.iter().sum();
    c.bench_function("validate_stage_sampling(40 pallets)", |b| {
        b.iter(|| validate_stage_sampling(black_box(40), black_box(&boxes), black_box(total)));
    });
}

fn bench_distribute(c: &mut Criterion) {
    let boxes: Vec<u32> = (0..40).map(|i| 48 + i % 5).collect();
    let selected: Vec<u32> = (1..=10).map(|i| i * 4).collect();
    c.bench_function("distribute_proportionally(10 of 40)", |b| {
        b.iter(|| distribute_proportionally(black_box(&boxes), black_box(&selected), 49).unwrap());
    });
}

fn bench_staged_request(c: &mut Criterion) {
    let request = SamplingRequest::staged(2000, Some("Durazno"), vec![50; 40]);
    let mut rng = seeded_rng(7);
    c.bench_function("run_sampling(staged, 40 pallets)", |b| {
        b.iter(|| run_sampling(black_box(&request), &mut rng).unwrap());
    });
}

fn bench_batch(c: &mut Criterion) {
    let lots: Vec<SamplingRequest> = (0..256)
        .map(|i| SamplingRequest::simple(500 + i * 37, Some("Manzana")))
        .collect();
    c.bench_function("run_batch(256 lots)", |b| {
        b.iter(|| run_batch(black_box(&lots), Some(1)));
    });
}

criterion_group!(
    benches,
    bench_resolve_sample_size,
    bench_select_small_sample,
    bench_select_full_lot,
    bench_validate_stage,
    bench_distribute,
    bench_staged_request,
    bench_batch,
);
criterion_main!(benches);
