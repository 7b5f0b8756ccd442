use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shac::sphharm::{num_channels, Normalization, SphHarm};
use shac::Rotator;

fn bench_rotation_for_cache_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("rotator_cache_miss");

    for order in [1usize, 3, 5, 7] {
        group.bench_with_input(BenchmarkId::new("order", order), &order, |b, &order| {
            let mut rotator = Rotator::new(order);
            let mut angle = 0.0f32;
            b.iter(|| {
                angle += 0.01;
                black_box(rotator.rotation_for(black_box(angle), black_box(0.3)));
            });
        });
    }

    group.finish();
}

fn bench_rotation_for_cache_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("rotator_cache_hit");

    for order in [1usize, 3, 5, 7] {
        group.bench_with_input(BenchmarkId::new("order", order), &order, |b, &order| {
            let mut rotator = Rotator::new(order);
            rotator.rotation_for(0.5, 0.2);
            b.iter(|| {
                black_box(rotator.rotation_for(black_box(0.5), black_box(0.2)));
            });
        });
    }

    group.finish();
}

fn bench_rotate(c: &mut Criterion) {
    let mut group = c.benchmark_group("rotator_apply");

    for order in [1usize, 3, 5, 7] {
        group.throughput(Throughput::Elements(num_channels(order) as u64));
        group.bench_with_input(BenchmarkId::new("order", order), &order, |b, &order| {
            let sh = SphHarm::new(order, Normalization::Sn3d);
            let mut channels = vec![0.0f32; num_channels(order)];
            sh.eval_all(0.4, -0.2, &mut channels);

            let mut rotator = Rotator::new(order);
            let matrices = rotator.rotation_for(0.9, 0.4).to_vec();
            let mut scratch_in = vec![0.0f32; shac::rotator::MAX_DEGREE_BLOCK];
            let mut scratch_out = vec![0.0f32; shac::rotator::MAX_DEGREE_BLOCK];

            b.iter(|| {
                shac::rotator::rotate(
                    black_box(&matrices),
                    black_box(&mut channels),
                    &mut scratch_in,
                    &mut scratch_out,
                );
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_rotation_for_cache_miss,
    bench_rotation_for_cache_hit,
    bench_rotate
);
criterion_main!(benches);
