use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shac::sphharm::{num_channels, Normalization, SphHarm};

fn bench_eval_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("sphharm_eval_all");

    for order in [1usize, 3, 5, 7] {
        group.throughput(Throughput::Elements(num_channels(order) as u64));
        group.bench_with_input(BenchmarkId::new("order", order), &order, |b, &order| {
            let sh = SphHarm::new(order, Normalization::Sn3d);
            let mut out = vec![0.0f32; num_channels(order)];
            b.iter(|| {
                sh.eval_all(black_box(0.7), black_box(-0.3), &mut out);
                black_box(&out);
            });
        });
    }

    group.finish();
}

fn bench_encode_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("sphharm_encode_block");
    let block_sizes = [128usize, 512, 2048];

    for &frames in &block_sizes {
        group.throughput(Throughput::Elements(frames as u64));
        group.bench_with_input(BenchmarkId::new("frames", frames), &frames, |b, &frames| {
            let encoder = shac::Encoder::new(shac::EncoderConfig::default());
            let mono = vec![0.1f32; frames];
            let mut out = vec![0.0f32; frames * encoder.num_channels()];
            b.iter(|| {
                encoder.encode_mono(
                    black_box(&mono),
                    black_box(shac::Cartesian::new(1.0, 0.0, 2.0)),
                    &mut out,
                );
                black_box(&out);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_eval_all, bench_encode_block);
criterion_main!(benches);
