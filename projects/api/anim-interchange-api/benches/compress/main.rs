use anim_interchange_api::{
    compress_into, decompress_track, decompress_tracks, InterchangeSettings,
};
use anim_interchange_common::allocate::allocate_aligned;
use anim_interchange_common::{
    AlignedAllocator, SampleRoundingPolicy, QVVF_ALIGNMENT, QVVF_SIZE,
};
use core::time::Duration;
use criterion::{criterion_group, criterion_main, Criterion};

const NUM_BONES: usize = 64;
const NUM_SAMPLES: usize = 120;

fn f64_bytes(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_ne_bytes()).collect()
}

/// A chain of bones swaying around Z, 30 samples per second.
fn chain_inputs() -> (Vec<u8>, Vec<u8>) {
    let mut metadata = vec![NUM_BONES as f64, 0.0, NUM_SAMPLES as f64, 30.0];
    for bone in 0..NUM_BONES {
        let parent = bone as f64 - 1.0;
        metadata.extend([-1.0, parent, 0.01, 3.0, 0.001, 0.001, 0.000_01]);
    }

    let mut raw = Vec::with_capacity(NUM_BONES * NUM_SAMPLES * 10);
    for bone in 0..NUM_BONES {
        for sample in 0..NUM_SAMPLES {
            let half_angle = 0.25 * (sample as f64 * 0.1 + bone as f64).sin();
            raw.extend([
                0.0,
                0.0,
                half_angle.sin(),
                half_angle.cos(),
                1.0,
                0.0,
                0.0,
                1.0,
                1.0,
                1.0,
            ]);
        }
    }
    (f64_bytes(&metadata), f64_bytes(&raw))
}

fn criterion_benchmark(c: &mut Criterion) {
    let (metadata, raw) = chain_inputs();
    let settings = InterchangeSettings::default();
    let mut blob = vec![0u8; raw.len()];

    let mut group = c.benchmark_group("Interchange");
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(10));

    group.throughput(criterion::Throughput::Bytes(raw.len() as u64));
    group.bench_function("compress chain", |b| {
        b.iter(|| compress_into(&metadata, &raw, &mut blob, &settings, &AlignedAllocator).unwrap())
    });

    let size = compress_into(&metadata, &raw, &mut blob, &settings, &AlignedAllocator).unwrap();
    let blob = &blob[..size];
    let mut pose = allocate_aligned(QVVF_SIZE * NUM_BONES, QVVF_ALIGNMENT).unwrap();

    group.throughput(criterion::Throughput::Elements(NUM_BONES as u64));
    group.bench_function("decompress pose", |b| {
        b.iter(|| {
            decompress_tracks(blob, 1.37, SampleRoundingPolicy::None, pose.as_mut_slice())
                .unwrap()
        })
    });

    group.throughput(criterion::Throughput::Elements(1));
    group.bench_function("decompress single bone", |b| {
        b.iter(|| {
            decompress_track(
                blob,
                1.37,
                SampleRoundingPolicy::Nearest,
                (NUM_BONES - 1) as u32,
                &mut pose.as_mut_slice()[..QVVF_SIZE],
            )
            .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
