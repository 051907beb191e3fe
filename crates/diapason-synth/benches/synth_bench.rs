//! Criterion benchmarks for diapason-synth
//!
//! Run with: cargo bench -p diapason-synth

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use diapason_synth::{Oscillator, SynthEvent, VoicePartition, Waveform};

const SAMPLE_RATE: f32 = 44100.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("Oscillator");

    for (name, waveform) in [
        ("Sine", Waveform::Sine),
        ("Triangle", Waveform::Triangle),
        ("Saw", Waveform::Saw),
        ("Square", Waveform::Square),
    ] {
        for &block_size in BLOCK_SIZES {
            let mut osc = Oscillator::new(SAMPLE_RATE);
            osc.set_frequency(220.0);
            osc.set_waveform(waveform);

            group.bench_with_input(BenchmarkId::new(name, block_size), &block_size, |b, &size| {
                b.iter(|| {
                    let mut sum = 0.0f32;
                    for _ in 0..size {
                        sum += osc.advance();
                    }
                    black_box(sum)
                })
            });
        }
    }

    group.finish();
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("VoicePartition");

    for &block_size in BLOCK_SIZES {
        let mut partition = VoicePartition::primary(SAMPLE_RATE);
        partition.apply(&SynthEvent::note_on(0, 55));
        partition.apply(&SynthEvent::note_on(1, 50));
        let mut frames = vec![0.0f32; block_size * 2];

        group.bench_with_input(
            BenchmarkId::new("two_voices", block_size),
            &block_size,
            |b, _| {
                b.iter(|| {
                    partition.render(&mut frames);
                    black_box(frames[0])
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_oscillator, bench_partition);
criterion_main!(benches);
