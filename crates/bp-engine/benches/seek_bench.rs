//! Seek and evaluation throughput.
//!
//! Sequential playback should stay on the O(1) stay/advance paths; random
//! access pays for a scan from the head.

use bp_engine::{AdsrEnvelope, Envelope};
use bp_ir::{Breakpoint, BreakpointChain, InterpKind};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

const SAMPLE_RATE: f64 = 48_000.0;
const SAMPLES_PER_SECOND: usize = SAMPLE_RATE as usize;

/// 64 segments cycling through every indexed law over one second.
fn mixed_envelope() -> Envelope {
    let n = 64;
    let chain = BreakpointChain::from_breakpoints((0..=n).map(|i| {
        let t0 = i as f64 / n as f64;
        let t1 = (i + 1) as f64 / n as f64;
        let value = 0.1 + 0.9 * ((i * 7) % 11) as f64 / 10.0;
        let kind = InterpKind::INDEXED[i % InterpKind::INDEXED.len()];
        let cubic = [t0 + (t1 - t0) * 0.2, 0.9, t0 + (t1 - t0) * 0.7, 0.1];
        let quadratic = [(t0 + t1) / 2.0, 0.5];
        match kind {
            InterpKind::QuadraticBezier => Breakpoint::with_params(t0, value, kind, &quadratic),
            InterpKind::CubicBezier => Breakpoint::with_params(t0, value, kind, &cubic),
            _ => Breakpoint::new(t0, value, kind),
        }
    }));
    Envelope::from_chain(chain)
}

fn bench_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("seek");
    group.throughput(Throughput::Elements(SAMPLES_PER_SECOND as u64));

    group.bench_function("sequential_1s", |b| {
        let mut env = mixed_envelope();
        b.iter(|| {
            let mut acc = 0.0;
            for i in 0..SAMPLES_PER_SECOND {
                acc += env.value_at(i as f64 / SAMPLE_RATE);
            }
            black_box(acc)
        })
    });

    group.bench_function("strided_random_1s", |b| {
        let mut env = mixed_envelope();
        b.iter(|| {
            let mut acc = 0.0;
            for i in 0..SAMPLES_PER_SECOND {
                let t = ((i * 7919) % SAMPLES_PER_SECOND) as f64 / SAMPLE_RATE;
                acc += env.value_at(t);
            }
            black_box(acc)
        })
    });

    group.finish();
}

fn bench_adsr(c: &mut Criterion) {
    let mut group = c.benchmark_group("adsr");
    group.throughput(Throughput::Elements(SAMPLES_PER_SECOND as u64));

    group.bench_function("trigger_release_1s", |b| {
        let mut adsr = AdsrEnvelope::new(0.1, 0.2, 0.7, 0.5);
        b.iter(|| {
            adsr.reset();
            let mut acc = 0.0;
            for i in 0..SAMPLES_PER_SECOND / 2 {
                acc += adsr.value_at(i as f64 / SAMPLE_RATE);
            }
            adsr.release(0.5);
            for i in SAMPLES_PER_SECOND / 2..SAMPLES_PER_SECOND {
                acc += adsr.value_at(i as f64 / SAMPLE_RATE);
            }
            black_box(acc)
        })
    });

    group.bench_function("display_preview_512", |b| {
        let adsr = AdsrEnvelope::new(0.1, 0.2, 0.7, 0.5);
        b.iter(|| black_box(adsr.sample_curve(512, 1.0)))
    });

    group.finish();
}

criterion_group!(benches, bench_sequential, bench_adsr);
criterion_main!(benches);
