use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use cryptoplay_core::signature::SchemeKind;
use cryptoplay_core::speed::DEFAULT_MESSAGE;
use std::hint::black_box;

fn bench_sign(c: &mut Criterion) {
    let message = DEFAULT_MESSAGE.as_bytes();
    let mut group = c.benchmark_group("sign");
    for scheme in SchemeKind::ALL {
        let pair = scheme.generate().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(scheme), &pair, |b, pair| {
            b.iter(|| scheme.sign(pair.secret(), black_box(message)).unwrap())
        });
    }
    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let message = DEFAULT_MESSAGE.as_bytes();
    let mut group = c.benchmark_group("verify");
    for scheme in SchemeKind::ALL {
        let pair = scheme.generate().unwrap();
        let signature = scheme.sign(pair.secret(), message).unwrap();
        group.bench_function(BenchmarkId::from_parameter(scheme), |b| {
            b.iter(|| {
                scheme
                    .verify(pair.public(), black_box(message), black_box(&signature))
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sign, bench_verify);
criterion_main!(benches);
