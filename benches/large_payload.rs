use charset_detector_rs::detect;
use criterion::BenchmarkId;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

pub fn large_payload(c: &mut Criterion) {
    let mut payload = "To jest test wydajności. Zażółć gęślą jaźń.\n"
        .repeat(25_000)
        .into_bytes();
    payload.extend("我没有埋怨，磋砣的只是一些时间。".as_bytes());
    c.bench_with_input(BenchmarkId::new("large_utf8", ""), &payload, |b, s| {
        b.iter(|| black_box(detect(s)));
    });

    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let binary: Vec<u8> = (0..1_000_000)
        .map(|_| {
            state ^= state >> 12;
            state ^= state << 25;
            state ^= state >> 27;
            (state.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 56) as u8
        })
        .collect();
    c.bench_with_input(BenchmarkId::new("binary_1mb", ""), &binary, |b, s| {
        b.iter(|| black_box(detect(s)));
    });
}

criterion_group!(benches, large_payload);
criterion_main!(benches);
