use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dmr_core::constants::BURST_BYTES;
use dmr_core::fec::{bptc196, golay, hamming, qr};

fn benchmark_hamming(c: &mut Criterion) {
    let mut group = c.benchmark_group("hamming");

    group.bench_function("encode_13_9", |b| {
        let mut word = vec![false; hamming::HAMMING_13_9_3.n];
        for (i, bit) in word.iter_mut().take(hamming::HAMMING_13_9_3.k).enumerate() {
            *bit = i % 2 == 0;
        }
        b.iter(|| {
            let mut word = word.clone();
            hamming::HAMMING_13_9_3.encode(black_box(&mut word));
            black_box(word)
        });
    });

    let mut codeword = vec![false; hamming::HAMMING_13_9_3.n];
    for (i, bit) in codeword.iter_mut().take(hamming::HAMMING_13_9_3.k).enumerate() {
        *bit = i % 2 == 0;
    }
    hamming::HAMMING_13_9_3.encode(&mut codeword);
    group.bench_function("decode_13_9", |b| {
        b.iter(|| {
            let mut word = codeword.clone();
            hamming::HAMMING_13_9_3.decode(black_box(&mut word)).unwrap();
            black_box(word)
        });
    });

    group.finish();
}

fn benchmark_golay(c: &mut Criterion) {
    let mut group = c.benchmark_group("golay_20_8");

    group.bench_function("encode", |b| {
        b.iter(|| black_box(golay::encode(black_box(0x5a))));
    });

    let codeword = golay::encode(0x5a);
    group.bench_function("decode", |b| {
        b.iter(|| black_box(golay::decode(black_box(codeword))));
    });

    group.finish();
}

fn benchmark_qr(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadratic_residue_16_7");

    group.bench_function("encode", |b| {
        b.iter(|| black_box(qr::encode(black_box(0x2a))));
    });

    let codeword = qr::encode(0x2a);
    group.bench_function("decode", |b| {
        b.iter(|| black_box(qr::decode(black_box(codeword))));
    });

    group.finish();
}

fn benchmark_bptc196(c: &mut Criterion) {
    let mut group = c.benchmark_group("bptc_196_96");

    let data: [bool; 96] = std::array::from_fn(|i| i % 3 == 0);
    group.bench_function("encode", |b| {
        b.iter(|| black_box(bptc196::encode(black_box(&data))));
    });

    let info = bptc196::encode(&data);
    group.bench_function("decode", |b| {
        b.iter(|| black_box(bptc196::decode(black_box(&info))));
    });

    group.finish();
}

fn benchmark_burst_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("burst_info_bits");

    let sizes = [BURST_BYTES];
    for size in sizes {
        group.bench_with_input(BenchmarkId::new("info_bits", size), &size, |b, _| {
            let burst = dmr_core::burst::Burst::new();
            b.iter(|| black_box(burst.info_bits()));
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(200);
    targets = benchmark_hamming, benchmark_golay, benchmark_qr, benchmark_bptc196, benchmark_burst_roundtrip
}
criterion_main!(benches);
