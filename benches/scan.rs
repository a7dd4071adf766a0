use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use zhunt3::{ModelParams, Sequence, WindowRange, WindowScanner};

const SEQ: &[u8] = b"GAAATAGACGCCAAGTTCAATCCGTACTCCGACGTACGATGGAACAGTGTGGATGTGACGAGCTTCATTTATACCCTTCGCGCGCCGGACCGGGGTCCGCAAGGCGCGGCGGTGCACAAGCAATTGACAACTAACCACCGTGTATTCGTTATGGCACCAGGGAGTTTAAGCCGAGTCAATGGAGCTCGCAATACAGAGTT".as_slice();

fn criterion_benchmark(c: &mut Criterion) {
    let params = ModelParams::default();
    let range = WindowRange::new(12, 6, 12);
    let sequence = Sequence::from_bytes(SEQ, range.nucleotides());
    let scanner = WindowScanner::new(&params, range);

    c.bench_function("evaluate_position", |b| {
        let mut scratch = scanner.scratch();
        b.iter(|| {
            scanner
                .evaluate_position(black_box(sequence.as_bytes()), black_box(17), &mut scratch)
                .unwrap()
        })
    });

    c.bench_function("scan", |b| b.iter(|| scanner.scan(black_box(&sequence)).unwrap()));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
