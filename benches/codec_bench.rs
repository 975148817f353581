use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stargazer::{Archive, Entry};
use std::io::Cursor;

fn sample_archive() -> Archive {
    let entries = (0..16)
        .map(|i| Entry::new(format!("assets/file_{i}.rel"), vec![i as u8; 64 * 1024]).unwrap())
        .collect();
    Archive::from_entries(entries)
}

fn bench_encode(c: &mut Criterion) {
    let archive = sample_archive();
    c.bench_function("encode_16x64k", |b| {
        b.iter(|| {
            let mut buf = Vec::with_capacity(2 * 1024 * 1024);
            archive.write_to(&mut buf).unwrap();
            black_box(buf)
        })
    });
}

fn bench_decode(c: &mut Criterion) {
    let bytes = sample_archive().serialize().unwrap();
    c.bench_function("decode_16x64k", |b| {
        b.iter(|| Archive::read(Cursor::new(black_box(&bytes))).unwrap())
    });
}

fn bench_entry_from_reader(c: &mut Criterion) {
    let data = vec![42u8; 1024 * 1024];
    c.bench_function("entry_from_reader_1mb", |b| {
        b.iter(|| Entry::from_reader("bench.bin", black_box(&data[..])).unwrap())
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_entry_from_reader);
criterion_main!(benches);
