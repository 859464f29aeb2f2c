//! Header serialization benchmarks: `unload`/`load` round-trip cost
//! as the number of packaged files (and therefore parallel-array
//! entry length) grows.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rpmkit_header::{tags, Header, TagValue};

fn header_with_files(count: usize) -> Header {
    let mut header = Header::new();
    header.put(tags::NAME, TagValue::Str("bench-package".to_string())).unwrap();
    header.put(tags::VERSION, TagValue::Str("1.0".to_string())).unwrap();
    header.put(tags::RELEASE, TagValue::Str("1".to_string())).unwrap();
    header
        .put(tags::FILE_SIZES, TagValue::U32((0..count as u32).collect()))
        .unwrap();
    header
        .put(tags::FILE_MODES, TagValue::U16(vec![0o100644; count]))
        .unwrap();
    header
        .put(
            tags::FILE_MD5S,
            TagValue::StrArray((0..count).map(|i| format!("{i:032x}")).collect()),
        )
        .unwrap();
    header.reload(tags::HEADER_IMMUTABLE).unwrap();
    header
}

fn bench_unload(c: &mut Criterion) {
    let counts: &[usize] = &[1, 16, 256, 4096];
    let mut group = c.benchmark_group("header_unload");

    for &count in counts {
        let header = header_with_files(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("unload", count), &header, |b, header| {
            b.iter(|| black_box(header.unload(true)));
        });
    }
    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let counts: &[usize] = &[1, 16, 256, 4096];
    let mut group = c.benchmark_group("header_load");

    for &count in counts {
        let bytes = header_with_files(count).unload(true);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("load", count), &bytes, |b, bytes| {
            b.iter(|| black_box(Header::load(bytes).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_unload, bench_load);
criterion_main!(benches);
