use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::fmt::Write;

use utf16_pct_escape::{EscapeBuffer, Escaper, escape_utf16, max_escaped_len};

struct Case {
    name: &'static str,
    units: Vec<u16>,
}

fn build_cases() -> Vec<Case> {
    let mut cases = Vec::new();

    // U+1FFFE as a surrogate pair, 1000 times: 12000 escaped bytes.
    cases.push(Case {
        name: "surrogate_pairs",
        units: [0xD83F, 0xDFFE].repeat(1000),
    });

    cases.push(Case {
        name: "ascii",
        units: "a/b?c=d&e=f ".repeat(200).encode_utf16().collect(),
    });

    cases.push(Case {
        name: "mixed",
        units: "Hello \u{20AC} \u{00E9} \u{1F600} World "
            .repeat(100)
            .encode_utf16()
            .collect(),
    });

    cases
}

fn std_escape(units: &[u16], out: &mut String) -> usize {
    let mut utf8 = [0u8; 4];
    for ch in char::decode_utf16(units.iter().copied()) {
        let ch = ch.unwrap_or(char::REPLACEMENT_CHARACTER);
        for byte in ch.encode_utf8(&mut utf8).bytes() {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out.len()
}

fn bench_escape(c: &mut Criterion) {
    let mut group = c.benchmark_group("pct_escape_utf16");

    for case in build_cases() {
        let max_len = max_escaped_len(case.units.len());
        group.throughput(Throughput::Elements(case.units.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("fixed_buffer", case.name),
            &case,
            |b, case| {
                let mut backing = vec![0u8; max_len];
                b.iter(|| {
                    let mut out = EscapeBuffer::new(&mut backing);
                    black_box(escape_utf16(&case.units, &mut out));
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("spill_from_empty", case.name),
            &case,
            |b, case| {
                b.iter(|| {
                    let mut backing: [u8; 0] = [];
                    let mut out = EscapeBuffer::new(&mut backing);
                    black_box(escape_utf16(&case.units, &mut out));
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("escaper_reuse", case.name),
            &case,
            |b, case| {
                let mut escaper = Escaper::new();
                b.iter(|| {
                    black_box(escaper.escape_utf16(&case.units).len());
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("std_fmt", case.name), &case, |b, case| {
            let mut out = String::with_capacity(max_len);
            b.iter(|| {
                out.clear();
                black_box(std_escape(&case.units, &mut out));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_escape);
criterion_main!(benches);
