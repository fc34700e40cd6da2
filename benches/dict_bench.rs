use criterion::{criterion_group, criterion_main, Criterion};
use flate2::write::GzEncoder;
use flate2::Compression;
use hanyu_dict::cedict::{Line, Parser};
use hanyu_dict::simplified::Converter;
use hanyu_dict::{Dict, DictCompiler};
use std::io::Write;
use std::time::Duration;

fn sample_dict() -> Dict {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(include_str!("../tests/data/sample_cedict.txt").as_bytes())
        .unwrap();
    let gz = enc.finish().unwrap();

    let mut compiler = DictCompiler::new();
    let mut parser = Parser::new(gz.as_slice());
    while let Some(line) = parser.next_line().unwrap() {
        if let Line::Entry(entry) = line {
            compiler.push_entry(entry).unwrap();
        }
    }
    Dict::from_bytes(compiler.finish().unwrap()).unwrap()
}

fn bench_lookup_walk_100k(c: &mut Criterion) {
    let text: Vec<char> = "想听你听过的音乐在那儿做事有时候不复杂"
        .repeat(5264) // ~100,016 characters
        .chars()
        .collect();
    let dict = sample_dict();

    c.bench_function("lookup_walk_100k", |b| {
        b.iter(|| {
            let mut words = 0usize;
            let mut at = 0;
            while at < text.len() {
                let (consumed, _) = dict.lookup(&text[at..]);
                if consumed == 0 {
                    at += 1;
                } else {
                    words += 1;
                    at += consumed;
                }
            }
            words
        });
    });
}

fn bench_convert_t2s_100k(c: &mut Criterion) {
    let input = "聽你好音樂半途而廢沒有時候".repeat(7694); // ~100,022 characters
    let dict = sample_dict();
    let converter = Converter::new(&dict);

    c.bench_function("convert_t2s_100k", |b| {
        b.iter(|| converter.to_simplified(&input));
    });
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .warm_up_time(Duration::from_secs(3))
        .measurement_time(Duration::from_secs(5))
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = bench_lookup_walk_100k, bench_convert_t2s_100k
}
criterion_main!(benches);
