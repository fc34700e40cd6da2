//! Shared fixture pipeline for the integration tests.
//!
//! Compiles the committed corpus under `tests/data/` through the real build
//! path (gzip, source parser, compiler) so every test runs against the same
//! blob a production build would produce.

// Each test binary compiles this module on its own and uses a different
// slice of it.
#![allow(dead_code)]

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use rustc_hash::FxHashMap;

use hanyu_dict::cedict::{Entry, Line, Parser};
use hanyu_dict::{unihan, Dict, DictCompiler};

pub const CEDICT: &str = include_str!("../data/sample_cedict.txt");
pub const UNIHAN: &str = include_str!("../data/unihan_readings.txt");

/// The sample corpus, gzip-compressed the way a CC-CEDICT release ships.
pub fn gzipped_cedict() -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(CEDICT.as_bytes()).unwrap();
    enc.finish().unwrap()
}

/// Graded-word lists matching `tests/data/hsk/`.
pub fn hsk_levels() -> FxHashMap<String, u8> {
    let mut levels = FxHashMap::default();
    for (level, text) in [
        (2, include_str!("../data/hsk/hsk2.txt")),
        (6, include_str!("../data/hsk/hsk6.txt")),
    ] {
        for word in text.lines().map(str::trim).filter(|w| !w.is_empty()) {
            levels.insert(word.to_owned(), level);
        }
    }
    levels
}

/// Every vocabulary entry in the sample corpus, in file order.
pub fn entries() -> Vec<Entry> {
    let gz = gzipped_cedict();
    let mut parser = Parser::new(gz.as_slice());
    let mut entries = Vec::new();
    while let Some(line) = parser.next_line().unwrap() {
        if let Line::Entry(entry) = line {
            entries.push(entry);
        }
    }
    entries
}

/// The sample corpus compiled into a ready dictionary.
pub fn sample_dict() -> Dict {
    let mut compiler = DictCompiler::new();
    compiler.set_hsk_levels(hsk_levels());
    let readings = unihan::mandarin_readings(UNIHAN.as_bytes()).unwrap();
    compiler.set_preferred_readings(&readings);
    for entry in entries() {
        compiler.push_entry(entry).unwrap();
    }
    Dict::from_bytes(compiler.finish().unwrap()).unwrap()
}

pub fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}
