//! Offline dictionary compiler: CC-CEDICT entries in, binary blob out.
//!
//! Compilation is deterministic and single-threaded. Entries stream into an
//! arena trie while their meanings accumulate in entry order; [`finish`]
//! serializes both into the format [`crate::Dict`] reads.
//!
//! [`finish`]: DictCompiler::finish

mod code_points;
mod serialize;
mod trie;

use rustc_hash::FxHashMap;

use crate::cedict::{Entry, Syllable};
use crate::pinyin::Pinyin;
use crate::unihan::Mandarin;
use crate::DictError;

use self::code_points::CodePointTable;
use self::trie::{NodeMeaning, Trie};

/// Accumulates dictionary entries and serializes them into the compact
/// binary format.
///
/// The traditional spelling of every entry is inserted into the trie; the
/// simplified spelling is inserted additionally when the two differ, both
/// sharing one meaning record. Spellings of unequal code point length
/// cannot be expressed as positional variant diffs and are rejected.
pub struct DictCompiler {
    trie: Trie,
    table: CodePointTable,
    meanings: Vec<MeaningRecord>,
    hsk: FxHashMap<String, u8>,
    preferred: FxHashMap<char, Pinyin>,
}

impl DictCompiler {
    pub fn new() -> DictCompiler {
        DictCompiler {
            trie: Trie::new(),
            table: CodePointTable::new(),
            meanings: Vec::new(),
            hsk: FxHashMap::default(),
            preferred: FxHashMap::default(),
        }
    }

    /// HSK difficulty levels keyed by simplified spelling. Entries not in
    /// the map compile as ungraded (level 0).
    pub fn set_hsk_levels(&mut self, levels: FxHashMap<String, u8>) {
        self.hsk = levels;
    }

    /// Mainland Mandarin readings used to float the dominant pronunciation
    /// of a single-character word to the front of its meaning list.
    pub fn set_preferred_readings(&mut self, readings: &FxHashMap<char, Mandarin>) {
        self.preferred = readings.iter().map(|(&c, m)| (c, m.cn)).collect();
    }

    pub fn push_entry(&mut self, entry: Entry) -> Result<(), DictError> {
        let traditional: Vec<char> = entry.traditional.chars().collect();
        let simplified: Vec<char> = entry.simplified.chars().collect();
        let variants = variant_diffs(&traditional, &simplified)?;
        let hsk = self.hsk.get(&entry.simplified).copied().unwrap_or(0);
        let preferred_trad = self.is_preferred(&traditional, &entry.pinyin);
        let preferred_simp = self.is_preferred(&simplified, &entry.pinyin);
        for &c in traditional.iter().chain(&simplified) {
            self.table.add(c);
        }
        let index = self.meanings.len() as u32;
        let insert_simplified = !variants.is_empty();
        self.meanings.push(MeaningRecord {
            hsk,
            pinyin: entry.pinyin,
            glosses: entry.glosses,
            variants,
        });
        self.trie.insert(
            &traditional,
            NodeMeaning {
                index,
                preferred: preferred_trad,
            },
        );
        if insert_simplified {
            self.trie.insert(
                &simplified,
                NodeMeaning {
                    index,
                    preferred: preferred_simp,
                },
            );
        }
        Ok(())
    }

    /// Number of meanings compiled so far.
    pub fn len(&self) -> usize {
        self.meanings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meanings.is_empty()
    }

    /// Serializes everything pushed so far into a blob.
    pub fn finish(self) -> Result<Vec<u8>, DictError> {
        serialize::serialize(&self.trie, &self.meanings, &self.table)
    }

    fn is_preferred(&self, word: &[char], pinyin: &[Syllable]) -> bool {
        let &[c] = word else { return false };
        let [Syllable::Packed(p)] = pinyin else {
            return false;
        };
        self.preferred.get(&c) == Some(p)
    }
}

pub(crate) struct MeaningRecord {
    pub(crate) hsk: u8,
    pub(crate) pinyin: Vec<Syllable>,
    pub(crate) glosses: Vec<String>,
    pub(crate) variants: Vec<VariantDiff>,
}

pub(crate) struct VariantDiff {
    pub(crate) pos: u8,
    pub(crate) traditional: char,
    pub(crate) simplified: char,
}

/// Positions where the two spellings of an entry disagree.
fn variant_diffs(traditional: &[char], simplified: &[char]) -> Result<Vec<VariantDiff>, DictError> {
    if traditional.len() != simplified.len() {
        return Err(DictError::ParseError(format!(
            "spellings {:?} and {:?} differ in length",
            traditional.iter().collect::<String>(),
            simplified.iter().collect::<String>(),
        )));
    }
    let mut diffs = Vec::new();
    for (pos, (&t, &s)) in traditional.iter().zip(simplified).enumerate() {
        if t == s {
            continue;
        }
        let pos = u8::try_from(pos).map_err(|_| {
            DictError::Overflow(format!(
                "variant difference at position {pos} does not fit in a byte"
            ))
        })?;
        diffs.push(VariantDiff {
            pos,
            traditional: t,
            simplified: s,
        });
    }
    Ok(diffs)
}
