//! Compact Chinese dictionary: an offline-compiled binary trie blob and a
//! longest-match lookup engine over it.
//!
//! The blob is produced by [`DictCompiler`] from CC-CEDICT source text and
//! consumed read-only through [`Dict`]. Lookup walks the trie one code point
//! at a time and resolves the longest known word at the current position,
//! with a small amount of linguistic special-casing for function words.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::cedict::Syllable;
use crate::pinyin::Pinyin;

pub mod cedict;
pub mod compile;
pub mod numbers;
pub mod pinyin;
pub mod simplified;
pub mod unihan;

pub use crate::compile::DictCompiler;

/// Single-character words that may override a longer match during
/// segmentation: the negation, locative and existential particles.
/// A closed set; see [`Dict::lookup`].
const SOFT_MATCH_CHARS: [char; 4] = ['不', '在', '有', '没'];

fn is_soft_match(c: char) -> bool {
    SOFT_MATCH_CHARS.contains(&c)
}

// Close approximation of the Latin script for dictionary text: ASCII and
// fullwidth letters plus the Latin-1/Extended-A/Extended-B and Extended
// Additional letter blocks.
fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
        || ('Ａ'..='Ｚ').contains(&c)
        || ('ａ'..='ｚ').contains(&c)
        || (matches!(c, '\u{C0}'..='\u{24F}' | '\u{1E00}'..='\u{1EFF}') && c.is_alphabetic())
}

/// An immutable compiled dictionary.
///
/// Owns the binary blob produced by [`DictCompiler`]; all lookup state lives
/// in cheap [`Cursor`] values borrowing from it, so any number of threads
/// may search one `Dict` concurrently.
///
/// [`from_bytes`](Dict::from_bytes) checks the blob framing. Traversal
/// trusts the validated blob; a blob corrupted beyond what framing checks
/// can see (dangling interior offsets, broken UTF-8) panics rather than
/// reporting a false "no match".
pub struct Dict {
    bin: Vec<u8>,
}

impl Dict {
    /// Takes ownership of a compiled blob after validating its framing.
    pub fn from_bytes(bin: Vec<u8>) -> Result<Dict, DictError> {
        if bin.len() < 6 {
            return Err(DictError::Corrupt(
                "blob shorter than its header".to_owned(),
            ));
        }
        let points = read_u24(&bin, 0);
        let size_field = 3 + 3 * points;
        if bin.len() < size_field + 3 {
            return Err(DictError::Corrupt(format!(
                "code point table ({points} entries) extends past the end"
            )));
        }
        let trie_len = read_u24(&bin, size_field);
        if trie_len < 2 {
            return Err(DictError::Corrupt(
                "trie region too small for a root record".to_owned(),
            ));
        }
        if bin.len() < size_field + 3 + trie_len {
            return Err(DictError::Corrupt(format!(
                "trie region ({trie_len} bytes) extends past the end"
            )));
        }
        Ok(Dict { bin })
    }

    /// Reads and validates a compiled blob from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Dict, DictError> {
        Dict::from_bytes(fs::read(path)?)
    }

    /// A fresh cursor at the trie root.
    pub fn begin(&self) -> Cursor<'_> {
        let points = read_u24(&self.bin, 0);
        Cursor {
            bin: &self.bin,
            index: 6 + 3 * points,
            meanings: None,
        }
    }

    /// Finds the longest known word at the start of `text`.
    ///
    /// Returns how many code points were consumed and the matched word's
    /// meanings; `(0, vec![])` means no match, and the caller typically
    /// skips one code point and retries. Two refinements on plain longest
    /// match:
    ///
    /// * A boundary never falls between two adjacent Latin letters, so a
    ///   dictionary word `A` does not split `AB`.
    /// * If the text starts with one of the soft-match particles
    ///   (不 在 有 没) and that character alone is a word, a secondary scan
    ///   from the second code point runs; when it finds a word reaching at
    ///   least as far as the main match did, the single-character reading
    ///   wins and only one code point is consumed. This keeps a particle
    ///   from being absorbed into a longer compound when the rest of the
    ///   text forms a word of its own.
    pub fn lookup(&self, text: &[char]) -> (usize, Vec<Meaning>) {
        let mut last_len = 0;
        let mut last_word = None;
        let mut soft = None;
        self.scan(text, |i, cursor| {
            last_len = i + 1;
            last_word = Some(cursor);
            if i == 0 && is_soft_match(text[0]) {
                soft = Some(cursor);
            }
            false
        });
        if let Some(soft) = soft {
            // The secondary scan only checks reach, not which word it found.
            let threshold = last_len - 1;
            let mut overridden = false;
            self.scan(&text[1..], |i, _| {
                overridden = i >= threshold;
                overridden
            });
            if overridden {
                return (1, soft.meanings(&text[..1]));
            }
        }
        match last_word {
            Some(cursor) => (last_len, cursor.meanings(&text[..last_len])),
            None => (0, Vec::new()),
        }
    }

    /// Walks `text` from the start, invoking `on_word` at every word
    /// boundary until it returns true or no edge matches.
    ///
    /// The cursor handed to `on_word` borrows from `self`, not from the
    /// scan, so callers may keep it past the callback.
    fn scan<'a>(&'a self, text: &[char], mut on_word: impl FnMut(usize, Cursor<'a>) -> bool) {
        let mut cursor = self.begin();
        for (i, &c) in text.iter().enumerate() {
            if !cursor.consume(c) {
                break;
            }
            if is_latin_letter(c) && text.get(i + 1).copied().is_some_and(is_latin_letter) {
                // mid Latin run, not a word boundary
                continue;
            }
            if cursor.is_word() && on_word(i, cursor) {
                return;
            }
        }
    }
}

/// A position inside a dictionary's trie.
///
/// Advances one code point per [`consume`](Cursor::consume) call and never
/// copies blob data, so snapshots are free.
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    bin: &'a [u8],
    /// Offset of the node record the cursor sits on.
    index: usize,
    /// Content block of the most recently entered node.
    meanings: Option<usize>,
}

impl<'a> Cursor<'a> {
    /// Follows the edge labeled `c`, if there is one.
    pub fn consume(&mut self, c: char) -> bool {
        let edges = read_u16(self.bin, self.index);
        let base = self.index + 2;
        let mut lo = 0;
        let mut hi = edges;
        while lo < hi {
            let mid = (lo + hi) / 2;
            if edge_label(self.bin, base + mid * 5) < c {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo >= edges || edge_label(self.bin, base + lo * 5) != c {
            return false;
        }
        let content = read_u24(self.bin, base + lo * 5 + 2);
        let count = self.bin[content] as usize;
        self.meanings = Some(content);
        self.index = content + 1 + count * 3;
        true
    }

    /// Whether the node the cursor entered last completes a word.
    pub fn is_word(&self) -> bool {
        self.meanings.is_some_and(|at| self.bin[at] > 0)
    }

    /// Materializes the meanings of the word ending at the cursor.
    ///
    /// `word` must be the code points consumed so far; variant diffs are
    /// applied on top of it to produce the full traditional and simplified
    /// spellings of this particular match.
    pub fn meanings(&self, word: &[char]) -> Vec<Meaning> {
        let Some(at) = self.meanings else {
            return Vec::new();
        };
        let count = self.bin[at] as usize;
        let points = read_u24(self.bin, 0);
        let region = read_u24(self.bin, 3 + 3 * points) + 6 + 3 * points;
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let index = read_u24(self.bin, at + 1 + i * 3);
            let record = region + read_u24(self.bin, region + index * 3);
            out.push(decode_meaning(self.bin, record, word));
        }
        out
    }
}

/// One meaning of a matched word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meaning {
    /// Pronunciation, syllable by syllable.
    pub pinyin: Vec<Syllable>,
    /// English glosses, in source order.
    pub glosses: Vec<String>,
    /// HSK difficulty level 1-6, or 0 when ungraded.
    pub hsk_level: u8,
    /// Full traditional spelling of the matched text, when it differs from
    /// the simplified one.
    pub traditional: Option<String>,
    /// Full simplified spelling, under the same condition.
    pub simplified: Option<String>,
}

fn decode_meaning(bin: &[u8], record: usize, word: &[char]) -> Meaning {
    let mut pos = record;
    let hsk_level = bin[pos];
    pos += 1;
    let syllables = bin[pos] as usize;
    pos += 1;
    let mut pinyin = Vec::with_capacity(syllables);
    for _ in 0..syllables {
        if bin[pos] > 127 {
            let bits = (read_u16(bin, pos) & 0x7FFF) as u16;
            pinyin.push(Syllable::Packed(Pinyin::from_bits(bits)));
            pos += 2;
        } else {
            let len = bin[pos] as usize;
            pos += 1;
            pinyin.push(Syllable::Literal(blob_str(bin, pos, len)));
            pos += len;
        }
    }
    let gloss_count = bin[pos] as usize;
    pos += 1;
    let mut glosses = Vec::with_capacity(gloss_count);
    for _ in 0..gloss_count {
        let len = read_u16(bin, pos);
        pos += 2;
        glosses.push(blob_str(bin, pos, len));
        pos += len;
    }
    let variants = bin[pos] as usize;
    pos += 1;
    let mut traditional = None;
    let mut simplified = None;
    if variants > 0 {
        let mut trad = word.to_vec();
        let mut simp = word.to_vec();
        for _ in 0..variants {
            let cpos = bin[pos] as usize;
            pos += 1;
            trad[cpos] = decode_code_point(bin, read_u16(bin, pos));
            pos += 2;
            simp[cpos] = decode_code_point(bin, read_u16(bin, pos));
            pos += 2;
        }
        traditional = Some(trad.into_iter().collect());
        simplified = Some(simp.into_iter().collect());
    }
    Meaning {
        pinyin,
        glosses,
        hsk_level,
        traditional,
        simplified,
    }
}

fn read_u16(bin: &[u8], at: usize) -> usize {
    (bin[at] as usize) << 8 | bin[at + 1] as usize
}

fn read_u24(bin: &[u8], at: usize) -> usize {
    (bin[at] as usize) << 16 | (bin[at + 1] as usize) << 8 | bin[at + 2] as usize
}

fn edge_label(bin: &[u8], edge: usize) -> char {
    decode_code_point(bin, read_u16(bin, edge))
}

fn decode_code_point(bin: &[u8], index: usize) -> char {
    let raw = read_u24(bin, 3 + index * 3) as u32;
    match char::from_u32(raw) {
        Some(c) => c,
        None => panic!("corrupt dictionary blob: invalid code point {raw:#x}"),
    }
}

fn blob_str(bin: &[u8], pos: usize, len: usize) -> String {
    match std::str::from_utf8(&bin[pos..pos + len]) {
        Ok(s) => s.to_owned(),
        Err(_) => panic!("corrupt dictionary blob: invalid UTF-8 at offset {pos}"),
    }
}

/// Errors reported by the dictionary pipeline.
#[derive(Debug)]
pub enum DictError {
    /// File or stream failure while reading inputs or writing the blob.
    IoError(String),
    /// Malformed source line, pinyin value or database row.
    ParseError(String),
    /// A fixed-width blob field cannot hold the data being compiled.
    Overflow(String),
    /// Blob framing inconsistent with its length.
    Corrupt(String),
}

impl fmt::Display for DictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictError::IoError(msg) => write!(f, "IO error: {msg}"),
            DictError::ParseError(msg) => write!(f, "parse error: {msg}"),
            DictError::Overflow(msg) => write!(f, "field overflow: {msg}"),
            DictError::Corrupt(msg) => write!(f, "corrupt dictionary: {msg}"),
        }
    }
}

impl std::error::Error for DictError {}

impl From<std::io::Error> for DictError {
    fn from(err: std::io::Error) -> Self {
        DictError::IoError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // count 0, trie length 2, root node with no edges
    const EMPTY_BLOB: &[u8] = &[0, 0, 0, 0, 0, 2, 0, 0];

    // one entry 你 with an empty meaning record
    const ONE_WORD_BLOB: &[u8] = &[
        0, 0, 1, // one code point
        0, 0x4F, 0x60, // 你
        0, 0, 13, // trie region length
        0, 1, 0, 0, 0, 0, 16, // root: one edge to the content block
        1, 0, 0, 0, 0, 0, // content: one meaning, leaf node
        0, 0, 3, 0, 0, 0, 0, // meaning region
    ];

    #[test]
    fn empty_dictionary_matches_nothing() {
        let dict = Dict::from_bytes(EMPTY_BLOB.to_vec()).unwrap();
        let text: Vec<char> = "你好".chars().collect();
        let (consumed, meanings) = dict.lookup(&text);
        assert_eq!(consumed, 0);
        assert!(meanings.is_empty());
        assert_eq!(dict.lookup(&[]), (0, Vec::new()));
    }

    #[test]
    fn scan_callback_cursors_outlive_the_walk() {
        let dict = Dict::from_bytes(ONE_WORD_BLOB.to_vec()).unwrap();
        let text: Vec<char> = "你好".chars().collect();
        // The cursor must be storable outside the callback; lookup relies
        // on exactly this to remember the longest match.
        let mut kept = None;
        dict.scan(&text, |i, cursor| {
            kept = Some((i, cursor));
            false
        });
        let (i, cursor) = kept.unwrap();
        assert_eq!(i, 0);
        assert!(cursor.is_word());
        assert_eq!(cursor.meanings(&text[..1]).len(), 1);
    }

    #[test]
    fn truncated_blobs_are_rejected() {
        assert!(Dict::from_bytes(Vec::new()).is_err());
        assert!(Dict::from_bytes(vec![0, 0, 0, 0, 0]).is_err());
        // claims 5 code points but ends immediately
        assert!(Dict::from_bytes(vec![0, 0, 5, 0, 0, 2, 0, 0]).is_err());
        // trie region runs past the end of the buffer
        assert!(Dict::from_bytes(vec![0, 0, 0, 0, 0, 9, 0, 0]).is_err());
        // trie region too small to hold a root record
        assert!(Dict::from_bytes(vec![0, 0, 0, 0, 0, 1, 0]).is_err());
    }

    #[test]
    fn latin_letter_coverage() {
        assert!(is_latin_letter('A'));
        assert!(is_latin_letter('z'));
        assert!(is_latin_letter('é'));
        assert!(is_latin_letter('Ａ'));
        // Latin Extended Additional, as in Vietnamese
        assert!(is_latin_letter('ệ'));
        assert!(is_latin_letter('Ỏ'));
        assert!(!is_latin_letter('×'));
        assert!(!is_latin_letter('你'));
        assert!(!is_latin_letter(' '));
        assert!(!is_latin_letter('’'));
    }

    #[test]
    fn soft_match_set_is_exact() {
        for c in ['不', '在', '有', '没'] {
            assert!(is_soft_match(c));
        }
        assert!(!is_soft_match('沒'));
        assert!(!is_soft_match('一'));
    }
}
