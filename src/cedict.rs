//! CC-CEDICT source parser.
//!
//! Reads the gzip-compressed dictionary text line by line. Each line is a
//! metadata directive (`#! key=value`), a comment (`# ...`), or an entry:
//!
//! ```text
//! 蘋果 苹果 [ping2 guo3] /apple/
//! ```
//!
//! Syllable tokens that parse as pinyin become packed codes; anything else
//! (Latin letters, punctuation escapes) is kept as a literal string.

use std::fmt;
use std::io::{BufRead, BufReader, Read};

use flate2::read::GzDecoder;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::pinyin::{self, Pinyin};
use crate::DictError;

static ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^ ]+) ([^ ]+) \[([^\]]*)\] /+((?:[^/]+/?)+)/$").unwrap());
static METADATA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ *([^ =]+) *= *(.*)$").unwrap());

/// One dictionary source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Entry(Entry),
    Metadata { key: String, value: String },
    Comment(String),
}

/// A vocabulary entry: both spellings, pronunciation, glosses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub traditional: String,
    pub simplified: String,
    pub pinyin: Vec<Syllable>,
    pub glosses: Vec<String>,
}

/// One pronunciation token: a packed pinyin code, or the raw token when it
/// does not parse as pinyin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Syllable {
    Packed(Pinyin),
    Literal(String),
}

impl fmt::Display for Syllable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Syllable::Packed(p) => p.fmt(f),
            Syllable::Literal(s) => f.write_str(s),
        }
    }
}

/// Incremental reader over a gzip-compressed CC-CEDICT stream.
pub struct Parser<R: Read> {
    reader: BufReader<GzDecoder<R>>,
    line_no: usize,
    buf: String,
}

impl<R: Read> Parser<R> {
    pub fn new(src: R) -> Parser<R> {
        Parser {
            reader: BufReader::new(GzDecoder::new(src)),
            line_no: 0,
            buf: String::new(),
        }
    }

    /// Returns the next parsed line, or `None` at end of input. Blank lines
    /// are skipped; a line that is neither metadata, comment nor entry is a
    /// hard error, and the message carries the 1-based line number.
    pub fn next_line(&mut self) -> Result<Option<Line>, DictError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let line = self.buf.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }
            return self.parse_line(line).map(Some);
        }
    }

    fn parse_line(&self, line: &str) -> Result<Line, DictError> {
        if let Some(rest) = line.strip_prefix("#!") {
            let caps = METADATA_RE.captures(rest).ok_or_else(|| {
                DictError::ParseError(format!("line {}: bad metadata: {line:?}", self.line_no))
            })?;
            return Ok(Line::Metadata {
                key: caps[1].to_owned(),
                value: caps[2].to_owned(),
            });
        }
        if line.starts_with('#') {
            return Ok(Line::Comment(line[1..].to_owned()));
        }
        let caps = ENTRY_RE.captures(line).ok_or_else(|| {
            DictError::ParseError(format!("line {}: unrecognized entry: {line:?}", self.line_no))
        })?;
        Ok(Line::Entry(Entry {
            traditional: caps[1].to_owned(),
            simplified: caps[2].to_owned(),
            pinyin: caps[3].split_whitespace().map(parse_syllable).collect(),
            glosses: caps[4].split('/').map(str::to_owned).collect(),
        }))
    }
}

fn parse_syllable(token: &str) -> Syllable {
    let chars: Vec<char> = token.chars().collect();
    match pinyin::parse(&chars) {
        // Only a clean full-token parse counts; partial parses fall back to
        // the literal so nothing silently loses characters.
        Some((p, rest)) if rest.is_empty() => Syllable::Packed(p),
        _ => Syllable::Literal(token.to_owned()),
    }
}
