//! Unihan `kMandarin` reader.
//!
//! Pulls the preferred Mandarin reading per character out of the Unicode
//! database file `Unihan_Readings.txt` (tab-separated `U+XXXX  kField
//! value` rows). Only `kMandarin` rows are kept; when the value carries two
//! space-separated readings, the first is the mainland convention and the
//! second the Taiwan one.

use std::io::{BufRead, BufReader, Read};

use rustc_hash::FxHashMap;

use crate::pinyin::{self, Pinyin};
use crate::DictError;

/// Preferred readings for one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mandarin {
    pub cn: Pinyin,
    pub tw: Pinyin,
}

/// Reads every `kMandarin` row into a per-character map.
///
/// Blank lines and `#` comments are skipped. A row that is structurally
/// broken or carries an unparseable reading fails the whole read; a bad
/// database input should stop a dictionary build, not thin it out.
pub fn mandarin_readings<R: Read>(src: R) -> Result<FxHashMap<char, Mandarin>, DictError> {
    let mut out = FxHashMap::default();
    for (idx, line) in BufReader::new(src).lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split('\t');
        let (Some(cp), Some(field), Some(value)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(DictError::ParseError(format!(
                "line {}: malformed Unihan row: {line:?}",
                idx + 1
            )));
        };
        if field != "kMandarin" {
            continue;
        }
        let c = parse_code_point(cp).ok_or_else(|| {
            DictError::ParseError(format!("line {}: bad code point {cp:?}", idx + 1))
        })?;
        let reading = parse_value(value).ok_or_else(|| {
            DictError::ParseError(format!("line {}: bad kMandarin value {value:?}", idx + 1))
        })?;
        out.insert(c, reading);
    }
    Ok(out)
}

fn parse_code_point(s: &str) -> Option<char> {
    let hex = s.strip_prefix("U+")?;
    char::from_u32(u32::from_str_radix(hex, 16).ok()?)
}

fn parse_value(value: &str) -> Option<Mandarin> {
    let chars: Vec<char> = value.chars().collect();
    let (cn, rest) = pinyin::parse(&chars)?;
    if rest.is_empty() {
        return Some(Mandarin { cn, tw: cn });
    }
    // Second reading after the separating space.
    let (tw, rest) = pinyin::parse(rest.get(1..)?)?;
    if !rest.is_empty() {
        return None;
    }
    Some(Mandarin { cn, tw })
}
