//! Script conversion between traditional and simplified Chinese, built on
//! the dictionary's own variant records rather than a separate mapping
//! table. Text with no dictionary coverage passes through unchanged.

use rayon::prelude::*;

use crate::Dict;

#[derive(Clone, Copy)]
enum Target {
    Traditional,
    Simplified,
}

/// Converts text toward one script using dictionary lookups.
///
/// Each position is resolved with [`Dict::lookup`]; a match is replaced by
/// the first meaning that carries a spelling for the target script and
/// copied through otherwise. On no match a single code point is copied and
/// the walk resumes after it.
pub struct Converter<'a> {
    dict: &'a Dict,
    parallel: bool,
}

impl<'a> Converter<'a> {
    pub fn new(dict: &Dict) -> Converter<'_> {
        Converter {
            dict,
            parallel: false,
        }
    }

    /// Splits work across lines with rayon. Dictionary words never contain
    /// a line break, so the output is identical to the sequential walk.
    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    pub fn get_parallel(&self) -> bool {
        self.parallel
    }

    pub fn to_simplified(&self, text: &str) -> String {
        self.convert(text, Target::Simplified)
    }

    pub fn to_traditional(&self, text: &str) -> String {
        self.convert(text, Target::Traditional)
    }

    fn convert(&self, text: &str, target: Target) -> String {
        if !self.parallel {
            return self.convert_segment(text, target);
        }
        let segments: Vec<&str> = text.split_inclusive('\n').collect();
        segments
            .par_iter()
            .map(|segment| self.convert_segment(segment, target))
            .collect()
    }

    fn convert_segment(&self, text: &str, target: Target) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut at = 0;
        while at < chars.len() {
            let (consumed, meanings) = self.dict.lookup(&chars[at..]);
            if consumed == 0 {
                out.push(chars[at]);
                at += 1;
                continue;
            }
            let spelling = meanings.iter().find_map(|m| match target {
                Target::Traditional => m.traditional.clone(),
                Target::Simplified => m.simplified.clone(),
            });
            match spelling {
                Some(spelling) => out.push_str(&spelling),
                None => out.extend(&chars[at..at + consumed]),
            }
            at += consumed;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cedict::{Entry, Syllable};
    use crate::DictCompiler;

    fn dict() -> Dict {
        let entries = [
            ("聽", "听", "ting1", "to listen"),
            ("發現", "发现", "fa1 xian4", "to discover"),
            ("你好", "你好", "ni3 hao3", "hello"),
        ];
        let mut compiler = DictCompiler::new();
        for (traditional, simplified, pinyin, gloss) in entries {
            let pinyin = pinyin
                .split_whitespace()
                .map(|token| {
                    let chars: Vec<char> = token.chars().collect();
                    let (p, _) = crate::pinyin::parse(&chars).unwrap();
                    Syllable::Packed(p)
                })
                .collect();
            compiler
                .push_entry(Entry {
                    traditional: traditional.to_owned(),
                    simplified: simplified.to_owned(),
                    pinyin,
                    glosses: vec![gloss.to_owned()],
                })
                .unwrap();
        }
        Dict::from_bytes(compiler.finish().unwrap()).unwrap()
    }

    #[test]
    fn converts_in_both_directions() {
        let dict = dict();
        let converter = Converter::new(&dict);
        assert_eq!(converter.to_simplified("聽你好"), "听你好");
        assert_eq!(converter.to_traditional("听你好"), "聽你好");
        assert_eq!(converter.to_traditional("我发现了"), "我發現了");
    }

    #[test]
    fn unknown_text_passes_through() {
        let dict = dict();
        let converter = Converter::new(&dict);
        assert_eq!(converter.to_simplified("ABC 123"), "ABC 123");
        assert_eq!(converter.to_simplified(""), "");
    }

    #[test]
    fn words_without_variants_are_copied() {
        let dict = dict();
        let converter = Converter::new(&dict);
        assert_eq!(converter.to_traditional("你好"), "你好");
    }

    #[test]
    fn parallel_mode_matches_sequential() {
        let dict = dict();
        let mut converter = Converter::new(&dict);
        let text = "聽你好\n发现\n\nplain text\n聽";
        let sequential = converter.to_traditional(text);
        converter.set_parallel(true);
        assert!(converter.get_parallel());
        assert_eq!(converter.to_traditional(text), sequential);
        assert_eq!(sequential, "聽你好\n發現\n\nplain text\n聽");
    }
}
