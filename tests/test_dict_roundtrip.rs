mod common;

use common::{chars, entries, hsk_levels, sample_dict};
use hanyu_dict::cedict::Entry;
use hanyu_dict::{DictCompiler, Meaning};

fn find_meaning<'a>(meanings: &'a [Meaning], entry: &Entry) -> &'a Meaning {
    meanings
        .iter()
        .find(|m| m.pinyin == entry.pinyin && m.glosses == entry.glosses)
        .unwrap_or_else(|| panic!("no meaning for {} among {meanings:?}", entry.traditional))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_resolves_by_either_spelling() {
        let dict = sample_dict();
        let levels = hsk_levels();

        for entry in entries() {
            let graded = levels.get(&entry.simplified).copied().unwrap_or(0);
            for spelling in [&entry.traditional, &entry.simplified] {
                let word = chars(spelling);
                let (consumed, meanings) = dict.lookup(&word);
                assert_eq!(consumed, word.len(), "lookup of {spelling:?} fell short");

                let m = find_meaning(&meanings, &entry);
                assert_eq!(m.hsk_level, graded, "wrong level for {spelling:?}");
                if entry.traditional == entry.simplified {
                    assert_eq!(m.traditional, None);
                    assert_eq!(m.simplified, None);
                } else {
                    assert_eq!(m.traditional.as_ref(), Some(&entry.traditional));
                    assert_eq!(m.simplified.as_ref(), Some(&entry.simplified));
                }
            }
        }
    }

    #[test]
    fn compiler_keeps_one_record_per_entry() {
        let source = entries();
        let mut compiler = DictCompiler::new();
        assert!(compiler.is_empty());
        for entry in source.clone() {
            compiler.push_entry(entry).unwrap();
        }
        assert_eq!(compiler.len(), source.len());
    }
}
