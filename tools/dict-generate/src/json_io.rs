// json_io.rs (CLI only)
use hanyu_dict::cedict::{Entry, Syllable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct EntrySerde {
    pub traditional: String,
    pub simplified: String,

    // display form; packed syllables render with diacritics
    pub pinyin: Vec<String>,

    pub glosses: Vec<String>,
}

impl EntrySerde {
    #[allow(dead_code)]
    pub fn into_entry(self) -> Entry {
        let pinyin = self
            .pinyin
            .iter()
            .map(|token| {
                let chars: Vec<char> = token.chars().collect();
                match hanyu_dict::pinyin::parse(&chars) {
                    Some((p, rest)) if rest.is_empty() => Syllable::Packed(p),
                    _ => Syllable::Literal(token.clone()),
                }
            })
            .collect();
        Entry {
            traditional: self.traditional,
            simplified: self.simplified,
            pinyin,
            glosses: self.glosses,
        }
    }
}

impl From<&Entry> for EntrySerde {
    fn from(entry: &Entry) -> Self {
        Self {
            traditional: entry.traditional.clone(),
            simplified: entry.simplified.clone(),
            pinyin: entry.pinyin.iter().map(ToString::to_string).collect(),
            glosses: entry.glosses.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed(token: &str) -> Syllable {
        let chars: Vec<char> = token.chars().collect();
        let (p, rest) = hanyu_dict::pinyin::parse(&chars).unwrap();
        assert!(rest.is_empty());
        Syllable::Packed(p)
    }

    #[test]
    fn json_round_trip_preserves_the_entry() {
        let entry = Entry {
            traditional: "Ｑ聽".to_owned(),
            simplified: "Ｑ听".to_owned(),
            pinyin: vec![Syllable::Literal("Q".to_owned()), packed("ting1")],
            glosses: vec!["made up for the test".to_owned()],
        };

        let dto = EntrySerde::from(&entry);
        let json = serde_json::to_string(&dto).unwrap();
        // Packed syllables export in display form.
        assert!(json.contains("tīng"), "{json}");

        let back: EntrySerde = serde_json::from_str(&json).unwrap();
        assert_eq!(back.into_entry(), entry);
    }
}
