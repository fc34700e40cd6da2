//! Pinyin syllable codec.
//!
//! A Mandarin syllable is packed into 16 bits as `sound * 5 + tone`, where
//! the sound indexes a fixed sorted table of toneless spellings and the tone
//! is one of five values. The packed form is what dictionary blobs store;
//! parsing and diacritic rendering live here so every other module can treat
//! pronunciation as an opaque number.

use std::fmt;

/// A single Mandarin syllable: sound plus tone, packed into 16 bits.
///
/// The packed value fits in 15 bits, which the dictionary blob format relies
/// on (the high bit of a stored syllable distinguishes packed codes from
/// literal strings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pinyin(u16);

/// A toneless syllable spelling, identified by its index in the sound table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sound(u16);

/// The tone contour attached to a sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Neutral,
    Flat,
    Rising,
    Low,
    Falling,
}

impl Tone {
    fn from_ordinal(v: u16) -> Tone {
        match v {
            1 => Tone::Flat,
            2 => Tone::Rising,
            3 => Tone::Low,
            _ if v == 0 => Tone::Neutral,
            _ => Tone::Falling,
        }
    }

    fn ordinal(self) -> u16 {
        match self {
            Tone::Neutral => 0,
            Tone::Flat => 1,
            Tone::Rising => 2,
            Tone::Low => 3,
            Tone::Falling => 4,
        }
    }
}

impl Pinyin {
    /// Packs a sound and a tone into one syllable value.
    #[inline]
    pub fn new(sound: Sound, tone: Tone) -> Pinyin {
        Pinyin(sound.0 * 5 + tone.ordinal())
    }

    /// Splits the syllable back into its sound and tone.
    #[inline]
    pub fn decode(self) -> (Sound, Tone) {
        (Sound(self.0 / 5), Tone::from_ordinal(self.0 % 5))
    }

    /// Reconstructs a syllable from its packed representation.
    #[inline]
    pub fn from_bits(bits: u16) -> Pinyin {
        Pinyin(bits)
    }

    /// The packed representation, as stored in dictionary blobs.
    #[inline]
    pub fn bits(self) -> u16 {
        self.0
    }

    fn render(self) -> (String, bool) {
        let (sound, tone) = self.decode();
        let base = sound.as_str();
        if tone == Tone::Neutral {
            return (base.to_owned(), sound.special());
        }
        let mut chars: Vec<char> = base.chars().collect();
        let pos = tone_position(&chars);
        match marked(chars[pos], tone) {
            Some(m) => {
                chars[pos] = m;
                (chars.into_iter().collect(), sound.special())
            }
            None => ("?".to_owned(), false),
        }
    }
}

impl fmt::Display for Pinyin {
    /// Renders the syllable with tone diacritics, e.g. `hǎo`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render().0)
    }
}

impl Sound {
    /// The toneless spelling, or `"?"` for an index outside the table.
    pub fn as_str(self) -> &'static str {
        SOUNDS.get(self.0 as usize).copied().unwrap_or("?")
    }

    fn from_str(s: &str) -> Option<Sound> {
        SOUNDS.binary_search(&s).ok().map(|i| Sound(i as u16))
    }

    // Syllables that begin with a bare vowel get an apostrophe separator
    // when rendered after another syllable.
    fn special(self) -> bool {
        self.as_str().starts_with(['a', 'e', 'o'])
    }
}

/// Where the tone mark goes within a toneless spelling.
///
/// `a` and `e` always carry the mark; in `ou` it lands on the `o`; otherwise
/// it goes on the last vowel of the final.
fn tone_position(chars: &[char]) -> usize {
    let mut was_o = false;
    let mut first_vowel = None;
    for (i, &c) in chars.iter().enumerate() {
        match c {
            'a' | 'e' => return i,
            'o' => {
                if first_vowel.is_some() {
                    return i;
                }
                was_o = true;
                first_vowel = Some(i);
            }
            'u' => {
                if was_o {
                    return i - 1;
                }
                if first_vowel.is_some() {
                    return i;
                }
                first_vowel = Some(i);
            }
            'i' | 'ü' => {
                if first_vowel.is_some() {
                    return i;
                }
                first_vowel = Some(i);
            }
            _ => {
                if let Some(v) = first_vowel {
                    return v;
                }
            }
        }
    }
    first_vowel.unwrap_or(0)
}

fn marked(c: char, tone: Tone) -> Option<char> {
    Some(match (c, tone) {
        ('a', Tone::Flat) => 'ā',
        ('a', Tone::Rising) => 'á',
        ('a', Tone::Low) => 'ǎ',
        ('a', Tone::Falling) => 'à',
        ('e', Tone::Flat) => 'ē',
        ('e', Tone::Rising) => 'é',
        ('e', Tone::Low) => 'ě',
        ('e', Tone::Falling) => 'è',
        ('i', Tone::Flat) => 'ī',
        ('i', Tone::Rising) => 'í',
        ('i', Tone::Low) => 'ǐ',
        ('i', Tone::Falling) => 'ì',
        ('o', Tone::Flat) => 'ō',
        ('o', Tone::Rising) => 'ó',
        ('o', Tone::Low) => 'ǒ',
        ('o', Tone::Falling) => 'ò',
        ('u', Tone::Flat) => 'ū',
        ('u', Tone::Rising) => 'ú',
        ('u', Tone::Low) => 'ǔ',
        ('u', Tone::Falling) => 'ù',
        ('ü', Tone::Flat) => 'ǖ',
        ('ü', Tone::Rising) => 'ǘ',
        ('ü', Tone::Low) => 'ǚ',
        ('ü', Tone::Falling) => 'ǜ',
        // Syllabic n has no flat-tone mark in common use.
        ('n', Tone::Flat) => 'n',
        ('n', Tone::Rising) => 'ń',
        ('n', Tone::Low) => 'ň',
        ('n', Tone::Falling) => 'ǹ',
        _ => return None,
    })
}

/// Maps a toned vowel (or syllabic nasal) to its tone and bare letter.
fn split_diacritic(c: char) -> Option<(Tone, char)> {
    Some(match c {
        'ā' => (Tone::Flat, 'a'),
        'á' => (Tone::Rising, 'a'),
        'ǎ' => (Tone::Low, 'a'),
        'à' => (Tone::Falling, 'a'),
        'ē' => (Tone::Flat, 'e'),
        'é' => (Tone::Rising, 'e'),
        'ě' => (Tone::Low, 'e'),
        'è' => (Tone::Falling, 'e'),
        'ī' => (Tone::Flat, 'i'),
        'í' => (Tone::Rising, 'i'),
        'ǐ' => (Tone::Low, 'i'),
        'ì' => (Tone::Falling, 'i'),
        'ō' => (Tone::Flat, 'o'),
        'ó' => (Tone::Rising, 'o'),
        'ǒ' => (Tone::Low, 'o'),
        'ò' => (Tone::Falling, 'o'),
        'ū' => (Tone::Flat, 'u'),
        'ú' => (Tone::Rising, 'u'),
        'ǔ' => (Tone::Low, 'u'),
        'ù' => (Tone::Falling, 'u'),
        'ǖ' => (Tone::Flat, 'ü'),
        'ǘ' => (Tone::Rising, 'ü'),
        'ǚ' => (Tone::Low, 'ü'),
        'ǜ' => (Tone::Falling, 'ü'),
        'ń' => (Tone::Rising, 'n'),
        'ň' => (Tone::Low, 'n'),
        'ǹ' => (Tone::Falling, 'n'),
        'ḿ' => (Tone::Rising, 'm'),
        _ => return None,
    })
}

/// Incremental single-syllable recognizer.
///
/// Accumulates the toneless spelling one character at a time; the tone may
/// arrive as a diacritic anywhere in the syllable or as a trailing digit.
#[derive(Default)]
struct SyllableParser {
    base: String,
    tone: Option<Tone>,
    done: bool,
}

impl SyllableParser {
    fn set_tone(&mut self, t: Tone) -> bool {
        if self.tone.is_some() {
            return false;
        }
        self.tone = Some(t);
        true
    }

    /// Feeds one character. Returns false when the character cannot extend
    /// the syllable; the parser is not usable past the first rejection.
    fn advance(&mut self, c: char) -> bool {
        if self.done {
            return false;
        }
        let c = c.to_lowercase().next().unwrap_or(c);
        let c = match c {
            '\'' => {
                // Explicit syllable break: consumed, ends the syllable.
                self.done = true;
                return true;
            }
            '1' => {
                self.done = true;
                return self.set_tone(Tone::Flat);
            }
            '2' => {
                self.done = true;
                return self.set_tone(Tone::Rising);
            }
            '3' => {
                self.done = true;
                return self.set_tone(Tone::Low);
            }
            '4' => {
                self.done = true;
                return self.set_tone(Tone::Falling);
            }
            '5' => {
                self.done = true;
                return self.set_tone(Tone::Neutral);
            }
            ':' => {
                // CC-CEDICT writes ü as "u:".
                if self.base.ends_with('u') {
                    self.base.pop();
                    'ü'
                } else {
                    return false;
                }
            }
            'v' => 'ü',
            c => match split_diacritic(c) {
                Some((t, bare)) => {
                    if !self.set_tone(t) {
                        return false;
                    }
                    bare
                }
                None => c,
            },
        };
        if !c.is_ascii_lowercase() && c != 'ü' {
            return false;
        }
        self.base.push(c);
        is_sound_prefix(&self.base)
    }

    fn result(&self) -> Option<Pinyin> {
        let sound = Sound::from_str(&self.base)?;
        Some(Pinyin::new(sound, self.tone.unwrap_or(Tone::Neutral)))
    }
}

fn is_sound_prefix(s: &str) -> bool {
    let i = SOUNDS.partition_point(|&x| x < s);
    SOUNDS.get(i).is_some_and(|x| x.starts_with(s))
}

/// Parses a single syllable from the front of `text`.
///
/// Longest match: the parser keeps consuming while the input still forms a
/// valid prefix and returns the last complete syllable seen, together with
/// the unconsumed remainder. `None` when no complete syllable is present.
pub fn parse(text: &[char]) -> Option<(Pinyin, &[char])> {
    let mut p = SyllableParser::default();
    let mut last = None;
    for (i, &c) in text.iter().enumerate() {
        if !p.advance(c) {
            break;
        }
        if let Some(result) = p.result() {
            last = Some((i + 1, result));
        }
    }
    let (end, result) = last?;
    Some((result, &text[end..]))
}

/// Parses syllables until the input is exhausted or stops parsing.
/// Returns the syllables and whatever input remains.
pub fn parse_many(mut text: &[char]) -> (Vec<Pinyin>, &[char]) {
    let mut out = Vec::new();
    while !text.is_empty() {
        match parse(text) {
            Some((p, rest)) => {
                out.push(p);
                text = rest;
            }
            None => break,
        }
    }
    (out, text)
}

/// Renders a syllable sequence with diacritics, inserting `'` before a
/// non-initial syllable that starts with a bare vowel (so `nü` + `ér` comes
/// out as `nü'ér`, not `nüér`).
pub fn render_many(syllables: &[Pinyin]) -> String {
    let mut out = String::new();
    for (i, p) in syllables.iter().enumerate() {
        let (s, special) = p.render();
        if i != 0 && special {
            out.push('\'');
        }
        out.push_str(&s);
    }
    out
}

/// Every toneless syllable spelling, sorted bytewise (`ü` forms sort after
/// ASCII). `Sound` values index into this table, so entries must never be
/// reordered without regenerating dictionaries.
static SOUNDS: &[&str] = &[
    "a", "ai", "an", "ang", "ao", "ba", "bai", "ban", "bang", "bao", "bei",
    "ben", "beng", "bi", "bian", "biao", "bie", "bin", "bing", "bo", "bu",
    "ca", "cai", "can", "cang", "cao", "ce", "cei", "cen", "ceng", "cha",
    "chai", "chan", "chang", "chao", "che", "chen", "cheng", "chi", "chong",
    "chou", "chu", "chua", "chuai", "chuan", "chuang", "chui", "chun", "chuo",
    "ci", "cong", "cou", "cu", "cuan", "cui", "cun", "cuo", "da", "dai", "dan",
    "dang", "dao", "de", "dei", "den", "deng", "di", "dia", "dian", "diao",
    "die", "ding", "diu", "dong", "dou", "du", "duan", "dui", "dun", "duo",
    "e", "ei", "en", "eng", "er", "fa", "fan", "fang", "fei", "fen", "feng",
    "fo", "fou", "fu", "ga", "gai", "gan", "gang", "gao", "ge", "gei", "gen",
    "geng", "gong", "gou", "gu", "gua", "guai", "guan", "guang", "gui", "gun",
    "guo", "ha", "hai", "han", "hang", "hao", "he", "hei", "hen", "heng", "hm",
    "hng", "hong", "hou", "hu", "hua", "huai", "huan", "huang", "hui", "hun",
    "huo", "ji", "jia", "jian", "jiang", "jiao", "jie", "jin", "jing", "jiong",
    "jiu", "ju", "juan", "jue", "jun", "ka", "kai", "kan", "kang", "kao", "ke",
    "kei", "ken", "keng", "kong", "kou", "ku", "kua", "kuai", "kuan", "kuang",
    "kui", "kun", "kuo", "la", "lai", "lan", "lang", "lao", "le", "lei",
    "leng", "li", "lia", "lian", "liang", "liao", "lie", "lin", "ling", "liu",
    "lo", "long", "lou", "lu", "luan", "lun", "luo", "lü", "lüe", "m", "ma",
    "mai", "man", "mang", "mao", "me", "mei", "men", "meng", "mi", "mian",
    "miao", "mie", "min", "ming", "miu", "mo", "mou", "mu", "n", "na", "nai",
    "nan", "nang", "nao", "ne", "nei", "nen", "neng", "ng", "ni", "nian",
    "niang", "niao", "nie", "nin", "ning", "niu", "nong", "nou", "nu", "nuan",
    "nuo", "nü", "nüe", "o", "ou", "pa", "pai", "pan", "pang", "pao", "pei",
    "pen", "peng", "pi", "pian", "piao", "pie", "pin", "ping", "po", "pou",
    "pu", "qi", "qia", "qian", "qiang", "qiao", "qie", "qin", "qing", "qiong",
    "qiu", "qu", "quan", "que", "qun", "r", "ran", "rang", "rao", "re", "ren",
    "reng", "ri", "rong", "rou", "ru", "rua", "ruan", "rui", "run", "ruo",
    "sa", "sai", "san", "sang", "sao", "se", "sen", "seng", "sha", "shai",
    "shan", "shang", "shao", "she", "shei", "shen", "sheng", "shi", "shou",
    "shu", "shua", "shuai", "shuan", "shuang", "shui", "shun", "shuo", "si",
    "song", "sou", "su", "suan", "sui", "sun", "suo", "ta", "tai", "tan",
    "tang", "tao", "te", "tei", "teng", "ti", "tian", "tiao", "tie", "ting",
    "tong", "tou", "tu", "tuan", "tui", "tun", "tuo", "wa", "wai", "wan",
    "wang", "wei", "wen", "weng", "wo", "wu", "xi", "xia", "xian", "xiang",
    "xiao", "xie", "xin", "xing", "xiong", "xiu", "xu", "xuan", "xue", "xun",
    "ya", "yan", "yang", "yao", "ye", "yi", "yin", "ying", "yo", "yong",
    "you", "yu", "yuan", "yue", "yun", "za", "zai", "zan", "zang", "zao",
    "ze", "zei", "zen", "zeng", "zha", "zhai", "zhan", "zhang", "zhao", "zhe",
    "zhei", "zhen", "zheng", "zhi", "zhong", "zhou", "zhu", "zhua", "zhuai",
    "zhuan", "zhuang", "zhui", "zhun", "zhuo", "zi", "zong", "zou", "zu",
    "zuan", "zui", "zun", "zuo",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn parse_full(s: &str) -> Pinyin {
        let text = chars(s);
        let (p, rest) = parse(&text).unwrap();
        assert!(rest.is_empty(), "trailing input after {s:?}: {rest:?}");
        p
    }

    #[test]
    fn sound_table_is_sorted_and_unique() {
        for w in SOUNDS.windows(2) {
            assert!(w[0] < w[1], "{:?} out of order", w);
        }
    }

    #[test]
    fn parse_bare_sound() {
        let p = parse_full("a");
        let (sound, tone) = p.decode();
        assert_eq!(sound.as_str(), "a");
        assert_eq!(tone, Tone::Neutral);
    }

    #[test]
    fn parse_digit_tones() {
        assert_eq!(parse_full("a3").to_string(), "ǎ");
        assert_eq!(parse_full("tuan4").to_string(), "tuàn");
        assert_eq!(parse_full("pie1").to_string(), "piē");
        assert_eq!(parse_full("mei3").to_string(), "měi");
        assert_eq!(parse_full("liu4").to_string(), "liù");
        assert_eq!(parse_full("ou1").to_string(), "ōu");
    }

    #[test]
    fn parse_diacritic_tones() {
        // The mark may sit on the "wrong" vowel in the input; rendering
        // re-places it by rule.
        assert_eq!(parse_full("tiaō").to_string(), "tiāo");
        assert_eq!(parse_full("hǎo").to_string(), "hǎo");
    }

    #[test]
    fn parse_syllabic_nasal() {
        assert_eq!(parse_full("n2").to_string(), "ń");
        assert_eq!(parse_full("hm").to_string(), "hm");
    }

    #[test]
    fn parse_u_umlaut_spellings() {
        assert_eq!(parse_full("lu:3").to_string(), "lǚ");
        assert_eq!(parse_full("lv3").to_string(), "lǚ");
    }

    #[test]
    fn parse_erhua_r() {
        assert_eq!(parse_full("r5").to_string(), "r");
    }

    #[test]
    fn neutral_tone_renders_unmarked() {
        assert_eq!(parse_full("de5").to_string(), "de");
    }

    #[test]
    fn parse_rejects_non_syllables() {
        assert!(parse(&chars("xyz")).is_none());
        assert!(parse(&chars("q")).is_none());
        assert!(parse(&chars("")).is_none());
    }

    #[test]
    fn second_tone_assignment_stops_the_parse() {
        let text = chars("ǎ1");
        let (p, rest) = parse(&text).unwrap();
        assert_eq!(p.to_string(), "ǎ");
        assert_eq!(rest, &['1']);
    }

    #[test]
    fn longest_match_keeps_remainder() {
        let text = chars("zhongwen");
        let (p, rest) = parse(&text).unwrap();
        assert_eq!(p.to_string(), "zhong");
        assert_eq!(rest, &['w', 'e', 'n']);
    }

    #[test]
    fn parse_many_with_apostrophe() {
        let text = chars("nü'ér");
        let (ps, rest) = parse_many(&text);
        assert!(rest.is_empty());
        assert_eq!(ps.len(), 2);
        assert_eq!(render_many(&ps), "nü'ér");
    }

    #[test]
    fn render_many_separates_bare_vowels() {
        let text = chars("xi'an4");
        let (ps, rest) = parse_many(&text);
        assert!(rest.is_empty());
        assert_eq!(render_many(&ps), "xi'àn");
    }

    #[test]
    fn packed_round_trip() {
        let p = parse_full("sheng4");
        assert_eq!(Pinyin::from_bits(p.bits()), p);
        assert!(p.bits() < 0x8000);
    }
}
