//! Chinese numeral parsing.
//!
//! Converts numbers written in Chinese notation to machine integers. Both
//! conventions are handled: positional notation with unit characters
//! (五百二十一 = 521, with an omitted leading 一 as in 十四 = 14) and plain
//! digit sequences (六零一二七 = 60127), including the financial and rare
//! variant characters.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// Streaming numeral parser.
///
/// Feed characters one at a time with [`consume`](Parser::consume); the
/// current value is always available. A rejected character leaves the state
/// untouched, so a caller can stop at the first `false` and keep the value
/// parsed so far.
#[derive(Debug, Default, Clone, Copy)]
pub struct Parser {
    value: i64,
    positional: bool,
    digits: bool,
}

impl Parser {
    pub fn new() -> Parser {
        Parser::default()
    }

    /// Parses one more character; returns whether it extended the number.
    pub fn consume(&mut self, c: char) -> bool {
        let Some(&val) = VALUES.get(&c) else {
            return false;
        };
        if val < 10 {
            if self.digits {
                self.value = self.value * 10 + val;
                return true;
            }
            if self.positional {
                if val == 0 {
                    return true;
                }
                if self.value % 10 != 0 {
                    return false;
                }
            } else if self.value % 10 != 0 {
                // Two adjacent small numerals switch to digit-sequence mode.
                self.digits = true;
                self.value = self.value * 10 + val;
                return true;
            }
            self.value += val;
            return true;
        }
        if self.digits {
            return false;
        }
        self.positional = true;
        let before = (self.value / (val * 10)) * val * 10;
        let after = self.value % val;
        if after == 0 {
            // A leading 一 before the unit may be omitted, as in 十四.
            self.value = before + val;
        } else {
            self.value = before + val * after;
        }
        true
    }

    /// The value parsed so far.
    pub fn value(&self) -> i64 {
        self.value
    }
}

/// Numeral characters and their values: standard, financial, and rare
/// variant forms.
static VALUES: Lazy<FxHashMap<char, i64>> = Lazy::new(|| TABLE.iter().copied().collect());

#[rustfmt::skip]
const TABLE: &[(char, i64)] = &[
    ('〇', 0), ('零', 0),
    ('一', 1), ('壱', 1), ('壹', 1), ('幺', 1), ('弌', 1), ('𠤪', 1),
    ('二', 2), ('㒃', 2), ('兩', 2), ('弍', 2), ('弐', 2), ('貮', 2),
    ('貳', 2), ('贰', 2), ('𢎐', 2),
    ('三', 3), ('仨', 3), ('叁', 3), ('参', 3), ('參', 3), ('叄', 3),
    ('弎', 3), ('𠫽', 3), ('𠬙', 3), ('𢦘', 3), ('𣬛', 3),
    ('四', 4), ('亖', 4), ('肆', 4), ('𠁤', 4), ('𠃢', 4), ('𦉭', 4),
    ('五', 5), ('㐅', 5), ('㠪', 5), ('伍', 5), ('𠄡', 5),
    ('六', 6), ('陆', 6), ('陸', 6), ('𠫪', 6),
    ('七', 7), ('㭍', 7), ('柒', 7), ('漆', 7), ('𠀁', 7),
    ('八', 8), ('捌', 8),
    ('九', 9), ('廾', 9), ('玖', 9),
    ('十', 10), ('什', 10), ('拾', 10),
    ('廿', 20), ('卄', 20),
    ('卅', 30), ('𠦃', 30),
    ('卌', 40), ('𠦌', 40), ('𠦜', 40),
    ('百', 100), ('佰', 100), ('陌', 100),
    ('千', 1000), ('仟', 1000), ('阡', 1000),
    ('万', 10000), ('萬', 10000),
    ('亿', 100000000), ('億', 100000000),
    ('兆', 1000000000000),
];
