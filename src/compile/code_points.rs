//! Sorted table of every code point the compiled dictionary references.
//!
//! Edge labels and variant diffs store 16-bit indexes into this table
//! instead of full code points, which is what keeps the trie region small.

use crate::DictError;

pub(crate) struct CodePointTable {
    points: Vec<char>,
}

impl CodePointTable {
    pub(crate) fn new() -> CodePointTable {
        CodePointTable { points: Vec::new() }
    }

    /// Inserts `c` keeping the table sorted; duplicates are ignored.
    pub(crate) fn add(&mut self, c: char) {
        if let Err(at) = self.points.binary_search(&c) {
            self.points.insert(at, c);
        }
    }

    /// Index of a previously added code point.
    ///
    /// Indexes shift while entries are still being added, so callers must
    /// only resolve them once the table is complete. Asking for a code
    /// point that was never added is a compiler bug, not bad input, and
    /// panics.
    pub(crate) fn index_of(&self, c: char) -> Result<u16, DictError> {
        let at = match self.points.binary_search(&c) {
            Ok(at) => at,
            Err(_) => panic!("code point {c:?} was never added to the table"),
        };
        u16::try_from(at).map_err(|_| {
            DictError::Overflow(format!(
                "code point table index {at} for {c:?} exceeds 16 bits"
            ))
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.points.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.points.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_sorted_and_deduplicated() {
        let mut table = CodePointTable::new();
        for c in ['好', '你', '好', 'A', '你'] {
            table.add(c);
        }
        assert_eq!(table.len(), 3);
        let points: Vec<char> = table.iter().collect();
        assert_eq!(points, vec!['A', '你', '好']);
        assert_eq!(table.index_of('A').unwrap(), 0);
        assert_eq!(table.index_of('你').unwrap(), 1);
        assert_eq!(table.index_of('好').unwrap(), 2);
    }
}
