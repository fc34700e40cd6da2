//! Binary emission of the compiled dictionary.
//!
//! All multi-byte fields are big-endian. The blob is, in order: the code
//! point count, the sorted code point table (24 bits each), the trie region
//! length, the trie region itself and finally the meaning region. Edges
//! carry absolute offsets to their child's content block, so the whole trie
//! can be emitted in one append-only depth-first pass once subtree sizes
//! are known.

use crate::DictError;

use super::code_points::CodePointTable;
use super::trie::{Node, NodeMeaning, Trie};
use super::MeaningRecord;
use crate::cedict::Syllable;

pub(crate) fn serialize(
    trie: &Trie,
    meanings: &[MeaningRecord],
    table: &CodePointTable,
) -> Result<Vec<u8>, DictError> {
    let sizes = subtree_sizes(trie);
    let mut out = Vec::new();
    push_u24(&mut out, table.len(), "code point count")?;
    for c in table.iter() {
        push_u24(&mut out, c as usize, "code point")?;
    }
    push_u24(&mut out, sizes[0], "trie region length")?;
    write_node(&mut out, trie, 0, &sizes, table)?;
    // Offset array first, then the records it points at. Offsets are
    // relative to the start of the meaning region.
    let mut rel = 3 * meanings.len();
    for meaning in meanings {
        push_u24(&mut out, rel, "meaning record offset")?;
        rel += record_size(meaning);
    }
    for meaning in meanings {
        write_record(&mut out, meaning, table)?;
    }
    Ok(out)
}

/// Byte size of every node record, children's content blocks included.
///
/// Nodes are created parent-before-child, so a single reverse sweep sees
/// every child before the node that owns it.
fn subtree_sizes(trie: &Trie) -> Vec<usize> {
    let mut sizes = vec![0usize; trie.nodes.len()];
    for id in (0..trie.nodes.len()).rev() {
        let mut size = 2;
        for &child in trie.nodes[id].children.values() {
            let child = child as usize;
            size += 6 + 3 * trie.nodes[child].meanings.len() + sizes[child];
        }
        sizes[id] = size;
    }
    sizes
}

fn write_node(
    out: &mut Vec<u8>,
    trie: &Trie,
    id: usize,
    sizes: &[usize],
    table: &CodePointTable,
) -> Result<(), DictError> {
    let mut children: Vec<(char, usize)> = trie.nodes[id]
        .children
        .iter()
        .map(|(&c, &child)| (c, child as usize))
        .collect();
    children.sort_by_key(|&(c, _)| c);
    let edges = children.len();
    if edges > usize::from(u16::MAX) {
        return Err(DictError::Overflow(format!(
            "trie node has {edges} edges, limit 65535"
        )));
    }
    push_u16(out, edges);
    // Content blocks trail the record header in child order, so each
    // absolute offset is the previous one plus that child's extent.
    let mut content = out.len() + 5 * edges;
    for &(c, child) in &children {
        push_u16(out, usize::from(table.index_of(c)?));
        push_u24(out, content, "node content offset")?;
        content += 1 + 3 * trie.nodes[child].meanings.len() + sizes[child];
    }
    for &(_, child) in &children {
        let list = ordered_meanings(&trie.nodes[child]);
        if list.len() > usize::from(u8::MAX) {
            return Err(DictError::Overflow(format!(
                "trie node carries {} meanings, limit 255",
                list.len()
            )));
        }
        out.push(list.len() as u8);
        for meaning in &list {
            push_u24(out, meaning.index as usize, "meaning index")?;
        }
        write_node(out, trie, child, sizes, table)?;
    }
    Ok(())
}

/// Meaning indexes of a node with the preferred readings moved to the
/// front, entry order preserved within each group.
fn ordered_meanings(node: &Node) -> Vec<NodeMeaning> {
    let mut list = node.meanings.clone();
    list.sort_by_key(|m| !m.preferred);
    list
}

fn write_record(
    out: &mut Vec<u8>,
    meaning: &MeaningRecord,
    table: &CodePointTable,
) -> Result<(), DictError> {
    out.push(meaning.hsk);
    let syllables = meaning.pinyin.len();
    if syllables > usize::from(u8::MAX) {
        return Err(DictError::Overflow(format!(
            "meaning has {syllables} pinyin syllables, limit 255"
        )));
    }
    out.push(syllables as u8);
    for syllable in &meaning.pinyin {
        match syllable {
            Syllable::Packed(p) => {
                let bits = p.bits();
                if bits > 0x7FFF {
                    return Err(DictError::Overflow(format!(
                        "packed pinyin value {bits} exceeds 15 bits"
                    )));
                }
                push_u16(out, usize::from(0x8000 | bits));
            }
            Syllable::Literal(text) => {
                // The high bit doubles as the packed flag, so literal
                // lengths stop at 127.
                if text.len() > 127 {
                    return Err(DictError::Overflow(format!(
                        "literal pinyin {text:?} longer than 127 bytes"
                    )));
                }
                out.push(text.len() as u8);
                out.extend_from_slice(text.as_bytes());
            }
        }
    }
    if meaning.glosses.len() > usize::from(u8::MAX) {
        return Err(DictError::Overflow(format!(
            "meaning has {} glosses, limit 255",
            meaning.glosses.len()
        )));
    }
    out.push(meaning.glosses.len() as u8);
    for gloss in &meaning.glosses {
        if gloss.len() > usize::from(u16::MAX) {
            return Err(DictError::Overflow(format!(
                "gloss of {} bytes exceeds 16 bits",
                gloss.len()
            )));
        }
        push_u16(out, gloss.len());
        out.extend_from_slice(gloss.as_bytes());
    }
    if meaning.variants.len() > usize::from(u8::MAX) {
        return Err(DictError::Overflow(format!(
            "meaning has {} variant differences, limit 255",
            meaning.variants.len()
        )));
    }
    out.push(meaning.variants.len() as u8);
    for variant in &meaning.variants {
        out.push(variant.pos);
        push_u16(out, usize::from(table.index_of(variant.traditional)?));
        push_u16(out, usize::from(table.index_of(variant.simplified)?));
    }
    Ok(())
}

/// Mirror of [`write_record`], used to lay out the offset array before any
/// record is written.
fn record_size(meaning: &MeaningRecord) -> usize {
    let mut size = 4;
    for syllable in &meaning.pinyin {
        size += match syllable {
            Syllable::Packed(_) => 2,
            Syllable::Literal(text) => 1 + text.len(),
        };
    }
    for gloss in &meaning.glosses {
        size += 2 + gloss.len();
    }
    size + 5 * meaning.variants.len()
}

fn push_u16(out: &mut Vec<u8>, v: usize) {
    out.push((v >> 8) as u8);
    out.push(v as u8);
}

fn push_u24(out: &mut Vec<u8>, v: usize, what: &str) -> Result<(), DictError> {
    if v > 0xFF_FFFF {
        return Err(DictError::Overflow(format!("{what} {v} exceeds 24 bits")));
    }
    out.push((v >> 16) as u8);
    out.push((v >> 8) as u8);
    out.push(v as u8);
    Ok(())
}
