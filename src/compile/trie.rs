//! Mutable trie assembled while entries stream in.

use rustc_hash::FxHashMap;

pub(crate) struct Trie {
    pub(crate) nodes: Vec<Node>,
}

#[derive(Default)]
pub(crate) struct Node {
    pub(crate) children: FxHashMap<char, u32>,
    pub(crate) meanings: Vec<NodeMeaning>,
}

#[derive(Clone, Copy)]
pub(crate) struct NodeMeaning {
    /// Index into the compiler's meaning list.
    pub(crate) index: u32,
    /// Preferred readings sort ahead of the rest at serialization.
    pub(crate) preferred: bool,
}

impl Trie {
    pub(crate) fn new() -> Trie {
        Trie {
            nodes: vec![Node::default()],
        }
    }

    /// Walks `word` from the root, adding nodes as needed, and records
    /// `meaning` on the final node. Children always receive larger ids
    /// than their parents, which the serializer's size sweep relies on.
    pub(crate) fn insert(&mut self, word: &[char], meaning: NodeMeaning) {
        let mut at = 0usize;
        for &c in word {
            at = match self.nodes[at].children.get(&c).copied() {
                Some(child) => child as usize,
                None => {
                    let child = self.nodes.len() as u32;
                    self.nodes.push(Node::default());
                    self.nodes[at].children.insert(c, child);
                    child as usize
                }
            };
        }
        self.nodes[at].meanings.push(meaning);
    }
}
