use hashbrown::HashMap;
use log::debug;

use super::graph::WordGraph;
use super::node::{Node, NodeId};
use super::trie::Trie;

/// A minimized trie: structurally identical subtrees are stored once and may be
/// shared by several parents.
///
/// Nodes are stored in the order they were canonicalized, so every child precedes
/// its parents and the root is the last node.
#[derive(Clone, Debug)]
pub struct Dawg {
    nodes: Vec<Node>,
    root: NodeId,
}

impl WordGraph for Dawg {
    fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Registry of canonical nodes, keyed by `(is_word, [(letter, child id)])`.
///
/// Lookups only compare child ids, which is sound as long as every child was
/// canonicalized before its parent.
struct Canonicalizer {
    nodes: Vec<Node>,
    classes: HashMap<Node, NodeId>,
}

impl Canonicalizer {
    fn canonicalize(&mut self, node: Node) -> NodeId {
        debug_assert!(
            node.children().all(|(_, c)| c.index() < self.nodes.len()),
            "Cannot canonicalize unless all children are canonical"
        );

        if let Some(&id) = self.classes.get(&node) {
            debug_assert_eq!(self.nodes[id.index()].words_under(), node.words_under());
            id
        } else {
            let id = NodeId::new(self.nodes.len());
            self.nodes.push(node.clone());
            self.classes.insert(node, id);
            id
        }
    }
}

/// Merges structurally identical subtrees of `trie` into a DAWG.
///
/// Children are minimized before their parents, so two nodes are merged exactly when
/// they agree on `is_word`, on their set of edge letters, and on the canonical node
/// behind every edge. Word counts and rank offsets carry over unchanged, since merged
/// nodes accept the same suffixes. The trie itself is left untouched.
///
/// # Examples
///
/// ```
/// use boggle_dawg::dawg::minimize::minimize;
/// use boggle_dawg::dawg::trie::build_trie;
/// use boggle_dawg::dawg::WordGraph;
///
/// let trie = build_trie(["bake", "cake", "fake"]);
/// let dawg = minimize(&trie);
/// assert_eq!(dawg.word_count(), 3);
/// assert!(dawg.node_count() < trie.node_count());
/// ```
pub fn minimize(trie: &Trie) -> Dawg {
    let mut canonical = vec![None; trie.node_count()];
    let mut state = Canonicalizer {
        nodes: Vec::new(),
        classes: HashMap::new(),
    };

    for id in trie.post_order() {
        let node = trie.node(id).map_children(|child| {
            canonical[child.index()].expect("children are visited before their parent")
        });
        canonical[id.index()] = Some(state.canonicalize(node));
    }

    let root = canonical[trie.root().index()].expect("root is visited last");
    debug!(
        "minimized {} trie nodes into {} DAWG nodes",
        trie.node_count(),
        state.nodes.len()
    );
    Dawg {
        nodes: state.nodes,
        root,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dawg::alphabet::bogglify_word;
    use crate::dawg::trie::build_trie;

    fn w(word: &str) -> crate::dawg::alphabet::Word {
        bogglify_word(word).unwrap()
    }

    #[test]
    fn graph_shares_nodes() {
        let dawg1 = minimize(&build_trie(["abcdef"]));
        assert_eq!(dawg1.node_count(), "abcdef".len() + 1);

        let dawg2 = minimize(&build_trie(["abcdef", "abdef", "abef", "aef"]));
        assert_eq!(dawg1.node_count(), dawg2.node_count());
    }

    #[test]
    fn single_word_is_a_chain() {
        let trie = build_trie(["aaa"]);
        let dawg = minimize(&trie);
        assert_eq!(trie.node_count(), 4);
        assert_eq!(dawg.node_count(), 4);
    }

    #[test]
    fn empty_word_list_keeps_the_root() {
        let dawg = minimize(&build_trie::<&str>([]));
        assert_eq!(dawg.node_count(), 1);
        assert_eq!(dawg.word_count(), 0);
        assert!(!dawg.node(dawg.root()).is_word());
        assert_eq!(dawg.node(dawg.root()).child_mask(), 0);
    }

    #[test]
    fn word_final_leaves_are_merged() {
        let dawg = minimize(&build_trie(["sea", "tea", "teapot"]));
        let sea_end = dawg.find(&w("sea")).unwrap();
        let teapot_end = dawg.find(&w("teapot")).unwrap();
        assert_eq!(sea_end, teapot_end);
        // "tea" continues into "teapot", so its end node stays distinct.
        assert_ne!(dawg.find(&w("tea")).unwrap(), sea_end);
        for (i, word) in ["sea", "tea", "teapot"].iter().enumerate() {
            assert_eq!(dawg.get_word_index(&w(word)), Some(i as u32));
        }
    }

    #[test]
    fn suffixes_are_shared() {
        let testdata = [
            "asuffix",
            "bsuffix",
            "cdesuffix",
            "fffffffsuffix",
            "inbetween",
            "jsuffix",
            "xxsuffix",
        ];
        let dawg = minimize(&build_trie(testdata));
        let suffix_node = dawg.find(&[0, b's' - b'a']).unwrap();
        for word in testdata {
            if let Some(prefix) = word.strip_suffix("uffix") {
                let path: Vec<_> = prefix.bytes().map(|b| b - b'a').collect();
                assert_eq!(dawg.find(&path), Some(suffix_node), "{word}");
            }
        }
    }

    #[test]
    fn accepts_exactly_the_inserted_words() {
        let words = ["bake", "baked", "baker", "cake", "caked", "fake", "lake"];
        let trie = build_trie(words);
        let dawg = minimize(&trie);
        assert!(dawg.node_count() <= trie.node_count());
        assert_eq!(dawg.word_count(), words.len() as u32);
        for word in words {
            assert!(dawg.is_word(&w(word)));
        }
        for word in ["bak", "make", "cakes", "baking"] {
            assert!(!dawg.is_word(&w(word)));
        }
    }

    #[test]
    fn ranks_survive_minimization() {
        let words = ["bake", "baked", "baker", "cake", "caked", "fake", "lake"];
        let dawg = minimize(&build_trie(words));
        for (i, word) in words.iter().enumerate() {
            assert_eq!(dawg.get_word_index(&w(word)), Some(i as u32));
            assert_eq!(dawg.get_word_index_tracking(&w(word)), Some(i as u32));
        }
    }

    #[test]
    fn minimization_is_deterministic() {
        let words = ["sea", "tea", "teapot", "seaport", "tee", "see"];
        let a = minimize(&build_trie(words));
        let b = minimize(&build_trie(words));
        assert_eq!(a.root(), b.root());
        assert_eq!(a.nodes, b.nodes);
    }
}
