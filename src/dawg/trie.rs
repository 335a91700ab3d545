use log::debug;
use smallvec::SmallVec;

use super::alphabet::{IntoWord, Letter};
use super::graph::WordGraph;
use super::node::{Node, NodeId};

/// Builds a trie of normalized words in an arena of owned nodes.
///
/// Words may be inserted in any order. Once all words are in, [`finish`](TrieBuilder::finish)
/// counts the words below each node and computes the per-edge rank offsets, producing an
/// immutable [`Trie`].
pub struct TrieBuilder {
    nodes: Vec<Node>,
    counted: bool,
    ranked: bool,
}

impl Default for TrieBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrieBuilder {
    /// Creates a builder holding only an empty root.
    pub fn new() -> Self {
        TrieBuilder {
            nodes: vec![Node::new(false)],
            counted: false,
            ranked: false,
        }
    }

    /// Inserts a normalized word, creating one node per new letter.
    ///
    /// Re-inserting a word that is already present changes nothing. Returns true if
    /// the word was new.
    pub fn insert(&mut self, word: &[Letter]) -> bool {
        let mut current = NodeId::ROOT;
        for &letter in word {
            current = match self.nodes[current.index()].get(letter) {
                Some(child) => child,
                None => {
                    let child = NodeId::new(self.nodes.len());
                    self.nodes.push(Node::new(false));
                    self.nodes[current.index()].insert(letter, child);
                    child
                }
            };
        }
        let node = &mut self.nodes[current.index()];
        let added = !node.is_word();
        if added {
            node.set_word();
            self.counted = false;
            self.ranked = false;
        }
        added
    }

    /// Computes the number of words below every node, bottom-up, and returns the
    /// total. Counts are memoized until the next successful insert.
    pub fn count_words(&mut self) -> u32 {
        if !self.counted {
            for id in post_order(&self.nodes, NodeId::ROOT) {
                let node = &self.nodes[id.index()];
                let count = u32::from(node.is_word())
                    + node
                        .children()
                        .map(|(_, c)| self.nodes[c.index()].words_under())
                        .sum::<u32>();
                self.nodes[id.index()].set_words_under(count);
            }
            self.counted = true;
        }
        self.nodes[NodeId::ROOT.index()].words_under()
    }

    /// Assigns each edge the sum of the word counts of its earlier siblings.
    ///
    /// Counts words first if needed.
    pub fn compute_rank_offsets(&mut self) {
        if self.ranked {
            return;
        }
        self.count_words();
        for i in 0..self.nodes.len() {
            let mut partial = 0;
            let offsets: SmallVec<[u32; 4]> = self.nodes[i]
                .children()
                .map(|(_, c)| {
                    let offset = partial;
                    partial += self.nodes[c.index()].words_under();
                    offset
                })
                .collect();
            self.nodes[i].set_offsets(offsets);
        }
        self.ranked = true;
    }

    /// Counts words, computes rank offsets and returns the finished trie.
    pub fn finish(mut self) -> Trie {
        self.compute_rank_offsets();
        debug!(
            "trie: {} words, {} nodes",
            self.nodes[NodeId::ROOT.index()].words_under(),
            self.nodes.len()
        );
        Trie { nodes: self.nodes }
    }
}

/// A counted and ranked trie. Every node has exactly one parent.
#[derive(Clone, Debug)]
pub struct Trie {
    nodes: Vec<Node>,
}

impl Trie {
    /// Returns the nodes below `root` in post-order (children before parents).
    pub(crate) fn post_order(&self) -> Vec<NodeId> {
        post_order(&self.nodes, self.root())
    }
}

impl WordGraph for Trie {
    fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Builds a trie from an iterator of words, silently dropping words that fail
/// normalization.
///
/// # Examples
///
/// ```
/// use boggle_dawg::dawg::trie::build_trie;
/// use boggle_dawg::dawg::alphabet::bogglify_word;
/// use boggle_dawg::dawg::WordGraph;
///
/// let trie = build_trie(["sea", "tea", "teapot", "qi"]);
/// assert_eq!(trie.word_count(), 3);
/// assert_eq!(trie.get_word_index(&bogglify_word("tea").unwrap()), Some(1));
/// ```
pub fn build_trie<W: IntoWord>(words: impl IntoIterator<Item = W>) -> Trie {
    let mut builder = TrieBuilder::new();
    for word in words {
        if let Some(word) = word.into_word() {
            builder.insert(&word);
        }
    }
    builder.finish()
}

/// Iterative post-order walk; depth is bounded by the longest word.
fn post_order(nodes: &[Node], root: NodeId) -> Vec<NodeId> {
    let mut order = Vec::with_capacity(nodes.len());
    let mut stack = vec![(root, false)];
    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            order.push(id);
        } else {
            stack.push((id, true));
            stack.extend(nodes[id.index()].children().map(|(_, c)| (c, false)));
        }
    }
    order
}
