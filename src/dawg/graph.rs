use super::alphabet::Letter;
use super::node::{Node, NodeId};

/// Read-only queries shared by the trie and the DAWG.
///
/// Both stages store their nodes in an arena indexed by [`NodeId`]; the provided
/// methods only need access to a node by id and to the root.
pub trait WordGraph {
    /// The root node.
    fn root(&self) -> NodeId;

    /// Returns the node with the given id.
    fn node(&self, id: NodeId) -> &Node;

    /// Number of unique nodes in the graph.
    fn node_count(&self) -> usize;

    /// Follows the edge for `letter` out of `id`.
    #[inline]
    fn descend(&self, id: NodeId, letter: Letter) -> Option<NodeId> {
        self.node(id).get(letter)
    }

    /// Follows `word` from the root.
    fn find(&self, word: &[Letter]) -> Option<NodeId> {
        word.iter()
            .try_fold(self.root(), |n, &letter| self.descend(n, letter))
    }

    /// Returns true if `word` is in the graph.
    fn is_word(&self, word: &[Letter]) -> bool {
        self.find(word).is_some_and(|n| self.node(n).is_word())
    }

    /// Returns true if some word in the graph starts with `prefix`.
    fn has_prefix(&self, prefix: &[Letter]) -> bool {
        self.find(prefix).is_some()
    }

    /// Number of words in the graph.
    fn word_count(&self) -> u32 {
        self.node(self.root()).words_under()
    }

    /// Returns the 0-based lexicographic rank of `word`, summing the word counts of
    /// all earlier siblings along the path. `None` if `word` is not in the graph.
    fn get_word_index(&self, word: &[Letter]) -> Option<u32> {
        let mut index = 0;
        let mut current = self.node(self.root());
        for &letter in word {
            index += u32::from(current.is_word());
            let mut next = None;
            for (c, child) in current.children() {
                if c < letter {
                    index += self.node(child).words_under();
                } else {
                    if c == letter {
                        next = Some(child);
                    }
                    break;
                }
            }
            current = self.node(next?);
        }
        current.is_word().then_some(index)
    }

    /// Same as [`get_word_index`](WordGraph::get_word_index), but uses the rank
    /// offsets stored on each edge so every step is a single lookup.
    ///
    /// Returns `None` if the word is missing or ranks were never computed.
    fn get_word_index_tracking(&self, word: &[Letter]) -> Option<u32> {
        let mut index = 0;
        let mut current = self.node(self.root());
        for &letter in word {
            let position = current.position(letter)?;
            index += u32::from(current.is_word()) + current.child_offset(position)?;
            current = self.node(current.get(letter)?);
        }
        current.is_word().then_some(index)
    }
}
