use std::hash;

use smallvec::SmallVec;

use super::alphabet::Letter;

/// Index of a node within its owning arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The first node of an arena that is built top-down.
    pub const ROOT: NodeId = NodeId(0);

    /// Creates an id from an arena index.
    #[inline]
    pub fn new(index: usize) -> Self {
        NodeId(u32::try_from(index).expect("arena exceeds u32::MAX nodes"))
    }

    /// Returns the arena index of this id.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A compact representation of the children of a node that doesn't allocate until
/// there are at least three children. Edges are kept sorted by letter.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Children {
    /// No children.
    #[default]
    None,
    /// Exactly one child (letter, node).
    One((Letter, NodeId)),
    /// Exactly two children (letter1, node1, letter2, node2).
    Two((Letter, NodeId, Letter, NodeId)),
    /// Three or more children stored in a vector.
    Many(Vec<(Letter, NodeId)>),
}

impl Children {
    /// Gets the child at the specified position.
    ///
    /// Returns `None` if the position is out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<(Letter, NodeId)> {
        match self {
            Children::None => None,
            Children::One(child) => (index == 0).then_some(*child),
            Children::Two((c1, n1, c2, n2)) => match index {
                0 => Some((*c1, *n1)),
                1 => Some((*c2, *n2)),
                _ => None,
            },
            Children::Many(children) => children.get(index).copied(),
        }
    }

    /// Returns the number of children.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Children::None => 0,
            Children::One(_) => 1,
            Children::Two(_) => 2,
            Children::Many(children) => children.len(),
        }
    }

    /// Returns true if there are no children.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Children::None)
    }

    /// Inserts an edge in sorted position.
    fn insert(&mut self, letter: Letter, child: NodeId) {
        *self = match std::mem::take(self) {
            Children::None => Children::One((letter, child)),
            Children::One((c1, n1)) => {
                debug_assert!(c1 != letter, "insert: letter already exists");
                if letter < c1 {
                    Children::Two((letter, child, c1, n1))
                } else {
                    Children::Two((c1, n1, letter, child))
                }
            }
            Children::Two((c1, n1, c2, n2)) => {
                debug_assert!(c1 != letter && c2 != letter, "insert: letter already exists");
                let mut v = vec![(c1, n1), (c2, n2), (letter, child)];
                v.sort_unstable_by_key(|&(c, _)| c);
                Children::Many(v)
            }
            Children::Many(mut children) => {
                debug_assert!(children.iter().all(|&(c, _)| c != letter));
                let pos = children.partition_point(|&(c, _)| c < letter);
                children.insert(pos, (letter, child));
                Children::Many(children)
            }
        };
    }
}

/// An iterator over the `(letter, child)` edges of a node, in letter order.
#[derive(Clone)]
pub struct ChildIter<'n> {
    children: &'n Children,
    index: usize,
}

impl Iterator for ChildIter<'_> {
    type Item = (Letter, NodeId);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let next_child = self.children.get(self.index)?;
        self.index += 1;
        Some(next_child)
    }

    /// Since we know the exact size, we can do better than the default implementation.
    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.children.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ChildIter<'_> {}

/// A trie or DAWG node.
///
/// Besides its edges, a node carries the number of words reachable from it and,
/// once ranks have been computed, one rank offset per child: the number of words
/// below the lexicographically earlier siblings of that child.
#[derive(Clone, Debug, Default, Eq)]
pub struct Node {
    children: Children,
    word: bool,
    words_under: u32,
    offsets: SmallVec<[u32; 4]>,
}

impl Node {
    /// Creates a new node without children.
    pub fn new(word: bool) -> Self {
        Node {
            word,
            ..Node::default()
        }
    }

    /// Returns the child that letter's edge leads to, or None if no such edge exists.
    #[inline]
    pub fn get(&self, letter: Letter) -> Option<NodeId> {
        match &self.children {
            Children::None => None,
            Children::One((ch, node)) => (*ch == letter).then_some(*node),
            Children::Two((c1, n1, c2, n2)) => {
                if letter == *c1 {
                    Some(*n1)
                } else if letter == *c2 {
                    Some(*n2)
                } else {
                    None
                }
            }
            Children::Many(children) => children
                .binary_search_by_key(&letter, |&(c, _)| c)
                .ok()
                .map(|i| children[i].1),
        }
    }

    /// Returns the position of `letter` among this node's edges.
    #[inline]
    pub fn position(&self, letter: Letter) -> Option<usize> {
        self.children().position(|(c, _)| c == letter)
    }

    /// True if this node corresponds to the end of a word.
    #[inline]
    pub fn is_word(&self) -> bool {
        self.word
    }

    pub(crate) fn set_word(&mut self) {
        self.word = true;
    }

    /// Inserts a child edge, keeping edges sorted by letter.
    pub fn insert(&mut self, letter: Letter, child: NodeId) {
        self.children.insert(letter, child);
    }

    /// Returns an iterator over all children of this node.
    #[inline]
    pub fn children(&self) -> ChildIter<'_> {
        ChildIter {
            children: &self.children,
            index: 0,
        }
    }

    /// Returns the number of children.
    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Returns the bitmask of letters that have an outgoing edge.
    pub fn child_mask(&self) -> u32 {
        self.children().fold(0, |mask, (c, _)| mask | 1 << c)
    }

    /// Number of words reachable from this node, counting the node itself.
    ///
    /// Zero until the words have been counted.
    #[inline]
    pub fn words_under(&self) -> u32 {
        self.words_under
    }

    pub(crate) fn set_words_under(&mut self, count: u32) {
        self.words_under = count;
    }

    /// Rank offset of the child at `position`, if ranks have been computed.
    #[inline]
    pub fn child_offset(&self, position: usize) -> Option<u32> {
        self.offsets.get(position).copied()
    }

    pub(crate) fn set_offsets(&mut self, offsets: SmallVec<[u32; 4]>) {
        debug_assert_eq!(offsets.len(), self.child_count());
        self.offsets = offsets;
    }

    /// Returns a copy of this node with every child id passed through `map`.
    pub(crate) fn map_children(&self, mut map: impl FnMut(NodeId) -> NodeId) -> Node {
        let children = match &self.children {
            Children::None => Children::None,
            Children::One((c, n)) => Children::One((*c, map(*n))),
            Children::Two((c1, n1, c2, n2)) => Children::Two((*c1, map(*n1), *c2, map(*n2))),
            Children::Many(children) => {
                Children::Many(children.iter().map(|&(c, n)| (c, map(n))).collect())
            }
        };
        Node {
            children,
            word: self.word,
            words_under: self.words_under,
            offsets: self.offsets.clone(),
        }
    }
}

// Equality only looks one level down: nodes are canonicalized bottom-up, so two
// children are equivalent exactly when their ids are equal. Counts and offsets are
// derived from the structure and are left out.
impl PartialEq for Node {
    fn eq(&self, rhs: &Self) -> bool {
        self.word == rhs.word && self.children == rhs.children
    }
}

// Just as for PartialEq, only hash child ids instead of recursing to the leaves.
impl hash::Hash for Node {
    fn hash<H>(&self, state: &mut H)
    where
        H: hash::Hasher,
    {
        self.word.hash(state);
        for (letter, node) in self.children() {
            (letter, node).hash(state);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hashbrown::HashSet;

    fn id(i: usize) -> NodeId {
        NodeId::new(i)
    }

    #[test]
    fn no_children() {
        let n = Node::new(false);
        assert_eq!(n.children().next(), None);
        assert_eq!(n.child_count(), 0);
        assert_eq!(n.child_mask(), 0);
    }

    #[test]
    fn children_stay_sorted() {
        let mut n = Node::new(false);
        n.insert(7, id(1));
        n.insert(2, id(2));
        n.insert(9, id(3));
        n.insert(0, id(4));
        let letters: Vec<_> = n.children().map(|(c, _)| c).collect();
        assert_eq!(letters, [0, 2, 7, 9]);
        assert_eq!(n.children().len(), 4);
        assert_eq!(n.get(7), Some(id(1)));
        assert_eq!(n.get(0), Some(id(4)));
        assert_eq!(n.get(8), None);
        assert_eq!(n.position(9), Some(3));
        assert_eq!(n.child_mask(), 1 | 1 << 2 | 1 << 7 | 1 << 9);
    }

    #[test]
    fn two_children() {
        let mut n = Node::new(true);
        n.insert(3, id(5));
        n.insert(1, id(6));
        let mut children = n.children();
        assert_eq!(children.next(), Some((1, id(6))));
        assert_eq!(children.next(), Some((3, id(5))));
        assert_eq!(children.next(), None);
    }

    #[test]
    fn a_full_alphabet_of_children() {
        let mut n = Node::new(false);
        for letter in (0..26).rev() {
            n.insert(letter, id(letter as usize + 100));
        }
        for letter in 0..26 {
            assert_eq!(n.get(letter), Some(id(letter as usize + 100)));
        }
        assert_eq!(n.child_mask(), (1 << 26) - 1);
    }

    #[test]
    fn equality_uses_child_identity_only() {
        let mut a = Node::new(true);
        a.insert(0, id(1));
        a.set_words_under(3);
        let mut b = Node::new(true);
        b.insert(0, id(1));
        b.set_words_under(9);
        assert_eq!(a, b);

        let mut c = Node::new(true);
        c.insert(0, id(2));
        assert_ne!(a, c);
        assert_ne!(a, Node::new(false));

        let set: HashSet<Node> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn map_children_rewrites_ids() {
        let mut n = Node::new(false);
        n.insert(0, id(1));
        n.insert(1, id(2));
        n.insert(2, id(3));
        let m = n.map_children(|c| id(c.index() * 10));
        let ids: Vec<_> = m.children().map(|(_, c)| c.index()).collect();
        assert_eq!(ids, [10, 20, 30]);
    }
}
