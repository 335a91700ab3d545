//! Linearization of a [`Dawg`] into a dense array of slots.
//!
//! Slots are numbered breadth-first from the root, which always lands in slot 0.
//! Two layouts are supported:
//!
//! - [`Layout::Scattered`]: every unique DAWG node gets exactly one slot, and each slot
//!   lists the slots of its children explicitly.
//! - [`Layout::Contiguous`]: each slot stores only a child mask and the index of its
//!   first child; the children occupy consecutive slots. A DAWG node may then occupy
//!   several slots, one per distinct sibling run it appears in. With `share_runs`,
//!   a node whose ordered children already appear as a run anywhere ahead of it
//!   points into that run instead of appending a copy.

use hashbrown::HashMap;
use log::debug;
use smallvec::SmallVec;

use super::alphabet::{Letter, Word};
use super::graph::WordGraph;
use super::minimize::Dawg;
use super::node::NodeId;

/// How a node's children are placed in the array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// One slot per unique node, with an explicit list of child slots.
    Scattered,
    /// Children stored as one contiguous run, addressed by the first child's slot.
    Contiguous {
        /// Reuse existing runs (or parts of runs) of identical children.
        share_runs: bool,
    },
}

/// Where a slot's children live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChildSlots {
    /// Explicit child slots, in letter order.
    List(SmallVec<[u32; 4]>),
    /// Children occupy `first..first + popcount(mask)`. Leaves point at themselves.
    Run(u32),
}

/// One slot of the compacted array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompactNode {
    word: bool,
    child_mask: u32,
    children: ChildSlots,
    words_under: u32,
}

impl CompactNode {
    /// True if this slot ends a word.
    #[inline]
    pub fn is_word(&self) -> bool {
        self.word
    }

    /// Bitmask of letters with an outgoing edge.
    #[inline]
    pub fn child_mask(&self) -> u32 {
        self.child_mask
    }

    /// Number of children, which is always `popcount(child_mask)`.
    #[inline]
    pub fn child_count(&self) -> usize {
        self.child_mask.count_ones() as usize
    }

    /// Number of words reachable from this slot, counting the slot itself.
    #[inline]
    pub fn words_under(&self) -> u32 {
        self.words_under
    }

    /// Placement of the children.
    #[inline]
    pub fn children(&self) -> &ChildSlots {
        &self.children
    }

    /// Slot of the child at `position` (in letter order).
    #[inline]
    fn child_at(&self, position: usize) -> u32 {
        match &self.children {
            ChildSlots::List(slots) => slots[position],
            ChildSlots::Run(first) => first + position as u32,
        }
    }
}

/// Iterator over the `(letter, slot)` children of a compact node.
pub struct ChildSlotIter<'a> {
    node: &'a CompactNode,
    mask: u32,
    position: usize,
}

impl Iterator for ChildSlotIter<'_> {
    type Item = (Letter, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.mask == 0 {
            return None;
        }
        let letter = self.mask.trailing_zeros() as Letter;
        self.mask &= self.mask - 1;
        let slot = self.node.child_at(self.position);
        self.position += 1;
        Some((letter, slot))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.mask.count_ones() as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ChildSlotIter<'_> {}

/// The DAWG linearized into an array. Slot 0 is the root.
#[derive(Clone, Debug)]
pub struct CompactDawg {
    nodes: Vec<CompactNode>,
    /// Parent slot and edge letter through which each slot was first reached.
    parents: Vec<Option<(u32, Letter)>>,
    layout: Layout,
}

impl CompactDawg {
    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root occupies slot 0 even for an empty word list.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The layout this array was built with.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// All slots, in array order.
    pub fn nodes(&self) -> &[CompactNode] {
        &self.nodes
    }

    /// The slot at `index`.
    #[inline]
    pub fn node(&self, slot: u32) -> &CompactNode {
        &self.nodes[slot as usize]
    }

    /// Returns the child slot for `letter`, or `None` if the mask bit is clear.
    #[inline]
    pub fn descend(&self, slot: u32, letter: Letter) -> Option<u32> {
        let node = self.node(slot);
        let bit = 1u32.checked_shl(u32::from(letter))?;
        if node.child_mask & bit == 0 {
            return None;
        }
        let position = (node.child_mask & (bit - 1)).count_ones() as usize;
        Some(node.child_at(position))
    }

    /// Iterates over the `(letter, slot)` children of `slot` in letter order.
    pub fn child_slots(&self, slot: u32) -> ChildSlotIter<'_> {
        let node = self.node(slot);
        ChildSlotIter {
            node,
            mask: node.child_mask,
            position: 0,
        }
    }

    /// Follows `word` from the root.
    pub fn find(&self, word: &[Letter]) -> Option<u32> {
        word.iter().try_fold(0, |slot, &letter| self.descend(slot, letter))
    }

    /// Returns true if `word` is in the array.
    pub fn is_word(&self, word: &[Letter]) -> bool {
        self.find(word).is_some_and(|slot| self.node(slot).is_word())
    }

    /// Number of words in the array.
    pub fn word_count(&self) -> u32 {
        self.nodes[0].words_under
    }

    /// Returns the 0-based lexicographic rank of `word`, or `None` if it is missing.
    pub fn get_word_index(&self, word: &[Letter]) -> Option<u32> {
        let mut index = 0;
        let mut slot = 0;
        for &letter in word {
            index += u32::from(self.node(slot).is_word());
            index += self
                .child_slots(slot)
                .take_while(|&(c, _)| c < letter)
                .map(|(_, child)| self.node(child).words_under)
                .sum::<u32>();
            slot = self.descend(slot, letter)?;
        }
        self.node(slot).is_word().then_some(index)
    }

    /// The letters on the path through which `slot` was first reached.
    pub fn origin(&self, slot: u32) -> Word {
        let mut path = Word::new();
        let mut current = slot;
        while let Some((parent, letter)) = self.parents[current as usize] {
            path.push(letter);
            current = parent;
        }
        path.reverse();
        path
    }

    /// The smallest word passing through `slot` along its origin path, used when
    /// reporting a problem with that slot.
    pub fn example_word(&self, slot: u32) -> Option<Word> {
        let mut word = self.origin(slot);
        let mut current = slot;
        while !self.node(current).is_word() {
            let (letter, child) = self.child_slots(current).next()?;
            word.push(letter);
            current = child;
        }
        Some(word)
    }
}

/// Linearizes `dawg` into an array using the given layout.
///
/// # Examples
///
/// ```
/// use boggle_dawg::dawg::compact::{compact, Layout};
/// use boggle_dawg::dawg::minimize::minimize;
/// use boggle_dawg::dawg::trie::build_trie;
///
/// let dawg = minimize(&build_trie(["sea", "tea", "teapot"]));
/// let array = compact(&dawg, Layout::Contiguous { share_runs: true });
/// assert_eq!(array.word_count(), 3);
/// assert!(array.is_word(&[19, 4, 0]));
/// ```
pub fn compact(dawg: &Dawg, layout: Layout) -> CompactDawg {
    match layout {
        Layout::Scattered => compact_scattered(dawg),
        Layout::Contiguous { share_runs } => compact_contiguous(dawg, share_runs),
    }
}

fn slot_index(index: usize) -> u32 {
    u32::try_from(index).expect("array exceeds u32::MAX slots")
}

fn compact_scattered(dawg: &Dawg) -> CompactDawg {
    // Slots are assigned on first discovery, so queue order is slot order.
    let mut slot_of: Vec<Option<u32>> = vec![None; dawg.node_count()];
    let mut order = vec![dawg.root()];
    let mut parents = vec![None];
    slot_of[dawg.root().index()] = Some(0);

    let mut nodes = Vec::with_capacity(dawg.node_count());
    let mut next = 0;
    while let Some(&id) = order.get(next) {
        let slot = slot_index(next);
        let node = dawg.node(id);
        let mut children = SmallVec::new();
        for (letter, child) in node.children() {
            let child_slot = *slot_of[child.index()].get_or_insert_with(|| {
                order.push(child);
                parents.push(Some((slot, letter)));
                slot_index(order.len() - 1)
            });
            children.push(child_slot);
        }
        nodes.push(CompactNode {
            word: node.is_word(),
            child_mask: node.child_mask(),
            children: ChildSlots::List(children),
            words_under: node.words_under(),
        });
        next += 1;
    }

    debug!("scattered layout: {} slots", nodes.len());
    CompactDawg {
        nodes,
        parents,
        layout: Layout::Scattered,
    }
}

type RunKey = SmallVec<[NodeId; 4]>;

/// Maps every contiguous sub-run of appended children to the slot where it starts.
struct RunRegistry {
    runs: HashMap<RunKey, u32>,
    hits: usize,
}

impl RunRegistry {
    /// Returns a run for `key` that starts after `slot`.
    fn lookup(&mut self, key: &[NodeId], slot: u32) -> Option<u32> {
        let first = *self.runs.get(key)?;
        (first > slot).then(|| {
            self.hits += 1;
            first
        })
    }

    /// Registers all sub-runs of a run appended at `first`. Existing entries are
    /// kept unless they start at or before `slot`, where no later slot can use them.
    fn register(&mut self, key: &[NodeId], first: u32, slot: u32) {
        for start in 0..key.len() {
            for end in start + 1..=key.len() {
                let offset = first + start as u32;
                self.runs
                    .entry(RunKey::from_slice(&key[start..end]))
                    .and_modify(|existing| {
                        if *existing <= slot {
                            *existing = offset;
                        }
                    })
                    .or_insert(offset);
            }
        }
    }
}

fn compact_contiguous(dawg: &Dawg, share_runs: bool) -> CompactDawg {
    let mut slots = vec![dawg.root()];
    let mut parents = vec![None];
    let mut registry = RunRegistry {
        runs: HashMap::new(),
        hits: 0,
    };

    let mut nodes = Vec::with_capacity(dawg.node_count());
    let mut next = 0;
    while let Some(&id) = slots.get(next) {
        let slot = slot_index(next);
        let node = dawg.node(id);
        let key: RunKey = node.children().map(|(_, child)| child).collect();

        let shared = if share_runs && !key.is_empty() {
            registry.lookup(&key, slot)
        } else {
            None
        };

        let first = if key.is_empty() {
            slot
        } else if let Some(first) = shared {
            first
        } else {
            let first = slot_index(slots.len());
            for (letter, child) in node.children() {
                slots.push(child);
                parents.push(Some((slot, letter)));
            }
            if share_runs {
                registry.register(&key, first, slot);
            }
            first
        };

        nodes.push(CompactNode {
            word: node.is_word(),
            child_mask: node.child_mask(),
            children: ChildSlots::Run(first),
            words_under: node.words_under(),
        });
        next += 1;
    }

    debug!(
        "contiguous layout: {} slots, {} shared runs, {} registered runs",
        nodes.len(),
        registry.hits,
        registry.runs.len()
    );
    CompactDawg {
        nodes,
        parents,
        layout: Layout::Contiguous { share_runs },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dawg::alphabet::{bogglify_word, word_to_string};
    use crate::dawg::minimize::minimize;
    use crate::dawg::trie::build_trie;

    const LAYOUTS: [Layout; 3] = [
        Layout::Scattered,
        Layout::Contiguous { share_runs: false },
        Layout::Contiguous { share_runs: true },
    ];

    fn w(word: &str) -> Word {
        bogglify_word(word).unwrap()
    }

    fn build(words: &[&str], layout: Layout) -> CompactDawg {
        compact(&minimize(&build_trie(words)), layout)
    }

    #[test]
    fn empty_word_list_is_a_single_root() {
        for layout in LAYOUTS {
            let array = build(&[], layout);
            assert_eq!(array.len(), 1);
            assert_eq!(array.node(0).child_mask(), 0);
            assert!(!array.node(0).is_word());
            assert_eq!(array.word_count(), 0);
        }
    }

    #[test]
    fn single_word_is_a_chain() {
        for layout in LAYOUTS {
            let array = build(&["aaa"], layout);
            assert_eq!(array.len(), 4, "{layout:?}");
            assert_eq!(array.find(&w("aaa")), Some(3));
            assert!(array.is_word(&w("aaa")));
        }
    }

    #[test]
    fn ranks_in_every_layout() {
        let words = ["sea", "tea", "teapot"];
        for layout in LAYOUTS {
            let array = build(&words, layout);
            for (i, word) in words.iter().enumerate() {
                assert_eq!(array.get_word_index(&w(word)), Some(i as u32), "{layout:?}");
            }
            assert_eq!(array.get_word_index(&w("teap")), None);
            assert!(!array.is_word(&w("sean")));
        }
    }

    #[test]
    fn mask_matches_children() {
        let words = ["bake", "baked", "baker", "cake", "caked", "fake", "lake", "quake"];
        for layout in LAYOUTS {
            let array = build(&words, layout);
            for slot in 0..array.len() as u32 {
                let node = array.node(slot);
                assert_eq!(array.child_slots(slot).count(), node.child_count());
                for (_, child) in array.child_slots(slot) {
                    assert!((child as usize) < array.len());
                }
            }
        }
    }

    #[test]
    fn scattered_layout_has_one_slot_per_node() {
        let words = ["bake", "baked", "cake", "caked", "fake"];
        let dawg = minimize(&build_trie(words));
        let array = compact(&dawg, Layout::Scattered);
        assert_eq!(array.len(), dawg.node_count());
    }

    #[test]
    fn unshared_contiguous_layout_is_tree_shaped() {
        let words = ["bake", "baked", "cake", "caked", "fake"];
        let trie = build_trie(words);
        let array = compact(&minimize(&trie), Layout::Contiguous { share_runs: false });
        assert_eq!(array.len(), trie.node_count());
    }

    #[test]
    fn contiguous_children_follow_their_parent() {
        let words = ["sea", "tea", "teapot", "seaport", "tee", "see", "set", "tet"];
        for share_runs in [false, true] {
            let array = build(&words, Layout::Contiguous { share_runs });
            for (slot, node) in array.nodes().iter().enumerate() {
                let ChildSlots::Run(first) = *node.children() else {
                    panic!("contiguous layout must use runs");
                };
                if node.child_count() > 0 {
                    assert!(first as usize > slot);
                    assert!(first as usize + node.child_count() <= array.len());
                }
            }
        }
    }

    #[test]
    fn sharing_reuses_partial_runs() {
        // "ba?" offers {d, e, t}; "ca?" offers {d, e}, a prefix of the first run.
        let words = ["bad", "bae", "bat", "cad", "cae"];
        let unshared = build(&words, Layout::Contiguous { share_runs: false });
        let shared = build(&words, Layout::Contiguous { share_runs: true });
        assert!(shared.len() < unshared.len());
        for word in words {
            assert!(shared.is_word(&w(word)), "{word}");
        }
        assert!(!shared.is_word(&w("cat")));
    }

    #[test]
    fn origin_reconstructs_the_discovery_path() {
        let array = build(&["sea", "tea", "teapot"], Layout::Contiguous { share_runs: true });
        let slot = array.find(&w("teap")).unwrap();
        assert_eq!(word_to_string(&array.origin(slot)), "teap");
        assert_eq!(word_to_string(&array.example_word(slot).unwrap()), "teapot");
        assert_eq!(array.origin(0).len(), 0);
    }

    #[test]
    fn out_of_range_letters_are_missing() {
        for layout in LAYOUTS {
            let array = build(&["bad", "tea"], layout);
            assert_eq!(array.descend(0, 26), None);
            assert_eq!(array.descend(0, 40), None);
            assert_eq!(array.find(&[40, 1, 2]), None);
            assert!(!array.is_word(&[40, 1, 2]));
            assert_eq!(array.get_word_index(&[40, 1, 2]), None);
            assert_eq!(array.get_word_index(&[1, 0, 255]), None);
        }
    }

    #[test]
    fn layouts_are_deterministic() {
        let words = ["sea", "tea", "teapot", "seaport", "tee", "see"];
        for layout in LAYOUTS {
            assert_eq!(build(&words, layout).nodes, build(&words, layout).nodes);
        }
    }
}
