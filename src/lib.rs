//! # boggle-dawg
//!
//! Compiles a word list into a minimized, bit-packed dictionary that a Boggle solver
//! can memory-map and query directly.
//!
//! The pipeline runs in a single pass, each stage consuming the previous one:
//!
//! 1. **Normalize**: keep words of at least three letters over `a-z` in which every
//!    `q` is followed by `u`, and collapse "qu" into the single letter `q`.
//! 2. **Trie**: insert the words into an arena of nodes, then count the words below
//!    each node and the rank offset of each edge.
//! 3. **Minimize**: merge structurally identical subtrees into a
//!    [DAWG](https://en.wikipedia.org/wiki/Deterministic_acyclic_finite_state_automaton).
//! 4. **Compact**: number the DAWG breadth-first into an array, optionally sharing
//!    runs of identical children between nodes.
//! 5. **Encode**: write the array as fixed 8-byte records (or the variable-length
//!    32-bit format).
//! 6. **Verify**: check that every word's rank agrees across all representations.
//!
//! ## Quick Start
//!
//! ```
//! use boggle_dawg::dawg::{bogglify_word, compile_words, CompileOptions, FormatBView};
//!
//! let compiled = compile_words(["sea", "tea", "teapot"], &CompileOptions::default()).unwrap();
//! let dict = FormatBView::new(&compiled.bytes).unwrap();
//!
//! let is_word = |w: &str| bogglify_word(w).is_some_and(|w| dict.contains(&w));
//! assert!(is_word("teapot"));
//! assert!(!is_word("teap"));
//! ```
//!
//! ## Stage by stage
//!
//! ```
//! use boggle_dawg::dawg::{bogglify_word, build_trie, compact, minimize, Layout, WordGraph};
//!
//! let trie = build_trie(["sea", "tea", "teapot"]);
//! let dawg = minimize(&trie);
//! assert!(dawg.node_count() < trie.node_count());
//!
//! let array = compact(&dawg, Layout::Contiguous { share_runs: true });
//! let teapot = bogglify_word("teapot").unwrap();
//! assert_eq!(array.get_word_index(&teapot), Some(2));
//! ```

#![warn(missing_docs)]

/// Dictionary compiler: normalization, trie, DAWG, compaction and encoding.
pub mod dawg;
