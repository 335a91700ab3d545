/// The Boggle alphabet and word normalization.
pub mod alphabet;
/// Linearization of the DAWG into a dense array.
pub mod compact;
/// The full pipeline from word list to encoded dictionary.
pub mod compile;
/// GraphViz output for inspecting tries and DAWGs.
pub mod dot;
/// Binary formats and read-only views over them.
pub mod encode;
/// Error types.
pub mod error;
/// Queries shared by the trie and the DAWG.
pub mod graph;
/// Trie minimization.
pub mod minimize;
/// Node storage shared by the trie and the DAWG.
pub mod node;
/// Trie construction, word counts and rank offsets.
pub mod trie;
/// Rank cross-checks across pipeline stages.
pub mod verify;

pub use alphabet::{bogglify_word, IntoWord, Letter, Word};
pub use compact::{compact, CompactDawg, Layout};
pub use compile::{
    compile, compile_file, compile_words, CompileOptions, CompileStats, Compiled, WordList,
};
pub use encode::{encode, Format, FormatAView, FormatBView, PackedRecord};
pub use error::{CompileError, Result};
pub use graph::WordGraph;
pub use minimize::{minimize, Dawg};
pub use node::{Node, NodeId};
pub use trie::{build_trie, Trie, TrieBuilder};
