use log::debug;

use super::alphabet::{word_to_string, Word};
use super::compact::CompactDawg;
use super::error::{CompileError, Result};
use super::graph::WordGraph;
use super::minimize::Dawg;
use super::trie::Trie;

/// Cross-checks word ranks across every representation of the dictionary.
///
/// `words` must be sorted and free of duplicates. For each word the rank is
/// computed by summing sibling counts in the trie, by the trie's cached edge offsets,
/// by summing sibling counts in the DAWG, and by walking the compacted array; all of
/// them must equal the word's position in `words`. The word counts of all three
/// structures must also equal `words.len()`, so no extra words were accepted.
///
/// # Errors
///
/// Returns [`CompileError::RankMismatch`] for the first disagreement.
pub fn verify(words: &[Word], trie: &Trie, dawg: &Dawg, array: &CompactDawg) -> Result<()> {
    debug_assert!(words.windows(2).all(|pair| pair[0] < pair[1]));

    for (expected, word) in words.iter().enumerate() {
        let expected = expected as u32;
        let naive = trie.get_word_index(word);
        let tracking = trie.get_word_index_tracking(word);
        let in_dawg = dawg.get_word_index(word);
        let compact = array.get_word_index(word);
        if [naive, tracking, in_dawg, compact]
            .iter()
            .any(|&rank| rank != Some(expected))
        {
            return Err(CompileError::RankMismatch {
                word: word_to_string(word),
                expected,
                naive,
                tracking,
                dawg: in_dawg,
                compact,
            });
        }
    }

    let total = words.len() as u32;
    for (name, count) in [
        ("trie", trie.word_count()),
        ("dawg", dawg.word_count()),
        ("array", array.word_count()),
    ] {
        if count != total {
            return Err(CompileError::Malformed(format!(
                "{name} holds {count} words, expected {total}"
            )));
        }
    }

    debug!("verified ranks of {} words", words.len());
    Ok(())
}
