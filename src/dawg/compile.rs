//! The full compilation pipeline: word list in, encoded dictionary out.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::{info, trace, warn};

use super::alphabet::{is_comment, IntoWord, Word};
use super::compact::{compact, Layout};
use super::encode::{encode, Format};
use super::error::Result;
use super::graph::WordGraph;
use super::minimize::minimize;
use super::trie::TrieBuilder;
use super::verify::verify;

/// Options for [`compile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    /// Output format. Format B (packed) by default.
    pub format: Format,
    /// Share runs of identical children in the contiguous layout. Ignored for
    /// Format A, which always uses the scattered layout.
    pub share_runs: bool,
    /// Cross-check every word's rank across all stages before encoding.
    pub verify: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            format: Format::Packed,
            share_runs: true,
            verify: true,
        }
    }
}

impl CompileOptions {
    /// Sets the output format.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Enables or disables run sharing.
    pub fn with_share_runs(mut self, share_runs: bool) -> Self {
        self.share_runs = share_runs;
        self
    }

    /// Enables or disables rank verification.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// The array layout implied by the output format.
    pub fn layout(&self) -> Layout {
        match self.format {
            Format::Variable => Layout::Scattered,
            Format::Packed => Layout::Contiguous {
                share_runs: self.share_runs,
            },
        }
    }
}

/// A normalized, sorted and deduplicated word list.
#[derive(Clone, Debug, Default)]
pub struct WordList {
    words: Vec<Word>,
    rejected: usize,
}

impl WordList {
    /// Normalizes `words`, dropping the ones that are not valid Boggle words.
    pub fn from_words<W: IntoWord>(words: impl IntoIterator<Item = W>) -> Self {
        let mut list = WordList::default();
        for word in words {
            list.push(word);
        }
        list.finish()
    }

    /// Reads one word per line. Surrounding whitespace is trimmed; blank lines and
    /// lines starting with '#' are skipped. Lines that are not valid UTF-8 are
    /// counted as rejected.
    pub fn from_reader(mut reader: impl BufRead) -> Result<Self> {
        let mut list = WordList::default();
        // Reuse one line buffer instead of allocating a String per line.
        let mut buf = Vec::with_capacity(80);
        while reader.read_until(b'\n', &mut buf)? != 0 {
            match std::str::from_utf8(&buf) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() && !is_comment(line) {
                        list.push(line);
                    }
                }
                Err(err) => {
                    trace!("dropping line that is not UTF-8: {err}");
                    list.rejected += 1;
                }
            }
            buf.clear();
        }
        Ok(list.finish())
    }

    /// Reads a word list file. See [`from_reader`](WordList::from_reader).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    fn push(&mut self, word: impl IntoWord) {
        match word.into_word() {
            Some(word) => self.words.push(word),
            None => {
                trace!("dropping word that is not playable");
                self.rejected += 1;
            }
        }
    }

    fn finish(mut self) -> Self {
        self.words.sort_unstable();
        self.words.dedup();
        self
    }

    /// The accepted words, sorted.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Number of accepted words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True if no word was accepted.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of words dropped by the normalizer.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

/// Sizes of every pipeline stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompileStats {
    /// Accepted, distinct words.
    pub words: usize,
    /// Words dropped by the normalizer.
    pub rejected: usize,
    /// Nodes in the trie.
    pub trie_nodes: usize,
    /// Nodes in the DAWG.
    pub dawg_nodes: usize,
    /// Slots in the compacted array.
    pub array_slots: usize,
    /// Size of the encoded dictionary.
    pub bytes: usize,
}

/// An encoded dictionary.
#[derive(Clone, Debug)]
pub struct Compiled {
    /// The encoded dictionary.
    pub bytes: Vec<u8>,
    /// Stage sizes.
    pub stats: CompileStats,
}

/// Runs the whole pipeline on a word list.
///
/// # Errors
///
/// Fails if verification finds a rank mismatch or a value does not fit the output
/// format. No partial output is returned.
///
/// # Examples
///
/// ```
/// use boggle_dawg::dawg::compile::{compile, CompileOptions, WordList};
/// use boggle_dawg::dawg::encode::FormatBView;
/// use boggle_dawg::dawg::alphabet::bogglify_word;
///
/// let words = WordList::from_words(["sea", "tea", "teapot", "qi"]);
/// let compiled = compile(&words, &CompileOptions::default()).unwrap();
/// let view = FormatBView::new(&compiled.bytes).unwrap();
/// assert!(view.contains(&bogglify_word("teapot").unwrap()));
/// assert_eq!(compiled.stats.rejected, 1);
/// ```
pub fn compile(list: &WordList, options: &CompileOptions) -> Result<Compiled> {
    let mut builder = TrieBuilder::new();
    for word in list.words() {
        builder.insert(word);
    }
    let trie = builder.finish();
    let dawg = minimize(&trie);
    let array = compact(&dawg, options.layout());

    if options.verify {
        verify(list.words(), &trie, &dawg, &array)?;
    }
    let bytes = encode(&array, options.format)?;

    let stats = CompileStats {
        words: list.len(),
        rejected: list.rejected(),
        trie_nodes: trie.node_count(),
        dawg_nodes: dawg.node_count(),
        array_slots: array.len(),
        bytes: bytes.len(),
    };
    info!(
        "{} words ({} rejected): {} trie nodes, {} DAWG nodes, {} slots, {} bytes",
        stats.words,
        stats.rejected,
        stats.trie_nodes,
        stats.dawg_nodes,
        stats.array_slots,
        stats.bytes
    );
    Ok(Compiled { bytes, stats })
}

/// Normalizes `words` and runs the whole pipeline.
pub fn compile_words<W: IntoWord>(
    words: impl IntoIterator<Item = W>,
    options: &CompileOptions,
) -> Result<Compiled> {
    compile(&WordList::from_words(words), options)
}

/// Compiles the word list at `input` and writes the dictionary to `output`.
///
/// The output file is only created once the dictionary has been fully built and
/// verified. If writing fails, the partially written file is removed.
pub fn compile_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &CompileOptions,
) -> Result<CompileStats> {
    let list = WordList::from_file(input)?;
    let Compiled { bytes, stats } = compile(&list, options)?;
    drop(list);
    write_output(output.as_ref(), &bytes)?;
    info!("wrote {} bytes to {}", bytes.len(), output.as_ref().display());
    Ok(stats)
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    let write = || -> std::io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        out.write_all(bytes)?;
        out.flush()?;
        out.get_ref().sync_all()
    };
    write().map_err(|err| {
        if let Err(remove_err) = fs::remove_file(path) {
            warn!("could not remove partial output {}: {remove_err}", path.display());
        }
        err.into()
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dawg::alphabet::bogglify_word;
    use crate::dawg::encode::{FormatAView, FormatBView};
    use crate::dawg::error::CompileError;
    use itertools::Itertools;

    fn w(word: &str) -> Word {
        bogglify_word(word).unwrap()
    }

    #[test]
    fn word_list_is_normalized_sorted_and_deduplicated() {
        let list = WordList::from_words(["teapot", "tea", "Tea", "qi", "sea", "tea", "quiz"]);
        assert_eq!(list.words(), [w("quiz"), w("sea"), w("tea"), w("teapot")]);
        assert_eq!(list.rejected(), 2);
    }

    #[test]
    fn reader_skips_comments_and_blank_lines() {
        let input = "# header\n\ntea\n  sea  \n   # indented comment\nteapot\r\nqat\n";
        let list = WordList::from_reader(input.as_bytes()).unwrap();
        assert_eq!(list.words(), [w("sea"), w("tea"), w("teapot")]);
        assert_eq!(list.rejected(), 1);
    }

    #[test]
    fn reader_drops_lines_that_are_not_utf8() {
        let input: &[u8] = b"tea\ncaf\xe9\nsea\n";
        let list = WordList::from_reader(input).unwrap();
        assert_eq!(list.words(), [w("sea"), w("tea")]);
        assert_eq!(list.rejected(), 1);
    }

    #[test]
    fn latin1_word_list_still_compiles() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("latin1.txt");
        let output = dir.path().join("latin1.bin");
        fs::write(&input, b"teapot\nna\xefve\nsea\n").unwrap();
        let stats = compile_file(&input, &output, &CompileOptions::default()).unwrap();
        assert_eq!(stats.words, 2);
        assert_eq!(stats.rejected, 1);
        assert!(output.exists());
    }

    #[test]
    fn empty_input_compiles_to_a_single_root() {
        let compiled = compile_words::<&str>([], &CompileOptions::default()).unwrap();
        assert_eq!(compiled.bytes, [0u8; 8]);
        assert_eq!(compiled.stats.array_slots, 1);
    }

    #[test]
    fn both_formats_hold_every_word() {
        let words = ["sea", "tea", "teapot", "seaport", "quest", "quests", "boggle"];
        let b = compile_words(words, &CompileOptions::default()).unwrap();
        let view_b = FormatBView::new(&b.bytes).unwrap();
        let a = compile_words(words, &CompileOptions::default().with_format(Format::Variable))
            .unwrap();
        let view_a = FormatAView::new(&a.bytes).unwrap();
        for word in words {
            assert!(view_a.contains(&w(word)));
            assert!(view_b.contains(&w(word)));
        }
        assert!(!view_a.contains(&w("teas")));
        assert!(!view_b.contains(&w("teas")));
    }

    #[test]
    fn sharing_never_grows_the_array() {
        let words = ["bad", "bae", "bat", "cad", "cae", "sea", "tea", "teapot", "ted", "tee"];
        let plain = compile_words(words, &CompileOptions::default().with_share_runs(false))
            .unwrap();
        let shared = compile_words(words, &CompileOptions::default()).unwrap();
        assert!(shared.stats.array_slots <= plain.stats.array_slots);
        assert_eq!(plain.stats.array_slots, plain.stats.trie_nodes);
        assert!(shared.stats.dawg_nodes <= shared.stats.trie_nodes);
    }

    #[test]
    fn input_order_does_not_change_the_output() {
        const WORDS: [&str; 6] = ["sea", "tea", "teapot", "seaport", "tee", "quote"];
        let expected = compile_words(WORDS, &CompileOptions::default()).unwrap().bytes;
        for order in WORDS.iter().permutations(WORDS.len()) {
            let compiled = compile_words(order, &CompileOptions::default()).unwrap();
            assert_eq!(compiled.bytes, expected);
        }
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("words.txt");
        let output = dir.path().join("words.bin");
        fs::write(&input, "tea\nsea\nteapot\nqi\n").unwrap();

        let stats = compile_file(&input, &output, &CompileOptions::default()).unwrap();
        assert_eq!(stats.words, 3);
        let bytes = fs::read(&output).unwrap();
        assert_eq!(bytes.len(), stats.bytes);
        let view = FormatBView::new(&bytes).unwrap();
        assert!(view.contains(&w("teapot")));
    }

    #[test]
    fn failed_build_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.txt");
        let output = dir.path().join("out.bin");
        let err = compile_file(&input, &output, &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::Io(_)));
        assert!(!output.exists());
    }

    #[test]
    fn unwritable_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("words.txt");
        fs::write(&input, "tea\n").unwrap();
        let output = dir.path().join("no-such-dir").join("out.bin");
        let err = compile_file(&input, &output, &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::Io(_)));
    }
}
