//! The internal Boggle alphabet and word normalization.
//!
//! Words are stored as sequences of letter indices (`'a'` = 0 .. `'z'` = 25). A Boggle
//! die carries "Qu" on a single face, so the letter `q` only ever appears as the start of
//! "qu" in an accepted word and the pair is collapsed into the single symbol `q`.

use smallvec::SmallVec;

/// A letter index in `0..NUM_LETTERS`.
pub type Letter = u8;

/// A normalized ("bogglified") word.
pub type Word = SmallVec<[Letter; 32]>;

/// Number of letter positions in a child mask.
pub const NUM_LETTERS: usize = 26;

/// Letter index of `q`, which always stands for "qu".
pub const LETTER_Q: Letter = b'q' - b'a';

/// Shortest word accepted by the normalizer, counted in letters before collapsing "qu".
pub const MIN_WORD_LEN: usize = 3;

/// Returns true if `word` can be played on a Boggle board.
///
/// The word must be at least [`MIN_WORD_LEN`] characters long, consist only of `a-z`,
/// and every `q` must be immediately followed by a `u`.
pub fn is_boggle_word(word: &str) -> bool {
    let bytes = word.as_bytes();
    if bytes.len() < MIN_WORD_LEN {
        return false;
    }
    bytes.iter().enumerate().all(|(i, &b)| {
        b.is_ascii_lowercase() && (b != b'q' || bytes.get(i + 1) == Some(&b'u'))
    })
}

/// Normalizes a raw word into letter indices, collapsing "qu" into `q`.
///
/// Returns `None` if the word is rejected by [`is_boggle_word`]; no partially
/// converted word is ever produced.
pub fn bogglify_word(word: &str) -> Option<Word> {
    if !is_boggle_word(word) {
        return None;
    }
    let mut out = Word::new();
    let mut bytes = word.bytes();
    while let Some(b) = bytes.next() {
        if b == b'q' {
            // Validated above: the next byte is 'u'.
            bytes.next();
        }
        out.push(b - b'a');
    }
    Some(out)
}

/// Returns the letter index for an ASCII lowercase character.
#[inline]
pub fn letter_index(ch: char) -> Option<Letter> {
    ch.is_ascii_lowercase().then(|| ch as u8 - b'a')
}

/// Returns the display form of a letter (`q` is shown as "qu").
pub fn letter_str(letter: Letter) -> &'static str {
    const LETTERS: [&str; NUM_LETTERS] = [
        "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "qu",
        "r", "s", "t", "u", "v", "w", "x", "y", "z",
    ];
    LETTERS[letter as usize]
}

/// Expands a normalized word back into its spelling.
pub fn word_to_string(word: &[Letter]) -> String {
    word.iter().map(|&l| letter_str(l)).collect()
}

/// Trait for types that can be normalized into a [`Word`].
///
/// Implemented for string types (which go through [`bogglify_word`]) and for
/// already-normalized letter sequences (which are checked for range only).
pub trait IntoWord {
    /// Normalizes this value, or returns `None` if it is not a valid Boggle word.
    fn into_word(self) -> Option<Word>;
}

impl IntoWord for &str {
    fn into_word(self) -> Option<Word> {
        bogglify_word(self)
    }
}

impl IntoWord for &&str {
    fn into_word(self) -> Option<Word> {
        bogglify_word(self)
    }
}

impl IntoWord for String {
    fn into_word(self) -> Option<Word> {
        bogglify_word(&self)
    }
}

impl IntoWord for &String {
    fn into_word(self) -> Option<Word> {
        bogglify_word(self)
    }
}

impl IntoWord for Word {
    fn into_word(self) -> Option<Word> {
        self.iter()
            .all(|&l| (l as usize) < NUM_LETTERS)
            .then_some(self)
    }
}

impl IntoWord for &[Letter] {
    fn into_word(self) -> Option<Word> {
        Word::from_slice(self).into_word()
    }
}

/// Returns true if this line is a comment.
pub(crate) fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}
