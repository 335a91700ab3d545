//! Binary encodings of a [`CompactDawg`] and read-only views over them.
//!
//! Both formats are little-endian and place the root first.
//!
//! **Format A** ([`Format::Variable`]) is a sequence of 32-bit words. Each node is
//!
//! ```text
//! [child_mask | is_word << 31] [word_count] [delta_0] .. [delta_{k-1}]
//! ```
//!
//! where `k = popcount(child_mask)` and `delta_i` is the signed distance, in 32-bit
//! words, from the start of this node to the start of its `i`-th child.
//!
//! **Format B** ([`Format::Packed`]) stores every slot of a contiguous array in one
//! 64-bit record:
//!
//! ```text
//! bits  0..26  child_mask
//! bit   26     is_word
//! bits 27..43  first_child_delta (unsigned; first child slot minus this slot, 0 for leaves)
//! bits 43..59  mark (reserved for the search engine, always written as 0)
//! bits 59..64  zero
//! ```
//!
//! Values that do not fit their field abort the encoding with
//! [`CompileError::FieldOverflow`]; nothing is ever truncated.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use super::alphabet::{word_to_string, Letter, NUM_LETTERS};
use super::compact::{ChildSlots, CompactDawg, Layout};
use super::error::{CompileError, Result};

/// The binary output formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// Format A: variable-length nodes of 32-bit words with explicit child deltas
    /// and word counts.
    Variable,
    /// Format B: fixed 8-byte records over a contiguous array.
    #[default]
    Packed,
}

/// Size of one Format B record in bytes.
pub const RECORD_BYTES: usize = 8;

const MASK_BITS: u32 = NUM_LETTERS as u32;
const WORD_SHIFT: u32 = MASK_BITS;
const DELTA_SHIFT: u32 = WORD_SHIFT + 1;
const DELTA_BITS: u32 = 16;
const MARK_SHIFT: u32 = DELTA_SHIFT + DELTA_BITS;
const MARK_BITS: u32 = 16;

const CHILD_MASK: u32 = (1 << MASK_BITS) - 1;
const FORMAT_A_WORD_BIT: u32 = 1 << 31;

/// A decoded Format B record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackedRecord {
    /// Bit `i` is set if there is a child for letter `i`.
    pub child_mask: u32,
    /// True if this slot ends a word.
    pub is_word: bool,
    /// Distance from this slot to its first child.
    pub first_child_delta: u16,
    /// Reserved; the compiler always writes 0.
    pub mark: u16,
}

impl PackedRecord {
    /// Packs the record into its 64-bit representation.
    pub fn pack(&self) -> u64 {
        debug_assert_eq!(self.child_mask & !CHILD_MASK, 0);
        u64::from(self.child_mask & CHILD_MASK)
            | u64::from(self.is_word) << WORD_SHIFT
            | u64::from(self.first_child_delta) << DELTA_SHIFT
            | u64::from(self.mark) << MARK_SHIFT
    }

    /// Unpacks a 64-bit record. Bits above the mark field are ignored.
    pub fn unpack(raw: u64) -> Self {
        PackedRecord {
            child_mask: (raw & u64::from(CHILD_MASK)) as u32,
            is_word: (raw >> WORD_SHIFT) & 1 == 1,
            first_child_delta: ((raw >> DELTA_SHIFT) & ((1 << DELTA_BITS) - 1)) as u16,
            mark: ((raw >> MARK_SHIFT) & ((1 << MARK_BITS) - 1)) as u16,
        }
    }

    /// Number of children.
    #[inline]
    pub fn child_count(&self) -> u32 {
        self.child_mask.count_ones()
    }
}

/// Encodes `array` in the requested format.
pub fn encode(array: &CompactDawg, format: Format) -> Result<Vec<u8>> {
    match format {
        Format::Variable => encode_format_a(array),
        Format::Packed => encode_format_b(array),
    }
}

fn overflow(
    array: &CompactDawg,
    field: &'static str,
    slot: u32,
    value: i64,
    bits: u32,
) -> CompileError {
    let word = array
        .example_word(slot)
        .unwrap_or_else(|| array.origin(slot));
    CompileError::FieldOverflow {
        field,
        slot,
        value,
        bits,
        word: word_to_string(&word),
    }
}

fn checked_mask(array: &CompactDawg, slot: u32) -> Result<u32> {
    let mask = array.node(slot).child_mask();
    if mask & !CHILD_MASK != 0 {
        return Err(overflow(array, "child_mask", slot, i64::from(mask), MASK_BITS));
    }
    Ok(mask)
}

/// Encodes a contiguous array as Format B.
pub fn encode_format_b(array: &CompactDawg) -> Result<Vec<u8>> {
    let mismatch = || CompileError::LayoutMismatch {
        format: "format B",
        layout: "scattered",
    };
    if array.layout() == Layout::Scattered {
        return Err(mismatch());
    }

    let mut out = Vec::with_capacity(array.len() * RECORD_BYTES);
    for slot in 0..array.len() as u32 {
        let node = array.node(slot);
        let child_mask = checked_mask(array, slot)?;
        let delta = match *node.children() {
            ChildSlots::Run(first) => i64::from(first) - i64::from(slot),
            ChildSlots::List(_) => return Err(mismatch()),
        };
        let in_range = if node.child_count() == 0 {
            delta == 0
        } else {
            delta > 0 && delta < 1 << DELTA_BITS
        };
        if !in_range {
            return Err(overflow(array, "first_child_delta", slot, delta, DELTA_BITS));
        }
        let record = PackedRecord {
            child_mask,
            is_word: node.is_word(),
            first_child_delta: delta as u16,
            mark: 0,
        };
        out.write_u64::<LittleEndian>(record.pack())?;
    }
    Ok(out)
}

/// Encodes an array of either layout as Format A.
pub fn encode_format_a(array: &CompactDawg) -> Result<Vec<u8>> {
    // Word offset of every node: two header words plus one delta per child.
    let mut positions = Vec::with_capacity(array.len());
    let mut total: u64 = 0;
    for node in array.nodes() {
        positions.push(total);
        total += 2 + node.child_count() as u64;
    }

    let mut out = Vec::with_capacity(total as usize * 4);
    for slot in 0..array.len() as u32 {
        let node = array.node(slot);
        let mut header = checked_mask(array, slot)?;
        if node.is_word() {
            header |= FORMAT_A_WORD_BIT;
        }
        out.write_u32::<LittleEndian>(header)?;
        out.write_u32::<LittleEndian>(node.words_under())?;

        let here = positions[slot as usize] as i64;
        for (_, child) in array.child_slots(slot) {
            let delta = positions[child as usize] as i64 - here;
            let delta = i32::try_from(delta)
                .map_err(|_| overflow(array, "child_delta", slot, delta, 32))?;
            out.write_i32::<LittleEndian>(delta)?;
        }
    }
    debug_assert_eq!(out.len() as u64, total * 4);
    Ok(out)
}

/// Read-only view over a Format B buffer, as the search engine would map it.
#[derive(Clone, Copy, Debug)]
pub struct FormatBView<'a> {
    bytes: &'a [u8],
}

impl<'a> FormatBView<'a> {
    /// Wraps an encoded buffer.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Malformed`] if the buffer is empty or not a whole
    /// number of records.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        if bytes.is_empty() || bytes.len() % RECORD_BYTES != 0 {
            return Err(CompileError::Malformed(format!(
                "{} bytes is not a positive multiple of {RECORD_BYTES}",
                bytes.len()
            )));
        }
        Ok(FormatBView { bytes })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.bytes.len() / RECORD_BYTES
    }

    /// Always false; a valid buffer holds at least the root.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decodes the record at `slot`.
    pub fn record(&self, slot: u32) -> Option<PackedRecord> {
        let start = slot as usize * RECORD_BYTES;
        let raw = self.bytes.get(start..start + RECORD_BYTES)?;
        Some(PackedRecord::unpack(LittleEndian::read_u64(raw)))
    }

    /// Iterates over all records in slot order.
    pub fn records(&self) -> impl Iterator<Item = PackedRecord> + 'a {
        self.bytes
            .chunks_exact(RECORD_BYTES)
            .map(|raw| PackedRecord::unpack(LittleEndian::read_u64(raw)))
    }

    /// Returns the child slot for `letter`, or `None` if there is no such edge.
    pub fn descend(&self, slot: u32, letter: Letter) -> Option<u32> {
        let record = self.record(slot)?;
        let bit = 1u32.checked_shl(u32::from(letter))?;
        if record.child_mask & bit == 0 {
            return None;
        }
        let child = slot
            + u32::from(record.first_child_delta)
            + (record.child_mask & (bit - 1)).count_ones();
        ((child as usize) < self.len()).then_some(child)
    }

    /// True if `slot` ends a word.
    pub fn is_word(&self, slot: u32) -> bool {
        self.record(slot).is_some_and(|r| r.is_word)
    }

    /// Follows `word` from the root.
    pub fn find(&self, word: &[Letter]) -> Option<u32> {
        word.iter().try_fold(0, |slot, &letter| self.descend(slot, letter))
    }

    /// Returns true if `word` is in the dictionary.
    pub fn contains(&self, word: &[Letter]) -> bool {
        self.find(word).is_some_and(|slot| self.is_word(slot))
    }

    /// Returns true if some word in the dictionary starts with `prefix`.
    pub fn has_prefix(&self, prefix: &[Letter]) -> bool {
        self.find(prefix).is_some()
    }
}

/// Read-only view over a Format A buffer. Nodes are addressed by their offset in
/// 32-bit words; the root is at offset 0.
#[derive(Clone, Copy, Debug)]
pub struct FormatAView<'a> {
    bytes: &'a [u8],
}

impl<'a> FormatAView<'a> {
    /// Wraps an encoded buffer.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Malformed`] if the buffer cannot hold a root node or is
    /// not a whole number of 32-bit words.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < 8 || bytes.len() % 4 != 0 {
            return Err(CompileError::Malformed(format!(
                "{} bytes cannot hold a format A dictionary",
                bytes.len()
            )));
        }
        Ok(FormatAView { bytes })
    }

    fn word(&self, pos: usize) -> Option<u32> {
        let raw = self.bytes.get(pos * 4..pos * 4 + 4)?;
        Some(LittleEndian::read_u32(raw))
    }

    /// Child mask of the node at `pos`.
    pub fn child_mask(&self, pos: u32) -> Option<u32> {
        self.word(pos as usize).map(|header| header & CHILD_MASK)
    }

    /// True if the node at `pos` ends a word.
    pub fn is_word(&self, pos: u32) -> bool {
        self.word(pos as usize)
            .is_some_and(|header| header & FORMAT_A_WORD_BIT != 0)
    }

    /// Number of words reachable from the node at `pos`.
    pub fn word_count(&self, pos: u32) -> Option<u32> {
        self.word(pos as usize + 1)
    }

    fn child_at(&self, pos: u32, index: u32) -> Option<u32> {
        let delta = self.word(pos as usize + 2 + index as usize)? as i32;
        let child = i64::from(pos) + i64::from(delta);
        u32::try_from(child)
            .ok()
            .filter(|&c| (c as usize) * 4 < self.bytes.len())
    }

    /// Returns the offset of the child for `letter`, or `None` if there is no such edge.
    pub fn descend(&self, pos: u32, letter: Letter) -> Option<u32> {
        let mask = self.child_mask(pos)?;
        let bit = 1u32.checked_shl(u32::from(letter))?;
        if mask & bit == 0 {
            return None;
        }
        self.child_at(pos, (mask & (bit - 1)).count_ones())
    }

    /// Follows `word` from the root.
    pub fn find(&self, word: &[Letter]) -> Option<u32> {
        word.iter().try_fold(0, |pos, &letter| self.descend(pos, letter))
    }

    /// Returns true if `word` is in the dictionary.
    pub fn contains(&self, word: &[Letter]) -> bool {
        self.find(word).is_some_and(|pos| self.is_word(pos))
    }

    /// Returns true if some word in the dictionary starts with `prefix`.
    pub fn has_prefix(&self, prefix: &[Letter]) -> bool {
        self.find(prefix).is_some()
    }

    /// Returns the 0-based lexicographic rank of `word` using the stored word counts.
    pub fn get_word_index(&self, word: &[Letter]) -> Option<u32> {
        let mut index = 0;
        let mut pos = 0;
        for &letter in word {
            index += u32::from(self.is_word(pos));
            let mask = self.child_mask(pos)?;
            let earlier = mask & (1u32.checked_shl(u32::from(letter))? - 1);
            for i in 0..earlier.count_ones() {
                index += self.word_count(self.child_at(pos, i)?)?;
            }
            pos = self.descend(pos, letter)?;
        }
        self.is_word(pos).then_some(index)
    }
}
