//! Comment block decoding.
//!
//! A comment block payload is laid out as little-endian length-prefixed
//! strings:
//!
//! ```text
//! u32 vendor_len | vendor bytes
//! u32 entry_count
//! u32 entry_len  | "KEY=VALUE"      (repeated)
//! ```
//!
//! Nothing is null terminated. Decoding stops when the whole block has been
//! consumed.

use byteorder::{ByteOrder, LittleEndian};
use tagshelf_core::{Error, Result};
use tracing::{debug, warn};

const LENGTH_PREFIX: usize = 4;

/// One `KEY=VALUE` entry and where its text starts in the block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEntry {
    text: String,
    offset: usize,
}

impl CommentEntry {
    /// Full entry text, `KEY=VALUE`
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Offset of the entry text within the block (after its length prefix)
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Split at the first `=`. Values may themselves contain `=`.
    pub fn split(&self) -> Option<(&str, &str)> {
        self.text.split_once('=')
    }

    /// Offset of the first value byte within the block
    pub fn value_offset(&self) -> Option<usize> {
        self.split().map(|(key, _)| self.offset + key.len() + 1)
    }
}

/// Decoded comment block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBlock {
    pub vendor: String,
    pub entries: Vec<CommentEntry>,
}

struct BlockCursor<'a> {
    block: &'a [u8],
    pos: usize,
}

impl<'a> BlockCursor<'a> {
    fn remaining(&self) -> usize {
        self.block.len() - self.pos
    }

    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(LENGTH_PREFIX)?;
        Ok(LittleEndian::read_u32(bytes))
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::TruncatedBlock);
        }
        let bytes = &self.block[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a length-prefixed string, returning its bytes and their offset
    fn read_prefixed(&mut self) -> Result<(&'a [u8], usize)> {
        let len = self.read_u32()? as usize;
        let offset = self.pos;
        Ok((self.read_bytes(len)?, offset))
    }
}

/// Decode a comment block payload.
///
/// The vendor string must contain one of `vendor_signatures`; an empty slice
/// accepts any vendor. Entries must be valid UTF-8.
///
/// # Errors
///
/// - `CorruptMetadata` when the vendor check fails or an entry is not UTF-8
/// - `TruncatedBlock` when a length prefix runs past the end of the block
pub fn decode_comment_block(block: &[u8], vendor_signatures: &[String]) -> Result<CommentBlock> {
    let mut cursor = BlockCursor { block, pos: 0 };

    let (vendor_bytes, _) = cursor.read_prefixed()?;
    let vendor = String::from_utf8_lossy(vendor_bytes).into_owned();
    if !vendor_signatures.is_empty()
        && !vendor_signatures
            .iter()
            .any(|signature| vendor.contains(signature.as_str()))
    {
        return Err(Error::CorruptMetadata(format!(
            "unrecognized vendor '{}'",
            vendor
        )));
    }
    debug!(%vendor, "comment block vendor accepted");

    // A block holding only the vendor string has no entries
    let declared = if cursor.remaining() == 0 {
        0
    } else {
        cursor.read_u32()?
    };

    let mut entries = Vec::new();
    while cursor.remaining() > 0 {
        let (bytes, offset) = cursor.read_prefixed()?;
        let text = std::str::from_utf8(bytes).map_err(|e| {
            Error::CorruptMetadata(format!("entry at byte {} is not UTF-8: {}", offset, e))
        })?;
        entries.push(CommentEntry {
            text: text.to_string(),
            offset,
        });
    }

    if entries.len() != declared as usize {
        warn!(
            declared,
            found = entries.len(),
            "comment entry count does not match block contents"
        );
    }

    Ok(CommentBlock { vendor, entries })
}

/// Leading-integer parse: optional whitespace, then digits up to the first
/// non-digit. Anything without leading digits, or negative, is 0.
pub fn parse_leading_int(value: &str) -> u32 {
    let trimmed = value.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().unwrap_or(0)
}

/// Parse a track or disc position such as `3` or `3/12`.
///
/// Returns the number and, for the slash form, the total.
pub fn parse_position(value: &str) -> (u32, Option<u32>) {
    match value.split_once('/') {
        Some((number, total)) => (parse_leading_int(number), Some(parse_leading_int(total))),
        None => (parse_leading_int(value), None),
    }
}
