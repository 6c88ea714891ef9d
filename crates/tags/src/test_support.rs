//! Builders for synthetic FLAC streams used across the unit tests.

use crate::flac::{BLOCK_TYPE_STREAMINFO, BLOCK_TYPE_VORBIS_COMMENT, FLAC_MAGIC};

pub(crate) const STREAMINFO_LEN: usize = 34;

/// Comment block payload with an entry count matching `entries`
pub(crate) fn comment_block(vendor: &str, entries: &[&str]) -> Vec<u8> {
    let mut block = Vec::new();
    block.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    block.extend_from_slice(vendor.as_bytes());
    block.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for entry in entries {
        block.extend_from_slice(&(entry.len() as u32).to_le_bytes());
        block.extend_from_slice(entry.as_bytes());
    }
    block
}

/// Magic followed by `blocks`; the last one gets the last-block flag
pub(crate) fn flac_stream(blocks: &[(u8, Vec<u8>)]) -> Vec<u8> {
    let mut stream = FLAC_MAGIC.to_vec();
    for (index, (block_type, payload)) in blocks.iter().enumerate() {
        let mut first = *block_type & 0x7F;
        if index == blocks.len() - 1 {
            first |= 0x80;
        }
        let size = payload.len() as u32;
        stream.push(first);
        stream.extend_from_slice(&size.to_be_bytes()[1..]);
        stream.extend_from_slice(payload);
    }
    // A few bytes standing in for audio frames
    stream.extend_from_slice(&[0xFF, 0xF8, 0x00, 0x00]);
    stream
}

/// STREAMINFO, PADDING, then a comment block holding `entries`
pub(crate) fn tagged_flac(entries: &[&str]) -> Vec<u8> {
    flac_stream(&[
        (BLOCK_TYPE_STREAMINFO, vec![0; STREAMINFO_LEN]),
        (1, vec![0; 16]),
        (
            BLOCK_TYPE_VORBIS_COMMENT,
            comment_block("reference libFLAC 1.4.3 20230623", entries),
        ),
    ])
}
