//! FLAC metadata extraction.
//!
//! Walks the metadata block headers that follow the `fLaC` magic, decodes
//! the comment block and fills an [`AudioMetadata`] record, remembering
//! where each recognized value sits in the file.

use crate::comment::{CommentBlock, decode_comment_block, parse_leading_int, parse_position};
use byteorder::{BigEndian, ReadBytesExt};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tagshelf_core::{AudioMetadata, Error, Result, TagField};
use tracing::{debug, warn};

pub const FLAC_MAGIC: &[u8; 4] = b"fLaC";

pub const BLOCK_TYPE_STREAMINFO: u8 = 0;
pub const BLOCK_TYPE_VORBIS_COMMENT: u8 = 4;

/// A 4-byte metadata block header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub is_last: bool,
    pub block_type: u8,
    /// Payload size in bytes (24-bit)
    pub size: u32,
}

impl BlockHeader {
    /// Read a header; any short read is `TruncatedHeader`
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let first = reader.read_u8().map_err(|e| eof_as(e, Error::TruncatedHeader))?;
        let size = reader
            .read_u24::<BigEndian>()
            .map_err(|e| eof_as(e, Error::TruncatedHeader))?;

        Ok(Self {
            is_last: first & 0x80 != 0,
            block_type: first & 0x7F,
            size,
        })
    }
}

/// Read FLAC metadata from a file on disk
pub fn read_flac_metadata<P: AsRef<Path>>(
    path: P,
    vendor_signatures: &[String],
) -> Result<AudioMetadata> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    read_flac_from(&mut reader, path, vendor_signatures)
}

/// Read FLAC metadata from any seekable stream.
///
/// `source_path` is only recorded in the returned metadata. The stream must
/// be positioned at the start of the file so recorded offsets are absolute.
///
/// # Errors
///
/// - `NotAValidContainer` if the stream does not start with `fLaC`
/// - `TruncatedHeader` if a block header is cut short
/// - `TruncatedBlock` if the comment block body is cut short
/// - `CorruptMetadata` if the comment block fails to decode
pub fn read_flac_from<R: Read + Seek>(
    reader: &mut R,
    source_path: &Path,
    vendor_signatures: &[String],
) -> Result<AudioMetadata> {
    let mut magic = [0u8; 4];
    reader
        .read_exact(&mut magic)
        .map_err(|e| eof_as(e, Error::NotAValidContainer))?;
    if &magic != FLAC_MAGIC {
        return Err(Error::NotAValidContainer);
    }

    let mut meta = AudioMetadata::new(source_path);

    loop {
        let header = BlockHeader::read_from(reader)?;
        debug!(
            block_type = header.block_type,
            size = header.size,
            is_last = header.is_last,
            "metadata block"
        );

        if header.block_type == BLOCK_TYPE_VORBIS_COMMENT && meta.comment_block_offset().is_none()
        {
            meta.set_comment_block_offset(reader.stream_position()?);

            let mut block = vec![0u8; header.size as usize];
            reader
                .read_exact(&mut block)
                .map_err(|e| eof_as(e, Error::TruncatedBlock))?;

            let comments = decode_comment_block(&block, vendor_signatures).map_err(|e| match e {
                Error::CorruptMetadata(_) => e,
                other => Error::CorruptMetadata(other.to_string()),
            })?;
            apply_comments(&mut meta, &comments);
        } else {
            if header.block_type == BLOCK_TYPE_VORBIS_COMMENT {
                warn!(path = %source_path.display(), "ignoring extra comment block");
            }
            reader.seek(SeekFrom::Current(i64::from(header.size)))?;
        }

        if header.is_last {
            break;
        }
    }

    Ok(meta)
}

/// Copy recognized entries into `meta` and record their value locations.
///
/// Later entries for the same field replace earlier ones. A `3/12` style
/// track or disc number also supplies the total unless one is already set.
pub fn apply_comments(meta: &mut AudioMetadata, comments: &CommentBlock) {
    for entry in &comments.entries {
        let Some((key, value)) = entry.split() else {
            warn!(entry = entry.text(), "comment entry without '='");
            continue;
        };
        let Some(field) = TagField::from_key(key) else {
            debug!(key, "ignoring unrecognized tag");
            continue;
        };

        if let Some(value_offset) = entry.value_offset() {
            meta.locate_field(field, value_offset as u64, value.len());
        }

        if let Some(text) = meta.text_mut(field) {
            *text = value.to_string();
            continue;
        }

        match field {
            TagField::TrackNumber | TagField::DiscNumber => {
                let (number, total) = parse_position(value);
                let total_field = if field == TagField::TrackNumber {
                    TagField::TrackTotal
                } else {
                    TagField::DiscTotal
                };
                if let Some(slot) = meta.number_mut(field) {
                    *slot = number;
                }
                if let Some(total) = total
                    && let Some(slot) = meta.number_mut(total_field)
                    && *slot == 0
                {
                    *slot = total;
                }
            }
            _ => {
                if let Some(slot) = meta.number_mut(field) {
                    *slot = parse_leading_int(value);
                }
            }
        }
    }
}

fn eof_as(err: io::Error, short: Error) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        short
    } else {
        Error::IoError(err)
    }
}
