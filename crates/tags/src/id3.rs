//! ID3v2 container detection.
//!
//! Only the header is understood; frames are not decoded, so records
//! produced here carry nothing beyond the source path and extension.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tagshelf_core::{AudioMetadata, Error, Result};

pub const ID3_MAGIC: &[u8; 3] = b"ID3";

const HEADER_LEN: usize = 10;

/// The 10-byte ID3v2 header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Id3Header {
    pub major_version: u8,
    pub revision: u8,
    pub flags: u8,
    /// Tag size excluding the header, decoded from its syncsafe form
    pub tag_size: u32,
}

impl Id3Header {
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut header = [0u8; HEADER_LEN];
        let filled = read_up_to(reader, &mut header)?;
        if filled < ID3_MAGIC.len() || &header[..3] != ID3_MAGIC {
            return Err(Error::NotAValidContainer);
        }
        if filled < HEADER_LEN {
            return Err(Error::TruncatedHeader);
        }

        let size_bytes = &header[6..10];
        if size_bytes.iter().any(|b| b & 0x80 != 0) {
            return Err(Error::CorruptMetadata(
                "ID3 tag size is not syncsafe".to_string(),
            ));
        }
        let tag_size = size_bytes
            .iter()
            .fold(0u32, |size, b| (size << 7) | u32::from(*b));

        Ok(Self {
            major_version: header[3],
            revision: header[4],
            flags: header[5],
            tag_size,
        })
    }
}

/// Read the ID3v2 header of a file
pub fn read_id3_header<P: AsRef<Path>>(path: P) -> Result<Id3Header> {
    let mut file = File::open(path)?;
    Id3Header::read_from(&mut file)
}

/// Recognize an ID3-tagged file by its 3-byte signature.
///
/// The returned record has only the path and extension filled in.
pub fn read_id3_metadata<P: AsRef<Path>>(path: P) -> Result<AudioMetadata> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let mut magic = [0u8; 3];
    let filled = read_up_to(&mut file, &mut magic)?;
    if filled < magic.len() || &magic != ID3_MAGIC {
        return Err(Error::NotAValidContainer);
    }
    Ok(AudioMetadata::new(path))
}

/// Fill as much of `buf` as the reader allows, stopping at end of stream
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
