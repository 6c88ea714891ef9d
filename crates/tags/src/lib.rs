//! Tag extraction for tagshelf.
//!
//! - `comment`: comment block decoding (`KEY=VALUE` entries)
//! - `flac`: FLAC block walk and record population
//! - `id3`: ID3v2 signature and header detection
//! - `rewrite`: same-length in-place value correction

pub mod comment;
pub mod flac;
pub mod id3;
pub mod rewrite;

#[cfg(test)]
mod test_support;

pub use comment::{CommentBlock, CommentEntry, decode_comment_block};
pub use flac::{read_flac_from, read_flac_metadata};
pub use id3::{Id3Header, read_id3_header, read_id3_metadata};
pub use rewrite::rewrite_in_place;

use std::path::Path;
use tagshelf_core::{AudioMetadata, ContainerKind, Error, Result, TagOptions};

/// Dispatches extraction on the file extension
#[derive(Debug, Clone)]
pub struct Extractor {
    vendor_signatures: Vec<String>,
}

impl Extractor {
    pub fn new(options: &TagOptions) -> Self {
        Self {
            vendor_signatures: options.vendor_signatures.clone(),
        }
    }

    /// Extract metadata from `path`.
    ///
    /// `.flac` files are fully decoded; `.mp3` files are only checked for an
    /// ID3 signature. Other extensions are `UnsupportedFormat`.
    pub fn extract(&self, path: &Path) -> Result<AudioMetadata> {
        match ContainerKind::from_path(path) {
            Some(ContainerKind::Flac) => read_flac_metadata(path, &self.vendor_signatures),
            Some(ContainerKind::Id3) => read_id3_metadata(path),
            None => Err(Error::UnsupportedFormat(
                path.extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            )),
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(&TagOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extract_dispatches_on_extension() {
        let dir = TempDir::new().unwrap();
        let flac = dir.path().join("a.flac");
        let mp3 = dir.path().join("b.mp3");
        let ogg = dir.path().join("c.ogg");
        fs::write(&flac, test_support::tagged_flac(&["ARTIST=Foo"])).unwrap();
        fs::write(&mp3, b"ID3\x03\0\0\0\0\0\0").unwrap();
        fs::write(&ogg, b"OggS").unwrap();

        let extractor = Extractor::default();
        assert_eq!(extractor.extract(&flac).unwrap().artist, "Foo");
        assert_eq!(extractor.extract(&mp3).unwrap().file_extension, "mp3");
        assert!(matches!(
            extractor.extract(&ogg),
            Err(Error::UnsupportedFormat(ref ext)) if ext == "ogg"
        ));
    }

    #[test]
    fn test_extract_uses_configured_signatures() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.flac");
        let stream = test_support::flac_stream(&[(
            flac::BLOCK_TYPE_VORBIS_COMMENT,
            test_support::comment_block("Lavf58.29.100", &["ARTIST=Foo"]),
        )]);
        fs::write(&path, stream).unwrap();

        assert!(matches!(
            Extractor::default().extract(&path),
            Err(Error::CorruptMetadata(_))
        ));

        let relaxed = Extractor::new(&TagOptions {
            vendor_signatures: Vec::new(),
            rewrite: false,
        });
        assert_eq!(relaxed.extract(&path).unwrap().artist, "Foo");
    }
}
