//! In-place tag correction.
//!
//! Writes a field's current value over the bytes it was read from. The
//! comment block's sizes are never touched, so a replacement must have
//! exactly the stored byte length, and the bytes on disk must still be the
//! extracted value up to ASCII case.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tagshelf_core::{AudioMetadata, Error, FieldLocation, Result, TagField};
use tracing::debug;

/// Rewrite `fields` of the file `meta` was extracted from.
///
/// Returns how many fields were actually written.
pub fn rewrite_in_place(meta: &AudioMetadata, fields: &[TagField]) -> Result<usize> {
    rewrite_file(meta.source_path(), meta, fields)
}

/// Rewrite `fields` in the file at `path` using offsets recorded in `meta`
pub fn rewrite_file<P: AsRef<Path>>(
    path: P,
    meta: &AudioMetadata,
    fields: &[TagField],
) -> Result<usize> {
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    rewrite_fields(&mut file, meta, fields)
}

/// Rewrite `fields` in an open stream.
///
/// Every field is checked before anything is written: a field that was
/// never located, a replacement with a different byte length, or stored
/// bytes that no longer match all abort the whole rewrite.
pub fn rewrite_fields<F: Read + Write + Seek>(
    file: &mut F,
    meta: &AudioMetadata,
    fields: &[TagField],
) -> Result<usize> {
    let mut pending: Vec<(TagField, FieldLocation, String)> = Vec::new();

    for &field in fields {
        let location = meta
            .location(field)
            .ok_or(Error::FieldNotLocated(field))?;
        let replacement = match meta.text(field) {
            Some(text) => text.to_string(),
            None => meta.number(field).unwrap_or_default().to_string(),
        };

        if replacement.len() != location.len {
            return Err(Error::RewriteLengthMismatch {
                field,
                expected: location.len,
                actual: replacement.len(),
            });
        }

        let mut stored = vec![0u8; location.len];
        file.seek(SeekFrom::Start(location.offset))?;
        file.read_exact(&mut stored)?;
        if !stored.eq_ignore_ascii_case(replacement.as_bytes()) {
            return Err(Error::CorruptMetadata(format!(
                "stored {} at byte {} no longer matches the extracted value",
                field, location.offset
            )));
        }

        if stored != replacement.as_bytes() {
            pending.push((field, location, replacement));
        }
    }

    for (field, location, replacement) in &pending {
        debug!(%field, offset = location.offset, "rewriting tag value in place");
        file.seek(SeekFrom::Start(location.offset))?;
        file.write_all(replacement.as_bytes())?;
    }
    file.flush()?;

    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flac::read_flac_from;
    use crate::test_support::tagged_flac;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn extract(bytes: &[u8]) -> AudioMetadata {
        read_flac_from(
            &mut Cursor::new(bytes.to_vec()),
            Path::new("x.flac"),
            &["libFLAC".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_same_length_case_fix_is_written() {
        let bytes = tagged_flac(&["ARTIST=Foo", "TITLE=Live In The Studio"]);
        let mut meta = extract(&bytes);
        meta.title = "Live in the Studio".to_string();

        let mut file = Cursor::new(bytes);
        let written = rewrite_fields(&mut file, &meta, &[TagField::Title]).unwrap();
        assert_eq!(written, 1);

        let reread = extract(file.get_ref());
        assert_eq!(reread.title, "Live in the Studio");
        assert_eq!(reread.artist, "Foo", "Other fields must be untouched");
        assert_eq!(
            file.get_ref().len(),
            tagged_flac(&["ARTIST=Foo", "TITLE=Live In The Studio"]).len()
        );
    }

    #[test]
    fn test_unchanged_value_is_not_written() {
        let bytes = tagged_flac(&["ARTIST=Foo"]);
        let meta = extract(&bytes);

        let mut file = Cursor::new(bytes.clone());
        let written = rewrite_fields(&mut file, &meta, &[TagField::Artist]).unwrap();
        assert_eq!(written, 0);
        assert_eq!(file.into_inner(), bytes);
    }

    #[test]
    fn test_length_change_is_rejected() {
        let bytes = tagged_flac(&["ARTIST=The Beatles"]);
        let mut meta = extract(&bytes);
        meta.artist = "Beatles, The".to_string();

        let mut file = Cursor::new(bytes.clone());
        let result = rewrite_fields(&mut file, &meta, &[TagField::Artist]);
        assert!(matches!(
            result,
            Err(Error::RewriteLengthMismatch {
                field: TagField::Artist,
                expected: 11,
                actual: 12,
            })
        ));
        assert_eq!(file.into_inner(), bytes, "Nothing should be written");
    }

    #[test]
    fn test_unlocated_field_is_rejected() {
        let bytes = tagged_flac(&["ARTIST=Foo"]);
        let mut meta = extract(&bytes);
        meta.genre = "Rock".to_string();

        let mut file = Cursor::new(bytes);
        let result = rewrite_fields(&mut file, &meta, &[TagField::Genre]);
        assert!(matches!(result, Err(Error::FieldNotLocated(TagField::Genre))));
    }

    #[test]
    fn test_validation_happens_before_any_write() {
        let bytes = tagged_flac(&["ALBUM=Songs Of Love", "ARTIST=The Beatles"]);
        let mut meta = extract(&bytes);
        meta.album = "Songs of Love".to_string();
        meta.artist = "Beatles, The".to_string();

        let mut file = Cursor::new(bytes.clone());
        let result = rewrite_fields(&mut file, &meta, &[TagField::Album, TagField::Artist]);
        assert!(result.is_err());
        assert_eq!(file.into_inner(), bytes, "Album fix must not be written");
    }

    #[test]
    fn test_changed_file_is_rejected() {
        let bytes = tagged_flac(&["TITLE=Over The Hill"]);
        let mut meta = extract(&bytes);
        meta.title = "Over the Hill".to_string();

        let mut changed = bytes.clone();
        let offset = meta.location(TagField::Title).unwrap().offset as usize;
        changed[offset] = b'Q';

        let mut file = Cursor::new(changed);
        let result = rewrite_fields(&mut file, &meta, &[TagField::Title]);
        assert!(matches!(result, Err(Error::CorruptMetadata(_))));
    }

    #[test]
    fn test_rewrite_in_place_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("song.flac");
        fs::write(&path, tagged_flac(&["ALBUM=Music For The Masses"])).unwrap();

        let mut meta = crate::flac::read_flac_metadata(&path, &["libFLAC".to_string()]).unwrap();
        meta.album = "Music for the Masses".to_string();
        assert_eq!(rewrite_in_place(&meta, &[TagField::Album]).unwrap(), 1);

        let reread = crate::flac::read_flac_metadata(&path, &["libFLAC".to_string()]).unwrap();
        assert_eq!(reread.album, "Music for the Masses");
    }
}
