//! Destination path construction: `<root>/<Artist>/<Album>/<NN>. <Title>.<ext>`

use crate::normalize::sanitize_title;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tagshelf_core::{AudioMetadata, Error, Result, TagField};
use tracing::info;

/// Where a file will land in the library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPath {
    pub artist_dir: PathBuf,
    pub album_dir: PathBuf,
    pub file_path: PathBuf,
}

/// Library root that files are organized under
#[derive(Debug, Clone)]
pub struct LibraryLayout {
    root: PathBuf,
}

impl LibraryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Work out the destination for `meta` without touching the filesystem.
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` if artist or album is blank
    /// - `UnsafePathSegment` if artist or album would not stay a single
    ///   directory level (contains a separator, or is `.`/`..`)
    pub fn plan(&self, meta: &AudioMetadata) -> Result<PlannedPath> {
        let artist = required_segment(meta, TagField::Artist)?;
        let album = required_segment(meta, TagField::Album)?;

        let artist_dir = self.root.join(artist);
        let album_dir = artist_dir.join(album);
        let file_path = album_dir.join(file_name(meta));

        Ok(PlannedPath {
            artist_dir,
            album_dir,
            file_path,
        })
    }

    /// Plan the destination and create the artist and album folders.
    ///
    /// Existing folders are fine. A folder creation failure leaves any
    /// folder already created in place.
    pub fn build(&self, meta: &AudioMetadata) -> Result<PathBuf> {
        let planned = self.plan(meta)?;
        create_folders(&planned)?;
        Ok(planned.file_path)
    }
}

/// Create the planned artist then album folder if missing
pub fn create_folders(planned: &PlannedPath) -> Result<()> {
    ensure_dir(&planned.artist_dir)?;
    ensure_dir(&planned.album_dir)
}

/// `NN. Title.ext` with the track number zero-padded to two digits.
///
/// A blank title falls back to the source file stem.
pub fn file_name(meta: &AudioMetadata) -> String {
    let title = if meta.title.trim().is_empty() {
        meta.source_path()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        meta.title.clone()
    };
    let title = sanitize_title(&title);

    if meta.file_extension.is_empty() {
        format!("{:02}. {}", meta.track_number, title)
    } else {
        format!("{:02}. {}.{}", meta.track_number, title, meta.file_extension)
    }
}

fn required_segment(meta: &AudioMetadata, field: TagField) -> Result<&str> {
    let value = meta.text(field).unwrap_or_default();
    if value.trim().is_empty() {
        return Err(Error::MissingRequiredField(field));
    }
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(Error::UnsafePathSegment(value.to_string()));
    }
    Ok(value)
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    match fs::create_dir(path) {
        Ok(()) => {
            info!(path = %path.display(), "created folder");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(source) => Err(Error::FolderCreationFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}
