use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A tag recognized in a comment block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagField {
    Artist,
    Album,
    Title,
    Date,
    Genre,
    TrackNumber,
    TrackTotal,
    DiscNumber,
    DiscTotal,
}

impl TagField {
    pub const ALL: [TagField; 9] = [
        TagField::Artist,
        TagField::Album,
        TagField::Title,
        TagField::Date,
        TagField::Genre,
        TagField::TrackNumber,
        TagField::TrackTotal,
        TagField::DiscNumber,
        TagField::DiscTotal,
    ];

    /// Map a comment key to a field, ignoring ASCII case.
    ///
    /// Track and disc keys accept both the `TRACKNUMBER`/`TRACKTOTAL` and the
    /// `TRACK`/`TOTALTRACKS` spellings. Unknown keys yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        let field = match key.to_ascii_uppercase().as_str() {
            "ARTIST" => TagField::Artist,
            "ALBUM" => TagField::Album,
            "TITLE" => TagField::Title,
            "DATE" => TagField::Date,
            "GENRE" => TagField::Genre,
            "TRACKNUMBER" | "TRACK" => TagField::TrackNumber,
            "TRACKTOTAL" | "TOTALTRACKS" => TagField::TrackTotal,
            "DISCNUMBER" | "DISC" => TagField::DiscNumber,
            "DISCTOTAL" | "TOTALDISCS" => TagField::DiscTotal,
            _ => return None,
        };
        Some(field)
    }

    /// Canonical comment key
    pub fn key(self) -> &'static str {
        match self {
            TagField::Artist => "ARTIST",
            TagField::Album => "ALBUM",
            TagField::Title => "TITLE",
            TagField::Date => "DATE",
            TagField::Genre => "GENRE",
            TagField::TrackNumber => "TRACKNUMBER",
            TagField::TrackTotal => "TRACKTOTAL",
            TagField::DiscNumber => "DISCNUMBER",
            TagField::DiscTotal => "DISCTOTAL",
        }
    }

    pub fn is_text(self) -> bool {
        matches!(
            self,
            TagField::Artist | TagField::Album | TagField::Title | TagField::Date | TagField::Genre
        )
    }
}

impl fmt::Display for TagField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TagField::Artist => "artist",
            TagField::Album => "album",
            TagField::Title => "title",
            TagField::Date => "date",
            TagField::Genre => "genre",
            TagField::TrackNumber => "track number",
            TagField::TrackTotal => "track total",
            TagField::DiscNumber => "disc number",
            TagField::DiscTotal => "disc total",
        };
        f.write_str(label)
    }
}

/// Where a field's value text sits in the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLocation {
    /// Absolute byte offset of the first byte of the value
    pub offset: u64,
    /// Byte length of the value as stored
    pub len: usize,
}

/// Metadata extracted from one audio file.
///
/// Created empty for a source path, filled by one extraction pass, then
/// normalized and handed to the path builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioMetadata {
    source_path: PathBuf,
    /// Lowercase extension without the dot
    pub file_extension: String,
    pub artist: String,
    pub album: String,
    pub title: String,
    pub date: String,
    pub genre: String,
    pub track_number: u32,
    pub track_total: u32,
    /// 0 means the file carries no disc information
    pub disc_number: u32,
    pub disc_total: u32,
    comment_block_offset: Option<u64>,
    field_locations: HashMap<TagField, FieldLocation>,
}

impl AudioMetadata {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        let source_path = source_path.into();
        let file_extension = source_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        Self {
            source_path,
            file_extension,
            ..Default::default()
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Text value of a text field, `None` for numeric fields
    pub fn text(&self, field: TagField) -> Option<&str> {
        match field {
            TagField::Artist => Some(&self.artist),
            TagField::Album => Some(&self.album),
            TagField::Title => Some(&self.title),
            TagField::Date => Some(&self.date),
            TagField::Genre => Some(&self.genre),
            _ => None,
        }
    }

    pub fn text_mut(&mut self, field: TagField) -> Option<&mut String> {
        match field {
            TagField::Artist => Some(&mut self.artist),
            TagField::Album => Some(&mut self.album),
            TagField::Title => Some(&mut self.title),
            TagField::Date => Some(&mut self.date),
            TagField::Genre => Some(&mut self.genre),
            _ => None,
        }
    }

    pub fn number(&self, field: TagField) -> Option<u32> {
        match field {
            TagField::TrackNumber => Some(self.track_number),
            TagField::TrackTotal => Some(self.track_total),
            TagField::DiscNumber => Some(self.disc_number),
            TagField::DiscTotal => Some(self.disc_total),
            _ => None,
        }
    }

    pub fn number_mut(&mut self, field: TagField) -> Option<&mut u32> {
        match field {
            TagField::TrackNumber => Some(&mut self.track_number),
            TagField::TrackTotal => Some(&mut self.track_total),
            TagField::DiscNumber => Some(&mut self.disc_number),
            TagField::DiscTotal => Some(&mut self.disc_total),
            _ => None,
        }
    }

    pub fn comment_block_offset(&self) -> Option<u64> {
        self.comment_block_offset
    }

    pub fn set_comment_block_offset(&mut self, offset: u64) {
        self.comment_block_offset = Some(offset);
    }

    /// Record where a field's value lives, given its offset inside the
    /// comment block payload.
    ///
    /// Returns `false` (and records nothing) when the comment block offset
    /// has not been set yet.
    pub fn locate_field(&mut self, field: TagField, offset_in_block: u64, len: usize) -> bool {
        let Some(base) = self.comment_block_offset else {
            return false;
        };
        self.field_locations.insert(
            field,
            FieldLocation {
                offset: base + offset_in_block,
                len,
            },
        );
        true
    }

    pub fn location(&self, field: TagField) -> Option<FieldLocation> {
        self.field_locations.get(&field).copied()
    }

    /// Located fields in `TagField` order
    pub fn locations(&self) -> Vec<(TagField, FieldLocation)> {
        let mut located: Vec<_> = self
            .field_locations
            .iter()
            .map(|(field, loc)| (*field, *loc))
            .collect();
        located.sort_by_key(|(field, _)| *field);
        located
    }

    /// Release year from the `DATE` tag (`YYYY-MM-DD` or a leading `YYYY`)
    pub fn year(&self) -> Option<i32> {
        let date = self.date.trim();
        if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            return Some(parsed.year());
        }
        let digits = date.get(..4)?;
        if digits.chars().all(|c| c.is_ascii_digit()) {
            digits.parse().ok()
        } else {
            None
        }
    }
}

impl fmt::Display for AudioMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Artist:  \t{}", self.artist)?;
        writeln!(f, "Album:   \t{}", self.album)?;
        writeln!(f, "Title:   \t{}", self.title)?;
        writeln!(f, "Date:    \t{}", self.date)?;
        writeln!(f, "Genre:   \t{}", self.genre)?;
        writeln!(f, "Track:   \t{}/{}", self.track_number, self.track_total)?;
        if self.disc_number != 0 {
            writeln!(f, "Disc:    \t{}/{}", self.disc_number, self.disc_total)?;
        }
        write!(f, "Source file:  \t{}", self.source_path.display())
    }
}

/// Container formats the driver dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Flac,
    Id3,
}

impl ContainerKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "flac" => Some(ContainerKind::Flac),
            "mp3" => Some(ContainerKind::Id3),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}
