use crate::types::TagField;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    /// Leading magic bytes do not identify a supported container
    NotAValidContainer,
    /// Short read while reading a 4-byte metadata block header
    TruncatedHeader,
    /// Short read inside a block body, or a length prefix overran the block
    TruncatedBlock,
    CorruptMetadata(String),
    MissingRequiredField(TagField),
    UnsafePathSegment(String),
    FolderCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },
    UnsupportedFormat(String),
    FieldNotLocated(TagField),
    RewriteLengthMismatch {
        field: TagField,
        expected: usize,
        actual: usize,
    },
    ConfigParse(String),
    /// A fresh configuration template was written and needs editing
    ConfigCreated(PathBuf),
    IoError(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotAValidContainer => write!(f, "Not a valid audio container"),
            Error::TruncatedHeader => write!(f, "Metadata block header missing or truncated"),
            Error::TruncatedBlock => write!(f, "Metadata block truncated"),
            Error::CorruptMetadata(msg) => write!(f, "Metadata tags missing or corrupt: {}", msg),
            Error::MissingRequiredField(field) => {
                write!(f, "Required field '{}' is blank", field)
            }
            Error::UnsafePathSegment(segment) => {
                write!(f, "Unsafe path segment: '{}'", segment)
            }
            Error::FolderCreationFailed { path, source } => {
                write!(f, "Failed to create folder {}: {}", path.display(), source)
            }
            Error::MoveFailed { from, to, reason } => write!(
                f,
                "Failed to move {} to {}: {}",
                from.display(),
                to.display(),
                reason
            ),
            Error::UnsupportedFormat(ext) => write!(f, "Unsupported file type *.{}", ext),
            Error::FieldNotLocated(field) => {
                write!(f, "Field '{}' has no recorded file offset", field)
            }
            Error::RewriteLengthMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "Cannot rewrite '{}' in place: stored value is {} bytes, replacement is {} bytes",
                field, expected, actual
            ),
            Error::ConfigParse(msg) => write!(f, "Configuration parse error: {}", msg),
            Error::ConfigCreated(path) => write!(
                f,
                "{} created, please set the source and destination paths",
                path.display()
            ),
            Error::IoError(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FolderCreationFailed { source, .. } => Some(source),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
