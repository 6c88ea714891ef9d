use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "tagshelf.toml";

/// Encoder signature expected in a comment block's vendor string
pub const DEFAULT_VENDOR_SIGNATURE: &str = "libFLAC";

/// Validated run configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the files to sort
    pub source: PathBuf,
    /// Library root the files are moved under
    pub destination: PathBuf,
    pub tags: TagOptions,
}

/// Tag handling options (`[tags]` table)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TagOptions {
    /// Substrings accepted in the comment block vendor string.
    /// An empty list accepts any vendor.
    pub vendor_signatures: Vec<String>,
    /// Write function-word case corrections back into the source file
    pub rewrite: bool,
}

impl Default for TagOptions {
    fn default() -> Self {
        Self {
            vendor_signatures: vec![DEFAULT_VENDOR_SIGNATURE.to_string()],
            rewrite: false,
        }
    }
}

/// Raw TOML configuration structure
#[derive(Debug, Deserialize)]
struct RawConfig {
    directory: RawDirectory,
    #[serde(default)]
    tags: TagOptions,
}

/// Only the `[tags]` table; directories are neither required nor checked
#[derive(Debug, Deserialize)]
struct RawTagsOnly {
    #[serde(default)]
    tags: TagOptions,
}

#[derive(Debug, Deserialize)]
struct RawDirectory {
    #[serde(default)]
    source: String,
    #[serde(default)]
    destination: String,
}

/// Parse a configuration file
pub fn parse_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse configuration from a string (useful for testing)
pub fn parse_config_str(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)?;

    let source = validate_dir(&raw.directory.source, "directory.source")?;
    let destination = validate_dir(&raw.directory.destination, "directory.destination")?;

    Ok(Config {
        source,
        destination,
        tags: raw.tags,
    })
}

/// Load the configuration, writing a template first if the file is missing.
///
/// A freshly written template has empty directories, so this returns
/// `Error::ConfigCreated` and the caller should stop.
pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        write_template(path)?;
        return Err(Error::ConfigCreated(path.to_path_buf()));
    }
    parse_config(path)
}

/// Read just the `[tags]` table of the configuration at `path`.
///
/// A missing file yields the defaults and nothing is written.
pub fn load_tag_options<P: AsRef<Path>>(path: P) -> Result<TagOptions> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(TagOptions::default());
    }
    let content = fs::read_to_string(path)?;
    let raw: RawTagsOnly = toml::from_str(&content)?;
    Ok(raw.tags)
}

/// Write the commented configuration template to `path`
pub fn write_template<P: AsRef<Path>>(path: P) -> Result<()> {
    let template = config_template();

    // The template must stay parseable TOML even though the paths are empty
    toml::from_str::<toml::Value>(&template)?;

    fs::write(path, template)?;
    Ok(())
}

fn config_template() -> String {
    format!(
        "# tagshelf configuration\n\
# Set both directories before running `tagshelf sort`\n\
\n\
[directory]\n\
source = \"\"        # folder containing the files to sort\n\
destination = \"\"   # music library root\n\
\n\
[tags]\n\
# Accepted encoder signatures in the comment block vendor string.\n\
# Use an empty list to accept any encoder.\n\
vendor_signatures = [\"{DEFAULT_VENDOR_SIGNATURE}\"]\n\
# Write function-word case fixes (\"Live In The Studio\" -> \"Live in the Studio\")\n\
# back into the source file. Only same-length edits are ever written.\n\
rewrite = false\n"
    )
}

/// Validate a configured directory.
///
/// The value must be non-empty and name an existing directory.
fn validate_dir(value: &str, field_name: &str) -> Result<PathBuf> {
    if value.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    let path = PathBuf::from(value);
    if !path.is_dir() {
        return Err(Error::ConfigParse(format!(
            "'{}' is not an existing directory: '{}'",
            field_name, value
        )));
    }

    Ok(path)
}
