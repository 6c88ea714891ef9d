use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;
use tagshelf_core::{AudioMetadata, ContainerKind, TagOptions, load_tag_options};
use tagshelf_tags::{Extractor, read_id3_header};

/// Print the decoded tags of a single file.
///
/// Vendor signatures come from the `[tags]` table of `config_path` when that
/// file exists, so `inspect` accepts the same files `sort` does.
pub fn run(config_path: &Path, file: &Path, any_vendor: bool) -> Result<()> {
    let options = tag_options(config_path, any_vendor)?;

    let meta = Extractor::new(&options)
        .extract(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    print!("{}", describe(&meta));

    if ContainerKind::from_path(file) == Some(ContainerKind::Id3) {
        let header = read_id3_header(file)
            .with_context(|| format!("Failed to read ID3 header of {}", file.display()))?;
        println!(
            "ID3v2.{}.{}  \tflags {:#04x}, {} tag bytes",
            header.major_version, header.revision, header.flags, header.tag_size
        );
    }

    Ok(())
}

fn tag_options(config_path: &Path, any_vendor: bool) -> Result<TagOptions> {
    let mut options = load_tag_options(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    if any_vendor {
        options.vendor_signatures.clear();
    }
    Ok(options)
}

fn describe(meta: &AudioMetadata) -> String {
    let mut out = meta.to_string();

    if let Some(year) = meta.year() {
        let _ = writeln!(out, "Year:    \t{}", year);
    }

    if let Some(offset) = meta.comment_block_offset() {
        let _ = writeln!(out, "\nComment block at byte {}", offset);
        for (field, location) in meta.locations() {
            let _ = writeln!(
                out,
                "  {:<12} offset {:>8}  length {}",
                field.key(),
                location.offset,
                location.len
            );
        }
    }

    out
}
