use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tagshelf_core::{Config, Error, load_or_create};
use tagshelf_layout::{LibraryLayout, create_folders, invert_record_artist, lower_record};
use tagshelf_tags::{Extractor, rewrite_in_place};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Command-line overrides for a sort run
#[derive(Debug, Clone, Copy, Default)]
pub struct SortOptions {
    pub dry_run: bool,
    pub rewrite_tags: bool,
    pub any_vendor: bool,
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSummary {
    pub total: usize,
    pub succeeded: usize,
}

impl SortSummary {
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }
}

/// Per-file pipeline: extract, normalize, place, move
pub struct Organizer {
    extractor: Extractor,
    layout: LibraryLayout,
    rewrite_tags: bool,
    dry_run: bool,
}

impl Organizer {
    pub fn new(config: &Config, options: SortOptions) -> Self {
        let mut tags = config.tags.clone();
        if options.any_vendor {
            tags.vendor_signatures.clear();
        }

        Self {
            extractor: Extractor::new(&tags),
            layout: LibraryLayout::new(&config.destination),
            rewrite_tags: tags.rewrite || options.rewrite_tags,
            dry_run: options.dry_run,
        }
    }

    /// Process one file, returning its destination.
    ///
    /// The destination is planned and checked before any tag is rewritten,
    /// so a file that is skipped is left byte-for-byte unchanged. In dry-run
    /// mode nothing on disk changes and the planned destination is returned.
    pub fn process(&self, path: &Path) -> tagshelf_core::Result<PathBuf> {
        let mut meta = self.extractor.extract(path)?;

        let lowered = lower_record(&mut meta);
        // Written back as read, before the artist is inverted
        let corrected = (self.rewrite_tags && !self.dry_run && !lowered.is_empty())
            .then(|| meta.clone());

        invert_record_artist(&mut meta);
        let planned = self.layout.plan(&meta)?;

        if self.dry_run {
            return Ok(planned.file_path);
        }
        ensure_vacant(path, &planned.file_path)?;

        if let Some(corrected) = corrected {
            let written = rewrite_in_place(&corrected, &lowered)?;
            debug!(path = %path.display(), written, "rewrote tag values");
        }

        create_folders(&planned)?;
        move_file(path, &planned.file_path)?;
        Ok(planned.file_path)
    }
}

/// Sort every file in the configured source directory.
pub fn run(config_path: &Path, options: SortOptions) -> Result<()> {
    let config = match load_or_create(config_path) {
        Ok(config) => config,
        Err(Error::ConfigCreated(path)) => {
            println!("Configuration file doesn't exist. Created {}", path.display());
            anyhow::bail!(
                "Set the source and destination paths in {} and run again",
                path.display()
            );
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to load {}", config_path.display()));
        }
    };

    let summary = sort_files(&config, options)?;

    println!(
        "\n{} files processed successfully, {} files failed.\n",
        summary.succeeded,
        summary.failed()
    );

    Ok(())
}

/// Enumerate and process the source directory.
///
/// Only a failure to list the source directory is an error; every per-file
/// failure is reported and counted.
pub fn sort_files(config: &Config, options: SortOptions) -> Result<SortSummary> {
    let files = list_source_files(&config.source)?;

    println!("File List:");
    for file in &files {
        println!("  {}", file.display());
    }
    println!("\nResults:");

    let organizer = Organizer::new(config, options);
    let mut summary = SortSummary {
        total: files.len(),
        succeeded: 0,
    };

    for file in &files {
        match organizer.process(file) {
            Ok(destination) if options.dry_run => {
                println!("  Would move {} -> {}", file.display(), destination.display());
                summary.succeeded += 1;
            }
            Ok(destination) => {
                println!("✓ {} processed successfully.", destination.display());
                summary.succeeded += 1;
            }
            Err(e) => {
                eprintln!("⚠ Skipping [{}]: {}", file.display(), e);
            }
        }
    }

    Ok(summary)
}

/// Regular files directly inside `dir`, sorted by path
fn list_source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry =
            entry.with_context(|| format!("Failed to list source folder {}", dir.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

fn move_error(from: &Path, to: &Path, reason: impl Into<String>) -> Error {
    Error::MoveFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        reason: reason.into(),
    }
}

fn ensure_vacant(from: &Path, to: &Path) -> tagshelf_core::Result<()> {
    if to.exists() {
        return Err(move_error(from, to, "destination already exists"));
    }
    Ok(())
}

/// Move `from` to `to`, refusing to replace an existing file.
///
/// Falls back to copy-then-remove when the library is on another device.
fn move_file(from: &Path, to: &Path) -> tagshelf_core::Result<()> {
    ensure_vacant(from, to)?;

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            info!(from = %from.display(), to = %to.display(), "copying across devices");
            copy_then_remove(
                from,
                to,
                |from, to| fs::copy(from, to),
                |from| fs::remove_file(from),
            )
        }
        Err(e) => Err(move_error(from, to, e.to_string())),
    }
}

/// Copy `from` to `to`, then remove `from`.
///
/// Either step failing deletes whatever landed at `to`, so a failed move
/// leaves the source in place and nothing in the library.
fn copy_then_remove<C, R>(
    from: &Path,
    to: &Path,
    copy: C,
    remove: R,
) -> tagshelf_core::Result<()>
where
    C: FnOnce(&Path, &Path) -> io::Result<u64>,
    R: FnOnce(&Path) -> io::Result<()>,
{
    let result = copy(from, to)
        .map_err(|e| format!("copy failed: {}", e))
        .and_then(|_| remove(from).map_err(|e| format!("removing source failed: {}", e)));

    result.map_err(|reason| {
        match fs::remove_file(to) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %to.display(), error = %e, "could not remove partial copy"),
        }
        move_error(from, to, reason)
    })
}
