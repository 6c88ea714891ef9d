use anyhow::{Context, Result};
use std::path::Path;
use tagshelf_core::config::write_template;

/// Write a configuration template to `config_path`.
///
/// Refuses to overwrite an existing configuration.
pub fn run(config_path: &Path) -> Result<()> {
    println!("Initializing configuration: {}", config_path.display());

    if config_path.exists() {
        anyhow::bail!(
            "{} already exists. Edit it directly or remove it first",
            config_path.display()
        );
    }

    write_template(config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("\n✓ Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Set [directory] source to the folder of files to sort");
    println!("  2. Set [directory] destination to your library root");
    println!("  3. Preview: tagshelf sort --dry-run");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_template() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("tagshelf.toml");

        run(&config_path).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[directory]"));
        assert!(content.contains("[tags]"));
        assert!(content.contains("libFLAC"));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("tagshelf.toml");
        fs::write(&config_path, "# mine").unwrap();

        assert!(run(&config_path).is_err());
        assert_eq!(fs::read_to_string(&config_path).unwrap(), "# mine");
    }
}
