mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use tagshelf_core::config::DEFAULT_CONFIG_FILE;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tagshelf")]
#[command(version, about = "Sort tagged audio files into a music library", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Write a configuration template
    Init,

    /// Move every file in the source folder into the library
    Sort {
        /// Show where files would go without changing anything
        #[arg(long)]
        dry_run: bool,

        /// Write function-word case fixes back into the source tags
        #[arg(long)]
        rewrite_tags: bool,

        /// Accept comment blocks from any encoder
        #[arg(long)]
        any_vendor: bool,
    },

    /// Print the tags and field offsets of a single file
    Inspect {
        /// Audio file to read
        file: PathBuf,

        /// Accept comment blocks from any encoder
        #[arg(long)]
        any_vendor: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let directives = ["tagshelf", "tagshelf_core", "tagshelf_tags", "tagshelf_layout"]
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",");

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| directives.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Init => commands::init::run(&cli.config),
        Command::Sort {
            dry_run,
            rewrite_tags,
            any_vendor,
        } => commands::sort::run(
            &cli.config,
            commands::sort::SortOptions {
                dry_run,
                rewrite_tags,
                any_vendor,
            },
        ),
        Command::Inspect { file, any_vendor } => {
            commands::inspect::run(&cli.config, &file, any_vendor)
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "tagshelf", &mut io::stdout());
            Ok(())
        }
    }
}
