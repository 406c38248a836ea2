use std::path::{Path, PathBuf};

mod chunk;
mod config;
mod overview;
mod terminal;

use anyhow::Context;
use chunk::ChunkDocuments;
use clap::ArgAction;
use overview::Overview;
use reqchunk::Config;
use tracing::debug;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = load_config(self.config.as_deref())?;
        self.command.run(config, self.config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        // Chunks go to stdout, so diagnostics must not.
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    debug!(path = %path.display(), "loading configuration");
    Config::load(path).map_err(|e| anyhow::anyhow!("{e}"))
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Split requirements documents into chunks
    ///
    /// Each document is segmented into requirements and their sections;
    /// sections longer than the chunk size are split into overlapping
    /// pieces.
    Chunk(ChunkDocuments),

    /// Show a document's epic metadata and overview
    Overview(Overview),

    /// Show or initialise configuration
    Config(config::Command),
}

impl Command {
    fn run(self, config: Config, config_path: Option<PathBuf>) -> anyhow::Result<()> {
        match self {
            Self::Chunk(command) => command.run(config)?,
            Self::Overview(command) => command.run(config)?,
            Self::Config(command) => command.run(&config, config_path)?,
        }
        Ok(())
    }
}

/// Command-line overrides for the configuration file.
#[derive(Debug, Default, clap::Args)]
pub struct Overrides {
    /// Maximum chunk length in characters
    #[arg(long, value_name = "CHARS")]
    max_chunk_size: Option<usize>,

    /// Characters shared between consecutive pieces of a split section
    #[arg(long, value_name = "CHARS")]
    chunk_overlap: Option<usize>,

    /// Requirement code prefix (for example 'PSE' for 'PSE1.1')
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,
}

impl Overrides {
    /// Applies the overrides on top of `config`.
    pub fn apply(self, mut config: Config) -> Config {
        if let Some(size) = self.max_chunk_size {
            config.set_max_chunk_size(size);
        }
        if let Some(overlap) = self.chunk_overlap {
            config.set_chunk_overlap(overlap);
        }
        if let Some(prefix) = self.prefix {
            config.set_requirement_prefix(prefix);
        }
        config
    }
}

/// Builds a chunker, naming the configuration problem on failure.
fn chunker(config: &Config) -> anyhow::Result<reqchunk::Chunker> {
    reqchunk::Chunker::new(config).context("invalid chunking configuration")
}
