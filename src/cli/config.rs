use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use reqchunk::Config;
use tracing::instrument;

use crate::cli::terminal::Colorize;

const DEFAULT_CONFIG_FILE: &str = "reqchunk.toml";

#[derive(Debug, clap::Parser)]
/// Show or initialise the chunking configuration
///
/// Configuration is stored as TOML and passed with `--config`.
///
/// Available configuration keys:
///   `max_chunk_size`      Maximum chunk length in characters (default: 800)
///   `chunk_overlap`       Characters shared between split pieces (default: 50)
///   `requirement_prefix`  Requirement code prefix (default: PSE)
pub struct Command {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write a configuration file with the default values
    Init {
        /// Where to write the file
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Command {
    #[instrument(skip(config))]
    pub fn run(self, config: &Config, source: Option<PathBuf>) -> anyhow::Result<()> {
        match self.command {
            ConfigCommand::Show => {
                Self::show_config(&mut io::stdout().lock(), config, source.as_deref())
            }
            ConfigCommand::Init { path, force } => Self::init_config(&path, force),
        }
    }

    fn show_config<W: Write>(
        writer: &mut W,
        config: &Config,
        source: Option<&Path>,
    ) -> anyhow::Result<()> {
        let origin = source.map_or_else(
            || "built-in defaults".to_string(),
            |path| path.display().to_string(),
        );

        writeln!(writer, "# Configuration from {origin}")?;
        write!(writer, "{}", toml::to_string_pretty(config)?)?;
        Ok(())
    }

    fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
        if path.exists() && !force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                path.display()
            );
        }

        Config::default()
            .save(path)
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        println!("{} {}", "Created".success(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_prints_loadable_toml() {
        let mut config = Config::default();
        config.set_max_chunk_size(400);
        let mut buffer = Vec::new();

        Command::show_config(&mut buffer, &config, Some(Path::new("reqchunk.toml"))).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with("# Configuration from reqchunk.toml\n"));
        assert_eq!(toml::from_str::<Config>(&output).unwrap(), config);
    }

    #[test]
    fn init_writes_loadable_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);

        Command::init_config(&path, false).unwrap();

        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "_version = \"1\"\nmax_chunk_size = 10\n").unwrap();

        assert!(Command::init_config(&path, false).is_err());
        assert_eq!(Config::load(&path).unwrap().max_chunk_size(), 10);

        Command::init_config(&path, true).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }
}
