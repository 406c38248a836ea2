use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use reqchunk::{EpicMetadata, RequirementBlock, domain::extract_epic_overview};
use serde_json::json;
use tracing::instrument;

use super::{Overrides, terminal::Colorize};

/// Command arguments for `reqchunk overview`.
#[derive(Debug, Parser)]
pub struct Overview {
    /// The document to inspect.
    path: PathBuf,

    #[command(flatten)]
    overrides: Overrides,

    /// Output format (default: text).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Overview {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: reqchunk::Config) -> anyhow::Result<()> {
        let config = self.overrides.apply(config);
        let chunker = super::chunker(&config)?;

        let text = reqchunk::load(&self.path)
            .with_context(|| format!("failed to load {}", self.path.display()))?;

        let epic = EpicMetadata::extract(&text);
        let overview = extract_epic_overview(&text, chunker.patterns());
        let requirements = RequirementBlock::segment(&text, chunker.patterns());

        match self.output {
            OutputFormat::Json => {
                let requirements: Vec<_> = requirements
                    .iter()
                    .map(|requirement| {
                        json!({
                            "requirement_id": requirement.requirement_id,
                            "requirement_name": requirement.requirement_name,
                            "priority": requirement.priority
                        })
                    })
                    .collect();

                let output = json!({
                    "epic": epic,
                    "overview": overview,
                    "requirements": requirements
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                let missing = || "(none)".dim();

                println!(
                    "Epic ID:   {}",
                    epic.epic_id.clone().unwrap_or_else(missing)
                );
                println!(
                    "Language:  {}",
                    epic.language.clone().unwrap_or_else(missing)
                );
                println!();

                match overview {
                    Some(overview) => println!("{overview}"),
                    None => println!("{}", "No epic overview found.".warning()),
                }
                println!();

                println!("Requirements ({}):", requirements.len());
                for requirement in &requirements {
                    println!(
                        "  {}  {}  {}",
                        requirement.requirement_id.info(),
                        requirement.requirement_name,
                        requirement.priority.unwrap_or_default().dim(),
                    );
                }
            }
        }

        Ok(())
    }
}
