use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use reqchunk::{
    Chunk, Chunker, Config, EpicMetadata, Progress, domain::extract_epic_overview,
    storage::collect_documents,
};
use serde::Serialize;
use tracing::{info, instrument};

use super::{
    Overrides,
    terminal::{Colorize, terminal_width, truncate},
};

/// Command arguments for `reqchunk chunk`.
#[derive(Debug, Parser)]
pub struct ChunkDocuments {
    /// Documents to chunk. Directories are searched for .docx, .txt and .md
    /// files.
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    #[command(flatten)]
    pub(super) overrides: Overrides,

    /// Output format (default: json).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Write JSON output to this file instead of stdout.
    #[arg(long, short, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// One JSON array of documents, each with its chunks
    #[default]
    Json,
    /// One JSON object per chunk per line
    Jsonl,
    /// A human-readable listing
    Summary,
}

/// The chunks of one document, with its document-level metadata.
#[derive(Debug, Serialize)]
struct Document {
    source: PathBuf,
    epic: EpicMetadata,
    overview: Option<String>,
    chunks: Vec<Chunk>,
}

/// A single chunk tagged with the document it came from.
#[derive(Debug, Serialize)]
struct Record<'a> {
    source: &'a Path,
    #[serde(flatten)]
    chunk: &'a Chunk,
}

impl ChunkDocuments {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: Config) -> anyhow::Result<()> {
        let config = self.overrides.apply(config);
        let chunker = super::chunker(&config)?;

        if self.out.is_some() && matches!(self.output, OutputFormat::Summary) {
            anyhow::bail!("summary output is written to the terminal only; use --output json");
        }

        let paths = collect_documents(&self.paths)?;
        if paths.is_empty() {
            anyhow::bail!("no documents found");
        }

        let documents = if let [path] = paths.as_slice() {
            let mut progress = RequirementProgress::new(path)?;
            vec![chunk_document(&chunker, path, &mut progress)?]
        } else {
            chunk_documents(&chunker, &paths)?
        };

        let total: usize = documents.iter().map(|document| document.chunks.len()).sum();
        info!(documents = documents.len(), chunks = total, "chunked documents");

        match &self.out {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                let mut writer = BufWriter::new(file);
                write_documents(&mut writer, &documents, self.output)?;
                writer.flush()?;
            }
            None => {
                let mut writer = io::stdout().lock();
                write_documents(&mut writer, &documents, self.output)?;
            }
        }

        Ok(())
    }
}

fn chunk_document(
    chunker: &Chunker,
    path: &Path,
    progress: &mut impl Progress,
) -> anyhow::Result<Document> {
    let text =
        reqchunk::load(path).with_context(|| format!("failed to load {}", path.display()))?;

    Ok(Document {
        source: path.to_path_buf(),
        epic: EpicMetadata::extract(&text),
        overview: extract_epic_overview(&text, chunker.patterns()),
        chunks: chunker.chunk_with_progress(&text, progress),
    })
}

/// Chunks several documents in parallel, preserving their order.
fn chunk_documents(chunker: &Chunker, paths: &[PathBuf]) -> anyhow::Result<Vec<Document>> {
    let bar = ProgressBar::new(paths.len() as u64).with_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} documents {wide_msg}")?,
    );

    let documents = paths
        .par_iter()
        .map(|path| {
            let document = chunk_document(chunker, path, &mut reqchunk::NoProgress);
            bar.set_message(path.display().to_string());
            bar.inc(1);
            document
        })
        .collect::<anyhow::Result<Vec<_>>>();

    bar.finish_and_clear();
    documents
}

/// Shows a bar over the requirements of a single document.
struct RequirementProgress(ProgressBar);

impl RequirementProgress {
    fn new(path: &Path) -> anyhow::Result<Self> {
        let bar = ProgressBar::no_length()
            .with_style(ProgressStyle::with_template(
                "{prefix} {bar:40} {pos}/{len} requirements {msg}",
            )?)
            .with_prefix(
                path.file_name()
                    .map_or_else(String::new, |name| name.to_string_lossy().into_owned()),
            );
        Ok(Self(bar))
    }
}

impl Progress for RequirementProgress {
    fn start(&mut self, total: usize) {
        self.0.set_length(total as u64);
    }

    fn advance(&mut self, requirement_id: &str) {
        self.0.set_message(requirement_id.to_string());
        self.0.inc(1);
    }

    fn finish(&mut self) {
        self.0.finish_and_clear();
    }
}

fn write_documents<W: Write>(
    writer: &mut W,
    documents: &[Document],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, documents)?;
            writeln!(writer)?;
        }
        OutputFormat::Jsonl => {
            for document in documents {
                for chunk in &document.chunks {
                    let record = Record {
                        source: &document.source,
                        chunk,
                    };
                    serde_json::to_writer(&mut *writer, &record)?;
                    writeln!(writer)?;
                }
            }
        }
        OutputFormat::Summary => write_summary(writer, documents)?,
    }
    Ok(())
}

fn write_summary<W: Write>(writer: &mut W, documents: &[Document]) -> io::Result<()> {
    let width = usize::from(terminal_width().unwrap_or(100));

    for document in documents {
        let requirements = {
            let mut ids: Vec<_> = document
                .chunks
                .iter()
                .map(|chunk| chunk.metadata.requirement_id.as_str())
                .collect();
            ids.dedup();
            ids.len()
        };

        writeln!(
            writer,
            "{}  {}",
            document.source.display().to_string().success(),
            format!(
                "epic {}, lang {}, {} chunks from {requirements} requirements",
                document.epic.epic_id.as_deref().unwrap_or("-"),
                document.epic.language.as_deref().unwrap_or("-"),
                document.chunks.len(),
            )
            .dim()
        )?;

        if document.chunks.is_empty() {
            writeln!(writer, "  {}", "no requirement headers found".warning())?;
            continue;
        }

        for chunk in &document.chunks {
            let content = chunk.content();
            let id = format!("{:<10}", chunk.metadata.requirement_id);
            let section = format!("{:<20}", chunk.metadata.section.as_str());
            let length = format!("{:>5}", content.chars().count());

            let used = 2 + id.chars().count() + 1 + section.len() + 1 + length.len() + 1;
            let preview = content.lines().next().unwrap_or_default();

            writeln!(
                writer,
                "  {} {section} {} {}",
                id.info(),
                length.dim(),
                truncate(preview, width.saturating_sub(used)),
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        let chunker = Chunker::new(&Config::default()).unwrap();
        let text = "Epic ID: PSE1\nPSE1.1 – Login\nNarrative\nAs a user I want to log in.\n";
        Document {
            source: PathBuf::from("epic.txt"),
            epic: EpicMetadata::extract(text),
            overview: None,
            chunks: chunker.chunk(text),
        }
    }

    #[test]
    fn jsonl_has_one_line_per_chunk() {
        let mut buffer = Vec::new();
        write_documents(&mut buffer, &[document(), document()], OutputFormat::Jsonl).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(record["source"], "epic.txt");
        assert_eq!(record["text"], "Narrative\nAs a user I want to log in.");
        assert_eq!(record["metadata"]["requirement_id"], "PSE1.1");
    }

    #[test]
    fn json_groups_chunks_by_document() {
        let mut buffer = Vec::new();
        write_documents(&mut buffer, &[document()], OutputFormat::Json).unwrap();

        let output: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(output[0]["epic"]["epic_id"], "PSE1");
        assert_eq!(output[0]["epic"]["lang"], serde_json::Value::Null);
        assert_eq!(output[0]["chunks"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn chunks_a_text_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("epic.md");
        std::fs::write(
            &path,
            "Epic ID: PSE9\nEpic Overview\nA short epic.\nPSE9.1 – Only\nNarrative\nStory\n",
        )
        .unwrap();
        let chunker = Chunker::new(&Config::default()).unwrap();

        let document = chunk_document(&chunker, &path, &mut reqchunk::NoProgress).unwrap();

        assert_eq!(document.overview.as_deref(), Some("A short epic."));
        assert_eq!(document.chunks.len(), 1);
    }

    #[test]
    fn parallel_chunking_preserves_order() {
        let tmp = tempfile::tempdir().unwrap();
        let paths: Vec<_> = (1..=4)
            .map(|i| {
                let path = tmp.path().join(format!("epic{i}.txt"));
                std::fs::write(&path, format!("PSE{i}.1 – Item\nNarrative\nStory {i}\n")).unwrap();
                path
            })
            .collect();
        let chunker = Chunker::new(&Config::default()).unwrap();

        let documents = chunk_documents(&chunker, &paths).unwrap();

        let sources: Vec<_> = documents.iter().map(|d| d.source.clone()).collect();
        assert_eq!(sources, paths);
    }
}
