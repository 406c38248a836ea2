use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{
    Config,
    epic::EpicMetadata,
    patterns::{Patterns, SectionHeader},
    requirement::RequirementBlock,
    section::Section,
    splitter::{self, RecursiveSplitter},
};

/// A bounded piece of a requirement section, ready to be indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// The section header on its own line, followed by the content.
    pub text: String,

    /// Where the content came from.
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// The chunk's content, without the leading header line.
    #[must_use]
    pub fn content(&self) -> &str {
        self.text
            .split_once('\n')
            .map_or("", |(_, content)| content)
    }
}

/// The metadata attached to every chunk.
///
/// Each chunk owns its metadata; chunks from the same requirement hold equal
/// but independent copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// The document's language tag.
    #[serde(rename = "lang")]
    pub language: Option<String>,

    /// The document's epic identifier.
    pub epic_id: Option<String>,

    /// The requirement code.
    pub requirement_id: String,

    /// The requirement's name.
    pub requirement_name: String,

    /// The requirement's priority.
    pub priority: Option<String>,

    /// The section the content belongs to.
    pub section: SectionHeader,
}

impl ChunkMetadata {
    fn new(epic: &EpicMetadata, requirement: &RequirementBlock<'_>, section: SectionHeader) -> Self {
        Self {
            language: epic.language.clone(),
            epic_id: epic.epic_id.clone(),
            requirement_id: requirement.requirement_id.to_string(),
            requirement_name: requirement.requirement_name.to_string(),
            priority: requirement.priority.map(str::to_string),
            section,
        }
    }
}

/// Observes the chunker's walk over a document's requirements.
///
/// Reporting is cosmetic; it has no effect on the chunks produced.
pub trait Progress {
    /// Called once, before the first requirement, with the number of
    /// requirements found.
    fn start(&mut self, _total: usize) {}

    /// Called after each requirement has been chunked.
    fn advance(&mut self, _requirement_id: &str) {}

    /// Called once all requirements have been chunked.
    fn finish(&mut self) {}
}

/// A [`Progress`] which ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {}

/// Errors that can occur when building a [`Chunker`].
#[derive(Debug, thiserror::Error)]
pub enum ChunkerError {
    /// The size or overlap is invalid.
    #[error(transparent)]
    Splitter(#[from] splitter::Error),

    /// The requirement prefix produced an unusable pattern.
    #[error("invalid requirement prefix: {0}")]
    Prefix(#[from] regex::Error),
}

/// Turns requirements documents into chunks.
///
/// A chunker holds only its compiled configuration; every call is
/// independent, so one chunker can serve many documents, including from
/// several threads at once.
#[derive(Debug, Clone)]
pub struct Chunker {
    max_chunk_size: usize,
    patterns: Patterns,
    splitter: RecursiveSplitter,
}

impl Chunker {
    /// Builds a chunker from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the chunk size is zero, the overlap is not smaller
    /// than the chunk size, or the requirement prefix cannot be compiled.
    pub fn new(config: &Config) -> Result<Self, ChunkerError> {
        let splitter = RecursiveSplitter::new(config.max_chunk_size(), config.chunk_overlap())?;
        let patterns = Patterns::new(config.requirement_prefix())?;

        Ok(Self {
            max_chunk_size: config.max_chunk_size(),
            patterns,
            splitter,
        })
    }

    /// The patterns used to find requirements.
    #[must_use]
    pub const fn patterns(&self) -> &Patterns {
        &self.patterns
    }

    /// Chunks a document.
    ///
    /// Chunks are returned in document order: by requirement, then by
    /// section, then by split piece. A document without requirement headers
    /// yields no chunks.
    #[must_use]
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        self.chunk_with_progress(text, &mut NoProgress)
    }

    /// Chunks a document, reporting each requirement to `progress`.
    #[instrument(level = "debug", skip_all, fields(length = text.len()))]
    pub fn chunk_with_progress(&self, text: &str, progress: &mut impl Progress) -> Vec<Chunk> {
        let epic = EpicMetadata::extract(text);
        let requirements = RequirementBlock::segment(text, &self.patterns);

        progress.start(requirements.len());

        let mut chunks = Vec::new();
        for requirement in &requirements {
            let sections = Section::segment(requirement.raw_text);
            debug!(
                requirement = requirement.requirement_id,
                sections = sections.len(),
                "segmented requirement"
            );

            for section in sections {
                let metadata = ChunkMetadata::new(&epic, requirement, section.header);
                self.chunk_section(&section, metadata, &mut chunks);
            }

            progress.advance(requirement.requirement_id);
        }

        progress.finish();
        debug!(chunks = chunks.len(), "chunked document");
        chunks
    }

    fn chunk_section(&self, section: &Section, metadata: ChunkMetadata, chunks: &mut Vec<Chunk>) {
        let header = section.header;

        if section.content.chars().count() <= self.max_chunk_size {
            chunks.push(Chunk {
                text: format!("{header}\n{}", section.content.trim()),
                metadata,
            });
            return;
        }

        let pieces = self.splitter.split(&section.content);
        debug!(%header, pieces = pieces.len(), "split oversized section");

        chunks.extend(pieces.into_iter().map(|piece| Chunk {
            text: format!("{header}\n{piece}"),
            metadata: metadata.clone(),
        }));
    }
}
