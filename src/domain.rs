//! Domain models for requirements chunking.
//!
//! This module contains the pattern library, the segmenters which walk a
//! document down to its sections, the recursive splitter, and the chunk
//! assembler which ties them together.

/// Chunk assembly.
pub mod chunk;
pub use chunk::{Chunk, ChunkMetadata, Chunker, ChunkerError, NoProgress, Progress};

mod config;
pub use config::Config;

/// Document-level metadata.
pub mod epic;
pub use epic::{EpicMetadata, extract_epic_overview};

/// Section-header keywords and metadata patterns.
pub mod patterns;
pub use patterns::{Patterns, SectionHeader};

/// Requirement boundaries.
pub mod requirement;
pub use requirement::RequirementBlock;

/// Section boundaries within a requirement.
pub mod section;
pub use section::Section;

/// Bounded recursive text splitting.
pub mod splitter;
pub use splitter::RecursiveSplitter;
