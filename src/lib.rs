//! Hierarchical chunking of structured requirements documents
//!
//! A requirements document is a hierarchy of epic, requirement and named
//! section. The chunker turns the raw text of one document into an ordered
//! list of bounded-size chunks, each tagged with the metadata needed to index
//! and retrieve it.

pub mod domain;
pub use domain::{
    Chunk, ChunkMetadata, Chunker, ChunkerError, Config, EpicMetadata, NoProgress, Progress,
    RecursiveSplitter, RequirementBlock, Section, SectionHeader,
};

/// Loading documents from disk.
pub mod storage;
pub use storage::{LoadError, load};
