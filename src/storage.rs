mod docx;
/// Reading requirements documents from disk.
pub mod loader;

pub use loader::{LoadError, collect_documents, load};
