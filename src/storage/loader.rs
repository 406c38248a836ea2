use std::{
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};
use walkdir::WalkDir;

use super::docx;

/// The kinds of document the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Docx,
    Text,
}

impl Format {
    fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "docx" => Some(Self::Docx),
            "txt" | "md" | "markdown" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Loads the full text of a requirements document.
///
/// Word documents (`.docx`) are flattened to their body paragraphs, one per
/// line. Plain text and markdown files are read as UTF-8.
///
/// # Errors
///
/// Returns an error if the file does not exist, has an unsupported
/// extension, or cannot be read or decoded.
#[instrument(level = "debug")]
pub fn load(path: &Path) -> Result<String, LoadError> {
    let format =
        Format::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;

    let file = File::open(path).map_err(|io_error| match io_error.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io(io_error),
    })?;

    let text = match format {
        Format::Docx => docx::read_paragraphs(BufReader::new(file))?,
        Format::Text => io::read_to_string(file)?,
    };

    debug!(length = text.len(), "loaded document");
    Ok(text)
}

/// Expands a list of paths into the documents they name.
///
/// Files are kept as given, whatever their extension. Directories are walked
/// recursively and contribute every supported document beneath them, in
/// sorted order. Word lock files (`~$name.docx`) are skipped.
///
/// # Errors
///
/// Returns an error if a directory cannot be walked.
pub fn collect_documents<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PathBuf>, LoadError> {
    let mut documents = Vec::new();

    for path in paths {
        let path = path.as_ref();
        if !path.is_dir() {
            documents.push(path.to_path_buf());
            continue;
        }

        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            let is_lock_file = entry.file_name().to_string_lossy().starts_with("~$");

            if entry.file_type().is_file()
                && !is_lock_file
                && Format::from_path(entry.path()).is_some()
            {
                documents.push(entry.into_path());
            }
        }
    }

    Ok(documents)
}

/// Errors that can occur when loading a document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The document does not exist.
    #[error("document not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The document's extension is not one the loader understands.
    #[error("unsupported document format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The Word document is not a valid archive.
    #[error("invalid docx archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The Word document's XML could not be parsed.
    #[error("invalid docx content: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The Word document lacks a required part.
    #[error("docx archive has no {0}")]
    MissingPart(&'static str),
}
