use std::collections::VecDeque;

use tracing::trace;

/// The default maximum piece length, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 800;

/// The default overlap between consecutive pieces, in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// The default separator cascade: paragraphs, lines, words, characters.
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splits text into pieces of bounded length, preferring coarse boundaries.
///
/// The text is split on the first separator in the cascade which occurs in
/// it. Pieces which are still too long are split again with the finer
/// separators; the rest are packed back together into windows of at most
/// `chunk_size` characters, consecutive windows sharing up to
/// `chunk_overlap` characters of whole pieces. The empty separator splits
/// into single characters.
///
/// A piece which is too long and has no finer separator left is emitted
/// whole rather than cut.
///
/// Lengths are counted in characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    /// Creates a splitter with the default separator cascade.
    ///
    /// # Errors
    ///
    /// Returns an error if `chunk_size` is zero or `chunk_overlap` is not
    /// smaller than `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, Error> {
        if chunk_size == 0 {
            return Err(Error::ZeroChunkSize);
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::OverlapTooLarge {
                overlap: chunk_overlap,
                size: chunk_size,
            });
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.map(String::from).to_vec(),
        })
    }

    /// Replaces the separator cascade, coarsest first.
    #[must_use]
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// The maximum piece length, in characters.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The maximum overlap between consecutive pieces, in characters.
    #[must_use]
    pub const fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Splits `text` into pieces, in order.
    ///
    /// The same input always produces the same output.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, finer) = choose_separator(text, separators);
        trace!(
            separator = ?separator,
            length = char_len(text),
            "splitting text"
        );

        let mut pieces = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for split in split_keeping_separator(text, separator) {
            if char_len(split) < self.chunk_size {
                pending.push(split);
                continue;
            }

            if !pending.is_empty() {
                pieces.extend(self.merge(&pending));
                pending.clear();
            }

            if finer.is_empty() {
                pieces.push(split.to_string());
            } else {
                pieces.extend(self.split_with(split, finer));
            }
        }

        if !pending.is_empty() {
            pieces.extend(self.merge(&pending));
        }

        pieces
    }

    /// Packs consecutive splits into windows of at most `chunk_size`
    /// characters.
    ///
    /// When a window closes, splits are dropped from its front until what is
    /// left fits in the overlap and leaves room for the next split; the
    /// remainder opens the next window.
    fn merge(&self, splits: &[&str]) -> Vec<String> {
        let mut windows = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for &split in splits {
            let length = char_len(split);

            if total + length > self.chunk_size && !current.is_empty() {
                push_window(&mut windows, &current);

                while total > self.chunk_overlap
                    || (total + length > self.chunk_size && total > 0)
                {
                    let Some(front) = current.pop_front() else {
                        break;
                    };
                    total -= char_len(front);
                }
            }

            current.push_back(split);
            total += length;
        }

        push_window(&mut windows, &current);
        windows
    }
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP).expect("defaults are valid")
    }
}

/// Errors that can occur when configuring a splitter.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The chunk size must be at least one character.
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    /// Consecutive pieces cannot overlap by a whole piece.
    #[error("chunk overlap ({overlap}) must be smaller than the chunk size ({size})")]
    OverlapTooLarge {
        /// The requested overlap.
        overlap: usize,
        /// The requested chunk size.
        size: usize,
    },
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Picks the first separator present in `text`, returning it with the finer
/// separators after it.
///
/// The empty separator always matches and has nothing finer.
fn choose_separator<'s>(text: &str, separators: &'s [String]) -> (&'s str, &'s [String]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return ("", &[]);
        }
        if text.contains(separator.as_str()) {
            return (separator.as_str(), &separators[i + 1..]);
        }
    }
    (separators.last().map_or("", String::as_str), &[])
}

/// Splits `text` before every occurrence of `separator`, so each split after
/// the first begins with the separator. Empty splits are dropped.
fn split_keeping_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut splits = Vec::new();
    let mut start = 0;
    for (index, _) in text.match_indices(separator) {
        splits.push(&text[start..index]);
        start = index;
    }
    splits.push(&text[start..]);

    splits.retain(|split| !split.is_empty());
    splits
}

fn push_window(windows: &mut Vec<String>, splits: &VecDeque<&str>) {
    let joined: String = splits.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        windows.push(trimmed.to_string());
    }
}
