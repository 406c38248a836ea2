use regex::Captures;
use tracing::debug;

use super::patterns::{self, Patterns};

/// The text of one requirement, sliced out of the document.
///
/// Blocks borrow from the document they were segmented from and are consumed
/// straight away by the section segmenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementBlock<'a> {
    /// The requirement code (for example `PSE1.1`).
    pub requirement_id: &'a str,

    /// The requirement's name, truncated to the first line of the header.
    pub requirement_name: &'a str,

    /// The priority value, if the block states one.
    pub priority: Option<&'a str>,

    /// Everything between this requirement's header line and the next
    /// header (or the end of the document), trimmed.
    pub raw_text: &'a str,
}

impl<'a> RequirementBlock<'a> {
    /// Slices a document into requirement blocks, in document order.
    ///
    /// Headers are matched greedily left to right without overlap. A document
    /// with no headers yields no blocks; text before the first header is not
    /// part of any block.
    #[must_use]
    pub fn segment(text: &'a str, patterns: &Patterns) -> Vec<Self> {
        let headers: Vec<_> = patterns.requirement().captures_iter(text).collect();
        debug!(count = headers.len(), "found requirement headers");

        headers
            .iter()
            .enumerate()
            .map(|(i, captures)| {
                let header = captures.get(0).expect("group 0 is always present");
                let start = header.end();
                let end = headers
                    .get(i + 1)
                    .and_then(|next| next.get(0))
                    .map_or(text.len(), |next| next.start());

                let raw_text = text[start..end].trim();

                Self {
                    requirement_id: group(captures, 1),
                    requirement_name: group(captures, 2),
                    priority: find_priority(raw_text),
                    raw_text,
                }
            })
            .collect()
    }
}

fn group<'h>(captures: &Captures<'h>, index: usize) -> &'h str {
    captures.get(index).map_or("", |group| group.as_str().trim())
}

fn find_priority(block: &str) -> Option<&str> {
    patterns::priority()
        .captures(block)
        .and_then(|captures| captures.get(1))
        .map(|priority| priority.as_str().trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = "Epic ID: PSE1\nPSE1.1 – User Registration\nNarrative\nAs a user I want to \
                            register.\nPriority\nHIGH\nPSE1.2 – Password Reset\nNarrative\nAs a \
                            user I want to reset my password.\n";

    #[test]
    fn one_block_per_header() {
        let blocks = RequirementBlock::segment(DOCUMENT, &Patterns::default());

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].requirement_id, "PSE1.1");
        assert_eq!(blocks[0].requirement_name, "User Registration");
        assert_eq!(blocks[1].requirement_id, "PSE1.2");
        assert_eq!(blocks[1].requirement_name, "Password Reset");
    }

    #[test]
    fn block_spans_until_next_header() {
        let blocks = RequirementBlock::segment(DOCUMENT, &Patterns::default());

        assert_eq!(
            blocks[0].raw_text,
            "Narrative\nAs a user I want to register.\nPriority\nHIGH"
        );
        assert_eq!(
            blocks[1].raw_text,
            "Narrative\nAs a user I want to reset my password."
        );
    }

    #[test]
    fn blocks_cover_document_after_first_header() {
        let patterns = Patterns::default();
        let blocks = RequirementBlock::segment(DOCUMENT, &patterns);
        let headers: Vec<_> = patterns.requirement().find_iter(DOCUMENT).collect();

        let rebuilt: String = headers
            .iter()
            .zip(&blocks)
            .map(|(header, block)| format!("{}{}\n", header.as_str(), block.raw_text))
            .collect();

        assert_eq!(rebuilt, &DOCUMENT[headers[0].start()..]);
    }

    #[test]
    fn priority_is_scoped_to_its_block() {
        let blocks = RequirementBlock::segment(DOCUMENT, &Patterns::default());

        assert_eq!(blocks[0].priority, Some("HIGH"));
        assert_eq!(blocks[1].priority, None);
    }

    #[test]
    fn no_headers_no_blocks() {
        let patterns = Patterns::default();
        assert!(RequirementBlock::segment("Narrative\nJust prose.\n", &patterns).is_empty());
        assert!(RequirementBlock::segment("", &patterns).is_empty());
    }

    #[test]
    fn header_without_line_break_is_ignored() {
        let blocks = RequirementBlock::segment("PSE1.1 – Trailing header", &Patterns::default());
        assert!(blocks.is_empty());
    }

    #[test]
    fn multi_line_names_are_truncated() {
        let text = "PSE2.1 – Audit Logging\nfor administrators\nNarrative\nText\n";
        let blocks = RequirementBlock::segment(text, &Patterns::default());

        assert_eq!(blocks[0].requirement_name, "Audit Logging");
        assert!(blocks[0].raw_text.starts_with("for administrators"));
    }

    #[test]
    fn crlf_line_endings() {
        let text = "PSE1.1 – A\r\nNarrative\r\nx\r\nPriority\r\nHIGH\r\n";
        let blocks = RequirementBlock::segment(text, &Patterns::default());

        assert_eq!(blocks[0].requirement_name, "A");
        assert_eq!(blocks[0].priority, Some("HIGH"));
        assert_eq!(blocks[0].raw_text, "Narrative\r\nx\r\nPriority\r\nHIGH");
    }

    #[test]
    fn last_block_runs_to_end_of_document() {
        let text = "PSE3.1 – Export\nNarrative\nExport data.\n\n\n";
        let blocks = RequirementBlock::segment(text, &Patterns::default());

        assert_eq!(blocks[0].raw_text, "Narrative\nExport data.");
    }
}
