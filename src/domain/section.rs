use tracing::trace;

use super::patterns::SectionHeader;

/// A named subdivision of a requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// The heading which opened the section.
    pub header: SectionHeader,

    /// The lines following the heading, joined with `\n`.
    pub content: String,
}

impl Section {
    /// Splits a requirement block into its sections, in document order.
    ///
    /// Each line which opens a section closes the one before it. Every other
    /// line, blank lines included, belongs to the section currently open.
    /// Lines before the first heading are dropped.
    #[must_use]
    pub fn segment(block: &str) -> Vec<Self> {
        let mut accumulator = Accumulator::default();
        for line in block.lines() {
            accumulator.push(line);
        }
        accumulator.finish()
    }
}

/// Line accumulator with two states: no section open, or one section open
/// with its buffered lines.
#[derive(Debug, Default)]
struct Accumulator<'a> {
    open: Option<(SectionHeader, Vec<&'a str>)>,
    sections: Vec<Section>,
}

impl<'a> Accumulator<'a> {
    fn push(&mut self, line: &'a str) {
        if let Some(header) = SectionHeader::match_line(line) {
            self.flush();
            self.open = Some((header, Vec::new()));
        } else if let Some((_, lines)) = &mut self.open {
            lines.push(line);
        } else {
            trace!(line, "dropping line before first section header");
        }
    }

    fn flush(&mut self) {
        if let Some((header, lines)) = self.open.take() {
            self.sections.push(Section {
                header,
                content: lines.join("\n"),
            });
        }
    }

    fn finish(mut self) -> Vec<Section> {
        self.flush();
        self.sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(sections: &[Section]) -> Vec<SectionHeader> {
        sections.iter().map(|section| section.header).collect()
    }

    #[test]
    fn sections_in_document_order() {
        let block = "Narrative\nAs a user I want to register.\nIn Scope\n- email sign up\nOut of \
                     Scope\n- social login\nAcceptance Criteria\n- account is created";
        let sections = Section::segment(block);

        assert_eq!(
            headers(&sections),
            [
                SectionHeader::Narrative,
                SectionHeader::InScope,
                SectionHeader::OutOfScope,
                SectionHeader::AcceptanceCriteria,
            ]
        );
        assert_eq!(sections[0].content, "As a user I want to register.");
        assert_eq!(sections[3].content, "- account is created");
    }

    #[test]
    fn preamble_is_dropped() {
        let sections = Section::segment("stray text\nmore\nNarrative\nstory");

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].content, "story");
    }

    #[test]
    fn blank_lines_are_kept() {
        let sections = Section::segment("Business Rules\nfirst\n\n  second\n");

        assert_eq!(sections[0].content, "first\n\n  second");
    }

    #[test]
    fn empty_sections_are_emitted() {
        let sections = Section::segment("Priority\nAdditional Comments");

        assert_eq!(
            headers(&sections),
            [SectionHeader::Priority, SectionHeader::AdditionalComments]
        );
        assert!(sections.iter().all(|section| section.content.is_empty()));
    }

    #[test]
    fn heading_line_text_is_not_content() {
        let sections = Section::segment("Narrative: As an admin\nI want reports");

        assert_eq!(sections[0].header, SectionHeader::Narrative);
        assert_eq!(sections[0].content, "I want reports");
    }

    #[test]
    fn prose_starting_with_keyword_opens_a_section() {
        let block = "Acceptance Criteria\n- login works\nPriority users skip the queue\n- logout works";
        let sections = Section::segment(block);

        assert_eq!(
            headers(&sections),
            [SectionHeader::AcceptanceCriteria, SectionHeader::Priority]
        );
        assert_eq!(sections[1].content, "- logout works");
    }

    #[test]
    fn crlf_line_endings() {
        let sections = Section::segment("Narrative\r\nx\r\n\r\ny\r\nIn Scope\r\nz");

        assert_eq!(
            headers(&sections),
            [SectionHeader::Narrative, SectionHeader::InScope]
        );
        assert_eq!(sections[0].content, "x\n\ny");
        assert_eq!(sections[1].content, "z");
    }

    #[test]
    fn no_headers_no_sections() {
        assert!(Section::segment("just text").is_empty());
        assert!(Section::segment("").is_empty());
    }
}
