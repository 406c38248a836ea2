use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The code prefix used for requirement identifiers when none is configured.
pub const DEFAULT_REQUIREMENT_PREFIX: &str = "PSE";

static LANGUAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Language:\s*([a-zA-Z-]+)").expect("this must never fail"));

static EPIC_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Epic ID:\s*([A-Za-z0-9]+)").expect("this must never fail"));

static PRIORITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Priority\s*\n([A-Z]+)").expect("this must never fail"));

/// A recognised section heading within a requirement.
///
/// The order of [`SectionHeader::ALL`] is significant: when a line starts
/// with more than one keyword, the first one in this order wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionHeader {
    /// The user story.
    Narrative,
    /// Behaviour covered by the requirement.
    #[serde(rename = "In Scope")]
    InScope,
    /// Behaviour explicitly excluded from the requirement.
    #[serde(rename = "Out of Scope")]
    OutOfScope,
    /// Conditions which must hold for the requirement to be accepted.
    #[serde(rename = "Acceptance Criteria")]
    AcceptanceCriteria,
    /// The requirement's priority value.
    Priority,
    /// Domain rules constraining the requirement.
    #[serde(rename = "Business Rules")]
    BusinessRules,
    /// Free-form notes.
    #[serde(rename = "Additional Comments")]
    AdditionalComments,
}

impl SectionHeader {
    /// Every header, in tie-break order.
    pub const ALL: [Self; 7] = [
        Self::Narrative,
        Self::InScope,
        Self::OutOfScope,
        Self::AcceptanceCriteria,
        Self::Priority,
        Self::BusinessRules,
        Self::AdditionalComments,
    ];

    /// The keyword as it appears in a document.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Narrative => "Narrative",
            Self::InScope => "In Scope",
            Self::OutOfScope => "Out of Scope",
            Self::AcceptanceCriteria => "Acceptance Criteria",
            Self::Priority => "Priority",
            Self::BusinessRules => "Business Rules",
            Self::AdditionalComments => "Additional Comments",
        }
    }

    /// Returns the header a line opens, if any.
    ///
    /// A line opens a section when, once surrounding whitespace is removed, it
    /// starts with one of the keywords. Matching is case-sensitive. Prose
    /// which happens to begin with a keyword is indistinguishable from a
    /// heading.
    #[must_use]
    pub fn match_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        Self::ALL
            .into_iter()
            .find(|header| trimmed.starts_with(header.as_str()))
    }
}

impl fmt::Display for SectionHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the section keywords.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown section header '{0}'")]
pub struct UnknownHeaderError(String);

impl FromStr for SectionHeader {
    type Err = UnknownHeaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|header| header.as_str() == s)
            .ok_or_else(|| UnknownHeaderError(s.to_string()))
    }
}

/// Patterns which depend on the document's requirement code prefix.
///
/// The document-level patterns (language, epic id, priority) are fixed and
/// shared; only the requirement header and the epic overview terminator
/// mention the prefix.
#[derive(Debug, Clone)]
pub struct Patterns {
    requirement: Regex,
    overview: Regex,
}

impl Patterns {
    /// Compiles the patterns for the given requirement code prefix.
    ///
    /// The prefix is matched literally.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting expression cannot be compiled (for
    /// example because it exceeds the regex size limit).
    pub fn new(prefix: &str) -> Result<Self, regex::Error> {
        let code = format!("{}[0-9.]+", regex::escape(prefix));

        // A code token, an en-dash, and a name running to the end of the line.
        let requirement = Regex::new(&format!(r"({code})\s*–\s*(.+?)\n"))?;

        let overview = Regex::new(&format!(
            r"(?is)Epic Overview\s*(.+?)\n(?:Requirements|{code}|Narrative|Scope|Acceptance Criteria|Priority)"
        ))?;

        Ok(Self {
            requirement,
            overview,
        })
    }

    /// Matches a requirement header line.
    ///
    /// Group 1 is the requirement code, group 2 its name.
    #[must_use]
    pub const fn requirement(&self) -> &Regex {
        &self.requirement
    }

    /// Matches the free-text epic overview.
    ///
    /// Group 1 is the overview text.
    #[must_use]
    pub const fn overview(&self) -> &Regex {
        &self.overview
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIREMENT_PREFIX).expect("this must never fail")
    }
}

/// Matches the document language tag; group 1 is the language.
pub fn language() -> &'static Regex {
    &LANGUAGE
}

/// Matches the epic identifier; group 1 is the id.
pub fn epic_id() -> &'static Regex {
    &EPIC_ID
}

/// Matches a `Priority` line followed by an upper-case value on the next
/// line; group 1 is the value.
pub fn priority() -> &'static Regex {
    &PRIORITY
}
