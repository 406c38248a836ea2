use serde::{Deserialize, Serialize};

use super::patterns::{self, Patterns};

/// Tags which apply to a whole document.
///
/// Both fields are optional; a document without them still chunks, and the
/// absence is carried into every chunk's metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpicMetadata {
    /// The language tag (`Language: en`).
    #[serde(rename = "lang")]
    pub language: Option<String>,

    /// The epic identifier (`Epic ID: PSE1`).
    pub epic_id: Option<String>,
}

impl EpicMetadata {
    /// Extracts the language and epic id from the full document text.
    ///
    /// The first occurrence of each tag wins.
    #[must_use]
    pub fn extract(text: &str) -> Self {
        let first_capture = |regex: &regex::Regex| {
            regex
                .captures(text)
                .and_then(|captures| captures.get(1))
                .map(|value| value.as_str().to_string())
        };

        Self {
            language: first_capture(patterns::language()),
            epic_id: first_capture(patterns::epic_id()),
        }
    }
}

/// Extracts the free-text epic overview.
///
/// The overview runs from an `Epic Overview` heading (matched
/// case-insensitively) up to the first line which starts a requirements
/// listing, a requirement code, or a section heading. Returns `None` if there
/// is no such heading or nothing terminates the overview.
#[must_use]
pub fn extract_epic_overview(text: &str, patterns: &Patterns) -> Option<String> {
    patterns
        .overview()
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|overview| overview.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_both_tags() {
        let metadata = EpicMetadata::extract("Epic ID: PSE1\nLanguage: en-GB\n");
        assert_eq!(metadata.epic_id.as_deref(), Some("PSE1"));
        assert_eq!(metadata.language.as_deref(), Some("en-GB"));
    }

    #[test]
    fn missing_tags_are_none() {
        assert_eq!(EpicMetadata::extract("no tags here"), EpicMetadata::default());
        assert_eq!(EpicMetadata::extract(""), EpicMetadata::default());
    }

    #[test]
    fn epic_id_stops_at_non_alphanumeric() {
        let metadata = EpicMetadata::extract("Epic ID: PSE1.2");
        assert_eq!(metadata.epic_id.as_deref(), Some("PSE1"));
    }

    #[test]
    fn first_occurrence_wins() {
        let metadata = EpicMetadata::extract("Language: en\nLanguage: vi\n");
        assert_eq!(metadata.language.as_deref(), Some("en"));
    }

    #[test]
    fn serializes_language_as_lang() {
        let metadata = EpicMetadata {
            language: None,
            epic_id: Some("PSE1".to_string()),
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json, serde_json::json!({"lang": null, "epic_id": "PSE1"}));
    }

    #[test]
    fn overview_runs_until_first_requirement() {
        let text = "Epic ID: PSE1\nEpic Overview\nUsers can manage their accounts.\nAll flows are \
                    audited.\nPSE1.1 – User Registration\nNarrative\n";
        let overview = extract_epic_overview(text, &Patterns::default());
        assert_eq!(
            overview.as_deref(),
            Some("Users can manage their accounts.\nAll flows are audited.")
        );
    }

    #[test]
    fn overview_heading_is_case_insensitive() {
        let text = "EPIC OVERVIEW: Short summary.\nRequirements\n";
        let overview = extract_epic_overview(text, &Patterns::default());
        assert_eq!(overview.as_deref(), Some(": Short summary."));
    }

    #[test]
    fn overview_absent() {
        assert_eq!(extract_epic_overview("Narrative\n", &Patterns::default()), None);
    }
}
