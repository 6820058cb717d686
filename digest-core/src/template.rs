//! Meme templates, template assignments and output prompts

use serde::{Deserialize, Serialize};

/// A meme format available for matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemeTemplate {
    /// Opaque identifier used to tag generated output
    pub id: String,
    /// Template name (e.g., "Drake Hotline Bling")
    #[serde(default)]
    pub name: String,
    /// Visual structure of the meme
    #[serde(default, alias = "meme")]
    pub description: String,
    /// When and how the meme is used
    #[serde(default)]
    pub usage_context: String,
}

/// Article index -> template index mapping
///
/// Position `i` holds the template index chosen for article `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchAssignment(Vec<usize>);

impl MatchAssignment {
    /// Wrap already-validated indices
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First template index assigned to more than one article
    pub fn first_duplicate(&self) -> Option<usize> {
        let mut seen = std::collections::HashSet::with_capacity(self.0.len());
        self.0.iter().copied().find(|idx| !seen.insert(*idx))
    }
}

/// Final pipeline output handed to the image generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemePrompt {
    /// Image-generation prompt
    pub prompt: String,
    /// URL of the article the meme is about
    pub url: String,
    /// Identifier of the template the prompt uses
    pub template_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_accepts_legacy_meme_field() {
        let json = r#"{"id": "local_0", "meme": "Drake rejects one thing and approves another"}"#;
        let template: MemeTemplate = serde_json::from_str(json).unwrap();
        assert_eq!(template.id, "local_0");
        assert!(template.name.is_empty());
        assert!(template.description.starts_with("Drake rejects"));
    }

    #[test]
    fn test_assignment_duplicates() {
        assert_eq!(MatchAssignment::new(vec![2, 0, 1]).first_duplicate(), None);
        assert_eq!(MatchAssignment::new(vec![2, 0, 3, 0, 2]).first_duplicate(), Some(0));
        assert_eq!(MatchAssignment::new(vec![]).first_duplicate(), None);
    }

    #[test]
    fn test_assignment_serializes_as_array() {
        let assignment = MatchAssignment::new(vec![4, 1]);
        assert_eq!(serde_json::to_string(&assignment).unwrap(), "[4,1]");
    }
}
