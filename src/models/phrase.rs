//! Phrase is a catalog entry: a prompt, its answer, and accepted alternates.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Phrase {
    pub id: String,
    pub prompt: String,
    pub answer: String,
    #[serde(default)]
    pub accepted: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<Vec<VocabularyItem>>,
}

/// A word inside a phrase tracked for vocabulary mastery.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VocabularyItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl VocabularyItem {
    /// The dictionary form if present, otherwise the surface word.
    pub fn base_word(&self) -> Option<&str> {
        self.base
            .as_deref()
            .or(self.word.as_deref())
            .filter(|w| !w.is_empty())
    }
}

impl Phrase {
    /// Text shown to the learner. Reverse mode shows the answer side.
    pub fn shown_side(&self, reverse: bool) -> &str {
        if reverse { &self.answer } else { &self.prompt }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_deserialize_defaults() {
        let phrase: Phrase =
            serde_json::from_str(r#"{"id": "p1", "prompt": "hello", "answer": "cześć"}"#).unwrap();

        assert_eq!(phrase.id, "p1");
        assert!(phrase.accepted.is_empty());
        assert!(phrase.vocabulary.is_none());
    }

    #[test]
    fn test_vocabulary_base_word_prefers_base() {
        let item: VocabularyItem =
            serde_json::from_str(r#"{"base": "gehen", "word": "ging", "type": "verb"}"#).unwrap();
        assert_eq!(item.base_word(), Some("gehen"));
        assert_eq!(item.kind.as_deref(), Some("verb"));

        let item: VocabularyItem = serde_json::from_str(r#"{"word": "Haus"}"#).unwrap();
        assert_eq!(item.base_word(), Some("Haus"));
    }

    #[test]
    fn test_shown_side() {
        let phrase = Phrase {
            id: "p1".to_string(),
            prompt: "thank you".to_string(),
            answer: "dziękuję".to_string(),
            accepted: Vec::new(),
            vocabulary: None,
        };

        assert_eq!(phrase.shown_side(false), "thank you");
        assert_eq!(phrase.shown_side(true), "dziękuję");
    }
}
