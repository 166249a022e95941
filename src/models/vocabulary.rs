//! Vocabulary mastery across the phrases a word appears in.
//!
//! Each word keeps one context per `(collection, phrase)` it was practiced in.
//! A context is mastered after two correct answers and loses that on a miss.
//! A word's overall mastery is the share of its contexts that are mastered.

use super::Phrase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const CONTEXT_MASTERY_CORRECT: u32 = 2;
const WEAK_MASTERY_BELOW: f64 = 0.5;

pub type VocabMastery = BTreeMap<String, WordMastery>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordMastery {
    pub word: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub contexts: Vec<WordContext>,
    #[serde(default)]
    pub total_correct: u32,
    #[serde(default)]
    pub total_attempts: u32,
    #[serde(default)]
    pub overall_mastery: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordContext {
    pub key: String,
    #[serde(rename = "setId")]
    pub collection_id: String,
    pub phrase_id: String,
    pub correct: u32,
    pub attempts: u32,
    pub mastered: bool,
}

/// A word that shows up in several contexts but is mastered in few of them.
#[derive(Clone, Debug, PartialEq)]
pub struct WeakWord {
    pub word: String,
    pub kind: Option<String>,
    pub mastery: f64,
    pub contexts: usize,
    pub mastered_contexts: usize,
}

/// Applies one answer to every word of the phrase. Returns false when the
/// phrase has no vocabulary and nothing changed.
pub fn record_answer(
    mastery: &mut VocabMastery,
    phrase: &Phrase,
    correct: bool,
    collection_id: &str,
) -> bool {
    let Some(vocabulary) = phrase.vocabulary.as_ref() else {
        return false;
    };

    let mut changed = false;
    for item in vocabulary {
        let Some(base_word) = item.base_word() else {
            continue;
        };
        changed = true;

        let entry = mastery
            .entry(base_word.to_lowercase())
            .or_insert_with(|| WordMastery {
                word: base_word.to_string(),
                kind: item.kind.clone(),
                contexts: Vec::new(),
                total_correct: 0,
                total_attempts: 0,
                overall_mastery: 0.0,
            });

        let context_key = format!("{collection_id}__{}", phrase.id);
        let index = match entry.contexts.iter().position(|c| c.key == context_key) {
            Some(index) => index,
            None => {
                entry.contexts.push(WordContext {
                    key: context_key,
                    collection_id: collection_id.to_string(),
                    phrase_id: phrase.id.clone(),
                    correct: 0,
                    attempts: 0,
                    mastered: false,
                });
                entry.contexts.len() - 1
            }
        };

        let context = &mut entry.contexts[index];
        context.attempts += 1;
        entry.total_attempts += 1;
        if correct {
            context.correct += 1;
            entry.total_correct += 1;
            if context.correct >= CONTEXT_MASTERY_CORRECT {
                context.mastered = true;
            }
        } else {
            context.correct = 0;
            context.mastered = false;
        }

        let mastered = entry.contexts.iter().filter(|c| c.mastered).count();
        entry.overall_mastery = mastered as f64 / entry.contexts.len() as f64;
    }
    changed
}

/// Words seen in at least `min_contexts` contexts with mastery below one
/// half, weakest first.
pub fn weak_vocabulary(mastery: &VocabMastery, min_contexts: usize) -> Vec<WeakWord> {
    let mut weak: Vec<WeakWord> = mastery
        .values()
        .filter(|w| w.contexts.len() >= min_contexts && w.overall_mastery < WEAK_MASTERY_BELOW)
        .map(|w| WeakWord {
            word: w.word.clone(),
            kind: w.kind.clone(),
            mastery: w.overall_mastery,
            contexts: w.contexts.len(),
            mastered_contexts: w.contexts.iter().filter(|c| c.mastered).count(),
        })
        .collect();
    weak.sort_by(|a, b| a.mastery.total_cmp(&b.mastery));
    weak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VocabularyItem;

    fn phrase(id: &str, words: &[&str]) -> Phrase {
        Phrase {
            id: id.to_string(),
            prompt: format!("prompt {id}"),
            answer: format!("answer {id}"),
            accepted: Vec::new(),
            vocabulary: Some(
                words
                    .iter()
                    .map(|w| VocabularyItem {
                        base: Some(w.to_string()),
                        word: None,
                        kind: Some("noun".to_string()),
                    })
                    .collect(),
            ),
        }
    }

    #[test]
    fn test_phrase_without_vocabulary_is_skipped() {
        let mut mastery = VocabMastery::new();
        let mut plain = phrase("p1", &[]);
        plain.vocabulary = None;

        assert!(!record_answer(&mut mastery, &plain, true, "travel"));
        assert!(mastery.is_empty());
    }

    #[test]
    fn test_context_mastered_after_two_correct() {
        let mut mastery = VocabMastery::new();
        let p = phrase("p1", &["Haus"]);

        record_answer(&mut mastery, &p, true, "travel");
        assert!(!mastery["haus"].contexts[0].mastered);
        record_answer(&mut mastery, &p, true, "travel");

        let word = &mastery["haus"];
        assert_eq!(word.word, "Haus");
        assert!(word.contexts[0].mastered);
        assert_eq!(word.overall_mastery, 1.0);
        assert_eq!(word.total_attempts, 2);
    }

    #[test]
    fn test_miss_resets_context() {
        let mut mastery = VocabMastery::new();
        let p = phrase("p1", &["Haus"]);

        record_answer(&mut mastery, &p, true, "travel");
        record_answer(&mut mastery, &p, true, "travel");
        record_answer(&mut mastery, &p, false, "travel");

        let context = &mastery["haus"].contexts[0];
        assert!(!context.mastered);
        assert_eq!(context.correct, 0);
        assert_eq!(mastery["haus"].total_correct, 2);
    }

    #[test]
    fn test_weak_vocabulary() {
        let mut mastery = VocabMastery::new();
        let a = phrase("p1", &["Haus", "Baum"]);
        let b = phrase("p2", &["Haus", "Baum"]);
        let c = phrase("p3", &["Haus"]);

        // Baum: mastered in both contexts.
        for _ in 0..2 {
            record_answer(&mut mastery, &a, true, "travel");
            record_answer(&mut mastery, &b, true, "travel");
        }
        // Haus: one more context, never mastered there; then lose p2.
        record_answer(&mut mastery, &c, false, "travel");
        record_answer(&mut mastery, &b, false, "travel");

        let weak = weak_vocabulary(&mastery, 2);
        assert_eq!(weak.len(), 1);
        assert_eq!(weak[0].word, "Haus");
        assert_eq!(weak[0].contexts, 3);
        assert_eq!(weak[0].mastered_contexts, 1);
    }
}
