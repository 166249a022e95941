//! Checking a typed or recognized response against a phrase.
//!
//! Comparison ignores case and surrounding whitespace. Speech recognizers
//! often split or join compound words ("entlang gehen" / "entlanggehen") and
//! drop hyphens ("check-out" / "checkout"), so a response also matches when
//! both sides agree once spaces and hyphens are removed.

use crate::models::Phrase;

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn compact(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Texts that count as correct. Reverse mode expects the prompt back.
pub fn expected_answers(phrase: &Phrase, reverse: bool) -> Vec<&str> {
    if reverse {
        vec![phrase.prompt.as_str()]
    } else {
        std::iter::once(phrase.answer.as_str())
            .chain(phrase.accepted.iter().map(String::as_str))
            .collect()
    }
}

pub fn check_answer(phrase: &Phrase, response: &str, reverse: bool) -> bool {
    let response = normalize(response);
    if response.is_empty() {
        return false;
    }
    let response_compact = compact(&response);

    expected_answers(phrase, reverse).into_iter().any(|expected| {
        let expected = normalize(expected);
        expected == response || compact(&expected) == response_compact
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrase() -> Phrase {
        Phrase {
            id: "p1".to_string(),
            prompt: "to walk along".to_string(),
            answer: "entlanggehen".to_string(),
            accepted: vec!["check-out".to_string(), "Auf Wiedersehen".to_string()],
            vocabulary: None,
        }
    }

    #[test]
    fn test_exact_and_case_insensitive() {
        assert!(check_answer(&phrase(), "entlanggehen", false));
        assert!(check_answer(&phrase(), "  EntlangGehen ", false));
        assert!(check_answer(&phrase(), "auf wiedersehen", false));
    }

    #[test]
    fn test_spaces_and_hyphens_ignored() {
        assert!(check_answer(&phrase(), "entlang gehen", false));
        assert!(check_answer(&phrase(), "checkout", false));
        assert!(check_answer(&phrase(), "check out", false));
    }

    #[test]
    fn test_wrong_answers() {
        assert!(!check_answer(&phrase(), "gehen", false));
        assert!(!check_answer(&phrase(), "", false));
        assert!(!check_answer(&phrase(), "   ", false));
    }

    #[test]
    fn test_reverse_mode_expects_prompt() {
        assert!(check_answer(&phrase(), "To walk along", true));
        assert!(!check_answer(&phrase(), "entlanggehen", true));
    }
}
