use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A prompt word with the words that are and are not associated with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabEntry {
    pub word: String,
    pub correct: Vec<String>,
    pub incorrect: Vec<String>,
}

impl VocabEntry {
    pub fn new<S: Into<String>>(word: S, correct: &[&str], incorrect: &[&str]) -> Self {
        Self {
            word: word.into(),
            correct: correct.iter().map(|w| w.to_string()).collect(),
            incorrect: incorrect.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Normalise the entry so exactly one kind of association applies to each word.
    ///
    /// Words are trimmed, lowercased and de-duplicated; the prompt is removed
    /// from both lists and anything listed as correct is removed from the
    /// incorrect list. Returns `None` when either list ends up empty.
    pub fn sanitized(&self) -> Option<VocabEntry> {
        let word = normalize(&self.word);
        if word.is_empty() {
            return None;
        }

        let mut seen: HashSet<String> = HashSet::from([word.clone()]);
        let correct = dedup_into(&self.correct, &mut seen);
        let incorrect = dedup_into(&self.incorrect, &mut seen);

        if correct.is_empty() || incorrect.is_empty() {
            return None;
        }

        Some(VocabEntry {
            word,
            correct,
            incorrect,
        })
    }
}

fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

fn dedup_into(words: &[String], seen: &mut HashSet<String>) -> Vec<String> {
    words
        .iter()
        .map(|w| normalize(w))
        .filter(|w| !w.is_empty())
        .filter(|w| seen.insert(w.clone()))
        .collect()
}
