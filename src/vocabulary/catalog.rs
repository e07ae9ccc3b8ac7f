use std::fs;
use std::path::Path;

use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{builtin, Association, VocabEntry};
use crate::error::{Result, WordrushError};

static VOCAB_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/vocab");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub name: String,
    pub association: Association,
    pub entries: Vec<VocabEntry>,
}

impl Vocabulary {
    /// Load a vocabulary, never failing.
    ///
    /// A user file is tried first when given, then the embedded list for the
    /// association, then the static built-in list.
    pub fn load(association: Association, path: Option<&Path>) -> Self {
        if let Some(path) = path {
            match Self::from_file(path) {
                Ok(vocab) if vocab.association == association => return vocab,
                Ok(vocab) => warn!(
                    path = %path.display(),
                    found = %vocab.association,
                    wanted = %association,
                    "vocabulary file has the wrong association, falling back"
                ),
                Err(e) => warn!(path = %path.display(), error = %e, "could not load vocabulary, falling back"),
            }
        }

        match Self::embedded(association) {
            Ok(vocab) => vocab,
            Err(e) => {
                warn!(error = %e, "embedded vocabulary unusable, using built-in word list");
                Self::builtin(association)
            }
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Vocabulary = serde_json::from_str(json)?;
        raw.sanitized()
    }

    pub fn embedded(association: Association) -> Result<Self> {
        let file_name = format!("{}.json", association.file_stem());
        let file = VOCAB_DIR
            .get_file(&file_name)
            .ok_or_else(|| WordrushError::EmptyVocabulary(file_name.clone()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| WordrushError::EmptyVocabulary(file_name.clone()))?;
        Self::from_json(contents)
    }

    pub fn builtin(association: Association) -> Self {
        Self {
            name: format!("builtin-{}", association.file_stem()),
            association,
            entries: builtin::entries(association),
        }
    }

    /// Drop unusable entries, erroring if nothing is left
    fn sanitized(self) -> Result<Self> {
        let before = self.entries.len();
        let entries: Vec<VocabEntry> = self.entries.iter().filter_map(|e| e.sanitized()).collect();
        if entries.is_empty() {
            return Err(WordrushError::EmptyVocabulary(self.name));
        }
        if entries.len() < before {
            debug!(name = %self.name, dropped = before - entries.len(), "dropped unusable vocabulary entries");
        }
        Ok(Self { entries, ..self })
    }

    /// Find the entry for a prompt word, ignoring case
    pub fn pick(&self, word: &str) -> Option<&VocabEntry> {
        let word = word.trim().to_lowercase();
        self.entries.iter().find(|e| e.word == word)
    }

    /// Any entry with at least `min_distractors` incorrect words
    pub fn random_entry<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        min_distractors: usize,
    ) -> Option<&VocabEntry> {
        let playable: Vec<&VocabEntry> = self
            .entries
            .iter()
            .filter(|e| e.incorrect.len() >= min_distractors)
            .collect();
        playable.choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TEST_JSON: &str = r#"
    {
        "name": "test",
        "association": "synonym",
        "entries": [
            { "word": "happy", "correct": ["joyful"], "incorrect": ["sad", "angry"] },
            { "word": "broken", "correct": ["glad"], "incorrect": ["glad"] }
        ]
    }
    "#;

    #[test]
    fn test_from_json_drops_unusable_entries() {
        let vocab = Vocabulary::from_json(TEST_JSON).unwrap();
        assert_eq!(vocab.name, "test");
        assert_eq!(vocab.entries.len(), 1);
        assert_eq!(vocab.entries[0].word, "happy");
    }

    #[test]
    fn test_from_json_rejects_empty_vocabulary() {
        let json = r#"{ "name": "empty", "association": "antonym", "entries": [] }"#;
        let err = Vocabulary::from_json(json).unwrap_err();
        assert!(matches!(err, WordrushError::EmptyVocabulary(name) if name == "empty"));
    }

    #[test]
    fn test_load_prefers_user_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(TEST_JSON.as_bytes()).unwrap();

        let vocab = Vocabulary::load(Association::Synonym, Some(file.path()));
        assert_eq!(vocab.name, "test");
    }

    #[test]
    fn test_load_missing_file_falls_back_to_embedded() {
        let vocab = Vocabulary::load(
            Association::Synonym,
            Some(Path::new("/definitely/not/here.json")),
        );
        assert_eq!(vocab.name, "synonyms");
        assert!(vocab.pick("happy").is_some());
    }

    #[test]
    fn test_load_malformed_file_falls_back() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let vocab = Vocabulary::load(Association::Antonym, Some(file.path()));
        assert_eq!(vocab.name, "antonyms");
    }

    #[test]
    fn test_load_wrong_association_falls_back() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(TEST_JSON.as_bytes()).unwrap();

        let vocab = Vocabulary::load(Association::Antonym, Some(file.path()));
        assert_eq!(vocab.association, Association::Antonym);
        assert_eq!(vocab.name, "antonyms");
    }

    #[test]
    fn test_builtin_vocabulary() {
        let vocab = Vocabulary::builtin(Association::Antonym);
        assert_eq!(vocab.name, "builtin-antonyms");
        assert!(vocab.pick("hot").is_some());
    }

    #[test]
    fn test_pick_ignores_case() {
        let vocab = Vocabulary::embedded(Association::Synonym).unwrap();
        assert_eq!(vocab.pick(" HAPPY ").map(|e| e.word.as_str()), Some("happy"));
        assert!(vocab.pick("nonexistent").is_none());
    }

    #[test]
    fn test_random_entry_comes_from_vocabulary() {
        let vocab = Vocabulary::embedded(Association::Antonym).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            let entry = vocab.random_entry(&mut rng, 1).unwrap();
            assert!(vocab.pick(&entry.word).is_some());
        }
    }

    #[test]
    fn test_random_entry_skips_thin_entries() {
        let vocab = Vocabulary::from_json(TEST_JSON).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(
            vocab.random_entry(&mut rng, 2).map(|e| e.word.as_str()),
            Some("happy")
        );
        assert!(vocab.random_entry(&mut rng, 3).is_none());
    }
}
