pub mod builtin;
pub mod catalog;
pub mod entry;

// Re-export the main types for convenience
pub use catalog::Vocabulary;
pub use entry::VocabEntry;

use serde::{Deserialize, Serialize};

/// How the correct options of an entry relate to its prompt word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Association {
    Synonym,
    Antonym,
}

impl Association {
    /// Name of the embedded vocabulary file holding this association
    pub fn file_stem(&self) -> &'static str {
        match self {
            Association::Synonym => "synonyms",
            Association::Antonym => "antonyms",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_vocabularies_load() {
        for association in [Association::Synonym, Association::Antonym] {
            let vocab = Vocabulary::embedded(association).unwrap();
            assert_eq!(vocab.association, association);
            assert!(!vocab.entries.is_empty());
            for entry in &vocab.entries {
                assert!(!entry.correct.is_empty());
                assert!(!entry.incorrect.is_empty());
            }
        }
    }

    #[test]
    fn test_association_display() {
        assert_eq!(Association::Synonym.to_string(), "synonym");
        assert_eq!(Association::Antonym.file_stem(), "antonyms");
    }
}
