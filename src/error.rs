use thiserror::Error;

use crate::word_pool::WordKind;

/// Errors surfaced by the engine and its storage helpers
#[derive(Debug, Error)]
pub enum WordrushError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Vocabulary parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("No {0} words to draw from")]
    EmptySource(WordKind),

    #[error("Vocabulary has no usable entries: {0}")]
    EmptyVocabulary(String),

    #[error("\"{word}\" has {found} distractors, the game needs {needed}")]
    NotEnoughDistractors {
        word: String,
        needed: usize,
        found: usize,
    },

    #[error("Unknown game: {0}")]
    UnknownGame(String),
}

pub type Result<T> = std::result::Result<T, WordrushError>;
