use super::{Association, VocabEntry};

// Last-resort word lists used when neither a user file nor the embedded
// vocabulary can be read.
const SYNONYMS: &[(&str, &[&str], &[&str])] = &[
    (
        "happy",
        &["joyful", "cheerful", "glad"],
        &["sad", "angry", "gloomy", "tired"],
    ),
    (
        "big",
        &["large", "huge", "giant"],
        &["small", "tiny", "little", "short"],
    ),
    (
        "fast",
        &["quick", "rapid", "swift"],
        &["slow", "lazy", "still", "late"],
    ),
];

const ANTONYMS: &[(&str, &[&str], &[&str])] = &[
    ("hot", &["cold", "icy"], &["warm", "boiling", "spicy"]),
    ("up", &["down", "below"], &["above", "high", "over"]),
    ("day", &["night", "evening"], &["noon", "morning", "daylight"]),
];

pub fn entries(association: Association) -> Vec<VocabEntry> {
    let table = match association {
        Association::Synonym => SYNONYMS,
        Association::Antonym => ANTONYMS,
    };
    table
        .iter()
        .map(|(word, correct, incorrect)| VocabEntry::new(*word, correct, incorrect))
        .collect()
}
