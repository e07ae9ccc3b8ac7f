use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WordrushError;
use crate::vocabulary::Association;

/// Points awarded for a correct answer
pub const CORRECT_POINTS: u32 = 10;
/// Points taken for a miss in variants that charge points instead of lives
pub const MISS_POINTS: u32 = 5;
/// Lives a session starts with, and the most it can ever hold
pub const MAX_LIVES: u8 = 3;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GameKind {
    FlyingWords,
    GreenLight,
    SwipeMatch,
}

impl FromStr for GameKind {
    type Err = WordrushError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flying-words" | "flying" => Ok(GameKind::FlyingWords),
            "green-light" | "green-light-red-light" => Ok(GameKind::GreenLight),
            "swipe-match" | "swipe" => Ok(GameKind::SwipeMatch),
            other => Err(WordrushError::UnknownGame(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissPenalty {
    Life,
    Points(u32),
}

/// Alternating green/red phases, in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightSchedule {
    pub green_secs: u32,
    pub red_secs: u32,
}

/// The fixed rules a variant plays by
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    pub kind: GameKind,
    pub association: Association,
    pub distractors_per_round: usize,
    pub round_secs: u32,
    pub miss_penalty: MissPenalty,
    pub starting_lives: u8,
    pub round_limit: Option<u32>,
    pub session_secs: Option<u32>,
    pub light: Option<LightSchedule>,
    /// Seconds the result of a round stays on screen before the next one
    pub feedback_secs: u32,
    /// Time freezes the player may spend per session
    pub freezes: u32,
}

impl Rules {
    pub fn for_game(kind: GameKind) -> Self {
        match kind {
            GameKind::FlyingWords => Self {
                kind,
                association: Association::Synonym,
                distractors_per_round: 3,
                round_secs: 10,
                miss_penalty: MissPenalty::Life,
                starting_lives: MAX_LIVES,
                round_limit: None,
                session_secs: None,
                light: None,
                feedback_secs: 1,
                freezes: 1,
            },
            GameKind::GreenLight => Self {
                kind,
                association: Association::Synonym,
                distractors_per_round: 1,
                round_secs: 10,
                miss_penalty: MissPenalty::Points(MISS_POINTS),
                starting_lives: MAX_LIVES,
                round_limit: None,
                session_secs: Some(60),
                light: Some(LightSchedule {
                    green_secs: 4,
                    red_secs: 2,
                }),
                feedback_secs: 1,
                freezes: 0,
            },
            GameKind::SwipeMatch => Self {
                kind,
                association: Association::Antonym,
                distractors_per_round: 1,
                round_secs: 30,
                miss_penalty: MissPenalty::Life,
                starting_lives: MAX_LIVES,
                round_limit: Some(10),
                session_secs: None,
                light: None,
                feedback_secs: 1,
                freezes: 1,
            },
        }
    }

    /// Start with fewer lives; clamped to 1..=MAX_LIVES
    pub fn with_lives(mut self, lives: u8) -> Self {
        self.starting_lives = lives.clamp(1, MAX_LIVES);
        self
    }

    pub fn options_per_round(&self) -> usize {
        self.distractors_per_round + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_kind_display_and_parse() {
        for kind in [GameKind::FlyingWords, GameKind::GreenLight, GameKind::SwipeMatch] {
            assert_eq!(kind.to_string().parse::<GameKind>().unwrap(), kind);
        }
        assert_eq!(GameKind::GreenLight.to_string(), "green-light");
    }

    #[test]
    fn test_unknown_game() {
        let err = "tetris".parse::<GameKind>().unwrap_err();
        assert!(matches!(err, WordrushError::UnknownGame(name) if name == "tetris"));
    }

    #[test]
    fn test_round_budgets() {
        assert_eq!(Rules::for_game(GameKind::FlyingWords).round_secs, 10);
        assert_eq!(Rules::for_game(GameKind::GreenLight).round_secs, 10);
        assert_eq!(Rules::for_game(GameKind::SwipeMatch).round_secs, 30);
    }

    #[test]
    fn test_options_per_round() {
        assert_eq!(Rules::for_game(GameKind::FlyingWords).options_per_round(), 4);
        assert_eq!(Rules::for_game(GameKind::SwipeMatch).options_per_round(), 2);
    }

    #[test]
    fn test_with_lives_clamps() {
        let rules = Rules::for_game(GameKind::FlyingWords);
        assert_eq!(rules.clone().with_lives(0).starting_lives, 1);
        assert_eq!(rules.clone().with_lives(2).starting_lives, 2);
        assert_eq!(rules.with_lives(9).starting_lives, MAX_LIVES);
    }

    #[test]
    fn test_swipe_match_uses_antonyms() {
        assert_eq!(
            Rules::for_game(GameKind::SwipeMatch).association,
            Association::Antonym
        );
    }
}
