use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{Result, WordrushError};
use crate::round::{Outcome, Round};
use crate::variant::{GameKind, MissPenalty, Rules, CORRECT_POINTS};
use crate::vocabulary::VocabEntry;
use crate::word_pool::WordPool;

/// Seconds a single freeze holds the round timer
pub const FREEZE_SECS: u32 = 5;

/// Input to [`Session::update`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// One second of game time has passed
    Tick,
    Submit(String),
    Pause,
    Resume,
    /// Skip the rest of the feedback pause
    Advance,
    /// Spend one freeze on the current round
    Freeze,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Light {
    Green,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EndReason {
    OutOfLives,
    RoundLimit,
    TimeLimit,
    OutOfWords,
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    Feedback { ticks_left: u32 },
    Over(EndReason),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub game: GameKind,
    pub prompt: String,
    pub score: u32,
    pub rounds_completed: u32,
    pub correct_answers: u32,
    pub lives_remaining: u8,
    pub end_reason: EndReason,
    pub finished_at: DateTime<Local>,
}

impl SessionSummary {
    pub fn accuracy(&self) -> f64 {
        crate::util::accuracy(self.correct_answers, self.rounds_completed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    RoundStarted {
        round: u32,
        prompt: String,
        options: Vec<String>,
    },
    TimerTicked {
        remaining_secs: u32,
    },
    RoundResolved {
        round: u32,
        outcome: Outcome,
        correct_answer: String,
        score_delta: i32,
        score: u32,
        lives: u8,
    },
    LightChanged(Light),
    Frozen {
        secs: u32,
    },
    Paused,
    Resumed,
    GameOver(SessionSummary),
}

/// A play-through from the first round to game over.
///
/// Every state change goes through [`Session::update`], which the host
/// calls once per input or elapsed second.
#[derive(Debug)]
pub struct Session {
    rules: Rules,
    entry: VocabEntry,
    pool: WordPool,
    rng: StdRng,
    round: Round,
    round_number: u32,
    score: u32,
    lives: u8,
    rounds_completed: u32,
    correct_answers: u32,
    freezes_left: u32,
    phase: Phase,
    paused: bool,
    session_secs_remaining: Option<u32>,
    light: Option<Light>,
    light_secs_left: u32,
    summary: Option<SessionSummary>,
}

impl Session {
    pub fn new(rules: Rules, entry: &VocabEntry) -> Result<Self> {
        let seed = rand::thread_rng().next_u64();
        Self::with_seed(rules, entry, seed)
    }

    /// Same rules, entry and seed always deal the same rounds
    pub fn with_seed(rules: Rules, entry: &VocabEntry, seed: u64) -> Result<Self> {
        let entry = entry
            .sanitized()
            .ok_or_else(|| WordrushError::EmptyVocabulary(entry.word.clone()))?;
        if entry.incorrect.len() < rules.distractors_per_round {
            return Err(WordrushError::NotEnoughDistractors {
                word: entry.word,
                needed: rules.distractors_per_round,
                found: entry.incorrect.len(),
            });
        }
        let mut pool = WordPool::with_seed(entry.correct.clone(), entry.incorrect.clone(), seed);
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
        let round = Round::start(
            &entry.word,
            &mut pool,
            rules.distractors_per_round,
            rules.round_secs,
            &mut rng,
        )?;

        let (light, light_secs_left) = match rules.light {
            Some(schedule) => (Some(Light::Green), schedule.green_secs),
            None => (None, 0),
        };

        debug!(game = %rules.kind, prompt = %entry.word, "session started");

        Ok(Self {
            lives: rules.starting_lives,
            freezes_left: rules.freezes,
            session_secs_remaining: rules.session_secs,
            rules,
            entry,
            pool,
            rng,
            round,
            round_number: 1,
            score: 0,
            rounds_completed: 0,
            correct_answers: 0,
            phase: Phase::Playing,
            paused: false,
            light,
            light_secs_left,
            summary: None,
        })
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn prompt(&self) -> &str {
        &self.entry.word
    }

    pub fn entry(&self) -> &VocabEntry {
        &self.entry
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    pub fn freezes_left(&self) -> u32 {
        self.freezes_left
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn light(&self) -> Option<Light> {
        self.light
    }

    pub fn session_secs_remaining(&self) -> Option<u32> {
        self.session_secs_remaining
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Over(_))
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn update(&mut self, action: Action) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.is_over() {
            return events;
        }

        match action {
            Action::Pause => {
                if !self.paused {
                    self.paused = true;
                    events.push(SessionEvent::Paused);
                }
            }
            Action::Resume => {
                if self.paused {
                    self.paused = false;
                    events.push(SessionEvent::Resumed);
                }
            }
            _ if self.paused => {}
            Action::Tick => self.on_tick(&mut events),
            Action::Submit(word) => self.on_submit(&word, &mut events),
            Action::Advance => {
                if matches!(self.phase, Phase::Feedback { .. }) {
                    self.next_round(&mut events);
                }
            }
            Action::Freeze => {
                if self.phase == Phase::Playing && self.freezes_left > 0 {
                    self.freezes_left -= 1;
                    self.round.freeze(FREEZE_SECS);
                    events.push(SessionEvent::Frozen { secs: FREEZE_SECS });
                }
            }
        }

        events
    }

    /// Tear the session down early, e.g. when the player leaves the screen
    pub fn abandon(&mut self) -> Option<SessionSummary> {
        if self.is_over() {
            return None;
        }
        let mut events = Vec::new();
        self.finish(EndReason::Abandoned, &mut events);
        self.summary.clone()
    }

    fn on_tick(&mut self, events: &mut Vec<SessionEvent>) {
        if let Some(secs) = self.session_secs_remaining.as_mut() {
            *secs = secs.saturating_sub(1);
            if *secs == 0 {
                self.finish(EndReason::TimeLimit, events);
                return;
            }
        }

        self.advance_light(events);

        match self.phase {
            Phase::Feedback { ticks_left } => {
                if ticks_left <= 1 {
                    self.next_round(events);
                } else {
                    self.phase = Phase::Feedback {
                        ticks_left: ticks_left - 1,
                    };
                }
            }
            Phase::Playing => {
                // a red light holds the round timer for as long as it lasts
                if self.light == Some(Light::Red) {
                    self.round.freeze(1);
                }
                let timed_out = self.round.tick();
                events.push(SessionEvent::TimerTicked {
                    remaining_secs: self.round.time_remaining_secs,
                });
                if let Some(outcome) = timed_out {
                    self.resolve(outcome, events);
                }
            }
            Phase::Over(_) => {}
        }
    }

    fn advance_light(&mut self, events: &mut Vec<SessionEvent>) {
        let (Some(light), Some(schedule)) = (self.light, self.rules.light) else {
            return;
        };

        self.light_secs_left = self.light_secs_left.saturating_sub(1);
        if self.light_secs_left > 0 {
            return;
        }

        let (next, secs) = match light {
            Light::Green => (Light::Red, schedule.red_secs),
            Light::Red => (Light::Green, schedule.green_secs),
        };
        self.light = Some(next);
        self.light_secs_left = secs.max(1);
        events.push(SessionEvent::LightChanged(next));
    }

    fn on_submit(&mut self, word: &str, events: &mut Vec<SessionEvent>) {
        if self.phase != Phase::Playing {
            return;
        }

        let outcome = if self.light == Some(Light::Red) {
            // moving on red is a miss, whatever was picked
            if !self.round.options.iter().any(|o| o == word) {
                return;
            }
            self.round.chosen = Some(word.to_string());
            self.round.resolve_as(Outcome::Incorrect)
        } else {
            self.round.submit(word)
        };

        if let Some(outcome) = outcome {
            self.resolve(outcome, events);
        }
    }

    fn resolve(&mut self, outcome: Outcome, events: &mut Vec<SessionEvent>) {
        self.rounds_completed += 1;

        let score_delta = match (outcome, self.rules.miss_penalty) {
            (Outcome::Correct, _) => {
                self.correct_answers += 1;
                self.score += CORRECT_POINTS;
                CORRECT_POINTS as i32
            }
            (Outcome::Incorrect, MissPenalty::Points(points)) => {
                let taken = points.min(self.score);
                self.score -= taken;
                -(taken as i32)
            }
            (Outcome::Incorrect, MissPenalty::Life) | (Outcome::TimedOut, _) => {
                self.lives = self.lives.saturating_sub(1);
                0
            }
        };

        debug!(
            round = self.round_number,
            ?outcome,
            score = self.score,
            lives = self.lives,
            "round resolved"
        );

        events.push(SessionEvent::RoundResolved {
            round: self.round_number,
            outcome,
            correct_answer: self.round.correct_answer().unwrap_or_default().to_string(),
            score_delta,
            score: self.score,
            lives: self.lives,
        });

        if self.lives == 0 {
            self.finish(EndReason::OutOfLives, events);
        } else if self
            .rules
            .round_limit
            .is_some_and(|limit| self.rounds_completed >= limit)
        {
            self.finish(EndReason::RoundLimit, events);
        } else if self.rules.feedback_secs == 0 {
            self.next_round(events);
        } else {
            self.phase = Phase::Feedback {
                ticks_left: self.rules.feedback_secs,
            };
        }
    }

    fn next_round(&mut self, events: &mut Vec<SessionEvent>) {
        let started = Round::start(
            &self.entry.word,
            &mut self.pool,
            self.rules.distractors_per_round,
            self.rules.round_secs,
            &mut self.rng,
        );

        match started {
            Ok(round) => {
                self.round = round;
                self.round_number += 1;
                self.phase = Phase::Playing;
                events.push(SessionEvent::RoundStarted {
                    round: self.round_number,
                    prompt: self.round.prompt.clone(),
                    options: self.round.options.clone(),
                });
            }
            Err(e) => {
                error!(error = %e, prompt = %self.entry.word, "could not deal the next round");
                self.finish(EndReason::OutOfWords, events);
            }
        }
    }

    fn finish(&mut self, reason: EndReason, events: &mut Vec<SessionEvent>) {
        self.phase = Phase::Over(reason);
        let summary = SessionSummary {
            game: self.rules.kind,
            prompt: self.entry.word.clone(),
            score: self.score,
            rounds_completed: self.rounds_completed,
            correct_answers: self.correct_answers,
            lives_remaining: self.lives,
            end_reason: reason,
            finished_at: Local::now(),
        };

        info!(
            game = %summary.game,
            prompt = %summary.prompt,
            score = summary.score,
            rounds = summary.rounds_completed,
            reason = %reason,
            "game over"
        );

        self.summary = Some(summary.clone());
        events.push(SessionEvent::GameOver(summary));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{LightSchedule, MAX_LIVES, MISS_POINTS};
    use assert_matches::assert_matches;

    fn happy() -> VocabEntry {
        VocabEntry::new(
            "happy",
            &["joyful", "cheerful", "glad"],
            &["sad", "angry", "tired", "bored", "gloomy"],
        )
    }

    fn flying_words() -> Session {
        Session::with_seed(Rules::for_game(GameKind::FlyingWords), &happy(), 42).unwrap()
    }

    fn wrong_option(session: &Session) -> String {
        session
            .round()
            .distractor_options
            .iter()
            .next()
            .unwrap()
            .clone()
    }

    fn right_option(session: &Session) -> String {
        session.round().correct_answer().unwrap().to_string()
    }

    fn run_out_the_clock(session: &mut Session) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for _ in 0..session.rules().round_secs {
            events.extend(session.update(Action::Tick));
        }
        events
    }

    #[test]
    fn test_new_session() {
        let session = flying_words();
        assert_eq!(session.score(), 0);
        assert_eq!(session.lives(), MAX_LIVES);
        assert_eq!(session.round_number(), 1);
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.round().options.len(), 4);
        assert!(!session.is_over());
    }

    #[test]
    fn test_rejects_unusable_entry() {
        let entry = VocabEntry::new("happy", &["glad"], &["glad"]);
        let err = Session::with_seed(Rules::for_game(GameKind::FlyingWords), &entry, 1).unwrap_err();
        assert_matches!(err, WordrushError::EmptyVocabulary(_));
    }

    #[test]
    fn test_entry_with_too_few_distractors_is_rejected() {
        let entry = VocabEntry::new("happy", &["joyful"], &["sad"]);
        let err = Session::with_seed(Rules::for_game(GameKind::FlyingWords), &entry, 1).unwrap_err();
        assert_matches!(
            err,
            WordrushError::NotEnoughDistractors { needed: 3, found: 1, .. }
        );

        // the same entry is enough for a two-option game
        let session = Session::with_seed(Rules::for_game(GameKind::SwipeMatch), &entry, 1).unwrap();
        assert_eq!(session.round().options.len(), 2);
    }

    #[test]
    fn test_correct_answer_scores() {
        let entry = VocabEntry::new("happy", &["joyful"], &["sad", "angry", "tired"]);
        let mut session =
            Session::with_seed(Rules::for_game(GameKind::FlyingWords), &entry, 1).unwrap();

        let events = session.update(Action::Submit("joyful".to_string()));

        assert_eq!(session.score(), 10);
        assert_eq!(session.lives(), 3);
        assert_eq!(session.round().outcome(), Some(Outcome::Correct));
        assert_matches!(
            events.as_slice(),
            [SessionEvent::RoundResolved {
                outcome: Outcome::Correct,
                score_delta: 10,
                ..
            }]
        );
    }

    #[test]
    fn test_timeout_costs_one_life() {
        let entry = VocabEntry::new("happy", &["joyful"], &["sad", "angry", "tired"]);
        let mut session =
            Session::with_seed(Rules::for_game(GameKind::FlyingWords), &entry, 1).unwrap();

        let events = run_out_the_clock(&mut session);

        assert_eq!(session.lives(), 2);
        assert_eq!(session.score(), 0);
        assert_eq!(session.round().outcome(), Some(Outcome::TimedOut));
        assert!(!session.is_over());
        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::RoundResolved {
                outcome: Outcome::TimedOut,
                lives: 2,
                ..
            }
        )));
    }

    #[test]
    fn test_timeout_moves_to_next_round_after_feedback() {
        let mut session = flying_words();
        run_out_the_clock(&mut session);
        assert_matches!(session.phase(), Phase::Feedback { ticks_left: 1 });

        let events = session.update(Action::Tick);
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.round_number(), 2);
        assert_matches!(events.as_slice(), [SessionEvent::RoundStarted { round: 2, .. }]);
    }

    #[test]
    fn test_advance_skips_feedback() {
        let mut session = flying_words();
        let right = right_option(&session);
        session.update(Action::Submit(right));
        session.update(Action::Advance);
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.round_number(), 2);
    }

    #[test]
    fn test_wrong_answer_costs_a_life_in_flying_words() {
        let mut session = flying_words();
        let wrong = wrong_option(&session);
        session.update(Action::Submit(wrong));
        assert_eq!(session.lives(), 2);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_game_over_when_lives_run_out() {
        let mut session = flying_words();
        let mut last = Vec::new();
        for _ in 0..3 {
            let wrong = wrong_option(&session);
            last = session.update(Action::Submit(wrong));
            session.update(Action::Advance);
        }

        assert!(session.is_over());
        assert_eq!(session.lives(), 0);
        assert_eq!(session.phase(), Phase::Over(EndReason::OutOfLives));
        assert_matches!(last.last(), Some(SessionEvent::GameOver(summary)) if summary.end_reason == EndReason::OutOfLives);

        // nothing moves after game over
        assert!(session.update(Action::Tick).is_empty());
        assert_eq!(session.lives(), 0);
    }

    #[test]
    fn test_submissions_during_feedback_are_ignored() {
        let mut session = flying_words();
        let right = right_option(&session);
        session.update(Action::Submit(right.clone()));
        assert!(session.update(Action::Submit(right)).is_empty());
        assert_eq!(session.score(), 10);
    }

    #[test]
    fn test_lives_stay_in_bounds() {
        let mut session = flying_words();
        for i in 0..40 {
            if i % 3 == 0 {
                let right = right_option(&session);
                session.update(Action::Submit(right));
            } else {
                session.update(Action::Tick);
            }
            assert!(session.lives() <= MAX_LIVES);
        }
    }

    #[test]
    fn test_exactly_one_correct_option_every_round() {
        let mut session = flying_words();
        let correct = session.entry().correct.clone();
        for _ in 0..30 {
            let shown = session
                .round()
                .options
                .iter()
                .filter(|o| correct.contains(o))
                .count();
            assert_eq!(shown, 1);
            let right = right_option(&session);
            session.update(Action::Submit(right));
            session.update(Action::Advance);
        }
        assert_eq!(session.score(), 300);
    }

    #[test]
    fn test_same_seed_same_score() {
        let play = || {
            let mut session = flying_words();
            for _ in 0..5 {
                let pick = session.round().options[0].clone();
                session.update(Action::Submit(pick));
                session.update(Action::Advance);
            }
            (session.score(), session.lives())
        };
        assert_eq!(play(), play());
    }

    #[test]
    fn test_pause_ignores_input_and_time() {
        let mut session = flying_words();
        assert_eq!(session.update(Action::Pause), vec![SessionEvent::Paused]);
        assert!(session.update(Action::Pause).is_empty());

        for _ in 0..20 {
            session.update(Action::Tick);
        }
        let right = right_option(&session);
        session.update(Action::Submit(right));
        assert_eq!(session.round().time_remaining_secs, 10);
        assert_eq!(session.score(), 0);

        assert_eq!(session.update(Action::Resume), vec![SessionEvent::Resumed]);
        session.update(Action::Tick);
        assert_eq!(session.round().time_remaining_secs, 9);
    }

    #[test]
    fn test_freeze_holds_round_timer() {
        let mut session = flying_words();
        let events = session.update(Action::Freeze);
        assert_eq!(events, vec![SessionEvent::Frozen { secs: FREEZE_SECS }]);
        for _ in 0..FREEZE_SECS {
            session.update(Action::Tick);
        }
        assert_eq!(session.round().time_remaining_secs, 10);
        session.update(Action::Tick);
        assert_eq!(session.round().time_remaining_secs, 9);
        assert_eq!(session.freezes_left(), 0);
        assert!(session.update(Action::Freeze).is_empty());
    }

    #[test]
    fn test_green_light_wrong_answer_costs_points() {
        let mut session =
            Session::with_seed(Rules::for_game(GameKind::GreenLight), &happy(), 3).unwrap();
        let right = right_option(&session);
        session.update(Action::Submit(right));
        session.update(Action::Advance);
        assert_eq!(session.score(), 10);

        let wrong = wrong_option(&session);
        let events = session.update(Action::Submit(wrong));
        assert_eq!(session.score(), 10 - MISS_POINTS);
        assert_eq!(session.lives(), MAX_LIVES);
        assert_matches!(
            events.as_slice(),
            [SessionEvent::RoundResolved { score_delta: -5, .. }]
        );
    }

    #[test]
    fn test_score_never_negative() {
        let mut session =
            Session::with_seed(Rules::for_game(GameKind::GreenLight), &happy(), 3).unwrap();
        let wrong = wrong_option(&session);
        session.update(Action::Submit(wrong));
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_red_light_freezes_timer_and_punishes_answers() {
        let mut rules = Rules::for_game(GameKind::GreenLight);
        rules.light = Some(LightSchedule {
            green_secs: 2,
            red_secs: 2,
        });
        let mut session = Session::with_seed(rules, &happy(), 9).unwrap();
        assert_eq!(session.light(), Some(Light::Green));

        session.update(Action::Tick);
        let events = session.update(Action::Tick);
        assert!(events.contains(&SessionEvent::LightChanged(Light::Red)));
        assert_eq!(session.light(), Some(Light::Red));
        assert_eq!(session.round().time_remaining_secs, 9);

        // the red light holds the clock
        session.update(Action::Tick);
        assert_eq!(session.round().time_remaining_secs, 9);

        let right = right_option(&session);
        session.update(Action::Submit(right));
        assert_eq!(session.round().outcome(), Some(Outcome::Incorrect));
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_green_light_session_time_limit() {
        let mut session =
            Session::with_seed(Rules::for_game(GameKind::GreenLight), &happy(), 5).unwrap();
        let mut ticks = 0;
        while !session.is_over() {
            if session.phase() == Phase::Playing && session.light() == Some(Light::Green) {
                let right = right_option(&session);
                session.update(Action::Submit(right));
            }
            session.update(Action::Tick);
            ticks += 1;
            assert!(ticks <= 60, "session outlived its time budget");
        }

        assert_eq!(ticks, 60);
        assert_eq!(session.phase(), Phase::Over(EndReason::TimeLimit));
        assert_eq!(session.lives(), MAX_LIVES);
        assert!(session.score() > 0);
        assert_eq!(session.summary().map(|s| s.end_reason), Some(EndReason::TimeLimit));
    }

    #[test]
    fn test_swipe_match_round_limit() {
        let entry = VocabEntry::new("hot", &["cold", "icy"], &["warm", "boiling"]);
        let mut session =
            Session::with_seed(Rules::for_game(GameKind::SwipeMatch), &entry, 8).unwrap();
        for _ in 0..10 {
            let right = right_option(&session);
            session.update(Action::Submit(right));
            session.update(Action::Advance);
        }
        assert_eq!(session.phase(), Phase::Over(EndReason::RoundLimit));
        let summary = session.summary().unwrap();
        assert_eq!(summary.score, 100);
        assert_eq!(summary.rounds_completed, 10);
        assert_eq!(summary.accuracy(), 100.0);
    }

    #[test]
    fn test_abandon() {
        let mut session = flying_words();
        let summary = session.abandon().unwrap();
        assert_eq!(summary.end_reason, EndReason::Abandoned);
        assert!(session.is_over());
        assert!(session.abandon().is_none());
    }

    #[test]
    fn test_zero_feedback_starts_next_round_immediately() {
        let mut rules = Rules::for_game(GameKind::FlyingWords);
        rules.feedback_secs = 0;
        let mut session = Session::with_seed(rules, &happy(), 4).unwrap();
        let right = right_option(&session);
        let events = session.update(Action::Submit(right));
        assert_eq!(events.len(), 2);
        assert_eq!(session.round_number(), 2);
        assert_eq!(session.phase(), Phase::Playing);
    }
}
