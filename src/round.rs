use std::collections::{BTreeSet, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::Result;
use crate::word_pool::{WordKind, WordPool};

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    TimedOut,
}

impl Outcome {
    pub fn is_miss(&self) -> bool {
        !matches!(self, Outcome::Correct)
    }
}

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum RoundState {
    WaitingForInput,
    Resolved(Outcome),
}

/// One timed prompt-and-answer cycle
#[derive(Debug, Clone)]
pub struct Round {
    pub prompt: String,
    /// Options in display order
    pub options: Vec<String>,
    pub correct_options: BTreeSet<String>,
    pub distractor_options: BTreeSet<String>,
    pub time_budget_secs: u32,
    pub time_remaining_secs: u32,
    pub freeze_ticks: u32,
    pub state: RoundState,
    pub chosen: Option<String>,
}

impl Round {
    /// Draw one correct option and `distractors` incorrect ones from the pool
    pub fn start<R: Rng + ?Sized>(
        prompt: &str,
        pool: &mut WordPool,
        distractors: usize,
        time_budget_secs: u32,
        rng: &mut R,
    ) -> Result<Self> {
        let correct = pool.draw(WordKind::Correct)?;

        // never let a word that answers the prompt pose as a distractor
        let mut exclude: HashSet<String> = pool.source(WordKind::Correct).iter().cloned().collect();
        exclude.insert(prompt.to_string());
        let wrong = pool.draw_distinct(WordKind::Distractor, distractors, &exclude)?;

        let mut options: Vec<String> = Vec::with_capacity(wrong.len() + 1);
        options.push(correct.clone());
        options.extend(wrong.iter().cloned());
        options.shuffle(rng);

        debug!(prompt, ?options, "round started");

        Ok(Self {
            prompt: prompt.to_string(),
            options,
            correct_options: BTreeSet::from([correct]),
            distractor_options: wrong.into_iter().collect(),
            time_budget_secs,
            time_remaining_secs: time_budget_secs,
            freeze_ticks: 0,
            state: RoundState::WaitingForInput,
            chosen: None,
        })
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, RoundState::Resolved(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            RoundState::Resolved(outcome) => Some(outcome),
            RoundState::WaitingForInput => None,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_ticks > 0
    }

    pub fn correct_answer(&self) -> Option<&str> {
        self.correct_options.iter().next().map(|s| s.as_str())
    }

    /// Answer the round. Ignored once resolved, or when `option` was not offered.
    pub fn submit(&mut self, option: &str) -> Option<Outcome> {
        if self.is_resolved() {
            return None;
        }
        if !self.options.iter().any(|o| o == option) {
            debug!(option, "ignoring answer that was not offered");
            return None;
        }

        let outcome = if self.correct_options.contains(option) {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };
        self.chosen = Some(option.to_string());
        self.state = RoundState::Resolved(outcome);
        Some(outcome)
    }

    /// Force a resolution regardless of the option given, used for rule-driven misses
    pub fn resolve_as(&mut self, outcome: Outcome) -> Option<Outcome> {
        if self.is_resolved() {
            return None;
        }
        self.state = RoundState::Resolved(outcome);
        Some(outcome)
    }

    /// Advance the countdown by one second.
    ///
    /// A frozen round spends a freeze tick instead. Returns `TimedOut` on the
    /// tick that runs the clock out.
    pub fn tick(&mut self) -> Option<Outcome> {
        if self.is_resolved() {
            return None;
        }
        if self.freeze_ticks > 0 {
            self.freeze_ticks -= 1;
            return None;
        }

        self.time_remaining_secs = self.time_remaining_secs.saturating_sub(1);
        if self.time_remaining_secs == 0 {
            self.state = RoundState::Resolved(Outcome::TimedOut);
            return Some(Outcome::TimedOut);
        }
        None
    }

    pub fn freeze(&mut self, ticks: u32) {
        self.freeze_ticks = self.freeze_ticks.saturating_add(ticks);
    }
}
