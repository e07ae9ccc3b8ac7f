use std::collections::{HashSet, VecDeque};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::error::{Result, WordrushError};

/// Queues are topped up once they hold fewer than this many words
pub const LOW_WATER_MARK: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum WordKind {
    Correct,
    Distractor,
}

/// Shuffled queues of correct answers and distractors for one prompt.
///
/// Each queue is refilled from a reshuffled copy of its source list as soon
/// as it drops below the low-water mark, so a draw never runs dry while the
/// source list is non-empty. Words repeat across refills.
#[derive(Debug)]
pub struct WordPool {
    correct_source: Vec<String>,
    distractor_source: Vec<String>,
    remaining_correct: VecDeque<String>,
    remaining_distractors: VecDeque<String>,
    rng: StdRng,
}

impl WordPool {
    pub fn new(correct: Vec<String>, distractors: Vec<String>) -> Self {
        Self::with_rng(correct, distractors, StdRng::from_entropy())
    }

    pub fn with_seed(correct: Vec<String>, distractors: Vec<String>, seed: u64) -> Self {
        Self::with_rng(correct, distractors, StdRng::seed_from_u64(seed))
    }

    fn with_rng(correct: Vec<String>, distractors: Vec<String>, rng: StdRng) -> Self {
        let mut pool = Self {
            correct_source: correct,
            distractor_source: distractors,
            remaining_correct: VecDeque::new(),
            remaining_distractors: VecDeque::new(),
            rng,
        };
        pool.replenish(WordKind::Correct);
        pool.replenish(WordKind::Distractor);
        pool
    }

    pub fn remaining(&self, kind: WordKind) -> usize {
        self.queue(kind).len()
    }

    pub fn source(&self, kind: WordKind) -> &[String] {
        match kind {
            WordKind::Correct => &self.correct_source,
            WordKind::Distractor => &self.distractor_source,
        }
    }

    pub fn is_correct(&self, word: &str) -> bool {
        self.correct_source.iter().any(|w| w == word)
    }

    /// Pop the next word of `kind`, refilling the queue first if it is empty
    pub fn draw(&mut self, kind: WordKind) -> Result<String> {
        if self.queue(kind).is_empty() {
            self.replenish(kind);
        }

        let word = self
            .queue_mut(kind)
            .pop_front()
            .ok_or(WordrushError::EmptySource(kind))?;

        self.top_up(kind);
        Ok(word)
    }

    /// Draw up to `count` distinct words of `kind` that are not in `exclude`.
    ///
    /// Returns fewer than `count` words only when the source list does not
    /// hold that many distinct eligible words.
    pub fn draw_distinct(
        &mut self,
        kind: WordKind,
        count: usize,
        exclude: &HashSet<String>,
    ) -> Result<Vec<String>> {
        let eligible: HashSet<&String> = self
            .source(kind)
            .iter()
            .filter(|w| !exclude.contains(*w))
            .collect();
        let target = count.min(eligible.len());
        if target == 0 && count > 0 && self.source(kind).is_empty() {
            return Err(WordrushError::EmptySource(kind));
        }

        let mut picked: Vec<String> = Vec::with_capacity(target);
        // each refill holds every eligible word, so two full passes are enough
        let max_draws = (self.source(kind).len() * 2).max(1) + self.remaining(kind);
        let mut draws = 0;
        while picked.len() < target && draws < max_draws {
            let word = self.draw(kind)?;
            draws += 1;
            if !exclude.contains(&word) && !picked.contains(&word) {
                picked.push(word);
            }
        }

        Ok(picked)
    }

    /// Append a freshly shuffled copy of the source list for `kind`
    pub fn replenish(&mut self, kind: WordKind) {
        let mut fresh = self.source(kind).to_vec();
        fresh.shuffle(&mut self.rng);
        let added = fresh.len();
        self.queue_mut(kind).extend(fresh);
        debug!(%kind, added, remaining = self.remaining(kind), "replenished word pool");
    }

    fn top_up(&mut self, kind: WordKind) {
        if self.source(kind).is_empty() {
            return;
        }
        while self.queue(kind).len() < LOW_WATER_MARK {
            self.replenish(kind);
        }
    }

    fn queue(&self, kind: WordKind) -> &VecDeque<String> {
        match kind {
            WordKind::Correct => &self.remaining_correct,
            WordKind::Distractor => &self.remaining_distractors,
        }
    }

    fn queue_mut(&mut self, kind: WordKind) -> &mut VecDeque<String> {
        match kind {
            WordKind::Correct => &mut self.remaining_correct,
            WordKind::Distractor => &mut self.remaining_distractors,
        }
    }
}
