// scoring.rs
use crate::country::Country;
use crate::hint::HintState;
use crate::round::RoundState;
use serde::{Deserialize, Serialize};

pub const BASE_REWARD: u32 = 100;
pub const HINTED_REWARD: u32 = 10;
pub const STREAK_BONUS: u32 = 10;
pub const WRONG_PENALTY: u32 = 50;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionStats {
    pub correct_choices: u32,
    pub wrong_choices: u32,
    pub score: u32,
    pub streak: u32,
}

impl SessionStats {
    pub fn total_choices(&self) -> u32 {
        self.correct_choices.saturating_add(self.wrong_choices)
    }

    /// Share of correct choices as a rounded percentage; 0 before any choice.
    pub fn accuracy_percent(&self) -> u32 {
        let total = self.total_choices();
        if total == 0 {
            return 0;
        }
        ((self.correct_choices as f64 / total as f64) * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChoiceOutcome {
    pub outcome: Outcome,
    pub points: i64,
    pub correct_country: Country,
    pub stats: SessionStats,
}

pub fn base_reward(hint: &HintState) -> u32 {
    if hint.reward_penalty {
        HINTED_REWARD
    } else {
        BASE_REWARD
    }
}

/// Scores `chosen` against the round's target and returns the updated stats.
///
/// The comparison is by ISO code. A correct choice earns the base reward plus
/// a bonus for the streak held before this choice; a wrong one costs a fixed
/// penalty (never below zero) and breaks the streak.
pub fn submit_choice(
    chosen: &Country,
    round: &RoundState,
    hint: &HintState,
    stats: SessionStats,
) -> (Outcome, SessionStats) {
    let mut stats = stats;
    if round.is_target(&chosen.iso_code) {
        let bonus = STREAK_BONUS.saturating_mul(stats.streak);
        stats.correct_choices = stats.correct_choices.saturating_add(1);
        stats.score = stats.score.saturating_add(base_reward(hint).saturating_add(bonus));
        stats.streak = stats.streak.saturating_add(1);
        (Outcome::Correct, stats)
    } else {
        stats.wrong_choices = stats.wrong_choices.saturating_add(1);
        stats.score = stats.score.saturating_sub(WRONG_PENALTY);
        stats.streak = 0;
        (Outcome::Incorrect, stats)
    }
}
