// quiz.rs
use crate::catalog::Catalog;
use crate::continent::{Continent, ContinentFilter};
use crate::country::Country;
use crate::error::{QuizError, Result};
use crate::hint::{self, HintState};
use crate::history::RecentHistory;
use crate::quiz_config::QuizConfig;
use crate::round::{self, RoundState};
use crate::scoring::{self, ChoiceOutcome, Outcome, SessionStats};
use crate::timer::{SessionTimer, Tick, TimerPhase, TimerState};
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type SessionEndCallback = Box<dyn FnMut(&SessionSummary) + Send>;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub continents: BTreeSet<Continent>,
    pub continents_label: String,
    pub stats: SessionStats,
    pub total_choices: u32,
    pub accuracy_percent: u32,
    pub duration_seconds: u32,
    pub ended_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizState {
    pub round: RoundState,
    pub stats: SessionStats,
    pub timer: TimerState,
    pub hint: HintState,
    pub hint_available: bool,
    pub continents: BTreeSet<Continent>,
    pub active_countries: usize,
    pub last_outcome: Option<ChoiceOutcome>,
    pub available_actions: Vec<Action>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Action {
    Choose { round_id: u64, iso_code: String },
    RequestHint,
    StartSession { default_seconds: u32 },
    StopSession,
    ConfigureFilter,
    ResetCounters,
}

/// The quiz session engine.
///
/// Owns every piece of mutable quiz state; callers drive it through the
/// public operations and read it back through the `current_*` accessors.
pub struct Quiz {
    catalog: Catalog,
    filter: ContinentFilter,
    history: RecentHistory,
    round: RoundState,
    next_round_id: u64,
    stats: SessionStats,
    timer: SessionTimer,
    hint: HintState,
    last_outcome: Option<ChoiceOutcome>,
    session_seconds: u32,
    rng: ChaCha8Rng,
    session_end_callbacks: Vec<SessionEndCallback>,
}

impl Quiz {
    pub fn new(catalog: Catalog, seed: Option<u64>) -> Result<Self> {
        Quiz::with_filter(catalog, ContinentFilter::all(), seed)
    }

    pub fn with_filter(catalog: Catalog, filter: ContinentFilter, seed: Option<u64>) -> Result<Self> {
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut history = RecentHistory::default();
        let round = {
            let active = catalog.active_countries(&filter);
            round::next_round(&active, &mut history, &mut rng, 0)?
        };

        Ok(Self {
            catalog,
            filter,
            history,
            round,
            next_round_id: 1,
            stats: SessionStats::default(),
            timer: SessionTimer::new(),
            hint: HintState::default(),
            last_outcome: None,
            session_seconds: QuizConfig::DEFAULT_SESSION_SECONDS,
            rng,
            session_end_callbacks: Vec::new(),
        })
    }

    pub fn from_config(config: QuizConfig) -> Result<Self> {
        let catalog = config.to_catalog()?;
        let filter = config.continent_filter()?;
        let mut quiz = Quiz::with_filter(catalog, filter, config.seed)?;
        quiz.session_seconds = config.session_seconds;
        Ok(quiz)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn filter(&self) -> &ContinentFilter {
        &self.filter
    }

    pub fn current_round(&self) -> &RoundState {
        &self.round
    }

    pub fn current_stats(&self) -> SessionStats {
        self.stats
    }

    pub fn current_timer(&self) -> TimerState {
        self.timer.state()
    }

    pub fn current_hint(&self) -> &HintState {
        &self.hint
    }

    pub fn history(&self) -> &RecentHistory {
        &self.history
    }

    pub fn session_seconds(&self) -> u32 {
        self.session_seconds
    }

    pub fn on_session_end<F>(&mut self, callback: F)
    where
        F: FnMut(&SessionSummary) + Send + 'static,
    {
        self.session_end_callbacks.push(Box::new(callback));
    }

    fn draw_round(&mut self) -> Result<()> {
        let active = self.catalog.active_countries(&self.filter);
        let round = round::next_round(&active, &mut self.history, &mut self.rng, self.next_round_id)?;
        self.next_round_id += 1;
        self.round = round;
        self.hint.clear();
        Ok(())
    }

    pub fn configure_filter(&mut self, continents: &BTreeSet<Continent>) -> Result<()> {
        let previous = self.filter.clone();
        if let Err(e) = self.filter.set_enabled_set(continents) {
            tracing::warn!("rejected filter change: {}", e);
            return Err(e);
        }
        self.apply_filter_change(previous)
    }

    pub fn set_continent_enabled(&mut self, continent: Continent, enabled: bool) -> Result<()> {
        let previous = self.filter.clone();
        if let Err(e) = self.filter.set_enabled(continent, enabled) {
            tracing::warn!(%continent, "rejected filter change: {}", e);
            return Err(e);
        }
        self.apply_filter_change(previous)
    }

    // A filter that cannot produce a round is rolled back so the engine
    // always holds a valid round for its filter.
    fn apply_filter_change(&mut self, previous: ContinentFilter) -> Result<()> {
        if let Err(e) = self.draw_round() {
            self.filter = previous;
            return Err(e);
        }
        tracing::info!(continents = %self.filter.label(), "continent filter changed");
        Ok(())
    }

    pub fn start_session(&mut self, duration_seconds: u32) -> Result<()> {
        self.timer.start(duration_seconds)?;
        self.stats = SessionStats::default();
        self.last_outcome = None;
        self.draw_round()?;
        tracing::info!(duration_seconds, "session started");
        Ok(())
    }

    /// Cancels the session without emitting a summary. No-op when idle.
    pub fn stop_session(&mut self) {
        if self.timer.stop() {
            tracing::info!("session stopped");
        }
    }

    /// Advances the session clock by one second. Returns the summary when
    /// this tick ended the session.
    pub fn tick(&mut self) -> Option<SessionSummary> {
        match self.timer.tick() {
            Tick::Ignored | Tick::Counting { .. } => None,
            Tick::Expired => {
                let summary = self.summary();
                tracing::info!(
                    score = summary.stats.score,
                    correct = summary.stats.correct_choices,
                    wrong = summary.stats.wrong_choices,
                    continents = %summary.continents_label,
                    "session expired"
                );
                for callback in self.session_end_callbacks.iter_mut() {
                    callback(&summary);
                }
                Some(summary)
            }
        }
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            continents: self.filter.enabled(),
            continents_label: self.filter.label(),
            stats: self.stats,
            total_choices: self.stats.total_choices(),
            accuracy_percent: self.stats.accuracy_percent(),
            duration_seconds: self.timer.state().duration_seconds,
            ended_at: Utc::now(),
        }
    }

    /// Scores a choice against the current round, whatever its id.
    pub fn choose_country(&mut self, iso_code: &str) -> Result<ChoiceOutcome> {
        let round_id = self.round.round_id;
        self.choose_in_round(round_id, iso_code)
    }

    pub fn choose_in_round(&mut self, round_id: u64, iso_code: &str) -> Result<ChoiceOutcome> {
        if self.timer.is_expired() {
            return Err(QuizError::SessionExpired);
        }
        let chosen = match self.round.candidates.iter().find(|c| c.is(iso_code)) {
            Some(country) if round_id == self.round.round_id => country.clone(),
            _ => {
                tracing::warn!(round_id, current = self.round.round_id, iso_code, "ignoring stale choice");
                return Err(QuizError::StaleChoice {
                    iso_code: iso_code.to_string(),
                });
            }
        };

        let before = self.stats.score;
        let (outcome, stats) = scoring::submit_choice(&chosen, &self.round, &self.hint, self.stats);
        self.stats = stats;
        let result = ChoiceOutcome {
            outcome,
            points: stats.score as i64 - before as i64,
            correct_country: self.round.target.clone(),
            stats,
        };
        if outcome == Outcome::Incorrect {
            tracing::debug!(chosen = %chosen.iso_code, target = %self.round.target.iso_code, "wrong choice");
        }

        self.draw_round()?;
        self.last_outcome = Some(result.clone());
        Ok(result)
    }

    pub fn request_hint(&mut self) -> Result<String> {
        if self.timer.is_expired() {
            return Err(QuizError::SessionExpired);
        }
        Ok(self.hint.reveal(&self.round.target))
    }

    pub fn hint_available(&self) -> bool {
        hint::has_hint(&self.round.target)
    }

    /// Zeroes the counters and moves on to a fresh round. The timer is left
    /// alone.
    pub fn reset_counters(&mut self) -> Result<()> {
        self.stats = SessionStats::default();
        self.last_outcome = None;
        self.draw_round()
    }

    pub fn active_countries(&self) -> Vec<&Country> {
        self.catalog.active_countries(&self.filter)
    }

    pub fn quiz_state(&self) -> QuizState {
        QuizState {
            round: self.round.clone(),
            stats: self.stats,
            timer: self.timer.state(),
            hint: self.hint.clone(),
            hint_available: self.hint_available(),
            continents: self.filter.enabled(),
            active_countries: self.active_countries().len(),
            last_outcome: self.last_outcome.clone(),
            available_actions: self.get_available_actions(),
        }
    }

    pub fn get_available_actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.timer.phase() != TimerPhase::Expired {
            actions.extend(self.round.candidates.iter().map(|c| Action::Choose {
                round_id: self.round.round_id,
                iso_code: c.iso_code.clone(),
            }));
            if self.hint.text.is_none() && self.hint_available() {
                actions.push(Action::RequestHint);
            }
        }
        actions.push(Action::StartSession {
            default_seconds: self.session_seconds,
        });
        if self.timer.phase() != TimerPhase::Idle {
            actions.push(Action::StopSession);
        }
        actions.push(Action::ConfigureFilter);
        actions.push(Action::ResetCounters);
        actions
    }
}
