//! Integration tests for the quiz session engine
//!
//! These drive a seeded `Quiz` through whole sessions:
//! - scoring and streaks across rounds
//! - hints discounting the reward of a single round
//! - the timer lifecycle and the summary emitted on expiry
//! - continent filter changes and the rounds they produce

use flag_quiz_server::continent::Continent;
use flag_quiz_server::error::QuizError;
use flag_quiz_server::quiz::{Quiz, SessionSummary};
use flag_quiz_server::quiz_config::QuizConfig;
use flag_quiz_server::scoring::{Outcome, SessionStats};
use flag_quiz_server::timer::TimerPhase;
use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex};

fn quiz(seed: u64) -> Quiz {
    let config = QuizConfig::default_catalog().unwrap().with_seed(seed);
    Quiz::from_config(config).unwrap()
}

fn choose_target(quiz: &mut Quiz) -> Outcome {
    let target = quiz.current_round().target.iso_code.clone();
    quiz.choose_country(&target).unwrap().outcome
}

fn choose_wrong(quiz: &mut Quiz) -> Outcome {
    let round = quiz.current_round().clone();
    let wrong = round
        .candidates
        .iter()
        .find(|c| **c != round.target)
        .unwrap()
        .iso_code
        .clone();
    quiz.choose_country(&wrong).unwrap().outcome
}

// ============================================================================
// Scoring
// ============================================================================

#[test]
fn test_streak_scoring_sequence() {
    let mut quiz = quiz(1);

    for _ in 0..3 {
        assert_eq!(choose_target(&mut quiz), Outcome::Correct);
    }
    let stats = quiz.current_stats();
    assert_eq!(stats.score, 330);
    assert_eq!(stats.streak, 3);

    assert_eq!(choose_wrong(&mut quiz), Outcome::Incorrect);
    let stats = quiz.current_stats();
    assert_eq!(stats.score, 280);
    assert_eq!(stats.streak, 0);
    assert_eq!(stats.correct_choices, 3);
    assert_eq!(stats.wrong_choices, 1);
}

#[test]
fn test_choice_matches_by_iso_code_case_insensitively() {
    let mut quiz = quiz(2);
    let target = quiz.current_round().target.iso_code.to_ascii_lowercase();
    let outcome = quiz.choose_country(&target).unwrap();
    assert_eq!(outcome.outcome, Outcome::Correct);
    assert_eq!(outcome.points, 100);
}

#[test]
fn test_every_choice_draws_a_new_round() {
    let mut quiz = quiz(3);
    let first = quiz.current_round().round_id;
    choose_wrong(&mut quiz);
    let second = quiz.current_round().round_id;
    choose_target(&mut quiz);
    assert!(second > first);
    assert!(quiz.current_round().round_id > second);
}

#[test]
fn test_reset_counters_keeps_timer() {
    let mut quiz = quiz(4);
    quiz.start_session(30).unwrap();
    choose_target(&mut quiz);
    quiz.tick();
    quiz.reset_counters().unwrap();
    assert_eq!(quiz.current_stats(), SessionStats::default());
    assert_eq!(quiz.current_timer().remaining_seconds, 29);
    assert!(quiz.current_timer().running);
}

// ============================================================================
// Hints
// ============================================================================

#[test]
fn test_hint_discounts_reward_with_streak() {
    let mut quiz = quiz(5);
    choose_target(&mut quiz);
    choose_target(&mut quiz);
    assert_eq!(quiz.current_stats().score, 210);

    // Skip to a round whose target has hint text
    while !quiz.hint_available() {
        quiz.reset_counters().unwrap();
        choose_target(&mut quiz);
        choose_target(&mut quiz);
    }
    let before = quiz.current_stats();
    let text = quiz.request_hint().unwrap();
    assert!(!text.is_empty());
    assert!(quiz.current_hint().reward_penalty);

    let outcome = quiz.choose_country(&quiz.current_round().target.iso_code.clone()).unwrap();
    assert_eq!(outcome.points, 10 + 10 * before.streak as i64);
    assert!(!quiz.current_hint().active);
}

#[test]
fn test_hint_does_not_carry_into_next_round() {
    let mut quiz = quiz(6);
    quiz.request_hint().unwrap();
    choose_wrong(&mut quiz);
    assert_eq!(quiz.current_hint().text, None);

    let outcome = quiz.choose_country(&quiz.current_round().target.iso_code.clone()).unwrap();
    assert_eq!(outcome.points, 100);
}

#[test]
fn test_hint_is_capital_when_known() {
    let mut quiz = quiz(7);
    let target = quiz.current_round().target.clone();
    let text = quiz.request_hint().unwrap();
    match (&target.capital, &target.fun_fact) {
        (Some(capital), _) => assert_eq!(&text, capital),
        (None, Some(fact)) => assert_eq!(&text, fact),
        (None, None) => assert!(text.is_empty()),
    }
}

// ============================================================================
// Session timer
// ============================================================================

#[test]
fn test_sixty_second_session_emits_one_summary() {
    let mut quiz = quiz(8);
    let emitted: Arc<Mutex<Vec<SessionSummary>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = emitted.clone();
    quiz.on_session_end(move |summary| sink.lock().unwrap().push(summary.clone()));

    choose_target(&mut quiz);
    quiz.start_session(60).unwrap();
    assert_eq!(quiz.current_stats(), SessionStats::default());

    choose_target(&mut quiz);
    choose_target(&mut quiz);
    choose_wrong(&mut quiz);

    let mut expiries = 0;
    for _ in 0..60 {
        if quiz.tick().is_some() {
            expiries += 1;
        }
    }
    assert_eq!(expiries, 1);
    assert_eq!(quiz.current_timer().phase, TimerPhase::Expired);

    // Choices after expiry are rejected and leave the stats alone
    let target = quiz.current_round().target.iso_code.clone();
    assert!(matches!(quiz.choose_country(&target), Err(QuizError::SessionExpired)));
    assert!(matches!(quiz.request_hint(), Err(QuizError::SessionExpired)));
    for _ in 0..5 {
        assert!(quiz.tick().is_none());
    }

    let emitted = emitted.lock().unwrap();
    assert_eq!(emitted.len(), 1);
    let summary = &emitted[0];
    assert_eq!(summary.stats.correct_choices, 2);
    assert_eq!(summary.stats.wrong_choices, 1);
    assert_eq!(summary.stats.score, 160);
    assert_eq!(summary.total_choices, 3);
    assert_eq!(summary.accuracy_percent, 67);
    assert_eq!(summary.duration_seconds, 60);
    assert_eq!(summary.continents.len(), 6);
    assert_eq!(quiz.current_stats(), summary.stats);
}

#[test]
fn test_summary_carries_continents_at_expiry() {
    let mut quiz = quiz(9);
    quiz.start_session(2).unwrap();
    quiz.configure_filter(&BTreeSet::from([Continent::Europe, Continent::Oceania]))
        .unwrap();
    quiz.tick();
    let summary = quiz.tick().unwrap();
    assert_eq!(
        summary.continents,
        BTreeSet::from([Continent::Europe, Continent::Oceania])
    );
    assert_eq!(summary.continents_label, "Europe, Oceania");
}

#[test]
fn test_stop_session_is_idempotent_and_silent() {
    let mut quiz = quiz(10);
    let emitted = Arc::new(Mutex::new(0));
    let counter = emitted.clone();
    quiz.on_session_end(move |_| *counter.lock().unwrap() += 1);

    quiz.stop_session();
    assert_eq!(quiz.current_timer().phase, TimerPhase::Idle);

    quiz.start_session(3).unwrap();
    quiz.tick();
    quiz.stop_session();
    quiz.stop_session();
    for _ in 0..5 {
        assert!(quiz.tick().is_none());
    }
    assert_eq!(quiz.current_timer().phase, TimerPhase::Idle);
    assert_eq!(*emitted.lock().unwrap(), 0);
}

#[test]
fn test_restart_after_expiry_resets_stats() {
    let mut quiz = quiz(11);
    quiz.start_session(1).unwrap();
    choose_target(&mut quiz);
    assert!(quiz.tick().is_some());

    quiz.start_session(5).unwrap();
    assert_eq!(quiz.current_timer().phase, TimerPhase::Running);
    assert_eq!(quiz.current_timer().remaining_seconds, 5);
    assert_eq!(quiz.current_stats(), SessionStats::default());
    assert_eq!(choose_target(&mut quiz), Outcome::Correct);
}

#[test]
fn test_zero_length_session_is_rejected() {
    let mut quiz = quiz(12);
    assert!(matches!(quiz.start_session(0), Err(QuizError::InvalidDuration)));
    assert_eq!(quiz.current_timer().phase, TimerPhase::Idle);
}

// ============================================================================
// Continent filter and round selection
// ============================================================================

#[test]
fn test_filter_change_draws_round_from_enabled_continents() {
    let mut quiz = quiz(13);
    let before = quiz.current_round().round_id;
    quiz.configure_filter(&BTreeSet::from([Continent::SouthAmerica]))
        .unwrap();
    assert!(quiz.current_round().round_id > before);

    for _ in 0..50 {
        assert!(quiz
            .current_round()
            .candidates
            .iter()
            .all(|c| c.continent == Continent::SouthAmerica));
        choose_target(&mut quiz);
    }
}

#[test]
fn test_last_continent_cannot_be_disabled() {
    let mut quiz = quiz(14);
    quiz.configure_filter(&BTreeSet::from([Continent::Africa])).unwrap();
    let round = quiz.current_round().round_id;

    assert!(matches!(
        quiz.set_continent_enabled(Continent::Africa, false),
        Err(QuizError::InvalidFilterChange)
    ));
    assert!(matches!(
        quiz.configure_filter(&BTreeSet::new()),
        Err(QuizError::InvalidFilterChange)
    ));
    assert_eq!(quiz.filter().enabled(), BTreeSet::from([Continent::Africa]));
    assert_eq!(quiz.current_round().round_id, round);
}

#[test]
fn test_history_is_bounded_and_fifo() {
    let mut quiz = quiz(15);
    let mut targets = vec![quiz.current_round().target.iso_code.clone()];
    for _ in 0..10 {
        choose_target(&mut quiz);
        targets.push(quiz.current_round().target.iso_code.clone());
        assert!(quiz.history().len() <= 10);
    }

    // Eleven targets recorded; the first one has aged out
    let recorded: Vec<&str> = quiz.history().iter().collect();
    assert_eq!(recorded.len(), 10);
    assert!(!quiz.history().contains(&targets[0]));
    let expected: Vec<&str> = targets[1..].iter().map(String::as_str).collect();
    assert_eq!(recorded, expected);
}

#[test]
fn test_targets_do_not_repeat_within_history_window() {
    let mut quiz = quiz(16);
    quiz.configure_filter(&BTreeSet::from([Continent::Europe])).unwrap();
    let mut targets: Vec<String> = Vec::new();
    for _ in 0..200 {
        let target = quiz.current_round().target.iso_code.clone();
        let recent: HashSet<&String> = targets.iter().rev().take(10).collect();
        assert!(!recent.contains(&target));
        targets.push(target);
        choose_target(&mut quiz);
    }
}
