// round.rs
use crate::country::Country;
use crate::error::{QuizError, Result};
use crate::history::RecentHistory;
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const CANDIDATES_PER_ROUND: usize = 4;

/// One presentation of four candidate countries, one of which is the target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundState {
    pub round_id: u64,
    pub candidates: Vec<Country>,
    pub target: Country,
}

impl RoundState {
    pub fn has_candidate(&self, iso_code: &str) -> bool {
        self.candidates.iter().any(|c| c.is(iso_code))
    }

    pub fn is_target(&self, iso_code: &str) -> bool {
        self.target.is(iso_code)
    }
}

/// Draws the next round from `active` and records its target in `history`.
///
/// The target is taken from countries not seen in `history` when any exist,
/// falling back to the whole pool otherwise. The other three candidates are
/// sampled without replacement from the rest of the pool, and the four are
/// shuffled so the target's position carries no information.
pub fn next_round<R: Rng + ?Sized>(
    active: &[&Country],
    history: &mut RecentHistory,
    rng: &mut R,
    round_id: u64,
) -> Result<RoundState> {
    if active.len() < CANDIDATES_PER_ROUND {
        return Err(QuizError::InsufficientPool {
            available: active.len(),
        });
    }

    let fresh: Vec<usize> = (0..active.len())
        .filter(|&i| !history.contains(&active[i].iso_code))
        .collect();
    let target_index = if fresh.is_empty() {
        rng.gen_range(0..active.len())
    } else {
        fresh[rng.gen_range(0..fresh.len())]
    };

    let others: Vec<usize> = (0..active.len()).filter(|&i| i != target_index).collect();
    let mut picked: Vec<usize> = index::sample(rng, others.len(), CANDIDATES_PER_ROUND - 1)
        .into_iter()
        .map(|i| others[i])
        .collect();
    picked.push(target_index);
    picked.shuffle(rng);

    let candidates: Vec<Country> = picked.iter().map(|&i| active[i].clone()).collect();
    let target = active[target_index].clone();
    history.insert(&target.iso_code);

    tracing::debug!(
        round_id,
        target = %target.iso_code,
        pool = active.len(),
        relaxed = fresh.is_empty(),
        "drew round"
    );

    Ok(RoundState {
        round_id,
        candidates,
        target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continent::Continent;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn pool(n: usize) -> Vec<Country> {
        (0..n)
            .map(|i| {
                let code = format!("{}{}", (b'A' + (i / 26) as u8) as char, (b'A' + (i % 26) as u8) as char);
                Country::new(&format!("Country {}", code), &code, Continent::Europe)
            })
            .collect()
    }

    #[test]
    fn draws_four_distinct_candidates_including_target() {
        let countries = pool(30);
        let active: Vec<&Country> = countries.iter().collect();
        let mut history = RecentHistory::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for round_id in 0..200 {
            let round = next_round(&active, &mut history, &mut rng, round_id).unwrap();
            assert_eq!(round.candidates.len(), 4);
            let codes: HashSet<&str> = round.candidates.iter().map(|c| c.iso_code.as_str()).collect();
            assert_eq!(codes.len(), 4);
            assert!(round.has_candidate(&round.target.iso_code));
        }
    }

    #[test]
    fn insufficient_pool_is_reported() {
        let countries = pool(3);
        let active: Vec<&Country> = countries.iter().collect();
        let mut history = RecentHistory::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            next_round(&active, &mut history, &mut rng, 0),
            Err(QuizError::InsufficientPool { available: 3 })
        ));
        assert!(history.is_empty());
    }

    #[test]
    fn targets_avoid_recent_history() {
        let countries = pool(20);
        let active: Vec<&Country> = countries.iter().collect();
        let mut history = RecentHistory::default();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut targets: Vec<String> = Vec::new();

        for round_id in 0..100 {
            let round = next_round(&active, &mut history, &mut rng, round_id).unwrap();
            let recent = targets.iter().rev().take(10);
            for previous in recent {
                assert_ne!(previous, &round.target.iso_code);
            }
            targets.push(round.target.iso_code.clone());
        }
    }

    #[test]
    fn small_pool_relaxes_exclusion() {
        let countries = pool(5);
        let active: Vec<&Country> = countries.iter().collect();
        let mut history = RecentHistory::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        for round_id in 0..50 {
            next_round(&active, &mut history, &mut rng, round_id).unwrap();
            assert!(history.len() <= 5);
        }
    }
}
