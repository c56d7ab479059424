use flag_quiz_server::continent::{Continent, ContinentFilter};
use flag_quiz_server::error::Result;
use flag_quiz_server::quiz::Quiz;
use flag_quiz_server::quiz_config::QuizConfig;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Write;
use std::time::Instant;

struct Args {
    seeds: u64,
    rounds: usize,
}

// Parse command line arguments to get the simulation size
lazy_static::lazy_static! {
    static ref ARGS: Args = {
        let args: Vec<String> = std::env::args().collect();

        // Default values if no args provided
        let mut seeds = 200;
        let mut rounds = 500;

        // Parse args (format: cargo run --bin simulate_rounds <seeds> <rounds>)
        if args.len() > 2 {
            seeds = args[1].parse().unwrap_or(200);
            rounds = args[2].parse().unwrap_or(500);
        }

        Args { seeds, rounds }
    };
}

#[derive(Serialize, Debug)]
struct RunReport {
    shortest_repeat_gap: Option<usize>,
    distinct_targets: usize,
    most_frequent_target: usize,
}

#[derive(Serialize, Debug)]
struct ScenarioReport {
    continents: String,
    pool_size: usize,
    runs: usize,
    shortest_repeat_gap: Option<usize>,
    mean_distinct_targets: f64,
    worst_target_frequency: usize,
}

fn simulate(config: &QuizConfig, continents: &BTreeSet<Continent>, seed: u64) -> Result<RunReport> {
    let mut quiz = Quiz::from_config(config.clone().with_seed(seed))?;
    quiz.configure_filter(continents)?;

    let mut last_seen: HashMap<String, usize> = HashMap::new();
    let mut frequency: HashMap<String, usize> = HashMap::new();
    let mut shortest_repeat_gap: Option<usize> = None;

    for round_number in 0..ARGS.rounds {
        let target = quiz.current_round().target.iso_code.clone();
        if let Some(previous) = last_seen.insert(target.clone(), round_number) {
            let gap = round_number - previous;
            shortest_repeat_gap = Some(shortest_repeat_gap.map_or(gap, |g| g.min(gap)));
        }
        *frequency.entry(target.clone()).or_insert(0) += 1;
        quiz.choose_country(&target)?;
    }

    Ok(RunReport {
        shortest_repeat_gap,
        distinct_targets: frequency.len(),
        most_frequent_target: frequency.values().copied().max().unwrap_or(0),
    })
}

fn scenario(config: &QuizConfig, continents: BTreeSet<Continent>) -> Result<ScenarioReport> {
    let label = ContinentFilter::from_set(&continents)?.label();
    let pool_size = config
        .countries
        .iter()
        .filter(|c| continents.contains(&c.continent))
        .count();

    let runs = (0..ARGS.seeds)
        .into_par_iter()
        .map(|seed| simulate(config, &continents, seed))
        .collect::<Result<Vec<RunReport>>>()?;

    let shortest_repeat_gap = runs.iter().filter_map(|r| r.shortest_repeat_gap).min();
    let mean_distinct_targets =
        runs.iter().map(|r| r.distinct_targets as f64).sum::<f64>() / runs.len().max(1) as f64;
    let worst_target_frequency = runs.iter().map(|r| r.most_frequent_target).max().unwrap_or(0);

    println!(
        "{:>40}: pool {:>3}, shortest repeat gap {:?}",
        label, pool_size, shortest_repeat_gap
    );

    Ok(ScenarioReport {
        continents: label,
        pool_size,
        runs: runs.len(),
        shortest_repeat_gap,
        mean_distinct_targets,
        worst_target_frequency,
    })
}

fn main() -> Result<()> {
    let start = Instant::now();
    let config = QuizConfig::default_catalog()?;

    let mut scenarios: Vec<BTreeSet<Continent>> =
        Continent::ALL.iter().map(|&c| BTreeSet::from([c])).collect();
    scenarios.push(Continent::ALL.iter().copied().collect());

    let reports = scenarios
        .into_iter()
        .map(|continents| scenario(&config, continents))
        .collect::<Result<Vec<ScenarioReport>>>()?;

    let mut file = File::create("selector_report.json")?;
    file.write_all(serde_json::to_string_pretty(&reports)?.as_bytes())?;

    println!("Selector report successfully written to selector_report.json");
    println!("Total computation time: {:?}", start.elapsed());
    Ok(())
}
