//! Parallel search demo
//!
//! Runs a four-rank archipelago inside one process, one thread per rank.
//! The driver loop below sequences the three coordination phases (stepping,
//! migration, convergence check) identically on every rank; the library
//! itself never sequences them.
//!
//! ```bash
//! cargo run --example parallel_search
//! ```

use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use archipelago::prelude::*;

const NUM_RANKS: usize = 4;
const POPULATION_SIZE: usize = 16;
const STEPS_PER_ROUND: u64 = 25;
const MAX_ROUNDS: u32 = 40;
const ERROR_TOLERANCE: f64 = 1e-3;

/// Scalar candidate; fitness is squared distance from the optimum at zero
#[derive(Clone, Debug, Serialize, Deserialize)]
struct Sample {
    value: f64,
}

impl Individual for Sample {
    fn fitness(&self) -> f64 {
        self.value * self.value
    }
}

/// Toy island: each generation contracts one random member toward zero
struct ContractingIsland {
    population: Vec<Sample>,
    age: u64,
    rng: StdRng,
}

impl ContractingIsland {
    fn seeded(rank: usize, size: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(rank as u64 + 1);
        let population = (0..size)
            .map(|_| Sample {
                value: rng.gen_range(-10.0..10.0),
            })
            .collect();
        Self {
            population,
            age: 0,
            rng,
        }
    }
}

impl Island for ContractingIsland {
    type Individual = Sample;

    fn step(&mut self) {
        let index = self.rng.gen_range(0..self.population.len());
        self.population[index].value *= 0.9;
        self.age += 1;
    }

    fn generational_age(&self) -> u64 {
        self.age
    }

    fn best_individual(&self) -> Sample {
        let mut best = self.population[0].clone();
        for candidate in &self.population[1..] {
            if candidate.fitness() < best.fitness() {
                best = candidate.clone();
            }
        }
        best
    }

    fn population(&self) -> &[Sample] {
        &self.population
    }

    fn load_population(&mut self, population: Vec<Sample>) {
        self.population = population;
    }
}

fn run_rank(comm: LocalCommunicator) -> ArchipelagoResult<()> {
    let island = ContractingIsland::seeded(comm.rank(), POPULATION_SIZE);
    let mut member = Archipelago::with_seed(comm, island, 42)?;
    let policy = SwapBest::new(2);

    for round in 1..=MAX_ROUNDS {
        member.step_generations(
            STEPS_PER_ROUND,
            StepMode::Synchronized { sync_interval: 5 },
        )?;
        member.migrate(&policy)?;

        let report = member.check_convergence(ERROR_TOLERANCE)?;
        if report.is_converged() || round == MAX_ROUNDS {
            if let Some(best) = report.best().available() {
                println!(
                    "converged={} best_fitness={:.6} rounds={} archipelago_age={}",
                    report.is_converged(),
                    best.fitness(),
                    round,
                    member.archipelago_age(),
                );
            }
            break;
        }
    }
    Ok(())
}

fn main() -> ArchipelagoResult<()> {
    let endpoints = LocalGroup::endpoints(NUM_RANKS)?;
    thread::scope(|scope| {
        for comm in endpoints {
            scope.spawn(move || run_rank(comm).expect("rank failed"));
        }
    });
    Ok(())
}
