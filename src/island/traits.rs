//! Abstract island collaborators
//!
//! The coordination layer drives an island but never looks inside it: how a
//! generation is produced (selection, crossover, mutation) is the island's
//! business. These traits are the whole surface this crate consumes.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A candidate solution with a scalar fitness
///
/// Fitness is totally ordered and lower is better. Individuals cross rank
/// boundaries during migration and convergence checks, so they must be
/// serializable.
pub trait Individual: Clone + Serialize + DeserializeOwned + Send + 'static {
    /// Scalar fitness of this candidate; lower is better
    fn fitness(&self) -> f64;
}

/// One sub-population and its local evolutionary loop state
///
/// An island is owned by exactly one rank for the process lifetime. Only the
/// coordination layer mutates it: stepping advances generations, migration
/// replaces population members.
pub trait Island {
    /// The candidate type this island evolves
    type Individual: Individual;

    /// Advance the population by one generation
    fn step(&mut self);

    /// Number of generations this island has executed, monotonically
    /// increasing
    fn generational_age(&self) -> u64;

    /// The minimum-fitness individual of the current population
    ///
    /// Islands are expected to hold at least one individual whenever the
    /// coordination layer runs.
    fn best_individual(&self) -> Self::Individual;

    /// The current population, in island order
    fn population(&self) -> &[Self::Individual];

    /// Replace the population wholesale
    ///
    /// No ordering contract is preserved; migration rebuilds populations as
    /// survivors followed by immigrants.
    fn load_population(&mut self, population: Vec<Self::Individual>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, Serialize, Deserialize)]
    struct Candidate {
        fitness: f64,
    }

    impl Individual for Candidate {
        fn fitness(&self) -> f64 {
            self.fitness
        }
    }

    struct CountingIsland {
        population: Vec<Candidate>,
        age: u64,
    }

    impl Island for CountingIsland {
        type Individual = Candidate;

        fn step(&mut self) {
            self.age += 1;
        }

        fn generational_age(&self) -> u64 {
            self.age
        }

        fn best_individual(&self) -> Candidate {
            let mut best = self.population[0].clone();
            for candidate in &self.population[1..] {
                if candidate.fitness() < best.fitness() {
                    best = candidate.clone();
                }
            }
            best
        }

        fn population(&self) -> &[Candidate] {
            &self.population
        }

        fn load_population(&mut self, population: Vec<Candidate>) {
            self.population = population;
        }
    }

    #[test]
    fn test_best_individual_is_minimum_fitness() {
        let island = CountingIsland {
            population: vec![
                Candidate { fitness: 0.5 },
                Candidate { fitness: 0.1 },
                Candidate { fitness: 0.9 },
            ],
            age: 0,
        };
        assert_eq!(island.best_individual().fitness(), 0.1);
    }

    #[test]
    fn test_step_advances_age() {
        let mut island = CountingIsland {
            population: vec![Candidate { fitness: 1.0 }],
            age: 0,
        };
        island.step();
        island.step();
        assert_eq!(island.generational_age(), 2);
    }
}
