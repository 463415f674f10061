//! Train/test splits over a population set.
//!
//! Removing the training population leaves two test populations. They keep
//! their relative order from the set, so for `[cdc, pmen, maela]`:
//!
//! ```text
//! train=cdc    test_1=pmen  test_2=maela
//! train=pmen   test_1=cdc   test_2=maela
//! train=maela  test_1=cdc   test_2=pmen
//! ```

use crate::error::ConfigError;
use crate::types::{Population, PopulationSet, Split};

/// Split for one named training population.
pub fn split_for(populations: &PopulationSet, training: &str) -> Result<Split, ConfigError> {
    let train = populations
        .iter()
        .find(|p| p.as_str() == training)
        .cloned()
        .ok_or_else(|| ConfigError::UnknownPopulation(training.to_string()))?;
    Ok(split_excluding(populations, train))
}

/// One split per population, in set order.
pub fn splits(populations: &PopulationSet) -> impl Iterator<Item = Split> + '_ {
    populations.iter().map(move |train| split_excluding(populations, train.clone()))
}

/// Order-preserving set difference. `PopulationSet` guarantees three distinct
/// members, so exactly two remain.
pub(crate) fn split_excluding(populations: &PopulationSet, train: Population) -> Split {
    let mut rest = populations.iter().filter(|p| **p != train).cloned();
    let test_1 = rest.next().unwrap_or_else(|| train.clone());
    let test_2 = rest.next().unwrap_or_else(|| train.clone());
    Split { train, test_1, test_2 }
}
