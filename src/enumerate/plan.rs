//! Lazy, exactly-sized sequence of invocations.
//!
//! A plan is a counter over a mixed-radix index. The innermost digit is the
//! test order (2), then the mode set (S), then the model (M) and population
//! (3) digits in the order the [`Shape`] dictates. Records are built on
//! demand; nothing but the three splits is precomputed.

use super::split::splits;
use super::{Enumeration, Shape};
use crate::error::ConfigError;
use crate::types::{InvocationRecord, ModeSet, ModelSpec, Split};

/// Validate an enumeration and return its plan.
pub fn plan(enumeration: &Enumeration) -> Result<Plan, ConfigError> {
    enumeration.validate()?;
    Ok(Plan::new(enumeration))
}

#[derive(Debug, Clone)]
pub struct Plan {
    splits: Vec<Split>,
    models: Vec<ModelSpec>,
    mode_sets: Vec<ModeSet>,
    shape: Shape,
    next: usize,
    total: usize,
}

impl Plan {
    fn new(enumeration: &Enumeration) -> Self {
        let splits: Vec<_> = splits(&enumeration.populations).collect();
        let mode_sets = enumeration.effective_mode_sets();
        let total = splits.len() * enumeration.models.len() * mode_sets.len() * 2;
        Self {
            splits,
            models: enumeration.models.clone(),
            mode_sets,
            shape: enumeration.shape,
            next: 0,
            total,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Total number of records, including those already yielded.
    pub fn total(&self) -> usize {
        self.total
    }

    fn record_at(&self, index: usize) -> InvocationRecord {
        let swapped = index % 2 == 1;
        let rest = index / 2;
        let modes = &self.mode_sets[rest % self.mode_sets.len()];
        let rest = rest / self.mode_sets.len();

        let (split_idx, model_idx) = match self.shape {
            Shape::ModelsWithinPopulations => (rest / self.models.len(), rest % self.models.len()),
            Shape::PopulationsWithinModels => (rest % self.splits.len(), rest / self.splits.len()),
        };

        let split = &self.splits[split_idx];
        let model = self.models[model_idx];
        if swapped {
            InvocationRecord::new(model, &split.swapped(), modes)
        } else {
            InvocationRecord::new(model, split, modes)
        }
    }
}

impl Iterator for Plan {
    type Item = InvocationRecord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let record = self.record_at(self.next);
        self.next += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Plan {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerate::Preset;
    use crate::types::{InferenceMode, PopulationSet};

    fn triple(r: &InvocationRecord) -> (String, String, String) {
        (r.train_pop.to_string(), r.test_pop_1.to_string(), r.test_pop_2.to_string())
    }

    #[test]
    fn test_full_grid_has_24_invocations() {
        let records: Vec<_> = plan(&Preset::FullGrid.enumeration()).unwrap().collect();
        assert_eq!(records.len(), 24);
    }

    #[test]
    fn test_count_is_3_m_2_without_flags() {
        for m in 1..=4 {
            let enumeration = Enumeration {
                models: ModelSpec::GRID[..m].to_vec(),
                ..Enumeration::default()
            };
            let p = plan(&enumeration).unwrap();
            assert_eq!(p.len(), 3 * m * 2);
            assert_eq!(p.count(), 3 * m * 2);
        }
    }

    #[test]
    fn test_models_within_populations_order() {
        let records: Vec<_> = plan(&Preset::FullGrid.enumeration()).unwrap().collect();

        // First population block: cdc, every model, both orders.
        for (i, model) in ModelSpec::GRID.iter().enumerate() {
            let a = &records[2 * i];
            let b = &records[2 * i + 1];
            assert_eq!(a.model_type, *model);
            assert_eq!(triple(a), ("cdc".into(), "pmen".into(), "maela".into()));
            assert_eq!(triple(b), ("cdc".into(), "maela".into(), "pmen".into()));
        }

        assert_eq!(records[8].train_pop.as_str(), "pmen");
        assert_eq!(records[8].model_type, ModelSpec::RandomForest);
        assert_eq!(records[16].train_pop.as_str(), "maela");
        assert_eq!(triple(&records[16]), ("maela".into(), "cdc".into(), "pmen".into()));
    }

    #[test]
    fn test_pairs_differ_only_by_test_order() {
        let records: Vec<_> = plan(&Preset::FullGrid.enumeration()).unwrap().collect();
        for pair in records.chunks(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert_eq!(a.model_type, b.model_type);
            assert_eq!(a.train_pop, b.train_pop);
            assert_eq!(a.modes, b.modes);
            assert_eq!(a.test_pop_1, b.test_pop_2);
            assert_eq!(a.test_pop_2, b.test_pop_1);

            let mut swapped = b.clone();
            std::mem::swap(&mut swapped.test_pop_1, &mut swapped.test_pop_2);
            assert_eq!(&swapped, a);
        }
    }

    #[test]
    fn test_populations_within_models_order() {
        let enumeration = Enumeration {
            models: vec![ModelSpec::RandomForest, ModelSpec::Lasso],
            shape: Shape::PopulationsWithinModels,
            ..Enumeration::default()
        };
        let records: Vec<_> = plan(&enumeration).unwrap().collect();
        assert_eq!(records.len(), 12);

        let models: Vec<_> = records.iter().map(|r| r.model_type).collect();
        assert!(models[..6].iter().all(|m| *m == ModelSpec::RandomForest));
        assert!(models[6..].iter().all(|m| *m == ModelSpec::Lasso));

        let trains: Vec<_> = records[..6].iter().map(|r| r.train_pop.to_string()).collect();
        assert_eq!(trains, vec!["cdc", "cdc", "pmen", "pmen", "maela", "maela"]);
    }

    #[test]
    fn test_rf_hmm_always_carries_hmm_flags() {
        let records: Vec<_> = plan(&Preset::RfHmm.enumeration()).unwrap().collect();
        assert_eq!(records.len(), 6);
        for record in &records {
            assert_eq!(record.model_type, ModelSpec::RandomForest);
            let args = record.to_args();
            assert!(args.contains(&"--HMM_inference".to_string()));
            assert!(args.contains(&"--HMM_MIC_inference".to_string()));
            assert!(!args.contains(&"--blosum_inference".to_string()));
        }
    }

    #[test]
    fn test_extra_mode_sets_repeat_both_orders() {
        let blosum = ModeSet::new([InferenceMode::Blosum]).unwrap();
        let enumeration = Enumeration {
            models: vec![ModelSpec::ElasticNet],
            mode_sets: vec![ModeSet::none(), blosum.clone()],
            ..Enumeration::default()
        };
        let records: Vec<_> = plan(&enumeration).unwrap().collect();
        assert_eq!(records.len(), 12);

        // Per population: baseline pair, then blosum pair.
        assert_eq!(records[0].modes, ModeSet::none());
        assert_eq!(records[1].modes, ModeSet::none());
        assert_eq!(records[2].modes, blosum);
        assert_eq!(records[3].modes, blosum);
        assert_eq!(triple(&records[2]), triple(&records[0]));
        assert_eq!(records[4].train_pop.as_str(), "pmen");
    }

    #[test]
    fn test_plan_rejects_empty_models() {
        let enumeration = Enumeration {
            models: vec![],
            ..Enumeration::default()
        };
        assert!(matches!(plan(&enumeration), Err(ConfigError::EmptyModels)));
    }

    #[test]
    fn test_size_hint_tracks_progress() {
        let mut p = plan(&Enumeration::default()).unwrap();
        assert_eq!(p.len(), 24);
        p.next();
        p.next();
        assert_eq!(p.len(), 22);
        assert_eq!(p.total(), 24);
    }

    #[test]
    fn test_custom_population_set() {
        let enumeration = Enumeration {
            populations: PopulationSet::new(["x", "y", "z"]).unwrap(),
            models: vec![ModelSpec::Dbscan],
            ..Enumeration::default()
        };
        let trains: Vec<_> = plan(&enumeration).unwrap().map(|r| r.train_pop.to_string()).collect();
        assert_eq!(trains, vec!["x", "x", "y", "y", "z", "z"]);
    }
}
