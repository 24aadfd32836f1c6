//! `CompositeClassifier`: the `SectorClassifier` the rest of the workspace
//! consumes (spec.md §4.D). Uses the per-tenant learned model when one has
//! been trained, otherwise the lexical rule set; applies the tie-break
//! margin and auxiliary-sector cap from `ClassifierConfig`.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use openmemory_core::config::ClassifierConfig;
use openmemory_core::errors::OpenMemoryResult;
use openmemory_core::sector::Sector;
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::{ClassificationResult, ClassifierModelStore, SectorClassifier};

use crate::features::extract_features;
use crate::{lexical, learned};

/// Flat bonus added to a hinted sector's score before ranking — enough to
/// break a near-tie in the hint's favor without overriding a strong signal
/// from the text itself.
const HINT_BONUS: f64 = 0.15;

pub struct CompositeClassifier<S: ClassifierModelStore> {
    model_store: Arc<S>,
    config: ClassifierConfig,
}

impl<S: ClassifierModelStore> CompositeClassifier<S> {
    pub fn new(model_store: Arc<S>, config: ClassifierConfig) -> Self {
        Self { model_store, config }
    }

    fn raw_scores(&self, text: &str, user_id: &TenantId) -> OpenMemoryResult<BTreeMap<Sector, f64>> {
        match self.model_store.get_weights(user_id)? {
            Some(weights) if weights.trained_on_labels > 0 => {
                debug!(user_id = %user_id, "using learned sector classifier model");
                let features = extract_features(text);
                Ok(learned::score(&weights, &features))
            }
            _ => Ok(lexical::score(text)),
        }
    }
}

impl<S: ClassifierModelStore> SectorClassifier for CompositeClassifier<S> {
    fn classify(
        &self,
        text: &str,
        user_id: &TenantId,
        hints: &[Sector],
    ) -> OpenMemoryResult<ClassificationResult> {
        let mut scores = self.raw_scores(text, user_id)?;
        for &hint in hints {
            if let Some(s) = scores.get_mut(&hint) {
                *s += HINT_BONUS;
            }
        }

        let mut ranked: Vec<(Sector, f64)> = scores.iter().map(|(&s, &v)| (s, v)).collect();
        // Stable sort by score desc; ties keep `Sector::ALL` order so the
        // result is deterministic for identical inputs (spec.md §4.D).
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let (top_sector, top_score) = ranked[0];
        let (second_sector, second_score) = ranked.get(1).copied().unwrap_or((top_sector, top_score));

        let primary = if (top_score - second_score).abs() < self.config.tie_break_margin {
            Sector::Semantic
        } else {
            top_sector
        };
        let _ = second_sector;

        let auxiliary: Vec<Sector> = ranked
            .iter()
            .map(|&(s, _)| s)
            .filter(|&s| s != primary)
            .take(self.config.max_aux_sectors)
            .collect();

        Ok(ClassificationResult {
            primary,
            auxiliary,
            scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use openmemory_core::traits::SectorWeights;

    #[derive(Default)]
    struct NoModelStore;
    impl ClassifierModelStore for NoModelStore {
        fn get_weights(&self, _user_id: &TenantId) -> OpenMemoryResult<Option<SectorWeights>> {
            Ok(None)
        }
        fn save_weights(&self, _user_id: &TenantId, _weights: &SectorWeights) -> OpenMemoryResult<()> {
            Ok(())
        }
        fn count_unlabeled_since_training(&self, _user_id: &TenantId) -> OpenMemoryResult<u64> {
            Ok(0)
        }
        fn record_new_label(&self, _user_id: &TenantId) -> OpenMemoryResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct InMemoryModelStore {
        weights: Mutex<Option<SectorWeights>>,
    }
    impl ClassifierModelStore for InMemoryModelStore {
        fn get_weights(&self, _user_id: &TenantId) -> OpenMemoryResult<Option<SectorWeights>> {
            Ok(self.weights.lock().unwrap().clone())
        }
        fn save_weights(&self, _user_id: &TenantId, weights: &SectorWeights) -> OpenMemoryResult<()> {
            *self.weights.lock().unwrap() = Some(weights.clone());
            Ok(())
        }
        fn count_unlabeled_since_training(&self, _user_id: &TenantId) -> OpenMemoryResult<u64> {
            Ok(0)
        }
        fn record_new_label(&self, _user_id: &TenantId) -> OpenMemoryResult<()> {
            Ok(())
        }
    }

    fn tenant() -> TenantId {
        TenantId::user("u1")
    }

    #[test]
    fn emotional_episodic_cross_sector_recall() {
        let classifier = CompositeClassifier::new(Arc::new(NoModelStore), ClassifierConfig::default());
        let result = classifier
            .classify("I felt anxious before the exam", &tenant(), &[])
            .unwrap();
        assert_eq!(result.primary, Sector::Emotional);
        assert!(result.auxiliary.contains(&Sector::Episodic));
    }

    #[test]
    fn auxiliary_sectors_capped_at_configured_max() {
        let classifier = CompositeClassifier::new(Arc::new(NoModelStore), ClassifierConfig::default());
        let result = classifier.classify("hello", &tenant(), &[]).unwrap();
        assert!(result.auxiliary.len() <= classifier.config.max_aux_sectors);
    }

    #[test]
    fn hints_boost_their_sector_into_the_primary_slot() {
        let classifier = CompositeClassifier::new(Arc::new(NoModelStore), ClassifierConfig::default());
        let result = classifier
            .classify("a short note", &tenant(), &[Sector::Procedural])
            .unwrap();
        assert_eq!(result.primary, Sector::Procedural);
    }

    #[test]
    fn deterministic_for_identical_input() {
        let classifier = CompositeClassifier::new(Arc::new(NoModelStore), ClassifierConfig::default());
        let a = classifier.classify("the quick brown fox", &tenant(), &[]).unwrap();
        let b = classifier.classify("the quick brown fox", &tenant(), &[]).unwrap();
        assert_eq!(a.primary, b.primary);
        assert_eq!(a.auxiliary, b.auxiliary);
    }

    #[test]
    fn uses_learned_model_when_trained() {
        let store = Arc::new(InMemoryModelStore::default());
        let examples = vec![learned::LabeledExample {
            features: crate::features::extract_features("system crashed during deploy"),
            sector: Sector::Procedural,
        }];
        let weights = learned::train(&examples, 0.5);
        store.save_weights(&tenant(), &weights).unwrap();

        let classifier = CompositeClassifier::new(store, ClassifierConfig::default());
        let result = classifier
            .classify("system crashed during deploy", &tenant(), &[])
            .unwrap();
        assert_eq!(result.primary, Sector::Procedural);
    }
}
