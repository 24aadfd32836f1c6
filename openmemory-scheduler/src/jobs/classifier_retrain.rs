//! `classifier_retrain` job (spec.md §4.D, §4.I): once a tenant has
//! accumulated `retrain_min_new_labels` memories since its model was last
//! trained, retrain from scratch using each memory's own (already
//! assigned) `primary_sector` as its label.

use tracing::{debug, info};

use openmemory_classifier::features::extract_features;
use openmemory_classifier::learned::{train, LabeledExample};
use openmemory_core::config::ClassifierConfig;
use openmemory_core::errors::OpenMemoryResult;
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::{ClassifierModelStore, MetadataStore};

/// Learning rate for the perceptron-style update (spec.md §4.D: "simple,
/// deterministic" retraining).
const LEARNING_RATE: f64 = 0.1;

/// Returns `true` if a retrain ran, `false` if the tenant hasn't
/// accumulated enough new labels yet.
pub fn run<S>(store: &S, user_id: &TenantId, config: &ClassifierConfig) -> OpenMemoryResult<bool>
where
    S: MetadataStore + ClassifierModelStore,
{
    let unlabeled = store.count_unlabeled_since_training(user_id)?;
    if unlabeled < config.retrain_min_new_labels as u64 {
        debug!(user_id = %user_id, unlabeled, "classifier_retrain skipped: not enough new labels");
        return Ok(false);
    }

    let memories = store.list_all_for_tenant(user_id)?;
    let examples: Vec<LabeledExample> = memories
        .iter()
        .map(|m| LabeledExample {
            features: extract_features(&m.content),
            sector: m.primary_sector,
        })
        .collect();

    if examples.is_empty() {
        return Ok(false);
    }

    let weights = train(&examples, LEARNING_RATE);
    store.save_weights(user_id, &weights)?;
    info!(user_id = %user_id, labels = examples.len(), "classifier_retrain job trained a fresh model");
    Ok(true)
}
