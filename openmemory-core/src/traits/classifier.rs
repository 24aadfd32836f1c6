use std::collections::BTreeMap;

use crate::errors::OpenMemoryResult;
use crate::sector::Sector;
use crate::tenant::TenantId;

/// Output of sector classification (spec.md §4.D): one primary sector
/// plus up to `CLASSIFIER_MAX_AUX_SECTORS` auxiliary sectors.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub primary: Sector,
    pub auxiliary: Vec<Sector>,
    /// Raw per-sector scores, for diagnostics and for the tie-break rule.
    pub scores: BTreeMap<Sector, f64>,
}

impl ClassificationResult {
    /// All sectors the classifier assigned: primary + auxiliary.
    pub fn all_sectors(&self) -> Vec<Sector> {
        let mut all = vec![self.primary];
        all.extend(self.auxiliary.iter().copied());
        all
    }
}

/// A per-tenant learned linear model: one weight vector + bias per
/// sector, scored against a fixed-size lexical feature vector (spec.md
/// §4.D).
#[derive(Debug, Clone, PartialEq)]
pub struct SectorWeights {
    pub weights: BTreeMap<Sector, Vec<f64>>,
    pub bias: BTreeMap<Sector, f64>,
    pub trained_on_labels: u64,
}

/// The classifier's backing store for its per-tenant learned model
/// (spec.md §4.D: "stored in the Metadata Store").
pub trait ClassifierModelStore: Send + Sync {
    fn get_weights(&self, user_id: &TenantId) -> OpenMemoryResult<Option<SectorWeights>>;
    fn save_weights(&self, user_id: &TenantId, weights: &SectorWeights) -> OpenMemoryResult<()>;
    /// Count of memories added since the model was last trained, used by
    /// the Maintenance Scheduler's `classifier_retrain` job (spec.md §4.D,
    /// §4.I).
    fn count_unlabeled_since_training(&self, user_id: &TenantId) -> OpenMemoryResult<u64>;
    /// Bump the unlabeled-since-training counter by one; called once per
    /// `add` (spec.md §4.E) so `classifier_retrain` (spec.md §4.D, §4.I)
    /// knows when enough new memories have accumulated.
    fn record_new_label(&self, user_id: &TenantId) -> OpenMemoryResult<()>;
}

/// Maps input text to a primary sector plus auxiliary sectors (spec.md §4.D).
pub trait SectorClassifier: Send + Sync {
    fn classify(
        &self,
        text: &str,
        user_id: &TenantId,
        hints: &[Sector],
    ) -> OpenMemoryResult<ClassificationResult>;
}
