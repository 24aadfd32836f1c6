use serde::{Deserialize, Serialize};

/// Sector classifier tuning (spec.md §4.D): tie-break margin, auxiliary
/// sector cap, and the per-tenant learned-model retraining threshold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    pub tie_break_margin: f64,
    pub max_aux_sectors: usize,
    pub retrain_min_new_labels: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            tie_break_margin: crate::constants::CLASSIFIER_TIE_BREAK_MARGIN,
            max_aux_sectors: crate::constants::CLASSIFIER_MAX_AUX_SECTORS,
            retrain_min_new_labels: crate::constants::CLASSIFIER_RETRAIN_MIN_NEW_LABELS,
        }
    }
}
