//! Lexical rule-set fallback (spec.md §4.D: "falls back to a lexical rule
//! set when no model exists"). Scores each sector directly from the
//! keyword-bucket features without any learned weights.

use std::collections::BTreeMap;

use openmemory_core::sector::Sector;

use crate::features::extract_features;

/// Score every sector from `text`'s raw keyword-bucket density. Index `i`
/// of the feature vector (see `features::extract_features`) is the
/// keyword-density feature for `Sector::ALL[i]`.
pub fn score(text: &str) -> BTreeMap<Sector, f64> {
    let features = extract_features(text);
    Sector::ALL
        .iter()
        .enumerate()
        .map(|(i, &sector)| (sector, features[i]))
        .collect()
}
