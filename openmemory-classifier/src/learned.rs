//! Per-tenant learned linear model scoring (spec.md §4.D): `score(sector)
//! = weights[sector] . features + bias[sector]`. Training (`train`) is a
//! single-pass least-squares-style nudge toward each labeled example,
//! intentionally simple — the Maintenance Scheduler's `classifier_retrain`
//! job (spec.md §4.I) runs it periodically rather than online per-request.

use std::collections::BTreeMap;

use openmemory_core::sector::Sector;
use openmemory_core::traits::SectorWeights;

use crate::features::FEATURE_DIM;

pub fn score(weights: &SectorWeights, features: &[f64]) -> BTreeMap<Sector, f64> {
    Sector::ALL
        .iter()
        .map(|&sector| {
            let w = weights.weights.get(&sector);
            let b = weights.bias.get(&sector).copied().unwrap_or(0.0);
            let dot = match w {
                Some(w) => w.iter().zip(features.iter()).map(|(a, b)| a * b).sum::<f64>(),
                None => 0.0,
            };
            (sector, dot + b)
        })
        .collect()
}

/// A single labeled training example: the feature vector for some text and
/// the sector it was (eventually) confirmed to belong to.
pub struct LabeledExample {
    pub features: Vec<f64>,
    pub sector: Sector,
}

/// Train a fresh `SectorWeights` from scratch via one pass of perceptron-
/// style updates: for each example, nudge the true sector's weight vector
/// towards the feature vector and every other sector's weight vector away
/// from it, scaled by a small learning rate. Simple, deterministic, and
/// enough to beat the lexical fallback once `retrain_min_new_labels`
/// examples have accumulated.
pub fn train(examples: &[LabeledExample], learning_rate: f64) -> SectorWeights {
    let mut weights: BTreeMap<Sector, Vec<f64>> = Sector::ALL
        .iter()
        .map(|&s| (s, vec![0.0; FEATURE_DIM]))
        .collect();
    let mut bias: BTreeMap<Sector, f64> = Sector::ALL.iter().map(|&s| (s, 0.0)).collect();

    for example in examples {
        for &sector in Sector::ALL.iter() {
            let sign = if sector == example.sector { 1.0 } else { -1.0 };
            let w = weights.get_mut(&sector).expect("all sectors present");
            for (wi, fi) in w.iter_mut().zip(example.features.iter()) {
                *wi += learning_rate * sign * fi;
            }
            *bias.get_mut(&sector).expect("all sectors present") += learning_rate * sign * 0.01;
        }
    }

    SectorWeights {
        weights,
        bias,
        trained_on_labels: examples.len() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn training_on_one_label_biases_that_sector_highest_for_its_own_features() {
        let features = vec![1.0; FEATURE_DIM];
        let examples = vec![LabeledExample {
            features: features.clone(),
            sector: Sector::Emotional,
        }];
        let weights = train(&examples, 0.1);
        let scores = score(&weights, &features);
        let max_sector = *scores
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap()
            .0;
        assert_eq!(max_sector, Sector::Emotional);
    }

    #[test]
    fn untrained_weights_score_zero_everywhere() {
        let weights = SectorWeights {
            weights: BTreeMap::new(),
            bias: BTreeMap::new(),
            trained_on_labels: 0,
        };
        let scores = score(&weights, &vec![1.0; FEATURE_DIM]);
        assert!(scores.values().all(|&v| v == 0.0));
    }
}
