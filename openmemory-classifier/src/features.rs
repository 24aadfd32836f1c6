//! Fixed-size lexical feature extraction shared by the rule-based scorer
//! and the learned linear model (spec.md §4.D). One feature per sector's
//! keyword bucket plus three structural features (token count, question
//! mark present, first-person pronoun present) — small and fast enough to
//! run on every `add`/`query` without a cache.

use openmemory_core::sector::Sector;

/// Number of features the learned model's weight vectors are sized for.
/// `Sector::COUNT` keyword-bucket counts + 3 structural features.
pub const FEATURE_DIM: usize = Sector::COUNT + 3;

/// Extract a deterministic feature vector from `text`. Same input always
/// produces the same output (spec.md §4.D: "deterministic for identical
/// inputs").
pub fn extract_features(text: &str) -> Vec<f64> {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();
    let token_count = tokens.len().max(1) as f64;

    let mut features = Vec::with_capacity(FEATURE_DIM);
    for &sector in Sector::ALL.iter() {
        let hits = keyword_hits(&tokens, sector);
        features.push(hits as f64 / token_count);
    }
    features.push(token_count.ln_1p());
    features.push(if text.trim_end().ends_with('?') { 1.0 } else { 0.0 });
    features.push(if contains_any(&tokens, &["i", "me", "my", "myself"]) {
        1.0
    } else {
        0.0
    });
    features
}

fn keyword_hits(tokens: &[&str], sector: Sector) -> usize {
    let keywords = keywords_for(sector);
    tokens.iter().filter(|t| keywords.contains(t)).count()
}

fn contains_any(tokens: &[&str], needles: &[&str]) -> bool {
    tokens.iter().any(|t| needles.contains(t))
}

/// Lexical keyword buckets, one per sector (spec.md §4.D fallback rule
/// set). Deliberately small and hand-curated rather than learned; the
/// per-tenant linear model is what improves on this over time.
fn keywords_for(sector: Sector) -> &'static [&'static str] {
    match sector {
        Sector::Semantic => &[
            "fact", "facts", "definition", "concept", "knowledge", "means", "is", "are",
            "capital", "formula", "theorem", "rule", "exam", "study", "studied", "learned",
            "language", "history", "science",
        ],
        Sector::Episodic => &[
            "yesterday", "today", "tomorrow", "before", "after", "then", "when", "happened",
            "remember", "ago", "last", "during", "went", "visited", "met", "saw", "arrived",
        ],
        Sector::Procedural => &[
            "how", "step", "steps", "first", "next", "finally", "procedure", "instructions",
            "recipe", "install", "configure", "build", "run", "deploy", "algorithm", "process",
        ],
        Sector::Emotional => &[
            "felt", "feel", "feeling", "anxious", "happy", "sad", "love", "afraid", "scared",
            "angry", "excited", "nervous", "worried", "joy", "fear", "grateful", "proud",
        ],
        Sector::Reflective => &[
            "realized", "reflect", "reflecting", "insight", "understand", "understood", "why",
            "lesson", "learned", "growth", "mistake", "pattern", "meaning", "perspective",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_vector_has_fixed_dimension() {
        assert_eq!(extract_features("hello world").len(), FEATURE_DIM);
        assert_eq!(extract_features("").len(), FEATURE_DIM);
    }

    #[test]
    fn deterministic_for_identical_input() {
        let a = extract_features("I felt anxious before the exam");
        let b = extract_features("I felt anxious before the exam");
        assert_eq!(a, b);
    }

    #[test]
    fn emotional_keywords_score_the_emotional_bucket_highest() {
        let features = extract_features("I felt anxious and afraid");
        let emotional_idx = Sector::ALL.iter().position(|&s| s == Sector::Emotional).unwrap();
        let max_idx = (0..Sector::COUNT)
            .max_by(|&a, &b| features[a].partial_cmp(&features[b]).unwrap())
            .unwrap();
        assert_eq!(max_idx, emotional_idx);
    }
}
