//! 64-bit simhash for near-duplicate content detection (spec.md §3, §4.E,
//! §4.G). Not present in the sibling system (which dedupes on an exact
//! blake3 content hash); this is new code, grounded on the standard
//! token-shingle simhash construction and combined with blake3 for the
//! per-token hash so the dependency footprint doesn't grow.

/// Compute a 64-bit simhash fingerprint of `text`.
///
/// Tokenizes on whitespace, lowercases, hashes each token with blake3
/// (truncated to 64 bits), and accumulates a weighted bit-vector before
/// collapsing to the final fingerprint — the standard simhash recipe.
pub fn simhash64(text: &str) -> u64 {
    let mut weights = [0i64; 64];
    let mut any_token = false;

    for token in text.split_whitespace() {
        let normalized = token.to_lowercase();
        if normalized.is_empty() {
            continue;
        }
        any_token = true;
        let hash = token_hash64(&normalized);
        for (bit, weight) in weights.iter_mut().enumerate() {
            if (hash >> bit) & 1 == 1 {
                *weight += 1;
            } else {
                *weight -= 1;
            }
        }
    }

    if !any_token {
        return 0;
    }

    let mut result: u64 = 0;
    for (bit, weight) in weights.iter().enumerate() {
        if *weight > 0 {
            result |= 1 << bit;
        }
    }
    result
}

fn token_hash64(token: &str) -> u64 {
    let hash = blake3::hash(token.as_bytes());
    let bytes = hash.as_bytes();
    u64::from_le_bytes(bytes[0..8].try_into().expect("8-byte slice"))
}

/// Hamming distance between two 64-bit fingerprints.
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}
