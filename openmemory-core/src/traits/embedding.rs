use std::collections::BTreeMap;

use crate::errors::OpenMemoryResult;
use crate::sector::Sector;

/// Result of an `embed`/`embed_batch` call: one vector per requested
/// sector, L2-normalized, plus provenance so the core can mark a
/// synthetic-fallback result in its own returned metadata (spec.md §4.C).
#[derive(Debug, Clone)]
pub struct EmbedResult {
    pub vectors: BTreeMap<Sector, Vec<f32>>,
    pub provider: String,
    pub fallback_used: bool,
}

/// The embedder interface the core invokes to turn text into one vector
/// per requested sector (spec.md §4.C). Implementations are synchronous;
/// the core wraps calls with its own retry/backoff and deadline policy
/// (spec.md §4.C, §5) rather than pushing that concern into every
/// provider.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str, sectors: &[Sector]) -> OpenMemoryResult<EmbedResult>;

    /// Batch embedding. The default falls back to one `embed` call per
    /// item, matching spec.md §4.C ("if unsupported, the core falls back
    /// to per-item calls").
    fn embed_batch(
        &self,
        texts: &[String],
        sectors: &[Sector],
    ) -> OpenMemoryResult<Vec<EmbedResult>> {
        texts.iter().map(|t| self.embed(t, sectors)).collect()
    }

    fn dimensions(&self) -> usize;

    fn name(&self) -> &str;

    fn is_available(&self) -> bool;
}
