use crate::types::{Metric, Neighbor};

pub trait Embedder: Send + Sync {
    /// Identifies the model and its output space; vectors from embedders with
    /// different ids are not comparable.
    fn model_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    /// Embeds `texts` in order; output length equals input length.
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }
}

/// Read-only nearest-neighbour index, immutable once built.
pub trait VectorIndex: Send + Sync {
    fn metric(&self) -> Metric;
    fn dim(&self) -> usize;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool { self.len() == 0 }
    /// At most `k` neighbours, nearest first. Never more than `len()`.
    fn search(&self, query: &[f32], k: usize) -> anyhow::Result<Vec<Neighbor>>;
}
