use anyhow::{bail, Result};
use std::cmp::Ordering;

use scholar_core::traits::VectorIndex;
use scholar_core::types::{IndexEntry, Metric, Neighbor};

/// Exhaustive in-memory index. Bulk-loaded once, then read-only.
pub struct FlatIndex {
    entries: Vec<IndexEntry>,
    metric: Metric,
    dim: usize,
}

impl FlatIndex {
    /// All vectors must share one dimension. An empty build is allowed and
    /// answers every query with no results.
    pub fn build(entries: Vec<IndexEntry>, metric: Metric) -> Result<Self> {
        let dim = entries.first().map_or(0, |e| e.vector.len());
        if let Some(bad) = entries.iter().find(|e| e.vector.len() != dim) {
            bail!("vector for chunk {} has dimension {}, expected {}", bad.chunk.id, bad.vector.len(), dim);
        }
        Ok(Self { entries, metric, dim })
    }
}

impl VectorIndex for FlatIndex {
    fn metric(&self) -> Metric { self.metric }
    fn dim(&self) -> usize { self.dim }
    fn len(&self) -> usize { self.entries.len() }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if self.entries.is_empty() || k == 0 { return Ok(vec![]); }
        if query.len() != self.dim {
            bail!("query has dimension {}, index has {}", query.len(), self.dim);
        }
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, self.metric.distance(query, &e.vector)))
            .collect();
        // stable sort keeps insertion order among equal distances
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        Ok(scored
            .into_iter()
            .map(|(i, distance)| Neighbor { chunk: self.entries[i].chunk.clone(), distance })
            .collect())
    }
}
