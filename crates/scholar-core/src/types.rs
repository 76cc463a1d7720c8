//! Domain types shared by the segmenter, embedders, indexes and recommender.

use serde::{Deserialize, Serialize};

pub type ChunkId = String;

/// A contiguous span of one source document that is embedded and indexed.
///
/// - `id`: `"<source_id>:<chunk_index>"`, unique within a corpus
/// - `source_id`: stable document identity (file stem)
/// - `source_path`: original path to the source text
/// - `text`: the chunk payload
/// - `chunk_index`/`total_chunks`: position within the parent document
///
/// Chunks are never edited in place; a corpus change means re-chunking and
/// re-embedding everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub source_id: String,
    pub source_path: String,
    pub text: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

/// Distance metric, fixed per deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Squared Euclidean distance.
    #[default]
    L2,
    /// `1 - cosine_similarity`.
    Cosine,
}

impl Metric {
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::L2 => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
            Self::Cosine => {
                let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if na == 0.0 || nb == 0.0 { return 1.0; }
                1.0 - dot / (na * nb)
            }
        }
    }

    /// Presentation score derived from a distance. Higher is better.
    ///
    /// L2 maps distance 0 to 1.0 and decreases strictly as distance grows.
    pub fn similarity(self, distance: f32) -> f32 {
        match self {
            Self::L2 => 1.0 / (1.0 + distance),
            Self::Cosine => 1.0 - distance,
        }
    }
}

/// A chunk paired with its vector, as handed to an index at build time.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// One search result. `distance` is in the index's metric; lower is nearer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neighbor {
    pub chunk: Chunk,
    pub distance: f32,
}

/// Structured, best-effort view of a chunk. Computed per query, never stored.
///
/// Every field is a hint: `amount` stays 0.0 when no currency pattern matched
/// and `name` stays empty when no title-like line was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarshipRecord {
    pub name: String,
    pub eligibility: String,
    pub amount: f64,
    pub category: String,
    pub source_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_similarity_is_one_at_zero_and_decreasing() {
        assert!((Metric::L2.similarity(0.0) - 1.0).abs() < f32::EPSILON);
        assert!(Metric::L2.similarity(0.5) > Metric::L2.similarity(2.0));
    }

    #[test]
    fn cosine_distance_of_parallel_vectors_is_zero() {
        let d = Metric::Cosine.distance(&[1.0, 2.0], &[2.0, 4.0]);
        assert!(d.abs() < 1e-6);
        assert!((Metric::Cosine.distance(&[0.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn l2_distance_is_squared() {
        assert!((Metric::L2.distance(&[0.0, 0.0], &[3.0, 4.0]) - 25.0).abs() < 1e-6);
    }
}
