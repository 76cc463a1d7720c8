//! Retrieval orchestration: corpus -> embeddings -> index -> filtered records.

pub mod catalog;
pub mod pipeline;
pub mod prompt;
pub mod recommender;

pub use catalog::{Catalog, CatalogEntry, CatalogFilter};
pub use pipeline::{embed_chunks, Pipeline};
pub use prompt::format_prompt;
pub use recommender::{HealthStatus, Recommender};
