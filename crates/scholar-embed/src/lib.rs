//! Text embedders for the scholarship index.
//!
//! `MiniLmEmbedder` runs all-MiniLM-L6-v2 through candle; `FakeEmbedder` is a
//! hashing stand-in selected with `APP_USE_FAKE_EMBEDDINGS=1` or
//! `embedding.use_fake = true`.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use scholar_core::config::{expand_path, EmbeddingSettings};
use scholar_core::traits::Embedder;

pub mod device;
pub mod fake;
pub mod minilm;
pub mod pool;
pub mod tokenize;

pub use fake::FakeEmbedder;
pub use minilm::MiniLmEmbedder;
pub use pool::masked_mean_l2;

pub fn load_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    if settings.use_fake || fake_requested() {
        info!(dim = settings.dimension, "using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(settings.dimension)));
    }
    let model_dir = resolve_model_dir(settings.model_dir.as_deref())?;
    let embedder = MiniLmEmbedder::new(&model_dir, settings.max_len, settings.batch_size)?;
    if embedder.dim() != settings.dimension {
        return Err(anyhow!(
            "model dimension {} does not match embedding.dimension {}",
            embedder.dim(),
            settings.dimension
        ));
    }
    Ok(Box::new(embedder))
}

fn fake_requested() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn resolve_model_dir(configured: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = configured {
        let p = expand_path(dir);
        if p.exists() { info!(dir = %p.display(), "using configured model dir"); return Ok(p); }
        return Err(anyhow!("Configured model directory {} does not exist", p.display()));
    }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = expand_path(&dir);
            if p.exists() { info!(dir = %p.display(), "using {var}"); return Ok(p); }
        }
    }
    let local = Path::new("models/all-MiniLM-L6-v2");
    if local.exists() { info!(dir = %local.display(), "using model dir"); return Ok(local.to_path_buf()); }
    Err(anyhow!("Could not locate all-MiniLM-L6-v2 model directory"))
}
