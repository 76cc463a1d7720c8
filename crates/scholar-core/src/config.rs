//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nested keys, e.g. `APP_INDEX__BACKEND=lance`).
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::Error;
use crate::extract::ExtractionRules;
use crate::segment::SegmentMode;
use crate::types::Metric;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    /// Wraps an already assembled figment (tests, embedding in other tools).
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))
    }
}

/// Typed view over the whole configuration tree. Every section has defaults,
/// so an empty config yields a working in-memory deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub segment: SegmentSettings,
    pub embedding: EmbeddingSettings,
    pub index: IndexSettings,
    pub recommend: RecommendSettings,
    pub extraction: ExtractionRules,
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        if self.recommend.top_n == 0 {
            return Err(Error::InvalidConfig("recommend.top_n must be greater than 0".into()));
        }
        if !(0.0..=1.0).contains(&self.recommend.fallback_score) {
            return Err(Error::InvalidConfig("recommend.fallback_score must be within [0, 1]".into()));
        }
        if self.embedding.dimension == 0 {
            return Err(Error::InvalidConfig("embedding.dimension must be greater than 0".into()));
        }
        crate::segment::Segmenter::from_settings(&self.segment).map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Directory (or single file) of pre-extracted document text.
    pub corpus_dir: String,
    /// JSON catalog of structured scholarships for the field filter.
    pub catalog_path: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self { corpus_dir: "data/txt".to_string(), catalog_path: "data/scholarships.json".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentSettings {
    pub mode: SegmentMode,
    pub max_chars: usize,
    pub window_words: usize,
    pub overlap_words: usize,
}

impl Default for SegmentSettings {
    fn default() -> Self {
        Self { mode: SegmentMode::Paragraph, max_chars: 500, window_words: 300, overlap_words: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub model_dir: Option<String>,
    pub use_fake: bool,
    pub dimension: usize,
    pub max_len: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { model_dir: None, use_fake: false, dimension: 384, max_len: 256, batch_size: 32 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    #[default]
    Memory,
    Lance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub backend: IndexBackend,
    pub metric: Metric,
    pub lancedb_dir: String,
    pub table: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            backend: IndexBackend::Memory,
            metric: Metric::L2,
            lancedb_dir: "data/indexes/lancedb".to_string(),
            table: "scholarship_chunks".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendSettings {
    pub top_n: usize,
    /// Candidates fetched before filtering; raised to `top_n + 1` if smaller.
    pub candidates: usize,
    /// Score assigned to every record when the keyword filter keeps nothing.
    pub fallback_score: f32,
}

impl Default for RecommendSettings {
    fn default() -> Self {
        Self { top_n: 3, candidates: 5, fallback_score: 0.5 }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
