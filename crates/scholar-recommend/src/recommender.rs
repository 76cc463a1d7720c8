use serde::Serialize;
use tracing::{debug, error, info, warn};

use scholar_core::config::{RecommendSettings, Settings};
use scholar_core::error::{Error, Result};
use scholar_core::types::{Chunk, Neighbor, ScholarshipRecord};

use crate::pipeline::Pipeline;

enum State {
    Ready(Pipeline),
    NotReady(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub ready: bool,
    pub chunks_loaded: usize,
    pub embeddings_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Query front of the service. Either fully initialised or permanently
/// not ready; every query operation checks that first.
pub struct Recommender {
    state: State,
    settings: RecommendSettings,
}

impl Recommender {
    /// Builds the pipeline. Failure is recorded, not returned: the recommender
    /// comes up NotReady and reports the cause through [`Recommender::health`].
    pub fn initialize(settings: &Settings) -> Self {
        match Pipeline::build(settings) {
            Ok(pipeline) => {
                info!(chunks = pipeline.chunks().len(), "recommender ready");
                Self::from_pipeline(pipeline, settings.recommend.clone())
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "pipeline initialisation failed");
                Self::not_ready(format!("{e:#}"), settings.recommend.clone())
            }
        }
    }

    pub fn from_pipeline(pipeline: Pipeline, settings: RecommendSettings) -> Self {
        Self { state: State::Ready(pipeline), settings }
    }

    pub fn not_ready(reason: impl Into<String>, settings: RecommendSettings) -> Self {
        Self { state: State::NotReady(reason.into()), settings }
    }

    pub fn is_ready(&self) -> bool { matches!(self.state, State::Ready(_)) }

    fn pipeline(&self) -> Result<&Pipeline> {
        match &self.state {
            State::Ready(p) => Ok(p),
            State::NotReady(reason) => Err(Error::NotReady(reason.clone())),
        }
    }

    /// Top `top_n` scholarship records for a free-text query.
    ///
    /// Candidates without a detected title and without a relevance keyword are
    /// dropped. If that drops every candidate, all of them come back with the
    /// fallback score instead.
    pub fn recommend(&self, query: &str, top_n: usize) -> Result<Vec<ScholarshipRecord>> {
        let pipeline = self.pipeline()?;
        if top_n == 0 { return Ok(vec![]); }
        let k = self.settings.candidates.max(top_n + 1);
        let neighbors = pipeline.search(query, k).map_err(|e| Error::downstream(format!("{e:#}")))?;
        let metric = pipeline.index().metric();
        let extractor = pipeline.extractor();

        let mut kept = Vec::new();
        for n in &neighbors {
            let mut record = extractor.extract(&n.chunk.text);
            let relevant = !record.name.is_empty() || extractor.looks_relevant(&n.chunk.text);
            debug!(chunk = %n.chunk.id, distance = n.distance, relevant, "candidate");
            if relevant {
                record.similarity_score = Some(metric.similarity(n.distance));
                kept.push(record);
            }
        }

        if kept.is_empty() && !neighbors.is_empty() {
            warn!(candidates = neighbors.len(), query, "no candidate passed the relevance filter, using fallback");
            kept = neighbors
                .iter()
                .map(|n| ScholarshipRecord { similarity_score: Some(self.settings.fallback_score), ..extractor.extract(&n.chunk.text) })
                .collect();
        }
        kept.truncate(top_n);
        Ok(kept)
    }

    /// Raw nearest chunks without extraction or filtering.
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Neighbor>> {
        self.pipeline()?.search(query, k).map_err(|e| Error::downstream(format!("{e:#}")))
    }

    pub fn chunk(&self, index: usize) -> Result<&Chunk> {
        let pipeline = self.pipeline()?;
        pipeline
            .chunks()
            .get(index)
            .ok_or_else(|| Error::NotFound(format!("chunk {index} (corpus has {})", pipeline.chunks().len())))
    }

    pub fn health(&self) -> HealthStatus {
        match &self.state {
            State::Ready(p) => HealthStatus {
                ready: true,
                chunks_loaded: p.chunks().len(),
                embeddings_ready: !p.index().is_empty() && p.index().len() == p.chunks().len(),
                reason: None,
            },
            State::NotReady(reason) => HealthStatus {
                ready: false,
                chunks_loaded: 0,
                embeddings_ready: false,
                reason: Some(reason.clone()),
            },
        }
    }
}
