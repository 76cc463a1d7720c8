use anyhow::{bail, Result};
use tracing::info;

use scholar_core::config::{expand_path, IndexBackend, Settings};
use scholar_core::corpus::CorpusLoader;
use scholar_core::extract::FieldExtractor;
use scholar_core::segment::Segmenter;
use scholar_core::traits::{Embedder, VectorIndex};
use scholar_core::types::{Chunk, IndexEntry, Neighbor};
use scholar_embed::load_embedder;
use scholar_vector::{FlatIndex, LanceIndex};

/// Everything a query needs, assembled once at startup and read-only after.
pub struct Pipeline {
    chunks: Vec<Chunk>,
    embedder: Box<dyn Embedder>,
    index: Box<dyn VectorIndex>,
    extractor: FieldExtractor,
}

impl Pipeline {
    /// Loads the corpus, the embedder and the configured index backend.
    ///
    /// A corpus that yields no chunks is an error. With the `lance` backend an
    /// existing table is reused only when every stored chunk id, content hash and
    /// embedder id matches the corpus; otherwise it is rebuilt from scratch.
    pub fn build(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let segmenter = Segmenter::from_settings(&settings.segment)?;
        let extractor = FieldExtractor::new(settings.extraction.clone())?;
        let corpus = expand_path(&settings.data.corpus_dir);
        let chunks = CorpusLoader::new(segmenter).load(&corpus)?;
        if chunks.is_empty() { bail!("corpus {} produced no chunks", corpus.display()); }
        info!(corpus = %corpus.display(), chunks = chunks.len(), "corpus loaded");

        let embedder = load_embedder(&settings.embedding)?;
        let metric = settings.index.metric;
        let index: Box<dyn VectorIndex> = match settings.index.backend {
            IndexBackend::Memory => {
                let entries = embed_chunks(embedder.as_ref(), &chunks, settings.embedding.batch_size)?;
                Box::new(FlatIndex::build(entries, metric)?)
            }
            IndexBackend::Lance => {
                let db_path = expand_path(&settings.index.lancedb_dir);
                let table = settings.index.table.as_str();
                let existing = LanceIndex::open(&db_path, table, metric, embedder.dim())?;
                if existing.is_current(&chunks, embedder.model_id())? {
                    info!(path = %db_path.display(), rows = existing.len(), "reusing LanceDB table");
                    Box::new(existing)
                } else {
                    info!(path = %db_path.display(), rows = existing.len(), "LanceDB table is stale, rebuilding");
                    drop(existing);
                    let entries = embed_chunks(embedder.as_ref(), &chunks, settings.embedding.batch_size)?;
                    Box::new(LanceIndex::build(&db_path, table, &entries, metric, embedder.dim(), embedder.model_id())?)
                }
            }
        };
        info!(backend = ?settings.index.backend, ?metric, entries = index.len(), "index ready");
        Ok(Self::from_parts(chunks, embedder, index, extractor))
    }

    pub fn from_parts(chunks: Vec<Chunk>, embedder: Box<dyn Embedder>, index: Box<dyn VectorIndex>, extractor: FieldExtractor) -> Self {
        Self { chunks, embedder, index, extractor }
    }

    pub fn chunks(&self) -> &[Chunk] { &self.chunks }
    pub fn embedder(&self) -> &dyn Embedder { self.embedder.as_ref() }
    pub fn index(&self) -> &dyn VectorIndex { self.index.as_ref() }
    pub fn extractor(&self) -> &FieldExtractor { &self.extractor }

    /// Embeds `query` and returns up to `k` nearest chunks.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<Neighbor>> {
        let vector = self.embedder.embed(query)?;
        self.index.search(&vector, k)
    }
}

/// Embeds chunk texts in groups of `batch_size`, pairing each vector with its chunk.
pub fn embed_chunks(embedder: &dyn Embedder, chunks: &[Chunk], batch_size: usize) -> Result<Vec<IndexEntry>> {
    let mut entries = Vec::with_capacity(chunks.len());
    for group in chunks.chunks(batch_size.max(1)) {
        let texts: Vec<String> = group.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts)?;
        if vectors.len() != group.len() {
            bail!("embedder returned {} vectors for {} texts", vectors.len(), group.len());
        }
        entries.extend(group.iter().cloned().zip(vectors).map(|(chunk, vector)| IndexEntry { chunk, vector }));
    }
    info!(chunks = entries.len(), "chunks embedded");
    Ok(entries)
}
