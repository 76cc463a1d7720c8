use anyhow::{bail, Result};
use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator, StringArray};
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use scholar_core::types::IndexEntry;

use crate::schema::build_arrow_schema;
use crate::table::{open_db, table_exists};

const BATCH_SIZE: usize = 1000;

/// Bulk loader for one chunk table. Creates the table on the first batch and
/// appends the rest.
pub struct LanceWriter {
	db: Connection,
	table_name: String,
	dim: i32,
	embedder_id: String,
}

/// Hex blake3 digest of a chunk's text, stored next to its vector.
pub fn content_hash(text: &str) -> String { blake3::hash(text.as_bytes()).to_hex().to_string() }

impl LanceWriter {
	pub async fn new(db_path: &Path, table_name: &str, dim: usize, embedder_id: &str) -> Result<Self> {
		let db = open_db(db_path.to_string_lossy().as_ref()).await?;
		Ok(Self { db, table_name: table_name.to_string(), dim: i32::try_from(dim)?, embedder_id: embedder_id.to_string() })
	}

	pub async fn write(&self, entries: &[IndexEntry]) -> Result<usize> {
		if entries.is_empty() { info!(table = %self.table_name, "no chunks to index"); return Ok(0); }
		if let Some(bad) = entries.iter().find(|e| e.vector.len() != self.dim as usize) {
			bail!("vector for chunk {} has dimension {}, expected {}", bad.chunk.id, bad.vector.len(), self.dim);
		}
		info!(table = %self.table_name, chunks = entries.len(), "writing chunks to LanceDB");
		let pb = ProgressBar::new(entries.len() as u64);
		pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")?.progress_chars("#>-"));
		let mut written = 0usize;
		for batch in entries.chunks(BATCH_SIZE) {
			self.insert_batch(batch).await?;
			written += batch.len();
			pb.set_position(written as u64);
		}
		pb.finish_with_message("indexed");
		info!(table = %self.table_name, chunks = written, "LanceDB indexing completed");
		Ok(written)
	}

	async fn insert_batch(&self, entries: &[IndexEntry]) -> Result<()> {
		let record_batch = self.entries_to_record_batch(entries)?; let schema = record_batch.schema();
		let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
		if table_exists(&self.db, &self.table_name).await? {
			self.db.open_table(&self.table_name).execute().await?.add(reader).execute().await?;
		} else {
			self.db.create_table(&self.table_name, reader).execute().await?;
		}
		Ok(())
	}

	fn entries_to_record_batch(&self, entries: &[IndexEntry]) -> Result<RecordBatch> {
		let schema = build_arrow_schema(self.dim);
		let mut ids = Vec::new(); let mut source_ids = Vec::new(); let mut source_paths = Vec::new(); let mut texts = Vec::new();
		let mut chunk_indices = Vec::new(); let mut total_chunks = Vec::new(); let mut hashes = Vec::new(); let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::new();
		for e in entries {
			let c = &e.chunk;
			ids.push(c.id.clone()); source_ids.push(c.source_id.clone()); source_paths.push(c.source_path.clone()); texts.push(c.text.clone());
			chunk_indices.push(i32::try_from(c.chunk_index)?); total_chunks.push(i32::try_from(c.total_chunks)?); hashes.push(content_hash(&c.text));
			vectors.push(Some(e.vector.iter().map(|&x| Some(x)).collect()));
		}
		let record_batch = RecordBatch::try_new(schema, vec![
			Arc::new(StringArray::from(ids)),
			Arc::new(StringArray::from(source_ids)),
			Arc::new(StringArray::from(source_paths)),
			Arc::new(StringArray::from(texts)),
			Arc::new(Int32Array::from(chunk_indices)),
			Arc::new(Int32Array::from(total_chunks)),
			Arc::new(StringArray::from(hashes)),
			Arc::new(StringArray::from(vec![self.embedder_id.clone(); entries.len()])),
			Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors.into_iter(), self.dim)),
		])?;
		Ok(record_batch)
	}
}
