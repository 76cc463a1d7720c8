use anyhow::{anyhow, bail, Result};
use arrow_array::{Array, Float32Array, Int32Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::{DistanceType, Table};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use scholar_core::traits::VectorIndex;
use scholar_core::types::{Chunk, IndexEntry, Metric, Neighbor};

use crate::table::{open_db, table_exists};
use crate::writer::{content_hash, LanceWriter};

/// Persistent chunk index on a LanceDB table.
///
/// The handle owns its own runtime so the synchronous [`VectorIndex`] calls can
/// drive LanceDB's async API. Do not construct or drop it inside another tokio
/// runtime.
pub struct LanceIndex {
	table: Option<Table>,
	table_name: String,
	metric: Metric,
	dim: usize,
	rows: usize,
	// dropped last, after the table handle
	rt: Runtime,
}

impl LanceIndex {
	/// Replaces whatever is at `db_path` with a fresh table holding `entries`,
	/// tagged with `embedder_id` and each chunk's content hash.
	pub fn build(db_path: &Path, table_name: &str, entries: &[IndexEntry], metric: Metric, dim: usize, embedder_id: &str) -> Result<Self> {
		let rt = Runtime::new()?;
		if db_path.exists() { std::fs::remove_dir_all(db_path)?; }
		std::fs::create_dir_all(db_path)?;
		let written = rt.block_on(async {
			let writer = LanceWriter::new(db_path, table_name, dim, embedder_id).await?;
			writer.write(entries).await
		})?;
		info!(path = %db_path.display(), table = table_name, rows = written, "LanceDB index built");
		Self::open_with(rt, db_path, table_name, metric, dim)
	}

	/// Opens an existing table. A missing table opens as an empty index.
	pub fn open(db_path: &Path, table_name: &str, metric: Metric, dim: usize) -> Result<Self> {
		Self::open_with(Runtime::new()?, db_path, table_name, metric, dim)
	}

	fn open_with(rt: Runtime, db_path: &Path, table_name: &str, metric: Metric, dim: usize) -> Result<Self> {
		let uri = db_path.to_string_lossy().to_string();
		if !db_path.exists() {
			debug!(path = %uri, "no LanceDB directory, opening empty index");
			return Ok(Self { table: None, table_name: table_name.to_string(), metric, dim, rows: 0, rt });
		}
		let (table, rows) = rt.block_on(async {
			let db = open_db(&uri).await?;
			if !table_exists(&db, table_name).await? { return Ok::<_, anyhow::Error>((None, 0)); }
			let table = db.open_table(table_name).execute().await?;
			let rows = table.count_rows(None).await?;
			Ok((Some(table), rows))
		})?;
		debug!(path = %uri, table = table_name, rows, "LanceDB index opened");
		Ok(Self { table, table_name: table_name.to_string(), metric, dim, rows, rt })
	}

	pub fn table_name(&self) -> &str { &self.table_name }

	/// True when the table holds exactly `chunks` (same ids, same text) embedded
	/// by `embedder_id`. Anything else means the table is stale.
	pub fn is_current(&self, chunks: &[Chunk], embedder_id: &str) -> Result<bool> {
		let Some(table) = self.table.as_ref() else { return Ok(false) };
		if self.rows != chunks.len() || chunks.is_empty() { return Ok(false); }
		let stored = self.rt.block_on(async {
			let mut stream = table.query().select(Select::columns(&["id", "content_hash", "embedder_id"])).execute().await?;
			let mut stored: HashMap<String, (String, String)> = HashMap::with_capacity(self.rows);
			while let Some(batch) = TryStreamExt::try_next(&mut stream).await? {
				let ids = string_col(&batch, "id")?; let hashes = string_col(&batch, "content_hash")?; let eids = string_col(&batch, "embedder_id")?;
				for i in 0..batch.num_rows() {
					stored.insert(ids.value(i).to_string(), (hashes.value(i).to_string(), eids.value(i).to_string()));
				}
			}
			Ok::<_, anyhow::Error>(stored)
		})?;
		let current = stored.len() == chunks.len()
			&& chunks.iter().all(|c| stored.get(&c.id).is_some_and(|(hash, eid)| eid == embedder_id && *hash == content_hash(&c.text)));
		debug!(table = %self.table_name, current, "checked LanceDB table against corpus");
		Ok(current)
	}

	fn distance_type(&self) -> DistanceType {
		match self.metric { Metric::L2 => DistanceType::L2, Metric::Cosine => DistanceType::Cosine }
	}
}

impl VectorIndex for LanceIndex {
	fn metric(&self) -> Metric { self.metric }
	fn dim(&self) -> usize { self.dim }
	fn len(&self) -> usize { self.rows }

	fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
		let Some(table) = self.table.as_ref() else { return Ok(vec![]) };
		if self.rows == 0 || k == 0 { return Ok(vec![]); }
		if query.len() != self.dim { bail!("query has dimension {}, index has {}", query.len(), self.dim); }
		let mut neighbors = self.rt.block_on(async {
			let mut stream = table.vector_search(query.to_vec())?.distance_type(self.distance_type()).limit(k).execute().await?;
			let mut out = Vec::new();
			while let Some(batch) = TryStreamExt::try_next(&mut stream).await? { read_neighbors(&batch, &mut out)?; }
			Ok::<_, anyhow::Error>(out)
		})?;
		neighbors.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
		neighbors.truncate(k);
		Ok(neighbors)
	}
}

fn read_neighbors(batch: &RecordBatch, out: &mut Vec<Neighbor>) -> Result<()> {
	let ids = string_col(batch, "id")?; let source_ids = string_col(batch, "source_id")?;
	let source_paths = string_col(batch, "source_path")?; let texts = string_col(batch, "text")?;
	let chunk_indices = int_col(batch, "chunk_index")?; let totals = int_col(batch, "total_chunks")?;
	let distances = batch.column_by_name("_distance").and_then(|c| c.as_any().downcast_ref::<Float32Array>()).ok_or_else(|| anyhow!("search result has no _distance column"))?;
	for i in 0..batch.num_rows() {
		let chunk = Chunk {
			id: ids.value(i).to_string(),
			source_id: source_ids.value(i).to_string(),
			source_path: source_paths.value(i).to_string(),
			text: texts.value(i).to_string(),
			chunk_index: usize::try_from(chunk_indices.value(i))?,
			total_chunks: usize::try_from(totals.value(i))?,
		};
		let distance = if distances.is_null(i) { f32::INFINITY } else { distances.value(i) };
		out.push(Neighbor { chunk, distance });
	}
	Ok(())
}

fn string_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
	batch.column_by_name(name).and_then(|c| c.as_any().downcast_ref::<StringArray>()).ok_or_else(|| anyhow!("search result has no string column {name}"))
}

fn int_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Int32Array> {
	batch.column_by_name(name).and_then(|c| c.as_any().downcast_ref::<Int32Array>()).ok_or_else(|| anyhow!("search result has no int column {name}"))
}
