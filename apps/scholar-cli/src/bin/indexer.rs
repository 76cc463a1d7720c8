use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scholar_core::config::{expand_path, Config};
use scholar_core::corpus::CorpusLoader;
use scholar_core::segment::Segmenter;
use scholar_core::traits::VectorIndex;
use scholar_embed::load_embedder;
use scholar_recommend::embed_chunks;
use scholar_vector::LanceIndex;

#[derive(Parser)]
#[command(name = "scholar-indexer")]
#[command(about = "Chunk, embed and write the corpus into the LanceDB index")]
struct Args {
    #[arg(help = "Corpus directory or file (defaults to data.corpus_dir)")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "Only index the first N chunks")]
    limit: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {e}"); e })?;
    let settings = config.settings()?;

    let data_dir = args.data_dir.unwrap_or_else(|| expand_path(&settings.data.corpus_dir));
    let lancedb_path = expand_path(&settings.index.lancedb_dir);
    info!(data = %data_dir.display(), lancedb = %lancedb_path.display(), "starting indexer");

    let segmenter = Segmenter::from_settings(&settings.segment)?;
    let mut chunks = CorpusLoader::new(segmenter).load(&data_dir)?;
    if let Some(limit) = args.limit {
        info!(limit, "limiting indexed chunks");
        chunks.truncate(limit);
    }

    let embedder = load_embedder(&settings.embedding)?;
    let entries = embed_chunks(embedder.as_ref(), &chunks, settings.embedding.batch_size)?;
    let index = LanceIndex::build(&lancedb_path, &settings.index.table, &entries, settings.index.metric, embedder.dim(), embedder.model_id())?;

    println!("Indexed {} chunks into {} ({})", index.len(), lancedb_path.display(), index.table_name());
    Ok(())
}
