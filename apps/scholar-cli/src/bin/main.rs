use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scholar_core::config::{expand_path, Config};
use scholar_core::types::ScholarshipRecord;
use scholar_recommend::catalog::DEFAULT_FILTER_LIMIT;
use scholar_recommend::{format_prompt, Catalog, CatalogFilter, Recommender};

#[derive(Parser)]
#[command(name = "scholar")]
#[command(about = "Scholarship recommendations over a local document corpus")]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "Output as JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Recommend scholarships for a free-text query")]
    Recommend {
        #[arg(help = "What the user is looking for")]
        query: String,

        #[arg(long, help = "Number of records to return (defaults to recommend.top_n)")]
        top_n: Option<usize>,
    },

    #[command(about = "Show the raw nearest chunks for a query")]
    Retrieve {
        query: String,

        #[arg(short, long, default_value = "4")]
        k: usize,
    },

    #[command(about = "Build a grounded-answer prompt from retrieved chunks")]
    Prompt {
        question: String,

        #[arg(short, long, default_value = "4")]
        k: usize,
    },

    #[command(about = "Print one indexed chunk")]
    Chunk {
        index: usize,
    },

    #[command(about = "Report pipeline readiness")]
    Health,

    #[command(about = "Filter the structured scholarship catalog")]
    Filter {
        #[arg(long, default_value = "")]
        field: String,

        #[arg(long, default_value = "")]
        level: String,

        #[arg(long, default_value = "")]
        category: String,

        #[arg(long, default_value = "")]
        region: String,

        #[arg(long, help = "Catalog JSON file (defaults to data.catalog_path)")]
        catalog: Option<PathBuf>,

        #[arg(long, default_value_t = DEFAULT_FILTER_LIMIT)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {e}"); e })?;
    let settings = config.settings()?;

    match cli.command {
        Commands::Filter { field, level, category, region, catalog, limit } => {
            let path = catalog.unwrap_or_else(|| expand_path(&settings.data.catalog_path));
            run_filter(&path, &CatalogFilter { field, level, category, region }, limit, cli.json)
        }
        command => run_query(command, &Recommender::initialize(&settings), settings.recommend.top_n, cli.json),
    }
}

fn run_filter(path: &Path, filter: &CatalogFilter, limit: usize, json: bool) -> Result<()> {
    let hits = Catalog::load(path)?.filter(filter, limit);
    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else if hits.is_empty() {
        println!("No matching scholarships");
    } else {
        for h in &hits { println!("{} | {} | {} | {} | {}", h.name, h.category, h.region, h.amount, h.eligibility); }
    }
    Ok(())
}

fn run_query(command: Commands, recommender: &Recommender, default_top_n: usize, json: bool) -> Result<()> {
    match command {
        Commands::Recommend { query, top_n } => {
            let records = recommender.recommend(&query, top_n.unwrap_or(default_top_n))?;
            if json { println!("{}", serde_json::to_string_pretty(&records)?); } else { print_records(&records); }
        }
        Commands::Retrieve { query, k } => {
            let neighbors = recommender.retrieve(&query, k)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&neighbors)?);
            } else {
                for (i, n) in neighbors.iter().enumerate() {
                    println!("{}. [{}] distance={:.4}\n{}\n", i + 1, n.chunk.id, n.distance, n.chunk.text);
                }
            }
        }
        Commands::Prompt { question, k } => {
            let neighbors = recommender.retrieve(&question, k)?;
            println!("{}", format_prompt(&neighbors, &question));
        }
        Commands::Chunk { index } => {
            let chunk = recommender.chunk(index)?;
            if json { println!("{}", serde_json::to_string_pretty(chunk)?); } else { println!("[{}] {}\n{}", chunk.id, chunk.source_path, chunk.text); }
        }
        Commands::Health => {
            let health = recommender.health();
            if json {
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                println!("ready: {}\nchunks loaded: {}\nembeddings ready: {}", health.ready, health.chunks_loaded, health.embeddings_ready);
                if let Some(reason) = health.reason { println!("reason: {reason}"); }
            }
        }
        Commands::Filter { .. } => {}
    }
    Ok(())
}

fn print_records(records: &[ScholarshipRecord]) {
    if records.is_empty() { println!("No results"); return; }
    for (i, r) in records.iter().enumerate() {
        let name = if r.name.is_empty() { "(untitled)" } else { r.name.as_str() };
        println!("{}. {} [{}]", i + 1, name, r.category);
        if r.amount > 0.0 { println!("   amount: {:.2}", r.amount); }
        if !r.eligibility.is_empty() { println!("   eligibility: {}", r.eligibility); }
        if let Some(score) = r.similarity_score { println!("   score: {score:.3}"); }
        println!("   {}", r.source_text);
    }
}
