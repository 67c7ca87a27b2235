//! CLI interface for the vector database

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use sorted_vectordb::catalog::{load_catalog, load_prompts};
use sorted_vectordb::report::{OutputFormat, Report};
use sorted_vectordb::{Metric, QueryOptions, StoreConfig, Vector, VectorDb};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sorted-vectordb")]
#[command(about = "Rank catalog entries against pre-computed embeddings", long_about = None)]
struct Cli {
    /// JSON store configuration; flags below override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Distance metric
    #[arg(long, value_enum, global = true, env = "VECTORDB_METRIC")]
    metric: Option<Metric>,

    /// Largest partition scored on a single thread
    #[arg(long, global = true, env = "VECTORDB_PARTITION_THRESHOLD")]
    partition_threshold: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every prompt and report how often the expected entry ranks first
    Report {
        /// Catalog JSON file
        catalog: PathBuf,
        /// Prompt JSON file
        prompts: PathBuf,
        /// Number of results shown per prompt
        #[arg(short, long, default_value = "10")]
        k: usize,
        /// Output format
        #[arg(long, value_enum, ignore_case = true, default_value = "text", env = "output")]
        format: OutputFormat,
    },
    /// Query the catalog with a single vector
    Query {
        /// Catalog JSON file
        catalog: PathBuf,
        /// Query vector as comma-separated values (e.g., "1.0,2.0,3.0")
        vector: String,
        /// Number of results to return
        #[arg(short, long, default_value = "5")]
        k: usize,
        /// Inclusive score cutoff in the metric's direction
        #[arg(long)]
        min_score: Option<f32>,
    },
    /// Load the catalog and print store statistics
    Stats {
        /// Catalog JSON file
        catalog: PathBuf,
    },
}

impl Cli {
    fn store_config(&self) -> Result<StoreConfig> {
        let mut config = match &self.config {
            Some(path) => StoreConfig::from_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => StoreConfig::default(),
        };
        if let Some(metric) = self.metric {
            config.metric = metric;
        }
        if let Some(threshold) = self.partition_threshold {
            config.partition_threshold = threshold;
        }
        Ok(config.validated())
    }
}

fn open_store(config: StoreConfig, catalog: &Path) -> Result<VectorDb<Value>> {
    let start = Instant::now();
    let entries = load_catalog(catalog)
        .with_context(|| format!("loading catalog {}", catalog.display()))?;
    let db = VectorDb::from_config(config);
    db.upsert_all(entries);
    tracing::info!(
        entries = db.len(),
        metric = ?config.metric,
        elapsed = ?start.elapsed(),
        "store ready"
    );
    Ok(db)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.store_config()?;

    match cli.command {
        Commands::Report {
            catalog,
            prompts,
            k,
            format,
        } => {
            let db = open_store(config, &catalog)?;
            let prompts = load_prompts(&prompts)
                .with_context(|| format!("loading prompts {}", prompts.display()))?;
            let report = Report::run(&db, &prompts, k)?;
            print!("{}", report.render(format));
        }
        Commands::Query {
            catalog,
            vector,
            k,
            min_score,
        } => {
            let db = open_store(config, &catalog)?;
            let query: Vector = vector.parse()?;
            let mut options = QueryOptions::top_k(k);
            options.minimum_score = min_score;
            let results = db.query(query.as_slice(), &options)?;

            if results.is_empty() {
                println!("No results found");
            } else {
                println!("Top {} results:", results.len());
                for (i, result) in results.iter().enumerate() {
                    println!("{}. {} (score: {:.6})", i + 1, result.entry.id, result.score);
                }
            }
        }
        Commands::Stats { catalog } => {
            let db = open_store(config, &catalog)?;
            println!("Entries: {}", db.len());
            match db.dimension() {
                Some(dim) => println!("Dimension: {}", dim),
                None => println!("Dimension: (empty store)"),
            }
            println!("Metric: {:?}", config.metric);
            println!("Partition threshold: {}", db.partition_threshold());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_format(args: &[&str]) -> OutputFormat {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Report { format, .. } => format,
            _ => panic!("expected the report subcommand"),
        }
    }

    #[test]
    fn test_report_format_ignores_case() {
        let base = ["sorted-vectordb", "report", "catalog.json", "prompts.json", "--format"];
        for value in ["md", "MD", "Markdown", "MARKDOWN"] {
            let args: Vec<&str> = base.iter().copied().chain([value]).collect();
            assert_eq!(report_format(&args), OutputFormat::Markdown, "{}", value);
        }
        let args: Vec<&str> = base.iter().copied().chain(["Text"]).collect();
        assert_eq!(report_format(&args), OutputFormat::Text);
    }

    #[test]
    fn test_flags_override_config_defaults() {
        let cli = Cli::try_parse_from([
            "sorted-vectordb",
            "--metric",
            "dot",
            "--partition-threshold",
            "0",
            "stats",
            "catalog.json",
        ])
        .unwrap();
        let config = cli.store_config().unwrap();
        assert_eq!(config.metric, Metric::Dot);
        assert_eq!(config.partition_threshold, 1);
    }
}
