use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use hashrank::{MetaBoost, RankerConfig};
use hashrank_cli::{doc_meta_json, index_info, open_ranker, scores, search};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "hashrank")]
#[command(about = "Rank documents against queries with a hashed TF-IDF index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct IndexArgs {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: String,
    /// Return empty results for queries with no valid word instead of failing
    #[arg(long, default_value_t = false)]
    lenient: bool,
    /// Worker threads for batch calls (default: HASHRANK_WORKERS or one per core)
    #[arg(long)]
    workers: Option<usize>,
}

#[derive(Args)]
struct BoostArgs {
    /// Meta source to fuse into scores (repeatable)
    #[arg(long = "meta")]
    meta: Vec<String>,
    /// Multiplier applied to meta boost values
    #[arg(long, default_value_t = 100.0)]
    meta_scale: f32,
}

#[derive(Subcommand)]
enum Commands {
    /// Top-k documents for each query
    Search {
        #[command(flatten)]
        index: IndexArgs,
        #[command(flatten)]
        boost: BoostArgs,
        #[arg(long, default_value_t = 5)]
        k: usize,
        #[arg(required = true)]
        queries: Vec<String>,
    },
    /// Scores of the given documents for one query
    Scores {
        #[command(flatten)]
        index: IndexArgs,
        #[command(flatten)]
        boost: BoostArgs,
        #[arg(long)]
        query: String,
        #[arg(required = true)]
        doc_ids: Vec<String>,
    },
    /// Metadata records by doc id
    Meta {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(required = true)]
        doc_ids: Vec<String>,
    },
    /// Print the bundle's meta.json
    Info {
        #[arg(long, default_value = "./index")]
        index: String,
    },
}

impl IndexArgs {
    fn config(&self) -> RankerConfig {
        let mut cfg = RankerConfig::from_env();
        if self.lenient {
            cfg.strict = false;
        }
        if self.workers.is_some() {
            cfg.workers = self.workers;
        }
        cfg
    }
}

impl BoostArgs {
    fn boost(&self) -> MetaBoost {
        MetaBoost::new(self.meta.iter().cloned(), self.meta_scale)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { index, boost, k, queries } => {
            let ranker = open_ranker(&index.index, index.config())?;
            print_json(&search(&ranker, &queries, &boost.boost(), k, None)?)
        }
        Commands::Scores { index, boost, query, doc_ids } => {
            let ranker = open_ranker(&index.index, index.config())?;
            print_json(&scores(&ranker, &query, &doc_ids, &boost.boost())?)
        }
        Commands::Meta { index, doc_ids } => {
            let ranker = open_ranker(&index.index, index.config())?;
            print_json(&doc_meta_json(&ranker, &doc_ids, None)?)
        }
        Commands::Info { index } => print_json(&index_info(&index)?),
    }
}
