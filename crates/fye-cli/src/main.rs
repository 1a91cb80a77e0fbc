//! FYE CLI - Command-line interface
//!
//! Usage:
//!   fye generate --count 100
//!   fye index
//!   fye search "<query>" --top-k 5 --plot
//!   fye demo

use anyhow::Context;
use clap::{Parser, Subcommand};
use fye_core::{AppConfig, LoggingConfig};
use fye_search::{
    generate_dataset, save_dataset, RenderableResultSet, ScoreDistribution, SearchEngine,
    SearchResponse,
};
use fye_vector::create_embedder;
use std::path::PathBuf;

/// Example queries run by `fye demo`
const DEMO_QUERIES: &[&str] = &[
    "Python developer with backend experience",
    "Machine learning engineer with deep learning experience",
    "DevOps engineer with AWS and Kubernetes experience",
];

#[derive(Parser)]
#[command(name = "fye")]
#[command(about = "Find Your Employee - semantic resume search")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic resume dataset
    Generate {
        /// Number of resumes
        #[arg(long)]
        count: Option<usize>,
        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Output file (defaults to the configured resumes path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Embed the dataset and write the embedding cache
    Index {
        /// Discard an existing cache first
        #[arg(long)]
        force: bool,
    },
    /// Search resumes matching a query
    Search {
        /// Job requirements to match
        query: String,
        /// Number of results
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Include 2D projection of corpus and query
        #[arg(long)]
        plot: bool,
        /// Include similarity distribution over all resumes
        #[arg(long)]
        distribution: bool,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the example queries
    Demo {
        /// Number of results per query
        #[arg(short = 'k', long, default_value_t = 3)]
        top_k: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    init_tracing(&config.logging);

    match cli.command {
        Commands::Generate {
            count,
            seed,
            output,
        } => {
            let count = count.unwrap_or(config.data.dataset_size);
            let seed = seed.unwrap_or(config.data.seed);
            let output = output.unwrap_or_else(|| config.data.resumes_path.clone());

            let resumes = generate_dataset(count, seed);
            save_dataset(&resumes, &output)?;
            println!("Generated {} resumes and saved to {}", count, output.display());
        }
        Commands::Index { force } => {
            if force && config.data.embeddings_path.exists() {
                std::fs::remove_file(&config.data.embeddings_path).with_context(|| {
                    format!("removing {}", config.data.embeddings_path.display())
                })?;
            }
            let engine = load_engine(&config)?;
            println!(
                "Indexed {} resumes into {}",
                engine.store().size(),
                config.data.embeddings_path.display()
            );
        }
        Commands::Search {
            query,
            top_k,
            plot,
            distribution,
            json,
        } => {
            let engine = load_engine(&config)?;
            let response = engine.search(&query, top_k)?;
            let projection = plot
                .then(|| engine.visualize(&query, top_k))
                .transpose()?;
            let scores = distribution
                .then(|| engine.similarity_distribution(&query))
                .transpose()?;

            if json {
                let output = serde_json::json!({
                    "search": response,
                    "visualization": projection,
                    "distribution": scores,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_results(&response);
                if let Some(result) = &projection {
                    print_projection(result);
                }
                if let Some(dist) = &scores {
                    print_distribution(dist);
                }
            }
        }
        Commands::Demo { top_k } => {
            let engine = load_engine(&config)?;
            println!("Loaded {} resumes", engine.store().size());
            for query in DEMO_QUERIES {
                let response = engine.search(query, Some(top_k))?;
                print_results(&response);
            }
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("fye={0},fye_search={0},fye_vector={0}", logging.level).into()
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_engine(config: &AppConfig) -> anyhow::Result<SearchEngine> {
    let embedder = create_embedder(&config.embedding)?;
    let engine = SearchEngine::prepare(config, embedder).context("preparing search engine")?;
    tracing::info!("Search engine ready with {} resumes", engine.store().size());
    Ok(engine)
}

fn print_results(response: &SearchResponse<'_>) {
    println!("\nTop {} results for query: '{}'", response.results.len(), response.query);
    if let Some(mean) = response.mean_similarity {
        println!("Average similarity: {:.2}%", mean * 100.0);
    }

    for (rank, result) in response.results.iter().enumerate() {
        let resume = result.record;
        println!(
            "\n{}. {} - {}",
            rank + 1,
            resume.name,
            resume.job_title
        );
        println!("   Similarity: {:.4}", result.score);
        println!("   Experience: {} years", resume.years_experience);
        println!("   Skills: {}", resume.top_skills(5).join(", "));
    }
}

fn print_projection(result: &RenderableResultSet) {
    println!("\n{} / {}", result.axes[0].label, result.axes[1].label);
    if let Some(query) = &result.query {
        println!("  * {:>8.4} {:>8.4}  {}", query.x, query.y, query.label);
    }
    for point in result.highlighted() {
        println!(
            "  + {:>8.4} {:>8.4}  {}",
            point.x,
            point.y,
            point.hover.summary()
        );
    }
    println!(
        "  ({} other resumes not listed)",
        result.points.len() - result.highlighted().count()
    );
}

fn print_distribution(dist: &ScoreDistribution) {
    println!(
        "\nSimilarity distribution over {} resumes (min {:.3}, mean {:.3}, max {:.3})",
        dist.len(),
        dist.min,
        dist.mean,
        dist.max
    );
    let widest = dist.histogram.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    for bin in &dist.histogram {
        let bar = "#".repeat(bin.count * 40 / widest);
        println!("  [{:>6.3}, {:>6.3}) {:>4} {}", bin.start, bin.end, bin.count, bar);
    }
}
