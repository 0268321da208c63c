use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{PersonRole, SuccessRateTables};
use pipeline::{resolve, FeatureAssembler, MatchKind, MovieRequest};
use serde_json::Value;
use server::{ClassifierSource, MoviePrediction, PredictionService};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// HitFlop - movie success predictor
#[derive(Parser)]
#[command(name = "hitflop")]
#[command(about = "Predict whether a movie will be a HIT or a FLOP", long_about = None)]
struct Cli {
    /// Directory holding the success-rate tables and model artifact
    #[arg(short, long, env = "HITFLOP_ARTIFACTS_DIR", default_value = "artifacts")]
    artifacts_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict HIT/FLOP for the movies in a JSON file
    Predict {
        /// JSON file with one movie object or an array of them
        #[arg(long)]
        input: PathBuf,

        /// Score with a remote gRPC classifier instead of a local model
        #[arg(long, conflicts_with = "model")]
        ml_service: Option<String>,

        /// Linear model artifact [default: <artifacts-dir>/model.json]
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Print the assembled feature records for the movies in a JSON file
    Features {
        /// JSON file with one movie object or an array of them
        #[arg(long)]
        input: PathBuf,
    },

    /// Look up a person's success rate
    Lookup {
        /// Table to search: director, actor1, actor2 or actor3
        #[arg(long)]
        role: PersonRole,

        /// Name to resolve (matched exactly, then case-insensitively)
        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    // Load success-rate tables
    println!(
        "Loading success rates from {}...",
        cli.artifacts_dir.display()
    );
    let start = Instant::now();
    let tables = Arc::new(
        SuccessRateTables::load_from_dir(&cli.artifacts_dir)
            .context("Failed to load success-rate tables")?,
    );
    println!("{} Loaded tables in {:?}", "✓".green(), start.elapsed());
    for role in tables.missing_roles() {
        println!(
            "{} No {} table found, every {} resolves to the default rate",
            "!".yellow(),
            role.artifact_file(),
            role
        );
    }

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Predict {
            input,
            ml_service,
            model,
        } => {
            let source = match ml_service {
                Some(addr) => ClassifierSource::Remote(addr),
                None => ClassifierSource::Linear(
                    model.unwrap_or_else(|| cli.artifacts_dir.join("model.json")),
                ),
            };
            handle_predict(tables, &input, source).await?
        }
        Commands::Features { input } => handle_features(tables, &input)?,
        Commands::Lookup { role, name } => handle_lookup(&tables, role, &name),
    }

    Ok(())
}

/// Read a JSON file holding one movie object or an array of them
fn read_requests(path: &Path) -> Result<Vec<MovieRequest>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    match value {
        Value::Object(map) => Ok(vec![map]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(map) => Ok(map),
                _ => bail!("Entry {} of {} is not a JSON object", i, path.display()),
            })
            .collect(),
        _ => bail!("{} must hold a JSON object or array", path.display()),
    }
}

/// Handle the 'predict' command
async fn handle_predict(
    tables: Arc<SuccessRateTables>,
    input: &Path,
    source: ClassifierSource,
) -> Result<()> {
    let requests = read_requests(input)?;

    let classifier = source
        .open()
        .await
        .with_context(|| format!("Failed to load classifier from {:?}", source))?;
    let service = PredictionService::new(tables, classifier)
        .await
        .context("Classifier rejected the feature schema")?;

    println!(
        "{}",
        format!("Predictions ({}):", service.model().model_type)
            .bold()
            .blue()
    );

    let mut failed = 0;
    for (i, request) in requests.iter().enumerate() {
        match service.predict(request).await {
            Ok(prediction) => print_prediction(i + 1, &prediction),
            Err(e) => {
                failed += 1;
                println!("{}. {} {}", i + 1, "error:".red().bold(), e);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} predictions failed", failed, requests.len());
    }
    Ok(())
}

/// Handle the 'features' command
fn handle_features(tables: Arc<SuccessRateTables>, input: &Path) -> Result<()> {
    let requests = read_requests(input)?;
    let assembler = FeatureAssembler::new(tables);

    let mut failed = 0;
    for (i, result) in assembler.assemble_batch(&requests).into_iter().enumerate() {
        match result {
            Ok(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            Err(e) => {
                failed += 1;
                eprintln!("{}. {} {}", i + 1, "error:".red().bold(), e);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} requests could not be assembled", failed, requests.len());
    }
    Ok(())
}

/// Handle the 'lookup' command
fn handle_lookup(tables: &SuccessRateTables, role: PersonRole, name: &str) {
    let resolution = resolve(Some(name), Some(tables.get(role)));

    let how = match resolution.kind {
        MatchKind::Exact => "exact match".green(),
        MatchKind::CaseInsensitive => "case-insensitive match".cyan(),
        MatchKind::Default => "not found, default rate".yellow(),
    };
    println!(
        "{} '{}': {:.3} ({})",
        role.to_string().bold(),
        name,
        resolution.rate,
        how
    );
}

/// Helper function to format and print one prediction
fn print_prediction(rank: usize, prediction: &MoviePrediction) {
    let label = match prediction.prediction.as_str() {
        "HIT" => "HIT".green().bold(),
        other => other.red().bold(),
    };
    let title = match &prediction.movie_title {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    println!(
        "{}. {} - {} ({:.1}% confidence)",
        rank.to_string().green(),
        title,
        label,
        prediction.confidence
    );
    for factor in &prediction.features_used {
        println!("   {} {}", "•".cyan(), factor);
    }
}
