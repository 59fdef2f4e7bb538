//! RevSynth - LLM-powered literature review assistant
//!
//! A CLI tool that summarizes clusters of review articles and extracts
//! AMSTAR 2 quality assessments and study data against a master field
//! schema, using the Anthropic completion API.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, unreadable schema, etc.)

mod batch;
mod cli;
mod client;
mod config;
mod extract;
mod loader;
mod models;
mod report;
mod summarize;

use anyhow::{Context, Result};
use cli::{Args, Command};
use client::{AnthropicClient, CompletionService};
use config::Config;
use extract::schema::MasterSchema;
use extract::Extractor;
use models::Document;
use std::path::PathBuf;
use summarize::Summarizer;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("RevSynth v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .revsynth.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".revsynth.toml");

    if path.exists() {
        eprintln!("⚠️  .revsynth.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .revsynth.toml")?;

    println!("✅ Created .revsynth.toml with default settings.");
    println!("   Edit it to customize model, budgets, waits, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Dispatch the selected pipeline.
async fn run(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let command = args
        .command
        .clone()
        .context("A subcommand is required: summarize or extract")?;

    match command {
        Command::Summarize {
            input,
            pattern,
            output,
            cluster_name,
            ..
        } => run_summarize(&config, &args, input, pattern, output, cluster_name).await,
        Command::Extract {
            article,
            schema,
            output,
        } => run_extract(&config, &args, article, schema, output).await,
    }
}

/// Run the cluster summarization pipeline.
async fn run_summarize(
    config: &Config,
    args: &Args,
    input: PathBuf,
    pattern: String,
    output: Option<PathBuf>,
    cluster_name: String,
) -> Result<()> {
    println!("📚 Locating articles: {}", input.display());
    let files = loader::find_article_files(&input, &pattern)?;

    if files.is_empty() {
        println!("No files found matching: {}", input.display());
        return Ok(());
    }

    println!("   Found {} files to analyze", files.len());
    let documents = loader::read_documents(&files);

    if documents.is_empty() {
        println!("No files could be read successfully.");
        return Ok(());
    }

    if args.dry_run {
        return handle_summarize_dry_run(documents, config.batch.max_chars);
    }

    let article_count = documents.len();
    let service = build_service(config)?;
    let summarizer = if args.quiet {
        Summarizer::new(service, config).without_progress()
    } else {
        Summarizer::new(service, config)
    };

    println!(
        "\n🔬 Analyzing {} articles in cluster '{}'...",
        article_count, cluster_name
    );
    println!("   Model: {}", config.model.name);
    println!("   Character budget: {}", config.batch.max_chars);

    let result = summarizer.analyze_cluster(documents).await;

    let output_path =
        output.unwrap_or_else(|| PathBuf::from(format!("{cluster_name}_analysis_results.txt")));
    report::write_cluster_analysis(&output_path, &cluster_name, article_count, &result)?;

    println!(
        "\n✅ Analysis complete! Results saved to: {}",
        output_path.display()
    );
    println!("\n{}", "=".repeat(60));
    println!("{}", result);

    Ok(())
}

/// Handle --dry-run for summarize: show the batch plan without calling
/// the model.
fn handle_summarize_dry_run(documents: Vec<Document>, max_chars: usize) -> Result<()> {
    println!("\n🔍 Dry run: planning batches (no completion calls)...\n");

    let total_chars: usize = documents.iter().map(|d| d.chars).sum();
    println!("   Total content: {} characters", total_chars);

    if total_chars <= max_chars {
        println!("   Fits the {} character budget: one whole-cluster call", max_chars);
        println!("\n✅ Dry run complete. No completion calls were made.");
        return Ok(());
    }

    let batches = batch::create_batches(documents, max_chars);
    println!("   Exceeds the {} character budget: {} batches\n", max_chars, batches.len());

    for (i, b) in batches.iter().enumerate() {
        let cost: usize = b.documents.iter().map(batch::document_cost).sum();
        println!("   Batch {} ({} articles, ~{} chars):", i + 1, b.len(), cost);
        for document in &b.documents {
            println!(
                "     📄 Article {}: {} ({})",
                document.number,
                document.name,
                document.path.display()
            );
        }
    }

    println!("\n✅ Dry run complete. No completion calls were made.");
    Ok(())
}

/// Run the dual-extraction pipeline on one article.
async fn run_extract(
    config: &Config,
    args: &Args,
    article: PathBuf,
    schema_path: PathBuf,
    output: PathBuf,
) -> Result<()> {
    println!("📖 Loading article: {}", article.display());
    let article_text = std::fs::read_to_string(&article)
        .with_context(|| format!("Failed to read article: {}", article.display()))?;

    let companions = loader::load_companions(&article);
    if companions.supplement.is_some() {
        println!("   Including supplement file in quality assessment");
    }
    if companions.protocol.is_some() {
        println!("   Including protocol file in quality assessment");
    }
    if !companions.any() {
        debug!("No companion files found for {}", article.display());
    }

    // The master schema is the one input whose absence is fatal.
    let schema = MasterSchema::load(&schema_path)?;
    println!(
        "   Loaded {} schema fields ({} AMSTAR, {} study data)",
        schema.len(),
        schema.quality_count(),
        schema.study_fields().len()
    );

    if args.dry_run {
        println!("\n🔍 Dry run: inputs verified, no completion calls were made.");
        return Ok(());
    }

    let service = build_service(config)?;
    let extractor = Extractor::new(service, config);

    println!("\n🔬 Running dual extraction...");
    println!("   Model: {}", config.model.name);

    let resolved = extractor
        .process_article(&article_text, &companions, &schema)
        .await;

    report::write_extraction_csv(&output, &resolved)?;

    println!("\n{}", report::extraction_summary(&resolved));
    println!(
        "\n✅ Extraction complete! Results saved to: {}",
        output.display()
    );

    Ok(())
}

/// Build the production completion service from resolved settings.
fn build_service(config: &Config) -> Result<Box<dyn CompletionService>> {
    if config.model.api_key.is_empty() {
        anyhow::bail!(
            "No API key configured. Set ANTHROPIC_API_KEY or api_key in .revsynth.toml"
        );
    }

    let client = AnthropicClient::new(&config.model).context("Failed to create API client")?;
    Ok(Box::new(client))
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .revsynth.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
