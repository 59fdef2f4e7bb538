//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// RevSynth - LLM-powered extraction and synthesis for systematic reviews
///
/// Summarize clusters of review articles or extract AMSTAR 2 quality
/// assessments and study data against a master field schema, using the
/// Anthropic completion API.
///
/// Examples:
///   revsynth summarize ./articles/ --cluster-name eating_disorders
///   revsynth summarize ./articles/ --pattern "*.txt" --max-chars 600000
///   revsynth extract ./articles/smith_2021.txt --schema DataExtract_QC.csv
///   revsynth extract ./articles/smith_2021.txt --schema qc.csv --dry-run
///   revsynth --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Model to use for completion requests
    #[arg(
        short,
        long,
        global = true,
        default_value = "claude-sonnet-4-20250514",
        env = "REVSYNTH_MODEL"
    )]
    pub model: String,

    /// Completion API endpoint URL
    #[arg(
        long,
        global = true,
        default_value = "https://api.anthropic.com/v1/messages",
        env = "ANTHROPIC_API_URL"
    )]
    pub api_url: String,

    /// API key for the completion service
    #[arg(long, global = true, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Temperature for model responses (0.0 - 1.0)
    #[arg(long, global = true, default_value = "0.3")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .revsynth.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Load inputs and show the work plan without calling the model
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Generate a default .revsynth.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// The two review pipelines.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Summarize a cluster of article files, batching when oversized
    Summarize {
        /// Input file, directory, or directory-with-wildcard pattern
        input: PathBuf,

        /// File name pattern for directory input
        #[arg(long, default_value = "*.txt", value_name = "PATTERN")]
        pattern: String,

        /// Output file (default: <cluster-name>_analysis_results.txt)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Name for this cluster
        #[arg(long, default_value = "articles", value_name = "NAME")]
        cluster_name: String,

        /// Maximum characters per completion request
        #[arg(long, value_name = "CHARS")]
        max_chars: Option<usize>,
    },

    /// Extract AMSTAR 2 assessment and study data from one article
    Extract {
        /// Article text file to process
        article: PathBuf,

        /// Master field schema CSV (Section, Field columns)
        #[arg(short, long, value_name = "CSV")]
        schema: PathBuf,

        /// Output CSV file
        #[arg(
            short,
            long,
            default_value = "extraction_results.csv",
            value_name = "FILE"
        )]
        output: PathBuf,
    },
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.command.is_none() {
            return Err("A subcommand is required: summarize or extract".to_string());
        }

        // Validate API URL format (not needed for dry-run)
        if !self.dry_run
            && !self.api_url.starts_with("http://")
            && !self.api_url.starts_with("https://")
        {
            return Err("API URL must start with 'http://' or 'https://'".to_string());
        }

        // Validate temperature range
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err("Temperature must be between 0.0 and 1.0".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        match &self.command {
            Some(Command::Summarize { max_chars, .. }) => {
                if let Some(max) = max_chars {
                    if *max == 0 {
                        return Err("Max chars must be at least 1".to_string());
                    }
                }
            }
            Some(Command::Extract {
                article, schema, ..
            }) => {
                if !article.exists() {
                    return Err(format!("Article file does not exist: {}", article.display()));
                }
                if !schema.exists() {
                    return Err(format!("Schema file does not exist: {}", schema.display()));
                }
            }
            None => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
