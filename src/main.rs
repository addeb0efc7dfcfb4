//! # ragprep CLI
//!
//! Prepare documents for RAG/LLM workflows: load a file, directory or raw
//! string, chunk it, and write JSONL.
//!
//! ## Examples
//!
//! ```bash
//! # Chunk a directory of Markdown into 500-character windows
//! ragprep docs/ -o chunks.jsonl --chunk-size 500 --chunk-overlap 50 --include '*.md'
//!
//! # Token windows, settings from a file, one flag overridden
//! ragprep report.pdf -o report.jsonl -c ragprep.toml --chunk-strategy token
//!
//! # Raw string input
//! ragprep "Some text to chunk" -o out.jsonl --chunk-strategy none
//! ```
//!
//! Logging goes to stderr and honours `RUST_LOG`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use ragprep::{Config, Pipeline, Source};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ragprep")]
#[command(about = "Prepare documents for RAG/LLM workflows")]
#[command(version)]
struct Cli {
    /// Input path (file, directory, or string)
    input: String,

    /// Output JSONL file path
    #[arg(short, long)]
    output: PathBuf,

    /// TOML config file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chunking strategy: 'character', 'token', 'sentence', 'none', or a registered name [default: character]
    #[arg(long, env = "RAGPREP_CHUNK_STRATEGY")]
    chunk_strategy: Option<String>,

    /// Maximum chunk size [default: 1000]
    #[arg(long, env = "RAGPREP_CHUNK_SIZE")]
    chunk_size: Option<usize>,

    /// Overlap between chunks [default: 200]
    #[arg(long, env = "RAGPREP_CHUNK_OVERLAP")]
    chunk_overlap: Option<usize>,

    /// Tokenizer name (e.g. 'cl100k_base') or 'none' to disable [default: cl100k_base]
    #[arg(long, env = "RAGPREP_TOKENIZER")]
    tokenizer: Option<String>,

    /// Include file patterns (e.g. '*.txt' '*.md')
    #[arg(long, num_args = 1..)]
    include: Option<Vec<String>>,

    /// Exclude file patterns (e.g. '*.tmp' '__pycache__')
    #[arg(long, num_args = 1..)]
    exclude: Option<Vec<String>>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// File config (or defaults) with flags applied on top.
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(strategy) = &self.chunk_strategy {
            config.chunk_strategy.clone_from(strategy);
        }
        if let Some(size) = self.chunk_size {
            config.chunk_size = size;
        }
        if let Some(overlap) = self.chunk_overlap {
            config.chunk_overlap = overlap;
        }
        if let Some(tokenizer) = &self.tokenizer {
            config.tokenizer.clone_from(tokenizer);
        }
        if let Some(include) = &self.include {
            config.include.clone_from(include);
        }
        if let Some(exclude) = &self.exclude {
            config.exclude.clone_from(exclude);
        }
        config.verbose |= self.verbose;
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.config()?;
    init_tracing(config.verbose);

    if config.verbose {
        println!("Input: {}", cli.input);
        println!("Output: {}", cli.output.display());
        println!("Chunk strategy: {}", config.chunk_strategy);
        println!("Chunk size: {}", config.chunk_size);
        println!("Chunk overlap: {}", config.chunk_overlap);
        println!("Tokenizer: {}", config.tokenizer);
    }

    let verbose = config.verbose;
    let pipeline = Pipeline::new(config).context("Invalid configuration")?;
    let written = pipeline
        .prepare_to_jsonl(Source::detect(&cli.input), &cli.output)
        .with_context(|| format!("Failed to prepare {}", cli.input))?;

    if verbose {
        println!(
            "Successfully wrote {written} chunks to {}",
            cli.output.display()
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
