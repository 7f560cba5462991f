//! `phonosim` — segment similarity matrices and word adjacency scores.
//!
//! **Usage:**
//! ```text
//! phonosim matrix --language maltese --features features.csv
//! phonosim adjacency --language maltese --words roots.txt
//! phonosim classes --language maltese --features features.csv
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use phonosim_core::{
    write_atomic, FeatureInventory, OutputLayout, Pipeline, PipelineConfig, SimilarityMethod,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "phonosim",
    about = "Segment similarity from shared natural classes"
)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build (or reuse) natural classes and write the similarity matrix.
    Matrix(PipelineArgs),
    /// Print the natural classes of a language.
    Classes(PipelineArgs),
    /// Average adjacent similarity for every word in a word list.
    Adjacency(AdjacencyArgs),
}

#[derive(Args)]
struct PipelineArgs {
    /// TOML file with pipeline settings; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Language name; keys the cache and output file names.
    #[arg(long)]
    language: Option<String>,

    /// Segment/feature matrix in CSV form.
    #[arg(long)]
    features: Option<PathBuf>,

    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Similarity definition.
    #[arg(long)]
    method: Option<SimilarityMethod>,

    /// Combinations between progress reports.
    #[arg(long)]
    progress_interval: Option<usize>,
}

impl PipelineArgs {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(language) = self.language {
            config.language = language;
        }
        if let Some(features) = self.features {
            config.feature_matrix = features;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(method) = self.method {
            config.method = method;
        }
        if let Some(interval) = self.progress_interval {
            config.progress_interval = interval;
        }
        Ok(config)
    }
}

#[derive(Args)]
struct AdjacencyArgs {
    #[arg(long)]
    language: String,

    /// Word list: one word per line, segments separated by spaces.
    #[arg(long)]
    words: PathBuf,

    #[arg(long, default_value = phonosim_core::config::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Write `word<TAB>score` lines here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Matrix(args) => run_matrix(args.into_config()?),
        Command::Classes(args) => run_classes(args.into_config()?),
        Command::Adjacency(args) => run_adjacency(args),
    }
}

fn run_matrix(config: PipelineConfig) -> Result<()> {
    let pipeline = Pipeline::new(config)?;
    let report = pipeline
        .run(|p| {
            info!(
                "running feature combination {} / {} ({:.1}%), found {} classes",
                p.enumerated,
                p.total,
                p.fraction() * 100.0,
                p.found
            )
        })
        .with_context(|| format!("building similarity matrix for {}", pipeline.config().language))?;

    println!(
        "{}: {} segments, {} natural classes{}",
        report.language,
        report.segments,
        report.classes,
        if report.from_cache { " (cached)" } else { "" }
    );
    println!("natural classes: {}", report.classes_path.display());
    println!("similarity matrix: {}", report.matrix_path.display());
    Ok(())
}

fn run_classes(config: PipelineConfig) -> Result<()> {
    let pipeline = Pipeline::new(config)?;
    let config = pipeline.config();
    let inventory = FeatureInventory::load(&config.feature_matrix)
        .with_context(|| format!("loading {}", config.feature_matrix.display()))?;
    let (classes, _) = pipeline.natural_classes(&inventory, |p| {
        info!("running feature combination {} / {}", p.enumerated, p.total)
    })?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "features: {}", inventory.features().join(", "))?;
    for class in &classes {
        writeln!(out, "{}\t{}", class.vector, class.members.join(" "))?;
    }
    Ok(())
}

fn run_adjacency(args: AdjacencyArgs) -> Result<()> {
    phonosim_core::config::validate_language(&args.language)?;
    let matrix = phonosim_adjacency::load_matrix(&args.output_dir, &args.language)?;
    let words = phonosim_adjacency::read_word_list(&args.words)?;
    let scores = phonosim_adjacency::calc(&matrix, &words);

    let mut rendered = String::new();
    for (word, score) in words.iter().zip(&scores) {
        rendered.push_str(&format!("{word}\t{score}\n"));
    }

    match &args.output {
        Some(path) => {
            write_atomic(path, rendered.as_bytes())
                .with_context(|| format!("writing {}", path.display()))?;
            info!(
                words = scores.len(),
                path = %path.display(),
                matrix = %OutputLayout::new(&args.output_dir).matrix_path(&args.language).display(),
                "adjacency scores written"
            );
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
