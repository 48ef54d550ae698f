//! stocktake - a deduplicating filesystem inventory crawler.
//!
//! Usage:
//!   stocktake crawl VARIANT ROOT       Crawl a store and write its inventory
//!   stocktake classify PATH...         Classify individual entries
//!   stocktake --help                   Show help

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use stocktake_core::{CrawlConfig, Inventory};
use stocktake_export::{ExportFormat, export};
use stocktake_scan::{Classifier, ClassifyOutcome, Crawler, RootSpec};

#[derive(Parser)]
#[command(
    name = "stocktake",
    version,
    about = "A deduplicating filesystem inventory crawler",
    long_about = "stocktake records every file, directory and symlink below a set of \
                  top-level components, counting hardlinked content exactly once.\n\n\
                  ROOT is either a store directory (each child is a component) or a \
                  listing file with one component name per line."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Settings shared by every command that classifies entries.
#[derive(Args)]
struct CrawlOptions {
    /// JSON file with crawl settings (flags take precedence)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of bytes read from each file for content sniffing
    #[arg(long)]
    prefix_len: Option<usize>,

    /// Extension marking lock files, repeatable (replaces the default "lock")
    #[arg(long = "lock-ext", value_name = "EXT")]
    lock_ext: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl a store and write its inventory
    Crawl {
        /// Label stamped on every record of this crawl
        variant: String,

        /// Store directory or component listing file
        root: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Crawl components concurrently
        #[arg(long)]
        parallel: bool,

        /// Number of crawl threads (implies --parallel)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        #[command(flatten)]
        options: CrawlOptions,
    },

    /// Classify individual entries without crawling
    Classify {
        /// Paths to classify
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        options: CrawlOptions,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => ExportFormat::Csv,
            OutputFormat::Json => ExportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Crawl {
            variant,
            root,
            output,
            format,
            parallel,
            threads,
            options,
        } => {
            let mut config = load_config(&options)?;
            if parallel {
                config.parallel = true;
            }
            if let Some(threads) = threads {
                config.parallel = true;
                config.threads = threads;
            }
            run_crawl(&variant, &root, output.as_deref(), format, config)?;
        }
        Command::Classify { paths, options } => {
            let config = load_config(&options)?;
            run_classify(&paths, &config)?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` overrides `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Build the crawl config from an optional JSON file plus flag overrides.
fn load_config(options: &CrawlOptions) -> Result<CrawlConfig> {
    let mut config = match &options.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("Cannot read config {}", path.display()))?;
            serde_json::from_str(&text)
                .wrap_err_with(|| format!("Invalid config {}", path.display()))?
        }
        None => CrawlConfig::default(),
    };

    if let Some(prefix_len) = options.prefix_len {
        config.prefix_len = prefix_len;
    }
    if !options.lock_ext.is_empty() {
        config.lock_extensions = options.lock_ext.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Crawl a root and export the inventory.
fn run_crawl(
    variant: &str,
    root: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    config: CrawlConfig,
) -> Result<()> {
    let roots = RootSpec::from_path(root)
        .wrap_err_with(|| format!("Invalid crawl root {}", root.display()))?;

    eprintln!("Crawling {} as {variant}...", root.display());

    let crawler = Crawler::with_config(config);
    let progress = spawn_progress_logger(&crawler);
    let result = crawler.crawl(variant, &roots);

    // Dropping the crawler closes the progress channel.
    drop(crawler);
    let _ = progress.join();

    let inventory = result.context("Crawl failed")?;

    match output {
        Some(path) => {
            let file = File::create(path)
                .wrap_err_with(|| format!("Cannot create {}", path.display()))?;
            export(&inventory, format.into(), BufWriter::new(file)).context("Export failed")?;
            eprintln!("Exported to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            export(&inventory, format.into(), BufWriter::new(stdout.lock()))
                .context("Export failed")?;
        }
    }

    print_summary(&inventory);
    Ok(())
}

/// Log progress updates until the crawler goes away.
fn spawn_progress_logger(crawler: &Crawler) -> JoinHandle<()> {
    let mut rx = crawler.subscribe();
    std::thread::spawn(move || {
        loop {
            match rx.blocking_recv() {
                Ok(progress) if progress.component_done => {
                    tracing::debug!(
                        component = %progress.current_component,
                        records = progress.records,
                        "component crawled"
                    );
                }
                Ok(progress) => {
                    tracing::info!(
                        records = progress.records,
                        bytes = progress.bytes,
                        rate = format!("{:.0}/s", progress.records_per_second()),
                        "crawling"
                    );
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Print a short crawl summary on stderr.
fn print_summary(inventory: &Inventory) {
    let stats = &inventory.stats;

    eprintln!();
    eprintln!("{}", "─".repeat(60));
    eprintln!(
        " {} - {} records, {}",
        inventory.variant,
        inventory.len(),
        format_size(stats.total_size)
    );
    eprintln!(
        " {} files, {} directories, {} symlinks",
        stats.total_files, stats.total_dirs, stats.total_symlinks
    );
    eprintln!(
        " Skipped {} duplicates, {} lock files, {} vanished",
        stats.duplicates_skipped, stats.lock_files_skipped, stats.vanished_skipped
    );
    eprintln!(
        " Crawled {} components in {:.2}s",
        stats.components,
        inventory.crawl_duration.as_secs_f64()
    );
    eprintln!("{}", "─".repeat(60));

    if !inventory.warnings.is_empty() {
        eprintln!("{} warning(s) during crawl", inventory.warnings.len());
    }
}

/// Classify paths one by one and print `path<TAB>mime<TAB>description`.
fn run_classify(paths: &[PathBuf], config: &CrawlConfig) -> Result<()> {
    let classifier = Classifier::new(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for path in paths {
        match classifier.classify(path) {
            ClassifyOutcome::Classified(classification) => writeln!(
                out,
                "{}\t{}\t{}",
                path.display(),
                classification.mime_type,
                classification.description
            )?,
            ClassifyOutcome::Skipped(reason) => {
                writeln!(out, "{}\tskipped ({reason})", path.display())?
            }
            ClassifyOutcome::Fatal(err) => return Err(err).context("Classification failed"),
        }
    }

    Ok(())
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
