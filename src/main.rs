//! repo-vitae - Portfolio summaries from local Git repositories
//!
//! Finds the repositories under a directory, measures them and prints either
//! the raw metrics or an anonymized portfolio summary.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use repo_vitae::{
    config::{Config, OutputFormat},
    privacy::PortfolioAnonymizer,
    reporter::{create_reporter, Report},
    Pipeline,
};
use std::path::PathBuf;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Discover local git repositories and summarize them without leaking names
#[derive(Parser)]
#[command(name = "repo-vitae")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format (overrides the configuration file)
    #[arg(short = 'f', long, global = true)]
    format: Option<OutputFormatArg>,

    /// Output file (stdout if not specified)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy)]
enum OutputFormatArg {
    Text,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Text => OutputFormat::Text,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Args, Clone, Default)]
struct ScanArgs {
    /// Directory to search (configured scan path, else the current directory)
    path: Option<PathBuf>,

    /// Maximum directory depth below the root
    #[arg(long)]
    max_depth: Option<usize>,

    /// Descend into hidden directories
    #[arg(long)]
    include_hidden: bool,

    /// Skip repositories without a public remote
    #[arg(long)]
    exclude_private: bool,

    /// Skip directories whose path contains this text (repeatable)
    #[arg(long = "ignore", value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Analysis worker threads (0 = one per CPU)
    #[arg(long)]
    threads: Option<usize>,
}

impl ScanArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(depth) = self.max_depth {
            config.scan.max_depth = depth;
        }
        if self.include_hidden {
            config.scan.include_hidden = true;
        }
        if self.exclude_private {
            config.scan.include_private = false;
        }
        config.scan.ignore_patterns.extend(self.ignore.iter().cloned());
        if let Some(threads) = self.threads {
            config.concurrency.analysis_threads = threads;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the git repositories under a directory
    Scan(ScanArgs),

    /// Full per-repository metrics (contains names and paths)
    Analyze(ScanArgs),

    /// Anonymized portfolio records and aggregate summary
    Summary(ScanArgs),

    /// Redact URLs, paths and sensitive words from a piece of text
    Sanitize {
        /// Text to sanitize
        text: String,
    },

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write the default configuration to the config path
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 if cli.quiet => Level::ERROR,
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level.to_string())),
        )
        .init();

    // Load configuration, then override with CLI options
    let load_config = || -> anyhow::Result<Config> {
        let mut config = Config::load(cli.config.as_deref())?;
        if let Some(format) = cli.format {
            config.output.format = format.into();
        }
        if let Some(ref output) = cli.output {
            config.output.output_path = Some(output.clone());
        }
        Ok(config)
    };

    let (scan_args, mut config) = match cli.command {
        Commands::Config(ConfigCommand::Init { force }) => {
            let path = match cli.config.clone() {
                Some(path) => path,
                None => Config::default_path()
                    .context("no configuration directory on this platform")?,
            };
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            Config::default().save(&path)?;
            println!("Wrote {}", path.display());
            return Ok(());
        }

        Commands::Config(ConfigCommand::Show) => {
            print!("{}", toml::to_string_pretty(&load_config()?)?);
            return Ok(());
        }

        Commands::Sanitize { text } => {
            let anonymizer = PortfolioAnonymizer::new(&load_config()?.privacy);
            println!("{}", anonymizer.sanitize_text(&text));
            return Ok(());
        }

        Commands::Scan(ref args) | Commands::Analyze(ref args) | Commands::Summary(ref args) => {
            (args.clone(), load_config()?)
        }
    };

    scan_args.apply(&mut config);
    let format = config.output.format;
    let output_path = config.output.output_path.clone();
    let pipeline = Pipeline::new(config)?;
    let root = pipeline.resolve_root(scan_args.path.as_deref());
    info!("Scanning {}", root.display());

    // The pipeline is blocking; run it off the runtime so Ctrl-C stays responsive
    let command = cli.command;
    let mut work = tokio::task::spawn_blocking(move || -> repo_vitae::Result<String> {
        let reporter = create_reporter(format);
        let report = match command {
            Commands::Scan(_) => {
                let handles = pipeline.discover(&root)?;
                reporter.generate(&Report::Repositories(&handles))
            }
            Commands::Analyze(_) => {
                let metrics = pipeline.analyze_path(&root)?;
                reporter.generate(&Report::Metrics(&metrics))
            }
            _ => {
                let payload = pipeline.summarize(&root)?;
                reporter.generate(&Report::Portfolio(&payload))
            }
        };
        Ok(report)
    });

    let report = tokio::select! {
        joined = &mut work => joined.context("analysis task failed")??,
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => {
                warn!("Received interrupt signal, discarding partial results");
                std::process::exit(130); // Standard exit code for SIGINT
            }
            Err(e) => {
                error!("Failed to listen for shutdown signal: {}", e);
                work.await.context("analysis task failed")??
            }
        },
    };

    if let Some(ref output_path) = output_path {
        std::fs::write(output_path, &report)?;
        info!("Report written to: {}", output_path.display());
    } else {
        println!("{}", report);
    }

    Ok(())
}
