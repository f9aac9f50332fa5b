/// Leveler - batch two-pass loudness normalizer
use clap::{Args, Parser, Subcommand};
use leveler::{CliOverrides, LevelerConfig, Pipeline};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str =
    "leveler=info,leveler_loudness=info,leveler_importer=info,leveler_audio=warn";
const VERBOSE_FILTER: &str =
    "leveler=debug,leveler_loudness=debug,leveler_importer=debug,leveler_audio=debug";

#[derive(Parser)]
#[command(name = "leveler")]
#[command(
    about = "Normalize a tree of audio files to the loudness of its quietest file",
    long_about = None
)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize the input tree into the output tree
    Run {
        #[command(flatten)]
        options: RunOptions,

        /// Report what would be written without touching the output tree
        #[arg(long)]
        dry_run: bool,
    },
    /// Measure every file and print the target a run would use
    Analyze {
        #[command(flatten)]
        options: RunOptions,
    },
}

#[derive(Args)]
struct RunOptions {
    /// Input root directory
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output root directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Peak ceiling used to rank files (dBTP)
    #[arg(long, allow_negative_numbers = true)]
    ceiling: Option<f64>,

    /// How the running minimum is seeded (true_minimum or sentinel_floor)
    #[arg(long)]
    policy: Option<String>,

    /// Fixed target loudness (LUFS) instead of the collection minimum
    #[arg(long, allow_negative_numbers = true)]
    target: Option<f64>,

    /// Configuration file path
    #[arg(short, long, env = "LEVELER_CONFIG")]
    config: Option<PathBuf>,
}

impl RunOptions {
    fn load(self) -> anyhow::Result<LevelerConfig> {
        let mut config = LevelerConfig::load(self.config.as_deref())?;
        config.apply(CliOverrides {
            input: self.input,
            output: self.output,
            ceiling: self.ceiling,
            policy: self.policy,
            target: self.target,
        });
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Run { options, dry_run } => run(options, dry_run),
        Commands::Analyze { options } => analyze(options),
    }
}

fn run(options: RunOptions, dry_run: bool) -> anyhow::Result<ExitCode> {
    let config = options.load()?;

    tracing::info!("Input: {}", config.paths.input_root.display());
    tracing::info!("Output: {}", config.paths.output_root.display());

    let summary = Pipeline::new(config).dry_run(dry_run).run()?;

    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::error!("{} file(s) failed", summary.failed);
        Ok(ExitCode::FAILURE)
    }
}

fn analyze(options: RunOptions) -> anyhow::Result<ExitCode> {
    let config = options.load()?;
    let report = Pipeline::new(config).analyze()?;

    println!("{report}");

    if report.failed == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
