use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use prunescope::config::AnalysisConfig;
use prunescope::export::{export, ExportFormat};
use prunescope::logger::init_logger;
use prunescope::pipeline::AnalysisRun;
use prunescope::report::format_size;
use prunescope::safety::SafetyPolicy;

#[derive(Parser)]
#[command(name = "prunescope")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(about = "Find unused React components and check whether they are safe to delete", long_about = None)]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a project for unused components
    Analyze {
        /// Project root (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format: markdown, json or csv
        #[arg(short, long, default_value_t = ExportFormat::Markdown)]
        format: ExportFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Whether re-exports and config mentions block deletion
        #[arg(long)]
        policy: Option<SafetyPolicy>,

        /// Skip the textual mention scan
        #[arg(long)]
        no_indirect: bool,

        /// Config file (defaults to prunescope.json in the project root)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::Analyze {
            path,
            format,
            output,
            policy,
            no_indirect,
            config,
        }) => {
            let mut analysis_config = match &config {
                Some(file) => AnalysisConfig::load(file)
                    .with_context(|| format!("Failed to load config {}", file.display()))?,
                None => AnalysisConfig::discover(&path)?,
            };
            if let Some(policy) = policy {
                analysis_config.safety.policy = policy;
            }
            if no_indirect {
                analysis_config.safety.check_indirect = false;
            }

            let run = AnalysisRun::new(analysis_config)?;
            let report = run
                .execute(&path)
                .with_context(|| format!("Failed to analyze {}", path.display()))?;

            if report.is_empty() {
                tracing::info!("No components found under {}", report.root.display());
            } else {
                tracing::info!(
                    "{} unused of {} components, {} safe to delete ({})",
                    report.stats.unused,
                    report.stats.units,
                    report.stats.safe_to_delete,
                    format_size(report.reclaimable_bytes())
                );
            }

            match output {
                Some(file) => {
                    let handle = File::create(&file)
                        .with_context(|| format!("Failed to create {}", file.display()))?;
                    let mut writer = BufWriter::new(handle);
                    export(format, &report, &mut writer)?;
                    writer.flush()?;
                    tracing::info!("Report written to {}", file.display());
                }
                None => {
                    let stdout = io::stdout();
                    let mut writer = stdout.lock();
                    export(format, &report, &mut writer)?;
                }
            }
        }
        Some(Commands::Version) => {
            println!("prunescope v{}", env!("CARGO_PKG_VERSION"));
        }
        None => {
            println!("PruneScope - Unused Component Finder");
            println!("Run 'prunescope analyze [PATH]' to analyze a project");
            println!("Run 'prunescope --help' for more information");
        }
    }

    Ok(())
}
