//! pixeltrack CLI: run a tracker described by a JSON config.

use clap::{Parser, Subcommand};
use pixeltrack::color::ColorRegistry;
use pixeltrack::config::TrackConfig;
use pixeltrack::detect;
use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "pixeltrack")]
#[command(about = "Track objects, color blobs and corners in images")]
#[command(version)]
struct Cli {
    /// Log level when built without the `tracing` feature.
    #[arg(long, global = true, default_value = "info")]
    log_level: log::LevelFilter,

    /// Emit JSON log lines (`tracing` feature only).
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tracker configured in a JSON file and write a JSON report.
    Track {
        /// Path to the run configuration.
        #[arg(long)]
        config: PathBuf,

        /// Report path; overrides `output_path` from the config.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List the built-in color names.
    Colors,
}

fn init_logging(cli: &Cli) {
    #[cfg(feature = "tracing")]
    {
        let _ = cli.log_level;
        let _ = LogTracer::init();
        pixeltrack::core::init_tracing(cli.json_logs);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = cli.json_logs;
        let _ = pixeltrack::core::init_with_level(cli.log_level);
    }
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.command {
        Commands::Track { config, out } => run_track(&config, out),
        Commands::Colors => {
            for name in ColorRegistry::with_builtins().names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn run_track(config_path: &Path, out: Option<PathBuf>) -> CliResult<()> {
    let cfg = TrackConfig::load_json(config_path)
        .map_err(|e| format!("failed to read config {}: {e}", config_path.display()))?;
    let report = detect::run(&cfg)?;
    let out = out.unwrap_or_else(|| cfg.output_path());
    report.write_json(&out)?;
    println!(
        "{} results written to {}",
        report.results.len(),
        out.display()
    );
    Ok(())
}
