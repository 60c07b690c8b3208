use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use junit_report_merger::constants::EXIT_SUCCESS;
use junit_report_merger::runner::run_merge;

#[derive(Debug, Parser)]
#[command(
    version = std::env!("CARGO_PKG_VERSION"),
    name = "junit-report-merger",
    about = "Merges multiple JUnit xml reports into one"
)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug)]
struct MergeArgs {
    #[arg(help = "The directory containing JUnit xml reports.")]
    directory: PathBuf,
    #[arg(help = "The file where to write the merged result.")]
    file: PathBuf,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Merge all JUnit xml reports found under a directory into one file
    Merge(MergeArgs),
}

fn main() -> anyhow::Result<()> {
    setup_logger()?;
    let cli = Cli::parse();
    match run(cli) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            log::error!("Error: {:?}", e);
            std::process::exit(exitcode::SOFTWARE);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Merge(merge_args) => {
            run_merge(&merge_args.directory, &merge_args.file)?;
            Ok(EXIT_SUCCESS)
        }
    }
}

fn setup_logger() -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log::LevelFilter::Info);
    if let Ok(log) = std::env::var("MERGE_LOG") {
        builder.parse_filters(&log);
    }
    builder.init();
    Ok(())
}
