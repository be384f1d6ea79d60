pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use showprice_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "showprice",
    about = "Show pricing forecast CLI",
    long_about = "Recommend ticket prices from seasonal search demand, and build exportable show plans.",
    after_help = "Examples:\n  showprice recommend --category Concert --city Mumbai --month Jan --price 2000\n  showprice plan --scenarios plan.toml --output show_plan.csv\n  showprice doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a showprice.toml config file")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Evaluate one show scenario and recommend a price action")]
    Recommend {
        #[arg(long, help = "Show category, e.g. Concert, Standup, Workshop")]
        category: String,
        #[arg(long, help = "City or market name (unknown cities use a neutral multiplier)")]
        city: String,
        #[arg(long, help = "Target month: Jan..Dec, full name, or 1..12")]
        month: String,
        #[arg(long, help = "Your planned ticket price in whole currency units")]
        price: u64,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Evaluate every scenario in a TOML file and export the plan as CSV")]
    Plan {
        #[arg(long, help = "TOML file with [[scenario]] tables")]
        scenarios: PathBuf,
        #[arg(long, help = "CSV output path (defaults to export.path from config)")]
        output: Option<PathBuf>,
        #[arg(long, help = "Emit the evaluated plan as JSON")]
        json: bool,
    },
    #[command(about = "List show categories, base prices, keywords, and city multipliers")]
    Tables {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, reference tables, and the demand dataset")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
        ..LoadOptions::default()
    };
    init_logging(&options);

    let result = match cli.command {
        Command::Recommend { category, city, month, price, json } => {
            commands::recommend::run(&options, &category, &city, &month, price, json)
        }
        Command::Plan { scenarios, output, json } => {
            commands::plan::run(&options, &scenarios, output.as_deref(), json)
        }
        Command::Tables { json } => commands::tables::run(&options, json),
        Command::Config => commands::config::run(&options),
        Command::Doctor { json } => commands::doctor::run(&options, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so command output on stdout stays parseable.
fn init_logging(options: &LoadOptions) {
    use tracing::Level;

    let (level, format) = match AppConfig::load(options.clone()) {
        Ok(config) => {
            (config.logging.level.parse::<Level>().unwrap_or(Level::INFO), config.logging.format)
        }
        Err(_) => (Level::WARN, LogFormat::Compact),
    };

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(level);
    match format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}
