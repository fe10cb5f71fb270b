//! `pool-projection` CLI: run the pool slot allocation over CSV exports.
//!
//! ## Usage
//!
//! ```sh
//! # Project lane occupancy and write the consolidated table
//! pool-projection run --changeouts changeouts.csv --baseline baseline.csv \
//!     --arrivals arrivals.csv -o pool_projection.csv
//!
//! # JSON output plus the structured allocation log
//! pool-projection run --changeouts c.csv --baseline b.csv --arrivals a.csv \
//!     --format json --log allocation_log.json
//!
//! # Override the horizon from a config file
//! pool-projection run ... --config pool.json --horizon-start 2024-07-01
//!
//! # Check the three inputs without allocating
//! pool-projection validate --changeouts c.csv --baseline b.csv --arrivals a.csv
//!
//! # Show the component catalog
//! pool-projection catalog
//! ```
//!
//! Diagnostics go to stderr. `RUST_LOG` takes precedence over `-v`.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use pool_engine::table::{self, RejectedRow};
use pool_engine::{generate_pool_projection, ComponentKind, ProjectionConfig, ProjectionInputs};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "pool-projection",
    version,
    about = "Pool slot allocation for mining component changeouts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate changeouts to pool lanes and write the consolidated table
    Run {
        #[command(flatten)]
        inputs: InputArgs,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format of the consolidated table
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
        /// JSON config file (every field optional)
        #[arg(long)]
        config: Option<PathBuf>,
        /// First changeout date to allocate (YYYY-MM-DD); overrides the config
        #[arg(long)]
        horizon_start: Option<NaiveDate>,
        /// Write the allocation log as JSON to this file
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Check the input tables without allocating
    Validate {
        #[command(flatten)]
        inputs: InputArgs,
    },
    /// Print the component catalog
    Catalog {
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Changeouts table (CSV)
    #[arg(long)]
    changeouts: PathBuf,
    /// Baseline lane history (CSV)
    #[arg(long)]
    baseline: PathBuf,
    /// Component arrivals (CSV)
    #[arg(long)]
    arrivals: PathBuf,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            inputs,
            output,
            format,
            config,
            horizon_start,
            log,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(date) = horizon_start {
                config.horizon_start = date;
            }
            let inputs = read_inputs(&inputs)?;
            let projection = generate_pool_projection(&inputs, &config)
                .context("Failed to generate pool projection")?;

            let mut writer = open_output(output.as_deref())?;
            match format {
                Format::Csv => table::write_projection_csv(&projection, &mut writer)
                    .context("Failed to write projection CSV")?,
                Format::Json => {
                    let rows = table::projection_rows(&projection);
                    serde_json::to_writer_pretty(&mut writer, &rows)
                        .context("Failed to write projection JSON")?;
                    writeln!(writer)?;
                }
            }
            writer.flush().context("Failed to flush output")?;

            if let Some(path) = log {
                let json = serde_json::to_string_pretty(&projection.log)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write file: {}", path.display()))?;
            }

            let unallocated = projection.log.unallocated().count();
            if unallocated > 0 {
                eprintln!("{} changeout(s) could not be allocated", unallocated);
            }
        }
        Commands::Validate { inputs } => {
            let inputs = read_inputs(&inputs)?;
            println!("changeouts: {} rows", inputs.changeouts.len());
            println!("baseline:   {} rows", inputs.baseline.len());
            println!("arrivals:   {} rows", inputs.arrivals.len());
            print_rejected(&inputs.rejected);
        }
        Commands::Catalog { format } => match format {
            Format::Csv => {
                println!("code,slug,display_name,planned_days,unplanned_days,overrides");
                for kind in ComponentKind::ALL {
                    let ty = kind.component_type();
                    let overrides: Vec<String> = ty
                        .overrides
                        .iter()
                        .map(|o| {
                            format!(
                                "{}={}/{}",
                                o.subcomponent, o.planned_overhaul_days, o.unplanned_overhaul_days
                            )
                        })
                        .collect();
                    println!(
                        "{},{},{},{},{},{}",
                        ty.code,
                        ty.slug,
                        ty.display_name,
                        ty.planned_overhaul_days,
                        ty.unplanned_overhaul_days,
                        overrides.join(";")
                    );
                }
            }
            Format::Json => {
                let catalog: Vec<_> = ComponentKind::ALL
                    .iter()
                    .map(|k| k.component_type())
                    .collect();
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            }
        },
    }

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` wins over the `-v` count.
fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ProjectionConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            ProjectionConfig::from_json(&json)
                .with_context(|| format!("Invalid config: {}", path.display()))
        }
        None => Ok(ProjectionConfig::default()),
    }
}

fn open_input(path: &Path) -> Result<BufReader<File>> {
    let file =
        File::open(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn read_inputs(args: &InputArgs) -> Result<ProjectionInputs> {
    let inputs = table::read_inputs(
        open_input(&args.changeouts)?,
        open_input(&args.baseline)?,
        open_input(&args.arrivals)?,
    )
    .context("Failed to parse input tables")?;
    info!(
        changeouts = inputs.changeouts.len(),
        baseline = inputs.baseline.len(),
        arrivals = inputs.arrivals.len(),
        rejected = inputs.rejected.len(),
        "inputs loaded"
    );
    Ok(inputs)
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn print_rejected(rejected: &[RejectedRow]) {
    if rejected.is_empty() {
        println!("rejected:   none");
        return;
    }
    println!("rejected:   {} rows", rejected.len());
    for r in rejected {
        println!("  {} row {}: {}", r.table, r.row, r.reason);
    }
}
