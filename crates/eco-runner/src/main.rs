//! Command-line driver: runs the ecosystem and streams population counts.

mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use eco_core::{PopulationSnapshot, RunConfig};
use eco_world::Simulation;
use std::io::{self, BufWriter, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;
use telemetry::LogFormat;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "eco-runner")]
#[command(version)]
#[command(about = "Grid ecosystem of plants, herbivores and carnivores")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the default configuration as JSON
    PrintConfig,
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Configuration file (JSON); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate (overrides the config file)
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Output format for the population series
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Log format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Stop once no herbivores or carnivores remain
    #[arg(long)]
    stop_on_extinction: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::PrintConfig) => {
            println!("{}", RunConfig::default().to_json_pretty()?);
            Ok(())
        }
        None => run(cli.run),
    }
}

fn run(args: RunArgs) -> Result<()> {
    telemetry::init_logging(args.log_format)?;

    let mut config = match &args.config {
        Some(path) => RunConfig::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(ticks) = args.ticks {
        config.num_ticks = ticks;
    }
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }
    config.stop_on_extinction |= args.stop_on_extinction;

    info!(
        num_ticks = config.num_ticks,
        seed = config.world.seed,
        "Starting eco-runner"
    );

    let mut simulation =
        Simulation::new(config.world.clone()).context("failed to build the world")?;
    simulation.set_metrics_interval(config.log_interval);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    stream_series(&mut simulation, &config, args.format, &mut out)?;

    Ok(())
}

/// Run the simulation and write one row per tick, stopping at the first
/// write failure. Returns the number of ticks executed.
fn stream_series<W: Write>(
    simulation: &mut Simulation,
    config: &RunConfig,
    format: OutputFormat,
    out: &mut W,
) -> Result<u64> {
    if format == OutputFormat::Csv {
        writeln!(out, "tick,plants,herbivores,carnivores")
            .context("failed to write population series")?;
    }

    let mut write_error = None;
    let executed = simulation.run_with(config.num_ticks, config.stop_on_extinction, |snapshot| {
        match write_snapshot(&mut *out, format, snapshot) {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => {
                write_error = Some(e);
                ControlFlow::Break(())
            }
        }
    });
    if let Some(e) = write_error {
        return Err(e).context("failed to write population series");
    }
    out.flush()?;

    Ok(executed)
}

fn write_snapshot<W: Write>(out: &mut W, format: OutputFormat, snapshot: &PopulationSnapshot) -> Result<()> {
    match format {
        OutputFormat::Csv => writeln!(out, "{}", snapshot.to_csv_row())?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, snapshot)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
