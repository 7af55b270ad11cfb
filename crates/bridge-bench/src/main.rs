use std::path::PathBuf;

use clap::Parser;

use bridge_bench::config::{BenchConfig, ResolvedOutputs};
use bridge_bench::harness::Harness;
use bridge_bench::logging::init_logging;

/// Play-out harness for the bridge search AI.
#[derive(Debug, Parser)]
#[command(
    name = "bridge-bench",
    author,
    version,
    about = "Deterministic bridge play-out harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of boards to play.
    #[arg(long, value_name = "BOARDS")]
    boards: Option<usize>,

    /// Override the RNG seed for deal generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the search depth in card plays.
    #[arg(long, value_name = "DEPTH")]
    depth: Option<u8>,

    /// Exit after validating the configuration (no boards are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(boards) = cli.boards {
        config.deals.boards = boards;
    }

    if let Some(seed) = cli.seed {
        config.deals.seed = Some(seed);
    }

    if let Some(depth) = cli.depth {
        config.search.depth = depth;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();

    println!(
        "Loaded configuration '{run_id}': {} boards of {} by {} at depth {}",
        config.deals.boards, config.contract.call, config.contract.declarer, config.search.depth
    );

    let logging_guard = init_logging(&config.logging, &outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: no boards played.");
        return Ok(());
    }

    let harness = Harness::new(config, outputs);
    let summary = harness.run()?;

    println!(
        "Run '{run_id}' complete: {} boards (seed {}) → {} rows at {}",
        summary.boards_played,
        summary.seed,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!(
        "Contracts made: {} of {}",
        summary.contracts_made, summary.boards_played
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Trace log: {}", guard.trace_path.display());
    }

    Ok(())
}
