use clap::Parser;
use ohmspice::output;
use ohmspice::stats::Stats;
use ohmspice::SimulationResults;
use std::io::{self, Write};
use std::path::PathBuf;

/// Decode SPICE raw output files
#[derive(Parser)]
#[command(name = "ohmspice", version)]
struct Cli {
    /// Raw file written by the simulator
    raw_file: PathBuf,

    /// Print a header summary instead of CSV
    #[arg(long)]
    summary: bool,

    /// Only export these signals (node name, component name or exact variable)
    #[arg(long = "signal", value_name = "NAME")]
    signals: Vec<String>,

    /// Re-emit the decoded data as a binary raw file
    #[arg(long, value_name = "OUT")]
    convert: Option<PathBuf>,

    /// Print parse stats to stderr
    #[arg(long)]
    stats: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut stats = if cli.stats { Some(Stats::new()) } else { None };

    let results = SimulationResults::open_with_stats(&cli.raw_file, stats.as_mut())
        .unwrap_or_else(|e| {
            eprintln!("Error reading {}: {}", cli.raw_file.display(), e);
            std::process::exit(1);
        });

    let mut stdout = io::stdout().lock();

    if let Some(out) = &cli.convert {
        results.raw().save(out).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {}", out.display(), e);
            std::process::exit(1);
        });
    } else if cli.summary {
        output::write_summary(&results, &mut stdout).unwrap_or_else(|e| {
            eprintln!("Output error: {}", e);
            std::process::exit(1);
        });
    } else if cli.signals.is_empty() {
        output::write_csv(&results, &mut stdout).unwrap_or_else(|e| {
            eprintln!("Output error: {}", e);
            std::process::exit(1);
        });
    } else {
        let columns = selected_columns(&results, &cli.signals);
        output::write_csv_columns(&results, &columns, &mut stdout).unwrap_or_else(|e| {
            eprintln!("Output error: {}", e);
            std::process::exit(1);
        });
    }
    stdout.flush().unwrap_or_else(|e| {
        eprintln!("Output error: {}", e);
        std::process::exit(1);
    });

    if let Some(ref stats) = stats {
        stats.display();
    }
}

/// Axis variable first, then each requested signal resolved to its store key.
fn selected_columns<'a>(results: &'a SimulationResults, signals: &[String]) -> Vec<&'a str> {
    let mut columns: Vec<&str> = Vec::new();
    if let Some((axis, _)) = results.store().iter().next() {
        columns.push(axis);
    }
    for signal in signals {
        let key = results.resolve(signal).unwrap_or_else(|| {
            eprintln!(
                "Signal '{}' not found. Available: {:?}",
                signal,
                results.variable_names()
            );
            std::process::exit(1);
        });
        if !columns.contains(&key) {
            columns.push(key);
        }
    }
    columns
}
