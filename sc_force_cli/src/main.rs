//! # sc_force_cli
//!
//! Command-line front end for the short-circuit force engine.
//!
//! ```bash
//! sc_force_cli calculate --input twin_bundle.json
//! sc_force_cli sweep --min 5 --max 30 --step 0.5 --json
//! sc_force_cli equations > EQUATIONS.md
//! ```
//!
//! Exit codes: 0 success, 1 calculation or validation error (error JSON on
//! stderr), 2 usage error.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sc_force_core::calculations::{
    run_registered_sweep, Dispatcher, FormInput, RunRegistry, SweepBoard, SweepConfig,
};
use sc_force_core::equations::generate_equations_markdown;
use sc_force_core::{CalcError, CalcResult, CalculationReport, ConductorInput};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Short-circuit forces on flexible conductors (SN EN 60865-1)",
    long_about = None
)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Forces at the low and high reference temperature
    Calculate {
        /// Form input as JSON; the twin bundle worked example when omitted
        #[arg(long)]
        input: Option<PathBuf>,
        /// Print the JSON report instead of the table
        #[arg(long)]
        json: bool,
    },
    /// Sweep the low-temperature static tension
    Sweep {
        #[arg(long)]
        input: Option<PathBuf>,
        /// Lowest static tension in kN
        #[arg(long, default_value_t = 0.01)]
        min: f64,
        /// Highest static tension in kN
        #[arg(long, default_value_t = 35.0)]
        max: f64,
        /// Grid step in kN
        #[arg(long, default_value_t = 0.01)]
        step: f64,
        #[arg(long)]
        json: bool,
    },
    /// Print the equation registry as markdown
    Equations,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_input(path: Option<&Path>) -> CalcResult<ConductorInput> {
    let form = match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| {
                CalcError::invalid_input(
                    "input",
                    path.display().to_string(),
                    format!("cannot read file: {}", e),
                )
            })?;
            serde_json::from_str::<FormInput>(&text)
                .map_err(|e| CalcError::SerializationError { reason: e.to_string() })?
        }
        None => {
            debug!("no input file, using the twin bundle worked example");
            FormInput::twin_bundle_example()
        }
    };
    form.normalize()
}

const SUPERSCRIPTS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// Plain notation inside [0.001, 1000], otherwise `m·10ⁿ`.
fn format_value(value: Option<f64>) -> String {
    let Some(value) = value else {
        return "-".to_string();
    };
    let magnitude = value.abs();
    if value == 0.0 || (0.001..=1000.0).contains(&magnitude) {
        return format!("{:.4}", value);
    }

    let mut exponent = magnitude.log10().floor() as i32;
    let mut mantissa = value / 10f64.powi(exponent);
    // Rounding to three decimals can carry into the next decade
    if (mantissa.abs() * 1000.0).round() >= 10_000.0 {
        exponent += 1;
        mantissa /= 10.0;
    }

    let mut superscript = String::new();
    if exponent < 0 {
        superscript.push('⁻');
    }
    for digit in exponent.unsigned_abs().to_string().chars() {
        if let Some(d) = digit.to_digit(10) {
            superscript.push(SUPERSCRIPTS[d as usize]);
        }
    }
    format!("{:.3}·10{}", mantissa, superscript)
}

fn print_table(report: &CalculationReport) {
    let results = &report.results;
    println!("Regime {}", report.regime);
    println!("Forces in kN");
    println!();
    println!(
        "{:<10} {:>16} {:>16}",
        "Parameter",
        format!("{} °C", results.temperature_low),
        format!("{} °C", results.temperature_high)
    );
    println!("{}", "-".repeat(44));
    for ((name, low), (_, high)) in results.low.fields().into_iter().zip(results.high.fields()) {
        if low.is_none() && high.is_none() {
            continue;
        }
        println!("{:<10} {:>16} {:>16}", name, format_value(low), format_value(high));
    }
}

fn calculate(input: Option<&Path>, json: bool) -> CalcResult<()> {
    let input = load_input(input)?;
    let report = CalculationReport::generate(&Dispatcher::default(), input)?;
    if json {
        println!("{}", report.to_json()?);
    } else {
        print_table(&report);
    }
    Ok(())
}

fn sweep(input: Option<&Path>, config: SweepConfig, json: bool) -> CalcResult<()> {
    let mut input = load_input(input)?;
    let registry = Arc::new(RunRegistry::default());
    let board = SweepBoard::default();
    let mut dispatcher = Dispatcher::default();

    let run_id = run_registered_sweep(&registry, &board, &mut input, &mut dispatcher, config)?;
    let Some(table) = board.snapshot() else {
        info!(run_id, "sweep superseded before publishing");
        return Ok(());
    };

    if json {
        let text = serde_json::to_string_pretty(table.rows.as_slice())
            .map_err(|e| CalcError::SerializationError { reason: e.to_string() })?;
        println!("{}", text);
    } else {
        println!("{:>10} {:>16} {:>16} {:>16}", "F_st", "F_td", "F_fd", "F_pi_d");
        for row in table.rows.iter() {
            println!(
                "{:>10} {:>16} {:>16} {:>16}",
                format_value(Some(row.f_st)),
                format_value(row.f_td),
                format_value(row.f_fd),
                format_value(row.f_pi_d)
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match &cli.command {
        Commands::Calculate { input, json } => calculate(input.as_deref(), *json),
        Commands::Sweep {
            input,
            min,
            max,
            step,
            json,
        } => {
            let config = SweepConfig {
                min: *min,
                max: *max,
                step: *step,
            };
            sweep(input.as_deref(), config, *json)
        }
        Commands::Equations => {
            print!("{}", generate_equations_markdown());
            Ok(())
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_cancellation() => {
            info!(%err, "run cancelled");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let body = serde_json::to_string(&err).unwrap_or_else(|_| err.to_string());
            eprintln!("{}", body);
            ExitCode::from(1)
        }
    }
}
