use anyhow::Result;
use clap::Parser;
use pm0_runtime::{Machine, MachineError, RunOutcome};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod config;

/// Run a PM/0 program.
///
/// Prints the program listing, then executes it with a trace of the
/// registers and stack after every instruction (until NDB runs).
///
/// EXAMPLES:
///     pm0 hello.pm0                 List, trace and run a program
///     pm0 --no-trace hello.pm0      Run without per-step trace output
///     pm0 --strict-bounds prog.pm0  Treat stack overrun as fatal
///
/// ENVIRONMENT VARIABLES:
///     PM0_CONFIG            Configuration file used instead of pm0.toml
///     PM0_TRACE             Set to '0' to disable tracing by default
///     PM0_STRICT_BOUNDS     Set to '1' to enable strict bounds
///     PM0_CHECK_INVARIANTS  Set to '1' to check registers after each step
///     RUST_LOG              Log filter for diagnostics on stderr (default: warn)
#[derive(Parser)]
#[command(name = "pm0")]
#[command(version)]
struct Cli {
    /// Program file of `opcode operand` pairs
    #[arg(value_name = "CODE_FILENAME", value_parser = parse_code_filename)]
    code_filename: PathBuf,
    /// Configuration file (defaults to the nearest pm0.toml)
    #[arg(long, value_name = "FILE", env = "PM0_CONFIG")]
    config: Option<PathBuf>,
    /// Start with tracing turned off
    #[arg(long)]
    no_trace: bool,
    /// Make stack overrun and running past the program fatal
    #[arg(long)]
    strict_bounds: bool,
    /// Verify register consistency after every instruction
    #[arg(long)]
    check_invariants: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli) {
        Ok(outcome) => {
            info!(reason = ?outcome.reason, steps = outcome.steps, "run complete");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<RunOutcome> {
    let overrides = config::Overrides {
        no_trace: cli.no_trace,
        strict_bounds: cli.strict_bounds,
        check_invariants: cli.check_invariants,
    };
    let machine_config = config::resolve(cli.config.as_deref(), &overrides)?;

    let outcome = Machine::new(machine_config).run_file(&cli.code_filename)?;
    Ok(outcome)
}

/// Program file names may not start with '-'; `-` is not read as stdin
fn parse_code_filename(arg: &str) -> Result<PathBuf, String> {
    if arg.starts_with('-') {
        return Err(format!("program file name cannot start with '-': '{}'", arg));
    }
    Ok(PathBuf::from(arg))
}

/// Print one diagnostic line after whatever the program already wrote
fn report(err: &anyhow::Error) {
    let _ = io::stdout().flush();
    match err.downcast_ref::<MachineError>() {
        Some(machine_err) => eprintln!("{}", machine_err),
        None => eprintln!("Error: {:#}", err),
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`)
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
