mod commands;
mod helpers;

use clap::Parser;
use pgm_core::PgmError;
use pgm_core::StationSummary;
use tracing_subscriber::EnvFilter;

pub fn run_from_env() -> i32 {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let pgm_error = error.as_pgm_error();
            eprintln!("{}", pgm_error.diagnostic_line());
            pgm_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("pgm".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "pgm", version, about = "Strong-motion intensity measure engine")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Compute a station summary from a JSON trace bundle
    Summary(commands::SummaryArgs),
    /// List supported intensity measure types
    Imts,
    /// List supported intensity measure combinations
    Imcs,
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Summary(args) => commands::run_summary_command(args),
        CliCommand::Imts => commands::run_list_command(StationSummary::available_imts()),
        CliCommand::Imcs => commands::run_list_command(StationSummary::available_imcs()),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(PgmError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_pgm_error(&self) -> PgmError {
        match self {
            Self::Usage(message) => PgmError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => PgmError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
