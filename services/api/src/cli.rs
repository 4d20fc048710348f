use crate::score::{run_schema, run_score, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use premium_estimator::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Insurance Premium Estimator",
    about = "Serve and query the insurance premium model from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Estimate a premium for one applicant, locally or against a running service
    Score(ScoreArgs),
    /// Print the column order and scaler coverage of the configured artifacts
    Schema,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args).await,
        Command::Schema => run_schema(),
    }
}
