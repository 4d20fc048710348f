mod cli;
mod client;
mod infra;
mod routes;
mod score;
mod server;

use premium_estimator::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
