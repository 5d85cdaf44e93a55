mod cli;
mod console;
mod infra;
mod routes;
mod server;

use school_select::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
