mod cli;
mod commands;
mod infra;

use arbomap::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
