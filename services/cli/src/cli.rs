use crate::commands::{
    run_estimate, run_price_list_import, run_recompute, EstimateArgs, PriceListImportArgs,
    RecomputeArgs,
};
use arbomap::error::AppError;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "arbomap",
    about = "Estimate arborist intervention prices from tree assessments",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print estimates for the dataset's interventions without changing them
    Estimate(EstimateArgs),
    /// Reprice every tree's interventions and report what changed
    Recompute(RecomputeArgs),
    /// Work with NOO price-list exports
    PriceList {
        #[command(subcommand)]
        command: PriceListCommand,
    },
}

#[derive(Subcommand, Debug)]
enum PriceListCommand {
    /// Parse an export and print the import summary
    Import(PriceListImportArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    match Cli::parse().command {
        Command::Estimate(args) => run_estimate(args),
        Command::Recompute(args) => run_recompute(args),
        Command::PriceList {
            command: PriceListCommand::Import(args),
        } => run_price_list_import(args),
    }
}
