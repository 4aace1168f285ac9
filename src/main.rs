mod cmd;
mod currency;
mod error;
mod tax;
mod transaction;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "sharecgt",
    version,
    about = "Calculate UK Capital Gains Tax for share disposals"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Disposal events with cost, proceeds and FX/CGT gain split
    Report(cmd::report::ReportCommand),
    /// Per-tax-year totals with the annual exemption applied
    Summary(cmd::summary::SummaryCommand),
    /// Closing Section 104 pool balances
    Pools(cmd::pools::PoolsCommand),
    /// Print expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Report(cmd) => cmd.exec(),
        Command::Summary(cmd) => cmd.exec(),
        Command::Pools(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
