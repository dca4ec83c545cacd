use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod cmd;

#[derive(Parser, Debug)]
#[command(name = "fintax", version, about = "Indian income tax estimates and transaction audits")]
struct Opts {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute income tax for an income figure
    Tax(cmd::tax::TaxCommand),
    /// Compare the old and new regimes for an income and its claims
    Compare(cmd::compare::CompareCommand),
    /// Score a transaction history for audit risk and estimate its tax
    Audit(cmd::audit::AuditCommand),
    /// Net worth from a list of assets and liabilities
    Networth(cmd::networth::NetWorthCommand),
    /// Print expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<ExitCode> {
    pretty_env_logger::init();

    let opts = Opts::parse();
    match opts.command {
        Command::Tax(tax) => tax.exec()?,
        Command::Compare(compare) => compare.exec()?,
        Command::Audit(audit) => return audit.exec(),
        Command::Networth(networth) => networth.exec()?,
        Command::Schema(schema) => schema.exec()?,
    }
    Ok(ExitCode::SUCCESS)
}
