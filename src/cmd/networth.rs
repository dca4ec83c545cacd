//! Net worth command - assets minus liabilities

use super::{format_inr, read_wealth};
use clap::Args;
use fintax::core::net_worth;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct NetWorthCommand {
    /// CSV or JSON file containing wealth items ("-" for stdin)
    #[arg(short, long)]
    wealth: PathBuf,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl NetWorthCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let items = read_wealth(&self.wealth)?;
        let worth = net_worth(&items);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&worth)?);
        } else {
            println!();
            println!(
                "  Assets: {} | Liabilities: {}",
                format_inr(worth.assets),
                format_inr(worth.liabilities)
            );
            println!("NET WORTH: {}", format_inr(worth.net));
            println!();
        }
        Ok(())
    }
}
