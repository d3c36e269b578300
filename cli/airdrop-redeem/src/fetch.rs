use std::path::PathBuf;

use airdrop_redeem::AllocationLookup;
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::{emit, LookupArgs};

#[derive(Parser, Debug)]
#[command(name = "fetch")]
#[command(about = "Fetch every allocation of an account", long_about = None)]
pub struct Cli {
    /// Account address (checksummed or lowercase)
    #[arg(short, long)]
    address: String,

    /// Output JSON file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    lookup: LookupArgs,
}

pub fn run(cli: &Cli) -> Result<()> {
    let lookup = AllocationLookup::from_config(cli.lookup.config())
        .context("Failed to set up allocation lookup")?;

    info!("Fetching allocations for {}...", cli.address);
    let allocations = lookup
        .fetch_all(&cli.address)
        .with_context(|| format!("Failed to fetch allocations for {}", cli.address))?;

    for allocation in &allocations {
        info!(
            tag = %allocation.tag,
            amount = %allocation.amount,
            proof_len = allocation.proof.len(),
            "Allocation"
        );
    }

    let json =
        serde_json::to_string_pretty(&allocations).context("Failed to serialize allocations")?;
    emit(&json, cli.output.as_deref())
}
