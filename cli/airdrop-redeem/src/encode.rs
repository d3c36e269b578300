use std::fs;
use std::path::{Path, PathBuf};

use airdrop_redeem::lookup::select_allocation;
use airdrop_redeem::source::parse_payload;
use airdrop_redeem::{Allocation, AllocationLookup, RedeemTransaction};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::{emit, LookupArgs};

#[derive(Parser, Debug)]
#[command(name = "encode")]
#[command(about = "Build the redeem transaction for an allocation", long_about = None)]
pub struct Cli {
    /// Account address to look up
    #[arg(short, long, required_unless_present = "input", conflicts_with = "input")]
    address: Option<String>,

    /// Allocation JSON file (as written by `fetch`) instead of a lookup
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Allocation tag to redeem (defaults to the "user" allocation)
    #[arg(short, long)]
    tag: Option<String>,

    /// Output JSON file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    lookup: LookupArgs,
}

fn load_allocation(path: &Path, tag: Option<&str>) -> Result<Allocation> {
    let content = fs::read_to_string(path).context("Failed to read allocation file")?;
    let allocations = parse_payload(&content)?
        .into_iter()
        .map(Allocation::try_from)
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid allocation in file")?;
    select_allocation(allocations, tag).context("No matching allocation in file")
}

pub fn run(cli: &Cli) -> Result<()> {
    let tag = cli.tag.as_deref();
    let allocation = match (&cli.input, &cli.address) {
        (Some(path), _) => {
            info!("Reading allocation from {:?}...", path);
            load_allocation(path, tag)?
        }
        (None, Some(address)) => {
            let lookup = AllocationLookup::from_config(cli.lookup.config())
                .context("Failed to set up allocation lookup")?;
            info!("Fetching allocation for {}...", address);
            match tag {
                Some(tag) => lookup.fetch_tagged(address, tag),
                None => lookup.fetch(address),
            }
            .with_context(|| format!("Failed to fetch allocation for {}", address))?
        }
        (None, None) => anyhow::bail!("Either --address or --input is required"),
    };

    info!("Encoding redeem call...");
    let tx = RedeemTransaction::for_allocation(&allocation).context("Failed to encode redeem")?;
    info!(to = %tx.to, bytes = tx.data.len(), "Redeem transaction ready");

    let json = serde_json::to_string_pretty(&tx).context("Failed to serialize transaction")?;
    emit(&json, cli.output.as_deref())
}
