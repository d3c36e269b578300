use std::time::Duration;

use airdrop_redeem::{vesting_state, AllocationLookup, JsonRpcClient, RpcConfig};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use crate::{emit, LookupArgs};

#[derive(Parser, Debug)]
#[command(name = "status")]
#[command(about = "Show the on-chain vesting state of an allocation", long_about = None)]
pub struct Cli {
    /// Account address to look up
    #[arg(short, long)]
    address: String,

    /// Allocation tag (defaults to the "user" allocation)
    #[arg(short, long)]
    tag: Option<String>,

    /// JSON-RPC endpoint of the allocation's chain
    #[arg(long, env = "ETH_RPC_URL")]
    rpc_url: String,

    #[command(flatten)]
    lookup: LookupArgs,
}

pub fn run(cli: &Cli) -> Result<()> {
    let lookup = AllocationLookup::from_config(cli.lookup.config())
        .context("Failed to set up allocation lookup")?;
    let allocation = match cli.tag.as_deref() {
        Some(tag) => lookup.fetch_tagged(&cli.address, tag),
        None => lookup.fetch(&cli.address),
    }
    .with_context(|| format!("Failed to fetch allocation for {}", cli.address))?;

    let rpc = RpcConfig::new(cli.rpc_url.clone())
        .with_timeout(Duration::from_secs(cli.lookup.timeout_secs));
    let client = JsonRpcClient::new(rpc).context("Failed to set up RPC client")?;

    info!("Reading vesting {} from {}...", allocation.vesting_id, allocation.contract);
    let state = vesting_state(&client, &allocation).context("Failed to read vesting state")?;
    if state.is_redeemed() {
        info!(claimed = %state.amount_claimed, "Vesting already redeemed");
    } else {
        warn!("Vesting not redeemed yet");
    }

    let json = serde_json::to_string_pretty(&state).context("Failed to serialize state")?;
    emit(&json, None)
}
