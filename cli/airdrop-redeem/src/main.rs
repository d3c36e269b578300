#![forbid(unsafe_code)]
#![allow(unreachable_pub)]

use std::path::Path;
use std::time::Duration;

use airdrop_redeem::config::{DEFAULT_ALLOCATIONS_URL, DEFAULT_CHAIN_ID};
use airdrop_redeem::{write_file_atomic, LookupConfig};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod encode;
mod fetch;
mod status;

#[derive(Parser, Debug)]
#[command(name = "airdrop")]
#[command(about = "Vesting pool airdrop allocation and redeem tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Fetch(fetch::Cli),
    Encode(encode::Cli),
    Status(status::Cli),
}

/// Allocation data service settings shared by the subcommands.
#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    /// Base URL of the allocation data service
    #[arg(long, env = "AIRDROP_DATA_URL", default_value = DEFAULT_ALLOCATIONS_URL)]
    pub data_url: String,

    /// Chain the allocations are published for
    #[arg(long, env = "AIRDROP_CHAIN_ID", default_value_t = DEFAULT_CHAIN_ID)]
    pub chain_id: u64,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,
}

impl LookupArgs {
    pub fn config(&self) -> LookupConfig {
        LookupConfig::new(self.data_url.clone(), self.chain_id)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// Prints `json` to stdout, or writes it atomically to `output`.
pub fn emit(json: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            info!("Writing {:?}...", path);
            write_file_atomic(path, json).context("Failed to write output file")?;
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch(args) => fetch::run(&args)?,
        Commands::Encode(args) => encode::run(&args)?,
        Commands::Status(args) => status::run(&args)?,
    }

    Ok(())
}
