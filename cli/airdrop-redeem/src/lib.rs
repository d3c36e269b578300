pub mod allocation;
pub mod chain;
pub mod common;
pub mod config;
pub mod error;
pub mod lookup;
pub mod redeem;
pub mod source;

pub use allocation::{Allocation, AllocationRecord, VestingCurve};
pub use chain::{vesting_state, ChainClient, JsonRpcClient, VestingState};
pub use common::{hex_encode, parse_address, write_file_atomic};
pub use config::{LookupConfig, RpcConfig};
pub use error::{Error, Result};
pub use lookup::AllocationLookup;
pub use redeem::{encode_redeem, RedeemTransaction, REDEEM_SELECTOR};
pub use source::{AllocationSource, HttpAllocationSource};
