use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::allocation::Allocation;
use crate::common::{hex_encode, serialize_checksummed};
use crate::config::RpcConfig;
use crate::error::{Error, Result};
use crate::redeem::IVestingPool;

/// Read-only access to contract state.
pub trait ChainClient {
    fn call_contract(&self, to: Address, data: &[u8]) -> Result<Bytes>;
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorObject>,
}

/// Extracts the return data of an `eth_call` from a JSON-RPC response body.
pub fn parse_rpc_response(body: &str) -> Result<Bytes> {
    let response: RpcResponse = serde_json::from_str(body)
        .map_err(|e| Error::Malformed(format!("invalid JSON-RPC response: {}", e)))?;
    if let Some(error) = response.error {
        return Err(Error::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    let result = response
        .result
        .ok_or_else(|| Error::Malformed("JSON-RPC response without result".into()))?;
    let cleaned = result.strip_prefix("0x").unwrap_or(&result);
    let data = hex::decode(cleaned)
        .map_err(|e| Error::Malformed(format!("invalid call result hex: {}", e)))?;
    Ok(Bytes::from(data))
}

/// `eth_call` over HTTP JSON-RPC against the latest block.
pub struct JsonRpcClient {
    client: Client,
    url: String,
}

impl JsonRpcClient {
    pub fn new(config: RpcConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: config.url,
        })
    }
}

impl ChainClient for JsonRpcClient {
    fn call_contract(&self, to: Address, data: &[u8]) -> Result<Bytes> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [{ "to": to.to_checksum(None), "data": hex_encode(data) }, "latest"],
        });
        debug!(%to, bytes = data.len(), "eth_call");

        let response = self.client.post(&self.url).json(&request).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::from_status(status, "RPC endpoint"));
        }
        parse_rpc_response(&response.text()?)
    }
}

/// On-chain record of a vesting inside the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VestingState {
    #[serde(serialize_with = "serialize_checksummed")]
    pub account: Address,
    pub curve_type: u8,
    pub managed: bool,
    pub duration_weeks: u16,
    pub start_date: u64,
    pub amount: u128,
    pub amount_claimed: u128,
    pub pausing_date: u64,
    pub cancelled: bool,
}

impl VestingState {
    /// The pool only stores an account once the vesting was redeemed.
    pub fn is_redeemed(&self) -> bool {
        self.account != Address::ZERO
    }
}

/// Reads `vestings(vestingId)` for the allocation from its pool contract.
pub fn vesting_state<C: ChainClient>(client: &C, allocation: &Allocation) -> Result<VestingState> {
    let call = IVestingPool::vestingsCall {
        vestingId: allocation.vesting_id,
    };
    let output = client.call_contract(allocation.contract, &call.abi_encode())?;
    let ret = IVestingPool::vestingsCall::abi_decode_returns(&output)
        .map_err(|e| Error::Malformed(format!("cannot decode vestings() result: {}", e)))?;

    Ok(VestingState {
        account: ret.account,
        curve_type: ret.curveType,
        managed: ret.managed,
        duration_weeks: ret.durationWeeks,
        start_date: ret.startDate,
        amount: ret.amount,
        amount_claimed: ret.amountClaimed,
        pausing_date: ret.pausingDate,
        cancelled: ret.cancelled,
    })
}
