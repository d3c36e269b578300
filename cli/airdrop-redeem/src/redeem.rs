use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use serde::Serialize;
use tracing::debug;

use crate::allocation::{validate_amount, Allocation};
use crate::common::serialize_checksummed;
use crate::error::{Error, Result};

sol! {
    interface IVestingPool {
        function redeem(
            uint8 curveType,
            uint16 durationWeeks,
            uint64 startDate,
            uint128 amount,
            bytes32[] calldata proof
        ) external;

        function vestings(bytes32 vestingId)
            external
            view
            returns (
                address account,
                uint8 curveType,
                bool managed,
                uint16 durationWeeks,
                uint64 startDate,
                uint128 amount,
                uint128 amountClaimed,
                uint64 pausingDate,
                bool cancelled
            );
    }
}

pub const REDEEM_SELECTOR: [u8; 4] = IVestingPool::redeemCall::SELECTOR;

fn overflow(field: &'static str, bits: u16, value: impl ToString) -> Error {
    Error::EncodingOverflow {
        field,
        bits,
        value: value.to_string(),
    }
}

/// Parses the decimal amount and checks it fits the pool's `uint128` slot.
fn amount_word(amount: &str) -> Result<u128> {
    validate_amount(amount)?;
    // Any parse failure past validation means the value has more than 256 bits.
    let value = U256::from_str_radix(amount, 10).map_err(|_| overflow("amount", 128, amount))?;
    if value > U256::from(u128::MAX) {
        return Err(overflow("amount", 128, amount));
    }
    Ok(value.to::<u128>())
}

/// Builds the call data for `redeem(uint8,uint16,uint64,uint128,bytes32[])`.
///
/// The layout is the selector followed by five head words (curve, duration,
/// start date, amount, offset of the proof array) and the proof tail (length,
/// then each node in the order received). Values are never truncated: a field
/// wider than its slot yields `Error::EncodingOverflow`.
pub fn encode_redeem(allocation: &Allocation) -> Result<Vec<u8>> {
    let duration_weeks = u16::try_from(allocation.duration_weeks)
        .map_err(|_| overflow("durationWeeks", 16, allocation.duration_weeks))?;

    let call = IVestingPool::redeemCall {
        curveType: allocation.curve.into(),
        durationWeeks: duration_weeks,
        startDate: allocation.start_date,
        amount: amount_word(&allocation.amount)?,
        proof: allocation.proof.clone(),
    };
    let data = call.abi_encode();
    debug!(
        vesting_id = %allocation.vesting_id,
        proof_len = allocation.proof.len(),
        bytes = data.len(),
        "Encoded redeem call"
    );
    Ok(data)
}

/// Unsigned transaction handed to an external signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemTransaction {
    #[serde(serialize_with = "serialize_checksummed")]
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub chain_id: u64,
}

impl RedeemTransaction {
    pub fn for_allocation(allocation: &Allocation) -> Result<Self> {
        Ok(Self {
            to: allocation.contract,
            value: U256::ZERO,
            data: Bytes::from(encode_redeem(allocation)?),
            chain_id: allocation.chain_id,
        })
    }
}
