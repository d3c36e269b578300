use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::common::{parse_checksummed_address, parse_hash, serialize_checksummed};
use crate::error::{Error, Result};

/// Vesting curve selector understood by the vesting pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum VestingCurve {
    Linear = 0,
    Exponential = 1,
}

impl From<VestingCurve> for u8 {
    fn from(curve: VestingCurve) -> Self {
        curve as u8
    }
}

impl TryFrom<u64> for VestingCurve {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self> {
        match value {
            0 => Ok(VestingCurve::Linear),
            1 => Ok(VestingCurve::Exponential),
            other => Err(Error::Malformed(format!("unsupported curve id {}", other))),
        }
    }
}

/// Allocation as published by the data service, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRecord {
    pub tag: String,
    pub account: String,
    pub chain_id: u64,
    pub contract: String,
    pub vesting_id: String,
    pub duration_weeks: u64,
    pub start_date: u64,
    pub amount: String,
    pub curve: u64,
    pub proof: Vec<String>,
}

/// A validated vesting claim for one account.
///
/// `amount` is kept as the decimal string received so that no precision is
/// lost before encoding; the encoder enforces the on-chain width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub tag: String,
    #[serde(serialize_with = "serialize_checksummed")]
    pub account: Address,
    pub chain_id: u64,
    #[serde(serialize_with = "serialize_checksummed")]
    pub contract: Address,
    pub vesting_id: B256,
    pub duration_weeks: u64,
    pub start_date: u64,
    pub amount: String,
    pub curve: VestingCurve,
    pub proof: Vec<B256>,
}

fn record_address(value: &str, field: &str) -> Result<Address> {
    parse_checksummed_address(value).map_err(|e| Error::Malformed(format!("{}: {}", field, e)))
}

/// Checks that `amount` is a non-empty run of decimal digits. A leading sign
/// or fractional part is rejected.
pub fn validate_amount(amount: &str) -> Result<()> {
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Malformed(format!(
            "amount: expected a non-negative decimal integer, got {:?}",
            amount
        )));
    }
    Ok(())
}

impl TryFrom<AllocationRecord> for Allocation {
    type Error = Error;

    fn try_from(record: AllocationRecord) -> Result<Self> {
        if record.tag.trim().is_empty() {
            return Err(Error::Malformed("tag: must not be empty".into()));
        }
        if record.chain_id == 0 {
            return Err(Error::Malformed("chainId: must be positive".into()));
        }
        if record.duration_weeks == 0 {
            return Err(Error::Malformed("durationWeeks: must be positive".into()));
        }
        if record.start_date == 0 {
            return Err(Error::Malformed("startDate: must be positive".into()));
        }
        validate_amount(&record.amount)?;
        if record.proof.is_empty() {
            return Err(Error::Malformed("proof: must not be empty".into()));
        }

        let proof = record
            .proof
            .iter()
            .enumerate()
            .map(|(i, node)| parse_hash(node, &format!("proof[{}]", i)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Allocation {
            account: record_address(&record.account, "account")?,
            contract: record_address(&record.contract, "contract")?,
            vesting_id: parse_hash(&record.vesting_id, "vestingId")?,
            curve: VestingCurve::try_from(record.curve)?,
            tag: record.tag,
            chain_id: record.chain_id,
            duration_weeks: record.duration_weeks,
            start_date: record.start_date,
            amount: record.amount,
            proof,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::hex_encode;

    const SINGLE: &str = include_str!("../testdata/allocation_single.json");

    fn record() -> AllocationRecord {
        let records: Vec<AllocationRecord> = serde_json::from_str(SINGLE).unwrap();
        records.into_iter().next().unwrap()
    }

    #[test]
    fn test_valid_record() {
        let allocation = Allocation::try_from(record()).unwrap();
        assert_eq!(allocation.tag, "user");
        assert_eq!(
            allocation.account.to_checksum(None),
            "0xa1097B957A62B75482CFB9Af960Cbd6B8F9F02e8"
        );
        assert_eq!(allocation.chain_id, 1);
        assert_eq!(allocation.duration_weeks, 416);
        assert_eq!(allocation.start_date, 1538042400);
        assert_eq!(allocation.amount, "1854720164105111994368");
        assert_eq!(allocation.curve, VestingCurve::Linear);
        assert_eq!(allocation.proof.len(), 16);
    }

    #[test]
    fn test_proof_order_is_preserved() {
        let raw = record();
        let allocation = Allocation::try_from(raw.clone()).unwrap();
        for (node, expected) in allocation.proof.iter().zip(&raw.proof) {
            assert_eq!(&hex_encode(node), expected);
        }
    }

    #[test]
    fn test_empty_tag() {
        let mut raw = record();
        raw.tag = " ".into();
        assert!(matches!(Allocation::try_from(raw), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_negative_amount() {
        let mut raw = record();
        raw.amount = "-1".into();
        assert!(matches!(Allocation::try_from(raw), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_decimal_point_amount() {
        let mut raw = record();
        raw.amount = "1.5".into();
        assert!(matches!(Allocation::try_from(raw), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_huge_amount_is_kept_for_the_encoder() {
        let mut raw = record();
        raw.amount = "1".repeat(100);
        let allocation = Allocation::try_from(raw).unwrap();
        assert_eq!(allocation.amount.len(), 100);
    }

    #[test]
    fn test_empty_proof() {
        let mut raw = record();
        raw.proof.clear();
        assert!(matches!(Allocation::try_from(raw), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_short_proof_node() {
        let mut raw = record();
        raw.proof[3] = "0x1234".into();
        match Allocation::try_from(raw) {
            Err(Error::Malformed(msg)) => assert!(msg.starts_with("proof[3]")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_bad_vesting_id() {
        let mut raw = record();
        raw.vesting_id = "0xzz".into();
        assert!(matches!(Allocation::try_from(raw), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_bad_contract_checksum() {
        let mut raw = record();
        raw.contract = "0xa0B937D5c8E32a80E3a8ed4227CD020221544ee6".into();
        match Allocation::try_from(raw) {
            Err(Error::Malformed(msg)) => assert!(msg.starts_with("contract")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_zero_duration_and_start() {
        let mut raw = record();
        raw.duration_weeks = 0;
        assert!(matches!(Allocation::try_from(raw), Err(Error::Malformed(_))));

        let mut raw = record();
        raw.start_date = 0;
        assert!(matches!(Allocation::try_from(raw), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_unsupported_curve() {
        let mut raw = record();
        raw.curve = 7;
        assert!(matches!(Allocation::try_from(raw), Err(Error::Malformed(_))));
        assert_eq!(VestingCurve::try_from(1).unwrap(), VestingCurve::Exponential);
    }

    #[test]
    fn test_serializes_like_the_service() {
        let allocation = Allocation::try_from(record()).unwrap();
        let json = serde_json::to_value(&allocation).unwrap();
        assert_eq!(json["account"], "0xa1097B957A62B75482CFB9Af960Cbd6B8F9F02e8");
        assert_eq!(json["durationWeeks"], 416);
        assert_eq!(json["curve"], 0);
        assert_eq!(json["amount"], "1854720164105111994368");

        let back: AllocationRecord = serde_json::from_value(json).unwrap();
        assert_eq!(Allocation::try_from(back).unwrap(), allocation);
    }
}
