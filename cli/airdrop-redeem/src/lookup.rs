use tracing::{info, warn};

use crate::allocation::Allocation;
use crate::common::parse_address;
use crate::config::LookupConfig;
use crate::error::{Error, Result};
use crate::source::{AllocationSource, HttpAllocationSource};

/// Tag the data service uses for an account's own airdrop.
pub const USER_TAG: &str = "user";

/// Resolves an account address to its validated allocations.
pub struct AllocationLookup<S> {
    source: S,
}

impl AllocationLookup<HttpAllocationSource> {
    pub fn from_config(config: LookupConfig) -> Result<Self> {
        Ok(Self::new(HttpAllocationSource::new(config)?))
    }
}

impl<S: AllocationSource> AllocationLookup<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Every allocation of `address`, in source order.
    ///
    /// # Errors
    /// * `InvalidAddress` if `address` does not parse
    /// * `NotFound` if the source has nothing for the account
    /// * `Malformed` if any record fails validation or belongs to another
    ///   account or chain
    /// * `Transient` for network or service failures
    pub fn fetch_all(&self, address: &str) -> Result<Vec<Allocation>> {
        let account = parse_address(address)?;
        let records = self.source.allocations(account)?;
        if records.is_empty() {
            return Err(Error::NotFound(account));
        }

        let chain_id = self.source.chain_id();
        let mut allocations = Vec::with_capacity(records.len());
        for record in records {
            let allocation = Allocation::try_from(record).inspect_err(|e| {
                warn!(%account, error = %e, "Rejected allocation record");
            })?;
            if allocation.account != account {
                return Err(Error::Malformed(format!(
                    "record for {} returned when asking for {}",
                    allocation.account, account
                )));
            }
            if allocation.chain_id != chain_id {
                return Err(Error::Malformed(format!(
                    "record for chain {} returned by source for chain {}",
                    allocation.chain_id, chain_id
                )));
            }
            allocations.push(allocation);
        }

        info!(%account, count = allocations.len(), "Fetched allocations");
        Ok(allocations)
    }

    /// The account's `"user"` allocation, or its first one when no record
    /// carries that tag.
    pub fn fetch(&self, address: &str) -> Result<Allocation> {
        self.fetch_selected(address, None)
    }

    /// The allocation carrying `tag`.
    pub fn fetch_tagged(&self, address: &str, tag: &str) -> Result<Allocation> {
        self.fetch_selected(address, Some(tag))
    }

    fn fetch_selected(&self, address: &str, tag: Option<&str>) -> Result<Allocation> {
        let account = parse_address(address)?;
        let allocations = self.fetch_all(address)?;
        select_allocation(allocations, tag).ok_or(Error::NotFound(account))
    }
}

/// Picks the allocation with `tag`, or without a tag the `"user"` one,
/// falling back to the first.
pub fn select_allocation(mut allocations: Vec<Allocation>, tag: Option<&str>) -> Option<Allocation> {
    let index = match tag {
        Some(tag) => allocations.iter().position(|a| a.tag == tag)?,
        None => allocations
            .iter()
            .position(|a| a.tag == USER_TAG)
            .unwrap_or(0),
    };
    (index < allocations.len()).then(|| allocations.swap_remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{AllocationRecord, VestingCurve};
    use crate::common::hex_encode;
    use crate::source::parse_payload;
    use alloy_primitives::Address;
    use std::collections::HashMap;

    const SINGLE: &str = include_str!("../testdata/allocation_single.json");
    const MULTI: &str = include_str!("../testdata/allocation_multi.json");

    /// In-memory stand-in for the data service.
    struct MemorySource {
        chain_id: u64,
        records: HashMap<Address, Vec<AllocationRecord>>,
    }

    impl MemorySource {
        fn fixtures() -> Self {
            let mut records = HashMap::new();
            for body in [SINGLE, MULTI] {
                let parsed = parse_payload(body).unwrap();
                let account = parse_address(&parsed[0].account).unwrap();
                records.insert(account, parsed);
            }
            Self {
                chain_id: 1,
                records,
            }
        }
    }

    impl AllocationSource for MemorySource {
        fn chain_id(&self) -> u64 {
            self.chain_id
        }

        fn allocations(&self, account: Address) -> Result<Vec<AllocationRecord>> {
            self.records
                .get(&account)
                .cloned()
                .ok_or(Error::NotFound(account))
        }
    }

    struct FailingSource;

    impl AllocationSource for FailingSource {
        fn chain_id(&self) -> u64 {
            1
        }

        fn allocations(&self, _account: Address) -> Result<Vec<AllocationRecord>> {
            Err(Error::Transient("connection reset".into()))
        }
    }

    fn lookup() -> AllocationLookup<MemorySource> {
        AllocationLookup::new(MemorySource::fixtures())
    }

    #[test]
    fn test_fetch_single_allocation() {
        let allocation = lookup()
            .fetch("0xa1097B957A62B75482CFB9Af960Cbd6B8F9F02e8")
            .unwrap();
        assert_eq!(allocation.tag, "user");
        assert_eq!(
            allocation.account.to_checksum(None),
            "0xa1097B957A62B75482CFB9Af960Cbd6B8F9F02e8"
        );
        assert_eq!(
            allocation.contract.to_checksum(None),
            "0xA0b937D5c8E32a80E3a8ed4227CD020221544ee6"
        );
        assert_eq!(
            hex_encode(allocation.vesting_id),
            "0xb7d48c91701a6b8abe620e1f8f543a3885d9570db3da7b0ae42fb320e2f3bc53"
        );
        assert_eq!(allocation.duration_weeks, 416);
        assert_eq!(allocation.start_date, 1538042400);
        assert_eq!(allocation.amount, "1854720164105111994368");
        assert_eq!(allocation.curve, VestingCurve::Linear);
        let proof: Vec<String> = allocation.proof.iter().map(hex_encode).collect();
        assert_eq!(
            proof,
            [
                "0xe36a61615023453dd2e3b196c7eabd4b4c86fa2690e73327e727456661d7412f",
                "0x6df65e0fca7b91a398d45fee84b8a6e45d1d353d28d8dd11b1134cdbc308113a",
                "0x607471c45e52b1100ec7b9bdcfac945950dbdf6777c0f65b22773531ca0957c8",
                "0xac96c9159261b22edcadb10baee2878c92427553a5dc5f6efa4327614ad15fee",
                "0xc21e9113c866b3f5c3b3da4287ca6452a983cca497df18dd48d716143eb0fd91",
                "0xb7457dcb21f2c1f39a8f4edf9b436e4ec349bd821587a07bbec37fb4a46166ae",
                "0xed4aafe93ae6234aecc0c3fa5c836e2d8c9c3f579e6e2252f81a5495b616af3f",
                "0x04081a367101d0b8f852e683c14cb04baa560a7e46b196be6781c5a7f0d527e9",
                "0xb1f5ed5c04c9a7a56384400b25685b56e383f8f2949ce8a5f9246bb809d37ba0",
                "0xc5112afaf9117ce34e6738b84ecf72d60414d2b4dfb0ebf9b7039bea0b0823ab",
                "0x490ed305e00bcb700dc5defc281343d8374f82e5060303a16c39d53048d72fd2",
                "0xc6093a1a2bd9d532b36d953dfa519abb54b8886013adb8ba3fb7d508495bdb45",
                "0x595e955f2b50d15651e0fe5dd67f3dc482fc8ecb2b98de52fbd31e65544c40b0",
                "0x15a9fdd60e5fde6b29363a082e3e3bb69e9e578434837e6c61aa95b3e8a509fd",
                "0x59d69bacd790ff82f7310dd382bf3f53e885e74f5dad9b3aeb7fe96ce926ff47",
                "0xf8e2791b9d07b3e620189a36bf17e30c874e66b205c79492a16cd5a9c5bb65b7",
            ]
        );
    }

    #[test]
    fn test_fetch_is_case_insensitive() {
        let mixed = lookup()
            .fetch("0xa1097B957A62B75482CFB9Af960Cbd6B8F9F02e8")
            .unwrap();
        let lower = lookup()
            .fetch("a1097b957a62b75482cfb9af960cbd6b8f9f02e8")
            .unwrap();
        assert_eq!(mixed, lower);
    }

    #[test]
    fn test_fetch_prefers_user_tag() {
        let allocation = lookup()
            .fetch("0x20026F06342e16415b070ae3bdB3983AF7c51C95")
            .unwrap();
        assert_eq!(allocation.tag, "user");
        assert_eq!(allocation.amount, "1757033820807298547712");
    }

    #[test]
    fn test_fetch_all_keeps_source_order() {
        let allocations = lookup()
            .fetch_all("0x20026F06342e16415b070ae3bdB3983AF7c51C95")
            .unwrap();
        let tags: Vec<&str> = allocations.iter().map(|a| a.tag.as_str()).collect();
        assert_eq!(tags, ["ecosystem", "user"]);
    }

    #[test]
    fn test_fetch_tagged() {
        let lookup = lookup();
        let ecosystem = lookup
            .fetch_tagged("0x20026F06342e16415b070ae3bdB3983AF7c51C95", "ecosystem")
            .unwrap();
        assert_eq!(ecosystem.duration_weeks, 208);
        assert!(matches!(
            lookup.fetch_tagged("0x20026F06342e16415b070ae3bdB3983AF7c51C95", "investor"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_select_allocation_falls_back_to_first() {
        let mut allocations = lookup()
            .fetch_all("0x20026F06342e16415b070ae3bdB3983AF7c51C95")
            .unwrap();
        allocations.retain(|a| a.tag != USER_TAG);
        let selected = select_allocation(allocations, None).unwrap();
        assert_eq!(selected.tag, "ecosystem");
        assert!(select_allocation(Vec::new(), None).is_none());
        assert!(select_allocation(Vec::new(), Some(USER_TAG)).is_none());
    }

    #[test]
    fn test_unknown_address_is_not_found() {
        let result = lookup().fetch("0x1234567890abcdef1234567890abcdef12345678");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_empty_record_list_is_not_found() {
        let mut source = MemorySource::fixtures();
        let account = parse_address("0x1234567890abcdef1234567890abcdef12345678").unwrap();
        source.records.insert(account, Vec::new());
        let result = AllocationLookup::new(source).fetch_all(&account.to_string());
        assert!(matches!(result, Err(Error::NotFound(a)) if a == account));
    }

    #[test]
    fn test_invalid_address() {
        assert!(matches!(
            lookup().fetch("0x1234"),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_record_for_other_account_is_malformed() {
        let mut source = MemorySource::fixtures();
        let other = parse_address("0x1234567890abcdef1234567890abcdef12345678").unwrap();
        let records = parse_payload(SINGLE).unwrap();
        source.records.insert(other, records);
        let result = AllocationLookup::new(source).fetch(&other.to_string());
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn test_record_for_other_chain_is_malformed() {
        let mut source = MemorySource::fixtures();
        source.chain_id = 100;
        let result =
            AllocationLookup::new(source).fetch("0xa1097B957A62B75482CFB9Af960Cbd6B8F9F02e8");
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn test_invalid_record_is_malformed() {
        let mut source = MemorySource::fixtures();
        let account = parse_address("0xa1097B957A62B75482CFB9Af960Cbd6B8F9F02e8").unwrap();
        source.records.get_mut(&account).unwrap()[0].amount = "-5".into();
        let result =
            AllocationLookup::new(source).fetch("0xa1097B957A62B75482CFB9Af960Cbd6B8F9F02e8");
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn test_transient_failure_is_passed_through() {
        let result =
            AllocationLookup::new(FailingSource).fetch("0xa1097B957A62B75482CFB9Af960Cbd6B8F9F02e8");
        match result {
            Err(e) => assert!(e.is_retryable()),
            Ok(_) => panic!("expected a transient error"),
        }
    }
}
