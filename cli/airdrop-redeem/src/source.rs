use alloy_primitives::Address;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::allocation::AllocationRecord;
use crate::config::LookupConfig;
use crate::error::{Error, Result};

/// Anything that can hand out the raw allocation records of an account.
pub trait AllocationSource {
    /// Chain the records are published for.
    fn chain_id(&self) -> u64;

    /// Records for `account` in the order the source lists them. An account
    /// without any allocation is `Error::NotFound`.
    fn allocations(&self, account: Address) -> Result<Vec<AllocationRecord>>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Many(Vec<AllocationRecord>),
    One(AllocationRecord),
}

/// Decodes a service response body, which is either a single record or a
/// list of them.
pub fn parse_payload(body: &str) -> Result<Vec<AllocationRecord>> {
    let payload: Payload = serde_json::from_str(body)
        .map_err(|e| Error::Malformed(format!("unexpected response body: {}", e)))?;
    Ok(match payload {
        Payload::Many(records) => records,
        Payload::One(record) => vec![record],
    })
}

/// Maps a non-success HTTP status to the matching error kind. A missing
/// document means the account has no allocation.
pub fn status_error(status: StatusCode, account: Address) -> Error {
    match status {
        StatusCode::NOT_FOUND => Error::NotFound(account),
        s => Error::from_status(s, "allocation service"),
    }
}

/// Allocation data service reached over HTTP.
///
/// Records live at `{base_url}/{chain_id}/{checksummed account}.json`. A
/// request is attempted exactly once.
pub struct HttpAllocationSource {
    client: Client,
    config: LookupConfig,
}

impl HttpAllocationSource {
    pub fn new(config: LookupConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn url_for(&self, account: Address) -> String {
        format!(
            "{}/{}/{}.json",
            self.config.base_url.trim_end_matches('/'),
            self.config.chain_id,
            account.to_checksum(None)
        )
    }
}

impl AllocationSource for HttpAllocationSource {
    fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    fn allocations(&self, account: Address) -> Result<Vec<AllocationRecord>> {
        let url = self.url_for(account);
        debug!(%url, "Requesting allocations");

        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, account));
        }
        let body = response.text()?;
        let records = parse_payload(&body)?;
        if records.is_empty() {
            return Err(Error::NotFound(account));
        }
        debug!(count = records.len(), "Received allocation records");
        Ok(records)
    }
}
