//! Bulk user lookup by custody / verified address.

use alloy::primitives::Address;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::{NeynarClient, NeynarError, HEADER_API_KEY};
use crate::address;
use crate::profile::{ProfileSource, SocialAccount};

const BULK_BY_ADDRESS_PATH: &str = "/v2/farcaster/user/bulk-by-address";

impl NeynarClient {
    /// Look up the Farcaster accounts linked to each address.
    ///
    /// The caller is responsible for keeping `addresses` within the API's
    /// batch limit.
    pub async fn users_by_address(
        &self,
        addresses: &[Address],
    ) -> Result<HashMap<Address, Vec<SocialAccount>>, NeynarError> {
        let joined = addresses
            .iter()
            .map(address::checksum)
            .collect::<Vec<_>>()
            .join(",");

        let resp = self
            .http
            .get(self.url(BULK_BY_ADDRESS_PATH))
            .header(HEADER_API_KEY, &self.api_key)
            .query(&[("addresses", joined.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::api_error(resp).await);
        }

        let body = resp.text().await?;
        let found = parse_bulk_response(&body)?;

        debug!(
            requested = addresses.len(),
            found = found.len(),
            "bulk-by-address lookup"
        );
        Ok(found)
    }
}

#[async_trait]
impl ProfileSource for NeynarClient {
    type Error = NeynarError;

    async fn bulk_lookup(
        &self,
        addresses: &[Address],
    ) -> Result<HashMap<Address, Vec<SocialAccount>>, NeynarError> {
        self.users_by_address(addresses).await
    }
}

/// Decode the `address → [user]` response map. Keys come back lowercase;
/// they are re-keyed by typed address, and keys that are not addresses are
/// skipped.
pub fn parse_bulk_response(
    body: &str,
) -> Result<HashMap<Address, Vec<SocialAccount>>, NeynarError> {
    let raw: HashMap<String, Vec<SocialAccount>> = serde_json::from_str(body)?;
    let mut out = HashMap::with_capacity(raw.len());
    for (key, accounts) in raw {
        match address::parse(&key) {
            Some(addr) => {
                out.entry(addr).or_insert_with(Vec::new).extend(accounts);
            }
            None => warn!(key = %key, "ignoring non-address key in bulk lookup response"),
        }
    }
    Ok(out)
}
