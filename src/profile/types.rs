//! Profile types shared by the resolver, the cache and the API layer.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::address;

/// A Farcaster identity bound to a custody address.
///
/// A profile with every optional field unset is a fallback: the address was
/// looked up and either has no linked account or the lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Checksummed custody address.
    pub custody_address: String,
    pub fid: Option<u64>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub pfp_url: Option<String>,
}

impl Profile {
    pub fn fallback(addr: &Address) -> Self {
        Self {
            custody_address: address::checksum(addr),
            fid: None,
            username: None,
            display_name: None,
            pfp_url: None,
        }
    }

    pub fn from_account(addr: &Address, account: SocialAccount) -> Self {
        Self {
            custody_address: address::checksum(addr),
            fid: account.fid,
            username: account.username,
            display_name: account.display_name,
            pfp_url: account.pfp_url,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fid.is_none()
            && self.username.is_none()
            && self.display_name.is_none()
            && self.pfp_url.is_none()
    }
}

/// One candidate account returned by the bulk lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SocialAccount {
    #[serde(default)]
    pub fid: Option<u64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub pfp_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_serializes_nulls() {
        let addr = address::parse("0xd8da6bf26964af9d7eed9e03e53415d37aa96045").unwrap();
        let profile = Profile::fallback(&addr);
        assert!(profile.is_fallback());

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            json["custodyAddress"],
            "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"
        );
        assert!(json["username"].is_null());
        assert!(json["displayName"].is_null());
        assert!(json["pfpUrl"].is_null());
        assert!(json["fid"].is_null());
    }

    #[test]
    fn test_account_tolerates_missing_fields() {
        let account: SocialAccount =
            serde_json::from_str(r#"{"fid": 3, "username": "dwr.eth", "extra": true}"#).unwrap();
        assert_eq!(account.fid, Some(3));
        assert_eq!(account.username.as_deref(), Some("dwr.eth"));
        assert_eq!(account.display_name, None);
    }
}
