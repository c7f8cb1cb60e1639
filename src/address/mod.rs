//! Account address validation and canonicalization.
//!
//! Addresses are accepted in any letter case (the EIP-55 checksum is not
//! enforced on input) and always emitted in checksummed form, which is the
//! key used by the profile cache and in every API response.

use alloy::primitives::Address;
use std::str::FromStr;

/// `0x` + 40 hex digits.
const ADDRESS_LEN: usize = 42;

/// Returns true if `input` is a syntactically valid account address.
pub fn is_valid(input: &str) -> bool {
    let s = input.trim();
    if s.len() != ADDRESS_LEN {
        return false;
    }
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(digits) => digits.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Parse into a typed address, or `None` if the input is not a valid address.
pub fn parse(input: &str) -> Option<Address> {
    if !is_valid(input) {
        return None;
    }
    // from_str does not accept the uppercase `0X` prefix
    Address::from_str(&input.trim()[2..]).ok()
}

/// Canonical (EIP-55 checksummed) form of a valid address.
pub fn normalize(input: &str) -> Option<String> {
    parse(input).map(|addr| checksum(&addr))
}

pub fn checksum(addr: &Address) -> String {
    addr.to_checksum(None)
}

/// Parse a batch, dropping invalid entries and duplicates while keeping the
/// order of first appearance.
pub fn parse_batch<S: AsRef<str>>(inputs: &[S]) -> Vec<Address> {
    let mut seen = std::collections::HashSet::with_capacity(inputs.len());
    inputs
        .iter()
        .filter_map(|s| parse(s.as_ref()))
        .filter(|addr| seen.insert(*addr))
        .collect()
}
