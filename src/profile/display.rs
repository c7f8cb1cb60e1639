//! Human-readable labels for addresses.

use super::types::Profile;

/// Label for an address: display name, then username, then a shortened
/// address. Never empty.
pub fn display_name(profile: Option<&Profile>, address: &str) -> String {
    if let Some(p) = profile {
        if let Some(name) = non_blank(p.display_name.as_deref()) {
            return name.to_string();
        }
        if let Some(name) = non_blank(p.username.as_deref()) {
            return name.to_string();
        }
    }
    shorten_address(address)
}

/// `0x1234...abcd` style shortening (first 6, last 4 characters).
pub fn shorten_address(address: &str) -> String {
    let address = address.trim();
    let chars: Vec<char> = address.chars().collect();
    if chars.is_empty() {
        return "unknown".to_string();
    }
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Avatar URL, if the profile has a usable one.
pub fn avatar_url(profile: Option<&Profile>) -> Option<&str> {
    profile.and_then(|p| non_blank(p.pfp_url.as_deref()))
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
