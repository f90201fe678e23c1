// IPv4 address / CIDR validation.
//
// Accepts exactly four dot-separated decimal octets in 0..=255 with an
// optional `/prefix` in 0..=32. Leading zeros are tolerated ("010" is 10).

use crate::error::CoreError;

/// Default prefix applied when a bare address is normalized.
pub const HOST_PREFIX: u8 = 32;

fn parse_bounded(part: &str, max: u32) -> Option<u32> {
    if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse::<u32>().ok().filter(|v| *v <= max)
}

/// `true` iff `value` is an IPv4 address with an optional `/prefix`.
pub fn is_valid_cidr(value: &str) -> bool {
    let (addr, prefix) = match value.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (value, None),
    };

    if let Some(prefix) = prefix {
        if parse_bounded(prefix, 32).is_none() {
            return false;
        }
    }

    let octets: Vec<&str> = addr.split('.').collect();
    octets.len() == 4 && octets.iter().all(|o| parse_bounded(o, 255).is_some())
}

/// Validate, returning a typed error on failure.
pub fn validate(value: &str) -> Result<(), CoreError> {
    if is_valid_cidr(value) {
        Ok(())
    } else {
        Err(CoreError::InvalidIp {
            value: value.to_owned(),
        })
    }
}

/// Validate and append `/{default_prefix}` if no prefix is present.
pub fn normalize_cidr(value: &str, default_prefix: u8) -> Result<String, CoreError> {
    validate(value)?;
    if value.contains('/') {
        Ok(value.to_owned())
    } else {
        Ok(format!("{value}/{default_prefix}"))
    }
}
