use tracing::warn;

use crate::config::Settings;
use crate::models::{Chain, Result, ScoreError, ScoreRequest};

const ADDRESS_HEX_LEN: usize = 40;

/// Checks that `address` is `0x` followed by 40 hex digits. Mixed case is
/// accepted; checksums are not verified.
pub fn validate_address(address: &str) -> Result<()> {
    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| ScoreError::InvalidAddress(address.to_string()))?;

    if digits.len() != ADDRESS_HEX_LEN {
        return Err(ScoreError::InvalidAddress(address.to_string()));
    }

    hex::decode(digits).map_err(|e| {
        warn!("Rejected address {}: {}", address, e);
        ScoreError::InvalidAddress(address.to_string())
    })?;

    Ok(())
}

/// Validates a score request before any data is fetched.
pub fn validate_request(settings: &Settings, request: &ScoreRequest) -> Result<Chain> {
    validate_address(&request.wallet_address)?;
    settings.resolve_chain(request.chain_id)
}
