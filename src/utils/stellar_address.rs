use std::borrow::Cow;

use validator::ValidationError;

pub const ACCOUNT_ADDRESS_LEN: usize = 56;

/// Checks the shape of a Stellar account address: `G` followed by 55 base32 characters (`A-Z`, `2-7`).
pub fn is_valid_wallet_address(address: &str) -> bool {
    if address.len() != ACCOUNT_ADDRESS_LEN {
        return false;
    }

    let mut chars = address.chars();
    if chars.next() != Some('G') {
        return false;
    }

    chars.all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c))
}

pub fn validate_wallet_address(address: &str) -> Result<(), ValidationError> {
    if !is_valid_wallet_address(address) {
        let mut error = ValidationError::new("invalid_wallet_address");
        error.message = Some(Cow::from("Invalid Stellar wallet address format"));
        return Err(error);
    }
    Ok(())
}

// Classic asset codes are 1-12 ASCII letters or digits.
pub fn validate_asset_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() || code.len() > 12 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        let mut error = ValidationError::new("invalid_asset_code");
        error.message = Some(Cow::from("Asset code must be 1-12 letters or digits"));
        return Err(error);
    }
    Ok(())
}
