pub mod classic_issuance;
pub mod contract_issuance;
pub mod error;
pub mod registration;
pub mod stellar_client;
pub mod stellar_keys;
pub mod stellar_tx;
pub mod token_verification;
pub mod tx_diagnostics;
#[cfg(test)]
pub mod testing;
