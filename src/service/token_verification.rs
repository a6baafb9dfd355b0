// service/token_verification.rs
use std::sync::Arc;

use crate::service::stellar_client::StellarNetwork;

#[derive(Clone)]
pub struct TokenVerificationService {
    network: Arc<dyn StellarNetwork>,
}

impl TokenVerificationService {
    pub fn new(network: Arc<dyn StellarNetwork>) -> Self {
        Self { network }
    }

    /// Advisory check: any failure to ask the network counts as "not found".
    pub async fn verify(&self, asset_code: &str, issuer_account: &str) -> bool {
        match self.network.count_assets(asset_code, issuer_account).await {
            Ok(count) => count > 0,
            Err(e) => {
                tracing::warn!(
                    "Could not verify asset {} issued by {}: {}",
                    asset_code,
                    issuer_account,
                    e
                );
                false
            }
        }
    }
}
