// service/classic_issuance.rs
use std::sync::Arc;

use chrono::Utc;
use stellar_xdr::curr::Hash;

use crate::{
    config::Config,
    models::vaccinemodel::{IssuanceOutcome, IssuedToken},
    service::{
        error::ChainError,
        stellar_client::StellarNetwork,
        stellar_keys::Keypair,
        stellar_tx::{
            build_transaction, change_trust_op, credit_asset, network_id, payment_op,
            sign_transaction, ONE_UNIT,
        },
        tx_diagnostics::failure_outcome,
    },
};

/// Issues a vaccine as a classic asset: the recipient trusts `(vaccine_name, issuer)`
/// and receives one unit of it, atomically in one transaction.
#[derive(Clone)]
pub struct ClassicIssuanceService {
    network: Arc<dyn StellarNetwork>,
    network_id: Hash,
}

impl ClassicIssuanceService {
    pub fn new(network: Arc<dyn StellarNetwork>, config: &Config) -> Self {
        Self {
            network,
            network_id: network_id(&config.network_passphrase),
        }
    }

    pub async fn issue(
        &self,
        vaccine_name: &str,
        issuer: &Keypair,
        recipient: &Keypair,
    ) -> IssuanceOutcome {
        match self.submit(vaccine_name, issuer, recipient).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    "Classic issuance of {} to {} failed: {}",
                    vaccine_name,
                    recipient.public_key(),
                    e
                );
                failure_outcome(e.to_string())
            }
        }
    }

    async fn submit(
        &self,
        vaccine_name: &str,
        issuer: &Keypair,
        recipient: &Keypair,
    ) -> Result<IssuanceOutcome, ChainError> {
        let issuer_address = issuer.public_key();
        let sequence = self.network.load_sequence(&issuer_address).await?;

        let asset = credit_asset(vaccine_name, issuer.account_id())?;
        let operations = vec![
            change_trust_op(&asset, recipient.muxed_account())?,
            payment_op(asset, recipient.muxed_account(), ONE_UNIT),
        ];

        let tx = build_transaction(
            issuer.muxed_account(),
            sequence + 1,
            operations,
            Utc::now().timestamp().max(0) as u64,
        )?;
        let signed = sign_transaction(tx, &self.network_id, &[issuer, recipient])?;

        let submitted = self.network.submit_transaction(&signed.envelope_xdr).await?;
        tracing::info!(
            "Issued {} to {} in transaction {}",
            vaccine_name,
            recipient.public_key(),
            submitted.hash
        );

        Ok(IssuanceOutcome::Success(IssuedToken {
            tx_hash: submitted.hash,
            asset_code: Some(vaccine_name.to_string()),
            issuer: Some(issuer_address),
            destination_public_key: Some(recipient.public_key()),
            ledger: submitted.ledger,
            ..Default::default()
        }))
    }
}
