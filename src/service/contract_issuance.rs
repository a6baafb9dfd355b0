// service/contract_issuance.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use stellar_xdr::curr::{Hash, ScVal};
use validator::Validate;

use crate::{
    config::Config,
    dtos::vaccinedtos::ApplyVaccineDto,
    error::ErrorMessage,
    models::vaccinemodel::{IssuanceOutcome, IssuedToken},
    service::{
        error::{ChainError, ServiceError},
        stellar_client::StellarNetwork,
        stellar_keys::{parse_account_id, Keypair},
        stellar_tx::{
            apply_simulation, build_transaction, invoke_contract_op, network_id, sc_account,
            sc_string, sign_transaction, token_id_from_meta,
        },
        tx_diagnostics::failure_outcome,
    },
    utils::stellar_address::is_valid_wallet_address,
};

pub const MINT_FUNCTION: &str = "mint_with_attrs";

/// Mints vaccine certificates through the configured Soroban contract.
#[derive(Clone)]
pub struct ContractIssuanceService {
    network: Arc<dyn StellarNetwork>,
    network_id: Hash,
    issuer: Keypair,
    contract_id: String,
}

impl ContractIssuanceService {
    pub fn new(network: Arc<dyn StellarNetwork>, config: &Config) -> Self {
        Self {
            network,
            network_id: network_id(&config.network_passphrase),
            issuer: config.issuer.clone(),
            contract_id: config.vaccine_contract_id.clone(),
        }
    }

    /// Validation problems are returned as `Err` before any network call.
    /// Everything that goes wrong on the chain comes back as an `Error` outcome.
    pub async fn issue(
        &self,
        token: &ApplyVaccineDto,
        destination_key: &str,
    ) -> Result<IssuanceOutcome, ServiceError> {
        token.validate()?;
        token.validate_date_range()?;

        if !is_valid_wallet_address(destination_key) {
            return Err(ServiceError::Validation(
                ErrorMessage::InvalidWalletAddress.to_string(),
            ));
        }

        let (expires_at, taken_at) = mint_timestamps(token)?;
        let args = mint_args(token, destination_key, expires_at, taken_at).map_err(|e| {
            ServiceError::Validation(e.to_string())
        })?;

        match self.invoke(args).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::error!(
                    "Minting {} (batch {}) for {} failed: {}",
                    token.name,
                    token.batch,
                    destination_key,
                    e
                );
                Ok(failure_outcome(e.to_string()))
            }
        }
    }

    async fn invoke(&self, args: Vec<ScVal>) -> Result<IssuanceOutcome, ChainError> {
        let sequence = self.network.load_sequence(&self.issuer.public_key()).await?;

        let op = invoke_contract_op(&self.contract_id, MINT_FUNCTION, args)?;
        let tx = build_transaction(
            self.issuer.muxed_account(),
            sequence + 1,
            vec![op],
            Utc::now().timestamp().max(0) as u64,
        )?;

        let unsigned = sign_transaction(tx.clone(), &self.network_id, &[])?;
        let simulation = self.network.simulate_transaction(&unsigned.envelope_xdr).await?;
        tracing::debug!(
            "Simulation asks for resource fee {} with {} auth entries",
            simulation.min_resource_fee,
            simulation.auth.len()
        );

        let tx = apply_simulation(
            tx,
            &simulation.transaction_data,
            &simulation.auth,
            simulation.min_resource_fee,
        )?;
        let signed = sign_transaction(tx, &self.network_id, &[&self.issuer])?;

        let submitted = self.network.send_transaction(&signed.envelope_xdr).await?;
        tracing::info!("Minted certificate in transaction {}", submitted.hash);

        Ok(IssuanceOutcome::Success(IssuedToken {
            tx_hash: submitted.hash,
            contract_id: Some(self.contract_id.clone()),
            ledger: submitted.ledger,
            token_id: submitted
                .result_meta_xdr
                .as_deref()
                .and_then(token_id_from_meta),
            ..Default::default()
        }))
    }
}

/// `(expiration, taken)` as the Unix seconds the contract receives.
///
/// The ordering check runs on these whole-second values, so two dates in the
/// same second are rejected even though they differ as `DateTime`s.
fn mint_timestamps(token: &ApplyVaccineDto) -> Result<(u64, u64), ServiceError> {
    let to_secs = |date: &DateTime<Utc>| {
        u64::try_from(date.timestamp())
            .map_err(|_| ServiceError::Validation(ErrorMessage::DateBeforeEpoch.to_string()))
    };

    let expires_at = to_secs(&token.expiration_date)?;
    let taken_at = to_secs(&token.taken_date)?;

    if expires_at <= taken_at {
        return Err(ServiceError::Validation(ErrorMessage::InvalidDateRange.to_string()));
    }
    Ok((expires_at, taken_at))
}

/// Positional arguments of `mint_with_attrs`: destination, name, batch, expiration, taken.
fn mint_args(
    token: &ApplyVaccineDto,
    destination_key: &str,
    expires_at: u64,
    taken_at: u64,
) -> Result<Vec<ScVal>, ChainError> {
    let destination = parse_account_id(destination_key)?;

    Ok(vec![
        sc_account(destination),
        sc_string(&token.name)?,
        sc_string(&token.batch)?,
        ScVal::U64(expires_at),
        ScVal::U64(taken_at),
    ])
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use stellar_xdr::curr::{HostFunction, OperationBody, TransactionExt, UInt128Parts};

    use super::*;
    use crate::{
        config::tests::test_config,
        dtos::vaccinedtos::tests::apply_body,
        service::{
            stellar_tx::tests::{decode_envelope, meta_returning},
            testing::FakeNetwork,
        },
    };

    fn destination() -> String {
        Keypair::random().public_key()
    }

    #[tokio::test]
    async fn test_bad_date_range_makes_no_network_call() {
        let network = Arc::new(FakeNetwork::new());
        let service = ContractIssuanceService::new(network.clone(), &test_config());
        let now = Utc::now();

        let result = service.issue(&apply_body(now, now), &destination()).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        let result = service
            .issue(&apply_body(now, now - Duration::days(30)), &destination())
            .await;
        match result {
            Err(ServiceError::Validation(message)) => {
                assert_eq!(message, "expiration_date must be after taken_date")
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        assert_eq!(network.call_count(), 0);
    }

    #[tokio::test]
    async fn test_same_second_dates_are_rejected() {
        let network = Arc::new(FakeNetwork::new());
        let service = ContractIssuanceService::new(network.clone(), &test_config());
        let taken = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();

        let result = service
            .issue(&apply_body(taken, taken + Duration::milliseconds(500)), &destination())
            .await;
        match result {
            Err(ServiceError::Validation(message)) => {
                assert_eq!(message, ErrorMessage::InvalidDateRange.to_string())
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(network.call_count(), 0);
    }

    #[tokio::test]
    async fn test_dates_before_epoch_are_rejected() {
        let network = Arc::new(FakeNetwork::new());
        let service = ContractIssuanceService::new(network.clone(), &test_config());
        let taken = Utc.with_ymd_and_hms(1960, 1, 1, 0, 0, 0).unwrap();

        let result = service
            .issue(&apply_body(taken, taken + Duration::days(365)), &destination())
            .await;
        match result {
            Err(ServiceError::Validation(message)) => {
                assert_eq!(message, ErrorMessage::DateBeforeEpoch.to_string())
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(network.call_count(), 0);
    }

    #[test]
    fn test_mint_timestamps_are_whole_seconds() {
        let taken = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let token = apply_body(taken, taken + Duration::milliseconds(1_500));
        assert_eq!(
            mint_timestamps(&token).unwrap(),
            (1_704_888_001, 1_704_888_000)
        );
    }

    #[tokio::test]
    async fn test_malformed_destination_makes_no_network_call() {
        let network = Arc::new(FakeNetwork::new());
        let service = ContractIssuanceService::new(network.clone(), &test_config());
        let now = Utc::now();

        let result = service
            .issue(&apply_body(now, now + Duration::days(365)), "GNOTAWALLET")
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert_eq!(network.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mint_invocation_arguments_in_order() {
        let config = test_config();
        let mut fake = FakeNetwork::new();
        fake.result_meta_xdr = Some(meta_returning(ScVal::U128(UInt128Parts { hi: 0, lo: 42 })));
        let network = Arc::new(fake);
        let service = ContractIssuanceService::new(network.clone(), &config);

        let taken = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let expires = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();
        let dest = destination();

        let outcome = service.issue(&apply_body(taken, expires), &dest).await.unwrap();
        match &outcome {
            IssuanceOutcome::Success(token) => {
                assert_eq!(token.contract_id, Some(config.vaccine_contract_id.clone()));
                assert_eq!(token.token_id, Some(42));
                assert_eq!(token.ledger, Some(1234));
            }
            other => panic!("expected success, got {:?}", other),
        }
        // sequence, simulate, send
        assert_eq!(network.call_count(), 3);

        let envelope = decode_envelope(&network.last_envelope().unwrap());
        assert_eq!(envelope.signatures.len(), 1);
        assert!(matches!(envelope.tx.ext, TransactionExt::V1(_)));

        let op = envelope.tx.operations.to_vec().remove(0);
        let invoke = match op.body {
            OperationBody::InvokeHostFunction(invoke) => invoke,
            other => panic!("expected contract call, got {:?}", other),
        };
        let call = match invoke.host_function {
            HostFunction::InvokeContract(call) => call,
            other => panic!("expected contract call, got {:?}", other),
        };
        assert_eq!(call.function_name.0.as_slice(), MINT_FUNCTION.as_bytes());

        let args = call.args.to_vec();
        assert_eq!(args.len(), 5);
        assert_eq!(args[0], sc_account(parse_account_id(&dest).unwrap()));
        assert_eq!(args[1], sc_string("COVID19").unwrap());
        assert_eq!(args[2], sc_string("BATCH-01").unwrap());
        assert_eq!(args[3], ScVal::U64(expires.timestamp() as u64));
        assert_eq!(args[4], ScVal::U64(taken.timestamp() as u64));
    }

    #[tokio::test]
    async fn test_chain_failure_is_tagged_error() {
        let network = Arc::new(FakeNetwork::rejecting("HostError: Error(Contract, #3)"));
        let service = ContractIssuanceService::new(network.clone(), &test_config());
        let now = Utc::now();

        let outcome = service
            .issue(&apply_body(now, now + Duration::days(365)), &destination())
            .await
            .unwrap();
        match outcome {
            IssuanceOutcome::Error { message, diagnostic } => {
                assert_eq!(message, "HostError: Error(Contract, #3)");
                assert!(diagnostic.is_none());
            }
            other => panic!("expected error, got {:?}", other),
        }
    }
}
