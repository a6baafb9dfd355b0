// service/testing.rs
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;

use super::{
    error::ChainError,
    stellar_client::{SimulatedInvocation, StellarNetwork, SubmittedTransaction},
    stellar_tx::tests::empty_soroban_data,
};

/// Network double that records every envelope and counts calls.
#[derive(Default)]
pub struct FakeNetwork {
    pub calls: AtomicUsize,
    pub envelopes: Mutex<Vec<String>>,
    /// When set, submissions fail with this message.
    pub reject_with: Option<String>,
    /// When set, `count_assets` fails.
    pub assets_unavailable: bool,
    pub asset_count: usize,
    pub ledger: Option<u32>,
    pub result_meta_xdr: Option<String>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self {
            ledger: Some(1234),
            ..Default::default()
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            reject_with: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_envelope(&self) -> Option<String> {
        self.envelopes.lock().unwrap().last().cloned()
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn accept(&self, envelope_xdr: &str) -> Result<SubmittedTransaction, ChainError> {
        self.envelopes.lock().unwrap().push(envelope_xdr.to_string());
        if let Some(message) = &self.reject_with {
            return Err(ChainError::Rejected(message.clone()));
        }
        Ok(SubmittedTransaction {
            hash: "f".repeat(64),
            ledger: self.ledger,
            result_meta_xdr: self.result_meta_xdr.clone(),
        })
    }
}

#[async_trait]
impl StellarNetwork for FakeNetwork {
    async fn load_sequence(&self, _account_id: &str) -> Result<i64, ChainError> {
        self.record();
        Ok(100)
    }

    async fn submit_transaction(&self, envelope_xdr: &str) -> Result<SubmittedTransaction, ChainError> {
        self.record();
        self.accept(envelope_xdr)
    }

    async fn simulate_transaction(&self, _envelope_xdr: &str) -> Result<SimulatedInvocation, ChainError> {
        self.record();
        Ok(SimulatedInvocation {
            transaction_data: empty_soroban_data(),
            min_resource_fee: 5_000,
            auth: Vec::new(),
        })
    }

    async fn send_transaction(&self, envelope_xdr: &str) -> Result<SubmittedTransaction, ChainError> {
        self.record();
        self.accept(envelope_xdr)
    }

    async fn count_assets(&self, _asset_code: &str, _issuer: &str) -> Result<usize, ChainError> {
        self.record();
        if self.assets_unavailable {
            return Err(ChainError::UnexpectedResponse {
                endpoint: "assets".to_string(),
                detail: "HTTP 503 Service Unavailable".to_string(),
            });
        }
        Ok(self.asset_count)
    }
}
