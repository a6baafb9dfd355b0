// service/stellar_client.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::{config::Config, service::error::ChainError};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedTransaction {
    pub hash: String,
    /// `None` when the network accepted the transaction but confirmation was not seen in time.
    pub ledger: Option<u32>,
    pub result_meta_xdr: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedInvocation {
    pub transaction_data: String,
    pub min_resource_fee: u32,
    pub auth: Vec<String>,
}

/// Every call this service makes to the Stellar network goes through here.
#[async_trait]
pub trait StellarNetwork: Send + Sync {
    async fn load_sequence(&self, account_id: &str) -> Result<i64, ChainError>;

    /// Horizon `POST /transactions`.
    async fn submit_transaction(&self, envelope_xdr: &str) -> Result<SubmittedTransaction, ChainError>;

    async fn simulate_transaction(&self, envelope_xdr: &str) -> Result<SimulatedInvocation, ChainError>;

    /// Soroban RPC `sendTransaction` followed by bounded `getTransaction` polling.
    async fn send_transaction(&self, envelope_xdr: &str) -> Result<SubmittedTransaction, ChainError>;

    async fn count_assets(&self, asset_code: &str, issuer: &str) -> Result<usize, ChainError>;
}

#[derive(Debug, Clone)]
pub struct HorizonRpcClient {
    http: reqwest::Client,
    horizon_url: String,
    rpc_url: String,
    poll_attempts: u32,
}

impl HorizonRpcClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            horizon_url: config.horizon_url.clone(),
            rpc_url: config.soroban_rpc_url.clone(),
            poll_attempts: config.tx_poll_attempts,
        }
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let body: Value = response.json().await?;

        if let Some(error) = body.get("error") {
            let message = error["message"].as_str().unwrap_or("unknown error");
            return Err(ChainError::Rpc(format!("{} failed: {}", method, message)));
        }

        body.get("result").cloned().ok_or_else(|| ChainError::UnexpectedResponse {
            endpoint: method.to_string(),
            detail: "missing result".to_string(),
        })
    }

    async fn wait_for_confirmation(&self, hash: &str) -> Result<SubmittedTransaction, ChainError> {
        for attempt in 1..=self.poll_attempts {
            tokio::time::sleep(POLL_INTERVAL).await;

            let result = self.rpc_call("getTransaction", json!({ "hash": hash })).await?;
            match result["status"].as_str() {
                Some("SUCCESS") => {
                    return Ok(SubmittedTransaction {
                        hash: hash.to_string(),
                        ledger: result["ledger"].as_u64().map(|l| l as u32),
                        result_meta_xdr: result["resultMetaXdr"].as_str().map(str::to_string),
                    });
                }
                Some("FAILED") => {
                    let result_xdr = result["resultXdr"].as_str().unwrap_or_default();
                    return Err(ChainError::Rejected(format!(
                        "Transaction {} failed: resultXdr \"{}\"",
                        hash, result_xdr
                    )));
                }
                status => {
                    tracing::debug!("Transaction {} not confirmed yet (attempt {}, status {:?})", hash, attempt, status);
                }
            }
        }

        tracing::warn!(
            "Transaction {} was accepted but not confirmed after {} attempts",
            hash,
            self.poll_attempts
        );
        Ok(SubmittedTransaction {
            hash: hash.to_string(),
            ledger: None,
            result_meta_xdr: None,
        })
    }
}

/// Horizon rejections carry the result codes and the raw result XDR under `extras`.
fn horizon_rejection(body: &Value) -> ChainError {
    let title = body["title"].as_str().unwrap_or("Transaction submission failed");
    let extras = &body["extras"];
    let result_codes = extras.get("result_codes").cloned().unwrap_or(Value::Null);

    match extras["result_xdr"].as_str() {
        Some(result_xdr) => ChainError::Rejected(format!(
            "{}: result_codes={}, result_xdr=\"{}\"",
            title, result_codes, result_xdr
        )),
        None => ChainError::Rejected(format!(
            "{}: {}",
            title,
            body["detail"].as_str().unwrap_or("no detail")
        )),
    }
}

#[async_trait]
impl StellarNetwork for HorizonRpcClient {
    async fn load_sequence(&self, account_id: &str) -> Result<i64, ChainError> {
        let url = format!("{}/accounts/{}", self.horizon_url, account_id);
        let response = self.http.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ChainError::AccountNotFound(account_id.to_string()));
        }

        let body: Value = response.json().await?;
        body["sequence"]
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| ChainError::UnexpectedResponse {
                endpoint: "accounts".to_string(),
                detail: "missing sequence".to_string(),
            })
    }

    async fn submit_transaction(&self, envelope_xdr: &str) -> Result<SubmittedTransaction, ChainError> {
        let url = format!("{}/transactions", self.horizon_url);
        let response = self
            .http
            .post(&url)
            .form(&[("tx", envelope_xdr)])
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;

        if !status.is_success() {
            return Err(horizon_rejection(&body));
        }

        let hash = body["hash"].as_str().ok_or_else(|| ChainError::UnexpectedResponse {
            endpoint: "transactions".to_string(),
            detail: "missing hash".to_string(),
        })?;

        Ok(SubmittedTransaction {
            hash: hash.to_string(),
            ledger: body["ledger"].as_u64().map(|l| l as u32),
            result_meta_xdr: body["result_meta_xdr"].as_str().map(str::to_string),
        })
    }

    async fn simulate_transaction(&self, envelope_xdr: &str) -> Result<SimulatedInvocation, ChainError> {
        let result = self
            .rpc_call("simulateTransaction", json!({ "transaction": envelope_xdr }))
            .await?;

        if let Some(error) = result["error"].as_str() {
            return Err(ChainError::Simulation(error.to_string()));
        }

        let transaction_data = result["transactionData"]
            .as_str()
            .ok_or_else(|| ChainError::UnexpectedResponse {
                endpoint: "simulateTransaction".to_string(),
                detail: "missing transactionData".to_string(),
            })?
            .to_string();

        // minResourceFee arrives as a decimal string
        let min_resource_fee = match &result["minResourceFee"] {
            Value::String(s) => s.parse::<u32>().ok(),
            Value::Number(n) => n.as_u64().map(|n| n as u32),
            _ => None,
        }
        .ok_or_else(|| ChainError::UnexpectedResponse {
            endpoint: "simulateTransaction".to_string(),
            detail: "missing minResourceFee".to_string(),
        })?;

        let auth = result["results"]
            .as_array()
            .and_then(|results| results.first())
            .and_then(|first| first["auth"].as_array())
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|e| e.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        Ok(SimulatedInvocation {
            transaction_data,
            min_resource_fee,
            auth,
        })
    }

    async fn send_transaction(&self, envelope_xdr: &str) -> Result<SubmittedTransaction, ChainError> {
        let result = self
            .rpc_call("sendTransaction", json!({ "transaction": envelope_xdr }))
            .await?;

        let hash = result["hash"]
            .as_str()
            .ok_or_else(|| ChainError::UnexpectedResponse {
                endpoint: "sendTransaction".to_string(),
                detail: "missing hash".to_string(),
            })?
            .to_string();

        match result["status"].as_str() {
            Some("PENDING") | Some("DUPLICATE") => self.wait_for_confirmation(&hash).await,
            Some("ERROR") => Err(ChainError::Rejected(format!(
                "sendTransaction returned ERROR: errorResultXdr \"{}\"",
                result["errorResultXdr"].as_str().unwrap_or_default()
            ))),
            Some("TRY_AGAIN_LATER") => Err(ChainError::Rejected(
                "sendTransaction returned TRY_AGAIN_LATER".to_string(),
            )),
            other => Err(ChainError::UnexpectedResponse {
                endpoint: "sendTransaction".to_string(),
                detail: format!("status {:?}", other),
            }),
        }
    }

    async fn count_assets(&self, asset_code: &str, issuer: &str) -> Result<usize, ChainError> {
        let url = format!("{}/assets", self.horizon_url);
        let response = self
            .http
            .get(&url)
            .query(&[("asset_code", asset_code), ("asset_issuer", issuer)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChainError::UnexpectedResponse {
                endpoint: "assets".to_string(),
                detail: format!("HTTP {}", response.status()),
            });
        }

        let body: Value = response.json().await?;
        Ok(body["_embedded"]["records"]
            .as_array()
            .map(|records| records.len())
            .unwrap_or(0))
    }
}
