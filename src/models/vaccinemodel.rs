// models/vaccinemodel.rs
use serde::Serialize;

/// What the chain accepted. Which optional fields are filled depends on the issuance model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssuedToken {
    pub tx_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<u128>,
}

/// Best-effort reading of a transaction result found inside an error message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TxDiagnostic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_charged: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_code: Option<String>,
    pub operation_results: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IssuanceOutcome {
    Success(IssuedToken),
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        diagnostic: Option<TxDiagnostic>,
    },
}

impl IssuanceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, IssuanceOutcome::Success(_))
    }
}
