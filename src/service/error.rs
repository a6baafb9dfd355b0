use axum::http::StatusCode;
use thiserror::Error;

use crate::{
    db::userkycdb::KycStoreError,
    error::{ErrorMessage, HttpError},
    service::stellar_keys::KeyError,
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    DuplicateRegistration(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<KycStoreError> for ServiceError {
    fn from(error: KycStoreError) -> Self {
        match error {
            KycStoreError::DuplicateRegistration(field) => {
                ServiceError::DuplicateRegistration(field.to_string())
            }
            KycStoreError::Database(e) => ServiceError::Database(e),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::Validation(errors.to_string())
    }
}

impl From<validator::ValidationError> for ServiceError {
    fn from(error: validator::ValidationError) -> Self {
        let message = error
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| error.code.to_string());
        ServiceError::Validation(message)
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_)
            | ServiceError::DuplicateRegistration(_) => StatusCode::BAD_REQUEST,

            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Validation(_) => HttpError::bad_request(error.to_string()),
            ServiceError::DuplicateRegistration(_) => {
                HttpError::unique_constraint_violation(error.to_string())
            }
            ServiceError::Database(e) => {
                tracing::error!("Database error: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
        }
    }
}

/// Anything that can go wrong between building a transaction and hearing back from the network.
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Account {0} was not found on the network")]
    AccountNotFound(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Simulation failed: {0}")]
    Simulation(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Unexpected response from {endpoint}: {detail}")]
    UnexpectedResponse { endpoint: String, detail: String },

    #[error("XDR error: {0}")]
    Xdr(#[from] stellar_xdr::curr::Error),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("Invalid asset: {0}")]
    InvalidAsset(String),
}
