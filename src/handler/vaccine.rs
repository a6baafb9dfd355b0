use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::vaccinedtos::{ApplyVaccineDto, ClassicIssueDto, VerifyVaccineResponseDto},
    error::{ErrorMessage, HttpError},
    handler::extractors::extract_json,
    service::stellar_keys::Keypair,
    AppState,
};

pub fn vaccine_handler() -> Router {
    Router::new()
        .route("/apply_vaccine/:destination_key", post(apply_vaccine))
        .route("/tokens/classic", post(issue_classic_token))
        .route("/verify_vaccine/:asset_code/:issuer_account", get(verify_vaccine))
}

pub async fn apply_vaccine(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(destination_key): Path<String>,
    body: Result<Json<ApplyVaccineDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = extract_json(body)?;

    // Field rules and the date order are checked by the service before any network call.
    let outcome = app_state
        .contract_issuance
        .issue(&body, &destination_key)
        .await?;

    Ok(Json(outcome))
}

pub async fn issue_classic_token(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Result<Json<ClassicIssueDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = extract_json(body)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let recipient = match body.recipient_secret.as_deref() {
        Some(secret) => Keypair::from_secret(secret)
            .map_err(|_| HttpError::bad_request(ErrorMessage::InvalidRecipientSecret.to_string()))?,
        None => {
            let recipient = Keypair::random();
            tracing::info!("No recipient_secret given, generated recipient {}", recipient.public_key());
            recipient
        }
    };

    let outcome = app_state
        .classic_issuance
        .issue(&body.vaccine_name, &app_state.env.issuer, &recipient)
        .await;

    Ok(Json(outcome))
}

pub async fn verify_vaccine(
    Extension(app_state): Extension<Arc<AppState>>,
    Path((asset_code, issuer_account)): Path<(String, String)>,
) -> impl IntoResponse {
    let is_valid = app_state
        .token_verification
        .verify(&asset_code, &issuer_account)
        .await;

    Json(VerifyVaccineResponseDto { is_valid })
}
