use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::userkycdtos::{RegisterUserKycDto, RequestQueryDto, UserKycListResponseDto},
    error::{ErrorMessage, HttpError},
    handler::extractors::{extract_json, extract_query},
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/", get(get_users))
        .route("/register", post(register_user))
        .route("/:wallet_address", get(get_user_by_wallet))
}

pub async fn register_user(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Result<Json<RegisterUserKycDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = extract_json(body)?;

    // The service trims and validates before saving.
    let user = app_state.registration_service.register(body).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user_by_wallet(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(wallet_address): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let user = app_state
        .registration_service
        .lookup(&wallet_address)
        .await?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNotFound.to_string()))?;

    Ok(Json(user))
}

pub async fn get_users(
    query_params: Result<Query<RequestQueryDto>, QueryRejection>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let query_params = extract_query(query_params)?;
    query_params.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query_params.page.unwrap_or(1);
    let limit = query_params.limit.unwrap_or(10);

    let (users, user_count) = app_state
        .registration_service
        .list(page, limit)
        .await?;

    let response = UserKycListResponseDto {
        status: "success".to_string(),
        users,
        results: user_count,
    };

    Ok(Json(response))
}
