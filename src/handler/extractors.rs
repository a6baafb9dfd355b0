// handler/extractors.rs
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    Json,
};

use crate::error::HttpError;

/// Unwraps a JSON body, turning a rejection into the usual 400 `fail` body.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, HttpError> {
    result
        .map(|Json(value)| value)
        .map_err(|rejection| HttpError::bad_request(rejection.body_text()))
}

pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, HttpError> {
    result
        .map(|Query(value)| value)
        .map_err(|rejection| HttpError::bad_request(rejection.body_text()))
}
