// models/userkycmodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserKyc {
    pub id: i32,
    pub wallet_address: String,
    pub full_name: String,
    pub document_id: String,
    pub id_photo_ref: String,
    pub created_at: DateTime<Utc>,
}

/// A validated registration, ready to be inserted. `document_id` is already trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUserKyc {
    pub wallet_address: String,
    pub full_name: String,
    pub document_id: String,
    pub id_photo_ref: String,
}
