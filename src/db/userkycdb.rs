// db/userkycdb.rs
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use super::{db::DBClient, session::DbSession};

use crate::{
    error::ErrorMessage,
    models::userkycmodel::{NewUserKyc, UserKyc},
};

const WALLET_CONSTRAINT: &str = "uq_user_kyc_wallet";
const DOCUMENT_CONSTRAINT: &str = "uq_user_kyc_document";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DuplicateField {
    WalletAddress,
    DocumentId,
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateField::WalletAddress => write!(f, "{}", ErrorMessage::WalletAlreadyRegistered),
            DuplicateField::DocumentId => write!(f, "{}", ErrorMessage::DocumentAlreadyRegistered),
        }
    }
}

#[derive(Error, Debug)]
pub enum KycStoreError {
    #[error("{0}")]
    DuplicateRegistration(DuplicateField),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserKycExt: Send + Sync {
    async fn save_user_kyc(&self, new_user: NewUserKyc) -> Result<UserKyc, KycStoreError>;

    async fn get_user_kyc_by_wallet(
        &self,
        wallet_address: &str,
    ) -> Result<Option<UserKyc>, KycStoreError>;

    async fn get_user_kycs(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<UserKyc>, KycStoreError>;

    async fn get_user_kyc_count(&self) -> Result<i64, KycStoreError>;
}

/// Maps a unique constraint name to the registration field it guards.
fn duplicate_field_for(constraint: Option<&str>) -> Option<DuplicateField> {
    match constraint {
        Some(WALLET_CONSTRAINT) => Some(DuplicateField::WalletAddress),
        Some(DOCUMENT_CONSTRAINT) => Some(DuplicateField::DocumentId),
        _ => None,
    }
}

/// Turns a unique-constraint violation into the field that collided.
/// Violations of any other constraint stay database errors.
fn classify_insert_error(err: sqlx::Error) -> KycStoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match duplicate_field_for(db_err.constraint()) {
                Some(field) => return KycStoreError::DuplicateRegistration(field),
                None => tracing::warn!(
                    "Unique violation on unexpected constraint {:?}",
                    db_err.constraint()
                ),
            }
        }
    }
    KycStoreError::Database(err)
}

pub async fn insert_user_kyc(
    session: &mut DbSession,
    new_user: &NewUserKyc,
) -> Result<UserKyc, KycStoreError> {
    sqlx::query_as::<_, UserKyc>(
        r#"
        INSERT INTO user_kyc (wallet_address, full_name, document_id, id_photo_ref)
        VALUES ($1, $2, $3, $4)
        RETURNING id, wallet_address, full_name, document_id, id_photo_ref, created_at
        "#
    )
    .bind(&new_user.wallet_address)
    .bind(&new_user.full_name)
    .bind(&new_user.document_id)
    .bind(&new_user.id_photo_ref)
    .fetch_one(session.conn())
    .await
    .map_err(classify_insert_error)
}

pub async fn select_user_kyc_by_wallet(
    session: &mut DbSession,
    wallet_address: &str,
) -> Result<Option<UserKyc>, KycStoreError> {
    let user = sqlx::query_as::<_, UserKyc>(
        r#"
        SELECT id, wallet_address, full_name, document_id, id_photo_ref, created_at
        FROM user_kyc
        WHERE wallet_address = $1
        "#
    )
    .bind(wallet_address)
    .fetch_optional(session.conn())
    .await?;

    Ok(user)
}

pub async fn select_user_kycs(
    session: &mut DbSession,
    page: u32,
    limit: usize,
) -> Result<Vec<UserKyc>, KycStoreError> {
    let offset = (page.max(1) - 1) as i64 * limit as i64;

    let users = sqlx::query_as::<_, UserKyc>(
        r#"
        SELECT id, wallet_address, full_name, document_id, id_photo_ref, created_at
        FROM user_kyc
        ORDER BY created_at DESC, id DESC
        LIMIT $1 OFFSET $2
        "#
    )
    .bind(limit as i64)
    .bind(offset)
    .fetch_all(session.conn())
    .await?;

    Ok(users)
}

// Each trait call is its own unit of work. Callers that need several
// statements in one transaction use the session functions above directly.
#[async_trait]
impl UserKycExt for DBClient {
    async fn save_user_kyc(&self, new_user: NewUserKyc) -> Result<UserKyc, KycStoreError> {
        let mut session = DbSession::begin(&self.pool).await?;
        let user = insert_user_kyc(&mut session, &new_user).await?;
        session.commit().await?;
        Ok(user)
    }

    async fn get_user_kyc_by_wallet(
        &self,
        wallet_address: &str,
    ) -> Result<Option<UserKyc>, KycStoreError> {
        let mut session = DbSession::begin(&self.pool).await?;
        let user = select_user_kyc_by_wallet(&mut session, wallet_address).await?;
        session.commit().await?;
        Ok(user)
    }

    async fn get_user_kycs(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<UserKyc>, KycStoreError> {
        let mut session = DbSession::begin(&self.pool).await?;
        let users = select_user_kycs(&mut session, page, limit).await?;
        session.commit().await?;
        Ok(users)
    }

    async fn get_user_kyc_count(&self) -> Result<i64, KycStoreError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM user_kyc"#)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
