// service/registration.rs
use std::sync::Arc;

use validator::Validate;

use crate::{
    db::userkycdb::UserKycExt,
    dtos::userkycdtos::RegisterUserKycDto,
    models::userkycmodel::UserKyc,
    service::error::ServiceError,
};

#[derive(Clone)]
pub struct RegistrationService {
    db_client: Arc<dyn UserKycExt>,
}

impl RegistrationService {
    pub fn new(db_client: Arc<dyn UserKycExt>) -> Self {
        Self { db_client }
    }

    pub async fn register(&self, body: RegisterUserKycDto) -> Result<UserKyc, ServiceError> {
        let body = body.normalized();
        body.validate()?;

        let wallet_address = body.wallet_address.clone();
        let user = self.db_client.save_user_kyc(body.into()).await?;

        tracing::info!("Registered KYC record {} for wallet {}", user.id, wallet_address);
        Ok(user)
    }

    /// `Ok(None)` when nothing is registered for the wallet.
    pub async fn lookup(&self, wallet_address: &str) -> Result<Option<UserKyc>, ServiceError> {
        Ok(self.db_client.get_user_kyc_by_wallet(wallet_address).await?)
    }

    /// Newest first, together with the total number of records.
    pub async fn list(&self, page: u32, limit: usize) -> Result<(Vec<UserKyc>, i64), ServiceError> {
        let users = self.db_client.get_user_kycs(page, limit).await?;
        let total = self.db_client.get_user_kyc_count().await?;
        Ok((users, total))
    }
}
