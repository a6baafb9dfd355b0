// db/memory.rs
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::userkycdb::{DuplicateField, KycStoreError, UserKycExt};
use crate::models::userkycmodel::{NewUserKyc, UserKyc};

/// Test double for the Postgres store, enforcing the same unique constraints.
#[derive(Default)]
pub struct InMemoryKycStore {
    rows: Mutex<Vec<UserKyc>>,
}

impl InMemoryKycStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl UserKycExt for InMemoryKycStore {
    async fn save_user_kyc(&self, new_user: NewUserKyc) -> Result<UserKyc, KycStoreError> {
        let mut rows = self.rows.lock().unwrap();

        if rows.iter().any(|r| r.wallet_address == new_user.wallet_address) {
            return Err(KycStoreError::DuplicateRegistration(DuplicateField::WalletAddress));
        }
        if rows.iter().any(|r| r.document_id == new_user.document_id) {
            return Err(KycStoreError::DuplicateRegistration(DuplicateField::DocumentId));
        }

        let user = UserKyc {
            id: rows.len() as i32 + 1,
            wallet_address: new_user.wallet_address,
            full_name: new_user.full_name,
            document_id: new_user.document_id,
            id_photo_ref: new_user.id_photo_ref,
            created_at: Utc::now(),
        };
        rows.push(user.clone());
        Ok(user)
    }

    async fn get_user_kyc_by_wallet(
        &self,
        wallet_address: &str,
    ) -> Result<Option<UserKyc>, KycStoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|r| r.wallet_address == wallet_address).cloned())
    }

    async fn get_user_kycs(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<UserKyc>, KycStoreError> {
        let rows = self.rows.lock().unwrap();
        let skip = (page.max(1) as usize - 1) * limit;
        Ok(rows.iter().rev().skip(skip).take(limit).cloned().collect())
    }

    async fn get_user_kyc_count(&self) -> Result<i64, KycStoreError> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }
}
