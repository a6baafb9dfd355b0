use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    models::userkycmodel::{NewUserKyc, UserKyc},
    utils::stellar_address::validate_wallet_address,
};

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterUserKycDto {
    #[validate(length(min = 2, max = 150, message = "Full name must be between 2-150 characters"))]
    pub full_name: String,

    #[validate(length(min = 3, max = 80, message = "Document ID must be between 3-80 characters"))]
    pub document_id: String,

    #[validate(length(min = 1, max = 255, message = "ID photo reference must be between 1-255 characters"))]
    pub id_photo_ref: String,

    #[validate(custom = "validate_wallet_address")]
    pub wallet_address: String,
}

impl RegisterUserKycDto {
    /// Trims `document_id` so " ABC123 " and "ABC123" are the same document.
    pub fn normalized(mut self) -> Self {
        self.document_id = self.document_id.trim().to_string();
        self
    }
}

impl From<RegisterUserKycDto> for NewUserKyc {
    fn from(dto: RegisterUserKycDto) -> Self {
        NewUserKyc {
            wallet_address: dto.wallet_address,
            full_name: dto.full_name,
            document_id: dto.document_id,
            id_photo_ref: dto.id_photo_ref,
        }
    }
}

#[derive(Serialize, Deserialize, Validate)]
pub struct RequestQueryDto {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserKycListResponseDto {
    pub status: String,
    pub users: Vec<UserKyc>,
    pub results: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto() -> RegisterUserKycDto {
        RegisterUserKycDto {
            full_name: "Jane Doe".to_string(),
            document_id: "DOC-1".to_string(),
            id_photo_ref: "ipfs://abc".to_string(),
            wallet_address: format!("G{}", "A".repeat(55)),
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        assert!(dto().validate().is_ok());
    }

    #[test]
    fn test_field_bounds() {
        let mut body = dto();
        body.full_name = "J".to_string();
        assert!(body.validate().is_err());

        let mut body = dto();
        body.full_name = "J".repeat(151);
        assert!(body.validate().is_err());

        let mut body = dto();
        body.document_id = "AB".to_string();
        assert!(body.validate().is_err());

        let mut body = dto();
        body.id_photo_ref = "x".repeat(256);
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_malformed_wallet_rejected() {
        let mut body = dto();
        body.wallet_address = "0x52908400098527886E0F7030069857D2E4169EE7".to_string();
        let errors = body.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("wallet_address"));
    }

    #[test]
    fn test_document_id_is_trimmed_before_length_check() {
        let mut body = dto();
        body.document_id = "  ABC123  ".to_string();
        let body = body.normalized();
        assert_eq!(body.document_id, "ABC123");

        // whitespace does not count towards the minimum length
        let mut body = dto();
        body.document_id = "  AB  ".to_string();
        assert!(body.normalized().validate().is_err());
    }
}
