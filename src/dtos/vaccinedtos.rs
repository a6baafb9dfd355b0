use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{error::ErrorMessage, utils::stellar_address::validate_asset_code};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ApplyVaccineDto {
    #[validate(length(min = 2, max = 64, message = "Vaccine name must be between 2-64 characters"))]
    pub name: String,

    #[validate(length(min = 16, max = 512, message = "Description must be between 16-512 characters"))]
    pub description: String,

    #[validate(length(min = 2, max = 64, message = "Batch must be between 2-64 characters"))]
    pub batch: String,

    pub taken_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
}

impl ApplyVaccineDto {
    pub fn validate_date_range(&self) -> Result<(), ValidationError> {
        if self.expiration_date <= self.taken_date {
            let mut error = ValidationError::new("invalid_date_range");
            error.message = Some(Cow::from(ErrorMessage::InvalidDateRange.to_string()));
            return Err(error);
        }
        Ok(())
    }
}

// No Debug: the body may carry a secret seed.
#[derive(Validate, Deserialize)]
pub struct ClassicIssueDto {
    #[validate(custom = "validate_asset_code")]
    pub vaccine_name: String,

    /// `S...` seed of the recipient, who has to co-sign the trust line.
    pub recipient_secret: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyVaccineResponseDto {
    pub is_valid: bool,
}
