// src/models/contact.rs
// DOCUMENTATION: Contact form payload
// PURPOSE: Validate messages before they are relayed to the operator

use crate::errors::PlacesError;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body of POST /contact
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContactMessage {
    #[validate(length(min = 1, max = 200))]
    pub sender_name: String,

    #[validate(length(min = 1, max = 320))]
    pub sender_email: String,

    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

impl ContactMessage {
    /// Full validation: non-empty fields, then sender address shape
    /// DOCUMENTATION: The address must contain "@" and end with one of the
    /// allowed domain suffixes (case-insensitive)
    pub fn check(&self, allowed_domains: &[String]) -> Result<(), PlacesError> {
        if self.sender_name.trim().is_empty()
            || self.sender_email.trim().is_empty()
            || self.message.trim().is_empty()
        {
            return Err(PlacesError::ValidationError(
                "All fields are required".to_string(),
            ));
        }

        self.validate()
            .map_err(|e| PlacesError::ValidationError(e.to_string()))?;

        let email = self.sender_email.trim().to_lowercase();
        let domain_ok = allowed_domains
            .iter()
            .any(|suffix| email.ends_with(&suffix.to_lowercase()));

        if !email.contains('@') || !domain_ok {
            return Err(PlacesError::ValidationError(
                "Please enter a valid email address".to_string(),
            ));
        }

        Ok(())
    }
}
