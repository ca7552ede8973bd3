// src/services/contact.rs
// DOCUMENTATION: Contact form delivery
// PURPOSE: Compose operator emails and hand them to an HTTP mail relay

use crate::config::Config;
use crate::errors::PlacesError;
use crate::models::ContactMessage;
use crate::services::provider::http_client;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;

pub const CONTACT_SUBJECT: &str = "Sensory Heaven Contact Form Submission";

/// Email handed to the relay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl OutboundEmail {
    /// Operator email for a validated message; user text is HTML-escaped
    pub fn compose(message: &ContactMessage, operator_email: &str) -> Self {
        let html = format!(
            "<html><body>\
             <p><strong>Name:</strong> {}</p>\
             <p><strong>Email (sender):</strong> {}</p>\
             <p><strong>Message:</strong> {}</p>\
             </body></html>",
            html_escape(message.sender_name.trim()),
            html_escape(message.sender_email.trim()),
            html_escape(message.message.trim()),
        );

        Self {
            from: message.sender_email.trim().to_string(),
            to: operator_email.to_string(),
            subject: CONTACT_SUBJECT.to_string(),
            html,
        }
    }
}

fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Delivers composed emails
#[async_trait]
pub trait ContactRelay: Send + Sync {
    async fn deliver(&self, email: &OutboundEmail) -> Result<(), PlacesError>;
}

/// POSTs the email as JSON to a relay endpoint that owns the SMTP hop
pub struct HttpContactRelay {
    client: Client,
    url: String,
}

impl HttpContactRelay {
    pub fn new(url: String, timeout: std::time::Duration) -> Result<Self, PlacesError> {
        Ok(Self {
            client: http_client(timeout, "sensory-places")?,
            url,
        })
    }
}

#[async_trait]
impl ContactRelay for HttpContactRelay {
    async fn deliver(&self, email: &OutboundEmail) -> Result<(), PlacesError> {
        let response = self
            .client
            .post(&self.url)
            .json(email)
            .send()
            .await
            .map_err(|e| {
                // Relay URLs may carry a token in the query
                let e = e.without_url();
                log::error!("Contact relay request failed: {}", e);
                PlacesError::RelayFailure(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            log::error!("Contact relay returned HTTP {}", status);
            return Err(PlacesError::RelayFailure(format!("relay returned HTTP {}", status)));
        }

        Ok(())
    }
}

/// Validates and relays contact messages
/// DOCUMENTATION: Without a relay or operator address the desk answers
/// ServiceUnavailable instead of dropping messages
pub struct ContactDesk {
    relay: Option<Arc<dyn ContactRelay>>,
    operator_email: String,
    allowed_domains: Vec<String>,
}

impl ContactDesk {
    pub fn new(
        relay: Option<Arc<dyn ContactRelay>>,
        operator_email: String,
        allowed_domains: Vec<String>,
    ) -> Self {
        Self {
            relay,
            operator_email,
            allowed_domains,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, PlacesError> {
        let relay = match &config.contact_relay_url {
            Some(url) => {
                let relay: Arc<dyn ContactRelay> =
                    Arc::new(HttpContactRelay::new(url.clone(), config.provider_timeout())?);
                Some(relay)
            }
            None => None,
        };

        Ok(Self::new(
            relay,
            config.contact_operator_email.clone(),
            config.contact_allowed_domains.clone(),
        ))
    }

    pub async fn submit(&self, message: &ContactMessage) -> Result<(), PlacesError> {
        message.check(&self.allowed_domains)?;

        let relay = match &self.relay {
            Some(relay) if !self.operator_email.is_empty() => relay,
            _ => {
                return Err(PlacesError::ServiceUnavailable(
                    "contact form is not configured".to_string(),
                ))
            }
        };

        let email = OutboundEmail::compose(message, &self.operator_email);
        relay.deliver(&email).await?;
        log::info!("Contact message from {} relayed", email.from);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::sync::Mutex;

    /// Records delivered emails
    #[derive(Default)]
    pub struct RecordingRelay {
        pub sent: Mutex<Vec<OutboundEmail>>,
    }

    #[async_trait]
    impl ContactRelay for RecordingRelay {
        async fn deliver(&self, email: &OutboundEmail) -> Result<(), PlacesError> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    pub fn domains() -> Vec<String> {
        vec![".com".to_string(), ".net".to_string(), ".edu".to_string()]
    }
}
