// WhatsApp Business API - configuration surface and stubs
//
// Extension point only: neither call performs network I/O.

use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessApiConfig {
    pub api_url: String,
    pub access_token: String,
    pub phone_number_id: String,
}

impl BusinessApiConfig {
    /// All three values present
    pub fn is_configured(&self) -> bool {
        !self.api_url.is_empty() && !self.access_token.is_empty() && !self.phone_number_id.is_empty()
    }
}

/// Payload the Business API expects for a text message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextMessage<'a> {
    pub messaging_product: &'static str,
    pub to: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: TextBody<'a>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBody<'a> {
    pub body: &'a str,
}

pub struct BusinessApi {
    config: BusinessApiConfig,
}

impl BusinessApi {
    pub fn new(config: BusinessApiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BusinessApiConfig {
        &self.config
    }

    /// Build the request body and log it; nothing is sent
    pub fn send_message(&self, to: &str, message: &str) -> serde_json::Value {
        let payload = TextMessage {
            messaging_product: "whatsapp",
            to,
            kind: "text",
            text: TextBody { body: message },
        };

        // TextMessage only holds strings, serialization cannot fail
        let body = serde_json::to_value(&payload).unwrap_or_default();
        info!(
            to,
            configured = self.config.is_configured(),
            "business api send skipped (not implemented)"
        );
        body
    }

    /// Log an incoming webhook payload; nothing is processed yet
    pub fn handle_webhook(&self, data: &serde_json::Value) {
        info!(payload = %data, "business api webhook received");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_not_configured() {
        assert!(!BusinessApiConfig::default().is_configured());

        let config = BusinessApiConfig {
            api_url: "https://graph.example/v1".to_string(),
            access_token: "token".to_string(),
            phone_number_id: "123".to_string(),
        };
        assert!(config.is_configured());
    }

    #[test]
    fn test_send_message_builds_payload_only() {
        let api = BusinessApi::new(BusinessApiConfig::default());
        let body = api.send_message("5511999999999", "Olá");

        assert_eq!(body["messaging_product"], "whatsapp");
        assert_eq!(body["type"], "text");
        assert_eq!(body["text"]["body"], "Olá");
    }

    #[test]
    fn test_webhook_accepts_any_json() {
        let api = BusinessApi::new(BusinessApiConfig::default());
        api.handle_webhook(&serde_json::json!({ "entry": [] }));
    }
}
