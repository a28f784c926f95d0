//! Blocking HTTP client for the hosted dialogue function.
//!
//! The function takes the user's message plus assembled context and returns
//! an envelope `{ "response": "..." }` whose inner string is itself JSON.
//! Transport and interpretation stay separate: this module never looks
//! inside the inner payload (see `parser`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::AssistantError;
use crate::config;
use crate::models::{HealthProfile, Personality};

// ═══════════════════════════════════════════════════════════
// Wire types
// ═══════════════════════════════════════════════════════════

/// One outbound exchange. Key names follow the function's contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    pub message: String,
    pub system_prompt: String,
    pub conversation_history: String,
    pub user_profile: HealthProfile,
    pub personality: Personality,
}

#[derive(Debug, Deserialize)]
struct ExchangeEnvelope {
    response: String,
}

// ═══════════════════════════════════════════════════════════
// DialogueBackend trait
// ═══════════════════════════════════════════════════════════

/// Boundary trait for the remote dialogue backend.
///
/// Implementations return the raw envelope payload. `parser::parse_reply`
/// turns that payload into a structured `AssistantReply`.
pub trait DialogueBackend: Send + Sync {
    fn exchange(&self, request: &ExchangeRequest) -> Result<String, AssistantError>;
}

// ═══════════════════════════════════════════════════════════
// HttpDialogueBackend
// ═══════════════════════════════════════════════════════════

const EXCHANGE_PATH: &str = "/enhanced-health-chat";

pub struct HttpDialogueBackend {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpDialogueBackend {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Client for a locally served function host.
    pub fn default_local() -> Self {
        Self::new(
            config::DEFAULT_BACKEND_BASE,
            config::DEFAULT_BACKEND_TIMEOUT_SECS,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl DialogueBackend for HttpDialogueBackend {
    fn exchange(&self, request: &ExchangeRequest) -> Result<String, AssistantError> {
        let url = format!("{}{}", self.base_url, EXCHANGE_PATH);

        let response = self.client.post(&url).json(request).send().map_err(|e| {
            if e.is_connect() {
                AssistantError::BackendConnection(self.base_url.clone())
            } else if e.is_timeout() {
                AssistantError::HttpClient(format!(
                    "Request timed out after {}s",
                    self.timeout_secs
                ))
            } else {
                AssistantError::HttpClient(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(AssistantError::BackendStatus { status, body });
        }

        let envelope: ExchangeEnvelope = response
            .json()
            .map_err(|e| AssistantError::ResponseParsing(e.to_string()))?;

        Ok(envelope.response)
    }
}

// ═══════════════════════════════════════════════════════════
// MockDialogueBackend (tests)
// ═══════════════════════════════════════════════════════════

/// Test double with a canned payload, optional failure, optional delay.
pub struct MockDialogueBackend {
    payload: String,
    fail: bool,
    delay_ms: u64,
}

impl MockDialogueBackend {
    pub fn new(payload: &str) -> Self {
        Self {
            payload: payload.to_string(),
            fail: false,
            delay_ms: 0,
        }
    }

    /// A backend that always fails with a connection error.
    pub fn failing() -> Self {
        Self {
            payload: String::new(),
            fail: true,
            delay_ms: 0,
        }
    }

    /// Sleep before responding. Lets tests hold an exchange in flight.
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

impl DialogueBackend for MockDialogueBackend {
    fn exchange(&self, _request: &ExchangeRequest) -> Result<String, AssistantError> {
        if self.delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(self.delay_ms));
        }
        if self.fail {
            return Err(AssistantError::BackendConnection("mock".to_string()));
        }
        Ok(self.payload.clone())
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> ExchangeRequest {
        ExchangeRequest {
            message: "I have a headache".to_string(),
            system_prompt: "You are Ask CareBow".to_string(),
            conversation_history: "user: I have a headache".to_string(),
            user_profile: HealthProfile::default(),
            personality: Personality::CaringNurse,
        }
    }

    #[test]
    fn constructor_trims_trailing_slash() {
        let backend = HttpDialogueBackend::new("http://localhost:54321/functions/v1/", 30);
        assert_eq!(backend.base_url(), "http://localhost:54321/functions/v1");
        assert_eq!(backend.timeout_secs, 30);
    }

    #[test]
    fn default_local_points_at_function_host() {
        let backend = HttpDialogueBackend::default_local();
        assert!(backend.base_url().contains("localhost"));
    }

    #[test]
    fn request_serializes_with_camel_case_keys() {
        let json = serde_json::to_string(&sample_request()).unwrap();
        assert!(json.contains("\"message\""));
        assert!(json.contains("\"systemPrompt\""));
        assert!(json.contains("\"conversationHistory\""));
        assert!(json.contains("\"userProfile\""));
        assert!(json.contains("\"personality\":\"caring_nurse\""));
    }

    #[test]
    fn mock_returns_configured_payload() {
        let backend = MockDialogueBackend::new("{\"response\":\"hi\"}");
        let payload = backend.exchange(&sample_request()).unwrap();
        assert_eq!(payload, "{\"response\":\"hi\"}");
    }

    #[test]
    fn mock_failure_is_a_connection_error() {
        let backend = MockDialogueBackend::failing();
        let result = backend.exchange(&sample_request());
        assert!(matches!(
            result,
            Err(AssistantError::BackendConnection(_))
        ));
    }
}
