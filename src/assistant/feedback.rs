//! End-of-session feedback capture.
//!
//! The feedback prompt fires once per session (see `session::machine`).
//! Submission is best-effort: a sink failure is logged and never rolls
//! back the triage result already shown to the user.

use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use super::AssistantError;
use crate::models::FeedbackRating;

/// One satisfaction rating for a completed session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionFeedback {
    #[serde(rename = "conversation_id")]
    pub session_id: Uuid,
    pub rating: FeedbackRating,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

pub trait FeedbackSink: Send + Sync {
    fn submit(&self, feedback: &SessionFeedback) -> Result<(), AssistantError>;
}

// ═══════════════════════════════════════════════════════════
// HttpFeedbackSink
// ═══════════════════════════════════════════════════════════

const FEEDBACK_PATH: &str = "/api/v1/feedback/";

pub struct HttpFeedbackSink {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpFeedbackSink {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl FeedbackSink for HttpFeedbackSink {
    fn submit(&self, feedback: &SessionFeedback) -> Result<(), AssistantError> {
        let url = format!("{}{}", self.base_url, FEEDBACK_PATH);

        let response = self.client.post(&url).json(feedback).send().map_err(|e| {
            if e.is_connect() {
                AssistantError::BackendConnection(self.base_url.clone())
            } else {
                AssistantError::HttpClient(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(AssistantError::BackendStatus { status, body });
        }

        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// MemoryFeedbackSink
// ═══════════════════════════════════════════════════════════

/// In-memory sink recording submissions. The default sink, and the
/// test double (optionally failing).
pub struct MemoryFeedbackSink {
    received: Mutex<Vec<SessionFeedback>>,
    fail: bool,
}

impl MemoryFeedbackSink {
    pub fn new() -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A sink that always fails with a connection error.
    pub fn failing() -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Everything submitted so far.
    pub fn received(&self) -> Vec<SessionFeedback> {
        self.received
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default()
    }
}

impl Default for MemoryFeedbackSink {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackSink for MemoryFeedbackSink {
    fn submit(&self, feedback: &SessionFeedback) -> Result<(), AssistantError> {
        if self.fail {
            return Err(AssistantError::BackendConnection("mock".to_string()));
        }
        if let Ok(mut items) = self.received.lock() {
            items.push(feedback.clone());
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
