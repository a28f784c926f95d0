//! Defensive parsing of dialogue backend payloads.
//!
//! The backend is asked to reply in JSON but is not trusted to. Parsing is
//! total: any payload, however malformed, maps to an `AssistantReply`. On
//! failure the raw text becomes the reply with urgency low and stage
//! symptom_gathering, so a bad payload can never take down a session.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{DialogueStage, RiskLevel};

/// Standing prompt used when the backend returns an empty payload.
pub const EMPTY_REPLY_PROMPT: &str =
    "I'm here to help. Could you tell me more about how you're feeling?";

/// Assistant message appended when the backend call itself fails.
pub const RECOVERY_MESSAGE: &str = "I apologize, but I'm having trouble processing your message right now. Could you please try again? If this continues, please consider calling your healthcare provider directly.";

const FALLBACK_NEXT_STEPS: &str = "Continue conversation";

// ═══════════════════════════════════════════════════════════
// AssistantReply
// ═══════════════════════════════════════════════════════════

/// A structured assistant reply after defensive parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub reply: String,
    pub urgency: RiskLevel,
    pub stage: DialogueStage,
    pub suggested_actions: Vec<String>,
    pub follow_up_questions: Vec<String>,
    pub risk_factors: Vec<String>,
    pub next_steps: Option<String>,
}

impl AssistantReply {
    /// The reply appended when the backend call fails outright.
    pub fn recovery() -> Self {
        Self {
            reply: RECOVERY_MESSAGE.to_string(),
            urgency: RiskLevel::Low,
            stage: DialogueStage::SymptomGathering,
            suggested_actions: Vec::new(),
            follow_up_questions: Vec::new(),
            risk_factors: Vec::new(),
            next_steps: Some(FALLBACK_NEXT_STEPS.to_string()),
        }
    }
}

/// Loose schema for the inner payload. Every field optional, enum fields
/// kept as strings and mapped leniently afterwards.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReply {
    response: Option<String>,
    urgency_level: Option<String>,
    stage: Option<String>,
    suggested_actions: Option<Vec<serde_json::Value>>,
    follow_up_questions: Option<Vec<serde_json::Value>>,
    risk_factors: Option<Vec<serde_json::Value>>,
    next_steps: Option<String>,
}

// ═══════════════════════════════════════════════════════════
// Parsing
// ═══════════════════════════════════════════════════════════

/// Parse a backend payload into a reply. Total: never fails.
pub fn parse_reply(payload: &str) -> AssistantReply {
    let candidate = extract_fenced_json(payload).unwrap_or(payload);

    match serde_json::from_str::<RawReply>(candidate) {
        Ok(raw) => match raw.response {
            Some(reply) if !reply.trim().is_empty() => AssistantReply {
                reply,
                urgency: lenient_level(raw.urgency_level.as_deref()),
                stage: lenient_stage(raw.stage.as_deref()),
                suggested_actions: strings_lenient(raw.suggested_actions),
                follow_up_questions: strings_lenient(raw.follow_up_questions),
                risk_factors: strings_lenient(raw.risk_factors),
                next_steps: raw.next_steps,
            },
            _ => {
                tracing::warn!("Backend payload parsed but carried no reply text");
                fallback(payload)
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Backend payload is not JSON, using raw text");
            fallback(payload)
        }
    }
}

fn fallback(payload: &str) -> AssistantReply {
    let reply = if payload.trim().is_empty() {
        EMPTY_REPLY_PROMPT.to_string()
    } else {
        payload.to_string()
    };
    AssistantReply {
        reply,
        urgency: RiskLevel::Low,
        stage: DialogueStage::SymptomGathering,
        suggested_actions: Vec::new(),
        follow_up_questions: Vec::new(),
        risk_factors: Vec::new(),
        next_steps: Some(FALLBACK_NEXT_STEPS.to_string()),
    }
}

/// Extract the contents of a ```json fenced block, if present.
fn extract_fenced_json(text: &str) -> Option<&str> {
    let start = text.find("```json")? + 7;
    let rest = &text[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

fn lenient_level(value: Option<&str>) -> RiskLevel {
    value
        .and_then(|s| RiskLevel::from_str(s).ok())
        .unwrap_or(RiskLevel::Low)
}

fn lenient_stage(value: Option<&str>) -> DialogueStage {
    value
        .and_then(|s| DialogueStage::from_str(s).ok())
        .unwrap_or(DialogueStage::SymptomGathering)
}

/// Collect string items, skipping anything that is not a string.
fn strings_lenient(items: Option<Vec<serde_json::Value>>) -> Vec<String> {
    items
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| serde_json::from_value::<String>(item).ok())
        .collect()
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PAYLOAD: &str = r#"{
        "response": "That sounds uncomfortable. When did the pain start?",
        "urgencyLevel": "medium",
        "stage": "symptom_gathering",
        "suggestedActions": ["Rest", "Stay hydrated"],
        "followUpQuestions": ["When did the pain start?"],
        "riskFactors": ["History of migraines"],
        "nextSteps": "Continue health assessment"
    }"#;

    #[test]
    fn valid_payload_parses_every_field() {
        let reply = parse_reply(FULL_PAYLOAD);
        assert_eq!(
            reply.reply,
            "That sounds uncomfortable. When did the pain start?"
        );
        assert_eq!(reply.urgency, RiskLevel::Medium);
        assert_eq!(reply.stage, DialogueStage::SymptomGathering);
        assert_eq!(reply.suggested_actions, vec!["Rest", "Stay hydrated"]);
        assert_eq!(reply.follow_up_questions, vec!["When did the pain start?"]);
        assert_eq!(reply.risk_factors, vec!["History of migraines"]);
        assert_eq!(reply.next_steps.as_deref(), Some("Continue health assessment"));
    }

    #[test]
    fn fenced_payload_parses() {
        let fenced = format!("Here is my assessment:\n```json\n{FULL_PAYLOAD}\n```\n");
        let reply = parse_reply(&fenced);
        assert_eq!(reply.urgency, RiskLevel::Medium);
        assert_eq!(
            reply.reply,
            "That sounds uncomfortable. When did the pain start?"
        );
    }

    #[test]
    fn unknown_urgency_falls_back_to_low() {
        let reply = parse_reply(r#"{"response": "ok", "urgencyLevel": "catastrophic"}"#);
        assert_eq!(reply.urgency, RiskLevel::Low);
    }

    #[test]
    fn unknown_stage_falls_back_to_symptom_gathering() {
        let reply = parse_reply(r#"{"response": "ok", "stage": "error"}"#);
        assert_eq!(reply.stage, DialogueStage::SymptomGathering);
    }

    #[test]
    fn plain_text_becomes_the_reply() {
        let reply = parse_reply("You should rest and drink plenty of water.");
        assert_eq!(reply.reply, "You should rest and drink plenty of water.");
        assert_eq!(reply.urgency, RiskLevel::Low);
        assert_eq!(reply.stage, DialogueStage::SymptomGathering);
        assert!(reply.suggested_actions.is_empty());
        assert_eq!(reply.next_steps.as_deref(), Some("Continue conversation"));
    }

    #[test]
    fn empty_payload_uses_standing_prompt() {
        let reply = parse_reply("   ");
        assert_eq!(reply.reply, EMPTY_REPLY_PROMPT);
        assert_eq!(reply.urgency, RiskLevel::Low);
    }

    #[test]
    fn json_without_reply_text_falls_back_to_raw() {
        let payload = r#"{"urgencyLevel": "high"}"#;
        let reply = parse_reply(payload);
        assert_eq!(reply.reply, payload);
        // Fallback ignores the parsed urgency on a schema mismatch.
        assert_eq!(reply.urgency, RiskLevel::Low);
    }

    #[test]
    fn non_string_array_items_are_skipped() {
        let reply = parse_reply(
            r#"{"response": "ok", "suggestedActions": ["Rest", 42, {"x": 1}, "Hydrate"]}"#,
        );
        assert_eq!(reply.suggested_actions, vec!["Rest", "Hydrate"]);
    }

    #[test]
    fn recovery_reply_is_low_urgency_apology() {
        let reply = AssistantReply::recovery();
        assert!(reply.reply.contains("I apologize"));
        assert_eq!(reply.urgency, RiskLevel::Low);
        assert_eq!(reply.stage, DialogueStage::SymptomGathering);
    }
}
