//! Emergency phrase guard.
//!
//! A crude, high-recall substring filter over free-form user text. It makes
//! no diagnostic judgment: any hit routes the session straight to the
//! care-connection stage, whatever stage it is in. False positives are
//! acceptable; missed emergencies are not.

/// Phrases that indicate a potential medical emergency.
///
/// Matching is case-insensitive substring containment. Every phrase here
/// justifies skipping the entire triage flow, so the list stays short.
pub static EMERGENCY_PHRASES: &[&str] = &[
    "chest pain",
    "can't breathe",
    "difficulty breathing",
    "severe pain",
    "unconscious",
    "stroke",
    "heart attack",
    "severe bleeding",
    "overdose",
];

/// Check free text for emergency phrases. True if any phrase is contained.
pub fn evaluate(text: &str) -> bool {
    first_match(text).is_some()
}

/// The first emergency phrase contained in the text, if any.
pub fn first_match(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    let hit = EMERGENCY_PHRASES
        .iter()
        .find(|phrase| lower.contains(**phrase))
        .copied();

    if let Some(phrase) = hit {
        tracing::warn!(phrase, "Emergency phrase detected in user text");
    }

    hit
}
