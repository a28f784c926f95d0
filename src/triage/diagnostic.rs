//! Diagnostic result generation.
//!
//! A second, deliberately separate classifier from the risk scorer: it
//! re-derives urgency from the primary symptom text and severity alone and
//! feeds the final diagnostic card, while the scorer drives live escalation
//! during triage. The two can disagree on the same case; both results stay
//! visible to their respective consumers.

use serde::Serialize;

use crate::models::{DiagnosisUrgency, NextStepAction};
use crate::triage::catalog::AnswerSet;

/// Phrases in the primary symptom that force the emergency branch.
static EMERGENCY_SYMPTOMS: &[&str] = &[
    "chest pain",
    "difficulty breathing",
    "severe headache",
    "loss of consciousness",
    "severe abdominal pain",
    "signs of stroke",
    "severe allergic reaction",
];

/// Phrases in the primary symptom that force at least the urgent branch.
static URGENT_SYMPTOMS: &[&str] = &[
    "severe pain",
    "high fever",
    "persistent vomiting",
    "difficulty swallowing",
];

/// Input snapshot for one diagnosis. Assembled once when triage completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticInput {
    pub symptom: String,
    pub severity: u8,
    pub duration: String,
    pub onset: String,
    pub associated_symptoms: Vec<String>,
}

impl DiagnosticInput {
    /// Assemble the snapshot from the primary symptom and the completed
    /// answer set. Missing answers fall back to neutral values.
    pub fn from_answers(symptom: &str, answers: &AnswerSet) -> Self {
        Self {
            symptom: symptom.to_string(),
            severity: answers.scale("severity").unwrap_or(5),
            duration: answers.choice("onset").unwrap_or("unknown").to_string(),
            onset: answers.choice("pattern").unwrap_or("unknown").to_string(),
            associated_symptoms: answers.all_selections().map(String::from).collect(),
        }
    }
}

/// One candidate condition bucket with a coarse probability weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionCandidate {
    pub name: &'static str,
    pub probability: u8,
    pub description: &'static str,
}

/// Recommendation lists, grouped the way the recommendations screen renders them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendations {
    pub immediate: &'static [&'static str],
    pub self_care: &'static [&'static str],
    pub ayurvedic: &'static [&'static str],
    pub follow_up: &'static [&'static str],
}

/// The single next step the user is steered toward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextStep {
    pub action: NextStepAction,
    pub timeframe: &'static str,
    pub reasoning: &'static str,
}

/// Structured diagnosis for a completed triage. Created once per session,
/// never mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticResult {
    pub urgency: DiagnosisUrgency,
    pub conditions: Vec<ConditionCandidate>,
    pub recommendations: Recommendations,
    pub next_step: NextStep,
}

/// Classify the gathered symptom picture into a diagnostic result.
///
/// Branches are checked in severity order and the first one wins:
/// emergency phrase or severity ≥ 9, urgent phrase or severity ≥ 7,
/// severity ≥ 4, then the low-urgency default. Pure: identical input
/// always yields a structurally identical result.
pub fn diagnose(input: &DiagnosticInput) -> DiagnosticResult {
    let symptom_lower = input.symptom.to_lowercase();

    let is_emergency = EMERGENCY_SYMPTOMS
        .iter()
        .any(|phrase| symptom_lower.contains(phrase))
        || input.severity >= 9;
    if is_emergency {
        return emergency_result();
    }

    let is_urgent = URGENT_SYMPTOMS
        .iter()
        .any(|phrase| symptom_lower.contains(phrase))
        || input.severity >= 7;
    if is_urgent {
        return urgent_result();
    }

    if input.severity >= 4 {
        return moderate_result();
    }

    low_result()
}

// ── Branch templates ────────────────────────────────────────

fn emergency_result() -> DiagnosticResult {
    DiagnosticResult {
        urgency: DiagnosisUrgency::Emergency,
        conditions: vec![ConditionCandidate {
            name: "Medical Emergency",
            probability: 95,
            description: "Symptoms require immediate medical attention",
        }],
        recommendations: Recommendations {
            immediate: &[
                "Call 911 immediately",
                "Do not drive yourself",
                "Stay calm and follow emergency instructions",
            ],
            self_care: &[],
            ayurvedic: &[],
            follow_up: &["Follow up with primary care after emergency treatment"],
        },
        next_step: NextStep {
            action: NextStepAction::Emergency,
            timeframe: "Immediately",
            reasoning: "Your symptoms indicate a potential medical emergency that requires immediate professional care.",
        },
    }
}

fn urgent_result() -> DiagnosticResult {
    DiagnosticResult {
        urgency: DiagnosisUrgency::Urgent,
        conditions: vec![ConditionCandidate {
            name: "Acute Condition",
            probability: 80,
            description: "Requires prompt medical evaluation within 24 hours",
        }],
        recommendations: Recommendations {
            immediate: &["Seek medical care within 24 hours", "Monitor symptoms closely"],
            self_care: &["Rest", "Stay hydrated", "Take temperature regularly"],
            ayurvedic: &["Ginger tea for nausea", "Turmeric milk for inflammation"],
            follow_up: &["Schedule follow-up if symptoms persist"],
        },
        next_step: NextStep {
            action: NextStepAction::UrgentCare,
            timeframe: "Within 24 hours",
            reasoning: "Your symptoms suggest a condition that needs prompt medical attention.",
        },
    }
}

fn moderate_result() -> DiagnosticResult {
    DiagnosticResult {
        urgency: DiagnosisUrgency::Moderate,
        conditions: vec![ConditionCandidate {
            name: "Common Health Issue",
            probability: 70,
            description: "Manageable condition that may benefit from professional guidance",
        }],
        recommendations: Recommendations {
            immediate: &["Monitor symptoms", "Rest and hydration"],
            self_care: &[
                "Over-the-counter remedies as appropriate",
                "Gentle exercise if tolerated",
            ],
            ayurvedic: &[
                "Honey and ginger for throat issues",
                "Chamomile tea for relaxation",
                "Turmeric paste for inflammation",
            ],
            follow_up: &["Consider teleconsult if symptoms worsen"],
        },
        next_step: NextStep {
            action: NextStepAction::Teleconsult,
            timeframe: "Within 2-3 days",
            reasoning: "A healthcare professional can provide personalized guidance for your symptoms.",
        },
    }
}

fn low_result() -> DiagnosticResult {
    DiagnosticResult {
        urgency: DiagnosisUrgency::Low,
        conditions: vec![ConditionCandidate {
            name: "Minor Health Concern",
            probability: 60,
            description: "Likely manageable with self-care and natural remedies",
        }],
        recommendations: Recommendations {
            immediate: &["Self-care measures", "Monitor for changes"],
            self_care: &[
                "Adequate rest and sleep",
                "Proper hydration",
                "Balanced nutrition",
                "Stress management",
            ],
            ayurvedic: &[
                "Warm water with lemon for digestion",
                "Pranayama breathing exercises",
                "Herbal teas based on symptoms",
                "Gentle yoga or stretching",
            ],
            follow_up: &["Consult healthcare provider if symptoms persist beyond a week"],
        },
        next_step: NextStep {
            action: NextStepAction::SelfCare,
            timeframe: "Monitor for 3-7 days",
            reasoning: "Your symptoms can likely be managed with natural remedies and self-care.",
        },
    }
}
