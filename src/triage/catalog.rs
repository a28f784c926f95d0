//! Triage question catalog and answer collection.
//!
//! Questions are immutable static data: a base sequence every triage walks
//! through, plus extension sequences keyed by normalized primary-symptom
//! text. Lookup is an exact, finite match — unmatched symptoms fall back to
//! the base sequence alone, never to fuzzy matching.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How a triage question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InputKind {
    FreeText,
    Scale,
    SingleChoice,
    MultiChoice,
}

/// Risk marker attached to a question, used for inline warnings while the
/// question is on screen. Independent of the scored urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskTag {
    Medium,
    High,
    Emergency,
}

/// Notice shown alongside questions tagged [`RiskTag::Emergency`].
pub const EMERGENCY_QUESTION_NOTICE: &str = "If you're experiencing severe symptoms, consider seeking immediate medical attention. Call 911 for emergencies or visit your nearest emergency room.";

/// One catalog question. Static and read-only at runtime.
#[derive(Debug, Clone, Serialize)]
pub struct TriageQuestion {
    pub id: &'static str,
    pub prompt: &'static str,
    pub kind: InputKind,
    /// Ordered option list for choice kinds; empty for text and scale.
    pub options: &'static [&'static str],
    pub required: bool,
    pub risk_tag: Option<RiskTag>,
}

impl TriageQuestion {
    /// Inline warning text for emergency-tagged questions.
    pub fn inline_notice(&self) -> Option<&'static str> {
        match self.risk_tag {
            Some(RiskTag::Emergency) => Some(EMERGENCY_QUESTION_NOTICE),
            _ => None,
        }
    }
}

// ── Base sequence ───────────────────────────────────────────

/// The three questions every triage asks, in order: onset, severity, pattern.
pub static BASE_QUESTIONS: &[TriageQuestion] = &[
    TriageQuestion {
        id: "onset",
        prompt: "When did this symptom start?",
        kind: InputKind::SingleChoice,
        options: &[
            "Just now (within the last hour)",
            "Today (within the last 24 hours)",
            "Yesterday (1-2 days ago)",
            "This week (3-7 days ago)",
            "More than a week ago",
        ],
        required: true,
        risk_tag: None,
    },
    TriageQuestion {
        id: "severity",
        prompt: "On a scale of 1-10, how severe is your discomfort?",
        kind: InputKind::Scale,
        options: &[],
        required: true,
        risk_tag: None,
    },
    TriageQuestion {
        id: "pattern",
        prompt: "How would you describe the pattern?",
        kind: InputKind::SingleChoice,
        options: &[
            "Constant and unchanging",
            "Getting worse over time",
            "Getting better over time",
            "Comes and goes (intermittent)",
            "Only happens with certain activities",
        ],
        required: true,
        risk_tag: None,
    },
];

// ── Symptom-specific extensions ─────────────────────────────

static CHEST_PAIN_QUESTIONS: &[TriageQuestion] = &[
    TriageQuestion {
        id: "chest_location",
        prompt: "Where exactly is the chest pain located?",
        kind: InputKind::SingleChoice,
        options: &[
            "Center of chest",
            "Left side of chest",
            "Right side of chest",
            "Upper chest/neck area",
            "Lower chest/upper abdomen",
        ],
        required: true,
        risk_tag: Some(RiskTag::High),
    },
    TriageQuestion {
        id: "chest_associated",
        prompt: "Are you experiencing any of these symptoms along with chest pain?",
        kind: InputKind::MultiChoice,
        options: &[
            "Shortness of breath",
            "Sweating",
            "Nausea or vomiting",
            "Dizziness or lightheadedness",
            "Pain radiating to arm, jaw, or back",
        ],
        required: true,
        risk_tag: Some(RiskTag::Emergency),
    },
];

static HEADACHE_QUESTIONS: &[TriageQuestion] = &[
    TriageQuestion {
        id: "headache_type",
        prompt: "What type of headache best describes your pain?",
        kind: InputKind::SingleChoice,
        options: &[
            "Throbbing or pulsating",
            "Tight band around head",
            "Sharp, stabbing pain",
            "Dull, constant ache",
            "Pressure behind eyes",
        ],
        required: true,
        risk_tag: None,
    },
    TriageQuestion {
        id: "headache_triggers",
        prompt: "Have you noticed any triggers? (Select all that apply)",
        kind: InputKind::MultiChoice,
        options: &[
            "Stress or anxiety",
            "Lack of sleep",
            "Certain foods",
            "Bright lights",
            "Weather changes",
            "Screen time",
        ],
        required: false,
        risk_tag: None,
    },
];

static FEVER_QUESTIONS: &[TriageQuestion] = &[
    TriageQuestion {
        id: "temperature",
        prompt: "What is your current temperature? (if measured)",
        kind: InputKind::FreeText,
        options: &[],
        required: false,
        risk_tag: None,
    },
    TriageQuestion {
        id: "fever_symptoms",
        prompt: "What other symptoms are you experiencing?",
        kind: InputKind::MultiChoice,
        options: &[
            "Chills or shivering",
            "Body aches",
            "Fatigue or weakness",
            "Sore throat",
            "Cough",
            "Runny or stuffy nose",
        ],
        required: true,
        risk_tag: None,
    },
];

/// Extension sequence for a normalized symptom. Unknown symptoms get none.
fn extension_for(normalized_symptom: &str) -> &'static [TriageQuestion] {
    match normalized_symptom {
        "chest pain" => CHEST_PAIN_QUESTIONS,
        "headache" => HEADACHE_QUESTIONS,
        "fever" => FEVER_QUESTIONS,
        _ => &[],
    }
}

/// Normalize reported symptom text for catalog lookup.
pub fn normalize_symptom(text: &str) -> String {
    text.trim().to_lowercase()
}

/// The ordered question sequence for a primary symptom: the base questions
/// followed by the symptom's extension set, if it has one. Deterministic for
/// the lifetime of a triage session.
pub fn questions_for(primary_symptom: &str) -> Vec<&'static TriageQuestion> {
    let normalized = normalize_symptom(primary_symptom);
    BASE_QUESTIONS
        .iter()
        .chain(extension_for(&normalized).iter())
        .collect()
}

/// Quick-pick complaints offered on the welcome screen.
pub static QUICK_SYMPTOMS: &[&str] = &[
    "I have a headache",
    "Feeling tired and weak",
    "Stomach pain or nausea",
    "Cough or cold symptoms",
    "Back or joint pain",
    "Stress or anxiety",
    "Sleep problems",
    "Skin rash or irritation",
];

// ── Answers ─────────────────────────────────────────────────

/// One recorded answer, shaped by the question kind it responds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnswerValue {
    Text { value: String },
    Scale { value: u8 },
    Choice { value: String },
    Selections { values: Vec<String> },
}

/// Mapping from question id to answer value. Grows as the user progresses;
/// revisiting a question via "previous" overwrites, never removes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerSet {
    answers: HashMap<String, AnswerValue>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question_id: impl Into<String>, value: AnswerValue) {
        self.answers.insert(question_id.into(), value);
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Scale value for a question, if one was recorded with the right shape.
    pub fn scale(&self, question_id: &str) -> Option<u8> {
        match self.answers.get(question_id) {
            Some(AnswerValue::Scale { value }) => Some(*value),
            _ => None,
        }
    }

    /// Single-choice value for a question, if one was recorded.
    pub fn choice(&self, question_id: &str) -> Option<&str> {
        match self.answers.get(question_id) {
            Some(AnswerValue::Choice { value }) => Some(value.as_str()),
            _ => None,
        }
    }

    /// All options selected across every multi-choice answer.
    pub fn all_selections(&self) -> impl Iterator<Item = &str> {
        self.answers.values().flat_map(|answer| match answer {
            AnswerValue::Selections { values } => values.as_slice(),
            _ => &[],
        })
        .map(String::as_str)
    }
}

/// Whether an answer satisfies a question's progression requirement.
///
/// Optional questions always pass. Required questions need a present answer
/// of the matching shape: non-empty trimmed text, non-empty choice, any
/// scale value, at least one selection for multi-choice.
pub fn answer_satisfies(question: &TriageQuestion, answer: Option<&AnswerValue>) -> bool {
    if !question.required {
        return true;
    }
    match (question.kind, answer) {
        (InputKind::FreeText, Some(AnswerValue::Text { value })) => !value.trim().is_empty(),
        (InputKind::Scale, Some(AnswerValue::Scale { .. })) => true,
        (InputKind::SingleChoice, Some(AnswerValue::Choice { value })) => !value.is_empty(),
        (InputKind::MultiChoice, Some(AnswerValue::Selections { values })) => !values.is_empty(),
        _ => false,
    }
}
