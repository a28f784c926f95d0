//! Conversation session: the mutable root aggregate of one triage run.
//!
//! A session owns the stage, the ordered message log, the question cursor,
//! the answer set, and the latest results. Nothing outside the reducer in
//! [`machine`] mutates it mid-flight; the explicit lifecycle is create,
//! advance (one event at a time), reset.

pub mod machine;
pub mod registry;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    ConversationMessage, DialogueStage, HealthProfile, Personality, RiskLevel, SessionStage,
    SymptomReport,
};
use crate::triage::catalog::{AnswerSet, TriageQuestion};
use crate::triage::diagnostic::DiagnosticResult;
use crate::triage::router::{self, CareOption};
use crate::triage::scorer::RiskAssessment;

pub use machine::{transition, SessionEffect, SessionEvent};
pub use registry::{ExchangeTicket, RegistryError, SessionRegistry};

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Question '{question_id}' requires an answer before continuing")]
    AnswerRequired { question_id: &'static str },

    #[error("Event '{event}' is not valid in stage '{name}'", name = .stage.as_str())]
    UnexpectedEvent {
        stage: SessionStage,
        event: &'static str,
    },

    #[error("Triage requires a reported symptom")]
    MissingReport,

    #[error("Feedback was already submitted for this session")]
    FeedbackAlreadySubmitted,
}

// ═══════════════════════════════════════════════════════════
// ConversationSession
// ═══════════════════════════════════════════════════════════

/// One user's triage conversation, held in memory for the life of the visit.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSession {
    id: Uuid,
    pub(crate) stage: SessionStage,
    personality: Personality,
    profile: HealthProfile,
    pub(crate) report: Option<SymptomReport>,
    pub(crate) messages: Vec<ConversationMessage>,
    /// Stage the dialogue backend reported with its latest reply.
    pub(crate) dialogue_stage: DialogueStage,
    #[serde(skip)]
    pub(crate) questions: Vec<&'static TriageQuestion>,
    pub(crate) cursor: usize,
    pub(crate) answers: AnswerSet,
    pub(crate) assessment: Option<RiskAssessment>,
    pub(crate) diagnosis: Option<DiagnosticResult>,
    /// Urgency the care-connection screen routes by, once known.
    pub(crate) care_level: Option<RiskLevel>,
    pub(crate) feedback_prompted: bool,
    pub(crate) feedback_submitted: bool,
    started_at: DateTime<Utc>,
}

impl ConversationSession {
    pub fn new(personality: Personality, profile: HealthProfile) -> Self {
        Self {
            id: Uuid::new_v4(),
            stage: SessionStage::Welcome,
            personality,
            profile,
            report: None,
            messages: Vec::new(),
            dialogue_stage: DialogueStage::Greeting,
            questions: Vec::new(),
            cursor: 0,
            answers: AnswerSet::new(),
            assessment: None,
            diagnosis: None,
            care_level: None,
            feedback_prompted: false,
            feedback_submitted: false,
            started_at: Utc::now(),
        }
    }

    /// Wipe the session back to a fresh welcome state, keeping its identity.
    /// A reset is a new assessment, not a transition: everything gathered so
    /// far is discarded.
    pub fn reset(&mut self) {
        let personality = self.personality;
        let profile = self.profile.clone();
        let id = self.id;
        *self = Self::new(personality, profile);
        self.id = id;
    }

    // ── Accessors ────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stage(&self) -> SessionStage {
        self.stage
    }

    pub fn personality(&self) -> Personality {
        self.personality
    }

    pub fn profile(&self) -> &HealthProfile {
        &self.profile
    }

    pub fn report(&self) -> Option<&SymptomReport> {
        self.report.as_ref()
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn dialogue_stage(&self) -> DialogueStage {
        self.dialogue_stage
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn assessment(&self) -> Option<&RiskAssessment> {
        self.assessment.as_ref()
    }

    pub fn diagnosis(&self) -> Option<&DiagnosticResult> {
        self.diagnosis.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The triage question currently on screen, if triage is active.
    pub fn current_question(&self) -> Option<&'static TriageQuestion> {
        if self.stage != SessionStage::Triage {
            return None;
        }
        self.questions.get(self.cursor).copied()
    }

    /// One-based progress through the question set, for display.
    pub fn question_progress(&self) -> (usize, usize) {
        (self.cursor + 1, self.questions.len())
    }

    /// Care options visible right now, filtered by the session's urgency.
    /// Before any classification the full catalog is shown.
    pub fn care_options(&self) -> Vec<&'static CareOption> {
        router::options_for(self.care_level.unwrap_or(RiskLevel::Low))
    }

    /// Care options as the diagnostic card would route them, derived from
    /// the card's urgency rather than the risk score. The two classifiers
    /// can disagree; callers presenting the card use this view.
    pub fn diagnosis_care_options(&self) -> Option<Vec<&'static CareOption>> {
        self.diagnosis
            .as_ref()
            .map(|d| router::options_for(d.urgency.into()))
    }

    /// Conversation history serialized for the dialogue backend.
    pub fn history_text(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role.as_str(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
