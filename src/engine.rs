//! Async embedding surface for the triage engine.
//!
//! `TriageEngine` owns the session registry and the boundary collaborators
//! (dialogue backend, speech transducer, feedback sink) and carries out the
//! effects the state machine emits. The blocking HTTP client runs on
//! `spawn_blocking`; per-session exclusion and stale-result discard come
//! from the registry's exchange tickets.

use std::sync::Arc;

use uuid::Uuid;

use crate::assistant::backend::{DialogueBackend, ExchangeRequest, HttpDialogueBackend};
use crate::assistant::feedback::{FeedbackSink, MemoryFeedbackSink};
use crate::assistant::parser::{self, AssistantReply};
use crate::assistant::personality;
use crate::assistant::speech::{NullSpeech, SpeechAudio, SpeechError, SpeechTransducer};
use crate::models::{CareCategory, FeedbackRating, HealthProfile, Personality, ReportSource, SessionStage};
use crate::session::{
    ConversationSession, ExchangeTicket, RegistryError, SessionEffect, SessionEvent,
    SessionRegistry,
};
use crate::triage::router::ActivationIntent;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Speech error: {0}")]
    Speech(#[from] SpeechError),

    #[error("Background task failed: {0}")]
    TaskJoin(String),
}

/// What one processed user input produced.
#[derive(Debug)]
pub struct ExchangeOutcome {
    /// Effects the transition emitted (escalation, feedback prompt, ...).
    pub effects: Vec<SessionEffect>,
    /// The assistant's reply, when an exchange ran and its result was still
    /// current. `None` when the session escalated without an exchange, the
    /// backend failed (a recovery message is in the log), or the result
    /// arrived stale and was discarded.
    pub reply: Option<AssistantReply>,
}

// ═══════════════════════════════════════════════════════════
// TriageEngine
// ═══════════════════════════════════════════════════════════

pub struct TriageEngine {
    registry: SessionRegistry,
    backend: Arc<dyn DialogueBackend>,
    speech: Arc<dyn SpeechTransducer>,
    feedback: Arc<dyn FeedbackSink>,
}

impl TriageEngine {
    pub fn new(
        backend: Arc<dyn DialogueBackend>,
        speech: Arc<dyn SpeechTransducer>,
        feedback: Arc<dyn FeedbackSink>,
    ) -> Self {
        Self {
            registry: SessionRegistry::new(),
            backend,
            speech,
            feedback,
        }
    }

    /// Engine wired for a local function host, text-only, feedback kept in
    /// memory.
    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(HttpDialogueBackend::default_local()),
            Arc::new(NullSpeech),
            Arc::new(MemoryFeedbackSink::new()),
        )
    }

    // ── Session lifecycle ────────────────────────────────

    pub fn create_session(&self, personality: Personality, profile: HealthProfile) -> Uuid {
        self.registry.create(personality, profile)
    }

    /// Start a new assessment for this session. Any in-flight exchange
    /// becomes stale and its result is discarded on arrival.
    pub fn reset(&self, session_id: Uuid) -> Result<(), EngineError> {
        self.registry.reset(session_id)?;
        self.speech.cancel(session_id);
        Ok(())
    }

    pub fn end_session(&self, session_id: Uuid) {
        self.speech.cancel(session_id);
        self.registry.remove(session_id);
    }

    /// Read from a session's current state.
    pub fn with_session<R>(
        &self,
        session_id: Uuid,
        reader: impl FnOnce(&ConversationSession) -> R,
    ) -> Result<R, EngineError> {
        Ok(self.registry.with_session(session_id, reader)?)
    }

    // ── Conversation ─────────────────────────────────────

    /// Process one typed or quick-picked user input to completion.
    ///
    /// Rejected with `ExchangeInFlight` while a previous exchange for the
    /// same session is still pending; independent sessions are unaffected.
    pub async fn submit_message(
        &self,
        session_id: Uuid,
        text: &str,
        source: ReportSource,
    ) -> Result<ExchangeOutcome, EngineError> {
        if self.registry.exchange_pending(session_id)? {
            return Err(RegistryError::ExchangeInFlight(session_id).into());
        }

        let event = match self.registry.with_session(session_id, |s| s.stage())? {
            SessionStage::Welcome => SessionEvent::ReportSymptom {
                text: text.to_string(),
                source,
            },
            _ => SessionEvent::UserMessage {
                text: text.to_string(),
                source,
            },
        };

        let mut effects = self.registry.apply(session_id, event)?;
        let wants_exchange = effects
            .iter()
            .find_map(|effect| match effect {
                SessionEffect::RequestExchange { message } => Some(message.clone()),
                _ => None,
            });

        let Some(message) = wants_exchange else {
            // The guard escalated; no backend round trip happens.
            return Ok(ExchangeOutcome {
                effects,
                reply: None,
            });
        };

        let ticket = self.registry.begin_exchange(session_id)?;
        let reply = self.run_exchange(session_id, ticket, message).await?;

        if let Some(reply) = &reply {
            let more = self.registry.apply(
                session_id,
                SessionEvent::AssistantReplied {
                    reply: reply.clone(),
                },
            )?;
            effects.extend(more);
        }

        Ok(ExchangeOutcome { effects, reply })
    }

    /// Transcribe spoken audio and process it as a user input. A speech
    /// failure surfaces as a typed error so the host can fall back to
    /// text-only; the session itself is untouched.
    ///
    /// Transcription suspends like a backend call, so it takes the same
    /// exchange ticket: a second submission while it runs is rejected, and
    /// a transcript that lands after a reset is discarded, never applied to
    /// the new assessment.
    pub async fn submit_voice(
        &self,
        session_id: Uuid,
        audio: Vec<u8>,
    ) -> Result<ExchangeOutcome, EngineError> {
        let ticket = self.registry.begin_exchange(session_id)?;

        let speech = Arc::clone(&self.speech);
        let result = tokio::task::spawn_blocking(move || speech.transcribe(session_id, &audio))
            .await
            .map_err(|e| EngineError::TaskJoin(e.to_string()))?;

        if !self.registry.finish_exchange(ticket)? {
            tracing::warn!(session_id = %session_id, "Discarding stale voice transcript");
            return Ok(ExchangeOutcome {
                effects: Vec::new(),
                reply: None,
            });
        }
        let text = result?;

        self.submit_message(session_id, &text, ReportSource::Spoken)
            .await
    }

    /// Synthesize a reply for voice playback. Best-effort: failure degrades
    /// to text-only and is logged, never propagated.
    pub async fn speak(&self, session_id: Uuid, text: &str) -> Option<SpeechAudio> {
        let speech = Arc::clone(&self.speech);
        let text = text.to_string();
        let result = tokio::task::spawn_blocking(move || speech.synthesize(session_id, &text))
            .await
            .ok()?;
        match result {
            Ok(audio) => Some(audio),
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Speech synthesis failed, continuing text-only");
                None
            }
        }
    }

    // ── Triage flow ──────────────────────────────────────

    pub fn begin_triage(&self, session_id: Uuid) -> Result<Vec<SessionEffect>, EngineError> {
        Ok(self.registry.apply(session_id, SessionEvent::BeginTriage)?)
    }

    pub fn answer(
        &self,
        session_id: Uuid,
        value: crate::triage::catalog::AnswerValue,
    ) -> Result<Vec<SessionEffect>, EngineError> {
        Ok(self
            .registry
            .apply(session_id, SessionEvent::Answer { value })?)
    }

    pub fn next(&self, session_id: Uuid) -> Result<Vec<SessionEffect>, EngineError> {
        Ok(self.registry.apply(session_id, SessionEvent::Next)?)
    }

    pub fn previous(&self, session_id: Uuid) -> Result<Vec<SessionEffect>, EngineError> {
        Ok(self.registry.apply(session_id, SessionEvent::Previous)?)
    }

    // ── Care connection ──────────────────────────────────

    /// Activate a care option. The emergency option resolves to a direct
    /// dial intent with no confirmation step.
    pub fn activate_care(
        &self,
        session_id: Uuid,
        category: CareCategory,
    ) -> Result<ActivationIntent, EngineError> {
        let effects = self
            .registry
            .apply(session_id, SessionEvent::ActivateCare { category })?;
        let intent = effects
            .into_iter()
            .find_map(|effect| match effect {
                SessionEffect::Dial { number } => Some(ActivationIntent::Dial { number }),
                SessionEffect::Schedule { category } => {
                    Some(ActivationIntent::Schedule { category })
                }
                _ => None,
            })
            .unwrap_or(ActivationIntent::Schedule { category });
        Ok(intent)
    }

    // ── Feedback ─────────────────────────────────────────

    /// Submit the once-per-session satisfaction rating. Sink failures are
    /// logged and swallowed: the result already shown is never rolled back.
    pub async fn submit_feedback(
        &self,
        session_id: Uuid,
        rating: FeedbackRating,
        comment: Option<String>,
    ) -> Result<(), EngineError> {
        let effects = self
            .registry
            .apply(session_id, SessionEvent::SubmitFeedback { rating, comment })?;

        for effect in effects {
            if let SessionEffect::SubmitFeedback { feedback } = effect {
                let sink = Arc::clone(&self.feedback);
                let submitted =
                    tokio::task::spawn_blocking(move || sink.submit(&feedback))
                        .await
                        .map_err(|e| EngineError::TaskJoin(e.to_string()))?;
                if let Err(e) = submitted {
                    tracing::warn!(session_id = %session_id, error = %e, "Feedback submission failed");
                }
            }
        }
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────

    /// Run one backend exchange on a blocking thread and apply the result
    /// only if it is still current.
    async fn run_exchange(
        &self,
        session_id: Uuid,
        ticket: ExchangeTicket,
        message: String,
    ) -> Result<Option<AssistantReply>, EngineError> {
        let request = self.registry.with_session(session_id, |session| {
            ExchangeRequest {
                message,
                system_prompt: personality::system_instructions(
                    session.personality(),
                    session.profile(),
                    session.dialogue_stage(),
                    &session.history_text(),
                ),
                conversation_history: session.history_text(),
                user_profile: session.profile().clone(),
                personality: session.personality(),
            }
        })?;

        let backend = Arc::clone(&self.backend);
        let result = tokio::task::spawn_blocking(move || backend.exchange(&request))
            .await
            .map_err(|e| EngineError::TaskJoin(e.to_string()))?;

        if !self.registry.finish_exchange(ticket)? {
            // The session was reset or removed while the call was in
            // flight. The response belongs to a conversation that no
            // longer exists.
            return Ok(None);
        }

        match result {
            Ok(payload) => Ok(Some(parser::parse_reply(&payload))),
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Dialogue backend failed, recovering");
                self.registry.apply(session_id, SessionEvent::BackendFailed)?;
                Ok(None)
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
