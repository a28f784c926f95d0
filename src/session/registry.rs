//! Live-session registry.
//!
//! Sessions are ephemeral and memory-only: one slot per user interaction
//! context, held behind a `RwLock`. Each slot carries a generation counter
//! and a pending-exchange flag. The generation tags in-flight backend calls
//! so a response that arrives after a reset is discarded instead of being
//! applied to the new assessment; the flag rejects a second concurrent
//! submission for the same session without queueing it.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use super::machine::{transition, SessionEffect, SessionEvent};
use super::{ConversationSession, SessionError};
use crate::models::{HealthProfile, Personality};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

struct SessionSlot {
    session: ConversationSession,
    generation: u64,
    exchange_pending: bool,
}

/// Tag for one in-flight backend exchange. Checked on completion: a ticket
/// whose generation no longer matches its slot is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeTicket {
    pub session_id: Uuid,
    pub generation: u64,
}

/// Errors from registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Session {0} not found")]
    SessionNotFound(Uuid),

    #[error("Session {0} already has an exchange in flight")]
    ExchangeInFlight(Uuid),

    #[error("Internal lock error")]
    LockPoisoned,

    #[error(transparent)]
    Session(#[from] SessionError),
}

// ═══════════════════════════════════════════════════════════
// SessionRegistry
// ═══════════════════════════════════════════════════════════

/// All live sessions. Independent sessions run concurrently; within one
/// session, events apply strictly one at a time under the write lock.
pub struct SessionRegistry {
    slots: RwLock<HashMap<Uuid, SessionSlot>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Create a fresh session and return its id.
    pub fn create(&self, personality: Personality, profile: HealthProfile) -> Uuid {
        let session = ConversationSession::new(personality, profile);
        let id = session.id();
        if let Ok(mut slots) = self.slots.write() {
            slots.insert(
                id,
                SessionSlot {
                    session,
                    generation: 0,
                    exchange_pending: false,
                },
            );
        }
        tracing::debug!(session_id = %id, "Session created");
        id
    }

    /// Apply one event to a session through the reducer.
    pub fn apply(
        &self,
        session_id: Uuid,
        event: SessionEvent,
    ) -> Result<Vec<SessionEffect>, RegistryError> {
        let mut slots = self.slots.write().map_err(|_| RegistryError::LockPoisoned)?;
        let slot = slots
            .get_mut(&session_id)
            .ok_or(RegistryError::SessionNotFound(session_id))?;
        let effects = transition(&mut slot.session, event)?;
        Ok(effects)
    }

    /// Read from a session without mutating it.
    pub fn with_session<R>(
        &self,
        session_id: Uuid,
        reader: impl FnOnce(&ConversationSession) -> R,
    ) -> Result<R, RegistryError> {
        let slots = self.slots.read().map_err(|_| RegistryError::LockPoisoned)?;
        let slot = slots
            .get(&session_id)
            .ok_or(RegistryError::SessionNotFound(session_id))?;
        Ok(reader(&slot.session))
    }

    // ── Exchange exclusion ───────────────────────────────

    /// Whether a backend exchange is currently in flight for this session.
    pub fn exchange_pending(&self, session_id: Uuid) -> Result<bool, RegistryError> {
        let slots = self.slots.read().map_err(|_| RegistryError::LockPoisoned)?;
        let slot = slots
            .get(&session_id)
            .ok_or(RegistryError::SessionNotFound(session_id))?;
        Ok(slot.exchange_pending)
    }

    /// Mark an exchange as in flight and tag it with the slot's generation.
    /// A second submission while one is pending is rejected, never queued.
    pub fn begin_exchange(&self, session_id: Uuid) -> Result<ExchangeTicket, RegistryError> {
        let mut slots = self.slots.write().map_err(|_| RegistryError::LockPoisoned)?;
        let slot = slots
            .get_mut(&session_id)
            .ok_or(RegistryError::SessionNotFound(session_id))?;
        if slot.exchange_pending {
            return Err(RegistryError::ExchangeInFlight(session_id));
        }
        slot.exchange_pending = true;
        Ok(ExchangeTicket {
            session_id,
            generation: slot.generation,
        })
    }

    /// Close out an exchange. Returns true if the result should be applied;
    /// false if it is stale (the session was reset or removed meanwhile).
    pub fn finish_exchange(&self, ticket: ExchangeTicket) -> Result<bool, RegistryError> {
        let mut slots = self.slots.write().map_err(|_| RegistryError::LockPoisoned)?;
        let Some(slot) = slots.get_mut(&ticket.session_id) else {
            tracing::warn!(session_id = %ticket.session_id, "Exchange finished for removed session");
            return Ok(false);
        };
        if slot.generation != ticket.generation {
            tracing::warn!(
                session_id = %ticket.session_id,
                ticket_generation = ticket.generation,
                slot_generation = slot.generation,
                "Discarding stale exchange result"
            );
            return Ok(false);
        }
        slot.exchange_pending = false;
        Ok(true)
    }

    // ── Lifecycle ────────────────────────────────────────

    /// Start a new assessment in place: fresh session state under the same
    /// id, generation bumped so any in-flight exchange result is discarded
    /// on arrival.
    pub fn reset(&self, session_id: Uuid) -> Result<(), RegistryError> {
        let mut slots = self.slots.write().map_err(|_| RegistryError::LockPoisoned)?;
        let slot = slots
            .get_mut(&session_id)
            .ok_or(RegistryError::SessionNotFound(session_id))?;
        slot.session.reset();
        slot.generation += 1;
        slot.exchange_pending = false;
        tracing::debug!(session_id = %session_id, generation = slot.generation, "Session reset");
        Ok(())
    }

    /// Drop a session entirely (the user's visit ended).
    pub fn remove(&self, session_id: Uuid) {
        if let Ok(mut slots) = self.slots.write() {
            slots.remove(&session_id);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.read().map(|slots| slots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
