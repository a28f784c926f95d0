//! Symptom triage core: emergency guard, question catalog, risk scoring,
//! diagnostic generation, and care-option routing.
//!
//! Everything in here is pure and synchronous. The conversation state machine
//! (`crate::session`) is the only caller that ties these stages together.

pub mod catalog;
pub mod diagnostic;
pub mod guard;
pub mod router;
pub mod scorer;
