//! Boundary contracts for the collaborators around the triage core:
//! the remote dialogue backend, defensive reply parsing, personality
//! instructions, speech transduction, and end-of-session feedback.
//!
//! Everything here is a contract plus a reference client and a mock.
//! The collaborators themselves (the hosted chat function, the speech
//! services, the feedback endpoint) live outside this crate.

pub mod backend;
pub mod feedback;
pub mod parser;
pub mod personality;
pub mod speech;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Dialogue backend is not reachable at {0}")]
    BackendConnection(String),

    #[error("Dialogue backend returned error (status {status}): {body}")]
    BackendStatus { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}
