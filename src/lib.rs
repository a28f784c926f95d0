pub mod assistant; // Boundary contracts: dialogue backend, parsing, speech, feedback
pub mod config;
pub mod engine; // Async embedding surface
pub mod models;
pub mod session; // Conversation aggregate, reducer, registry
pub mod triage; // Guard, catalog, scorer, diagnostic, router

use tracing_subscriber::EnvFilter;

pub use engine::TriageEngine;
pub use session::{ConversationSession, SessionEffect, SessionEvent};

/// Install the global tracing subscriber. `RUST_LOG` wins when set.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} engine v{}", config::APP_NAME, config::APP_VERSION);
}
