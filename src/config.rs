/// Application-level constants
pub const APP_NAME: &str = "Ask CareBow";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number dialed by the emergency care option. No confirmation step sits
/// between activating that option and this number.
pub const EMERGENCY_NUMBER: &str = "911";

/// Standing disclaimer rendered alongside every session view.
pub const MEDICAL_DISCLAIMER: &str = "Ask CareBow provides general health information and should not replace professional medical advice, diagnosis, or treatment. Always consult qualified healthcare providers for medical concerns. In emergencies, call 911 immediately.";

/// Base URL for the remote dialogue backend (Supabase edge functions).
pub const DEFAULT_BACKEND_BASE: &str = "http://localhost:54321/functions/v1";

/// Request timeout for dialogue backend calls.
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;

/// Default log filter when RUST_LOG is not set
pub fn default_log_filter() -> &'static str {
    "carebow_triage=info"
}
