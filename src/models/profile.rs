use serde::{Deserialize, Serialize};

/// Optional health background attached to a session and shared with the
/// dialogue backend. Serialized with camelCase keys to match the wire format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthProfile {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub medical_history: Vec<String>,
    pub allergies: Vec<String>,
    pub medications: Vec<String>,
}

impl HealthProfile {
    /// Compact JSON rendering embedded in the backend system instructions.
    pub fn summary(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}
