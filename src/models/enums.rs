use crate::models::ModelError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde uses the same strings, so serialized values match `as_str`.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $s)]
                $variant
            ),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(RiskLevel {
    Low => "low",
    Medium => "medium",
    High => "high",
    Emergency => "emergency",
});

str_enum!(DiagnosisUrgency {
    Low => "low",
    Moderate => "moderate",
    Urgent => "urgent",
    Emergency => "emergency",
});

str_enum!(NextStepAction {
    SelfCare => "self_care",
    Teleconsult => "teleconsult",
    UrgentCare => "urgent_care",
    Emergency => "emergency",
});

str_enum!(CareCategory {
    Emergency => "emergency",
    UrgentCare => "urgent_care",
    Teleconsult => "teleconsult",
    HomeVisit => "home_visit",
    AyurvedicConsult => "ayurvedic_consult",
});

str_enum!(MessageRole {
    User => "user",
    Assistant => "assistant",
    System => "system",
});

str_enum!(ReportSource {
    Typed => "text",
    Spoken => "voice",
    QuickPick => "quick_select",
});

str_enum!(Personality {
    CaringNurse => "caring_nurse",
    FamilyDoctor => "family_doctor",
    AyurvedicPractitioner => "ayurvedic_practitioner",
    EmergencyTriage => "emergency_triage",
});

str_enum!(DialogueStage {
    Greeting => "greeting",
    SymptomGathering => "symptom_gathering",
    Triage => "triage",
    Recommendations => "recommendations",
});

str_enum!(FeedbackRating {
    Positive => "positive",
    Negative => "negative",
});

str_enum!(SessionStage {
    Welcome => "welcome",
    Conversation => "conversation",
    Triage => "triage",
    Diagnosis => "diagnosis",
    Recommendations => "recommendations",
    CareConnection => "care_connection",
});

impl RiskLevel {
    /// Position in the severity order: low < medium < high < emergency.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Emergency => 3,
        }
    }
}

impl PartialOrd for RiskLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RiskLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl DiagnosisUrgency {
    /// Position in the severity order: low < moderate < urgent < emergency.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Moderate => 1,
            Self::Urgent => 2,
            Self::Emergency => 3,
        }
    }
}

impl PartialOrd for DiagnosisUrgency {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DiagnosisUrgency {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

/// The diagnostic classifier and the conversational risk track use different
/// level vocabularies; this maps the former onto the latter for care routing.
impl From<DiagnosisUrgency> for RiskLevel {
    fn from(urgency: DiagnosisUrgency) -> Self {
        match urgency {
            DiagnosisUrgency::Low => RiskLevel::Low,
            DiagnosisUrgency::Moderate => RiskLevel::Medium,
            DiagnosisUrgency::Urgent => RiskLevel::High,
            DiagnosisUrgency::Emergency => RiskLevel::Emergency,
        }
    }
}
