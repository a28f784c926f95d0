//! Care option catalog and urgency-based filtering.

use serde::Serialize;

use crate::config;
use crate::models::{CareCategory, RiskLevel};

/// What activating a care option asks the host application to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ActivationIntent {
    /// Place a direct emergency call, with no confirmation step in between.
    Dial { number: &'static str },
    /// Open scheduling for the given care category.
    Schedule { category: CareCategory },
}

/// A fixed catalog entry. Only visibility varies with urgency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CareOption {
    pub category: CareCategory,
    pub title: &'static str,
    pub description: &'static str,
    pub timeframe: &'static str,
}

impl CareOption {
    pub fn activation(&self) -> ActivationIntent {
        match self.category {
            CareCategory::Emergency => ActivationIntent::Dial {
                number: config::EMERGENCY_NUMBER,
            },
            category => ActivationIntent::Schedule { category },
        }
    }
}

/// The full care catalog, in display order.
pub static CARE_CATALOG: &[CareOption] = &[
    CareOption {
        category: CareCategory::Emergency,
        title: "Emergency Services",
        description: "Call 911 for immediate medical attention",
        timeframe: "Immediate",
    },
    CareOption {
        category: CareCategory::UrgentCare,
        title: "Urgent Care Center",
        description: "Visit nearby urgent care for same-day treatment",
        timeframe: "Within 24 hours",
    },
    CareOption {
        category: CareCategory::Teleconsult,
        title: "CareBow Teleconsult",
        description: "Video call with licensed healthcare provider",
        timeframe: "Within 2 hours",
    },
    CareOption {
        category: CareCategory::HomeVisit,
        title: "Home Health Visit",
        description: "Licensed nurse or healthcare provider visits your home",
        timeframe: "Same day",
    },
    CareOption {
        category: CareCategory::AyurvedicConsult,
        title: "Ayurvedic Consultation",
        description: "Natural healing consultation with certified practitioner",
        timeframe: "Within 24 hours",
    },
];

/// Care options visible at an urgency level, in catalog order.
///
/// Emergency narrows to the single emergency option; high keeps the three
/// fastest routes; everything else sees the full catalog. Never reorders
/// within a tier.
pub fn options_for(level: RiskLevel) -> Vec<&'static CareOption> {
    let visible: &[CareCategory] = match level {
        RiskLevel::Emergency => &[CareCategory::Emergency],
        RiskLevel::High => &[
            CareCategory::Emergency,
            CareCategory::UrgentCare,
            CareCategory::Teleconsult,
        ],
        _ => return CARE_CATALOG.iter().collect(),
    };

    CARE_CATALOG
        .iter()
        .filter(|option| visible.contains(&option.category))
        .collect()
}

/// Look up a catalog entry by category. Total: every category has one.
pub fn option_for(category: CareCategory) -> &'static CareOption {
    let index = match category {
        CareCategory::Emergency => 0,
        CareCategory::UrgentCare => 1,
        CareCategory::Teleconsult => 2,
        CareCategory::HomeVisit => 3,
        CareCategory::AyurvedicConsult => 4,
    };
    &CARE_CATALOG[index]
}
