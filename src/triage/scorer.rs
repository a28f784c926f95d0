//! Additive risk scoring over a triage answer set.
//!
//! The score depends only on the final answer values, never on the order
//! they were recorded in. Points accumulate from three independent rules
//! and a fixed threshold table maps the total to an urgency level.

use serde::Serialize;

use crate::models::RiskLevel;
use crate::triage::catalog::AnswerSet;

/// Multi-choice selections treated as cardiac red flags. Any one of them
/// anywhere in the answer set adds the emergency weight, once.
pub static EMERGENCY_ASSOCIATED_SYMPTOMS: &[&str] = &[
    "Shortness of breath",
    "Pain radiating to arm, jaw, or back",
];

/// Outcome of scoring one answer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub score: u32,
    pub level: RiskLevel,
}

/// Score a completed answer set into a numeric total and urgency level.
pub fn score(answers: &AnswerSet) -> RiskAssessment {
    let mut total: u32 = 0;

    if let Some(severity) = answers.scale("severity") {
        total += match severity {
            8.. => 3,
            6..=7 => 2,
            4..=5 => 1,
            _ => 0,
        };
    }

    match answers.choice("onset") {
        Some("Just now (within the last hour)") => total += 2,
        Some("Today (within the last 24 hours)") => total += 1,
        _ => {}
    }

    let has_red_flag = answers
        .all_selections()
        .any(|selection| EMERGENCY_ASSOCIATED_SYMPTOMS.contains(&selection));
    if has_red_flag {
        total += 5;
    }

    let level = match total {
        5.. => RiskLevel::Emergency,
        3..=4 => RiskLevel::High,
        2 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    };

    RiskAssessment { score: total, level }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::catalog::AnswerValue;

    fn scale(value: u8) -> AnswerValue {
        AnswerValue::Scale { value }
    }

    fn choice(value: &str) -> AnswerValue {
        AnswerValue::Choice { value: value.into() }
    }

    fn selections(values: &[&str]) -> AnswerValue {
        AnswerValue::Selections {
            values: values.iter().map(|s| s.to_string()).collect(),
        }
    }

    // ── Severity points ──

    #[test]
    fn severity_thresholds_are_inclusive() {
        for (value, expected) in [(10, 3), (8, 3), (7, 2), (6, 2), (5, 1), (4, 1), (3, 0), (1, 0)] {
            let mut answers = AnswerSet::new();
            answers.insert("severity", scale(value));
            assert_eq!(score(&answers).score, expected, "severity {value}");
        }
    }

    // ── Onset points ──

    #[test]
    fn recent_onset_adds_points() {
        let mut answers = AnswerSet::new();
        answers.insert("onset", choice("Just now (within the last hour)"));
        assert_eq!(score(&answers).score, 2);

        let mut answers = AnswerSet::new();
        answers.insert("onset", choice("Today (within the last 24 hours)"));
        assert_eq!(score(&answers).score, 1);
    }

    #[test]
    fn older_onset_adds_nothing() {
        for onset in [
            "Yesterday (1-2 days ago)",
            "This week (3-7 days ago)",
            "More than a week ago",
        ] {
            let mut answers = AnswerSet::new();
            answers.insert("onset", choice(onset));
            assert_eq!(score(&answers).score, 0, "onset {onset:?}");
        }
    }

    // ── Red-flag selections ──

    #[test]
    fn red_flag_selection_adds_five_once() {
        let mut answers = AnswerSet::new();
        answers.insert(
            "chest_associated",
            selections(&["Shortness of breath", "Pain radiating to arm, jaw, or back"]),
        );
        // Both red flags present, still a single +5.
        assert_eq!(score(&answers).score, 5);
        assert_eq!(score(&answers).level, RiskLevel::Emergency);
    }

    #[test]
    fn red_flag_counts_from_any_multi_choice_answer() {
        let mut answers = AnswerSet::new();
        answers.insert("fever_symptoms", selections(&["Shortness of breath"]));
        assert_eq!(score(&answers).score, 5);
    }

    #[test]
    fn red_flag_text_in_single_choice_does_not_count() {
        // Only multi-choice selections carry the red-flag weight.
        let mut answers = AnswerSet::new();
        answers.insert("chest_location", choice("Shortness of breath"));
        assert_eq!(score(&answers).score, 0);
    }

    #[test]
    fn benign_selections_add_nothing() {
        let mut answers = AnswerSet::new();
        answers.insert("chest_associated", selections(&["Sweating", "Nausea or vomiting"]));
        assert_eq!(score(&answers).score, 0);
    }

    // ── Thresholds ──

    #[test]
    fn score_thresholds_map_to_levels() {
        // score 0..=1 → low, 2 → medium, 3..=4 → high, 5.. → emergency
        let cases: &[(u8, &str, u32, RiskLevel)] = &[
            (1, "More than a week ago", 0, RiskLevel::Low),
            (4, "More than a week ago", 1, RiskLevel::Low),
            (4, "Today (within the last 24 hours)", 2, RiskLevel::Medium),
            (8, "More than a week ago", 3, RiskLevel::High),
            (8, "Today (within the last 24 hours)", 4, RiskLevel::High),
            (8, "Just now (within the last hour)", 5, RiskLevel::Emergency),
        ];
        for (severity, onset, expected_score, expected_level) in cases {
            let mut answers = AnswerSet::new();
            answers.insert("severity", scale(*severity));
            answers.insert("onset", choice(onset));
            let assessment = score(&answers);
            assert_eq!(assessment.score, *expected_score, "severity {severity}, onset {onset:?}");
            assert_eq!(assessment.level, *expected_level);
        }
    }

    // ── Order independence ──

    #[test]
    fn score_is_order_independent() {
        let mut forward = AnswerSet::new();
        forward.insert("onset", choice("Just now (within the last hour)"));
        forward.insert("severity", scale(9));
        forward.insert("chest_location", choice("Center of chest"));
        forward.insert("chest_associated", selections(&["Pain radiating to arm, jaw, or back"]));

        let mut reverse = AnswerSet::new();
        reverse.insert("chest_associated", selections(&["Pain radiating to arm, jaw, or back"]));
        reverse.insert("chest_location", choice("Center of chest"));
        reverse.insert("severity", scale(9));
        reverse.insert("onset", choice("Just now (within the last hour)"));

        assert_eq!(score(&forward), score(&reverse));
    }

    // ── Worked scenario ──

    #[test]
    fn chest_pain_worst_case_scores_ten() {
        let mut answers = AnswerSet::new();
        answers.insert("onset", choice("Just now (within the last hour)"));
        answers.insert("severity", scale(9));
        answers.insert("pattern", choice("Getting worse over time"));
        answers.insert("chest_location", choice("Center of chest"));
        answers.insert("chest_associated", selections(&["Pain radiating to arm, jaw, or back"]));

        let assessment = score(&answers);
        assert_eq!(assessment.score, 10);
        assert_eq!(assessment.level, RiskLevel::Emergency);
    }

    #[test]
    fn mild_headache_scores_low() {
        let mut answers = AnswerSet::new();
        answers.insert("onset", choice("More than a week ago"));
        answers.insert("severity", scale(2));
        answers.insert("pattern", choice("Comes and goes (intermittent)"));

        let assessment = score(&answers);
        assert!(assessment.score <= 1);
        assert_eq!(assessment.level, RiskLevel::Low);
    }

    #[test]
    fn empty_answer_set_scores_zero() {
        let assessment = score(&AnswerSet::new());
        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.level, RiskLevel::Low);
    }
}
