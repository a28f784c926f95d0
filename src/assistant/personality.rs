//! System instructions and seeded greetings for the assistant personas.
//!
//! The persona shapes tone only. Urgency rules are restated in every
//! instruction block so the backend cannot drift from the triage contract.

use crate::models::{DialogueStage, HealthProfile, Personality};

/// Build the system instructions sent with every dialogue exchange.
pub fn system_instructions(
    personality: Personality,
    profile: &HealthProfile,
    stage: DialogueStage,
    history: &str,
) -> String {
    format!(
        r#"You are Ask CareBow, a compassionate AI health assistant with the personality of a {persona}.

Your role is to:
1. Listen empathetically to health concerns
2. Ask relevant follow-up questions like a skilled triage nurse
3. Assess urgency levels (low/medium/high/emergency)
4. Provide appropriate guidance and next steps
5. Know when to recommend immediate medical care

User Profile: {profile}
Conversation Stage: {stage}
Conversation History: {history}

Guidelines:
- Be warm, empathetic, and professional
- Ask one focused question at a time
- For emergency symptoms (chest pain, difficulty breathing, severe injuries), immediately recommend calling 911
- For urgent symptoms, recommend urgent care or ER within 24 hours
- For moderate symptoms, suggest teleconsult or doctor visit
- For mild symptoms, provide self-care guidance and natural remedies
- Always explain your reasoning
- Include follow-up questions when appropriate

Respond in JSON format:
{{
  "response": "Your empathetic response",
  "urgencyLevel": "low|medium|high|emergency",
  "stage": "greeting|symptom_gathering|triage|recommendations",
  "suggestedActions": ["action1", "action2"],
  "followUpQuestions": ["question1", "question2"],
  "riskFactors": ["factor1", "factor2"],
  "nextSteps": "What should happen next"
}}"#,
        persona = personality.as_str().replace('_', " "),
        profile = profile.summary(),
        stage = stage.as_str(),
        history = history,
    )
}

/// Opening assistant message seeded into a new conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Greeting {
    pub text: String,
    pub follow_ups: Vec<String>,
}

/// Greeting for a fresh conversation, referencing the reported symptom
/// when one is present.
pub fn greeting(symptom: Option<&str>) -> Greeting {
    match symptom {
        Some(symptom) => Greeting {
            text: format!(
                "Hello! I understand you're experiencing {symptom}. I'm here to help \
                 you understand what might be going on and guide you to the right care. \
                 Let me ask you a few questions to better understand your situation."
            ),
            follow_ups: vec![
                "When did this start?".to_string(),
                "How severe is it on a scale of 1-10?".to_string(),
                "Have you tried anything for it?".to_string(),
            ],
        },
        None => Greeting {
            text: "Hello! I'm Ask CareBow, your AI health companion. I'm here to listen \
                   to your health concerns and help guide you to the right care. What's \
                   bringing you here today?"
                .to_string(),
            follow_ups: vec![
                "Tell me about your symptoms".to_string(),
                "How are you feeling today?".to_string(),
                "What health concerns do you have?".to_string(),
            ],
        },
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructions_name_the_persona() {
        let prompt = system_instructions(
            Personality::FamilyDoctor,
            &HealthProfile::default(),
            DialogueStage::Greeting,
            "",
        );
        assert!(prompt.contains("personality of a family doctor"));
    }

    #[test]
    fn instructions_embed_profile_stage_and_history() {
        let profile = HealthProfile {
            age: Some(34),
            ..HealthProfile::default()
        };
        let prompt = system_instructions(
            Personality::CaringNurse,
            &profile,
            DialogueStage::SymptomGathering,
            "user: my head hurts",
        );
        assert!(prompt.contains("User Profile: {\"age\":34"));
        assert!(prompt.contains("Conversation Stage: symptom_gathering"));
        assert!(prompt.contains("Conversation History: user: my head hurts"));
    }

    #[test]
    fn instructions_state_the_json_contract() {
        let prompt = system_instructions(
            Personality::AyurvedicPractitioner,
            &HealthProfile::default(),
            DialogueStage::Greeting,
            "",
        );
        assert!(prompt.contains("Respond in JSON format:"));
        assert!(prompt.contains("\"urgencyLevel\""));
        assert!(prompt.contains("low|medium|high|emergency"));
    }

    #[test]
    fn greeting_references_the_reported_symptom() {
        let greeting = greeting(Some("chest tightness"));
        assert!(greeting.text.contains("you're experiencing chest tightness"));
        assert_eq!(greeting.follow_ups.len(), 3);
        assert_eq!(greeting.follow_ups[0], "When did this start?");
    }

    #[test]
    fn greeting_without_symptom_asks_an_open_question() {
        let greeting = greeting(None);
        assert!(greeting.text.contains("What's bringing you here today?"));
        assert_eq!(greeting.follow_ups[0], "Tell me about your symptoms");
    }
}
