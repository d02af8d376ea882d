//! Nutritionist formatter for legacy and v2 recipe documents.
//!
//! v2 documents pass through with fresh dialogue, legacy recipes are upgraded
//! to v2, and anything else is wrapped as raw text.

pub mod schema;
pub mod tone;
pub mod upgrade;

pub use schema::{LegacyRecipe, NutritionistResponseV2, ResponseShape};
pub use tone::{DialogueToneConfig, DialogueToneUpdate, Personality};

use crate::{confidence, FormatMetadata, ResponseFormatter};
use schema::ConfidenceLevel;
use serde::{Serialize, Serializer};
use std::time::Instant;
use tracing::{debug, warn};

/// Confidence for a v2 document that rates itself low.
const LOW_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    V1,
    V2,
}

impl SchemaVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "1.0",
            SchemaVersion::V2 => "2.0",
        }
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy: Option<LegacyRecipe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced: Option<Box<NutritionistResponseV2>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

/// Short messages shown alongside a parsed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueMessages {
    pub success_message: String,
    pub display_text: String,
    pub toast_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResponse {
    pub version: SchemaVersion,
    pub success: bool,
    pub data: ParsedData,
    pub dialogue: DialogueMessages,
    pub metadata: FormatMetadata,
}

#[derive(Debug, Clone, Default)]
pub struct NutritionistResponseFormatter {
    tone: DialogueToneConfig,
}

impl NutritionistResponseFormatter {
    pub fn new(tone: DialogueToneConfig) -> Self {
        Self { tone }
    }

    /// Parses any upstream answer. `processing_time_ms` is the upstream
    /// round-trip, used in the success message when non-zero.
    pub fn parse_response(&self, raw: &str, processing_time_ms: f64) -> ParsedResponse {
        let started = Instant::now();

        let shape = match ResponseShape::parse(raw) {
            Ok(shape) => shape,
            Err(e) => {
                debug!(error = %e, "Response is not JSON, treating as text");
                return self.text_response(raw, started);
            }
        };

        match shape {
            ResponseShape::Enhanced(enhanced) => self.enhanced_response(enhanced, started),
            ResponseShape::Legacy(legacy) => {
                match upgrade::upgrade_legacy(&legacy, processing_time_ms, &self.tone) {
                    Ok(enhanced) => self.upgraded_response(legacy, enhanced, started),
                    Err(e) => {
                        warn!(error = %e, "Legacy recipe upgrade failed, using text fallback");
                        self.text_response(raw, started)
                    }
                }
            }
            ResponseShape::Generic(value) => {
                let raw_text = match value {
                    serde_json::Value::String(text) => text,
                    other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| raw.to_string()),
                };
                ParsedResponse {
                    version: SchemaVersion::V1,
                    success: true,
                    data: ParsedData {
                        raw_text: Some(raw_text),
                        ..Default::default()
                    },
                    dialogue: DialogueMessages {
                        success_message: self.tone.decorate("📝", "Response received!"),
                        display_text: self.tone.decorate(
                            "🤖",
                            "I've prepared some information for you. While it's not in my usual format, it might still be helpful!",
                        ),
                        toast_message: self.tone.decorate("💬", "Information received"),
                    },
                    metadata: FormatMetadata::finish(started, true, confidence::GENERIC),
                }
            }
        }
    }

    fn enhanced_response(&self, enhanced: Box<NutritionistResponseV2>, started: Instant) -> ParsedResponse {
        let level = enhanced.metadata.confidence;
        let score = match level {
            ConfidenceLevel::High => confidence::STRUCTURED,
            ConfidenceLevel::Medium => confidence::PARTIAL,
            ConfidenceLevel::Low => LOW_CONFIDENCE,
        };

        ParsedResponse {
            version: SchemaVersion::V2,
            success: true,
            dialogue: self.dialogue(level, enhanced.metadata.processing_time_ms),
            data: ParsedData {
                enhanced: Some(enhanced),
                ..Default::default()
            },
            metadata: FormatMetadata::finish(started, false, score),
        }
    }

    fn upgraded_response(
        &self,
        legacy: LegacyRecipe,
        enhanced: NutritionistResponseV2,
        started: Instant,
    ) -> ParsedResponse {
        ParsedResponse {
            version: SchemaVersion::V2,
            success: true,
            dialogue: self.dialogue(ConfidenceLevel::Medium, enhanced.metadata.processing_time_ms),
            data: ParsedData {
                legacy: Some(legacy),
                enhanced: Some(Box::new(enhanced)),
                raw_text: None,
            },
            metadata: FormatMetadata::finish(started, false, confidence::PARTIAL),
        }
    }

    fn text_response(&self, raw: &str, started: Instant) -> ParsedResponse {
        let received = self.tone.decorate("📄", "Text response received!");
        ParsedResponse {
            version: SchemaVersion::V1,
            success: true,
            data: ParsedData {
                raw_text: Some(raw.to_string()),
                ..Default::default()
            },
            dialogue: DialogueMessages {
                success_message: received.clone(),
                display_text: self.tone.decorate(
                    "💭",
                    "Here's what I found for you. It might not be in my usual structured format, but there could be some valuable insights!",
                ),
                toast_message: received,
            },
            metadata: FormatMetadata::finish(started, true, confidence::TEXT),
        }
    }

    fn dialogue(&self, level: ConfidenceLevel, processing_time_ms: f64) -> DialogueMessages {
        let elapsed = if processing_time_ms > 0.0 {
            format!(" in {:.1}s", processing_time_ms / 1000.0)
        } else {
            String::new()
        };

        let success_message = match level {
            ConfidenceLevel::High => self
                .tone
                .decorate("🏆", &format!("Premium nutrition plan generated{}!", elapsed)),
            ConfidenceLevel::Medium => self
                .tone
                .decorate("⭐", &format!("Personalized meal plan created{}!", elapsed)),
            ConfidenceLevel::Low => self
                .tone
                .decorate("📋", &format!("Nutrition guidance prepared{}!", elapsed)),
        };

        DialogueMessages {
            display_text: format!("{} {}", self.tone.greeting(), self.tone.encouragement()),
            toast_message: success_message.clone(),
            success_message,
        }
    }
}

impl ResponseFormatter for NutritionistResponseFormatter {
    type Output = ParsedResponse;
    type Tone = DialogueToneConfig;
    type ToneUpdate = DialogueToneUpdate;

    fn format_response(&self, raw: &str) -> ParsedResponse {
        self.parse_response(raw, 0.0)
    }

    fn update_tone(&mut self, update: DialogueToneUpdate) {
        self.tone.apply(update);
    }

    fn current_tone(&self) -> DialogueToneConfig {
        self.tone.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::contains_emoji;
    use schema::MealType;

    const LEGACY: &str = r#"{"dish":"Test Dish","kcal":420,"prot":15,"fat":18,"carb":52,"recipe":"- 1 cup rice\n1. Cook the rice for 15 minutes\n2. Add vegetables"}"#;

    #[test]
    fn test_legacy_upgrade() {
        let parsed = NutritionistResponseFormatter::default().parse_response(LEGACY, 2500.0);

        assert_eq!(parsed.version.as_str(), "2.0");
        assert!(parsed.success);
        assert!(!parsed.metadata.fallback_used);
        assert_eq!(parsed.metadata.confidence, confidence::PARTIAL);
        assert_eq!(parsed.data.legacy.as_ref().map(|l| l.dish.as_str()), Some("Test Dish"));

        let enhanced = parsed.data.enhanced.expect("enhanced document");
        let nutrition = &enhanced.content.nutrition;
        assert_eq!(nutrition.calories.total, 420.0);
        assert_eq!(nutrition.macronutrients.protein.grams, 15.0);
        assert_eq!(nutrition.calories.daily_value_percent, Some(21.0));
        assert_eq!(nutrition.macronutrients.protein.daily_value_percent, Some(30.0));
        assert_eq!(enhanced.metadata.processing_time_ms, 2500.0);
        assert_eq!(parsed.dialogue.success_message, "⭐ Personalized meal plan created in 2.5s!");
    }

    #[test]
    fn test_breakfast_dish_meal_type() {
        let raw = r#"{"dish":"Breakfast Pancakes","kcal":350,"prot":12,"fat":10,"carb":50,"recipe":"Mix and cook"}"#;
        let parsed = NutritionistResponseFormatter::default().format_response(raw);

        let enhanced = parsed.data.enhanced.expect("enhanced document");
        assert_eq!(enhanced.content.meal_plan.meal_type, vec![MealType::Breakfast]);
    }

    #[test]
    fn test_healthy_recipe_scores_well() {
        let raw = r#"{"dish":"Salmon Salad","kcal":380,"prot":32,"fat":14,"carb":20,"recipe":"Grill the salmon"}"#;
        let parsed = NutritionistResponseFormatter::default().format_response(raw);

        let enhanced = parsed.data.enhanced.expect("enhanced document");
        assert!(enhanced.content.nutrition.health_score > 60.0);
    }

    #[test]
    fn test_enhanced_round_trip() {
        let formatter = NutritionistResponseFormatter::default();
        let upgraded = formatter
            .format_response(LEGACY)
            .data
            .enhanced
            .expect("enhanced document");

        let raw = serde_json::to_string(&upgraded).unwrap();
        let parsed = formatter.format_response(&raw);

        assert_eq!(parsed.version, SchemaVersion::V2);
        assert!(parsed.data.legacy.is_none());
        assert_eq!(parsed.data.enhanced, Some(upgraded));
        assert_eq!(parsed.metadata.confidence, confidence::PARTIAL);
    }

    #[test]
    fn test_custom_phrases_in_display_text() {
        let formatter = NutritionistResponseFormatter::new(DialogueToneConfig::playful());
        let parsed = formatter.format_response(LEGACY);

        let tone = DialogueToneConfig::playful();
        let custom = tone.custom_phrases.unwrap();
        assert!(custom
            .greetings
            .iter()
            .any(|greeting| parsed.dialogue.display_text.starts_with(greeting.as_str())));
        assert!(custom
            .encouragements
            .iter()
            .any(|encouragement| parsed.dialogue.display_text.ends_with(encouragement.as_str())));
    }

    #[test]
    fn test_malformed_json_falls_back_to_text() {
        let raw = r#"{"dish":"Test","kcal":300,}"#;
        let parsed = NutritionistResponseFormatter::default().format_response(raw);

        assert!(parsed.success);
        assert_eq!(parsed.version.as_str(), "1.0");
        assert!(parsed.metadata.fallback_used);
        assert_eq!(parsed.metadata.confidence, confidence::TEXT);
        assert_eq!(parsed.data.raw_text.as_deref(), Some(raw));
        assert_eq!(parsed.dialogue.toast_message, "📄 Text response received!");
    }

    #[test]
    fn test_generic_json() {
        let parsed = NutritionistResponseFormatter::default().format_response(r#"{"answer": 42}"#);

        assert_eq!(parsed.version, SchemaVersion::V1);
        assert!(parsed.metadata.fallback_used);
        assert_eq!(parsed.metadata.confidence, confidence::GENERIC);
        assert!(parsed.data.raw_text.unwrap().contains("\"answer\": 42"));
    }

    #[test]
    fn test_negative_legacy_values_fall_back() {
        let raw = r#"{"dish":"Odd","kcal":-5,"prot":1,"fat":1,"carb":1,"recipe":"?"}"#;
        let parsed = NutritionistResponseFormatter::default().format_response(raw);

        assert!(parsed.metadata.fallback_used);
        assert_eq!(parsed.data.raw_text.as_deref(), Some(raw));
    }

    #[test]
    fn test_update_tone_removes_emoji() {
        let mut formatter = NutritionistResponseFormatter::new(DialogueToneConfig::enthusiastic());
        formatter.update_tone(DialogueToneUpdate {
            use_emojis: Some(false),
            ..Default::default()
        });

        let parsed = formatter.format_response(LEGACY);
        assert!(!contains_emoji(&parsed.dialogue.display_text));
        assert!(!contains_emoji(&parsed.dialogue.success_message));
        assert_eq!(formatter.current_tone().personality, Personality::Enthusiastic);
    }

    #[test]
    fn test_serialized_shape() {
        let parsed = NutritionistResponseFormatter::default().format_response("plain words");
        let value = serde_json::to_value(&parsed).unwrap();

        assert_eq!(value["version"], "1.0");
        assert_eq!(value["data"]["rawText"], "plain words");
        assert!(value["data"].get("enhanced").is_none());
        assert_eq!(value["metadata"]["fallbackUsed"], true);
    }
}
