//! Document shapes understood by the nutritionist formatter.
//!
//! Upstream answers come in three generations: the flat legacy recipe, the
//! nested v2 document, and anything else. [`ResponseShape::classify`] checks
//! them most specific first, and each check is a full typed decode rather
//! than a property lookup.

use crate::error::{FormatError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const ENHANCED_VERSION: &str = "2.0";
pub const RESPONSE_SOURCE: &str = "master-nutritionist";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub response_id: String,
    pub version: String,
    pub generated_at: String,
    pub processing_time_ms: f64,
    pub confidence: ConfidenceLevel,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub name: String,
    pub description: String,
    pub serving_size: f64,
    pub preparation_time_minutes: f64,
    pub difficulty_level: Difficulty,
    pub meal_type: Vec<MealType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine_style: Option<String>,
    pub dietary_tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calories {
    pub total: f64,
    pub per_serving: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_value_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protein {
    pub grams: f64,
    pub calories: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_value_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Carbohydrates {
    pub grams: f64,
    pub calories: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_value_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fat {
    pub grams: f64,
    pub calories: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsaturated: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_value_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Macronutrients {
    pub protein: Protein,
    pub carbohydrates: Carbohydrates,
    pub fat: Fat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Micronutrient {
    pub amount: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_value_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Micronutrients {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamins: Option<BTreeMap<String, Micronutrient>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minerals: Option<BTreeMap<String, Micronutrient>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrition {
    pub calories: Calories,
    pub macronutrients: Macronutrients,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micronutrients: Option<Micronutrients>,
    /// 0-100
    pub health_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructions {
    /// Markdown
    pub full_recipe: String,
    pub quick_summary: String,
    pub ingredients_list: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooking_tips: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_benefits: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseContent {
    pub meal_plan: MealPlan,
    pub nutrition: Nutrition,
    pub instructions: Instructions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dialogue {
    pub greeting: String,
    pub encouragement: String,
    pub nutritional_insights: Vec<String>,
    pub personalized_tips: Vec<String>,
    pub closing_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fun_facts: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserExperience {
    /// 1-10
    pub estimated_enjoyment_rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_pairings: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal_recommendations: Option<String>,
}

/// The v2 nutritionist document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionistResponseV2 {
    pub metadata: ResponseMetadata,
    pub content: ResponseContent,
    pub dialogue: Dialogue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_experience: Option<UserExperience>,
}

impl NutritionistResponseV2 {
    /// Decodes a v2 document, rejecting other versions.
    pub fn from_value(value: &Value) -> Result<Self> {
        let version = value
            .pointer("/metadata/version")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if version != ENHANCED_VERSION {
            return Err(FormatError::unknown_shape(format!(
                "expected metadata.version {}, got {:?}",
                ENHANCED_VERSION, version
            )));
        }
        Ok(Self::deserialize(value)?)
    }
}

/// The flat recipe answer older workflows still produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyRecipe {
    pub dish: String,
    pub kcal: f64,
    pub prot: f64,
    pub fat: f64,
    pub carb: f64,
    pub recipe: String,
}

impl LegacyRecipe {
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self::deserialize(value)?)
    }
}

pub fn is_enhanced_response(value: &Value) -> bool {
    NutritionistResponseV2::from_value(value).is_ok()
}

pub fn is_legacy_recipe(value: &Value) -> bool {
    LegacyRecipe::from_value(value).is_ok()
}

/// A parsed upstream answer, by generation.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    Enhanced(Box<NutritionistResponseV2>),
    Legacy(LegacyRecipe),
    Generic(Value),
}

impl ResponseShape {
    pub fn classify(value: Value) -> Self {
        if let Ok(enhanced) = NutritionistResponseV2::from_value(&value) {
            return Self::Enhanced(Box::new(enhanced));
        }
        if let Ok(legacy) = LegacyRecipe::from_value(&value) {
            return Self::Legacy(legacy);
        }
        Self::Generic(value)
    }

    /// Parses `raw` as JSON and classifies it.
    pub fn parse(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(Self::classify(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn enhanced_json() -> Value {
        json!({
            "metadata": {
                "responseId": "resp-1",
                "version": "2.0",
                "generatedAt": "2024-01-01T00:00:00Z",
                "processingTimeMs": 1200,
                "confidence": "high",
                "source": "master-nutritionist"
            },
            "content": {
                "mealPlan": {
                    "name": "Quinoa Bowl",
                    "description": "A bright bowl",
                    "servingSize": 1,
                    "preparationTimeMinutes": 20,
                    "difficultyLevel": "beginner",
                    "mealType": ["lunch"],
                    "dietaryTags": ["vegetarian"]
                },
                "nutrition": {
                    "calories": {"total": 450, "perServing": 450},
                    "macronutrients": {
                        "protein": {"grams": 18, "calories": 72},
                        "carbohydrates": {"grams": 60, "calories": 240, "fiber": 8},
                        "fat": {"grams": 14, "calories": 126}
                    },
                    "healthScore": 82
                },
                "instructions": {
                    "fullRecipe": "## Steps",
                    "quickSummary": "Cook and mix",
                    "ingredientsList": ["1 cup quinoa"]
                }
            },
            "dialogue": {
                "greeting": "Hello",
                "encouragement": "Enjoy",
                "nutritionalInsights": [],
                "personalizedTips": [],
                "closingMessage": "Bye"
            }
        })
    }

    #[test]
    fn test_classify_enhanced() {
        match ResponseShape::classify(enhanced_json()) {
            ResponseShape::Enhanced(response) => {
                assert_eq!(response.content.meal_plan.name, "Quinoa Bowl");
                assert_eq!(response.metadata.confidence, ConfidenceLevel::High);
                assert_eq!(response.content.nutrition.macronutrients.carbohydrates.fiber, Some(8.0));
                assert!(response.user_experience.is_none());
            }
            other => panic!("expected enhanced, got {:?}", other),
        }
    }

    #[test]
    fn test_enhanced_requires_version() {
        let mut value = enhanced_json();
        value["metadata"]["version"] = json!("1.5");
        assert!(!is_enhanced_response(&value));
        assert!(matches!(
            NutritionistResponseV2::from_value(&value),
            Err(FormatError::UnknownShape(_))
        ));
    }

    #[test]
    fn test_enhanced_rejects_mistyped_fields() {
        let mut value = enhanced_json();
        value["content"]["nutrition"]["healthScore"] = json!("great");
        assert!(!is_enhanced_response(&value));
    }

    #[test]
    fn test_classify_legacy() {
        let value = json!({"dish": "Soup", "kcal": 200, "prot": 8, "fat": 5, "carb": 30, "recipe": "Boil"});
        assert!(is_legacy_recipe(&value));
        assert!(matches!(ResponseShape::classify(value), ResponseShape::Legacy(_)));
    }

    #[test]
    fn test_legacy_checks_types() {
        let value = json!({"dish": "Soup", "kcal": "200", "prot": 8, "fat": 5, "carb": 30, "recipe": "Boil"});
        assert!(!is_legacy_recipe(&value));
        assert!(matches!(ResponseShape::classify(value), ResponseShape::Generic(_)));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(matches!(
            ResponseShape::parse(r#"{"dish":"Test","kcal":300,}"#),
            Err(FormatError::InvalidJson(_))
        ));
        assert!(matches!(
            ResponseShape::parse("\"just a string\""),
            Ok(ResponseShape::Generic(Value::String(_)))
        ));
    }
}
