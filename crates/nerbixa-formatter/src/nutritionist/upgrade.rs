//! Upgrades a legacy recipe into a v2 document.

use super::schema::{
    Calories, Carbohydrates, ConfidenceLevel, Dialogue, Difficulty, Fat, Instructions,
    LegacyRecipe, Macronutrients, MealPlan, MealType, Nutrition, NutritionistResponseV2, Protein,
    ResponseContent, ResponseMetadata, UserExperience, ENHANCED_VERSION, RESPONSE_SOURCE,
};
use super::tone::DialogueToneConfig;
use crate::error::{FormatError, Result};
use chrono::Utc;
use lazy_static::lazy_static;
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;

/// Daily reference intakes.
const DAILY_CALORIES: f64 = 2000.0;
const DAILY_PROTEIN_G: f64 = 50.0;
const DAILY_CARBS_G: f64 = 300.0;
const DAILY_FAT_G: f64 = 65.0;

const DEFAULT_PREP_MINUTES: f64 = 30.0;
const MAX_PREP_MINUTES: f64 = 120.0;
const MAX_INGREDIENTS: usize = 10;
const COOKING_TIP_COUNT: usize = 3;

const ADVANCED_TECHNIQUES: &[&str] = &["tempering", "reduction", "emulsification", "confit", "sous vide"];
const INTERMEDIATE_TECHNIQUES: &[&str] = &["saute", "sauté", "braise", "roast", "grill", "marinate"];

const MEAL_KEYWORDS: &[(MealType, &[&str])] = &[
    (MealType::Breakfast, &["pancake", "waffle", "oatmeal", "cereal", "toast", "smoothie", "egg"]),
    (MealType::Lunch, &["sandwich", "salad", "wrap", "soup"]),
    (MealType::Dinner, &["steak", "pasta", "curry", "stir fry", "roast"]),
    (MealType::Snack, &["bar", "chip", "cookie", "fruit", "nut"]),
];

const DEFAULT_COOKING_TIPS: [&str; COOKING_TIP_COUNT] = [
    "Mise en place - prep all ingredients before you start cooking",
    "Taste as you go and adjust seasoning to your preference",
    "Use fresh ingredients when possible for the best flavor",
];

const DEFAULT_PAIRINGS: &[&str] = &[
    "Fresh seasonal vegetables",
    "Herbal tea or sparkling water",
    "Mixed green salad with vinaigrette",
];

const ALTERNATIVES: &[&str] = &[
    "Make it lighter by reducing oil and adding more vegetables",
    "Boost protein by adding beans, lentils, or tofu",
    "Make it heartier by serving over quinoa or brown rice",
];

lazy_static! {
    static ref DURATION_MENTION: Regex =
        Regex::new(r"(?i)(\d+)\s*(minutes?|mins?|hours?|hrs?)\b").unwrap();
    static ref NUMBERED_STEP: Regex = Regex::new(r"^\d+\.").unwrap();
    static ref MEASURED_LINE: Regex = Regex::new(r"^\d+").unwrap();
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn percent_of(value: f64, reference: f64) -> f64 {
    (value / reference * 100.0).round()
}

fn legacy_response_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("legacy-{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// Longest duration mentioned in the recipe, in minutes, never below the default.
pub fn estimate_preparation_time(recipe: &str) -> f64 {
    DURATION_MENTION
        .captures_iter(recipe)
        .filter_map(|caps| {
            let amount: f64 = caps.get(1)?.as_str().parse().ok()?;
            let unit = caps.get(2)?.as_str().to_lowercase();
            Some(if unit.starts_with('h') { amount * 60.0 } else { amount })
        })
        .fold(DEFAULT_PREP_MINUTES, f64::max)
        .min(MAX_PREP_MINUTES)
}

pub fn estimate_difficulty(recipe: &str) -> Difficulty {
    let recipe = recipe.to_lowercase();
    if contains_any(&recipe, ADVANCED_TECHNIQUES) {
        Difficulty::Advanced
    } else if contains_any(&recipe, INTERMEDIATE_TECHNIQUES) {
        Difficulty::Intermediate
    } else {
        Difficulty::Beginner
    }
}

pub fn determine_meal_type(dish: &str) -> Vec<MealType> {
    let name = dish.to_lowercase();
    let types: Vec<MealType> = MEAL_KEYWORDS
        .iter()
        .filter(|(_, keywords)| contains_any(&name, keywords))
        .map(|(meal_type, _)| *meal_type)
        .collect();

    if types.is_empty() {
        vec![MealType::Lunch, MealType::Dinner]
    } else {
        types
    }
}

pub fn extract_dietary_tags(recipe: &str) -> Vec<String> {
    let recipe = recipe.to_lowercase();
    let mut tags = Vec::new();

    if recipe.contains("vegetarian") || !contains_any(&recipe, &["meat", "chicken", "beef", "fish"]) {
        tags.push("vegetarian");
    }
    if recipe.contains("gluten-free") || !contains_any(&recipe, &["flour", "wheat"]) {
        tags.push("gluten-free");
    }
    if contains_any(&recipe, &["low-carb", "keto"]) {
        tags.push("low-carb");
    }
    if contains_any(&recipe, &["dairy-free", "vegan"]) {
        tags.push("dairy-free");
    }

    to_strings(&tags)
}

/// 0-100, starting from 50.
pub fn health_score(recipe: &LegacyRecipe) -> f64 {
    let mut score: f64 = 50.0;

    if recipe.prot > 15.0 {
        score += 15.0;
    } else if recipe.prot > 10.0 {
        score += 10.0;
    }

    if recipe.kcal > 200.0 && recipe.kcal < 500.0 {
        score += 10.0;
    } else if recipe.kcal > 800.0 {
        score -= 10.0;
    }

    if recipe.fat > 0.0 && recipe.fat < 25.0 {
        score += 10.0;
    }
    if recipe.carb > 0.0 && recipe.carb < 60.0 {
        score += 5.0;
    }

    score.clamp(0.0, 100.0)
}

fn enhance_recipe_markdown(recipe: &str, use_emojis: bool) -> String {
    if recipe.contains("## Tips") || recipe.contains("## Cooking Tips") || recipe.contains("Pro Tips") {
        return recipe.to_string();
    }
    let heading = if use_emojis { "## 👨‍🍳 Pro Tips" } else { "## Pro Tips" };
    format!(
        "{}\n\n{}\n- Taste and adjust seasonings as you go\n- Prep all ingredients before starting to cook\n- Don't be afraid to make it your own!",
        recipe, heading
    )
}

pub fn quick_summary(recipe: &str) -> String {
    let steps: Vec<&str> = recipe
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let lowered = line.to_lowercase();
            NUMBERED_STEP.is_match(line) || contains_any(&lowered, &["cook", "mix", "add"])
        })
        .take(3)
        .collect();

    if steps.is_empty() {
        "Follow the detailed instructions below for best results.".to_string()
    } else {
        steps.join(" → ")
    }
}

pub fn extract_ingredients(recipe: &str) -> Vec<String> {
    recipe
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            if let Some(item) = line.strip_prefix('-').or_else(|| line.strip_prefix('•')) {
                Some(item.trim().to_string())
            } else if MEASURED_LINE.is_match(line) && contains_any(line, &["cup", "tsp", "tbsp"]) {
                Some(line.to_string())
            } else {
                None
            }
        })
        .filter(|item| !item.is_empty())
        .take(MAX_INGREDIENTS)
        .collect()
}

/// Always three tips: one default followed by up to two recipe-specific
/// tips, padded with the remaining defaults.
pub fn cooking_tips(recipe: &str) -> Vec<String> {
    let recipe = recipe.to_lowercase();
    let mut specific = Vec::new();

    if recipe.contains("oil") {
        specific.push("Heat your pan properly before adding oil to prevent sticking");
    }
    if contains_any(&recipe, &["spice", "garlic", "spicy"]) {
        specific.push("Toast spices briefly to enhance their flavors");
    }
    if contains_any(&recipe, &["stir fry", "pan"]) {
        specific.push("Keep ingredients moving in the pan for even cooking");
    }

    let tips: Vec<&str> = if specific.is_empty() {
        DEFAULT_COOKING_TIPS.to_vec()
    } else {
        std::iter::once(DEFAULT_COOKING_TIPS[0])
            .chain(specific.into_iter().take(COOKING_TIP_COUNT - 1))
            .chain(DEFAULT_COOKING_TIPS[1..].iter().copied())
            .take(COOKING_TIP_COUNT)
            .collect()
    };
    to_strings(&tips)
}

pub fn nutrition_benefits(recipe: &LegacyRecipe) -> Vec<String> {
    let mut benefits = Vec::new();

    if recipe.prot > 15.0 {
        benefits.push("High in protein for muscle maintenance and satiety");
    }
    if recipe.kcal < 400.0 {
        benefits.push("Light and energizing, perfect for maintaining energy levels");
    }
    if recipe.fat > 5.0 && recipe.fat < 20.0 {
        benefits.push("Balanced healthy fats for nutrient absorption");
    }
    if benefits.is_empty() {
        benefits.push("Provides a mix of macronutrients for steady energy");
    }

    to_strings(&benefits)
}

pub fn pairing_suggestions(dish: &str) -> Vec<String> {
    let dish = dish.to_lowercase();
    let specific = if dish.contains("pasta") {
        Some("Crusty bread and olive oil for dipping")
    } else if dish.contains("rice") {
        Some("Steamed broccoli or snap peas")
    } else {
        None
    };

    specific
        .into_iter()
        .chain(DEFAULT_PAIRINGS.iter().copied())
        .take(3)
        .map(str::to_string)
        .collect()
}

/// Up to three insights about calories, protein, fibre and health score.
pub fn nutritional_insights(nutrition: &Nutrition, tone: &DialogueToneConfig) -> Vec<String> {
    let mut insights = Vec::new();

    let calories = nutrition.calories.total;
    insights.push(if calories < 400.0 {
        tone.decorate("🪶", "Light and energizing - perfect for maintaining your vitality without feeling heavy!")
    } else if calories < 600.0 {
        tone.decorate("⚖️", "Beautifully balanced calories that fuel your day while keeping you satisfied!")
    } else {
        tone.decorate("🔋", "Power-packed with energy to fuel your most ambitious days!")
    });

    let protein = nutrition.macronutrients.protein.grams;
    if protein > 20.0 {
        insights.push(tone.decorate("💪", "Fantastic protein content for muscle support and lasting satisfaction!"));
    } else if protein > 10.0 {
        insights.push(tone.decorate("🏋️", "Great protein balance to keep you strong and steady throughout the day!"));
    }

    if nutrition.macronutrients.carbohydrates.fiber.unwrap_or(0.0) > 5.0 {
        insights.push(tone.decorate("🌾", "Rich in fiber - your digestive system will absolutely love this!"));
    }

    if nutrition.health_score > 80.0 {
        insights.push(tone.decorate("🏆", "Outstanding health score! This meal is a nutritional champion!"));
    } else if nutrition.health_score > 60.0 {
        insights.push(tone.decorate("⭐", "Excellent nutritional profile - you're making smart choices!"));
    }

    insights.truncate(3);
    insights
}

/// Up to two tips from preparation time, difficulty and meal type.
pub fn personalized_tips(meal_plan: &MealPlan, tone: &DialogueToneConfig) -> Vec<String> {
    let mut tips = Vec::new();

    let minutes = meal_plan.preparation_time_minutes;
    tips.push(if minutes <= 15.0 {
        tone.decorate("⚡", "Quick wins! This recipe is perfect for busy days when you need nutrition fast!")
    } else if minutes <= 30.0 {
        tone.decorate("⏰", "Perfect timing! Just enough prep time to enjoy the cooking process without rushing.")
    } else {
        tone.decorate("🧘", "Turn this into mindful cooking time - great for unwinding while creating something amazing!")
    });

    match meal_plan.difficulty_level {
        Difficulty::Beginner => tips.push(tone.decorate("🌱", "Perfect for building confidence in the kitchen - you've got this!")),
        Difficulty::Advanced => tips.push(tone.decorate("🎯", "Challenge accepted! This recipe will level up your culinary skills beautifully.")),
        Difficulty::Intermediate => {}
    }

    if meal_plan.meal_type.contains(&MealType::Breakfast) {
        tips.push(tone.decorate("🌅", "Start your day like a champion - this breakfast sets the perfect tone!"));
    } else if meal_plan.meal_type.contains(&MealType::Dinner) {
        tips.push(tone.decorate("🌙", "End your day on a high note with this nourishing dinner choice!"));
    }

    tips.truncate(2);
    tips
}

fn validate(legacy: &LegacyRecipe) -> Result<()> {
    for (field, value) in [
        ("kcal", legacy.kcal),
        ("prot", legacy.prot),
        ("fat", legacy.fat),
        ("carb", legacy.carb),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(FormatError::invalid_nutrient(field, value));
        }
    }
    Ok(())
}

/// Builds the full v2 document for a legacy recipe.
pub fn upgrade_legacy(
    legacy: &LegacyRecipe,
    processing_time_ms: f64,
    tone: &DialogueToneConfig,
) -> Result<NutritionistResponseV2> {
    validate(legacy)?;

    let score = health_score(legacy);
    let meal_plan = MealPlan {
        name: legacy.dish.clone(),
        description: format!("A delicious {} crafted just for you!", legacy.dish.to_lowercase()),
        serving_size: 1.0,
        preparation_time_minutes: estimate_preparation_time(&legacy.recipe),
        difficulty_level: estimate_difficulty(&legacy.recipe),
        meal_type: determine_meal_type(&legacy.dish),
        cuisine_style: None,
        dietary_tags: extract_dietary_tags(&legacy.recipe),
    };

    let nutrition = Nutrition {
        calories: Calories {
            total: legacy.kcal,
            per_serving: legacy.kcal,
            daily_value_percent: Some(percent_of(legacy.kcal, DAILY_CALORIES)),
        },
        macronutrients: Macronutrients {
            protein: Protein {
                grams: legacy.prot,
                calories: legacy.prot * 4.0,
                daily_value_percent: Some(percent_of(legacy.prot, DAILY_PROTEIN_G)),
            },
            carbohydrates: Carbohydrates {
                grams: legacy.carb,
                calories: legacy.carb * 4.0,
                fiber: None,
                sugar: None,
                daily_value_percent: Some(percent_of(legacy.carb, DAILY_CARBS_G)),
            },
            fat: Fat {
                grams: legacy.fat,
                calories: legacy.fat * 9.0,
                saturated: None,
                unsaturated: None,
                daily_value_percent: Some(percent_of(legacy.fat, DAILY_FAT_G)),
            },
        },
        micronutrients: None,
        health_score: score,
    };

    let dialogue = Dialogue {
        greeting: tone.greeting(),
        encouragement: tone.encouragement(),
        nutritional_insights: nutritional_insights(&nutrition, tone),
        personalized_tips: personalized_tips(&meal_plan, tone),
        closing_message: tone.closing(),
        fun_facts: None,
    };

    Ok(NutritionistResponseV2 {
        metadata: ResponseMetadata {
            response_id: legacy_response_id(),
            version: ENHANCED_VERSION.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            processing_time_ms,
            confidence: ConfidenceLevel::Medium,
            source: RESPONSE_SOURCE.to_string(),
        },
        content: ResponseContent {
            meal_plan,
            nutrition,
            instructions: Instructions {
                full_recipe: enhance_recipe_markdown(&legacy.recipe, tone.use_emojis),
                quick_summary: quick_summary(&legacy.recipe),
                ingredients_list: extract_ingredients(&legacy.recipe),
                cooking_tips: Some(cooking_tips(&legacy.recipe)),
                nutrition_benefits: Some(nutrition_benefits(legacy)),
                storage_instructions: None,
            },
        },
        dialogue,
        user_experience: Some(UserExperience {
            estimated_enjoyment_rating: (score / 10.0).clamp(6.0, 10.0),
            suggested_pairings: Some(pairing_suggestions(&legacy.dish)),
            alternative_options: Some(to_strings(ALTERNATIVES)),
            seasonal_recommendations: None,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPE: &str = "## Ingredients\n- 200g chicken breast\n- 1 tbsp olive oil\n• 2 cloves garlic\n1 cup rice\n\n## Steps\n1. Marinate the chicken for 20 minutes\n2. Grill for 12 mins\n3. Serve over rice";

    fn legacy(dish: &str, kcal: f64, prot: f64, fat: f64, carb: f64) -> LegacyRecipe {
        LegacyRecipe {
            dish: dish.to_string(),
            kcal,
            prot,
            fat,
            carb,
            recipe: RECIPE.to_string(),
        }
    }

    #[test]
    fn test_preparation_time() {
        assert_eq!(estimate_preparation_time(RECIPE), 30.0);
        assert_eq!(estimate_preparation_time("Simmer for 20 minutes"), 30.0);
        assert_eq!(estimate_preparation_time("Roast for 45 minutes"), 45.0);
        assert_eq!(estimate_preparation_time("Bake for 1 hour then rest 10 min"), 60.0);
        assert_eq!(estimate_preparation_time("Slow cook 6 hrs"), 120.0);
        assert_eq!(estimate_preparation_time("Just assemble"), 30.0);
    }

    #[test]
    fn test_difficulty() {
        assert_eq!(estimate_difficulty(RECIPE), Difficulty::Intermediate);
        assert_eq!(estimate_difficulty("Cook the duck confit"), Difficulty::Advanced);
        assert_eq!(estimate_difficulty("Sauté the onions"), Difficulty::Intermediate);
        assert_eq!(estimate_difficulty("Toss everything"), Difficulty::Beginner);
    }

    #[test]
    fn test_meal_type() {
        assert_eq!(determine_meal_type("Breakfast Pancakes"), vec![MealType::Breakfast]);
        assert_eq!(determine_meal_type("Chicken Soup"), vec![MealType::Lunch]);
        assert_eq!(determine_meal_type("Mystery Plate"), vec![MealType::Lunch, MealType::Dinner]);
    }

    #[test]
    fn test_dietary_tags() {
        assert_eq!(extract_dietary_tags(RECIPE), vec!["gluten-free"]);
        assert_eq!(
            extract_dietary_tags("Vegan keto bowl with tofu"),
            vec!["vegetarian", "gluten-free", "low-carb", "dairy-free"]
        );
        assert!(extract_dietary_tags("Beef with wheat flour").is_empty());
    }

    #[test]
    fn test_health_score_bounds() {
        assert_eq!(health_score(&legacy("Bowl", 420.0, 16.0, 18.0, 52.0)), 90.0);
        assert_eq!(health_score(&legacy("Feast", 1200.0, 2.0, 80.0, 150.0)), 40.0);
    }

    #[test]
    fn test_quick_summary_and_ingredients() {
        let summary = quick_summary(RECIPE);
        assert_eq!(summary.split(" → ").count(), 3);
        assert!(summary.starts_with("1. Marinate the chicken"));
        assert!(summary.ends_with("3. Serve over rice"));

        let ingredients = extract_ingredients(RECIPE);
        assert_eq!(
            ingredients,
            vec!["200g chicken breast", "1 tbsp olive oil", "2 cloves garlic", "1 cup rice"]
        );
        assert_eq!(
            quick_summary("Enjoy."),
            "Follow the detailed instructions below for best results."
        );
    }

    #[test]
    fn test_cooking_tips_always_three() {
        let specific = cooking_tips(RECIPE);
        assert_eq!(specific.len(), 3);
        assert_eq!(specific[0], DEFAULT_COOKING_TIPS[0]);
        assert!(specific[1].contains("oil"));
        assert!(specific[2].contains("spices"));

        let one_match = cooking_tips("Fry in a pan");
        assert_eq!(one_match.len(), 3);
        assert!(one_match[1].contains("pan"));
        assert_eq!(one_match[2], DEFAULT_COOKING_TIPS[1]);

        assert_eq!(cooking_tips("Assemble"), to_strings(&DEFAULT_COOKING_TIPS));
    }

    #[test]
    fn test_pairings() {
        assert_eq!(pairing_suggestions("Pasta Primavera")[0], "Crusty bread and olive oil for dipping");
        assert_eq!(pairing_suggestions("Salad").len(), 3);
    }

    #[test]
    fn test_upgrade_fills_every_section() {
        let tone = DialogueToneConfig::default();
        let enhanced = upgrade_legacy(&legacy("Test Dish", 420.0, 15.0, 18.0, 52.0), 1500.0, &tone).unwrap();

        let nutrition = &enhanced.content.nutrition;
        assert_eq!(nutrition.calories.total, 420.0);
        assert_eq!(nutrition.calories.daily_value_percent, Some(21.0));
        assert_eq!(nutrition.macronutrients.protein.daily_value_percent, Some(30.0));
        assert_eq!(nutrition.macronutrients.fat.calories, 162.0);
        assert_eq!(enhanced.metadata.confidence, ConfidenceLevel::Medium);
        assert!(enhanced.metadata.response_id.starts_with("legacy-"));
        assert!(enhanced.content.instructions.full_recipe.contains("Pro Tips"));
        assert!(!enhanced.dialogue.nutritional_insights.is_empty());
        assert!(enhanced.dialogue.personalized_tips.len() <= 2);

        let experience = enhanced.user_experience.unwrap();
        assert!((6.0..=10.0).contains(&experience.estimated_enjoyment_rating));
    }

    #[test]
    fn test_upgrade_rejects_negative_values() {
        let tone = DialogueToneConfig::default();
        let result = upgrade_legacy(&legacy("Bad", -1.0, 5.0, 5.0, 5.0), 0.0, &tone);
        assert!(matches!(result, Err(FormatError::InvalidNutrient { field: "kcal", .. })));
    }
}
