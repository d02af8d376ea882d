//! Cal-Tracker formatter: calorie and macro breakdowns.
//!
//! Structured nutrition objects (`calories|kcal`, `protein|prot`, `fat`,
//! `carbs|carb`, optionally nested under `nutrition`) are read directly and
//! macro percentages are derived from grams at 4/9/4 kcal per gram. Anything
//! else is mined as text for calorie and macro mentions.

use crate::error::{FormatError, Result};
use crate::text;
use crate::{
    confidence, decorate, format_number, pick_phrase, FormatMetadata, Phrase, ResponseFormatter,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, warn};

const PROTEIN_KCAL_PER_GRAM: f64 = 4.0;
const FAT_KCAL_PER_GRAM: f64 = 9.0;
const CARB_KCAL_PER_GRAM: f64 = 4.0;
const DEFAULT_FOOD_NAME: &str = "Your Food";
const NOT_AVAILABLE: &str = "n/a";
const MIN_PROSE_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalWarmth {
    Professional,
    Friendly,
    #[default]
    Enthusiastic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositivityLevel {
    Moderate,
    #[default]
    High,
    Maximum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalTrackerTone {
    pub warmth: CalWarmth,
    pub use_emojis: bool,
    pub positivity_level: PositivityLevel,
}

impl Default for CalTrackerTone {
    fn default() -> Self {
        Self {
            warmth: CalWarmth::Enthusiastic,
            use_emojis: true,
            positivity_level: PositivityLevel::High,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalTrackerToneUpdate {
    pub warmth: Option<CalWarmth>,
    pub use_emojis: Option<bool>,
    pub positivity_level: Option<PositivityLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroEntry {
    pub name: String,
    /// Display value, e.g. `20g`
    pub value: String,
    /// Display share of calories, e.g. `19%`
    pub percentage: String,
    pub emoji: String,
    pub grams: Option<f64>,
    pub percent: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalorieBreakdown {
    pub total_calories: String,
    pub macros: Vec<MacroEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalTrackerResponse {
    pub greeting: String,
    pub nutrition_summary: String,
    pub calorie_breakdown: CalorieBreakdown,
    pub health_insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub encouragement: String,
    pub next_steps: String,
    pub emoji: String,
    pub food_name: String,
    pub metadata: FormatMetadata,
}

/// Nutrient values read from a structured object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NutritionFacts {
    pub food_name: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
}

fn lookup_number(
    root: &Map<String, Value>,
    nested: Option<&Map<String, Value>>,
    keys: &[&str],
) -> Option<f64> {
    keys.iter().find_map(|key| {
        nested
            .and_then(|map| map.get(*key))
            .or_else(|| root.get(*key))
            .and_then(Value::as_f64)
    })
}

impl NutritionFacts {
    /// Reads a nutrition object. Requires at least one numeric nutrient;
    /// values of the wrong JSON type are ignored.
    pub fn from_value(value: &Value) -> Option<Self> {
        let root = value.as_object()?;
        let nested = root.get("nutrition").and_then(Value::as_object);

        let facts = Self {
            food_name: ["dish", "food_item", "name"]
                .iter()
                .filter_map(|key| root.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .find(|name| !name.is_empty())
                .map(str::to_string),
            calories: lookup_number(root, nested, &["calories", "kcal"]),
            protein: lookup_number(root, nested, &["protein", "prot"]),
            fat: lookup_number(root, nested, &["fat"]),
            carbs: lookup_number(root, nested, &["carbs", "carb", "carbohydrates"]),
        };

        facts.has_any_nutrient().then_some(facts)
    }

    fn has_any_nutrient(&self) -> bool {
        self.calories.is_some() || self.protein.is_some() || self.fat.is_some() || self.carbs.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.calories.is_some() && self.protein.is_some() && self.fat.is_some() && self.carbs.is_some()
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("calories", self.calories),
            ("protein", self.protein),
            ("fat", self.fat),
            ("carbs", self.carbs),
        ] {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(FormatError::invalid_nutrient(field, value));
                }
            }
        }
        Ok(())
    }

    /// Stated calories, or the sum of known macros.
    pub fn total_calories(&self) -> f64 {
        self.calories.unwrap_or_else(|| {
            self.protein.unwrap_or(0.0) * PROTEIN_KCAL_PER_GRAM
                + self.fat.unwrap_or(0.0) * FAT_KCAL_PER_GRAM
                + self.carbs.unwrap_or(0.0) * CARB_KCAL_PER_GRAM
        })
    }
}

/// Whole-percent shares of calories for protein, fat and carbs. Missing
/// macros get `None` and are left out of the total.
pub fn macro_percentages(
    protein: Option<f64>,
    fat: Option<f64>,
    carbs: Option<f64>,
) -> [Option<u32>; 3] {
    let kcal = [
        protein.map(|g| g * PROTEIN_KCAL_PER_GRAM),
        fat.map(|g| g * FAT_KCAL_PER_GRAM),
        carbs.map(|g| g * CARB_KCAL_PER_GRAM),
    ];
    let total: f64 = kcal.iter().flatten().sum();

    kcal.map(|value| {
        value.map(|value| {
            if total > 0.0 {
                (value / total * 100.0).round() as u32
            } else {
                0
            }
        })
    })
}

fn macro_entries(protein: Option<f64>, fat: Option<f64>, carbs: Option<f64>) -> Vec<MacroEntry> {
    let percentages = macro_percentages(protein, fat, carbs);

    [("Protein", "💪", protein), ("Fat", "🥑", fat), ("Carbs", "🌾", carbs)]
        .into_iter()
        .zip(percentages)
        .map(|((name, emoji, grams), percent)| MacroEntry {
            name: name.to_string(),
            value: grams
                .map(|g| format!("{}g", format_number(g)))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            percentage: percent
                .map(|p| format!("{}%", p))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            emoji: emoji.to_string(),
            grams,
            percent,
        })
        .collect()
}

lazy_static! {
    static ref CALORIE_MENTION: Regex =
        Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:kcal|calories?|калорий)").unwrap();
    static ref PROTEIN_MENTION: Regex =
        Regex::new(r"(?i)protein[:\s]*(\d+(?:\.\d+)?)\s*g").unwrap();
    static ref FAT_MENTION: Regex = Regex::new(r"(?i)\bfats?[:\s]*(\d+(?:\.\d+)?)\s*g").unwrap();
    static ref CARB_MENTION: Regex =
        Regex::new(r"(?i)carb(?:ohydrate)?s?[:\s]*(\d+(?:\.\d+)?)\s*g").unwrap();
    static ref FOOD_NAME_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)analyzing ([^\n.!?]{1,60}?) nutrition").unwrap(),
        Regex::new(r"(?i)nutrition for ([^\n.!?]{1,60}?)[.!]").unwrap(),
        Regex::new(r"(?i)food item[:\s]*([^\n.!?]{1,60}?)[.!\n]").unwrap(),
        Regex::new(r"(?im)^([^\n.!?]{1,60}?) contains").unwrap(),
    ];
    static ref TEXT_HIGHLIGHTS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"(?i)\b(protein)\b").unwrap(), "💪 ${1}"),
        (Regex::new(r"(?i)\b(calories?)\b").unwrap(), "🔥 ${1}"),
        (Regex::new(r"(?i)\b(carb\w*)").unwrap(), "🌾 ${1}"),
        (Regex::new(r"(?i)\b(fats?)\b").unwrap(), "🥑 ${1}"),
    ];
}

fn capture_number(regex: &Regex, content: &str) -> Option<f64> {
    regex
        .captures(content)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn food_name_from_text(content: &str) -> Option<String> {
    FOOD_NAME_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| text::strip_markers(m.as_str()))
            .filter(|name| !name.is_empty())
    })
}

const HIGH_ENCOURAGEMENT: &[Phrase] = &[
    Phrase::new("🌟", "Amazing work tracking your nutrition! Every food choice is a step toward a healthier, more energized you!"),
    Phrase::new("🎯", "You are building incredible awareness of your nutrition! This mindful approach will transform your health journey!"),
    Phrase::new("💪", "Fantastic dedication to understanding your food! Knowledge like this empowers you to make choices that truly nourish your body!"),
];

const MODERATE_ENCOURAGEMENT: &[Phrase] = &[
    Phrase::new("👍", "Nice work logging this meal. Consistent tracking builds real awareness."),
    Phrase::new("📈", "Every entry makes your nutrition picture a little clearer."),
];

const MAXIMUM_ENCOURAGEMENT: &[Phrase] = &[
    Phrase::new("🎉", "Incredible commitment! You're turning every single meal into a win for your health!"),
    Phrase::new("🏆", "You're a nutrition-tracking champion! Keep this amazing momentum going strong!"),
    Phrase::new("🚀", "Unstoppable! Your dedication to mindful eating is truly inspiring!"),
];

const DEFAULT_INSIGHT: Phrase = Phrase::new(
    "🌱",
    "Every food you log adds to a clearer picture of your daily nutrition.",
);

const DEFAULT_RECOMMENDATION: Phrase = Phrase::new(
    "🥗",
    "Pair this with colourful vegetables for extra fibre and micronutrients.",
);

const TEXT_RECOMMENDATIONS: &[Phrase] = &[
    Phrase::new("🍽️", "Perfect Addition: This food fits beautifully into a balanced eating pattern!"),
    Phrase::new("⏰", "Timing Tip: Enjoy this as part of your regular meal routine for consistent energy!"),
];

/// Where a text-path input came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextSource {
    Json,
    Text,
}

#[derive(Debug, Clone, Default)]
pub struct CalTrackerResponseFormatter {
    tone: CalTrackerTone,
}

impl CalTrackerResponseFormatter {
    pub fn new(tone: CalTrackerTone) -> Self {
        Self { tone }
    }

    fn emojis(&self) -> bool {
        self.tone.use_emojis
    }

    fn from_facts(&self, facts: &NutritionFacts, started: Instant) -> Result<CalTrackerResponse> {
        facts.validate()?;

        let food_name = facts
            .food_name
            .clone()
            .unwrap_or_else(|| DEFAULT_FOOD_NAME.to_string());
        let calories = facts.total_calories();
        let protein = facts.protein.unwrap_or(0.0);
        let fat = facts.fat.unwrap_or(0.0);
        let carbs = facts.carbs.unwrap_or(0.0);

        let emoji = if protein >= 20.0 {
            "💪"
        } else if calories >= 400.0 {
            "🔥"
        } else {
            "🌟"
        };

        let confidence = if facts.is_complete() {
            confidence::STRUCTURED
        } else {
            confidence::PARTIAL
        };

        Ok(CalTrackerResponse {
            greeting: self.structured_greeting(&food_name, calories),
            nutrition_summary: self.structured_summary(&food_name, calories, protein, fat, carbs),
            calorie_breakdown: CalorieBreakdown {
                total_calories: format!("{} calories", format_number(calories)),
                macros: macro_entries(facts.protein, facts.fat, facts.carbs),
            },
            health_insights: self.structured_insights(calories, protein, carbs),
            recommendations: self.structured_recommendations(calories, protein, fat, carbs),
            encouragement: self.encouragement(),
            next_steps: self.structured_next_steps(&food_name),
            emoji: emoji.to_string(),
            food_name,
            metadata: FormatMetadata::finish(started, false, confidence),
        })
    }

    fn structured_greeting(&self, food_name: &str, calories: f64) -> String {
        let kcal = format_number(calories);
        match self.tone.warmth {
            CalWarmth::Professional => format!(
                "Excellent choice! {} provides {} calories with a great nutritional profile to support your health goals.",
                food_name, kcal
            ),
            CalWarmth::Friendly => decorate(
                self.emojis(),
                "😊",
                &format!(
                    "Nice pick! {} brings {} calories to your day. Here's how it breaks down.",
                    food_name, kcal
                ),
            ),
            CalWarmth::Enthusiastic => {
                let (emoji, text) = if calories > 500.0 {
                    ("🔥", format!("Fantastic choice! {} is an energy-rich food that can fuel your active lifestyle with {} calories of pure nutrition power!", food_name, kcal))
                } else if calories > 200.0 {
                    ("✨", format!("Perfect selection! {} offers a beautiful balance of nutrition with {} calories to support your wellness goals!", food_name, kcal))
                } else {
                    ("🌿", format!("Wonderful pick! {} is a light yet nourishing choice with {} calories that fits beautifully into any healthy eating plan!", food_name, kcal))
                };
                decorate(self.emojis(), emoji, &text)
            }
        }
    }

    fn structured_summary(
        &self,
        food_name: &str,
        calories: f64,
        protein: f64,
        fat: f64,
        carbs: f64,
    ) -> String {
        let (kcal, protein, fat, carbs) = (
            format_number(calories),
            format_number(protein),
            format_number(fat),
            format_number(carbs),
        );

        if self.tone.warmth != CalWarmth::Enthusiastic {
            return format!(
                "Your {} provides an excellent nutritional foundation with {} calories, {}g protein, {}g fat, and {}g carbohydrates. This combination supports sustained energy and overall wellness.",
                food_name, kcal, protein, fat, carbs
            );
        }

        let use_emojis = self.emojis();
        let lines = [
            decorate(use_emojis, "🎯", &format!("Your {} analysis reveals incredible nutritional value! This powerhouse combination delivers:", food_name)),
            String::new(),
            decorate(use_emojis, "⚡", &format!("Energy Source: {} calories to fuel your day", kcal)),
            decorate(use_emojis, "💪", &format!("Muscle Building: {}g of high-quality protein", protein)),
            decorate(use_emojis, "🧠", &format!("Brain Fuel: {}g of essential healthy fats", fat)),
            decorate(use_emojis, "🌾", &format!("Quick Energy: {}g of energizing carbohydrates", carbs)),
            String::new(),
            format!("This amazing balance makes {} a smart choice for maintaining steady energy levels while supporting your body's essential functions!", food_name),
        ];
        lines.join("\n")
    }

    fn structured_insights(&self, calories: f64, protein: f64, carbs: f64) -> Vec<String> {
        let mut insights = Vec::new();

        if protein >= 20.0 {
            insights.push(Phrase::new("💪", "Excellent protein content! This amount supports muscle maintenance, recovery, and helps keep you feeling satisfied longer."));
        } else if protein >= 10.0 {
            insights.push(Phrase::new("👍", "Good protein source! Consider pairing with additional protein-rich foods for optimal muscle support."));
        }

        if calories >= 400.0 {
            insights.push(Phrase::new("🔥", "This is a substantial energy source perfect for active individuals or as a complete meal component!"));
        } else if calories >= 150.0 {
            insights.push(Phrase::new("⚖️", "Great calorie balance! Perfect for mindful eating while still providing meaningful nutrition."));
        }

        if carbs >= 30.0 {
            insights.push(Phrase::new("⚡", "Rich in energizing carbohydrates! Ideal for pre-workout fuel or sustaining mental focus."));
        }

        if insights.is_empty() {
            insights.push(DEFAULT_INSIGHT);
        }
        insights.iter().map(|phrase| phrase.render(self.emojis())).collect()
    }

    fn structured_recommendations(&self, calories: f64, protein: f64, fat: f64, carbs: f64) -> Vec<String> {
        let mut recommendations = Vec::new();

        if carbs >= 25.0 {
            recommendations.push(Phrase::new("🌅", "Perfect Morning Fuel: The carbohydrate content makes this ideal for breakfast or pre-workout energy!"));
        }
        if protein >= 15.0 {
            recommendations.push(Phrase::new("🍽️", "Post-Workout Champion: High protein content makes this excellent for muscle recovery within 2 hours of exercise!"));
        }
        if fat < 5.0 {
            recommendations.push(Phrase::new("🥑", "Smart Pairing Tip: Add some healthy fats like avocado, nuts, or olive oil to enhance nutrient absorption!"));
        }
        if calories > 400.0 {
            recommendations.push(Phrase::new("🍽️", "Mindful Portions: This can serve as a complete meal component. Listen to your hunger cues for perfect satisfaction!"));
        }

        if recommendations.is_empty() {
            recommendations.push(DEFAULT_RECOMMENDATION);
        }
        recommendations.iter().map(|phrase| phrase.render(self.emojis())).collect()
    }

    fn structured_next_steps(&self, food_name: &str) -> String {
        let options = [
            ("🍽️", format!("Want to explore perfect meal combinations with {}? I can suggest complementary foods that create nutritional harmony!", food_name)),
            ("📊", "Ready to track another food item? Building a complete picture of your daily nutrition creates powerful insights for optimal health!".to_string()),
            ("⚡", "Curious about meal timing strategies? I can help you understand when to eat different nutrients for maximum energy and recovery!".to_string()),
        ];
        crate::pick(&options)
            .map(|(emoji, text)| decorate(self.emojis(), emoji, text))
            .unwrap_or_default()
    }

    fn encouragement(&self) -> String {
        let pool = match self.tone.positivity_level {
            PositivityLevel::Moderate => MODERATE_ENCOURAGEMENT,
            PositivityLevel::High => HIGH_ENCOURAGEMENT,
            PositivityLevel::Maximum => MAXIMUM_ENCOURAGEMENT,
        };
        pick_phrase(pool, self.emojis())
    }

    fn from_text(&self, content: &str, source: TextSource, started: Instant) -> CalTrackerResponse {
        let mined = text::mine(content, MIN_PROSE_CHARS);
        let lowered = content.to_lowercase();

        let calories = capture_number(&CALORIE_MENTION, content);
        let protein = capture_number(&PROTEIN_MENTION, content);
        let fat = capture_number(&FAT_MENTION, content);
        let carbs = capture_number(&CARB_MENTION, content);
        debug!(?calories, ?protein, ?fat, ?carbs, "Mined nutrient mentions");

        let food_name = food_name_from_text(content).unwrap_or_else(|| DEFAULT_FOOD_NAME.to_string());

        let mut insights = Vec::new();
        if lowered.contains("protein") {
            insights.push(Phrase::new("💪", "Great protein source detected! Perfect for muscle maintenance and satisfaction."));
        }
        if lowered.contains("vitamin") || lowered.contains("nutrient") {
            insights.push(Phrase::new("✨", "Rich in essential nutrients! Your body will thank you for this nutritious choice."));
        }
        if insights.is_empty() {
            insights.push(DEFAULT_INSIGHT);
        }

        let recommendations = if mined.tips.is_empty() {
            TEXT_RECOMMENDATIONS
                .iter()
                .map(|phrase| phrase.render(self.emojis()))
                .collect()
        } else if self.emojis() {
            mined.tips.clone()
        } else {
            mined.tips.iter().map(|tip| text::strip_emoji(tip)).collect()
        };

        let emoji = if lowered.contains("protein") {
            "💪"
        } else if lowered.contains("energy") {
            "⚡"
        } else {
            "🎯"
        };

        let fallback_confidence = match source {
            TextSource::Json => confidence::GENERIC,
            TextSource::Text => confidence::TEXT,
        };

        CalTrackerResponse {
            greeting: decorate(
                self.emojis(),
                "🎯",
                "Excellent choice! Let me break down the amazing nutritional value of your food selection!",
            ),
            nutrition_summary: self.text_summary(&mined.main_text()),
            calorie_breakdown: CalorieBreakdown {
                total_calories: calories
                    .map(|kcal| format!("{} calories", format_number(kcal)))
                    .unwrap_or_else(|| "Analysis in progress".to_string()),
                macros: macro_entries(protein, fat, carbs),
            },
            health_insights: insights.iter().map(|phrase| phrase.render(self.emojis())).collect(),
            recommendations,
            encouragement: self.encouragement(),
            next_steps: decorate(
                self.emojis(),
                "🚀",
                "Ready to analyze another food item? Building your nutrition knowledge one analysis at a time creates lasting healthy habits!",
            ),
            emoji: emoji.to_string(),
            food_name,
            metadata: FormatMetadata::finish(started, true, fallback_confidence),
        }
    }

    fn text_summary(&self, main: &str) -> String {
        if main.is_empty() {
            return "Here's what we found about your food.".to_string();
        }
        if !self.emojis() {
            return text::strip_emoji(main);
        }
        TEXT_HIGHLIGHTS
            .iter()
            .fold(main.to_string(), |text, (regex, replacement)| {
                regex.replace_all(&text, *replacement).into_owned()
            })
    }

    fn format_value(&self, value: &Value, raw: &str, started: Instant) -> CalTrackerResponse {
        if let Some(facts) = NutritionFacts::from_value(value) {
            match self.from_facts(&facts, started) {
                Ok(response) => return response,
                Err(e) => warn!(error = %e, "Structured nutrition rejected, using text fallback"),
            }
        }

        let content = match value {
            Value::String(text) => text.as_str(),
            Value::Object(map) => ["output", "response", "content", "message"]
                .iter()
                .filter_map(|key| map.get(*key).and_then(Value::as_str))
                .find(|text| !text.trim().is_empty())
                .unwrap_or(raw),
            _ => raw,
        };
        self.from_text(content, TextSource::Json, started)
    }
}

impl ResponseFormatter for CalTrackerResponseFormatter {
    type Output = CalTrackerResponse;
    type Tone = CalTrackerTone;
    type ToneUpdate = CalTrackerToneUpdate;

    fn format_response(&self, raw: &str) -> CalTrackerResponse {
        let started = Instant::now();
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => self.format_value(&value, raw, started),
            Err(_) => self.from_text(raw, TextSource::Text, started),
        }
    }

    fn update_tone(&mut self, update: CalTrackerToneUpdate) {
        if let Some(warmth) = update.warmth {
            self.tone.warmth = warmth;
        }
        if let Some(use_emojis) = update.use_emojis {
            self.tone.use_emojis = use_emojis;
        }
        if let Some(positivity_level) = update.positivity_level {
            self.tone.positivity_level = positivity_level;
        }
    }

    fn current_tone(&self) -> CalTrackerTone {
        self.tone.clone()
    }
}
