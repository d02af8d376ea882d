//! Friendly formatter for conversational nutrition advice.

use crate::text::{self, MinedText};
use crate::topic::{classify, Topic};
use crate::{confidence, decorate, pick_phrase, FormatMetadata, Phrase, ResponseFormatter};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

/// Prose lines at or below this many characters are ignored.
const MIN_PROSE_CHARS: usize = 10;
const ENVELOPE_FIELDS: [&str; 4] = ["output", "response", "content", "message"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Warmth {
    Professional,
    #[default]
    Friendly,
    Playful,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HumorLevel {
    None,
    #[default]
    Light,
    Moderate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneConfig {
    pub warmth: Warmth,
    pub use_emojis: bool,
    pub humor_level: HumorLevel,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            warmth: Warmth::Friendly,
            use_emojis: true,
            humor_level: HumorLevel::Light,
        }
    }
}

/// Partial [`ToneConfig`]; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneUpdate {
    pub warmth: Option<Warmth>,
    pub use_emojis: Option<bool>,
    pub humor_level: Option<HumorLevel>,
}

impl ToneConfig {
    pub fn apply(&mut self, update: ToneUpdate) {
        if let Some(warmth) = update.warmth {
            self.warmth = warmth;
        }
        if let Some(use_emojis) = update.use_emojis {
            self.use_emojis = use_emojis;
        }
        if let Some(humor_level) = update.humor_level {
            self.humor_level = humor_level;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendlyResponse {
    pub greeting: String,
    pub main_content: String,
    pub action_items: Vec<String>,
    pub encouragement: String,
    pub next_steps: String,
    pub emoji: String,
    pub topic: Topic,
    pub metadata: FormatMetadata,
}

struct IconRule {
    regex: Regex,
    icon: &'static str,
}

lazy_static! {
    /// Leading icons for action items, highest priority first.
    static ref TIP_ICONS: Vec<IconRule> = vec![
        IconRule { regex: Regex::new(r"(?i)protein|белок|белк").unwrap(), icon: "💪" },
        IconRule { regex: Regex::new(r"(?i)hydrat|water|\bвод[аыуеой]\b|жидкост").unwrap(), icon: "💧" },
        IconRule { regex: Regex::new(r"(?i)portion|serving|plate size|порци").unwrap(), icon: "⚖️" },
        IconRule { regex: Regex::new(r"(?i)calori|kcal|калори|ккал").unwrap(), icon: "🔥" },
        IconRule { regex: Regex::new(r"(?i)carb|углевод").unwrap(), icon: "⚡" },
        IconRule { regex: Regex::new(r"(?i)\bfats?\b|жир").unwrap(), icon: "🥑" },
        IconRule { regex: Regex::new(r"(?i)meal timing|breakfast|snack|before bed|питай|при[её]м").unwrap(), icon: "⏰" },
        IconRule { regex: Regex::new(r"(?i)fib(?:er|re)|vegetable|клетчат|овощ").unwrap(), icon: "🥦" },
    ];

    /// Nutrient words highlighted in the main text.
    static ref TERM_ICONS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"(?i)\b(бел(?:ок|ка|ку|ком|ке))\b").unwrap(), "🥩 ${1}"),
        (Regex::new(r"(?i)\b(protein)\b").unwrap(), "🥩 ${1}"),
        (Regex::new(r"(?i)\b(калори\w*)").unwrap(), "🔥 ${1}"),
        (Regex::new(r"(?i)\b(calories?)\b").unwrap(), "🔥 ${1}"),
        (Regex::new(r"(?i)\b(углевод\w*)").unwrap(), "🍞 ${1}"),
        (Regex::new(r"(?i)\b(carb(?:s|ohydrates?)?)\b").unwrap(), "🍞 ${1}"),
    ];
}

const DEFAULT_ICON: &str = "✨";

const PROFESSIONAL_ENCOURAGEMENT: &[Phrase] = &[
    Phrase::plain("I believe these recommendations will support your goals effectively."),
    Phrase::plain("Consistency with these guidelines will yield excellent results."),
    Phrase::plain("Your dedication to improving your nutrition is commendable."),
];

const FRIENDLY_ENCOURAGEMENT: &[Phrase] = &[
    Phrase::new("🌟", "You've got this! Small consistent steps lead to amazing results."),
    Phrase::new("💪", "I'm here to support you every step of the way!"),
    Phrase::new("🎯", "Focus on progress, not perfection - you're already on the right path!"),
];

const PLAYFUL_ENCOURAGEMENT: &[Phrase] = &[
    Phrase::new("🚀", "Time to become a nutrition superhero! Your body will thank you later."),
    Phrase::new("✨", "Consider me your friendly nutrition wizard - we're going to make magic happen!"),
    Phrase::new("🎉", "Get ready for an amazing transformation journey!"),
];

const HUMOROUS_ENCOURAGEMENT: &[Phrase] = &[
    Phrase::new("🥦", "Remember: broccoli is just a tiny tree cheering you on!"),
    Phrase::new("🍕", "Balance is everything. Even pizza agrees when it comes with a side salad!"),
];

fn topic_opening(topic: Topic) -> &'static str {
    match topic {
        Topic::MuscleBuilding => {
            "Building muscle comes down to smart training paired with the right fuel."
        }
        Topic::WeightLoss => "Sustainable weight management starts with small, steady changes.",
        Topic::Energy => "Let's get your energy levels working for you all day long.",
        Topic::Nutrition => "Balanced, varied meals are the foundation of feeling great.",
    }
}

fn topic_summary(topic: Topic) -> &'static str {
    match topic {
        Topic::MuscleBuilding => {
            "Steady protein intake spread across the day supports muscle growth and recovery."
        }
        Topic::WeightLoss => {
            "A modest calorie deficit built on filling, nutrient-dense foods is the most reliable path."
        }
        Topic::Energy => {
            "Regular meals with complex carbohydrates and enough water keep energy levels stable."
        }
        Topic::Nutrition => {
            "A plate built around vegetables, lean protein and whole grains covers most of your needs."
        }
    }
}

fn topic_tips(topic: Topic) -> &'static [&'static str] {
    match topic {
        Topic::MuscleBuilding => &[
            "Include a protein source in every meal",
            "Eat a balanced meal within two hours after training",
        ],
        Topic::WeightLoss => &[
            "Track your calories for one typical week",
            "Fill half of your plate with vegetables",
        ],
        Topic::Energy => &[
            "Drink water regularly throughout the day",
            "Choose complex carbs like oats and whole grains for breakfast",
        ],
        Topic::Nutrition => &[
            "Add one extra serving of vegetables to your day",
            "Drink water regularly throughout the day",
        ],
    }
}

fn topic_follow_up(topic: Topic) -> Phrase {
    match topic {
        Topic::MuscleBuilding => Phrase::new(
            "🏋️",
            "Would you like a sample high-protein meal plan built around your training days?",
        ),
        Topic::WeightLoss => Phrase::new(
            "🎯",
            "Would you like me to estimate a daily calorie target that fits your goal?",
        ),
        Topic::Energy => Phrase::new(
            "⏰",
            "Want some meal timing ideas to keep your energy steady all day?",
        ),
        Topic::Nutrition => Phrase::new(
            "💬",
            "Tell me a bit more about your goals and I can tailor these suggestions for you!",
        ),
    }
}

/// Where the text being mined came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    /// JSON envelope with a text field
    Envelope,
    /// JSON of another shape
    Json,
    Text,
}

fn extract_content(raw: &str) -> (String, Source) {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(text)) => (text, Source::Envelope),
        Ok(Value::Object(map)) => ENVELOPE_FIELDS
            .iter()
            .filter_map(|field| map.get(*field).and_then(Value::as_str))
            .find(|text| !text.trim().is_empty())
            .map(|text| (text.to_string(), Source::Envelope))
            .unwrap_or_else(|| (raw.to_string(), Source::Json)),
        Ok(_) => (raw.to_string(), Source::Json),
        Err(_) => (raw.to_string(), Source::Text),
    }
}

/// Turns advice text into greeting, highlighted content, iconized action
/// items, encouragement and a follow-up question.
#[derive(Debug, Clone, Default)]
pub struct FriendlyResponseFormatter {
    tone: ToneConfig,
}

impl FriendlyResponseFormatter {
    pub fn new(tone: ToneConfig) -> Self {
        Self { tone }
    }

    fn transform(&self, content: &str, source: Source, started: Instant) -> FriendlyResponse {
        let mined = text::mine(content, MIN_PROSE_CHARS);
        let topic = classify(content);
        let age = text::age_mention(content);
        debug!(?topic, tips = mined.tips.len(), questions = mined.questions.len(), "Mined friendly response");

        let (fallback_used, confidence) = match source {
            Source::Envelope => (false, confidence::PARTIAL),
            Source::Json => (true, confidence::GENERIC),
            Source::Text => (true, confidence::TEXT),
        };

        FriendlyResponse {
            greeting: self.greeting(topic, age),
            main_content: self.main_content(&mined, topic),
            action_items: self.action_items(&mined, topic),
            encouragement: self.encouragement(),
            next_steps: self.next_steps(&mined, topic),
            emoji: topic.emoji().to_string(),
            topic,
            metadata: FormatMetadata::finish(started, fallback_used, confidence),
        }
    }

    fn greeting(&self, topic: Topic, age: Option<u32>) -> String {
        let base = match self.tone.warmth {
            Warmth::Professional => Phrase::plain(
                "Excellent question! Let me provide you with some comprehensive guidance.",
            ),
            Warmth::Friendly => Phrase::new(
                "😊",
                "Great question! I'm excited to help you on your nutrition journey.",
            ),
            Warmth::Playful => Phrase::new(
                "🌟",
                "Amazing! You've come to the right place for some nutrition magic!",
            ),
        };

        let mut greeting = base.render(self.tone.use_emojis);
        greeting.push(' ');
        greeting.push_str(topic_opening(topic));
        if let Some(age) = age {
            greeting.push_str(&format!(
                " At {}, a plan tailored to your stage of life makes a real difference.",
                age
            ));
        }
        greeting
    }

    fn main_content(&self, mined: &MinedText, topic: Topic) -> String {
        let main = mined.main_text();
        if main.is_empty() {
            return topic_summary(topic).to_string();
        }
        if !self.tone.use_emojis {
            return text::strip_emoji(&main);
        }
        TERM_ICONS.iter().fold(main, |text, (regex, replacement)| {
            regex.replace_all(&text, *replacement).into_owned()
        })
    }

    fn format_tip(&self, tip: &str) -> String {
        if !self.tone.use_emojis {
            return format!("• {}", text::strip_emoji(tip));
        }
        let icon = TIP_ICONS
            .iter()
            .find(|rule| rule.regex.is_match(tip))
            .map(|rule| rule.icon)
            .unwrap_or(DEFAULT_ICON);
        decorate(true, icon, tip)
    }

    fn action_items(&self, mined: &MinedText, topic: Topic) -> Vec<String> {
        if mined.tips.is_empty() {
            topic_tips(topic).iter().map(|tip| self.format_tip(tip)).collect()
        } else {
            mined.tips.iter().map(|tip| self.format_tip(tip)).collect()
        }
    }

    fn encouragement(&self) -> String {
        let ToneConfig {
            warmth,
            use_emojis,
            humor_level,
        } = self.tone;

        let mut pool: Vec<Phrase> = match (warmth, humor_level) {
            (Warmth::Professional, _) => PROFESSIONAL_ENCOURAGEMENT.to_vec(),
            (Warmth::Playful, HumorLevel::None) => FRIENDLY_ENCOURAGEMENT.to_vec(),
            (Warmth::Playful, _) => PLAYFUL_ENCOURAGEMENT.to_vec(),
            (Warmth::Friendly, _) => FRIENDLY_ENCOURAGEMENT.to_vec(),
        };
        if warmth != Warmth::Professional && humor_level == HumorLevel::Moderate {
            pool.extend_from_slice(HUMOROUS_ENCOURAGEMENT);
        }

        pick_phrase(&pool, use_emojis)
    }

    fn next_steps(&self, mined: &MinedText, topic: Topic) -> String {
        if mined.questions.is_empty() {
            return topic_follow_up(topic).render(self.tone.use_emojis);
        }

        let questions = mined
            .question_text()
            .replace("расскажете", "поделитесь со мной");
        if self.tone.use_emojis {
            format!("🤔 {}", questions.replace("Могу", "💡 Я могу"))
        } else {
            text::strip_emoji(&questions.replace("Могу", "Я могу"))
        }
    }
}

impl ResponseFormatter for FriendlyResponseFormatter {
    type Output = FriendlyResponse;
    type Tone = ToneConfig;
    type ToneUpdate = ToneUpdate;

    fn format_response(&self, raw: &str) -> FriendlyResponse {
        let started = Instant::now();
        let (content, source) = extract_content(raw);
        self.transform(&content, source, started)
    }

    fn update_tone(&mut self, update: ToneUpdate) {
        self.tone.apply(update);
    }

    fn current_tone(&self) -> ToneConfig {
        self.tone.clone()
    }
}
