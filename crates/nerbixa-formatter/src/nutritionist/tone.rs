//! Dialogue tone for the nutritionist formatter.

use crate::text::strip_emoji;
use crate::{decorate, pick, Phrase};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    Professional,
    #[default]
    Friendly,
    Playful,
    Enthusiastic,
}

impl Personality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Personality::Professional => "professional",
            Personality::Friendly => "friendly",
            Personality::Playful => "playful",
            Personality::Enthusiastic => "enthusiastic",
        }
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Personality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "professional" => Ok(Personality::Professional),
            "friendly" => Ok(Personality::Friendly),
            "playful" => Ok(Personality::Playful),
            "enthusiastic" => Ok(Personality::Enthusiastic),
            other => Err(format!("unknown tone preset: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HumorLevel {
    None,
    Subtle,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncouragementStyle {
    Supportive,
    Motivational,
    Celebratory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechnicalDepth {
    Basic,
    Intermediate,
    Advanced,
}

/// Phrases that replace the built-in pools when non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomPhrases {
    pub greetings: Vec<String>,
    pub encouragements: Vec<String>,
    pub closings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueToneConfig {
    pub personality: Personality,
    pub use_emojis: bool,
    pub humor_level: HumorLevel,
    pub encouragement_style: EncouragementStyle,
    pub technical_depth: TechnicalDepth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_phrases: Option<CustomPhrases>,
}

fn phrases(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

impl DialogueToneConfig {
    pub fn preset(personality: Personality) -> Self {
        match personality {
            Personality::Professional => Self::professional(),
            Personality::Friendly => Self::friendly(),
            Personality::Playful => Self::playful(),
            Personality::Enthusiastic => Self::enthusiastic(),
        }
    }

    pub fn professional() -> Self {
        Self {
            personality: Personality::Professional,
            use_emojis: false,
            humor_level: HumorLevel::None,
            encouragement_style: EncouragementStyle::Supportive,
            technical_depth: TechnicalDepth::Advanced,
            custom_phrases: None,
        }
    }

    pub fn friendly() -> Self {
        Self {
            personality: Personality::Friendly,
            use_emojis: true,
            humor_level: HumorLevel::Subtle,
            encouragement_style: EncouragementStyle::Supportive,
            technical_depth: TechnicalDepth::Intermediate,
            custom_phrases: None,
        }
    }

    pub fn playful() -> Self {
        Self {
            personality: Personality::Playful,
            use_emojis: true,
            humor_level: HumorLevel::Moderate,
            encouragement_style: EncouragementStyle::Celebratory,
            technical_depth: TechnicalDepth::Basic,
            custom_phrases: Some(CustomPhrases {
                greetings: phrases(&[
                    "🎉 Wonderful! I've crafted something special just for you!",
                    "✨ Ta-da! Your personalized nutrition plan is ready!",
                    "🌟 Look what we've cooked up together!",
                    "🎪 Step right up to see your amazing meal plan!",
                ]),
                encouragements: phrases(&[
                    "You're going to absolutely love this!",
                    "This is going to be deliciously good for you!",
                    "Your taste buds AND your body will thank you!",
                    "Get ready for some serious yumminess!",
                ]),
                closings: phrases(&[
                    "Happy cooking, nutrition superstar! 🌟",
                    "Go forth and create delicious magic! ✨",
                    "Your wellness journey just got a whole lot tastier! 🚀",
                    "Time to turn your kitchen into a nutrition playground! 🎨",
                ]),
            }),
        }
    }

    pub fn enthusiastic() -> Self {
        Self {
            personality: Personality::Enthusiastic,
            use_emojis: true,
            humor_level: HumorLevel::High,
            encouragement_style: EncouragementStyle::Motivational,
            technical_depth: TechnicalDepth::Intermediate,
            custom_phrases: Some(CustomPhrases {
                greetings: phrases(&[
                    "🚀 BOOM! Your amazing nutrition plan has landed!",
                    "🎯 NAILED IT! Here's your perfect meal solution!",
                    "⚡ ZAP! Fresh nutrition wisdom, coming right up!",
                    "🔥 HOT OFF THE PRESS! Your custom wellness recipe!",
                ]),
                encouragements: phrases(&[
                    "This is going to ROCK your wellness world!",
                    "You're about to become a nutrition LEGEND!",
                    "Your future self will high-five you for this!",
                    "Prepare for some serious health GAINS!",
                ]),
                closings: phrases(&[
                    "Now GO make it happen, wellness warrior! 💪",
                    "Your journey to awesome starts NOW! 🌟",
                    "Time to show the world your nutrition prowess! 🎉",
                    "Let's turn this plan into PURE GOLD! ✨",
                ]),
            }),
        }
    }

    pub fn apply(&mut self, update: DialogueToneUpdate) {
        if let Some(personality) = update.personality {
            self.personality = personality;
        }
        if let Some(use_emojis) = update.use_emojis {
            self.use_emojis = use_emojis;
        }
        if let Some(humor_level) = update.humor_level {
            self.humor_level = humor_level;
        }
        if let Some(encouragement_style) = update.encouragement_style {
            self.encouragement_style = encouragement_style;
        }
        if let Some(technical_depth) = update.technical_depth {
            self.technical_depth = technical_depth;
        }
        if let Some(custom_phrases) = update.custom_phrases {
            self.custom_phrases = custom_phrases;
        }
    }

    pub fn greeting(&self) -> String {
        self.custom(|phrases| &phrases.greetings).unwrap_or_else(|| {
            let phrase = match self.personality {
                Personality::Professional => {
                    Phrase::plain("Your personalized nutrition plan has been prepared.")
                }
                Personality::Friendly => {
                    Phrase::new("😊", "Great! I've created a wonderful meal plan just for you!")
                }
                Personality::Playful => {
                    Phrase::new("🎉", "Ta-da! Your delicious nutrition adventure awaits!")
                }
                Personality::Enthusiastic => {
                    Phrase::new("🚀", "AMAZING! Your perfect meal plan is ready to rock!")
                }
            };
            phrase.render(self.use_emojis)
        })
    }

    pub fn encouragement(&self) -> String {
        self.custom(|phrases| &phrases.encouragements).unwrap_or_else(|| {
            let phrase = match self.personality {
                Personality::Professional => {
                    Phrase::plain("This plan is optimized for your nutritional needs.")
                }
                Personality::Friendly => {
                    Phrase::new("💪", "You're going to love how this makes you feel!")
                }
                Personality::Playful => Phrase::new("✨", "This is going to be absolutely delicious!"),
                Personality::Enthusiastic => {
                    Phrase::new("🔥", "This plan is going to TRANSFORM your wellness game!")
                }
            };
            phrase.render(self.use_emojis)
        })
    }

    pub fn closing(&self) -> String {
        self.custom(|phrases| &phrases.closings).unwrap_or_else(|| {
            let phrase = match self.personality {
                Personality::Professional => Phrase::plain("Enjoy preparing your meal."),
                Personality::Friendly => {
                    Phrase::new("🍽️", "Enjoy every bite of your healthy creation!")
                }
                Personality::Playful => Phrase::new("🎨", "Have fun in the kitchen!"),
                Personality::Enthusiastic => Phrase::new("💪", "Go crush it in the kitchen!"),
            };
            phrase.render(self.use_emojis)
        })
    }

    /// Decorates `text` when emojis are on.
    pub(crate) fn decorate(&self, emoji: &str, text: &str) -> String {
        decorate(self.use_emojis, emoji, text)
    }

    fn custom(&self, pool: impl Fn(&CustomPhrases) -> &Vec<String>) -> Option<String> {
        let phrase = pick(pool(self.custom_phrases.as_ref()?))?;
        Some(if self.use_emojis {
            phrase.clone()
        } else {
            strip_emoji(phrase)
        })
    }
}

impl Default for DialogueToneConfig {
    fn default() -> Self {
        Self::friendly()
    }
}

/// Partial tone change. `custom_phrases: Some(None)` clears custom phrases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueToneUpdate {
    pub personality: Option<Personality>,
    pub use_emojis: Option<bool>,
    pub humor_level: Option<HumorLevel>,
    pub encouragement_style: Option<EncouragementStyle>,
    pub technical_depth: Option<TechnicalDepth>,
    pub custom_phrases: Option<Option<CustomPhrases>>,
}

impl From<DialogueToneConfig> for DialogueToneUpdate {
    fn from(tone: DialogueToneConfig) -> Self {
        Self {
            personality: Some(tone.personality),
            use_emojis: Some(tone.use_emojis),
            humor_level: Some(tone.humor_level),
            encouragement_style: Some(tone.encouragement_style),
            technical_depth: Some(tone.technical_depth),
            custom_phrases: Some(tone.custom_phrases),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::contains_emoji;

    #[test]
    fn test_presets() {
        assert_eq!(DialogueToneConfig::default().personality, Personality::Friendly);
        assert!(!DialogueToneConfig::professional().use_emojis);
        assert!(DialogueToneConfig::playful().custom_phrases.is_some());
        assert_eq!(
            DialogueToneConfig::preset(Personality::Enthusiastic).humor_level,
            HumorLevel::High
        );
        assert_eq!("Playful".parse::<Personality>(), Ok(Personality::Playful));
        assert!("grumpy".parse::<Personality>().is_err());
    }

    #[test]
    fn test_professional_has_no_emoji() {
        let tone = DialogueToneConfig::professional();
        assert_eq!(tone.greeting(), "Your personalized nutrition plan has been prepared.");
        assert!(!contains_emoji(&tone.encouragement()));
        assert!(!contains_emoji(&tone.closing()));
    }

    #[test]
    fn test_custom_phrases_override_pools() {
        let tone = DialogueToneConfig::playful();
        let greetings = &tone.custom_phrases.as_ref().unwrap().greetings;
        assert!(greetings.contains(&tone.greeting()));
    }

    #[test]
    fn test_custom_phrases_lose_emoji_when_disabled() {
        let mut tone = DialogueToneConfig::enthusiastic();
        tone.apply(DialogueToneUpdate {
            use_emojis: Some(false),
            ..Default::default()
        });

        for _ in 0..10 {
            assert!(!contains_emoji(&tone.greeting()));
            assert!(!contains_emoji(&tone.closing()));
        }
    }

    #[test]
    fn test_update_clears_custom_phrases() {
        let mut tone = DialogueToneConfig::playful();
        tone.apply(DialogueToneUpdate {
            custom_phrases: Some(None),
            ..Default::default()
        });
        assert_eq!(tone.greeting(), "🎉 Ta-da! Your delicious nutrition adventure awaits!");
    }

    #[test]
    fn test_full_replacement_via_update() {
        let mut tone = DialogueToneConfig::default();
        tone.apply(DialogueToneConfig::professional().into());
        assert_eq!(tone, DialogueToneConfig::professional());
    }
}
