//! Topic classification module.
//!
//! Keyword table is ordered; the first topic whose pattern matches wins. The
//! result never depends on tone settings.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// What a piece of advice is mainly about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    MuscleBuilding,
    WeightLoss,
    Energy,
    /// Fallback when no keyword matches
    Nutrition,
}

impl Topic {
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::MuscleBuilding => "💪",
            Self::WeightLoss => "⚖️",
            Self::Energy => "⚡",
            Self::Nutrition => "🥗",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::MuscleBuilding => "Muscle building and protein intake",
            Self::WeightLoss => "Weight management and calorie balance",
            Self::Energy => "Energy levels and fatigue",
            Self::Nutrition => "General nutrition",
        }
    }
}

#[derive(Debug)]
struct TopicPattern {
    regex: Regex,
    topic: Topic,
}

lazy_static! {
    static ref TOPIC_PATTERNS: Vec<TopicPattern> = vec![
        TopicPattern {
            regex: Regex::new(r"(?i)muscle|protein|strength|bulk|мышц|массы|белок|белк").unwrap(),
            topic: Topic::MuscleBuilding,
        },
        TopicPattern {
            regex: Regex::new(r"(?i)weight|calori|slim|похуд|\bвес\b|калори").unwrap(),
            topic: Topic::WeightLoss,
        },
        TopicPattern {
            regex: Regex::new(r"(?i)energy|boost|fatigue|tired|энерг|бодрост|усталост").unwrap(),
            topic: Topic::Energy,
        },
    ];
}

/// Classifies `text` against the fixed keyword table.
pub fn classify(text: &str) -> Topic {
    let topic = TOPIC_PATTERNS
        .iter()
        .find(|pattern| pattern.regex.is_match(text))
        .map(|pattern| pattern.topic)
        .unwrap_or(Topic::Nutrition);
    trace!(?topic, "Classified topic");
    topic
}
