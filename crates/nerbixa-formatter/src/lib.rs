//! Response formatters for Nerbixa
//!
//! Upstream automations answer with free text, loosely typed JSON or one of a
//! few known document shapes. Each formatter turns that raw string into a
//! fully populated, presentation-ready value:
//!
//! - [`FriendlyResponseFormatter`] for conversational nutrition advice
//! - [`CalTrackerResponseFormatter`] for calorie and macro breakdowns
//! - [`NutritionistResponseFormatter`] for legacy and v2 recipe documents
//!
//! All three try structured JSON first, fall back to text mining, and never
//! fail outward. Tone settings change wording only.

pub mod cal_tracker;
pub mod error;
pub mod friendly;
pub mod nutritionist;
pub mod text;
pub mod topic;

pub use cal_tracker::{CalTrackerResponse, CalTrackerResponseFormatter, CalTrackerTone};
pub use error::FormatError;
pub use friendly::{FriendlyResponse, FriendlyResponseFormatter, ToneConfig};
pub use nutritionist::{NutritionistResponseFormatter, ParsedResponse};
pub use topic::{classify, Topic};

use rand::seq::SliceRandom;
use serde::Serialize;
use std::time::Instant;

/// Confidence tiers by parse path.
pub mod confidence {
    /// Every field of a known schema matched.
    pub const STRUCTURED: f64 = 0.9;
    /// Known schema with missing parts, or a legacy document.
    pub const PARTIAL: f64 = 0.7;
    /// Valid JSON of an unknown shape.
    pub const GENERIC: f64 = 0.3;
    /// Free text.
    pub const TEXT: f64 = 0.2;
}

/// Common surface of the formatters.
pub trait ResponseFormatter {
    type Output: Serialize;
    type Tone: Clone;
    type ToneUpdate;

    /// Formats a raw upstream answer. Never fails.
    fn format_response(&self, raw: &str) -> Self::Output;

    /// Merges a partial tone update into the current tone.
    fn update_tone(&mut self, update: Self::ToneUpdate);

    fn current_tone(&self) -> Self::Tone;
}

/// How an output was produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatMetadata {
    pub fallback_used: bool,
    pub confidence: f64,
    pub parse_time_ms: f64,
}

impl FormatMetadata {
    pub(crate) fn finish(started: Instant, fallback_used: bool, confidence: f64) -> Self {
        Self {
            fallback_used,
            confidence,
            parse_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        }
    }
}

/// A message with an optional leading emoji.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Phrase {
    pub emoji: &'static str,
    pub text: &'static str,
}

impl Phrase {
    pub(crate) const fn new(emoji: &'static str, text: &'static str) -> Self {
        Self { emoji, text }
    }

    pub(crate) const fn plain(text: &'static str) -> Self {
        Self { emoji: "", text }
    }

    pub(crate) fn render(&self, use_emojis: bool) -> String {
        decorate(use_emojis, self.emoji, self.text)
    }
}

/// Prefixes `text` with `emoji` when emojis are on.
pub(crate) fn decorate(use_emojis: bool, emoji: &str, text: &str) -> String {
    if use_emojis && !emoji.is_empty() {
        format!("{} {}", emoji, text)
    } else {
        text.to_string()
    }
}

pub(crate) fn pick<T>(pool: &[T]) -> Option<&T> {
    pool.choose(&mut rand::thread_rng())
}

/// Renders a random phrase from `pool`, or an empty string for an empty pool.
pub(crate) fn pick_phrase(pool: &[Phrase], use_emojis: bool) -> String {
    pick(pool)
        .map(|phrase| phrase.render(use_emojis))
        .unwrap_or_default()
}

/// `20` for whole values, `12.5` otherwise.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decorate() {
        assert_eq!(decorate(true, "💪", "Strong"), "💪 Strong");
        assert_eq!(decorate(false, "💪", "Strong"), "Strong");
        assert_eq!(decorate(true, "", "Plain"), "Plain");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(20.0), "20");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn test_pick_phrase_from_pool() {
        let pool = [Phrase::new("🌟", "One"), Phrase::plain("Two")];
        let rendered = pick_phrase(&pool, false);
        assert!(rendered == "One" || rendered == "Two");
        assert_eq!(pick_phrase(&[], true), "");
    }
}
