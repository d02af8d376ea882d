//! Output formatting utilities

use colored::Colorize;
use nerbixa_formatter::{CalTrackerResponse, FriendlyResponse, ParsedResponse};
use serde::Serialize;
use std::fmt::Write;

/// Output format types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// Serialize a value for the machine-readable formats
pub fn format_structured<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        OutputFormat::Json | OutputFormat::Text => Ok(serde_json::to_string_pretty(value)?),
    }
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a dimmed message
pub fn dimmed(message: &str) {
    eprintln!("{}", message.dimmed());
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title.bold().underline());
}

fn bullets(out: &mut String, items: &[String]) {
    for item in items {
        let _ = writeln!(out, "  • {}", item);
    }
}

fn numbered(out: &mut String, items: &[String]) {
    for (index, item) in items.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", index + 1, item);
    }
}

/// Render a conversational answer
pub fn render_friendly(response: &FriendlyResponse) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", response.greeting.bold());
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", response.main_content);

    section(&mut out, "Action items");
    numbered(&mut out, &response.action_items);

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", response.encouragement.green());
    let _ = writeln!(out, "{}", response.next_steps.dimmed());
    out
}

/// Render a calorie breakdown. Macro emoji are left out when `show_emoji` is off.
pub fn render_cal_tracker(response: &CalTrackerResponse, show_emoji: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", response.greeting.bold());
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", response.nutrition_summary);

    section(&mut out, &format!("Calorie breakdown: {}", response.food_name));
    let _ = writeln!(
        out,
        "  {}: {}",
        "Total".bold(),
        response.calorie_breakdown.total_calories
    );
    for entry in &response.calorie_breakdown.macros {
        let label = if show_emoji && !entry.emoji.is_empty() {
            format!("{} {}", entry.emoji, entry.name)
        } else {
            entry.name.clone()
        };
        let _ = writeln!(out, "  {}: {} ({})", label.bold(), entry.value, entry.percentage);
    }

    section(&mut out, "Insights");
    bullets(&mut out, &response.health_insights);

    section(&mut out, "Recommendations");
    bullets(&mut out, &response.recommendations);

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", response.encouragement.green());
    let _ = writeln!(out, "{}", response.next_steps.dimmed());
    out
}

/// Render a recipe answer, v2 document or raw text
pub fn render_nutritionist(parsed: &ParsedResponse) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", parsed.dialogue.success_message.bold());

    match (&parsed.data.enhanced, &parsed.data.raw_text) {
        (Some(document), _) => {
            let meal = &document.content.meal_plan;
            let nutrition = &document.content.nutrition;
            let macros = &nutrition.macronutrients;
            let instructions = &document.content.instructions;

            let _ = writeln!(out);
            let _ = writeln!(out, "{}", document.dialogue.greeting);
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", meal.name.bold().cyan());
            let _ = writeln!(out, "{}", meal.description);
            let _ = writeln!(
                out,
                "{}",
                format!(
                    "{} min · {:?} · serves {}",
                    meal.preparation_time_minutes, meal.difficulty_level, meal.serving_size
                )
                .dimmed()
            );

            section(&mut out, "Nutrition");
            let _ = writeln!(out, "  Calories: {} kcal", nutrition.calories.total);
            let _ = writeln!(out, "  Protein: {} g", macros.protein.grams);
            let _ = writeln!(out, "  Carbohydrates: {} g", macros.carbohydrates.grams);
            let _ = writeln!(out, "  Fat: {} g", macros.fat.grams);
            let _ = writeln!(out, "  Health score: {}/100", nutrition.health_score);

            if !instructions.ingredients_list.is_empty() {
                section(&mut out, "Ingredients");
                bullets(&mut out, &instructions.ingredients_list);
            }

            if !instructions.quick_summary.is_empty() {
                section(&mut out, "Quick summary");
                let _ = writeln!(out, "  {}", instructions.quick_summary);
            }

            if let Some(tips) = instructions.cooking_tips.as_ref().filter(|tips| !tips.is_empty()) {
                section(&mut out, "Cooking tips");
                bullets(&mut out, tips);
            }

            section(&mut out, "Recipe");
            let _ = writeln!(out, "{}", instructions.full_recipe);

            if !document.dialogue.nutritional_insights.is_empty() {
                section(&mut out, "Insights");
                bullets(&mut out, &document.dialogue.nutritional_insights);
            }

            let _ = writeln!(out);
            let _ = writeln!(out, "{}", document.dialogue.encouragement.green());
            let _ = writeln!(out, "{}", document.dialogue.closing_message);
        }
        (None, Some(text)) => {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", text);
        }
        (None, None) => {}
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", parsed.dialogue.toast_message.dimmed());
    out
}

/// Format duration in human-readable format
pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60_000;
        let seconds = (ms % 60_000) / 1000;
        format!("{}m {}s", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nerbixa_formatter::cal_tracker::CalTrackerToneUpdate;
    use nerbixa_formatter::{
        CalTrackerResponseFormatter, FriendlyResponseFormatter, NutritionistResponseFormatter,
        ResponseFormatter,
    };

    #[test]
    fn test_output_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("YML".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!("plain".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(250), "250ms");
        assert_eq!(format_duration(2300), "2.3s");
        assert_eq!(format_duration(125_000), "2m 5s");
    }

    #[test]
    fn test_format_structured_yaml() {
        let parsed = NutritionistResponseFormatter::default().format_response("Just eat well");
        let yaml = format_structured(&parsed, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("version: '1.0'") || yaml.contains("version: \"1.0\""));
        assert!(yaml.contains("rawText: Just eat well"));
    }

    #[test]
    fn test_render_friendly_lists_actions() {
        let response = FriendlyResponseFormatter::default()
            .format_response("1. Eat more protein with every meal\n2. Drink plenty of water");
        let text = render_friendly(&response);
        assert!(text.contains("1. "));
        assert!(text.contains("Action items"));
    }

    #[test]
    fn test_render_cal_tracker_hides_macro_emoji() {
        let mut formatter = CalTrackerResponseFormatter::default();
        formatter.update_tone(CalTrackerToneUpdate {
            use_emojis: Some(false),
            ..Default::default()
        });
        let response = formatter
            .format_response(r#"{"calories": 410, "protein": 20, "fat": 15, "carb": 50}"#);
        let emoji = response.calorie_breakdown.macros[1].emoji.clone();

        let with_emoji = render_cal_tracker(&response, true);
        let without_emoji = render_cal_tracker(&response, false);

        assert!(with_emoji.contains(&emoji));
        assert!(!without_emoji.contains(&emoji));
        assert!(without_emoji.contains("Recommendations"));
    }

    #[test]
    fn test_render_nutritionist_recipe() {
        let parsed = NutritionistResponseFormatter::default().format_response(
            r#"{"dish":"Oat Bowl","kcal":320,"prot":11,"fat":7,"carb":55,"recipe":"1. Mix oats\n2. Add berries"}"#,
        );
        let text = render_nutritionist(&parsed);
        assert!(text.contains("Oat Bowl"));
        assert!(text.contains("Calories: 320 kcal"));
        assert!(text.contains("Add berries"));
    }

    #[test]
    fn test_render_nutritionist_raw_text() {
        let parsed = NutritionistResponseFormatter::default().format_response("Plain advice here");
        let text = render_nutritionist(&parsed);
        assert!(text.contains("Plain advice here"));
    }
}
