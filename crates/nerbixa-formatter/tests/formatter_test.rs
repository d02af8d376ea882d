use nerbixa_formatter::cal_tracker::{CalTrackerToneUpdate, CalWarmth};
use nerbixa_formatter::friendly::ToneUpdate;
use nerbixa_formatter::nutritionist::DialogueToneUpdate;
use nerbixa_formatter::text::contains_emoji;
use nerbixa_formatter::{
    CalTrackerResponseFormatter, FriendlyResponseFormatter, NutritionistResponseFormatter,
    ResponseFormatter, Topic,
};

fn inputs() -> Vec<String> {
    vec![
        String::new(),
        "   ".to_string(),
        r#"{"dish":"Test","kcal":300,}"#.to_string(),
        r#"{"weather": "sunny", "temperature": 21}"#.to_string(),
        r#"[1, 2, 3]"#.to_string(),
        r#""a bare json string""#.to_string(),
        r#"{"output": "1. Eat more protein\n2. Drink water\nWhat is your goal?"}"#.to_string(),
        r#"{"dish":"Oat Bowl","kcal":320,"prot":11,"fat":7,"carb":55,"recipe":"Mix oats"}"#.to_string(),
        r#"{"calories": 410, "protein": 20, "fat": 15, "carb": 50}"#.to_string(),
        "To build muscle you need protein. ".repeat(400),
        "Отлично! Для набора мышечной массы важно:\n1. **Ешьте больше белка**\n2. Drink more water\nМогу рассчитать ваш рацион?".to_string(),
    ]
}

#[test]
fn test_friendly_always_populated() {
    let formatter = FriendlyResponseFormatter::default();

    for input in inputs() {
        let response = formatter.format_response(&input);
        assert!(!response.greeting.is_empty(), "greeting for {:?}", input);
        assert!(!response.main_content.is_empty(), "main content for {:?}", input);
        assert!(!response.action_items.is_empty(), "action items for {:?}", input);
        assert!(response.action_items.iter().all(|item| !item.is_empty()));
        assert!(!response.encouragement.is_empty(), "encouragement for {:?}", input);
        assert!(!response.next_steps.is_empty(), "next steps for {:?}", input);
        assert!(!response.emoji.is_empty());
        assert!((0.0..=1.0).contains(&response.metadata.confidence));
    }
}

#[test]
fn test_cal_tracker_always_populated() {
    let formatter = CalTrackerResponseFormatter::default();

    for input in inputs() {
        let response = formatter.format_response(&input);
        assert!(!response.greeting.is_empty(), "greeting for {:?}", input);
        assert!(!response.nutrition_summary.is_empty(), "summary for {:?}", input);
        assert!(!response.calorie_breakdown.total_calories.is_empty());
        assert_eq!(response.calorie_breakdown.macros.len(), 3);
        assert!(!response.health_insights.is_empty(), "insights for {:?}", input);
        assert!(!response.recommendations.is_empty(), "recommendations for {:?}", input);
        assert!(!response.encouragement.is_empty());
        assert!(!response.next_steps.is_empty());
        assert!(!response.food_name.is_empty());
    }
}

#[test]
fn test_nutritionist_always_succeeds() {
    let formatter = NutritionistResponseFormatter::default();

    for input in inputs() {
        let parsed = formatter.format_response(&input);
        assert!(parsed.success, "success for {:?}", input);
        assert!(parsed.data.enhanced.is_some() || parsed.data.raw_text.is_some());
        assert!(!parsed.dialogue.success_message.is_empty());
        assert!(!parsed.dialogue.display_text.is_empty());
        assert!(!parsed.dialogue.toast_message.is_empty());
        serde_json::to_string(&parsed).expect("parsed response serializes");
    }
}

#[test]
fn test_friendly_tone_isolation() {
    let input = "Great question! 🎉 Here is how to eat for muscle gain 💪\n1. 🥩 Eat more protein with every meal\n2. 💧 Drink plenty of water\n3. Watch your portion sizes 🍽️\nWould you like a meal plan? 📋";
    let mut formatter = FriendlyResponseFormatter::default();
    let with_emoji = formatter.format_response(input);

    formatter.update_tone(ToneUpdate {
        use_emojis: Some(false),
        ..Default::default()
    });
    let without_emoji = formatter.format_response(input);

    assert!(!contains_emoji(&without_emoji.greeting));
    assert!(!contains_emoji(&without_emoji.main_content));
    assert!(without_emoji.action_items.iter().all(|item| !contains_emoji(item)));
    assert!(!contains_emoji(&without_emoji.next_steps));
    assert!(!contains_emoji(&without_emoji.encouragement));
    assert!(without_emoji.action_items[0].contains("Eat more protein with every meal"));
    assert_eq!(with_emoji.action_items.len(), without_emoji.action_items.len());
    assert_eq!(with_emoji.topic, without_emoji.topic);
    assert_eq!(without_emoji.topic, Topic::MuscleBuilding);
}

#[test]
fn test_cal_tracker_tone_isolation() {
    let input = r#"{"dish": "Chicken Rice Bowl", "calories": 410, "protein": 20, "fat": 15, "carb": 50}"#;
    let mut formatter = CalTrackerResponseFormatter::default();
    let before = formatter.format_response(input);

    formatter.update_tone(CalTrackerToneUpdate {
        warmth: Some(CalWarmth::Friendly),
        use_emojis: Some(false),
        ..Default::default()
    });
    let after = formatter.format_response(input);

    assert!(!contains_emoji(&after.greeting));
    assert!(after.recommendations.iter().all(|item| !contains_emoji(item)));
    assert_eq!(before.calorie_breakdown, after.calorie_breakdown);
    assert_eq!(before.food_name, after.food_name);
}

#[test]
fn test_cal_tracker_text_tone_isolation() {
    let input = "🍳 Analyzing scrambled eggs nutrition.\n🔥 About 210 kcal with protein: 14g, fat 16g and carbs 2g per plate 🥚\n1. 🥑 Add avocado for healthy fats\n2. Serve with whole grain toast 🍞";
    let mut formatter = CalTrackerResponseFormatter::default();
    let before = formatter.format_response(input);

    formatter.update_tone(CalTrackerToneUpdate {
        use_emojis: Some(false),
        ..Default::default()
    });
    let after = formatter.format_response(input);

    assert!(!contains_emoji(&after.greeting));
    assert!(!contains_emoji(&after.nutrition_summary));
    assert!(after.health_insights.iter().all(|item| !contains_emoji(item)));
    assert!(after.recommendations.iter().all(|item| !contains_emoji(item)));
    assert!(!contains_emoji(&after.encouragement));
    assert!(!contains_emoji(&after.next_steps));
    assert_eq!(after.recommendations[0], "Add avocado for healthy fats");
    assert_eq!(before.calorie_breakdown, after.calorie_breakdown);
    assert_eq!(after.calorie_breakdown.total_calories, "210 calories");
}

#[test]
fn test_nutritionist_text_tone_isolation() {
    let input = "🥗 Try a big green salad tonight 🌿 with olive oil and lemon 🍋";
    let mut formatter = NutritionistResponseFormatter::default();
    let before = formatter.format_response(input);

    formatter.update_tone(DialogueToneUpdate {
        use_emojis: Some(false),
        ..Default::default()
    });
    let after = formatter.format_response(input);

    assert!(after.data.enhanced.is_none());
    assert!(!contains_emoji(&after.dialogue.success_message));
    assert!(!contains_emoji(&after.dialogue.display_text));
    assert!(!contains_emoji(&after.dialogue.toast_message));
    assert_eq!(before.data.raw_text, after.data.raw_text);
}

#[test]
fn test_nutritionist_tone_isolation() {
    let input = r#"{"dish":"Test Dish","kcal":420,"prot":15,"fat":18,"carb":52,"recipe":"1. Cook rice"}"#;
    let mut formatter = NutritionistResponseFormatter::default();
    let before = formatter.format_response(input);

    formatter.update_tone(DialogueToneUpdate {
        use_emojis: Some(false),
        ..Default::default()
    });
    let after = formatter.format_response(input);

    let (before, after) = (
        before.data.enhanced.expect("upgraded"),
        after.data.enhanced.expect("upgraded"),
    );
    assert!(!contains_emoji(&after.dialogue.greeting));
    assert!(after.dialogue.nutritional_insights.iter().all(|insight| !contains_emoji(insight)));
    assert_eq!(before.content.nutrition, after.content.nutrition);
    assert_eq!(before.content.meal_plan, after.content.meal_plan);
}

#[test]
fn test_macro_percentages() {
    let response = CalTrackerResponseFormatter::default()
        .format_response(r#"{"calories": 410, "protein": 20, "fat": 15, "carb": 50}"#);

    let percents: Vec<u32> = response
        .calorie_breakdown
        .macros
        .iter()
        .map(|entry| entry.percent.expect("percentage"))
        .collect();
    assert_eq!(percents, vec![19, 33, 48]);
    let total: u32 = percents.iter().sum();
    assert!((99..=101).contains(&total));
}
