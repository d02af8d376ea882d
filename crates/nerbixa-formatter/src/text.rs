//! Line-level text mining shared by every formatter.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NUMBERED_ITEM: Regex = Regex::new(r"^\d+[.)]\s*").unwrap();
    static ref QUESTION_CUE: Regex = Regex::new(
        r"(?i)\?|расскажете|можете|могу|рассчитать|let me know|tell me more|would you like"
    )
    .unwrap();
    static ref AGE_MENTION: Regex = Regex::new(
        r"(?i)\b(\d{1,3})\s*(?:-\s*)?(?:years?[\s-]+old|y/?o\b|лет\b|года?\b)"
    )
    .unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"[ \t]{2,}").unwrap();
}

/// Lines of a free-text answer sorted into buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinedText {
    /// Prose lines, markers stripped
    pub main: Vec<String>,
    /// Numbered list items without their number
    pub tips: Vec<String>,
    /// Lines that ask the user something
    pub questions: Vec<String>,
}

impl MinedText {
    pub fn main_text(&self) -> String {
        self.main.join(" ")
    }

    pub fn question_text(&self) -> String {
        self.questions.join(" ")
    }
}

/// Removes `**`, `*` and `#`, turns em-dashes into hyphens and trims.
pub fn strip_markers(text: &str) -> String {
    let cleaned = text
        .replace("**", "")
        .replace('*', "")
        .replace('#', "")
        .replace('\u{2014}', "-");
    WHITESPACE_RUN.replace_all(cleaned.trim(), " ").into_owned()
}

/// Text of a numbered list item (`1. foo`, `2) bar`), markers stripped.
pub fn numbered_item(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let found = NUMBERED_ITEM.find(trimmed)?;
    let item = strip_markers(&trimmed[found.end()..]);
    (!item.is_empty()).then_some(item)
}

pub fn is_question(line: &str) -> bool {
    QUESTION_CUE.is_match(line)
}

/// Splits `content` into prose, numbered items and questions. Prose lines
/// shorter than `min_prose_chars` are dropped.
pub fn mine(content: &str, min_prose_chars: usize) -> MinedText {
    let mut mined = MinedText::default();

    for line in content.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(item) = numbered_item(line) {
            mined.tips.push(item);
        } else if is_question(line) {
            let question = strip_markers(line);
            if !question.is_empty() {
                mined.questions.push(question);
            }
        } else {
            let prose = strip_markers(line);
            if prose.chars().count() > min_prose_chars {
                mined.main.push(prose);
            }
        }
    }

    mined
}

/// Age the user mentions about themselves, if any.
pub fn age_mention(text: &str) -> Option<u32> {
    AGE_MENTION
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .find(|age| (1..=120).contains(age))
}

fn is_emoji_char(c: char) -> bool {
    matches!(
        c as u32,
        0x1F000..=0x1FAFF | 0x2300..=0x23FF | 0x2600..=0x27BF | 0x2B00..=0x2BFF | 0xFE0F | 0x200D
    )
}

pub fn contains_emoji(text: &str) -> bool {
    text.chars().any(is_emoji_char)
}

/// Drops emoji characters and tidies the spacing they leave behind.
pub fn strip_emoji(text: &str) -> String {
    let without: String = text.chars().filter(|c| !is_emoji_char(*c)).collect();
    WHITESPACE_RUN.replace_all(without.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markers() {
        assert_eq!(strip_markers("**Bold** and *italic*"), "Bold and italic");
        assert_eq!(strip_markers("## Header \u{2014} part"), "Header - part");
        assert_eq!(strip_markers("   "), "");
    }

    #[test]
    fn test_numbered_item() {
        assert_eq!(numbered_item("1. **Eat more protein**"), Some("Eat more protein".into()));
        assert_eq!(numbered_item("   2) Drink water"), Some("Drink water".into()));
        assert_eq!(numbered_item("3."), None);
        assert_eq!(numbered_item("Step one"), None);
    }

    #[test]
    fn test_mine_indented_list() {
        let content = "Отлично! Для набора мышечной массы важно:\n\n    1. **Ешьте больше белка**\n    2. **Контролируйте калории**\n    3. **Регулярно тренируйтесь**\n\nМогу рассчитать ваш рацион.";
        let mined = mine(content, 10);

        assert_eq!(mined.tips.len(), 3);
        assert_eq!(mined.tips[0], "Ешьте больше белка");
        assert_eq!(mined.questions, vec!["Могу рассчитать ваш рацион."]);
        assert_eq!(mined.main.len(), 1);
    }

    #[test]
    fn test_mine_drops_short_prose() {
        let mined = mine("Hi there\nThis line is definitely long enough", 10);
        assert_eq!(mined.main, vec!["This line is definitely long enough"]);
    }

    #[test]
    fn test_question_detection() {
        assert!(is_question("What is your weight?"));
        assert!(is_question("Можете рассказать больше"));
        assert!(is_question("Let me know your goals"));
        assert!(!is_question("Eat vegetables daily"));
    }

    #[test]
    fn test_age_mention() {
        assert_eq!(age_mention("I'm 35 years old and want to get fit"), Some(35));
        assert_eq!(age_mention("Мне 42 года"), Some(42));
        assert_eq!(age_mention("a 28-year-old runner"), Some(28));
        assert_eq!(age_mention("I ate 300 grams"), None);
        assert_eq!(age_mention("999 years old"), None);
    }

    #[test]
    fn test_emoji_helpers() {
        assert!(contains_emoji("💪 Strong"));
        assert!(contains_emoji("Scale ⚖️"));
        assert!(!contains_emoji("• plain bullet → arrow"));
        assert_eq!(strip_emoji("🌟 Amazing  work! 🎉"), "Amazing work!");
    }
}
