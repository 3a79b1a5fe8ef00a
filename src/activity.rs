use ratatui::style::Color;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Activities offered in the edit form, in display order.
pub const ALL_ACTIVITIES: [&str; 8] = [
    "물주기",
    "잎정리",
    "분갈이",
    "비료주기",
    "가지치기",
    "해충방제",
    "수확",
    "기타",
];

/// Number of tags shown on a calendar day before collapsing into `+N`.
pub const VISIBLE_TAGS: usize = 2;

pub const NEUTRAL_COLOR: Color = Color::Rgb(0x9C, 0xA3, 0xAF);
pub const OVERFLOW_COLOR: Color = Color::Rgb(0xE5, 0xE7, 0xEB);

pub fn activity_color(activity: &str) -> Color {
    match activity {
        "물주기" => Color::Rgb(0x3B, 0x82, 0xF6),
        "잎정리" => Color::Rgb(0x22, 0xC5, 0x5E),
        "분갈이" => Color::Rgb(0xF9, 0x73, 0x16),
        "비료주기" => Color::Rgb(0xFB, 0xBF, 0x24),
        "가지치기" => Color::Rgb(0xA8, 0x55, 0xF7),
        "해충방제" => Color::Rgb(0xEF, 0x44, 0x44),
        "수확" => Color::Rgb(0xFF, 0x87, 0xF3),
        _ => NEUTRAL_COLOR,
    }
}

/// What a calendar cell shows for one date's tags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagSummary<'a> {
    pub shown: Vec<&'a str>,
    pub overflow: Option<usize>,
}

impl<'a> TagSummary<'a> {
    pub fn of(tags: &'a [String]) -> Self {
        let shown = tags.iter().take(VISIBLE_TAGS).map(String::as_str).collect();
        let overflow = tags.len().checked_sub(VISIBLE_TAGS).filter(|&n| n > 0);
        TagSummary { shown, overflow }
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }

    pub fn overflow_label(&self) -> Option<String> {
        self.overflow.map(|n| format!("+{n}"))
    }

    /// Labels with their colors for a cell `width` cells wide, overflow last.
    /// Tag names are cut to fit; a `+N` that does not fit is left out.
    pub fn labels(&self, width: usize) -> Vec<(String, Color)> {
        let mut labels: Vec<(String, Color)> = self
            .shown
            .iter()
            .map(|tag| (truncate_to_width(tag, width), activity_color(tag)))
            .collect();
        if let Some(more) = self.overflow_label().filter(|more| more.width() <= width) {
            labels.push((more, OVERFLOW_COLOR));
        }
        labels
    }
}

/// Cuts `text` to at most `width` terminal cells.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= width
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn three_tags_show_two_and_plus_one() {
        let tags = tags(&["물주기", "잎정리", "분갈이"]);
        let summary = TagSummary::of(&tags);
        assert_eq!(summary.shown, vec!["물주기", "잎정리"]);
        assert_eq!(summary.overflow_label().as_deref(), Some("+1"));
        assert_eq!(summary.labels(10).len(), 3);
    }

    #[test]
    fn few_tags_have_no_overflow() {
        let none: Vec<String> = Vec::new();
        let summary = TagSummary::of(&none);
        assert!(summary.is_empty());
        assert!(summary.labels(10).is_empty());

        let one = tags(&["수확"]);
        assert_eq!(TagSummary::of(&one).overflow, None);

        let two = tags(&["수확", "기타"]);
        assert_eq!(TagSummary::of(&two).overflow, None);
    }

    #[test]
    fn overflow_counts_the_rest() {
        let all: Vec<String> = ALL_ACTIVITIES.iter().map(|a| a.to_string()).collect();
        assert_eq!(TagSummary::of(&all).overflow_label().as_deref(), Some("+6"));
    }

    #[test]
    fn narrow_cells_cut_tags_but_never_the_count() {
        let all: Vec<String> = ALL_ACTIVITIES.iter().map(|a| a.to_string()).collect();
        let mut many = all.clone();
        many.extend(all.iter().cloned());
        let summary = TagSummary::of(&many);
        assert_eq!(summary.overflow_label().as_deref(), Some("+14"));

        let labels: Vec<String> = summary.labels(3).into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["물", "잎", "+14"]);

        let labels: Vec<String> = summary.labels(2).into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["물", "잎"]);
    }

    #[test]
    fn truncation_respects_wide_chars() {
        assert_eq!(truncate_to_width("물주기", 5), "물주");
        assert_eq!(truncate_to_width("물주기", 6), "물주기");
        assert_eq!(truncate_to_width("기타", 1), "");
    }

    #[test]
    fn unknown_tags_fall_back_to_neutral() {
        assert_eq!(activity_color("기타"), NEUTRAL_COLOR);
        assert_eq!(activity_color("watering"), NEUTRAL_COLOR);
        assert_eq!(activity_color(""), NEUTRAL_COLOR);
        assert_ne!(activity_color("물주기"), NEUTRAL_COLOR);
    }
}
