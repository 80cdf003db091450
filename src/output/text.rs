// ABOUTME: Plain-text helpers shared by the formatter
// ABOUTME: Emoji stripping, status badges, and id shortening for table output

use crate::runtime::RunStatus;

/// Removes emoji so names line up in tables; the icon column already
/// carries the glyph. Surrounding whitespace is trimmed afterwards.
pub fn strip_emojis(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| !is_emoji(*c)).collect();
    stripped.trim().to_string()
}

fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F300..=0x1F5FF
            | 0x1F600..=0x1F64F
            | 0x1F680..=0x1F6FF
            | 0x1F1E0..=0x1F1FF
            | 0x1F900..=0x1F9FF
            | 0x1FA00..=0x1FAFF
            | 0x2600..=0x27BF
            | 0xFE00..=0xFE0F
            | 0x231A..=0x231B
            | 0x23E9..=0x23F3
            | 0x23F8..=0x23FA
            | 0x25AA..=0x25AB
            | 0x25B6
            | 0x25C0
            | 0x25FB..=0x25FE
            | 0x2934..=0x2935
            | 0x2B05..=0x2B07
            | 0x2B1B..=0x2B1C
            | 0x2B50
            | 0x2B55
            | 0x3030
            | 0x303D
            | 0x3297
            | 0x3299
    )
}

/// Table display name: emoji stripped, falling back to the raw name
/// when nothing is left.
pub fn display_name(name: &str) -> String {
    let stripped = strip_emojis(name);
    if stripped.is_empty() {
        name.trim().to_string()
    } else {
        stripped
    }
}

pub fn status_badge(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Running => "▶ running",
        RunStatus::Idle => "· idle",
        RunStatus::Overdue => "⚠ overdue",
        RunStatus::Completed => "✓ completed",
    }
}

/// First characters of an id, enough to reference a run on the command
/// line without pasting the whole thing.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(12) {
        Some((index, _)) => &id[..index],
        None => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_emojis_removes_single_emoji() {
        assert_eq!(strip_emojis("Hello 👋 World"), "Hello  World");
    }

    #[test]
    fn test_strip_emojis_removes_multiple_emojis() {
        assert_eq!(strip_emojis("🎉 Party 🎊 Time 🥳"), "Party  Time");
    }

    #[test]
    fn test_strip_emojis_handles_emoji_only_text() {
        assert_eq!(strip_emojis("🔥🚀💯"), "");
    }

    #[test]
    fn test_strip_emojis_keeps_plain_text() {
        assert_eq!(strip_emojis("Hello World"), "Hello World");
        assert_eq!(strip_emojis(""), "");
    }

    #[test]
    fn test_strip_emojis_cleans_step_titles() {
        assert_eq!(strip_emojis("📹 Download Zoom Replay"), "Download Zoom Replay");
        assert_eq!(strip_emojis("Task ✅ Done"), "Task  Done");
    }

    #[test]
    fn test_display_name_falls_back_for_emoji_only_names() {
        assert_eq!(display_name("🚀🚀"), "🚀🚀");
        assert_eq!(display_name("🚀 Launch"), "Launch");
    }

    #[test]
    fn test_short_id_truncates_long_ids() {
        assert_eq!(short_id("run_0123456789abcdef"), "run_01234567");
        assert_eq!(short_id("42"), "42");
    }
}
