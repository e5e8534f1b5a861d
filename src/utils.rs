

/// Char-safe preview of a customer message for log lines.
#[inline]
pub fn preview(s: &str, max_chars: usize) -> String {
    let mut chars = s.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_message_untouched() {
        assert_eq!(preview("Где мой кэшбэк?", 50), "Где мой кэшбэк?");
    }

    #[test]
    fn test_preview_cyrillic_boundary() {
        assert_eq!(preview("Как открыть вклад", 6), "Как от...");
    }

    #[test]
    fn test_preview_exact_length() {
        assert_eq!(preview("карта", 5), "карта");
    }
}
