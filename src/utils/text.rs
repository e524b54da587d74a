//! Text helpers shared by the logging call sites

/// Cut a text to at most `max_chars` characters for a log line
pub fn truncate_for_log(input: &str, max_chars: usize) -> String {
    let char_count = input.chars().count();
    if char_count <= max_chars {
        return input.to_string();
    }
    let mut preview: String = input.chars().take(max_chars).collect();
    preview.push_str(&format!("... [truncated, total_chars={}]", char_count));
    preview
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_unchanged() {
        assert_eq!(truncate_for_log("abc", 10), "abc");
    }

    #[test]
    fn test_long_text_is_cut_on_char_boundary() {
        let text = "ééééé";
        assert_eq!(
            truncate_for_log(text, 2),
            "éé... [truncated, total_chars=5]"
        );
    }
}
