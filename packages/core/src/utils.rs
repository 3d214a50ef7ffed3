// ABOUTME: Shared utility functions for DocuApp
// ABOUTME: ID generation and text helpers

/// Generate a prefixed unique ID, e.g. `jrn-V1StGXR8_Z5jdHi6B-myT`
pub fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, nanoid::nanoid!())
}

/// Cut `text` to at most `max` characters, appending `...` when anything was removed
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}

/// Title-case a snake_case identifier (`on_hold` -> `On Hold`)
pub fn title_case(value: &str) -> String {
    value
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
