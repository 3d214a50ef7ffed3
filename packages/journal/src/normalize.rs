// ABOUTME: Normalisation of stored journal sections
// ABOUTME: Accepts current item objects plus legacy string lists and bare strings

use serde_json::Value;

use crate::types::{ItemStatus, JournalItem, JournalItemInput, JournalSection};

/// Turn a stored section value into a clean item list.
///
/// * array items that are objects are kept when their trimmed `text` is non-empty
///   (a missing `status` reads as `not_started`);
/// * array items that are strings become items with the section's default status;
/// * a non-empty bare string becomes a single item with the default status;
/// * anything else yields no items.
pub fn normalize_section(value: &Value, section: JournalSection) -> Vec<JournalItem> {
    let default_status = section.default_status();

    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(map) => {
                    let text = map.get("text").and_then(Value::as_str).unwrap_or_default();
                    if text.trim().is_empty() {
                        return None;
                    }
                    let status = map
                        .get("status")
                        .and_then(Value::as_str)
                        .unwrap_or(ItemStatus::NotStarted.as_str());
                    Some(JournalItem {
                        text: text.to_string(),
                        status: status.to_string(),
                    })
                }
                Value::String(text) if !text.trim().is_empty() => {
                    Some(JournalItem::new(text.trim(), default_status))
                }
                _ => None,
            })
            .collect(),
        Value::String(text) if !text.trim().is_empty() => {
            vec![JournalItem::new(text.as_str(), default_status)]
        }
        _ => Vec::new(),
    }
}

/// Parse the raw column text, tolerating values that were never valid JSON
pub fn normalize_stored(raw: &str, section: JournalSection) -> Vec<JournalItem> {
    let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    normalize_section(&value, section)
}

/// Clean submitted items: trim text, drop blanks, fill in the section default status
pub fn clean_items(items: &[JournalItemInput], section: JournalSection) -> Vec<JournalItem> {
    items
        .iter()
        .filter_map(|item| {
            let text = item.text.trim();
            if text.is_empty() {
                None
            } else {
                Some(JournalItem::new(
                    text,
                    item.status.unwrap_or_else(|| section.default_status()),
                ))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_items_keep_stored_status() {
        let value = json!([
            {"text": "Shipped release", "status": "completed"},
            {"text": "   ", "status": "completed"},
            {"text": "Legacy status", "status": "blocked"},
            {"text": "No status"}
        ]);

        let items = normalize_section(&value, JournalSection::Pendings);
        assert_eq!(
            items,
            vec![
                JournalItem::new("Shipped release", ItemStatus::Completed),
                JournalItem {
                    text: "Legacy status".to_string(),
                    status: "blocked".to_string()
                },
                JournalItem::new("No status", ItemStatus::NotStarted),
            ]
        );
    }

    #[test]
    fn test_string_items_take_section_default() {
        let value = json!(["  first  ", "", "second"]);
        let items = normalize_section(&value, JournalSection::Challenges);
        assert_eq!(
            items,
            vec![
                JournalItem::new("first", ItemStatus::OnHold),
                JournalItem::new("second", ItemStatus::OnHold),
            ]
        );
    }

    #[test]
    fn test_bare_string_becomes_single_item() {
        let items = normalize_section(&json!("Old free text"), JournalSection::Strategies);
        assert_eq!(items, vec![JournalItem::new("Old free text", ItemStatus::NotStarted)]);

        assert!(normalize_section(&json!(""), JournalSection::Strategies).is_empty());
        assert!(normalize_section(&json!(null), JournalSection::Strategies).is_empty());
        assert!(normalize_section(&json!(42), JournalSection::Strategies).is_empty());
        assert!(normalize_section(&json!([1, null, true]), JournalSection::Strategies).is_empty());
    }

    #[test]
    fn test_normalize_stored_tolerates_plain_text() {
        let items = normalize_stored("not json at all", JournalSection::Highlights);
        assert_eq!(items, vec![JournalItem::new("not json at all", ItemStatus::Completed)]);

        let items = normalize_stored(r#"[{"text":"ok","status":"in_progress"}]"#, JournalSection::Highlights);
        assert_eq!(items, vec![JournalItem::new("ok", ItemStatus::InProgress)]);
    }

    #[test]
    fn test_clean_items() {
        let input = vec![
            JournalItemInput::new("  keep me ", None),
            JournalItemInput::new("   ", Some(ItemStatus::Cancelled)),
            JournalItemInput::new("explicit", Some(ItemStatus::Cancelled)),
        ];
        let items = clean_items(&input, JournalSection::PersonalUpdates);
        assert_eq!(
            items,
            vec![
                JournalItem::new("keep me", ItemStatus::Completed),
                JournalItem::new("explicit", ItemStatus::Cancelled),
            ]
        );
    }
}
