//! Diff generation for audit logging
//!
//! Produces one-line summaries of what changed between two JSON snapshots
//! of the same entity.

use serde_json::Value;

/// Fields that change on every write and would drown out the real change
const IGNORED_FIELDS: &[&str] = &["updated_at"];

const MAX_STRING_LEN: usize = 50;

/// Summarize top-level field changes between two snapshots
///
/// Returns `None` when nothing but ignored fields changed.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let changes = match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            let mut changes = Vec::new();

            for (key, before_val) in before_obj {
                if IGNORED_FIELDS.contains(&key.as_str()) {
                    continue;
                }
                match after_obj.get(key) {
                    Some(after_val) if after_val != before_val => changes.push(format!(
                        "{}: {} -> {}",
                        key,
                        format_value(before_val),
                        format_value(after_val)
                    )),
                    Some(_) => {}
                    None => changes.push(format!("{}: {} -> (removed)", key, format_value(before_val))),
                }
            }

            for (key, after_val) in after_obj {
                if !before_obj.contains_key(key) && !IGNORED_FIELDS.contains(&key.as_str()) {
                    changes.push(format!("{}: (added) -> {}", key, format_value(after_val)));
                }
            }

            changes
        }
        _ if before != after => vec![format!("{} -> {}", format_value(before), format_value(after))],
        _ => Vec::new(),
    };

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.chars().count() > MAX_STRING_LEN => {
            let head: String = s.chars().take(MAX_STRING_LEN - 3).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_amount_change() {
        let before = json!({"name": "Vacation", "current_amount": 30000});
        let after = json!({"name": "Vacation", "current_amount": 45000});

        let diff = generate_diff(&before, &after).unwrap();
        assert_eq!(diff, "current_amount: 30000 -> 45000");
    }

    #[test]
    fn test_updated_at_is_ignored() {
        let before = json!({"status": "active", "updated_at": "2025-01-01T00:00:00Z"});
        let after = json!({"status": "active", "updated_at": "2025-01-02T00:00:00Z"});

        assert!(generate_diff(&before, &after).is_none());
    }

    #[test]
    fn test_added_and_removed_fields() {
        let before = json!({"status": "paused", "paused_date": "2025-01-01T00:00:00Z"});
        let after = json!({"status": "active", "completed_date": "2025-02-01T00:00:00Z"});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("status: \"paused\" -> \"active\""));
        assert!(diff.contains("paused_date: \"2025-01-01T00:00:00Z\" -> (removed)"));
        assert!(diff.contains("completed_date: (added) -> \"2025-02-01T00:00:00Z\""));
    }

    #[test]
    fn test_collections_are_summarized() {
        let before = json!({"milestones": [{"name": "a"}]});
        let after = json!({"milestones": [{"name": "a"}, {"name": "b"}]});

        let diff = generate_diff(&before, &after).unwrap();
        assert_eq!(diff, "milestones: [1 items] -> [2 items]");
    }

    #[test]
    fn test_long_string_truncation_is_char_safe() {
        let before = json!({"notes": "é".repeat(80)});
        let after = json!({"notes": "short"});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("...\""));
    }

    #[test]
    fn test_scalar_values() {
        assert_eq!(generate_diff(&json!(1), &json!(2)).unwrap(), "1 -> 2");
        assert!(generate_diff(&json!(true), &json!(true)).is_none());
    }
}
