//! Document value helpers
//!
//! Records are JSON documents addressed with dot-separated field paths.
//! Every storage backend shares these helpers so that matching and
//! ordering behave the same in memory and in SQL.

use serde_json::Value;
use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Fold text for case and diacritic insensitive matching
///
/// Decomposes to NFD, drops combining marks, then lowercases.
pub fn fold_text(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Fold every scalar of a document into matchable text
///
/// Strings are folded, numbers and booleans become their folded textual
/// form, nulls stay null and containers are folded recursively.
pub fn folded_document(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        Value::String(s) => Value::String(fold_text(s)),
        Value::Array(items) => Value::Array(items.iter().map(folded_document).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), folded_document(value)))
                .collect(),
        ),
    }
}

/// Text a folded value is matched against, `None` for null
pub fn match_text(folded: &Value) -> Option<String> {
    match folded {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Resolve a dot-separated path inside a document
///
/// All-digit segments index arrays; every other segment is an object key.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| {
        if is_index(segment) {
            let index: usize = segment.parse().ok()?;
            current.as_array()?.get(index)
        } else {
            current.as_object()?.get(segment)
        }
    })
}

/// Whether a field path can be addressed by every backend
///
/// SQLite JSON paths have no escape for a double quote inside a key.
pub fn is_field_path(path: &str) -> bool {
    !path.trim().is_empty() && !path.contains('"')
}

/// SQLite JSON path for a dot-separated field path
pub fn json_path(path: &str) -> String {
    let mut json_path = String::from("$");
    for segment in path.split('.') {
        if is_index(segment) {
            json_path.push('[');
            json_path.push_str(segment);
            json_path.push(']');
        } else {
            json_path.push_str(".\"");
            json_path.push_str(segment);
            json_path.push('"');
        }
    }
    json_path
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Overlay a partial document on a base document
///
/// Object keys of the overlay replace base keys recursively; null overlay
/// values leave the base value untouched.
pub fn overlay(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                if patch_value.is_null() {
                    continue;
                }
                match base_map.get_mut(key) {
                    Some(base_value) => overlay(base_value, patch_value),
                    None => {
                        base_map.insert(key.clone(), patch_value.clone());
                    }
                }
            }
        }
        (base, patch) if !patch.is_null() => *base = patch.clone(),
        _ => {}
    }
}

/// Ordering key shared by sorting and comparison filters
///
/// Mirrors SQLite's cross-type ordering of `json_extract` results:
/// null sorts first, then numbers (booleans count as 0/1), then text.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Null,
    Number(f64),
    Text(String),
}

impl SortKey {
    pub fn of(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Null,
            Some(Value::Bool(b)) => Self::Number(if *b { 1.0 } else { 0.0 }),
            Some(Value::Number(n)) => Self::Number(n.as_f64().unwrap_or(0.0)),
            Some(Value::String(s)) => Self::Text(s.clone()),
            Some(other) => Self::Text(other.to_string()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fold_text_strips_case_and_diacritics() {
        assert_eq!(fold_text("Crème Brûlée"), "creme brulee");
        assert_eq!(fold_text("ÉCOLE"), "ecole");
        assert_eq!(fold_text("Widget-42"), "widget-42");
    }

    #[test]
    fn test_folded_document() {
        let doc = json!({"name": "Zoë", "qty": 3, "paid": true, "tags": ["Ä"], "none": null});
        let folded = folded_document(&doc);
        assert_eq!(
            folded,
            json!({"name": "zoe", "qty": "3", "paid": "true", "tags": ["a"], "none": null})
        );
        assert_eq!(match_text(&folded["tags"]).unwrap(), "[\"a\"]");
        assert_eq!(match_text(&folded["none"]), None);
    }

    #[test]
    fn test_lookup_paths() {
        let doc = json!({"address": {"city": "Lyon"}, "lines": [{"sku": "A1"}]});
        assert_eq!(lookup(&doc, "address.city"), Some(&json!("Lyon")));
        assert_eq!(lookup(&doc, "lines.0.sku"), Some(&json!("A1")));
        assert_eq!(lookup(&doc, "lines.1.sku"), None);
        assert_eq!(lookup(&doc, "address.zip"), None);
        assert_eq!(lookup(&doc, "address.0"), None);
    }

    #[test]
    fn test_field_path_validity() {
        assert!(is_field_path("lines.0.sku"));
        assert!(!is_field_path(""));
        assert!(!is_field_path("a\"b"));
    }

    #[test]
    fn test_json_path() {
        assert_eq!(json_path("name"), "$.\"name\"");
        assert_eq!(json_path("lines.0.sku"), "$.\"lines\"[0].\"sku\"");
    }

    #[test]
    fn test_overlay_keeps_untranslated_values() {
        let mut base = json!({"label": "Chair", "meta": {"color": "red", "size": "L"}, "sku": "C1"});
        overlay(
            &mut base,
            &json!({"label": "Chaise", "meta": {"color": "rouge"}, "sku": null}),
        );
        assert_eq!(
            base,
            json!({"label": "Chaise", "meta": {"color": "rouge", "size": "L"}, "sku": "C1"})
        );
    }

    #[test]
    fn test_sort_key_ordering() {
        let mut keys = vec![
            SortKey::Text("b".into()),
            SortKey::Number(10.0),
            SortKey::Null,
            SortKey::Text("a".into()),
            SortKey::Number(2.0),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                SortKey::Null,
                SortKey::Number(2.0),
                SortKey::Number(10.0),
                SortKey::Text("a".into()),
                SortKey::Text("b".into()),
            ]
        );
        assert_eq!(SortKey::of(Some(&json!(true))), SortKey::Number(1.0));
    }
}
