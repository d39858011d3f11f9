//! Truncation Detector
//!
//! Pure heuristics for spotting output that was cut off mid-generation.
//! Constrained decoding guarantees structural validity, never that a field's
//! content is a finished sentence; a token-limit cutoff inside a
//! still-parseable fragment is a distinct failure mode from a schema
//! violation, so this check runs after validation with its own reason.
//!
//! The check walks every string leaf of the parsed structure, not just the
//! top level; a truncated list item is caught as reliably as a truncated
//! root field.

use serde_json::Value;

/// Heuristic check for one text value. Any trigger means "looks truncated":
///
/// 1. the trimmed text ends with an alphabetic character immediately
///    followed by `{`, `[`, or `]`, a mid-word cutoff during streaming
///    JSON generation;
/// 2. opening `{`/`[` outnumber closing `}`/`]` AND the text ends on or
///    near an opening character.
pub fn text_looks_truncated(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }

    let chars: Vec<char> = trimmed.chars().collect();
    let last = chars[chars.len() - 1];

    // Heuristic 1: letter immediately before a dangling bracket character.
    if matches!(last, '{' | '[' | ']') && chars.len() >= 2 {
        let prev = chars[chars.len() - 2];
        if prev.is_alphabetic() {
            return true;
        }
    }

    // Heuristic 2: unbalanced opens and the tail sits on an opener.
    let opens = chars.iter().filter(|c| matches!(c, '{' | '[')).count();
    let closes = chars.iter().filter(|c| matches!(c, '}' | ']')).count();
    if opens > closes {
        let tail = &chars[chars.len().saturating_sub(2)..];
        if tail.iter().any(|c| matches!(c, '{' | '[')) {
            return true;
        }
    }

    false
}

/// Walk every string leaf of a parsed structure and return the path of the
/// first one that looks truncated.
pub fn find_truncated_leaf(value: &Value) -> Option<String> {
    walk(value, "$")
}

fn walk(value: &Value, path: &str) -> Option<String> {
    match value {
        Value::String(s) => {
            if text_looks_truncated(s) {
                Some(path.to_string())
            } else {
                None
            }
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(index, item)| walk(item, &format!("{}[{}]", path, index))),
        Value::Object(map) => map.iter().find_map(|(key, item)| {
            let child = if path == "$" {
                key.clone()
            } else {
                format!("{}.{}", path, key)
            };
            walk(item, &child)
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_then_open_brace_at_end() {
        assert!(text_looks_truncated("I was about to say{"));
        assert!(text_looks_truncated("the list includes["));
        assert!(text_looks_truncated("half a word]"));
    }

    #[test]
    fn test_trailing_whitespace_ignored() {
        assert!(text_looks_truncated("cut off mid[  "));
    }

    #[test]
    fn test_complete_sentences_pass() {
        assert!(!text_looks_truncated("Please send the document today."));
        assert!(!text_looks_truncated("Could you send it? Thanks!"));
        assert!(!text_looks_truncated(""));
        assert!(!text_looks_truncated("   "));
    }

    #[test]
    fn test_balanced_brackets_pass() {
        assert!(!text_looks_truncated("see the list [a, b, c] for details."));
        assert!(!text_looks_truncated("config {debug} is set."));
    }

    #[test]
    fn test_unbalanced_opens_ending_on_opener() {
        assert!(text_looks_truncated("items: [one, ["));
        assert!(text_looks_truncated("nested {a: {"));
    }

    #[test]
    fn test_unbalanced_opens_but_tail_is_prose() {
        // Unbalanced, but the text trails off in plain words; heuristic 2
        // requires the tail to sit on an opener.
        assert!(!text_looks_truncated("see [attachment one and also two"));
    }

    #[test]
    fn test_balanced_bracket_after_digit_passes() {
        // Heuristic 1 needs a letter immediately before the bracket, and
        // balanced counts keep heuristic 2 quiet.
        assert!(!text_looks_truncated("see [note 3]"));
    }

    #[test]
    fn test_unbalanced_open_after_digit_still_caught() {
        assert!(text_looks_truncated("see note 3["));
    }

    #[test]
    fn test_recursive_walk_finds_nested_leaf() {
        let value = serde_json::json!({
            "primary": "ask for the document",
            "secondary": ["set a deadline", "remind the recipient of{"],
            "confidence": 0.7
        });
        assert_eq!(
            find_truncated_leaf(&value),
            Some("secondary[1]".to_string())
        );
    }

    #[test]
    fn test_recursive_walk_descends_objects() {
        let value = serde_json::json!({
            "variants": [
                {"text": "Could you send it over?", "tags": ["softer"]},
                {"text": "Send the document now befor[", "tags": ["direct"]}
            ]
        });
        assert_eq!(
            find_truncated_leaf(&value),
            Some("variants[1].text".to_string())
        );
    }

    #[test]
    fn test_clean_structure_has_no_truncated_leaf() {
        let value = serde_json::json!({
            "urgency": "medium",
            "summary": "A polite nudge with a clear ask."
        });
        assert_eq!(find_truncated_leaf(&value), None);
    }

    #[test]
    fn test_root_string_path() {
        let value = serde_json::json!("dangling tail{");
        assert_eq!(find_truncated_leaf(&value), Some("$".to_string()));
    }
}
