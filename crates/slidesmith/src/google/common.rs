//! Shared utilities for Google API modules

use serde_json::Value;

/// Extract an array field from a JSON response, returning an empty vec if missing.
///
/// Google APIs omit empty list fields entirely ("values" on an empty sheet
/// range, "slides" on a blank deck).
pub fn extract_array(response: &Value, field: &str) -> Vec<Value> {
    response
        .get(field)
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
}

/// Percent-encode a single path segment (ids, A1 ranges).
pub fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_array_missing_field() {
        assert!(extract_array(&json!({"range": "A1:B2"}), "values").is_empty());
        assert_eq!(extract_array(&json!({"values": [[1], [2]]}), "values").len(), 2);
    }

    #[test]
    fn test_path_segment_encodes_ranges() {
        assert_eq!(path_segment("Sheet 1!A1:C10"), "Sheet%201%21A1%3AC10");
        assert_eq!(path_segment("1AbC_d-E"), "1AbC_d-E");
    }
}
