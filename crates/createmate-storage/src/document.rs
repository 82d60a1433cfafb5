use createmate_core::{CreateMateError, CreateMateResult, Document};
use serde::Serialize;
use serde_json::Value;

/// Field every stored document is keyed by.
pub const ID_FIELD: &str = "_id";

/// Convert any serializable value into a document.
///
/// Fails unless the value serializes to a JSON object.
pub fn to_document<T: Serialize>(value: &T) -> CreateMateResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(CreateMateError::Storage(format!(
            "Expected an object, got {}",
            type_name(&other)
        ))),
    }
}

/// Reject collection names outside `[A-Za-z0-9_-]`.
pub fn validate_collection(name: &str) -> CreateMateResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(CreateMateError::Storage(format!(
            "Invalid collection name '{name}'"
        )))
    }
}

/// Give `document` a fresh `_id` unless it already has a non-null one.
/// Returns the id.
pub(crate) fn ensure_id(document: &mut Document) -> String {
    match document.get(ID_FIELD) {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Null) | None => {
            let id = uuid::Uuid::new_v4().to_string();
            document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
            id
        }
        Some(other) => other.to_string(),
    }
}

/// Whether every query field equals the document's value.
///
/// Dotted keys such as `input.content_type` address nested objects. An empty
/// query matches every document.
pub fn matches_query(document: &Document, query: &Document) -> bool {
    query
        .iter()
        .all(|(key, expected)| lookup(document, key) == Some(expected))
}

fn lookup<'a>(document: &'a Document, key: &str) -> Option<&'a Value> {
    let mut segments = key.split('.');
    let first = segments.next()?;
    let mut current = document.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Merge the fields of `update` into `document`.
///
/// An update shaped `{"$set": {...}}` merges the inner object; a plain object
/// is treated the same way. The `_id` field is never overwritten. Returns
/// whether anything changed.
pub fn apply_update(document: &mut Document, update: &Document) -> CreateMateResult<bool> {
    let fields = match update.get("$set") {
        Some(Value::Object(set)) => set,
        Some(other) => {
            return Err(CreateMateError::Storage(format!(
                "$set expects an object, got {}",
                type_name(other)
            )))
        }
        None => {
            if let Some(op) = update.keys().find(|k| k.starts_with('$')) {
                return Err(CreateMateError::Storage(format!(
                    "Unsupported update operator '{op}'"
                )));
            }
            update
        }
    };

    let mut changed = false;
    for (key, value) in fields {
        if key == ID_FIELD {
            continue;
        }
        if document.get(key) != Some(value) {
            document.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    Ok(changed)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_to_document_rejects_non_objects() {
        assert!(to_document(&vec!["Monday"]).is_err());
        let d = to_document(&json!({"day": "Monday"})).unwrap();
        assert_eq!(d["day"], "Monday");
    }

    #[test]
    fn test_collection_names() {
        assert!(validate_collection("generated_content").is_ok());
        assert!(validate_collection("user-inputs2").is_ok());
        assert!(validate_collection("").is_err());
        assert!(validate_collection("../etc").is_err());
        assert!(validate_collection("a b").is_err());
    }

    #[test]
    fn test_ensure_id_keeps_existing() {
        let mut d = doc(json!({"_id": "abc"}));
        assert_eq!(ensure_id(&mut d), "abc");

        let mut d = doc(json!({"day": "Friday"}));
        let id = ensure_id(&mut d);
        assert_eq!(d[ID_FIELD], Value::String(id.clone()));
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_query_matching() {
        let d = doc(json!({
            "day": "Monday",
            "input": { "content_type": "Blog", "post_frequency": 2 }
        }));
        assert!(matches_query(&d, &Document::new()));
        assert!(matches_query(&d, &doc(json!({"day": "Monday"}))));
        assert!(matches_query(&d, &doc(json!({"input.post_frequency": 2}))));
        assert!(!matches_query(&d, &doc(json!({"day": "Tuesday"}))));
        assert!(!matches_query(&d, &doc(json!({"input.missing": 1}))));
        assert!(!matches_query(&d, &doc(json!({"day.deeper": 1}))));
    }

    #[test]
    fn test_set_update_merges() {
        let mut d = doc(json!({"_id": "1", "day": "Monday", "content": "old"}));
        let changed = apply_update(
            &mut d,
            &doc(json!({"$set": {"content": "new", "_id": "2", "liked": true}})),
        )
        .unwrap();
        assert!(changed);
        assert_eq!(d["content"], "new");
        assert_eq!(d["liked"], true);
        assert_eq!(d["_id"], "1");
        assert_eq!(d["day"], "Monday");
    }

    #[test]
    fn test_noop_update_reports_unchanged() {
        let mut d = doc(json!({"day": "Monday"}));
        assert!(!apply_update(&mut d, &doc(json!({"day": "Monday"}))).unwrap());
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let mut d = doc(json!({"n": 1}));
        assert!(apply_update(&mut d, &doc(json!({"$inc": {"n": 1}}))).is_err());
        assert!(apply_update(&mut d, &doc(json!({"$set": 5}))).is_err());
    }
}
