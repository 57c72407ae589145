//! Request body decoding

use serde_json::Value;

use super::error::ApiError;
use crate::validation::Payload;

/// Decode a request body into a JSON object
///
/// A blank body is an empty payload. Anything that is not a JSON object is
/// rejected before validation runs. String values are trimmed, and strings
/// left empty become `null`.
///
/// ```rust
/// use authors_service::handlers::parse_payload;
///
/// assert!(parse_payload(b"").unwrap().is_empty());
/// assert!(parse_payload(br#"{"name": "Ana"}"#).unwrap().contains_key("name"));
/// assert!(parse_payload(b"[1, 2]").is_err());
/// ```
pub fn parse_payload(body: &[u8]) -> Result<Payload, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Payload::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map
            .into_iter()
            .map(|(key, value)| (key, normalize(value)))
            .collect()),
        Ok(_) => Err(ApiError::bad_request(
            "The request body must be a JSON object.",
        )),
        Err(e) => Err(ApiError::bad_request(format!("Malformed JSON body: {}", e))),
    }
}

/// Trim every string, turning empty ones into `null`
fn normalize(value: Value) -> Value {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Null
            } else if trimmed.len() == s.len() {
                Value::String(s)
            } else {
                Value::String(trimmed.to_string())
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, normalize(value)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ApiErrorKind;

    #[test]
    fn test_whitespace_body_is_empty_payload() {
        assert!(parse_payload(b"  \n").unwrap().is_empty());
    }

    #[test]
    fn test_null_body_is_rejected() {
        let err = parse_payload(b"null").unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::BadRequest);
        assert_eq!(err.message, "The request body must be a JSON object.");
    }

    #[test]
    fn test_malformed_body_is_rejected() {
        let err = parse_payload(b"{\"name\":").unwrap_err();
        assert!(err.message.starts_with("Malformed JSON body"));
    }

    #[test]
    fn test_strings_are_trimmed() {
        let payload = parse_payload(br#"{"name": "  Jane Austen ", "tags": [" a "]}"#).unwrap();
        assert_eq!(payload["name"], "Jane Austen");
        assert_eq!(payload["tags"][0], "a");
    }

    #[test]
    fn test_blank_strings_become_null() {
        let payload = parse_payload(br#"{"name": "   ", "date_of_birth": ""}"#).unwrap();
        assert!(payload["name"].is_null());
        assert!(payload["date_of_birth"].is_null());
    }
}
