//! Declarative field validation for JSON payloads
//!
//! A [`RuleSet`] maps field names to ordered [`Rule`] lists. [`validate`]
//! runs them against a decoded JSON object and either returns the declared
//! fields ([`ValidatedPayload`]) or every failure message grouped by field
//! ([`FieldErrors`]).
//!
//! Rule semantics:
//!
//! - `Sometimes` skips the whole field when its key is absent
//! - `Required` fails on absent, null, blank strings and empty arrays or
//!   objects; once it fails no further rule runs for that field
//! - other rules are skipped when the value is absent or a blank string
//! - `Unique` asks a [`UniqueLookup`] whether the value is already stored
//!
//! ```rust
//! use authors_service::validation::{Rule, RuleSet};
//!
//! let rules = RuleSet::new()
//!     .field("name", [Rule::Required, Rule::String, Rule::Max(255)])
//!     .field("date_of_birth", [Rule::Required, Rule::Date]);
//! assert_eq!(rules.fields().collect::<Vec<_>>(), ["name", "date_of_birth"]);
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::repository::{RepositoryError, UniqueLookup};

/// Decoded request body
pub type Payload = serde_json::Map<String, Value>;

/// A single validation rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Validate the field only when its key is present
    Sometimes,
    /// Value must be present and non-empty
    Required,
    /// Value must be a JSON string
    String,
    /// String length in characters (or array length) must not exceed the bound
    Max(usize),
    /// Value must be a parseable calendar date
    Date,
    /// Value must not already be stored in `table`; `column` defaults to the field name
    Unique {
        table: String,
        column: Option<String>,
    },
}

impl Rule {
    /// Shorthand for a `Unique` rule keyed on the field's own column
    pub fn unique(table: impl Into<String>) -> Self {
        Self::Unique {
            table: table.into(),
            column: None,
        }
    }

    /// Implicit rules run even when the value is missing
    fn is_implicit(&self) -> bool {
        matches!(self, Self::Required)
    }
}

/// Ordered field to rules mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    fields: Vec<(String, Vec<Rule>)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the rules for one field, in evaluation order
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.push((name.into(), rules.into_iter().collect()));
        self
    }

    /// Declared field names in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

/// Failure messages grouped by field, in rule-set order
///
/// Serializes as `{"field": ["message", ...], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, Vec<String>)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.entries.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((field.to_string(), vec![message])),
        }
    }

    /// Messages recorded for a field
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of fields with at least one failure
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, messages)| (name.as_str(), messages.as_slice()))
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, messages) in &self.entries {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

/// Why a payload was not accepted
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// One or more rules failed
    #[error("validation failed on {} field(s)", .0.len())]
    Failed(FieldErrors),

    /// A `unique` lookup could not be answered
    #[error(transparent)]
    Lookup(#[from] RepositoryError),
}

/// The subset of a payload covered by a [`RuleSet`]
///
/// Keys without rules are dropped; declared keys absent from the input stay absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedPayload {
    values: Payload,
}

impl ValidatedPayload {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// String value of a field
    pub fn str(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(Value::as_str)
    }

    /// Date value of a field, parsed the way the `Date` rule accepts it
    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        self.str(field).and_then(parse_date)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Run `rules` against `payload`
pub async fn validate<L: UniqueLookup>(
    payload: &Payload,
    rules: &RuleSet,
    lookup: &L,
) -> Result<ValidatedPayload, ValidationError> {
    let mut errors = FieldErrors::new();
    let mut values = Payload::new();

    for (field, field_rules) in &rules.fields {
        let value = payload.get(field);

        if value.is_none() && field_rules.contains(&Rule::Sometimes) {
            continue;
        }

        for rule in field_rules {
            if !rule.is_implicit() && !is_validatable(value) {
                continue;
            }

            if let Some(message) = check(field, rule, value, lookup).await? {
                errors.add(field, message);
                if rule.is_implicit() {
                    break;
                }
            }
        }

        if let Some(value) = value {
            values.insert(field.clone(), value.clone());
        }
    }

    if errors.is_empty() {
        Ok(ValidatedPayload { values })
    } else {
        Err(ValidationError::Failed(errors))
    }
}

/// Evaluate one rule; `Some(message)` on failure
async fn check<L: UniqueLookup>(
    field: &str,
    rule: &Rule,
    value: Option<&Value>,
    lookup: &L,
) -> Result<Option<String>, RepositoryError> {
    let attribute = field.replace('_', " ");

    let passed = match (rule, value) {
        (Rule::Sometimes, _) => true,
        (Rule::Required, value) => !is_empty_value(value),
        (_, None) => true,
        (Rule::String, Some(value)) => value.is_string(),
        (Rule::Max(max), Some(value)) => size_of(value) <= *max,
        (Rule::Date, Some(value)) => value.as_str().and_then(parse_date).is_some(),
        (Rule::Unique { table, column }, Some(value)) => match scalar_text(value) {
            Some(text) => {
                let column = column.as_deref().unwrap_or(field);
                !lookup.value_exists(table, column, &text).await?
            }
            None => true,
        },
    };

    if passed {
        return Ok(None);
    }

    let message = match rule {
        Rule::Sometimes => return Ok(None),
        Rule::Required => format!("The {} field is required.", attribute),
        Rule::String => format!("The {} field must be a string.", attribute),
        Rule::Max(max) => format!(
            "The {} field must not be greater than {} characters.",
            attribute, max
        ),
        Rule::Date => format!("The {} field must be a valid date.", attribute),
        Rule::Unique { .. } => format!("The {} has already been taken.", attribute),
    };
    Ok(Some(message))
}

/// Non-implicit rules only look at present, non-blank values
fn is_validatable(value: Option<&Value>) -> bool {
    match value {
        None => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Bool(_)) | Some(Value::Number(_)) => false,
    }
}

fn size_of(value: &Value) -> usize {
    match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => other.to_string().chars().count(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and RFC 3339
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{RepositoryErrorKind, RepositoryOperation, RepositoryResult};
    use serde_json::json;

    struct Taken(&'static [&'static str]);

    impl UniqueLookup for Taken {
        async fn value_exists(&self, table: &str, column: &str, value: &str) -> RepositoryResult<bool> {
            assert_eq!((table, column), ("authors", "name"));
            Ok(self.0.contains(&value))
        }
    }

    struct Broken;

    impl UniqueLookup for Broken {
        async fn value_exists(&self, _: &str, _: &str, _: &str) -> RepositoryResult<bool> {
            Err(RepositoryError::connection_failed("down")
                .with_operation(RepositoryOperation::Exists))
        }
    }

    fn create_rules() -> RuleSet {
        RuleSet::new()
            .field(
                "name",
                [Rule::Required, Rule::String, Rule::Max(255), Rule::unique("authors")],
            )
            .field("date_of_birth", [Rule::Required, Rule::Date])
    }

    fn update_rules() -> RuleSet {
        RuleSet::new()
            .field(
                "name",
                [
                    Rule::Sometimes,
                    Rule::Required,
                    Rule::String,
                    Rule::Max(255),
                    Rule::unique("authors"),
                ],
            )
            .field("date_of_birth", [Rule::Sometimes, Rule::Required, Rule::Date])
    }

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    fn failures(result: Result<ValidatedPayload, ValidationError>) -> FieldErrors {
        match result {
            Err(ValidationError::Failed(errors)) => errors,
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_valid_payload_keeps_only_declared_fields() {
        let input = payload(json!({
            "name": "Jane Austen",
            "date_of_birth": "1775-12-16",
            "id": 99
        }));
        let validated = validate(&input, &create_rules(), &Taken(&[])).await.unwrap();
        assert_eq!(validated.len(), 2);
        assert!(!validated.contains("id"));
        assert_eq!(validated.str("name"), Some("Jane Austen"));
        assert_eq!(validated.date("date_of_birth"), NaiveDate::from_ymd_opt(1775, 12, 16));
    }

    #[tokio::test]
    async fn test_empty_payload_requires_both_fields() {
        let errors = failures(validate(&Payload::new(), &create_rules(), &Taken(&[])).await);
        assert_eq!(errors.get("name").unwrap(), ["The name field is required."]);
        assert_eq!(
            errors.get("date_of_birth").unwrap(),
            ["The date of birth field is required."]
        );
    }

    #[tokio::test]
    async fn test_required_failure_stops_field() {
        let input = payload(json!({"name": null, "date_of_birth": "  "}));
        let errors = failures(validate(&input, &create_rules(), &Taken(&[])).await);
        assert_eq!(errors.get("name").unwrap().len(), 1);
        assert_eq!(errors.get("date_of_birth").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_type_and_length_failures_accumulate() {
        let long = "x".repeat(256);
        let input = payload(json!({"name": long, "date_of_birth": "not-a-date"}));
        let errors = failures(validate(&input, &create_rules(), &Taken(&[])).await);
        assert_eq!(
            errors.get("name").unwrap(),
            ["The name field must not be greater than 255 characters."]
        );
        assert_eq!(
            errors.get("date_of_birth").unwrap(),
            ["The date of birth field must be a valid date."]
        );

        let input = payload(json!({"name": 42, "date_of_birth": "2001-02-03"}));
        let errors = failures(validate(&input, &create_rules(), &Taken(&[])).await);
        assert_eq!(errors.get("name").unwrap(), ["The name field must be a string."]);
        assert!(errors.get("date_of_birth").is_none());
    }

    #[tokio::test]
    async fn test_max_counts_characters_not_bytes() {
        let name = "é".repeat(255);
        let input = payload(json!({"name": name, "date_of_birth": "2001-02-03"}));
        assert!(validate(&input, &create_rules(), &Taken(&[])).await.is_ok());
    }

    #[tokio::test]
    async fn test_unique_rejects_stored_value() {
        let input = payload(json!({"name": "Jane Austen", "date_of_birth": "1775-12-16"}));
        let errors = failures(validate(&input, &create_rules(), &Taken(&["Jane Austen"])).await);
        assert_eq!(errors.get("name").unwrap(), ["The name has already been taken."]);
    }

    #[tokio::test]
    async fn test_sometimes_skips_absent_fields() {
        let validated = validate(&Payload::new(), &update_rules(), &Taken(&[]))
            .await
            .unwrap();
        assert!(validated.is_empty());

        let input = payload(json!({"date_of_birth": "1990-05-01"}));
        let validated = validate(&input, &update_rules(), &Taken(&[])).await.unwrap();
        assert!(!validated.contains("name"));
        assert!(validated.contains("date_of_birth"));
    }

    #[tokio::test]
    async fn test_sometimes_still_validates_present_null() {
        let input = payload(json!({"name": null}));
        let errors = failures(validate(&input, &update_rules(), &Taken(&[])).await);
        assert_eq!(errors.get("name").unwrap(), ["The name field is required."]);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_not_a_field_error() {
        let input = payload(json!({"name": "X", "date_of_birth": "2000-01-01"}));
        match validate(&input, &create_rules(), &Broken).await {
            Err(ValidationError::Lookup(err)) => {
                assert_eq!(err.kind, RepositoryErrorKind::ConnectionFailed)
            }
            other => panic!("expected lookup failure, got {:?}", other),
        }
    }

    #[test]
    fn test_field_errors_serialize_in_rule_order() {
        let mut errors = FieldErrors::new();
        errors.add("name", "first");
        errors.add("date_of_birth", "second");
        errors.add("name", "third");
        assert_eq!(
            serde_json::to_string(&errors).unwrap(),
            r#"{"name":["first","third"],"date_of_birth":["second"]}"#
        );
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(1990, 5, 1);
        assert_eq!(parse_date("1990-05-01"), expected);
        assert_eq!(parse_date("1990-05-01 10:20:30"), expected);
        assert_eq!(parse_date("1990-05-01T10:20:30"), expected);
        assert_eq!(parse_date("1990-05-01T10:20:30+02:00"), expected);
        assert_eq!(parse_date("1990-02-30"), None);
        assert_eq!(parse_date("yesterday"), None);
    }
}
