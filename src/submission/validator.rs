use chrono::{DateTime, Utc};

use crate::models::Submission;

use super::parser::RawFields;

const REQUIRED: [&str; 3] = ["name", "email", "story"];

/// Required fields that were absent or blank, in form order.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingFields(pub Vec<&'static str>);

impl std::fmt::Display for MissingFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Missing required fields: {}", self.0.join(", "))
    }
}

/// Check required fields and build a `Submission` stamped with `now`.
///
/// No shape checks are made on email or phone. Values are kept as posted; trimming
/// only decides whether a required field counts as present.
pub fn validate(fields: &RawFields, now: DateTime<Utc>) -> Result<Submission, MissingFields> {
    let missing: Vec<&'static str> = REQUIRED
        .into_iter()
        .filter(|name| fields.get(*name).is_none_or(|v| v.trim().is_empty()))
        .collect();

    if !missing.is_empty() {
        return Err(MissingFields(missing));
    }

    let get = |key: &str| fields.get(key).cloned().unwrap_or_default();

    Ok(Submission {
        name: get("name"),
        email: get("email"),
        country_code: get("countryCode"),
        phone: get("phone"),
        year: get("year"),
        location: get("location"),
        language: get("language"),
        story: get("story"),
        submitted_at: now,
    })
}
