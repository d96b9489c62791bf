use chrono::{DateTime, Utc};

/// A validated contact form submission.
///
/// Built once by the validator and never mutated afterwards. The spreadsheet row and
/// both notification emails are rendered from the same value.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub country_code: String,
    pub phone: String,
    pub year: String,
    pub location: String,
    pub language: String,
    pub story: String,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    /// Dial code and local number joined by a single space, skipping empty parts.
    pub fn phone_display(&self) -> String {
        [self.country_code.trim(), self.phone.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
