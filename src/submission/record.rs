use chrono::SecondsFormat;

use crate::models::Submission;

/// Column titles written by `setup-sheet`.
pub const HEADERS: [&str; 8] = [
    "Submitted At",
    "Name",
    "Email",
    "Phone",
    "Year/Age",
    "Location",
    "Language Preference",
    "Story",
];

/// One spreadsheet row derived from a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub timestamp: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub year: String,
    pub location: String,
    pub language: String,
    pub story: String,
}

impl Record {
    pub fn from_submission(submission: &Submission) -> Self {
        let phone = submission.phone_display();
        // Leading quote keeps the sheet from parsing "+1 555..." as a formula or number
        let phone = if phone.is_empty() {
            phone
        } else {
            format!("'{phone}")
        };

        Self {
            timestamp: submission
                .submitted_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            name: submission.name.clone(),
            email: submission.email.clone(),
            phone,
            year: submission.year.clone(),
            location: submission.location.clone(),
            language: submission.language.clone(),
            story: submission.story.clone(),
        }
    }

    pub fn into_row(self) -> Vec<String> {
        vec![
            self.timestamp,
            self.name,
            self.email,
            self.phone,
            self.year,
            self.location,
            self.language,
            self.story,
        ]
    }
}
