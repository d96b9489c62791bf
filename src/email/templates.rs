use askama::Template;

use crate::models::Submission;

struct Detail {
    label: &'static str,
    value: String,
}

#[derive(Template)]
#[template(path = "email/staff_notification.html")]
struct StaffNotificationTemplate<'a> {
    name: &'a str,
    email: &'a str,
    details: Vec<Detail>,
    story: &'a str,
    submitted_at: String,
}

#[derive(Template)]
#[template(path = "email/applicant_confirmation.html")]
struct ApplicantConfirmationTemplate<'a> {
    name: &'a str,
    org_name: &'a str,
}

pub fn render_staff_notification(submission: &Submission) -> askama::Result<String> {
    let details = [
        ("Phone", submission.phone_display()),
        ("Year/Age", submission.year.clone()),
        ("Location", submission.location.clone()),
        ("Language Preference", submission.language.clone()),
    ]
    .into_iter()
    .filter(|(_, value)| !value.trim().is_empty())
    .map(|(label, value)| Detail { label, value })
    .collect();

    StaffNotificationTemplate {
        name: &submission.name,
        email: &submission.email,
        details,
        story: &submission.story,
        submitted_at: submission
            .submitted_at
            .format("%Y-%m-%d %H:%M UTC")
            .to_string(),
    }
    .render()
}

pub fn render_applicant_confirmation(name: &str, org_name: &str) -> askama::Result<String> {
    ApplicantConfirmationTemplate { name, org_name }.render()
}
