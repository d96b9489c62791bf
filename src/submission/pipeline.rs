use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinError;
use tracing::Instrument;
use uuid::Uuid;

use crate::email::{Notifier, NotifyError};
use crate::error::AppError;
use crate::models::Submission;
use crate::sheets::RecordStore;

use super::parser::RawFields;
use super::record::Record;
use super::validator;

/// Result of a submission that reached the record store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Notified,
    NotificationDegraded,
}

impl Outcome {
    pub fn message(&self) -> &'static str {
        match self {
            Outcome::Notified => "Form submitted successfully! Confirmation email sent.",
            Outcome::NotificationDegraded => {
                "Form submitted successfully! However, we couldn't send the confirmation email."
            }
        }
    }
}

/// Stores submissions and sends the follow-up emails.
///
/// Holds the process-wide clients; cloning shares them.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Append the record, then notify staff and applicant concurrently.
    ///
    /// Only a failed append is an error. Notification failures are logged and turn the
    /// outcome into `NotificationDegraded`.
    pub async fn dispatch(&self, submission: Submission) -> Result<Outcome, AppError> {
        let row = Record::from_submission(&submission).into_row();

        self.store
            .append_row(row)
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;

        tracing::info!("Submission from {} stored", submission.email);

        let submission = Arc::new(submission);

        let staff = {
            let notifier = Arc::clone(&self.notifier);
            let submission = Arc::clone(&submission);
            tokio::spawn(
                async move { notifier.notify_staff(&submission).await }.in_current_span(),
            )
        };

        let applicant = {
            let notifier = Arc::clone(&self.notifier);
            let submission = Arc::clone(&submission);
            tokio::spawn(
                async move {
                    notifier
                        .notify_applicant(&submission.email, &submission.name)
                        .await
                }
                .in_current_span(),
            )
        };

        let (staff, applicant) = tokio::join!(staff, applicant);
        let staff_ok = delivered("staff", staff);
        let applicant_ok = delivered("applicant", applicant);

        if staff_ok && applicant_ok {
            Ok(Outcome::Notified)
        } else {
            Ok(Outcome::NotificationDegraded)
        }
    }
}

fn delivered(recipient: &str, result: Result<Result<(), NotifyError>, JoinError>) -> bool {
    match result {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!("Failed to notify {recipient}: {e}");
            false
        }
        Err(e) => {
            tracing::error!("Notification task for {recipient} did not complete: {e}");
            false
        }
    }
}

/// Validate raw form fields and hand the submission to the dispatcher.
pub async fn run(dispatcher: &Dispatcher, fields: RawFields) -> Result<Outcome, AppError> {
    let span = tracing::info_span!("submission", id = %Uuid::now_v7());

    async move {
        let submission = validator::validate(&fields, Utc::now()).inspect_err(|missing| {
            tracing::debug!("Rejected submission: {missing}");
        })?;

        let outcome = dispatcher.dispatch(submission).await?;
        tracing::info!("Submission done: {outcome:?}");
        Ok::<_, AppError>(outcome)
    }
    .instrument(span)
    .await
}
