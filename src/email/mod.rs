pub mod templates;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{SmtpConfig, TlsMode};
use crate::models::Submission;

/// Best-effort notifications sent after a submission is stored.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_staff(&self, submission: &Submission) -> Result<(), NotifyError>;
    async fn notify_applicant(&self, email: &str, name: &str) -> Result<(), NotifyError>;
}

#[derive(Debug)]
pub enum NotifyError {
    NotConfigured,
    Address(String),
    Build(String),
    Transport(String),
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifyError::NotConfigured => write!(f, "SMTP not configured"),
            NotifyError::Address(msg) => write!(f, "Invalid address: {msg}"),
            NotifyError::Build(msg) => write!(f, "Failed to build email: {msg}"),
            NotifyError::Transport(msg) => write!(f, "Failed to send email: {msg}"),
        }
    }
}

impl std::error::Error for NotifyError {}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    staff: Mailbox,
    org_name: String,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = match config.tls_mode {
            TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| NotifyError::Transport(format!("SMTP relay error: {e}")))?
                .port(config.port)
                .credentials(creds)
                .build(),
            TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .port(config.port)
                .credentials(creds)
                .build(),
            TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| NotifyError::Transport(format!("SMTP starttls error: {e}")))?
                .port(config.port)
                .credentials(creds)
                .build(),
        };

        Ok(Self {
            transport,
            from: parse_mailbox(&config.from)?,
            staff: parse_mailbox(&config.staff_address)?,
            org_name: config.org_name.clone(),
        })
    }

    pub fn staff_message(&self, submission: &Submission) -> Result<Message, NotifyError> {
        build_html(
            self.from.clone(),
            self.staff.clone(),
            &format!("New Contact Form Submission from {}", submission.name),
            templates::render_staff_notification(submission)
                .map_err(|e| NotifyError::Build(e.to_string()))?,
        )
    }

    pub fn applicant_message(&self, email: &str, name: &str) -> Result<Message, NotifyError> {
        build_html(
            self.from.clone(),
            parse_mailbox(email)?,
            &format!("Thank you for contacting {}", self.org_name),
            templates::render_applicant_confirmation(name, &self.org_name)
                .map_err(|e| NotifyError::Build(e.to_string()))?,
        )
    }

    /// Connect to the SMTP server and check that it answers.
    pub async fn verify(&self) -> Result<bool, NotifyError> {
        self.transport
            .test_connection()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))
    }

    async fn send(&self, message: Message) -> Result<(), NotifyError> {
        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify_staff(&self, submission: &Submission) -> Result<(), NotifyError> {
        let message = self.staff_message(submission)?;
        self.send(message).await
    }

    async fn notify_applicant(&self, email: &str, name: &str) -> Result<(), NotifyError> {
        let message = self.applicant_message(email, name)?;
        self.send(message).await
    }
}

/// Stand-in when no SMTP credentials are configured. Every notification fails.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify_staff(&self, _submission: &Submission) -> Result<(), NotifyError> {
        Err(NotifyError::NotConfigured)
    }

    async fn notify_applicant(&self, _email: &str, _name: &str) -> Result<(), NotifyError> {
        Err(NotifyError::NotConfigured)
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse()
        .map_err(|e| NotifyError::Address(format!("{address}: {e}")))
}

fn build_html(
    from: Mailbox,
    to: Mailbox,
    subject: &str,
    html_body: String,
) -> Result<Message, NotifyError> {
    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_HTML)
        .body(html_body)
        .map_err(|e| NotifyError::Build(e.to_string()))
}
