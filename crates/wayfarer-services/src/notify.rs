//! Admin notification on application submissions.
//!
//! Fired once per applicant, on the first submission only, and always
//! fire-and-forget: delivery failure is logged and never fails the Submit.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use uuid::Uuid;

use wayfarer_core::{AppError, Config};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicantKind {
    MainApplicant,
    Dependant,
}

impl std::fmt::Display for ApplicantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicantKind::MainApplicant => write!(f, "main applicant"),
            ApplicantKind::Dependant => write!(f, "dependant"),
        }
    }
}

/// Payload for the admin notification collaborator.
#[derive(Debug, Clone)]
pub struct AdminNotification {
    pub applicant_kind: ApplicantKind,
    pub booking_id: Uuid,
    pub dependant_id: Option<Uuid>,
    pub applicant_name: String,
    pub applicant_email: String,
    pub tour_title: String,
}

#[async_trait]
pub trait AdminNotifier: Send + Sync {
    async fn notify_admin(&self, notification: AdminNotification) -> Result<(), AppError>;
}

/// SMTP-backed notifier. `from_config` returns `None` when email alerts are
/// disabled or SMTP is not configured.
#[derive(Clone)]
pub struct EmailNotifier {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
    admin_email: String,
}

impl EmailNotifier {
    pub fn from_config(config: &Config) -> Option<Self> {
        if !config.email_alerts_enabled() {
            tracing::debug!("Email alerts disabled (EMAIL_ALERTS_ENABLED=false)");
            return None;
        }
        let host = config.smtp_host()?;
        let from = config.smtp_from()?.to_string();
        let admin_email = config.admin_alert_email()?.to_string();
        let port = config.smtp_port().unwrap_or(587);

        let mailer = if config.smtp_tls() {
            let b = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host).ok()?;
            let b = b.port(port);
            let b = if let (Some(u), Some(p)) = (config.smtp_user(), config.smtp_password()) {
                b.credentials(Credentials::new(u.to_string(), p.to_string()))
            } else {
                b
            };
            tracing::info!(
                host = %host,
                port = port,
                "Admin notifier initialized (SMTP with STARTTLS)"
            );
            b.build()
        } else {
            let b = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port);
            let b = if let (Some(u), Some(p)) = (config.smtp_user(), config.smtp_password()) {
                b.credentials(Credentials::new(u.to_string(), p.to_string()))
            } else {
                b
            };
            tracing::info!(host = %host, port = port, "Admin notifier initialized (SMTP)");
            b.build()
        };

        Some(Self {
            mailer: Arc::new(mailer),
            from,
            admin_email,
        })
    }
}

#[async_trait]
impl AdminNotifier for EmailNotifier {
    async fn notify_admin(&self, notification: AdminNotification) -> Result<(), AppError> {
        let from_addr: Mailbox = self
            .from
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid SMTP_FROM: {}", e)))?;
        let to_addr: Mailbox = self
            .admin_email
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid ADMIN_ALERT_EMAIL: {}", e)))?;

        let subject = format!(
            "New visa application submitted ({})",
            notification.applicant_kind
        );
        let mut body = format!(
            "A visa application form was submitted.\n\n\
             Applicant: {} <{}>\n\
             Applicant type: {}\n\
             Tour: {}\n\
             Booking: {}\n",
            notification.applicant_name,
            notification.applicant_email,
            notification.applicant_kind,
            notification.tour_title,
            notification.booking_id,
        );
        if let Some(dependant_id) = notification.dependant_id {
            body.push_str(&format!("Dependant: {}\n", dependant_id));
        }

        let email = Message::builder()
            .from(from_addr)
            .to(to_addr)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| AppError::Internal(format!("SMTP send failed: {}", e)))?;

        tracing::info!(
            booking_id = %notification.booking_id,
            "Admin notification email sent"
        );
        Ok(())
    }
}

/// Notifier used when alerts are not configured.
#[derive(Clone, Default)]
pub struct NoopNotifier;

#[async_trait]
impl AdminNotifier for NoopNotifier {
    async fn notify_admin(&self, notification: AdminNotification) -> Result<(), AppError> {
        tracing::debug!(
            booking_id = %notification.booking_id,
            applicant_kind = %notification.applicant_kind,
            "Admin notification skipped (no notifier configured)"
        );
        Ok(())
    }
}
