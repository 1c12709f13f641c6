//! # comreg-notify — License Expiry Reminders
//!
//! Builds and dispatches expiry-reminder emails for licenses approaching
//! their expiration date. Dispatch failures are reported as a boolean, not
//! propagated: the reminder job decides whether to log and continue.
//!
//! SMTP configuration comes from the environment (`SMTP_HOST`, `SMTP_PORT`,
//! `SMTP_USER`, `SMTP_PASSWORD`, `SMTP_FROM`); when `SMTP_HOST` or
//! `SMTP_FROM` is absent the mailer is considered unconfigured and callers
//! should skip dispatch.

use chrono::NaiveDate;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Presentation severity of a reminder, derived from days until expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderSeverity {
    /// Seven days or fewer remain.
    Urgent,
    /// Between eight and fifteen days remain.
    Warning,
    /// More than fifteen days remain.
    Info,
}

impl ReminderSeverity {
    /// Classify a day count into a severity band.
    pub fn for_days(days_until_expiry: i64) -> Self {
        if days_until_expiry <= 7 {
            Self::Urgent
        } else if days_until_expiry <= 15 {
            Self::Warning
        } else {
            Self::Info
        }
    }

    /// Heading color used in the HTML message for this severity.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Urgent => "#dc2626",
            Self::Warning => "#f59e0b",
            Self::Info => "#16a34a",
        }
    }
}

/// A single expiry reminder to be formatted and sent.
#[derive(Debug, Clone)]
pub struct ExpiryReminder {
    /// Recipient email address.
    pub recipient: String,
    /// Name of the company holding the license.
    pub company_name: String,
    /// The license type, e.g. "Money Transfer License".
    pub license_type: String,
    /// The license's expiration date.
    pub expiration_date: NaiveDate,
    /// Whole days until expiry (may be zero on the expiration day).
    pub days_until_expiry: i64,
}

impl ExpiryReminder {
    /// Severity band for this reminder.
    pub fn severity(&self) -> ReminderSeverity {
        ReminderSeverity::for_days(self.days_until_expiry)
    }

    /// Subject line for the reminder email.
    pub fn subject(&self) -> String {
        format!(
            "License Expiry Reminder: {} - {}",
            self.license_type, self.company_name
        )
    }

    /// HTML body for the reminder email.
    pub fn html_body(&self) -> String {
        let severity = self.severity();
        let urgency_line = if matches!(severity, ReminderSeverity::Urgent) {
            "URGENT: This license expires in 7 days or less. Please take immediate action."
        } else {
            "Please ensure timely renewal to maintain compliance."
        };

        format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: {color};">License Expiry Notification</h2>
  <p>Dear Compliance Officer,</p>
  <p>This is an automated reminder that the following license is approaching its expiration date:</p>
  <div style="background-color: #f3f4f6; padding: 15px; border-radius: 5px; margin: 20px 0;">
    <p><strong>Company:</strong> {company}</p>
    <p><strong>License Type:</strong> {license_type}</p>
    <p><strong>Expiration Date:</strong> {expiration}</p>
    <p><strong>Days Until Expiry:</strong> {days} days</p>
  </div>
  <p>{urgency_line}</p>
  <p>Best regards,<br>COMREG Compliance Registry</p>
</div>"#,
            color = severity.color(),
            company = self.company_name,
            license_type = self.license_type,
            expiration = self.expiration_date.format("%Y-%m-%d"),
            days = self.days_until_expiry,
            urgency_line = urgency_line,
        )
    }
}

/// SMTP configuration, loaded from the environment.
#[derive(Clone)]
pub struct MailerConfig {
    /// SMTP relay hostname.
    pub host: String,
    /// SMTP relay port (STARTTLS).
    pub port: u16,
    /// Optional credentials; both user and password must be present.
    pub credentials: Option<(String, String)>,
    /// Sender address.
    pub from: String,
}

impl std::fmt::Debug for MailerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "credentials",
                &self.credentials.as_ref().map(|_| "[REDACTED]"),
            )
            .field("from", &self.from)
            .finish()
    }
}

impl MailerConfig {
    /// Load SMTP configuration from the environment.
    ///
    /// Returns `None` when `SMTP_HOST` or `SMTP_FROM` is unset — the
    /// registry then operates without reminders rather than failing.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;
        let from = std::env::var("SMTP_FROM").ok()?;
        let port = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(587);
        let credentials = match (
            std::env::var("SMTP_USER").ok(),
            std::env::var("SMTP_PASSWORD").ok(),
        ) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        };
        Some(Self {
            host,
            port,
            credentials,
            from,
        })
    }
}

/// Error building the SMTP transport or parsing the sender address.
#[derive(Debug)]
pub enum MailerError {
    /// The configured `from` (or a recipient) address is not a valid mailbox.
    InvalidAddress(String),
    /// The SMTP transport could not be constructed.
    Smtp(String),
}

impl std::fmt::Display for MailerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAddress(msg) => write!(f, "invalid mailbox address: {msg}"),
            Self::Smtp(msg) => write!(f, "smtp transport error: {msg}"),
        }
    }
}

impl std::error::Error for MailerError {}

/// Async SMTP mailer for expiry reminders.
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    /// Build a mailer from configuration.
    pub fn new(config: &MailerConfig) -> Result<Self, MailerError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| MailerError::InvalidAddress(format!("{e}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailerError::Smtp(e.to_string()))?
            .port(config.port);
        if let Some((user, pass)) = &config.credentials {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    /// Send one expiry reminder.
    ///
    /// Returns `true` on successful dispatch. All failures — bad recipient
    /// address, message construction, SMTP errors — are logged and reported
    /// as `false`; callers decide whether to retry or move on.
    pub async fn send_expiry_reminder(&self, reminder: &ExpiryReminder) -> bool {
        let to: Mailbox = match reminder.recipient.parse() {
            Ok(mailbox) => mailbox,
            Err(e) => {
                tracing::warn!(
                    recipient = %reminder.recipient,
                    error = %e,
                    "invalid reminder recipient address"
                );
                return false;
            }
        };

        let message = match Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(reminder.subject())
            .header(ContentType::TEXT_HTML)
            .body(reminder.html_body())
        {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "failed to build reminder message");
                return false;
            }
        };

        match self.transport.send(message).await {
            Ok(_) => {
                tracing::info!(
                    recipient = %reminder.recipient,
                    company = %reminder.company_name,
                    license_type = %reminder.license_type,
                    days = reminder.days_until_expiry,
                    "expiry reminder sent"
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    recipient = %reminder.recipient,
                    error = %e,
                    "failed to send expiry reminder"
                );
                false
            }
        }
    }
}
