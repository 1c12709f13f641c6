//! # Remind Subcommand
//!
//! The scheduled notification job. Connects to the registry database,
//! re-derives every license's status from its expiration date (persisting
//! any changes), then sends one expiry-reminder email per license due
//! within the window. Individual send failures are counted, not fatal —
//! the job exits non-zero so the scheduler can flag the run.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use comreg_core::status::RENEWAL_WINDOW_DAYS;
use comreg_core::LicenseStatus;
use comreg_notify::{ExpiryReminder, Mailer, MailerConfig};

/// Arguments for the `comreg remind` subcommand.
#[derive(Args, Debug)]
pub struct RemindArgs {
    /// Reminder window in days; licenses expiring within this many days
    /// (and not yet expired) get a reminder.
    #[arg(long, default_value_t = RENEWAL_WINDOW_DAYS)]
    pub days: i64,

    /// Recipient address; falls back to the REMINDER_RECIPIENT environment
    /// variable.
    #[arg(long)]
    pub recipient: Option<String>,

    /// Refresh statuses and list due licenses without sending email.
    #[arg(long)]
    pub dry_run: bool,
}

/// Run the reminder job. Returns the process exit code.
pub async fn run_remind(args: &RemindArgs) -> Result<u8> {
    let url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set for the remind job")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .context("failed to connect to registry database")?;

    let companies = comreg_api::db::companies::load_all(&pool).await?;
    let company_names: HashMap<Uuid, String> =
        companies.into_iter().map(|c| (c.id, c.name)).collect();

    let licenses = comreg_api::db::licenses::load_all(&pool).await?;
    let today = Utc::now().date_naive();

    // Refresh sweep: stored status drifts as days pass without writes.
    let mut refreshed = 0usize;
    for license in &licenses {
        let derived = LicenseStatus::classify(license.expiration_date, today);
        if derived != license.status {
            comreg_api::db::licenses::update_status(&pool, license.id, derived, Utc::now())
                .await?;
            refreshed += 1;
        }
    }
    tracing::info!(total = licenses.len(), refreshed, "license status refresh complete");

    let due: Vec<_> = licenses
        .iter()
        .filter(|l| {
            let days_until = (l.expiration_date - today).num_days();
            (0..=args.days).contains(&days_until)
        })
        .collect();

    if due.is_empty() {
        tracing::info!(window_days = args.days, "no licenses due for a reminder");
        return Ok(0);
    }

    let recipient = args
        .recipient
        .clone()
        .or_else(|| std::env::var("REMINDER_RECIPIENT").ok())
        .context("no reminder recipient: pass --recipient or set REMINDER_RECIPIENT")?;

    if args.dry_run {
        for license in &due {
            let days_until = (license.expiration_date - today).num_days();
            println!(
                "{}  {}  expires {} ({} days)",
                company_name(&company_names, license.company_id),
                license.license_type,
                license.expiration_date,
                days_until
            );
        }
        tracing::info!(due = due.len(), "dry run — no email sent");
        return Ok(0);
    }

    let config = MailerConfig::from_env()
        .context("SMTP not configured: set SMTP_HOST and SMTP_FROM")?;
    let mailer = Mailer::new(&config)?;

    let mut sent = 0usize;
    let mut failed = 0usize;
    for license in &due {
        let reminder = ExpiryReminder {
            recipient: recipient.clone(),
            company_name: company_name(&company_names, license.company_id),
            license_type: license.license_type.clone(),
            expiration_date: license.expiration_date,
            days_until_expiry: (license.expiration_date - today).num_days(),
        };
        if mailer.send_expiry_reminder(&reminder).await {
            sent += 1;
        } else {
            failed += 1;
        }
    }

    tracing::info!(sent, failed, "reminder run complete");
    Ok(if failed > 0 { 1 } else { 0 })
}

fn company_name(names: &HashMap<Uuid, String>, company_id: Uuid) -> String {
    names
        .get(&company_id)
        .cloned()
        .unwrap_or_else(|| "unknown company".to_string())
}
