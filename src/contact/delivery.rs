//! Where accepted contact submissions go

use anyhow::Result;

use super::Submission;

/// Delivery backend for accepted submissions
pub trait MessageSink: Send + Sync {
    fn deliver(&self, submission: &Submission) -> Result<()>;
}

/// Writes submissions to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl MessageSink for LogSink {
    fn deliver(&self, submission: &Submission) -> Result<()> {
        let form = &submission.form;
        tracing::info!(
            name = %form.name,
            email = %form.email,
            company = %form.company,
            subject = %form.subject,
            client = %submission.client,
            received_at = %submission.received_at.to_rfc3339(),
            "Contact form submission: {}",
            form.message
        );
        Ok(())
    }
}
