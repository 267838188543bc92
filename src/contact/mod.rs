//! Contact form handling: validation, spam filtering and rate limiting

mod delivery;
mod rate_limit;

pub use delivery::{LogSink, MessageSink};
pub use rate_limit::{InMemoryRateLimiter, RateDecision, RateLimiter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::ContactConfig;

/// Why a submission was refused
#[derive(Error, Debug)]
pub enum ContactError {
    #[error("Invalid JSON in request body")]
    InvalidJson,

    #[error("Invalid form data: {0}")]
    Invalid(String),

    #[error("Message contains prohibited content")]
    Spam,

    #[error("Too many requests")]
    RateLimited { retry_after: Duration },

    #[error("Delivery failed: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ContactError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }
}

/// A validated contact form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub company: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// Validate a decoded JSON body.
    ///
    /// Lengths are counted in characters before trimming. The returned form
    /// has trimmed fields and a lower-cased email.
    pub fn validate(value: &Value, limits: &ContactConfig) -> Result<Self, ContactError> {
        let fields = value
            .as_object()
            .ok_or_else(|| ContactError::invalid("body must be an object"))?;

        let name = required_field(fields, "name")?;
        let email = required_field(fields, "email")?;
        if !email.contains('@') {
            return Err(ContactError::invalid("`email` must contain @"));
        }
        let message = required_field(fields, "message")?;
        let company = optional_field(fields, "company");
        let subject = optional_field(fields, "subject");

        check_length("name", name, limits.max_name_len)?;
        check_length("email", email, limits.max_email_len)?;
        check_length("company", company, limits.max_company_len)?;
        check_length("message", message, limits.max_message_len)?;

        Ok(Self {
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            company: company.to_string(),
            subject: subject.to_string(),
            message: message.trim().to_string(),
        })
    }

    /// Strip angle brackets and normalise line endings in every field
    pub fn sanitized(&self) -> Self {
        Self {
            name: sanitize_input(&self.name),
            email: sanitize_input(&self.email),
            company: sanitize_input(&self.company),
            subject: sanitize_input(&self.subject),
            message: sanitize_input(&self.message),
        }
    }

    /// Whether the message mentions any denylisted keyword (case-insensitive)
    pub fn is_spam(&self, keywords: &[String]) -> bool {
        let message = self.message.to_lowercase();
        keywords
            .iter()
            .any(|keyword| message.contains(&keyword.to_lowercase()))
    }
}

fn required_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Result<&'a str, ContactError> {
    match fields.get(key).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(ContactError::invalid(format!("`{}` is required", key))),
    }
}

fn optional_field<'a>(fields: &'a Map<String, Value>, key: &str) -> &'a str {
    fields.get(key).and_then(Value::as_str).unwrap_or("").trim()
}

fn check_length(key: &str, value: &str, max: usize) -> Result<(), ContactError> {
    if value.chars().count() > max {
        return Err(ContactError::invalid(format!(
            "`{}` is longer than {} characters",
            key, max
        )));
    }
    Ok(())
}

fn sanitize_input(input: &str) -> String {
    input
        .replace(['<', '>'], "")
        .replace("\r\n", "\n")
        .trim()
        .to_string()
}

/// An accepted submission handed to the delivery sink
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub form: ContactForm,
    pub client: String,
    pub received_at: DateTime<Utc>,
}

/// The contact endpoint's logic, independent of HTTP
#[derive(Clone)]
pub struct ContactService {
    config: ContactConfig,
    limiter: Arc<dyn RateLimiter>,
    sink: Arc<dyn MessageSink>,
}

impl ContactService {
    pub fn new(
        config: ContactConfig,
        limiter: Arc<dyn RateLimiter>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            config,
            limiter,
            sink,
        }
    }

    /// In-memory limiter and log delivery
    pub fn from_config(config: &ContactConfig) -> Self {
        Self::new(
            config.clone(),
            Arc::new(InMemoryRateLimiter::from_config(config)),
            Arc::new(LogSink),
        )
    }

    /// Process one submission from `client`.
    ///
    /// The rate limit is counted before the body is looked at, so malformed
    /// requests also use up the client's allowance.
    pub fn submit(&self, client: &str, body: &[u8]) -> Result<Submission, ContactError> {
        if let RateDecision::Limited { retry_after } = self.limiter.check(client) {
            tracing::warn!("Rate limited contact submission from {}", client);
            return Err(ContactError::RateLimited { retry_after });
        }

        let value: Value = serde_json::from_slice(body).map_err(|e| {
            tracing::debug!("Rejected contact body from {}: {}", client, e);
            ContactError::InvalidJson
        })?;

        let form = ContactForm::validate(&value, &self.config)?.sanitized();

        if form.is_spam(&self.config.spam_keywords) {
            tracing::info!("Rejected spam contact submission from {}", client);
            return Err(ContactError::Spam);
        }

        let submission = Submission {
            form,
            client: client.to_string(),
            received_at: Utc::now(),
        };
        self.sink.deliver(&submission)?;
        Ok(submission)
    }
}
