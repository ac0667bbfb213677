//! Publishing to the microblogging service
//!
//! The bot hands a finished sentence and the operator's credentials to a
//! [`Publisher`]. Each attempt logs in from scratch; nothing about a session
//! survives between attempts.

mod http;

pub use http::HttpPublisher;

use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors raised by a publish attempt
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    #[error("HTTP error publishing to {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Publish rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Something that can publish a message
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes `message`, logging in with `credentials` first
    async fn publish(&self, message: &str, credentials: &Credentials) -> Result<(), PublishError>;
}

/// Opaque credential blob
///
/// The bot only ever checks whether it is empty. Publishers interpret it as
/// newline-separated fields (see [`Credentials::fields`]).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    blob: String,
}

/// The four fields a publisher logs in with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialFields<'a> {
    pub consumer_key: &'a str,
    pub consumer_secret: &'a str,
    pub access_token: &'a str,
    pub access_token_secret: &'a str,
}

impl Credentials {
    /// Wraps a credential blob
    pub fn new(blob: impl Into<String>) -> Self {
        Self { blob: blob.into() }
    }

    /// Reads a credential blob from a file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }

    /// Returns true if the blob holds nothing but whitespace
    pub fn is_empty(&self) -> bool {
        self.blob.trim().is_empty()
    }

    /// Splits the blob into its fields
    ///
    /// The first four lines are, in order: consumer key, consumer secret,
    /// access token, access token secret. Anything after them is ignored.
    pub fn fields(&self) -> Result<CredentialFields<'_>, PublishError> {
        let mut lines = self.blob.lines().map(str::trim);

        Ok(CredentialFields {
            consumer_key: next_field(&mut lines, "consumer key")?,
            consumer_secret: next_field(&mut lines, "consumer secret")?,
            access_token: next_field(&mut lines, "access token")?,
            access_token_secret: next_field(&mut lines, "access token secret")?,
        })
    }
}

fn next_field<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    name: &str,
) -> Result<&'a str, PublishError> {
    match lines.next() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(PublishError::Credentials(format!("missing {}", name))),
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("empty", &self.is_empty())
            .finish_non_exhaustive()
    }
}
