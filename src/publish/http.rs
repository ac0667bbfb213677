//! HTTP publisher
//!
//! Posts a form-encoded `status` field to the configured endpoint. Request
//! signing is left to whatever sits behind the endpoint; the session only
//! carries the access token.

use crate::config::PublisherConfig;
use crate::publish::{Credentials, PublishError, Publisher};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Publisher backed by an HTTP status-update endpoint
#[derive(Debug, Clone)]
pub struct HttpPublisher {
    client: Client,
    endpoint: Url,
}

/// A logged-in publishing session, valid for one attempt
struct Session<'a> {
    client: &'a Client,
    authorization: String,
}

impl<'a> Session<'a> {
    /// Establishes a session from the credential blob
    fn login(client: &'a Client, credentials: &Credentials) -> Result<Self, PublishError> {
        let fields = credentials.fields()?;
        Ok(Self {
            client,
            authorization: format!("Bearer {}", fields.access_token),
        })
    }

    /// Sends one status update
    async fn post_status(&self, endpoint: &Url, message: &str) -> Result<(), PublishError> {
        let response = self
            .client
            .post(endpoint.clone())
            .header(AUTHORIZATION, &self.authorization)
            .form(&[("status", message)])
            .send()
            .await
            .map_err(|e| PublishError::Http {
                url: endpoint.to_string(),
                source: e,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(PublishError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

impl HttpPublisher {
    /// Creates a publisher for the configured endpoint
    pub fn new(config: &PublisherConfig, user_agent: &str) -> Result<Self, crate::BotError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let endpoint = Url::parse(&config.endpoint)?;

        Ok(Self { client, endpoint })
    }

    /// The status-update endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Publisher for HttpPublisher {
    async fn publish(&self, message: &str, credentials: &Credentials) -> Result<(), PublishError> {
        let session = Session::login(&self.client, credentials)?;
        session.post_status(&self.endpoint, message).await?;
        tracing::debug!("Published to {}", self.endpoint);
        Ok(())
    }
}
