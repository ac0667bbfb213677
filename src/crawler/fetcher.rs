//! Forum API fetcher
//!
//! This module handles all requests to the forum API, including:
//! - Building the HTTP client with the configured user agent
//! - Listing the headline posts of a forum
//! - Fetching and flattening the comment tree of a post
//! - Classifying failures into [`FetchError`]

use crate::config::ForumConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A headline post in a forum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Forum-assigned post id
    pub id: String,

    /// Forum the post was listed in
    pub forum: String,

    /// Post title
    pub title: String,

    /// Path of the post's comment page, relative to the API base
    pub permalink: String,
}

/// A single comment on a post
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// Raw comment text
    pub body: String,

    /// Author's user name
    pub author: String,

    /// Creation time in seconds since the Unix epoch
    pub created_at: f64,
}

/// Errors raised while talking to the forum API
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Read access to a discussion forum
#[async_trait]
pub trait ForumClient: Send + Sync {
    /// Lists the current headline posts of `forum`
    async fn list_headlines(&self, forum: &str) -> Result<Vec<Post>, FetchError>;

    /// Lists every comment on `post`, replies included
    async fn list_comments(&self, post: &Post) -> Result<Vec<Comment>, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The forum configuration (user agent is taken from here)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ForumConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Listing envelope used by every forum API response
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

/// A tagged listing child; the payload shape depends on `kind`
#[derive(Debug, Deserialize)]
struct Thing {
    kind: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct PostData {
    id: String,
    #[serde(default)]
    title: String,
    permalink: String,
}

#[derive(Debug, Deserialize)]
struct CommentData {
    #[serde(default)]
    body: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    created_utc: f64,
    /// Either an empty string or a nested listing
    #[serde(default)]
    replies: Value,
}

/// Reddit-style JSON API client
#[derive(Debug, Clone)]
pub struct RedditClient {
    client: Client,
    base_url: Url,
    headline_limit: u32,
}

impl RedditClient {
    /// Creates a client from the forum configuration
    pub fn new(config: &ForumConfig) -> Result<Self, crate::BotError> {
        let client = build_http_client(config)?;
        let mut base_url = Url::parse(&config.api_base)?;
        // Relative joins replace the last path segment unless it ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client,
            base_url,
            headline_limit: config.headline_limit,
        })
    }

    /// URL of a forum's headline listing
    fn headlines_url(&self, forum: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.join(&format!("r/{}/hot.json", forum))?;
        url.query_pairs_mut()
            .append_pair("limit", &self.headline_limit.to_string());
        Ok(url)
    }

    /// URL of a post's comment tree
    fn comments_url(&self, post: &Post) -> Result<Url, FetchError> {
        let path = format!("{}.json", post.permalink.trim_end_matches('/'));
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Sends a GET and returns the decoded JSON body
    async fn get_json(&self, url: Url) -> Result<Value, FetchError> {
        let url_str = url.to_string();
        tracing::debug!("GET {}", url_str);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Http {
                url: url_str.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url_str,
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| FetchError::Decode {
            url: url_str,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ForumClient for RedditClient {
    async fn list_headlines(&self, forum: &str) -> Result<Vec<Post>, FetchError> {
        let url = self.headlines_url(forum)?;
        let url_str = url.to_string();
        let body = self.get_json(url).await?;

        let listing: Listing = serde_json::from_value(body).map_err(|e| FetchError::Decode {
            url: url_str.clone(),
            message: e.to_string(),
        })?;

        let mut posts = Vec::new();
        for thing in listing.data.children {
            if thing.kind != "t3" {
                continue;
            }
            match serde_json::from_value::<PostData>(thing.data) {
                Ok(data) => posts.push(Post {
                    id: data.id,
                    forum: forum.to_string(),
                    title: data.title,
                    permalink: data.permalink,
                }),
                Err(e) => tracing::debug!("Skipping malformed post in {}: {}", url_str, e),
            }
        }

        Ok(posts)
    }

    async fn list_comments(&self, post: &Post) -> Result<Vec<Comment>, FetchError> {
        let url = self.comments_url(post)?;
        let url_str = url.to_string();
        let body = self.get_json(url).await?;

        // The response is [post listing, comment listing]
        let comment_listing = match body {
            Value::Array(mut parts) if parts.len() >= 2 => parts.swap_remove(1),
            _ => {
                return Err(FetchError::Decode {
                    url: url_str,
                    message: "expected a two-element listing array".to_string(),
                })
            }
        };

        let listing: Listing =
            serde_json::from_value(comment_listing).map_err(|e| FetchError::Decode {
                url: url_str,
                message: e.to_string(),
            })?;

        let mut comments = Vec::new();
        flatten_comments(listing, &mut comments);
        Ok(comments)
    }
}

/// Walks a comment listing depth first, collecting every `t1` comment
///
/// "Load more" stubs and anything that fails to decode are skipped.
fn flatten_comments(listing: Listing, out: &mut Vec<Comment>) {
    for thing in listing.data.children {
        if thing.kind != "t1" {
            continue;
        }

        let data = match serde_json::from_value::<CommentData>(thing.data) {
            Ok(data) => data,
            Err(e) => {
                tracing::trace!("Skipping malformed comment: {}", e);
                continue;
            }
        };

        out.push(Comment {
            body: data.body,
            author: data.author,
            created_at: data.created_utc,
        });

        if data.replies.is_object() {
            if let Ok(replies) = serde_json::from_value::<Listing>(data.replies) {
                flatten_comments(replies, out);
            }
        }
    }
}
