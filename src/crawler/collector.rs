//! Candidate collection for a single forum
//!
//! The crawler fetches a forum's headlines, fans out one task per post to
//! fetch its comments, runs the extractor over every comment and joins all
//! tasks before returning. Results are merged in post order so a forum
//! always yields its candidates in discovery order.

use crate::crawler::extractor::extract_acceptable;
use crate::crawler::fetcher::{Comment, ForumClient};
use crate::crawler::throttle::Throttle;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinSet;

/// An extracted TLDR sentence awaiting a publish decision
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The sentence that would be published
    pub content: String,

    /// Author of the comment it came from
    pub author: String,

    /// When that comment was written
    pub created_at: DateTime<Utc>,
}

impl Candidate {
    /// Builds a candidate from an extracted sentence and its source comment
    pub fn from_comment(content: String, comment: &Comment) -> Self {
        let secs = comment.created_at.trunc() as i64;
        let nanos = (comment.created_at.fract() * 1e9) as u32;

        Self {
            content,
            author: comment.author.clone(),
            created_at: DateTime::<Utc>::from_timestamp(secs, nanos).unwrap_or_default(),
        }
    }
}

/// Runs the extractor over comments, keeping only acceptable sentences
pub fn candidates_from_comments(comments: &[Comment], max_chars: usize) -> Vec<Candidate> {
    comments
        .iter()
        .filter_map(|comment| {
            extract_acceptable(&comment.body, max_chars)
                .map(|sentence| Candidate::from_comment(sentence, comment))
        })
        .inspect(|candidate| {
            tracing::debug!("Found candidate by {}: {}", candidate.author, candidate.content)
        })
        .collect()
}

/// Fetch-and-extract half of the bot
#[derive(Clone)]
pub struct Crawler {
    client: Arc<dyn ForumClient>,
    throttle: Arc<Throttle>,
    max_message_chars: usize,
}

impl Crawler {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `client` - The forum API collaborator
    /// * `throttle` - Pacer shared by every fetch
    /// * `max_message_chars` - Length ceiling for accepted candidates
    pub fn new(
        client: Arc<dyn ForumClient>,
        throttle: Arc<Throttle>,
        max_message_chars: usize,
    ) -> Self {
        Self {
            client,
            throttle,
            max_message_chars,
        }
    }

    /// Collects every acceptable candidate from one forum
    ///
    /// A failed headline fetch yields no candidates. A failed comment fetch
    /// only drops that post. Both are logged with the forum and stage.
    pub async fn collect_candidates(&self, forum: &str) -> Vec<Candidate> {
        self.throttle.acquire().await;
        let posts = match self.client.list_headlines(forum).await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::warn!(forum, stage = "headlines", error = %e, "Headline fetch failed");
                return Vec::new();
            }
        };

        tracing::debug!("Fetched {} headline posts from {}", posts.len(), forum);

        let mut tasks = JoinSet::new();
        for (index, post) in posts.into_iter().enumerate() {
            let client = Arc::clone(&self.client);
            let throttle = Arc::clone(&self.throttle);
            let max_chars = self.max_message_chars;

            tasks.spawn(async move {
                throttle.acquire().await;
                let found = match client.list_comments(&post).await {
                    Ok(comments) => candidates_from_comments(&comments, max_chars),
                    Err(e) => {
                        tracing::warn!(
                            forum = %post.forum,
                            post = %post.id,
                            stage = "comments",
                            error = %e,
                            "Comment fetch failed, skipping post"
                        );
                        Vec::new()
                    }
                };
                (index, found)
            });
        }

        // Every task must finish before candidates are handed on
        let mut per_post = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => per_post.push(result),
                Err(e) => tracing::warn!(forum, stage = "comments", "Comment task failed: {}", e),
            }
        }

        per_post.sort_by_key(|(index, _)| *index);
        let candidates: Vec<Candidate> = per_post
            .into_iter()
            .flat_map(|(_, found)| found)
            .collect();

        tracing::info!("Collected {} candidates from {}", candidates.len(), forum);
        candidates
    }
}
