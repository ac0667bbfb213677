//! Integration tests for the bot
//!
//! These tests use wiremock to stand in for both the forum API and the
//! publishing endpoint, and test the full crawl-and-publish cycle end-to-end.

use serde_json::{json, Value};
use std::path::Path;
use tldr_bot::config::Config;
use tldr_bot::crawler::{run_once, FetchError, ForumClient, Post, RedditClient};
use tldr_bot::publish::{HttpPublisher, PublishError, Publisher};
use tldr_bot::storage::MemoryStorage;
use tldr_bot::{Bot, Credentials, RunOutcome, RunState};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STATUS_PATH: &str = "/1.1/statuses/update.json";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    let mut config = Config::default();
    config.forum.api_base = base_url.to_string();
    config.forum.requests_per_minute = 600; // Very short pacing for testing
    config.forum.defaults = vec!["askreddit".to_string()];
    config.publisher.endpoint = format!("{}{}", base_url, STATUS_PATH);
    config.files.history = dir.join("history.txt");
    config.files.forums = dir.join("forums.txt");
    config.files.credentials = dir.join("CREDENTIALS");
    config
}

fn test_credentials() -> Credentials {
    Credentials::new("consumer-key\nconsumer-secret\naccess-token\naccess-secret\n")
}

fn headline_listing(forum: &str, ids: &[&str]) -> Value {
    let children: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "kind": "t3",
                "data": {
                    "id": id,
                    "title": format!("Post {}", id),
                    "permalink": format!("/r/{}/comments/{}/post_{}/", forum, id, id),
                }
            })
        })
        .collect();

    json!({ "kind": "Listing", "data": { "children": children } })
}

fn comment(body: &str, author: &str, replies: Value) -> Value {
    json!({
        "kind": "t1",
        "data": {
            "body": body,
            "author": author,
            "created_utc": 1_700_000_000.0,
            "replies": replies,
        }
    })
}

/// A comment page: the post listing followed by the comment listing
fn comment_page(children: Vec<Value>) -> Value {
    json!([
        { "kind": "Listing", "data": { "children": [] } },
        { "kind": "Listing", "data": { "children": children } },
    ])
}

async fn mount_forum(server: &MockServer, forum: &str, id: &str, comments: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(format!("/r/{}/hot.json", forum)))
        .and(query_param("limit", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(headline_listing(forum, &[id])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/r/{}/comments/{}/post_{}.json", forum, id, id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(comment_page(comments)))
        .mount(server)
        .await;
}

fn read_history(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("Failed to read history")
        .lines()
        .map(String::from)
        .collect()
}

#[tokio::test]
async fn test_reddit_client_lists_headlines() {
    let mock_server = MockServer::start().await;

    let mut listing = headline_listing("askscience", &["a1", "b2"]);
    listing["data"]["children"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "kind": "t5", "data": { "display_name": "not a post" } }));

    Mock::given(method("GET"))
        .and(path("/r/askscience/hot.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());
    let client = RedditClient::new(&config.forum).expect("Failed to create client");

    let posts = client.list_headlines("askscience").await.unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, "a1");
    assert_eq!(posts[0].forum, "askscience");
    assert_eq!(posts[1].permalink, "/r/askscience/comments/b2/post_b2/");
}

#[tokio::test]
async fn test_reddit_client_flattens_nested_comments() {
    let mock_server = MockServer::start().await;

    let nested = json!({
        "kind": "Listing",
        "data": { "children": [
            comment("tldr nested reply.", "bob", json!("")),
            { "kind": "more", "data": { "count": 12 } },
        ]}
    });
    let comments = vec![
        comment("Top level. TL;DR it works.", "alice", nested),
        comment("no summary here", "carol", json!("")),
    ];
    mount_forum(&mock_server, "askreddit", "xyz", comments).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());
    let client = RedditClient::new(&config.forum).unwrap();

    let post = Post {
        id: "xyz".to_string(),
        forum: "askreddit".to_string(),
        title: "Post xyz".to_string(),
        permalink: "/r/askreddit/comments/xyz/post_xyz/".to_string(),
    };
    let comments = client.list_comments(&post).await.unwrap();

    let authors: Vec<&str> = comments.iter().map(|c| c.author.as_str()).collect();
    assert_eq!(authors, vec!["alice", "bob", "carol"]);
    assert_eq!(comments[1].body, "tldr nested reply.");
}

#[tokio::test]
async fn test_reddit_client_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/askreddit/hot.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());
    let client = RedditClient::new(&config.forum).unwrap();

    let result = client.list_headlines("askreddit").await;
    assert!(matches!(
        result,
        Err(FetchError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_http_publisher_posts_form_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STATUS_PATH))
        .and(header("authorization", "Bearer access-token"))
        .and(body_string_contains("status=tl%3Bdr+it+works."))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());
    let publisher = HttpPublisher::new(&config.publisher, "test-agent").unwrap();

    publisher
        .publish("tl;dr it works.", &test_credentials())
        .await
        .expect("Publish failed");
}

#[tokio::test]
async fn test_http_publisher_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("duplicate status"))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());
    let publisher = HttpPublisher::new(&config.publisher, "test-agent").unwrap();

    let result = publisher.publish("tldr again.", &test_credentials()).await;
    match result {
        Err(PublishError::Rejected { status, body }) => {
            assert_eq!(status, 403);
            assert_eq!(body, "duplicate status");
        }
        other => panic!("Expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_full_run_publishes_and_persists() {
    let mock_server = MockServer::start().await;

    mount_forum(
        &mock_server,
        "askreddit",
        "abc",
        vec![comment("Long story... TL;DR it works. thanks", "alice", json!(""))],
    )
    .await;

    Mock::given(method("POST"))
        .and(path(STATUS_PATH))
        .and(body_string_contains("status=tl%3Bdr+it+works."))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    let outcome = run_once(&config, test_credentials())
        .await
        .expect("Run failed");

    assert_eq!(
        outcome,
        RunOutcome::Published {
            message: "tl;dr it works.".to_string(),
            forum: "askreddit".to_string(),
        }
    );
    assert_eq!(read_history(&config.files.history), vec!["tl;dr it works."]);
}

#[tokio::test]
async fn test_second_run_skips_published_message() {
    let mock_server = MockServer::start().await;

    mount_forum(
        &mock_server,
        "askreddit",
        "abc",
        vec![comment("tldr only once.", "alice", json!(""))],
    )
    .await;

    // Only the first run may publish
    Mock::given(method("POST"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    let first = run_once(&config, test_credentials()).await.unwrap();
    assert!(first.is_success());

    let second = run_once(&config, test_credentials()).await.unwrap();
    assert_eq!(second, RunOutcome::Exhausted { forums_tried: 1 });
    assert_eq!(read_history(&config.files.history), vec!["tldr only once."]);
}

#[tokio::test]
async fn test_failed_publish_is_remembered_by_default() {
    let mock_server = MockServer::start().await;

    mount_forum(
        &mock_server,
        "askreddit",
        "abc",
        vec![comment("tldr the endpoint is down.", "alice", json!(""))],
    )
    .await;

    Mock::given(method("POST"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    let outcome = run_once(&config, test_credentials()).await.unwrap();

    assert_eq!(outcome, RunOutcome::Exhausted { forums_tried: 1 });
    assert_eq!(
        read_history(&config.files.history),
        vec!["tldr the endpoint is down."]
    );
}

#[tokio::test]
async fn test_run_timeout_still_flushes_history() {
    let mock_server = MockServer::start().await;

    mount_forum(
        &mock_server,
        "first",
        "f1",
        vec![comment("tldr burned before the timeout.", "alice", json!(""))],
    )
    .await;

    // The second forum's comments take longer than the whole run may
    Mock::given(method("GET"))
        .and(path("/r/slow/hot.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(headline_listing("slow", &["s1"])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/slow/comments/s1/post_s1.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(comment_page(vec![comment("tldr too late.", "bob", json!(""))]))
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.bot.run_timeout_secs = Some(1);
    std::fs::write(&config.files.forums, "first\nslow\n").unwrap();

    let outcome = run_once(&config, test_credentials())
        .await
        .expect("Run failed");

    assert_eq!(outcome, RunOutcome::Exhausted { forums_tried: 2 });
    assert_eq!(
        read_history(&config.files.history),
        vec!["tldr burned before the timeout."]
    );
}

#[tokio::test]
async fn test_forum_file_overrides_defaults() {
    let mock_server = MockServer::start().await;

    mount_forum(
        &mock_server,
        "rust",
        "r1",
        vec![comment("tldr ownership is hard.", "ferris", json!(""))],
    )
    .await;

    // The default forum must never be crawled
    Mock::given(method("GET"))
        .and(path("/r/askreddit/hot.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());
    std::fs::write(&config.files.forums, "rust\n").unwrap();

    let outcome = run_once(&config, test_credentials()).await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Published {
            message: "tldr ownership is hard.".to_string(),
            forum: "rust".to_string(),
        }
    );
}

#[tokio::test]
async fn test_bot_with_memory_storage_and_empty_credentials() {
    let mock_server = MockServer::start().await;

    mount_forum(
        &mock_server,
        "askreddit",
        "abc",
        vec![comment("tldr nobody can log in.", "alice", json!(""))],
    )
    .await;

    // Missing credentials fail before any request is sent
    Mock::given(method("POST"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    let mut bot = Bot::with_storage(
        &config,
        Credentials::default(),
        Box::new(MemoryStorage::new()),
    )
    .expect("Failed to create bot");

    let outcome = bot.run().await.unwrap();

    assert!(!outcome.is_success());
    assert_eq!(bot.state(), RunState::Done(false));
    assert!(bot.history().contains("tldr nobody can log in."));
    assert!(!config.files.history.exists());
}
