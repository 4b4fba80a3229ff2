//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the YouTube Data API and run
//! the real HTTP executor, harvester and CSV writer end-to-end.

use serde_json::{json, Value};
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yt_harvest::api::{
    build_http_client, ApiError, Endpoint, HttpExecutor, RequestDescriptor, RequestExecutor,
};
use yt_harvest::harvest::{
    HarvestPlan, Harvester, OutputTargets, ResultLimit, RetryingExecutor, YoutubeClient,
};
use yt_harvest::output::{read_table, CsvTableWriter, HarvestStage};

const API_KEY: &str = "test-key";

fn executor(server: &MockServer) -> HttpExecutor {
    let client = build_http_client(Duration::from_secs(5)).expect("Failed to build client");
    HttpExecutor::new(client, &server.uri(), API_KEY)
}

fn harvester(
    server: &MockServer,
    dir: &Path,
    page_size: u32,
) -> Harvester<HttpExecutor, CsvTableWriter> {
    let client = YoutubeClient::new(executor(server), Duration::from_millis(10), page_size);
    let targets = OutputTargets {
        video_path: dir.join("videos.csv"),
        comment_path: dir.join("comments.csv"),
        channel_path: dir.join("channels.csv"),
        extra_columns: None,
    };
    Harvester::new(client, CsvTableWriter::new(), targets)
}

fn error_body(reason: &str) -> Value {
    json!({
        "error": {
            "code": 403,
            "message": reason,
            "errors": [{ "domain": "youtube.quota", "reason": reason }]
        }
    })
}

fn search_hit(id: &str) -> Value {
    json!({ "kind": "youtube#searchResult", "id": { "kind": "youtube#video", "videoId": id } })
}

fn video_item(id: &str, views: &str) -> Value {
    json!({
        "kind": "youtube#video",
        "id": id,
        "snippet": {
            "publishedAt": "2019-04-01T12:00:00Z",
            "channelId": "UCowls",
            "title": format!("Video {}", id),
            "description": "Barn owls at night",
            "thumbnails": { "high": { "url": format!("https://i.ytimg.com/vi/{}/hq.jpg", id) } },
            "channelTitle": "Owl Cam",
            "tags": ["owl", "night"]
        },
        "statistics": {
            "viewCount": views,
            "likeCount": "0",
            "favoriteCount": "0",
            "commentCount": "2"
        }
    })
}

fn comment_thread(video_id: &str, id: &str, text: &str) -> Value {
    json!({
        "kind": "youtube#commentThread",
        "id": id,
        "snippet": {
            "videoId": video_id,
            "topLevelComment": {
                "id": id,
                "snippet": {
                    "authorDisplayName": "Zoë",
                    "authorChannelUrl": "http://www.youtube.com/channel/UCzoe",
                    "textOriginal": text,
                    "likeCount": 3,
                    "publishedAt": "2019-05-01T08:30:00Z",
                    "videoId": video_id
                }
            }
        }
    })
}

/// Responds to comment listings with no comments
async fn mount_no_comments(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_keyword_search() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Continuation page; mounted first so it wins over the initial page
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("pageToken", "page-2"))
        .and(query_param("part", "id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [search_hit("v3")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "barn owl"))
        .and(query_param("type", "video"))
        .and(query_param("publishedAfter", "2019-01-01T00:00:00Z"))
        .and(query_param("key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nextPageToken": "page-2",
            "items": [search_hit("v1"), search_hit("v2")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", "v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                comment_thread("v1", "c1", "Schöne Eule 🦉"),
                comment_thread("v1", "c2", "line one\nline two, \"quoted\"")
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", "v2"))
        .respond_with(ResponseTemplate::new(403).set_body_json(error_body("commentsDisabled")))
        .mount(&server)
        .await;

    mount_no_comments(&server).await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "v1,v2,v3"))
        .and(query_param("part", "snippet,statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [video_item("v1", "100"), video_item("v2", "0"), video_item("v3", "7")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let harvester = harvester(&server, dir.path(), 50);
    let plan = HarvestPlan {
        keywords: Some("barn owl".to_string()),
        since: chrono::NaiveDate::from_ymd_opt(2019, 1, 1),
        fetch_statistics: true,
        ..HarvestPlan::default()
    };

    let summary = harvester.run(&plan).await.expect("Harvest failed");

    assert_eq!(summary.seed_count, 3);
    assert_eq!(summary.comments_written, 2);
    assert_eq!(summary.videos_written, 3);
    assert_eq!(summary.comments_disabled, vec!["v2".to_string()]);
    assert!(summary.failures.is_empty());

    let comments = read_table(&dir.path().join("comments.csv")).unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["id"], "c1");
    assert_eq!(comments[0]["text"], "Schöne Eule 🦉");
    assert_eq!(comments[0]["author_name"], "Zoë");
    assert_eq!(comments[1]["text"], "line one\nline two, \"quoted\"");
    assert_eq!(comments[1]["video_id"], "v1");

    let videos = read_table(&dir.path().join("videos.csv")).unwrap();
    assert_eq!(videos.len(), 3);
    assert_eq!(videos[0]["id"], "v1");
    assert_eq!(videos[0]["views"], "100");
    assert_eq!(videos[0]["tags"], "owl|night");
    assert_eq!(videos[1]["views"], "0");
    assert_eq!(videos[1]["dislikes"], "");
    assert_eq!(videos[2]["thumbnail"], "https://i.ytimg.com/vi/v3/hq.jpg");
}

#[tokio::test]
async fn test_second_run_skips_harvested_videos() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_no_comments(&server).await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "v1,v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [video_item("v1", "1"), video_item("v2", "2")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "v3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [video_item("v3", "3")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let harvester = harvester(&server, dir.path(), 50);
    let first = HarvestPlan {
        video_ids: vec!["v1".to_string(), "v2".to_string()],
        ..HarvestPlan::default()
    };
    let summary = harvester.run(&first).await.unwrap();
    assert_eq!(summary.videos_written, 2);

    let second = HarvestPlan {
        video_ids: vec!["v1".to_string(), "v3".to_string(), "v2".to_string()],
        ..HarvestPlan::default()
    };
    let summary = harvester.run(&second).await.unwrap();

    assert_eq!(summary.skipped_existing, 2);
    assert_eq!(summary.videos_written, 1);

    let videos = read_table(&dir.path().join("videos.csv")).unwrap();
    let ids: Vec<&str> = videos.iter().map(|row| row["id"].as_str()).collect();
    assert_eq!(ids, vec!["v1", "v2", "v3"]);
}

#[tokio::test]
async fn test_failed_batch_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_no_comments(&server).await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "v1,v2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "v3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [video_item("v3", "3")]
        })))
        .mount(&server)
        .await;

    let harvester = harvester(&server, dir.path(), 2);
    let plan = HarvestPlan {
        video_ids: vec!["v1".to_string(), "v2".to_string(), "v3".to_string()],
        ..HarvestPlan::default()
    };

    let summary = harvester.run(&plan).await.unwrap();

    assert_eq!(summary.videos_written, 1);
    assert_eq!(summary.failures_in(HarvestStage::Videos), 1);
    assert_eq!(summary.failures[0].target, "v1,v2");
    assert_eq!(read_table(&dir.path().join("videos.csv")).unwrap().len(), 1);
}

#[tokio::test]
async fn test_comment_limit_stops_paging() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", "v1"))
        .and(query_param("order", "time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nextPageToken": "more",
            "items": [comment_thread("v1", "c1", "a"), comment_thread("v1", "c2", "b")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = YoutubeClient::new(executor(&server), Duration::from_millis(10), 2);
    let comments = client
        .get_comments("v1", ResultLimit::at_most(2))
        .await
        .unwrap();

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].author_channel_url.as_deref(), Some("http://www.youtube.com/channel/UCzoe"));
}

#[tokio::test]
async fn test_error_bodies_are_classified() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(403).set_body_json(error_body("dailyLimitExceeded")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .respond_with(ResponseTemplate::new(403).set_body_json(error_body("commentsDisabled")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(400).set_body_json(error_body("badRequest")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let executor = executor(&server);

    let result = executor.execute(&RequestDescriptor::new(Endpoint::Search)).await;
    assert!(matches!(result, Err(ApiError::RateLimited { reason }) if reason == "dailyLimitExceeded"));

    let result = executor
        .execute(&RequestDescriptor::new(Endpoint::CommentThreads))
        .await;
    assert!(matches!(result, Err(ApiError::CommentsDisabled)));

    let result = executor.execute(&RequestDescriptor::new(Endpoint::Videos)).await;
    assert!(matches!(result, Err(ApiError::Unknown { message, .. }) if message.contains("badRequest")));

    let result = executor.execute(&RequestDescriptor::new(Endpoint::Channels)).await;
    assert!(matches!(result, Err(ApiError::Unknown { message, .. }) if message.contains("502")));
}

#[tokio::test]
async fn test_quota_exhaustion_waits_and_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(403).set_body_json(error_body("quotaExceeded")))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [video_item("v1", "5")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let wait = Duration::from_millis(50);
    let retrying = RetryingExecutor::new(executor(&server), wait);
    let request = RequestDescriptor::new(Endpoint::Videos).param("id", "v1");

    let started = Instant::now();
    let page = retrying.execute(&request).await.unwrap();

    assert!(started.elapsed() >= wait);
    assert_eq!(page.items.len(), 1);
}
