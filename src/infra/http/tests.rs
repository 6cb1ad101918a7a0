use std::{fs, path::Path, sync::Arc};

use axum::{
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use super::*;

fn site() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();
    fs::create_dir_all(root.join("blog/hello")).expect("mkdir");
    fs::create_dir_all(root.join("assets")).expect("mkdir");
    fs::write(root.join("index.html"), "<h1>home</h1>").expect("write");
    fs::write(root.join("blog/hello/index.html"), "<h1>hello</h1>").expect("write");
    fs::write(root.join("assets/site.css"), "body{}").expect("write");
    fs::write(root.join("404.html"), "<h1>missing</h1>").expect("write");
    fs::write(
        root.join("search-data.json"),
        r#"{"blogPosts":[{"kind":"blog","slug":"hello","url":"/blog/hello/","title":"Hello world","description":"","tags":["intro"],"category":"General","date":"2024-01-01","excerpt":"First post"}],"sillyQuestions":[],"til":[],"technicalTerms":[]}"#,
    )
    .expect("write");
    dir
}

fn router(root: &Path) -> Router {
    build_router(ServerState {
        output_dir: Arc::new(root.to_path_buf()),
        stats: Arc::new(StatsService::disabled()),
        max_results: 20,
    })
}

async fn get(router: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    (status, content_type, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn directories_resolve_to_index_pages() {
    let dir = site();
    let (status, content_type, body) = get(router(dir.path()), "/blog/hello/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/html"));
    assert_eq!(body, "<h1>hello</h1>");

    let (status, _, body) = get(router(dir.path()), "/blog/hello").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<h1>hello</h1>");

    let (status, _, body) = get(router(dir.path()), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<h1>home</h1>");
}

#[tokio::test]
async fn assets_carry_their_mime_type() {
    let dir = site();
    let (status, content_type, _) = get(router(dir.path()), "/assets/site.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/css"));
}

#[tokio::test]
async fn unknown_paths_render_not_found_page() {
    let dir = site();
    let (status, _, body) = get(router(dir.path()), "/nope/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "<h1>missing</h1>");
}

#[tokio::test]
async fn traversal_is_rejected() {
    let dir = site();
    let (status, _, _) = get(router(dir.path()), "/../secret.txt").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_api_scores_built_index() {
    let dir = site();
    let (status, _, body) = get(router(dir.path()), "/api/search?q=hello").await;
    assert_eq!(status, StatusCode::OK);
    let results: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(results[0]["slug"], "hello");
    assert!(results[0]["score"].as_f64().expect("score") > 0.0);

    let (_, _, body) = get(router(dir.path()), "/api/search?q=").await;
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn search_api_without_index_is_unavailable() {
    let dir = TempDir::new().expect("tempdir");
    let (status, _, body) = get(router(dir.path()), "/api/search?q=x").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("\"error\""));
}

#[tokio::test]
async fn stats_api_reports_unconfigured_and_bad_input() {
    let dir = site();
    let (status, _, _) = get(router(dir.path()), "/api/stats/blog/hello").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _, _) = get(router(dir.path()), "/api/stats/podcast/hello").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = router(dir.path())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/stats/blog/hello/views")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
