mod common;

use std::{collections::HashSet, sync::Arc};

use inkpress::application::{
    chrome::{ChromeService, SiteIdentity},
    content::ContentLoader,
    render::render_service,
    site::SiteBuilder,
};
use inkpress::infra::{fs::FsContentSource, output::OutputDir};
use metrics_util::debugging::DebuggingRecorder;
use url::Url;

#[tokio::test]
async fn build_emits_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let content = tempfile::tempdir().expect("content");
    let public = tempfile::tempdir().expect("public");
    common::sample_content(content.path());
    common::write(content.path(), "blog/broken.md", "---\ntitle: [\n---\n");

    let source = FsContentSource::open(content.path()).expect("open");
    let loaded = ContentLoader::new(Arc::new(source), render_service(), "Ada")
        .load()
        .await
        .expect("load");
    assert_eq!(loaded.issues.len(), 1);

    let identity = SiteIdentity {
        title: "Ink Notes".to_string(),
        description: String::new(),
        base_url: Url::parse("https://ink.example.com/").expect("url"),
        author: "Ada".to_string(),
        language: "en".to_string(),
        twitter_handle: None,
    };
    let output = OutputDir::prepare(public.path()).await.expect("output");
    SiteBuilder::new(
        ChromeService::new(identity, "test", 2024),
        output,
        "InspiredGitHub",
        None,
        20,
    )
    .build(&loaded.index)
    .await
    .expect("build");

    let keys: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(key, _, _, _)| key.key().name().to_string())
        .collect();

    for expected in [
        "inkpress_content_loaded_total",
        "inkpress_content_skipped_total",
        "inkpress_pages_written_total",
        "inkpress_build_ms",
    ] {
        assert!(keys.contains(expected), "missing metric {expected}");
    }
}
