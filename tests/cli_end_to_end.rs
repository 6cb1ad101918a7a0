mod common;

use assert_cmd::Command;
use predicates::str::contains;

fn inkpress() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("inkpress"));
    cmd.env("INKPRESS__LOGGING__LEVEL", "warn")
        .env_remove("INKPRESS__STATS__SUPABASE_URL")
        .env_remove("INKPRESS__STATS__API_KEY")
        .env_remove("INKPRESS_CONFIG_FILE");
    cmd
}

#[test]
fn build_without_og_writes_site() {
    let content = tempfile::tempdir().expect("content");
    let public = tempfile::tempdir().expect("public");
    common::sample_content(content.path());

    inkpress()
        .arg("--content-dir")
        .arg(content.path())
        .arg("--output-dir")
        .arg(public.path())
        .arg("--base-url")
        .arg("https://ink.example.com")
        .arg("build")
        .arg("--skip-og")
        .assert()
        .success();

    assert!(public.path().join("index.html").is_file());
    assert!(public.path().join("search-data.json").is_file());
    assert!(!public.path().join("og").exists());
    let sitemap = std::fs::read_to_string(public.path().join("sitemap.xml")).expect("sitemap");
    assert!(sitemap.contains("https://ink.example.com/til/cargo-tree/"));
}

#[test]
fn search_prints_ranked_results() {
    let content = tempfile::tempdir().expect("content");
    common::sample_content(content.path());

    inkpress()
        .arg("--content-dir")
        .arg(content.path())
        .arg("search")
        .arg("ownership")
        .assert()
        .success()
        .stdout(contains("/blog/ownership/"));
}

#[test]
fn check_fails_on_invalid_frontmatter() {
    let content = tempfile::tempdir().expect("content");
    common::sample_content(content.path());
    common::write(content.path(), "til/broken.md", "no frontmatter here\n");

    inkpress()
        .arg("--content-dir")
        .arg(content.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(contains("failed validation"));
}

#[test]
fn missing_content_root_fails_fast() {
    let missing = tempfile::tempdir().expect("tmp").path().join("nope");

    inkpress()
        .arg("--content-dir")
        .arg(&missing)
        .arg("check")
        .assert()
        .failure();
}

#[test]
fn stats_require_configuration() {
    inkpress()
        .args(["stats", "show", "blog", "hello"])
        .assert()
        .failure()
        .stderr(contains("stats are not configured"));
}
