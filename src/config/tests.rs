use clap::Parser;

use super::*;

#[test]
fn defaults_are_valid() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.site.base_url.as_str(), "http://localhost:3000/");
    assert_eq!(settings.paths.output_dir, PathBuf::from("public"));
    assert_eq!(settings.og.concurrency.get(), 4);
    assert_eq!(settings.search.max_results.get(), 20);
    assert_eq!(settings.indexing.recent_days, 7);
    assert!(!settings.stats.is_configured());
    assert_eq!(settings.server.addr.port(), 3000);
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.paths.output_dir = Some(PathBuf::from("dist"));
    raw.logging.level = Some("info".to_string());

    let overrides = GlobalOverrides {
        output_dir: Some(PathBuf::from("site")),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };
    raw.apply_global_overrides(&overrides);
    raw.apply_serve_overrides(&ServeArgs {
        port: Some(4321),
        ..Default::default()
    });

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.paths.output_dir, PathBuf::from("site"));
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.server.addr.port(), 4321);
}

#[test]
fn base_url_gains_trailing_slash() {
    let mut raw = RawSettings::default();
    raw.site.base_url = Some("https://example.com/blog".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.site.base_url.as_str(), "https://example.com/blog/");
}

#[test]
fn base_url_must_be_http() {
    let mut raw = RawSettings::default();
    raw.site.base_url = Some("ftp://example.com".to_string());
    let err = Settings::from_raw(raw).expect_err("invalid scheme");
    assert!(matches!(err, LoadError::Invalid { key: "site.base_url", .. }));
}

#[test]
fn stats_requires_url_and_key_together() {
    let mut raw = RawSettings::default();
    raw.stats.supabase_url = Some("https://project.supabase.co".to_string());
    let err = Settings::from_raw(raw.clone()).expect_err("missing key");
    assert!(matches!(err, LoadError::Invalid { key: "stats.api_key", .. }));

    raw.stats.api_key = Some("anon".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.stats.is_configured());
    assert_eq!(
        settings.stats.supabase_url.map(|url| url.to_string()),
        Some("https://project.supabase.co/".to_string())
    );
}

#[test]
fn zero_og_concurrency_is_rejected() {
    let mut raw = RawSettings::default();
    raw.apply_og_overrides(&OgArgs {
        concurrency: Some(0),
        ..Default::default()
    });
    let err = Settings::from_raw(raw).expect_err("zero concurrency");
    assert!(matches!(err, LoadError::Invalid { key: "og.concurrency", .. }));
}

#[test]
fn twitter_handle_drops_at_sign() {
    let mut raw = RawSettings::default();
    raw.site.twitter_handle = Some("@inkpress".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.site.twitter_handle.as_deref(), Some("inkpress"));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    raw.apply_global_overrides(&GlobalOverrides {
        log_json: Some(true),
        ..Default::default()
    });
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn parse_notify_arguments() {
    let args = CliArgs::parse_from([
        "inkpress",
        "notify",
        "--recent",
        "3",
        "--dry-run",
        "--base-url",
        "https://example.com",
    ]);

    assert_eq!(args.overrides.base_url.as_deref(), Some("https://example.com"));
    match args.command.expect("notify command") {
        Command::Notify(notify) => {
            assert_eq!(notify.recent, Some(3));
            assert!(notify.dry_run);
            assert!(!notify.all);
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn notify_all_conflicts_with_urls() {
    let result = CliArgs::try_parse_from([
        "inkpress",
        "notify",
        "--all",
        "--url",
        "https://example.com/",
    ]);
    assert!(result.is_err());
}

#[test]
fn parse_stats_bump_with_default_counter() {
    let args = CliArgs::parse_from(["inkpress", "stats", "bump", "blog", "hello"]);
    match args.command.expect("stats command") {
        Command::Stats(StatsArgs {
            command: StatsCommand::Bump {
                kind,
                slug,
                counter,
            },
        }) => {
            assert_eq!(kind, "blog");
            assert_eq!(slug, "hello");
            assert_eq!(counter, "views");
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_search_joins_words() {
    let args = CliArgs::parse_from(["inkpress", "search", "rust", "async", "--limit", "5"]);
    match args.command.expect("search command") {
        Command::Search(search) => {
            assert_eq!(search.query, vec!["rust".to_string(), "async".to_string()]);
            assert_eq!(search.limit, Some(5));
        }
        _ => panic!("wrong command parsed"),
    }
}
