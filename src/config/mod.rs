//! Configuration layer: typed settings with layered precedence
//! (defaults → file → environment → CLI).

mod cli;

use std::{net::SocketAddr, num::NonZeroUsize, path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

pub use cli::{
    BuildArgs, CliArgs, Command, GlobalOverrides, NotifyArgs, OgArgs, SearchArgs, ServeArgs,
    StatsArgs, StatsCommand,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "inkpress";
const DEFAULT_SITE_TITLE: &str = "inkpress";
const DEFAULT_BASE_URL: &str = "http://localhost:3000/";
const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_SYNTAX_THEME: &str = "InspiredGitHub";
const DEFAULT_CONTENT_DIR: &str = "content";
const DEFAULT_OUTPUT_DIR: &str = "public";
const DEFAULT_OG_CONCURRENCY: usize = 4;
const DEFAULT_SEARCH_MAX_RESULTS: usize = 20;
const DEFAULT_STATS_TABLE: &str = "stats";
const DEFAULT_STATS_RPC: &str = "increment_stat";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_GOOGLE_ENDPOINT: &str =
    "https://indexing.googleapis.com/v3/urlNotifications:publish";
const DEFAULT_INDEXNOW_ENDPOINT: &str = "https://api.indexnow.org/indexnow";
const DEFAULT_RECENT_DAYS: u32 = 7;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 10;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub site: SiteSettings,
    pub paths: PathSettings,
    pub logging: LoggingSettings,
    pub og: OgSettings,
    pub search: SearchSettings,
    pub stats: StatsSettings,
    pub indexing: IndexingSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub title: String,
    pub description: String,
    /// Always ends with `/`.
    pub base_url: Url,
    pub author: String,
    pub language: String,
    pub twitter_handle: Option<String>,
    pub syntax_theme: String,
}

#[derive(Debug, Clone)]
pub struct PathSettings {
    pub content_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct OgSettings {
    pub enabled: bool,
    pub concurrency: NonZeroUsize,
    pub font_family: String,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub max_results: NonZeroUsize,
}

/// Supabase connection; `None` fields mean the stats surface is disabled.
#[derive(Debug, Clone)]
pub struct StatsSettings {
    pub supabase_url: Option<Url>,
    pub api_key: Option<String>,
    pub table: String,
    pub rpc: String,
    pub timeout: Duration,
}

impl StatsSettings {
    pub fn is_configured(&self) -> bool {
        self.supabase_url.is_some() && self.api_key.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct IndexingSettings {
    pub google_credentials: Option<PathBuf>,
    pub google_endpoint: Url,
    pub indexnow_key: Option<String>,
    pub indexnow_endpoint: Url,
    pub recent_days: u32,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("INKPRESS").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_global_overrides(&cli.overrides);

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(args),
        Some(Command::Build(args)) => raw.apply_og_overrides(&args.og),
        Some(Command::Og(args)) => raw.apply_og_overrides(args),
        _ => {}
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    site: RawSiteSettings,
    paths: RawPathSettings,
    logging: RawLoggingSettings,
    og: RawOgSettings,
    search: RawSearchSettings,
    stats: RawStatsSettings,
    indexing: RawIndexingSettings,
    server: RawServerSettings,
}

impl RawSettings {
    fn apply_global_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(dir) = overrides.content_dir.as_ref() {
            self.paths.content_dir = Some(dir.clone());
        }
        if let Some(dir) = overrides.output_dir.as_ref() {
            self.paths.output_dir = Some(dir.clone());
        }
        if let Some(url) = overrides.base_url.as_ref() {
            self.site.base_url = Some(url.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }

    fn apply_serve_overrides(&mut self, overrides: &ServeArgs) {
        if let Some(host) = overrides.host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.port {
            self.server.port = Some(port);
        }
    }

    fn apply_og_overrides(&mut self, overrides: &OgArgs) {
        if let Some(concurrency) = overrides.concurrency {
            self.og.concurrency = Some(concurrency);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            site,
            paths,
            logging,
            og,
            search,
            stats,
            indexing,
            server,
        } = raw;

        Ok(Self {
            site: build_site_settings(site)?,
            paths: build_path_settings(paths)?,
            logging: build_logging_settings(logging)?,
            og: build_og_settings(og)?,
            search: build_search_settings(search)?,
            stats: build_stats_settings(stats)?,
            indexing: build_indexing_settings(indexing)?,
            server: build_server_settings(server)?,
        })
    }
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let title = non_empty(site.title).unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string());
    let base_url = parse_http_url(
        site.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
        "site.base_url",
    )?;
    let base_url = with_trailing_slash(base_url);
    let author = non_empty(site.author).unwrap_or_else(|| title.clone());

    Ok(SiteSettings {
        description: site.description.unwrap_or_default().trim().to_string(),
        base_url,
        author,
        language: non_empty(site.language).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        twitter_handle: non_empty(site.twitter_handle)
            .map(|handle| handle.trim_start_matches('@').to_string()),
        syntax_theme: non_empty(site.syntax_theme)
            .unwrap_or_else(|| DEFAULT_SYNTAX_THEME.to_string()),
        title,
    })
}

fn build_path_settings(paths: RawPathSettings) -> Result<PathSettings, LoadError> {
    let content_dir = paths
        .content_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR));
    if content_dir.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "paths.content_dir",
            "path must not be empty",
        ));
    }
    let output_dir = paths
        .output_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    if output_dir.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "paths.output_dir",
            "path must not be empty",
        ));
    }
    Ok(PathSettings {
        content_dir,
        output_dir,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_og_settings(og: RawOgSettings) -> Result<OgSettings, LoadError> {
    let concurrency = og.concurrency.unwrap_or(DEFAULT_OG_CONCURRENCY);
    Ok(OgSettings {
        enabled: og.enabled.unwrap_or(true),
        concurrency: non_zero_usize(concurrency, "og.concurrency")?,
        font_family: non_empty(og.font_family).unwrap_or_else(|| "sans-serif".to_string()),
    })
}

fn build_search_settings(search: RawSearchSettings) -> Result<SearchSettings, LoadError> {
    let max_results = search.max_results.unwrap_or(DEFAULT_SEARCH_MAX_RESULTS);
    Ok(SearchSettings {
        max_results: non_zero_usize(max_results, "search.max_results")?,
    })
}

fn build_stats_settings(stats: RawStatsSettings) -> Result<StatsSettings, LoadError> {
    let supabase_url = non_empty(stats.supabase_url)
        .map(|value| parse_http_url(&value, "stats.supabase_url").map(with_trailing_slash))
        .transpose()?;
    let api_key = non_empty(stats.api_key);
    if supabase_url.is_some() != api_key.is_some() {
        return Err(LoadError::invalid(
            "stats.api_key",
            "stats.supabase_url and stats.api_key must be set together",
        ));
    }

    Ok(StatsSettings {
        supabase_url,
        api_key,
        table: non_empty(stats.table).unwrap_or_else(|| DEFAULT_STATS_TABLE.to_string()),
        rpc: non_empty(stats.rpc).unwrap_or_else(|| DEFAULT_STATS_RPC.to_string()),
        timeout: timeout(stats.timeout_seconds, "stats.timeout_seconds")?,
    })
}

fn build_indexing_settings(indexing: RawIndexingSettings) -> Result<IndexingSettings, LoadError> {
    let google_endpoint = parse_http_url(
        indexing
            .google_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_GOOGLE_ENDPOINT),
        "indexing.google_endpoint",
    )?;
    let indexnow_endpoint = parse_http_url(
        indexing
            .indexnow_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_INDEXNOW_ENDPOINT),
        "indexing.indexnow_endpoint",
    )?;

    let indexnow_key = non_empty(indexing.indexnow_key);
    if let Some(key) = indexnow_key.as_ref()
        && !key.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
    {
        return Err(LoadError::invalid(
            "indexing.indexnow_key",
            "key may only contain letters, digits and dashes",
        ));
    }

    Ok(IndexingSettings {
        google_credentials: indexing
            .google_credentials
            .filter(|path| !path.as_os_str().is_empty()),
        google_endpoint,
        indexnow_key,
        indexnow_endpoint,
        recent_days: indexing.recent_days.unwrap_or(DEFAULT_RECENT_DAYS),
        timeout: timeout(indexing.timeout_seconds, "indexing.timeout_seconds")?,
    })
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }
    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    title: Option<String>,
    description: Option<String>,
    base_url: Option<String>,
    author: Option<String>,
    language: Option<String>,
    twitter_handle: Option<String>,
    syntax_theme: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPathSettings {
    content_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawOgSettings {
    enabled: Option<bool>,
    concurrency: Option<usize>,
    font_family: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSearchSettings {
    max_results: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStatsSettings {
    supabase_url: Option<String>,
    api_key: Option<String>,
    table: Option<String>,
    rpc: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawIndexingSettings {
    google_credentials: Option<PathBuf>,
    google_endpoint: Option<String>,
    indexnow_key: Option<String>,
    indexnow_endpoint: Option<String>,
    recent_days: Option<u32>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn parse_http_url(value: &str, key: &'static str) -> Result<Url, LoadError> {
    let url = Url::parse(value.trim())
        .map_err(|err| LoadError::invalid(key, format!("invalid URL `{value}`: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(key, "URL must use http or https"));
    }
    Ok(url)
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_zero_usize(value: usize, key: &'static str) -> Result<NonZeroUsize, LoadError> {
    NonZeroUsize::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

fn timeout(value: Option<u64>, key: &'static str) -> Result<Duration, LoadError> {
    let seconds = value.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
    if seconds == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    Ok(Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests;
