use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the inkpress binary.
#[derive(Debug, Parser)]
#[command(
    name = "inkpress",
    version,
    about = "Build, index and preview a static content site"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "INKPRESS_CONFIG_FILE", value_name = "PATH", global = true)]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render every page, feed, index and OG image into the output directory.
    Build(BuildArgs),
    /// Generate Open Graph images only.
    Og(OgArgs),
    /// Write search-data.json only.
    #[command(name = "search-index")]
    SearchIndex,
    /// Query the content from the command line.
    Search(SearchArgs),
    /// Notify search engines about changed URLs.
    Notify(NotifyArgs),
    /// Read or bump view/upvote counters.
    Stats(StatsArgs),
    /// Serve the output directory with the search and stats API.
    Serve(ServeArgs),
    /// Load all content and report files that would be skipped.
    Check,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the content directory.
    #[arg(long = "content-dir", value_name = "PATH", value_hint = ValueHint::DirPath, global = true)]
    pub content_dir: Option<PathBuf>,

    /// Override the output directory.
    #[arg(long = "output-dir", value_name = "PATH", value_hint = ValueHint::DirPath, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Override the public base URL of the site.
    #[arg(long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct BuildArgs {
    /// Skip Open Graph image generation.
    #[arg(long = "skip-og", action = clap::ArgAction::SetTrue)]
    pub skip_og: bool,

    #[command(flatten)]
    pub og: OgArgs,
}

#[derive(Debug, Args, Default, Clone)]
pub struct OgArgs {
    /// Only render images that do not exist yet.
    #[arg(long = "only-missing", action = clap::ArgAction::SetTrue)]
    pub only_missing: bool,

    /// Override the number of images rendered concurrently.
    #[arg(long = "og-concurrency", value_name = "COUNT")]
    pub concurrency: Option<usize>,
}

#[derive(Debug, Args, Clone)]
pub struct SearchArgs {
    /// Query text.
    #[arg(value_name = "QUERY", required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Maximum number of results.
    #[arg(long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// Print results as JSON.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json: bool,
}

#[derive(Debug, Args, Default, Clone)]
pub struct NotifyArgs {
    /// Submit every URL in the sitemap.
    #[arg(long, action = clap::ArgAction::SetTrue, conflicts_with_all = ["recent", "urls"])]
    pub all: bool,

    /// Submit content dated within the last DAYS days.
    #[arg(long, value_name = "DAYS", conflicts_with = "urls")]
    pub recent: Option<u32>,

    /// Submit explicit URLs (repeatable).
    #[arg(long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Log the selected URLs without sending anything.
    #[arg(long = "dry-run", action = clap::ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Do not call the Google Indexing API.
    #[arg(long = "skip-google", action = clap::ArgAction::SetTrue)]
    pub skip_google: bool,

    /// Do not call IndexNow.
    #[arg(long = "skip-indexnow", action = clap::ArgAction::SetTrue)]
    pub skip_indexnow: bool,
}

#[derive(Debug, Args, Clone)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub command: StatsCommand,
}

#[derive(Debug, Subcommand, Clone)]
pub enum StatsCommand {
    /// Print the counters of one item.
    Show {
        #[arg(value_name = "TYPE")]
        kind: String,
        #[arg(value_name = "SLUG")]
        slug: String,
    },
    /// Increment a counter of one item.
    Bump {
        #[arg(value_name = "TYPE")]
        kind: String,
        #[arg(value_name = "SLUG")]
        slug: String,
        #[arg(value_name = "COUNTER", default_value = "views")]
        counter: String,
    },
    /// List the items with the highest counter values.
    Top {
        #[arg(value_name = "TYPE")]
        kind: String,
        #[arg(long, default_value = "views")]
        counter: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub port: Option<u16>,
}
