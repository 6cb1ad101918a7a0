//! Static site generation: pages, feeds, search data and bundled assets.

use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{info, instrument, warn};

use crate::{
    application::{
        chrome::ChromeService,
        error::AppError,
        index::ContentIndex,
        pages::PageBuilder,
        render::syntax_theme_css,
        search::build_search_data,
        sitemap::{robots_txt, sitemap_entries, sitemap_xml},
        syndication::{atom_feed, feed_items, rss_feed},
    },
    infra::{assets::static_files, indexnow::key_file_name, output::OutputDir},
};

pub const SEARCH_DATA_FILE: &str = "search-data.json";
const SYNTAX_STYLESHEET: &str = "assets/syntax.css";

/// Counts of what a build wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub pages: usize,
    pub assets: usize,
    pub sitemap_urls: usize,
    pub feed_items: usize,
    pub search_documents: usize,
    /// Pages that could not be written, with the reason.
    pub failed_pages: Vec<(String, String)>,
}

pub struct SiteBuilder {
    chrome: ChromeService,
    output: OutputDir,
    syntax_theme: String,
    indexnow_key: Option<String>,
    max_results: usize,
}

impl SiteBuilder {
    pub fn new(
        chrome: ChromeService,
        output: OutputDir,
        syntax_theme: impl Into<String>,
        indexnow_key: Option<String>,
        max_results: usize,
    ) -> Self {
        Self {
            chrome,
            output,
            syntax_theme: syntax_theme.into(),
            indexnow_key,
            max_results,
        }
    }

    pub fn output(&self) -> &OutputDir {
        &self.output
    }

    #[instrument(skip_all, fields(output = %self.output.root().display()))]
    pub async fn build(&self, index: &ContentIndex) -> Result<BuildReport, AppError> {
        let started = Instant::now();
        let mut report = BuildReport::default();

        let pages = PageBuilder::new(index, &self.chrome, self.max_results).pages()?;
        for page in &pages {
            match self.output.write_page(&page.path, &page.html).await {
                Ok(_) => report.pages += 1,
                Err(err) => {
                    counter!("inkpress_pages_failed_total").increment(1);
                    warn!(
                        target = "application::site",
                        path = %page.path,
                        error = %err,
                        "failed to write page; skipping"
                    );
                    report.failed_pages.push((page.path.clone(), err.to_string()));
                }
            }
        }

        report.assets = self.write_assets().await?;

        let identity = self.chrome.identity();
        let entries = sitemap_entries(index);
        self.output
            .write("sitemap.xml", sitemap_xml(identity, &entries))
            .await?;
        self.output.write("robots.txt", robots_txt(identity)).await?;
        report.sitemap_urls = entries.len();

        let items = feed_items(index, identity);
        self.output.write("rss.xml", rss_feed(identity, &items)).await?;
        self.output.write("atom.xml", atom_feed(identity, &items)).await?;
        report.feed_items = items.len();

        report.search_documents = self.write_search_data(index).await?;

        if let Some(key) = self.indexnow_key.as_deref() {
            self.output.write(&key_file_name(key), key).await?;
        }

        histogram!("inkpress_build_ms").record(started.elapsed().as_secs_f64() * 1000.0);
        info!(
            target = "application::site",
            pages = report.pages,
            assets = report.assets,
            sitemap_urls = report.sitemap_urls,
            feed_items = report.feed_items,
            search_documents = report.search_documents,
            failed_pages = report.failed_pages.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "site built"
        );
        Ok(report)
    }

    /// Write `search-data.json`, returning the number of documents.
    pub async fn write_search_data(&self, index: &ContentIndex) -> Result<usize, AppError> {
        let data = build_search_data(index);
        let encoded = serde_json::to_vec(&data).map_err(|err| {
            AppError::unexpected(format!("failed to encode {SEARCH_DATA_FILE}: {err}"))
        })?;
        self.output.write(SEARCH_DATA_FILE, encoded).await?;
        Ok(data.len())
    }

    async fn write_assets(&self) -> Result<usize, AppError> {
        let files = static_files();
        for (path, contents) in &files {
            self.output.write(path, contents).await?;
        }
        let css = syntax_theme_css(&self.syntax_theme)?;
        self.output.write(SYNTAX_STYLESHEET, css).await?;
        Ok(files.len() + 1)
    }
}
