//! sitemap.xml and robots.txt generation.

use time::{Date, macros::format_description};

use crate::application::{chrome::SiteIdentity, index::ContentIndex};
use crate::domain::types::ContentKind;

/// Listing pages without a content item behind them.
const LISTING_PATHS: &[&str] = &[
    "/topics/",
    "/series/",
    "/uses/",
    "/glossary/",
    "/search/",
];

/// A public page and the date it last changed, when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub path: String,
    pub lastmod: Option<Date>,
}

impl SitemapEntry {
    fn new(path: impl Into<String>, lastmod: Option<Date>) -> Self {
        Self {
            path: path.into(),
            lastmod,
        }
    }
}

/// Every page the site publishes, home first.
pub fn sitemap_entries(index: &ContentIndex) -> Vec<SitemapEntry> {
    let latest = index.latest_date();
    let mut entries = vec![SitemapEntry::new("/", latest)];

    for kind in ContentKind::ALL {
        let section_latest = index
            .detail_paths()
            .into_iter()
            .filter(|path| path.kind == kind)
            .filter_map(|path| path.lastmod)
            .max();
        entries.push(SitemapEntry::new(kind.index_path(), section_latest));
    }
    entries.extend(
        LISTING_PATHS
            .iter()
            .map(|path| SitemapEntry::new(*path, None)),
    );

    entries.extend(
        index
            .detail_paths()
            .into_iter()
            .map(|path| SitemapEntry::new(path.path, path.lastmod)),
    );
    entries.extend(
        index
            .tags()
            .into_iter()
            .map(|tag| SitemapEntry::new(format!("/tags/{}/", tag.slug), None)),
    );
    entries.extend(
        index
            .topics()
            .iter()
            .map(|topic| SitemapEntry::new(format!("/topics/{}/", topic.slug), None)),
    );
    entries.extend(index.series().iter().map(|series| {
        let lastmod = index
            .series_posts(series)
            .into_iter()
            .map(|post| post.last_modified())
            .max();
        SitemapEntry::new(format!("/series/{}/", series.slug), lastmod)
    }));
    entries
}

pub fn sitemap_xml(identity: &SiteIdentity, entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        let loc = xml_escape(&identity.url_for(&entry.path));
        match entry.lastmod.and_then(format_day) {
            Some(lastmod) => xml.push_str(&format!(
                "  <url><loc>{loc}</loc><lastmod>{lastmod}</lastmod></url>\n"
            )),
            None => xml.push_str(&format!("  <url><loc>{loc}</loc></url>\n")),
        }
    }
    xml.push_str("</urlset>\n");
    xml
}

pub fn robots_txt(identity: &SiteIdentity) -> String {
    let sitemap_url = identity.url_for("/sitemap.xml");
    format!("User-agent: *\nAllow: /\nSitemap: {sitemap_url}\n")
}

/// `YYYY-MM-DD`.
pub fn format_day(date: Date) -> Option<String> {
    date.format(format_description!("[year]-[month]-[day]")).ok()
}

pub(crate) fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
