//! Site identity and the layout chrome shared by every page.

use url::Url;

use crate::config::SiteSettings;
use crate::presentation::views::{LayoutChrome, NavLinkView};

const NAVIGATION: &[(&str, &str)] = &[
    ("Blog", "/blog/"),
    ("Silly Questions", "/silly-questions/"),
    ("TIL", "/til/"),
    ("Terms", "/technical-terms/"),
    ("Cheatsheets", "/cheatsheets/"),
    ("Topics", "/topics/"),
    ("Search", "/search/"),
];

/// Public identity of the site used for URLs, metadata and feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteIdentity {
    pub title: String,
    pub description: String,
    /// Always ends with `/`.
    pub base_url: Url,
    pub author: String,
    pub language: String,
    pub twitter_handle: Option<String>,
}

impl SiteIdentity {
    /// Absolute URL for a site-relative path.
    pub fn url_for(&self, path: &str) -> String {
        canonical_url(self.base_url.as_str(), path)
    }

    pub fn og_image_url(&self, name: &str) -> String {
        self.url_for(&og_image_path(name))
    }

    pub fn host(&self) -> String {
        self.base_url.host_str().unwrap_or_default().to_string()
    }
}

impl From<&SiteSettings> for SiteIdentity {
    fn from(settings: &SiteSettings) -> Self {
        Self {
            title: settings.title.clone(),
            description: settings.description.clone(),
            base_url: settings.base_url.clone(),
            author: settings.author.clone(),
            language: settings.language.clone(),
            twitter_handle: settings.twitter_handle.clone(),
        }
    }
}

/// Site-relative path of an Open Graph image.
pub fn og_image_path(name: &str) -> String {
    format!("/og/{name}.png")
}

pub fn canonical_url(base: &str, path: &str) -> String {
    let root = normalize_public_site_url(base);
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        root
    } else {
        format!("{root}{trimmed}")
    }
}

pub fn normalize_public_site_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    format!("{trimmed}/")
}

#[derive(Debug, Clone)]
pub struct ChromeService {
    identity: SiteIdentity,
    asset_version: String,
    current_year: i32,
}

impl ChromeService {
    pub fn new(identity: SiteIdentity, asset_version: impl Into<String>, current_year: i32) -> Self {
        Self {
            identity,
            asset_version: asset_version.into(),
            current_year,
        }
    }

    pub fn identity(&self) -> &SiteIdentity {
        &self.identity
    }

    pub fn layout(&self, current_path: &str) -> LayoutChrome {
        let nav = NAVIGATION
            .iter()
            .map(|(label, href)| NavLinkView {
                label: (*label).to_string(),
                href: (*href).to_string(),
                active: current_path.starts_with(href),
            })
            .collect();

        LayoutChrome {
            site_title: self.identity.title.clone(),
            language: self.identity.language.clone(),
            nav,
            stylesheet_href: format!("/assets/site.css?v={}", self.asset_version),
            syntax_stylesheet_href: format!("/assets/syntax.css?v={}", self.asset_version),
            footer_text: format!("© {} {}", self.current_year, self.identity.author),
        }
    }
}
