//! Build-time Open Graph image generation.
//!
//! Every page gets a 1200×630 PNG rendered from one fixed card template.
//! Items are independent: a failing item is logged and counted, and the
//! remaining items are still written.

mod sanitize;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use futures::{StreamExt, stream};
use metrics::{counter, histogram};
use tracing::{debug, info, warn};

use crate::{
    application::{chrome::SiteIdentity, error::AppError, index::ContentIndex},
    domain::types::ContentKind,
    infra::error::InfraError,
};

pub use sanitize::{
    LINE_MAX_CHARS, MAX_TITLE_LINES, SUBTITLE_MAX_CHARS, TITLE_MAX_CHARS, sanitize_subtitle,
    sanitize_title, wrap_title,
};

pub const OG_WIDTH: u32 = 1200;
pub const OG_HEIGHT: u32 = 630;
pub const OG_DIR: &str = "og";

/// Section landing pages that get a card of their own.
const FIXED_PAGES: &[(&str, &str, &str)] = &[
    ("blog", "Blog", "Articles, tutorials and long-form notes"),
    (
        "silly-questions",
        "Silly Questions",
        "Short answers to questions nobody dares to ask",
    ),
    ("til", "Today I Learned", "Small things learned along the way"),
    (
        "technical-terms",
        "Technical Terms",
        "Plain-language definitions of jargon",
    ),
    ("cheatsheets", "Cheatsheets", "Quick reference for everyday tools"),
    ("topics", "Topics", "Everything grouped by subject"),
    ("series", "Series", "Posts meant to be read in order"),
    ("uses", "Uses", "Hardware, software and services in daily use"),
    ("glossary", "Glossary", "Short definitions at a glance"),
    ("search", "Search", "Find posts, questions, notes and terms"),
];

/// One image to produce: `og/<name>.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OgDescriptor {
    pub name: String,
    pub title: String,
    pub subtitle: String,
    pub label: String,
}

/// Sanitised, wrapped text handed to the card renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OgCard {
    pub title_lines: Vec<String>,
    pub subtitle: String,
    pub label: String,
    pub site_title: String,
    pub site_host: String,
    pub width: u32,
    pub height: u32,
}

impl OgCard {
    pub fn from_descriptor(descriptor: &OgDescriptor, identity: &SiteIdentity) -> Self {
        let title = sanitize_title(&descriptor.title, &identity.title);
        Self {
            title_lines: wrap_title(&title),
            subtitle: sanitize_subtitle(&descriptor.subtitle),
            label: sanitize_subtitle(&descriptor.label),
            site_title: sanitize_title(&identity.title, "inkpress"),
            site_host: identity.host(),
            width: OG_WIDTH,
            height: OG_HEIGHT,
        }
    }
}

/// Turns a card into PNG bytes.
pub trait OgRenderer: Send + Sync {
    fn render_png(&self, card: &OgCard) -> Result<Vec<u8>, InfraError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OgReport {
    pub written: usize,
    pub skipped: usize,
    pub failed: Vec<(String, String)>,
}

/// The fixed landing-page descriptors, starting with `home`.
pub fn fixed_descriptors(identity: &SiteIdentity) -> Vec<OgDescriptor> {
    let mut descriptors = vec![OgDescriptor {
        name: "home".to_string(),
        title: identity.title.clone(),
        subtitle: identity.description.clone(),
        label: identity.host(),
    }];
    descriptors.extend(FIXED_PAGES.iter().map(|(name, title, subtitle)| OgDescriptor {
        name: (*name).to_string(),
        title: (*title).to_string(),
        subtitle: (*subtitle).to_string(),
        label: identity.title.clone(),
    }));
    descriptors
}

/// One descriptor per content item: `<section>-<slug>`.
pub fn content_descriptors(index: &ContentIndex) -> Vec<OgDescriptor> {
    let mut descriptors = Vec::new();
    for post in index.posts() {
        descriptors.push(content_descriptor(
            ContentKind::Blog,
            &post.slug,
            &post.title,
            &post.description,
        ));
    }
    for question in index.questions() {
        descriptors.push(content_descriptor(
            ContentKind::SillyQuestion,
            &question.slug,
            &question.question,
            &question.category,
        ));
    }
    for entry in index.til() {
        descriptors.push(content_descriptor(
            ContentKind::Til,
            &entry.slug,
            &entry.title,
            &entry.category,
        ));
    }
    for term in index.terms() {
        descriptors.push(content_descriptor(
            ContentKind::TechnicalTerm,
            &term.slug,
            &term.title,
            &term.description,
        ));
    }
    for sheet in index.cheatsheets() {
        descriptors.push(content_descriptor(
            ContentKind::Cheatsheet,
            &sheet.slug,
            &sheet.title,
            &sheet.description,
        ));
    }
    descriptors
}

pub fn all_descriptors(index: &ContentIndex, identity: &SiteIdentity) -> Vec<OgDescriptor> {
    let mut descriptors = fixed_descriptors(identity);
    descriptors.extend(content_descriptors(index));
    descriptors
}

/// Image name for a content item.
pub fn content_image_name(kind: ContentKind, slug: &str) -> String {
    format!("{}-{slug}", kind.section())
}

fn content_descriptor(kind: ContentKind, slug: &str, title: &str, subtitle: &str) -> OgDescriptor {
    OgDescriptor {
        name: content_image_name(kind, slug),
        title: title.to_string(),
        subtitle: subtitle.to_string(),
        label: kind.label().to_string(),
    }
}

pub struct OgGenerator {
    renderer: Arc<dyn OgRenderer>,
    identity: SiteIdentity,
    output_dir: PathBuf,
    concurrency: usize,
}

impl OgGenerator {
    pub fn new(
        renderer: Arc<dyn OgRenderer>,
        identity: SiteIdentity,
        output_dir: impl Into<PathBuf>,
        concurrency: usize,
    ) -> Self {
        Self {
            renderer,
            identity,
            output_dir: output_dir.into(),
            concurrency: concurrency.max(1),
        }
    }

    /// Render every descriptor into `<output>/og/<name>.png`.
    ///
    /// Only an unwritable `og/` directory is an error; per-item failures end
    /// up in the report.
    pub async fn generate(
        &self,
        descriptors: Vec<OgDescriptor>,
        only_missing: bool,
    ) -> Result<OgReport, AppError> {
        let dir = self.output_dir.join(OG_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|err| InfraError::path(dir.display(), err))?;

        let total = descriptors.len();
        let outcomes: Vec<(String, ItemOutcome)> = stream::iter(descriptors)
            .map(|descriptor| {
                let dir = dir.clone();
                async move {
                    let outcome = self.process(&dir, &descriptor, only_missing).await;
                    (descriptor.name, outcome)
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = OgReport::default();
        for (name, outcome) in outcomes {
            match outcome {
                ItemOutcome::Written => {
                    counter!("inkpress_og_images_total", "outcome" => "written").increment(1);
                    report.written += 1;
                }
                ItemOutcome::Skipped => {
                    counter!("inkpress_og_images_total", "outcome" => "skipped").increment(1);
                    report.skipped += 1;
                }
                ItemOutcome::Failed(reason) => {
                    counter!("inkpress_og_images_total", "outcome" => "failed").increment(1);
                    warn!(
                        target = "application::og",
                        image = %name,
                        error = %reason,
                        "failed to generate Open Graph image"
                    );
                    report.failed.push((name, reason));
                }
            }
        }
        report.failed.sort();

        info!(
            target = "application::og",
            total,
            written = report.written,
            skipped = report.skipped,
            failed = report.failed.len(),
            "Open Graph images generated"
        );
        Ok(report)
    }

    async fn process(&self, dir: &Path, descriptor: &OgDescriptor, only_missing: bool) -> ItemOutcome {
        let path = dir.join(format!("{}.png", descriptor.name));
        if only_missing && is_complete_image(&path) {
            debug!(
                target = "application::og",
                image = %descriptor.name,
                "image exists; skipping"
            );
            return ItemOutcome::Skipped;
        }

        let card = OgCard::from_descriptor(descriptor, &self.identity);
        let renderer = Arc::clone(&self.renderer);
        let started_at = Instant::now();
        let rendered = tokio::task::spawn_blocking(move || renderer.render_png(&card)).await;
        histogram!("inkpress_og_render_ms").record(started_at.elapsed().as_millis() as f64);

        let bytes = match rendered {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(err)) => return ItemOutcome::Failed(err.to_string()),
            Err(err) => return ItemOutcome::Failed(format!("render task failed: {err}")),
        };

        match tokio::fs::write(&path, bytes).await {
            Ok(()) => ItemOutcome::Written,
            Err(err) => ItemOutcome::Failed(format!("failed to write {}: {err}", path.display())),
        }
    }
}

enum ItemOutcome {
    Written,
    Skipped,
    Failed(String),
}

/// An existing file only counts when it is a readable image of the card size.
fn is_complete_image(path: &Path) -> bool {
    match imagesize::size(path) {
        Ok(size) => size.width == OG_WIDTH as usize && size.height == OG_HEIGHT as usize,
        Err(_) => false,
    }
}
