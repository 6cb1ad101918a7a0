//! Loads Markdown and JSON content into a [`ContentIndex`].
//!
//! Individual files that fail validation are logged and skipped; only a
//! failure to enumerate the content root aborts loading.

use std::{collections::HashSet, path::{Path, PathBuf}, sync::Arc};

use metrics::counter;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::{
    application::{
        error::AppError,
        index::{ContentIndex, ContentSet},
        render::{RenderError, RenderRequest, RenderService, RenderTarget},
        repos::{ContentSource, SourceDocument},
    },
    domain::{
        entities::{
            BlogPost, Cheatsheet, FaqEntry, GlossaryEntry, Series, SillyQuestion, TechnicalTerm,
            TilEntry, Topic, UsesGroup,
        },
        error::DomainError,
        frontmatter::{
            BlogFrontmatter, QuestionFrontmatter, TermFrontmatter, TilFrontmatter,
            normalize_tags, parse_content_date, parse_frontmatter, split_frontmatter,
        },
        slug::{derive_slug, slug_from_path},
        types::ContentKind,
    },
};

const DEFAULT_CATEGORY: &str = "General";

/// A file that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentIssue {
    /// `None` for supplementary data files.
    pub kind: Option<ContentKind>,
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug)]
pub struct LoadedContent {
    pub index: ContentIndex,
    pub issues: Vec<ContentIssue>,
}

#[derive(Clone)]
pub struct ContentLoader {
    source: Arc<dyn ContentSource>,
    renderer: Arc<dyn RenderService>,
    default_author: String,
}

enum Parsed<T> {
    Item(T),
    Draft,
}

impl ContentLoader {
    pub fn new(
        source: Arc<dyn ContentSource>,
        renderer: Arc<dyn RenderService>,
        default_author: impl Into<String>,
    ) -> Self {
        Self {
            source,
            renderer,
            default_author: default_author.into(),
        }
    }

    pub async fn load(&self) -> Result<LoadedContent, AppError> {
        let mut issues = Vec::new();

        let posts = self
            .load_kind(ContentKind::Blog, &mut issues, |doc| self.parse_post(doc), |p| &p.slug)
            .await?;
        let questions = self
            .load_kind(
                ContentKind::SillyQuestion,
                &mut issues,
                |doc| self.parse_question(doc),
                |q| &q.slug,
            )
            .await?;
        let til = self
            .load_kind(ContentKind::Til, &mut issues, |doc| self.parse_til(doc), |t| &t.slug)
            .await?;
        let terms = self
            .load_kind(
                ContentKind::TechnicalTerm,
                &mut issues,
                |doc| self.parse_term(doc),
                |t| &t.slug,
            )
            .await?;

        let cheatsheets = self.load_cheatsheets(&mut issues).await?;
        let topics: Vec<Topic> = self.load_data("topics", &mut issues).await?;
        let topics = keyed_by_slug("topics", topics, &mut issues, |topic| &mut topic.slug);
        let series: Vec<Series> = self.load_data("series", &mut issues).await?;
        let series = keyed_by_slug("series", series, &mut issues, |series| &mut series.slug);
        let uses: Vec<UsesGroup> = self.load_data("uses", &mut issues).await?;
        let glossary: Vec<GlossaryEntry> = self.load_data("glossary", &mut issues).await?;

        info!(
            target = "application::content",
            posts = posts.len(),
            questions = questions.len(),
            til = til.len(),
            terms = terms.len(),
            cheatsheets = cheatsheets.len(),
            skipped = issues.len(),
            "content loaded"
        );

        let index = ContentIndex::new(ContentSet {
            posts,
            questions,
            til,
            terms,
            cheatsheets,
            topics,
            series,
            uses,
            glossary,
        });

        Ok(LoadedContent { index, issues })
    }

    async fn load_kind<T, P, S>(
        &self,
        kind: ContentKind,
        issues: &mut Vec<ContentIssue>,
        parse: P,
        slug_of: S,
    ) -> Result<Vec<T>, AppError>
    where
        P: Fn(&SourceDocument) -> Result<Parsed<T>, AppError>,
        S: Fn(&T) -> &String,
    {
        let documents = self.source.list_documents(kind).await?;
        let mut items = Vec::with_capacity(documents.len());
        let mut seen = HashSet::new();

        for document in &documents {
            match parse(document) {
                Ok(Parsed::Item(item)) => {
                    let slug = slug_of(&item).clone();
                    if !seen.insert(slug.clone()) {
                        record_issue(
                            issues,
                            Some(kind),
                            &document.path,
                            format!("duplicate slug `{slug}`"),
                        );
                        continue;
                    }
                    counter!("inkpress_content_loaded_total", "kind" => kind.as_str())
                        .increment(1);
                    items.push(item);
                }
                Ok(Parsed::Draft) => {
                    debug!(
                        target = "application::content",
                        path = %document.path.display(),
                        "skipping draft"
                    );
                }
                Err(err) => record_issue(issues, Some(kind), &document.path, err.to_string()),
            }
        }

        Ok(items)
    }

    fn parse_post(&self, document: &SourceDocument) -> Result<Parsed<BlogPost>, AppError> {
        let split = split_frontmatter(&document.contents, &document.path)?;
        let meta: BlogFrontmatter = parse_frontmatter(split.yaml, &document.path)?;
        if meta.draft {
            return Ok(Parsed::Draft);
        }
        let title = required(meta.title, "title", &document.path)?;
        let slug = resolve_slug(meta.slug.as_deref(), &document.path)?;
        let date = parse_content_date(&meta.date)?;
        let updated = meta
            .updated
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(parse_content_date)
            .transpose()?;

        let output = self
            .renderer
            .render(&RenderRequest::new(RenderTarget::article(&slug), split.body))?;
        let faqs = self.render_faqs(&slug, meta.faqs)?;

        Ok(Parsed::Item(BlogPost {
            title,
            description: meta.description.trim().to_string(),
            date,
            updated,
            author: meta
                .author
                .filter(|author| !author.trim().is_empty())
                .unwrap_or_else(|| self.default_author.clone()),
            tags: normalize_tags(meta.tags),
            category: category_or_default(meta.category),
            series: meta.series.as_deref().and_then(|series| derive_slug(series).ok()),
            content: output.html,
            reading_time_minutes: output.metrics.reading_time_minutes,
            word_count: output.metrics.word_count,
            toc: output.toc,
            faqs,
            slug,
        }))
    }

    fn parse_question(
        &self,
        document: &SourceDocument,
    ) -> Result<Parsed<SillyQuestion>, AppError> {
        let split = split_frontmatter(&document.contents, &document.path)?;
        let meta: QuestionFrontmatter = parse_frontmatter(split.yaml, &document.path)?;
        if meta.draft {
            return Ok(Parsed::Draft);
        }
        let question = required(meta.question, "question", &document.path)?;
        let slug = resolve_slug(meta.slug.as_deref(), &document.path)?;
        let date = parse_content_date(&meta.date)?;
        let output = self
            .renderer
            .render(&RenderRequest::new(RenderTarget::note(&slug), split.body))?;

        Ok(Parsed::Item(SillyQuestion {
            slug,
            question,
            answer: output.html,
            date,
            tags: normalize_tags(meta.tags),
            category: category_or_default(meta.category),
        }))
    }

    fn parse_til(&self, document: &SourceDocument) -> Result<Parsed<TilEntry>, AppError> {
        let split = split_frontmatter(&document.contents, &document.path)?;
        let meta: TilFrontmatter = parse_frontmatter(split.yaml, &document.path)?;
        if meta.draft {
            return Ok(Parsed::Draft);
        }
        let title = required(meta.title, "title", &document.path)?;
        let slug = resolve_slug(meta.slug.as_deref(), &document.path)?;
        let date = parse_content_date(&meta.date)?;
        let output = self
            .renderer
            .render(&RenderRequest::new(RenderTarget::note(&slug), split.body))?;

        Ok(Parsed::Item(TilEntry {
            slug,
            title,
            date,
            category: category_or_default(meta.category),
            tags: normalize_tags(meta.tags),
            content: output.html,
            raw_markdown: split.body.to_string(),
        }))
    }

    fn parse_term(&self, document: &SourceDocument) -> Result<Parsed<TechnicalTerm>, AppError> {
        let split = split_frontmatter(&document.contents, &document.path)?;
        let meta: TermFrontmatter = parse_frontmatter(split.yaml, &document.path)?;
        if meta.draft {
            return Ok(Parsed::Draft);
        }
        let title = required(meta.title, "title", &document.path)?;
        let slug = resolve_slug(meta.slug.as_deref(), &document.path)?;
        let output = self
            .renderer
            .render(&RenderRequest::new(RenderTarget::article(&slug), split.body))?;
        let faqs = self.render_faqs(&slug, meta.faqs)?;

        Ok(Parsed::Item(TechnicalTerm {
            title,
            description: meta.description.trim().to_string(),
            content: output.html,
            aliases: normalize_tags(meta.aliases),
            related: meta
                .related
                .iter()
                .filter_map(|related| derive_slug(related).ok())
                .collect(),
            toc: output.toc,
            faqs,
            slug,
        }))
    }

    /// FAQ answers are Markdown; questions stay plain text.
    fn render_faqs(&self, slug: &str, faqs: Vec<FaqEntry>) -> Result<Vec<FaqEntry>, AppError> {
        faqs.into_iter()
            .filter(|faq| !faq.question.trim().is_empty() && !faq.answer.trim().is_empty())
            .map(|faq| -> Result<FaqEntry, AppError> {
                let output = self
                    .renderer
                    .render(&RenderRequest::new(RenderTarget::note(slug), faq.answer))?;
                Ok(FaqEntry {
                    question: faq.question.trim().to_string(),
                    answer: output.html,
                })
            })
            .collect()
    }

    async fn load_cheatsheets(
        &self,
        issues: &mut Vec<ContentIssue>,
    ) -> Result<Vec<Cheatsheet>, AppError> {
        let sheets: Vec<Cheatsheet> = self.load_data("cheatsheets", issues).await?;
        let data_path = data_path("cheatsheets");
        let mut seen = HashSet::new();
        let mut loaded = Vec::with_capacity(sheets.len());

        for mut sheet in sheets {
            let slug_source = if sheet.slug.trim().is_empty() {
                sheet.title.clone()
            } else {
                sheet.slug.clone()
            };
            let slug = match derive_slug(&slug_source) {
                Ok(slug) => slug,
                Err(err) => {
                    record_issue(
                        issues,
                        Some(ContentKind::Cheatsheet),
                        &data_path,
                        err.to_string(),
                    );
                    continue;
                }
            };
            if !seen.insert(slug.clone()) {
                record_issue(
                    issues,
                    Some(ContentKind::Cheatsheet),
                    &data_path,
                    format!("duplicate slug `{slug}`"),
                );
                continue;
            }

            if let Err(err) = self.highlight_sections(&mut sheet) {
                record_issue(
                    issues,
                    Some(ContentKind::Cheatsheet),
                    &data_path,
                    format!("cheatsheet `{slug}`: {err}"),
                );
                continue;
            }
            sheet.slug = slug;
            counter!("inkpress_content_loaded_total", "kind" => ContentKind::Cheatsheet.as_str())
                .increment(1);
            loaded.push(sheet);
        }

        Ok(loaded)
    }

    fn highlight_sections(&self, sheet: &mut Cheatsheet) -> Result<(), RenderError> {
        for section in &mut sheet.sections {
            section.code_html = self
                .renderer
                .highlight(section.language.as_deref(), &section.code)?;
        }
        Ok(())
    }

    /// Read one `data/<name>.json` file. A missing file is empty; an invalid
    /// one is logged and treated as empty.
    async fn load_data<T>(
        &self,
        name: &str,
        issues: &mut Vec<ContentIssue>,
    ) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned,
    {
        let Some(raw) = self.source.read_data(name).await? else {
            debug!(target = "application::content", file = name, "data file not present");
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => Ok(items),
            Err(err) => {
                let kind = (name == "cheatsheets").then_some(ContentKind::Cheatsheet);
                record_issue(issues, kind, &data_path(name), err.to_string());
                Ok(Vec::new())
            }
        }
    }
}

/// Normalise the `slug` of every data entry, dropping entries whose slug is
/// empty, unrepresentable or already taken.
fn keyed_by_slug<T, F>(
    name: &str,
    items: Vec<T>,
    issues: &mut Vec<ContentIssue>,
    slug_of: F,
) -> Vec<T>
where
    F: Fn(&mut T) -> &mut String,
{
    let path = data_path(name);
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(items.len());

    for mut item in items {
        let raw = slug_of(&mut item);
        let slug = match derive_slug(raw) {
            Ok(slug) => slug,
            Err(err) => {
                record_issue(issues, None, &path, format!("invalid slug `{raw}`: {err}"));
                continue;
            }
        };
        if !seen.insert(slug.clone()) {
            record_issue(issues, None, &path, format!("duplicate slug `{slug}`"));
            continue;
        }
        *raw = slug;
        kept.push(item);
    }

    kept
}

fn data_path(name: &str) -> PathBuf {
    PathBuf::from("data").join(format!("{name}.json"))
}

fn record_issue(
    issues: &mut Vec<ContentIssue>,
    kind: Option<ContentKind>,
    path: &Path,
    reason: String,
) {
    let label = kind.map(ContentKind::as_str).unwrap_or("data");
    warn!(
        target = "application::content",
        kind = label,
        path = %path.display(),
        reason = %reason,
        "skipping content file"
    );
    counter!("inkpress_content_skipped_total", "kind" => label).increment(1);
    issues.push(ContentIssue {
        kind,
        path: path.to_path_buf(),
        reason,
    });
}

fn required(value: String, field: &str, path: &Path) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::frontmatter(
            path,
            format!("`{field}` must not be empty"),
        ));
    }
    Ok(trimmed.to_string())
}

fn resolve_slug(explicit: Option<&str>, path: &Path) -> Result<String, DomainError> {
    let result = match explicit.map(str::trim).filter(|slug| !slug.is_empty()) {
        Some(slug) => derive_slug(slug),
        None => slug_from_path(path),
    };
    result.map_err(|err| DomainError::frontmatter(path, format!("invalid slug: {err}")))
}

fn category_or_default(category: Option<String>) -> String {
    category
        .map(|category| category.trim().to_string())
        .filter(|category| !category.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use time::macros::date;

    use super::*;
    use crate::application::render::{RenderOutput, render_service};
    use crate::application::repos::RepoError;

    #[derive(Default)]
    struct MemorySource {
        documents: HashMap<ContentKind, Vec<SourceDocument>>,
        data: HashMap<String, String>,
    }

    impl MemorySource {
        fn with_doc(mut self, kind: ContentKind, name: &str, contents: &str) -> Self {
            self.documents.entry(kind).or_default().push(SourceDocument {
                path: PathBuf::from(kind.section()).join(name),
                contents: contents.to_string(),
            });
            self
        }

        fn with_data(mut self, name: &str, contents: &str) -> Self {
            self.data.insert(name.to_string(), contents.to_string());
            self
        }
    }

    #[async_trait]
    impl ContentSource for MemorySource {
        async fn list_documents(
            &self,
            kind: ContentKind,
        ) -> Result<Vec<SourceDocument>, RepoError> {
            Ok(self.documents.get(&kind).cloned().unwrap_or_default())
        }

        async fn read_data(&self, name: &str) -> Result<Option<String>, RepoError> {
            Ok(self.data.get(name).cloned())
        }
    }

    fn loader(source: MemorySource) -> ContentLoader {
        ContentLoader::new(Arc::new(source), render_service(), "Site Author")
    }

    /// Delegates to the real pipeline but cannot highlight `broken` snippets.
    struct BrokenLanguageRenderer;

    impl RenderService for BrokenLanguageRenderer {
        fn render(&self, request: &RenderRequest) -> Result<RenderOutput, RenderError> {
            render_service().render(request)
        }

        fn highlight(&self, language: Option<&str>, code: &str) -> Result<String, RenderError> {
            if language == Some("broken") {
                return Err(RenderError::Highlighting {
                    language: "broken".to_string(),
                    message: "no grammar".to_string(),
                });
            }
            render_service().highlight(language, code)
        }
    }

    #[tokio::test]
    async fn loads_posts_and_skips_drafts() {
        let source = MemorySource::default()
            .with_doc(
                ContentKind::Blog,
                "Hello World.md",
                "---\ntitle: Hello\ndate: 2024-05-01\ntags: [rust, Rust, cli]\n---\n\n## Intro\n\nSome words here.\n",
            )
            .with_doc(
                ContentKind::Blog,
                "draft.md",
                "---\ntitle: Draft\ndate: 2024-05-02\ndraft: true\n---\nHidden\n",
            );

        let loaded = loader(source).load().await.expect("load");
        let posts = loaded.index.posts();
        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.date, date!(2024 - 05 - 01));
        assert_eq!(post.author, "Site Author");
        assert_eq!(post.category, "General");
        assert_eq!(post.tags, vec!["rust".to_string(), "cli".to_string()]);
        assert_eq!(post.toc.len(), 1);
        assert_eq!(post.reading_time_minutes, 1);
        assert!(loaded.issues.is_empty());
    }

    #[tokio::test]
    async fn invalid_files_are_reported_and_skipped() {
        let source = MemorySource::default()
            .with_doc(ContentKind::Til, "no-frontmatter.md", "# Just text\n")
            .with_doc(
                ContentKind::Til,
                "bad-date.md",
                "---\ntitle: Bad\ndate: yesterday\n---\nBody\n",
            )
            .with_doc(
                ContentKind::Til,
                "missing-title.md",
                "---\ndate: 2024-01-01\n---\nBody\n",
            )
            .with_doc(
                ContentKind::Til,
                "good.md",
                "---\ntitle: Good\ndate: 2024-01-01\n---\nBody\n",
            );

        let loaded = loader(source).load().await.expect("load");
        assert_eq!(loaded.index.til().len(), 1);
        assert_eq!(loaded.issues.len(), 3);
        assert!(loaded.issues.iter().all(|issue| issue.kind == Some(ContentKind::Til)));
    }

    #[tokio::test]
    async fn duplicate_slugs_keep_the_first_file() {
        let source = MemorySource::default()
            .with_doc(
                ContentKind::SillyQuestion,
                "a.md",
                "---\nquestion: Why?\ndate: 2024-01-01\nslug: why\n---\nBecause.\n",
            )
            .with_doc(
                ContentKind::SillyQuestion,
                "b.md",
                "---\nquestion: Why again?\ndate: 2024-01-02\nslug: why\n---\nStill.\n",
            );

        let loaded = loader(source).load().await.expect("load");
        assert_eq!(loaded.index.questions().len(), 1);
        assert_eq!(loaded.index.questions()[0].question, "Why?");
        assert!(loaded.issues[0].reason.contains("duplicate slug"));
    }

    #[tokio::test]
    async fn terms_render_faq_answers() {
        let source = MemorySource::default().with_doc(
            ContentKind::TechnicalTerm,
            "mutex.md",
            "---\ntitle: Mutex\ndescription: Mutual exclusion\nfaq:\n  - question: Is it slow?\n    answer: \"Not **usually**.\"\n---\n\nA lock.\n",
        );

        let loaded = loader(source).load().await.expect("load");
        let term = loaded.index.term("mutex").expect("term");
        assert_eq!(term.faqs.len(), 1);
        assert!(term.faqs[0].answer.contains("<strong>usually</strong>"));
    }

    #[tokio::test]
    async fn cheatsheets_get_slugs_and_highlighting() {
        let source = MemorySource::default().with_data(
            "cheatsheets",
            r#"[{"title": "Git Basics", "description": "Everyday git", "sections": [{"title": "Status", "code": "git status", "language": "bash"}]}]"#,
        );

        let loaded = loader(source).load().await.expect("load");
        let sheet = loaded.index.cheatsheet("git-basics").expect("sheet");
        assert!(sheet.sections[0].code_html.contains("syntax-highlight"));
    }

    #[tokio::test]
    async fn cheatsheet_that_fails_to_highlight_is_skipped() {
        let source = MemorySource::default().with_data(
            "cheatsheets",
            r#"[
                {"title": "Git Basics", "description": "Everyday git", "sections": [{"title": "Status", "code": "git status", "language": "bash"}]},
                {"title": "Broken Sheet", "description": "Unrenderable", "sections": [{"title": "Oops", "code": "???", "language": "broken"}]}
            ]"#,
        );
        let loader = ContentLoader::new(Arc::new(source), Arc::new(BrokenLanguageRenderer), "Site Author");

        let loaded = loader.load().await.expect("load keeps going");
        let slugs: Vec<_> = loaded.index.cheatsheets().iter().map(|sheet| sheet.slug.as_str()).collect();
        assert_eq!(slugs, vec!["git-basics"]);
        assert_eq!(loaded.issues.len(), 1);
        assert_eq!(loaded.issues[0].kind, Some(ContentKind::Cheatsheet));
        assert!(loaded.issues[0].reason.contains("broken-sheet"));
    }

    #[tokio::test]
    async fn topic_and_series_slugs_are_normalised_and_validated() {
        let source = MemorySource::default()
            .with_data(
                "topics",
                r#"[
                    {"slug": "Rust Lang", "title": "Rust"},
                    {"slug": "", "title": "Empty"},
                    {"slug": "..", "title": "Dots"},
                    {"slug": "rust-lang", "title": "Duplicate"}
                ]"#,
            )
            .with_data("series", r#"[{"slug": "Getting Started", "title": "Getting Started"}]"#)
            .with_doc(
                ContentKind::Blog,
                "first.md",
                "---\ntitle: First\ndate: 2024-05-01\nseries: Getting Started\n---\nBody\n",
            );

        let loaded = loader(source).load().await.expect("load");
        let topics: Vec<_> = loaded.index.topics().iter().map(|topic| topic.slug.as_str()).collect();
        assert_eq!(topics, vec!["rust-lang"]);
        assert_eq!(loaded.issues.len(), 3);
        assert!(loaded.issues.iter().all(|issue| issue.kind.is_none()));

        let post = loaded.index.post("first").expect("post");
        assert_eq!(post.series.as_deref(), Some("getting-started"));
        let series = loaded.index.series_for_post(post).expect("series");
        assert_eq!(series.slug, "getting-started");
    }

    #[tokio::test]
    async fn invalid_data_file_is_reported() {
        let source = MemorySource::default().with_data("topics", "{not json");
        let loaded = loader(source).load().await.expect("load");
        assert!(loaded.index.topics().is_empty());
        assert_eq!(loaded.issues.len(), 1);
    }
}
