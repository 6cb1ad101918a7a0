//! Assembles view models from the content index and renders every page.

use serde_json::Value;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    application::{
        chrome::{ChromeService, SiteIdentity},
        error::AppError,
        index::{ContentIndex, TaggedContent, tag_slug},
        og::content_image_name,
        seo, text,
    },
    domain::{
        entities::{
            BlogPost, Cheatsheet, FaqEntry, SillyQuestion, TechnicalTerm, TilEntry, TocEntry,
        },
        types::ContentKind,
    },
    presentation::views::{
        ArticleTemplate, ArticleView, CheatsheetSectionView, CheatsheetTemplate, CheatsheetView,
        EntryCard, ErrorPageView, ErrorTemplate, FaqView, GlossaryEntryView, GlossaryTemplate,
        GlossaryView, HomeTemplate, HomeView, LayoutContext, ListTemplate, ListView,
        PageMetaView, QuestionTemplate, QuestionView, SearchPageView, SearchTemplate,
        SeriesEntryView, SeriesNavView, StatsWidgetView, TagBadge, TermTemplate, TermView,
        TilTemplate, TilView, TocItemView, UsesGroupView, UsesItemView, UsesTemplate, UsesView,
        render_template, title_case,
    },
};

const HOME_SECTION_LIMIT: usize = 5;
const SUMMARY_MAX_CHARS: usize = 160;
const NOT_FOUND_PATH: &str = "/404.html";

const DISPLAY_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// A rendered page and the site path it is published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub path: String,
    pub html: String,
}

impl RenderedPage {
    fn new(path: impl Into<String>, html: String) -> Self {
        Self {
            path: path.into(),
            html,
        }
    }
}

/// Per-page head metadata before it is resolved against the site identity.
struct PageHead {
    path: String,
    title: String,
    description: String,
    og_image: String,
    og_type: &'static str,
    json_ld: Vec<Value>,
    noindex: bool,
}

impl PageHead {
    fn website(path: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            description: description.into(),
            og_image: "home".to_string(),
            og_type: "website",
            json_ld: Vec::new(),
            noindex: false,
        }
    }

    fn article(path: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            og_type: "article",
            ..Self::website(path, title, description)
        }
    }

    fn image(mut self, name: impl Into<String>) -> Self {
        self.og_image = name.into();
        self
    }

    fn json_ld(mut self, documents: impl IntoIterator<Item = Value>) -> Self {
        self.json_ld.extend(documents);
        self
    }
}

pub struct PageBuilder<'a> {
    index: &'a ContentIndex,
    chrome: &'a ChromeService,
    max_results: usize,
}

impl<'a> PageBuilder<'a> {
    pub fn new(index: &'a ContentIndex, chrome: &'a ChromeService, max_results: usize) -> Self {
        Self {
            index,
            chrome,
            max_results,
        }
    }

    fn identity(&self) -> &SiteIdentity {
        self.chrome.identity()
    }

    /// Every page of the site, home first and the 404 page last.
    pub fn pages(&self) -> Result<Vec<RenderedPage>, AppError> {
        let mut pages = vec![self.home()?];
        for kind in ContentKind::ALL {
            pages.push(self.section_index(kind)?);
        }

        for post in self.index.posts() {
            pages.push(self.post_page(post)?);
        }
        for question in self.index.questions() {
            pages.push(self.question_page(question)?);
        }
        for entry in self.index.til() {
            pages.push(self.til_page(entry)?);
        }
        for term in self.index.terms() {
            pages.push(self.term_page(term)?);
        }
        for sheet in self.index.cheatsheets() {
            pages.push(self.cheatsheet_page(sheet)?);
        }

        for tag in self.index.tags() {
            pages.push(self.tag_page(&tag.slug, &tag.name)?);
        }
        pages.push(self.topics_index()?);
        for topic in self.index.topics() {
            pages.push(self.topic_page(&topic.slug)?);
        }
        pages.push(self.series_index()?);
        for series in self.index.series() {
            pages.push(self.series_page(&series.slug)?);
        }

        pages.push(self.uses_page()?);
        pages.push(self.glossary_page()?);
        pages.push(self.search_page()?);
        pages.push(self.not_found_page()?);
        Ok(pages)
    }

    pub fn home(&self) -> Result<RenderedPage, AppError> {
        let identity = self.identity();
        let view = HomeView {
            intro: identity.description.clone(),
            latest_posts: self
                .index
                .posts()
                .iter()
                .take(HOME_SECTION_LIMIT)
                .map(post_card)
                .collect(),
            latest_questions: self
                .index
                .questions()
                .iter()
                .take(HOME_SECTION_LIMIT)
                .map(question_card)
                .collect(),
            latest_til: self
                .index
                .til()
                .iter()
                .take(HOME_SECTION_LIMIT)
                .map(til_card)
                .collect(),
            term_count: self.index.terms().len(),
            cheatsheet_count: self.index.cheatsheets().len(),
        };
        let head = PageHead::website("/", identity.title.clone(), identity.description.clone())
            .json_ld([seo::website(identity)]);
        let html = render_template(&HomeTemplate {
            view: self.context(&head, view),
        })?;
        Ok(RenderedPage::new("/", html))
    }

    pub fn section_index(&self, kind: ContentKind) -> Result<RenderedPage, AppError> {
        let (intro, entries): (&str, Vec<EntryCard>) = match kind {
            ContentKind::Blog => (
                "Long-form articles, newest first.",
                self.index.posts().iter().map(post_card).collect(),
            ),
            ContentKind::SillyQuestion => (
                "Questions that sound silly until you try to answer them.",
                self.index.questions().iter().map(question_card).collect(),
            ),
            ContentKind::Til => (
                "Short notes on things learned along the way.",
                self.index.til().iter().map(til_card).collect(),
            ),
            ContentKind::TechnicalTerm => (
                "Plain explanations of technical vocabulary.",
                self.index.terms().iter().map(term_card).collect(),
            ),
            ContentKind::Cheatsheet => (
                "Quick references with copy-ready snippets.",
                self.index.cheatsheets().iter().map(cheatsheet_card).collect(),
            ),
        };

        let path = kind.index_path();
        let head = PageHead::website(path.clone(), kind.label(), intro).image(kind.section());
        let view = ListView {
            heading: kind.label().to_string(),
            intro: intro.to_string(),
            entries,
            empty_message: format!("Nothing in {} yet.", kind.label()),
        };
        let html = render_template(&ListTemplate {
            view: self.context(&head, view),
        })?;
        Ok(RenderedPage::new(path, html))
    }

    pub fn post_page(&self, post: &BlogPost) -> Result<RenderedPage, AppError> {
        let identity = self.identity();
        let kind = ContentKind::Blog;
        let path = kind.path_for(&post.slug);

        let mut json_ld = vec![
            seo::blog_posting(identity, post),
            seo::breadcrumbs(identity, kind, &post.slug, &post.title),
        ];
        json_ld.extend(seo::faq_page(&post.faqs));
        let head = PageHead::article(path.clone(), post.title.clone(), post.description.clone())
            .image(content_image_name(kind, &post.slug))
            .json_ld(json_ld);

        let series = self.index.series_for_post(post).map(|series| SeriesNavView {
            title: series.title.clone(),
            href: format!("/series/{}/", series.slug),
            entries: self
                .index
                .series_posts(series)
                .into_iter()
                .map(|entry| SeriesEntryView {
                    title: entry.title.clone(),
                    href: kind.path_for(&entry.slug),
                    current: entry.slug == post.slug,
                })
                .collect(),
        });

        let view = ArticleView {
            title: post.title.clone(),
            description: post.description.clone(),
            author: post.author.clone(),
            date: display_date(post.date),
            iso_date: iso_date(post.date),
            updated: post
                .updated
                .filter(|updated| *updated > post.date)
                .map(iso_date),
            reading_time_minutes: post.reading_time_minutes,
            category: post.category.clone(),
            tags: tag_badges(&post.tags),
            content_html: post.content.clone(),
            toc: toc_items(&post.toc),
            faqs: faq_items(&post.faqs),
            series,
            related: self
                .index
                .related_posts(post)
                .into_iter()
                .map(post_card)
                .collect(),
            stats: stats_widget(kind, &post.slug),
        };
        let html = render_template(&ArticleTemplate {
            view: self.context(&head, view),
        })?;
        Ok(RenderedPage::new(path, html))
    }

    pub fn question_page(&self, question: &SillyQuestion) -> Result<RenderedPage, AppError> {
        let identity = self.identity();
        let kind = ContentKind::SillyQuestion;
        let path = kind.path_for(&question.slug);
        let description = text::excerpt(&question.answer, SUMMARY_MAX_CHARS);

        let head = PageHead::article(path.clone(), question.question.clone(), description)
            .image(content_image_name(kind, &question.slug))
            .json_ld([
                seo::qa_page(identity, question),
                seo::breadcrumbs(identity, kind, &question.slug, &question.question),
            ]);
        let view = QuestionView {
            question: question.question.clone(),
            answer_html: question.answer.clone(),
            date: display_date(question.date),
            iso_date: iso_date(question.date),
            category: question.category.clone(),
            tags: tag_badges(&question.tags),
            stats: stats_widget(kind, &question.slug),
        };
        let html = render_template(&QuestionTemplate {
            view: self.context(&head, view),
        })?;
        Ok(RenderedPage::new(path, html))
    }

    pub fn til_page(&self, entry: &TilEntry) -> Result<RenderedPage, AppError> {
        let identity = self.identity();
        let kind = ContentKind::Til;
        let path = kind.path_for(&entry.slug);
        let description = text::excerpt(&entry.content, SUMMARY_MAX_CHARS);

        let head = PageHead::article(path.clone(), entry.title.clone(), description)
            .image(content_image_name(kind, &entry.slug))
            .json_ld([
                seo::tech_article(identity, entry),
                seo::breadcrumbs(identity, kind, &entry.slug, &entry.title),
            ]);
        let view = TilView {
            title: entry.title.clone(),
            date: display_date(entry.date),
            iso_date: iso_date(entry.date),
            category: entry.category.clone(),
            tags: tag_badges(&entry.tags),
            content_html: entry.content.clone(),
            stats: stats_widget(kind, &entry.slug),
        };
        let html = render_template(&TilTemplate {
            view: self.context(&head, view),
        })?;
        Ok(RenderedPage::new(path, html))
    }

    pub fn term_page(&self, term: &TechnicalTerm) -> Result<RenderedPage, AppError> {
        let identity = self.identity();
        let kind = ContentKind::TechnicalTerm;
        let path = kind.path_for(&term.slug);

        let mut json_ld = vec![
            seo::defined_term(identity, term),
            seo::breadcrumbs(identity, kind, &term.slug, &term.title),
        ];
        json_ld.extend(seo::faq_page(&term.faqs));
        let head = PageHead::article(path.clone(), term.title.clone(), term.description.clone())
            .image(content_image_name(kind, &term.slug))
            .json_ld(json_ld);

        let view = TermView {
            title: term.title.clone(),
            description: term.description.clone(),
            aliases: term.aliases.clone(),
            content_html: term.content.clone(),
            toc: toc_items(&term.toc),
            faqs: faq_items(&term.faqs),
            related: term
                .related
                .iter()
                .filter_map(|slug| self.index.term(slug))
                .map(term_card)
                .collect(),
            stats: stats_widget(kind, &term.slug),
        };
        let html = render_template(&TermTemplate {
            view: self.context(&head, view),
        })?;
        Ok(RenderedPage::new(path, html))
    }

    pub fn cheatsheet_page(&self, sheet: &Cheatsheet) -> Result<RenderedPage, AppError> {
        let identity = self.identity();
        let kind = ContentKind::Cheatsheet;
        let path = kind.path_for(&sheet.slug);

        let head = PageHead::article(path.clone(), sheet.title.clone(), sheet.description.clone())
            .image(content_image_name(kind, &sheet.slug))
            .json_ld([seo::breadcrumbs(identity, kind, &sheet.slug, &sheet.title)]);
        let view = CheatsheetView {
            title: sheet.title.clone(),
            description: sheet.description.clone(),
            sections: sheet
                .sections
                .iter()
                .map(|section| CheatsheetSectionView {
                    title: section.title.clone(),
                    language: section.language.clone(),
                    code_html: section.code_html.clone(),
                })
                .collect(),
        };
        let html = render_template(&CheatsheetTemplate {
            view: self.context(&head, view),
        })?;
        Ok(RenderedPage::new(path, html))
    }

    pub fn tag_page(&self, slug: &str, name: &str) -> Result<RenderedPage, AppError> {
        let path = format!("/tags/{slug}/");
        let heading = format!("Tagged “{}”", title_case(name));
        let content = self.index.tagged(slug);
        let description = format!("{} items tagged {name}.", content.len());
        self.list_page(
            PageHead::website(path, heading.clone(), description.clone()).image("topics"),
            heading,
            description,
            tagged_cards(&content),
        )
    }

    pub fn topics_index(&self) -> Result<RenderedPage, AppError> {
        let entries = self
            .index
            .topics()
            .iter()
            .map(|topic| EntryCard {
                href: format!("/topics/{}/", topic.slug),
                title: topic.title.clone(),
                summary: topic.description.clone(),
                label: "Topic".to_string(),
                date: None,
                iso_date: None,
                tags: tag_badges(&topic.tags),
            })
            .collect();
        let intro = "Curated collections across every kind of content.";
        self.list_page(
            PageHead::website("/topics/", "Topics", intro).image("topics"),
            "Topics".to_string(),
            intro.to_string(),
            entries,
        )
    }

    pub fn topic_page(&self, slug: &str) -> Result<RenderedPage, AppError> {
        let topic = self
            .index
            .topics()
            .iter()
            .find(|topic| topic.slug == slug)
            .ok_or(AppError::NotFound)?;
        let content = self.index.topic_content(topic);
        self.list_page(
            PageHead::website(
                format!("/topics/{}/", topic.slug),
                topic.title.clone(),
                topic.description.clone(),
            )
            .image("topics"),
            topic.title.clone(),
            topic.description.clone(),
            tagged_cards(&content),
        )
    }

    pub fn series_index(&self) -> Result<RenderedPage, AppError> {
        let entries = self
            .index
            .series()
            .iter()
            .map(|series| EntryCard {
                href: format!("/series/{}/", series.slug),
                title: series.title.clone(),
                summary: series.description.clone(),
                label: format!("{} parts", self.index.series_posts(series).len()),
                date: None,
                iso_date: None,
                tags: Vec::new(),
            })
            .collect();
        let intro = "Multi-part articles meant to be read in order.";
        self.list_page(
            PageHead::website("/series/", "Series", intro).image("series"),
            "Series".to_string(),
            intro.to_string(),
            entries,
        )
    }

    pub fn series_page(&self, slug: &str) -> Result<RenderedPage, AppError> {
        let series = self
            .index
            .series()
            .iter()
            .find(|series| series.slug == slug)
            .ok_or(AppError::NotFound)?;
        let entries = self
            .index
            .series_posts(series)
            .into_iter()
            .enumerate()
            .map(|(position, post)| EntryCard {
                label: format!("Part {}", position + 1),
                ..post_card(post)
            })
            .collect();
        self.list_page(
            PageHead::website(
                format!("/series/{}/", series.slug),
                series.title.clone(),
                series.description.clone(),
            )
            .image("series"),
            series.title.clone(),
            series.description.clone(),
            entries,
        )
    }

    pub fn uses_page(&self) -> Result<RenderedPage, AppError> {
        let view = UsesView {
            groups: self
                .index
                .uses()
                .iter()
                .map(|group| UsesGroupView {
                    title: group.title.clone(),
                    items: group
                        .items
                        .iter()
                        .map(|item| UsesItemView {
                            name: item.name.clone(),
                            description: item.description.clone(),
                            url: item.url.clone(),
                        })
                        .collect(),
                })
                .collect(),
        };
        let head = PageHead::website("/uses/", "Uses", "Hardware and software in daily use.")
            .image("uses");
        let html = render_template(&UsesTemplate {
            view: self.context(&head, view),
        })?;
        Ok(RenderedPage::new("/uses/", html))
    }

    pub fn glossary_page(&self) -> Result<RenderedPage, AppError> {
        let mut entries: Vec<GlossaryEntryView> = self
            .index
            .glossary()
            .iter()
            .map(|entry| GlossaryEntryView {
                term: entry.term.clone(),
                definition: entry.definition.clone(),
                link: entry.link.clone(),
            })
            .collect();
        entries.sort_by_key(|entry| entry.term.to_lowercase());

        let head = PageHead::website("/glossary/", "Glossary", "Short definitions at a glance.")
            .image("glossary");
        let html = render_template(&GlossaryTemplate {
            view: self.context(&head, GlossaryView { entries }),
        })?;
        Ok(RenderedPage::new("/glossary/", html))
    }

    pub fn search_page(&self) -> Result<RenderedPage, AppError> {
        let head = PageHead::website(
            "/search/",
            "Search",
            "Search articles, questions, notes and terms.",
        )
        .image("search");
        let html = render_template(&SearchTemplate {
            view: self.context(
                &head,
                SearchPageView {
                    max_results: self.max_results,
                },
            ),
        })?;
        Ok(RenderedPage::new("/search/", html))
    }

    pub fn not_found_page(&self) -> Result<RenderedPage, AppError> {
        let view = ErrorPageView::not_found();
        let mut head = PageHead::website(NOT_FOUND_PATH, view.title.clone(), view.message.clone());
        head.noindex = true;
        let html = render_template(&ErrorTemplate {
            view: self.context(&head, view),
        })?;
        Ok(RenderedPage::new(NOT_FOUND_PATH, html))
    }

    fn list_page(
        &self,
        head: PageHead,
        heading: String,
        intro: String,
        entries: Vec<EntryCard>,
    ) -> Result<RenderedPage, AppError> {
        let view = ListView {
            heading,
            intro,
            entries,
            empty_message: "Nothing here yet.".to_string(),
        };
        let html = render_template(&ListTemplate {
            view: self.context(&head, view),
        })?;
        Ok(RenderedPage::new(head.path, html))
    }

    fn context<T>(&self, head: &PageHead, content: T) -> LayoutContext<T> {
        let identity = self.identity();
        let meta = PageMetaView {
            title: head.title.clone(),
            description: head.description.clone(),
            canonical: identity.url_for(&head.path),
            og_image: identity.og_image_url(&head.og_image),
            og_type: head.og_type,
            twitter_handle: identity.twitter_handle.clone(),
            json_ld: head.json_ld.iter().map(seo::to_script).collect(),
            noindex: head.noindex,
        };
        LayoutContext::new(self.chrome.layout(&head.path), meta, content)
    }
}

fn post_card(post: &BlogPost) -> EntryCard {
    EntryCard {
        href: ContentKind::Blog.path_for(&post.slug),
        title: post.title.clone(),
        summary: post.description.clone(),
        label: post.category.clone(),
        date: Some(display_date(post.date)),
        iso_date: Some(iso_date(post.date)),
        tags: tag_badges(&post.tags),
    }
}

fn question_card(question: &SillyQuestion) -> EntryCard {
    EntryCard {
        href: ContentKind::SillyQuestion.path_for(&question.slug),
        title: question.question.clone(),
        summary: text::excerpt(&question.answer, SUMMARY_MAX_CHARS),
        label: ContentKind::SillyQuestion.label().to_string(),
        date: Some(display_date(question.date)),
        iso_date: Some(iso_date(question.date)),
        tags: tag_badges(&question.tags),
    }
}

fn til_card(entry: &TilEntry) -> EntryCard {
    EntryCard {
        href: ContentKind::Til.path_for(&entry.slug),
        title: entry.title.clone(),
        summary: text::excerpt(&entry.content, SUMMARY_MAX_CHARS),
        label: "TIL".to_string(),
        date: Some(display_date(entry.date)),
        iso_date: Some(iso_date(entry.date)),
        tags: tag_badges(&entry.tags),
    }
}

fn term_card(term: &TechnicalTerm) -> EntryCard {
    EntryCard {
        href: ContentKind::TechnicalTerm.path_for(&term.slug),
        title: term.title.clone(),
        summary: term.description.clone(),
        label: "Term".to_string(),
        date: None,
        iso_date: None,
        tags: Vec::new(),
    }
}

fn cheatsheet_card(sheet: &Cheatsheet) -> EntryCard {
    EntryCard {
        href: ContentKind::Cheatsheet.path_for(&sheet.slug),
        title: sheet.title.clone(),
        summary: sheet.description.clone(),
        label: format!("{} sections", sheet.sections.len()),
        date: None,
        iso_date: None,
        tags: Vec::new(),
    }
}

/// Posts, then questions, then TIL notes; each group keeps index order.
fn tagged_cards(content: &TaggedContent<'_>) -> Vec<EntryCard> {
    content
        .posts
        .iter()
        .map(|post| post_card(post))
        .chain(content.questions.iter().map(|question| question_card(question)))
        .chain(content.til.iter().map(|entry| til_card(entry)))
        .collect()
}

pub fn tag_badges(tags: &[String]) -> Vec<TagBadge> {
    tags.iter()
        .map(|tag| TagBadge {
            href: tag_slug(tag).map(|slug| format!("/tags/{slug}/")),
            label: tag.clone(),
        })
        .collect()
}

fn toc_items(toc: &[TocEntry]) -> Vec<TocItemView> {
    toc.iter()
        .map(|entry| TocItemView {
            anchor: entry.anchor.clone(),
            text: entry.text.clone(),
            level: entry.level,
        })
        .collect()
}

fn faq_items(faqs: &[FaqEntry]) -> Vec<FaqView> {
    faqs.iter()
        .map(|faq| FaqView {
            question: faq.question.clone(),
            answer_html: faq.answer.clone(),
        })
        .collect()
}

fn stats_widget(kind: ContentKind, slug: &str) -> StatsWidgetView {
    StatsWidgetView {
        kind: kind.as_str().to_string(),
        slug: slug.to_string(),
    }
}

fn display_date(date: Date) -> String {
    date.format(DISPLAY_DATE).unwrap_or_else(|_| date.to_string())
}

fn iso_date(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::application::{
        chrome::fixtures::identity,
        index::{
            ContentSet,
            fixtures::{post, question, sample_index, term},
        },
    };
    use crate::domain::entities::{Series, Topic};

    fn chrome() -> ChromeService {
        ChromeService::new(identity(), "v1", 2024)
    }

    #[test]
    fn pages_cover_every_public_path() {
        let index = sample_index();
        let chrome = chrome();
        let pages = PageBuilder::new(&index, &chrome, 20).pages().expect("pages");
        let paths: Vec<_> = pages.iter().map(|page| page.path.as_str()).collect();

        assert_eq!(paths.first(), Some(&"/"));
        assert_eq!(paths.last(), Some(&"/404.html"));
        for expected in [
            "/blog/",
            "/blog/alpha/",
            "/silly-questions/sky/",
            "/til/borrowck/",
            "/technical-terms/mutex/",
            "/cheatsheets/",
            "/tags/rust/",
            "/tags/go/",
            "/topics/",
            "/series/",
            "/uses/",
            "/glossary/",
            "/search/",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn post_page_carries_metadata_and_structured_data() {
        let index = sample_index();
        let chrome = chrome();
        let builder = PageBuilder::new(&index, &chrome, 20);
        let post = index.post("alpha").expect("post");
        let page = builder.post_page(post).expect("page");

        assert_eq!(page.path, "/blog/alpha/");
        assert!(page
            .html
            .contains("<link rel=\"canonical\" href=\"https://ink.example.com/blog/alpha/\">"));
        assert!(page.html.contains("https://ink.example.com/og/blog-alpha.png"));
        assert!(page.html.contains("\"@type\":\"BlogPosting\""));
        assert!(page.html.contains("\"@type\":\"BreadcrumbList\""));
        assert!(page.html.contains("January 10, 2024"));
        assert!(page.html.contains("datetime=\"2024-01-10\""));
        assert!(page.html.contains("href=\"/tags/rust/\""));
        assert!(page.html.contains("data-stats-slug=\"alpha\""));
    }

    #[test]
    fn related_posts_appear_on_article() {
        let index = sample_index();
        let chrome = chrome();
        let builder = PageBuilder::new(&index, &chrome, 20);
        let page = builder
            .post_page(index.post("alpha").expect("post"))
            .expect("page");
        assert!(page.html.contains("Related articles"));
        assert!(page.html.contains("href=\"/blog/beta/\""));
        assert!(!page.html.contains("href=\"/blog/gamma/\""));
    }

    #[test]
    fn series_navigation_marks_current_post() {
        let mut first = post("part-one", date!(2024 - 01 - 01), &[]);
        first.title = "Part One".to_string();
        let mut second = post("part-two", date!(2024 - 01 - 08), &[]);
        second.title = "Part Two".to_string();
        let index = ContentIndex::new(ContentSet {
            posts: vec![first, second],
            series: vec![Series {
                slug: "intro".to_string(),
                title: "Intro Series".to_string(),
                description: String::new(),
                posts: vec!["part-one".to_string(), "part-two".to_string()],
            }],
            ..ContentSet::default()
        });
        let chrome = chrome();
        let builder = PageBuilder::new(&index, &chrome, 20);

        let page = builder
            .post_page(index.post("part-two").expect("post"))
            .expect("page");
        assert!(page.html.contains("<strong>Part Two</strong>"));
        assert!(page.html.contains("<a href=\"/blog/part-one/\">Part One</a>"));

        let listing = builder.series_page("intro").expect("series page");
        assert!(listing.html.contains("Part 1"));
        assert!(listing.html.contains("Part 2"));
    }

    #[test]
    fn topic_page_collects_tagged_content() {
        let index = ContentIndex::new(ContentSet {
            posts: vec![post("alpha", date!(2024 - 01 - 10), &["rust"])],
            questions: vec![question("sky", date!(2024 - 02 - 01), &["Go"])],
            topics: vec![Topic {
                slug: "languages".to_string(),
                title: "Languages".to_string(),
                description: "Programming languages".to_string(),
                tags: vec!["rust".to_string(), "go".to_string()],
            }],
            ..ContentSet::default()
        });
        let chrome = chrome();
        let page = PageBuilder::new(&index, &chrome, 20)
            .topic_page("languages")
            .expect("topic");
        assert!(page.html.contains("href=\"/blog/alpha/\""));
        assert!(page.html.contains("href=\"/silly-questions/sky/\""));
    }

    #[test]
    fn unknown_topic_is_not_found() {
        let index = sample_index();
        let chrome = chrome();
        let err = PageBuilder::new(&index, &chrome, 20)
            .topic_page("nope")
            .expect_err("missing topic");
        assert!(matches!(err, AppError::NotFound));
    }

    #[test]
    fn term_page_links_related_terms() {
        let mut mutex = term("mutex", "Mutex");
        mutex.related = vec!["arc".to_string(), "ghost".to_string()];
        mutex.aliases = vec!["lock".to_string()];
        let index = ContentIndex::new(ContentSet {
            terms: vec![mutex, term("arc", "Arc")],
            ..ContentSet::default()
        });
        let chrome = chrome();
        let page = PageBuilder::new(&index, &chrome, 20)
            .term_page(index.term("mutex").expect("term"))
            .expect("page");
        assert!(page.html.contains("href=\"/technical-terms/arc/\""));
        assert!(!page.html.contains("ghost"));
        assert!(page.html.contains("\"@type\":\"DefinedTerm\""));
    }

    #[test]
    fn not_found_page_is_noindex() {
        let index = ContentIndex::default();
        let chrome = chrome();
        let page = PageBuilder::new(&index, &chrome, 20)
            .not_found_page()
            .expect("404");
        assert_eq!(page.path, "/404.html");
        assert!(page.html.contains("<meta name=\"robots\" content=\"noindex\">"));
    }

    #[test]
    fn empty_sections_show_placeholder() {
        let index = ContentIndex::default();
        let chrome = chrome();
        let page = PageBuilder::new(&index, &chrome, 20)
            .section_index(ContentKind::Til)
            .expect("til index");
        assert!(page.html.contains("Nothing in Today I Learned yet."));
    }
}
