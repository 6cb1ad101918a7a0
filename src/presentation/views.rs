use askama::Template;

use crate::infra::error::InfraError;

pub fn render_template<T: Template>(template: &T) -> Result<String, InfraError> {
    template.render().map_err(InfraError::from)
}

#[derive(Debug, Clone)]
pub struct NavLinkView {
    pub label: String,
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct LayoutChrome {
    pub site_title: String,
    pub language: String,
    pub nav: Vec<NavLinkView>,
    pub stylesheet_href: String,
    pub syntax_stylesheet_href: String,
    pub footer_text: String,
}

#[derive(Debug, Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub og_image: String,
    /// `website` or `article`.
    pub og_type: &'static str,
    pub twitter_handle: Option<String>,
    /// Serialised JSON-LD documents, one `<script>` each.
    pub json_ld: Vec<String>,
    pub noindex: bool,
}

#[derive(Debug, Clone)]
pub struct LayoutContext<T> {
    pub chrome: LayoutChrome,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, meta: PageMetaView, content: T) -> Self {
        Self {
            chrome,
            meta,
            content,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TagBadge {
    /// `None` when the tag has no slug and therefore no tag page.
    pub href: Option<String>,
    pub label: String,
}

/// Summary card used by every listing.
#[derive(Debug, Clone)]
pub struct EntryCard {
    pub href: String,
    pub title: String,
    pub summary: String,
    pub label: String,
    pub date: Option<String>,
    pub iso_date: Option<String>,
    pub tags: Vec<TagBadge>,
}

#[derive(Debug, Clone)]
pub struct TocItemView {
    pub anchor: String,
    pub text: String,
    pub level: u8,
}

#[derive(Debug, Clone)]
pub struct FaqView {
    pub question: String,
    pub answer_html: String,
}

/// Hook for the client-side view and upvote counters.
#[derive(Debug, Clone)]
pub struct StatsWidgetView {
    pub kind: String,
    pub slug: String,
}

pub struct HomeView {
    pub intro: String,
    pub latest_posts: Vec<EntryCard>,
    pub latest_questions: Vec<EntryCard>,
    pub latest_til: Vec<EntryCard>,
    pub term_count: usize,
    pub cheatsheet_count: usize,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub view: LayoutContext<HomeView>,
}

pub struct ListView {
    pub heading: String,
    pub intro: String,
    pub entries: Vec<EntryCard>,
    pub empty_message: String,
}

#[derive(Template)]
#[template(path = "list.html")]
pub struct ListTemplate {
    pub view: LayoutContext<ListView>,
}

pub struct SeriesEntryView {
    pub title: String,
    pub href: String,
    pub current: bool,
}

pub struct SeriesNavView {
    pub title: String,
    pub href: String,
    pub entries: Vec<SeriesEntryView>,
}

pub struct ArticleView {
    pub title: String,
    pub description: String,
    pub author: String,
    pub date: String,
    pub iso_date: String,
    pub updated: Option<String>,
    pub reading_time_minutes: u32,
    pub category: String,
    pub tags: Vec<TagBadge>,
    pub content_html: String,
    pub toc: Vec<TocItemView>,
    pub faqs: Vec<FaqView>,
    pub series: Option<SeriesNavView>,
    pub related: Vec<EntryCard>,
    pub stats: StatsWidgetView,
}

#[derive(Template)]
#[template(path = "article.html")]
pub struct ArticleTemplate {
    pub view: LayoutContext<ArticleView>,
}

pub struct QuestionView {
    pub question: String,
    pub answer_html: String,
    pub date: String,
    pub iso_date: String,
    pub category: String,
    pub tags: Vec<TagBadge>,
    pub stats: StatsWidgetView,
}

#[derive(Template)]
#[template(path = "question.html")]
pub struct QuestionTemplate {
    pub view: LayoutContext<QuestionView>,
}

pub struct TilView {
    pub title: String,
    pub date: String,
    pub iso_date: String,
    pub category: String,
    pub tags: Vec<TagBadge>,
    pub content_html: String,
    pub stats: StatsWidgetView,
}

#[derive(Template)]
#[template(path = "til.html")]
pub struct TilTemplate {
    pub view: LayoutContext<TilView>,
}

pub struct TermView {
    pub title: String,
    pub description: String,
    pub aliases: Vec<String>,
    pub content_html: String,
    pub toc: Vec<TocItemView>,
    pub faqs: Vec<FaqView>,
    pub related: Vec<EntryCard>,
    pub stats: StatsWidgetView,
}

#[derive(Template)]
#[template(path = "term.html")]
pub struct TermTemplate {
    pub view: LayoutContext<TermView>,
}

pub struct CheatsheetSectionView {
    pub title: String,
    pub language: Option<String>,
    pub code_html: String,
}

pub struct CheatsheetView {
    pub title: String,
    pub description: String,
    pub sections: Vec<CheatsheetSectionView>,
}

#[derive(Template)]
#[template(path = "cheatsheet.html")]
pub struct CheatsheetTemplate {
    pub view: LayoutContext<CheatsheetView>,
}

pub struct UsesItemView {
    pub name: String,
    pub description: String,
    pub url: Option<String>,
}

pub struct UsesGroupView {
    pub title: String,
    pub items: Vec<UsesItemView>,
}

pub struct UsesView {
    pub groups: Vec<UsesGroupView>,
}

#[derive(Template)]
#[template(path = "uses.html")]
pub struct UsesTemplate {
    pub view: LayoutContext<UsesView>,
}

pub struct GlossaryEntryView {
    pub term: String,
    pub definition: String,
    pub link: Option<String>,
}

pub struct GlossaryView {
    pub entries: Vec<GlossaryEntryView>,
}

#[derive(Template)]
#[template(path = "glossary.html")]
pub struct GlossaryTemplate {
    pub view: LayoutContext<GlossaryView>,
}

pub struct SearchPageView {
    pub max_results: usize,
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub view: LayoutContext<SearchPageView>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Try the search or head back home."
                .to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

/// Open Graph card, rasterised to PNG.
#[derive(Template)]
#[template(path = "og.svg")]
pub struct OgCardTemplate {
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    pub label: String,
    pub title_lines: Vec<OgLineView>,
    pub subtitle: String,
    pub subtitle_y: u32,
    pub site_title: String,
    pub site_host: String,
}

pub struct OgLineView {
    pub text: String,
    pub y: u32,
}

/// `rust-lang` → `Rust Lang`.
pub fn title_case(tag: &str) -> String {
    let mut words = Vec::new();
    for segment in tag.split(['-', '_', ' ']) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            let mut word = String::new();
            word.extend(first.to_uppercase());
            word.extend(chars);
            words.push(word);
        }
    }

    if words.is_empty() {
        tag.to_string()
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chrome() -> LayoutChrome {
        LayoutChrome {
            site_title: "Ink & Notes".to_string(),
            language: "en".to_string(),
            nav: vec![NavLinkView {
                label: "Blog".to_string(),
                href: "/blog/".to_string(),
                active: true,
            }],
            stylesheet_href: "/assets/site.css?v=1".to_string(),
            syntax_stylesheet_href: "/assets/syntax.css?v=1".to_string(),
            footer_text: "© 2024 Ada".to_string(),
        }
    }

    fn meta() -> PageMetaView {
        PageMetaView {
            title: "Missing".to_string(),
            description: "Nothing <here>".to_string(),
            canonical: "https://ink.example.com/404.html".to_string(),
            og_image: "https://ink.example.com/og/home.png".to_string(),
            og_type: "website",
            twitter_handle: Some("inknotes".to_string()),
            json_ld: vec!["{\"@type\":\"WebSite\"}".to_string()],
            noindex: true,
        }
    }

    #[test]
    fn error_page_renders_layout_and_escapes_meta() {
        let template = ErrorTemplate {
            view: LayoutContext::new(chrome(), meta(), ErrorPageView::not_found()),
        };
        let html = render_template(&template).expect("render");
        assert!(html.contains("<title>Missing | Ink &#38; Notes</title>"));
        assert!(html.contains("Nothing &#60;here&#62;"));
        assert!(html.contains("<meta name=\"robots\" content=\"noindex\">"));
        assert!(html.contains("<script type=\"application/ld+json\">{\"@type\":\"WebSite\"}</script>"));
        assert!(html.contains("aria-current=\"page\""));
        assert!(html.contains("Page Not Found"));
    }

    #[test]
    fn og_template_emits_one_text_per_line() {
        let template = OgCardTemplate {
            width: 1200,
            height: 630,
            font_family: "sans-serif".to_string(),
            label: "Blog".to_string(),
            title_lines: vec![
                OgLineView {
                    text: "Fearless".to_string(),
                    y: 260,
                },
                OgLineView {
                    text: "concurrency & you".to_string(),
                    y: 340,
                },
            ],
            subtitle: "A tour".to_string(),
            subtitle_y: 420,
            site_title: "Ink Notes".to_string(),
            site_host: "ink.example.com".to_string(),
        };
        let svg = render_template(&template).expect("render");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("concurrency &#38; you"));
        assert_eq!(svg.matches("class=\"title\"").count(), 2);
    }

    #[test]
    fn title_case_splits_separators() {
        assert_eq!(title_case("rust-lang"), "Rust Lang");
        assert_eq!(title_case("web_dev"), "Web Dev");
        assert_eq!(title_case(""), "");
    }
}
