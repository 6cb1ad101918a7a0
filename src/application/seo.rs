//! schema.org JSON-LD for every page type.

use serde_json::{Value, json};

use crate::application::{chrome::SiteIdentity, sitemap::format_day, text};
use crate::domain::{
    entities::{BlogPost, FaqEntry, SillyQuestion, TechnicalTerm, TilEntry},
    types::ContentKind,
};

const SCHEMA_CONTEXT: &str = "https://schema.org";

/// `WebSite` with a `SearchAction` pointing at the search page.
pub fn website(identity: &SiteIdentity) -> Value {
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "WebSite",
        "name": identity.title,
        "description": identity.description,
        "url": identity.url_for("/"),
        "inLanguage": identity.language,
        "potentialAction": {
            "@type": "SearchAction",
            "target": {
                "@type": "EntryPoint",
                "urlTemplate": format!("{}?q={{search_term_string}}", identity.url_for("/search/")),
            },
            "query-input": "required name=search_term_string",
        },
    })
}

pub fn blog_posting(identity: &SiteIdentity, post: &BlogPost) -> Value {
    let url = identity.url_for(&ContentKind::Blog.path_for(&post.slug));
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "BlogPosting",
        "headline": post.title,
        "description": post.description,
        "datePublished": format_day(post.date),
        "dateModified": format_day(post.last_modified()),
        "author": person(&post.author),
        "publisher": person(&identity.author),
        "keywords": post.tags.join(", "),
        "articleSection": post.category,
        "wordCount": post.word_count,
        "url": url,
        "mainEntityOfPage": { "@type": "WebPage", "@id": url },
        "image": identity.og_image_url(&format!("blog-{}", post.slug)),
        "inLanguage": identity.language,
    })
}

/// `FAQPage`; `None` when there are no entries.
pub fn faq_page(faqs: &[FaqEntry]) -> Option<Value> {
    if faqs.is_empty() {
        return None;
    }
    let entities: Vec<Value> = faqs
        .iter()
        .map(|faq| {
            json!({
                "@type": "Question",
                "name": faq.question,
                "acceptedAnswer": {
                    "@type": "Answer",
                    "text": text::html_to_text(&faq.answer),
                },
            })
        })
        .collect();
    Some(json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "FAQPage",
        "mainEntity": entities,
    }))
}

pub fn qa_page(identity: &SiteIdentity, question: &SillyQuestion) -> Value {
    let url = identity.url_for(&ContentKind::SillyQuestion.path_for(&question.slug));
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "QAPage",
        "mainEntity": {
            "@type": "Question",
            "name": question.question,
            "text": question.question,
            "answerCount": 1,
            "dateCreated": format_day(question.date),
            "author": person(&identity.author),
            "acceptedAnswer": {
                "@type": "Answer",
                "text": text::html_to_text(&question.answer),
                "dateCreated": format_day(question.date),
                "url": url,
                "author": person(&identity.author),
            },
        },
    })
}

pub fn defined_term(identity: &SiteIdentity, term: &TechnicalTerm) -> Value {
    let mut value = json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "DefinedTerm",
        "name": term.title,
        "description": term.description,
        "url": identity.url_for(&ContentKind::TechnicalTerm.path_for(&term.slug)),
        "inDefinedTermSet": identity.url_for(&ContentKind::TechnicalTerm.index_path()),
    });
    if !term.aliases.is_empty() {
        value["alternateName"] = json!(term.aliases);
    }
    value
}

pub fn tech_article(identity: &SiteIdentity, entry: &TilEntry) -> Value {
    let url = identity.url_for(&ContentKind::Til.path_for(&entry.slug));
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "TechArticle",
        "headline": entry.title,
        "description": text::excerpt(&entry.content, 160),
        "datePublished": format_day(entry.date),
        "author": person(&identity.author),
        "keywords": entry.tags.join(", "),
        "articleSection": entry.category,
        "url": url,
        "image": identity.og_image_url(&format!("til-{}", entry.slug)),
    })
}

/// Home → section → item trail for a detail page.
pub fn breadcrumbs(identity: &SiteIdentity, kind: ContentKind, slug: &str, name: &str) -> Value {
    let trail = [
        ("Home".to_string(), identity.url_for("/")),
        (kind.label().to_string(), identity.url_for(&kind.index_path())),
        (name.to_string(), identity.url_for(&kind.path_for(slug))),
    ];
    let items: Vec<Value> = trail
        .iter()
        .enumerate()
        .map(|(position, (name, url))| {
            json!({
                "@type": "ListItem",
                "position": position + 1,
                "name": name,
                "item": url,
            })
        })
        .collect();
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "BreadcrumbList",
        "itemListElement": items,
    })
}

/// Serialise for a `<script type="application/ld+json">` body.
///
/// `<` is escaped so content can never close the script element.
pub fn to_script(value: &Value) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "{}".to_string())
        .replace('<', "\\u003c")
}

fn person(name: &str) -> Value {
    json!({ "@type": "Person", "name": name })
}
