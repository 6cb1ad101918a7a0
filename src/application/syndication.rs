//! RSS 2.0 and Atom 1.0 feeds over blog posts and TIL entries.

use time::{
    Date, OffsetDateTime,
    format_description::well_known::{Rfc2822, Rfc3339},
};

use crate::application::{
    chrome::SiteIdentity, index::ContentIndex, sitemap::xml_escape, text,
};
use crate::domain::types::ContentKind;

pub const FEED_LIMIT: usize = 50;
const SUMMARY_MAX_CHARS: usize = 200;

/// One syndicated item, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub date: Date,
    pub summary: String,
    pub category: String,
}

/// Blog posts and TIL entries merged by date, capped at [`FEED_LIMIT`].
pub fn feed_items(index: &ContentIndex, identity: &SiteIdentity) -> Vec<FeedItem> {
    let posts = index.posts().iter().map(|post| FeedItem {
        title: post.title.clone(),
        link: identity.url_for(&ContentKind::Blog.path_for(&post.slug)),
        date: post.date,
        summary: if post.description.is_empty() {
            text::excerpt(&post.content, SUMMARY_MAX_CHARS)
        } else {
            post.description.clone()
        },
        category: post.category.clone(),
    });
    let til = index.til().iter().map(|entry| FeedItem {
        title: entry.title.clone(),
        link: identity.url_for(&ContentKind::Til.path_for(&entry.slug)),
        date: entry.date,
        summary: text::excerpt(&entry.content, SUMMARY_MAX_CHARS),
        category: entry.category.clone(),
    });

    let mut items: Vec<FeedItem> = posts.chain(til).collect();
    items.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.link.cmp(&b.link)));
    items.truncate(FEED_LIMIT);
    items
}

pub fn rss_feed(identity: &SiteIdentity, items: &[FeedItem]) -> String {
    let base = identity.url_for("/");
    let mut body = String::new();
    for item in items {
        let pub_date = timestamp(item.date)
            .format(&Rfc2822)
            .unwrap_or_else(|_| item.date.to_string());
        body.push_str(&format!(
            "    <item>\n      <title>{}</title>\n      <link>{}</link>\n      <guid>{}</guid>\n      <pubDate>{}</pubDate>\n      <category>{}</category>\n      <description>{}</description>\n    </item>\n",
            xml_escape(&item.title),
            xml_escape(&item.link),
            xml_escape(&item.link),
            pub_date,
            xml_escape(&item.category),
            xml_escape(&item.summary),
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\">\n  <channel>\n    <title>{}</title>\n    <link>{}</link>\n    <description>{}</description>\n    <language>{}</language>\n{}  </channel>\n</rss>\n",
        xml_escape(&identity.title),
        xml_escape(&base),
        xml_escape(&identity.description),
        xml_escape(&identity.language),
        body
    )
}

pub fn atom_feed(identity: &SiteIdentity, items: &[FeedItem]) -> String {
    let base = identity.url_for("/");
    let updated = items
        .first()
        .map(|item| item.date)
        .unwrap_or(Date::MIN);
    let updated = rfc3339(updated);

    let mut entries = String::new();
    for item in items {
        entries.push_str(&format!(
            "  <entry>\n    <title>{}</title>\n    <link href=\"{}\"/>\n    <id>{}</id>\n    <updated>{}</updated>\n    <summary>{}</summary>\n  </entry>\n",
            xml_escape(&item.title),
            xml_escape(&item.link),
            xml_escape(&item.link),
            rfc3339(item.date),
            xml_escape(&item.summary),
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<feed xmlns=\"http://www.w3.org/2005/Atom\">\n  <title>{}</title>\n  <id>{}</id>\n  <updated>{}</updated>\n  <author><name>{}</name></author>\n  <link href=\"{}atom.xml\" rel=\"self\"/>\n  <link href=\"{}\"/>\n{}</feed>\n",
        xml_escape(&identity.title),
        xml_escape(&base),
        updated,
        xml_escape(&identity.author),
        xml_escape(&base),
        xml_escape(&base),
        entries
    )
}

fn timestamp(date: Date) -> OffsetDateTime {
    date.midnight().assume_utc()
}

fn rfc3339(date: Date) -> String {
    timestamp(date)
        .format(&Rfc3339)
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::application::chrome::fixtures::identity;
    use crate::application::index::{
        ContentSet,
        fixtures::{post, sample_index},
    };

    #[test]
    fn items_merge_posts_and_til_by_date() {
        let items = feed_items(&sample_index(), &identity());
        let links: Vec<_> = items.iter().map(|item| item.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://ink.example.com/til/borrowck/",
                "https://ink.example.com/blog/beta/",
                "https://ink.example.com/blog/gamma/",
                "https://ink.example.com/blog/alpha/",
            ]
        );
    }

    #[test]
    fn items_are_capped() {
        let posts = (0..60)
            .map(|n| post(&format!("p{n:02}"), date!(2024 - 01 - 01), &[]))
            .collect();
        let index = ContentIndex::new(ContentSet {
            posts,
            ..ContentSet::default()
        });
        assert_eq!(feed_items(&index, &identity()).len(), FEED_LIMIT);
    }

    #[test]
    fn rss_contains_escaped_items() {
        let items = vec![FeedItem {
            title: "Ownership & Borrowing".to_string(),
            link: "https://ink.example.com/blog/own/".to_string(),
            date: date!(2024 - 02 - 03),
            summary: "Move <semantics>".to_string(),
            category: "Rust".to_string(),
        }];
        let xml = rss_feed(&identity(), &items);
        assert!(xml.contains("<title>Ownership &amp; Borrowing</title>"));
        assert!(xml.contains("<pubDate>Sat, 03 Feb 2024 00:00:00 +0000</pubDate>"));
        assert!(xml.contains("<description>Move &lt;semantics&gt;</description>"));
        assert!(xml.contains("<link>https://ink.example.com/</link>"));
    }

    #[test]
    fn atom_uses_newest_item_as_updated() {
        let items = feed_items(&sample_index(), &identity());
        let xml = atom_feed(&identity(), &items);
        assert!(xml.contains("<updated>2024-04-01T00:00:00Z</updated>"));
        assert!(xml.contains("<link href=\"https://ink.example.com/atom.xml\" rel=\"self\"/>"));
        assert_eq!(xml.matches("<entry>").count(), 4);
    }
}
