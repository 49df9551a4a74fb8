use atom_syndication::{EntryBuilder, FeedBuilder, FixedDateTime, LinkBuilder};
use chrono::{NaiveDate, NaiveTime, Utc};

use crate::{blog::sort_posts, site::PostMeta};

fn to_datetime(date: NaiveDate) -> FixedDateTime {
    date.and_time(NaiveTime::default()).and_utc().fixed_offset()
}

/// Atom feed of the blog, newest post first. `base_url` is the public root of the site.
pub(crate) fn render_feed(posts: &[PostMeta], base_url: &str, title: &str) -> anyhow::Result<String> {
    let base = base_url.trim_end_matches('/');

    let entries: Vec<_> = sort_posts(posts)
        .into_iter()
        .filter(|post| post.is_valid_slug())
        .map(|post| {
            let url = format!("{base}/{}", post.page_path());
            let date = to_datetime(post.date);
            EntryBuilder::default()
                .title(post.title.clone())
                .id(url.clone())
                .updated(date)
                .published(Some(date))
                .links(vec![LinkBuilder::default().href(url).rel("alternate").build()])
                .build()
        })
        .collect();

    let updated = entries
        .first()
        .map(|entry| *entry.updated())
        .unwrap_or_else(|| Utc::now().fixed_offset());

    let feed = FeedBuilder::default()
        .title(title.to_string())
        .id(format!("{base}/"))
        .updated(updated)
        .links(vec![
            LinkBuilder::default().href(format!("{base}/")).rel("alternate").build(),
            LinkBuilder::default().href(format!("{base}/feed.xml")).rel("self").build(),
        ])
        .entries(entries)
        .build();

    let bytes = feed.write_to(Vec::new())?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_posts_newest_first() {
        let posts = vec![
            PostMeta {
                title: "First".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                slug: "first".to_string(),
            },
            PostMeta {
                title: "Second".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                slug: "second".to_string(),
            },
            PostMeta {
                title: "Broken".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                slug: "../broken".to_string(),
            },
        ];
        let xml = render_feed(&posts, "https://example.com/", "Jesse").unwrap();

        assert!(xml.contains("https://example.com/blog/second.html"));
        assert!(!xml.contains("broken"));
        let second = xml.find("Second").unwrap();
        let first = xml.find("First").unwrap();
        assert!(second < first);
        assert!(xml.contains("2024-06-01T00:00:00"));
    }

    #[test]
    fn empty_blog_still_renders() {
        let xml = render_feed(&[], "https://example.com", "Jesse").unwrap();
        assert!(xml.contains("<title>Jesse</title>"));
        assert!(xml.contains("https://example.com/feed.xml"));
    }
}
