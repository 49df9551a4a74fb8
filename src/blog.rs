use chrono::{Datelike, NaiveDate};
use maud::html;

use crate::{
    nav::{self, PageLocation},
    site::PostMeta,
};

/// Posts of one calendar month, in display order.
#[derive(Debug, PartialEq)]
pub(crate) struct MonthGroup<'a> {
    pub label: String,
    pub posts: Vec<&'a PostMeta>,
}

/// Newest first. Posts sharing a date keep their listed order.
pub(crate) fn sort_posts(posts: &[PostMeta]) -> Vec<&PostMeta> {
    let mut sorted: Vec<&PostMeta> = posts.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

pub(crate) fn group_by_month<'a>(posts: &[&'a PostMeta]) -> Vec<MonthGroup<'a>> {
    let mut groups: Vec<(i32, u32, MonthGroup<'a>)> = vec![];
    for &post in posts {
        let key = (post.date.year(), post.date.month());
        if let Some((year, month, group)) = groups.last_mut() {
            if (*year, *month) == key {
                group.posts.push(post);
                continue;
            }
        }
        groups.push((
            key.0,
            key.1,
            MonthGroup {
                label: post.date.format("%B %Y").to_string(),
                posts: vec![post],
            },
        ));
    }
    groups.into_iter().map(|(_, _, group)| group).collect()
}

pub(crate) fn render_index(groups: &[MonthGroup], location: &PageLocation) -> String {
    if groups.is_empty() {
        return html! { p { "No posts yet. Check back soon!" } }.into_string();
    }
    html! {
        @for group in groups {
            h2.blog-month { (group.label) }
            ul.blog-list {
                @for post in &group.posts {
                    li.blog-item {
                        a href=(nav::resolve_href(&post.page_path(), location)) {
                            span.blog-date { (post.date.format("%b %-d")) }
                            span.blog-title { (post.title) }
                        }
                    }
                }
            }
        }
    }
    .into_string()
}

pub(crate) fn render_post_date(date: NaiveDate) -> String {
    html! {
        p.post-date { (date.format("%B %-d, %Y")) }
    }
    .into_string()
}

/// Sorted, grouped and rendered listing for the page at `location`.
pub(crate) fn render_listing(posts: &[PostMeta], location: &PageLocation) -> String {
    let sorted = sort_posts(posts);
    render_index(&group_by_month(&sorted), location)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str, date: (i32, u32, u32), slug: &str) -> PostMeta {
        PostMeta {
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            slug: slug.to_string(),
        }
    }

    fn sample() -> Vec<PostMeta> {
        vec![
            post("Older", (2024, 12, 20), "older"),
            post("Newest", (2025, 1, 15), "newest"),
            post("Same Day A", (2025, 1, 5), "same-a"),
            post("Same Day B", (2025, 1, 5), "same-b"),
        ]
    }

    #[test]
    fn sorts_newest_first_and_stable() {
        let posts = sample();
        let slugs: Vec<_> = sort_posts(&posts).iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["newest", "same-a", "same-b", "older"]);
    }

    #[test]
    fn groups_contiguous_months() {
        let posts = sample();
        let sorted = sort_posts(&posts);
        let groups = group_by_month(&sorted);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "January 2025");
        assert_eq!(groups[0].posts.len(), 3);
        assert_eq!(groups[1].label, "December 2024");
        assert_eq!(groups[1].posts[0].slug, "older");
    }

    #[test]
    fn same_month_different_year_is_split() {
        let posts = vec![post("a", (2025, 3, 1), "a"), post("b", (2024, 3, 1), "b")];
        let sorted = sort_posts(&posts);
        let labels: Vec<_> = group_by_month(&sorted).into_iter().map(|g| g.label).collect();
        assert_eq!(labels, ["March 2025", "March 2024"]);
    }

    #[test]
    fn renders_grouped_listing() {
        let posts = sample();
        let html = render_listing(&posts, &PageLocation::new("blog/index.html"));
        assert!(html.starts_with(r#"<h2 class="blog-month">January 2025</h2><ul class="blog-list">"#));
        assert!(html.contains(
            r#"<li class="blog-item"><a href="newest.html"><span class="blog-date">Jan 15</span><span class="blog-title">Newest</span></a></li>"#
        ));
        assert!(html.contains(r#"<span class="blog-date">Dec 20</span>"#));
    }

    #[test]
    fn links_resolve_from_other_folders() {
        let posts = vec![post("Hi", (2025, 2, 3), "hi")];
        let from_root = render_listing(&posts, &PageLocation::new("index.html"));
        assert!(from_root.contains(r#"href="blog/hi.html""#));
        let from_projects = render_listing(&posts, &PageLocation::new("projects/x.html"));
        assert!(from_projects.contains(r#"href="../blog/hi.html""#));
    }

    #[test]
    fn escapes_titles() {
        let posts = vec![post("<script>", (2025, 2, 3), "x")];
        let html = render_listing(&posts, &PageLocation::new("blog/index.html"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn empty_listing_message() {
        let html = render_listing(&[], &PageLocation::new("blog/index.html"));
        assert_eq!(html, "<p>No posts yet. Check back soon!</p>");
    }

    #[test]
    fn post_date_line() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(render_post_date(date), r#"<p class="post-date">January 5, 2025</p>"#);
    }
}
