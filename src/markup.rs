use std::sync::LazyLock;

use regex::{Captures, Regex};

static BODY_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<body\b[^>]*>").expect("valid body pattern"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s=/>"']+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+)))?"#)
        .expect("valid attribute pattern")
});

/// An element located by its `id` whose contents get replaced at build time.
pub(crate) struct Placeholder {
    pattern: Regex,
}

impl Placeholder {
    pub fn new(id: &str) -> Self {
        let pattern = format!(
            r#"(?i)<([a-z][a-z0-9-]*)\b[^>]*\sid\s*=\s*["']{}["'][^>]*>"#,
            regex::escape(id)
        );
        Self {
            pattern: Regex::new(&pattern).expect("escaped id forms a valid pattern"),
        }
    }

    pub fn is_present(&self, page: &str) -> bool {
        self.pattern.is_match(page)
    }

    /// Replaces everything between the placeholder's opening tag and its matching close tag,
    /// counting nested elements of the same name. Returns `None` when the placeholder is absent
    /// or never closed.
    pub fn fill(&self, page: &str, content: &str) -> Option<String> {
        let caps = self.pattern.captures(page)?;
        let open = caps.get(0)?;
        if open.as_str().ends_with("/>") {
            return None;
        }
        let same_name =
            Regex::new(&format!(r"(?i)<(/?){}\b[^>]*>", regex::escape(&caps[1]))).ok()?;

        let mut depth = 1usize;
        let mut close_at = None;
        for tag in same_name.captures_iter(&page[open.end()..]) {
            let whole = tag.get(0)?;
            if !tag[1].is_empty() {
                depth -= 1;
                if depth == 0 {
                    close_at = Some(open.end() + whole.start());
                    break;
                }
            } else if !whole.as_str().ends_with("/>") {
                depth += 1;
            }
        }
        let close_at = close_at?;

        let mut out = String::with_capacity(page.len() + content.len());
        out.push_str(&page[..open.end()]);
        out.push_str(content);
        out.push_str(&page[close_at..]);
        Some(out)
    }
}

pub(crate) fn insert_after_body_open(page: &str, content: &str) -> String {
    match BODY_OPEN.find(page) {
        Some(m) => format!("{}{}{}", &page[..m.end()], content, &page[m.end()..]),
        None => format!("{content}{page}"),
    }
}

pub(crate) fn insert_before_body_close(page: &str, content: &str) -> String {
    match page.to_ascii_lowercase().rfind("</body>") {
        Some(at) => format!("{}{}{}", &page[..at], content, &page[at..]),
        None => format!("{page}{content}"),
    }
}

/// Attributes of a single start tag, kept in source order.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Attributes(Vec<(String, Option<String>)>);

impl Attributes {
    pub fn parse(source: &str) -> Self {
        Self(
            ATTRIBUTE
                .captures_iter(source)
                .map(|caps: Captures| {
                    let value = caps
                        .get(2)
                        .or_else(|| caps.get(3))
                        .or_else(|| caps.get(4))
                        .map(|m| m.as_str().to_string());
                    (caps[1].to_string(), value)
                })
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn set(&mut self, name: &str, value: String) {
        match self.0.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some(entry) => entry.1 = Some(value),
            None => self.0.push((name.to_string(), Some(value))),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let at = self.0.iter().position(|(n, _)| n.eq_ignore_ascii_case(name))?;
        self.0.remove(at).1
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let classes = match self.get("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set("class", classes);
    }
}

impl std::fmt::Display for Attributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, value) in &self.0 {
            match value {
                Some(value) => write!(f, " {name}=\"{}\"", value.replace('"', "&quot;"))?,
                None => write!(f, " {name}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_empty_placeholder() {
        let page = r#"<body><nav id="main-nav" class="x"></nav><p>hi</p></body>"#;
        let filled = Placeholder::new("main-nav").fill(page, "NAV").unwrap();
        assert_eq!(
            filled,
            r#"<body><nav id="main-nav" class="x">NAV</nav><p>hi</p></body>"#
        );
    }

    #[test]
    fn replaces_existing_placeholder_contents() {
        let page = "<DIV ID='blog-posts'><p>Loading...</p></DIV>";
        let filled = Placeholder::new("blog-posts").fill(page, "list").unwrap();
        assert_eq!(filled, "<DIV ID='blog-posts'>list</DIV>");
    }

    #[test]
    fn skips_nested_elements_of_the_same_name() {
        let page = concat!(
            "<main><div id=\"blog-posts\"><div class=\"spinner\"><div>Loading</div></div></div>",
            "<footer>f</footer></main>"
        );
        let filled = Placeholder::new("blog-posts").fill(page, "LIST").unwrap();
        assert_eq!(
            filled,
            "<main><div id=\"blog-posts\">LIST</div><footer>f</footer></main>"
        );
    }

    #[test]
    fn data_id_is_not_an_id() {
        let placeholder = Placeholder::new("main-nav");
        let page = "<div data-id=\"main-nav\"></div><nav id=\"main-nav\"></nav>";
        assert_eq!(
            placeholder.fill(page, "N").unwrap(),
            "<div data-id=\"main-nav\"></div><nav id=\"main-nav\">N</nav>"
        );
        assert!(!placeholder.is_present("<div data-id=\"main-nav\"></div>"));
    }

    #[test]
    fn absent_placeholder_is_none() {
        let placeholder = Placeholder::new("blog-posts");
        assert!(!placeholder.is_present("<div id=\"other\"></div>"));
        assert_eq!(placeholder.fill("<div id=\"other\"></div>", "x"), None);
        assert_eq!(placeholder.fill("<div id=\"blog-posts\">", "x"), None);
    }

    #[test]
    fn body_insertion_points() {
        let page = "<html><body class=\"home\"><p>x</p></body></html>";
        assert_eq!(
            insert_after_body_open(page, "N"),
            "<html><body class=\"home\">N<p>x</p></body></html>"
        );
        assert_eq!(
            insert_before_body_close(page, "S"),
            "<html><body class=\"home\"><p>x</p>S</body></html>"
        );
        assert_eq!(insert_after_body_open("<p>x</p>", "N"), "N<p>x</p>");
        assert_eq!(insert_before_body_close("<p>x</p>", "S"), "<p>x</p>S");
    }

    #[test]
    fn attributes_round_trip_and_edit() {
        let mut attrs = Attributes::parse(r#" data-root-href="index.html" class='nav-home' hidden"#);
        assert_eq!(attrs.get("data-root-href"), Some("index.html"));
        assert!(attrs.has_class("nav-home"));

        let raw = attrs.remove("data-root-href").unwrap();
        attrs.set("href", format!("../{raw}"));
        attrs.add_class("active");
        attrs.add_class("active");
        assert_eq!(
            attrs.to_string(),
            r#" class="nav-home active" hidden href="../index.html""#
        );
    }
}
