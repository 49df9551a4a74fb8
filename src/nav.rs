use std::{path::Path, sync::LazyLock};

use anyhow::Context as _;
use log::debug;
use maud::html;
use regex::{Captures, Regex};

use crate::{
    markup::{self, Attributes, Placeholder},
    site::{NavData, NavItem},
};

static ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b([^>]*)>").expect("valid anchor pattern"));

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:").expect("valid scheme pattern"));

static NAV_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*<nav\b[^>]*>(.*)</nav>\s*$").expect("valid wrapper pattern")
});

pub(crate) static MAIN_NAV: LazyLock<Placeholder> = LazyLock::new(|| Placeholder::new("main-nav"));

/// Where a page sits relative to the site root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageLocation {
    path: String,
    folder: String,
    depth: usize,
}

impl PageLocation {
    pub fn new(rel_path: &str) -> Self {
        let path = rel_path.replace('\\', "/").trim_start_matches('/').to_string();
        let folder = path
            .rsplit_once('/')
            .map_or(String::new(), |(folder, _)| folder.to_string());
        let depth = path.matches('/').count();
        Self {
            path,
            folder,
            depth,
        }
    }

    pub fn from_path(rel_path: &Path) -> Self {
        Self::new(&rel_path.to_string_lossy())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// `""` at the root, one `../` per folder level below it.
    pub fn root_prefix(&self) -> String {
        "../".repeat(self.depth)
    }
}

fn is_absolute(href: &str) -> bool {
    href.starts_with("//") || SCHEME.is_match(href)
}

/// Turns a root-relative href into one that resolves from `location`.
pub(crate) fn resolve_href(raw: &str, location: &PageLocation) -> String {
    if raw.is_empty() || raw.starts_with('#') || is_absolute(raw) {
        return raw.to_string();
    }
    let href = raw.trim_start_matches('/');
    if location.depth == 0 {
        return href.to_string();
    }
    if let Some(rest) = href.strip_prefix(&format!("{}/", location.folder)) {
        return if rest.is_empty() {
            "./".to_string()
        } else {
            rest.to_string()
        };
    }
    format!("{}{href}", location.root_prefix())
}

fn normalize_target(raw: &str) -> Option<String> {
    if raw.is_empty() || raw.contains('#') || is_absolute(raw) {
        return None;
    }
    let target = raw.split('?').next().unwrap_or_default();
    let target = target.trim_start_matches('/').trim_start_matches("./");
    if target.is_empty() || target.ends_with('/') {
        Some(format!("{target}index.html"))
    } else {
        Some(target.to_string())
    }
}

/// Whether a root-relative href points at the page being rendered.
pub(crate) fn is_active(raw: &str, location: &PageLocation) -> bool {
    normalize_target(raw).is_some_and(|target| target == location.path)
}

/// Nav markup built from the site descriptor. Hrefs stay root-relative in `data-root-href`.
pub(crate) fn build_fragment(nav: &NavData) -> String {
    html! {
        div.nav-brand {
            a.brand-link data-root-href="index.html" { (nav.brand.text) }
        }
        ul.nav-links {
            @for item in &nav.items {
                @match item {
                    NavItem::Link { label, href } => {
                        li { a data-root-href=(href) { (label) } }
                    }
                    NavItem::Dropdown { id, label, items } => {
                        li class=(NavItem::dropdown_class(id.as_deref(), label)) {
                            a.dropdown-toggle href="#" { (label) " \u{25BE}" }
                            ul.dropdown-menu {
                                @for entry in items {
                                    li { a data-root-href=(entry.href) { (entry.title) } }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    .into_string()
}

pub(crate) fn fallback_fragment(brand: &str) -> String {
    html! {
        div.nav-brand { (brand) }
    }
    .into_string()
}

/// Reads a hand-written nav fragment, unwrapping an outer `<nav>` element if there is one.
pub(crate) fn load_fragment_file(path: &Path) -> anyhow::Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        std::fs::read_to_string(path).with_context(|| format!("while reading {path:?}"))?;
    let inner = match NAV_WRAPPER.captures(&content) {
        Some(caps) => caps[1].to_string(),
        None => content,
    };
    Ok(Some(inner))
}

/// Rewrites every anchor of `fragment` for `location` and marks the active one.
pub(crate) fn rewrite_fragment(fragment: &str, location: &PageLocation) -> String {
    ANCHOR
        .replace_all(fragment, |caps: &Captures| {
            let mut attrs = Attributes::parse(&caps[1]);
            let raw = match attrs.remove("data-root-href") {
                Some(root_href) => root_href,
                None => attrs.get("href").unwrap_or_default().to_string(),
            };
            let href = resolve_href(&raw, location);
            debug!("nav link {raw:?} -> {href:?} on {}", location.path);

            if !raw.is_empty() {
                attrs.set("href", href);
            }
            let markable = !attrs.has_class("dropdown-toggle") && !attrs.has_class("brand-link");
            if markable && is_active(&raw, location) {
                attrs.add_class("active");
            }
            format!("<a{attrs}>")
        })
        .into_owned()
}

/// Puts the rewritten nav into the page: inside `#main-nav` if present, else at the top of `<body>`.
pub(crate) fn inject(page: &str, nav_inner: &str) -> String {
    if let Some(filled) = MAIN_NAV.fill(page, nav_inner) {
        return filled;
    }
    let nav = format!("<nav id=\"main-nav\" class=\"navbar\">{nav_inner}</nav>");
    markup::insert_after_body_open(page, &nav)
}
