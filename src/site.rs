use std::path::Path;

use anyhow::Context as _;
use chrono::NaiveDate;
use log::warn;
use serde::Deserialize;

/// Contents of `data/site.json`.
#[derive(Deserialize, Debug, Clone, Default)]
pub(crate) struct SiteData {
    #[serde(default)]
    pub nav: Option<NavData>,
    #[serde(default)]
    pub blog: Option<BlogData>,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct NavData {
    pub brand: Brand,
    #[serde(default)]
    pub items: Vec<NavItem>,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct Brand {
    pub text: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum NavItem {
    Link {
        label: String,
        href: String,
    },
    Dropdown {
        #[serde(default)]
        id: Option<String>,
        label: String,
        #[serde(default)]
        items: Vec<DropdownEntry>,
    },
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct DropdownEntry {
    pub title: String,
    pub href: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub(crate) struct BlogData {
    #[serde(default)]
    pub posts: Vec<PostMeta>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostMeta {
    pub title: String,
    pub date: NaiveDate,
    pub slug: String,
}

impl SiteData {
    /// Reads the site descriptor. A missing file yields empty data, a malformed one is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            warn!("Site data ({path:?}) does not exist. continuing without nav and posts...");
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("while reading {path:?}"))?;
        Self::parse(&content).with_context(|| format!("while parsing {path:?}"))
    }

    pub fn parse(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn posts(&self) -> &[PostMeta] {
        self.blog.as_ref().map(|b| b.posts.as_slice()).unwrap_or_default()
    }

    pub fn brand(&self) -> Option<&str> {
        self.nav.as_ref().map(|n| n.brand.text.as_str())
    }
}

impl NavItem {
    /// Class of a dropdown container. Always ends in `-dropdown` so the toggle script finds it.
    pub fn dropdown_class(id: Option<&str>, label: &str) -> String {
        match id {
            Some(id) if id.ends_with("-dropdown") => id.to_string(),
            Some(id) => format!("{id}-dropdown"),
            None => format!("{}-dropdown", label.trim().to_lowercase().replace(' ', "-")),
        }
    }
}

impl PostMeta {
    /// Slugs become file names, so anything that could escape the posts directory is rejected.
    pub fn is_valid_slug(&self) -> bool {
        !self.slug.is_empty()
            && !self.slug.starts_with('.')
            && !self.slug.contains(['/', '\\'])
    }

    /// Root-relative path of the rendered post page.
    pub fn page_path(&self) -> String {
        format!("blog/{}.html", self.slug)
    }
}
