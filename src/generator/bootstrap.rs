use std::sync::LazyLock;

use log::{info, warn};

use crate::{
    assets, blog,
    markup::Placeholder,
    nav::{self, PageLocation},
    site::{PostMeta, SiteData},
};

static BLOG_POSTS: LazyLock<Placeholder> = LazyLock::new(|| Placeholder::new("blog-posts"));

/// Everything a page needs at build time: the shared nav and the post listing.
#[derive(Debug)]
pub(super) struct Bootstrap {
    nav_fragment: String,
    posts: Vec<PostMeta>,
}

impl Bootstrap {
    /// Picks the nav source: the site descriptor, then a `nav.html` fragment, then a brand-only bar.
    pub fn new(site: &SiteData, nav_file: Option<String>, brand: &str, posts: Vec<PostMeta>) -> Self {
        let nav_fragment = match (&site.nav, nav_file) {
            (Some(nav_data), _) => {
                info!("building nav from site data ({} items)", nav_data.items.len());
                nav::build_fragment(nav_data)
            }
            (None, Some(fragment)) => {
                info!("using nav fragment file");
                fragment
            }
            (None, None) => {
                warn!("no nav available. falling back to brand only");
                nav::fallback_fragment(brand)
            }
        };
        Self {
            nav_fragment,
            posts,
        }
    }

    pub fn has_dropdowns(&self) -> bool {
        self.nav_fragment.contains("dropdown-toggle")
    }

    /// Nav first, then the blog listing, then the dropdown script.
    pub fn apply(&self, page: &str, location: &PageLocation) -> String {
        let nav_html = nav::rewrite_fragment(&self.nav_fragment, location);
        let mut page = nav::inject(page, &nav_html);

        if BLOG_POSTS.is_present(&page) {
            let listing = blog::render_listing(&self.posts, location);
            match BLOG_POSTS.fill(&page, &listing) {
                Some(filled) => page = filled,
                None => warn!("blog-posts element in {} is never closed", location.path()),
            }
        }

        if self.has_dropdowns() {
            page = assets::reference_dropdown_script(&page, location);
        }
        page
    }
}
