use std::{
    collections::{HashSet, VecDeque},
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context as _};
use fs_extra::file::CopyOptions;
use log::{debug, info, warn};

use crate::{
    assets, blog,
    context::Context,
    feed, markdown,
    nav::{self, PageLocation},
    site::{PostMeta, SiteData},
};

use self::{
    bootstrap::Bootstrap,
    data::{BlogPageData, PostPageData},
};

mod bootstrap;
mod data;

const POST_LOAD_FAILURE: &str = "<p>Sorry, this post could not be loaded.</p>";

fn is_html(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

fn write_output(out_dir: &Path, rel_path: &str, content: &str) -> anyhow::Result<()> {
    let out_path = out_dir.join(rel_path);
    if let Some(parent) = out_path.parent() {
        fs_extra::dir::create_all(parent, false)?;
    }
    let mut fd = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&out_path)
        .with_context(|| format!("while opening {out_path:?}"))?;
    fd.write_all(content.as_bytes())?;
    Ok(())
}

/// Posts that can be rendered: valid slugs only, first occurrence of a slug wins.
/// A post may not take over the blog index or a page that exists in the sources.
fn publishable_posts(posts: &[PostMeta], sources: &[PathBuf]) -> Vec<PostMeta> {
    let mut seen = HashSet::new();
    posts
        .iter()
        .filter(|post| {
            if !post.is_valid_slug() {
                warn!("skipping post {:?}: invalid slug {:?}", post.title, post.slug);
                return false;
            }
            if post.slug.eq_ignore_ascii_case("index") {
                warn!("skipping post {:?}: slug \"index\" is the blog index", post.title);
                return false;
            }
            if sources.contains(&PathBuf::from(post.page_path())) {
                warn!(
                    "skipping post {:?}: {} already exists in the site sources",
                    post.title,
                    post.page_path()
                );
                return false;
            }
            if !seen.insert(post.slug.as_str()) {
                warn!("skipping post {:?}: duplicate slug {:?}", post.title, post.slug);
                return false;
            }
            true
        })
        .cloned()
        .collect()
}

/// Source files relative to the site directory, minus fragments, post sources and build output.
fn collect_sources(c: &Context) -> anyhow::Result<Vec<PathBuf>> {
    let skip_dirs: Vec<PathBuf> = [&c.out_dir, &c.template_dir]
        .into_iter()
        .filter_map(|dir| dir.canonicalize().ok())
        .collect();
    let posts_dir = PathBuf::from("blog").join("posts");

    let mut sources = vec![];
    let mut q = VecDeque::new();
    q.push_back(PathBuf::new());
    while let Some(path) = q.pop_front() {
        for entry in std::fs::read_dir(c.site_dir.join(&path))
            .with_context(|| format!("while reading directory {path:?}"))?
        {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }
            let rel_path = path.join(&name);
            let meta = entry.metadata()?;

            if meta.is_dir() {
                let canonical = entry.path().canonicalize()?;
                if skip_dirs.contains(&canonical) {
                    debug!("skipping directory {rel_path:?}");
                    continue;
                }
                q.push_back(rel_path);
            } else if meta.is_file() {
                if rel_path == Path::new("nav.html") {
                    continue;
                }
                if path == posts_dir && rel_path.extension().is_some_and(|ext| ext == "md") {
                    continue;
                }
                sources.push(rel_path);
            }
        }
    }
    Ok(sources)
}

fn generate_page(c: &Context, bootstrap: &Bootstrap, rel_path: &Path) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(c.site_dir.join(rel_path))
        .with_context(|| format!("while reading {rel_path:?}"))?;
    let location = PageLocation::from_path(rel_path);
    let page = bootstrap.apply(&source, &location);
    write_output(&c.out_dir, location.path(), &page)
}

fn generate_post(c: &Context, bootstrap: &Bootstrap, post: &PostMeta, brand: &str) -> anyhow::Result<()> {
    let location = PageLocation::new(&post.page_path());
    let markdown_path = c.posts_dir().join(format!("{}.md", post.slug));

    let data = match std::fs::read_to_string(&markdown_path) {
        Ok(source) => PostPageData {
            page_title: format!("{} - {brand}", post.title),
            date: blog::render_post_date(post.date),
            body: markdown::render(&source),
            root: location.root_prefix(),
        },
        Err(e) => {
            warn!("Failed to load post {:?} from {markdown_path:?}: {e}", post.slug);
            PostPageData {
                page_title: brand.to_string(),
                date: String::new(),
                body: POST_LOAD_FAILURE.to_string(),
                root: location.root_prefix(),
            }
        }
    };

    let page = c
        .handlebars
        .render("post", &data)
        .with_context(|| format!("while generating post {:?}", post.slug))?;
    write_output(&c.out_dir, location.path(), &bootstrap.apply(&page, &location))
}

fn generate_blog_index(c: &Context, bootstrap: &Bootstrap, brand: &str) -> anyhow::Result<()> {
    let location = PageLocation::new("blog/index.html");
    let data = BlogPageData {
        page_title: format!("Blog - {brand}"),
        root: location.root_prefix(),
    };
    let page = c
        .handlebars
        .render("blog", &data)
        .context("while generating blog/index.html")?;
    write_output(&c.out_dir, location.path(), &bootstrap.apply(&page, &location))
}

pub(crate) fn generate(c: &Context) -> anyhow::Result<()> {
    if !c.site_dir.is_dir() {
        bail!("site_dir must be a directory.");
    }
    if c.out_dir.exists() {
        if !c.out_dir.is_dir() {
            bail!("if out_dir exists, it must be directory.");
        }
        if c.site_dir.canonicalize()?.starts_with(c.out_dir.canonicalize()?) {
            bail!("out_dir must not contain site_dir.");
        }
    }

    let site = SiteData::load(&c.site_data_path())?;
    let nav_file = nav::load_fragment_file(&c.nav_fragment_path())?;
    let brand = site.brand().unwrap_or(&c.site_name).to_string();
    let sources = collect_sources(c)?;
    let posts = publishable_posts(site.posts(), &sources);
    let bootstrap = Bootstrap::new(&site, nav_file, &brand, posts.clone());
    info!("{} source files, {} posts", sources.len(), posts.len());

    fs_extra::dir::remove(&c.out_dir)?;
    fs_extra::dir::create_all(&c.out_dir, false)?;

    if bootstrap.has_dropdowns() {
        write_output(&c.out_dir, assets::DROPDOWN_SCRIPT_PATH, assets::DROPDOWN_SCRIPT)?;
    }

    // site sources; a hand-written dropdown script replaces the built-in one
    let mut cp_opts = CopyOptions::new();
    cp_opts.overwrite = true;
    for rel_path in sources.iter() {
        if is_html(rel_path) {
            debug!("bootstrapping {rel_path:?}");
            generate_page(c, &bootstrap, rel_path)?;
        } else {
            let out_path = c.out_dir.join(rel_path);
            if let Some(parent) = out_path.parent() {
                fs_extra::dir::create_all(parent, false)?;
            }
            fs_extra::file::copy(c.site_dir.join(rel_path), &out_path, &cp_opts)
                .with_context(|| format!("while copying {rel_path:?}"))?;
        }
    }

    for post in posts.iter() {
        generate_post(c, &bootstrap, post, &brand)?;
    }

    let blog_index = Path::new("blog").join("index.html");
    if !sources.contains(&blog_index) {
        info!("generating blog/index.html");
        generate_blog_index(c, &bootstrap, &brand)?;
    }

    match &c.site_url {
        Some(site_url) => {
            let xml = feed::render_feed(&posts, site_url, &brand)?;
            write_output(&c.out_dir, "feed.xml", &xml)?;
        }
        None => debug!("no site url. skipping feed.xml"),
    }

    info!("site written to {:?}", c.out_dir);
    Ok(())
}
