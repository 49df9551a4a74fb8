use std::path::Path;

use anyhow::Context;
use handlebars::Handlebars;
use log::debug;

const DEFAULT_LAYOUT: &str = include_str!("../templates/layout.hbs");
const DEFAULT_POST: &str = include_str!("../templates/post.hbs");
const DEFAULT_BLOG: &str = include_str!("../templates/blog.hbs");

/// Template source from `template_dir` if the file exists there, the built-in one otherwise.
fn template_source(template_dir: &Path, file_name: &str, default: &str) -> anyhow::Result<String> {
    let path = template_dir.join(file_name);
    if path.is_file() {
        debug!("using template {path:?}");
        std::fs::read_to_string(&path).context(file_name.to_string())
    } else {
        Ok(default.to_string())
    }
}

pub(crate) fn generate_renderer(template_dir: &Path) -> anyhow::Result<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();
    handlebars
        .register_partial(
            "layout",
            template_source(template_dir, "layout.hbs", DEFAULT_LAYOUT)?,
        )
        .context("layout.hbs")?;
    handlebars
        .register_template_string("post", template_source(template_dir, "post.hbs", DEFAULT_POST)?)
        .context("post.hbs")?;
    handlebars
        .register_template_string("blog", template_source(template_dir, "blog.hbs", DEFAULT_BLOG)?)
        .context("blog.hbs")?;

    Ok(handlebars)
}
