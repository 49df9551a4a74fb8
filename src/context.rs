use std::{path::PathBuf, sync::OnceLock};

#[derive(Debug)]
pub(crate) struct Context {
    pub site_dir: PathBuf,
    pub out_dir: PathBuf,
    pub template_dir: PathBuf,

    /// Brand used when the site data carries no nav.
    pub site_name: String,
    /// Public root of the site. The Atom feed is only written when it is known.
    pub site_url: Option<String>,

    pub handlebars: handlebars::Handlebars<'static>,
}

static CONTEXT: OnceLock<Context> = OnceLock::new();

impl Context {
    pub fn init(context: Context) -> anyhow::Result<()> {
        CONTEXT
            .set(context)
            .map_err(|_| anyhow::anyhow!("context is already initialized"))
    }

    pub fn instance() -> anyhow::Result<&'static Context> {
        CONTEXT
            .get()
            .ok_or_else(|| anyhow::anyhow!("context is not initialized"))
    }

    pub fn site_data_path(&self) -> PathBuf {
        self.site_dir.join("data").join("site.json")
    }

    pub fn nav_fragment_path(&self) -> PathBuf {
        self.site_dir.join("nav.html")
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.site_dir.join("blog").join("posts")
    }
}
