use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::{command, value_parser, Arg};
use context::Context;
use env_logger::{Builder, Env};
use generator::generate;

mod assets;
mod blog;
mod context;
mod feed;
mod generator;
mod markdown;
mod markup;
mod nav;
mod renderer;
mod site;

fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let matches = command!()
        .args(&[
            Arg::new("site_dir")
                .help("Directory of the site sources (pages, data/site.json, blog/posts)")
                .value_parser(value_parser!(PathBuf))
                .default_value("."),
            Arg::new("out_dir")
                .help("Directory path of output. Existing contents will be removed.")
                .long("out-dir")
                .short('o')
                .value_parser(value_parser!(PathBuf))
                .default_value("out"),
            Arg::new("template_dir")
                .help("Directory of templates overriding the built-in ones [default: <site_dir>/templates]")
                .long("template-dir")
                .value_parser(value_parser!(PathBuf)),
            Arg::new("site_name")
                .help("Brand shown when the site data has no nav")
                .long("site-name")
                .env("SITE_NAME")
                .default_value(""),
            Arg::new("site_url")
                .help("Public URL of the site. Enables feed.xml")
                .long("site-url")
                .env("SITE_URL"),
        ])
        .get_matches();

    let site_dir = matches
        .get_one::<PathBuf>("site_dir")
        .context("site_dir is required")?
        .to_owned();
    if !site_dir.is_dir() {
        bail!("site_dir must be a directory.");
    }
    let out_dir = matches
        .get_one::<PathBuf>("out_dir")
        .context("out_dir is required")?
        .to_owned();
    if out_dir.exists() && !out_dir.is_dir() {
        bail!("if out_dir exists, it must be directory.");
    }
    let template_dir = match matches.get_one::<PathBuf>("template_dir") {
        Some(dir) if !dir.is_dir() => bail!("template_dir must be a directory."),
        Some(dir) => dir.to_owned(),
        None => site_dir.join("templates"),
    };
    let site_name = matches
        .get_one::<String>("site_name")
        .cloned()
        .unwrap_or_default();
    let site_url = matches.get_one::<String>("site_url").cloned();

    let handlebars = renderer::generate_renderer(&template_dir)?;

    Context::init(Context {
        site_dir,
        out_dir,
        template_dir,
        site_name,
        site_url,
        handlebars,
    })?;

    generate(Context::instance()?)
}
