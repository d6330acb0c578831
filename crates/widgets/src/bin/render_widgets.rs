//! Compose one page from the command line.
//!
//! `render_widgets <page.html> [page-context.json]`
//!
//! The theme is taken from `WIDGETS_THEME_BASE`/`WIDGETS_DIR`; the composed page
//! is written to stdout.

use anyhow::{Context as _, Error, anyhow};
use log::error;
use std::env;
use std::fs;
use std::io::{self, Write as _};
use std::process::ExitCode;
use widgets::{BlockingComposer, Composer, ComposerConfig, ManifestLoader, PageContext};

fn run() -> Result<(), Error> {
    let mut args = env::args().skip(1);
    let page_path = args
        .next()
        .ok_or_else(|| anyhow!("usage: render_widgets <page.html> [page-context.json]"))?;
    let html = fs::read_to_string(&page_path).with_context(|| format!("reading {page_path}"))?;
    let page = match args.next() {
        Some(context_path) => {
            let text = fs::read_to_string(&context_path)
                .with_context(|| format!("reading {context_path}"))?;
            serde_json::from_str::<PageContext>(&text)
                .with_context(|| format!("parsing {context_path}"))?
        }
        None => PageContext::default(),
    };

    let composer = Composer::from_loader(&ManifestLoader, ComposerConfig::from_env())?;
    let output = BlockingComposer::new(composer)?.render_widgets(&html, &page)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.write_all(b"\n")?;
    stdout.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
