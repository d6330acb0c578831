//! Synchronous entry point for hosts that cannot await.

use crate::composer::Composer;
use crate::document::PageContext;
use crate::error::BuildError;
use tokio::runtime::{Builder, Handle, Runtime};

/// A `Composer` paired with a current-thread runtime that drains each build
/// before returning.
pub struct BlockingComposer {
    composer: Composer,
    runtime: Runtime,
}

impl BlockingComposer {
    /// # Errors
    /// `BuildError::Runtime` if the runtime cannot be created.
    pub fn new(composer: Composer) -> Result<Self, BuildError> {
        Ok(Self {
            composer,
            runtime: new_runtime()?,
        })
    }

    pub const fn composer(&self) -> &Composer {
        &self.composer
    }

    /// Compose one page, blocking the calling thread until every unit has settled.
    ///
    /// # Errors
    /// The build's error, or `BuildError::Runtime` when called from inside an
    /// async runtime, where blocking would deadlock.
    pub fn render_widgets(&self, html: &str, page: &PageContext) -> Result<String, BuildError> {
        ensure_outside_runtime()?;
        self.runtime.block_on(self.composer.compose(html, page))
    }
}

/// One-shot form of `BlockingComposer::render_widgets` with a throwaway runtime.
///
/// # Errors
/// As `BlockingComposer::render_widgets`.
pub fn render_widgets(
    composer: &Composer,
    html: &str,
    page: &PageContext,
) -> Result<String, BuildError> {
    ensure_outside_runtime()?;
    new_runtime()?.block_on(composer.compose(html, page))
}

fn new_runtime() -> Result<Runtime, BuildError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| BuildError::Runtime(format!("cannot start runtime: {err}")))
}

fn ensure_outside_runtime() -> Result<(), BuildError> {
    if Handle::try_current().is_ok() {
        return Err(BuildError::Runtime(
            "render_widgets was called from inside an async runtime".to_owned(),
        ));
    }
    Ok(())
}
