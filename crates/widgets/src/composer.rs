//! One page build: match, run every unit concurrently, settle, finalize, serialize.

use crate::assets::inject_assets;
use crate::catalog::{CatalogLoader, WidgetCatalog};
use crate::config::ComposerConfig;
use crate::document::{Document, PageContext};
use crate::error::BuildError;
use crate::finalizer::remove_placeholders;
use crate::lifecycle::run_lifecycle;
use crate::matcher::{MatchedElement, match_widget};
use crate::template::{TagTemplates, TemplateEngine};
use crate::widget::WidgetDefinition;
use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, StreamExt as _};
use log::{debug, error, info};

/// A lifecycle run or an asset injection.
type UnitFuture<'a> = LocalBoxFuture<'a, Result<(), BuildError>>;

/// Composes pages from a fixed catalog.
pub struct Composer {
    catalog: WidgetCatalog,
    config: ComposerConfig,
    templates: Box<dyn TemplateEngine>,
}

impl Composer {
    pub fn new(catalog: WidgetCatalog, config: ComposerConfig) -> Self {
        Self {
            catalog,
            config,
            templates: Box::new(TagTemplates),
        }
    }

    /// Load the catalog through `loader` and build a composer around it.
    ///
    /// # Errors
    /// Returns the loader's error.
    pub fn from_loader(
        loader: &dyn CatalogLoader,
        config: ComposerConfig,
    ) -> Result<Self, BuildError> {
        let catalog = loader.load(&config)?;
        Ok(Self::new(catalog, config))
    }

    /// Use `engine` for template-based widgets instead of `TagTemplates`.
    #[must_use]
    pub fn with_templates(mut self, engine: impl TemplateEngine + 'static) -> Self {
        self.templates = Box::new(engine);
        self
    }

    pub const fn catalog(&self) -> &WidgetCatalog {
        &self.catalog
    }

    pub const fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Parse `html` into a document for `compose_into`.
    ///
    /// # Errors
    /// `BuildError::Parse` if the page cannot be parsed.
    pub fn parse(&self, html: &str) -> Result<Document, BuildError> {
        Document::parse(html).map_err(BuildError::Parse)
    }

    /// Build one page and return the complete document, doctype included.
    ///
    /// # Errors
    /// The parse error, or the first unit failure once every unit has settled.
    pub async fn compose(&self, html: &str, page: &PageContext) -> Result<String, BuildError> {
        let document = self.parse(html)?;
        self.compose_into(&document, page).await?;
        document.to_document_string().map_err(BuildError::Serialize)
    }

    /// Run every widget against `document` in place.
    ///
    /// Matching happens for all widgets before any unit starts, so markup produced
    /// by one widget is never matched in the same build. Units interleave on the
    /// current thread; a failing unit does not cancel the others. Placeholders are
    /// removed after all units settle, whether or not any failed.
    ///
    /// # Errors
    /// The first unit failure in completion order.
    pub async fn compose_into(
        &self,
        document: &Document,
        page: &PageContext,
    ) -> Result<(), BuildError> {
        let mut matched: Vec<(&WidgetDefinition, Vec<MatchedElement<'_>>)> = Vec::new();
        for widget in self.catalog.iter() {
            let elements = match_widget(document, widget)?;
            debug!(
                "widget `{}` matched {} element(s)",
                widget.name(),
                elements.len()
            );
            matched.push((widget, elements));
        }

        let units: FuturesUnordered<UnitFuture<'_>> = FuturesUnordered::new();
        for (widget, elements) in matched {
            let has_matches = !elements.is_empty();
            for target in elements {
                let lifecycle = run_lifecycle(
                    target,
                    page,
                    document,
                    &self.config,
                    self.templates.as_ref(),
                );
                units.push(self.bounded(widget, Box::pin(lifecycle)));
            }
            if has_matches {
                let assets = inject_assets(widget, document, &self.config);
                units.push(self.bounded(widget, Box::pin(assets)));
            }
        }

        let started = units.len();
        let (failures, first_error) = settle(units).await;
        let removed = remove_placeholders(document, &self.config)?;
        info!("composed page: {started} unit(s), {failures} failed, {removed} anchor(s) removed");
        first_error.map_or(Ok(()), Err)
    }

    /// Apply the configured per-unit timeout, if any.
    fn bounded<'a>(&self, widget: &'a WidgetDefinition, unit: UnitFuture<'a>) -> UnitFuture<'a> {
        let Some(limit) = self.config.unit_timeout else {
            return unit;
        };
        Box::pin(async move {
            tokio::time::timeout(limit, unit)
                .await
                .unwrap_or_else(|_| {
                    Err(BuildError::Timeout {
                        widget: widget.name().to_owned(),
                        limit,
                    })
                })
        })
    }
}

/// Drive every unit to completion. Returns the failure count and the first failure.
async fn settle(mut units: FuturesUnordered<UnitFuture<'_>>) -> (usize, Option<BuildError>) {
    let mut failures = 0_usize;
    let mut first_error = None;
    while let Some(outcome) = units.next().await {
        if let Err(err) = outcome {
            error!("{err}");
            failures += 1;
            first_error.get_or_insert(err);
        }
    }
    (failures, first_error)
}
