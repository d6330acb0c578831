//! Widget definitions: selector, lifecycle hooks, rendering strategy and assets.

use crate::document::{DataRecord, Document, PageContext};
use crate::error::BuildError;
use anyhow::Error;
use core::fmt;
use css_selectors::{SelectorList, parse_selector_list};
use futures::future::LocalBoxFuture;
use html::NodeId;
use serde::Deserialize;
use std::path::PathBuf;

/// Future returned by widget hooks.
pub type HookFuture<'a> = LocalBoxFuture<'a, Result<(), Error>>;

/// What a hook may see and touch for one matched element.
#[derive(Clone, Copy)]
pub struct WidgetScope<'a> {
    pub widget: &'a WidgetDefinition,
    /// The matched element. Mutate it through `document`, positionally.
    pub element: NodeId,
    pub page: &'a PageContext,
    pub document: &'a Document,
}

/// Fills the per-element data record before rendering. May await.
pub trait PreRender {
    fn pre_render<'a>(&'a self, scope: WidgetScope<'a>, data: &'a mut DataRecord)
    -> HookFuture<'a>;
}

/// Performs the widget's own DOM mutation instead of a template replacement.
pub trait Render {
    fn render<'a>(&'a self, scope: WidgetScope<'a>, data: &'a DataRecord) -> HookFuture<'a>;
}

struct FnPreRender<F>(F);

impl<F> PreRender for FnPreRender<F>
where
    F: Fn(WidgetScope<'_>, &mut DataRecord) -> Result<(), Error>,
{
    fn pre_render<'a>(
        &'a self,
        scope: WidgetScope<'a>,
        data: &'a mut DataRecord,
    ) -> HookFuture<'a> {
        Box::pin(async move { (self.0)(scope, data) })
    }
}

struct FnRender<F>(F);

impl<F> Render for FnRender<F>
where
    F: Fn(WidgetScope<'_>, &DataRecord) -> Result<(), Error>,
{
    fn render<'a>(&'a self, scope: WidgetScope<'a>, data: &'a DataRecord) -> HookFuture<'a> {
        Box::pin(async move { (self.0)(scope, data) })
    }
}

/// Wrap a synchronous closure as a `PreRender` hook.
pub fn pre_render_fn<F>(hook: F) -> impl PreRender
where
    F: Fn(WidgetScope<'_>, &mut DataRecord) -> Result<(), Error>,
{
    FnPreRender(hook)
}

/// Wrap a synchronous closure as a `Render` hook.
pub fn render_fn<F>(hook: F) -> impl Render
where
    F: Fn(WidgetScope<'_>, &DataRecord) -> Result<(), Error>,
{
    FnRender(hook)
}

/// A style or script declaration.
///
/// When both `source` and `file` are given, styles read `file` and scripts use
/// `source`. Every resolved asset is inlined into the page, so `inline` only
/// documents intent in manifests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub inline: bool,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, alias = "sourceURL")]
    pub file: Option<PathBuf>,
}

impl Asset {
    /// Asset whose text is given verbatim.
    pub fn inline(source: impl Into<String>) -> Self {
        Self {
            inline: true,
            source: Some(source.into()),
            file: None,
        }
    }

    /// Asset read from a file, relative to the widget directory unless absolute.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            inline: false,
            source: None,
            file: Some(path.into()),
        }
    }
}

/// The single way a widget turns its data record into markup.
pub enum RenderStrategy {
    /// No rendering; the element is left as `pre_render` left it.
    Passive,
    /// Inline template source.
    Template(String),
    /// Template file relative to the widget directory (`templateURL`).
    TemplateFile(PathBuf),
    /// Widget-controlled mutation.
    Custom(Box<dyn Render>),
}

impl fmt::Debug for RenderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passive => f.write_str("Passive"),
            Self::Template(source) => f.debug_tuple("Template").field(source).finish(),
            Self::TemplateFile(path) => f.debug_tuple("TemplateFile").field(path).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A validated widget. Build one with `WidgetBuilder`.
pub struct WidgetDefinition {
    name: String,
    selector_text: String,
    selector: SelectorList,
    pre_render: Option<Box<dyn PreRender>>,
    strategy: RenderStrategy,
    styles: Vec<Asset>,
    scripts: Vec<Asset>,
}

impl WidgetDefinition {
    pub fn builder(selector: impl Into<String>) -> WidgetBuilder {
        WidgetBuilder::new(selector)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The selector as written.
    pub fn selector_text(&self) -> &str {
        &self.selector_text
    }

    pub const fn selector(&self) -> &SelectorList {
        &self.selector
    }

    pub fn pre_render_hook(&self) -> Option<&dyn PreRender> {
        self.pre_render.as_deref()
    }

    pub const fn strategy(&self) -> &RenderStrategy {
        &self.strategy
    }

    pub fn styles(&self) -> &[Asset] {
        &self.styles
    }

    pub fn scripts(&self) -> &[Asset] {
        &self.scripts
    }
}

impl fmt::Debug for WidgetDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetDefinition")
            .field("name", &self.name)
            .field("selector", &self.selector_text)
            .field("pre_render", &self.pre_render.is_some())
            .field("strategy", &self.strategy)
            .field("styles", &self.styles)
            .field("scripts", &self.scripts)
            .finish()
    }
}

/// Collects widget fields and resolves the rendering strategy once.
pub struct WidgetBuilder {
    name: Option<String>,
    selector: String,
    pre_render: Option<Box<dyn PreRender>>,
    strategies: Vec<RenderStrategy>,
    styles: Vec<Asset>,
    scripts: Vec<Asset>,
}

impl WidgetBuilder {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            name: None,
            selector: selector.into(),
            pre_render: None,
            strategies: Vec::new(),
            styles: Vec::new(),
            scripts: Vec::new(),
        }
    }

    /// Name used in logs and errors. Defaults to the selector.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn pre_render(mut self, hook: impl PreRender + 'static) -> Self {
        self.pre_render = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn template(mut self, source: impl Into<String>) -> Self {
        self.strategies.push(RenderStrategy::Template(source.into()));
        self
    }

    #[must_use]
    pub fn template_url(mut self, path: impl Into<PathBuf>) -> Self {
        self.strategies.push(RenderStrategy::TemplateFile(path.into()));
        self
    }

    #[must_use]
    pub fn render(mut self, hook: impl Render + 'static) -> Self {
        self.strategies.push(RenderStrategy::Custom(Box::new(hook)));
        self
    }

    #[must_use]
    pub fn style(mut self, asset: Asset) -> Self {
        self.styles.push(asset);
        self
    }

    #[must_use]
    pub fn script(mut self, asset: Asset) -> Self {
        self.scripts.push(asset);
        self
    }

    /// Validate the selector and pick the rendering strategy.
    ///
    /// # Errors
    /// `BuildError::Configuration` for an empty or invalid selector, or when more
    /// than one of template, template URL and render hook is declared.
    pub fn build(self) -> Result<WidgetDefinition, BuildError> {
        let selector_text = self.selector.trim().to_owned();
        let name = self.name.unwrap_or_else(|| selector_text.clone());
        if selector_text.is_empty() {
            return Err(BuildError::Configuration(format!(
                "widget `{name}` has an empty selector"
            )));
        }
        let selector = parse_selector_list(&selector_text).map_err(|err| {
            BuildError::Configuration(format!("widget `{name}` selector `{selector_text}`: {err}"))
        })?;
        let mut strategies = self.strategies.into_iter();
        let strategy = strategies.next().unwrap_or(RenderStrategy::Passive);
        if strategies.next().is_some() {
            return Err(BuildError::Configuration(format!(
                "widget `{name}` declares more than one of template, templateURL and render"
            )));
        }
        Ok(WidgetDefinition {
            name,
            selector_text,
            selector,
            pre_render: self.pre_render,
            strategy,
            styles: self.styles,
            scripts: self.scripts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_defaults_to_passive() {
        let widget = WidgetDefinition::builder(" .clock ").build().unwrap();
        assert_eq!(widget.name(), ".clock");
        assert_eq!(widget.selector_text(), ".clock");
        assert!(matches!(widget.strategy(), RenderStrategy::Passive));
        assert!(widget.pre_render_hook().is_none());
    }

    #[test]
    fn conflicting_strategies_are_rejected() {
        let result = WidgetDefinition::builder(".x")
            .template("<p></p>")
            .template_url("x.ejs")
            .build();
        assert!(matches!(result, Err(BuildError::Configuration(_))));
    }

    #[test]
    fn bad_selectors_are_rejected() {
        for selector in ["", "   ", "a:hover", "div >"] {
            let result = WidgetDefinition::builder(selector).name("bad").build();
            assert!(
                matches!(result, Err(BuildError::Configuration(_))),
                "accepted {selector:?}"
            );
        }
    }

    #[test]
    fn asset_manifest_accepts_source_url_alias() {
        let asset: Asset = serde_json::from_str(r#"{ "sourceURL": "menu.js" }"#).unwrap();
        assert_eq!(asset, Asset::file("menu.js"));
    }
}
