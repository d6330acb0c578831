#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

//! Widget composition for rendered pages.
//!
//! A `Composer` takes a page and a `WidgetCatalog`, finds the elements each
//! widget's selector claims, runs every widget lifecycle (pre-render, then
//! template or custom render) and every widget's asset injection concurrently
//! on one thread, removes the asset anchors, and serializes the result.
//! `BlockingComposer` exposes the same build to synchronous hosts.

pub mod assets;
pub mod blocking;
pub mod catalog;
pub mod composer;
pub mod config;
pub mod document;
pub mod error;
pub mod finalizer;
pub mod lifecycle;
pub mod matcher;
pub mod template;
pub mod widget;

pub use blocking::{BlockingComposer, render_widgets};
pub use catalog::{CatalogLoader, ManifestLoader, WidgetCatalog};
pub use composer::Composer;
pub use config::ComposerConfig;
pub use document::{DataRecord, Document, PageContext};
pub use error::{BuildError, Phase};
pub use html::NodeId;
pub use template::{TagTemplates, TemplateEngine};
pub use widget::{
    Asset, HookFuture, PreRender, Render, RenderStrategy, WidgetBuilder, WidgetDefinition,
    WidgetScope, pre_render_fn, render_fn,
};
