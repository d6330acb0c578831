//! Style and script injection before the page's asset anchors.

use crate::config::ComposerConfig;
use crate::document::Document;
use crate::error::BuildError;
use crate::widget::{Asset, WidgetDefinition};
use anyhow::Error;
use core::fmt;
use log::{debug, warn};
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Style,
    Script,
}

impl AssetKind {
    /// Element created for this kind of asset.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Style => "style",
            Self::Script => "script",
        }
    }

    /// Id of the anchor this kind of asset is inserted before.
    pub fn anchor(self, config: &ComposerConfig) -> &str {
        match self {
            Self::Style => &config.styles_anchor,
            Self::Script => &config.scripts_anchor,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Wrap script source so it runs with the page's global object bound as `window`.
pub fn wrap_script(source: &str) -> String {
    format!("(function( window ){{ {source} }})( window );")
}

/// Insert all of `widget`'s styles, then all of its scripts, each in declaration order.
///
/// Runs once per widget with at least one matched element. A missing anchor
/// skips the insertion; an asset with no source and no file is skipped with a warning.
///
/// # Errors
/// `BuildError::AssetResolution` if a declared file cannot be read.
pub async fn inject_assets(
    widget: &WidgetDefinition,
    document: &Document,
    config: &ComposerConfig,
) -> Result<(), BuildError> {
    let declared = widget
        .styles()
        .iter()
        .map(|asset| (AssetKind::Style, asset))
        .chain(widget.scripts().iter().map(|asset| (AssetKind::Script, asset)));
    for (kind, asset) in declared {
        let Some(text) = resolve_source(widget, kind, asset, config).await? else {
            warn!(
                "widget `{}`: {kind} asset has neither source nor file{}; skipped",
                widget.name(),
                if asset.inline { " (marked inline)" } else { "" }
            );
            continue;
        };
        let text = match kind {
            AssetKind::Style => text,
            AssetKind::Script => wrap_script(&text),
        };
        insert_before_anchor(widget, document, config, kind, &text)?;
    }
    Ok(())
}

/// Styles prefer `file` over `source`; scripts prefer `source` over `file`.
async fn resolve_source(
    widget: &WidgetDefinition,
    kind: AssetKind,
    asset: &Asset,
    config: &ComposerConfig,
) -> Result<Option<String>, BuildError> {
    let prefer_file = kind == AssetKind::Style;
    match (&asset.source, &asset.file) {
        (Some(source), None) => Ok(Some(source.clone())),
        (Some(source), Some(_)) if !prefer_file => Ok(Some(source.clone())),
        (_, Some(file)) => read_asset(widget, config, file).await.map(Some),
        (None, None) => Ok(None),
    }
}

async fn read_asset(
    widget: &WidgetDefinition,
    config: &ComposerConfig,
    file: &Path,
) -> Result<String, BuildError> {
    let path = config.asset_path(file);
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => Ok(text),
        Err(source) => Err(BuildError::AssetResolution {
            widget: widget.name().to_owned(),
            path,
            source,
        }),
    }
}

fn insert_before_anchor(
    widget: &WidgetDefinition,
    document: &Document,
    config: &ComposerConfig,
    kind: AssetKind,
    text: &str,
) -> Result<(), BuildError> {
    let anchor_id = kind.anchor(config);
    let inserted = document
        .with_dom_mut(|dom| -> Result<bool, Error> {
            let Some(anchor) = dom.element_by_id(anchor_id) else {
                return Ok(false);
            };
            let node = dom.create_element(kind.tag());
            dom.set_text_content(node, text)?;
            dom.insert_before(anchor, node)?;
            Ok(true)
        })
        .and_then(|inserted| inserted)
        .map_err(|err| BuildError::Runtime(format!("widget `{}`: {err:#}", widget.name())))?;
    if !inserted {
        debug!(
            "no #{anchor_id} anchor; {kind} for widget `{}` not injected",
            widget.name()
        );
    }
    Ok(())
}
