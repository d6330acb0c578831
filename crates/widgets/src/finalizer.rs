//! Removal of the asset anchors once every unit has settled.

use crate::config::ComposerConfig;
use crate::document::Document;
use crate::error::BuildError;

/// Detach the styles and scripts anchors if present. Returns how many were removed.
///
/// Running it again on the same document removes nothing.
///
/// # Errors
/// Fails only if the document is borrowed by another caller.
pub fn remove_placeholders(
    document: &Document,
    config: &ComposerConfig,
) -> Result<usize, BuildError> {
    document
        .with_dom_mut(|dom| {
            let anchors: Vec<_> = [&config.styles_anchor, &config.scripts_anchor]
                .into_iter()
                .filter_map(|id| dom.element_by_id(id))
                .collect();
            let mut removed = 0;
            for anchor in anchors {
                if dom.remove(anchor) {
                    removed += 1;
                }
            }
            removed
        })
        .map_err(|err| BuildError::Runtime(err.to_string()))
}
