//! Finds the elements each widget owns.

use crate::document::Document;
use crate::error::BuildError;
use crate::widget::WidgetDefinition;
use html::NodeId;

/// One element claimed by one widget; the unit of lifecycle work.
#[derive(Clone, Copy, Debug)]
pub struct MatchedElement<'w> {
    pub widget: &'w WidgetDefinition,
    pub element: NodeId,
}

/// Elements matching `widget`'s selector in document order, evaluated against
/// the document as it is at the time of the call.
///
/// # Errors
/// Fails only if the document is borrowed by another caller.
pub fn match_widget<'w>(
    document: &Document,
    widget: &'w WidgetDefinition,
) -> Result<Vec<MatchedElement<'w>>, BuildError> {
    let elements = document
        .with_dom(|dom| dom.query_selector_all(widget.selector()))
        .map_err(|err| BuildError::Runtime(err.to_string()))?;
    Ok(elements
        .into_iter()
        .map(|element| MatchedElement { widget, element })
        .collect())
}
