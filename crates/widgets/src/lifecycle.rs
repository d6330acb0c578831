//! Pre-render then render, for one matched element.

use crate::config::ComposerConfig;
use crate::document::{DataRecord, Document, PageContext};
use crate::error::{BuildError, Phase};
use crate::matcher::MatchedElement;
use crate::template::TemplateEngine;
use crate::widget::{RenderStrategy, WidgetScope};
use anyhow::{Context as _, Error};
use log::debug;

/// Drive one matched element through its widget's lifecycle.
///
/// The data record is created here and dropped when the run ends. Failures are
/// tagged with the widget name and the phase they happened in.
///
/// # Errors
/// `BuildError::Lifecycle` if a hook, template lookup, template render or
/// replacement fails.
pub async fn run_lifecycle(
    target: MatchedElement<'_>,
    page: &PageContext,
    document: &Document,
    config: &ComposerConfig,
    templates: &dyn TemplateEngine,
) -> Result<(), BuildError> {
    let widget = target.widget;
    let scope = WidgetScope {
        widget,
        element: target.element,
        page,
        document,
    };
    let failed = |phase: Phase| {
        move |source: Error| BuildError::Lifecycle {
            widget: widget.name().to_owned(),
            phase,
            source,
        }
    };

    let mut data = DataRecord::new();
    if let Some(hook) = widget.pre_render_hook() {
        hook.pre_render(scope, &mut data)
            .await
            .map_err(failed(Phase::PreRender))?;
    }

    let rendered = match widget.strategy() {
        RenderStrategy::Passive => {
            debug!("widget `{}` has no render strategy; element left as is", widget.name());
            Ok(())
        }
        RenderStrategy::Template(source) => {
            replace_with_template(scope, source, &data, templates)
        }
        RenderStrategy::TemplateFile(template_url) => {
            let path = config.template_path(template_url);
            match tokio::fs::read_to_string(&path).await {
                Ok(source) => replace_with_template(scope, &source, &data, templates),
                Err(err) => Err(Error::new(err)
                    .context(format!("cannot read template {}", path.display()))),
            }
        }
        RenderStrategy::Custom(hook) => hook.render(scope, &data).await,
    };
    rendered.map_err(failed(Phase::Render))
}

fn replace_with_template(
    scope: WidgetScope<'_>,
    source: &str,
    data: &DataRecord,
    templates: &dyn TemplateEngine,
) -> Result<(), Error> {
    let markup = templates
        .render(source, data)
        .context("template rendering failed")?;
    let replaced = scope.document.replace_with_html(scope.element, &markup)?;
    if !replaced {
        debug!(
            "widget `{}`: element left the document before rendering",
            scope.widget.name()
        );
    }
    Ok(())
}
