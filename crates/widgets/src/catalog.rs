//! The set of widgets available to a build, and loaders that produce it.

use crate::config::ComposerConfig;
use crate::error::BuildError;
use crate::widget::{Asset, WidgetDefinition};
use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Ordered widget definitions. Widgets are matched and started in this order.
#[derive(Debug, Default)]
pub struct WidgetCatalog {
    widgets: Vec<WidgetDefinition>,
}

impl WidgetCatalog {
    pub const fn new(widgets: Vec<WidgetDefinition>) -> Self {
        Self { widgets }
    }

    pub fn push(&mut self, widget: WidgetDefinition) {
        self.widgets.push(widget);
    }

    pub fn iter(&self) -> impl Iterator<Item = &WidgetDefinition> {
        self.widgets.iter()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

impl FromIterator<WidgetDefinition> for WidgetCatalog {
    fn from_iter<I: IntoIterator<Item = WidgetDefinition>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Extend<WidgetDefinition> for WidgetCatalog {
    fn extend<I: IntoIterator<Item = WidgetDefinition>>(&mut self, iter: I) {
        self.widgets.extend(iter);
    }
}

/// Produces the catalog for a theme.
pub trait CatalogLoader {
    /// # Errors
    /// Returns `BuildError::Configuration` for unreadable or invalid widget sources.
    fn load(&self, config: &ComposerConfig) -> Result<WidgetCatalog, BuildError>;
}

/// Declarative widget file. Hooks cannot be expressed here, only template-based widgets.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WidgetManifest {
    selector: String,
    #[serde(default)]
    template: Option<String>,
    #[serde(default, rename = "templateURL")]
    template_url: Option<PathBuf>,
    #[serde(default)]
    styles: Vec<Asset>,
    #[serde(default)]
    scripts: Vec<Asset>,
}

/// Loads every `*.widget.json` file in the theme's widget directory, in file name order.
/// The widget name is the file name without the suffix.
#[derive(Clone, Copy, Debug, Default)]
pub struct ManifestLoader;

impl ManifestLoader {
    pub const SUFFIX: &'static str = ".widget.json";

    fn load_file(path: &Path) -> Result<WidgetDefinition, BuildError> {
        let unreadable =
            |reason: String| BuildError::Configuration(format!("{}: {reason}", path.display()));
        let text = fs::read_to_string(path).map_err(|err| unreadable(err.to_string()))?;
        let manifest: WidgetManifest =
            serde_json::from_str(&text).map_err(|err| unreadable(err.to_string()))?;
        let name = path
            .file_name()
            .and_then(|file| file.to_str())
            .and_then(|file| file.strip_suffix(Self::SUFFIX))
            .unwrap_or(manifest.selector.as_str())
            .to_owned();

        let mut builder = WidgetDefinition::builder(manifest.selector).name(name);
        if let Some(template) = manifest.template {
            builder = builder.template(template);
        }
        if let Some(template_url) = manifest.template_url {
            builder = builder.template_url(template_url);
        }
        for style in manifest.styles {
            builder = builder.style(style);
        }
        for script in manifest.scripts {
            builder = builder.script(script);
        }
        builder.build()
    }
}

impl CatalogLoader for ManifestLoader {
    fn load(&self, config: &ComposerConfig) -> Result<WidgetCatalog, BuildError> {
        let dir = config.widgets_path();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!("widget directory {} does not exist", dir.display());
                return Ok(WidgetCatalog::default());
            }
            Err(err) => {
                return Err(BuildError::Configuration(format!(
                    "{}: {err}",
                    dir.display()
                )));
            }
        };

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|err| BuildError::Configuration(format!("{}: {err}", dir.display())))?
                .path();
            let is_manifest = path
                .file_name()
                .and_then(|file| file.to_str())
                .is_some_and(|file| file.ends_with(Self::SUFFIX));
            if is_manifest && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let catalog: WidgetCatalog = paths
            .iter()
            .map(|path| Self::load_file(path))
            .collect::<Result<_, _>>()?;
        debug!("loaded {} widget(s) from {}", catalog.len(), dir.display());
        Ok(catalog)
    }
}
