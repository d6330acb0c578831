//! Configuration for page composition.
//!
//! Values can be constructed programmatically or loaded from environment
//! variables by the CLI.

use core::time::Duration;
use std::env;
use std::path::{Path, PathBuf};

/// Where widget files live and how a build is bounded.
#[derive(Clone, Debug)]
pub struct ComposerConfig {
    /// Theme root; widget files live under `theme_base/widgets_dir`.
    pub theme_base: PathBuf,
    /// Widget directory, relative to `theme_base`.
    pub widgets_dir: PathBuf,
    /// Id of the element style nodes are inserted before.
    pub styles_anchor: String,
    /// Id of the element script nodes are inserted before.
    pub scripts_anchor: String,
    /// Upper bound for each lifecycle or asset unit. `None` waits forever.
    pub unit_timeout: Option<Duration>,
}

impl ComposerConfig {
    pub const DEFAULT_WIDGETS_DIR: &'static str = "widgets";
    pub const DEFAULT_STYLES_ANCHOR: &'static str = "widgets-styles";
    pub const DEFAULT_SCRIPTS_ANCHOR: &'static str = "widgets-scripts";

    /// Default configuration rooted at `theme_base`.
    pub fn new(theme_base: impl Into<PathBuf>) -> Self {
        Self {
            theme_base: theme_base.into(),
            widgets_dir: PathBuf::from(Self::DEFAULT_WIDGETS_DIR),
            styles_anchor: Self::DEFAULT_STYLES_ANCHOR.to_owned(),
            scripts_anchor: Self::DEFAULT_SCRIPTS_ANCHOR.to_owned(),
            unit_timeout: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `WIDGETS_THEME_BASE`: theme root (default: current directory)
    /// - `WIDGETS_DIR`: widget directory below the theme root (default: `widgets`)
    /// - `WIDGETS_UNIT_TIMEOUT_MS`: per-unit timeout in milliseconds; unset or `0` disables it
    #[must_use]
    pub fn from_env() -> Self {
        let theme_base =
            env::var_os("WIDGETS_THEME_BASE").map_or_else(|| PathBuf::from("."), PathBuf::from);
        let mut config = Self::new(theme_base);
        if let Some(dir) = env::var_os("WIDGETS_DIR") {
            config.widgets_dir = PathBuf::from(dir);
        }
        config.unit_timeout = env::var("WIDGETS_UNIT_TIMEOUT_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .and_then(|millis| (millis > 0).then_some(Duration::from_millis(millis)));
        config
    }

    #[must_use]
    pub fn with_unit_timeout(mut self, limit: Option<Duration>) -> Self {
        self.unit_timeout = limit;
        self
    }

    #[must_use]
    pub fn with_anchors(mut self, styles: &str, scripts: &str) -> Self {
        styles.clone_into(&mut self.styles_anchor);
        scripts.clone_into(&mut self.scripts_anchor);
        self
    }

    /// `<theme_base>/<widgets_dir>`
    pub fn widgets_path(&self) -> PathBuf {
        self.theme_base.join(&self.widgets_dir)
    }

    /// Location of a widget's `templateURL`.
    pub fn template_path(&self, template_url: &Path) -> PathBuf {
        self.widgets_path().join(template_url)
    }

    /// Location of an asset file; relative paths resolve against the widget directory.
    pub fn asset_path(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.widgets_path().join(file)
        }
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
