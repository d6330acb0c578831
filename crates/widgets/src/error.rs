//! Errors reported by a page build.

use anyhow::Error;
use core::fmt;
use core::time::Duration;
use std::io;
use std::path::PathBuf;

/// Lifecycle phase in which a widget failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    PreRender,
    Render,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PreRender => "pre-render",
            Self::Render => "render",
        })
    }
}

#[derive(Debug)]
pub enum BuildError {
    /// The input HTML could not be turned into a document. No widget ran.
    Parse(Error),
    /// A widget hook, template or replacement failed for one matched element.
    Lifecycle {
        widget: String,
        phase: Phase,
        source: Error,
    },
    /// A widget definition or catalog entry is unusable.
    Configuration(String),
    /// A declared asset file could not be read.
    AssetResolution {
        widget: String,
        path: PathBuf,
        source: io::Error,
    },
    /// A unit exceeded the configured `unit_timeout`.
    Timeout { widget: String, limit: Duration },
    /// The composed document could not be written out.
    Serialize(Error),
    /// The blocking adapter could not drive the pipeline.
    Runtime(String),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(source) => write!(f, "failed to parse page: {source:#}"),
            Self::Lifecycle {
                widget,
                phase,
                source,
            } => write!(f, "widget `{widget}` failed during {phase}: {source:#}"),
            Self::Configuration(reason) => write!(f, "invalid widget configuration: {reason}"),
            Self::AssetResolution {
                widget,
                path,
                source,
            } => write!(
                f,
                "widget `{widget}` asset {} could not be read: {source}",
                path.display()
            ),
            Self::Timeout { widget, limit } => {
                write!(f, "widget `{widget}` did not settle within {limit:?}")
            }
            Self::Serialize(source) => write!(f, "failed to serialize page: {source:#}"),
            Self::Runtime(reason) => write!(f, "cannot run composition: {reason}"),
        }
    }
}

impl core::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Parse(source) | Self::Serialize(source) | Self::Lifecycle { source, .. } => {
                Some(&**source)
            }
            Self::AssetResolution { source, .. } => Some(source),
            Self::Configuration(_) | Self::Timeout { .. } | Self::Runtime(_) => None,
        }
    }
}
