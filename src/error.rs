// Error taxonomy for the build pipeline

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pipeline::encoder::Format;

pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    /// Bad or missing metadata. Raised before any rasterization starts.
    #[error("config: {entry}: `{field}` {reason}")]
    Config {
        entry: String,
        field: String,
        reason: String,
    },

    #[error("raster: cursor `{cursor}` frame {frame}: {reason}")]
    Raster {
        cursor: String,
        frame: String,
        reason: String,
    },

    #[error("encode: {format} cursor `{cursor}`: {reason}")]
    Encode {
        cursor: String,
        format: Format,
        reason: String,
    },

    #[error("io: {context} ({}): {source}", path.display())]
    Io {
        context: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    pub fn config(entry: impl Into<String>, field: &str, reason: impl Into<String>) -> Self {
        BuildError::Config {
            entry: entry.into(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn encode(cursor: &str, format: Format, reason: impl Into<String>) -> Self {
        BuildError::Encode {
            cursor: cursor.to_string(),
            format,
            reason: reason.into(),
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, BuildError::Config { .. })
    }
}

/// Attaches a stage description and path to an `io::Result`.
pub trait IoContext<T> {
    fn io_context(self, context: impl Into<String>, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn io_context(self, context: impl Into<String>, path: &Path) -> Result<T> {
        self.map_err(|source| BuildError::Io {
            context: context.into(),
            path: path.to_path_buf(),
            source,
        })
    }
}
