use std::path::{Path, PathBuf};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures raised while loading a module or reading its type metadata
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The module could not be located, read or parsed
    #[error("failed to load module {}: {reason}", .path.display())]
    Load {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Member metadata of a single type is unreadable
    #[error("failed to read metadata for type {type_name}: {reason}")]
    Reflection { type_name: String, reason: String },
}

impl MetadataError {
    pub fn load(path: &Path, reason: impl Into<String>) -> Self {
        MetadataError::Load {
            path: path.to_path_buf(),
            reason: reason.into(),
            source: None,
        }
    }

    pub fn load_with<E>(path: &Path, reason: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        MetadataError::Load {
            path: path.to_path_buf(),
            reason: reason.into(),
            source: Some(source.into()),
        }
    }

    pub fn reflection(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        MetadataError::Reflection {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    pub fn is_load(&self) -> bool {
        matches!(self, MetadataError::Load { .. })
    }

    pub fn is_reflection(&self) -> bool {
        matches!(self, MetadataError::Reflection { .. })
    }
}
