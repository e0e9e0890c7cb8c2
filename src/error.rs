//! Error types shared by every loader and GPU operation.
//!
//! All fallible functions in this crate return [`Result<T>`]. Every variant is
//! recoverable: the caller decides whether a failure is fatal (a missing
//! primary model) or degradable (a missing material texture).

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::gpu::ShaderStage;

#[derive(Error, Debug)]
pub enum Error {
    /// A file was missing, unreadable or malformed.
    #[error("failed to load {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    /// The backend rejected a shader source.
    #[error("{stage:?} shader compilation failed: {log}")]
    Compile { stage: ShaderStage, log: String },

    /// Two compiled stages could not be linked into a program.
    #[error("shader program linking failed: {log}")]
    Link { log: String },

    /// Geometry built in code breaks a mesh invariant.
    #[error("invalid mesh '{name}': {reason}")]
    InvalidMesh { name: String, reason: String },

    /// Allocation failed, or a handle was used after it was released.
    #[error("GPU resource error: {0}")]
    GpuResource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn load(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Error::Load {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn is_load(&self) -> bool {
        matches!(self, Error::Load { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
