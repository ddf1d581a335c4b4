//! Errors raised while preparing or loading a versioned library.

use std::io;
use std::path::PathBuf;

/// Failure of a versioned load.
///
/// Filesystem problems are reported with the target directory and the versioned
/// file name that was being produced.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("{} is not a directory! Could not load {file_name}", dir.display())]
    DirectoryUnavailable { dir: PathBuf, file_name: String },

    #[error("{}: could not load {file_name} due to I/O error: {source}", dir.display())]
    Copy {
        dir: PathBuf,
        file_name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to load native library {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}
