//! Source and target path resolution for versioned libraries.

use std::path::{Path, PathBuf};

/// Subdirectory of the storage root used when none is given.
pub const DEFAULT_SUBDIRECTORY: &str = "lib";

/// Host-supplied locations the loader works with.
///
/// Both directories are injected by the caller: `native_library_dir` is where the
/// platform unpacked the unversioned libraries at install time, `storage_root` is an
/// application-private writable directory. Construction performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    native_library_dir: PathBuf,
    storage_root: PathBuf,
    subdirectory: String,
}

impl LoaderConfig {
    /// Configuration using [`DEFAULT_SUBDIRECTORY`] below `storage_root`.
    pub fn new(native_library_dir: impl Into<PathBuf>, storage_root: impl Into<PathBuf>) -> Self {
        Self {
            native_library_dir: native_library_dir.into(),
            storage_root: storage_root.into(),
            subdirectory: DEFAULT_SUBDIRECTORY.to_string(),
        }
    }

    /// Use `subdirectory` below the storage root instead of [`DEFAULT_SUBDIRECTORY`].
    #[must_use]
    pub fn with_subdirectory(mut self, subdirectory: impl Into<String>) -> Self {
        self.subdirectory = subdirectory.into();
        self
    }

    /// Where the platform installed the unversioned libraries.
    pub fn native_library_dir(&self) -> &Path {
        &self.native_library_dir
    }

    /// Private writable root holding the versioned copies.
    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    /// Name of the directory below the storage root.
    pub fn subdirectory(&self) -> &str {
        &self.subdirectory
    }

    /// Directory that receives the versioned copies.
    pub fn target_directory(&self) -> PathBuf {
        self.storage_root.join(&self.subdirectory)
    }

    /// Derive every path involved in loading `request`.
    #[must_use = "resolved paths should be used"]
    pub fn resolve(&self, request: &LibraryRequest) -> ResolvedPaths {
        let target_directory = self.target_directory();
        ResolvedPaths {
            source_path: self
                .native_library_dir
                .join(request.unversioned_file_name()),
            target_path: target_directory.join(request.versioned_file_name()),
            target_directory,
        }
    }
}

/// A bare library name plus the version its dependents expect.
///
/// `libname` carries no `lib` prefix and no extension; neither field is validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRequest {
    pub libname: String,
    pub version: String,
}

impl LibraryRequest {
    /// Request `lib<libname>.so` under version `version`.
    pub fn new(libname: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            libname: libname.into(),
            version: version.into(),
        }
    }

    /// `lib<name>.so`, the name the platform installs.
    pub fn unversioned_file_name(&self) -> String {
        format!("lib{}.so", self.libname)
    }

    /// `lib<name>.so.<version>`, the name dependents link against.
    pub fn versioned_file_name(&self) -> String {
        format!("lib{}.so.{}", self.libname, self.version)
    }
}

/// Paths for a single load call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub source_path: PathBuf,
    pub target_directory: PathBuf,
    pub target_path: PathBuf,
}

impl ResolvedPaths {
    /// Whether the installed library is present. Symlinks are followed.
    pub fn source_exists(&self) -> bool {
        self.source_path.exists()
    }
}
