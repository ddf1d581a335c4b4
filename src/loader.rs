//! Versioned library loading.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::copy::{copy_versioned, prepare_target_dir};
use crate::error::LinkError;
use crate::native::{DlopenLoader, NativeLoader};
use crate::paths::{LibraryRequest, LoaderConfig};

/// What a call to [`VersionedLibraryLoader::load_versioned`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The versioned copy was written and handed to the native loader.
    Loaded { path: PathBuf },
    /// No installed `lib<name>.so` was found. Nothing was created or loaded.
    SkippedSourceAbsent { source_path: PathBuf },
}

impl LoadOutcome {
    /// Whether the library was handed to the native loader.
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// Copies installed libraries to a versioned filename and loads them from there.
///
/// Works around loaders that drop version suffixes at install time, which leaves
/// nothing on disk to satisfy a dependency on e.g. `libfoo.so.1`.
pub struct VersionedLibraryLoader {
    config: LoaderConfig,
    native: Box<dyn NativeLoader>,
}

impl VersionedLibraryLoader {
    /// Create a loader that opens libraries with [`DlopenLoader`].
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_native_loader(config, DlopenLoader)
    }

    /// Create a loader that hands copies to `native` instead of `dlopen`.
    pub fn with_native_loader(config: LoaderConfig, native: impl NativeLoader + 'static) -> Self {
        Self {
            config,
            native: Box::new(native),
        }
    }

    /// Load `lib<libname>.so` as `lib<libname>.so.<version>`.
    ///
    /// The copy is refreshed on every call, even when an identical file is already
    /// present. A directory created here is left in place if a later step fails.
    ///
    /// Calls for the same target path are serialized within the process. Separate
    /// processes sharing the storage root are not coordinated.
    ///
    /// # Errors
    ///
    /// - [`LinkError::DirectoryUnavailable`] if the target directory cannot be
    ///   created or a non-directory occupies its path
    /// - [`LinkError::Copy`] if reading the source or writing the copy fails
    /// - [`LinkError::Load`] if the native loader rejects the copy
    pub fn load_versioned(&self, libname: &str, version: &str) -> Result<LoadOutcome, LinkError> {
        let request = LibraryRequest::new(libname, version);
        let paths = self.config.resolve(&request);

        if !paths.source_exists() {
            tracing::debug!(
                libname,
                version,
                source = %paths.source_path.display(),
                "installed library not found, skipping"
            );
            return Ok(LoadOutcome::SkippedSourceAbsent {
                source_path: paths.source_path,
            });
        }

        let file_name = request.versioned_file_name();
        let path = absolute_or_given(&paths.target_path);
        let lock = target_lock(&path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        prepare_target_dir(&paths.target_directory, &file_name)?;
        let size = copy_versioned(&paths.source_path, &paths.target_directory, &file_name)?;
        tracing::debug!(
            source = %paths.source_path.display(),
            target = %paths.target_path.display(),
            bytes = size,
            "copied versioned library"
        );

        self.native.load(&path).map_err(|e| LinkError::Load {
            path: path.clone(),
            // Flatten the chain so the dlerror text survives boxing
            source: anyhow::anyhow!("{e:#}").into(),
        })?;

        tracing::info!(libname, version, path = %path.display(), "loaded versioned library");
        Ok(LoadOutcome::Loaded { path })
    }
}

impl std::fmt::Debug for VersionedLibraryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionedLibraryLoader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn absolute_or_given(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Process-wide lock for one target path.
///
/// `path` should already be absolute so that relative and absolute spellings of
/// the same file share a lock. Entries are never removed; the map grows by one
/// per distinct versioned library loaded in the process.
fn target_lock(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

    let mut locks = LOCKS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(path.to_path_buf()).or_default())
}
