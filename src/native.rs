//! Loading native code into the running process.

use anyhow::{Context, Result};
use libloading::os::unix::{Library, RTLD_GLOBAL, RTLD_NOW};
use std::path::Path;

/// The process's native-library loading primitive.
///
/// Implementations load the module at `path` and keep it loaded for the rest of
/// the process lifetime. Loading an already loaded path should be harmless.
pub trait NativeLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<()>;
}

/// Loads libraries with `dlopen(RTLD_NOW | RTLD_GLOBAL)`.
///
/// Symbols are made global so that libraries opened later can have their
/// `DT_NEEDED` entry on the versioned soname satisfied by this one.
#[derive(Debug, Default, Clone, Copy)]
pub struct DlopenLoader;

impl NativeLoader for DlopenLoader {
    fn load(&self, path: &Path) -> Result<()> {
        // SAFETY: running the library's initializers is the point of this call.
        // The caller chose the file; we cannot vouch for what its constructors do.
        let library = unsafe { Library::open(Some(path), RTLD_NOW | RTLD_GLOBAL) }
            .with_context(|| format!("dlopen failed for {}", path.display()))?;

        // Never dlclose: the code stays mapped for the life of the process.
        let _handle = library.into_raw();
        Ok(())
    }
}
