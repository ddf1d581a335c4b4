//! Load shared libraries under a versioned filename.
//!
//! Some platforms install native libraries with their version suffix stripped
//! (`libfoo.so` instead of `libfoo.so.1`). That is fine for a library used on its
//! own, but another library with a `DT_NEEDED` entry on `libfoo.so.1` can no longer
//! be satisfied. [`VersionedLibraryLoader`] copies the installed file into a
//! private directory under the versioned name and loads it from there.

mod copy;
mod error;
mod loader;
mod native;
mod paths;

pub use copy::{copy_versioned, prepare_target_dir};
pub use error::LinkError;
pub use loader::{LoadOutcome, VersionedLibraryLoader};
pub use native::{DlopenLoader, NativeLoader};
pub use paths::{LibraryRequest, LoaderConfig, ResolvedPaths, DEFAULT_SUBDIRECTORY};
