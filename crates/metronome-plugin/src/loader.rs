//! Narrow interface over platform dynamic-library loading.
//!
//! Nothing outside this module references loading mechanics; the rest of the
//! discovery path works against [`ModuleLoader`].

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use metronome_engine::Job;

/// Entry symbol a job module must export.
///
/// A module is a `cdylib`-style library exporting exactly one constructor:
///
/// ```ignore
/// #[unsafe(no_mangle)]
/// pub fn metronome_job() -> Box<dyn metronome_engine::Job> {
///     Box::new(MyJob)
/// }
/// ```
pub const ENTRY_SYMBOL: &[u8] = b"metronome_job";

/// Signature of the module entry point.
pub type JobEntry = fn() -> Box<dyn Job>;

/// A module file failed to load or does not export the expected capability.
///
/// Always non-fatal to a scan: the file is skipped and the scan continues.
#[derive(Debug, Error)]
pub enum ModuleLoadError {
    /// The dynamic library itself could not be opened.
    #[error("failed to open module {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: libloading::Error,
    },

    /// The library loaded but does not export the job entry point.
    #[error("module {path} does not export a job entry point")]
    MissingEntry {
        path: String,
        #[source]
        source: libloading::Error,
    },
}

/// Loads one job implementation from a module file.
pub trait ModuleLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Arc<dyn Job>, ModuleLoadError>;
}

/// [`ModuleLoader`] backed by the platform's dynamic-library facility.
///
/// Loaded libraries are retained for the process lifetime: a job's code must
/// stay mapped for as long as its wrapper can run it.
#[derive(Default)]
pub struct LibraryLoader {
    libraries: Mutex<Vec<libloading::Library>>,
}

impl LibraryLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModuleLoader for LibraryLoader {
    fn load(&self, path: &Path) -> Result<Arc<dyn Job>, ModuleLoadError> {
        // SAFETY: loading runs arbitrary module initializers; the plugin
        // directory is operator-controlled, equivalent to trusting the
        // binary itself.
        let library = unsafe { libloading::Library::new(path) }.map_err(|source| {
            ModuleLoadError::Open {
                path: path.display().to_string(),
                source,
            }
        })?;

        let job = unsafe {
            let entry: libloading::Symbol<'_, JobEntry> =
                library.get(ENTRY_SYMBOL).map_err(|source| {
                    ModuleLoadError::MissingEntry {
                        path: path.display().to_string(),
                        source,
                    }
                })?;
            Arc::from(entry())
        };

        self.libraries.lock().push(library);
        Ok(job)
    }
}
