//! # Metronome Plugin Discovery
//!
//! Hot-discovery of job implementations from dynamically loadable modules
//! placed in a directory.
//!
//! [`PluginScanner`] enumerates module files by extension, filters them
//! through a [`ReloadPolicy`], and loads each through the narrow
//! [`ModuleLoader`] interface, so nothing outside [`loader`] references
//! dynamic-loading mechanics. [`PluginScanner::discover_into`] merges one
//! scan into a [`metronome_engine::JobRegistry`] using the registry's
//! schedule overrides and scan watermark.

pub mod discovery;
pub mod loader;

pub use discovery::{PluginScanner, ReloadPolicy};
pub use loader::{JobEntry, LibraryLoader, ModuleLoadError, ModuleLoader, ENTRY_SYMBOL};
