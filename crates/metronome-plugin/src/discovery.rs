//! Plugin directory scanning.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use metronome_engine::{Job, JobRegistry};

use crate::loader::{LibraryLoader, ModuleLoader};

/// When a module file is eligible for (re)loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReloadPolicy {
    /// Only load modules modified at or after the previous scan's start.
    /// A module rewritten without its timestamp advancing past the
    /// watermark is never reloaded.
    #[default]
    ModifiedSinceLastScan,
    /// Load every module on every scan. Registration stays idempotent, so
    /// the cost is repeated loading, not duplicate jobs.
    Always,
}

/// Scans a directory for dynamically loadable job modules.
pub struct PluginScanner {
    dir: PathBuf,
    policy: ReloadPolicy,
    loader: Box<dyn ModuleLoader>,
}

impl PluginScanner {
    /// Scanner over `dir` using the platform dynamic-library loader.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            policy: ReloadPolicy::default(),
            loader: Box::new(LibraryLoader::new()),
        }
    }

    /// Set the reload-eligibility policy.
    pub fn with_policy(mut self, policy: ReloadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the module loader. Seam for tests and alternative loading
    /// mechanisms.
    pub fn with_loader(mut self, loader: Box<dyn ModuleLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Enumerate and load eligible modules.
    ///
    /// A file that fails to load, or that lacks the expected export, is
    /// logged and skipped; the scan itself never fails.
    pub fn scan(&self, since: Option<DateTime<Utc>>) -> Vec<Arc<dyn Job>> {
        let pattern = self
            .dir
            .join(format!("*.{}", std::env::consts::DLL_EXTENSION));
        let paths = match glob::glob(&pattern.to_string_lossy()) {
            Ok(paths) => paths,
            Err(err) => {
                warn!(%err, dir = %self.dir.display(), "invalid plugin glob pattern");
                return Vec::new();
            }
        };

        let mut jobs: Vec<Arc<dyn Job>> = Vec::new();
        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(err) => {
                    warn!(%err, "unreadable plugin path, skipping");
                    continue;
                }
            };
            if !self.eligible(&path, since) {
                debug!(path = %path.display(), "module unchanged since last scan, skipping");
                continue;
            }
            match self.loader.load(&path) {
                Ok(job) => {
                    debug!(path = %path.display(), job = job.name(), "loaded job module");
                    jobs.push(job);
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "failed to load job module, skipping");
                }
            }
        }
        jobs
    }

    /// Run one scan and merge the result into `registry`.
    ///
    /// The registry's watermark bounds eligibility and is advanced to this
    /// scan's start time afterwards, whether or not every file loaded.
    pub fn discover_into(&self, registry: &JobRegistry) {
        let started = Utc::now();
        let jobs = self.scan(registry.last_scan());
        registry.discover_and_register(jobs);
        registry.record_scan(started);
    }

    fn eligible(&self, path: &Path, since: Option<DateTime<Utc>>) -> bool {
        match (self.policy, since) {
            (ReloadPolicy::Always, _) | (ReloadPolicy::ModifiedSinceLastScan, None) => true,
            (ReloadPolicy::ModifiedSinceLastScan, Some(since)) => {
                // A file whose metadata cannot be read is skipped here; its
                // load would fail anyway.
                modified_at(path).is_some_and(|modified| modified >= since)
            }
        }
    }
}

fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
    let metadata = std::fs::metadata(path).ok()?;
    let modified = metadata.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
