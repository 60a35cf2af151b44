//! Collision-free destination naming.
//!
//! `unique_path` probes `name`, `stem_1.ext`, `stem_2.ext`, … until it finds a
//! free slot in the destination directory. The probe alone is check-then-use;
//! [`DirLocks`] supplies a per-destination-directory mutex so that concurrent
//! movers serialize the probe-and-rename pair and never race to the same name.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Returns a path in `target_dir` for `filename` that does not exist at call
/// time, suffixing `_1`, `_2`, … to the stem on collision.
pub fn unique_path(target_dir: &Path, filename: &str) -> PathBuf {
    let candidate = target_dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = split_name(filename);
    let mut counter = 1;
    loop {
        let candidate = target_dir.join(format!("{}_{}{}", stem, counter, ext));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Splits a file name into stem and extension, the extension keeping its
/// leading dot. A lone leading dot is part of the stem, not an extension.
fn split_name(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(0) | None => (filename, ""),
        Some(idx) => filename.split_at(idx),
    }
}

/// One mutex per destination directory, created on demand.
///
/// Movers targeting the same directory take the same lock around the
/// probe-and-rename pair; movers targeting different directories never
/// contend.
#[derive(Default)]
pub struct DirLocks {
    inner: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl DirLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock guarding a destination directory.
    pub fn for_dir(&self, dir: &Path) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock();
        map.entry(dir.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
