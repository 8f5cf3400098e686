//! Collision-free file naming.
//!
//! Candidates follow the sequence `name.ext`, `name(1).ext`, `name(2).ext`,
//! and so on until a free name is found.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Path of the `n`th alternative to `path`; `n == 0` is `path` itself.
fn numbered(path: &Path, n: u64) -> PathBuf {
    if n == 0 {
        return path.to_path_buf();
    }

    let mut name = OsString::from(path.file_stem().unwrap_or_default());
    name.push(format!("({n})"));
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

fn is_occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// First path in the candidate sequence that no directory entry occupies.
///
/// Another process may take the returned name before it is used; prefer
/// [`create_unique`] when the file is about to be written.
#[must_use]
pub fn allocate_unique(path: &Path) -> PathBuf {
    (0..)
        .map(|n| numbered(path, n))
        .find(|candidate| !is_occupied(candidate))
        .unwrap_or_else(|| path.to_path_buf())
}

/// Create the first free file in the candidate sequence.
///
/// Uses create-new semantics, so two concurrent callers never receive the
/// same file.
///
/// # Errors
///
/// Returns any I/O error other than the target already existing.
pub fn create_unique(path: &Path) -> io::Result<(PathBuf, File)> {
    let mut n = 0;
    loop {
        let candidate = numbered(path, n);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((candidate, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(err) => return Err(err),
        }
    }
}
