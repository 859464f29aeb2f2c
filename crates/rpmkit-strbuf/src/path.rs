//! Path-join helper and scope-guarded temp files.
//!
//! Temp files are allocated under the process-private temp directory and
//! unlinked when the returned [`TempFile`] handle is dropped, on every
//! exit path — success, early return, or panic unwind — per the resource
//! model in §5 of the spec ("Scoped temp files ... acquire via a scope
//! guard that unlinks on drop").

use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Failure building or opening a temp file.
#[derive(Debug, thiserror::Error)]
pub enum TempFileError {
    #[error("failed to allocate temp file: {0}")]
    Io(#[from] std::io::Error),
}

/// Joins path components the way the original `headerJoin`/`rpmGetPath`
/// family does: components are concatenated with exactly one `/`
/// between them, regardless of whether the caller included separators.
pub fn join<I, S>(parts: I) -> PathBuf
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for part in parts {
        let part = part.as_ref();
        if part.is_empty() {
            continue;
        }
        if !out.is_empty() && !out.ends_with('/') && !part.starts_with('/') {
            out.push('/');
        } else if out.ends_with('/') && part.starts_with('/') {
            out.pop();
        }
        out.push_str(part);
    }
    PathBuf::from(out)
}

/// A named temp file that unlinks itself when dropped.
///
/// Wraps [`tempfile::NamedTempFile`] so callers get a stable path plus a
/// writable handle without reaching for `std::fs` directly; the crate
/// dependency is the ecosystem's answer to "allocate a temp file, clean
/// it up no matter what" rather than a hand-rolled `mktemp`.
pub struct TempFile {
    inner: NamedTempFile,
}

impl TempFile {
    /// Allocates a new temp file under the system temp directory whose
    /// name begins with `prefix`.
    pub fn new(prefix: &str) -> Result<Self, TempFileError> {
        let inner = tempfile::Builder::new().prefix(prefix).tempfile()?;
        Ok(Self { inner })
    }

    /// Allocates a new temp file under `dir` whose name begins with
    /// `prefix`.
    pub fn new_in(dir: &Path, prefix: &str) -> Result<Self, TempFileError> {
        let inner = tempfile::Builder::new().prefix(prefix).tempfile_in(dir)?;
        Ok(Self { inner })
    }

    /// The path of the temp file on disk.
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Borrows the open file handle.
    pub fn as_file(&self) -> &std::fs::File {
        self.inner.as_file()
    }

    /// Mutably borrows the open file handle.
    pub fn as_file_mut(&mut self) -> &mut std::fs::File {
        self.inner.as_file_mut()
    }

    /// Consumes the guard, returning the underlying `NamedTempFile` for
    /// callers that need to persist it (e.g. renaming into place).
    pub fn into_inner(self) -> NamedTempFile {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn join_inserts_single_separator() {
        assert_eq!(join(["/usr", "bin", "hello"]), PathBuf::from("/usr/bin/hello"));
        assert_eq!(join(["/usr/", "/bin/"]), PathBuf::from("/usr/bin/"));
    }

    #[test]
    fn join_skips_empty_components() {
        assert_eq!(join(["/usr", "", "bin"]), PathBuf::from("/usr/bin"));
    }

    #[test]
    fn temp_file_is_removed_on_drop() {
        let path;
        {
            let mut tf = TempFile::new("rpmkit-test-").expect("tempfile");
            tf.as_file_mut().write_all(b"payload").unwrap();
            path = tf.path().to_path_buf();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }
}
