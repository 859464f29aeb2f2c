//! Packaging-stage file manifest expansion: each `%files` glob entry
//! is resolved against the build root into a [`PayloadPlan`]
//! (spec.md §4.E "Packaging stages consult the file manifest").

use std::os::unix::fs::MetadataExt;
use std::path::Path;

use rpmkit_spec::{PayloadPlan, PayloadPlanEntry};

use crate::error::BuildError;

/// Expands the newline-separated glob patterns in `manifest` against
/// `build_root`, producing one [`PayloadPlanEntry`] per matched file.
/// A pattern that matches nothing is an error (spec.md treats an
/// un-packagable `%files` entry as a build failure, not a silent
/// no-op).
pub fn expand_manifest(manifest: &str, build_root: &Path) -> Result<PayloadPlan, BuildError> {
    let mut entries = Vec::new();
    for raw_line in manifest.lines() {
        let pattern = raw_line.trim();
        if pattern.is_empty() || pattern.starts_with('#') {
            continue;
        }
        let absolute_pattern = rpmkit_strbuf::join([build_root.to_string_lossy().as_ref(), pattern.trim_start_matches('/')]);
        let matches: Vec<_> = glob::glob(&absolute_pattern.to_string_lossy())
            .map_err(|source| BuildError::BadGlob { pattern: pattern.to_string(), source })?
            .filter_map(Result::ok)
            .collect();
        if matches.is_empty() {
            return Err(BuildError::EmptyManifest { pattern: pattern.to_string() });
        }
        for matched in matches {
            let metadata = std::fs::symlink_metadata(&matched).map_err(BuildError::TempFile)?;
            let archive_name = matched
                .strip_prefix(build_root)
                .unwrap_or(&matched)
                .to_string_lossy()
                .into_owned();
            let archive_name = if archive_name.starts_with('/') { archive_name } else { format!("/{archive_name}") };
            let link_target = if metadata.file_type().is_symlink() {
                std::fs::read_link(&matched).ok().map(|p| p.to_string_lossy().into_owned())
            } else {
                None
            };
            entries.push(PayloadPlanEntry {
                src_path: matched.to_string_lossy().into_owned(),
                archive_name,
                mode: metadata.mode(),
                uid: metadata.uid(),
                gid: metadata.gid(),
                mtime: metadata.mtime() as u32,
                size: metadata.len(),
                link_target,
                flags: 0,
            });
        }
    }
    Ok(PayloadPlan { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    #[test]
    fn expands_a_plain_file_entry() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("usr/bin")).unwrap();
        let mut f = fs::File::create(dir.path().join("usr/bin/hello")).unwrap();
        f.write_all(b"hello world!!").unwrap();

        let plan = expand_manifest("/usr/bin/hello\n", dir.path()).unwrap();
        assert_eq!(plan.entries.len(), 1);
        assert_eq!(plan.entries[0].archive_name, "/usr/bin/hello");
        assert_eq!(plan.entries[0].size, 13);
    }

    #[test]
    fn expands_a_glob_pattern() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("usr/share/doc")).unwrap();
        fs::File::create(dir.path().join("usr/share/doc/README")).unwrap();
        fs::File::create(dir.path().join("usr/share/doc/LICENSE")).unwrap();

        let plan = expand_manifest("/usr/share/doc/*\n", dir.path()).unwrap();
        assert_eq!(plan.entries.len(), 2);
    }

    #[test]
    fn unmatched_pattern_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(expand_manifest("/usr/bin/nonexistent\n", dir.path()).is_err());
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("usr/bin")).unwrap();
        fs::File::create(dir.path().join("usr/bin/hello")).unwrap();
        let plan = expand_manifest("\n# a comment\n/usr/bin/hello\n", dir.path()).unwrap();
        assert_eq!(plan.entries.len(), 1);
    }
}
