//! Shared fixtures for the integration tests under `tests/`: writing a
//! spec file to a temp directory and parsing it with the default host
//! target, and a minimal payload-backing file tree.

use std::path::PathBuf;

use rpmkit_macro::MacroContext;
use rpmkit_spec::{Spec, SpecError};

pub const TEST_ARCH: &str = "x86_64";
pub const TEST_OS: &str = "linux";

/// Writes `content` to `dir/name` and parses it as a spec file.
pub fn parse_spec(dir: &tempfile::TempDir, name: &str, content: &str) -> Result<Spec, SpecError> {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    rpmkit_spec::parse(&path, MacroContext::new(), TEST_ARCH, TEST_OS)
}

/// Writes `content` to `dir/name`, returning the path for parsing
/// scenarios that need the `PathBuf` directly (e.g. to assert on the
/// parse error's reported path).
pub fn write_spec_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// S1's trivial single-file package: one regular file under `%files`,
/// empty `%prep`/`%build`/`%install` bodies, no subpackages. `%files`
/// names the payload by build-root-relative path; the matching file
/// must be written under the build root the caller passes to the
/// orchestrator.
pub const TRIVIAL_SPEC: &str = "\
Name: hello
Version: 1.0
Release: 1
Summary: h
License: MIT
Group: U

%description

%prep

%build

%install

%files
/usr/bin/hello
";

/// Writes `TRIVIAL_SPEC` plus its 13-byte `/usr/bin/hello` payload
/// file under `dir` (used as both the spec's directory and the build
/// root), returning the parsed spec and the payload file's path.
pub fn trivial_spec_with_payload(dir: &tempfile::TempDir) -> (Spec, PathBuf) {
    std::fs::create_dir_all(dir.path().join("usr/bin")).unwrap();
    let payload_path = dir.path().join("usr/bin/hello");
    std::fs::write(&payload_path, b"hello world!!").unwrap();
    let spec = parse_spec(dir, "hello.spec", TRIVIAL_SPEC).unwrap();
    (spec, payload_path)
}
