//! Closed error taxonomy for the package writer (spec.md §4.F / §7).

#[derive(Debug, thiserror::Error)]
pub enum PkgError {
    #[error("failed to create output or temp file: {0}")]
    Create(#[source] std::io::Error),
    #[error("short write (no space left on device)")]
    NoSpace,
    #[error("failed to read back temp file: {0}")]
    ReadIo(#[source] std::io::Error),
    #[error("temp readback failed: {0}")]
    Read(String),
    #[error("payload stream failed for member {member}: {reason}")]
    Cpio { member: String, reason: String },
    #[error("signer refused to generate signature: {0}")]
    SigGen(#[from] rpmkit_sign::SignError),
    #[error("header operation failed: {0}")]
    Header(#[from] rpmkit_header::HeaderError),
    #[error("lead magic mismatch")]
    BadMagic,
    #[error("package filename does not fit the lead's 66-byte name field: {0}")]
    BadFilename(String),
}
