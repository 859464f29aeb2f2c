/// Failures raised by [`crate::Header`] operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("tag {0} already exists")]
    Existing(u32),
    #[error("bad data: {0}")]
    BadData(String),
    #[error("bad type: {0}")]
    BadType(String),
    #[error("bad magic")]
    BadMagic,
}
