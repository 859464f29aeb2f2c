/// Errors raised while reading an ELF64 object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElfError {
    #[error("invalid ELF magic")]
    InvalidMagic,
    #[error("unsupported ELF class: {0}")]
    UnsupportedClass(u8),
    #[error("unsupported data encoding: {0}")]
    UnsupportedEncoding(u8),
    #[error("buffer too small: need {needed}, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
    #[error("invalid {kind} offset: {offset:#x}")]
    InvalidOffset { kind: &'static str, offset: u64 },
    #[error("invalid string table index: {0}")]
    InvalidStringIndex(u32),
    #[error("section not found: {0}")]
    SectionNotFound(String),
}

pub type ElfResult<T> = Result<T, ElfError>;
