/// The closed error taxonomy a spec parse can fail with (spec.md §7,
/// restricted to the parser's share of it).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SpecError {
    #[error("{path}:{line}: {reason}")]
    BadSpec { path: String, line: usize, reason: String },
    #[error("bad filename: {0}")]
    BadFilename(String),
    #[error("{path}:{line}: bad number: {text}")]
    BadNumber { path: String, line: usize, text: String },
    #[error("{path}:{line}: unmatched %if/%else/%endif")]
    UnmatchedIf { path: String, line: usize },
}
