//! Closed error taxonomy for the build orchestrator (spec.md §7).

use crate::stage::Stage;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("stage {stage:?} exited with status {exit_code}")]
    Script { stage: Stage, exit_code: i32 },
    #[error("stage {stage:?} was terminated by signal")]
    ScriptSignaled { stage: Stage },
    #[error("failed to spawn interpreter for stage {stage:?}: {source}")]
    Spawn { stage: Stage, #[source] source: std::io::Error },
    #[error("failed to write stage script: {0}")]
    TempFile(#[from] std::io::Error),
    #[error("glob pattern error in %files entry {pattern:?}: {source}")]
    BadGlob { pattern: String, #[source] source: glob::PatternError },
    #[error("%files entry {pattern:?} matched no files under the build root")]
    EmptyManifest { pattern: String },
    #[error("package writer failed for {package}: {source}")]
    Package { package: String, #[source] source: rpmkit_pkg::PkgError },
}
