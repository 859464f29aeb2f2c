//! Spec Parser (spec.md §4.D): turns a line-oriented recipe file into
//! a populated [`Spec`], honoring conditional gating, per-line macro
//! expansion, and section dispatch.

mod changelog;
mod error;
mod model;
mod preamble;
mod readlevel;
mod reader;
mod requires;
mod section;
mod spec;
mod trigger;

pub use error::SpecError;
pub use model::{
    ChangelogEntry, DependencyEntry, DependencyOp, Package, PayloadPlan, PayloadPlanEntry, ScriptKind, Source,
    SourceFlags, Spec, Stage, TriggerEntry, TriggerKind, TriggerScript,
};
pub use reader::{LineOutcome, LineReader, StripFlags};
pub use spec::parse;
