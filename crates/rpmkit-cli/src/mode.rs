//! Legacy single-token build-mode flags (`-bp`/`-bc`/`-bi`/`-bl`/`-ba`/
//! `-bb`/`-bs`) and the stage bitset each one maps to (spec.md §6 "CLI
//! surface of the build front-end").

use rpmkit_build::{BuildPlan, Stage};

/// One of the seven historical build modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BuildMode {
    /// `-bp`: run the `%prep` stage only.
    Prep,
    /// `-bc`: `%prep` then `%build`.
    Compile,
    /// `-bi`: `%prep`, `%build`, then `%install`.
    Install,
    /// `-bl`: verify the `%files` manifest without building anything.
    List,
    /// `-ba`: everything — both a source and a binary package.
    All,
    /// `-bb`: everything needed to produce the binary package only.
    Binary,
    /// `-bs`: package the sources only, no build stages run.
    Source,
}

impl BuildMode {
    /// Parses one of the legacy `-bp`/.../`-bs` tokens, if `arg` is one.
    pub fn from_legacy_flag(arg: &str) -> Option<Self> {
        Some(match arg {
            "-bp" => Self::Prep,
            "-bc" => Self::Compile,
            "-bi" => Self::Install,
            "-bl" => Self::List,
            "-ba" => Self::All,
            "-bb" => Self::Binary,
            "-bs" => Self::Source,
            _ => return None,
        })
    }

    /// The stage bitset this mode selects, and the stage a
    /// `--short-circuit` run should treat as its floor.
    pub fn plan(self) -> BuildPlan {
        match self {
            Self::Prep => BuildPlan::EMPTY.with(Stage::Prep),
            Self::Compile => BuildPlan::EMPTY.with(Stage::Prep).with(Stage::Build),
            Self::Install => BuildPlan::EMPTY.with(Stage::Prep).with(Stage::Build).with(Stage::Install),
            Self::List => BuildPlan::EMPTY.with(Stage::FileCheck),
            Self::All => BuildPlan::EMPTY
                .with(Stage::Prep)
                .with(Stage::Build)
                .with(Stage::Install)
                .with(Stage::Check)
                .with(Stage::FileCheck)
                .with(Stage::PackageSource)
                .with(Stage::PackageBinary)
                .with(Stage::Clean),
            Self::Binary => BuildPlan::EMPTY
                .with(Stage::Prep)
                .with(Stage::Build)
                .with(Stage::Install)
                .with(Stage::Check)
                .with(Stage::FileCheck)
                .with(Stage::PackageBinary)
                .with(Stage::Clean),
            Self::Source => BuildPlan::EMPTY.with(Stage::PackageSource),
        }
    }

    /// The stage a `--short-circuit` run for this mode should start
    /// from — the "newest" stage the mode's name implies.
    pub fn short_circuit_floor(self) -> Stage {
        match self {
            Self::Prep => Stage::Prep,
            Self::Compile => Stage::Build,
            Self::Install => Stage::Install,
            Self::List => Stage::FileCheck,
            Self::All | Self::Binary => Stage::PackageBinary,
            Self::Source => Stage::PackageSource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_mode_selects_cumulative_stages() {
        let plan = BuildMode::Install.plan();
        assert!(plan.contains(Stage::Prep));
        assert!(plan.contains(Stage::Build));
        assert!(plan.contains(Stage::Install));
        assert!(!plan.contains(Stage::PackageBinary));
    }

    #[test]
    fn source_mode_runs_no_build_stages() {
        let plan = BuildMode::Source.plan();
        assert!(!plan.contains(Stage::Prep));
        assert!(plan.contains(Stage::PackageSource));
    }

    #[test]
    fn recognizes_all_legacy_flags() {
        for (flag, mode) in [
            ("-bp", BuildMode::Prep),
            ("-bc", BuildMode::Compile),
            ("-bi", BuildMode::Install),
            ("-bl", BuildMode::List),
            ("-ba", BuildMode::All),
            ("-bb", BuildMode::Binary),
            ("-bs", BuildMode::Source),
        ] {
            assert_eq!(BuildMode::from_legacy_flag(flag), Some(mode));
        }
        assert_eq!(BuildMode::from_legacy_flag("--verbose"), None);
    }
}
