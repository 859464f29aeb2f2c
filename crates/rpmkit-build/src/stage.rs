//! Build stage bitset and canonical ordering (spec.md §4.E).

/// One stage the orchestrator can be asked to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Prep,
    Build,
    Install,
    Check,
    Clean,
    FileCheck,
    PackageSource,
    PackageBinary,
    RmSource,
    RmBuild,
    RmSpec,
}

/// Canonical execution order: `Prep → Build → Install → Check → Clean →
/// FileCheck → PackageSource → PackageBinary`. `RmSource`/`RmBuild`/
/// `RmSpec` are cleanup stages run last, in the order listed, after
/// packaging.
pub const CANONICAL_ORDER: &[Stage] = &[
    Stage::Prep,
    Stage::Build,
    Stage::Install,
    Stage::Check,
    Stage::Clean,
    Stage::FileCheck,
    Stage::PackageSource,
    Stage::PackageBinary,
    Stage::RmSource,
    Stage::RmBuild,
    Stage::RmSpec,
];

/// The set of stages selected for a single orchestrator run, plus an
/// optional short-circuit floor.
///
/// `short_circuit_from`, when set, drops every selected stage strictly
/// earlier than it (spec.md §4.E / invariant 8: `--short-circuit
/// --install` runs only `Install` even though `-bi` nominally selects
/// the cumulative `{Prep, Build, Install}`). The CLI front-end is
/// responsible for choosing this floor from its `--short-circuit` flag
/// and requested mode; the orchestrator only applies it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildPlan {
    bits: u16,
    short_circuit_from: Option<Stage>,
}

impl BuildPlan {
    pub const EMPTY: Self = Self { bits: 0, short_circuit_from: None };

    fn bit(stage: Stage) -> u16 {
        1 << (CANONICAL_ORDER.iter().position(|s| *s == stage).expect("stage in CANONICAL_ORDER"))
    }

    pub fn with(mut self, stage: Stage) -> Self {
        self.bits |= Self::bit(stage);
        self
    }

    pub fn short_circuit_from(mut self, stage: Stage) -> Self {
        self.short_circuit_from = Some(stage);
        self
    }

    pub fn contains(self, stage: Stage) -> bool {
        self.bits & Self::bit(stage) != 0
    }

    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Stages this plan will actually run, in canonical execution
    /// order, with the short-circuit floor (if any) applied.
    pub fn stages_to_run(self) -> Vec<Stage> {
        let floor = self.short_circuit_from.map(|s| CANONICAL_ORDER.iter().position(|c| *c == s).unwrap());
        CANONICAL_ORDER
            .iter()
            .copied()
            .enumerate()
            .filter(|(i, s)| self.contains(*s) && floor.is_none_or(|f| *i >= f))
            .map(|(_, s)| s)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_to_run_follows_canonical_order_regardless_of_insertion() {
        let plan = BuildPlan::EMPTY.with(Stage::PackageBinary).with(Stage::Prep).with(Stage::Build);
        assert_eq!(plan.stages_to_run(), vec![Stage::Prep, Stage::Build, Stage::PackageBinary]);
    }

    #[test]
    fn short_circuit_drops_strictly_earlier_stages() {
        let plan = BuildPlan::EMPTY
            .with(Stage::Prep)
            .with(Stage::Build)
            .with(Stage::Install)
            .short_circuit_from(Stage::Install);
        assert_eq!(plan.stages_to_run(), vec![Stage::Install]);
    }

    #[test]
    fn without_short_circuit_all_selected_stages_run() {
        let plan = BuildPlan::EMPTY.with(Stage::Prep).with(Stage::Build).with(Stage::Install);
        assert_eq!(plan.stages_to_run(), vec![Stage::Prep, Stage::Build, Stage::Install]);
    }

    #[test]
    fn contains_reflects_membership() {
        let plan = BuildPlan::EMPTY.with(Stage::Clean);
        assert!(plan.contains(Stage::Clean));
        assert!(!plan.contains(Stage::Build));
    }
}
