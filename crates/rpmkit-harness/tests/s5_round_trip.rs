//! S5 — build S1's package, read it back, and check the reconstructed
//! Header satisfies property (4): every tag's value, type, and count
//! survive `unload`/`load`.

use rpmkit_build::{BuildConfig, NullDependencyExtractor, Stage, StructuredLog};

#[test]
fn read_rpm_reconstructs_every_header_tag() {
    let dir = tempfile::tempdir().unwrap();
    let (mut spec, _payload_path) = rpmkit_harness::trivial_spec_with_payload(&dir);

    let mut config = BuildConfig::default();
    config.build_root = dir.path().to_path_buf();

    let plan = rpmkit_build::BuildPlan::EMPTY
        .with(Stage::Prep)
        .with(Stage::Build)
        .with(Stage::Install)
        .with(Stage::PackageBinary);

    let extractor = NullDependencyExtractor;
    let mut log = StructuredLog::to_buffer();
    let out_dir = tempfile::tempdir().unwrap();
    let written = rpmkit_build::run(&mut spec, plan, &config, &extractor, None, &mut log, out_dir.path()).unwrap();

    let original_header = spec.packages[0].header.clone();
    let bytes = std::fs::read(&written[0]).unwrap();
    let parsed = rpmkit_pkg::read_rpm(&bytes).unwrap();

    for entry in original_header.iterate() {
        assert_eq!(parsed.header.get(entry.tag), original_header.get(entry.tag), "tag {} did not round-trip", entry.tag);
    }
}
