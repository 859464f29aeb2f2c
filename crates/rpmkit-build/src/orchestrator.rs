//! The build orchestrator's main loop (spec.md §4.E): runs each
//! selected stage in canonical order, short-circuiting as configured,
//! and invokes the package writer for the two packaging stages.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use rpmkit_header::{tags, Header, TagValue};
use rpmkit_pkg::{PackageKind, WriteTarget};
use rpmkit_sign::Signer;
use rpmkit_spec::{Spec, Stage as SpecStage};
use rpmkit_strbuf::TempFile;

use crate::config::{BuildConfig, Compressor as ConfigCompressor};
use crate::deps::DependencyExtractor;
use crate::error::BuildError;
use crate::log::{LogEntry, LogLevel, Outcome, StructuredLog};
use crate::payload;
use crate::prologue::{self, PrologueContext};
use crate::stage::{BuildPlan, Stage};

fn spec_stage_of(stage: Stage) -> Option<SpecStage> {
    Some(match stage {
        Stage::Prep => SpecStage::Prep,
        Stage::Build => SpecStage::Build,
        Stage::Install => SpecStage::Install,
        Stage::Check => SpecStage::Check,
        Stage::Clean => SpecStage::Clean,
        _ => return None,
    })
}

fn header_str(header: &Header, tag: u32) -> Option<String> {
    match header.get(tag) {
        Some(TagValue::Str(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Legacy rpmrc-style arch/os numeric codes. Only the common ones are
/// named; anything else gets `0`, matching how an unrecognized arch
/// degrades on the original platform (it is still a valid, if
/// unclassified, lead field).
fn archnum_for(arch: &str) -> u16 {
    match arch {
        "x86_64" | "amd64" => 1,
        "i386" | "i486" | "i586" | "i686" | "x86" => 1,
        "noarch" => 255,
        "aarch64" | "arm64" => 12,
        "armv7" | "arm" => 12,
        "ppc64" | "ppc64le" => 16,
        "s390x" => 22,
        _ => 0,
    }
}

fn osnum_for(os: &str) -> u16 {
    match os {
        "linux" => 1,
        _ => 0,
    }
}

fn name_version_release(header: &Header) -> Option<String> {
    let name = header_str(header, tags::NAME)?;
    let version = header_str(header, tags::VERSION)?;
    let release = header_str(header, tags::RELEASE)?;
    Some(format!("{name}-{version}-{release}"))
}

fn run_script_stage(
    stage: Stage,
    spec: &Spec,
    config: &BuildConfig,
) -> Result<(), BuildError> {
    let spec_stage = match spec_stage_of(stage) {
        Some(s) => s,
        None => return Ok(()),
    };
    let body = match spec.stage_bodies.get(&spec_stage).and_then(|b| b.as_str()) {
        Some(b) if !b.trim().is_empty() => b,
        _ => return Ok(()),
    };

    let main = &spec.packages[0];
    let package_name = header_str(&main.header, tags::NAME).unwrap_or_default();
    let package_version = header_str(&main.header, tags::VERSION).unwrap_or_default();
    let package_release = header_str(&main.header, tags::RELEASE).unwrap_or_default();
    let default_subdir = format!("{package_name}-{package_version}");
    let build_subdir = spec.build_subdir.as_deref().unwrap_or(&default_subdir);

    let ctx = PrologueContext {
        config,
        build_subdir,
        package_name: &package_name,
        package_version: &package_version,
        package_release: &package_release,
    };
    let script = prologue::build_script(&ctx, body);

    let mut temp = TempFile::new("rpmkit-build").map_err(|e| BuildError::TempFile(std::io::Error::other(e)))?;
    std::io::Write::write_all(temp.as_file_mut(), script.get())?;
    std::io::Write::flush(temp.as_file_mut())?;

    let status = Command::new(&config.interpreter)
        .arg(temp.path())
        .status()
        .map_err(|source| BuildError::Spawn { stage, source })?;

    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(BuildError::Script { stage, exit_code: code }),
        None => Err(BuildError::ScriptSignaled { stage }),
    }
}

fn to_write_compressor(compressor: ConfigCompressor) -> rpmkit_pkg::Compressor {
    match compressor {
        ConfigCompressor::Gzip => rpmkit_pkg::Compressor::Gzip,
        ConfigCompressor::Bzip2 => rpmkit_pkg::Compressor::Bzip2,
    }
}

fn apply_dependency_extraction(header: &mut Header, plan: &rpmkit_spec::PayloadPlan, extractor: &dyn DependencyExtractor) {
    let mut requires = Vec::new();
    let mut provides = Vec::new();
    for entry in &plan.entries {
        if entry.link_target.is_some() {
            continue;
        }
        let (mut r, mut p) = extractor.extract(Path::new(&entry.src_path));
        requires.append(&mut r);
        provides.append(&mut p);
    }
    if !requires.is_empty() {
        let _ = header.append_or_add(tags::REQUIRE_NAME, TagValue::StrArray(requires));
    }
    if !provides.is_empty() {
        let _ = header.append_or_add(tags::PROVIDE_NAME, TagValue::StrArray(provides));
    }
}

/// Expands `package`'s `%files` manifest and runs auto-dependency
/// extraction, if that hasn't already happened for this run. Called
/// both by the standalone `FileCheck` stage (`-bl`) and by
/// `PackageBinary`, since spec.md §4.E has the packaging stages
/// "consult the file manifest" directly rather than requiring
/// `FileCheck` to have run first.
fn ensure_payload_plan(
    package: &mut rpmkit_spec::Package,
    config: &BuildConfig,
    extractor: &dyn DependencyExtractor,
) -> Result<(), BuildError> {
    if package.payload_plan.is_some() {
        return Ok(());
    }
    let manifest = match package.file_manifest.as_str() {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => return Ok(()),
    };
    let plan = payload::expand_manifest(&manifest, &config.build_root)?;
    if package.auto_req_prov {
        apply_dependency_extraction(&mut package.header, &plan, extractor);
    }
    package.payload_plan = Some(plan);
    Ok(())
}

fn file_check(spec: &mut Spec, config: &BuildConfig, extractor: &dyn DependencyExtractor) -> Result<(), BuildError> {
    for package in &mut spec.packages {
        ensure_payload_plan(package, config, extractor)?;
    }
    Ok(())
}

fn write_one_package(
    kind: PackageKind,
    header: &mut Header,
    plan: &rpmkit_spec::PayloadPlan,
    config: &BuildConfig,
    signer: Option<&dyn Signer>,
    out_dir: &Path,
    label: &str,
) -> Result<PathBuf, BuildError> {
    let nvr = name_version_release(header).unwrap_or_else(|| label.to_string());
    let suffix = match kind {
        PackageKind::Binary => format!("{}.{}.rpm", nvr, config.target_arch),
        PackageKind::Source => format!("{nvr}.src.rpm"),
    };
    let out_path = out_dir.join(suffix);
    let build_host = hostname();
    let target = WriteTarget {
        name_version_release: &nvr,
        archnum: archnum_for(&config.target_arch),
        osnum: osnum_for(&config.target_os),
        compressor: to_write_compressor(config.compressor),
        build_host: &build_host,
    };
    rpmkit_pkg::write_rpm(kind, header, plan, &target, signer, &out_path)
        .map_err(|source| BuildError::Package { package: nvr, source })?;
    Ok(out_path)
}

fn hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
}

fn package_binary(
    spec: &mut Spec,
    config: &BuildConfig,
    extractor: &dyn DependencyExtractor,
    signer: Option<&dyn Signer>,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, BuildError> {
    let mut written = Vec::new();
    for package in &mut spec.packages {
        ensure_payload_plan(package, config, extractor)?;
        let plan = match &package.payload_plan {
            Some(plan) if !plan.entries.is_empty() => plan.clone(),
            _ => continue,
        };
        let path = write_one_package(PackageKind::Binary, &mut package.header, &plan, config, signer, out_dir, &package.name)?;
        written.push(path);
    }
    Ok(written)
}

fn package_source(
    spec: &mut Spec,
    config: &BuildConfig,
    signer: Option<&dyn Signer>,
    out_dir: &Path,
) -> Result<PathBuf, BuildError> {
    let plan = spec.source_payload_plan.clone().unwrap_or_default();
    write_one_package(PackageKind::Source, &mut spec.source_header, &plan, config, signer, out_dir, "source")
}

fn remove_dir_if_exists(path: &Path) -> Result<(), BuildError> {
    if path.exists() {
        std::fs::remove_dir_all(path)?;
    }
    Ok(())
}

/// Runs every stage `plan` selects, in canonical order, stopping at
/// the first failure (spec.md §4.E: "remaining stages are not
/// attempted"). Returns the paths of any packages written.
pub fn run(
    spec: &mut Spec,
    plan: BuildPlan,
    config: &BuildConfig,
    extractor: &dyn DependencyExtractor,
    signer: Option<&dyn Signer>,
    log: &mut StructuredLog,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, BuildError> {
    let mut written = Vec::new();

    for stage in plan.stages_to_run() {
        let start = Instant::now();
        let outcome = (|| -> Result<(), BuildError> {
            match stage {
                Stage::Prep | Stage::Build | Stage::Install | Stage::Check | Stage::Clean => {
                    run_script_stage(stage, spec, config)
                }
                Stage::FileCheck => file_check(spec, config, extractor),
                Stage::PackageSource => package_source(spec, config, signer, out_dir).map(|p| written.push(p)),
                Stage::PackageBinary => {
                    let mut paths = package_binary(spec, config, extractor, signer, out_dir)?;
                    written.append(&mut paths);
                    Ok(())
                }
                Stage::RmSource => remove_dir_if_exists(&config.source_dir),
                Stage::RmBuild => remove_dir_if_exists(&config.build_dir),
                Stage::RmSpec => {
                    let _ = std::fs::remove_file(&spec.spec_path);
                    Ok(())
                }
            }
        })();

        let duration_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            Ok(()) => {
                let _ = log.emit(
                    &LogEntry::new(LogLevel::Info, "stage-complete")
                        .with_stage(stage)
                        .with_outcome(Outcome::Pass)
                        .with_duration_ms(duration_ms),
                );
            }
            Err(err) => {
                let _ = log.emit(
                    &LogEntry::new(LogLevel::Error, "stage-failed")
                        .with_stage(stage)
                        .with_outcome(Outcome::Fail)
                        .with_duration_ms(duration_ms)
                        .with_details(err.to_string()),
                );
            }
        }
        outcome?;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpmkit_macro::MacroContext;

    fn spec_with_name(name: &str) -> Spec {
        let mut spec = Spec::new("/tmp/x.spec", MacroContext::new());
        let pkg = spec.main_package();
        pkg.header.put(tags::NAME, TagValue::Str(name.to_string())).unwrap();
        pkg.header.put(tags::VERSION, TagValue::Str("1.0".to_string())).unwrap();
        pkg.header.put(tags::RELEASE, TagValue::Str("1".to_string())).unwrap();
        spec
    }

    #[test]
    fn empty_plan_writes_nothing() {
        let mut spec = spec_with_name("hello");
        let config = BuildConfig::default();
        let mut log = StructuredLog::to_buffer();
        let extractor = crate::deps::NullDependencyExtractor;
        let out_dir = tempfile::tempdir().unwrap();
        let written = run(&mut spec, BuildPlan::EMPTY, &config, &extractor, None, &mut log, out_dir.path()).unwrap();
        assert!(written.is_empty());
    }

    #[test]
    fn missing_stage_body_is_a_silent_no_op() {
        let mut spec = spec_with_name("hello");
        let mut config = BuildConfig::default();
        config.build_dir = tempfile::tempdir().unwrap().path().to_path_buf();
        let mut log = StructuredLog::to_buffer();
        let extractor = crate::deps::NullDependencyExtractor;
        let out_dir = tempfile::tempdir().unwrap();
        let plan = BuildPlan::EMPTY.with(Stage::Prep);
        let result = run(&mut spec, plan, &config, &extractor, None, &mut log, out_dir.path());
        assert!(result.is_ok());
    }

    #[test]
    fn archnum_recognizes_common_architectures() {
        assert_eq!(archnum_for("x86_64"), 1);
        assert_eq!(archnum_for("noarch"), 255);
        assert_eq!(archnum_for("totally-unknown"), 0);
    }
}
