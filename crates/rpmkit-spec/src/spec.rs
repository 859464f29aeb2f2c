//! Top-level parse driver tying the line reader, section dispatch, and
//! preamble/requires/trigger/changelog submodules together into the
//! `parse()` entry point (spec.md §4.D).

use std::path::Path;

use rpmkit_macro::MacroContext;
use rpmkit_strbuf::StringBuf;

use crate::changelog::ChangelogBuilder;
use crate::error::SpecError;
use crate::model::{Package, Spec, Stage, TriggerEntry, TriggerScript};
use crate::preamble::{self, PreambleEffect};
use crate::reader::{LineOutcome, LineReader, StripFlags};
use crate::section::{self, SectionDirective};

/// Which buffer subsequent content lines accumulate into.
enum Current {
    Preamble(usize),
    Description(usize),
    Files(usize),
    Stage(Stage),
    Changelog,
    Script { kind: crate::model::ScriptKind, package: usize },
    Trigger { entry: PendingTrigger },
}

struct PendingTrigger {
    kind: crate::model::TriggerKind,
    package: usize,
    prog: Option<String>,
    subject: crate::model::DependencyEntry,
}

/// Parses a spec file at `spec_path` into a fully populated [`Spec`].
/// `target_arch`/`target_os` drive `%ifarch`/`%ifos` gating.
pub fn parse(spec_path: &Path, macros: MacroContext, target_arch: &str, target_os: &str) -> Result<Spec, SpecError> {
    let mut reader = LineReader::open(spec_path, target_arch, target_os)?;
    let mut spec = Spec::new(spec_path.display().to_string(), macros);

    let mut current = Current::Preamble(0);
    let mut buffer = StringBuf::new();
    let mut changelog = ChangelogBuilder::new();
    let mut trigger_index: u32 = 0;

    loop {
        let strip = StripFlags::COMMENTS | StripFlags::TRAILING_SPACE;
        let line = match reader.read_line(&mut spec.macros, strip)? {
            LineOutcome::Eof => break,
            LineOutcome::Line(l) => l,
        };
        let path = reader.path();
        let line_no = reader.line_no();

        if let Some(directive) = section::parse(&line, &path, line_no)? {
            flush(&mut current, &mut buffer, &mut changelog, &mut spec, &mut trigger_index, &path, line_no)?;
            let main_pkg_name = spec.packages[0].name.clone();
            current = enter_section(directive, &mut spec.packages, &main_pkg_name);
            continue;
        }

        match &current {
            Current::Preamble(pkg) => {
                apply_preamble_line(&line, *pkg, &mut spec, &path, line_no)?;
            }
            Current::Changelog => {
                changelog.push_line(&line, &path, line_no)?;
            }
            _ => {
                buffer.append_line(line.as_bytes());
            }
        }
    }

    let path = reader.path();
    let line_no = reader.line_no();
    flush(&mut current, &mut buffer, &mut changelog, &mut spec, &mut trigger_index, &path, line_no)?;

    section::inherit_preamble_tags(&mut spec.packages);

    Ok(spec)
}

fn enter_section(directive: SectionDirective, packages: &mut Vec<Package>, main_name: &str) -> Current {
    match directive {
        SectionDirective::Prep => Current::Stage(Stage::Prep),
        SectionDirective::Build => Current::Stage(Stage::Build),
        SectionDirective::Install => Current::Stage(Stage::Install),
        SectionDirective::Check => Current::Stage(Stage::Check),
        SectionDirective::Clean => Current::Stage(Stage::Clean),
        SectionDirective::Changelog => Current::Changelog,
        SectionDirective::Package { name, explicit_n } => {
            let idx = section::resolve_package_index(packages, main_name, name.as_deref(), explicit_n);
            Current::Preamble(idx)
        }
        SectionDirective::Files { name } => {
            let idx = section::resolve_package_index(packages, main_name, name.as_deref(), true);
            Current::Files(idx)
        }
        SectionDirective::Description { name } => {
            let idx = section::resolve_package_index(packages, main_name, name.as_deref(), true);
            Current::Description(idx)
        }
        SectionDirective::Script { kind, name, prog: _ } => {
            let idx = section::resolve_package_index(packages, main_name, name.as_deref(), true);
            Current::Script { kind, package: idx }
        }
        SectionDirective::Trigger { kind, prog, subject } => Current::Trigger {
            entry: PendingTrigger { kind, package: 0, prog, subject },
        },
    }
}

fn apply_preamble_line(line: &str, pkg: usize, spec: &mut Spec, path: &str, line_no: usize) -> Result<(), SpecError> {
    if line.trim().is_empty() {
        return Ok(());
    }
    let Some(colon) = line.find(':') else {
        return Err(SpecError::BadSpec { path: path.to_string(), line: line_no, reason: format!("unrecognized preamble line: {line}") });
    };
    let raw_tag = line[..colon].trim();
    let value = line[colon + 1..].trim();

    match preamble::classify(raw_tag, value) {
        PreambleEffect::SingleString { tag } => {
            preamble::store_single_string(&mut spec.packages[pkg].header, tag, value, path, line_no)?;
        }
        PreambleEffect::Source(source) => {
            spec.sources.push(source);
        }
        PreambleEffect::DependencyList { name_tag, entries } => {
            preamble::store_dependency_list(&mut spec.packages[pkg].header, name_tag, &entries)?;
        }
        PreambleEffect::AutoReqProv(on) => {
            spec.packages[pkg].auto_req_prov = on;
        }
        PreambleEffect::NoSource => {
            spec.no_source = true;
        }
        PreambleEffect::Unrecognized => {
            return Err(SpecError::BadSpec {
                path: path.to_string(),
                line: line_no,
                reason: format!("unrecognized preamble tag: {raw_tag}"),
            });
        }
    }
    Ok(())
}

fn flush(
    current: &mut Current,
    buffer: &mut StringBuf,
    changelog: &mut ChangelogBuilder,
    spec: &mut Spec,
    trigger_index: &mut u32,
    path: &str,
    line_no: usize,
) -> Result<(), SpecError> {
    let text = buffer.as_str().unwrap_or_default().trim_end_matches('\n').to_string();
    buffer.truncate();

    match current {
        Current::Preamble(_) => {}
        Current::Stage(stage) => {
            if !text.is_empty() {
                let mut body = StringBuf::new();
                body.append(text.as_bytes());
                spec.stage_bodies.insert(*stage, body);
            }
        }
        Current::Description(pkg) => {
            let header = &mut spec.packages[*pkg].header;
            let _ = header.remove(rpmkit_header::tags::DESCRIPTION);
            if !text.is_empty() {
                preamble::store_single_string(header, rpmkit_header::tags::DESCRIPTION, &text, path, line_no)?;
            }
        }
        Current::Files(pkg) => {
            spec.packages[*pkg].file_manifest = StringBuf::new();
            spec.packages[*pkg].file_manifest.append(text.as_bytes());
        }
        Current::Script { kind, package } => {
            if !text.is_empty() {
                spec.packages[*package].scripts.insert(*kind, text);
            }
        }
        Current::Trigger { entry } => {
            let script = if text.is_empty() { TriggerScript::Inline(String::new()) } else { TriggerScript::Inline(text) };
            let idx = *trigger_index;
            *trigger_index += 1;
            spec.packages[entry.package].trigger_entries.push(TriggerEntry {
                index: idx,
                kind: entry.kind,
                subject: entry.subject.clone(),
                prog: entry.prog.clone(),
                script,
            });
        }
        Current::Changelog => {
            spec.changelog.extend(std::mem::take(changelog).finish());
        }
    }
    Ok(())
}
