//! Section dispatch (spec.md §4.D): recognizes the directive lines that
//! switch which buffer subsequent lines are appended to, and resolves
//! the `-n NAME` / bare `NAME` subpackage-targeting convention shared
//! by `%package`, `%files`, `%description`, and the scriptlet sections.

use rpmkit_header::tags;

use crate::error::SpecError;
use crate::model::{DependencyEntry, Package, ScriptKind, TriggerKind};
use crate::trigger::{parse_trigger_line, trigger_kind_for};

/// Single-value preamble tags a subpackage inherits from the main
/// package when it never sets its own value.
const INHERITED_TAGS: &[u32] = &[
    tags::GROUP,
    tags::VENDOR,
    tags::LICENSE,
    tags::DISTRIBUTION,
    tags::PACKAGER,
    tags::URL,
    tags::PREFIXES,
];

/// Fills in unset [`INHERITED_TAGS`] on every subpackage from the main
/// package's header. Run once after the whole spec file is parsed, so
/// subpackage preamble lines always take precedence over inheritance
/// regardless of where `%package` appears relative to the main preamble.
pub fn inherit_preamble_tags(packages: &mut [Package]) {
    let Some((main, subpackages)) = packages.split_first_mut() else { return };
    for sub in subpackages {
        let missing: Vec<u32> = INHERITED_TAGS.iter().copied().filter(|&tag| !sub.header.is_entry(tag)).collect();
        if !missing.is_empty() {
            main.header.copy_tags(&mut sub.header, &missing);
        }
    }
}

/// What a recognized `%directive` line switches the parser's target to.
pub enum SectionDirective {
    Prep,
    Build,
    Install,
    Check,
    Clean,
    Changelog,
    Package { name: Option<String>, explicit_n: bool },
    Files { name: Option<String> },
    Description { name: Option<String> },
    Script { kind: ScriptKind, name: Option<String>, prog: Option<String> },
    Trigger { kind: TriggerKind, prog: Option<String>, subject: DependencyEntry },
}

/// Splits `-n NAME`/bare `NAME` and, for scriptlets, `-p PROG` out of a
/// directive's argument tokens. Returns `(name, prog)`.
fn split_name_and_prog(mut tokens: Vec<&str>) -> (Option<String>, Option<String>, bool) {
    let mut name = None;
    let mut prog = None;
    let mut explicit_n = false;
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "-n" if i + 1 < tokens.len() => {
                name = Some(tokens[i + 1].to_string());
                explicit_n = true;
                tokens.drain(i..=i + 1);
            }
            "-p" if i + 1 < tokens.len() => {
                prog = Some(tokens[i + 1].to_string());
                tokens.drain(i..=i + 1);
            }
            _ => i += 1,
        }
    }
    if name.is_none() {
        if let Some(first) = tokens.first() {
            name = Some((*first).to_string());
        }
    }
    (name, prog, explicit_n)
}

/// Parses a line beginning with `%` into a [`SectionDirective`], or
/// `None` if the line doesn't name a section dispatch keyword (e.g. a
/// macro invocation or an `%if*`/`%include` line already handled by
/// the line reader).
pub fn parse(line: &str, path: &str, line_no: usize) -> Result<Option<SectionDirective>, SpecError> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with('%') {
        return Ok(None);
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let keyword = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();
    let tokens: Vec<&str> = rest.split_whitespace().collect();

    let directive = match keyword {
        "%prep" => SectionDirective::Prep,
        "%build" => SectionDirective::Build,
        "%install" => SectionDirective::Install,
        "%check" => SectionDirective::Check,
        "%clean" => SectionDirective::Clean,
        "%changelog" => SectionDirective::Changelog,
        "%package" => {
            let (name, _prog, explicit_n) = split_name_and_prog(tokens);
            SectionDirective::Package { name, explicit_n }
        }
        "%files" => {
            let (name, _prog, _) = split_name_and_prog(tokens);
            SectionDirective::Files { name }
        }
        "%description" => {
            let (name, _prog, _) = split_name_and_prog(tokens);
            SectionDirective::Description { name }
        }
        "%pre" => script(tokens, ScriptKind::PreIn),
        "%post" => script(tokens, ScriptKind::PostIn),
        "%preun" => script(tokens, ScriptKind::PreUn),
        "%postun" => script(tokens, ScriptKind::PostUn),
        "%verify" => script(tokens, ScriptKind::Verify),
        "%triggerin" | "%triggerun" | "%triggerpostun" => {
            let kind = trigger_kind_for(keyword).expect("matched above");
            let (prog, subject) = parse_trigger_line(rest, path, line_no)?;
            SectionDirective::Trigger { kind, prog, subject }
        }
        _ => return Ok(None),
    };
    Ok(Some(directive))
}

fn script(tokens: Vec<&str>, kind: ScriptKind) -> SectionDirective {
    let (name, prog, _) = split_name_and_prog(tokens);
    SectionDirective::Script { kind, name, prog }
}

/// Resolves a directive's optional subpackage name to a package index,
/// creating the subpackage if this is its first mention.
/// `main_name` is `packages[0].name`; per spec.md, `%package NAME`
/// creates `main-NAME` unless the `-n` flag was given, in which case
/// the name is used verbatim.
pub fn resolve_package_index(
    packages: &mut Vec<Package>,
    main_name: &str,
    name: Option<&str>,
    explicit_n: bool,
) -> usize {
    let Some(raw) = name else { return 0 };
    let full_name = if explicit_n { raw.to_string() } else { format!("{main_name}-{raw}") };
    if let Some(pos) = packages.iter().position(|p| p.name == full_name) {
        return pos;
    }
    packages.push(Package::new(full_name));
    packages.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_plain_sections() {
        assert!(matches!(parse("%prep", "s", 1).unwrap(), Some(SectionDirective::Prep)));
        assert!(matches!(parse("%changelog", "s", 1).unwrap(), Some(SectionDirective::Changelog)));
    }

    #[test]
    fn package_directive_captures_name_and_n_flag() {
        match parse("%package -n foo-utils", "s", 1).unwrap() {
            Some(SectionDirective::Package { name, explicit_n }) => {
                assert_eq!(name.as_deref(), Some("foo-utils"));
                assert!(explicit_n);
            }
            _ => panic!("expected Package directive"),
        }
    }

    #[test]
    fn files_directive_without_name_targets_main() {
        match parse("%files", "s", 1).unwrap() {
            Some(SectionDirective::Files { name }) => assert!(name.is_none()),
            _ => panic!("expected Files directive"),
        }
    }

    #[test]
    fn script_directive_captures_interpreter() {
        match parse("%post -p /bin/sh", "s", 1).unwrap() {
            Some(SectionDirective::Script { kind, prog, .. }) => {
                assert_eq!(kind, ScriptKind::PostIn);
                assert_eq!(prog.as_deref(), Some("/bin/sh"));
            }
            _ => panic!("expected Script directive"),
        }
    }

    #[test]
    fn non_directive_line_is_none() {
        assert!(parse("plain text", "s", 1).unwrap().is_none());
    }

    #[test]
    fn resolve_package_index_creates_and_reenters() {
        let mut packages = vec![Package::new("main")];
        let i1 = resolve_package_index(&mut packages, "main", Some("utils"), false);
        assert_eq!(packages[i1].name, "main-utils");
        let i2 = resolve_package_index(&mut packages, "main", Some("utils"), false);
        assert_eq!(i1, i2);
        assert_eq!(packages.len(), 2);
    }
}
