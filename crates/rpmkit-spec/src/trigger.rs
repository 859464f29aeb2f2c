//! `%triggerin`/`%triggerun`/`%triggerpostun` directive-line parsing
//! (spec.md §4.D). Body collection follows the same pattern as
//! `%pre`/`%post` script bodies and is handled by the section dispatch.

use crate::error::SpecError;
use crate::model::TriggerKind;
use crate::requires::parse_dependency_list;

pub fn trigger_kind_for(directive: &str) -> Option<TriggerKind> {
    match directive {
        "%triggerin" => Some(TriggerKind::In),
        "%triggerun" => Some(TriggerKind::Un),
        "%triggerpostun" => Some(TriggerKind::PostUn),
        _ => None,
    }
}

/// Parses the remainder of a trigger directive line: an optional
/// `-p PROG` interpreter override, an optional `--` separator, and the
/// dependency subject the trigger fires on.
pub fn parse_trigger_line(
    rest: &str,
    path: &str,
    line_no: usize,
) -> Result<(Option<String>, crate::model::DependencyEntry), SpecError> {
    let mut tokens: Vec<&str> = rest.split_whitespace().collect();
    let mut prog = None;

    if tokens.first() == Some(&"-p") {
        tokens.remove(0);
        if tokens.is_empty() {
            return Err(SpecError::BadSpec {
                path: path.to_string(),
                line: line_no,
                reason: "-p requires an interpreter path".to_string(),
            });
        }
        prog = Some(tokens.remove(0).to_string());
    }
    if tokens.first() == Some(&"--") {
        tokens.remove(0);
    }
    if tokens.is_empty() {
        return Err(SpecError::BadSpec {
            path: path.to_string(),
            line: line_no,
            reason: "trigger directive has no subject".to_string(),
        });
    }

    let subject_line = tokens.join(" ");
    let mut entries = parse_dependency_list(&subject_line, path, line_no)?;
    if entries.len() != 1 {
        return Err(SpecError::BadSpec {
            path: path.to_string(),
            line: line_no,
            reason: "trigger directive must name exactly one subject".to_string(),
        });
    }
    Ok((prog, entries.remove(0)))
}
