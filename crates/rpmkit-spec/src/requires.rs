//! Parsing for `Requires:`/`Provides:`/`Conflicts:`/`Obsoletes:`
//! dependency lists (spec.md §4.D "Requires flags parsing").

use crate::error::SpecError;
use crate::model::{DependencyEntry, DependencyOp};

fn parse_op(token: &str) -> Option<DependencyOp> {
    Some(match token {
        "<" | "lt" => DependencyOp::Lt,
        "<=" | "le" => DependencyOp::Le,
        "=" | "eq" => DependencyOp::Eq,
        ">=" | "ge" => DependencyOp::Ge,
        ">" | "gt" => DependencyOp::Gt,
        _ => return None,
    })
}

/// Parses a comma/space separated dependency list into one entry per
/// token, each optionally carrying a comparison operator and version.
pub fn parse_dependency_list(line: &str, path: &str, line_no: usize) -> Result<Vec<DependencyEntry>, SpecError> {
    let mut entries = Vec::new();
    for group in line.split(',') {
        let parts: Vec<&str> = group.split_whitespace().collect();
        match parts.as_slice() {
            [] => continue,
            [name] => entries.push(DependencyEntry { name: (*name).to_string(), op: None, version: None }),
            [name, op, version] => {
                let op = parse_op(op).ok_or_else(|| SpecError::BadSpec {
                    path: path.to_string(),
                    line: line_no,
                    reason: format!("unrecognized comparison operator: {op}"),
                })?;
                entries.push(DependencyEntry {
                    name: (*name).to_string(),
                    op: Some(op),
                    version: Some((*version).to_string()),
                });
            }
            _ => {
                return Err(SpecError::BadSpec {
                    path: path.to_string(),
                    line: line_no,
                    reason: format!("malformed dependency token: {group}"),
                })
            }
        }
    }
    Ok(entries)
}
