//! Preamble tag parsing (spec.md §4.D): `Name:`, `Version:`,
//! `Source[N]:`, `Requires[(FLAGS)]:`, and the rest of the single-value
//! and dependency-list tags a package preamble carries.

use rpmkit_header::{tags, Header, TagValue};

use crate::error::SpecError;
use crate::model::{DependencyEntry, DependencyOp, Source, SourceFlags};
use crate::requires::parse_dependency_list;

/// Sense-comparison bits (`RPMSENSE_LESS`/`RPMSENSE_GREATER`/`RPMSENSE_EQUAL`)
/// ORed into `*Flags` arrays alongside the matching `*Name`/`*Version` entry.
const SENSE_LESS: u32 = 0x02;
const SENSE_GREATER: u32 = 0x04;
const SENSE_EQUAL: u32 = 0x08;

fn sense_flags(op: Option<DependencyOp>) -> u32 {
    match op {
        None => 0,
        Some(DependencyOp::Lt) => SENSE_LESS,
        Some(DependencyOp::Le) => SENSE_LESS | SENSE_EQUAL,
        Some(DependencyOp::Eq) => SENSE_EQUAL,
        Some(DependencyOp::Ge) => SENSE_GREATER | SENSE_EQUAL,
        Some(DependencyOp::Gt) => SENSE_GREATER,
    }
}

/// Maps a `*Name` tag to its parallel `*Flags`/`*Version` tags. `None`
/// for the bare arch/os exclusion lists, which carry no comparison.
fn flags_and_version_tags(name_tag: u32) -> Option<(u32, u32)> {
    Some(match name_tag {
        tags::REQUIRE_NAME => (tags::REQUIRE_FLAGS, tags::REQUIRE_VERSION),
        tags::PROVIDE_NAME => (tags::PROVIDE_FLAGS, tags::PROVIDE_VERSION),
        tags::CONFLICT_NAME => (tags::CONFLICT_FLAGS, tags::CONFLICT_VERSION),
        tags::OBSOLETE_NAME => (tags::OBSOLETE_FLAGS, tags::OBSOLETE_VERSION),
        _ => return None,
    })
}

/// Outcome of attempting to interpret one `Name: value`-shaped line as
/// a preamble tag.
pub enum PreambleEffect {
    /// A single string tag was (or should be) stored under `tag`.
    SingleString { tag: u32 },
    /// A `Source:`/`Patch:`/`Icon:` entry was produced.
    Source(Source),
    /// A dependency list tag (`Requires`/`Provides`/`Conflicts`/`Obsoletes`/`BuildRequires`).
    DependencyList { name_tag: u32, entries: Vec<DependencyEntry> },
    /// `AutoReq`/`AutoProv`/`AutoReqProv: no|yes`.
    AutoReqProv(bool),
    /// `NoSource:`/`NoPatch:`.
    NoSource,
    /// Not a recognized preamble tag.
    Unrecognized,
}

fn single_string_tag(name: &str) -> Option<u32> {
    Some(match name {
        "name" => tags::NAME,
        "version" => tags::VERSION,
        "release" => tags::RELEASE,
        "epoch" | "serial" => tags::EPOCH,
        "summary" => tags::SUMMARY,
        "group" => tags::GROUP,
        "license" | "copyright" => tags::LICENSE,
        "url" => tags::URL,
        "vendor" => tags::VENDOR,
        "distribution" => tags::DISTRIBUTION,
        "packager" => tags::PACKAGER,
        "prefix" | "prefixes" => tags::PREFIXES,
        "buildarch" => tags::BUILD_ARCHS,
        _ => return None,
    })
}

fn dependency_list_tag(name: &str) -> Option<u32> {
    Some(match name {
        "requires" => tags::REQUIRE_NAME,
        "provides" => tags::PROVIDE_NAME,
        "conflicts" => tags::CONFLICT_NAME,
        "obsoletes" => tags::OBSOLETE_NAME,
        "buildrequires" => tags::REQUIRE_NAME,
        "excludearch" => tags::EXCLUDE_ARCH,
        "exclusivearch" => tags::EXCLUSIVE_ARCH,
        "excludeos" => tags::EXCLUDE_OS,
        "exclusiveos" => tags::EXCLUSIVE_OS,
        _ => return None,
    })
}

/// Parses `line` (already macro-expanded, not yet split) as a
/// `Tag: value` preamble entry. `raw_tag` is the text before the first
/// `:`, lowercased by the caller for matching; `value` is the trimmed
/// text after it.
pub fn classify(raw_tag: &str, value: &str) -> PreambleEffect {
    let lower = raw_tag.to_ascii_lowercase();

    if lower == "autoreqprov" || lower == "autoreq" || lower == "autoprov" {
        return PreambleEffect::AutoReqProv(matches!(value.to_ascii_lowercase().as_str(), "yes" | "y" | "1" | "on"));
    }
    if lower == "nosource" || lower == "nopatch" {
        return PreambleEffect::NoSource;
    }
    if let Some(rest) = lower.strip_prefix("source") {
        return PreambleEffect::Source(make_source(rest, value, SourceFlags::IS_SOURCE));
    }
    if let Some(rest) = lower.strip_prefix("patch") {
        return PreambleEffect::Source(make_source(rest, value, SourceFlags::IS_PATCH));
    }
    if lower == "icon" {
        return PreambleEffect::Source(make_source("", value, SourceFlags::IS_ICON));
    }
    if let Some(tag) = single_string_tag(&lower) {
        return PreambleEffect::SingleString { tag };
    }
    // `Requires(FLAGS):` carries scriptlet-scope flags we don't model
    // separately; treat as a plain Requires for dependency purposes.
    let base = lower.split('(').next().unwrap_or(&lower);
    if let Some(tag) = dependency_list_tag(base) {
        match parse_dependency_list(value, "", 0) {
            Ok(entries) => return PreambleEffect::DependencyList { name_tag: tag, entries },
            Err(_) => return PreambleEffect::Unrecognized,
        }
    }
    PreambleEffect::Unrecognized
}

fn make_source(index_text: &str, value: &str, flag: SourceFlags) -> Source {
    let index: u32 = index_text.trim().parse().unwrap_or(0);
    let basename = value.rsplit('/').next().unwrap_or(value).to_string();
    Source { full_url: value.to_string(), basename, index, flags: flag }
}

/// Stores a single-string tag's value into `header`.
pub fn store_single_string(header: &mut Header, tag: u32, value: &str, path: &str, line_no: usize) -> Result<(), SpecError> {
    header.put(tag, TagValue::Str(value.to_string())).map_err(|e| SpecError::BadSpec {
        path: path.to_string(),
        line: line_no,
        reason: format!("duplicate preamble tag: {e}"),
    })
}

/// Stores a dependency list into the header's parallel Name/Flags/Version arrays.
pub fn store_dependency_list(
    header: &mut Header,
    name_tag: u32,
    entries: &[DependencyEntry],
) -> Result<(), SpecError> {
    let to_spec_err = |e: rpmkit_header::HeaderError| SpecError::BadSpec { path: String::new(), line: 0, reason: e.to_string() };

    let names: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
    header.append_or_add(name_tag, TagValue::StrArray(names)).map_err(to_spec_err)?;

    if let Some((flags_tag, version_tag)) = flags_and_version_tags(name_tag) {
        let flags: Vec<u32> = entries.iter().map(|e| sense_flags(e.op)).collect();
        let versions: Vec<String> = entries.iter().map(|e| e.version.clone().unwrap_or_default()).collect();
        header.append_or_add(flags_tag, TagValue::U32(flags)).map_err(to_spec_err)?;
        header.append_or_add(version_tag, TagValue::StrArray(versions)).map_err(to_spec_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_name_tag() {
        match classify("Name", "hello") {
            PreambleEffect::SingleString { tag } => assert_eq!(tag, tags::NAME),
            _ => panic!("expected SingleString"),
        }
    }

    #[test]
    fn classifies_indexed_source() {
        match classify("Source0", "http://example.com/a.tar.gz") {
            PreambleEffect::Source(s) => {
                assert_eq!(s.index, 0);
                assert_eq!(s.basename, "a.tar.gz");
                assert!(s.flags.contains(SourceFlags::IS_SOURCE));
            }
            _ => panic!("expected Source"),
        }
    }

    #[test]
    fn classifies_requires_with_flags_suffix() {
        match classify("Requires(post)", "foo") {
            PreambleEffect::DependencyList { name_tag, entries } => {
                assert_eq!(name_tag, tags::REQUIRE_NAME);
                assert_eq!(entries[0].name, "foo");
            }
            _ => panic!("expected DependencyList"),
        }
    }

    #[test]
    fn unrecognized_tag_falls_through() {
        assert!(matches!(classify("Frobnicate", "x"), PreambleEffect::Unrecognized));
    }

    #[test]
    fn autoreqprov_parses_yes_no() {
        assert!(matches!(classify("AutoReqProv", "yes"), PreambleEffect::AutoReqProv(true)));
        assert!(matches!(classify("AutoReqProv", "no"), PreambleEffect::AutoReqProv(false)));
    }

    #[test]
    fn store_dependency_list_fills_parallel_flags_and_version_arrays() {
        let mut header = Header::new();
        let entries = vec![
            DependencyEntry { name: "foo".into(), op: None, version: None },
            DependencyEntry { name: "bar".into(), op: Some(DependencyOp::Ge), version: Some("2.0".into()) },
        ];
        store_dependency_list(&mut header, tags::REQUIRE_NAME, &entries).unwrap();

        assert_eq!(
            header.get(tags::REQUIRE_NAME),
            Some(TagValue::StrArray(vec!["foo".into(), "bar".into()]))
        );
        assert_eq!(header.get(tags::REQUIRE_FLAGS), Some(TagValue::U32(vec![0, SENSE_GREATER | SENSE_EQUAL])));
        assert_eq!(
            header.get(tags::REQUIRE_VERSION),
            Some(TagValue::StrArray(vec![String::new(), "2.0".into()]))
        );
    }

    #[test]
    fn store_dependency_list_skips_flags_for_arch_exclusion_lists() {
        let mut header = Header::new();
        let entries = vec![DependencyEntry { name: "s390".into(), op: None, version: None }];
        store_dependency_list(&mut header, tags::EXCLUDE_ARCH, &entries).unwrap();

        assert!(header.is_entry(tags::EXCLUDE_ARCH));
        assert!(!header.is_entry(tags::REQUIRE_FLAGS));
    }
}
