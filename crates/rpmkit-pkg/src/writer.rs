//! `writeRpm(kind, header, plan, signer)` (spec.md §4.F): header
//! finalization, temp-file payload streaming, signature computation,
//! and final Lead+SignatureHeader+payload framing.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use rpmkit_cpio::CpioEntry;
use rpmkit_header::{tags, Header, TagValue};
use rpmkit_sign::Signer;
use rpmkit_spec::PayloadPlan;
use rpmkit_strbuf::TempFile;

use crate::error::PkgError;
use crate::lead::{Lead, PackageKind};
use crate::signature;

/// The two payload compressors spec.md §4.F allows (`_binary_payload`
/// / `_source_payload` macro selection lives in the orchestrator; this
/// crate only knows how to apply whichever one it's handed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compressor {
    Gzip,
    Bzip2,
}

impl Compressor {
    fn tag_name(self) -> &'static str {
        match self {
            Compressor::Gzip => "gzip",
            Compressor::Bzip2 => "bzip2",
        }
    }

    fn compress(self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        match self {
            Compressor::Gzip => {
                let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::new(9));
                encoder.write_all(data)?;
                encoder.finish()
            }
            Compressor::Bzip2 => {
                let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::new(9));
                encoder.write_all(data)?;
                encoder.finish()
            }
        }
    }
}

/// The identity and placement facts `writeRpm` needs beyond the header
/// and payload plan themselves: the Lead's name/arch/os fields and
/// which compressor to wrap the payload in.
pub struct WriteTarget<'a> {
    pub name_version_release: &'a str,
    pub archnum: u16,
    pub osnum: u16,
    pub compressor: Compressor,
    pub build_host: &'a str,
}

fn cpio_entries_for(plan: &PayloadPlan) -> Result<Vec<CpioEntry>, PkgError> {
    let mut entries = Vec::with_capacity(plan.entries.len());
    for file in &plan.entries {
        let data = if let Some(target) = &file.link_target {
            target.as_bytes().to_vec()
        } else {
            std::fs::read(&file.src_path).map_err(|e| PkgError::Cpio {
                member: file.src_path.clone(),
                reason: e.to_string(),
            })?
        };
        let mut entry = CpioEntry::new(file.archive_name.clone(), file.mode, data);
        entry.uid = file.uid;
        entry.gid = file.gid;
        entry.mtime = file.mtime;
        entries.push(entry);
    }
    Ok(entries)
}

fn self_provides(header: &Header) -> Option<String> {
    let name = match header.get(tags::NAME) {
        Some(TagValue::Str(s)) => s.clone(),
        _ => return None,
    };
    let version = match header.get(tags::VERSION) {
        Some(TagValue::Str(s)) => s.clone(),
        _ => return None,
    };
    let release = match header.get(tags::RELEASE) {
        Some(TagValue::Str(s)) => s.clone(),
        _ => return None,
    };
    let epoch = match header.get(tags::EPOCH) {
        Some(TagValue::Str(s)) => format!("{s}:"),
        _ => String::new(),
    };
    Some(format!("{name} = {epoch}{version}-{release}"))
}

fn finalize_header(header: &mut Header, kind: PackageKind, target: &WriteTarget) -> Result<(), PkgError> {
    let timestamp = chrono::Utc::now().timestamp();
    header.put(tags::RPM_VERSION, TagValue::Str("3.0.4".to_string()))?;
    header.put(tags::BUILD_HOST, TagValue::Str(target.build_host.to_string()))?;
    header.put(tags::BUILD_TIME, TagValue::U32(vec![timestamp as u32]))?;
    header.put(tags::PAYLOAD_FORMAT, TagValue::Str("cpio".to_string()))?;
    header.put(tags::PAYLOAD_COMPRESSOR, TagValue::Str(target.compressor.tag_name().to_string()))?;
    header.put(tags::PAYLOAD_FLAGS, TagValue::Str("9".to_string()))?;
    header.put(tags::COOKIE, TagValue::Str(format!("{} {timestamp}", target.build_host)))?;

    if kind == PackageKind::Binary {
        header.put(tags::SOURCE_RPM, TagValue::Str(format!("{}.src.rpm", target.name_version_release)))?;
        if let Some(provides) = self_provides(header) {
            header.append_or_add(tags::PROVIDE_NAME, TagValue::StrArray(vec![provides]))?;
        }
    }

    header.reload(tags::HEADER_IMMUTABLE)?;
    Ok(())
}

/// Implements the package writer's `writeRpm` contract end to end.
/// `signer` is consulted only if the header's signature policy calls
/// for an asymmetric signature; pass `None` for digest-only packages.
pub fn write_rpm(
    kind: PackageKind,
    header: &mut Header,
    plan: &PayloadPlan,
    target: &WriteTarget,
    signer: Option<&dyn Signer>,
    out_path: &Path,
) -> Result<(), PkgError> {
    finalize_header(header, kind, target)?;

    let cpio_entries = cpio_entries_for(plan)?;
    let uncompressed = rpmkit_cpio::encode(&cpio_entries);
    let archive_size = uncompressed.len() as u32;
    let compressed = target.compressor.compress(&uncompressed).map_err(PkgError::Create)?;

    header.put(tags::ARCHIVE_SIZE, TagValue::U32(vec![archive_size]))?;
    let header_bytes = header.unload(true);

    let mut temp = TempFile::new("rpmkit-pkg").map_err(|e| PkgError::Create(std::io::Error::other(e)))?;
    temp.as_file_mut().write_all(&header_bytes).map_err(PkgError::Create)?;
    temp.as_file_mut().write_all(&compressed).map_err(PkgError::Create)?;
    temp.as_file_mut().flush().map_err(PkgError::Create)?;

    temp.as_file_mut().seek(SeekFrom::Start(0)).map_err(PkgError::ReadIo)?;
    let mut whole_file_bytes = Vec::new();
    temp.as_file_mut().read_to_end(&mut whole_file_bytes).map_err(PkgError::ReadIo)?;

    let sig_header = signature::build(&header_bytes, &whole_file_bytes, signer)?;

    let lead = Lead::new(kind, target.name_version_release, target.archnum, target.osnum);
    let lead_bytes = lead.encode()?;
    let sig_bytes = sig_header.unload(true);

    let result = (|| -> Result<(), PkgError> {
        let mut out = std::fs::File::create(out_path).map_err(PkgError::Create)?;
        out.write_all(&lead_bytes).map_err(PkgError::Create)?;
        out.write_all(&sig_bytes).map_err(PkgError::Create)?;
        out.write_all(&whole_file_bytes).map_err(PkgError::Create)?;
        out.flush().map_err(PkgError::Create)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(out_path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpmkit_spec::PayloadPlanEntry;

    fn sample_header() -> Header {
        let mut header = Header::new();
        header.put(tags::NAME, TagValue::Str("hello".to_string())).unwrap();
        header.put(tags::VERSION, TagValue::Str("1.0".to_string())).unwrap();
        header.put(tags::RELEASE, TagValue::Str("1".to_string())).unwrap();
        header
    }

    fn sample_target() -> WriteTarget<'static> {
        WriteTarget {
            name_version_release: "hello-1.0-1",
            archnum: 1,
            osnum: 1,
            compressor: Compressor::Gzip,
            build_host: "build.example.com",
        }
    }

    #[test]
    fn writes_a_package_file_with_valid_lead() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("hello");
        std::fs::write(&src, b"hi").unwrap();

        let plan = PayloadPlan {
            entries: vec![PayloadPlanEntry {
                src_path: src.to_string_lossy().into_owned(),
                archive_name: "/usr/bin/hello".to_string(),
                mode: 0o100755,
                uid: 0,
                gid: 0,
                mtime: 0,
                size: 2,
                link_target: None,
                flags: 0,
            }],
        };

        let mut header = sample_header();
        let out_path = dir.path().join("hello-1.0-1.rpm");
        write_rpm(PackageKind::Binary, &mut header, &plan, &sample_target(), None, &out_path).unwrap();

        let bytes = std::fs::read(&out_path).unwrap();
        assert!(bytes.len() > crate::lead::LEAD_SIZE);
        let lead = Lead::decode(&bytes).unwrap();
        assert_eq!(lead.name, "hello-1.0-1");
        assert_eq!(lead.kind, PackageKind::Binary);
    }

    #[test]
    fn finalized_header_carries_self_provides_for_binary() {
        let mut header = sample_header();
        finalize_header(&mut header, PackageKind::Binary, &sample_target()).unwrap();
        match header.get(tags::PROVIDE_NAME) {
            Some(TagValue::StrArray(names)) => assert_eq!(names[0], "hello = 1.0-1"),
            other => panic!("unexpected provides entry: {other:?}"),
        }
        assert!(header.is_entry(tags::SOURCE_RPM));
    }

    #[test]
    fn source_packages_get_no_self_provides_or_source_rpm() {
        let mut header = sample_header();
        finalize_header(&mut header, PackageKind::Source, &sample_target()).unwrap();
        assert!(!header.is_entry(tags::SOURCE_RPM));
        assert!(!header.is_entry(tags::PROVIDE_NAME));
    }

    #[test]
    fn cleans_up_output_on_create_failure() {
        let dir = tempfile::tempdir().unwrap();
        let plan = PayloadPlan::default();
        let mut header = sample_header();
        let bad_path = dir.path().join("does-not-exist").join("out.rpm");
        let result = write_rpm(PackageKind::Binary, &mut header, &plan, &sample_target(), None, &bad_path);
        assert!(result.is_err());
        assert!(!bad_path.exists());
    }
}
