//! Fixed 96-byte Lead preamble (spec.md §6).

use crate::error::PkgError;

pub const LEAD_SIZE: usize = 96;
pub const LEAD_MAGIC: [u8; 4] = [0xED, 0xAB, 0xEE, 0xDB];
const SIGNATURE_TYPE_HEADER_SIG: u16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    Binary = 0,
    Source = 1,
}

/// The legacy fixed-size record identifying a package file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lead {
    pub major: u8,
    pub minor: u8,
    pub kind: PackageKind,
    pub archnum: u16,
    pub name: String,
    pub osnum: u16,
}

impl Lead {
    pub fn new(kind: PackageKind, name_version_release: &str, archnum: u16, osnum: u16) -> Self {
        Self { major: 3, minor: 0, kind, archnum, name: name_version_release.to_string(), osnum }
    }

    pub fn encode(&self) -> Result<[u8; LEAD_SIZE], PkgError> {
        let name_bytes = self.name.as_bytes();
        if name_bytes.len() >= 66 {
            return Err(PkgError::BadFilename(self.name.clone()));
        }
        let mut buf = [0u8; LEAD_SIZE];
        buf[0..4].copy_from_slice(&LEAD_MAGIC);
        buf[4] = self.major;
        buf[5] = self.minor;
        buf[6..8].copy_from_slice(&(self.kind as u16).to_be_bytes());
        buf[8..10].copy_from_slice(&self.archnum.to_be_bytes());
        buf[10..10 + name_bytes.len()].copy_from_slice(name_bytes);
        buf[76..78].copy_from_slice(&self.osnum.to_be_bytes());
        buf[78..80].copy_from_slice(&SIGNATURE_TYPE_HEADER_SIG.to_be_bytes());
        Ok(buf)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PkgError> {
        if bytes.len() < LEAD_SIZE {
            return Err(PkgError::Read("lead truncated".to_string()));
        }
        if bytes[0..4] != LEAD_MAGIC {
            return Err(PkgError::BadMagic);
        }
        let kind = match u16::from_be_bytes([bytes[6], bytes[7]]) {
            0 => PackageKind::Binary,
            1 => PackageKind::Source,
            other => return Err(PkgError::Read(format!("unknown lead type {other}"))),
        };
        let archnum = u16::from_be_bytes([bytes[8], bytes[9]]);
        let name_end = bytes[10..76].iter().position(|&b| b == 0).map(|p| 10 + p).unwrap_or(76);
        let name = String::from_utf8_lossy(&bytes[10..name_end]).into_owned();
        let osnum = u16::from_be_bytes([bytes[76], bytes[77]]);
        Ok(Self { major: bytes[4], minor: bytes[5], kind, archnum, name, osnum })
    }
}
