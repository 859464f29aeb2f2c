//! ELF64 section header parsing.

use crate::{ElfError, ElfResult};

/// Section header type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionType {
    Null,
    Progbits,
    Symtab,
    Strtab,
    Rela,
    Hash,
    Dynamic,
    Note,
    Nobits,
    Rel,
    Dynsym,
    Unknown(u32),
}

impl From<u32> for SectionType {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Null,
            1 => Self::Progbits,
            2 => Self::Symtab,
            3 => Self::Strtab,
            4 => Self::Rela,
            5 => Self::Hash,
            6 => Self::Dynamic,
            7 => Self::Note,
            8 => Self::Nobits,
            9 => Self::Rel,
            11 => Self::Dynsym,
            other => Self::Unknown(other),
        }
    }
}

/// Section header flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionFlags(pub u64);

impl SectionFlags {
    pub const SHF_ALLOC: u64 = 0x2;

    pub fn is_allocated(self) -> bool {
        self.0 & Self::SHF_ALLOC != 0
    }
}

/// An ELF64 section header plus its raw content.
#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    pub sh_type: SectionType,
    pub flags: SectionFlags,
    pub offset: u64,
    pub size: u64,
    pub content: Vec<u8>,
}

struct RawSectionHeader {
    sh_name: u32,
    sh_type: u32,
    sh_flags: u64,
    sh_offset: u64,
    sh_size: u64,
}

const RAW_SIZE: usize = 64;

impl RawSectionHeader {
    fn parse(data: &[u8]) -> ElfResult<Self> {
        if data.len() < RAW_SIZE {
            return Err(ElfError::BufferTooSmall {
                needed: RAW_SIZE,
                available: data.len(),
            });
        }
        Ok(Self {
            sh_name: u32::from_le_bytes(data[0..4].try_into().unwrap()),
            sh_type: u32::from_le_bytes(data[4..8].try_into().unwrap()),
            sh_flags: u64::from_le_bytes(data[8..16].try_into().unwrap()),
            sh_offset: u64::from_le_bytes(data[24..32].try_into().unwrap()),
            sh_size: u64::from_le_bytes(data[32..40].try_into().unwrap()),
        })
    }
}

fn str_at(strtab: &[u8], offset: u32) -> ElfResult<String> {
    let start = offset as usize;
    let end = strtab[start..]
        .iter()
        .position(|&b| b == 0)
        .map(|p| start + p)
        .ok_or(ElfError::InvalidStringIndex(offset))?;
    Ok(String::from_utf8_lossy(&strtab[start..end]).into_owned())
}

/// Parses every section header and resolves each section's name and
/// raw content against the file bytes.
pub fn parse_sections(file: &[u8], header: &crate::Elf64Header) -> ElfResult<Vec<Section>> {
    let table_start = header.e_shoff as usize;
    let entsize = header.e_shentsize as usize;
    let count = header.e_shnum as usize;

    let mut raws = Vec::with_capacity(count);
    for i in 0..count {
        let start = table_start + i * entsize;
        let end = start + entsize;
        let slice = file.get(start..end).ok_or(ElfError::InvalidOffset {
            kind: "section header",
            offset: start as u64,
        })?;
        raws.push(RawSectionHeader::parse(slice)?);
    }

    let shstrtab_idx = header.e_shstrndx as usize;
    let shstrtab_raw = raws
        .get(shstrtab_idx)
        .ok_or(ElfError::InvalidOffset { kind: "shstrtab index", offset: shstrtab_idx as u64 })?;
    let shstrtab = file
        .get(shstrtab_raw.sh_offset as usize..(shstrtab_raw.sh_offset + shstrtab_raw.sh_size) as usize)
        .ok_or(ElfError::InvalidOffset { kind: "shstrtab", offset: shstrtab_raw.sh_offset })?;

    let mut sections = Vec::with_capacity(count);
    for raw in &raws {
        let name = str_at(shstrtab, raw.sh_name)?;
        let content = if SectionType::from(raw.sh_type) == SectionType::Nobits {
            Vec::new()
        } else {
            file.get(raw.sh_offset as usize..(raw.sh_offset + raw.sh_size) as usize)
                .ok_or(ElfError::InvalidOffset { kind: "section content", offset: raw.sh_offset })?
                .to_vec()
        };
        sections.push(Section {
            name,
            sh_type: SectionType::from(raw.sh_type),
            flags: SectionFlags(raw.sh_flags),
            offset: raw.sh_offset,
            size: raw.sh_size,
            content,
        });
    }
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_flags_detect_alloc() {
        assert!(SectionFlags(0x2).is_allocated());
        assert!(!SectionFlags(0x1).is_allocated());
    }

    #[test]
    fn type_from_code_maps_known_values() {
        assert_eq!(SectionType::from(1), SectionType::Progbits);
        assert_eq!(SectionType::from(999), SectionType::Unknown(999));
    }
}
