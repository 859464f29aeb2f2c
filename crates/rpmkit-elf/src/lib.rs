//! ELF64 introspection: section iteration, debug-section stripping and
//! dynamic-symbol enumeration.
//!
//! This crate is read-only introspection, adapted from the teacher's
//! ELF parsing (header/section byte layout) but scoped down to what
//! the package writer needs — there is no loader, relocator, or
//! execution path here, since the build core never runs the objects
//! it packages.

mod error;
mod header;
mod section;
mod symbol;

pub use error::{ElfError, ElfResult};
pub use header::{Elf64Header, ElfClass, ElfData, ElfType};
pub use section::{Section, SectionFlags, SectionType};
pub use symbol::{exported_symbols, parse_dynsym, DynamicSymbol, SymbolBinding};

/// The external-collaborator contract the build core depends on: a
/// source of section name/flags/content triples. Implemented here by
/// [`ElfFile`]; a caller may substitute a mock for testing without
/// linking this crate's byte-level parser.
pub trait SectionIterator {
    fn sections(&self) -> ElfResult<Vec<Section>>;
}

/// A parsed ELF64 object: the file header plus its section table.
pub struct ElfFile<'a> {
    data: &'a [u8],
    header: Elf64Header,
}

impl<'a> ElfFile<'a> {
    pub fn parse(data: &'a [u8]) -> ElfResult<Self> {
        let header = Elf64Header::parse(data)?;
        Ok(Self { data, header })
    }

    pub fn header(&self) -> &Elf64Header {
        &self.header
    }

    /// Finds a section by exact name.
    pub fn section(&self, name: &str) -> ElfResult<Option<Section>> {
        Ok(self.sections()?.into_iter().find(|s| s.name == name))
    }

    /// Parses `.dynsym`/`.dynstr` into the dynamic symbol table, if
    /// both sections are present.
    pub fn dynamic_symbols(&self) -> ElfResult<Vec<DynamicSymbol>> {
        let dynsym = self.section(".dynsym")?;
        let dynstr = self.section(".dynstr")?;
        match (dynsym, dynstr) {
            (Some(sym), Some(str_tab)) => parse_dynsym(&sym.content, &str_tab.content),
            _ => Ok(Vec::new()),
        }
    }
}

impl<'a> SectionIterator for ElfFile<'a> {
    fn sections(&self) -> ElfResult<Vec<Section>> {
        section::parse_sections(self.data, &self.header)
    }
}

const DEBUG_SECTION_PREFIXES: &[&str] = &[".debug_", ".symtab", ".strtab", ".comment"];

/// Names of the sections [`strip_debug_sections`] would remove from an
/// object's section table, without mutating the file bytes — the
/// actual byte-level rewrite happens when cpio-packaging the stripped
/// copy, not here.
pub fn debug_section_names(sections: &[Section]) -> Vec<String> {
    sections
        .iter()
        .filter(|s| DEBUG_SECTION_PREFIXES.iter().any(|p| s.name.starts_with(p)))
        .map(|s| s.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(name: &str, sh_type: SectionType) -> Section {
        Section {
            name: name.to_string(),
            sh_type,
            flags: SectionFlags(0),
            offset: 0,
            size: 0,
            content: Vec::new(),
        }
    }

    #[test]
    fn identifies_debug_sections_by_prefix() {
        let sections = vec![
            section(".text", SectionType::Progbits),
            section(".debug_info", SectionType::Progbits),
            section(".symtab", SectionType::Symtab),
        ];
        let debug = debug_section_names(&sections);
        assert_eq!(debug, vec![".debug_info".to_string(), ".symtab".to_string()]);
    }
}
