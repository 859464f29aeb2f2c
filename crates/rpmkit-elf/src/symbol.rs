//! Dynamic symbol table enumeration, used to derive automatic
//! shared-library `Provides` entries from a built `.so`.

use crate::{ElfError, ElfResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolBinding {
    Local,
    Global,
    Weak,
    Unknown(u8),
}

impl From<u8> for SymbolBinding {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Local,
            1 => Self::Global,
            2 => Self::Weak,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DynamicSymbol {
    pub name: String,
    pub binding: SymbolBinding,
    pub defined: bool,
}

const SYMBOL_ENTRY_SIZE: usize = 24;

/// Parses a `.dynsym` section's fixed-width entries against its
/// companion `.dynstr` content.
pub fn parse_dynsym(dynsym: &[u8], dynstr: &[u8]) -> ElfResult<Vec<DynamicSymbol>> {
    if dynsym.len() % SYMBOL_ENTRY_SIZE != 0 {
        return Err(ElfError::BufferTooSmall {
            needed: SYMBOL_ENTRY_SIZE,
            available: dynsym.len() % SYMBOL_ENTRY_SIZE,
        });
    }

    let mut symbols = Vec::new();
    for entry in dynsym.chunks_exact(SYMBOL_ENTRY_SIZE) {
        let st_name = u32::from_le_bytes(entry[0..4].try_into().unwrap());
        let st_info = entry[4];
        let st_shndx = u16::from_le_bytes(entry[6..8].try_into().unwrap());

        if st_name == 0 {
            continue;
        }
        let start = st_name as usize;
        let end = dynstr[start..]
            .iter()
            .position(|&b| b == 0)
            .map(|p| start + p)
            .ok_or(ElfError::InvalidStringIndex(st_name))?;
        let name = String::from_utf8_lossy(&dynstr[start..end]).into_owned();

        symbols.push(DynamicSymbol {
            name,
            binding: SymbolBinding::from(st_info >> 4),
            defined: st_shndx != 0,
        });
    }
    Ok(symbols)
}

/// Filters to the globally-visible, defined symbols a consumer of this
/// shared library could actually bind against.
pub fn exported_symbols(symbols: &[DynamicSymbol]) -> Vec<&str> {
    symbols
        .iter()
        .filter(|s| s.defined && matches!(s.binding, SymbolBinding::Global | SymbolBinding::Weak))
        .map(|s| s.name.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name_off: u32, info: u8, shndx: u16) -> [u8; SYMBOL_ENTRY_SIZE] {
        let mut e = [0u8; SYMBOL_ENTRY_SIZE];
        e[0..4].copy_from_slice(&name_off.to_le_bytes());
        e[4] = info;
        e[6..8].copy_from_slice(&shndx.to_le_bytes());
        e
    }

    #[test]
    fn parses_global_defined_symbol() {
        let dynstr = b"\0foo\0";
        let dynsym = entry(1, 1 << 4, 3);
        let symbols = parse_dynsym(&dynsym, dynstr).unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "foo");
        assert!(symbols[0].defined);
        assert_eq!(exported_symbols(&symbols), vec!["foo"]);
    }

    #[test]
    fn undefined_symbols_are_excluded_from_exports() {
        let dynstr = b"\0bar\0";
        let dynsym = entry(1, 1 << 4, 0);
        let symbols = parse_dynsym(&dynsym, dynstr).unwrap();
        assert!(exported_symbols(&symbols).is_empty());
    }
}
