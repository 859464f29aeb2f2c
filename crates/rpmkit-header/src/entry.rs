//! [`TagValue`]: a tagged sum type decoded from the on-disk
//! type+count+bytes triple at the `load` boundary only, per the design
//! notes — callers never see raw pointers into the header store.

use crate::tag::TagType;

/// The decoded value(s) held by a [`TagEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Null,
    Char(Vec<u8>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    Str(String),
    Bin(Vec<u8>),
    StrArray(Vec<String>),
    /// Parallel with the values in the `I18NTable` tag; index 0 is
    /// always the `C` locale string.
    I18nStrArray(Vec<String>),
}

impl TagValue {
    /// The [`TagType`] this value was (or will be) stored as.
    pub fn tag_type(&self) -> TagType {
        match self {
            Self::Null => TagType::Null,
            Self::Char(_) => TagType::Char,
            Self::U8(_) => TagType::U8,
            Self::U16(_) => TagType::U16,
            Self::U32(_) => TagType::U32,
            Self::U64(_) => TagType::U64,
            Self::Str(_) => TagType::Str,
            Self::Bin(_) => TagType::Bin,
            Self::StrArray(_) => TagType::StrArray,
            Self::I18nStrArray(_) => TagType::I18nStrArray,
        }
    }

    /// The element count this value serializes to (`1` for `Str`).
    pub fn count(&self) -> u32 {
        (match self {
            Self::Null => 0,
            Self::Char(v) | Self::U8(v) | Self::Bin(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
            Self::Str(_) => 1,
            Self::StrArray(v) | Self::I18nStrArray(v) => v.len(),
        }) as u32
    }

    /// `true` if this is one of the array-compatible types that
    /// [`crate::Header::append`] may extend.
    pub fn is_array_compatible_with(&self, other: &TagValue) -> bool {
        use TagValue::*;
        matches!(
            (self, other),
            (U8(_), U8(_))
                | (Char(_), Char(_))
                | (U16(_), U16(_))
                | (U32(_), U32(_))
                | (U64(_), U64(_))
                | (Bin(_), Bin(_))
                | (StrArray(_), StrArray(_))
                | (I18nStrArray(_), I18nStrArray(_))
                | (Str(_), StrArray(_))
        )
    }
}

/// A single tag→value binding stored in a [`crate::Header`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub tag: u32,
    pub value: TagValue,
}

impl TagEntry {
    pub fn new(tag: u32, value: TagValue) -> Self {
        Self { tag, value }
    }

    pub fn tag_type(&self) -> TagType {
        self.value.tag_type()
    }

    pub fn count(&self) -> u32 {
        self.value.count()
    }
}
