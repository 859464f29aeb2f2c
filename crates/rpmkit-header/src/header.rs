//! The tag-indexed header container itself.

use indexmap::IndexMap;

use crate::entry::{TagEntry, TagValue};
use crate::error::HeaderError;
use crate::locale;
use crate::region;
use crate::tag::tags;
use crate::wire;

/// An ordered, tag-indexed binary container.
///
/// Used for both the package metadata header and the signature header;
/// the two differ only in which tag namespace the caller populates.
///
/// Lookup is backed by an [`IndexMap`] for average O(1) access (the
/// spec's O(log n) is a minimum bound, not an exact-algorithm mandate).
/// Two separate orderings are tracked: `insertion_order`, which
/// `iterate` walks and which never changes except by `remove`, and
/// `order`, the current serialization order toggled by `sort`/`unsort`
/// and rebuilt wholesale by `reload`.
#[derive(Debug, Clone, Default)]
pub struct Header {
    entries: IndexMap<u32, TagEntry>,
    insertion_order: Vec<u32>,
    order: Vec<u32>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new tag. Fails if the tag already exists — use
    /// [`Header::append`] or [`Header::append_or_add`] to extend an
    /// existing array-typed entry.
    pub fn put(&mut self, tag: u32, value: TagValue) -> Result<(), HeaderError> {
        if self.entries.contains_key(&tag) {
            return Err(HeaderError::Existing(tag));
        }
        self.entries.insert(tag, TagEntry::new(tag, value));
        self.insertion_order.push(tag);
        self.order.push(tag);
        Ok(())
    }

    /// Extends an existing array-typed entry. Fails with
    /// [`HeaderError::BadType`] if the tag is absent or not
    /// array-compatible with `value`.
    pub fn append(&mut self, tag: u32, value: TagValue) -> Result<(), HeaderError> {
        let existing = self
            .entries
            .get_mut(&tag)
            .ok_or_else(|| HeaderError::BadType(format!("tag {tag} does not exist")))?;
        if !existing.value.is_array_compatible_with(&value) {
            return Err(HeaderError::BadType(format!(
                "tag {tag} is not array-compatible with the appended value"
            )));
        }
        merge(&mut existing.value, value)
    }

    /// Appends to `tag` if present and compatible, otherwise behaves
    /// like [`Header::put`].
    pub fn append_or_add(&mut self, tag: u32, value: TagValue) -> Result<(), HeaderError> {
        if self.entries.contains_key(&tag) {
            self.append(tag, value)
        } else {
            self.put(tag, value)
        }
    }

    /// Looks up `tag`, resolving an `I18nStrArray` entry to a single
    /// [`TagValue::Str`] via [`locale::select`] against the header's
    /// own `HEADER_I18NTABLE` (falling back to a bare `["C"]` table if
    /// none is present). Every other type is returned as stored.
    pub fn get(&self, tag: u32) -> Option<TagValue> {
        let value = &self.entries.get(&tag)?.value;
        let TagValue::I18nStrArray(values) = value else {
            return Some(value.clone());
        };
        let table = match self.entries.get(&tags::HEADER_I18NTABLE) {
            Some(TagEntry { value: TagValue::StrArray(t), .. }) => t.clone(),
            _ => vec!["C".to_string()],
        };
        let selected = locale::select(&table, values).unwrap_or_default().to_string();
        Some(TagValue::Str(selected))
    }

    /// Returns the raw [`TagEntry`], including its type code and count.
    pub fn get_raw(&self, tag: u32) -> Option<&TagEntry> {
        self.entries.get(&tag)
    }

    pub fn is_entry(&self, tag: u32) -> bool {
        self.entries.contains_key(&tag)
    }

    /// Removes `tag`, if present. Returns whether it was present.
    pub fn remove(&mut self, tag: u32) -> bool {
        let removed = self.entries.shift_remove(&tag).is_some();
        if removed {
            self.insertion_order.retain(|t| *t != tag);
            self.order.retain(|t| *t != tag);
        }
        removed
    }

    /// Walks entries in stable insertion order.
    pub fn iterate(&self) -> impl Iterator<Item = &TagEntry> {
        self.insertion_order.iter().filter_map(|tag| self.entries.get(tag))
    }

    /// Sorts the current serialization order by ascending tag number.
    pub fn sort(&mut self) {
        self.order.sort_unstable();
    }

    /// Restores the current serialization order to insertion order.
    pub fn unsort(&mut self) {
        self.order = self.insertion_order.clone();
    }

    fn ordered_entries(&self) -> Vec<TagEntry> {
        self.order.iter().filter_map(|tag| self.entries.get(tag).cloned()).collect()
    }

    /// Byte size this header would occupy if serialized now.
    pub fn size_of(&self, with_magic: bool) -> usize {
        wire::size_of(&self.ordered_entries(), with_magic)
    }

    /// Serializes the header to its canonical on-disk form (see the
    /// external interfaces for the exact byte layout).
    pub fn unload(&self, with_magic: bool) -> Vec<u8> {
        wire::encode(&self.ordered_entries(), with_magic)
    }

    /// Parses an on-disk header blob, auto-detecting the 8-byte magic
    /// prefix. The resulting header's insertion order is the physical
    /// order entries appeared on disk.
    pub fn load(bytes: &[u8]) -> Result<Self, HeaderError> {
        let entries = wire::decode(bytes)?;
        let mut header = Header::new();
        for entry in entries {
            header.insertion_order.push(entry.tag);
            header.order.push(entry.tag);
            header.entries.insert(entry.tag, entry);
        }
        Ok(header)
    }

    /// Rewrites the header so its current entries become a single
    /// immutable region tagged `region_tag`, replacing any existing
    /// region under that tag. Entries are sorted by ascending tag
    /// number within the region for deterministic framing; further
    /// `put`/`append` calls append outside the region.
    pub fn reload(&mut self, region_tag: u32) -> Result<(), HeaderError> {
        self.remove(region_tag);

        let mut rest_tags: Vec<u32> = self.insertion_order.clone();
        rest_tags.sort_unstable();
        let rest: Vec<TagEntry> = rest_tags
            .iter()
            .filter_map(|tag| self.entries.get(tag).cloned())
            .collect();

        let marker = region::build(region_tag, &rest);

        self.entries.clear();
        self.insertion_order.clear();
        self.order.clear();

        self.entries.insert(region_tag, marker);
        self.insertion_order.push(region_tag);
        self.order.push(region_tag);
        for entry in rest {
            let tag = entry.tag;
            self.entries.insert(tag, entry);
            self.insertion_order.push(tag);
            self.order.push(tag);
        }
        Ok(())
    }

    /// Deep-copies the header.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Copies the named tags from `self` into `dst`, overwriting any
    /// existing entries under those tags in `dst`.
    pub fn copy_tags(&self, dst: &mut Header, tags: &[u32]) {
        for &tag in tags {
            if let Some(entry) = self.entries.get(&tag) {
                dst.remove(tag);
                let value = entry.value.clone();
                // put() cannot fail here: we just removed any conflict.
                dst.put(tag, value).expect("tag removed immediately before insert");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn merge(existing: &mut TagValue, incoming: TagValue) -> Result<(), HeaderError> {
    use TagValue::*;
    match (existing, incoming) {
        (U8(a), U8(b)) | (Char(a), Char(b)) | (Bin(a), Bin(b)) => {
            a.extend(b);
            Ok(())
        }
        (U16(a), U16(b)) => {
            a.extend(b);
            Ok(())
        }
        (U32(a), U32(b)) => {
            a.extend(b);
            Ok(())
        }
        (U64(a), U64(b)) => {
            a.extend(b);
            Ok(())
        }
        (StrArray(a), StrArray(b)) | (I18nStrArray(a), I18nStrArray(b)) => {
            a.extend(b);
            Ok(())
        }
        (existing @ Str(_), StrArray(b)) => {
            let Str(s) = std::mem::replace(existing, Null) else {
                unreachable!()
            };
            let mut a = vec![s];
            a.extend(b);
            *existing = StrArray(a);
            Ok(())
        }
        _ => Err(HeaderError::BadData("incompatible types in append".into())),
    }
}
