//! On-disk codec for a header blob.
//!
//! `spec.md` draws the on-disk layout as `magic(8) + index(16·n) + store`;
//! that diagram elides the two length words a reader needs to know where
//! the index ends and how many data bytes follow, which the original
//! `rpm` header format carries as `il` (index length) and `dl` (data
//! length) immediately after the magic. We follow the original here
//! (`lib/hdrproto.h`'s `headerSizeof`/`headerLoad` imply exactly this
//! shape) since without it the blob is not self-describing:
//!
//! ```text
//! [ magic: 8 bytes, optional ]
//! [ il: u32 BE ]   number of index entries
//! [ dl: u32 BE ]   size in bytes of the data store
//! [ il * index entry: { tag: u32 BE, type: u32 BE, offset: u32 BE, count: u32 BE } ]
//! [ dl bytes of data store ]
//! ```

use crate::entry::{TagEntry, TagValue};
use crate::error::HeaderError;
use crate::tag::TagType;

/// The 8-byte magic prefix written when a header is serialized "with
/// magic" (the main package header and signature header both use it).
pub const HEADER_MAGIC: [u8; 8] = [0x8E, 0xAD, 0xE8, 0x01, 0x00, 0x00, 0x00, 0x00];

const INDEX_ENTRY_SIZE: usize = 16;

struct IndexEntry {
    tag: u32,
    type_code: u32,
    offset: u32,
    count: u32,
}

/// Packs `entries` (in the caller-supplied serialization order) into a
/// data store plus parallel index entries, applying each type's natural
/// alignment as padding within the store.
fn pack_store(entries: &[TagEntry]) -> (Vec<u8>, Vec<IndexEntry>) {
    let mut store = Vec::new();
    let mut index = Vec::with_capacity(entries.len());

    for entry in entries {
        let align = entry.tag_type().alignment();
        while store.len() % align != 0 {
            store.push(0);
        }
        let offset = store.len() as u32;
        write_value(&mut store, &entry.value);
        index.push(IndexEntry {
            tag: entry.tag,
            type_code: entry.tag_type().code(),
            offset,
            count: entry.count(),
        });
    }
    (store, index)
}

fn write_value(out: &mut Vec<u8>, value: &TagValue) {
    match value {
        TagValue::Null => {}
        TagValue::Char(v) | TagValue::U8(v) => out.extend_from_slice(v),
        TagValue::U16(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        TagValue::U32(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        TagValue::U64(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        TagValue::Bin(v) => out.extend_from_slice(v),
        TagValue::Str(s) => {
            out.extend_from_slice(s.as_bytes());
            out.push(0);
        }
        TagValue::StrArray(v) | TagValue::I18nStrArray(v) => {
            for s in v {
                out.extend_from_slice(s.as_bytes());
                out.push(0);
            }
        }
    }
}

fn read_value(type_code: u32, count: u32, bytes: &[u8]) -> Result<TagValue, HeaderError> {
    let ty = TagType::from_code(type_code)
        .ok_or_else(|| HeaderError::BadType(format!("unknown type code {type_code}")))?;
    let count = count as usize;

    Ok(match ty {
        TagType::Null => TagValue::Null,
        TagType::Char => TagValue::Char(take(bytes, count)?.to_vec()),
        TagType::U8 => TagValue::U8(take(bytes, count)?.to_vec()),
        TagType::U16 => TagValue::U16(read_be_u16(take(bytes, count * 2)?)),
        TagType::U32 => TagValue::U32(read_be_u32(take(bytes, count * 4)?)),
        TagType::U64 => TagValue::U64(read_be_u64(take(bytes, count * 8)?)),
        TagType::Bin => TagValue::Bin(take(bytes, count)?.to_vec()),
        TagType::Str => TagValue::Str(read_nul_string(bytes)?),
        TagType::StrArray => TagValue::StrArray(read_nul_strings(bytes, count)?),
        TagType::I18nStrArray => TagValue::I18nStrArray(read_nul_strings(bytes, count)?),
    })
}

fn take(bytes: &[u8], n: usize) -> Result<&[u8], HeaderError> {
    bytes
        .get(..n)
        .ok_or_else(|| HeaderError::BadData("store entry runs past end of buffer".into()))
}

fn read_be_u16(bytes: &[u8]) -> Vec<u16> {
    bytes.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect()
}
fn read_be_u32(bytes: &[u8]) -> Vec<u32> {
    bytes.chunks_exact(4).map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]])).collect()
}
fn read_be_u64(bytes: &[u8]) -> Vec<u64> {
    bytes
        .chunks_exact(8)
        .map(|c| u64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect()
}

fn read_nul_string(bytes: &[u8]) -> Result<String, HeaderError> {
    let end = bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| HeaderError::BadData("string is not NUL-terminated".into()))?;
    String::from_utf8(bytes[..end].to_vec())
        .map_err(|e| HeaderError::BadData(format!("string is not valid utf-8: {e}")))
}

fn read_nul_strings(mut bytes: &[u8], count: usize) -> Result<Vec<String>, HeaderError> {
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let end = bytes
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| HeaderError::BadData("string array entry is not NUL-terminated".into()))?;
        out.push(
            String::from_utf8(bytes[..end].to_vec())
                .map_err(|e| HeaderError::BadData(format!("string is not valid utf-8: {e}")))?,
        );
        bytes = &bytes[end + 1..];
    }
    Ok(out)
}

/// Serializes `entries` (in order) to an on-disk header blob.
pub fn encode(entries: &[TagEntry], with_magic: bool) -> Vec<u8> {
    let (store, index) = pack_store(entries);
    let mut out = Vec::with_capacity(
        (if with_magic { HEADER_MAGIC.len() } else { 0 }) + 8 + index.len() * INDEX_ENTRY_SIZE + store.len(),
    );
    if with_magic {
        out.extend_from_slice(&HEADER_MAGIC);
    }
    out.extend_from_slice(&(index.len() as u32).to_be_bytes());
    out.extend_from_slice(&(store.len() as u32).to_be_bytes());
    for e in &index {
        out.extend_from_slice(&e.tag.to_be_bytes());
        out.extend_from_slice(&e.type_code.to_be_bytes());
        out.extend_from_slice(&e.offset.to_be_bytes());
        out.extend_from_slice(&e.count.to_be_bytes());
    }
    out.extend_from_slice(&store);
    out
}

/// Parses an on-disk header blob, auto-detecting whether the 8-byte
/// magic prefix is present.
pub fn decode(bytes: &[u8]) -> Result<Vec<TagEntry>, HeaderError> {
    let (rest, had_magic) = if bytes.len() >= 8 && bytes[..8] == HEADER_MAGIC {
        (&bytes[8..], true)
    } else {
        (bytes, false)
    };
    let _ = had_magic;

    let il = u32::from_be_bytes(
        take(rest, 4)?.try_into().map_err(|_| HeaderError::BadData("truncated il".into()))?,
    ) as usize;
    let dl = u32::from_be_bytes(
        take(&rest[4..], 4)?
            .try_into()
            .map_err(|_| HeaderError::BadData("truncated dl".into()))?,
    ) as usize;

    let index_bytes = take(&rest[8..], il * INDEX_ENTRY_SIZE)?;
    let store = take(&rest[8 + il * INDEX_ENTRY_SIZE..], dl)?;

    let mut entries = Vec::with_capacity(il);
    for chunk in index_bytes.chunks_exact(INDEX_ENTRY_SIZE) {
        let tag = u32::from_be_bytes(chunk[0..4].try_into().unwrap());
        let type_code = u32::from_be_bytes(chunk[4..8].try_into().unwrap());
        let offset = u32::from_be_bytes(chunk[8..12].try_into().unwrap()) as usize;
        let count = u32::from_be_bytes(chunk[12..16].try_into().unwrap());

        let value = read_value(type_code, count, &store[offset..])?;
        entries.push(TagEntry::new(tag, value));
    }
    Ok(entries)
}

/// Byte size the header would occupy on disk if serialized now.
pub fn size_of(entries: &[TagEntry], with_magic: bool) -> usize {
    let (store, index) = pack_store(entries);
    (if with_magic { HEADER_MAGIC.len() } else { 0 }) + 8 + index.len() * INDEX_ENTRY_SIZE + store.len()
}
