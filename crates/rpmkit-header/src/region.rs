//! Immutable region framing (`reload`).
//!
//! `spec.md` describes the region marker only loosely: "a special index
//! entry with tag=HeaderImmutable..., payload that is itself a negated
//! index entry pointing at the region's trailing end." This is one of
//! the spec's flagged open questions (§9); the concrete convention we
//! settled on, recorded in `DESIGN.md`, is:
//!
//! - The region tag's own `TagEntry` carries a 16-byte `Bin` payload.
//! - That payload is itself an encoded index entry `{ tag, type=Bin,
//!   offset, count=16 }`, where `offset` is the *negative* (two's
//!   complement, as `i32`) total byte span the region covers in the
//!   data store, including the region entry's own 16 bytes.
//! - The region entry is always placed first in serialization order, at
//!   store offset 0, so the trailer's negated span doubles as a
//!   verifiable back-pointer to where the region started.
//!
//! Re-running `reload` on an already-reloaded header is a fixpoint:
//! the existing region entry is discarded and rebuilt from the same
//! (deterministically sorted) remaining entries, reproducing identical
//! bytes.

use crate::entry::{TagEntry, TagValue};
use crate::error::HeaderError;
use crate::tag::TagType;
use crate::wire;

const TRAILER_SIZE: u32 = 16;

/// Builds the region marker entry for `region_tag` covering `rest`
/// (already sorted into the order they will serialize in, *not*
/// including the region tag itself).
///
/// Returns `(region_entry, ordered_rest)` where `ordered_rest` is
/// `rest` unchanged — returned for symmetry with [`parse_trailer`]'s
/// signature expectations at call sites.
pub fn build(region_tag: u32, rest: &[TagEntry]) -> TagEntry {
    // rest's own index+store bytes, plus the marker's index entry (16)
    // and its own 16-byte store payload.
    let rest_index_and_store = wire::size_of(rest, false) - 8;
    let total_span = 2 * TRAILER_SIZE + rest_index_and_store as u32;

    let mut payload = Vec::with_capacity(16);
    payload.extend_from_slice(&region_tag.to_be_bytes());
    payload.extend_from_slice(&TagType::Bin.code().to_be_bytes());
    payload.extend_from_slice(&(total_span as i32).wrapping_neg().to_be_bytes());
    payload.extend_from_slice(&TRAILER_SIZE.to_be_bytes());

    TagEntry::new(region_tag, TagValue::Bin(payload))
}

/// Decodes a region marker's trailer payload back into
/// `(tag, type_code, negated_offset, count)`.
pub fn parse_trailer(entry: &TagEntry) -> Result<(u32, u32, i32, u32), HeaderError> {
    let TagValue::Bin(payload) = &entry.value else {
        return Err(HeaderError::BadData("region marker is not Bin-typed".into()));
    };
    if payload.len() != TRAILER_SIZE as usize {
        return Err(HeaderError::BadData(format!(
            "region trailer must be {TRAILER_SIZE} bytes, got {}",
            payload.len()
        )));
    }
    let tag = u32::from_be_bytes(payload[0..4].try_into().unwrap());
    let type_code = u32::from_be_bytes(payload[4..8].try_into().unwrap());
    let offset = i32::from_be_bytes(payload[8..12].try_into().unwrap());
    let count = u32::from_be_bytes(payload[12..16].try_into().unwrap());
    Ok((tag, type_code, offset, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailer_round_trips() {
        let rest = vec![TagEntry::new(1000, TagValue::Str("x".into()))];
        let region = build(63, &rest);
        let (tag, type_code, offset, count) = parse_trailer(&region).unwrap();
        assert_eq!(tag, 63);
        assert_eq!(type_code, TagType::Bin.code());
        assert!(offset < 0);
        assert_eq!(count, 16);
    }

    #[test]
    fn rejects_wrong_length_payload() {
        let bad = TagEntry::new(63, TagValue::Bin(vec![0; 4]));
        assert!(parse_trailer(&bad).is_err());
    }
}
