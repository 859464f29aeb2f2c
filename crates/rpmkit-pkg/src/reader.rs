//! Reads a package file back into its Lead, SignatureHeader, and
//! Header pieces — the counterpart `writeRpm` needs for a round-trip
//! check (spec.md §8 property 4 via scenario S5), not a first-class
//! component of its own.

use rpmkit_header::Header;

use crate::error::PkgError;
use crate::lead::{Lead, LEAD_SIZE};

/// The parsed pieces of a package file.
pub struct ReadRpm {
    pub lead: Lead,
    pub signature: Header,
    pub header: Header,
    pub payload: Vec<u8>,
}

/// Parses `bytes` (a whole package file) back into its Lead,
/// SignatureHeader, main Header, and remaining compressed payload.
pub fn read_rpm(bytes: &[u8]) -> Result<ReadRpm, PkgError> {
    if bytes.len() < LEAD_SIZE {
        return Err(PkgError::Read("file shorter than the lead".to_string()));
    }
    let lead = Lead::decode(&bytes[..LEAD_SIZE])?;
    let rest = &bytes[LEAD_SIZE..];

    let signature = Header::load(rest)?;
    let sig_len = signature.size_of(true);
    let rest = rest.get(sig_len..).ok_or_else(|| PkgError::Read("truncated after signature header".to_string()))?;

    let header = Header::load(rest)?;
    let header_len = header.size_of(true);
    let payload = rest.get(header_len..).ok_or_else(|| PkgError::Read("truncated after header".to_string()))?.to_vec();

    Ok(ReadRpm { lead, signature, header, payload })
}
