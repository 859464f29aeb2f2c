//! Package writer: Lead and SignatureHeader framing, header
//! finalization, and the `writeRpm` contract that turns a finished
//! Header and payload plan into a runnable package file.

mod error;
mod lead;
mod reader;
mod signature;
mod writer;

pub use error::PkgError;
pub use lead::{Lead, PackageKind, LEAD_MAGIC, LEAD_SIZE};
pub use reader::{read_rpm, ReadRpm};
pub use signature::build as build_signature_header;
pub use writer::{write_rpm, Compressor, WriteTarget};
