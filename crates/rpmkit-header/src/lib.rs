//! Ordered, tag-indexed binary header container used for both the
//! package metadata header and the signature header.
//!
//! Grounded on `lib/header.h` / `lib/hdrproto.h`: the public operation
//! set (`put`/`append`/`append_or_add`/`get`/`remove`/`iterate`/
//! `sort`/`unsort`/`unload`/`load`/`reload`/`copy`/`copy_tags`) mirrors
//! `headerAddEntry`/`headerAppendEntry`/`headerAddOrAppendEntry`/
//! `headerGetEntry`/`headerRemoveEntry`/`headerNextIterator`/
//! `headerSort`/`headerUnsort`/`headerUnload`/`headerLoad`/
//! `headerReload`/`headerCopy`/`headerCopyTags`, with the C `void *`
//! plus explicit type/count triple replaced by a tagged [`TagValue`]
//! decoded once at the `load` boundary.

mod entry;
mod error;
mod header;
mod locale;
mod region;
mod tag;
mod wire;

pub use entry::{TagEntry, TagValue};
pub use error::HeaderError;
pub use header::Header;
pub use locale::{preferred_locales, select as select_locale, set_preferred_locales};
pub use tag::{tags, TagType};
pub use wire::HEADER_MAGIC;
