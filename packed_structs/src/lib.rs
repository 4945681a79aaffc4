//! packed_structs: typed value trees packed into a single zero-decode byte
//! blob, plus the type descriptions a reader declares to access it.
//!
//! A document is described bottom-up with [`StructBuilder`]: scalars are
//! stored in place, strings, blobs and variable-length arrays are referenced
//! through byte offsets, bit fields share one word and bit field arrays pick
//! their field widths from the data. [`pack_document`] turns the finished
//! value into bytes, and [`collect_types`] gathers and deduplicates every type
//! the document uses so that matching declarations can be generated.
//!
//! ```rust
//! use packed_structs::prelude::*;
//!
//! let flags = BitFieldValue::with_bits("Flags", 8)?
//!     .add_flag("visible", true)?
//!     .add("layer", 5, 3)?;
//!
//! let root = StructBuilder::new("Document")?
//!     .add_int32("version", 3)?
//!     .add("flags", flags)?
//!     .add_string("title", Some("packed"), StringOptions::default())?
//!     .finalize()?;
//!
//! let bytes = pack_document(&root.into(), &PackOptions::default())?;
//! assert_eq!(&bytes[..4], &3i32.to_le_bytes());
//! assert_eq!(bytes[4], 0b1011);
//! assert_eq!(&bytes[8..12], &12i32.to_le_bytes());
//! assert_eq!(&bytes[12..19], b"packed\0");
//! # Ok::<(), packed_structs::LayoutError>(())
//! ```
//!
//! ## Layout rules
//! - Little-endian throughout; members in insertion order, each aligned to
//!   its type with explicit `paddingByte<N>` members.
//! - A reference stores the distance from the start of the record that
//!   resolves it (struct, array element slot or reference table) to its
//!   target. 8-bit references are unsigned, 16 and 32-bit ones signed, and 0
//!   means null.
//! - Documents are padded to 4 bytes, with one extra word when they end in
//!   bit-packed data.

pub mod constants;
pub mod error;
pub mod ident;
pub mod merge;
pub mod pack;
pub mod types;
pub mod values;

pub use constants::ConstantPool;
pub use error::{IdentifierIssue, LayoutError, Result, StructureError};
pub use merge::{TypeMap, collect_types, merge_types};
pub use pack::{ExtraPadding, PackOptions, Packed, pack_document};
pub use types::{RefWidth, Type};
pub use values::{
    DEFAULT_ALIGNMENT, RawValue, StringOptions, StructBuilder, StructValue, Value, value_of,
};

/// Everything needed to describe and pack a document.
pub mod prelude {
    pub use crate::pack::{ExtraPadding, PackOptions, pack_document};
    pub use crate::types::{IntType, RefWidth, Type};
    pub use crate::values::{
        BitFieldArrayItem, BitFieldArrayValue, BitFieldValue, Blob, Enumeration, RawValue,
        ReferenceArrayValue, SimpleArrayValue, StringOptions, StructBuilder, StructValue, Value,
    };
    pub use crate::{LayoutError, collect_types};
}
