//! # Packed Data
//!
//! One entry point for describing, packing and writing zero-decode binary
//! documents.
//!
//! ## Features
//!
//! - **Typed value trees**: structs, strings, arrays, enums and references
//!   built with [`StructBuilder`]
//! - **Bit-level packing**: bit fields sharing one word and tables whose field
//!   widths come from the data
//! - **Deterministic layout**: little-endian, explicitly padded, offsets
//!   relative to the record that resolves them
//! - **Type collection**: every type a document uses, deduplicated by unique
//!   name, ready for declaration generation
//!
//! ## Quick Start
//!
//! ```rust
//! use packed_data::prelude::*;
//!
//! let player = StructBuilder::new("Player")?
//!     .add_int16("x", 100)?
//!     .add_int16("y", -20)?
//!     .add_string("name", Some("Ferris"), StringOptions::default())?
//!     .finalize()?;
//!
//! let mut out = Vec::new();
//! let written = write_document(&mut out, &player.into(), &PackOptions::default())?;
//! assert_eq!(written, out.len());
//! assert_eq!(&out[8..15], b"Ferris\0");
//! # Ok::<(), packed_data::DataError>(())
//! ```

pub mod io;
pub mod prelude;

pub use crate::io::{DataError, DocumentWriter, Result, save_document, write_document};

// Re-export packed_structs types
pub use packed_structs::{
    ConstantPool, ExtraPadding, LayoutError, PackOptions, Packed, RawValue, RefWidth,
    StringOptions, StructBuilder, StructValue, Type, TypeMap, Value, collect_types,
    pack_document, value_of,
};
pub use packed_structs::{types, values};

// Re-export packed_bits types
pub use packed_bits::{PackedBitsError, table::TableHeader};
