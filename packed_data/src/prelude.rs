//! Convenience re-exports for common usage

pub use crate::io::{DataError, DocumentWriter, save_document, write_document};

// Describing and packing documents
pub use packed_structs::prelude::*;
pub use packed_structs::TypeMap;

// Reading packed tables back
pub use packed_bits::table::TableHeader;

// Common result type
pub type Result<T> = std::result::Result<T, DataError>;
