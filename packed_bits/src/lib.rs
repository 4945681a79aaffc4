//! # packed_bits
//!
//! A `no_std` compatible toolbox for the bit-level parts of a packed binary
//! layout: minimum bit widths, zig-zag signed encoding, LSB-first bit
//! sequences, bitfield words and variable-width record tables.
//!
//! ```rust
//! use packed_bits::{WordLayout, bit_ops};
//!
//! // A signed 4-bit field next to an unsigned 3-bit field
//! let mut layout = WordLayout::new(8).unwrap();
//! layout.push(4).unwrap();
//! layout.push(3).unwrap();
//!
//! let word = layout.pack(&[bit_ops::zigzag_encode(-3), 6]).unwrap();
//! let fields = layout.unpack(word);
//! assert_eq!(bit_ops::zigzag_decode(fields[0]), -3);
//! assert_eq!(fields[1], 6);
//! ```
//!
//! ## Record tables
//!
//! ```rust
//! use packed_bits::table::{Cell, TableHeader, encode};
//!
//! let rows: Vec<Vec<Cell>> = (0..100u64).map(|i| vec![Cell::Int(i % 4), Cell::Int(i)]).collect();
//! let bytes = encode(&rows, 2).unwrap();
//!
//! // 2 + 7 bits per entry instead of two u32s
//! let header = TableHeader::parse(&bytes, 2).unwrap();
//! assert_eq!(header.stride(), 9);
//! assert_eq!(bytes.len(), 8 + (9 * 100usize).div_ceil(8));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod error;
pub use error::PackedBitsError;

pub mod bit_ops;

pub mod buffer;
pub use buffer::BitBuffer;

pub mod table;

pub mod word;
pub use word::WordLayout;
