//! Variable-width record tables ("bitfield arrays").
//!
//! Every field gets one bit width per table: the widest value stored in it.
//! The encoded table is a header of `fields + 2` little-endian `u16`s
//!
//! ```text
//! [stride, offset(0), offset(1), ..., offset(n-1), stride]
//! ```
//!
//! followed by `ceil(stride * rows / 8)` bytes of entry bits. Field `f` of
//! entry `e` lives at bits `[offset(f) + e * stride, offset(f + 1) + e * stride)`
//! where `offset(n) == stride`.
//!
//! ```rust
//! use packed_bits::table::{Cell, TableHeader, encode};
//!
//! let rows = vec![
//!     vec![Cell::Int(3), Cell::Int(0)],
//!     vec![Cell::Int(1), Cell::Int(9)],
//! ];
//! let bytes = encode(&rows, 2).unwrap();
//!
//! let header = TableHeader::parse(&bytes, 2).unwrap();
//! assert_eq!(header.stride(), 6);
//! assert_eq!(header.field_width(1), 4);
//! assert_eq!(header.read(&bytes, 1, 1), Some(9));
//! ```

use crate::bit_ops;
use crate::{BitBuffer, PackedBitsError};

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

type Result<T> = core::result::Result<T, PackedBitsError>;

/// One field value of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<'a> {
    Int(u64),
    /// A 0/1 bit sequence stored verbatim, zero-extended to the field width.
    Bits(&'a [u8]),
}

impl Cell<'_> {
    pub fn required_bits(&self) -> usize {
        match self {
            Cell::Int(value) => bit_ops::required_bits(*value),
            Cell::Bits(bits) => bits.len(),
        }
    }
}

/// Per-field bit widths: the maximum requirement over all rows.
pub fn field_widths(rows: &[Vec<Cell<'_>>], fields: usize) -> Result<Vec<usize>> {
    let mut widths = vec![0usize; fields];
    for row in rows {
        if row.len() != fields {
            return Err(PackedBitsError::FieldCount {
                expected: fields,
                found: row.len(),
            });
        }
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.required_bits());
        }
    }
    Ok(widths)
}

/// Size in bytes of an encoded table.
pub fn encoded_len(widths: &[usize], rows: usize) -> usize {
    header_len(widths.len()) + (widths.iter().sum::<usize>() * rows).div_ceil(8)
}

fn header_len(fields: usize) -> usize {
    (fields + 2) * 2
}

/// Header slots `[stride, offset(0), ..., offset(n-1), stride]`.
pub fn header_slots(widths: &[usize]) -> Result<Vec<u16>> {
    let stride: usize = widths.iter().sum();
    let stride16 = u16::try_from(stride).map_err(|_| PackedBitsError::HeaderOverflow(stride))?;
    let mut slots = Vec::with_capacity(widths.len() + 2);
    slots.push(stride16);
    let mut offset = 0u16;
    for &width in widths {
        slots.push(offset);
        // stride fits, so every partial sum fits as well
        offset += width as u16;
    }
    slots.push(stride16);
    Ok(slots)
}

/// Encodes `rows` (each holding one cell per field) into header + bits.
pub fn encode(rows: &[Vec<Cell<'_>>], fields: usize) -> Result<Vec<u8>> {
    let widths = field_widths(rows, fields)?;
    let slots = header_slots(&widths)?;

    let stride: usize = widths.iter().sum();
    let mut bits = BitBuffer::with_capacity(stride * rows.len());
    for row in rows {
        for (cell, &width) in row.iter().zip(&widths) {
            match cell {
                Cell::Int(value) => bits.push(*value, width)?,
                Cell::Bits(sequence) => bits.push_bits(sequence, width)?,
            }
        }
    }

    let mut out = Vec::with_capacity(encoded_len(&widths, rows.len()));
    for slot in slots {
        out.extend_from_slice(&slot.to_le_bytes());
    }
    out.extend_from_slice(bits.as_bytes());
    Ok(out)
}

/// Decoded header of an encoded table, as a reader computes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHeader {
    slots: Vec<u16>,
}

impl TableHeader {
    /// Reads the header of a table declared with `fields` fields.
    pub fn parse(bytes: &[u8], fields: usize) -> Result<Self> {
        let needed = header_len(fields);
        if bytes.len() < needed {
            return Err(PackedBitsError::InsufficientBytes {
                needed,
                available: bytes.len(),
            });
        }
        let slots = bytes[..needed]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(Self { slots })
    }

    pub fn stride(&self) -> usize {
        self.slots[0] as usize
    }

    pub fn fields(&self) -> usize {
        self.slots.len() - 2
    }

    pub fn field_offset(&self, field: usize) -> usize {
        self.slots[1 + field] as usize
    }

    /// Zero when the header's offsets decrease.
    pub fn field_width(&self, field: usize) -> usize {
        self.slots[2 + field].saturating_sub(self.slots[1 + field]) as usize
    }

    /// Byte offset of the entry bits from the start of the table.
    pub fn payload_offset(&self) -> usize {
        self.slots.len() * 2
    }

    /// Number of whole entries that fit the payload of `table`.
    pub fn capacity(&self, table: &[u8]) -> usize {
        match self.stride() {
            0 => 0,
            stride => (table.len().saturating_sub(self.payload_offset()) * 8) / stride,
        }
    }

    /// Reads field `field` of entry `entry`; fields wider than 64 bits are
    /// truncated. Returns `None` when the bits lie outside `table`.
    pub fn read(&self, table: &[u8], entry: usize, field: usize) -> Option<u64> {
        if field >= self.fields() {
            return None;
        }
        let width = self.field_width(field);
        let start = self.field_offset(field) + entry * self.stride();
        let payload = table.get(self.payload_offset()..)?;
        if (start + width).div_ceil(8) > payload.len() {
            return None;
        }
        Some(bit_ops::get_bits(payload, start, width))
    }
}
