//! Growable LSB-first bit buffer.
//!
//! # Examples
//!
//! ```rust
//! use packed_bits::BitBuffer;
//!
//! let mut buffer = BitBuffer::new();
//! buffer.push(5, 3).unwrap();
//! buffer.push(1, 1).unwrap();
//!
//! assert_eq!(buffer.len(), 4);
//! assert_eq!(buffer.get(0, 3), Some(5));
//! assert_eq!(buffer.as_bytes(), &[0b1101]);
//! ```

use crate::PackedBitsError;
use crate::bit_ops;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

type Result<T> = core::result::Result<T, PackedBitsError>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    len: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            len: 0,
        }
    }

    fn ensure_capacity(&mut self, total_bits: usize) {
        let required = total_bits.div_ceil(8);
        if self.bytes.len() < required {
            self.bytes.resize(required, 0);
        }
    }

    /// Appends the low `width` bits of `value`.
    ///
    /// Fails when `value` needs more than `width` bits.
    pub fn push(&mut self, value: u64, width: usize) -> Result<()> {
        if !bit_ops::fits(value, width) {
            return Err(PackedBitsError::ValueOverflow { value, width });
        }
        let bit_pos = self.len;
        self.ensure_capacity(bit_pos + width);
        bit_ops::set_bits(&mut self.bytes, bit_pos, width, value);
        self.len += width;
        Ok(())
    }

    /// Appends a 0/1 bit sequence, then zero bits up to `width`.
    pub fn push_bits(&mut self, bits: &[u8], width: usize) -> Result<()> {
        if bits.len() > width {
            return Err(PackedBitsError::FieldOverflow {
                requested: bits.len(),
                used: 0,
                total: width,
            });
        }
        let bit_pos = self.len;
        self.ensure_capacity(bit_pos + width);
        for (i, &bit) in bits.iter().enumerate() {
            match bit {
                0 | 1 => bit_ops::set_bits(&mut self.bytes, bit_pos + i, 1, bit as u64),
                other => return Err(PackedBitsError::NotABit(other)),
            }
        }
        self.len += width;
        Ok(())
    }

    /// Reads `width` bits at `bit_pos`, or `None` past the end.
    pub fn get(&self, bit_pos: usize, width: usize) -> Option<u64> {
        if bit_pos + width > self.len {
            return None;
        }
        Some(bit_ops::get_bits(&self.bytes, bit_pos, width))
    }

    /// Number of bits written.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The packed bytes; the last byte is zero-filled past [`len`](Self::len).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Iterates over single bits as 0/1 values.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            buffer: self,
            pos: 0,
        }
    }
}

pub struct Iter<'a> {
    buffer: &'a BitBuffer,
    pos: usize,
}

impl Iterator for Iter<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        let bit = self.buffer.get(self.pos, 1)?;
        self.pos += 1;
        Some(bit as u8)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len - self.pos;
        (remaining, Some(remaining))
    }
}

impl<'a> IntoIterator for &'a BitBuffer {
    type Item = u8;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
