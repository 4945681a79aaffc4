//! Layout of a bitfield word: consecutive fields packed into one unsigned
//! integer of 8, 16, 32 or 64 bits.
//!
//! Field *i* occupies bits `[shift(i), shift(i) + width(i))`, with field 0 at
//! the least-significant bit.
//!
//! # Examples
//!
//! ```rust
//! use packed_bits::WordLayout;
//!
//! let mut layout = WordLayout::new(8).unwrap();
//! layout.push(1).unwrap();
//! layout.push(1).unwrap();
//! layout.push(3).unwrap();
//!
//! let word = layout.pack(&[1, 0, 5]).unwrap();
//! assert_eq!(word, 0b0001_0101);
//! assert_eq!(layout.unpack(word), vec![1, 0, 5]);
//! ```

use crate::PackedBitsError;
use crate::bit_ops;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

type Result<T> = core::result::Result<T, PackedBitsError>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WordLayout {
    total: u32,
    widths: Vec<u32>,
}

impl WordLayout {
    /// Creates an empty layout for a word of `total` bits.
    pub fn new(total: u32) -> Result<Self> {
        match total {
            8 | 16 | 32 | 64 => Ok(Self {
                total,
                widths: Vec::new(),
            }),
            other => Err(PackedBitsError::InvalidWordWidth(other)),
        }
    }

    /// Appends a field of `width` bits and returns its shift.
    pub fn push(&mut self, width: u32) -> Result<u32> {
        let used = self.used_bits();
        if used + width > self.total {
            return Err(PackedBitsError::FieldOverflow {
                requested: width as usize,
                used: used as usize,
                total: self.total as usize,
            });
        }
        self.widths.push(width);
        Ok(used)
    }

    pub fn total_bits(&self) -> u32 {
        self.total
    }

    pub fn total_bytes(&self) -> usize {
        (self.total / 8) as usize
    }

    pub fn used_bits(&self) -> u32 {
        self.widths.iter().sum()
    }

    pub fn widths(&self) -> &[u32] {
        &self.widths
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Bit position of field `index`.
    pub fn shift(&self, index: usize) -> u32 {
        self.widths[..index].iter().sum()
    }

    /// Mask of field `index` before shifting.
    pub fn mask(&self, index: usize) -> u64 {
        bit_ops::low_mask(self.widths[index] as usize)
    }

    /// Packs one already-encoded value per field into a word.
    pub fn pack(&self, values: &[u64]) -> Result<u64> {
        if values.len() != self.widths.len() {
            return Err(PackedBitsError::FieldCount {
                expected: self.widths.len(),
                found: values.len(),
            });
        }
        let mut word = 0u64;
        let mut shift = 0u32;
        for (&value, &width) in values.iter().zip(&self.widths) {
            if !bit_ops::fits(value, width as usize) {
                return Err(PackedBitsError::ValueOverflow {
                    value,
                    width: width as usize,
                });
            }
            if width > 0 {
                word |= value << shift;
            }
            shift += width;
        }
        Ok(word)
    }

    /// Splits a word back into its field values.
    pub fn unpack(&self, word: u64) -> Vec<u64> {
        let mut shift = 0u32;
        self.widths
            .iter()
            .map(|&width| {
                let value = if width == 0 {
                    0
                } else {
                    (word >> shift) & bit_ops::low_mask(width as usize)
                };
                shift += width;
                value
            })
            .collect()
    }

    /// Little-endian bytes of `word`, truncated to the word width.
    pub fn to_le_bytes(&self, word: u64) -> Vec<u8> {
        word.to_le_bytes()[..self.total_bytes()].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_small_fields() -> Result<()> {
        let mut layout = WordLayout::new(8)?;
        assert_eq!(layout.push(1)?, 0);
        assert_eq!(layout.push(1)?, 1);
        assert_eq!(layout.push(3)?, 2);
        assert_eq!(layout.pack(&[1, 0, 5])?, 0b01_0101);
        assert_eq!(layout.used_bits(), 5);
        assert_eq!(layout.shift(2), 2);
        assert_eq!(layout.mask(2), 0b111);
        Ok(())
    }

    #[test]
    fn rejects_odd_word_widths() {
        assert_eq!(WordLayout::new(12), Err(PackedBitsError::InvalidWordWidth(12)));
    }

    #[test]
    fn field_overflow_is_reported() -> Result<()> {
        let mut layout = WordLayout::new(8)?;
        layout.push(6)?;
        assert_eq!(
            layout.push(3),
            Err(PackedBitsError::FieldOverflow {
                requested: 3,
                used: 6,
                total: 8
            })
        );
        assert_eq!(layout.len(), 1);
        Ok(())
    }

    #[test]
    fn zero_width_and_full_width_fields() -> Result<()> {
        let mut layout = WordLayout::new(64)?;
        layout.push(0)?;
        layout.push(64)?;
        let word = layout.pack(&[0, u64::MAX])?;
        assert_eq!(word, u64::MAX);
        assert_eq!(layout.unpack(word), vec![0, u64::MAX]);
        assert_eq!(layout.to_le_bytes(word).len(), 8);
        Ok(())
    }

    #[test]
    fn value_must_fit_its_field() -> Result<()> {
        let mut layout = WordLayout::new(16)?;
        layout.push(4)?;
        assert_eq!(
            layout.pack(&[16]),
            Err(PackedBitsError::ValueOverflow { value: 16, width: 4 })
        );
        assert_eq!(
            layout.pack(&[]),
            Err(PackedBitsError::FieldCount {
                expected: 1,
                found: 0
            })
        );
        Ok(())
    }
}
