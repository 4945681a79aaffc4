//! Free functions for converting between integers, bit sequences and bytes.
//!
//! Bit sequences are slices of `0`/`1` bytes, least-significant bit first.
//!
//! ```rust
//! use packed_bits::bit_ops::{pack_bits_to_bytes, required_bits, to_bits, zigzag_encode};
//!
//! assert_eq!(required_bits(255), 8);
//! assert_eq!(required_bits(256), 9);
//! assert_eq!(to_bits(6, Some(4)).unwrap(), vec![0, 1, 1, 0]);
//! assert_eq!(pack_bits_to_bytes(&[0, 1, 0, 0, 1, 0, 0, 1]).unwrap(), vec![0x92]);
//! assert_eq!(zigzag_encode(-1), 1);
//! ```

use crate::PackedBitsError;

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

type Result<T> = core::result::Result<T, PackedBitsError>;

/// Mask with the lowest `width` bits set. Saturates at 64 bits.
#[inline(always)]
pub const fn low_mask(width: usize) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Minimum number of bits needed to store `value`; 0 needs none.
#[inline]
pub const fn required_bits(value: u64) -> usize {
    (u64::BITS - value.leading_zeros()) as usize
}

/// Whether `value` can be stored in `width` bits.
#[inline]
pub const fn fits(value: u64, width: usize) -> bool {
    required_bits(value) <= width
}

/// Maps signed integers onto unsigned ones so small magnitudes stay small:
/// 0, -1, 1, -2, 2 become 0, 1, 2, 3, 4.
#[inline]
pub const fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode`], i.e. `(v >> 1) ^ -(v & 1)`.
#[inline]
pub const fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Expands `value` into its bits, LSB first.
///
/// Without a width the sequence stops at the highest set bit. With a width the
/// sequence is zero-extended, and values needing more bits are rejected.
pub fn to_bits(value: u64, width: Option<usize>) -> Result<Vec<u8>> {
    let needed = required_bits(value);
    let len = match width {
        None => needed,
        Some(width) if needed <= width => width,
        Some(width) => return Err(PackedBitsError::ValueOverflow { value, width }),
    };
    Ok((0..len)
        .map(|i| if i < 64 { ((value >> i) & 1) as u8 } else { 0 })
        .collect())
}

/// Packs a bit sequence into bytes, bit 0 going to the LSB of byte 0.
/// A trailing partial byte is zero-filled.
pub fn pack_bits_to_bytes(bits: &[u8]) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; bits.len().div_ceil(8)];
    for (pos, &bit) in bits.iter().enumerate() {
        match bit {
            0 => {}
            1 => bytes[pos / 8] |= 1 << (pos % 8),
            other => return Err(PackedBitsError::NotABit(other)),
        }
    }
    Ok(bytes)
}

/// Expands bytes into a bit sequence, 8 bits per byte, LSB first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).map(move |i| (byte >> i) & 1))
        .collect()
}

/// Writes the low `bit_width` bits of `value` at `bit_offset`, LSB first.
///
/// # Panics
///
/// Panics if the bit range runs past the end of `slice`.
pub fn set_bits(slice: &mut [u8], bit_offset: usize, bit_width: usize, value: u64) {
    let masked = value & low_mask(bit_width);

    for i in 0..bit_width {
        let bit = if i < 64 { (masked >> i) & 1 } else { 0 };
        let pos = bit_offset + i;
        let byte = pos / 8;
        let bit_in_byte = pos % 8;

        if bit == 1 {
            slice[byte] |= 1 << bit_in_byte;
        } else {
            slice[byte] &= !(1 << bit_in_byte);
        }
    }
}

/// Reads `bit_width` bits (at most 64) starting at `bit_offset`, LSB first.
///
/// # Panics
///
/// Panics if the bit range runs past the end of `slice`.
pub fn get_bits(slice: &[u8], bit_offset: usize, bit_width: usize) -> u64 {
    let mut value = 0u64;

    for i in 0..bit_width.min(64) {
        let pos = bit_offset + i;
        let byte = pos / 8;
        let bit_in_byte = pos % 8;

        let bit = (slice[byte] >> bit_in_byte) & 1;
        value |= (bit as u64) << i;
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_bits() {
        let mut buf = [0u8; 8];
        set_bits(&mut buf, 3, 5, 0b10101);
        assert_eq!(get_bits(&buf, 3, 5), 0b10101);
    }

    #[test]
    fn full_width_words() {
        let mut buf = [0u8; 9];
        set_bits(&mut buf, 4, 64, u64::MAX - 1);
        assert_eq!(get_bits(&buf, 4, 64), u64::MAX - 1);
        assert_eq!(buf[0] & 0x0f, 0);
    }

    #[test]
    fn required_bits_boundaries() {
        assert_eq!(required_bits(0), 0);
        assert_eq!(required_bits(1), 1);
        assert_eq!(required_bits(255), 8);
        assert_eq!(required_bits(256), 9);
        assert_eq!(required_bits(u64::MAX), 64);
    }

    #[test]
    fn zigzag_table() {
        let table = [
            (0i64, 0u64),
            (-1, 1),
            (1, 2),
            (-2, 3),
            (2147483647, 4294967294),
            (-2147483648, 4294967295),
            (i64::MIN, u64::MAX),
        ];
        for (signed, encoded) in table {
            assert_eq!(zigzag_encode(signed), encoded);
            assert_eq!(zigzag_decode(encoded), signed);
        }
    }

    #[test]
    fn to_bits_checks_width() -> Result<()> {
        assert_eq!(to_bits(0, None)?, Vec::<u8>::new());
        assert_eq!(to_bits(5, None)?, vec![1, 0, 1]);
        assert_eq!(to_bits(5, Some(5))?, vec![1, 0, 1, 0, 0]);
        assert_eq!(
            to_bits(8, Some(3)),
            Err(PackedBitsError::ValueOverflow { value: 8, width: 3 })
        );
        Ok(())
    }

    #[test]
    fn bits_to_bytes_is_lsb_first() -> Result<()> {
        assert_eq!(pack_bits_to_bytes(&[1, 1, 0, 0, 1, 0, 1, 0, 1])?, vec![0x53, 0x01]);
        assert_eq!(pack_bits_to_bytes(&[])?, Vec::<u8>::new());
        assert_eq!(pack_bits_to_bytes(&[1, 2]), Err(PackedBitsError::NotABit(2)));
        assert_eq!(bytes_to_bits(&[0x92]), vec![0, 1, 0, 0, 1, 0, 0, 1]);
        Ok(())
    }
}
