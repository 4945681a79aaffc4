//! Serialization of value trees.
//!
//! Packing a value yields two byte blocks: the *immediate* bytes, stored
//! where the value sits, and the *referred* bytes, out-of-line data that
//! references inside the value point to. A caller places the referred bytes
//! right after its own immediate block, so every value is packed with the
//! `offset` from the start of the record that resolves its references to the
//! next free byte.
//!
//! ```rust
//! use packed_structs::pack::{PackOptions, pack_document};
//! use packed_structs::values::StructBuilder;
//!
//! let record = StructBuilder::new("testStruct1")?.add_int32("bla", 234)?.finalize()?;
//! let bytes = pack_document(&record.into(), &PackOptions::default())?;
//! assert_eq!(bytes, [0xea, 0x00, 0x00, 0x00]);
//! # Ok::<(), packed_structs::LayoutError>(())
//! ```

use tracing::{debug, trace};

use crate::error::{LayoutError, Result, StructureError};
use crate::values::{DEFAULT_ALIGNMENT, ReferenceValue, SimpleArrayValue, StructValue, Value};

/// Immediate and referred bytes of a packed value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packed {
    immediate: Vec<u8>,
    referred: Vec<u8>,
    // whether each block ends in bit-packed data
    immediate_bits: bool,
    referred_bits: bool,
}

impl Packed {
    fn from_immediate(immediate: Vec<u8>) -> Self {
        Self {
            immediate,
            ..Self::default()
        }
    }

    fn from_bits(immediate: Vec<u8>) -> Self {
        Self {
            immediate,
            immediate_bits: true,
            ..Self::default()
        }
    }

    pub fn immediate(&self) -> &[u8] {
        &self.immediate
    }

    pub fn referred(&self) -> &[u8] {
        &self.referred
    }

    pub fn len(&self) -> usize {
        self.immediate.len() + self.referred.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the last byte written is part of a blob or bit field array.
    pub fn ends_with_bits(&self) -> bool {
        if self.referred.is_empty() {
            self.immediate_bits
        } else {
            self.referred_bits
        }
    }

    /// Immediate bytes followed by referred bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut bytes = self.immediate;
        bytes.extend_from_slice(&self.referred);
        bytes
    }

    fn combine(self) -> Self {
        let bits = self.ends_with_bits();
        Self {
            immediate: self.into_bytes(),
            referred: Vec::new(),
            immediate_bits: bits,
            referred_bits: false,
        }
    }

    fn append(&mut self, other: Packed) {
        if !other.immediate.is_empty() {
            self.immediate.extend_from_slice(&other.immediate);
            self.immediate_bits = other.immediate_bits;
        }
        if !other.referred.is_empty() {
            self.referred.extend_from_slice(&other.referred);
            self.referred_bits = other.referred_bits;
        }
    }

    fn pad_immediate(&mut self, len: usize) {
        if self.immediate.len() < len {
            self.immediate.resize(len, 0);
            self.immediate_bits = false;
        }
    }
}

impl Value {
    /// Packs the value.
    ///
    /// With an offset the value is packed as part of a record whose referred
    /// data starts `offset` bytes from the record start; the offset can not
    /// be smaller than the value's own immediate block. Without one the value
    /// is a whole document: its immediate size is the base and both blocks
    /// come back combined.
    pub fn pack(&self, offset: Option<usize>) -> Result<Packed> {
        let size = self.immediate_size()?;
        match offset {
            Some(offset) if offset < size => Err(LayoutError::value_range(offset, "data offset")),
            Some(offset) => self.pack_at(offset),
            None => match self {
                Value::Reference(_) => Err(LayoutError::UnresolvedContext),
                _ => Ok(self.pack_at(size)?.combine()),
            },
        }
    }

    /// Bytes the value occupies in place.
    pub fn immediate_size(&self) -> Result<usize> {
        match self {
            Value::Int(int) => Ok(int.ty().bytes()),
            Value::Char(_) => Ok(1),
            Value::Null => Ok(0),
            Value::Reference(reference) => Ok(reference.width().bytes()),
            Value::SimpleArray(array) => {
                let count = array.ty().fixed_size().unwrap_or(array.len());
                Ok(array.ty().element().width()? * count)
            }
            Value::ReferenceArray(array) => {
                let count = array.ty().fixed_size().unwrap_or(array.len());
                Ok(array.ty().width().bytes() * count)
            }
            Value::BitField(bits) => Ok(bits.ty().width()),
            Value::BitFieldArray(table) => table.encoded_len(),
            Value::Enum(member) => Ok(member.ty().width()),
            Value::Struct(record) => record
                .members()
                .iter()
                .map(Value::immediate_size)
                .sum(),
        }
    }

    pub(crate) fn pack_at(&self, offset: usize) -> Result<Packed> {
        match self {
            Value::Int(int) => Ok(Packed::from_immediate(int.encode()?)),
            Value::Char(byte) => Ok(Packed::from_immediate(vec![*byte])),
            Value::Null => Ok(Packed::default()),
            Value::Reference(reference) => reference.pack_at(offset),
            Value::SimpleArray(array) => pack_simple_array(self, array, offset),
            Value::ReferenceArray(array) => {
                let mut packed = Packed::default();
                let mut running = offset;
                // offsets are relative to the start of the table
                for element in array.elements() {
                    let part = element.pack_at(running)?;
                    running += part.referred.len();
                    packed.append(part);
                }
                packed.pad_immediate(self.immediate_size()?);
                Ok(packed)
            }
            Value::BitField(bits) => Ok(Packed::from_immediate(bits.to_bytes()?)),
            Value::BitFieldArray(table) => Ok(Packed::from_bits(table.to_bytes()?)),
            Value::Enum(member) => Ok(Packed::from_immediate(member.encode()?)),
            Value::Struct(record) => pack_struct(self, record, offset),
        }
    }
}

impl ReferenceValue {
    fn pack_at(&self, offset: usize) -> Result<Packed> {
        let int = self.width().int_type();
        let Some(target) = self.target() else {
            return Ok(Packed::from_immediate(int.encode(0)?));
        };

        let alignment = self.ty().target().alignment();
        let padding = (alignment - offset % alignment) % alignment;
        let stored = offset + padding;
        trace!(offset, padding, stored, width = int.bytes(), "resolved reference");

        let data = target.pack(None)?;
        let bits = data.ends_with_bits();
        let mut referred = vec![0u8; padding];
        referred.extend(data.into_bytes());
        Ok(Packed {
            immediate: int.encode(stored as i128)?,
            referred,
            immediate_bits: false,
            referred_bits: bits,
        })
    }
}

fn pack_simple_array(value: &Value, array: &SimpleArrayValue, offset: usize) -> Result<Packed> {
    let mut packed = match (array.as_values(), array.as_bytes()) {
        (Some(values), _) => {
            let mut packed = Packed::default();
            let mut running = offset;
            // offsets are relative to each element's own slot
            for element in values {
                let position = packed.immediate.len();
                let part = element.pack_at(running - position)?;
                running += part.referred.len();
                packed.append(part);
            }
            packed
        }
        (None, Some(bytes)) if array.as_blob().is_some() => Packed::from_bits(bytes.to_vec()),
        (None, Some(bytes)) => Packed::from_immediate(bytes.to_vec()),
        (None, None) => Packed::default(),
    };
    packed.pad_immediate(value.immediate_size()?);
    Ok(packed)
}

fn pack_struct(value: &Value, record: &StructValue, offset: usize) -> Result<Packed> {
    let mut packed = Packed::default();
    let mut running = offset;
    for member in record.members() {
        let position = packed.immediate.len();
        // references resolve against the struct, embedded records against themselves
        let member_offset = match member {
            Value::Reference(_) => running,
            _ => running - position,
        };
        let part = member.pack_at(member_offset)?;
        running += part.referred.len();
        packed.append(part);
    }
    let size = match record.ty().size() {
        Some(size) => size,
        None => value.immediate_size()?,
    };
    packed.pad_immediate(size);
    Ok(packed)
}

/// When a document gets a full extra alignment unit of zero bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtraPadding {
    Never,
    Always,
    /// Only when the document ends in bit-packed data, so readers loading
    /// whole words never run past the buffer.
    #[default]
    TrailingBits,
}

/// Padding applied to a packed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackOptions {
    pub alignment: usize,
    pub pad: bool,
    pub extra: ExtraPadding,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            alignment: DEFAULT_ALIGNMENT,
            pad: true,
            extra: ExtraPadding::default(),
        }
    }
}

impl PackOptions {
    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn without_padding(mut self) -> Self {
        self.pad = false;
        self
    }

    pub fn with_extra(mut self, extra: ExtraPadding) -> Self {
        self.extra = extra;
        self
    }

    /// Zero bytes appended to a document of `len` bytes.
    pub fn padding(&self, len: usize, ends_with_bits: bool) -> usize {
        if !self.pad || self.alignment == 0 {
            return 0;
        }
        let extra = match self.extra {
            ExtraPadding::Never => false,
            ExtraPadding::Always => true,
            ExtraPadding::TrailingBits => ends_with_bits,
        };
        let missing = self.alignment - len % self.alignment;
        if extra || missing != self.alignment {
            missing
        } else {
            0
        }
    }
}

/// Packs `root` as a whole document and pads it.
pub fn pack_document(root: &Value, options: &PackOptions) -> Result<Vec<u8>> {
    if options.pad && options.alignment == 0 {
        return Err(StructureError::ZeroAlignment.into());
    }
    let packed = root.pack(None)?;
    let padding = options.padding(packed.len(), packed.ends_with_bits());
    let mut bytes = packed.into_bytes();
    bytes.resize(bytes.len() + padding, 0);
    debug!(ty = %root.ty().unique_name(), len = bytes.len(), padding, "packed document");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RefWidth;
    use crate::values::{Blob, StringOptions, StructBuilder};

    fn document(value: impl Into<Value>) -> Result<Vec<u8>> {
        pack_document(&value.into(), &PackOptions::default())
    }

    #[test]
    fn string_reference_points_past_the_struct() -> Result<()> {
        let record = StructBuilder::new("testStruct4")?
            .add_string("hello", Some("hello world!"), StringOptions::default())?
            .finalize()?;
        let bytes = document(record)?;
        assert_eq!(&bytes[..4], &4i32.to_le_bytes());
        assert_eq!(&bytes[4..17], b"hello world!\0");
        assert_eq!(bytes.len(), 20);
        Ok(())
    }

    #[test]
    fn targets_are_aligned_with_padding() -> Result<()> {
        let record = StructBuilder::new("Aligned")?
            .add_string("a", Some("abc"), StringOptions::default())?
            .add_ref32("b", vec![7])?
            .finalize()?;
        let bytes = document(record)?;
        // "abc\0" fills 8..12, the int array is already aligned at 12
        assert_eq!(&bytes[..4], &8i32.to_le_bytes());
        assert_eq!(&bytes[4..8], &12i32.to_le_bytes());
        assert_eq!(&bytes[12..16], &7i32.to_le_bytes());

        let record = StructBuilder::new("Misaligned")?
            .add_string("a", Some("ab"), StringOptions::default())?
            .add_ref32("b", vec![7])?
            .finalize()?;
        let bytes = document(record)?;
        // "ab\0" ends at 11, one padding byte precedes the array
        assert_eq!(&bytes[4..8], &12i32.to_le_bytes());
        assert_eq!(bytes[11], 0);
        Ok(())
    }

    #[test]
    fn null_references_store_zero() -> Result<()> {
        let record = StructBuilder::new("Nulls")?
            .add_ref8("a", None::<i32>)?
            .add_ref16("b", None::<i32>)?
            .add_ref32("c", None::<i32>)?
            .finalize()?;
        assert_eq!(document(record)?, vec![0; 8]);
        Ok(())
    }

    #[test]
    fn bare_references_need_a_context() {
        let reference = Value::Reference(ReferenceValue::new(Value::int32(1), RefWidth::W32));
        assert!(matches!(reference.pack(None), Err(LayoutError::UnresolvedContext)));
        assert!(reference.pack(Some(4)).is_ok());
        assert!(reference.pack(Some(0)).is_err());
    }

    #[test]
    fn eight_bit_references_overflow() -> Result<()> {
        let long = "x".repeat(300);
        let record = StructBuilder::new("Far")?
            .add_ref8("a", long.as_str())?
            .add_ref8("b", "too far")?
            .finalize()?;
        assert!(matches!(document(record), Err(LayoutError::ValueRange { .. })));
        Ok(())
    }

    #[test]
    fn trailing_bits_get_an_extra_word() -> Result<()> {
        let record = StructBuilder::new("testStruct6")?
            .add_blob("myBlob", Blob::from_bits(vec![0, 1, 0, 0, 1, 0, 0, 1])?, RefWidth::W32)?
            .finalize()?;
        let value: Value = record.into();
        let packed = value.pack(None)?;
        assert!(packed.ends_with_bits());
        assert_eq!(packed.len(), 5);

        assert_eq!(pack_document(&value, &PackOptions::default())?.len(), 8);
        let never = PackOptions::default().with_extra(ExtraPadding::Never);
        assert_eq!(pack_document(&value, &never)?.len(), 8);
        let bare = PackOptions::default().without_padding();
        assert_eq!(pack_document(&value, &bare)?.len(), 5);
        Ok(())
    }

    #[test]
    fn padding_rules() {
        let options = PackOptions::default();
        assert_eq!(options.padding(4, false), 0);
        assert_eq!(options.padding(4, true), 4);
        assert_eq!(options.padding(5, true), 3);
        assert_eq!(options.with_extra(ExtraPadding::Always).padding(8, false), 4);
        assert_eq!(options.with_alignment(8).padding(12, false), 4);
    }
}
