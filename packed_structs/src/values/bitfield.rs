use std::sync::Arc;

use packed_bits::table::{self, Cell};
use packed_bits::{PackedBitsError, bit_ops};

use super::{Blob, EnumValue};
use crate::error::{LayoutError, Result, StructureError};
use crate::types::{BitFieldArrayType, BitFieldType, FieldKind};

#[derive(Debug, Clone, PartialEq)]
pub enum BitFieldEntry {
    Unsigned(u64),
    Signed(i64),
    Enum(EnumValue),
}

impl BitFieldEntry {
    /// Bits written for this entry.
    fn stored(&self) -> u64 {
        match self {
            BitFieldEntry::Unsigned(value) => *value,
            BitFieldEntry::Signed(value) => bit_ops::zigzag_encode(*value),
            BitFieldEntry::Enum(member) => member.bit_field_value(),
        }
    }
}

/// A bit field and the value of each of its fields.
///
/// ```rust
/// use packed_structs::values::BitFieldValue;
///
/// let flags = BitFieldValue::with_bits("bitField1", 8)?
///     .add_flag("aFlag", true)?
///     .add_flag("bFlag", false)?
///     .add_flag("cFlag", true)?
///     .add("values", 3, 2)?;
/// assert_eq!(flags.word()?, 0b11101);
/// # Ok::<(), packed_structs::LayoutError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BitFieldValue {
    ty: Arc<BitFieldType>,
    entries: Vec<BitFieldEntry>,
}

impl BitFieldValue {
    /// A 32-bit field.
    pub fn new(name: &str) -> Result<Self> {
        Self::with_bits(name, BitFieldType::DEFAULT_BITS)
    }

    /// `bits` must be 8, 16, 32 or 64.
    pub fn with_bits(name: &str, bits: u32) -> Result<Self> {
        Ok(Self {
            ty: Arc::new(BitFieldType::new(name, bits)?),
            entries: Vec::new(),
        })
    }

    pub fn add(self, name: &str, value: u64, width: u32) -> Result<Self> {
        self.check_fits(value, width)?;
        self.push(name, FieldKind::Unsigned, width, BitFieldEntry::Unsigned(value))
    }

    pub fn add_flag(self, name: &str, set: bool) -> Result<Self> {
        self.add(name, u64::from(set), 1)
    }

    /// Stored zig-zag encoded.
    pub fn add_signed(self, name: &str, value: i64, width: u32) -> Result<Self> {
        self.check_fits(bit_ops::zigzag_encode(value), width)?;
        self.push(name, FieldKind::Signed, width, BitFieldEntry::Signed(value))
    }

    /// Uses as many bits as the widest member of the enum needs.
    pub fn add_enum(self, name: &str, member: &EnumValue) -> Result<Self> {
        let width = member.ty().required_bits();
        self.push(
            name,
            FieldKind::Enum(Arc::clone(member.ty())),
            width,
            BitFieldEntry::Enum(member.clone()),
        )
    }

    fn check_fits(&self, value: u64, width: u32) -> Result<()> {
        if bit_ops::fits(value, width as usize) {
            return Ok(());
        }
        Err(LayoutError::bit_field(
            self.ty.name(),
            PackedBitsError::ValueOverflow {
                value,
                width: width as usize,
            },
        ))
    }

    fn push(mut self, name: &str, kind: FieldKind, width: u32, entry: BitFieldEntry) -> Result<Self> {
        Arc::make_mut(&mut self.ty).push(name, kind, width)?;
        self.entries.push(entry);
        Ok(self)
    }

    pub fn ty(&self) -> &Arc<BitFieldType> {
        &self.ty
    }

    pub fn entries(&self) -> &[BitFieldEntry] {
        &self.entries
    }

    pub fn get(&self, field: &str) -> Option<&BitFieldEntry> {
        self.ty.field_index(field).map(|index| &self.entries[index])
    }

    /// The packed word, field 0 in the least significant bits.
    pub fn word(&self) -> Result<u64> {
        let stored: Vec<u64> = self.entries.iter().map(BitFieldEntry::stored).collect();
        self.ty
            .layout()
            .pack(&stored)
            .map_err(|err| LayoutError::bit_field(self.ty.name(), err))
    }

    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.ty.layout().to_le_bytes(self.word()?))
    }
}

/// One field value of a bit field array entry.
#[derive(Debug, Clone, PartialEq)]
pub enum BitFieldArrayItem {
    /// Must lie in `0..2^31`.
    Int(i64),
    Blob(Blob),
}

impl BitFieldArrayItem {
    const LIMIT: i64 = 1 << 31;

    fn cell(&self) -> Cell<'_> {
        match self {
            BitFieldArrayItem::Int(value) => Cell::Int(*value as u64),
            BitFieldArrayItem::Blob(blob) => Cell::Bits(blob.bits()),
        }
    }
}

macro_rules! array_item_int {
    ($($int:ty),*) => {
        $(
            impl From<$int> for BitFieldArrayItem {
                fn from(value: $int) -> Self {
                    BitFieldArrayItem::Int(value.into())
                }
            }
        )*
    };
}

array_item_int!(i32, i64, u8, u16, u32);

impl From<Blob> for BitFieldArrayItem {
    fn from(blob: Blob) -> Self {
        BitFieldArrayItem::Blob(blob)
    }
}

/// Entries of small unsigned integers (or blobs) whose field widths are
/// chosen from the data when packed.
///
/// ```rust
/// use packed_structs::values::BitFieldArrayValue;
///
/// let pairs = BitFieldArrayValue::new("PairBitArray", &["a", "b"])?
///     .push([0, 12])?
///     .push([0, 4])?
///     .push([0, 63])?;
/// assert_eq!(pairs.field_widths()?, vec![0, 6]);
/// # Ok::<(), packed_structs::LayoutError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BitFieldArrayValue {
    ty: Arc<BitFieldArrayType>,
    entries: Vec<Vec<BitFieldArrayItem>>,
}

impl BitFieldArrayValue {
    pub fn new<S: AsRef<str>>(name: &str, fields: &[S]) -> Result<Self> {
        Ok(Self {
            ty: Arc::new(BitFieldArrayType::new(name, fields)?),
            entries: Vec::new(),
        })
    }

    /// Appends one entry holding a value per field, in field order.
    pub fn push<I, T>(mut self, entry: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<BitFieldArrayItem>,
    {
        let entry: Vec<BitFieldArrayItem> = entry.into_iter().map(Into::into).collect();
        let expected = self.ty.fields().len();
        if entry.len() != expected {
            return Err(StructureError::FieldCount {
                expected,
                found: entry.len(),
            }
            .into());
        }
        for item in &entry {
            match item {
                BitFieldArrayItem::Int(value) if !(0..BitFieldArrayItem::LIMIT).contains(value) => {
                    return Err(LayoutError::value_range(value, "bit field array entry"));
                }
                _ => {}
            }
        }
        self.entries.push(entry);
        Ok(self)
    }

    /// Appends one entry given as `(field, value)` pairs in any order.
    pub fn push_named<T: Into<BitFieldArrayItem>>(self, entry: Vec<(&str, T)>) -> Result<Self> {
        let expected = self.ty.fields().len();
        if entry.len() != expected {
            return Err(StructureError::FieldCount {
                expected,
                found: entry.len(),
            }
            .into());
        }
        let mut slots: Vec<Option<BitFieldArrayItem>> = vec![None; expected];
        for (field, value) in entry {
            let Some(index) = self.ty.field_index(field) else {
                return Err(StructureError::UnknownField {
                    owner: self.ty.name().to_string(),
                    name: field.to_string(),
                }
                .into());
            };
            if slots[index].replace(value.into()).is_some() {
                return Err(StructureError::DuplicateName(field.to_string()).into());
            }
        }
        // every field was named exactly once
        self.push(slots.into_iter().flatten())
    }

    pub fn push_all<I, E, T>(self, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = E>,
        E: IntoIterator<Item = T>,
        T: Into<BitFieldArrayItem>,
    {
        entries.into_iter().try_fold(self, |table, entry| table.push(entry))
    }

    pub fn ty(&self) -> &Arc<BitFieldArrayType> {
        &self.ty
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Vec<BitFieldArrayItem>] {
        &self.entries
    }

    pub fn get(&self, field: &str, index: usize) -> Option<&BitFieldArrayItem> {
        let field = self.ty.field_index(field)?;
        self.entries.get(index).map(|entry| &entry[field])
    }

    /// Bit width of every field: the widest value stored in it.
    pub fn field_widths(&self) -> Result<Vec<usize>> {
        table::field_widths(&self.cells(), self.ty.fields().len())
            .map_err(|err| LayoutError::bit_field(self.ty.name(), err))
    }

    pub(crate) fn encoded_len(&self) -> Result<usize> {
        Ok(table::encoded_len(&self.field_widths()?, self.entries.len()))
    }

    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>> {
        table::encode(&self.cells(), self.ty.fields().len())
            .map_err(|err| LayoutError::bit_field(self.ty.name(), err))
    }

    fn cells(&self) -> Vec<Vec<Cell<'_>>> {
        self.entries
            .iter()
            .map(|entry| entry.iter().map(BitFieldArrayItem::cell).collect())
            .collect()
    }
}
