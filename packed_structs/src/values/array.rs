use packed_bits::{PackedBitsError, bit_ops};

use super::{ReferenceValue, Value};
use crate::error::{LayoutError, Result, StructureError};
use crate::merge::merge_types;
use crate::types::{RefWidth, ReferenceArrayType, SimpleArrayType, Type};

/// Default byte alignment of blobs.
pub const BLOB_ALIGNMENT: usize = 4;

/// A bit sequence stored LSB first: `[0, 1, 0, 0, 1, 0, 0, 1]` is `0x92`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob {
    bits: Vec<u8>,
    bytes: Vec<u8>,
}

impl Blob {
    /// Every element must be 0 or 1.
    pub fn from_bits(bits: impl Into<Vec<u8>>) -> Result<Self> {
        let bits = bits.into();
        let bytes = bit_ops::pack_bits_to_bytes(&bits).map_err(|err| match err {
            PackedBitsError::NotABit(bit) => LayoutError::value_range(bit, "bit"),
            other => LayoutError::bit_field("blob", other),
        })?;
        Ok(Self { bits, bytes })
    }

    /// Eight bits per byte, LSB first.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bits: bit_ops::bytes_to_bits(bytes),
            bytes: bytes.to_vec(),
        }
    }

    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Elements {
    Values(Vec<Value>),
    Text { text: String, bytes: Vec<u8> },
    Bits(Blob),
}

/// An array stored in place, element after element.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleArrayValue {
    ty: SimpleArrayType,
    elements: Elements,
}

impl SimpleArrayValue {
    /// Every value's type is merged into `element`. Null values have no
    /// bytes to store in place and are rejected.
    pub fn new(element: Type, values: Vec<Value>, fixed_size: Option<usize>) -> Result<Self> {
        check_capacity(values.len(), fixed_size)?;
        let element = values
            .iter()
            .try_fold(element, |element, value| element.merge(&value.ty()))?;
        Ok(Self {
            ty: SimpleArrayType::new(element, fixed_size, None)?,
            elements: Elements::Values(values),
        })
    }

    /// UTF-8 bytes of `text`, NUL terminated unless `omit_terminal`.
    pub fn string(text: &str, fixed_size: Option<usize>, omit_terminal: bool) -> Result<Self> {
        let mut bytes = text.as_bytes().to_vec();
        if !omit_terminal {
            bytes.push(0);
        }
        check_capacity(bytes.len(), fixed_size)?;
        Ok(Self {
            ty: SimpleArrayType::bytes(fixed_size, 1),
            elements: Elements::Text {
                text: text.to_string(),
                bytes,
            },
        })
    }

    pub(crate) fn text(text: &str) -> Self {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        Self {
            ty: SimpleArrayType::bytes(None, 1),
            elements: Elements::Text {
                text: text.to_string(),
                bytes,
            },
        }
    }

    /// Packed blob bytes, aligned to [`BLOB_ALIGNMENT`] unless overridden.
    pub fn blob(blob: Blob, fixed_size: Option<usize>, alignment: Option<usize>) -> Result<Self> {
        check_capacity(blob.as_bytes().len(), fixed_size)?;
        let ty = SimpleArrayType::new(
            Type::Char,
            fixed_size,
            Some(alignment.unwrap_or(BLOB_ALIGNMENT)),
        )?;
        Ok(Self {
            ty,
            elements: Elements::Bits(blob),
        })
    }

    /// Same elements with a larger alignment.
    pub fn with_alignment(self, alignment: usize) -> Result<Self> {
        let ty = SimpleArrayType::new(
            self.ty.element().clone(),
            self.ty.fixed_size(),
            Some(alignment),
        )?;
        Ok(Self { ty, ..self })
    }

    pub fn ty(&self) -> &SimpleArrayType {
        &self.ty
    }

    /// Number of elements given, not counting the fixed-size tail.
    pub fn len(&self) -> usize {
        match &self.elements {
            Elements::Values(values) => values.len(),
            Elements::Text { bytes, .. } => bytes.len(),
            Elements::Bits(blob) => blob.as_bytes().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_values(&self) -> Option<&[Value]> {
        match &self.elements {
            Elements::Values(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.elements {
            Elements::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match &self.elements {
            Elements::Bits(blob) => Some(blob),
            _ => None,
        }
    }

    /// Raw bytes of text and blob arrays.
    pub(crate) fn as_bytes(&self) -> Option<&[u8]> {
        match &self.elements {
            Elements::Values(_) => None,
            Elements::Text { bytes, .. } => Some(bytes),
            Elements::Bits(blob) => Some(blob.as_bytes()),
        }
    }
}

impl From<Blob> for SimpleArrayValue {
    fn from(blob: Blob) -> Self {
        Self {
            ty: SimpleArrayType::bytes(None, BLOB_ALIGNMENT),
            elements: Elements::Bits(blob),
        }
    }
}

/// A table of references, each offset measured from the start of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceArrayValue {
    ty: ReferenceArrayType,
    elements: Vec<ReferenceValue>,
}

impl ReferenceArrayValue {
    /// Null values become null references. The target type is the merge of
    /// every value's type.
    pub fn new(values: Vec<Value>, fixed_size: Option<usize>, width: RefWidth) -> Result<Self> {
        let Some(first) = values.first() else {
            return Err(StructureError::EmptyArray.into());
        };
        check_capacity(values.len(), fixed_size)?;

        let mut target = first.ty();
        for value in &values {
            if let Value::Reference(_) = value {
                return Err(StructureError::ReferenceElement(value.ty().unique_name()).into());
            }
            target = merge_types(&value.ty(), &target)?;
        }
        Ok(Self {
            ty: ReferenceArrayType::new(target, fixed_size, width)?,
            elements: values
                .into_iter()
                .map(|value| ReferenceValue::new(value, width))
                .collect(),
        })
    }

    pub fn ty(&self) -> &ReferenceArrayType {
        &self.ty
    }

    pub fn elements(&self) -> &[ReferenceValue] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

fn check_capacity(len: usize, fixed_size: Option<usize>) -> Result<()> {
    match fixed_size {
        Some(fixed) if len > fixed => Err(StructureError::ArrayTooLong { len, fixed }.into()),
        _ => Ok(()),
    }
}

/// Builds an array from values of one (mergeable) type: a simple array when
/// the elements can be stored in place, a reference array otherwise.
pub fn array_value(values: Vec<Value>, fixed_size: Option<usize>) -> Result<Value> {
    let Some((first, rest)) = values.split_first() else {
        return Err(StructureError::EmptyArray.into());
    };
    let element = rest
        .iter()
        .try_fold(first.ty(), |element, value| merge_types(&element, &value.ty()))?;
    if let Type::Reference(_) = element {
        return Err(StructureError::ReferenceElement(element.unique_name()).into());
    }

    if element.is_immediate() {
        SimpleArrayValue::new(element, values, fixed_size).map(Value::SimpleArray)
    } else {
        ReferenceArrayValue::new(values, fixed_size, RefWidth::default()).map(Value::ReferenceArray)
    }
}
