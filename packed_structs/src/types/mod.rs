//! Layout descriptions.
//!
//! A [`Type`] knows its byte width (when it has one), its alignment, whether
//! values of it are stored in place ("immediate") or behind a reference, and
//! the two names used when declarations are generated: [`Type::name`], the
//! declared name, and [`Type::unique_name`], the key under which structurally
//! equal types are deduplicated.

mod bitfield;
mod enums;
mod structs;

pub use bitfield::{BitFieldField, BitFieldType, FieldKind};
pub use enums::EnumType;
pub use structs::{Member, StructType};
pub(crate) use structs::StructLayout;

use std::sync::Arc;

use crate::error::{LayoutError, Result, StructureError};
use crate::ident;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    pub const fn bits(self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }

    pub const fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }

    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(IntWidth::W8),
            16 => Some(IntWidth::W16),
            32 => Some(IntWidth::W32),
            64 => Some(IntWidth::W64),
            _ => None,
        }
    }
}

/// A little-endian two's complement or unsigned integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntType {
    signed: bool,
    width: IntWidth,
}

impl IntType {
    pub const INT8: IntType = IntType::new(true, IntWidth::W8);
    pub const INT16: IntType = IntType::new(true, IntWidth::W16);
    pub const INT32: IntType = IntType::new(true, IntWidth::W32);
    pub const INT64: IntType = IntType::new(true, IntWidth::W64);
    pub const UINT8: IntType = IntType::new(false, IntWidth::W8);
    pub const UINT16: IntType = IntType::new(false, IntWidth::W16);
    pub const UINT32: IntType = IntType::new(false, IntWidth::W32);
    pub const UINT64: IntType = IntType::new(false, IntWidth::W64);

    pub const fn new(signed: bool, width: IntWidth) -> Self {
        Self { signed, width }
    }

    pub const fn is_signed(&self) -> bool {
        self.signed
    }

    pub const fn width(&self) -> IntWidth {
        self.width
    }

    pub const fn bytes(&self) -> usize {
        self.width.bytes()
    }

    pub const fn name(&self) -> &'static str {
        match (self.signed, self.width) {
            (true, IntWidth::W8) => "int8_t",
            (true, IntWidth::W16) => "int16_t",
            (true, IntWidth::W32) => "int32_t",
            (true, IntWidth::W64) => "int64_t",
            (false, IntWidth::W8) => "uint8_t",
            (false, IntWidth::W16) => "uint16_t",
            (false, IntWidth::W32) => "uint32_t",
            (false, IntWidth::W64) => "uint64_t",
        }
    }

    pub const fn min(&self) -> i128 {
        if self.signed {
            -(1i128 << (self.width.bits() - 1))
        } else {
            0
        }
    }

    pub const fn max(&self) -> i128 {
        if self.signed {
            (1i128 << (self.width.bits() - 1)) - 1
        } else {
            (1i128 << self.width.bits()) - 1
        }
    }

    pub const fn contains(&self, value: i128) -> bool {
        value >= self.min() && value <= self.max()
    }

    /// Little-endian bytes of `value`, or a range error.
    pub fn encode(&self, value: i128) -> Result<Vec<u8>> {
        if !self.contains(value) {
            return Err(LayoutError::value_range(value, self.name()));
        }
        Ok((value as u128).to_le_bytes()[..self.bytes()].to_vec())
    }
}

/// Width of a stored byte offset. 8-bit offsets are unsigned, wider ones signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefWidth {
    W8,
    W16,
    #[default]
    W32,
}

impl RefWidth {
    pub const fn int_type(self) -> IntType {
        match self {
            RefWidth::W8 => IntType::UINT8,
            RefWidth::W16 => IntType::INT16,
            RefWidth::W32 => IntType::INT32,
        }
    }

    pub const fn bits(self) -> u32 {
        self.int_type().width().bits()
    }

    pub const fn bytes(self) -> usize {
        self.int_type().bytes()
    }

    const fn array_infix(self) -> &'static str {
        match self {
            RefWidth::W8 => "8",
            RefWidth::W16 => "16",
            RefWidth::W32 => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int(IntType),
    /// A single byte, declared as `char`.
    Char,
    /// Target of a reference whose pointee is not known.
    Null,
    Reference(ReferenceType),
    SimpleArray(SimpleArrayType),
    ReferenceArray(ReferenceArrayType),
    BitField(Arc<BitFieldType>),
    BitFieldArray(Arc<BitFieldArrayType>),
    Enum(Arc<EnumType>),
    Struct(Arc<StructType>),
}

impl Type {
    /// Declared name.
    pub fn name(&self) -> String {
        match self {
            Type::Int(int) => int.name().to_string(),
            Type::Char => "char".to_string(),
            Type::Null => "void".to_string(),
            Type::Reference(reference) => reference.width.int_type().name().to_string(),
            Type::SimpleArray(array) => array.element.name(),
            Type::ReferenceArray(array) => array.target.name() + &array.suffix(),
            Type::BitField(bits) => bits.name().to_string(),
            Type::BitFieldArray(table) => table.name().to_string(),
            Type::Enum(enumeration) => enumeration.name().to_string(),
            Type::Struct(record) => record.name().to_string(),
        }
    }

    /// Deduplication key. Types with equal unique names must be mergeable.
    pub fn unique_name(&self) -> String {
        match self {
            Type::Reference(reference) => format!(
                "ref{}->{}",
                reference.width.bits(),
                reference.target.unique_name()
            ),
            Type::SimpleArray(array) => {
                let mut name = array.element.unique_name();
                match array.fixed_size {
                    Some(n) => name.push_str(&format!("[{n}]")),
                    None => name.push_str("[]"),
                }
                if array.alignment != array.element.alignment() {
                    name.push_str(&format!("@{}", array.alignment));
                }
                name
            }
            Type::ReferenceArray(array) => array.target.unique_name() + &array.suffix(),
            Type::BitField(bits) => bits.unique_name(),
            Type::BitFieldArray(table) => format!("BitFieldArray:{}", table.name()),
            _ => self.name(),
        }
    }

    /// Byte width. Fails for open structs, unsized arrays, bit field arrays
    /// and the null type.
    pub fn width(&self) -> Result<usize> {
        let width = match self {
            Type::Int(int) => Some(int.bytes()),
            Type::Char => Some(1),
            Type::Reference(reference) => Some(reference.width.bytes()),
            Type::SimpleArray(array) => match (array.fixed_size, array.element.width()) {
                (Some(n), Ok(element)) => Some(n * element),
                _ => None,
            },
            Type::ReferenceArray(array) => array.fixed_size.map(|n| n * array.width.bytes()),
            Type::BitField(bits) => Some(bits.width()),
            Type::Enum(enumeration) => Some(enumeration.width()),
            Type::Struct(record) => record.size(),
            Type::Null | Type::BitFieldArray(_) => None,
        };
        width.ok_or_else(|| StructureError::Unsized(self.unique_name()).into())
    }

    /// Byte alignment. Defined for every type; the null type aligns to 1.
    pub fn alignment(&self) -> usize {
        match self {
            Type::Int(int) => int.bytes(),
            Type::Char | Type::Null => 1,
            Type::Reference(reference) => reference.width.bytes(),
            Type::SimpleArray(array) => array.alignment,
            Type::ReferenceArray(array) => array.width.bytes(),
            Type::BitField(bits) => bits.width(),
            Type::BitFieldArray(_) => BitFieldArrayType::ALIGNMENT,
            Type::Enum(enumeration) => enumeration.width(),
            Type::Struct(record) => record.alignment(),
        }
    }

    /// Whether values of this type are embedded in place when added to a struct.
    pub fn is_immediate(&self) -> bool {
        match self {
            Type::Int(_) | Type::Char | Type::Reference(_) | Type::BitField(_) | Type::Enum(_) => {
                true
            }
            Type::Null | Type::BitFieldArray(_) => false,
            Type::SimpleArray(array) => array.fixed_size.is_some(),
            Type::ReferenceArray(array) => array.fixed_size.is_some(),
            Type::Struct(record) => record.is_finalized(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Type::Null)
    }

    /// Types stored or referenced directly by this one.
    pub fn contained_types(&self) -> Vec<Type> {
        match self {
            Type::Reference(reference) if !reference.target.is_null() => {
                vec![(*reference.target).clone()]
            }
            Type::SimpleArray(array) => vec![(*array.element).clone()],
            Type::ReferenceArray(array) if !array.target.is_null() => {
                vec![(*array.target).clone()]
            }
            Type::BitField(bits) => bits
                .fields()
                .iter()
                .filter_map(|field| match field.kind() {
                    FieldKind::Enum(enumeration) => Some(Type::Enum(Arc::clone(enumeration))),
                    _ => None,
                })
                .collect(),
            Type::Enum(enumeration) => vec![enumeration.underlying().clone()],
            Type::Struct(record) => record
                .members()
                .iter()
                .map(|member| member.ty().clone())
                .chain(record.enums().iter().map(|e| Type::Enum(Arc::clone(e))))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The whole containment tree, depth first, children before parents,
    /// ending with `self`.
    pub fn all_contained_types(&self) -> Vec<Type> {
        let mut out = Vec::new();
        self.collect_contained(&mut out);
        out
    }

    fn collect_contained(&self, out: &mut Vec<Type>) {
        for child in self.contained_types() {
            child.collect_contained(out);
        }
        out.push(self.clone());
    }

    pub fn reference(target: Type, width: RefWidth) -> Type {
        Type::Reference(ReferenceType::new(target, width))
    }

    /// `char[]`, the type of variable-length strings.
    pub fn char_array() -> Type {
        Type::SimpleArray(SimpleArrayType::bytes(None, 1))
    }
}

impl From<IntType> for Type {
    fn from(int: IntType) -> Self {
        Type::Int(int)
    }
}

impl From<StructType> for Type {
    fn from(record: StructType) -> Self {
        Type::Struct(Arc::new(record))
    }
}

impl From<EnumType> for Type {
    fn from(enumeration: EnumType) -> Self {
        Type::Enum(Arc::new(enumeration))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceType {
    target: Box<Type>,
    width: RefWidth,
}

impl ReferenceType {
    pub fn new(target: Type, width: RefWidth) -> Self {
        Self {
            target: Box::new(target),
            width,
        }
    }

    pub fn target(&self) -> &Type {
        &self.target
    }

    pub fn width(&self) -> RefWidth {
        self.width
    }
}

/// A C array stored in place: `T name[N]`, or `T name[]` when unsized.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleArrayType {
    element: Box<Type>,
    fixed_size: Option<usize>,
    alignment: usize,
}

impl SimpleArrayType {
    pub fn new(element: Type, fixed_size: Option<usize>, alignment: Option<usize>) -> Result<Self> {
        if let Type::Reference(_) = element {
            return Err(StructureError::ReferenceElement(element.unique_name()).into());
        }
        element.width()?;
        let minimum = element.alignment();
        let alignment = match alignment {
            None => minimum,
            Some(requested) if requested >= minimum => requested,
            Some(requested) => {
                return Err(StructureError::AlignmentTooSmall { requested, minimum }.into());
            }
        };
        Ok(Self {
            element: Box::new(element),
            fixed_size,
            alignment,
        })
    }

    /// A `char` array aligned to `alignment` (at least 1).
    pub(crate) fn bytes(fixed_size: Option<usize>, alignment: usize) -> Self {
        Self {
            element: Box::new(Type::Char),
            fixed_size,
            alignment: alignment.max(1),
        }
    }

    pub fn element(&self) -> &Type {
        &self.element
    }

    pub fn fixed_size(&self) -> Option<usize> {
        self.fixed_size
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    pub(crate) fn with_element(&self, element: Type) -> Self {
        Self {
            element: Box::new(element),
            fixed_size: self.fixed_size,
            alignment: self.alignment,
        }
    }
}

/// A table of byte offsets, each relative to the start of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceArrayType {
    target: Box<Type>,
    fixed_size: Option<usize>,
    width: RefWidth,
}

impl ReferenceArrayType {
    pub fn new(target: Type, fixed_size: Option<usize>, width: RefWidth) -> Result<Self> {
        if let Type::Reference(_) = target {
            return Err(StructureError::ReferenceElement(target.unique_name()).into());
        }
        Ok(Self {
            target: Box::new(target),
            fixed_size,
            width,
        })
    }

    pub fn target(&self) -> &Type {
        &self.target
    }

    pub fn fixed_size(&self) -> Option<usize> {
        self.fixed_size
    }

    pub fn width(&self) -> RefWidth {
        self.width
    }

    fn suffix(&self) -> String {
        let size = self
            .fixed_size
            .map(|n| format!("Size{n}"))
            .unwrap_or_default();
        format!("{size}Ref{}Array", self.width.array_infix())
    }
}

/// A bit field array declaration: just a name and its ordered field names.
/// Field widths are chosen per value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitFieldArrayType {
    name: String,
    fields: Vec<String>,
}

impl BitFieldArrayType {
    pub const ALIGNMENT: usize = 4;

    pub fn new<S: AsRef<str>>(name: &str, fields: &[S]) -> Result<Self> {
        ident::validate(name)?;
        if fields.is_empty() {
            return Err(StructureError::NoFields.into());
        }
        let mut names: Vec<String> = Vec::with_capacity(fields.len());
        for field in fields {
            let field = field.as_ref();
            ident::validate(field)?;
            if field == ident::ENTRY_BITS_FIELD {
                return Err(LayoutError::Identifier {
                    name: field.to_string(),
                    issue: crate::error::IdentifierIssue::Reserved,
                });
            }
            if names.iter().any(|n| n == field) {
                return Err(StructureError::DuplicateName(field.to_string()).into());
            }
            names.push(field.to_string());
        }
        Ok(Self {
            name: name.to_string(),
            fields: names,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_ranges() -> Result<()> {
        assert_eq!(IntType::INT8.min(), -128);
        assert_eq!(IntType::UINT64.max(), u64::MAX as i128);
        assert_eq!(IntType::INT32.encode(234)?, vec![0xea, 0, 0, 0]);
        assert_eq!(IntType::INT16.encode(-2)?, vec![0xfe, 0xff]);
        assert!(matches!(
            IntType::UINT8.encode(256),
            Err(LayoutError::ValueRange { .. })
        ));
        assert!(IntType::UINT16.encode(-1).is_err());
        Ok(())
    }

    #[test]
    fn reference_widths_keep_their_signedness() {
        assert!(!RefWidth::W8.int_type().is_signed());
        assert!(RefWidth::W16.int_type().is_signed());
        assert!(RefWidth::W32.int_type().is_signed());
        assert_eq!(RefWidth::default(), RefWidth::W32);
    }

    #[test]
    fn array_names() -> Result<()> {
        let fixed = Type::SimpleArray(SimpleArrayType::new(Type::Char, Some(4), None)?);
        assert_eq!(fixed.unique_name(), "char[4]");
        assert_eq!(fixed.width()?, 4);
        assert!(fixed.is_immediate());

        let blob = Type::SimpleArray(SimpleArrayType::new(Type::Char, None, Some(4))?);
        assert_eq!(blob.unique_name(), "char[]@4");
        assert!(blob.width().is_err());
        assert!(!blob.is_immediate());

        let strings = Type::ReferenceArray(ReferenceArrayType::new(
            Type::char_array(),
            Some(3),
            RefWidth::W16,
        )?);
        assert_eq!(strings.name(), "charSize3Ref16Array");
        assert_eq!(strings.unique_name(), "char[]Size3Ref16Array");
        assert_eq!(strings.width()?, 6);
        assert_eq!(strings.alignment(), 2);
        Ok(())
    }

    #[test]
    fn reference_names() {
        let reference = Type::reference(Type::char_array(), RefWidth::W8);
        assert_eq!(reference.name(), "uint8_t");
        assert_eq!(reference.unique_name(), "ref8->char[]");
        assert_eq!(reference.contained_types(), vec![Type::char_array()]);
        assert!(Type::reference(Type::Null, RefWidth::W32).contained_types().is_empty());
    }

    #[test]
    fn arrays_reject_bad_elements() {
        let reference = Type::reference(Type::Int(IntType::INT32), RefWidth::W32);
        assert!(matches!(
            SimpleArrayType::new(reference, None, None),
            Err(LayoutError::Structure(StructureError::ReferenceElement(_)))
        ));
        assert!(matches!(
            SimpleArrayType::new(Type::Int(IntType::INT32), None, Some(2)),
            Err(LayoutError::Structure(StructureError::AlignmentTooSmall {
                requested: 2,
                minimum: 4
            }))
        ));
        assert!(matches!(
            SimpleArrayType::new(Type::char_array(), Some(2), None),
            Err(LayoutError::Structure(StructureError::Unsized(_)))
        ));
    }

    #[test]
    fn bit_field_array_fields() {
        assert!(BitFieldArrayType::new("Table", &["a", "b"]).is_ok());
        assert!(matches!(
            BitFieldArrayType::new::<&str>("Table", &[]),
            Err(LayoutError::Structure(StructureError::NoFields))
        ));
        assert!(matches!(
            BitFieldArrayType::new("Table", &["bitFieldArrayEntryBits"]),
            Err(LayoutError::Identifier { .. })
        ));
        assert!(matches!(
            BitFieldArrayType::new("Table", &["a", "a"]),
            Err(LayoutError::Structure(StructureError::DuplicateName(_)))
        ));
    }
}
