//! Values: one variant per [`Type`] variant, each owning its type and the
//! data needed to produce bytes.
//!
//! Values are built bottom-up. Host data enters through [`RawValue`], a closed
//! set of accepted shapes, and [`value_of`] turns it into a [`Value`]:
//!
//! ```rust
//! use packed_structs::values::{Value, value_of};
//!
//! assert_eq!(value_of(234)?, Value::int32(234));
//! assert_eq!(value_of("hi")?.ty().unique_name(), "char[]");
//! assert_eq!(value_of(vec![1, 2, 3])?.ty().unique_name(), "int32_t[]");
//! assert!(value_of(None::<i32>)?.is_null());
//! # Ok::<(), packed_structs::LayoutError>(())
//! ```

mod array;
mod bitfield;
mod enums;
mod structs;

pub use array::{BLOB_ALIGNMENT, Blob, ReferenceArrayValue, SimpleArrayValue, array_value};
pub use bitfield::{BitFieldArrayItem, BitFieldArrayValue, BitFieldEntry, BitFieldValue};
pub use enums::{EnumValue, Enumeration};
pub use structs::{DEFAULT_ALIGNMENT, StringOptions, StructBuilder, StructValue};

use std::fmt::Write;
use std::sync::Arc;

use crate::error::{LayoutError, Result, StructureError};
use crate::types::{IntType, RefWidth, ReferenceType, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntValue {
    ty: IntType,
    value: i128,
}

impl IntValue {
    /// Fails when `value` is outside the range of `ty`.
    pub fn new(ty: IntType, value: impl Into<i128>) -> Result<Self> {
        let value = value.into();
        if !ty.contains(value) {
            return Err(LayoutError::value_range(value, ty.name()));
        }
        Ok(Self { ty, value })
    }

    pub fn ty(&self) -> IntType {
        self.ty
    }

    pub fn value(&self) -> i128 {
        self.value
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        self.ty.encode(self.value)
    }
}

/// A byte offset to an out-of-line value. A reference without a target is
/// stored as 0; its target type may still be known ("typed null").
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceValue {
    ty: ReferenceType,
    target: Option<Box<Value>>,
}

impl ReferenceValue {
    /// A reference to `target`; a null target gives a null reference.
    pub fn new(target: Value, width: RefWidth) -> Self {
        match target {
            Value::Null => Self::null(width),
            target => Self {
                ty: ReferenceType::new(target.ty(), width),
                target: Some(Box::new(target)),
            },
        }
    }

    pub fn null(width: RefWidth) -> Self {
        Self::typed_null(Type::Null, width)
    }

    /// A null reference whose pointee type is nevertheless declared.
    pub fn typed_null(target: Type, width: RefWidth) -> Self {
        Self {
            ty: ReferenceType::new(target, width),
            target: None,
        }
    }

    /// A target type may only be given when there is no target value.
    pub fn with_target_type(
        value: Option<Value>,
        target_type: Option<Type>,
        width: RefWidth,
    ) -> Result<Self> {
        match (value.filter(|v| !v.is_null()), target_type) {
            (Some(_), Some(_)) => Err(StructureError::TypedNonNullReference.into()),
            (None, Some(target)) => Ok(Self::typed_null(target, width)),
            (value, None) => Ok(Self::new(value.unwrap_or(Value::Null), width)),
        }
    }

    pub fn ty(&self) -> &ReferenceType {
        &self.ty
    }

    pub fn width(&self) -> RefWidth {
        self.ty.width()
    }

    pub fn target(&self) -> Option<&Value> {
        self.target.as_deref()
    }

    pub fn is_null(&self) -> bool {
        self.target.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(IntValue),
    Char(u8),
    Null,
    Reference(ReferenceValue),
    SimpleArray(SimpleArrayValue),
    ReferenceArray(ReferenceArrayValue),
    BitField(BitFieldValue),
    BitFieldArray(BitFieldArrayValue),
    Enum(EnumValue),
    Struct(StructValue),
}

impl Value {
    pub fn int(ty: IntType, value: impl Into<i128>) -> Result<Self> {
        IntValue::new(ty, value).map(Value::Int)
    }

    pub fn int32(value: i32) -> Self {
        Value::Int(IntValue {
            ty: IntType::INT32,
            value: value.into(),
        })
    }

    /// A single character; only ASCII fits in one byte.
    pub fn char(c: char) -> Result<Self> {
        if !c.is_ascii() {
            return Err(LayoutError::value_range(c.escape_unicode(), "char"));
        }
        Ok(Value::Char(c as u8))
    }

    /// NUL-terminated UTF-8 string of variable length.
    pub fn string(text: &str) -> Self {
        Value::SimpleArray(SimpleArrayValue::text(text))
    }

    pub fn ty(&self) -> Type {
        match self {
            Value::Int(int) => Type::Int(int.ty),
            Value::Char(_) => Type::Char,
            Value::Null => Type::Null,
            Value::Reference(reference) => Type::Reference(reference.ty.clone()),
            Value::SimpleArray(array) => Type::SimpleArray(array.ty().clone()),
            Value::ReferenceArray(array) => Type::ReferenceArray(array.ty().clone()),
            Value::BitField(bits) => Type::BitField(Arc::clone(bits.ty())),
            Value::BitFieldArray(table) => Type::BitFieldArray(Arc::clone(table.ty())),
            Value::Enum(member) => Type::Enum(Arc::clone(member.ty())),
            Value::Struct(record) => Type::Struct(Arc::clone(record.ty())),
        }
    }

    pub fn is_immediate(&self) -> bool {
        self.ty().is_immediate()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Source text of the value as a declared constant.
    pub fn literal(&self) -> Result<String> {
        match self {
            Value::Int(int) => Ok(int.value.to_string()),
            Value::Char(byte) => Ok(quoted(&[*byte], '\'')),
            Value::SimpleArray(array) => match array.as_text() {
                Some(text) => Ok(quoted(text.as_bytes(), '"')),
                None => Err(StructureError::NoLiteral(self.ty().unique_name()).into()),
            },
            Value::Enum(member) => Ok(format!("{}::{}", member.ty().name(), member.name())),
            other => Err(StructureError::NoLiteral(other.ty().unique_name()).into()),
        }
    }
}

fn quoted(bytes: &[u8], quote: char) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push(quote);
    for &byte in bytes {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'"' => out.push_str("\\\""),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(byte as char),
            // octal escapes stop after three digits, hex escapes do not
            _ => {
                let _ = write!(out, "\\{byte:03o}");
            }
        }
    }
    out.push(quote);
    out
}

/// Host data accepted where a value is expected.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Becomes an `int32_t`.
    Int(i64),
    /// Becomes a NUL-terminated string.
    Str(String),
    Null,
    /// Becomes an array; see [`array_value`].
    List(Vec<RawValue>),
    Value(Value),
}

/// Converts host data into a value.
pub fn value_of(raw: impl Into<RawValue>) -> Result<Value> {
    match raw.into() {
        RawValue::Int(value) => i32::try_from(value)
            .map(Value::int32)
            .map_err(|_| LayoutError::value_range(value, IntType::INT32.name())),
        RawValue::Str(text) => Ok(Value::string(&text)),
        RawValue::Null => Ok(Value::Null),
        RawValue::List(items) => {
            let values = items.into_iter().map(value_of).collect::<Result<Vec<_>>>()?;
            array_value(values, None)
        }
        RawValue::Value(value) => Ok(value),
    }
}

macro_rules! raw_int {
    ($($int:ty),*) => {
        $(
            impl From<$int> for RawValue {
                fn from(value: $int) -> Self {
                    RawValue::Int(value.into())
                }
            }
        )*
    };
}

raw_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! value_variant {
    ($($variant:ident($inner:ty)),*) => {
        $(
            impl From<$inner> for Value {
                fn from(inner: $inner) -> Self {
                    Value::$variant(inner)
                }
            }

            impl From<$inner> for RawValue {
                fn from(inner: $inner) -> Self {
                    RawValue::Value(Value::$variant(inner))
                }
            }
        )*
    };
}

value_variant!(
    Int(IntValue),
    Reference(ReferenceValue),
    SimpleArray(SimpleArrayValue),
    ReferenceArray(ReferenceArrayValue),
    BitField(BitFieldValue),
    BitFieldArray(BitFieldArrayValue),
    Enum(EnumValue),
    Struct(StructValue)
);

impl From<&str> for RawValue {
    fn from(text: &str) -> Self {
        RawValue::Str(text.to_string())
    }
}

impl From<String> for RawValue {
    fn from(text: String) -> Self {
        RawValue::Str(text)
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        RawValue::Value(value)
    }
}

impl From<Blob> for Value {
    fn from(blob: Blob) -> Self {
        Value::SimpleArray(SimpleArrayValue::from(blob))
    }
}

impl From<Blob> for RawValue {
    fn from(blob: Blob) -> Self {
        RawValue::Value(blob.into())
    }
}

/// An unfinalized builder becomes an open struct.
impl From<StructBuilder> for Value {
    fn from(builder: StructBuilder) -> Self {
        Value::Struct(builder.into_open())
    }
}

impl From<StructBuilder> for RawValue {
    fn from(builder: StructBuilder) -> Self {
        RawValue::Value(builder.into())
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawValue::Null, Into::into)
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(items: Vec<T>) -> Self {
        RawValue::List(items.into_iter().map(Into::into).collect())
    }
}
