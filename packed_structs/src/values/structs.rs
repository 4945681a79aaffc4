use std::sync::Arc;

use super::{
    Blob, Enumeration, IntValue, RawValue, ReferenceArrayValue, ReferenceValue, SimpleArrayValue,
    Value, array_value, value_of,
};
use crate::error::{Result, StructureError};
use crate::types::{IntType, RefWidth, StructLayout, StructType, Type};

/// Alignment a struct is padded to by [`StructBuilder::finalize`].
pub const DEFAULT_ALIGNMENT: usize = 4;

/// How [`StructBuilder::add_string`] stores its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StringOptions {
    /// Stored in place in exactly this many bytes instead of behind a reference.
    pub fixed_width: Option<usize>,
    pub omit_terminal: bool,
    pub reference_width: RefWidth,
}

impl StringOptions {
    pub fn fixed(mut self, width: usize) -> Self {
        self.fixed_width = Some(width);
        self
    }

    pub fn without_terminal(mut self) -> Self {
        self.omit_terminal = true;
        self
    }

    pub fn with_reference_width(mut self, width: RefWidth) -> Self {
        self.reference_width = width;
        self
    }
}

/// A struct whose layout is frozen: finalized (sized, storable in place) or
/// open (always referenced).
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    ty: Arc<StructType>,
    members: Vec<Value>,
}

impl StructValue {
    pub fn ty(&self) -> &Arc<StructType> {
        &self.ty
    }

    pub fn name(&self) -> &str {
        self.ty.name()
    }

    /// One value per member of the type, padding included.
    pub fn members(&self) -> &[Value] {
        &self.members
    }

    pub fn get(&self, member: &str) -> Option<&Value> {
        self.ty
            .member_index(member)
            .and_then(|index| self.members.get(index))
    }

    pub fn constant(&self, name: &str) -> Option<&Value> {
        self.ty.constants().get(name)
    }

    pub fn is_finalized(&self) -> bool {
        self.ty.is_finalized()
    }
}

/// Builds a struct member by member.
///
/// Members are laid out in the order they are added, each aligned to its type
/// with `paddingByte<N>` members. Values that cannot be stored in place are
/// referenced automatically by [`add`](Self::add).
///
/// ```rust
/// use packed_structs::values::{StringOptions, StructBuilder};
///
/// let person = StructBuilder::new("Person")?
///     .add_uint8("age", 42)?
///     .add_string("name", Some("Ada"), StringOptions::default())?
///     .add("scores", vec![3, 1, 4])?
///     .finalize()?;
///
/// assert_eq!(person.ty().size(), Some(12));
/// assert_eq!(person.ty().member("name").map(|m| m.offset()), Some(4));
/// # Ok::<(), packed_structs::LayoutError>(())
/// ```
#[derive(Debug, Clone)]
pub struct StructBuilder {
    layout: StructLayout,
    values: Vec<Value>,
}

impl StructBuilder {
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self {
            layout: StructLayout::new(name)?,
            values: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        self.layout.name()
    }

    /// Stores the value in place when its type allows it, behind a 32-bit
    /// reference otherwise.
    pub fn add(self, name: &str, value: impl Into<RawValue>) -> Result<Self> {
        let value = value_of(value)?;
        if value.is_immediate() {
            self.add_immediate(name, value)
        } else {
            self.add_reference(name, value, RefWidth::W32)
        }
    }

    /// Stores the value in place. An unsized value (open struct, unsized
    /// array, bit field array) must be the last member.
    pub fn add_immediate(mut self, name: &str, value: impl Into<RawValue>) -> Result<Self> {
        let value = value_of(value)?;
        if value.is_null() {
            return Err(StructureError::NullImmediate(name.to_string()).into());
        }
        let padding = self.layout.add_member(name, value.ty())?;
        push_padding(&mut self.values, padding);
        self.values.push(value);
        Ok(self)
    }

    pub fn add_reference(self, name: &str, value: impl Into<RawValue>, width: RefWidth) -> Result<Self> {
        let target = value_of(value)?;
        self.add_immediate(name, ReferenceValue::new(target, width))
    }

    /// A null reference that still declares what it would point to.
    pub fn add_null_reference(self, name: &str, target: Type, width: RefWidth) -> Result<Self> {
        self.add_immediate(name, ReferenceValue::typed_null(target, width))
    }

    pub fn add_ref8(self, name: &str, value: impl Into<RawValue>) -> Result<Self> {
        self.add_reference(name, value, RefWidth::W8)
    }

    pub fn add_ref16(self, name: &str, value: impl Into<RawValue>) -> Result<Self> {
        self.add_reference(name, value, RefWidth::W16)
    }

    pub fn add_ref32(self, name: &str, value: impl Into<RawValue>) -> Result<Self> {
        self.add_reference(name, value, RefWidth::W32)
    }

    pub fn add_int8(self, name: &str, value: i8) -> Result<Self> {
        self.add(name, IntValue::new(IntType::INT8, value)?)
    }

    pub fn add_int16(self, name: &str, value: i16) -> Result<Self> {
        self.add(name, IntValue::new(IntType::INT16, value)?)
    }

    pub fn add_int32(self, name: &str, value: i32) -> Result<Self> {
        self.add(name, Value::int32(value))
    }

    pub fn add_int64(self, name: &str, value: i64) -> Result<Self> {
        self.add(name, IntValue::new(IntType::INT64, value)?)
    }

    pub fn add_uint8(self, name: &str, value: u8) -> Result<Self> {
        self.add(name, IntValue::new(IntType::UINT8, value)?)
    }

    pub fn add_uint16(self, name: &str, value: u16) -> Result<Self> {
        self.add(name, IntValue::new(IntType::UINT16, value)?)
    }

    pub fn add_uint32(self, name: &str, value: u32) -> Result<Self> {
        self.add(name, IntValue::new(IntType::UINT32, value)?)
    }

    pub fn add_uint64(self, name: &str, value: u64) -> Result<Self> {
        self.add(name, IntValue::new(IntType::UINT64, value)?)
    }

    pub fn add_char(self, name: &str, value: char) -> Result<Self> {
        self.add(name, Value::char(value)?)
    }

    /// A missing text becomes a typed null reference to `char[]`. Fixed-width
    /// strings are stored in place and cannot be missing.
    pub fn add_string(self, name: &str, text: Option<&str>, options: StringOptions) -> Result<Self> {
        match (text, options.fixed_width) {
            (None, Some(_)) => Err(StructureError::FixedNullString.into()),
            (None, None) => self.add_null_reference(name, Type::char_array(), options.reference_width),
            (Some(text), Some(width)) => {
                let string = SimpleArrayValue::string(text, Some(width), options.omit_terminal)?;
                self.add_immediate(name, string)
            }
            (Some(text), None) => {
                let string = SimpleArrayValue::string(text, None, options.omit_terminal)?;
                self.add_reference(name, string, options.reference_width)
            }
        }
    }

    /// Always referenced; the blob bytes are word aligned.
    pub fn add_blob(self, name: &str, blob: Blob, width: RefWidth) -> Result<Self> {
        self.add_reference(name, SimpleArrayValue::from(blob), width)
    }

    /// A simple array when the elements can be stored in place, a reference
    /// array otherwise. The array itself is referenced unless fixed-size.
    pub fn add_array<I, T>(self, name: &str, items: I, fixed_size: Option<usize>) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<RawValue>,
    {
        let values = items.into_iter().map(value_of).collect::<Result<Vec<_>>>()?;
        let array = array_value(values, fixed_size)?;
        self.add(name, array)
    }

    pub fn add_reference_array<I, T>(
        self,
        name: &str,
        items: I,
        fixed_size: Option<usize>,
        width: RefWidth,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<RawValue>,
    {
        let values = items.into_iter().map(value_of).collect::<Result<Vec<_>>>()?;
        let array = ReferenceArrayValue::new(values, fixed_size, width)?;
        self.add(name, array)
    }

    pub fn add_constant(mut self, name: &str, value: impl Into<RawValue>) -> Result<Self> {
        self.layout.constants.add(name, value)?;
        Ok(self)
    }

    /// Adds several constants; see [`crate::constants::ConstantPool::extend`].
    pub fn add_constants<I, S, V>(mut self, constants: I, ignore_private: bool) -> Result<Self>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<RawValue>,
    {
        self.layout.constants.extend(constants, ignore_private)?;
        Ok(self)
    }

    pub fn add_int32_constant(mut self, name: &str, value: i32) -> Result<Self> {
        self.layout.constants.add_int32(name, value)?;
        Ok(self)
    }

    pub fn add_char_constant(mut self, name: &str, value: char) -> Result<Self> {
        self.layout.constants.add_char(name, value)?;
        Ok(self)
    }

    /// Declares an enum with the struct even if no member uses it.
    pub fn declare_enum(mut self, enumeration: &Enumeration) -> Self {
        self.layout.enums.push(Arc::clone(enumeration.ty()));
        self
    }

    /// Finalizes with [`DEFAULT_ALIGNMENT`].
    pub fn finalize(self) -> Result<StructValue> {
        self.finalize_aligned(DEFAULT_ALIGNMENT)
    }

    /// Pads the struct to a multiple of `alignment` and fixes its size.
    pub fn finalize_aligned(self, alignment: usize) -> Result<StructValue> {
        let Self { layout, mut values } = self;
        let (ty, padding) = layout.finalize(alignment)?;
        push_padding(&mut values, padding);
        Ok(StructValue {
            ty: Arc::new(ty),
            members: values,
        })
    }

    /// Freezes the layout without a size: the struct can only be referenced.
    pub fn into_open(self) -> StructValue {
        StructValue {
            ty: Arc::new(self.layout.into_open()),
            members: self.values,
        }
    }

}

fn push_padding(values: &mut Vec<Value>, count: usize) {
    let zero = Value::Int(IntValue {
        ty: IntType::INT8,
        value: 0,
    });
    values.extend(std::iter::repeat_n(zero, count));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayoutError;

    #[test]
    fn values_follow_their_members() -> Result<()> {
        let record = StructBuilder::new("testStruct14")?
            .add("number", 23)?
            .add("string", "helluWorld")?
            .add("ref", None::<i32>)?
            .finalize()?;

        let kinds: Vec<String> = record
            .ty()
            .members()
            .iter()
            .map(|m| m.ty().unique_name())
            .collect();
        assert_eq!(kinds, ["int32_t", "ref32->char[]", "ref32->void"]);
        assert_eq!(record.members().len(), 3);
        assert_eq!(record.get("number"), Some(&Value::int32(23)));
        Ok(())
    }

    #[test]
    fn padding_gets_zero_values() -> Result<()> {
        let record = StructBuilder::new("Padded")?
            .add_char("c", 'x')?
            .add_int16("s", -2)?
            .add_char("d", 'y')?
            .finalize()?;
        assert_eq!(record.ty().size(), Some(8));
        assert_eq!(record.members().len(), record.ty().members().len());
        assert_eq!(record.members()[1], Value::int(IntType::INT8, 0)?);
        Ok(())
    }

    #[test]
    fn strings_by_reference_or_in_place() -> Result<()> {
        let record = StructBuilder::new("Strings")?
            .add_string("plain", Some("hello"), StringOptions::default())?
            .add_string(
                "brief",
                Some("hi"),
                StringOptions::default().with_reference_width(RefWidth::W8),
            )?
            .add_string("none", None, StringOptions::default())?
            .add_string("magic", Some("abcd"), StringOptions::default().fixed(4).without_terminal())?
            .finalize()?;

        let ty = record.ty();
        let name = |member: &str| ty.member(member).map(|m| m.ty().unique_name());
        assert_eq!(name("plain").as_deref(), Some("ref32->char[]"));
        assert_eq!(name("brief").as_deref(), Some("ref8->char[]"));
        assert_eq!(name("none").as_deref(), Some("ref32->char[]"));
        assert_eq!(name("magic").as_deref(), Some("char[4]"));

        assert!(matches!(
            StructBuilder::new("Bad")?.add_string("x", None, StringOptions::default().fixed(4)),
            Err(LayoutError::Structure(StructureError::FixedNullString))
        ));
        Ok(())
    }

    #[test]
    fn null_cannot_be_stored_in_place() -> Result<()> {
        assert!(matches!(
            StructBuilder::new("Bad")?.add_immediate("x", RawValue::Null),
            Err(LayoutError::Structure(StructureError::NullImmediate(_)))
        ));
        Ok(())
    }

    #[test]
    fn constants_and_enums_travel_with_the_type() -> Result<()> {
        let colors = Enumeration::new("Color", IntType::UINT8, &[("RED", 0), ("BLUE", 1)])?;
        let record = StructBuilder::new("WithConstants")?
            .add_int32_constant("EVERYTHING", 43)?
            .add_constant("LABEL", "this is a label")?
            .add_char_constant("BANG", '!')?
            .add_constants([("LIMIT", 9), ("_internal", 0)], true)?
            .declare_enum(&colors)
            .add_int8("x", 1)?
            .finalize()?;
        assert_eq!(record.constant("EVERYTHING"), Some(&Value::int32(43)));
        assert_eq!(record.ty().constants().len(), 4);
        assert_eq!(record.constant("_internal"), None);
        assert_eq!(record.ty().enums().len(), 1);
        assert_eq!(record.ty().size(), Some(4));
        Ok(())
    }

    #[test]
    fn open_structs_are_referenced() -> Result<()> {
        let inner = StructBuilder::new("Node")?.add_int32("value", 2)?.add("next", None::<i32>)?;
        let outer = StructBuilder::new("Node")?
            .add_int32("value", 1)?
            .add("next", inner)?
            .into_open();
        assert!(!outer.is_finalized());
        assert_eq!(
            outer.ty().member("next").map(|m| m.ty().unique_name()).as_deref(),
            Some("ref32->Node")
        );
        Ok(())
    }
}
