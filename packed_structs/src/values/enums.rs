use std::sync::Arc;

use crate::error::{Result, StructureError};
use crate::types::{EnumType, Type};

/// One member of an enum type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    ty: Arc<EnumType>,
    index: usize,
}

impl EnumValue {
    pub fn ty(&self) -> &Arc<EnumType> {
        &self.ty
    }

    pub fn name(&self) -> &str {
        &self.ty.members()[self.index].0
    }

    pub fn value(&self) -> i64 {
        self.ty.members()[self.index].1
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        self.ty.encode(self.index)
    }

    pub(crate) fn bit_field_value(&self) -> u64 {
        self.ty.bit_field_value(self.index)
    }
}

/// An enum type together with one precomputed [`EnumValue`] per member.
///
/// ```rust
/// use packed_structs::types::{IntType, Type};
/// use packed_structs::values::Enumeration;
///
/// let gender = Enumeration::new(
///     "GenderEnum",
///     IntType::UINT8,
///     &[("MALE", 0), ("FEMALE", 1), ("OTHER", 2)],
/// )?;
/// assert_eq!(gender.get("OTHER")?.value(), 2);
///
/// let nation = Enumeration::chars("NationEnum", &[("ENGLISH", 'e'), ("FRENCH", 'f')])?;
/// assert_eq!(nation.ty().underlying(), &Type::Char);
/// # Ok::<(), packed_structs::LayoutError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration {
    ty: Arc<EnumType>,
    values: Vec<EnumValue>,
}

impl Enumeration {
    pub fn new<S: AsRef<str>>(
        name: &str,
        underlying: impl Into<Type>,
        members: &[(S, i64)],
    ) -> Result<Self> {
        let ty = EnumType::new(name, underlying.into(), members)?;
        Ok(Self::from_type(Arc::new(ty)))
    }

    /// An enum stored as `char`.
    pub fn chars<S: AsRef<str>>(name: &str, members: &[(S, char)]) -> Result<Self> {
        let members: Vec<(&str, i64)> = members
            .iter()
            .map(|(member, c)| (member.as_ref(), i64::from(u32::from(*c))))
            .collect();
        Self::new(name, Type::Char, &members[..])
    }

    pub fn from_type(ty: Arc<EnumType>) -> Self {
        let values = (0..ty.members().len())
            .map(|index| EnumValue {
                ty: Arc::clone(&ty),
                index,
            })
            .collect();
        Self { ty, values }
    }

    pub fn ty(&self) -> &Arc<EnumType> {
        &self.ty
    }

    pub fn get(&self, member: &str) -> Result<EnumValue> {
        self.ty
            .index_of(member)
            .map(|index| self.values[index].clone())
            .ok_or_else(|| {
                StructureError::UnknownEnumMember {
                    enumeration: self.ty.name().to_string(),
                    name: member.to_string(),
                }
                .into()
            })
    }

    /// Members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &EnumValue> {
        self.values.iter()
    }
}
