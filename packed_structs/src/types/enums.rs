use packed_bits::bit_ops;

use super::Type;
use crate::error::{LayoutError, Result, StructureError};
use crate::ident;

/// A named set of integer (or char) literals stored as their underlying type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    name: String,
    underlying: Type,
    members: Vec<(String, i64)>,
    negative: bool,
}

impl EnumType {
    /// Members keep the given order.
    pub fn new<S: AsRef<str>>(name: &str, underlying: Type, members: &[(S, i64)]) -> Result<Self> {
        ident::validate(name)?;
        let range = match &underlying {
            Type::Int(int) => (int.min(), int.max()),
            Type::Char => (0, u8::MAX as i128),
            other => return Err(StructureError::EnumUnderlying(other.unique_name()).into()),
        };
        if members.is_empty() {
            return Err(StructureError::EmptyEnum(name.to_string()).into());
        }

        let mut checked: Vec<(String, i64)> = Vec::with_capacity(members.len());
        for (member, value) in members {
            let member = member.as_ref();
            ident::validate(member)?;
            if checked.iter().any(|(n, _)| n == member) {
                return Err(StructureError::DuplicateName(member.to_string()).into());
            }
            let wide = *value as i128;
            if wide < range.0 || wide > range.1 {
                return Err(LayoutError::value_range(value, underlying.name()));
            }
            checked.push((member.to_string(), *value));
        }

        Ok(Self {
            name: name.to_string(),
            negative: checked.iter().any(|(_, v)| *v < 0),
            underlying,
            members: checked,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn underlying(&self) -> &Type {
        &self.underlying
    }

    pub fn members(&self) -> &[(String, i64)] {
        &self.members
    }

    pub fn index_of(&self, member: &str) -> Option<usize> {
        self.members.iter().position(|(n, _)| n == member)
    }

    pub fn value_of(&self, member: &str) -> Option<i64> {
        self.index_of(member).map(|i| self.members[i].1)
    }

    pub fn has_negative_values(&self) -> bool {
        self.negative
    }

    pub fn width(&self) -> usize {
        match &self.underlying {
            Type::Int(int) => int.bytes(),
            _ => 1,
        }
    }

    /// Bits a bit field needs to hold any member, zig-zag encoded when
    /// some member is negative.
    pub fn required_bits(&self) -> u32 {
        let values = self.members.iter().map(|(_, v)| *v);
        let widest = if self.negative {
            values.map(bit_ops::zigzag_encode).max()
        } else {
            values.map(|v| v as u64).max()
        };
        bit_ops::required_bits(widest.unwrap_or(0)) as u32
    }

    /// Value stored in a bit field for the member at `index`.
    pub(crate) fn bit_field_value(&self, index: usize) -> u64 {
        let value = self.members[index].1;
        if self.negative {
            bit_ops::zigzag_encode(value)
        } else {
            value as u64
        }
    }

    pub(crate) fn encode(&self, index: usize) -> Result<Vec<u8>> {
        let value = self.members[index].1;
        match &self.underlying {
            Type::Int(int) => int.encode(value as i128),
            _ => Ok(vec![value as u8]),
        }
    }
}
