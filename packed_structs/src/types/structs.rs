use std::sync::Arc;

use tracing::{debug, trace};

use super::{EnumType, IntType, Type};
use crate::constants::ConstantPool;
use crate::error::{Result, StructureError};
use crate::ident;

const PADDING_PREFIX: &str = "paddingByte";

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    name: String,
    offset: usize,
    ty: Type,
    padding: bool,
}

impl Member {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte offset from the start of the struct.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Whether the member was inserted for alignment.
    pub fn is_padding(&self) -> bool {
        self.padding
    }
}

/// A struct layout. Finalized structs have a size and may be stored in
/// place; open ones (frozen without finalizing) are always referenced.
#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    name: String,
    members: Vec<Member>,
    alignment: usize,
    size: Option<usize>,
    constants: ConstantPool,
    enums: Vec<Arc<EnumType>>,
}

impl StructType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == name)
    }

    /// Largest member alignment, at least 1.
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Total width including trailing padding, if finalized.
    pub fn size(&self) -> Option<usize> {
        self.size
    }

    pub fn is_finalized(&self) -> bool {
        self.size.is_some()
    }

    pub fn constants(&self) -> &ConstantPool {
        &self.constants
    }

    /// Enum types declared alongside the struct without a member using them.
    pub fn enums(&self) -> &[Arc<EnumType>] {
        &self.enums
    }

    /// Same layout with member types replaced, in order.
    pub(crate) fn with_member_types(&self, types: Vec<Type>) -> StructType {
        let members = self
            .members
            .iter()
            .zip(types)
            .map(|(member, ty)| Member { ty, ..member.clone() })
            .collect();
        StructType {
            members,
            ..self.clone()
        }
    }
}

/// Struct layout under construction.
#[derive(Debug, Clone)]
pub(crate) struct StructLayout {
    name: String,
    members: Vec<Member>,
    alignment: usize,
    // None once an unsized member has been stored in place
    cursor: Option<usize>,
    padding_count: usize,
    pub(crate) constants: ConstantPool,
    pub(crate) enums: Vec<Arc<EnumType>>,
}

impl StructLayout {
    pub(crate) fn new(name: &str) -> Result<Self> {
        ident::validate(name)?;
        Ok(Self {
            name: name.to_string(),
            members: Vec::new(),
            alignment: 1,
            cursor: Some(0),
            padding_count: 0,
            constants: ConstantPool::new(),
            enums: Vec::new(),
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn members(&self) -> &[Member] {
        &self.members
    }

    /// Appends a member, first inserting padding bytes up to its alignment.
    /// Returns the number of padding members inserted.
    pub(crate) fn add_member(&mut self, name: &str, ty: Type) -> Result<usize> {
        if self.members.iter().any(|m| m.name == name) {
            return Err(StructureError::DuplicateMember {
                owner: self.name.clone(),
                name: name.to_string(),
            }
            .into());
        }
        ident::validate(name)?;
        let Some(cursor) = self.cursor else {
            return Err(StructureError::UnsizedTail {
                owner: self.name.clone(),
                name: name.to_string(),
            }
            .into());
        };

        let alignment = ty.alignment();
        let padding = self.pad_to(cursor, alignment);
        let offset = cursor + padding;
        trace!(owner = %self.name, member = name, offset, ty = %ty.unique_name(), "placing member");

        self.cursor = ty.width().ok().map(|width| offset + width);
        self.alignment = self.alignment.max(alignment);
        self.members.push(Member {
            name: name.to_string(),
            offset,
            ty,
            padding: false,
        });
        Ok(padding)
    }

    fn pad_to(&mut self, mut cursor: usize, alignment: usize) -> usize {
        let mut added = 0;
        while cursor % alignment != 0 {
            let name = self.next_padding_name();
            self.members.push(Member {
                name,
                offset: cursor,
                ty: Type::Int(IntType::INT8),
                padding: true,
            });
            cursor += 1;
            added += 1;
        }
        added
    }

    // skips counter values a user member already took
    fn next_padding_name(&mut self) -> String {
        loop {
            let name = format!("{PADDING_PREFIX}{}", self.padding_count);
            self.padding_count += 1;
            if !self.members.iter().any(|m| m.name == name) {
                return name;
            }
        }
    }

    /// Pads the layout to `alignment` and fixes its size. Returns the type and
    /// the number of trailing padding members.
    pub(crate) fn finalize(mut self, alignment: usize) -> Result<(StructType, usize)> {
        if alignment == 0 {
            return Err(StructureError::ZeroAlignment.into());
        }
        let cursor = match self.cursor {
            None => return Err(StructureError::Unsized(self.name).into()),
            Some(0) => return Err(StructureError::EmptyStruct(self.name).into()),
            Some(cursor) => cursor,
        };
        let padding = self.pad_to(cursor, alignment);
        let size = cursor + padding;
        debug!(record = %self.name, size, alignment = self.alignment, padding, "finalized struct");
        Ok((self.freeze(Some(size)), padding))
    }

    /// Freezes the layout without a size.
    pub(crate) fn into_open(self) -> StructType {
        self.freeze(None)
    }

    fn freeze(self, size: Option<usize>) -> StructType {
        StructType {
            name: self.name,
            members: self.members,
            alignment: self.alignment,
            size,
            constants: self.constants,
            enums: self.enums,
        }
    }
}
