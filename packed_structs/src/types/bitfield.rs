use std::sync::Arc;

use packed_bits::WordLayout;

use super::EnumType;
use crate::error::{LayoutError, Result, StructureError};
use crate::ident;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Unsigned,
    /// Stored zig-zag encoded.
    Signed,
    Enum(Arc<EnumType>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BitFieldField {
    name: String,
    kind: FieldKind,
    width: u32,
}

impl BitFieldField {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Whether stored values are zig-zag encoded.
    pub fn is_zigzag(&self) -> bool {
        match &self.kind {
            FieldKind::Unsigned => false,
            FieldKind::Signed => true,
            FieldKind::Enum(enumeration) => enumeration.has_negative_values(),
        }
    }
}

/// Named fields packed LSB first into one unsigned word.
#[derive(Debug, Clone, PartialEq)]
pub struct BitFieldType {
    name: String,
    layout: WordLayout,
    fields: Vec<BitFieldField>,
}

impl BitFieldType {
    pub const DEFAULT_BITS: u32 = 32;

    pub fn new(name: &str, total_bits: u32) -> Result<Self> {
        ident::validate(name)?;
        let layout = WordLayout::new(total_bits).map_err(|e| LayoutError::bit_field(name, e))?;
        Ok(Self {
            name: name.to_string(),
            layout,
            fields: Vec::new(),
        })
    }

    pub(crate) fn push(&mut self, name: &str, kind: FieldKind, width: u32) -> Result<()> {
        if self.fields.iter().any(|f| f.name == name) {
            return Err(StructureError::DuplicateMember {
                owner: self.name.clone(),
                name: name.to_string(),
            }
            .into());
        }
        ident::validate(name)?;
        self.layout
            .push(width)
            .map_err(|e| LayoutError::bit_field(&self.name, e))?;
        self.fields.push(BitFieldField {
            name: name.to_string(),
            kind,
            width,
        });
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[BitFieldField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&BitFieldField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn total_bits(&self) -> u32 {
        self.layout.total_bits()
    }

    pub fn used_bits(&self) -> u32 {
        self.layout.used_bits()
    }

    /// Byte width of the storage word.
    pub fn width(&self) -> usize {
        self.layout.total_bytes()
    }

    /// Bit position of field `index`.
    pub fn shift(&self, index: usize) -> u32 {
        self.layout.shift(index)
    }

    pub fn unique_name(&self) -> String {
        let widths: Vec<String> = self.fields.iter().map(|f| f.width.to_string()).collect();
        format!("{}({}){}", self.name, widths.join(","), self.total_bits())
    }

    pub(crate) fn layout(&self) -> &WordLayout {
        &self.layout
    }
}
