//! Named literals attached to a struct and emitted as declarations, never
//! as data bytes.

use crate::error::{Result, StructureError};
use crate::ident;
use crate::types::Type;
use crate::values::{RawValue, Value, value_of};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantPool {
    constants: Vec<(String, Value)>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constant. The value must have a literal form (integer, char,
    /// string or enum member) and the name must be new.
    pub fn add(&mut self, name: &str, value: impl Into<RawValue>) -> Result<()> {
        ident::validate(name)?;
        if self.get(name).is_some() {
            return Err(StructureError::DuplicateConstant(name.to_string()).into());
        }
        let value = value_of(value)?;
        value.literal()?;
        self.constants.push((name.to_string(), value));
        Ok(())
    }

    pub fn add_int32(&mut self, name: &str, value: i32) -> Result<()> {
        self.add(name, Value::int32(value))
    }

    pub fn add_char(&mut self, name: &str, value: char) -> Result<()> {
        self.add(name, Value::char(value)?)
    }

    /// Adds constants in order. With `ignore_private`, names starting with
    /// `_` are skipped.
    pub fn extend<I, S, V>(&mut self, constants: I, ignore_private: bool) -> Result<()>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<RawValue>,
    {
        for (name, value) in constants {
            let name = name.as_ref();
            if ignore_private && name.starts_with('_') {
                continue;
            }
            self.add(name, value)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.constants
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.constants.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// `(declared type, name, literal)` for every constant, in insertion order.
    pub fn declarations(&self) -> Result<Vec<(String, String, String)>> {
        self.constants
            .iter()
            .map(|(name, value)| {
                let ty = value.ty();
                let mut declared = ty.name();
                if let Type::SimpleArray(array) = &ty {
                    match array.fixed_size() {
                        Some(n) => declared.push_str(&format!("[{n}]")),
                        None => declared.push_str("[]"),
                    }
                }
                Ok((declared, name.clone(), value.literal()?))
            })
            .collect()
    }
}
