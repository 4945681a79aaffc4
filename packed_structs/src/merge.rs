//! Reconciling independently built types that share a unique name.
//!
//! Two values built from the same description produce equal types, except
//! where one of them only knows part of the picture: a null reference does
//! not know its target. Merging fills in what is known and rejects genuine
//! conflicts.
//!
//! ```rust
//! use packed_structs::merge::collect_types;
//! use packed_structs::types::Type;
//! use packed_structs::values::{StructBuilder, Value};
//!
//! let first = StructBuilder::new("Entry")?.add("label", None::<&str>)?.finalize()?;
//! let second = StructBuilder::new("Entry")?.add("label", "text")?.finalize()?;
//!
//! let roots = [Value::from(first).ty(), Value::from(second).ty()];
//! let types = collect_types(&roots)?;
//! let label = match types.get("Entry") {
//!     Some(Type::Struct(entry)) => entry.member("label").map(|m| m.ty().unique_name()),
//!     _ => None,
//! };
//! assert_eq!(label.as_deref(), Some("ref32->char[]"));
//! # Ok::<(), packed_structs::LayoutError>(())
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{LayoutError, Result};
use crate::types::{Member, ReferenceArrayType, Type};

/// Merges two types, letting a null type stand for "not known yet".
pub fn merge_types(a: &Type, b: &Type) -> Result<Type> {
    match (a, b) {
        (Type::Null, other) | (other, Type::Null) => Ok(other.clone()),
        _ => a.merge(b),
    }
}

impl Type {
    /// The common type of `self` and `other`, or an error if they differ in
    /// more than what null references leave open.
    pub fn merge(&self, other: &Type) -> Result<Type> {
        let conflict = |detail: &str| LayoutError::merge(&self.unique_name(), &other.unique_name(), detail);

        match (self, other) {
            (Type::Int(a), Type::Int(b)) if a == b => Ok(self.clone()),
            (Type::Char, Type::Char) | (Type::Null, Type::Null) => Ok(self.clone()),

            (Type::Reference(a), Type::Reference(b)) => {
                if a.width() != b.width() {
                    return Err(conflict("reference widths differ"));
                }
                Ok(Type::reference(merge_types(a.target(), b.target())?, a.width()))
            }

            (Type::SimpleArray(a), Type::SimpleArray(b)) => {
                if a.fixed_size() != b.fixed_size() {
                    return Err(conflict("fixed sizes differ"));
                }
                if a.alignment() != b.alignment() {
                    return Err(conflict("alignments differ"));
                }
                if a.element().unique_name() == b.element().unique_name() {
                    return Ok(self.clone());
                }
                let element = a.element().merge(b.element())?;
                Ok(Type::SimpleArray(a.with_element(element)))
            }

            (Type::ReferenceArray(a), Type::ReferenceArray(b)) => {
                if a.fixed_size() != b.fixed_size() {
                    return Err(conflict("fixed sizes differ"));
                }
                if a.width() != b.width() {
                    return Err(conflict("reference widths differ"));
                }
                if a.target().unique_name() == b.target().unique_name() {
                    return Ok(self.clone());
                }
                let target = merge_types(a.target(), b.target())?;
                Ok(Type::ReferenceArray(ReferenceArrayType::new(
                    target,
                    a.fixed_size(),
                    a.width(),
                )?))
            }

            (Type::BitField(a), Type::BitField(b)) => {
                if a.name() != b.name() || a.total_bits() != b.total_bits() {
                    return Err(conflict("names or word widths differ"));
                }
                if a.fields() != b.fields() {
                    return Err(conflict("field layouts differ"));
                }
                Ok(self.clone())
            }

            (Type::BitFieldArray(a), Type::BitFieldArray(b)) => {
                if a != b {
                    return Err(conflict("field lists differ"));
                }
                Ok(self.clone())
            }

            (Type::Enum(a), Type::Enum(b)) => {
                if a != b {
                    return Err(conflict("enum members differ"));
                }
                Ok(self.clone())
            }

            (Type::Struct(a), Type::Struct(b)) => {
                if a.name() != b.name() {
                    return Err(conflict("names differ"));
                }
                if a.size() != b.size() {
                    return Err(conflict("one is finalized, or the sizes differ"));
                }
                let names = |members: &[Member]| -> Vec<String> {
                    members.iter().map(|m| m.name().to_string()).collect()
                };
                if names(a.members()) != names(b.members()) {
                    return Err(conflict("member lists differ"));
                }

                let pairs = a.members().iter().zip(b.members());
                if pairs.clone().all(|(x, y)| x.ty().unique_name() == y.ty().unique_name()) {
                    return Ok(self.clone());
                }
                let types = pairs
                    .map(|(x, y)| {
                        if x.ty().unique_name() == y.ty().unique_name() {
                            Ok(x.ty().clone())
                        } else {
                            x.ty().merge(y.ty())
                        }
                    })
                    .collect::<Result<Vec<_>>>()?;
                debug!(record = %a.name(), "rebuilt struct type from merged members");
                Ok(Type::Struct(Arc::new(a.with_member_types(types))))
            }

            _ => Err(conflict("different kinds of type")),
        }
    }
}

/// Types by unique name, in first-visit order.
#[derive(Debug, Clone, Default)]
pub struct TypeMap {
    types: Vec<(String, Type)>,
    index: HashMap<String, usize>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `ty`, merging it into an existing type of the same unique name.
    pub fn insert(&mut self, ty: Type) -> Result<()> {
        let key = ty.unique_name();
        match self.index.get(&key) {
            Some(&slot) => {
                let merged = self.types[slot].1.merge(&ty)?;
                self.types[slot].1 = merged;
            }
            None => {
                self.index.insert(key.clone(), self.types.len());
                self.types.push((key, ty));
            }
        }
        Ok(())
    }

    pub fn get(&self, unique_name: &str) -> Option<&Type> {
        self.index.get(unique_name).map(|&slot| &self.types[slot].1)
    }

    pub fn contains(&self, unique_name: &str) -> bool {
        self.index.contains_key(unique_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.types.iter().map(|(name, ty)| (name.as_str(), ty))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Every type reachable from `roots`, children before parents, merged by
/// unique name.
pub fn collect_types<'a>(roots: impl IntoIterator<Item = &'a Type>) -> Result<TypeMap> {
    let mut map = TypeMap::new();
    for root in roots {
        for ty in root.all_contained_types() {
            map.insert(ty)?;
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IntType, RefWidth};

    #[test]
    fn null_targets_are_absorbed() -> Result<()> {
        let unknown = Type::reference(Type::Null, RefWidth::W16);
        let known = Type::reference(Type::char_array(), RefWidth::W16);
        assert_eq!(unknown.merge(&known)?, known);
        assert_eq!(known.merge(&unknown)?, known);
        assert_eq!(merge_types(&Type::Null, &known)?, known);
        Ok(())
    }

    #[test]
    fn mismatches_are_rejected() {
        let narrow = Type::reference(Type::Null, RefWidth::W8);
        let wide = Type::reference(Type::Null, RefWidth::W32);
        assert!(matches!(narrow.merge(&wide), Err(LayoutError::MergeIncompatibility { .. })));
        assert!(Type::Int(IntType::INT8).merge(&Type::Int(IntType::UINT8)).is_err());
        assert!(Type::Char.merge(&Type::Int(IntType::UINT8)).is_err());
    }

    #[test]
    fn map_keeps_first_visit_order() -> Result<()> {
        let mut map = TypeMap::new();
        map.insert(Type::Int(IntType::INT32))?;
        map.insert(Type::Char)?;
        map.insert(Type::Int(IntType::INT32))?;
        let names: Vec<_> = map.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["int32_t", "char"]);
        assert!(map.contains("char"));
        Ok(())
    }
}
