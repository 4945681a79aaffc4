//! Identifier rules for member, field, enum member and constant names.
//!
//! Names end up as declarations in generated C++ headers, so they must be
//! plain identifiers, must not be keywords, and must not end with the suffix
//! that reference accessors append to their offset members.

use crate::error::{IdentifierIssue, LayoutError, Result};

/// Suffix appended to the storage member of every reference.
pub const REFERENCE_SUFFIX: &str = "ByteOffset";

/// Header member of every bit field array declaration.
pub const ENTRY_BITS_FIELD: &str = "bitFieldArrayEntryBits";

const KEYWORDS: &[&str] = &[
    "alignas",
    "alignof",
    "and",
    "and_eq",
    "asm",
    "auto",
    "bitand",
    "bitor",
    "bool",
    "break",
    "case",
    "catch",
    "char",
    "char16_t",
    "char32_t",
    "class",
    "compl",
    "const",
    "constexpr",
    "const_cast",
    "continue",
    "decltype",
    "default",
    "delete",
    "do",
    "double",
    "dynamic_cast",
    "else",
    "enum",
    "explicit",
    "export",
    "extern",
    "false",
    "float",
    "for",
    "friend",
    "goto",
    "if",
    "inline",
    "int",
    "long",
    "mutable",
    "namespace",
    "new",
    "noexcept",
    "not",
    "not_eq",
    "nullptr",
    "operator",
    "or",
    "or_eq",
    "private",
    "protected",
    "public",
    "register",
    "reinterpret_cast",
    "return",
    "short",
    "signed",
    "sizeof",
    "static",
    "static_assert",
    "static_cast",
    "struct",
    "switch",
    "template",
    "this",
    "thread_local",
    "throw",
    "true",
    "try",
    "typedef",
    "typeid",
    "typename",
    "union",
    "unsigned",
    "using",
    "virtual",
    "void",
    "volatile",
    "wchar_t",
    "while",
    "xor",
    "xor_eq",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

/// Checks that `name` can be used as a declared name.
pub fn validate(name: &str) -> Result<()> {
    let issue = if !is_identifier(name) {
        IdentifierIssue::Syntax
    } else if name.ends_with(REFERENCE_SUFFIX) {
        IdentifierIssue::ReservedSuffix
    } else if is_keyword(name) {
        IdentifierIssue::Keyword
    } else {
        return Ok(());
    };
    Err(LayoutError::Identifier {
        name: name.to_string(),
        issue,
    })
}
