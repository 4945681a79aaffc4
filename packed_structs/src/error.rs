use packed_bits::PackedBitsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("value {value} does not fit in {ty}")]
    ValueRange { value: String, ty: String },

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error("`{name}` {issue}")]
    Identifier { name: String, issue: IdentifierIssue },

    #[error("bit field `{name}`: {source}")]
    BitFieldOverflow {
        name: String,
        #[source]
        source: PackedBitsError,
    },

    #[error("cannot merge `{left}` with `{right}`: {detail}")]
    MergeIncompatibility {
        left: String,
        right: String,
        detail: String,
    },

    #[error("cannot pack a reference without a byte offset (is it contained in a struct?)")]
    UnresolvedContext,
}

impl LayoutError {
    pub(crate) fn value_range(value: impl ToString, ty: impl ToString) -> Self {
        LayoutError::ValueRange {
            value: value.to_string(),
            ty: ty.to_string(),
        }
    }

    pub(crate) fn bit_field(name: &str, source: PackedBitsError) -> Self {
        LayoutError::BitFieldOverflow {
            name: name.to_string(),
            source,
        }
    }

    pub(crate) fn merge(left: &str, right: &str, detail: impl Into<String>) -> Self {
        LayoutError::MergeIncompatibility {
            left: left.to_string(),
            right: right.to_string(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("struct `{owner}` already has a member named `{name}`")]
    DuplicateMember { owner: String, name: String },

    #[error("cannot finalize empty struct `{0}`")]
    EmptyStruct(String),

    #[error("`{0}` has no defined width")]
    Unsized(String),

    #[error("struct `{owner}` ends in an unsized member; cannot add `{name}`")]
    UnsizedTail { owner: String, name: String },

    #[error("arrays need at least one element")]
    EmptyArray,

    #[error("arrays cannot hold references (`{0}`)")]
    ReferenceElement(String),

    #[error("{len} elements do not fit a fixed size of {fixed}")]
    ArrayTooLong { len: usize, fixed: usize },

    #[error("element of type `{found}` does not belong in an array of `{expected}`")]
    ElementType { expected: String, found: String },

    #[error("alignment {requested} is smaller than the element alignment {minimum}")]
    AlignmentTooSmall { requested: usize, minimum: usize },

    #[error("alignment must be at least 1")]
    ZeroAlignment,

    #[error("a reference target type may only be given for a null reference")]
    TypedNonNullReference,

    #[error("a fixed-width string cannot be a null reference")]
    FixedNullString,

    #[error("a null value cannot be stored in place (`{0}`)")]
    NullImmediate(String),

    #[error("expected {expected} field values, received {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("`{owner}` has no field `{name}`")]
    UnknownField { owner: String, name: String },

    #[error("`{0}` was given twice")]
    DuplicateName(String),

    #[error("bit field arrays need at least one field")]
    NoFields,

    #[error("enum `{enumeration}` has no member `{name}`")]
    UnknownEnumMember { enumeration: String, name: String },

    #[error("enum `{0}` needs at least one member")]
    EmptyEnum(String),

    #[error("`{0}` cannot be the underlying type of an enum")]
    EnumUnderlying(String),

    #[error("constant pool already defines `{0}`")]
    DuplicateConstant(String),

    #[error("`{0}` has no literal form")]
    NoLiteral(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdentifierIssue {
    #[error("is not a valid identifier")]
    Syntax,

    #[error("ends with the reserved suffix `ByteOffset`")]
    ReservedSuffix,

    #[error("is a reserved keyword")]
    Keyword,

    #[error("is reserved for bit field array headers")]
    Reserved,
}

pub type Result<T> = core::result::Result<T, LayoutError>;
