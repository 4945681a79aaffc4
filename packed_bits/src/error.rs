#[cfg(feature = "std")]
use thiserror::Error;

#[cfg_attr(feature = "std", derive(Error))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackedBitsError {
    #[cfg_attr(
        feature = "std",
        error("word width must be one of 8, 16, 32 or 64 bits, got {0}")
    )]
    InvalidWordWidth(u32),

    #[cfg_attr(feature = "std", error("value {value} does not fit in {width} bits"))]
    ValueOverflow { value: u64, width: usize },

    #[cfg_attr(
        feature = "std",
        error("field of {requested} bits does not fit: {used} of {total} bits already used")
    )]
    FieldOverflow {
        requested: usize,
        used: usize,
        total: usize,
    },

    #[cfg_attr(feature = "std", error("bit sequences may only hold 0 or 1, found {0}"))]
    NotABit(u8),

    #[cfg_attr(
        feature = "std",
        error("expected {expected} field values, received {found}")
    )]
    FieldCount { expected: usize, found: usize },

    #[cfg_attr(
        feature = "std",
        error("entry stride of {0} bits does not fit a 16-bit header slot")
    )]
    HeaderOverflow(usize),

    #[cfg_attr(
        feature = "std",
        error("need {needed} bytes but only {available} are available")
    )]
    InsufficientBytes { needed: usize, available: usize },
}

#[cfg(not(feature = "std"))]
impl core::fmt::Display for PackedBitsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PackedBitsError::InvalidWordWidth(w) => {
                write!(f, "word width must be one of 8, 16, 32 or 64 bits, got {}", w)
            }
            PackedBitsError::ValueOverflow { value, width } => {
                write!(f, "value {} does not fit in {} bits", value, width)
            }
            PackedBitsError::FieldOverflow {
                requested,
                used,
                total,
            } => write!(
                f,
                "field of {} bits does not fit: {} of {} bits already used",
                requested, used, total
            ),
            PackedBitsError::NotABit(b) => {
                write!(f, "bit sequences may only hold 0 or 1, found {}", b)
            }
            PackedBitsError::FieldCount { expected, found } => {
                write!(f, "expected {} field values, received {}", expected, found)
            }
            PackedBitsError::HeaderOverflow(stride) => write!(
                f,
                "entry stride of {} bits does not fit a 16-bit header slot",
                stride
            ),
            PackedBitsError::InsufficientBytes { needed, available } => write!(
                f,
                "need {} bytes but only {} are available",
                needed, available
            ),
        }
    }
}
