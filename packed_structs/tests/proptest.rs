// tests/proptest.rs

mod common;

use common::*;
use packed_bits::bit_ops;
use packed_structs::prelude::*;
use packed_structs::Result;
use proptest::prelude::*;

//
// -----------------------------------------------------------------------------
// Helper Functions
// -----------------------------------------------------------------------------

fn document(value: impl Into<Value>) -> Result<Vec<u8>> {
    pack_document(&value.into(), &PackOptions::default())
}

fn ref_width() -> impl Strategy<Value = RefWidth> {
    prop_oneof![Just(RefWidth::W8), Just(RefWidth::W16), Just(RefWidth::W32)]
}

/// A scalar member: which integer type and the raw value truncated into it.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scalar {
    I8(i8),
    U16(u16),
    I32(i32),
    U64(u64),
}

fn scalar() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        any::<i8>().prop_map(Scalar::I8),
        any::<u16>().prop_map(Scalar::U16),
        any::<i32>().prop_map(Scalar::I32),
        any::<u64>().prop_map(Scalar::U64),
    ]
}

fn add_scalar(builder: StructBuilder, name: &str, scalar: Scalar) -> Result<StructBuilder> {
    match scalar {
        Scalar::I8(v) => builder.add_int8(name, v),
        Scalar::U16(v) => builder.add_uint16(name, v),
        Scalar::I32(v) => builder.add_int32(name, v),
        Scalar::U64(v) => builder.add_uint64(name, v),
    }
}

fn read_scalar(bytes: &[u8], at: usize, scalar: Scalar) -> Scalar {
    match scalar {
        Scalar::I8(_) => Scalar::I8(i8_at(bytes, at)),
        Scalar::U16(_) => Scalar::U16(u16_at(bytes, at)),
        Scalar::I32(_) => Scalar::I32(i32_at(bytes, at)),
        Scalar::U64(_) => Scalar::U64(u64_at(bytes, at)),
    }
}

/// Text without NUL bytes, so it reads back as a C string.
fn text() -> impl Strategy<Value = String> {
    "[^\\x00]{0,24}"
}

//
// -----------------------------------------------------------------------------
// Struct layout
// -----------------------------------------------------------------------------

proptest! {
    #[test]
    fn prop_members_are_aligned_and_read_back(scalars in prop::collection::vec(scalar(), 1..16)) {
        let mut builder = StructBuilder::new("Mixed").unwrap();
        for (i, &value) in scalars.iter().enumerate() {
            builder = add_scalar(builder, &format!("m{i}"), value).unwrap();
        }
        let record = builder.finalize().unwrap();
        let ty = record.ty().clone();
        let bytes = document(record).unwrap();

        let size = ty.size().unwrap();
        prop_assert_eq!(size % 4, 0);
        prop_assert_eq!(bytes.len(), size);
        for (i, &value) in scalars.iter().enumerate() {
            let member = ty.member(&format!("m{i}")).unwrap();
            prop_assert_eq!(member.offset() % member.ty().alignment(), 0);
            prop_assert_eq!(read_scalar(&bytes, member.offset(), value), value);
        }
        // padding members are zero
        for member in ty.members().iter().filter(|m| m.is_padding()) {
            prop_assert_eq!(bytes[member.offset()], 0);
        }
    }

    #[test]
    fn prop_null_references_are_zero(widths in prop::collection::vec(ref_width(), 1..12)) {
        let mut builder = StructBuilder::new("Nulls").unwrap();
        for (i, &width) in widths.iter().enumerate() {
            builder = builder.add_reference(&format!("r{i}"), None::<i32>, width).unwrap();
        }
        let bytes = document(builder.finalize().unwrap()).unwrap();
        prop_assert!(bytes.iter().all(|&b| b == 0));
        prop_assert_eq!(bytes.len() % 4, 0);
    }

    #[test]
    fn prop_strings_read_back(texts in prop::collection::vec(text(), 1..8)) {
        let mut builder = StructBuilder::new("Texts").unwrap();
        for (i, text) in texts.iter().enumerate() {
            builder = builder
                .add_string(&format!("s{i}"), Some(text.as_str()), StringOptions::default())
                .unwrap();
        }
        let bytes = document(builder.finalize().unwrap()).unwrap();
        for (i, text) in texts.iter().enumerate() {
            let target = ref32(&bytes, 0, 4 * i).unwrap();
            prop_assert_eq!(c_str(&bytes, target), text.as_str());
        }
    }

    #[test]
    fn prop_string_tables_read_back(texts in prop::collection::vec(text(), 1..8), width in ref_width()) {
        let record = StructBuilder::new("Table")
            .unwrap()
            .add_reference_array("items", texts.clone(), None, width)
            .unwrap()
            .finalize()
            .unwrap();
        let bytes = match document(record) {
            Ok(bytes) => bytes,
            // 8-bit offsets run out on long tables
            Err(LayoutError::ValueRange { .. }) if width == RefWidth::W8 => return Ok(()),
            Err(err) => panic!("{err}"),
        };
        let table = ref32(&bytes, 0, 0).unwrap();
        for (i, text) in texts.iter().enumerate() {
            let target = match width {
                RefWidth::W8 => ref8(&bytes, table, i),
                RefWidth::W16 => ref16(&bytes, table, 2 * i),
                RefWidth::W32 => ref32(&bytes, table, 4 * i),
            };
            prop_assert_eq!(c_str(&bytes, target.unwrap()), text.as_str());
        }
    }

    #[test]
    fn prop_referred_data_is_aligned(prefix in text(), values in prop::collection::vec(any::<i32>(), 1..8)) {
        let record = StructBuilder::new("Aligned")
            .unwrap()
            .add("prefix", prefix.as_str())
            .unwrap()
            .add("values", values.clone())
            .unwrap()
            .finalize()
            .unwrap();
        let bytes = document(record).unwrap();
        let start = ref32(&bytes, 0, 4).unwrap();
        prop_assert_eq!(start % 4, 0);
        for (i, &value) in values.iter().enumerate() {
            prop_assert_eq!(i32_at(&bytes, start + 4 * i), value);
        }
    }
}

//
// -----------------------------------------------------------------------------
// Bit-packed data
// -----------------------------------------------------------------------------

/// Unsigned fields that fit a 32-bit word together.
fn fields() -> impl Strategy<Value = Vec<(u64, u32)>> {
    prop::collection::vec(1u32..=8, 1..4).prop_flat_map(|widths| {
        widths
            .into_iter()
            .map(|width| (0..=bit_ops::low_mask(width as usize), Just(width)))
            .collect::<Vec<_>>()
    })
}

proptest! {
    #[test]
    fn prop_bit_fields_read_back(fields in fields(), delta in -8i64..8) {
        let mut bits = BitFieldValue::new("Word").unwrap();
        for (i, &(value, width)) in fields.iter().enumerate() {
            bits = bits.add(&format!("f{i}"), value, width).unwrap();
        }
        bits = bits.add_signed("delta", delta, 4).unwrap();
        let ty = bits.ty().clone();

        let record = StructBuilder::new("Holder").unwrap().add("bits", bits).unwrap().finalize().unwrap();
        let bytes = document(record).unwrap();
        let word = u64::from(u32_at(&bytes, 0));

        let mut shift = 0;
        for (i, &(value, width)) in fields.iter().enumerate() {
            prop_assert_eq!(ty.shift(i), shift);
            prop_assert_eq!(field(word, shift, width), value);
            shift += width;
        }
        prop_assert_eq!(signed_field(word, shift, 4), delta);
        prop_assert_eq!(word >> (shift + 4), 0);
    }

    #[test]
    fn prop_bit_field_arrays_read_back(rows in prop::collection::vec(prop::collection::vec(0i64..(1 << 20), 3), 1..24)) {
        let table = BitFieldArrayValue::new("Rows", &["a", "b", "c"])
            .unwrap()
            .push_all(rows.clone())
            .unwrap();
        let widths = table.field_widths().unwrap();

        let record = StructBuilder::new("Holder").unwrap().add("rows", table).unwrap().finalize().unwrap();
        let bytes = document(record).unwrap();
        let at = ref32(&bytes, 0, 0).unwrap();
        let header = table_header(&bytes, at, 3);

        prop_assert_eq!(header.stride(), widths.iter().sum::<usize>());
        if header.stride() > 0 {
            prop_assert!(header.capacity(&bytes[at..]) >= rows.len());
        }
        for (field, &width) in widths.iter().enumerate() {
            prop_assert_eq!(header.field_width(field), width);
            let widest = rows.iter().map(|row| row[field] as u64).max().unwrap();
            prop_assert_eq!(width, bit_ops::required_bits(widest));
        }
        for (entry, row) in rows.iter().enumerate() {
            for (field, &value) in row.iter().enumerate() {
                prop_assert_eq!(table_read(&bytes, at, 3, entry, field), value as u64);
            }
        }
    }

    #[test]
    fn prop_documents_are_padded(len in 1usize..40, alignment in 1usize..=8) {
        let blob = Blob::from_bytes(&vec![0xa5; len]);
        let record = StructBuilder::new("Blobby")
            .unwrap()
            .add_blob("data", blob, RefWidth::W32)
            .unwrap()
            .finalize()
            .unwrap();
        let value: Value = record.into();
        let raw = value.pack(None).unwrap().len();
        let options = PackOptions::default().with_alignment(alignment);
        let bytes = pack_document(&value, &options).unwrap();

        prop_assert_eq!(bytes.len() % alignment, 0);
        prop_assert!(bytes.len() > raw);
        prop_assert!(bytes.len() <= raw + alignment);
    }
}
