//! A reader for packed documents doing what generated accessors do: load an
//! integer at `record + offset`, follow byte offsets, shift and mask.
#![allow(dead_code)]

use packed_bits::bit_ops;
use packed_bits::table::TableHeader;

pub fn u8_at(bytes: &[u8], at: usize) -> u8 {
    bytes[at]
}

pub fn i8_at(bytes: &[u8], at: usize) -> i8 {
    bytes[at] as i8
}

pub fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes(array(bytes, at))
}

pub fn i16_at(bytes: &[u8], at: usize) -> i16 {
    i16::from_le_bytes(array(bytes, at))
}

pub fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(array(bytes, at))
}

pub fn i32_at(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes(array(bytes, at))
}

pub fn u64_at(bytes: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(array(bytes, at))
}

pub fn i64_at(bytes: &[u8], at: usize) -> i64 {
    i64::from_le_bytes(array(bytes, at))
}

fn array<const N: usize>(bytes: &[u8], at: usize) -> [u8; N] {
    bytes[at..at + N].try_into().expect("in bounds")
}

/// Target of a 32-bit reference stored at `record + member`, or `None` when null.
pub fn ref32(bytes: &[u8], record: usize, member: usize) -> Option<usize> {
    resolve(record, i64::from(i32_at(bytes, record + member)))
}

pub fn ref16(bytes: &[u8], record: usize, member: usize) -> Option<usize> {
    resolve(record, i64::from(i16_at(bytes, record + member)))
}

pub fn ref8(bytes: &[u8], record: usize, member: usize) -> Option<usize> {
    resolve(record, i64::from(u8_at(bytes, record + member)))
}

fn resolve(record: usize, offset: i64) -> Option<usize> {
    (offset != 0).then(|| (record as i64 + offset) as usize)
}

/// NUL-terminated UTF-8 string starting at `at`.
pub fn c_str(bytes: &[u8], at: usize) -> &str {
    let len = bytes[at..]
        .iter()
        .position(|&b| b == 0)
        .expect("terminated string");
    std::str::from_utf8(&bytes[at..at + len]).expect("utf-8 string")
}

/// Field of a bit field word.
pub fn field(word: u64, shift: u32, width: u32) -> u64 {
    (word >> shift) & bit_ops::low_mask(width as usize)
}

pub fn signed_field(word: u64, shift: u32, width: u32) -> i64 {
    bit_ops::zigzag_decode(field(word, shift, width))
}

/// Field `field` of entry `entry` of the bit field array starting at `at`.
pub fn table_read(bytes: &[u8], at: usize, fields: usize, entry: usize, field: usize) -> u64 {
    let table = &bytes[at..];
    TableHeader::parse(table, fields)
        .expect("table header")
        .read(table, entry, field)
        .expect("entry inside the table")
}

pub fn table_header(bytes: &[u8], at: usize, fields: usize) -> TableHeader {
    TableHeader::parse(&bytes[at..], fields).expect("table header")
}
