use packed_bits::table::{Cell, TableHeader};
use packed_bits::{BitBuffer, WordLayout, bit_ops, table};

fn main() {
    println!("=== Packed Bits Examples ===\n");

    // Example 1: Signed and unsigned fields in one word
    let _ = example_bitfield_word();

    // Example 2: A variable-width record table
    let _ = example_record_table();

    // Example 3: Raw bit sequences
    let _ = example_bit_buffer();
}

fn example_bitfield_word() -> Result<(), packed_bits::PackedBitsError> {
    println!("Example 1: Packing a 16-bit status word");

    let mut layout = WordLayout::new(16)?;
    layout.push(1)?; // visible
    layout.push(5)?; // signed temperature delta
    layout.push(4)?; // level

    let word = layout.pack(&[1, bit_ops::zigzag_encode(-7), 9])?;
    let fields = layout.unpack(word);

    println!("  Packed word: {:#06x}", word);
    println!("  visible = {}", fields[0]);
    println!("  delta   = {}", bit_ops::zigzag_decode(fields[1]));
    println!("  level   = {}", fields[2]);
    println!();

    Ok(())
}

fn example_record_table() -> Result<(), packed_bits::PackedBitsError> {
    println!("Example 2: Record table with per-field widths");

    let rows: Vec<Vec<Cell>> = (0..10u64)
        .map(|i| vec![Cell::Int(i * i), Cell::Int(i % 2)])
        .collect();
    let bytes = table::encode(&rows, 2)?;
    let header = TableHeader::parse(&bytes, 2)?;

    println!("  Stride: {} bits", header.stride());
    println!("  Square width: {} bits", header.field_width(0));
    println!("  Parity width: {} bits", header.field_width(1));
    println!("  Total size: {} bytes (vs {} as u32 pairs)", bytes.len(), 10 * 8);
    println!("  Entry 7 square: {:?}", header.read(&bytes, 7, 0));
    println!();

    Ok(())
}

fn example_bit_buffer() -> Result<(), packed_bits::PackedBitsError> {
    println!("Example 3: Bit sequences");

    let mut buffer = BitBuffer::new();
    buffer.push_bits(&[1, 0, 0, 1], 4)?;
    buffer.push(0b1010, 4)?;

    println!("  Bits: {:?}", buffer.iter().collect::<Vec<_>>());
    println!("  Bytes: {:02x?}", buffer.as_bytes());

    Ok(())
}
