use packed_structs::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Packed Struct Bit-Field Examples ===\n");

    // Example 1: Flags and small counters sharing one word
    example_1_status_word()?;

    // Example 2: Signed and enum fields
    example_2_signed_and_enum()?;

    // Example 3: A table whose field widths come from the data
    example_3_bit_field_array()?;

    Ok(())
}

fn example_1_status_word() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Example 1: Status Word ---");

    let status = BitFieldValue::with_bits("Status", 16)?
        .add_flag("enabled", true)?
        .add_flag("interrupt", false)?
        .add("retries", 5, 3)?
        .add("level", 9, 4)?;

    for (index, field) in status.ty().fields().iter().enumerate() {
        println!(
            "  {:<10} bits {:>2}..{:<2}",
            field.name(),
            status.ty().shift(index),
            status.ty().shift(index) + field.width()
        );
    }
    println!("  Packed word: {:#06x}", status.word()?);
    println!("  Unique name: {}\n", Value::from(status).ty().unique_name());

    Ok(())
}

fn example_2_signed_and_enum() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Example 2: Signed and Enum Fields ---");

    let direction = Enumeration::new(
        "Direction",
        IntType::INT8,
        &[("BACK", -1), ("STOP", 0), ("AHEAD", 1)],
    )?;
    let motion = BitFieldValue::new("Motion")?
        .add_signed("turn", -12, 6)?
        .add_enum("direction", &direction.get("BACK")?)?
        .add("speed", 300, 10)?;

    let record = StructBuilder::new("Vehicle")?
        .add_uint16("id", 7)?
        .add("motion", motion)?
        .finalize()?;
    let bytes = pack_document(&record.into(), &PackOptions::default())?;

    println!("  Document: {:02x?}", bytes);
    let word = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let zigzag = |bits: u32| ((bits >> 1) as i32) ^ -((bits & 1) as i32);
    println!("  turn      = {}", zigzag(word & 0x3f));
    println!("  direction = {}", zigzag((word >> 6) & 0x3));
    println!("  speed     = {}\n", (word >> 8) & 0x3ff);

    Ok(())
}

fn example_3_bit_field_array() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Example 3: Bit Field Array ---");

    let tiles = BitFieldArrayValue::new("Tiles", &["kind", "height", "flags"])?
        .push([3, 120, 0])?
        .push([1, 7, 1])?
        .push_named(vec![("flags", 2), ("kind", 0), ("height", 64)])?;
    println!("  Field widths: {:?}", tiles.field_widths()?);

    let record = StructBuilder::new("Map")?
        .add_uint32("width", 3)?
        .add("tiles", tiles)?
        .finalize()?;
    let bytes = pack_document(&record.into(), &PackOptions::default())?;
    println!("  Document ({} bytes): {:02x?}", bytes.len(), bytes);

    Ok(())
}
