use packed_data::prelude::*;

fn main() -> Result<()> {
    println!("=== Packed Data Quick Start ===\n");

    let class = Enumeration::new("Class", IntType::UINT8, &[("WARRIOR", 0), ("MAGE", 1), ("ROGUE", 2)])?;

    let mut players = Vec::new();
    for (name, x, y, class_name) in [("Ada", 100, 200, "MAGE"), ("Brom", 150, 250, "WARRIOR"), ("Cid", 200, 300, "ROGUE")] {
        println!("  Player {name}: pos=({x}, {y}), class={class_name}");
        let status = BitFieldValue::with_bits("Status", 8)?
            .add_flag("alive", true)?
            .add_enum("role", &class.get(class_name)?)?;
        players.push(
            StructBuilder::new("Player")?
                .add_int16("x", x)?
                .add_int16("y", y)?
                .add("status", status)?
                .add_string("name", Some(name), StringOptions::default().with_reference_width(RefWidth::W16))?
                .finalize()?,
        );
    }

    let root = StructBuilder::new("Save")?
        .add_int32_constant("VERSION", 1)?
        .add_uint32("version", 1)?
        .add("players", players)?
        .add_string("motto", Some("pack once, read anywhere"), StringOptions::default())?
        .finalize()?;
    let root: Value = root.into();

    // Save the document
    let written = save_document("players.bin", &root, &PackOptions::default())?;
    println!("\n✓ Saved {written} bytes");

    // Types a reader needs declarations for, children first
    println!("\n=== Declared Types ===");
    for (unique, ty) in collect_types([&root.ty()])?.iter() {
        match ty.width() {
            Ok(width) => println!("  {:<28} {:>3} bytes, align {}", unique, width, ty.alignment()),
            Err(_) => println!("  {:<28} unsized, align {}", unique, ty.alignment()),
        }
    }

    std::fs::remove_file("players.bin")?;
    Ok(())
}
