use packed_structs::prelude::*;
use packed_structs::types::StructType;
use packed_structs::{Result, TypeMap, merge_types};

fn struct_type(value: &StructValue) -> Type {
    Type::Struct(value.ty().clone())
}

fn member_kind(ty: Option<&Type>, member: &str) -> Option<String> {
    match ty {
        Some(Type::Struct(record)) => record.member(member).map(|m| m.ty().unique_name()),
        _ => None,
    }
}

#[test]
fn collected_types_come_children_first() -> Result<()> {
    let point = StructBuilder::new("Point")?.add_int32("x", 1)?.add_int32("y", 2)?.finalize()?;
    let root = StructBuilder::new("Scene")?
        .add("origin", point)?
        .add("title", "scene")?
        .finalize()?;

    let types = collect_types([&struct_type(&root)])?;
    let names: Vec<&str> = types.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["int32_t", "Point", "char", "char[]", "ref32->char[]", "Scene"]);
    Ok(())
}

#[test]
fn null_members_learn_their_target_from_siblings() -> Result<()> {
    let blank = StructBuilder::new("Entry")?.add("label", None::<&str>)?.finalize()?;
    let filled = StructBuilder::new("Entry")?.add("label", "text")?.finalize()?;
    let roots = [struct_type(&blank), struct_type(&filled)];

    let types = collect_types(&roots)?;
    assert_eq!(member_kind(types.get("Entry"), "label").as_deref(), Some("ref32->char[]"));

    // order does not matter
    let types = collect_types(roots.iter().rev())?;
    assert_eq!(member_kind(types.get("Entry"), "label").as_deref(), Some("ref32->char[]"));
    Ok(())
}

#[test]
fn arrays_of_records_merge_their_elements() -> Result<()> {
    let entry = |label: Option<&str>| -> Result<StructValue> {
        StructBuilder::new("Entry")?.add_int32("id", 1)?.add("label", label)?.finalize()
    };
    let list = StructBuilder::new("List")?
        .add("entries", vec![entry(None)?, entry(Some("x"))?, entry(None)?])?
        .finalize()?;

    let types = collect_types([&struct_type(&list)])?;
    assert_eq!(member_kind(types.get("Entry"), "label").as_deref(), Some("ref32->char[]"));
    assert!(types.contains("Entry[]"));
    Ok(())
}

#[test]
fn recursive_open_structs_merge() -> Result<()> {
    let tail = StructBuilder::new("Node")?.add_int32("value", 2)?.add("next", None::<i32>)?;
    let head = StructBuilder::new("Node")?
        .add_int32("value", 1)?
        .add("next", tail)?
        .into_open();

    let types = collect_types([&struct_type(&head)])?;
    assert_eq!(types.len(), 4);
    assert_eq!(member_kind(types.get("Node"), "next").as_deref(), Some("ref32->Node"));
    Ok(())
}

#[test]
fn conflicting_records_are_rejected() -> Result<()> {
    let narrow = StructBuilder::new("Sample")?.add_int16("value", 1)?.finalize()?;
    let wide = StructBuilder::new("Sample")?.add_int32("value", 1)?.finalize()?;
    assert!(matches!(
        collect_types([&struct_type(&narrow), &struct_type(&wide)]),
        Err(LayoutError::MergeIncompatibility { .. })
    ));

    let renamed = StructBuilder::new("Sample")?.add_int16("other", 1)?.finalize()?;
    assert!(struct_type(&narrow).merge(&struct_type(&renamed)).is_err());

    let open = StructBuilder::new("Sample")?.add_int16("value", 1)?.into_open();
    assert!(struct_type(&narrow).merge(&struct_type(&open)).is_err());
    Ok(())
}

#[test]
fn merged_records_keep_the_first_constant_pool() -> Result<()> {
    let first = StructBuilder::new("Tagged")?
        .add_int32_constant("VERSION", 1)?
        .add("label", None::<&str>)?
        .finalize()?;
    let second = StructBuilder::new("Tagged")?
        .add_int32_constant("VERSION", 2)?
        .add("label", "tag")?
        .finalize()?;

    let merged = struct_type(&first).merge(&struct_type(&second))?;
    let Type::Struct(record) = merged else {
        panic!("expected a struct type");
    };
    let record: &StructType = &record;
    assert_eq!(record.constants().get("VERSION"), Some(&Value::int32(1)));
    assert_eq!(
        record.member("label").map(|m| m.ty().unique_name()).as_deref(),
        Some("ref32->char[]")
    );
    Ok(())
}

#[test]
fn bit_fields_and_enums_merge_only_when_identical() -> Result<()> {
    let a = BitFieldValue::with_bits("Flags", 8)?.add("x", 1, 2)?;
    let b = BitFieldValue::with_bits("Flags", 8)?.add("x", 3, 2)?;
    let c = BitFieldValue::with_bits("Flags", 8)?.add("y", 1, 2)?;
    let ty = |bits: &BitFieldValue| Value::from(bits.clone()).ty();
    assert_eq!(ty(&a).merge(&ty(&b))?, ty(&a));
    assert!(ty(&a).merge(&ty(&c)).is_err());

    let small = Enumeration::new("Level", IntType::UINT8, &[("LOW", 0), ("HIGH", 1)])?;
    let large = Enumeration::new("Level", IntType::UINT8, &[("LOW", 0), ("HIGH", 2)])?;
    let level = |e: &Enumeration| Type::Enum(e.ty().clone());
    assert!(level(&small).merge(&level(&large)).is_err());
    assert_eq!(merge_types(&Type::Null, &level(&small))?, level(&small));
    Ok(())
}

#[test]
fn type_maps_merge_on_insert() -> Result<()> {
    let mut map = TypeMap::new();
    map.insert(Type::reference(Type::Null, RefWidth::W16))?;
    assert!(map.contains("ref16->void"));
    map.insert(Type::reference(Type::char_array(), RefWidth::W16))?;
    assert_eq!(map.len(), 2);
    assert!(map.insert(Type::reference(Type::Int(IntType::INT8), RefWidth::W16)).is_ok());
    assert_eq!(map.len(), 3);
    Ok(())
}
