//! End-to-end build and export scenarios.

use truecrowd_common::hash::{hash32, hash_upper32};
use truecrowd_common::SymbolTable;
use truecrowd_db::structs::NULL_INDEX;
use truecrowd_common::CaseMode;
use truecrowd_db::{
    build, prop_set_uid, resource_path_uid, CrowdDatabase, DatabaseBuilder, Error, ExportOptions,
    ReferenceKind, ResourceType, Warning, UNRESOLVED_HEADER,
};
use truecrowd_xml::{XmlDocument, XmlNode};

const SINGLE_PED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<TrueCrowdDataBase>
    <Definition>
        <Entity name="Pedestrian">
            <EntityComponent name="Body" resourceIndex="0" required="true">
                <BoneUID>Bip01_Head</BoneUID>
                <BoneUID>Bip01_Spine</BoneUID>
            </EntityComponent>
        </Entity>
        <Tags>
            <Tag>Civilian</Tag>
        </Tags>
    </Definition>
    <ComponentEntries>
        <Component name="Body">
            <Resource name="Ped_Male_01" type="0">
                <LOD>
                    <ModelPart name="Torso" isSkinned="true" morphType="2"/>
                </LOD>
                <Tag>Civilian</Tag>
            </Resource>
        </Component>
    </ComponentEntries>
</TrueCrowdDataBase>
"#;

const FORWARD_REFERENCES: &str = r#"
<TrueCrowdDataBase>
    <Definition><Tags/></Definition>
    <ComponentEntries>
        <Component name="Car">
            <Resource name="Car_Low" type="1">
                <HighResolutionResource name="Car_High"/>
                <TextureSet name="Paint_Low">
                    <ColourTint r="0" g="128" b="255"/>
                    <OverrideParam sampler="Diffuse" nameUID="0x10" uid0="1" uid1="0x2" uid2="3"/>
                    <HighResolutionResource name="Paint_High"/>
                </TextureSet>
                <TextureSet name="Glass_Low">
                    <HighResolutionResource name="Glass_High"/>
                </TextureSet>
            </Resource>
            <Resource name="Car_High" type="1">
                <TextureSet name="Paint_High"/>
                <TextureSet name="Glass_High"/>
            </Resource>
        </Component>
    </ComponentEntries>
</TrueCrowdDataBase>
"#;

fn parse(xml: &str) -> XmlDocument {
    XmlDocument::parse(xml).unwrap()
}

/// Element tags and attribute names, recursively, ignoring values.
fn shape(node: &XmlNode) -> (String, Vec<String>, Vec<(String, Vec<String>, usize)>) {
    let mut attributes: Vec<_> = node.attributes.iter().map(|(k, _)| k.clone()).collect();
    attributes.sort();
    let children = node
        .children
        .iter()
        .map(|c| {
            let (tag, attrs, _) = shape(c);
            (tag, attrs, c.children.len())
        })
        .collect();
    (node.tag.clone(), attributes, children)
}

#[test]
fn test_single_ped_round_trip() {
    let built = build(&parse(SINGLE_PED)).unwrap();
    let db = &built.database;
    assert!(built.report.warnings.is_empty());

    let entity = &db.definition().entities()[0];
    assert_eq!(entity.name_uid, hash_upper32("Pedestrian"));
    assert_eq!(entity.required_component_count, 1);
    let slot = &entity.components()[0];
    assert_eq!(slot.name_uid, hash32("Body"));
    assert_eq!(slot.bones(), &[hash_upper32("Bip01_Head"), hash_upper32("Bip01_Spine")]);

    let entry = db.find_resource("Ped_Male_01").unwrap();
    assert_eq!(db.resource_type(&entry.resource), Some(ResourceType::Character));
    assert_eq!(entry.resource.component_type_uid, hash_upper32("Body"));
    assert_eq!(
        entry.resource.path_uid,
        hash32("Data\\Characters_New\\Ped_Male_01")
    );
    assert_eq!(
        entry.resource.prop_set_uid,
        prop_set_uid("Characters_New", "Ped_Male_01")
    );
    assert_eq!(db.entry_tags(entry), vec![hash32("Civilian")]);
    assert_eq!(db.texture_sets(entry).count(), 0);

    let lod = &db.lods(entry)[0];
    let part = &db.model_parts(lod)[0];
    assert_eq!(db.string(part.name), Some("Torso"));
    assert_eq!(part.name_uid, hash_upper32("Torso"));
    assert_eq!((part.is_skinned, part.morph_type), (1, 2));

    // Binary round trip through the chunk container.
    let chunk = db.to_chunk_file().unwrap();
    let file = truecrowd_chunk::ChunkFile::parse(&chunk).unwrap();
    let reread = CrowdDatabase::from_chunk_file(&file).unwrap();
    assert_eq!(&reread, db);

    // Export, re-parse and rebuild.
    let exported = reread.to_xml(&built.symbols);
    assert!(exported.unresolved.is_empty());
    let text = exported.to_xml_string(&ExportOptions::default()).unwrap();
    assert!(text.contains(r#"<ModelPart name="Torso" isSkinned="true" morphType="2"/>"#));

    let original = parse(SINGLE_PED);
    let reparsed = parse(&text);
    assert_eq!(shape(&reparsed.root), shape(&original.root));

    let rebuilt = build(&reparsed).unwrap();
    assert_eq!(rebuilt.database, built.database);
}

#[test]
fn test_forward_references_resolve() {
    let built = build(&parse(FORWARD_REFERENCES)).unwrap();
    let db = &built.database;

    let low = db.find_resource("Car_Low").unwrap();
    let high = db.high_res_entry(low).unwrap();
    assert_eq!(db.resource_name(&high.resource), Some("Car_High"));
    assert_eq!(db.find_resource("Car_High").unwrap().resource.high_res, NULL_INDEX);

    let targets: Vec<_> = db
        .texture_sets(low)
        .map(|t| {
            let target = db.high_res_texture_set(t).unwrap();
            db.resource_name(&target.resource).unwrap()
        })
        .collect();
    assert_eq!(targets, vec!["Paint_High", "Glass_High"]);

    let paint = db.find_texture_set("Paint_Low").unwrap();
    assert_eq!(paint.resource.resource_type, ResourceType::Vehicle.as_i32());
    assert_eq!(paint.resource.component_type_uid, 0);
    assert_eq!(paint.resource.path_uid, resource_path_uid("Vehicles_New", "Paint_Low"));
    assert_eq!(db.colour_tints(paint)[0].to_rgb8(), [0, 128, 255]);
    let param = &db.override_params(paint)[0];
    assert_eq!(param.sampler_uid, hash32("Diffuse"));
    assert_eq!(param.texture_name_uid, 0x10);
    assert_eq!(param.override_uids, [1, 2, 3]);
}

#[test]
fn test_every_fixup_slot_is_filled() {
    let built = build(&parse(FORWARD_REFERENCES)).unwrap();
    let doc = parse(FORWARD_REFERENCES);
    let db = &built.database;

    let mut expected = 0;
    let mut filled = 0;
    let components = doc.root.first_child("ComponentEntries").unwrap();
    for resource in components.children.iter().flat_map(|c| c.children_named("Resource")) {
        let name = resource.attribute("name").unwrap();
        if resource.first_child("HighResolutionResource").is_some() {
            expected += 1;
            filled += usize::from(db.high_res_entry(db.find_resource(name).unwrap()).is_some());
        }
        for texture_set in resource.children_named("TextureSet") {
            if texture_set.first_child("HighResolutionResource").is_some() {
                expected += 1;
                let record = db.find_texture_set(texture_set.attribute("name").unwrap()).unwrap();
                filled += usize::from(db.high_res_texture_set(record).is_some());
            }
        }
    }
    assert_eq!(expected, 3);
    assert_eq!(filled, expected);
}

#[test]
fn test_unresolved_reference_is_fatal() {
    let xml = FORWARD_REFERENCES.replace(
        r#"<HighResolutionResource name="Glass_High"/>"#,
        r#"<HighResolutionResource name="Missing"/>"#,
    );
    match build(&parse(&xml)) {
        Err(Error::UnresolvedReference { name, kind }) => {
            assert_eq!(name, "Missing");
            assert_eq!(kind, ReferenceKind::TextureSet);
        }
        other => panic!("expected unresolved reference, got {other:?}"),
    }

    let xml = FORWARD_REFERENCES.replace(r#"name="Car_High"/>"#, r#"name="Truck"/>"#);
    let err = build(&parse(&xml)).unwrap_err();
    assert!(matches!(err, Error::UnresolvedReference { kind: ReferenceKind::Model, .. }));
    assert_eq!(err.to_string(), "failed to fix resource offset for Truck (Model)");
}

#[test]
fn test_missing_component_entries() {
    let doc = parse("<TrueCrowdDataBase><Definition/></TrueCrowdDataBase>");
    let err = build(&doc).unwrap_err();
    assert!(matches!(
        err,
        Error::MissingTag {
            tag: "ComponentEntries",
            parent: "TrueCrowdDataBase"
        }
    ));
    assert!(err.to_string().contains("ComponentEntries"));
}

#[test]
fn test_missing_name_is_fatal() {
    let xml = SINGLE_PED.replace(r#"<ModelPart name="Torso""#, "<ModelPart");
    match build(&parse(&xml)) {
        Err(Error::MissingAttribute {
            tag: "ModelPart",
            attribute: "name",
            owner,
        }) => assert_eq!(owner.as_deref(), Some("Ped_Male_01")),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_soft_warnings() {
    let xml = r#"
        <Database>
            <Definition/>
            <ComponentEntries>
                <Component name="Props">
                    <Resource name="Bench"><Tag>Outdoor</Tag></Resource>
                    <Resource name="Lamp" type="7"/>
                </Component>
            </ComponentEntries>
        </Database>"#;
    let built = build(&parse(xml)).unwrap();
    assert_eq!(
        built.report.warnings,
        vec![
            Warning::MissingTags,
            Warning::InvalidResourceType {
                resource: "Bench".into(),
                value: None
            },
            Warning::UnknownTag {
                resource: "Bench".into(),
                tag: "Outdoor".into()
            },
            Warning::InvalidResourceType {
                resource: "Lamp".into(),
                value: Some(7)
            },
        ]
    );

    let bench = built.database.find_resource("Bench").unwrap();
    assert_eq!(bench.resource.resource_type, -1);
    assert!(bench.tags.is_empty());
    assert_eq!(bench.resource.path_uid, hash32("Data\\(null)\\Bench"));
}

#[test]
fn test_malformed_number_is_fatal() {
    let xml = SINGLE_PED.replace(r#"morphType="2""#, r#"morphType="two""#);
    assert!(matches!(
        build(&parse(&xml)),
        Err(Error::InvalidAttribute {
            attribute: "morphType",
            ..
        })
    ));

    let xml = FORWARD_REFERENCES.replace(r#"b="255""#, r#"b="256""#);
    assert!(matches!(
        build(&parse(&xml)),
        Err(Error::InvalidAttribute { attribute: "b", .. })
    ));
}

#[test]
fn test_entity_capacity() {
    let entities = (0..9).map(|i| XmlNode::new("Entity").attr("name", format!("E{i}")));
    let root = XmlNode::new("TrueCrowdDataBase")
        .child(XmlNode::new("Definition").children(entities))
        .child(XmlNode::new("ComponentEntries"));
    assert!(matches!(
        build(&XmlDocument::new(root)),
        Err(Error::CapacityExceeded { what: "Entity", .. })
    ));
}

#[test]
fn test_colour_boundaries() {
    let built = build(&parse(FORWARD_REFERENCES)).unwrap();
    let paint = built.database.find_texture_set("Paint_Low").unwrap();
    let colour = built.database.colour_tints(paint)[0];
    assert_eq!(colour.r, 0.0);
    assert!((colour.g - 128.0 / 255.0).abs() < 1e-6);
    assert_eq!(colour.b, 1.0);

    let text = built
        .database
        .to_xml(&built.symbols)
        .to_xml_string(&ExportOptions::default())
        .unwrap();
    assert!(text.contains(r#"<ColourTint r="0" g="128" b="255"/>"#));
    assert!(text.contains(r#"nameUID="0x10" uid0="0x1" uid1="0x2" uid2="0x3""#));
}

#[test]
fn test_unresolved_symbols_are_listed() {
    let built = build(&parse(SINGLE_PED)).unwrap();
    let exported = built.database.to_xml(&SymbolTable::new());

    let mut expected = vec![
        hash_upper32("Pedestrian"),
        hash32("Body"),
        hash_upper32("Bip01_Head"),
        hash_upper32("Bip01_Spine"),
        hash32("Civilian"),
    ];
    expected.sort_unstable();
    expected.dedup();
    assert_eq!(exported.unresolved, expected);

    let comments = &exported.document.trailing_comments;
    assert_eq!(comments[0], UNRESOLVED_HEADER);
    assert_eq!(comments[1], format!(" 0x{:X} ", expected[0]));
    assert_eq!(comments.len(), expected.len() + 1);

    // Placeholders read back as the same ids.
    let text = exported.to_xml_string(&ExportOptions::default()).unwrap();
    assert!(text.contains(&format!("~0x{:08X}~", hash32("Civilian"))));
    let rebuilt = build(&parse(&text)).unwrap();
    assert_eq!(rebuilt.database, built.database);
    assert!(rebuilt.symbols.lookup(hash32("Civilian")).is_none());
}

#[test]
fn test_save_and_open() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("crowd.bin");
    let dictionary = dir.path().join("crowd_qsymbols.txt");

    let built = build(&parse(FORWARD_REFERENCES)).unwrap();
    built.database.save(&bin).unwrap();
    built.symbols.save(&dictionary).unwrap();

    let db = CrowdDatabase::open(&bin).unwrap();
    let mut symbols = SymbolTable::new();
    symbols.load(&dictionary).unwrap();
    assert_eq!(db, built.database);

    let xml = dir.path().join("crowd.xml");
    let exported = db.to_xml(&symbols);
    assert!(exported.unresolved.is_empty());
    exported.save(&xml, &ExportOptions { indent: 2 }).unwrap();
    let rebuilt = build(&XmlDocument::open(&xml).unwrap()).unwrap();
    assert_eq!(rebuilt.database, db);
}

#[test]
fn test_seeded_symbols_keep_their_spelling() {
    let mut seed = SymbolTable::new();
    seed.intern("PEDESTRIAN", CaseMode::Upper);

    let doc = parse(SINGLE_PED);
    let built = DatabaseBuilder::new(&doc.root).with_symbols(seed).build().unwrap();
    assert_eq!(built.symbols.lookup(hash_upper32("Pedestrian")), Some("PEDESTRIAN"));
    assert_eq!(built.symbols.lookup(hash32("Civilian")), Some("Civilian"));
}

#[test]
fn test_tag_sharing_a_bone_id_round_trips() {
    let xml = r#"<TrueCrowdDataBase>
    <Definition>
        <Entity name="Ped">
            <EntityComponent name="Body"><BoneUID>civ</BoneUID></EntityComponent>
        </Entity>
        <Tags><Tag>CIV</Tag></Tags>
    </Definition>
    <ComponentEntries>
        <Component name="Body">
            <Resource name="Ped_A" type="0"><Tag>CIV</Tag></Resource>
        </Component>
    </ComponentEntries>
</TrueCrowdDataBase>"#;

    let built = build(&parse(xml)).unwrap();
    let entry = built.database.find_resource("Ped_A").unwrap();
    assert_eq!(built.database.entry_tags(entry), vec![hash32("CIV")]);
    assert_eq!(built.symbols.lookup(hash32("CIV")), Some("CIV"));

    let text = built
        .database
        .to_xml(&built.symbols)
        .to_xml_string(&ExportOptions::default())
        .unwrap();
    assert!(text.contains("<Tag>CIV</Tag>"));

    let rebuilt = build(&parse(&text)).unwrap();
    assert_eq!(rebuilt.database, built.database);
}
