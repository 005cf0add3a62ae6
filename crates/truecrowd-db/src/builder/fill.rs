//! The filling pass: appends one record per element into pre-sized arenas.

use truecrowd_common::{CaseMode, SymbolTable};
use zerocopy::FromZeros;

use super::fixup::{FixupSlot, PendingFixup};
use super::nodes::{Element, Sections};
use super::{prop_set_uid, resource_path_uid, Warning};
use crate::layout::Arenas;
use crate::structs::{
    ColourRecord, ComponentEntriesRecord, ComponentRecord, DefinitionRecord, EntityRecord,
    LodRecord, ModelPartRecord, OverrideParamRecord, ResourceEntryRecord, ResourceRecord,
    TagBits, TextureSetRecord, COMPONENT_NAME_LEN, MAX_BONE_UIDS, MAX_COMPONENTS, MAX_ENTITIES,
    MAX_ENTITY_COMPONENTS, NULL_INDEX,
};
use crate::types::ResourceType;
use crate::{Error, Result};

pub(super) struct Filler<'b> {
    pub arenas: &'b mut Arenas,
    pub definition: &'b mut DefinitionRecord,
    pub symbols: &'b mut SymbolTable,
    pub fixups: &'b mut Vec<PendingFixup>,
    pub warnings: &'b mut Vec<Warning>,
}

/// First index and length of a run of consecutive pushes.
#[derive(Clone, Copy)]
struct Span {
    first: u32,
    count: u32,
}

impl Span {
    const EMPTY: Span = Span {
        first: NULL_INDEX,
        count: 0,
    };

    fn extend(&mut self, index: u32) {
        if self.count == 0 {
            self.first = index;
        }
        self.count += 1;
    }
}

impl Filler<'_> {
    pub fn fill(&mut self, sections: &Sections<'_>) -> Result<()> {
        self.fill_entities(Element::new(sections.definition, "Definition", None))?;

        match sections.tags {
            Some(tags) => self.fill_tags(Element::new(tags, "Tags", None))?,
            None => self.warnings.push(Warning::MissingTags),
        }

        let entries = Element::new(sections.component_entries, "ComponentEntries", None);
        for component in entries.children("Component", None) {
            self.fill_component(component)?;
        }
        Ok(())
    }

    fn fill_entities(&mut self, definition: Element<'_>) -> Result<()> {
        for entity in definition.children("Entity", None) {
            let index = self.definition.entity_count as usize;
            if index >= MAX_ENTITIES {
                return Err(Error::CapacityExceeded {
                    what: "Entity",
                    capacity: MAX_ENTITIES,
                    owner: None,
                });
            }

            let name = entity.required("name")?;
            let mut record = EntityRecord::new_zeroed();
            record.name_uid = self.symbols.intern(name, CaseMode::Upper);

            for component in entity.children("EntityComponent", Some(name)) {
                let slot = record.component_count as usize;
                if slot >= MAX_ENTITY_COMPONENTS {
                    return Err(Error::CapacityExceeded {
                        what: "EntityComponent",
                        capacity: MAX_ENTITY_COMPONENTS,
                        owner: Some(name.to_string()),
                    });
                }

                let target = &mut record.components[slot];
                target.name_uid = self
                    .symbols
                    .intern(component.required("name")?, CaseMode::Sensitive);
                target.resource_index = component.i32_or("resourceIndex", 0)?;
                let required = component.bool_or("required", false)?;
                target.required = u32::from(required);

                for bone in component.children("BoneUID", Some(name)) {
                    let bone_slot = target.bone_count as usize;
                    if bone_slot >= MAX_BONE_UIDS {
                        return Err(Error::CapacityExceeded {
                            what: "BoneUID",
                            capacity: MAX_BONE_UIDS,
                            owner: Some(name.to_string()),
                        });
                    }
                    target.bone_uids[bone_slot] =
                        self.symbols.intern(bone.text()?, CaseMode::Upper);
                    target.bone_count += 1;
                }

                record.component_count += 1;
                if required {
                    record.required_component_count += 1;
                }
            }

            self.definition.entities[index] = record;
            self.definition.entity_count += 1;
        }
        Ok(())
    }

    fn fill_tags(&mut self, tags: Element<'_>) -> Result<()> {
        for tag in tags.children("Tag", None) {
            let id = self.symbols.intern(tag.text()?, CaseMode::Sensitive);
            self.arenas.tags.push(id)?;
            self.definition.tag_count += 1;
        }
        Ok(())
    }

    fn fill_component(&mut self, component: Element<'_>) -> Result<()> {
        let index = self.definition.component_count as usize;
        if index >= MAX_COMPONENTS {
            return Err(Error::CapacityExceeded {
                what: "Component",
                capacity: MAX_COMPONENTS,
                owner: None,
            });
        }

        let name = component.required("name")?;
        if name.len() >= COMPONENT_NAME_LEN {
            return Err(Error::NameTooLong {
                name: name.to_string(),
                max: COMPONENT_NAME_LEN - 1,
            });
        }

        let mut record = ComponentRecord::new_zeroed();
        record.name[..name.len()].copy_from_slice(name.as_bytes());
        record.name_uid = self.symbols.intern(name, CaseMode::Upper);
        self.definition.components[index] = record;
        self.definition.component_count += 1;

        let mut entries = Span::EMPTY;
        for resource in component.children("Resource", Some(name)) {
            entries.extend(self.fill_resource_entry(resource, record.name_uid)?);
        }

        self.arenas.component_entries.push(ComponentEntriesRecord {
            first_entry: entries.first,
            entry_count: entries.count,
        })?;
        Ok(())
    }

    fn fill_resource_entry(
        &mut self,
        resource: Element<'_>,
        component_type_uid: u32,
    ) -> Result<u32> {
        let name = resource.required("name")?;
        let resource_type = self.resource_type(resource, name)?;

        // Reserve the slot first so fixups can address it.
        let index = self
            .arenas
            .resource_entries
            .push(ResourceEntryRecord::new_zeroed())?;

        let tags = self.tag_bits(resource, name)?;
        let mut record = self.resource_record(name, resource_type)?;
        record.component_type_uid = component_type_uid;

        if let Some(high_res) = resource.first_child("HighResolutionResource", Some(name)) {
            self.fixups.push(PendingFixup {
                slot: FixupSlot::Resource(index),
                target: high_res.required("name")?.to_string(),
            });
        }

        let mut lods = Span::EMPTY;
        for lod in resource.children("LOD", Some(name)) {
            lods.extend(self.fill_lod(lod, name)?);
        }

        let mut slots = Span::EMPTY;
        for texture_set in resource.children("TextureSet", Some(name)) {
            let texture_set = self.fill_texture_set(texture_set, resource_type)?;
            slots.extend(self.arenas.texture_set_slots.push(texture_set)?);
        }

        if let Some(entry) = self.arenas.resource_entries.get_mut(index) {
            *entry = ResourceEntryRecord {
                resource: record,
                first_lod: lods.first,
                lod_count: lods.count,
                first_texture_set_slot: slots.first,
                texture_set_count: slots.count,
                tags,
            };
        }
        Ok(index)
    }

    fn resource_type(&mut self, resource: Element<'_>, name: &str) -> Result<ResourceType> {
        let value = resource.parse("type", |v| v.parse::<i32>().ok())?;
        match value.and_then(ResourceType::from_i32) {
            Some(ResourceType::Invalid) | None => {
                self.warnings.push(Warning::InvalidResourceType {
                    resource: name.to_string(),
                    value,
                });
                Ok(ResourceType::Invalid)
            }
            Some(resource_type) => Ok(resource_type),
        }
    }

    fn tag_bits(&mut self, resource: Element<'_>, name: &str) -> Result<TagBits> {
        let mut bits = TagBits::default();
        for tag in resource.children("Tag", Some(name)) {
            let text = tag.text()?;
            let id = self.symbols.intern(text, CaseMode::Sensitive);
            match self.arenas.tags.as_slice().iter().position(|&t| t == id) {
                Some(bit) => bits.set(bit),
                None => self.warnings.push(Warning::UnknownTag {
                    resource: name.to_string(),
                    tag: text.to_string(),
                }),
            }
        }
        Ok(bits)
    }

    fn resource_record(
        &mut self,
        name: &str,
        resource_type: ResourceType,
    ) -> Result<ResourceRecord> {
        let type_path = resource_type.type_path();
        Ok(ResourceRecord {
            name: self.arenas.strings.append(name)?,
            resource_type: resource_type.as_i32(),
            path_uid: resource_path_uid(type_path, name),
            prop_set_uid: prop_set_uid(type_path, name),
            component_type_uid: 0,
            high_res: NULL_INDEX,
        })
    }

    fn fill_lod(&mut self, lod: Element<'_>, owner: &str) -> Result<u32> {
        let mut parts = Span::EMPTY;
        for part in lod.children("ModelPart", Some(owner)) {
            let name = part.required("name")?;
            let record = ModelPartRecord {
                name: self.arenas.strings.append(name)?,
                name_uid: self.symbols.intern(name, CaseMode::Upper),
                is_skinned: u32::from(part.bool_or("isSkinned", false)?),
                morph_type: part.u32_or("morphType", 0)?,
            };
            parts.extend(self.arenas.model_parts.push(record)?);
        }

        self.arenas.lods.push(LodRecord {
            first_part: parts.first,
            part_count: parts.count,
        })
    }

    fn fill_texture_set(
        &mut self,
        texture_set: Element<'_>,
        resource_type: ResourceType,
    ) -> Result<u32> {
        let name = texture_set.required("name")?;
        let index = self
            .arenas
            .texture_sets
            .push(TextureSetRecord::new_zeroed())?;
        let resource = self.resource_record(name, resource_type)?;

        let mut tints = Span::EMPTY;
        for tint in texture_set.children("ColourTint", Some(name)) {
            let colour = ColourRecord::from_rgb8([
                tint.u8_or("r", 0)?,
                tint.u8_or("g", 0)?,
                tint.u8_or("b", 0)?,
            ]);
            tints.extend(self.arenas.colour_tints.push(colour)?);
        }

        let mut params = Span::EMPTY;
        for param in texture_set.children("OverrideParam", Some(name)) {
            let record = OverrideParamRecord {
                sampler_uid: self
                    .symbols
                    .intern(param.required("sampler")?, CaseMode::Sensitive),
                texture_name_uid: param.u32_or("nameUID", 0)?,
                override_uids: [
                    param.u32_or("uid0", 0)?,
                    param.u32_or("uid1", 0)?,
                    param.u32_or("uid2", 0)?,
                ],
            };
            params.extend(self.arenas.override_params.push(record)?);
        }

        if let Some(high_res) = texture_set.first_child("HighResolutionResource", Some(name)) {
            self.fixups.push(PendingFixup {
                slot: FixupSlot::TextureSet(index),
                target: high_res.required("name")?.to_string(),
            });
        }

        if let Some(slot) = self.arenas.texture_sets.get_mut(index) {
            *slot = TextureSetRecord {
                resource,
                first_tint: tints.first,
                tint_count: tints.count,
                first_param: params.first,
                param_count: params.count,
            };
        }
        Ok(index)
    }
}
