//! XML exporter for crowd databases.

use std::collections::BTreeSet;

use truecrowd_common::SymbolTable;
use truecrowd_xml::{XmlDocument, XmlNode};

use super::{Export, UNRESOLVED_HEADER};
use crate::builder::ROOT_TAG;
use crate::structs::{
    EntityComponentRecord, EntityRecord, ModelPartRecord, OverrideParamRecord,
    ResourceEntryRecord, ResourceRecord, TextureSetRecord,
};
use crate::CrowdDatabase;

/// Walks a database top-down and produces its XML document.
#[derive(Debug)]
pub struct XmlExporter<'a> {
    database: &'a CrowdDatabase,
    symbols: &'a SymbolTable,
    unresolved: BTreeSet<u32>,
}

impl<'a> XmlExporter<'a> {
    pub fn new(database: &'a CrowdDatabase, symbols: &'a SymbolTable) -> Self {
        Self {
            database,
            symbols,
            unresolved: BTreeSet::new(),
        }
    }

    /// Export the whole database.
    pub fn export(mut self) -> Export {
        let definition = self.definition();
        let component_entries = self.component_entries();
        let root = XmlNode::new(ROOT_TAG)
            .child(definition)
            .child(component_entries);

        let unresolved: Vec<u32> = self.unresolved.into_iter().collect();
        let mut document = XmlDocument::new(root);
        if !unresolved.is_empty() {
            tracing::warn!(count = unresolved.len(), "export has unresolved symbols");
            document.trailing_comments.push(UNRESOLVED_HEADER.to_string());
            document
                .trailing_comments
                .extend(unresolved.iter().map(|id| format!(" 0x{id:X} ")));
        }

        Export {
            document,
            unresolved,
        }
    }

    /// Spelling of `id`, or a placeholder that is recorded as unresolved.
    fn symbol(&mut self, id: u32) -> String {
        match self.symbols.lookup(id) {
            Some(name) => name.to_string(),
            None => {
                self.unresolved.insert(id);
                format!("~0x{id:08X}~")
            }
        }
    }

    fn definition(&mut self) -> XmlNode {
        let database = self.database;
        let mut node = XmlNode::new("Definition");
        for entity in database.definition().entities() {
            node.push(self.entity(entity));
        }

        let mut tags = XmlNode::new("Tags");
        for &tag in database.tags() {
            tags.push(XmlNode::new("Tag").text(self.symbol(tag)));
        }
        node.push(tags);
        node
    }

    fn entity(&mut self, entity: &EntityRecord) -> XmlNode {
        let mut node = XmlNode::new("Entity").attr("name", self.symbol(entity.name_uid));
        for component in entity.components() {
            node.push(self.entity_component(component));
        }
        node
    }

    fn entity_component(&mut self, component: &EntityComponentRecord) -> XmlNode {
        let mut node = XmlNode::new("EntityComponent")
            .attr("name", self.symbol(component.name_uid))
            .attr("resourceIndex", component.resource_index)
            .attr("required", component.required != 0);
        for &bone in component.bones() {
            node.push(XmlNode::new("BoneUID").text(self.symbol(bone)));
        }
        node
    }

    fn component_entries(&mut self) -> XmlNode {
        let database = self.database;
        let mut node = XmlNode::new("ComponentEntries");
        for (index, component) in database.components().iter().enumerate() {
            let mut component_node = XmlNode::new("Component").attr("name", component.name());
            for entry in database.resources_of(index) {
                component_node.push(self.resource_entry(entry));
            }
            node.push(component_node);
        }
        node
    }

    fn resource_entry(&mut self, entry: &ResourceEntryRecord) -> XmlNode {
        let database = self.database;
        let mut node = named_node("Resource", database, &entry.resource)
            .attr("type", entry.resource.resource_type);

        if let Some(high_res) = database.high_res_entry(entry) {
            node.push(high_res_node(database, &high_res.resource));
        }

        for lod in database.lods(entry) {
            let parts = database.model_parts(lod).iter().map(|p| model_part(database, p));
            node.push(XmlNode::new("LOD").children(parts));
        }

        for texture_set in database.texture_sets(entry) {
            node.push(self.texture_set(texture_set));
        }

        for tag in database.entry_tags(entry) {
            node.push(XmlNode::new("Tag").text(self.symbol(tag)));
        }
        node
    }

    fn texture_set(&mut self, texture_set: &TextureSetRecord) -> XmlNode {
        let database = self.database;
        let mut node = named_node("TextureSet", database, &texture_set.resource);

        for colour in database.colour_tints(texture_set) {
            let [r, g, b] = colour.to_rgb8();
            node.push(
                XmlNode::new("ColourTint")
                    .attr("r", r)
                    .attr("g", g)
                    .attr("b", b),
            );
        }

        for param in database.override_params(texture_set) {
            node.push(self.override_param(param));
        }

        if let Some(high_res) = database.high_res_texture_set(texture_set) {
            node.push(high_res_node(database, &high_res.resource));
        }
        node
    }

    fn override_param(&mut self, param: &OverrideParamRecord) -> XmlNode {
        let [uid0, uid1, uid2] = param.override_uids;
        XmlNode::new("OverrideParam")
            .attr("sampler", self.symbol(param.sampler_uid))
            .attr("nameUID", format!("0x{:X}", param.texture_name_uid))
            .attr("uid0", format!("0x{uid0:X}"))
            .attr("uid1", format!("0x{uid1:X}"))
            .attr("uid2", format!("0x{uid2:X}"))
    }
}

fn named_node(tag: &str, database: &CrowdDatabase, resource: &ResourceRecord) -> XmlNode {
    XmlNode::new(tag).attr("name", database.resource_name(resource).unwrap_or(""))
}

fn high_res_node(database: &CrowdDatabase, target: &ResourceRecord) -> XmlNode {
    named_node("HighResolutionResource", database, target)
}

fn model_part(database: &CrowdDatabase, part: &ModelPartRecord) -> XmlNode {
    XmlNode::new("ModelPart")
        .attr("name", database.string(part.name).unwrap_or(""))
        .attr("isSkinned", part.is_skinned != 0)
        .attr("morphType", part.morph_type)
}
