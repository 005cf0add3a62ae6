//! Definition records: entities, components and their fixed-capacity arrays.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Maximum number of entities in a definition.
pub const MAX_ENTITIES: usize = 8;
/// Maximum number of component slots per entity.
pub const MAX_ENTITY_COMPONENTS: usize = 16;
/// Maximum number of bone ids per entity component.
pub const MAX_BONE_UIDS: usize = 8;
/// Maximum number of component types.
pub const MAX_COMPONENTS: usize = 32;
/// Inline storage for a component name, including the terminator.
pub const COMPONENT_NAME_LEN: usize = 64;

/// One component slot of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct EntityComponentRecord {
    /// Case-sensitive component name id.
    pub name_uid: u32,
    pub resource_index: i32,
    /// Non-zero if the slot must be filled.
    pub required: u32,
    pub bone_count: u32,
    /// Upper-cased bone name ids, `bone_count` used.
    pub bone_uids: [u32; MAX_BONE_UIDS],
}

impl EntityComponentRecord {
    /// Bone ids in use.
    pub fn bones(&self) -> &[u32] {
        &self.bone_uids[..(self.bone_count as usize).min(MAX_BONE_UIDS)]
    }
}

/// An entity archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct EntityRecord {
    /// Upper-cased entity name id.
    pub name_uid: u32,
    pub component_count: u32,
    pub required_component_count: u32,
    pub components: [EntityComponentRecord; MAX_ENTITY_COMPONENTS],
}

impl EntityRecord {
    /// Component slots in use.
    pub fn components(&self) -> &[EntityComponentRecord] {
        &self.components[..(self.component_count as usize).min(MAX_ENTITY_COMPONENTS)]
    }
}

/// A named component type. Its index is the component type index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct ComponentRecord {
    /// NUL-padded name.
    pub name: [u8; COMPONENT_NAME_LEN],
    /// Upper-cased name id.
    pub name_uid: u32,
}

impl ComponentRecord {
    /// The inline name up to its terminator.
    pub fn name(&self) -> &str {
        truecrowd_common::cstr_at(&self.name, 0).unwrap_or("")
    }
}

/// The schema half of the database: entities, component types and tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct DefinitionRecord {
    pub entity_count: u32,
    pub entities: [EntityRecord; MAX_ENTITIES],
    pub component_count: u32,
    pub components: [ComponentRecord; MAX_COMPONENTS],
    /// Number of ids in the tag list region.
    pub tag_count: u32,
}

impl DefinitionRecord {
    /// Entities in use.
    pub fn entities(&self) -> &[EntityRecord] {
        &self.entities[..(self.entity_count as usize).min(MAX_ENTITIES)]
    }

    /// Component types in use.
    pub fn components(&self) -> &[ComponentRecord] {
        &self.components[..(self.component_count as usize).min(MAX_COMPONENTS)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::FromZeros;

    #[test]
    fn test_record_sizes() {
        assert_eq!(std::mem::size_of::<EntityComponentRecord>(), 48);
        assert_eq!(std::mem::size_of::<EntityRecord>(), 12 + 16 * 48);
        assert_eq!(std::mem::size_of::<ComponentRecord>(), 68);
    }

    #[test]
    fn test_component_name() {
        let mut component = ComponentRecord::new_zeroed();
        component.name[..4].copy_from_slice(b"Body");
        assert_eq!(component.name(), "Body");
    }

    #[test]
    fn test_counts_are_clamped() {
        let mut entity = EntityRecord::new_zeroed();
        entity.component_count = 99;
        assert_eq!(entity.components().len(), MAX_ENTITY_COMPONENTS);
    }
}
