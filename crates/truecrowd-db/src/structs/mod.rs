//! Binary record definitions of the crowd database image.
//!
//! Every record is `#[repr(C)]` with 4-byte fields only, so the image has no
//! implicit padding and records can be read and written with zerocopy.

mod definition;
mod header;
mod resource;
mod tags;

pub use definition::{
    ComponentRecord, DefinitionRecord, EntityComponentRecord, EntityRecord, COMPONENT_NAME_LEN,
    MAX_BONE_UIDS, MAX_COMPONENTS, MAX_ENTITIES, MAX_ENTITY_COMPONENTS,
};
pub use header::{DatabaseHeader, Estimate};
pub use resource::{
    ColourRecord, ComponentEntriesRecord, LodRecord, ModelPartRecord, OverrideParamRecord,
    ResourceEntryRecord, ResourceRecord, TextureSetRecord,
};
pub use tags::{TagBits, MAX_TAGS};

/// Index value meaning "no element".
pub const NULL_INDEX: u32 = u32::MAX;
