//! Image header and region counts.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::DefinitionRecord;

/// Element count of every variable-length region.
///
/// Produced by the size estimator before a build and stored in the header so a
/// reader can recompute the exact layout.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
#[repr(C)]
pub struct Estimate {
    pub tags: u32,
    pub component_entries: u32,
    pub resource_entries: u32,
    pub lods: u32,
    pub model_parts: u32,
    pub texture_set_slots: u32,
    pub texture_sets: u32,
    pub colour_tints: u32,
    pub override_params: u32,
    /// Bytes in the string pool, terminators included.
    pub string_bytes: u32,
}

/// Fixed-size record at offset 0 of every image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct DatabaseHeader {
    /// Resource type id, `hash32("TrueCrowdDataBase")`.
    pub type_uid: u32,
    /// Resource name id, `hash32("TrueCrowdDB")`.
    pub name_uid: u32,
    /// Size of the whole image in bytes.
    pub total_size: u32,
    pub counts: Estimate,
    pub definition: DefinitionRecord,
}
