//! Resource-side records stored in the image regions.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::TagBits;

/// Range of resource entries owned by one component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct ComponentEntriesRecord {
    pub first_entry: u32,
    pub entry_count: u32,
}

/// Fields shared by resource entries and texture sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct ResourceRecord {
    /// Offset of the name in the string pool.
    pub name: u32,
    /// Raw [`ResourceType`](crate::ResourceType) value.
    pub resource_type: i32,
    /// Hash of `Data\<TypePath>\<name>`.
    pub path_uid: u32,
    /// Hash of `TrueCrowd-<TypePath>-<name>`.
    pub prop_set_uid: u32,
    /// Upper-cased name id of the owning component (0 for texture sets).
    pub component_type_uid: u32,
    /// Index of the high-resolution counterpart in the same region, or `NULL_INDEX`.
    pub high_res: u32,
}

/// One resource of a component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct ResourceEntryRecord {
    pub resource: ResourceRecord,
    pub first_lod: u32,
    pub lod_count: u32,
    /// First slot in the texture-set array.
    pub first_texture_set_slot: u32,
    pub texture_set_count: u32,
    pub tags: TagBits,
}

/// One level of detail: a range of model parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct LodRecord {
    pub first_part: u32,
    pub part_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct ModelPartRecord {
    /// Offset of the name in the string pool.
    pub name: u32,
    /// Upper-cased name id.
    pub name_uid: u32,
    pub is_skinned: u32,
    pub morph_type: u32,
}

/// A texture set: resource fields plus tints and override parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct TextureSetRecord {
    pub resource: ResourceRecord,
    pub first_tint: u32,
    pub tint_count: u32,
    pub first_param: u32,
    pub param_count: u32,
}

/// RGB colour with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct ColourRecord {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl ColourRecord {
    /// Convert 8-bit channels.
    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self {
            r: f32::from(rgb[0]) / 255.0,
            g: f32::from(rgb[1]) / 255.0,
            b: f32::from(rgb[2]) / 255.0,
        }
    }

    /// Convert back to 8-bit channels, rounding and clamping.
    pub fn to_rgb8(&self) -> [u8; 3] {
        [channel(self.r), channel(self.g), channel(self.b)]
    }
}

fn channel(value: f32) -> u8 {
    let scaled = (value * 255.0).round();
    if scaled.is_nan() {
        0
    } else {
        scaled.clamp(0.0, 255.0) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct OverrideParamRecord {
    /// Case-sensitive sampler id.
    pub sampler_uid: u32,
    pub texture_name_uid: u32,
    pub override_uids: [u32; 3],
}
