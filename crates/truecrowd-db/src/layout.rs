//! Region layout and pre-sized arenas.
//!
//! [`Layout::compute`] turns an [`Estimate`] into byte offsets; the same function
//! is used when writing and when reading an image, so both sides always agree.
//! [`Arenas::allocate`] reserves one arena per region with exactly the estimated
//! capacity. Arenas never grow: a push into a full arena is an error.

use std::mem::size_of;

use crate::structs::{
    ColourRecord, ComponentEntriesRecord, DatabaseHeader, Estimate, LodRecord, ModelPartRecord,
    OverrideParamRecord, ResourceEntryRecord, TextureSetRecord,
};
use crate::{Error, Result};

/// Alignment of every region inside the image.
pub const REGION_ALIGN: usize = 16;

/// Variable-length regions, in image order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    TagList,
    ComponentEntries,
    ResourceEntries,
    Lods,
    ModelParts,
    TextureSetArray,
    TextureSets,
    ColourTints,
    OverrideParams,
    StringBuffer,
}

impl Region {
    /// All regions in image order.
    pub const ALL: [Region; 10] = [
        Region::TagList,
        Region::ComponentEntries,
        Region::ResourceEntries,
        Region::Lods,
        Region::ModelParts,
        Region::TextureSetArray,
        Region::TextureSets,
        Region::ColourTints,
        Region::OverrideParams,
        Region::StringBuffer,
    ];

    /// Size of one element in bytes.
    pub const fn element_size(self) -> usize {
        match self {
            Region::TagList | Region::TextureSetArray => size_of::<u32>(),
            Region::ComponentEntries => size_of::<ComponentEntriesRecord>(),
            Region::ResourceEntries => size_of::<ResourceEntryRecord>(),
            Region::Lods => size_of::<LodRecord>(),
            Region::ModelParts => size_of::<ModelPartRecord>(),
            Region::TextureSets => size_of::<TextureSetRecord>(),
            Region::ColourTints => size_of::<ColourRecord>(),
            Region::OverrideParams => size_of::<OverrideParamRecord>(),
            Region::StringBuffer => 1,
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Region::TagList => "TagList",
            Region::ComponentEntries => "ComponentEntries",
            Region::ResourceEntries => "ResourceEntries",
            Region::Lods => "LODs",
            Region::ModelParts => "ModelParts",
            Region::TextureSetArray => "TextureSetArray",
            Region::TextureSets => "TextureSets",
            Region::ColourTints => "ColourTints",
            Region::OverrideParams => "TextureOverrideParams",
            Region::StringBuffer => "StringBuffer",
        };
        f.write_str(name)
    }
}

impl Estimate {
    /// Element count of `region`.
    pub fn count(&self, region: Region) -> usize {
        let count = match region {
            Region::TagList => self.tags,
            Region::ComponentEntries => self.component_entries,
            Region::ResourceEntries => self.resource_entries,
            Region::Lods => self.lods,
            Region::ModelParts => self.model_parts,
            Region::TextureSetArray => self.texture_set_slots,
            Region::TextureSets => self.texture_sets,
            Region::ColourTints => self.colour_tints,
            Region::OverrideParams => self.override_params,
            Region::StringBuffer => self.string_bytes,
        };
        count as usize
    }
}

/// Byte offsets of every region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    offsets: [usize; 10],
    sizes: [usize; 10],
    total_size: usize,
}

impl Layout {
    /// Compute the layout for the given counts.
    pub fn compute(counts: &Estimate) -> Self {
        let mut offsets = [0; 10];
        let mut sizes = [0; 10];
        let mut cursor = size_of::<DatabaseHeader>().next_multiple_of(REGION_ALIGN);

        for region in Region::ALL {
            let size = counts.count(region) * region.element_size();
            offsets[region.slot()] = cursor;
            sizes[region.slot()] = size;
            cursor = (cursor + size).next_multiple_of(REGION_ALIGN);
        }

        Self {
            offsets,
            sizes,
            total_size: cursor,
        }
    }

    /// Byte offset of `region`.
    #[inline]
    pub fn offset(&self, region: Region) -> usize {
        self.offsets[region.slot()]
    }

    /// Byte size of `region`, excluding alignment padding.
    #[inline]
    pub fn size(&self, region: Region) -> usize {
        self.sizes[region.slot()]
    }

    /// Size of the whole image.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.total_size
    }
}

/// Append-only storage with a fixed capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct Arena<T> {
    region: Region,
    items: Vec<T>,
    capacity: usize,
}

impl<T> Arena<T> {
    /// Reserve an arena holding exactly `capacity` elements.
    pub fn with_capacity(region: Region, capacity: usize) -> Self {
        Self {
            region,
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an element and return its index.
    pub fn push(&mut self, item: T) -> Result<u32> {
        if self.items.len() >= self.capacity {
            return Err(Error::ArenaOverflow {
                region: self.region,
                capacity: self.capacity,
            });
        }
        let index = self.items.len() as u32;
        self.items.push(item);
        Ok(index)
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        self.items.get(index as usize)
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.items.get_mut(index as usize)
    }

    /// Elements `first..first + count`, empty if the range is out of bounds.
    pub fn range(&self, first: u32, count: u32) -> &[T] {
        if count == 0 {
            return &[];
        }
        let start = first as usize;
        self.items
            .get(start..start.saturating_add(count as usize))
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether every reserved slot is used.
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn region(&self) -> Region {
        self.region
    }
}

/// NUL-terminated string storage with a fixed byte capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringPool {
    bytes: Vec<u8>,
    capacity: usize,
}

impl StringPool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Wrap raw pool bytes read from an image.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let capacity = bytes.len();
        Self { bytes, capacity }
    }

    /// Append `text` plus a terminator and return its offset.
    pub fn append(&mut self, text: &str) -> Result<u32> {
        if self.bytes.len() + text.len() + 1 > self.capacity {
            return Err(Error::ArenaOverflow {
                region: Region::StringBuffer,
                capacity: self.capacity,
            });
        }
        let offset = self.bytes.len() as u32;
        self.bytes.extend_from_slice(text.as_bytes());
        self.bytes.push(0);
        Ok(offset)
    }

    /// String starting at `offset`.
    pub fn get(&self, offset: u32) -> Option<&str> {
        truecrowd_common::cstr_at(&self.bytes, offset as usize).ok()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.bytes.len() == self.capacity
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// One arena per region.
#[derive(Debug, Clone, PartialEq)]
pub struct Arenas {
    pub tags: Arena<u32>,
    pub component_entries: Arena<ComponentEntriesRecord>,
    pub resource_entries: Arena<ResourceEntryRecord>,
    pub lods: Arena<LodRecord>,
    pub model_parts: Arena<ModelPartRecord>,
    /// Texture-set indices, referenced by resource entries.
    pub texture_set_slots: Arena<u32>,
    pub texture_sets: Arena<TextureSetRecord>,
    pub colour_tints: Arena<ColourRecord>,
    pub override_params: Arena<OverrideParamRecord>,
    pub strings: StringPool,
}

impl Arenas {
    /// Reserve every region with exactly the estimated capacity.
    pub fn allocate(estimate: &Estimate) -> Self {
        let arena = |region| estimate.count(region);
        Self {
            tags: Arena::with_capacity(Region::TagList, arena(Region::TagList)),
            component_entries: Arena::with_capacity(
                Region::ComponentEntries,
                arena(Region::ComponentEntries),
            ),
            resource_entries: Arena::with_capacity(
                Region::ResourceEntries,
                arena(Region::ResourceEntries),
            ),
            lods: Arena::with_capacity(Region::Lods, arena(Region::Lods)),
            model_parts: Arena::with_capacity(Region::ModelParts, arena(Region::ModelParts)),
            texture_set_slots: Arena::with_capacity(
                Region::TextureSetArray,
                arena(Region::TextureSetArray),
            ),
            texture_sets: Arena::with_capacity(Region::TextureSets, arena(Region::TextureSets)),
            colour_tints: Arena::with_capacity(Region::ColourTints, arena(Region::ColourTints)),
            override_params: Arena::with_capacity(
                Region::OverrideParams,
                arena(Region::OverrideParams),
            ),
            strings: StringPool::with_capacity(arena(Region::StringBuffer)),
        }
    }

    /// Element counts currently in use.
    pub fn used(&self) -> Estimate {
        Estimate {
            tags: self.tags.len() as u32,
            component_entries: self.component_entries.len() as u32,
            resource_entries: self.resource_entries.len() as u32,
            lods: self.lods.len() as u32,
            model_parts: self.model_parts.len() as u32,
            texture_set_slots: self.texture_set_slots.len() as u32,
            texture_sets: self.texture_sets.len() as u32,
            colour_tints: self.colour_tints.len() as u32,
            override_params: self.override_params.len() as u32,
            string_bytes: self.strings.len() as u32,
        }
    }

    /// Fail unless every region holds exactly its estimated count.
    pub fn check_filled(&self, estimate: &Estimate) -> Result<()> {
        let used = self.used();
        for region in Region::ALL {
            let (expected, actual) = (estimate.count(region), used.count(region));
            if expected != actual {
                return Err(Error::LayoutMismatch {
                    region,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regions_are_aligned_and_ordered() {
        let counts = Estimate {
            tags: 3,
            component_entries: 1,
            resource_entries: 2,
            lods: 1,
            model_parts: 5,
            texture_set_slots: 1,
            texture_sets: 1,
            colour_tints: 3,
            override_params: 1,
            string_bytes: 17,
        };
        let layout = Layout::compute(&counts);

        let mut previous_end = size_of::<DatabaseHeader>();
        for region in Region::ALL {
            let offset = layout.offset(region);
            assert_eq!(offset % REGION_ALIGN, 0, "{region}");
            assert!(offset >= previous_end, "{region}");
            assert_eq!(layout.size(region), counts.count(region) * region.element_size());
            previous_end = offset + layout.size(region);
        }
        assert_eq!(layout.total_size(), previous_end.next_multiple_of(REGION_ALIGN));
    }

    #[test]
    fn test_empty_layout() {
        let layout = Layout::compute(&Estimate::default());
        let header = size_of::<DatabaseHeader>().next_multiple_of(REGION_ALIGN);
        assert_eq!(layout.total_size(), header);
        assert_eq!(layout.offset(Region::StringBuffer), header);
    }

    #[test]
    fn test_arena_never_grows() {
        let mut arena = Arena::with_capacity(Region::Lods, 2);
        assert_eq!(arena.push(LodRecord { first_part: 0, part_count: 1 }).unwrap(), 0);
        assert_eq!(arena.push(LodRecord { first_part: 1, part_count: 1 }).unwrap(), 1);
        assert!(arena.is_full());
        assert!(matches!(
            arena.push(LodRecord { first_part: 2, part_count: 1 }),
            Err(Error::ArenaOverflow { region: Region::Lods, capacity: 2 })
        ));
        assert_eq!(arena.range(1, 1).len(), 1);
        assert!(arena.range(1, 5).is_empty());
    }

    #[test]
    fn test_string_pool() {
        let mut pool = StringPool::with_capacity(9);
        assert_eq!(pool.append("Ped").unwrap(), 0);
        assert_eq!(pool.append("Car").unwrap(), 4);
        assert_eq!(pool.get(4), Some("Car"));
        assert!(pool.append("x").is_err());
        assert!(!pool.is_full());
        assert_eq!(pool.append("").unwrap(), 8);
        assert!(pool.is_full());
    }

    #[test]
    fn test_check_filled() {
        let estimate = Estimate {
            tags: 1,
            ..Estimate::default()
        };
        let mut arenas = Arenas::allocate(&estimate);
        assert!(matches!(
            arenas.check_filled(&estimate),
            Err(Error::LayoutMismatch { region: Region::TagList, expected: 1, actual: 0 })
        ));
        arenas.tags.push(7).unwrap();
        assert!(arenas.check_filled(&estimate).is_ok());
    }
}
