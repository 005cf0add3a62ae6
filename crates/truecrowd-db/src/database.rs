//! The in-memory crowd database and its binary image.
//!
//! A [`CrowdDatabase`] is a header plus one arena per region. [`to_bytes`]
//! lays it out as one contiguous image (see [`Layout`]); [`parse`] reads such
//! an image back and checks that every index and string offset stays inside
//! its region.
//!
//! [`to_bytes`]: CrowdDatabase::to_bytes
//! [`parse`]: CrowdDatabase::parse

use std::path::Path;

use memmap2::Mmap;
use truecrowd_chunk::{ChunkFile, ChunkFileBuilder};
use truecrowd_common::hash::hash32;
use truecrowd_common::BinaryReader;
use zerocopy::IntoBytes;

use crate::layout::{Arena, Arenas, Layout, Region, StringPool};
use crate::structs::{
    ColourRecord, ComponentEntriesRecord, ComponentRecord, DatabaseHeader, DefinitionRecord,
    Estimate, LodRecord, ModelPartRecord, OverrideParamRecord, ResourceEntryRecord,
    ResourceRecord, TextureSetRecord, MAX_COMPONENTS, MAX_ENTITIES, MAX_TAGS, NULL_INDEX,
};
use crate::types::ResourceType;
use crate::{Error, Result};

/// Resource type id stored in the header.
pub const TYPE_UID: u32 = hash32("TrueCrowdDataBase");
/// Resource name id stored in the header.
pub const NAME_UID: u32 = hash32("TrueCrowdDB");
/// Chunk uid of a crowd database chunk.
pub const CHUNK_UID: u32 = hash32("TrueCrowdDataBase");
/// Current chunk version.
pub const CHUNK_VERSION: u32 = 1;
/// Debug name of the chunk.
pub const CHUNK_NAME: &str = "TrueCrowdDB";
/// Platform tag written to chunk files.
pub const PLATFORM: [u8; 4] = *b"PC64";

/// Element counts of a database, for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub entities: usize,
    pub components: usize,
    pub tags: usize,
    pub resource_entries: usize,
    pub lods: usize,
    pub model_parts: usize,
    pub texture_sets: usize,
    pub colour_tints: usize,
    pub override_params: usize,
    pub string_bytes: usize,
    /// Size of the binary image.
    pub image_size: usize,
}

/// A crowd resource database.
#[derive(Debug, Clone, PartialEq)]
pub struct CrowdDatabase {
    header: DatabaseHeader,
    arenas: Arenas,
}

impl CrowdDatabase {
    pub(crate) fn from_parts(header: DatabaseHeader, arenas: Arenas) -> Self {
        Self { header, arenas }
    }

    /// Open a chunk file and read its crowd database chunk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_chunk_file(&ChunkFile::open(path)?)
    }

    /// Open a bare image file (no chunk container).
    pub fn open_image<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        // SAFETY: the mapping is only read while parsing and all records are copied out.
        let mmap = unsafe { Mmap::map(&file)? };
        Self::parse(&mmap)
    }

    /// Read the crowd database chunk of a parsed chunk file.
    pub fn from_chunk_file(file: &ChunkFile) -> Result<Self> {
        let chunk = file.require(CHUNK_UID)?;
        if chunk.version != CHUNK_VERSION {
            tracing::warn!(
                version = chunk.version,
                expected = CHUNK_VERSION,
                "unexpected crowd database chunk version"
            );
        }
        Self::parse(&chunk.data)
    }

    fn chunk_builder(&self) -> Result<ChunkFileBuilder> {
        let mut builder = ChunkFileBuilder::new(PLATFORM);
        builder.add_chunk(CHUNK_UID, CHUNK_NAME, CHUNK_VERSION, self.to_bytes())?;
        Ok(builder)
    }

    /// Wrap the image in a chunk file.
    pub fn to_chunk_file(&self) -> Result<Vec<u8>> {
        Ok(self.chunk_builder()?.build())
    }

    /// Write the database as a chunk file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.chunk_builder()?.write_to_file(path)?;
        Ok(())
    }

    /// Lay the database out as one contiguous image.
    pub fn to_bytes(&self) -> Vec<u8> {
        let layout = Layout::compute(&self.header.counts);
        let mut image = vec![0u8; layout.total_size()];
        image[..std::mem::size_of::<DatabaseHeader>()].copy_from_slice(self.header.as_bytes());

        let a = &self.arenas;
        let mut write = |region, bytes: &[u8]| {
            let offset = layout.offset(region);
            image[offset..offset + bytes.len()].copy_from_slice(bytes);
        };
        write(Region::TagList, a.tags.as_slice().as_bytes());
        write(Region::ComponentEntries, a.component_entries.as_slice().as_bytes());
        write(Region::ResourceEntries, a.resource_entries.as_slice().as_bytes());
        write(Region::Lods, a.lods.as_slice().as_bytes());
        write(Region::ModelParts, a.model_parts.as_slice().as_bytes());
        write(Region::TextureSetArray, a.texture_set_slots.as_slice().as_bytes());
        write(Region::TextureSets, a.texture_sets.as_slice().as_bytes());
        write(Region::ColourTints, a.colour_tints.as_slice().as_bytes());
        write(Region::OverrideParams, a.override_params.as_slice().as_bytes());
        write(Region::StringBuffer, a.strings.as_bytes());

        image
    }

    /// Parse and validate an image.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header: DatabaseHeader = BinaryReader::new(data).read_struct()?;
        if header.type_uid != TYPE_UID {
            return Err(Error::InvalidTypeUid {
                expected: TYPE_UID,
                actual: header.type_uid,
            });
        }

        let layout = Layout::compute(&header.counts);
        if header.total_size as usize != layout.total_size() {
            return Err(Error::SizeMismatch {
                expected: header.total_size as usize,
                actual: layout.total_size(),
            });
        }
        if data.len() < layout.total_size() {
            return Err(Error::SizeMismatch {
                expected: layout.total_size(),
                actual: data.len(),
            });
        }

        let counts = &header.counts;
        let string_bytes = counts.count(Region::StringBuffer);
        let strings = BinaryReader::new_at(data, layout.offset(Region::StringBuffer))
            .read_bytes(string_bytes)?
            .to_vec();

        let arenas = Arenas {
            tags: read_region(data, &layout, counts, Region::TagList)?,
            component_entries: read_region(data, &layout, counts, Region::ComponentEntries)?,
            resource_entries: read_region(data, &layout, counts, Region::ResourceEntries)?,
            lods: read_region(data, &layout, counts, Region::Lods)?,
            model_parts: read_region(data, &layout, counts, Region::ModelParts)?,
            texture_set_slots: read_region(data, &layout, counts, Region::TextureSetArray)?,
            texture_sets: read_region(data, &layout, counts, Region::TextureSets)?,
            colour_tints: read_region(data, &layout, counts, Region::ColourTints)?,
            override_params: read_region(data, &layout, counts, Region::OverrideParams)?,
            strings: StringPool::from_bytes(strings),
        };

        let database = Self { header, arenas };
        database.validate()?;
        tracing::debug!(bytes = layout.total_size(), "parsed crowd database image");
        Ok(database)
    }

    fn validate(&self) -> Result<()> {
        let definition = &self.header.definition;
        check_count(definition.entity_count, MAX_ENTITIES, "Entity")?;
        check_count(definition.component_count, MAX_COMPONENTS, "Component")?;
        check_count(definition.tag_count, MAX_TAGS, "Tag")?;

        let a = &self.arenas;
        if definition.component_count as usize != a.component_entries.len() {
            return Err(Error::LayoutMismatch {
                region: Region::ComponentEntries,
                expected: definition.component_count as usize,
                actual: a.component_entries.len(),
            });
        }
        if definition.tag_count as usize != a.tags.len() {
            return Err(Error::LayoutMismatch {
                region: Region::TagList,
                expected: definition.tag_count as usize,
                actual: a.tags.len(),
            });
        }

        for entries in a.component_entries.as_slice() {
            check_range(&a.resource_entries, entries.first_entry, entries.entry_count)?;
        }
        for entry in a.resource_entries.as_slice() {
            self.check_resource(&entry.resource, &a.resource_entries)?;
            check_range(&a.lods, entry.first_lod, entry.lod_count)?;
            check_range(
                &a.texture_set_slots,
                entry.first_texture_set_slot,
                entry.texture_set_count,
            )?;
        }
        for lod in a.lods.as_slice() {
            check_range(&a.model_parts, lod.first_part, lod.part_count)?;
        }
        for part in a.model_parts.as_slice() {
            self.check_string(part.name)?;
        }
        for &slot in a.texture_set_slots.as_slice() {
            check_index(&a.texture_sets, slot)?;
        }
        for texture_set in a.texture_sets.as_slice() {
            self.check_resource(&texture_set.resource, &a.texture_sets)?;
            check_range(&a.colour_tints, texture_set.first_tint, texture_set.tint_count)?;
            check_range(&a.override_params, texture_set.first_param, texture_set.param_count)?;
        }
        Ok(())
    }

    fn check_resource<T>(&self, resource: &ResourceRecord, region: &Arena<T>) -> Result<()> {
        self.check_string(resource.name)?;
        if resource.high_res != NULL_INDEX {
            check_index(region, resource.high_res)?;
        }
        Ok(())
    }

    fn check_string(&self, offset: u32) -> Result<()> {
        truecrowd_common::cstr_at(self.arenas.strings.as_bytes(), offset as usize)
            .map(|_| ())
            .map_err(|_| Error::IndexOutOfBounds {
                region: Region::StringBuffer,
                index: offset,
                len: self.arenas.strings.len(),
            })
    }

    /// The image header.
    pub fn header(&self) -> &DatabaseHeader {
        &self.header
    }

    pub fn definition(&self) -> &DefinitionRecord {
        &self.header.definition
    }

    /// Region counts of this database.
    pub fn counts(&self) -> &Estimate {
        &self.header.counts
    }

    /// Raw arenas.
    pub fn arenas(&self) -> &Arenas {
        &self.arenas
    }

    /// Component types in definition order.
    pub fn components(&self) -> &[ComponentRecord] {
        self.header.definition.components()
    }

    /// Name of component type `index`.
    pub fn component_name(&self, index: usize) -> Option<&str> {
        self.components().get(index).map(ComponentRecord::name)
    }

    /// Index of the component type with the given name.
    pub fn component_index(&self, name: &str) -> Option<usize> {
        self.components().iter().position(|c| c.name() == name)
    }

    /// Tag ids in bit order.
    pub fn tags(&self) -> &[u32] {
        self.arenas.tags.as_slice()
    }

    /// Entry ranges, one per component type.
    pub fn component_entries(&self) -> &[ComponentEntriesRecord] {
        self.arenas.component_entries.as_slice()
    }

    /// Every resource entry, grouped by component type.
    pub fn resource_entries(&self) -> &[ResourceEntryRecord] {
        self.arenas.resource_entries.as_slice()
    }

    /// Resource entries of component type `component`.
    pub fn resources_of(&self, component: usize) -> &[ResourceEntryRecord] {
        match self.component_entries().get(component) {
            Some(entries) => self
                .arenas
                .resource_entries
                .range(entries.first_entry, entries.entry_count),
            None => &[],
        }
    }

    pub fn lods(&self, entry: &ResourceEntryRecord) -> &[LodRecord] {
        self.arenas.lods.range(entry.first_lod, entry.lod_count)
    }

    pub fn model_parts(&self, lod: &LodRecord) -> &[ModelPartRecord] {
        self.arenas.model_parts.range(lod.first_part, lod.part_count)
    }

    /// Texture sets of a resource entry, through its slot range.
    pub fn texture_sets<'a>(
        &'a self,
        entry: &ResourceEntryRecord,
    ) -> impl Iterator<Item = &'a TextureSetRecord> + 'a {
        self.arenas
            .texture_set_slots
            .range(entry.first_texture_set_slot, entry.texture_set_count)
            .iter()
            .filter_map(|&slot| self.arenas.texture_sets.get(slot))
    }

    /// Every texture set in region order.
    pub fn all_texture_sets(&self) -> &[TextureSetRecord] {
        self.arenas.texture_sets.as_slice()
    }

    pub fn colour_tints(&self, texture_set: &TextureSetRecord) -> &[ColourRecord] {
        self.arenas
            .colour_tints
            .range(texture_set.first_tint, texture_set.tint_count)
    }

    pub fn override_params(&self, texture_set: &TextureSetRecord) -> &[OverrideParamRecord] {
        self.arenas
            .override_params
            .range(texture_set.first_param, texture_set.param_count)
    }

    /// String at a pool offset.
    pub fn string(&self, offset: u32) -> Option<&str> {
        self.arenas.strings.get(offset)
    }

    /// Name of a resource or texture set.
    pub fn resource_name(&self, resource: &ResourceRecord) -> Option<&str> {
        self.string(resource.name)
    }

    /// Type of a resource or texture set, `None` for unknown raw values.
    pub fn resource_type(&self, resource: &ResourceRecord) -> Option<ResourceType> {
        ResourceType::from_i32(resource.resource_type)
    }

    /// Tag ids whose bit is set on `entry`.
    pub fn entry_tags(&self, entry: &ResourceEntryRecord) -> Vec<u32> {
        entry
            .tags
            .iter()
            .filter_map(|bit| self.tags().get(bit).copied())
            .collect()
    }

    /// High-resolution counterpart of a resource entry.
    pub fn high_res_entry(&self, entry: &ResourceEntryRecord) -> Option<&ResourceEntryRecord> {
        self.follow(entry.resource.high_res, &self.arenas.resource_entries)
    }

    /// High-resolution counterpart of a texture set.
    pub fn high_res_texture_set(
        &self,
        texture_set: &TextureSetRecord,
    ) -> Option<&TextureSetRecord> {
        self.follow(texture_set.resource.high_res, &self.arenas.texture_sets)
    }

    fn follow<'a, T>(&self, index: u32, arena: &'a Arena<T>) -> Option<&'a T> {
        if index == NULL_INDEX {
            return None;
        }
        arena.get(index)
    }

    /// First resource entry with the given name.
    pub fn find_resource(&self, name: &str) -> Option<&ResourceEntryRecord> {
        self.resource_entries()
            .iter()
            .find(|e| self.resource_name(&e.resource) == Some(name))
    }

    /// First texture set with the given name.
    pub fn find_texture_set(&self, name: &str) -> Option<&TextureSetRecord> {
        self.all_texture_sets()
            .iter()
            .find(|t| self.resource_name(&t.resource) == Some(name))
    }

    /// Element counts.
    pub fn summary(&self) -> Summary {
        let counts = &self.header.counts;
        Summary {
            entities: self.header.definition.entities().len(),
            components: self.components().len(),
            tags: counts.tags as usize,
            resource_entries: counts.resource_entries as usize,
            lods: counts.lods as usize,
            model_parts: counts.model_parts as usize,
            texture_sets: counts.texture_sets as usize,
            colour_tints: counts.colour_tints as usize,
            override_params: counts.override_params as usize,
            string_bytes: counts.string_bytes as usize,
            image_size: self.header.total_size as usize,
        }
    }
}

fn read_region<T: zerocopy::FromBytes>(
    data: &[u8],
    layout: &Layout,
    counts: &Estimate,
    region: Region,
) -> Result<Arena<T>> {
    let count = counts.count(region);
    let items = BinaryReader::new_at(data, layout.offset(region)).read_array::<T>(count)?;
    let mut arena = Arena::with_capacity(region, count);
    for item in items {
        arena.push(item)?;
    }
    Ok(arena)
}

fn check_count(count: u32, capacity: usize, what: &'static str) -> Result<()> {
    if count as usize > capacity {
        return Err(Error::CapacityExceeded {
            what,
            capacity,
            owner: None,
        });
    }
    Ok(())
}

fn check_index<T>(arena: &Arena<T>, index: u32) -> Result<()> {
    if index as usize >= arena.len() {
        return Err(Error::IndexOutOfBounds {
            region: arena.region(),
            index,
            len: arena.len(),
        });
    }
    Ok(())
}

fn check_range<T>(arena: &Arena<T>, first: u32, count: u32) -> Result<()> {
    if count == 0 {
        return Ok(());
    }
    let end = u64::from(first) + u64::from(count);
    if end > arena.len() as u64 {
        return Err(Error::IndexOutOfBounds {
            region: arena.region(),
            index: first,
            len: arena.len(),
        });
    }
    Ok(())
}
