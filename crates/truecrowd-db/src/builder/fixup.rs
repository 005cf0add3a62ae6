//! Deferred `HighResolutionResource` references.
//!
//! References may point forward, so they are recorded while filling and resolved
//! once every resource entry and texture set exists. Names are looked up through
//! an index built once per build; the first occurrence of a name wins.

use std::hash::BuildHasherDefault;

use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;

use crate::error::ReferenceKind;
use crate::layout::{Arena, Arenas, StringPool};
use crate::structs::ResourceRecord;
use crate::{Error, Result};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

/// The record whose `high_res` field a fixup writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixupSlot {
    /// Index into the resource entry region.
    Resource(u32),
    /// Index into the texture set region.
    TextureSet(u32),
}

impl FixupSlot {
    pub fn kind(&self) -> ReferenceKind {
        match self {
            Self::Resource(_) => ReferenceKind::Model,
            Self::TextureSet(_) => ReferenceKind::TextureSet,
        }
    }
}

/// A reference recorded during filling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFixup {
    pub slot: FixupSlot,
    /// Name of the target resource or texture set.
    pub target: String,
}

/// Name to index lookup over one region.
fn name_index<'p, T>(
    arena: &Arena<T>,
    strings: &'p StringPool,
    resource: impl Fn(&T) -> &ResourceRecord,
) -> FxHashMap<&'p str, u32> {
    let mut index = FxHashMap::default();
    for (i, item) in arena.as_slice().iter().enumerate() {
        if let Some(name) = strings.get(resource(item).name) {
            index.entry(name).or_insert(i as u32);
        }
    }
    index
}

/// Resolve every fixup and return how many were applied.
pub(crate) fn resolve(arenas: &mut Arenas, fixups: &[PendingFixup]) -> Result<usize> {
    if fixups.is_empty() {
        return Ok(0);
    }

    let resolved = {
        let resources = name_index(&arenas.resource_entries, &arenas.strings, |e| &e.resource);
        let texture_sets = name_index(&arenas.texture_sets, &arenas.strings, |t| &t.resource);

        fixups
            .iter()
            .map(|fixup| {
                let index = match fixup.slot {
                    FixupSlot::Resource(_) => &resources,
                    FixupSlot::TextureSet(_) => &texture_sets,
                };
                index
                    .get(fixup.target.as_str())
                    .map(|&target| (fixup.slot, target))
                    .ok_or_else(|| Error::UnresolvedReference {
                        name: fixup.target.clone(),
                        kind: fixup.slot.kind(),
                    })
            })
            .collect::<Result<Vec<_>>>()?
    };

    for &(slot, target) in &resolved {
        let record = match slot {
            FixupSlot::Resource(i) => arenas.resource_entries.get_mut(i).map(|e| &mut e.resource),
            FixupSlot::TextureSet(i) => arenas.texture_sets.get_mut(i).map(|t| &mut t.resource),
        };
        if let Some(record) = record {
            record.high_res = target;
        }
    }

    tracing::debug!(count = resolved.len(), "resolved high-resolution references");
    Ok(resolved.len())
}
