// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-pass record of every surface reached so far.
//!
//! The registry maps provider surface ids to the surface entity created for
//! them and to the one or two volumes bounding them. It only holds keys into
//! the database, never the entities themselves, and lives for one
//! construction pass.

use std::collections::hash_map::Entry;

use dagmc_lite_core::{EntityKey, TagValue, TaggedDatabase};
use dagmc_lite_geometry::SurfaceId;
use rustc_hash::FxHashMap;

/// State of one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceRecord {
    /// The surface entity set.
    pub handle: EntityKey,
    /// First volume that reached this surface.
    pub forward_volume: Option<EntityKey>,
    /// Second volume that reached this surface, if any.
    pub reverse_volume: Option<EntityKey>,
    encounters: u8,
}

impl SurfaceRecord {
    fn new(handle: EntityKey) -> Self {
        Self {
            handle,
            forward_volume: None,
            reverse_volume: None,
            encounters: 1,
        }
    }

    /// Value of the sense tag: `(forward, reverse)`, unset slots null.
    pub fn sense_data(&self) -> TagValue {
        TagValue::Handles(vec![self.forward_volume, self.reverse_volume])
    }

    /// Shared by two volumes.
    pub fn is_interior(&self) -> bool {
        self.forward_volume.is_some() && self.reverse_volume.is_some()
    }

    /// How many volumes have reached this surface.
    pub fn encounters(&self) -> u8 {
        self.encounters
    }
}

/// Outcome of [`SurfaceRegistry::lookup_or_create`].
#[derive(Debug)]
pub enum Encounter<'r> {
    /// The surface was unseen; a new entity set was created for it.
    First(&'r mut SurfaceRecord),
    /// The surface was seen once before.
    Second(&'r mut SurfaceRecord),
    /// The surface was already seen twice. Nothing was changed.
    Excess(SurfaceRecord),
}

/// Mapping from provider surface id to surface state.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    records: FxHashMap<SurfaceId, SurfaceRecord>,
    order: Vec<SurfaceId>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `surface`, creating its entity set in `db` on first sight.
    pub fn lookup_or_create(&mut self, db: &mut TaggedDatabase, surface: SurfaceId) -> Encounter<'_> {
        match self.records.entry(surface) {
            Entry::Vacant(slot) => {
                let handle = db.create_entity_set();
                self.order.push(surface);
                Encounter::First(slot.insert(SurfaceRecord::new(handle)))
            }
            Entry::Occupied(slot) => {
                let record = slot.into_mut();
                if record.encounters >= 2 {
                    return Encounter::Excess(*record);
                }
                record.encounters += 1;
                Encounter::Second(record)
            }
        }
    }

    pub fn get(&self, surface: SurfaceId) -> Option<&SurfaceRecord> {
        self.records.get(&surface)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Surfaces in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (SurfaceId, &SurfaceRecord)> {
        self.order.iter().map(|id| (*id, &self.records[id]))
    }

    /// Number of surfaces bounded by two volumes.
    pub fn interior_count(&self) -> usize {
        self.records.values().filter(|r| r.is_interior()).count()
    }
}
