// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based tagged entity database.
//!
//! The [`TaggedDatabase`] owns every entity set and every tag. Entity sets are
//! related in two independent ways:
//!
//! - **membership**: a set contains other sets (file set → everything,
//!   group → volume)
//! - **parent/child**: a geometric hierarchy (volume → bounding surfaces),
//!   indexed in both directions
//!
//! Entities are never removed, so iteration order is creation order.

use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::facets::FacetPatch;
use crate::keys::{EntityKey, TagKey};
use crate::tag::{TagDefinition, TagStorage, TagType, TagValue, GLOBAL_ID_TAG_NAME};

/// Data stored for an entity set.
#[derive(Debug, Clone, Default)]
pub struct EntitySetData {
    /// Contained sets, in insertion order, without duplicates.
    pub members: Vec<EntityKey>,
    /// Child sets (downward geometric links).
    pub children: Vec<EntityKey>,
    /// Parent sets (upward geometric links).
    pub parents: Vec<EntityKey>,
    /// Local facet geometry, if any was loaded.
    pub facets: Option<FacetPatch>,
}

/// The central store of entity sets, tag definitions and tag values.
///
/// # Example
///
/// ```
/// use dagmc_lite_core::{TaggedDatabase, TagType, TagStorage, TagValue};
///
/// let mut db = TaggedDatabase::new();
/// let set = db.create_entity_set();
/// let dim = db
///     .tag_get_or_create("GEOM_DIMENSION", TagType::Integer, 1, TagStorage::Sparse)
///     .unwrap();
/// db.tag_set_data(dim, set, TagValue::Integer(3)).unwrap();
///
/// assert_eq!(db.tag_get_data(dim, set).and_then(|v| v.as_integer()), Some(3));
/// ```
#[derive(Debug)]
pub struct TaggedDatabase {
    pub(crate) sets: SlotMap<EntityKey, EntitySetData>,
    pub(crate) tags: SlotMap<TagKey, TagDefinition>,
    pub(crate) tag_names: FxHashMap<String, TagKey>,
    pub(crate) tag_data: FxHashMap<TagKey, FxHashMap<EntityKey, TagValue>>,
}

impl TaggedDatabase {
    /// Creates an empty database with the default `GLOBAL_ID` tag defined.
    pub fn new() -> Self {
        let mut tags = SlotMap::with_key();
        let mut tag_names = FxHashMap::default();
        let global_id = tags.insert(TagDefinition::new(
            GLOBAL_ID_TAG_NAME,
            TagType::Integer,
            1,
            TagStorage::Dense,
        ));
        tag_names.insert(GLOBAL_ID_TAG_NAME.to_string(), global_id);

        Self {
            sets: SlotMap::with_key(),
            tags,
            tag_names,
            tag_data: FxHashMap::default(),
        }
    }

    /// Reads a database previously written with [`TaggedDatabase::write_file`].
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Writes the database to a single file.
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    // --- Entity sets ---

    /// Creates a new, empty entity set.
    pub fn create_entity_set(&mut self) -> EntityKey {
        self.sets.insert(EntitySetData::default())
    }

    /// Returns the set data for the given key, or `None` if not found.
    pub fn entity_set(&self, key: EntityKey) -> Option<&EntitySetData> {
        self.sets.get(key)
    }

    /// Returns `true` if the key references a set in this database.
    pub fn contains(&self, key: EntityKey) -> bool {
        self.sets.contains_key(key)
    }

    /// Returns the number of entity sets.
    pub fn entity_count(&self) -> usize {
        self.sets.len()
    }

    /// Iterates all entity sets in creation order.
    pub fn entities(&self) -> impl Iterator<Item = EntityKey> + '_ {
        self.sets.keys()
    }

    fn set_mut(&mut self, key: EntityKey) -> Result<&mut EntitySetData> {
        self.sets.get_mut(key).ok_or(Error::EntityNotFound(key))
    }

    fn check(&self, key: EntityKey) -> Result<()> {
        if self.sets.contains_key(key) {
            Ok(())
        } else {
            Err(Error::EntityNotFound(key))
        }
    }

    // --- Membership ---

    /// Adds sets as members of `set`. Already present members are skipped.
    pub fn add_entities(&mut self, set: EntityKey, entities: &[EntityKey]) -> Result<()> {
        for &e in entities {
            self.check(e)?;
        }
        let data = self.set_mut(set)?;
        let mut present: FxHashSet<EntityKey> = data.members.iter().copied().collect();
        for &e in entities {
            if present.insert(e) {
                data.members.push(e);
            }
        }
        Ok(())
    }

    /// Returns the members of a set.
    pub fn members(&self, set: EntityKey) -> &[EntityKey] {
        self.sets
            .get(set)
            .map(|s| s.members.as_slice())
            .unwrap_or(&[])
    }

    // --- Parent / child ---

    /// Links `child` under `parent`. Repeated links are ignored.
    pub fn add_parent_child(&mut self, parent: EntityKey, child: EntityKey) -> Result<()> {
        if parent == child {
            return Err(Error::SelfParent(parent));
        }
        self.check(parent)?;
        self.check(child)?;

        let p = self.set_mut(parent)?;
        if !p.children.contains(&child) {
            p.children.push(child);
        }
        let c = self.set_mut(child)?;
        if !c.parents.contains(&parent) {
            c.parents.push(parent);
        }
        Ok(())
    }

    /// Returns the children of a set.
    pub fn children(&self, set: EntityKey) -> &[EntityKey] {
        self.sets
            .get(set)
            .map(|s| s.children.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the parents of a set.
    pub fn parents(&self, set: EntityKey) -> &[EntityKey] {
        self.sets
            .get(set)
            .map(|s| s.parents.as_slice())
            .unwrap_or(&[])
    }

    // --- Facets ---

    /// Loads a facet patch into a set. If the set already holds facets, the
    /// new triangles are appended with their vertex indices offset.
    pub fn load_facets(&mut self, set: EntityKey, patch: FacetPatch) -> Result<()> {
        patch.validate()?;
        let data = self.set_mut(set)?;
        match data.facets.as_mut() {
            None => data.facets = Some(patch),
            Some(existing) => {
                let offset = existing.vertices.len() as u32;
                existing.vertices.extend(patch.vertices);
                existing.triangles.extend(
                    patch
                        .triangles
                        .into_iter()
                        .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
                );
            }
        }
        Ok(())
    }

    /// Reads an STL file (ASCII or binary) into a set.
    pub fn load_stl(&mut self, path: impl AsRef<Path>, set: EntityKey) -> Result<()> {
        self.check(set)?;
        let patch = crate::stl::read_stl(path)?;
        self.load_facets(set, patch)
    }

    /// Returns the facets loaded into a set.
    pub fn facets(&self, set: EntityKey) -> Option<&FacetPatch> {
        self.sets.get(set).and_then(|s| s.facets.as_ref())
    }

    // --- Tags ---

    /// Returns the handle of an existing tag, creating it if missing.
    ///
    /// Fails with [`Error::TagConflict`] when a tag with this name exists
    /// with a different type or size.
    pub fn tag_get_or_create(
        &mut self,
        name: &str,
        data_type: TagType,
        size: usize,
        storage: TagStorage,
    ) -> Result<TagKey> {
        if let Some(&key) = self.tag_names.get(name) {
            let existing = &self.tags[key];
            if !existing.is_compatible(data_type, size) {
                return Err(Error::TagConflict {
                    name: name.to_string(),
                    existing_type: existing.data_type,
                    existing_size: existing.size,
                    requested_type: data_type,
                    requested_size: size,
                });
            }
            return Ok(key);
        }

        let def = TagDefinition::new(name, data_type, size, storage);
        def.check_shape()?;
        let key = self.tags.insert(def);
        self.tag_names.insert(name.to_string(), key);
        Ok(key)
    }

    /// Returns the handle of an existing tag.
    pub fn tag_handle(&self, name: &str) -> Result<TagKey> {
        self.tag_names
            .get(name)
            .copied()
            .ok_or_else(|| Error::TagNotFound(name.to_string()))
    }

    /// Returns a tag's declaration.
    pub fn tag_definition(&self, tag: TagKey) -> Option<&TagDefinition> {
        self.tags.get(tag)
    }

    /// Returns the number of defined tags.
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Iterates tag declarations in creation order.
    pub fn tag_definitions(&self) -> impl Iterator<Item = (TagKey, &TagDefinition)> {
        self.tags.iter()
    }

    /// Stores a tag value on an entity, replacing any previous value.
    pub fn tag_set_data(&mut self, tag: TagKey, entity: EntityKey, value: TagValue) -> Result<()> {
        let def = self.tags.get(tag).ok_or(Error::TagKeyNotFound(tag))?;
        def.validate(&value)?;
        self.check(entity)?;
        if let TagValue::Handles(handles) = &value {
            for &h in handles.iter().flatten() {
                self.check(h)?;
            }
        }
        self.tag_data.entry(tag).or_default().insert(entity, value);
        Ok(())
    }

    /// Returns the value of a tag on an entity, if set.
    pub fn tag_get_data(&self, tag: TagKey, entity: EntityKey) -> Option<&TagValue> {
        self.tag_data.get(&tag).and_then(|m| m.get(&entity))
    }

    /// Returns the entities carrying `tag`, in creation order.
    pub fn entities_with_tag(&self, tag: TagKey) -> Vec<EntityKey> {
        match self.tag_data.get(&tag) {
            Some(values) => self.sets.keys().filter(|k| values.contains_key(k)).collect(),
            None => Vec::new(),
        }
    }

    /// Returns the entities whose `tag` value equals `value`, in creation order.
    pub fn entities_with_tag_value(&self, tag: TagKey, value: &TagValue) -> Vec<EntityKey> {
        match self.tag_data.get(&tag) {
            Some(values) => self
                .sets
                .keys()
                .filter(|k| values.get(k) == Some(value))
                .collect(),
            None => Vec::new(),
        }
    }
}

impl Default for TaggedDatabase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_database_has_global_id() {
        let db = TaggedDatabase::new();
        assert_eq!(db.entity_count(), 0);
        assert_eq!(db.tag_count(), 1);
        let gid = db.tag_handle(GLOBAL_ID_TAG_NAME).unwrap();
        let def = db.tag_definition(gid).unwrap();
        assert_eq!(def.data_type, TagType::Integer);
        assert_eq!(def.storage, TagStorage::Dense);
    }

    #[test]
    fn tag_get_or_create_is_idempotent() {
        let mut db = TaggedDatabase::new();
        let a = db
            .tag_get_or_create("CATEGORY", TagType::Opaque, 32, TagStorage::Sparse)
            .unwrap();
        let b = db
            .tag_get_or_create("CATEGORY", TagType::Opaque, 32, TagStorage::Dense)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(db.tag_count(), 2);
    }

    #[test]
    fn tag_conflict_on_size() {
        let mut db = TaggedDatabase::new();
        db.tag_get_or_create("GEOM_SENSE_2", TagType::Handle, 2, TagStorage::Sparse)
            .unwrap();
        let err = db
            .tag_get_or_create("GEOM_SENSE_2", TagType::Handle, 3, TagStorage::Sparse)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TagConflict {
                existing_size: 2,
                requested_size: 3,
                ..
            }
        ));
    }

    #[test]
    fn unknown_tag_name() {
        let db = TaggedDatabase::new();
        assert!(matches!(db.tag_handle("NOPE"), Err(Error::TagNotFound(_))));
    }

    #[test]
    fn add_entities_deduplicates() {
        let mut db = TaggedDatabase::new();
        let file = db.create_entity_set();
        let a = db.create_entity_set();
        let b = db.create_entity_set();
        db.add_entities(file, &[a, b]).unwrap();
        db.add_entities(file, &[b, a]).unwrap();
        assert_eq!(db.members(file), &[a, b]);
    }

    #[test]
    fn parent_child_is_bidirectional() {
        let mut db = TaggedDatabase::new();
        let vol = db.create_entity_set();
        let surf = db.create_entity_set();
        db.add_parent_child(vol, surf).unwrap();
        db.add_parent_child(vol, surf).unwrap();
        assert_eq!(db.children(vol), &[surf]);
        assert_eq!(db.parents(surf), &[vol]);
        assert!(matches!(db.add_parent_child(vol, vol), Err(Error::SelfParent(_))));
    }

    #[test]
    fn handle_values_must_reference_live_sets() {
        let mut db = TaggedDatabase::new();
        let sense = db
            .tag_get_or_create("GEOM_SENSE_2", TagType::Handle, 2, TagStorage::Sparse)
            .unwrap();
        let surf = db.create_entity_set();
        let vol = db.create_entity_set();
        db.tag_set_data(sense, surf, TagValue::Handles(vec![Some(vol), None]))
            .unwrap();

        let mut other = TaggedDatabase::new();
        other.create_entity_set();
        other.create_entity_set();
        let foreign = other.create_entity_set();
        assert!(matches!(
            db.tag_set_data(sense, surf, TagValue::Handles(vec![Some(foreign), None])),
            Err(Error::EntityNotFound(_))
        ));
    }

    #[test]
    fn entities_with_tag_in_creation_order() {
        let mut db = TaggedDatabase::new();
        let gid = db.tag_handle(GLOBAL_ID_TAG_NAME).unwrap();
        let sets: Vec<_> = (0..4).map(|_| db.create_entity_set()).collect();
        db.tag_set_data(gid, sets[3], TagValue::Integer(7)).unwrap();
        db.tag_set_data(gid, sets[1], TagValue::Integer(7)).unwrap();
        db.tag_set_data(gid, sets[2], TagValue::Integer(1)).unwrap();

        assert_eq!(db.entities_with_tag(gid), vec![sets[1], sets[2], sets[3]]);
        assert_eq!(
            db.entities_with_tag_value(gid, &TagValue::Integer(7)),
            vec![sets[1], sets[3]]
        );
    }

    #[test]
    fn load_facets_appends_with_offset() {
        let mut db = TaggedDatabase::new();
        let set = db.create_entity_set();
        let tri = FacetPatch::from_buffers(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0, 1, 2]],
        )
        .unwrap();
        db.load_facets(set, tri.clone()).unwrap();
        db.load_facets(set, tri).unwrap();

        let facets = db.facets(set).unwrap();
        assert_eq!(facets.vertex_count(), 6);
        assert_eq!(facets.triangles, vec![[0, 1, 2], [3, 4, 5]]);
    }
}
