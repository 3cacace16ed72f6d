// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON container format for tagged databases.
//!
//! Slot map keys are not portable, so entity sets are written with sequential
//! integer ids (their creation order) and every handle, member, child and tag
//! reference is rewritten in terms of those ids. Null handles become `null`.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::database::TaggedDatabase;
use crate::error::{Error, Result};
use crate::facets::FacetPatch;
use crate::keys::EntityKey;
use crate::tag::{TagDefinition, TagValue};

/// Format version written into every file.
pub const FORMAT_VERSION: u32 = 1;

/// Serializable representation of a full database.
#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub format_version: u32,
    pub tags: Vec<TagDefinition>,
    pub entity_sets: Vec<EntitySetSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntitySetSnapshot {
    pub id: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<usize>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, ValueSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<FacetPatch>,
}

/// A tag value with handles replaced by sequential ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSnapshot {
    Integer(i64),
    Double(f64),
    Opaque(String),
    Handles(Vec<Option<usize>>),
}

impl TaggedDatabase {
    /// Serializes the database to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = self.to_snapshot();
        serde_json::to_string_pretty(&snapshot).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserializes a database from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: DatabaseSnapshot =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_snapshot(&snapshot)
    }

    /// Creates a serializable snapshot of the database.
    pub fn to_snapshot(&self) -> DatabaseSnapshot {
        let ids: FxHashMap<EntityKey, usize> =
            self.sets.keys().enumerate().map(|(i, k)| (k, i)).collect();

        let tags: Vec<TagDefinition> = self.tags.values().cloned().collect();

        let entity_sets = self
            .sets
            .iter()
            .enumerate()
            .map(|(i, (key, data))| {
                let mut values = BTreeMap::new();
                for (tag_key, def) in self.tags.iter() {
                    if let Some(value) = self.tag_get_data(tag_key, key) {
                        values.insert(def.name.clone(), to_value_snapshot(value, &ids));
                    }
                }
                EntitySetSnapshot {
                    id: i,
                    members: data.members.iter().map(|k| ids[k]).collect(),
                    children: data.children.iter().map(|k| ids[k]).collect(),
                    tags: values,
                    facets: data.facets.clone(),
                }
            })
            .collect();

        DatabaseSnapshot {
            format_version: FORMAT_VERSION,
            tags,
            entity_sets,
        }
    }

    /// Reconstructs a database from a snapshot.
    pub fn from_snapshot(snap: &DatabaseSnapshot) -> Result<Self> {
        if snap.format_version != FORMAT_VERSION {
            return Err(Error::Serialization(format!(
                "unsupported format version {}",
                snap.format_version
            )));
        }

        let mut db = TaggedDatabase::new();
        for def in &snap.tags {
            db.tag_get_or_create(&def.name, def.data_type, def.size, def.storage)?;
        }

        // Sets are stored in id order; anything else is a corrupt file.
        let mut keys: Vec<EntityKey> = Vec::with_capacity(snap.entity_sets.len());
        for (i, es) in snap.entity_sets.iter().enumerate() {
            if es.id != i {
                return Err(Error::Serialization(format!(
                    "entity set at position {i} has id {}",
                    es.id
                )));
            }
            keys.push(db.create_entity_set());
        }

        let resolve = |id: usize| -> Result<EntityKey> {
            keys.get(id)
                .copied()
                .ok_or_else(|| Error::Serialization(format!("entity set id {id} out of range")))
        };

        for (es, &key) in snap.entity_sets.iter().zip(&keys) {
            let members = es
                .members
                .iter()
                .map(|&id| resolve(id))
                .collect::<Result<Vec<_>>>()?;
            db.add_entities(key, &members)?;

            for &child in &es.children {
                db.add_parent_child(key, resolve(child)?)?;
            }

            for (name, value) in &es.tags {
                let tag = db.tag_handle(name)?;
                let value = match value {
                    ValueSnapshot::Integer(v) => TagValue::Integer(*v),
                    ValueSnapshot::Double(v) => TagValue::Double(*v),
                    ValueSnapshot::Opaque(v) => TagValue::Opaque(v.clone()),
                    ValueSnapshot::Handles(h) => TagValue::Handles(
                        h.iter()
                            .map(|slot| slot.map(&resolve).transpose())
                            .collect::<Result<Vec<_>>>()?,
                    ),
                };
                db.tag_set_data(tag, key, value)?;
            }

            if let Some(facets) = &es.facets {
                db.load_facets(key, facets.clone())?;
            }
        }

        Ok(db)
    }
}

fn to_value_snapshot(value: &TagValue, ids: &FxHashMap<EntityKey, usize>) -> ValueSnapshot {
    match value {
        TagValue::Integer(v) => ValueSnapshot::Integer(*v),
        TagValue::Double(v) => ValueSnapshot::Double(*v),
        TagValue::Opaque(v) => ValueSnapshot::Opaque(v.clone()),
        TagValue::Handles(h) => {
            ValueSnapshot::Handles(h.iter().map(|slot| slot.map(|k| ids[&k])).collect())
        }
    }
}
