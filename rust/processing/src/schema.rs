// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The fixed tag schema of a DAGMC geometry database.
//!
//! | Field | Tag | Type | Size |
//! |---|---|---|---|
//! | `category` | `CATEGORY` | opaque | 32 bytes |
//! | `geom_dimension` | `GEOM_DIMENSION` | integer | 1 |
//! | `name` | `NAME` | opaque | 32 bytes |
//! | `global_id` | `GLOBAL_ID` | integer | 1 |
//! | `surf_sense` | `GEOM_SENSE_2` | handle | 2 |
//! | `faceting_tol` | `FACETING_TOL` | double | 1 |

use dagmc_lite_core::{
    EntityKey, TagKey, TagStorage, TagType, TagValue, TaggedDatabase, CATEGORY_TAG_NAME,
    CATEGORY_TAG_SIZE, GEOM_DIMENSION_TAG_NAME, GLOBAL_ID_TAG_NAME, NAME_TAG_NAME, NAME_TAG_SIZE,
};

use crate::error::{Error, Result};

/// Tag holding the (forward, reverse) volume pair of a surface.
pub const SENSE_TAG_NAME: &str = "GEOM_SENSE_2";
pub const SENSE_TAG_SIZE: usize = 2;

/// Tag holding the faceting tolerance on the file set.
pub const FACETING_TOL_TAG_NAME: &str = "FACETING_TOL";

/// Faceting tolerance written to every file set. Repair tools require the
/// tag to be present.
pub const FACETING_TOLERANCE: f64 = 1e-3;

/// Prefix of a group name carrying a material assignment.
pub const MATERIAL_PREFIX: &str = "mat:";

/// Kind of a geometry entity set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Surface,
    Volume,
    Group,
}

impl Category {
    /// Value of the `CATEGORY` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Surface => "Surface",
            Category::Volume => "Volume",
            Category::Group => "Group",
        }
    }

    /// Value of the `GEOM_DIMENSION` tag.
    pub fn dimension(&self) -> i64 {
        match self {
            Category::Surface => 2,
            Category::Volume => 3,
            Category::Group => 4,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Surface" => Some(Category::Surface),
            "Volume" => Some(Category::Volume),
            "Group" => Some(Category::Group),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handles of all schema tags in one database.
#[derive(Debug, Clone, Copy)]
pub struct TagSchema {
    pub category: TagKey,
    pub geom_dimension: TagKey,
    pub name: TagKey,
    pub global_id: TagKey,
    pub surf_sense: TagKey,
    pub faceting_tol: TagKey,
}

impl TagSchema {
    /// Creates the schema tags if missing and returns their handles.
    ///
    /// Safe to call any number of times on the same database. Fails with
    /// [`Error::SchemaConflict`] if a tag name is already taken by an
    /// incompatible definition.
    pub fn create(db: &mut TaggedDatabase) -> Result<Self> {
        let mut get = |name: &str, data_type: TagType, size: usize, storage: TagStorage| {
            db.tag_get_or_create(name, data_type, size, storage)
                .map_err(|e| match e {
                    dagmc_lite_core::Error::TagConflict { .. } => Error::SchemaConflict(e),
                    other => Error::Database(other),
                })
        };

        Ok(Self {
            surf_sense: get(SENSE_TAG_NAME, TagType::Handle, SENSE_TAG_SIZE, TagStorage::Sparse)?,
            category: get(CATEGORY_TAG_NAME, TagType::Opaque, CATEGORY_TAG_SIZE, TagStorage::Sparse)?,
            name: get(NAME_TAG_NAME, TagType::Opaque, NAME_TAG_SIZE, TagStorage::Sparse)?,
            geom_dimension: get(GEOM_DIMENSION_TAG_NAME, TagType::Integer, 1, TagStorage::Sparse)?,
            faceting_tol: get(FACETING_TOL_TAG_NAME, TagType::Double, 1, TagStorage::Sparse)?,
            global_id: get(GLOBAL_ID_TAG_NAME, TagType::Integer, 1, TagStorage::Dense)?,
        })
    }

    /// Looks up the schema tags of an existing database without creating any.
    pub fn lookup(db: &TaggedDatabase) -> Result<Self> {
        Ok(Self {
            surf_sense: db.tag_handle(SENSE_TAG_NAME)?,
            category: db.tag_handle(CATEGORY_TAG_NAME)?,
            name: db.tag_handle(NAME_TAG_NAME)?,
            geom_dimension: db.tag_handle(GEOM_DIMENSION_TAG_NAME)?,
            faceting_tol: db.tag_handle(FACETING_TOL_TAG_NAME)?,
            global_id: db.tag_handle(GLOBAL_ID_TAG_NAME)?,
        })
    }

    /// Sets `CATEGORY` and the matching `GEOM_DIMENSION` on an entity.
    pub fn set_category(
        &self,
        db: &mut TaggedDatabase,
        entity: EntityKey,
        category: Category,
    ) -> Result<()> {
        db.tag_set_data(self.geom_dimension, entity, TagValue::Integer(category.dimension()))?;
        db.tag_set_data(self.category, entity, TagValue::from(category.as_str()))?;
        Ok(())
    }

    /// Reads the category of an entity.
    pub fn category_of(&self, db: &TaggedDatabase, entity: EntityKey) -> Option<Category> {
        db.tag_get_data(self.category, entity)
            .and_then(|v| v.as_str())
            .and_then(Category::from_name)
    }

    /// Reads the sense pair of a surface.
    pub fn sense_of(
        &self,
        db: &TaggedDatabase,
        surface: EntityKey,
    ) -> Option<(Option<EntityKey>, Option<EntityKey>)> {
        match db.tag_get_data(self.surf_sense, surface)?.as_handles()? {
            [forward, reverse] => Some((*forward, *reverse)),
            _ => None,
        }
    }

    /// Entities of one category, in creation order.
    pub fn entities_of(&self, db: &TaggedDatabase, category: Category) -> Vec<EntityKey> {
        db.entities_with_tag_value(self.category, &TagValue::from(category.as_str()))
    }
}

/// Group name for a material.
pub fn material_group_name(material: &str) -> String {
    format!("{MATERIAL_PREFIX}{material}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_twice_reuses_tags() {
        let mut db = TaggedDatabase::new();
        let first = TagSchema::create(&mut db).unwrap();
        let count = db.tag_count();
        let second = TagSchema::create(&mut db).unwrap();

        assert_eq!(db.tag_count(), count);
        assert_eq!(count, 6);
        assert_eq!(first.surf_sense, second.surf_sense);
        assert_eq!(first.global_id, db.tag_handle(GLOBAL_ID_TAG_NAME).unwrap());
    }

    #[test]
    fn incompatible_tag_is_a_schema_conflict() {
        let mut db = TaggedDatabase::new();
        db.tag_get_or_create(SENSE_TAG_NAME, TagType::Integer, 1, TagStorage::Sparse)
            .unwrap();
        assert!(matches!(
            TagSchema::create(&mut db),
            Err(Error::SchemaConflict(_))
        ));
    }

    #[test]
    fn lookup_requires_schema() {
        let mut db = TaggedDatabase::new();
        assert!(TagSchema::lookup(&db).is_err());
        TagSchema::create(&mut db).unwrap();
        assert!(TagSchema::lookup(&db).is_ok());
    }

    #[test]
    fn category_sets_dimension() {
        let mut db = TaggedDatabase::new();
        let schema = TagSchema::create(&mut db).unwrap();
        let group = db.create_entity_set();
        schema.set_category(&mut db, group, Category::Group).unwrap();

        assert_eq!(schema.category_of(&db, group), Some(Category::Group));
        assert_eq!(
            db.tag_get_data(schema.geom_dimension, group)
                .and_then(|v| v.as_integer()),
            Some(4)
        );
    }

    #[test]
    fn group_name_has_prefix() {
        assert_eq!(material_group_name("steel"), "mat:steel");
    }
}
