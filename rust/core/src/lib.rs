// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # DAGMC-Lite Core
//!
//! Tagged entity database for particle-transport geometry.
//!
//! A [`TaggedDatabase`] is an arena of entity sets addressed by generational
//! [`EntityKey`]s. Sets carry typed, named tags, contain other sets, form a
//! parent/child hierarchy and may hold a triangulated [`FacetPatch`]. This is
//! the container that transport codes read volumes, surfaces, senses and
//! material groups from.
//!
//! ## Quick Start
//!
//! ```
//! use dagmc_lite_core::{TaggedDatabase, TagStorage, TagType, TagValue};
//!
//! let mut db = TaggedDatabase::new();
//! let volume = db.create_entity_set();
//! let surface = db.create_entity_set();
//! db.add_parent_child(volume, surface).unwrap();
//!
//! let sense = db
//!     .tag_get_or_create("GEOM_SENSE_2", TagType::Handle, 2, TagStorage::Sparse)
//!     .unwrap();
//! db.tag_set_data(sense, surface, TagValue::Handles(vec![Some(volume), None]))
//!     .unwrap();
//!
//! assert_eq!(db.children(volume), &[surface]);
//! ```
//!
//! ## Persistence
//!
//! [`TaggedDatabase::write_file`] and [`TaggedDatabase::read_file`] store the
//! whole database, including facets, in a single JSON file.

pub mod database;
pub mod error;
pub mod facets;
pub mod keys;
pub mod serialization;
pub mod stl;
pub mod tag;

pub use database::{EntitySetData, TaggedDatabase};
pub use error::{Error, Result};
pub use facets::FacetPatch;
pub use keys::{EntityKey, TagKey};
pub use serialization::{DatabaseSnapshot, EntitySetSnapshot, ValueSnapshot};
pub use tag::{
    TagDefinition, TagStorage, TagType, TagValue, CATEGORY_TAG_NAME, CATEGORY_TAG_SIZE,
    GEOM_DIMENSION_TAG_NAME, GLOBAL_ID_TAG_NAME, NAME_TAG_NAME, NAME_TAG_SIZE,
};
