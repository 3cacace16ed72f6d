// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for tagged database operations.

use crate::keys::{EntityKey, TagKey};
use crate::tag::TagType;

/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, querying or persisting a database.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced entity set does not exist in this database.
    #[error("entity set not found: {0:?}")]
    EntityNotFound(EntityKey),

    /// A tag handle does not exist in this database.
    #[error("tag not found: {0:?}")]
    TagKeyNotFound(TagKey),

    /// No tag with the given name is defined.
    #[error("tag '{0}' is not defined")]
    TagNotFound(String),

    /// A tag with the same name exists with an incompatible type or size.
    #[error(
        "tag '{name}' already defined as {existing_type}[{existing_size}], \
         requested {requested_type}[{requested_size}]"
    )]
    TagConflict {
        name: String,
        existing_type: TagType,
        existing_size: usize,
        requested_type: TagType,
        requested_size: usize,
    },

    /// A tag value does not match the tag's declared type.
    #[error("tag '{tag}' holds {expected} values, got {found}")]
    TagTypeMismatch {
        tag: String,
        expected: TagType,
        found: TagType,
    },

    /// A tag value does not fit the tag's declared size.
    #[error("tag '{tag}' has size {size}, value needs {needed}")]
    TagSizeMismatch {
        tag: String,
        size: usize,
        needed: usize,
    },

    /// Numeric tags are scalar.
    #[error("tag '{0}': numeric tags must have size 1")]
    UnsupportedTagSize(String),

    /// Setting a parent/child link from an entity to itself.
    #[error("entity {0:?} cannot be its own parent")]
    SelfParent(EntityKey),

    /// Facet data references a vertex that does not exist.
    #[error("triangle {triangle} references vertex {vertex}, patch has {vertex_count}")]
    InvalidFacet {
        triangle: usize,
        vertex: u32,
        vertex_count: usize,
    },

    /// Malformed STL input.
    #[error("invalid STL data: {0}")]
    Stl(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
