// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named, typed attributes that can be attached to entity sets.
//!
//! A tag is declared once per database with a value type and a size, and then
//! carries one value per tagged entity. The size means:
//!
//! - `Integer` / `Double`: number of values (always 1 here)
//! - `Opaque`: maximum byte length of the stored string
//! - `Handle`: number of entity references (slots may be null)

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::keys::EntityKey;

/// Name of the predefined global id tag.
pub const GLOBAL_ID_TAG_NAME: &str = "GLOBAL_ID";
/// Name of the conventional category tag.
pub const CATEGORY_TAG_NAME: &str = "CATEGORY";
/// Byte size of the category tag.
pub const CATEGORY_TAG_SIZE: usize = 32;
/// Name of the conventional name tag.
pub const NAME_TAG_NAME: &str = "NAME";
/// Byte size of the name tag.
pub const NAME_TAG_SIZE: usize = 32;
/// Name of the conventional geometric dimension tag.
pub const GEOM_DIMENSION_TAG_NAME: &str = "GEOM_DIMENSION";

/// Value type of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagType {
    Integer,
    Double,
    Opaque,
    Handle,
}

impl TagType {
    /// Returns the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TagType::Integer => "Integer",
            TagType::Double => "Double",
            TagType::Opaque => "Opaque",
            TagType::Handle => "Handle",
        }
    }
}

impl std::fmt::Display for TagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage hint, kept for format compatibility. Both kinds behave the same in
/// memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TagStorage {
    #[default]
    Sparse,
    Dense,
}

/// Declaration of a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDefinition {
    pub name: String,
    pub data_type: TagType,
    pub size: usize,
    pub storage: TagStorage,
}

impl TagDefinition {
    pub fn new(name: impl Into<String>, data_type: TagType, size: usize, storage: TagStorage) -> Self {
        Self {
            name: name.into(),
            data_type,
            size,
            storage,
        }
    }

    /// Two declarations are compatible when type and size agree. Storage is
    /// only a hint and never causes a conflict.
    pub fn is_compatible(&self, data_type: TagType, size: usize) -> bool {
        self.data_type == data_type && self.size == size
    }

    /// Checks that a declaration is well formed.
    pub(crate) fn check_shape(&self) -> Result<()> {
        match self.data_type {
            TagType::Integer | TagType::Double if self.size != 1 => {
                Err(Error::UnsupportedTagSize(self.name.clone()))
            }
            _ if self.size == 0 => Err(Error::TagSizeMismatch {
                tag: self.name.clone(),
                size: 0,
                needed: 1,
            }),
            _ => Ok(()),
        }
    }

    /// Checks that `value` can be stored under this tag.
    pub fn validate(&self, value: &TagValue) -> Result<()> {
        let found = value.data_type();
        if found != self.data_type {
            return Err(Error::TagTypeMismatch {
                tag: self.name.clone(),
                expected: self.data_type,
                found,
            });
        }

        let fits = match value {
            TagValue::Integer(_) | TagValue::Double(_) => true,
            TagValue::Opaque(s) => s.len() <= self.size,
            TagValue::Handles(h) => h.len() == self.size,
        };
        if !fits {
            return Err(Error::TagSizeMismatch {
                tag: self.name.clone(),
                size: self.size,
                needed: value.len(),
            });
        }
        Ok(())
    }
}

/// A value stored under a tag for one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Integer(i64),
    Double(f64),
    Opaque(String),
    /// Entity references; `None` is the null handle.
    Handles(Vec<Option<EntityKey>>),
}

impl TagValue {
    /// Returns the tag type this value belongs to.
    pub fn data_type(&self) -> TagType {
        match self {
            TagValue::Integer(_) => TagType::Integer,
            TagValue::Double(_) => TagType::Double,
            TagValue::Opaque(_) => TagType::Opaque,
            TagValue::Handles(_) => TagType::Handle,
        }
    }

    /// Number of size units this value occupies.
    pub fn len(&self) -> usize {
        match self {
            TagValue::Integer(_) | TagValue::Double(_) => 1,
            TagValue::Opaque(s) => s.len(),
            TagValue::Handles(h) => h.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            TagValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            TagValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Opaque(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_handles(&self) -> Option<&[Option<EntityKey>]> {
        match self {
            TagValue::Handles(h) => Some(h),
            _ => None,
        }
    }
}

impl From<i64> for TagValue {
    fn from(v: i64) -> Self {
        TagValue::Integer(v)
    }
}

impl From<f64> for TagValue {
    fn from(v: f64) -> Self {
        TagValue::Double(v)
    }
}

impl From<&str> for TagValue {
    fn from(v: &str) -> Self {
        TagValue::Opaque(v.to_string())
    }
}

impl From<String> for TagValue {
    fn from(v: String) -> Self {
        TagValue::Opaque(v)
    }
}
