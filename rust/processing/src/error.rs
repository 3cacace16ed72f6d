// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for database construction.

use std::path::PathBuf;

use dagmc_lite_geometry::SurfaceId;
use thiserror::Error;

/// Result type alias for construction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a construction pass. None of them is recoverable: a
/// partially built database must be discarded.
#[derive(Debug, Error)]
pub enum Error {
    /// Material names do not match the volumes one to one.
    #[error("model has {volumes} volumes but {materials} material names were given")]
    Validation { volumes: usize, materials: usize },

    /// A material name does not fit the group name tag.
    #[error("material name '{name}' (volume {index}) is longer than {max} bytes")]
    MaterialNameTooLong {
        index: usize,
        name: String,
        max: usize,
    },

    /// The database already defines a schema tag with another type or size.
    #[error("tag schema conflict: {0}")]
    SchemaConflict(#[source] dagmc_lite_core::Error),

    /// Adjacency query or patch extraction failed.
    #[error("mesh provider error: {0}")]
    Provider(#[from] dagmc_lite_geometry::Error),

    /// A surface was reached from a third volume.
    #[error("surface {surface} is adjacent to more than two volumes (third one at index {volume})")]
    NonManifoldSurface { surface: SurfaceId, volume: usize },

    /// Tagging or loading facets into the database failed.
    #[error("database error: {0}")]
    Database(#[from] dagmc_lite_core::Error),

    /// The external watertightness repair did not succeed.
    #[error("watertight repair with '{}' failed: {reason}", binary.display())]
    Repair {
        binary: PathBuf,
        reason: String,
        /// The database as written before repair, still on disk.
        unrepaired: Option<PathBuf>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error was raised before the database was touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. } | Error::MaterialNameTooLong { .. }
        )
    }
}
