// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::model::{SurfaceId, VolumeId};

/// Result type for mesh provider operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the discrete model and the mesh provider
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown volume: {0}")]
    UnknownVolume(VolumeId),

    #[error("Unknown surface: {0}")]
    UnknownSurface(SurfaceId),

    #[error("Volume {0} is defined more than once")]
    DuplicateVolume(VolumeId),

    #[error("Surface {0} is defined more than once")]
    DuplicateSurface(SurfaceId),

    #[error("Volume {volume} lists surface {surface} more than once")]
    RepeatedAdjacency { volume: VolumeId, surface: SurfaceId },

    #[error("Surface {surface}, triangle {triangle}: node {node} out of range ({node_count} nodes)")]
    InvalidTriangle {
        surface: SurfaceId,
        triangle: usize,
        node: u32,
        node_count: usize,
    },

    #[error("Model serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Patch transfer failed: {0}")]
    Patch(#[from] dagmc_lite_core::Error),
}
