// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # DAGMC-Lite Geometry
//!
//! Discretized models and the mesh adjacency provider that feeds the database
//! builder: which volumes exist, which surfaces bound each volume, and the
//! facets of each surface as a standalone patch.

pub mod error;
pub mod model;
pub mod provider;
pub mod session;

pub use error::{Error, Result};
pub use model::{DiscreteModel, SurfaceId, SurfaceMesh, VolumeId, VolumeRegion};
pub use provider::{MeshProvider, PatchFile};
pub use session::MeshSession;
