// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # DAGMC-Lite Processing
//!
//! Turns a discretized model into a DAGMC-style tagged database: one set per
//! volume, surface and material group, linked by parent/child relations and
//! surface sense tags, with surface facets loaded from per-surface patches.
//!
//! ```no_run
//! use dagmc_lite_geometry::DiscreteModel;
//! use dagmc_lite_processing::DagmcModel;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let model = DiscreteModel::read_file("model.json")?;
//! let dagmc = DagmcModel::from_model(&model, &["steel", "vacuum"])?;
//! dagmc.write("dagmc.json")?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod error;
pub mod legacy;
pub mod model;
pub mod registry;
pub mod repair;
pub mod schema;

pub use builder::{build, build_into, validate_materials, BuildOutput, BuildSummary};
pub use error::{Error, Result};
pub use legacy::Watertight;
pub use model::DagmcModel;
pub use registry::{Encounter, SurfaceRecord, SurfaceRegistry};
pub use repair::{make_watertight, unrepaired_path, DEFAULT_REPAIR_BINARY};
pub use schema::{
    material_group_name, Category, TagSchema, FACETING_TOLERANCE, FACETING_TOL_TAG_NAME,
    MATERIAL_PREFIX, SENSE_TAG_NAME, SENSE_TAG_SIZE,
};
