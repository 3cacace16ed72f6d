// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-call entry point kept for callers of the old build-and-write API.

use std::path::{Path, PathBuf};

use dagmc_lite_geometry::DiscreteModel;

use crate::error::Result;
use crate::model::DagmcModel;
use crate::repair::DEFAULT_REPAIR_BINARY;

/// Post-write repair step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Watertight {
    #[default]
    No,
    /// Run `make_watertight` from `PATH`.
    InPath,
    /// Run the given binary.
    Binary(PathBuf),
}

impl Watertight {
    pub fn binary(&self) -> Option<&Path> {
        match self {
            Watertight::No => None,
            Watertight::InPath => Some(Path::new(DEFAULT_REPAIR_BINARY)),
            Watertight::Binary(path) => Some(path),
        }
    }
}

impl From<bool> for Watertight {
    fn from(enabled: bool) -> Self {
        if enabled {
            Watertight::InPath
        } else {
            Watertight::No
        }
    }
}

/// Builds a database from `model`, writes it to `filename` and optionally
/// repairs it.
#[deprecated(
    since = "0.3.0",
    note = "use `DagmcModel::from_model` followed by `write` or `write_watertight`"
)]
pub fn make_from_mesh<S: AsRef<str>>(
    model: &DiscreteModel,
    material_names: &[S],
    filename: impl AsRef<Path>,
    watertight: impl Into<Watertight>,
) -> Result<DagmcModel> {
    tracing::warn!("make_from_mesh is deprecated, use DagmcModel::from_model");

    let dagmc = DagmcModel::from_model(model, material_names)?;
    match watertight.into().binary() {
        Some(binary) => dagmc.write_watertight(filename, binary)?,
        None => dagmc.write(filename)?,
    }
    Ok(dagmc)
}
