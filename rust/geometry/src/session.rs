// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scoped mesh session.
//!
//! Opening a [`MeshSession`] validates the model, indexes it and creates a
//! private scratch directory for patch files. Dropping the session finalizes
//! it: the scratch directory and anything left in it are removed on every
//! exit path, including early returns on error and unwinding.
//!
//! The session borrows the model, so a model cannot be changed while a
//! construction pass is reading it.

use std::path::Path;

use rustc_hash::FxHashMap;
use tempfile::TempDir;

use crate::error::{Error, Result};
use crate::model::{DiscreteModel, SurfaceId, VolumeId};
use crate::provider::{MeshProvider, PatchFile};

/// An open, indexed view of a [`DiscreteModel`] implementing [`MeshProvider`].
#[derive(Debug)]
pub struct MeshSession<'m> {
    model: &'m DiscreteModel,
    volume_index: FxHashMap<VolumeId, usize>,
    surface_index: FxHashMap<SurfaceId, usize>,
    scratch: Option<TempDir>,
    extracted: usize,
}

impl<'m> MeshSession<'m> {
    /// Opens a session on `model`.
    pub fn open(model: &'m DiscreteModel) -> Result<Self> {
        model.validate()?;

        let volume_index = model
            .volumes
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id, i))
            .collect();
        let surface_index = model
            .surfaces
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id, i))
            .collect();
        let scratch = tempfile::Builder::new().prefix("dagmc-lite-").tempdir()?;

        tracing::debug!(
            volumes = model.volumes.len(),
            surfaces = model.surfaces.len(),
            nodes = model.nodes.len(),
            scratch = %scratch.path().display(),
            "Mesh session opened"
        );

        Ok(Self {
            model,
            volume_index,
            surface_index,
            scratch: Some(scratch),
            extracted: 0,
        })
    }

    /// The model this session reads.
    pub fn model(&self) -> &'m DiscreteModel {
        self.model
    }

    /// Directory holding transient patch files.
    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch.as_ref().map(|d| d.path())
    }

    /// Number of patches extracted so far.
    pub fn extracted_count(&self) -> usize {
        self.extracted
    }
}

impl MeshProvider for MeshSession<'_> {
    fn volumes(&self) -> Result<Vec<VolumeId>> {
        Ok(self.model.volumes.iter().map(|v| v.id).collect())
    }

    fn adjacent_surfaces(&self, volume: VolumeId) -> Result<Vec<SurfaceId>> {
        let &i = self
            .volume_index
            .get(&volume)
            .ok_or(Error::UnknownVolume(volume))?;
        Ok(self.model.volumes[i].surfaces.clone())
    }

    fn extract_surface_patch(&mut self, surface: SurfaceId) -> Result<PatchFile> {
        if !self.surface_index.contains_key(&surface) {
            return Err(Error::UnknownSurface(surface));
        }
        let patch = self.model.surface_patch(surface)?;

        let file = PatchFile::write(surface, &patch, self.scratch_dir())?;

        self.extracted += 1;
        tracing::trace!(
            surface = %surface,
            triangles = file.triangle_count(),
            path = %file.path().display(),
            "Extracted surface patch"
        );
        Ok(file)
    }
}

impl Drop for MeshSession<'_> {
    fn drop(&mut self) {
        if let Some(dir) = self.scratch.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    "Failed to remove mesh session scratch directory"
                );
            }
        }
        tracing::debug!(extracted = self.extracted, "Mesh session finalized");
    }
}
