// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh adjacency provider interface consumed by the database builder.

use std::io::{BufWriter, Write};
use std::path::Path;

use dagmc_lite_core::stl::write_stl_ascii;
use dagmc_lite_core::FacetPatch;
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::model::{SurfaceId, VolumeId};

/// Source of volume/surface adjacency and per-surface facet geometry.
///
/// Implementations must enumerate volumes in a stable order: the builder's
/// sense assignment depends on it.
pub trait MeshProvider {
    /// All volumes, in enumeration order.
    fn volumes(&self) -> Result<Vec<VolumeId>>;

    /// Surfaces topologically adjacent to `volume`.
    fn adjacent_surfaces(&self, volume: VolumeId) -> Result<Vec<SurfaceId>>;

    /// Writes the facets of one surface to a transient STL file.
    fn extract_surface_patch(&mut self, surface: SurfaceId) -> Result<PatchFile>;
}

/// A transient STL file holding one surface patch. The file is deleted when
/// the handle is dropped, whatever happens to the caller.
#[derive(Debug)]
pub struct PatchFile {
    surface: SurfaceId,
    triangles: usize,
    file: NamedTempFile,
}

impl PatchFile {
    /// Writes `patch` as lossless ASCII STL to a new temporary file in `dir`,
    /// or in the system temp directory when `dir` is `None`.
    pub fn write(surface: SurfaceId, patch: &FacetPatch, dir: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("surface-").suffix(".stl");
        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        {
            let mut writer = BufWriter::new(file.as_file_mut());
            write_stl_ascii(&mut writer, patch)?;
            writer.flush()?;
        }
        Ok(Self {
            surface,
            triangles: patch.triangle_count(),
            file,
        })
    }

    /// The surface this patch was extracted from.
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Number of triangles written.
    pub fn triangle_count(&self) -> usize {
        self.triangles
    }

    /// Location of the STL file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
