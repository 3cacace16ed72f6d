// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discretized model: shared node buffer, triangulated surfaces and the
//! volumes they bound.
//!
//! This is the typed boundary between a tessellation engine and the database
//! builder. Ownership is plain: the model owns its buffers, sessions borrow
//! it.

use std::path::Path;

use dagmc_lite_core::FacetPatch;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Provider identifier of a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolumeId(pub i32);

/// Provider identifier of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(pub i32);

impl std::fmt::Display for VolumeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A triangulated surface. Triangles index the model's node buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMesh {
    pub id: SurfaceId,
    pub triangles: Vec<[u32; 3]>,
}

/// A volume and the surfaces adjacent to it, in adjacency order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeRegion {
    pub id: VolumeId,
    pub surfaces: Vec<SurfaceId>,
}

/// A discretized model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscreteModel {
    pub nodes: Vec<[f64; 3]>,
    pub surfaces: Vec<SurfaceMesh>,
    pub volumes: Vec<VolumeRegion>,
}

impl DiscreteModel {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates a model file.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parses and validates a model from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let model: DiscreteModel =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    /// Writes the model to a file.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Adds a node and returns its index.
    pub fn add_node(&mut self, x: f64, y: f64, z: f64) -> u32 {
        self.nodes.push([x, y, z]);
        (self.nodes.len() - 1) as u32
    }

    /// Adds a surface.
    pub fn add_surface(&mut self, id: i32, triangles: Vec<[u32; 3]>) -> SurfaceId {
        let id = SurfaceId(id);
        self.surfaces.push(SurfaceMesh { id, triangles });
        id
    }

    /// Adds a volume bounded by the given surfaces.
    pub fn add_volume(&mut self, id: i32, surfaces: &[i32]) -> VolumeId {
        let id = VolumeId(id);
        self.volumes.push(VolumeRegion {
            id,
            surfaces: surfaces.iter().copied().map(SurfaceId).collect(),
        });
        id
    }

    pub fn volume(&self, id: VolumeId) -> Option<&VolumeRegion> {
        self.volumes.iter().find(|v| v.id == id)
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&SurfaceMesh> {
        self.surfaces.iter().find(|s| s.id == id)
    }

    /// Checks ids, triangle indices and adjacency references.
    pub fn validate(&self) -> Result<()> {
        let node_count = self.nodes.len();

        let mut surface_ids = FxHashSet::default();
        for surface in &self.surfaces {
            if !surface_ids.insert(surface.id) {
                return Err(Error::DuplicateSurface(surface.id));
            }
            for (triangle, tri) in surface.triangles.iter().enumerate() {
                if let Some(&node) = tri.iter().find(|&&n| n as usize >= node_count) {
                    return Err(Error::InvalidTriangle {
                        surface: surface.id,
                        triangle,
                        node,
                        node_count,
                    });
                }
            }
        }

        let mut volume_ids = FxHashSet::default();
        for volume in &self.volumes {
            if !volume_ids.insert(volume.id) {
                return Err(Error::DuplicateVolume(volume.id));
            }
            let mut seen = FxHashSet::default();
            for &surface in &volume.surfaces {
                if !surface_ids.contains(&surface) {
                    return Err(Error::UnknownSurface(surface));
                }
                if !seen.insert(surface) {
                    return Err(Error::RepeatedAdjacency {
                        volume: volume.id,
                        surface,
                    });
                }
            }
        }
        Ok(())
    }

    /// Copies one surface into a standalone patch holding only the nodes it
    /// references, renumbered in first-use order.
    pub fn surface_patch(&self, id: SurfaceId) -> Result<FacetPatch> {
        let surface = self.surface(id).ok_or(Error::UnknownSurface(id))?;
        let node_count = self.nodes.len();

        let mut remap: FxHashMap<u32, u32> = FxHashMap::default();
        let mut patch = FacetPatch::new();
        patch.triangles.reserve(surface.triangles.len());

        for (triangle, tri) in surface.triangles.iter().enumerate() {
            let mut local = [0u32; 3];
            for (slot, &node) in local.iter_mut().zip(tri) {
                let position = self.nodes.get(node as usize).ok_or(Error::InvalidTriangle {
                    surface: id,
                    triangle,
                    node,
                    node_count,
                })?;
                let vertices = &mut patch.vertices;
                *slot = *remap.entry(node).or_insert_with(|| {
                    vertices.push(*position);
                    (vertices.len() - 1) as u32
                });
            }
            patch.triangles.push(local);
        }
        Ok(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two unit triangles on separate surfaces sharing one edge.
    fn sample() -> DiscreteModel {
        let mut m = DiscreteModel::new();
        let a = m.add_node(0.0, 0.0, 0.0);
        let b = m.add_node(1.0, 0.0, 0.0);
        let c = m.add_node(0.0, 1.0, 0.0);
        let d = m.add_node(1.0, 1.0, 0.0);
        m.add_surface(10, vec![[a, b, c]]);
        m.add_surface(20, vec![[b, d, c]]);
        m.add_volume(1, &[10, 20]);
        m
    }

    #[test]
    fn valid_model_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn duplicate_surface_rejected() {
        let mut m = sample();
        m.add_surface(10, vec![]);
        assert!(matches!(m.validate(), Err(Error::DuplicateSurface(SurfaceId(10)))));
    }

    #[test]
    fn dangling_adjacency_rejected() {
        let mut m = sample();
        m.add_volume(2, &[99]);
        assert!(matches!(m.validate(), Err(Error::UnknownSurface(SurfaceId(99)))));
    }

    #[test]
    fn repeated_adjacency_rejected() {
        let mut m = sample();
        m.add_volume(2, &[10, 10]);
        assert!(matches!(m.validate(), Err(Error::RepeatedAdjacency { .. })));
    }

    #[test]
    fn out_of_range_node_rejected() {
        let mut m = sample();
        m.add_surface(30, vec![[0, 1, 7]]);
        assert!(matches!(
            m.validate(),
            Err(Error::InvalidTriangle { node: 7, .. })
        ));
    }

    #[test]
    fn surface_patch_is_isolated() {
        let m = sample();
        let patch = m.surface_patch(SurfaceId(20)).unwrap();
        assert_eq!(patch.vertex_count(), 3);
        assert_eq!(patch.triangles, vec![[0, 1, 2]]);
        assert_eq!(patch.vertices[0], [1.0, 0.0, 0.0]);
        assert_eq!(patch.vertices[1], [1.0, 1.0, 0.0]);
    }

    #[test]
    fn json_roundtrip_uses_plain_ids() {
        let m = sample();
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"id\":10"));
        assert_eq!(DiscreteModel::from_json(&json).unwrap(), m);
    }
}
