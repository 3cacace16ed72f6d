// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangulated facet patches stored inside entity sets.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An indexed triangle patch: vertex positions plus triangles indexing them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetPatch {
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[u32; 3]>,
}

impl FacetPatch {
    /// Create a new empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a patch from raw buffers, checking every index.
    pub fn from_buffers(vertices: Vec<[f64; 3]>, triangles: Vec<[u32; 3]>) -> Result<Self> {
        let patch = Self {
            vertices,
            triangles,
        };
        patch.validate()?;
        Ok(patch)
    }

    /// Checks that all triangle indices are in range.
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertices.len();
        for (triangle, tri) in self.triangles.iter().enumerate() {
            if let Some(&vertex) = tri.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(Error::InvalidFacet {
                    triangle,
                    vertex,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Corner positions of triangle `index`.
    pub fn triangle_points(&self, index: usize) -> Option<[Point3<f64>; 3]> {
        let tri = self.triangles.get(index)?;
        let p = |i: u32| {
            self.vertices
                .get(i as usize)
                .map(|v| Point3::new(v[0], v[1], v[2]))
        };
        Some([p(tri[0])?, p(tri[1])?, p(tri[2])?])
    }

    /// Unit normal of triangle `index` following the right-hand rule.
    /// Degenerate triangles yield a zero vector.
    pub fn triangle_normal(&self, index: usize) -> Option<Vector3<f64>> {
        let [a, b, c] = self.triangle_points(index)?;
        let n = (b - a).cross(&(c - a));
        Some(n.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros))
    }

    /// Total surface area.
    pub fn area(&self) -> f64 {
        (0..self.triangles.len())
            .filter_map(|i| self.triangle_points(i))
            .map(|[a, b, c]| (b - a).cross(&(c - a)).norm() * 0.5)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> FacetPatch {
        FacetPatch::from_buffers(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn out_of_range_index_rejected() {
        let err = FacetPatch::from_buffers(vec![[0.0; 3]; 2], vec![[0, 1, 2]]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidFacet {
                triangle: 0,
                vertex: 2,
                vertex_count: 2
            }
        ));
    }

    #[test]
    fn normal_follows_winding() {
        let patch = unit_square();
        let n = patch.triangle_normal(0).unwrap();
        assert_relative_eq!(n.z, 1.0);
    }

    #[test]
    fn area_of_square() {
        assert_relative_eq!(unit_square().area(), 1.0);
    }

    #[test]
    fn degenerate_triangle_has_zero_normal() {
        let patch =
            FacetPatch::from_buffers(vec![[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]], vec![[0, 1, 2]])
                .unwrap();
        assert_eq!(patch.triangle_normal(0).unwrap(), Vector3::zeros());
    }
}
