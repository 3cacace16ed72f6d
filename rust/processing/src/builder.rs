// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology graph builder.
//!
//! One sequential pass over the provider's volumes produces:
//!
//! ```text
//! file set (FACETING_TOL)
//!  ├── group "mat:<material>"  ──contains──▶ volume (GLOBAL_ID = i)
//!  │                                           ├──child──▶ surface
//!  │                                           └──child──▶ surface
//!  └── ...
//! ```
//!
//! Each surface is created by the first volume that reaches it, which becomes
//! its forward volume and triggers facet extraction. The second volume to
//! reach it becomes the reverse volume and only rewrites the sense tag.
//! Volume order therefore decides every sense pair, and the pass cannot be
//! split across threads without changing the result.

use dagmc_lite_core::{EntityKey, TagValue, TaggedDatabase, NAME_TAG_SIZE};
use dagmc_lite_geometry::MeshProvider;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::registry::{Encounter, SurfaceRegistry};
use crate::schema::{
    material_group_name, Category, TagSchema, FACETING_TOLERANCE, MATERIAL_PREFIX,
};

/// Entity counts of one construction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub volumes: usize,
    pub groups: usize,
    pub surfaces: usize,
    pub interior_surfaces: usize,
    pub boundary_surfaces: usize,
    pub triangles: usize,
}

/// Entities created by one construction pass.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub file_set: EntityKey,
    /// Volume sets, indexed like the material names.
    pub volumes: Vec<EntityKey>,
    /// Group sets, indexed like the material names.
    pub groups: Vec<EntityKey>,
    /// Surface sets in discovery order.
    pub surfaces: Vec<EntityKey>,
    pub summary: BuildSummary,
}

/// Builds a new database from a mesh provider.
pub fn build<P, S>(provider: &mut P, material_names: &[S]) -> Result<TaggedDatabase>
where
    P: MeshProvider + ?Sized,
    S: AsRef<str>,
{
    let mut db = TaggedDatabase::new();
    build_into(&mut db, provider, material_names)?;
    Ok(db)
}

/// Checks material names against the number of volumes.
pub fn validate_materials<S: AsRef<str>>(volume_count: usize, material_names: &[S]) -> Result<()> {
    if material_names.len() != volume_count {
        return Err(Error::Validation {
            volumes: volume_count,
            materials: material_names.len(),
        });
    }

    let max = NAME_TAG_SIZE - MATERIAL_PREFIX.len();
    for (index, name) in material_names.iter().enumerate() {
        let name = name.as_ref();
        if name.len() > max {
            return Err(Error::MaterialNameTooLong {
                index,
                name: name.to_string(),
                max,
            });
        }
    }
    Ok(())
}

/// Builds the topology graph into `db`.
///
/// Material names are validated before anything is written. After that, any
/// error leaves `db` partially built and it must be discarded.
pub fn build_into<P, S>(
    db: &mut TaggedDatabase,
    provider: &mut P,
    material_names: &[S],
) -> Result<BuildOutput>
where
    P: MeshProvider + ?Sized,
    S: AsRef<str>,
{
    let volume_ids = provider.volumes()?;
    validate_materials(volume_ids.len(), material_names)?;

    let schema = TagSchema::create(db)?;
    let mut registry = SurfaceRegistry::new();

    let mut created = Vec::new();
    let mut volumes = Vec::with_capacity(volume_ids.len());
    let mut groups = Vec::with_capacity(volume_ids.len());
    let mut surfaces = Vec::new();
    let mut triangles = 0;

    tracing::info!(volumes = volume_ids.len(), "Building topology graph");

    for (i, (&volume_id, material)) in volume_ids.iter().zip(material_names).enumerate() {
        let material = material.as_ref();

        let volume = db.create_entity_set();
        db.tag_set_data(schema.global_id, volume, TagValue::Integer(i as i64))?;
        schema.set_category(db, volume, Category::Volume)?;
        created.push(volume);
        volumes.push(volume);

        // Groups hold metadata only; the volume is a member, not a child.
        let group = db.create_entity_set();
        schema.set_category(db, group, Category::Group)?;
        db.tag_set_data(schema.name, group, TagValue::Opaque(material_group_name(material)))?;
        db.add_entities(group, &[volume])?;
        created.push(group);
        groups.push(group);

        let adjacent = provider.adjacent_surfaces(volume_id)?;
        tracing::debug!(
            index = i,
            volume = %volume_id,
            material,
            surfaces = adjacent.len(),
            "Processing volume"
        );

        for surface_id in adjacent {
            let surface = match registry.lookup_or_create(db, surface_id) {
                Encounter::First(record) => {
                    record.forward_volume = Some(volume);
                    let record = *record;
                    created.push(record.handle);
                    surfaces.push(record.handle);

                    db.tag_set_data(
                        schema.global_id,
                        record.handle,
                        TagValue::Integer(i64::from(surface_id.0)),
                    )?;
                    schema.set_category(db, record.handle, Category::Surface)?;
                    db.tag_set_data(schema.surf_sense, record.handle, record.sense_data())?;

                    // The patch file is removed when `patch` drops, on success
                    // or on a failed load.
                    let patch = provider.extract_surface_patch(surface_id)?;
                    db.load_stl(patch.path(), record.handle)?;
                    triangles += patch.triangle_count();

                    tracing::trace!(
                        surface = %surface_id,
                        triangles = patch.triangle_count(),
                        "Created surface"
                    );
                    record.handle
                }
                Encounter::Second(record) => {
                    record.reverse_volume = Some(volume);
                    let record = *record;
                    db.tag_set_data(schema.surf_sense, record.handle, record.sense_data())?;

                    tracing::trace!(surface = %surface_id, "Closed interior surface");
                    record.handle
                }
                Encounter::Excess(_) => {
                    return Err(Error::NonManifoldSurface {
                        surface: surface_id,
                        volume: i,
                    });
                }
            };
            db.add_parent_child(volume, surface)?;
        }
    }

    let file_set = db.create_entity_set();
    db.tag_set_data(schema.faceting_tol, file_set, TagValue::Double(FACETING_TOLERANCE))?;
    db.add_entities(file_set, &created)?;

    let interior_surfaces = registry.interior_count();
    let summary = BuildSummary {
        volumes: volumes.len(),
        groups: groups.len(),
        surfaces: surfaces.len(),
        interior_surfaces,
        boundary_surfaces: surfaces.len() - interior_surfaces,
        triangles,
    };

    tracing::info!(
        volumes = summary.volumes,
        surfaces = summary.surfaces,
        interior = summary.interior_surfaces,
        triangles = summary.triangles,
        "Topology graph built"
    );

    Ok(BuildOutput {
        file_set,
        volumes,
        groups,
        surfaces,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagmc_lite_geometry::{DiscreteModel, MeshSession};

    /// Volume 0 bounded by surfaces 1 and 2, volume 1 by 2 and 3.
    fn slab_pair() -> DiscreteModel {
        let mut m = DiscreteModel::new();
        let a = m.add_node(0.0, 0.0, 0.0);
        let b = m.add_node(1.0, 0.0, 0.0);
        let c = m.add_node(0.0, 1.0, 0.0);
        let d = m.add_node(0.0, 0.0, 1.0);
        let e = m.add_node(0.0, 0.0, 2.0);
        m.add_surface(1, vec![[a, c, b]]);
        m.add_surface(2, vec![[a, b, d], [b, c, d]]);
        m.add_surface(3, vec![[d, b, e]]);
        m.add_volume(100, &[1, 2]);
        m.add_volume(200, &[2, 3]);
        m
    }

    #[test]
    fn material_count_mismatch_fails_before_writing() {
        let model = slab_pair();
        let mut session = MeshSession::open(&model).unwrap();
        let mut db = TaggedDatabase::new();
        let tags = db.tag_count();

        let err = build_into(&mut db, &mut session, &["steel"]).unwrap_err();
        assert!(matches!(err, Error::Validation { volumes: 2, materials: 1 }));
        assert!(err.is_validation());
        assert_eq!(db.entity_count(), 0);
        assert_eq!(db.tag_count(), tags);
    }

    #[test]
    fn long_material_name_fails_before_writing() {
        let model = slab_pair();
        let mut session = MeshSession::open(&model).unwrap();
        let long = "x".repeat(40);
        let mut db = TaggedDatabase::new();

        let err = build_into(&mut db, &mut session, &["steel", long.as_str()]).unwrap_err();
        assert!(matches!(err, Error::MaterialNameTooLong { index: 1, .. }));
        assert_eq!(db.entity_count(), 0);
    }

    #[test]
    fn summary_counts() {
        let model = slab_pair();
        let mut session = MeshSession::open(&model).unwrap();
        let mut db = TaggedDatabase::new();
        let out = build_into(&mut db, &mut session, &["steel", "water"]).unwrap();

        assert_eq!(
            out.summary,
            BuildSummary {
                volumes: 2,
                groups: 2,
                surfaces: 3,
                interior_surfaces: 1,
                boundary_surfaces: 2,
                triangles: 4,
            }
        );
        // Shared surface extracted once.
        assert_eq!(session.extracted_count(), 3);
    }

    #[test]
    fn volume_global_ids_are_sequence_indices() {
        let model = slab_pair();
        let mut session = MeshSession::open(&model).unwrap();
        let mut db = TaggedDatabase::new();
        let out = build_into(&mut db, &mut session, &["steel", "water"]).unwrap();
        let schema = TagSchema::lookup(&db).unwrap();

        for (i, &volume) in out.volumes.iter().enumerate() {
            assert_eq!(
                db.tag_get_data(schema.global_id, volume),
                Some(&TagValue::Integer(i as i64))
            );
        }
        let ids: Vec<_> = out
            .surfaces
            .iter()
            .filter_map(|&s| db.tag_get_data(schema.global_id, s)?.as_integer())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn volumes_parent_their_surfaces() {
        let model = slab_pair();
        let mut session = MeshSession::open(&model).unwrap();
        let mut db = TaggedDatabase::new();
        let out = build_into(&mut db, &mut session, &["steel", "water"]).unwrap();

        assert_eq!(db.children(out.volumes[0]), &out.surfaces[0..2]);
        assert_eq!(db.children(out.volumes[1]), &out.surfaces[1..3]);
        assert_eq!(db.parents(out.surfaces[1]), &out.volumes[..]);
        assert!(db.children(out.groups[0]).is_empty());
        assert_eq!(db.members(out.groups[0]), &[out.volumes[0]]);
    }

    #[test]
    fn third_volume_on_a_surface_is_rejected() {
        let mut model = slab_pair();
        model.add_volume(300, &[2]);
        let mut session = MeshSession::open(&model).unwrap();

        let err = build(&mut session, &["a", "b", "c"]).unwrap_err();
        match err {
            Error::NonManifoldSurface { surface, volume } => {
                assert_eq!(surface.0, 2);
                assert_eq!(volume, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
