// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A built DAGMC geometry database together with its I/O entry points.

use std::path::Path;

use dagmc_lite_core::{EntityKey, TaggedDatabase};
use dagmc_lite_geometry::{DiscreteModel, MeshProvider, MeshSession};

use crate::builder::{build_into, BuildSummary};
use crate::error::{Error, Result};
use crate::repair::{make_watertight, unrepaired_path};
use crate::schema::{Category, TagSchema, MATERIAL_PREFIX};

/// A DAGMC geometry database.
#[derive(Debug)]
pub struct DagmcModel {
    db: TaggedDatabase,
    summary: Option<BuildSummary>,
}

impl DagmcModel {
    /// Wraps an existing database.
    pub fn new(db: TaggedDatabase) -> Self {
        Self { db, summary: None }
    }

    /// Builds a model from any mesh provider.
    pub fn from_mesh<P, S>(provider: &mut P, material_names: &[S]) -> Result<Self>
    where
        P: MeshProvider + ?Sized,
        S: AsRef<str>,
    {
        let mut db = TaggedDatabase::new();
        let output = build_into(&mut db, provider, material_names)?;
        Ok(Self {
            db,
            summary: Some(output.summary),
        })
    }

    /// Opens a mesh session on `model` for the duration of the build.
    pub fn from_model<S: AsRef<str>>(model: &DiscreteModel, material_names: &[S]) -> Result<Self> {
        let mut session = MeshSession::open(model)?;
        Self::from_mesh(&mut session, material_names)
    }

    /// Loads a database file.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(TaggedDatabase::read_file(path)?))
    }

    /// Writes the database to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.db.write_file(path)?;
        tracing::info!(path = %path.display(), entities = self.db.entity_count(), "Wrote database");
        Ok(())
    }

    /// Writes the database and runs the repair binary over it, leaving the
    /// repaired database at `path`.
    ///
    /// The unrepaired database is written next to `path` first (see
    /// [`unrepaired_path`]). It is deleted after a successful repair and kept
    /// when the repair fails or leaves no output behind.
    pub fn write_watertight(&self, path: impl AsRef<Path>, binary: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let unrepaired = unrepaired_path(path);
        self.write(&unrepaired)?;
        make_watertight(binary.as_ref(), &unrepaired, path)?;
        if !path.exists() {
            return Err(Error::Repair {
                binary: binary.as_ref().to_path_buf(),
                reason: format!("exited successfully but did not write {}", path.display()),
                unrepaired: Some(unrepaired),
            });
        }
        std::fs::remove_file(&unrepaired)?;
        Ok(())
    }

    pub fn database(&self) -> &TaggedDatabase {
        &self.db
    }

    pub fn into_database(self) -> TaggedDatabase {
        self.db
    }

    /// Counts of the pass that built this model, if it was built in-process.
    pub fn summary(&self) -> Option<&BuildSummary> {
        self.summary.as_ref()
    }

    /// Schema tag handles. Fails if the database lacks any of them.
    pub fn schema(&self) -> Result<TagSchema> {
        TagSchema::lookup(&self.db)
    }

    /// The set carrying the faceting tolerance.
    pub fn file_set(&self) -> Option<EntityKey> {
        let schema = self.schema().ok()?;
        self.db.entities_with_tag(schema.faceting_tol).first().copied()
    }

    pub fn volumes(&self) -> Vec<EntityKey> {
        self.entities_of(Category::Volume)
    }

    pub fn surfaces(&self) -> Vec<EntityKey> {
        self.entities_of(Category::Surface)
    }

    pub fn groups(&self) -> Vec<EntityKey> {
        self.entities_of(Category::Group)
    }

    fn entities_of(&self, category: Category) -> Vec<EntityKey> {
        match self.schema() {
            Ok(schema) => schema.entities_of(&self.db, category),
            Err(_) => Vec::new(),
        }
    }

    /// Material assigned to a volume through its group.
    pub fn material_of(&self, volume: EntityKey) -> Option<&str> {
        let schema = self.schema().ok()?;
        self.groups()
            .into_iter()
            .find(|&g| self.db.members(g).contains(&volume))
            .and_then(|g| self.db.tag_get_data(schema.name, g))
            .and_then(|v| v.as_str())
            .and_then(|name| name.strip_prefix(MATERIAL_PREFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_pair() -> DiscreteModel {
        let mut m = DiscreteModel::new();
        let n: Vec<u32> = (0..6)
            .map(|i| m.add_node(i as f64, (i % 2) as f64, (i / 3) as f64))
            .collect();
        m.add_surface(1, vec![[n[0], n[1], n[2]]]);
        m.add_surface(2, vec![[n[1], n[2], n[3]]]);
        m.add_surface(3, vec![[n[3], n[4], n[5]]]);
        m.add_volume(1, &[1, 2]);
        m.add_volume(2, &[2, 3]);
        m
    }

    #[test]
    fn queries_by_category() {
        let model = DagmcModel::from_model(&cube_pair(), &["steel", "vacuum"]).unwrap();
        assert_eq!(model.volumes().len(), 2);
        assert_eq!(model.surfaces().len(), 3);
        assert_eq!(model.groups().len(), 2);
        assert!(model.file_set().is_some());

        let volumes = model.volumes();
        assert_eq!(model.material_of(volumes[0]), Some("steel"));
        assert_eq!(model.material_of(volumes[1]), Some("vacuum"));
    }

    #[test]
    fn write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dagmc.json");
        let model = DagmcModel::from_model(&cube_pair(), &["steel", "vacuum"]).unwrap();
        model.write(&path).unwrap();

        let restored = DagmcModel::read_file(&path).unwrap();
        assert!(restored.summary().is_none());
        assert_eq!(restored.surfaces().len(), 3);
        assert_eq!(
            restored.database().entity_count(),
            model.database().entity_count()
        );
    }

    #[test]
    fn failed_repair_keeps_unrepaired_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dagmc.json");
        let model = DagmcModel::from_model(&cube_pair(), &["steel", "vacuum"]).unwrap();

        let err = model
            .write_watertight(&path, dir.path().join("no-such-binary"))
            .unwrap_err();
        match err {
            Error::Repair { unrepaired: Some(p), .. } => {
                assert!(p.exists());
                assert!(DagmcModel::read_file(&p).is_ok());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn repair_without_output_keeps_unrepaired_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dagmc.json");
        let model = DagmcModel::from_model(&cube_pair(), &["steel", "vacuum"]).unwrap();

        // `true` exits 0 and writes nothing.
        let err = model.write_watertight(&path, "true").unwrap_err();
        match err {
            Error::Repair { unrepaired: Some(p), .. } => {
                assert_eq!(p, dir.path().join("dagmc.unrepaired.json"));
                assert!(p.exists());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn successful_repair_removes_unrepaired_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dagmc.json");
        let model = DagmcModel::from_model(&cube_pair(), &["steel", "vacuum"]).unwrap();

        // Stand-in repair tool: `<script> <input> -o <output>` copies input.
        let script = dir.path().join("repair.sh");
        std::fs::write(&script, "#!/bin/sh\ncp \"$1\" \"$3\"\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        model.write_watertight(&path, &script).unwrap();
        assert!(DagmcModel::read_file(&path).is_ok());
        assert!(!dir.path().join("dagmc.unrepaired.json").exists());
    }
}
