// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STL codec used to move surface patches between a mesh provider and the
//! database.
//!
//! Binary STL stores `f32` coordinates, so patches moving between a provider
//! and the database are written as ASCII STL with shortest round-trip `f64`
//! formatting. Reading accepts both binary and ASCII STL. STL stores
//! unindexed triangles, so the reader welds corners with bit-identical
//! coordinates back into shared vertices.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use nalgebra::Vector3;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::facets::FacetPatch;

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Writes a patch to `path` as binary STL.
pub fn write_stl(path: impl AsRef<Path>, patch: &FacetPatch) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_stl_binary(&mut writer, patch)?;
    writer.flush()?;
    Ok(())
}

/// Writes a patch as binary STL to any writer.
pub fn write_stl_binary<W: Write>(writer: &mut W, patch: &FacetPatch) -> Result<()> {
    patch.validate()?;

    let mut header = [b' '; HEADER_SIZE];
    let text = b"dagmc-lite surface patch";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;

    let count = u32::try_from(patch.triangle_count())
        .map_err(|_| Error::Stl("too many triangles for binary STL".into()))?;
    writer.write_all(&count.to_le_bytes())?;

    for (i, tri) in patch.triangles.iter().enumerate() {
        let n = patch.triangle_normal(i).unwrap_or_else(Vector3::zeros);
        write_f32_triple(writer, [n.x, n.y, n.z])?;
        for &idx in tri {
            write_f32_triple(writer, patch.vertices[idx as usize])?;
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }
    Ok(())
}

/// Writes a patch as ASCII STL without loss of `f64` precision.
pub fn write_stl_ascii<W: Write>(writer: &mut W, patch: &FacetPatch) -> Result<()> {
    patch.validate()?;

    writeln!(writer, "solid patch")?;
    for (i, tri) in patch.triangles.iter().enumerate() {
        let n = patch.triangle_normal(i).unwrap_or_else(Vector3::zeros);
        writeln!(writer, "  facet normal {:?} {:?} {:?}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for &idx in tri {
            let [x, y, z] = patch.vertices[idx as usize];
            writeln!(writer, "      vertex {x:?} {y:?} {z:?}")?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid patch")?;
    Ok(())
}

fn write_f32_triple<W: Write>(writer: &mut W, v: [f64; 3]) -> Result<()> {
    for c in v {
        writer.write_all(&(c as f32).to_le_bytes())?;
    }
    Ok(())
}

/// Reads an STL file, detecting ASCII vs binary.
pub fn read_stl(path: impl AsRef<Path>) -> Result<FacetPatch> {
    let bytes = std::fs::read(path)?;
    parse_stl(&bytes)
}

/// Parses STL bytes, detecting ASCII vs binary.
pub fn parse_stl(bytes: &[u8]) -> Result<FacetPatch> {
    if bytes.len() < 6 {
        return Err(Error::Stl("file too small to be valid STL".into()));
    }

    if looks_ascii(bytes) {
        read_ascii(BufReader::new(bytes))
    } else {
        read_binary(bytes)
    }
}

/// ASCII files start with "solid" and contain no NUL byte in the header.
/// Binary headers may start with "solid" too, so also check that the declared
/// triangle count does not match the byte length.
fn looks_ascii(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(HEADER_SIZE)];
    let starts_solid = String::from_utf8_lossy(head).trim_start().starts_with("solid");
    if !starts_solid || head.contains(&0) {
        return false;
    }
    if bytes.len() >= HEADER_SIZE + 4 {
        let count = u32::from_le_bytes([
            bytes[HEADER_SIZE],
            bytes[HEADER_SIZE + 1],
            bytes[HEADER_SIZE + 2],
            bytes[HEADER_SIZE + 3],
        ]) as usize;
        if HEADER_SIZE + 4 + count * TRIANGLE_SIZE == bytes.len() {
            return false;
        }
    }
    true
}

fn read_binary(bytes: &[u8]) -> Result<FacetPatch> {
    let mut reader = bytes;
    let mut header = [0u8; HEADER_SIZE + 4];
    reader
        .read_exact(&mut header)
        .map_err(|_| Error::Stl("truncated binary header".into()))?;
    let count = u32::from_le_bytes([
        header[HEADER_SIZE],
        header[HEADER_SIZE + 1],
        header[HEADER_SIZE + 2],
        header[HEADER_SIZE + 3],
    ]);

    let mut welder = Welder::with_capacity(count as usize);
    let mut buf = [0u8; TRIANGLE_SIZE];
    for i in 0..count {
        reader.read_exact(&mut buf).map_err(|_| {
            Error::Stl(format!("expected {count} triangles, file ends after {i}"))
        })?;
        // Skip the stored normal, it is recomputed from the winding.
        let corners = [
            read_vertex(&buf[12..24]),
            read_vertex(&buf[24..36]),
            read_vertex(&buf[36..48]),
        ];
        welder.push_triangle(corners);
    }
    Ok(welder.finish())
}

fn read_vertex(buf: &[u8]) -> [f64; 3] {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    [f64::from(x), f64::from(y), f64::from(z)]
}

fn read_ascii<R: BufRead>(reader: R) -> Result<FacetPatch> {
    let mut welder = Welder::with_capacity(0);
    let mut corners: Vec<[f64; 3]> = Vec::with_capacity(3);
    let mut in_loop = false;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "outer" => {
                in_loop = true;
                corners.clear();
            }
            "vertex" if in_loop => {
                let mut coord = [0.0; 3];
                for c in &mut coord {
                    *c = parts
                        .next()
                        .and_then(|s| s.parse::<f64>().ok())
                        .ok_or_else(|| Error::Stl(format!("bad vertex on line {}", line_no + 1)))?;
                }
                corners.push(coord);
            }
            "endloop" => in_loop = false,
            "endfacet" => {
                if corners.len() != 3 {
                    return Err(Error::Stl(format!(
                        "facet ending on line {} has {} vertices",
                        line_no + 1,
                        corners.len()
                    )));
                }
                welder.push_triangle([corners[0], corners[1], corners[2]]);
                corners.clear();
            }
            "endsolid" => break,
            _ => {}
        }
    }
    Ok(welder.finish())
}

/// Merges bit-identical corners into shared vertices.
struct Welder {
    index: FxHashMap<[u64; 3], u32>,
    patch: FacetPatch,
}

impl Welder {
    fn with_capacity(triangles: usize) -> Self {
        Self {
            index: FxHashMap::default(),
            patch: FacetPatch {
                vertices: Vec::with_capacity(triangles / 2 + 3),
                triangles: Vec::with_capacity(triangles),
            },
        }
    }

    fn vertex(&mut self, p: [f64; 3]) -> u32 {
        let key = [p[0].to_bits(), p[1].to_bits(), p[2].to_bits()];
        let vertices = &mut self.patch.vertices;
        *self.index.entry(key).or_insert_with(|| {
            vertices.push(p);
            (vertices.len() - 1) as u32
        })
    }

    fn push_triangle(&mut self, corners: [[f64; 3]; 3]) {
        let tri = corners.map(|c| self.vertex(c));
        self.patch.triangles.push(tri);
    }

    fn finish(self) -> FacetPatch {
        self.patch
    }
}
