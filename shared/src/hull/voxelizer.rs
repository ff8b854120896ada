//! Offline hull voxelizer.
//!
//! Fills a closed triangle mesh with equally sized spheres. The mesh bounds
//! are split into cubic cells, `resolution` of them along the longest axis.
//! A vertical line is cast through every column of cells and its crossings
//! with the mesh are paired into inside intervals. Every cell whose center
//! lies inside an interval becomes one sample of radius `cell / 2`.

use bevy::math::Vec3;
use bevy_log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use super::HullSampleSet;
use crate::errors::ConfigError;

/// Barycentric slack so that columns through shared edges still hit.
const EDGE_EPSILON: f32 = 1e-6;

/// Triangle mesh of a hull, in the hull's local space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HullMesh {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl HullMesh {
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }

    /// Closed box centered on the origin.
    pub fn cuboid(half_extents: Vec3) -> Self {
        let h = half_extents;
        let vertices = (0..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 == 0 { -h.x } else { h.x },
                    if i & 2 == 0 { -h.y } else { h.y },
                    if i & 4 == 0 { -h.z } else { h.z },
                )
            })
            .collect();
        let triangles = vec![
            [0, 2, 3],
            [0, 3, 1],
            [4, 5, 7],
            [4, 7, 6],
            [0, 4, 6],
            [0, 6, 2],
            [1, 3, 7],
            [1, 7, 5],
            [0, 1, 5],
            [0, 5, 4],
            [2, 6, 7],
            [2, 7, 3],
        ];
        Self::new(vertices, triangles)
    }

    /// Move every vertex by `offset`.
    pub fn translated(mut self, offset: Vec3) -> Self {
        for v in &mut self.vertices {
            *v += offset;
        }
        self
    }

    /// Append the triangles of `other`, keeping both meshes' topology.
    pub fn merge(&mut self, other: &HullMesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|[a, b, c]| [a + base, b + base, c + base]),
        );
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.triangles.is_empty() {
            return Err(ConfigError::DegenerateMesh);
        }
        let vertex_count = self.vertices.len();
        for &index in self.triangles.iter().flatten() {
            if index as usize >= vertex_count {
                return Err(ConfigError::InvalidMeshIndex {
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(min, max), v| (min.min(*v), max.max(*v))),
        )
    }

    /// Parse a Wavefront OBJ document. Only `v` and `f` records are read;
    /// polygons are fan-triangulated.
    pub fn from_obj_str(text: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let line_error = |msg: &str| -> Box<dyn std::error::Error> {
                format!("line {}: {msg}", line_no + 1).into()
            };
            let mut parts = line.split_whitespace();
            match parts.next() {
                Some("v") => {
                    let coords = parts
                        .take(3)
                        .map(str::parse::<f32>)
                        .collect::<Result<Vec<_>, _>>()?;
                    if coords.len() != 3 {
                        return Err(line_error("vertex needs 3 coordinates"));
                    }
                    vertices.push(Vec3::new(coords[0], coords[1], coords[2]));
                }
                Some("f") => {
                    let mut face = Vec::new();
                    for token in parts {
                        // "7", "7/1" and "7/1/3" all name vertex 7
                        let raw: i64 = token.split('/').next().unwrap_or_default().parse()?;
                        let index = match raw {
                            0 => return Err(line_error("OBJ indices start at 1")),
                            i if i < 0 => vertices.len() as i64 + i,
                            i => i - 1,
                        };
                        if index < 0 {
                            return Err(line_error("relative index out of range"));
                        }
                        let index = u32::try_from(index)
                            .map_err(|_| line_error("vertex index out of range"))?;
                        face.push(index);
                    }
                    if face.len() < 3 {
                        return Err(line_error("face needs 3 vertices"));
                    }
                    for i in 1..face.len() - 1 {
                        triangles.push([face[0], face[i], face[i + 1]]);
                    }
                }
                _ => {}
            }
        }

        let mesh = Self::new(vertices, triangles);
        mesh.validate()?;
        Ok(mesh)
    }

    /// Load a mesh from `.obj` or RON.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let mesh = if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("obj")) {
            Self::from_obj_str(&contents)?
        } else {
            let mesh: Self = ron::de::from_str(&contents)?;
            mesh.validate()?;
            mesh
        };
        info!(
            "Loaded hull mesh {}: {} vertices, {} triangles",
            path.display(),
            mesh.vertices.len(),
            mesh.triangles.len()
        );
        Ok(mesh)
    }

    /// Heights where the vertical line through `(x, z)` crosses the mesh,
    /// sorted and with coincident crossings merged.
    fn column_crossings(&self, x: f32, z: f32, merge_distance: f32) -> Vec<f32> {
        let mut heights: Vec<f32> = self
            .triangles
            .iter()
            .filter_map(|&[a, b, c]| {
                vertical_hit(
                    self.vertices[a as usize],
                    self.vertices[b as usize],
                    self.vertices[c as usize],
                    x,
                    z,
                )
            })
            .collect();

        heights.sort_by(f32::total_cmp);
        heights.dedup_by(|next, kept| (*next - *kept).abs() <= merge_distance);
        heights
    }
}

/// Height at which the vertical line through `(x, z)` meets triangle `abc`,
/// if it does. Triangles seen edge-on from above are skipped.
fn vertical_hit(a: Vec3, b: Vec3, c: Vec3, x: f32, z: f32) -> Option<f32> {
    let denom = (b.z - c.z) * (a.x - c.x) + (c.x - b.x) * (a.z - c.z);
    if denom.abs() < f32::EPSILON {
        return None;
    }
    let l1 = ((b.z - c.z) * (x - c.x) + (c.x - b.x) * (z - c.z)) / denom;
    let l2 = ((c.z - a.z) * (x - c.x) + (a.x - c.x) * (z - c.z)) / denom;
    let l3 = 1.0 - l1 - l2;
    if l1 < -EDGE_EPSILON || l2 < -EDGE_EPSILON || l3 < -EDGE_EPSILON {
        return None;
    }
    Some(l1 * a.y + l2 * b.y + l3 * c.y)
}

/// Fill `mesh` with spheres, `resolution` cells along its longest axis.
pub fn voxelize(mesh: &HullMesh, resolution: u32) -> Result<HullSampleSet, ConfigError> {
    if resolution == 0 {
        return Err(ConfigError::ZeroResolution);
    }
    mesh.validate()?;

    let (min, max) = mesh.bounds().ok_or(ConfigError::DegenerateMesh)?;
    let size = max - min;
    let longest = size.max_element();
    if !longest.is_finite() || longest <= 0.0 {
        return Err(ConfigError::DegenerateMesh);
    }

    let cell = longest / resolution as f32;
    let cells_along = |extent: f32| ((extent / cell) - 1e-4).ceil().max(1.0) as usize;
    let (nx, ny, nz) = (cells_along(size.x), cells_along(size.y), cells_along(size.z));
    // Center the voxel grid on the mesh bounds
    let origin = min + (size - Vec3::new(nx as f32, ny as f32, nz as f32) * cell) * 0.5;

    let mut centers = Vec::new();
    let mut open_columns = 0usize;

    for iz in 0..nz {
        let z = origin.z + (iz as f32 + 0.5) * cell;
        for ix in 0..nx {
            let x = origin.x + (ix as f32 + 0.5) * cell;
            let crossings = mesh.column_crossings(x, z, cell * 1e-4);
            if crossings.len() % 2 != 0 {
                open_columns += 1;
            }

            for iy in 0..ny {
                let y = origin.y + (iy as f32 + 0.5) * cell;
                let inside = crossings
                    .chunks_exact(2)
                    .any(|pair| pair[0] <= y && y <= pair[1]);
                if inside {
                    centers.push(Vec3::new(x, y, z));
                }
            }
        }
    }

    if open_columns > 0 {
        warn!(
            "Hull mesh is not closed: {} of {} columns had an odd number of crossings",
            open_columns,
            nx * nz
        );
    }
    info!(
        "Voxelized hull into {} samples ({}x{}x{} grid, radius {})",
        centers.len(),
        nx,
        ny,
        nz,
        cell * 0.5
    );

    HullSampleSet::new(centers, cell * 0.5)
}
