//! Mesh construction from indexed polygons, plus a few stock control meshes.

use std::f64::consts::TAU;

use fap_core::error::{FapError, Result};

use super::mesh::Mesh;
use super::types::VertexId;
use crate::Point3;

impl Mesh {
    /// Build a coarse mesh from positions and polygons of position indices.
    pub fn from_polygons(positions: &[Point3], polygons: &[Vec<usize>]) -> Result<Self> {
        let mut mesh = Mesh::new();
        let ids: Vec<VertexId> = positions.iter().map(|&p| mesh.add_vertex(p)).collect();

        for polygon in polygons {
            let verts = polygon
                .iter()
                .map(|&i| {
                    ids.get(i).copied().ok_or_else(|| {
                        FapError::Topology(format!(
                            "Polygon index {} out of range ({} positions)",
                            i,
                            ids.len()
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            mesh.make_face(&verts)?;
        }
        Ok(mesh)
    }

    /// Planar grid of `nx` by `ny` unit quads. Vertex `(x, y)` is created
    /// `y * (nx + 1) + x`-th and face `(x, y)` is created `y * nx + x`-th.
    pub fn quad_grid(nx: usize, ny: usize) -> Result<Self> {
        let mut positions = Vec::with_capacity((nx + 1) * (ny + 1));
        for y in 0..=ny {
            for x in 0..=nx {
                positions.push(Point3::new(x as f64, y as f64, 0.0));
            }
        }

        let idx = |x: usize, y: usize| y * (nx + 1) + x;
        let mut polygons = Vec::with_capacity(nx * ny);
        for y in 0..ny {
            for x in 0..nx {
                polygons.push(vec![idx(x, y), idx(x + 1, y), idx(x + 1, y + 1), idx(x, y + 1)]);
            }
        }
        Self::from_polygons(&positions, &polygons)
    }

    /// Closed quad torus with `nu` segments around the tube axis and `nv`
    /// around the tube. Every vertex has valence 4.
    pub fn torus(nu: usize, nv: usize) -> Result<Self> {
        if nu < 3 || nv < 3 {
            return Err(FapError::InvalidOperation(
                "A torus needs at least 3 segments in each direction".into(),
            ));
        }

        let (major, minor) = (2.0, 0.5);
        let mut positions = Vec::with_capacity(nu * nv);
        for j in 0..nv {
            let phi = TAU * j as f64 / nv as f64;
            for i in 0..nu {
                let theta = TAU * i as f64 / nu as f64;
                let r = major + minor * phi.cos();
                positions.push(Point3::new(r * theta.cos(), r * theta.sin(), minor * phi.sin()));
            }
        }

        let idx = |i: usize, j: usize| (j % nv) * nu + (i % nu);
        let mut polygons = Vec::with_capacity(nu * nv);
        for j in 0..nv {
            for i in 0..nu {
                polygons.push(vec![idx(i, j), idx(i + 1, j), idx(i + 1, j + 1), idx(i, j + 1)]);
            }
        }
        Self::from_polygons(&positions, &polygons)
    }

    /// Unit cube with outward facing quads. Every corner has valence 3.
    pub fn cube() -> Result<Self> {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let polygons = vec![
            vec![0, 3, 2, 1],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![2, 3, 7, 6],
            vec![0, 4, 7, 3],
            vec![1, 2, 6, 5],
        ];
        Self::from_polygons(&positions, &polygons)
    }

    /// Open fan of `n` quads around a single interior vertex of valence `n`.
    ///
    /// Vertex 0 is the center, `1..=n` are the edge ring and `n+1..=2n` the
    /// diagonals; face `i` is `[c, e_i, d_i, e_{i+1}]`.
    pub fn star(n: usize) -> Result<Self> {
        if n < 3 {
            return Err(FapError::InvalidOperation(
                "A star needs at least 3 faces".into(),
            ));
        }

        let mut positions = Vec::with_capacity(2 * n + 1);
        positions.push(Point3::ZERO);
        for i in 0..n {
            let a = TAU * i as f64 / n as f64;
            positions.push(Point3::new(a.cos(), a.sin(), 0.0));
        }
        for i in 0..n {
            let a = TAU * (i as f64 + 0.5) / n as f64;
            positions.push(Point3::new(1.5 * a.cos(), 1.5 * a.sin(), 0.0));
        }

        let polygons = (0..n)
            .map(|i| vec![0, 1 + i, 1 + n + i, 1 + (i + 1) % n])
            .collect::<Vec<_>>();
        Self::from_polygons(&positions, &polygons)
    }
}
