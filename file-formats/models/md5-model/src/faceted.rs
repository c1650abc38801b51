//! Flat-shaded, non-indexed mesh with adjustable normal smoothing
//!
//! Every triangle corner gets its own `position, normal` record (six floats),
//! so a corner's normal can sit anywhere between its face normal and the
//! smoothed normal shared by all faces meeting at that vertex.

use glam::Vec3;
use log::warn;

/// Floats per faceted record
pub const FACETED_ELEMENTS: usize = 6;
/// Bytes per faceted record
pub const FACETED_STRIDE: usize = FACETED_ELEMENTS * 4;

/// A position/normal stream with one record per triangle corner
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetedMesh {
    data: Vec<f32>,
    face_normals: Vec<Vec3>,
    smooth_normals: Vec<Vec3>,
    smoothing: f32,
}

impl FacetedMesh {
    /// Expand an indexed triangle list
    ///
    /// Triangles referencing a position outside `positions` are dropped.
    pub fn new(positions: &[Vec3], indices: &[u32], smoothing: f32) -> Self {
        let triangles: Vec<[usize; 3]> = indices
            .chunks_exact(3)
            .enumerate()
            .filter_map(|(index, tri)| {
                let corners = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
                if corners.iter().all(|&corner| corner < positions.len()) {
                    Some(corners)
                } else {
                    warn!("faceted triangle {index} references a missing position");
                    None
                }
            })
            .collect();

        let mut summed = vec![Vec3::ZERO; positions.len()];
        let mut face_normals = Vec::with_capacity(triangles.len() * 3);
        let mut data = Vec::with_capacity(triangles.len() * 3 * FACETED_ELEMENTS);

        for corners in &triangles {
            let [p0, p1, p2] = corners.map(|corner| positions[corner]);
            let normal = (p2 - p0).cross(p1 - p0).normalize_or_zero();

            for &corner in corners {
                summed[corner] += normal;
                face_normals.push(normal);
                data.extend_from_slice(&positions[corner].to_array());
                data.extend_from_slice(&[0.0; 3]);
            }
        }

        let smooth_normals = triangles
            .iter()
            .flatten()
            .map(|&corner| summed[corner].normalize_or_zero())
            .collect();

        let mut mesh = Self {
            data,
            face_normals,
            smooth_normals,
            smoothing,
        };
        mesh.set_normal_smoothing(smoothing);
        mesh
    }

    /// Blend every corner normal between face (0.0) and smoothed (1.0)
    pub fn set_normal_smoothing(&mut self, factor: f32) {
        self.smoothing = factor;
        let corners = self.face_normals.iter().zip(&self.smooth_normals);
        for (record, (face, smooth)) in self.data.chunks_exact_mut(FACETED_ELEMENTS).zip(corners) {
            face.lerp(*smooth, factor)
                .normalize_or_zero()
                .write_to_slice(&mut record[3..6]);
        }
    }

    /// Current smoothing factor
    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    /// Number of records (three per triangle)
    pub fn vertex_count(&self) -> usize {
        self.face_normals.len()
    }

    /// Interleaved `position, normal` floats
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Position and normal of one record
    pub fn vertex(&self, index: usize) -> Option<(Vec3, Vec3)> {
        let start = index.checked_mul(FACETED_ELEMENTS)?;
        let record = self.data.get(start..start + FACETED_ELEMENTS)?;
        Some((Vec3::from_slice(&record[..3]), Vec3::from_slice(&record[3..])))
    }

    /// Little-endian bytes of the stream
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|value| value.to_le_bytes()).collect()
    }
}
