//! Weighted mesh description from `mesh { }` blocks

use std::ops::Range;

use glam::{Vec2, Vec3};
use log::debug;

use crate::error::{Md5Error, Result};
use crate::parser::{Block, Document, Line, ParseOptions};

/// A contiguous slice of a mesh's weight list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct WeightRange {
    /// Index of the first weight
    pub start: usize,
    /// Number of weights
    pub count: usize,
}

impl WeightRange {
    /// Create a range
    pub fn new(start: usize, count: usize) -> Self {
        Self { start, count }
    }

    /// The range as indices into the weight list
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.start.saturating_add(self.count)
    }
}

/// A mesh vertex before compilation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Vertex {
    /// Texture coordinate
    pub tex_coord: Vec2,
    /// Weights influencing this vertex
    pub weights: WeightRange,
}

/// A joint influence on a vertex
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Weight {
    /// Influencing joint
    pub joint: usize,
    /// Contribution of this influence; a vertex's biases should sum to 1.0
    pub bias: f32,
    /// Offset from the joint, in the joint's local space
    pub position: Vec3,
}

/// One `mesh { }` block
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Mesh {
    /// Material name from the `shader` record
    pub shader: String,
    /// Vertices in file order
    pub vertices: Vec<Vertex>,
    /// Triangle list, three vertex indices per triangle
    pub triangles: Vec<u32>,
    /// Weights in file order
    pub weights: Vec<Weight>,
}

impl Mesh {
    /// Number of complete triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// The weights influencing a vertex, or `None` when its range is out of bounds
    pub fn vertex_weights(&self, vertex: &Vertex) -> Option<&[Weight]> {
        self.weights.get(vertex.weights.as_range())
    }

    fn from_block(block: &Block<'_>, options: &ParseOptions) -> Result<Self> {
        let mut mesh = Self::default();
        let mut declared = [None; 3];

        for line in &block.body {
            let result = match line.keyword() {
                Some("shader") => parse_shader(line).map(|shader| mesh.shader = shader),
                Some("vert") => parse_vert(line).map(|vertex| mesh.vertices.push(vertex)),
                Some("tri") => parse_tri(line).map(|tri| mesh.triangles.extend_from_slice(&tri)),
                Some("weight") => parse_weight(line).map(|weight| mesh.weights.push(weight)),
                Some(keyword @ ("numverts" | "numtris" | "numweights")) => {
                    parse_count(line, keyword).map(|count| {
                        let slot = match keyword {
                            "numverts" => 0,
                            "numtris" => 1,
                            _ => 2,
                        };
                        declared[slot] = Some(count);
                    })
                }
                _ => Err(Md5Error::parse(line.number, "unrecognised mesh record")),
            };
            options.recover(result)?;
        }

        let actual = [
            mesh.vertices.len(),
            mesh.triangle_count(),
            mesh.weights.len(),
        ];
        for ((name, declared), actual) in ["verts", "tris", "weights"]
            .iter()
            .zip(declared)
            .zip(actual)
        {
            if let Some(declared) = declared
                && declared != actual
            {
                debug!(
                    "mesh '{}' declares {declared} {name} but holds {actual}",
                    mesh.shader
                );
            }
        }

        Ok(mesh)
    }
}

fn parse_shader(line: &Line<'_>) -> Result<String> {
    let mut cursor = line.cursor();
    cursor.keyword("shader")?;
    Ok(cursor.string("shader name")?.to_string())
}

fn parse_count(line: &Line<'_>, keyword: &str) -> Result<usize> {
    let mut cursor = line.cursor();
    cursor.keyword(keyword)?;
    cursor.number(keyword)
}

fn parse_vert(line: &Line<'_>) -> Result<Vertex> {
    let mut cursor = line.cursor();
    cursor.keyword("vert")?;
    let _index: usize = cursor.number("vertex index")?;
    let tex_coord = cursor.vec2("texture coordinate")?;
    let start = cursor.number("weight index")?;
    let count = cursor.number("weight count")?;
    Ok(Vertex {
        tex_coord,
        weights: WeightRange::new(start, count),
    })
}

fn parse_tri(line: &Line<'_>) -> Result<[u32; 3]> {
    let mut cursor = line.cursor();
    cursor.keyword("tri")?;
    let _index: usize = cursor.number("triangle index")?;
    Ok([
        cursor.number("vertex index")?,
        cursor.number("vertex index")?,
        cursor.number("vertex index")?,
    ])
}

fn parse_weight(line: &Line<'_>) -> Result<Weight> {
    let mut cursor = line.cursor();
    cursor.keyword("weight")?;
    let _index: usize = cursor.number("weight index")?;
    let joint = cursor.number("joint index")?;
    let bias = cursor.number("bias")?;
    let position = cursor.vec3("weight position")?;
    Ok(Weight {
        joint,
        bias,
        position,
    })
}

pub(crate) fn meshes_from_document(
    document: &Document<'_>,
    options: &ParseOptions,
) -> Result<Vec<Mesh>> {
    let meshes = document
        .blocks("mesh")
        .map(|block| Mesh::from_block(block, options))
        .collect::<Result<Vec<_>>>()?;
    debug!("parsed {} meshes", meshes.len());
    Ok(meshes)
}

/// Parse every `mesh { }` block of an `.md5mesh` document
pub fn parse_meshes(text: &str, options: &ParseOptions) -> Result<Vec<Mesh>> {
    let document = Document::scan(text, options)?;
    meshes_from_document(&document, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MESH: &str = r#"
mesh {
	// meshes: body
	shader "models/monsters/imp/imp"

	numverts 3
	vert 0 ( 0.5 0.25 ) 0 1
	vert 1 ( 0.75 0.25 ) 1 2
	vert 2 ( 0.5 0.5 ) 3 1

	numtris 1
	tri 0 0 2 1

	numweights 4
	weight 0 0 1.000000 ( 1.0 2.0 3.0 )
	weight 1 0 0.500000 ( 0.0 0.0 1.0 )
	weight 2 1 0.500000 ( 0.0 1.0 0.0 )
	weight 3 1 1.000000 ( 0.0 0.0 0.0 )
}
"#;

    #[test]
    fn test_parse_mesh() {
        let meshes = parse_meshes(MESH, &ParseOptions::default()).unwrap();
        assert_eq!(meshes.len(), 1);

        let mesh = &meshes[0];
        assert_eq!(mesh.shader, "models/monsters/imp/imp");
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.vertices[1].tex_coord, Vec2::new(0.75, 0.25));
        assert_eq!(mesh.vertices[1].weights, WeightRange::new(1, 2));
        assert_eq!(mesh.triangles, vec![0, 2, 1]);
        assert_eq!(mesh.weights.len(), 4);
        assert_eq!(mesh.weights[2].joint, 1);
        assert_eq!(mesh.weights[2].bias, 0.5);
        assert_eq!(mesh.weights[0].position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_vertex_weights_slice() {
        let mesh = &parse_meshes(MESH, &ParseOptions::default()).unwrap()[0];
        let weights = mesh.vertex_weights(&mesh.vertices[1]).unwrap();
        assert_eq!(weights.len(), 2);

        let bogus = Vertex {
            tex_coord: Vec2::ZERO,
            weights: WeightRange::new(3, 5),
        };
        assert!(mesh.vertex_weights(&bogus).is_none());
    }

    #[test]
    fn test_multiple_meshes_in_order() {
        let text = "mesh {\nshader \"a\"\n}\nmesh {\nshader \"b\"\n}\n";
        let meshes = parse_meshes(text, &ParseOptions::default()).unwrap();
        let shaders: Vec<_> = meshes.iter().map(|m| m.shader.as_str()).collect();
        assert_eq!(shaders, vec!["a", "b"]);
    }

    #[test]
    fn test_malformed_records() {
        let text = "mesh {\nvert 0 ( 0.5 ) 0 1\ntri 0 0 1 2\nbogus line\n}\n";
        let mesh = &parse_meshes(text, &ParseOptions::default()).unwrap()[0];
        assert!(mesh.vertices.is_empty());
        assert_eq!(mesh.triangles, vec![0, 1, 2]);

        let err = parse_meshes(text, &ParseOptions::strict()).unwrap_err();
        assert!(matches!(err, Md5Error::Parse { line: 2, .. }));
    }
}
