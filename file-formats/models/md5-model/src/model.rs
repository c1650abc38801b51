//! `.md5mesh` documents: header, skeleton and meshes

use log::{debug, warn};

use crate::compile::{CompileOptions, CompiledModel, compile_mesh_with};
use crate::error::{Md5Error, Result};
use crate::mesh::{Mesh, meshes_from_document};
use crate::parser::{Document, Line, ParseOptions};
use crate::skeleton::Skeleton;

/// The only MD5 format version in the wild
pub const MD5_VERSION: u32 = 10;

/// Read the `MD5Version` statement; `None` if absent or malformed when lenient.
pub(crate) fn read_version(document: &Document<'_>, options: &ParseOptions) -> Result<Option<u32>> {
    let Some(line) = document.statement("MD5Version") else {
        return Ok(None);
    };
    let Some(version) = options.recover(parse_statement::<u32>(line, "MD5Version"))? else {
        return Ok(None);
    };
    if version != MD5_VERSION {
        if options.is_lenient() {
            warn!("MD5Version {version} is not {MD5_VERSION}; reading anyway");
        } else {
            return Err(Md5Error::UnsupportedVersion(version));
        }
    }
    Ok(Some(version))
}

pub(crate) fn parse_statement<T: std::str::FromStr>(line: &Line<'_>, keyword: &str) -> Result<T> {
    let mut cursor = line.cursor();
    cursor.keyword(keyword)?;
    cursor.number(keyword)
}

fn parse_commandline(line: &Line<'_>) -> Result<String> {
    let mut cursor = line.cursor();
    cursor.keyword("commandline")?;
    Ok(cursor.string("command line")?.to_string())
}

/// A parsed `.md5mesh` file
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Md5Model {
    /// Value of the `MD5Version` statement, if present
    pub version: Option<u32>,
    /// Exporter command line, if present
    pub commandline: Option<String>,
    /// Bind-pose skeleton
    pub skeleton: Skeleton,
    /// Meshes in file order
    pub meshes: Vec<Mesh>,
}

impl Md5Model {
    /// Parse an `.md5mesh` document
    ///
    /// # Examples
    ///
    /// ```
    /// use md5_model::{Md5Model, ParseOptions};
    ///
    /// let text = r#"
    /// MD5Version 10
    /// joints {
    ///     "root" -1 ( 0 0 0 ) ( 0 0 0 )
    /// }
    /// mesh {
    ///     shader "skin"
    ///     vert 0 ( 0 0 ) 0 1
    ///     weight 0 0 1.0 ( 0 0 1 )
    /// }
    /// "#;
    /// let model = Md5Model::parse(text, &ParseOptions::default()).unwrap();
    /// assert_eq!(model.skeleton.len(), 1);
    /// assert_eq!(model.meshes[0].vertices.len(), 1);
    /// ```
    pub fn parse(text: &str, options: &ParseOptions) -> Result<Self> {
        let document = Document::scan(text, options)?;

        let version = read_version(&document, options)?;
        let commandline = match document.statement("commandline") {
            Some(line) => options.recover(parse_commandline(line))?,
            None => None,
        };

        let skeleton = Skeleton::from_document(&document, options)?;
        let meshes = meshes_from_document(&document, options)?;
        debug!(
            "md5mesh: {} joints, {} meshes",
            skeleton.len(),
            meshes.len()
        );

        Ok(Self {
            version,
            commandline,
            skeleton,
            meshes,
        })
    }

    /// Total vertex count over all meshes
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.vertices.len()).sum()
    }

    /// Total triangle count over all meshes
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }

    /// Run the bind-pose compiler over every mesh
    pub fn compile(&self) -> CompiledModel {
        self.compile_with(&CompileOptions::default())
    }

    /// Run the bind-pose compiler over every mesh with explicit options
    pub fn compile_with(&self, options: &CompileOptions) -> CompiledModel {
        let meshes = self
            .meshes
            .iter()
            .map(|mesh| compile_mesh_with(&self.skeleton, mesh, options))
            .collect();
        CompiledModel::new(meshes, self.skeleton.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header() {
        let text = "MD5Version 10\ncommandline \"mesh models/imp.mb -game Doom\"\n";
        let model = Md5Model::parse(text, &ParseOptions::default()).unwrap();
        assert_eq!(model.version, Some(10));
        assert_eq!(
            model.commandline.as_deref(),
            Some("mesh models/imp.mb -game Doom")
        );
        assert!(model.skeleton.is_empty());
        assert!(model.meshes.is_empty());
    }

    #[test]
    fn test_unknown_version() {
        let text = "MD5Version 11\njoints {\n}\n";
        let model = Md5Model::parse(text, &ParseOptions::default()).unwrap();
        assert_eq!(model.version, Some(11));

        let err = Md5Model::parse(text, &ParseOptions::strict()).unwrap_err();
        assert!(matches!(err, Md5Error::UnsupportedVersion(11)));
    }

    #[test]
    fn test_strict_requires_joints() {
        let err = Md5Model::parse("MD5Version 10\n", &ParseOptions::strict()).unwrap_err();
        assert!(matches!(err, Md5Error::MissingBlock("joints")));
    }
}
