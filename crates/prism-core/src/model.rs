//! OBJ model import

use std::io::{BufRead, Cursor};
use std::path::Path;

use crate::geometry::Geometry;

/// Radius an imported model is scaled to
const IMPORT_RADIUS: f32 = 1.0;

/// Model import errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Empty model: no geometry found")]
    EmptyModel,
}

/// Load an OBJ file from disk
pub fn load_obj(path: impl AsRef<Path>) -> Result<Geometry, ModelError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| ModelError::Io(e.to_string()))?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    load_obj_from_bytes(&name, &data)
}

/// Parse an OBJ held in memory
///
/// All objects of the file are merged into one geometry, centered and scaled
/// so that it fits a unit sphere. Missing normals are computed from the faces.
pub fn load_obj_from_bytes(name: &str, data: &[u8]) -> Result<Geometry, ModelError> {
    let mut cursor = Cursor::new(data);
    load_obj_from_reader(name, &mut cursor)
}

fn load_obj_from_reader(name: &str, reader: &mut impl BufRead) -> Result<Geometry, ModelError> {
    let (models, _materials) = tobj::load_obj_buf(
        reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Ok(Default::default()),
    )
    .map_err(|e| ModelError::Parse(e.to_string()))?;

    let mut geometry = Geometry::empty(name);
    let mut complete_normals = true;

    for model in &models {
        let mesh = &model.mesh;
        let offset = geometry.positions.len() as u32;
        let count = mesh.positions.len() / 3;

        geometry
            .positions
            .extend(mesh.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]));

        if mesh.normals.len() == mesh.positions.len() {
            geometry
                .normals
                .extend(mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]));
        } else {
            complete_normals = false;
            geometry.normals.extend(std::iter::repeat_n([0.0; 3], count));
        }

        if mesh.texcoords.len() / 2 == count {
            geometry
                .uvs
                .extend(mesh.texcoords.chunks_exact(2).map(|t| [t[0], 1.0 - t[1]]));
        } else {
            geometry.uvs.extend(std::iter::repeat_n([0.0; 2], count));
        }

        geometry
            .indices
            .extend(mesh.indices.iter().map(|&i| offset + i));
    }

    if geometry.indices.is_empty() {
        return Err(ModelError::EmptyModel);
    }
    if !complete_normals {
        geometry.compute_vertex_normals();
    }
    geometry.normalize_to_radius(IMPORT_RADIUS);

    tracing::debug!(
        "Imported model '{}': {} vertices, {} triangles",
        name,
        geometry.vertex_count(),
        geometry.triangle_count()
    );
    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const QUAD: &str = "\
o quad
v -2.0 -2.0 0.0
v 2.0 -2.0 0.0
v 2.0 2.0 0.0
v -2.0 2.0 0.0
f 1 2 3 4
";

    #[test]
    fn test_quad_is_triangulated_and_normalized() {
        let geometry = load_obj_from_bytes("quad", QUAD.as_bytes()).unwrap();
        assert_eq!(geometry.triangle_count(), 2);
        assert!(geometry.is_valid());
        assert_relative_eq!(geometry.bounding_radius(), 1.0, epsilon = 1e-5);
        // Normals computed from the faces
        for normal in &geometry.normals {
            assert_relative_eq!(normal[2].abs(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_empty_file() {
        let result = load_obj_from_bytes("empty", b"# nothing here\n");
        assert!(matches!(result, Err(ModelError::EmptyModel)));
    }

    #[test]
    fn test_missing_file() {
        let result = load_obj("/nonexistent/model.obj");
        assert!(matches!(result, Err(ModelError::Io(_))));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.obj");
        std::fs::write(&path, QUAD).unwrap();
        let geometry = load_obj(&path).unwrap();
        assert_eq!(geometry.label, "quad");
        assert_eq!(geometry.uvs.len(), geometry.vertex_count());
    }
}
