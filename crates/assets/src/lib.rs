//! Airfoil mesh provider.
//!
//! Variants are identified by a short designation such as `0012`. A variant is
//! either read from `<resource_dir>/<id>.obj` or generated as a NACA 4-digit
//! section. Either way the mesh is normalized into the `[-1, 1]` cube before
//! it reaches the renderer.

pub mod mesh;
pub mod naca;
pub mod obj;

pub use mesh::{Bounds, Mesh};
pub use naca::{NacaProfile, extruded_wing};
pub use obj::parse_obj;

use std::path::{Path, PathBuf};

/// Variant loaded when no identifier is given.
pub const DEFAULT_VARIANT: &str = "0012";

/// Chordwise samples per surface for procedural profiles.
const PROCEDURAL_SAMPLES: usize = 64;
/// Span of a procedural section, in chords.
const PROCEDURAL_SPAN: f32 = 1.5;

/// Errors from mesh loading.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("OBJ parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("not a NACA 4-digit designation: {0:?}")]
    InvalidIdentifier(String),
}

/// Read and parse an OBJ file.
pub fn load_obj(path: impl AsRef<Path>) -> Result<Mesh, MeshError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| MeshError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_obj(&name, &source)
}

/// Load `<resource_dir>/<id>.obj`, normalized.
pub fn load_variant(resource_dir: impl AsRef<Path>, id: &str) -> Result<Mesh, MeshError> {
    let path = resource_dir.as_ref().join(format!("{id}.obj"));
    let mut mesh = load_obj(&path)?;
    mesh.normalize();
    tracing::info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "loaded airfoil mesh"
    );
    Ok(mesh)
}

/// Generate the NACA section named by `id`, normalized.
pub fn procedural_variant(id: &str) -> Result<Mesh, MeshError> {
    let profile = NacaProfile::parse(id)?;
    let mut mesh = extruded_wing(id, &profile, PROCEDURAL_SAMPLES, PROCEDURAL_SPAN);
    mesh.normalize();
    tracing::info!(
        id,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "generated airfoil mesh"
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_variant_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("test.obj"),
            "v 0 0 0\nv 4 0 0\nv 0 2 0\nf 1 2 3\n",
        )
        .unwrap();
        let mesh = load_variant(dir.path(), "test").unwrap();
        assert_eq!(mesh.name, "test");
        assert_eq!(mesh.triangle_count(), 1);
        let bounds = mesh.bounds().unwrap();
        assert!((bounds.extent().x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn missing_variant_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_variant(dir.path(), DEFAULT_VARIANT).unwrap_err();
        assert!(matches!(err, MeshError::Io { .. }));
        assert!(err.to_string().contains("0012.obj"));
    }

    #[test]
    fn procedural_default_variant() {
        let mesh = procedural_variant(DEFAULT_VARIANT).unwrap();
        assert!(mesh.triangle_count() > 0);
        let bounds = mesh.bounds().unwrap();
        assert!((bounds.extent().max_element() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn procedural_rejects_non_naca() {
        assert!(matches!(
            procedural_variant("clarky"),
            Err(MeshError::InvalidIdentifier(_))
        ));
    }
}
