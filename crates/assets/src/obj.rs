//! Minimal Wavefront OBJ reader: `v`, `vn` and `f` records.
//!
//! Faces may use `v`, `v/vt`, `v//vn` or `v/vt/vn` references, including
//! negative (relative) indices. Polygons are fan-triangulated. Texture
//! coordinates, groups and materials are skipped.

use crate::MeshError;
use crate::mesh::Mesh;
use glam::Vec3;
use std::collections::HashMap;

pub fn parse_obj(name: &str, source: &str) -> Result<Mesh, MeshError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut mesh = Mesh {
        name: name.to_string(),
        ..Mesh::default()
    };
    let mut out_normals: Vec<Option<Vec3>> = Vec::new();
    let mut corners: HashMap<(usize, Option<usize>), u32> = HashMap::new();

    for (i, raw) in source.lines().enumerate() {
        let line = i + 1;
        let mut fields = raw.split_whitespace();
        match fields.next() {
            Some("v") => positions.push(parse_vec3(fields, line)?),
            Some("vn") => normals.push(parse_vec3(fields, line)?),
            Some("f") => {
                let mut polygon = Vec::new();
                for field in fields {
                    let (vi, ni) = parse_corner(field, positions.len(), normals.len(), line)?;
                    let index = *corners.entry((vi, ni)).or_insert_with(|| {
                        mesh.positions.push(positions[vi]);
                        out_normals.push(ni.map(|n| normals[n]));
                        (mesh.positions.len() - 1) as u32
                    });
                    polygon.push(index);
                }
                if polygon.len() < 3 {
                    return Err(parse_error(line, "face needs at least three vertices"));
                }
                for k in 1..polygon.len() - 1 {
                    mesh.indices
                        .extend_from_slice(&[polygon[0], polygon[k], polygon[k + 1]]);
                }
            }
            _ => {}
        }
    }

    if out_normals.iter().all(Option::is_some) {
        mesh.normals = out_normals.into_iter().flatten().map(|n| n.normalize_or_zero()).collect();
    } else {
        tracing::debug!(mesh = name, "OBJ lacks complete normals, generating");
        mesh.compute_normals();
    }
    Ok(mesh)
}

fn parse_error(line: usize, message: impl Into<String>) -> MeshError {
    MeshError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_vec3<'a>(mut fields: impl Iterator<Item = &'a str>, line: usize) -> Result<Vec3, MeshError> {
    let mut v = [0.0f32; 3];
    for c in &mut v {
        let field = fields
            .next()
            .ok_or_else(|| parse_error(line, "expected three coordinates"))?;
        *c = field
            .parse()
            .map_err(|_| parse_error(line, format!("invalid number `{field}`")))?;
    }
    Ok(Vec3::from_array(v))
}

/// Parse one `f` corner into zero-based (position, normal) indices.
fn parse_corner(
    field: &str,
    position_count: usize,
    normal_count: usize,
    line: usize,
) -> Result<(usize, Option<usize>), MeshError> {
    let mut parts = field.split('/');
    let vi = parts
        .next()
        .ok_or_else(|| parse_error(line, "empty face corner"))?;
    let vi = resolve(vi, position_count, line)?;
    let _texcoord = parts.next();
    let ni = match parts.next() {
        Some(n) if !n.is_empty() => Some(resolve(n, normal_count, line)?),
        _ => None,
    };
    Ok((vi, ni))
}

fn resolve(field: &str, count: usize, line: usize) -> Result<usize, MeshError> {
    let raw: i64 = field
        .parse()
        .map_err(|_| parse_error(line, format!("invalid index `{field}`")))?;
    let index = match raw {
        0 => None,
        r if r > 0 => Some(r as usize - 1),
        r => count.checked_sub(r.unsigned_abs() as usize),
    };
    match index {
        Some(i) if i < count => Ok(i),
        _ => Err(parse_error(
            line,
            format!("index {raw} out of range (have {count})"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# unit quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1 4//1
";

    #[test]
    fn quad_is_fan_triangulated() {
        let mesh = parse_obj("quad", QUAD).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert!(mesh.normals.iter().all(|n| *n == Vec3::Z));
    }

    #[test]
    fn negative_indices_and_texcoords() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf -3/1 -2/1 -1/1\n";
        let mesh = parse_obj("tri", src).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.positions[2], Vec3::new(0.0, 1.0, 0.0));
        // No normals in the file: generated from winding.
        assert_eq!(mesh.normals, vec![Vec3::Z; 3]);
    }

    #[test]
    fn corners_with_distinct_normals_are_split() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\nvn 0 0 1\nvn 0 1 0\n\
                   f 1//1 2//1 3//1\nf 1//2 4//2 2//2\n";
        let mesh = parse_obj("split", src).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn out_of_range_index_reports_line() {
        let src = "v 0 0 0\nv 1 0 0\nf 1 2 3\n";
        let err = parse_obj("bad", src).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 3, .. }));
    }

    #[test]
    fn malformed_vertex_is_rejected() {
        let err = parse_obj("bad", "v 0 zero 0\n").unwrap_err();
        assert!(err.to_string().contains("zero"));
    }

    #[test]
    fn empty_source_has_no_triangles() {
        let mesh = parse_obj("empty", "").unwrap();
        assert_eq!(mesh.triangle_count(), 0);
    }
}
