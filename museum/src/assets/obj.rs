//! Wavefront OBJ decoding: geometry statements only, materials are ignored.

use bevy::math::{Vec2, Vec3};

use super::TriangleSoup;
use crate::error::MeshParseError;

#[derive(Clone, Copy)]
struct Corner {
    position: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

/// Decodes `v`/`vt`/`vn`/`f` statements into a flat triangle list.
/// Polygons are fan-triangulated; negative indices count back from the end.
pub fn parse_obj(text: &str) -> Result<TriangleSoup, MeshParseError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut uvs: Vec<Vec2> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut soup = TriangleSoup::default();
    let mut any_uv = false;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => positions.push(parse_vec3(&mut tokens, line_no)?),
            Some("vn") => normals.push(parse_vec3(&mut tokens, line_no)?),
            Some("vt") => {
                let u = parse_f32(tokens.next(), line_no)?;
                let v = parse_f32(tokens.next(), line_no)?;
                uvs.push(Vec2::new(u, v));
            }
            Some("f") => {
                let corners = tokens
                    .map(|token| {
                        parse_corner(token, positions.len(), uvs.len(), normals.len(), line_no)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    return Err(malformed(line_no, "face needs at least three vertices"));
                }
                for i in 1..corners.len() - 1 {
                    let tri = [corners[0], corners[i], corners[i + 1]];
                    let points = tri.map(|c| positions[c.position]);
                    let normal = shared_normal(&tri, &normals);
                    let tex = tri.map(|c| c.uv.map(|i| uvs[i]));
                    any_uv |= tex.iter().any(Option::is_some);
                    soup.push_triangle(points, normal);
                    soup.push_uvs(tex.map(|t| t.unwrap_or(Vec2::ZERO)));
                }
            }
            _ => {}
        }
    }

    if !any_uv {
        soup.uvs = None;
    }
    soup.non_empty()
}

/// Averages the corner normals when every corner has one.
fn shared_normal(tri: &[Corner; 3], normals: &[Vec3]) -> Option<Vec3> {
    let mut sum = Vec3::ZERO;
    for corner in tri {
        sum += normals[corner.normal?];
    }
    Some(sum)
}

fn parse_corner(
    token: &str,
    position_count: usize,
    uv_count: usize,
    normal_count: usize,
    line: usize,
) -> Result<Corner, MeshParseError> {
    let mut parts = token.split('/');
    let position = resolve_index(parts.next(), position_count, line)?
        .ok_or_else(|| malformed(line, "face corner without a position index"))?;
    let uv = resolve_index(parts.next(), uv_count, line)?;
    let normal = resolve_index(parts.next(), normal_count, line)?;
    Ok(Corner {
        position,
        uv,
        normal,
    })
}

/// OBJ indices are 1-based; negative values are relative to the current count.
fn resolve_index(
    raw: Option<&str>,
    count: usize,
    line: usize,
) -> Result<Option<usize>, MeshParseError> {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let value: i64 = raw
        .parse()
        .map_err(|_| malformed(line, &format!("bad index {raw:?}")))?;
    let resolved = match value {
        0 => None,
        v if v > 0 => Some(v as usize - 1),
        v => (count as i64 + v).try_into().ok(),
    };
    match resolved {
        Some(index) if index < count => Ok(Some(index)),
        _ => Err(malformed(line, &format!("index {value} out of range"))),
    }
}

fn parse_vec3<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<Vec3, MeshParseError> {
    Ok(Vec3::new(
        parse_f32(tokens.next(), line)?,
        parse_f32(tokens.next(), line)?,
        parse_f32(tokens.next(), line)?,
    ))
}

fn parse_f32(token: Option<&str>, line: usize) -> Result<f32, MeshParseError> {
    token
        .ok_or_else(|| malformed(line, "missing component"))?
        .parse()
        .map_err(|_| malformed(line, "not a number"))
}

fn malformed(line: usize, reason: &str) -> MeshParseError {
    MeshParseError::Malformed {
        line,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# a unit quad
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl gray
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn quad_is_fan_triangulated() {
        let soup = parse_obj(QUAD).unwrap();

        assert_eq!(soup.triangle_count(), 2);
        assert_eq!(soup.positions[3], [0.0, 0.0, 0.0]);
        assert_eq!(soup.positions[5], [0.0, 1.0, 0.0]);
        assert_eq!(soup.uvs.as_ref().map(Vec::len), Some(6));
        assert!(soup.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn negative_indices_are_relative() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let soup = parse_obj(text).unwrap();

        assert_eq!(soup.positions, vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert!(soup.uvs.is_none());
    }

    #[test]
    fn missing_normals_are_computed_per_face() {
        let text = "v 0 0 0\nv 0 0 1\nv 1 0 0\nf 1 2 3\n";
        let soup = parse_obj(text).unwrap();

        assert_eq!(soup.normals[0], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn out_of_range_index_is_malformed() {
        let text = "v 0 0 0\nv 1 0 0\nf 1 2 3\n";
        let err = parse_obj(text).unwrap_err();

        assert!(matches!(err, MeshParseError::Malformed { line: 3, .. }));
    }

    #[test]
    fn degenerate_face_is_rejected() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap_err();
        assert!(matches!(err, MeshParseError::Malformed { line: 3, .. }));
    }

    #[test]
    fn file_without_faces_is_empty() {
        let err = parse_obj("v 0 0 0\n").unwrap_err();
        assert!(matches!(err, MeshParseError::Empty));
    }
}
