//! STL decoding: binary and ASCII variants.

use std::io::Cursor;

use bevy::math::Vec3;
use byteorder::{LittleEndian, ReadBytesExt};

use super::TriangleSoup;
use crate::error::MeshParseError;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Decodes an STL file. A file is binary when its length matches the facet
/// count in its header, even if the header starts with `solid`.
pub fn parse_stl(bytes: &[u8]) -> Result<TriangleSoup, MeshParseError> {
    if let Some(count) = binary_facet_count(bytes) {
        if bytes.len() == HEADER_LEN + 4 + count * FACET_LEN {
            return parse_binary(bytes, count);
        }
    }
    if bytes.trim_ascii_start().starts_with(b"solid") {
        return parse_ascii(bytes);
    }
    match binary_facet_count(bytes) {
        Some(count) => Err(MeshParseError::Truncated {
            expected: HEADER_LEN + 4 + count * FACET_LEN,
            found: bytes.len(),
        }),
        None => Err(MeshParseError::Truncated {
            expected: HEADER_LEN + 4,
            found: bytes.len(),
        }),
    }
}

fn binary_facet_count(bytes: &[u8]) -> Option<usize> {
    let raw = bytes.get(HEADER_LEN..HEADER_LEN + 4)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize)
}

fn parse_binary(bytes: &[u8], count: usize) -> Result<TriangleSoup, MeshParseError> {
    let mut cursor = Cursor::new(&bytes[HEADER_LEN + 4..]);
    let mut soup = TriangleSoup::with_capacity(count);

    for _ in 0..count {
        let normal = read_vec3(&mut cursor)?;
        let a = read_vec3(&mut cursor)?;
        let b = read_vec3(&mut cursor)?;
        let c = read_vec3(&mut cursor)?;
        let _attribute = cursor.read_u16::<LittleEndian>()?;
        soup.push_triangle([a, b, c], Some(normal));
    }

    soup.non_empty()
}

fn read_vec3(cursor: &mut Cursor<&[u8]>) -> std::io::Result<Vec3> {
    Ok(Vec3::new(
        cursor.read_f32::<LittleEndian>()?,
        cursor.read_f32::<LittleEndian>()?,
        cursor.read_f32::<LittleEndian>()?,
    ))
}

fn parse_ascii(bytes: &[u8]) -> Result<TriangleSoup, MeshParseError> {
    let text = String::from_utf8_lossy(bytes);
    let mut soup = TriangleSoup::default();
    let mut normal: Option<Vec3> = None;
    let mut corners: Vec<Vec3> = Vec::with_capacity(3);

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("facet") => {
                if tokens.next() != Some("normal") {
                    return Err(malformed(line_no, "expected `facet normal`"));
                }
                normal = Some(parse_xyz(tokens, line_no)?);
                corners.clear();
            }
            Some("vertex") => {
                if corners.len() == 3 {
                    return Err(malformed(line_no, "more than three vertices in facet"));
                }
                corners.push(parse_xyz(tokens, line_no)?);
            }
            Some("endfacet") => {
                let [a, b, c] = corners[..] else {
                    return Err(malformed(line_no, "facet needs exactly three vertices"));
                };
                soup.push_triangle([a, b, c], normal.take());
                corners.clear();
            }
            _ => {}
        }
    }

    soup.non_empty()
}

fn parse_xyz<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<Vec3, MeshParseError> {
    let mut next = || -> Result<f32, MeshParseError> {
        tokens
            .next()
            .ok_or_else(|| malformed(line, "missing coordinate"))?
            .parse::<f32>()
            .map_err(|err| malformed(line, &err.to_string()))
    };
    Ok(Vec3::new(next()?, next()?, next()?))
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

    fn binary_stl(header: &[u8], facets: &[[f32; 12]]) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_LEN];
        bytes[..header.len()].copy_from_slice(header);
        bytes.extend_from_slice(&(facets.len() as u32).to_le_bytes());
        for facet in facets {
            for value in facet {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
            bytes.extend_from_slice(&0u16.to_le_bytes());
        }
        bytes
    }

    const UNIT_TRIANGLE: [f32; 12] = [
        0.0, 0.0, 1.0, // normal
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        0.0, 1.0, 0.0,
    ];

    #[test]
    fn binary_triangle_is_decoded() {
        let soup = parse_stl(&binary_stl(b"binary", &[UNIT_TRIANGLE])).unwrap();

        assert_eq!(soup.positions.len(), 3);
        assert_eq!(soup.positions[1], [1.0, 0.0, 0.0]);
        assert!(soup.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn binary_with_solid_header_is_not_treated_as_ascii() {
        let soup = parse_stl(&binary_stl(b"solid exported", &[UNIT_TRIANGLE])).unwrap();
        assert_eq!(soup.triangle_count(), 1);
    }

    #[test]
    fn zero_normals_are_recomputed_from_winding() {
        let mut facet = UNIT_TRIANGLE;
        facet[..3].copy_from_slice(&[0.0, 0.0, 0.0]);
        let soup = parse_stl(&binary_stl(b"", &[facet])).unwrap();

        assert_eq!(soup.normals[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn ascii_facets_are_decoded() {
        let text = "solid cube\n\
            facet normal 0 0 1\n\
              outer loop\n\
                vertex 0 0 0\n\
                vertex 1 0 0\n\
                vertex 0 1 0\n\
              endloop\n\
            endfacet\n\
            endsolid cube\n";
        let soup = parse_stl(text.as_bytes()).unwrap();

        assert_eq!(soup.triangle_count(), 1);
        assert_eq!(soup.positions[2], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn ascii_facet_with_two_vertices_is_malformed() {
        let text = "solid bad\nfacet normal 0 0 1\nvertex 0 0 0\nvertex 1 0 0\nendfacet\n";
        let err = parse_stl(text.as_bytes()).unwrap_err();

        assert!(matches!(err, MeshParseError::Malformed { line: 5, .. }));
    }

    #[test]
    fn truncated_binary_is_reported() {
        let mut bytes = binary_stl(b"", &[UNIT_TRIANGLE, UNIT_TRIANGLE]);
        bytes.truncate(bytes.len() - 10);

        let err = parse_stl(&bytes).unwrap_err();
        assert!(matches!(
            err,
            MeshParseError::Truncated {
                expected: 184,
                found: 174
            }
        ));
    }

    #[test]
    fn empty_solid_has_no_triangles() {
        let err = parse_stl(b"solid empty\nendsolid empty\n").unwrap_err();
        assert!(matches!(err, MeshParseError::Empty));
    }
}
