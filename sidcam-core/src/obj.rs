/// Wavefront OBJ parser (geometry only)
///
/// Reads `v` and `f` records. Texture coordinates, normals, groups and
/// material references are skipped; polygons are fan-triangulated and each
/// triangle gets its winding normal.
use nalgebra::Point3;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, i64 as parse_i64, space0, space1},
    combinator::{all_consuming, map, opt, recognize, rest},
    multi::separated_list1,
    number::complete::float,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use crate::error::{MeshError, MeshResult};
use crate::geometry::{Mesh, Triangle};

enum Record {
    Vertex(Point3<f32>),
    Face(Vec<i64>),
}

/// Parse OBJ text into a triangle mesh
pub fn parse_obj(input: &str) -> MeshResult<Mesh> {
    let mut positions: Vec<Point3<f32>> = Vec::new();
    let mut mesh = Mesh::new();

    for (line_no, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !(line.starts_with("v ") || line.starts_with("f ") || line.starts_with("v\t") || line.starts_with("f\t")) {
            continue;
        }

        let record = match parse_record(line) {
            Ok((_, record)) => record,
            Err(e) => {
                return Err(MeshError::Parse(format!(
                    "line {}: {e:?}",
                    line_no + 1
                )))
            }
        };

        match record {
            Record::Vertex(p) => positions.push(p),
            Record::Face(indices) => {
                if indices.len() < 3 {
                    return Err(MeshError::Parse(format!(
                        "line {}: face needs at least 3 vertices",
                        line_no + 1
                    )));
                }
                let corners = indices
                    .iter()
                    .map(|&i| resolve_index(i, positions.len()).map(|idx| positions[idx]))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| {
                        MeshError::Parse(format!("line {}: vertex index out of range", line_no + 1))
                    })?;
                for k in 1..corners.len() - 1 {
                    mesh.add_triangle(Triangle::from_positions(corners[0], corners[k], corners[k + 1]));
                }
            }
        }
    }

    Ok(mesh)
}

/// OBJ indices are 1-based; negative indices count back from the last vertex.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = match index {
        i if i > 0 => i - 1,
        i if i < 0 => len + i,
        _ => return None,
    };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

/// One full `v` or `f` line; anything after the record other than a
/// trailing `#` comment is an error.
fn parse_record(input: &str) -> IResult<&str, Record> {
    all_consuming(terminated(record, pair(space0, opt(pair(char('#'), rest)))))(input)
}

fn record(input: &str) -> IResult<&str, Record> {
    alt((
        map(preceded(pair(tag("v"), space1), vertex_coords), Record::Vertex),
        map(preceded(pair(tag("f"), space1), face_indices), Record::Face),
    ))(input)
}

fn vertex_coords(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, (x, _, y, _, z)) = tuple((float, space1, float, space1, float))(input)?;
    // optional fourth (w) component is ignored
    let (input, _) = opt(preceded(space1, float))(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn face_indices(input: &str) -> IResult<&str, Vec<i64>> {
    let (input, indices) = separated_list1(space1, face_vertex)(input)?;
    let (input, _) = space0(input)?;
    Ok((input, indices))
}

/// `v`, `v/vt`, `v//vn` or `v/vt/vn`; only `v` is kept.
fn face_vertex(input: &str) -> IResult<&str, i64> {
    let (input, index) = parse_i64(input)?;
    let (input, _) = opt(tuple((
        char('/'),
        opt(signed_digits),
        opt(pair(char('/'), opt(signed_digits))),
    )))(input)?;
    Ok((input, index))
}

fn signed_digits(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(char('-')), digit1))(input)
}
