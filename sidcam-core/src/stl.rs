/// STL parser for binary and ASCII formats
use nom::{
    bytes::complete::{tag, take, take_till},
    character::complete::{multispace0, multispace1},
    multi::{count, many0},
    number::complete::{float, le_f32, le_u32},
    sequence::{preceded, tuple},
    IResult,
};

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, MeshResult};
use crate::geometry::{Mesh, Triangle};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> MeshResult<Mesh> {
    if data.len() < HEADER_LEN + 4 {
        return Err(MeshError::Parse("file too small to be a valid STL".to_string()));
    }

    let (body, triangle_count) = binary_header(data).map_err(binary_error)?;
    let triangle_count = triangle_count as usize;
    if body.len() < triangle_count * FACET_LEN {
        return Err(MeshError::Parse(format!(
            "header declares {triangle_count} triangles but only {} bytes follow",
            body.len()
        )));
    }

    let (_, triangles) = count(binary_facet, triangle_count)(body).map_err(binary_error)?;
    let mut mesh = Mesh::with_capacity(triangles.len());
    for triangle in triangles {
        mesh.add_triangle(triangle);
    }
    Ok(mesh)
}

fn binary_error(err: nom::Err<nom::error::Error<&[u8]>>) -> MeshError {
    MeshError::Parse(format!("malformed binary STL: {:?}", err.map_input(<[u8]>::len)))
}

fn binary_header(input: &[u8]) -> IResult<&[u8], u32> {
    preceded(take(HEADER_LEN), le_u32)(input)
}

fn le_vector3(input: &[u8]) -> IResult<&[u8], (f32, f32, f32)> {
    tuple((le_f32, le_f32, le_f32))(input)
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    let (input, (nx, ny, nz)) = le_vector3(input)?;
    let (input, corners) = count(le_vector3, 3)(input)?;
    // attribute byte count
    let (input, _) = take(2usize)(input)?;

    let corner = |(x, y, z): (f32, f32, f32)| Point3::new(x, y, z);
    let triangle = Triangle::from_positions(corner(corners[0]), corner(corners[1]), corner(corners[2]));
    Ok((input, with_file_normal(triangle, (nx, ny, nz))))
}

/// Use the facet normal stored in the file unless it is zero, in which case
/// the winding normal is kept.
fn with_file_normal(mut triangle: Triangle, normal: (f32, f32, f32)) -> Triangle {
    if normal != (0.0, 0.0, 0.0) {
        let normal = Vector3::new(normal.0, normal.1, normal.2);
        for vertex in &mut triangle.vertices {
            vertex.normal = normal;
        }
    }
    triangle
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> MeshResult<Mesh> {
    match parse_ascii_stl_impl(input) {
        Ok((_, mesh)) => Ok(mesh),
        Err(e) => Err(MeshError::Parse(format!("malformed ASCII STL: {e:?}"))),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Mesh> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    // optional solid name, up to end of line
    let (input, _) = take_till(|c| c == '\n')(input)?;
    let (input, triangles) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;

    let mut mesh = Mesh::with_capacity(triangles.len());
    for triangle in triangles {
        mesh.add_triangle(triangle);
    }

    Ok((input, mesh))
}

fn parse_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, v3) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, with_file_normal(Triangle::from_positions(v1, v2, v3), normal)))
}

fn parse_vertex(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    let (input, (x, y, z)) = parse_vector3(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn parse_vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, (x, y, z)))
}

/// Detect and parse STL data (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> MeshResult<Mesh> {
    // binary files may also start with "solid", so fall through on failure
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(mesh) = parse_ascii_stl(text) {
                return Ok(mesh);
            }
        }
    }

    parse_binary_stl(data)
}
