use std::fs;
use std::io;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::error::Result;
use crate::mesh::{Color, Mesh, MeshTriangle, Point, Triangle};

/// One element of the JSON array. Field order is the key order of the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangleRecord {
    pub points: [[i32; 3]; 3],
    pub color_rgb: [u8; 3],
}

impl From<&MeshTriangle> for TriangleRecord {
    fn from(mt: &MeshTriangle) -> Self {
        TriangleRecord {
            points: mt.points(),
            color_rgb: mt.color.channels(),
        }
    }
}

impl From<&TriangleRecord> for MeshTriangle {
    fn from(r: &TriangleRecord) -> Self {
        let [a, b, c] = r.points;
        let [red, green, blue] = r.color_rgb;

        MeshTriangle {
            triangle: Triangle::new(
                Point::new(a[0], a[1]),
                Point::new(b[0], b[1]),
                Point::new(c[0], c[1]),
            ),
            color: Color::new(red, green, blue),
        }
    }
}

/// Pretty printed JSON array, 4 spaces of indentation.
pub fn write_json(w: impl Write, mesh: &Mesh) -> Result<()> {
    let records = mesh.iter().map(TriangleRecord::from).collect::<Vec<_>>();

    let mut ser = serde_json::Serializer::with_formatter(w, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut ser)?;

    Ok(())
}

pub fn read_json(r: impl Read) -> Result<Mesh> {
    let records: Vec<TriangleRecord> = serde_json::from_reader(r)?;

    Ok(Mesh {
        triangles: records.iter().map(MeshTriangle::from).collect(),
    })
}

/// One `x1,y1,z1,x2,y2,z2,x3,y3,z3,R,G,B` line per triangle.
pub fn write_text(w: &mut impl Write, mesh: &Mesh) -> io::Result<()> {
    for mt in mesh.iter() {
        let [a, b, c] = mt.points();
        let Color { r, g, b: blue } = mt.color;

        writeln!(
            w,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            a[0], a[1], a[2], b[0], b[1], b[2], c[0], c[1], c[2], r, g, blue
        )?;
    }

    Ok(())
}

/// Serialize both formats in memory first so that a failure never leaves a
/// half written pair of files behind.
pub fn write_files(mesh: &Mesh, json_path: &Path, text_path: &Path) -> Result<()> {
    let mut json = vec![];
    write_json(&mut json, mesh)?;
    json.push(b'\n');

    let mut text = vec![];
    write_text(&mut text, mesh)?;

    fs::write(json_path, json)?;
    fs::write(text_path, text)?;

    info!(
        json = %json_path.display(),
        text = %text_path.display(),
        triangles = mesh.len(),
        "mesh written"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mesh() -> Mesh {
        Mesh {
            triangles: vec![
                MeshTriangle {
                    triangle: Triangle::new(Point::new(0, 0), Point::new(10, 0), Point::new(0, 10)),
                    color: Color::new(255, 0, 0),
                },
                MeshTriangle {
                    triangle: Triangle::new(Point::new(10, 0), Point::new(10, 10), Point::new(0, 10)),
                    color: Color::new(1, 22, 133),
                },
            ],
        }
    }

    #[test]
    fn test_json_layout() {
        let mut out = vec![];
        write_json(&mut out, &sample_mesh()).unwrap();
        let json = String::from_utf8(out).unwrap();

        assert!(json.starts_with("[\n    {\n        \"points\": ["));
        assert!(json.find("\"points\"").unwrap() < json.find("\"color_rgb\"").unwrap());

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value[1],
            serde_json::json!({
                "points": [[10, 0, 0], [10, 10, 0], [0, 10, 0]],
                "color_rgb": [1, 22, 133]
            })
        );
    }

    #[test]
    fn test_json_round_trip() {
        let mesh = sample_mesh();

        let mut out = vec![];
        write_json(&mut out, &mesh).unwrap();
        let back = read_json(out.as_slice()).unwrap();

        assert_eq!(back, mesh);
        for (a, b) in back.iter().zip(mesh.iter()) {
            assert_eq!(a.triangle.vertices, b.triangle.vertices);
        }
    }

    #[test]
    fn test_text_lines() {
        let mut out = vec![];
        write_text(&mut out, &sample_mesh()).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "0,0,0,10,0,0,0,10,0,255,0,0\n10,0,0,10,10,0,0,10,0,1,22,133\n"
        );
    }

    #[test]
    fn test_empty_mesh() {
        let mut json = vec![];
        write_json(&mut json, &Mesh::default()).unwrap();
        assert_eq!(json, b"[]");

        let mut text = vec![];
        write_text(&mut text, &Mesh::default()).unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn test_write_files() {
        let dir = std::env::temp_dir().join(format!("mosaic-serialize-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let (json, text) = (dir.join("mesh.json"), dir.join("mesh.txt"));

        write_files(&sample_mesh(), &json, &text).unwrap();

        let back = read_json(fs::File::open(&json).unwrap()).unwrap();
        assert_eq!(back, sample_mesh());
        assert_eq!(fs::read_to_string(&text).unwrap().lines().count(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }
}
