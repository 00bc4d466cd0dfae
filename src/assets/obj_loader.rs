use bevy::{
    asset::{io::Reader, AssetLoader, LoadContext},
    prelude::*,
    render::{render_asset::RenderAssetUsages, render_resource::PrimitiveTopology},
};
use thiserror::Error;

/// Loads Wavefront `.obj` files as a single triangle-list `Mesh`
#[derive(Default)]
pub struct ObjLoader;

#[derive(Error, Debug)]
pub enum ObjError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("model has no faces")]
    Empty,
}

impl AssetLoader for ObjLoader {
    type Asset = Mesh;
    type Settings = ();
    type Error = ObjError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &(),
        load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let text = String::from_utf8(bytes)?;

        let mesh = parse_obj(&text)?;
        debug!(
            "Loaded {} ({} vertices)",
            load_context.path().display(),
            mesh.count_vertices()
        );
        Ok(mesh)
    }

    fn extensions(&self) -> &[&str] {
        &["obj"]
    }
}

/// One corner of a face: position index plus optional uv and normal indices
#[derive(Debug, Clone, Copy, PartialEq)]
struct Corner {
    position: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

#[derive(Default)]
struct ObjBuffers {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    out_positions: Vec<[f32; 3]>,
    out_normals: Vec<[f32; 3]>,
    out_uvs: Vec<[f32; 2]>,
    all_have_normals: bool,
}

pub fn parse_obj(text: &str) -> Result<Mesh, ObjError> {
    let mut buffers = ObjBuffers {
        all_have_normals: true,
        ..default()
    };

    for (number, raw) in text.lines().enumerate() {
        let line_no = number + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };
        let args: Vec<&str> = parts.collect();

        match keyword {
            "v" => {
                let [x, y, z] = parse_floats::<3>(&args, line_no)?;
                buffers.positions.push(Vec3::new(x, y, z));
            }
            "vn" => {
                let [x, y, z] = parse_floats::<3>(&args, line_no)?;
                buffers.normals.push(Vec3::new(x, y, z));
            }
            "vt" => {
                // v is optional for 1D textures
                let [u] = parse_floats::<1>(&args, line_no)?;
                let v = match args.get(1) {
                    Some(_) => parse_floats::<2>(&args, line_no)?[1],
                    None => 0.0,
                };
                // OBJ puts v=0 at the bottom of the image
                buffers.uvs.push(Vec2::new(u, 1.0 - v));
            }
            "f" => {
                if args.len() < 3 {
                    return Err(parse_error(line_no, "face needs at least 3 vertices"));
                }
                let corners = args
                    .iter()
                    .map(|token| parse_corner(token, &buffers, line_no))
                    .collect::<Result<Vec<_>, _>>()?;

                // Triangulate fan
                for i in 1..corners.len() - 1 {
                    for corner in [corners[0], corners[i], corners[i + 1]] {
                        buffers.emit(corner);
                    }
                }
            }
            // Groups, materials and smoothing are irrelevant for a single-material mesh
            _ => {}
        }
    }

    if buffers.out_positions.is_empty() {
        return Err(ObjError::Empty);
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, buffers.out_positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, buffers.out_uvs);

    if buffers.all_have_normals {
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, buffers.out_normals);
    } else {
        mesh.compute_flat_normals();
    }

    Ok(mesh)
}

impl ObjBuffers {
    fn emit(&mut self, corner: Corner) {
        self.out_positions
            .push(self.positions[corner.position].to_array());
        self.out_uvs.push(
            corner
                .uv
                .map(|i| self.uvs[i].to_array())
                .unwrap_or([0.0, 0.0]),
        );
        match corner.normal {
            Some(i) => self.out_normals.push(self.normals[i].to_array()),
            None => self.all_have_normals = false,
        }
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> ObjError {
    ObjError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_floats<const N: usize>(args: &[&str], line: usize) -> Result<[f32; N], ObjError> {
    if args.len() < N {
        return Err(parse_error(
            line,
            format!("expected {N} numbers, found {}", args.len()),
        ));
    }
    let mut values = [0.0; N];
    for (value, arg) in values.iter_mut().zip(args) {
        *value = arg
            .parse::<f32>()
            .map_err(|_| parse_error(line, format!("invalid number '{arg}'")))?;
    }
    Ok(values)
}

/// Resolve a 1-based (or negative, relative) OBJ index into `0..len`
fn resolve_index(token: &str, len: usize, line: usize) -> Result<usize, ObjError> {
    let raw = token
        .parse::<i64>()
        .map_err(|_| parse_error(line, format!("invalid index '{token}'")))?;
    let resolved = if raw < 0 {
        len as i64 + raw
    } else {
        raw - 1
    };
    if raw == 0 || resolved < 0 || resolved >= len as i64 {
        return Err(parse_error(
            line,
            format!("index {raw} out of range (have {len})"),
        ));
    }
    Ok(resolved as usize)
}

fn parse_corner(token: &str, buffers: &ObjBuffers, line: usize) -> Result<Corner, ObjError> {
    let mut fields = token.split('/');
    let position = resolve_index(fields.next().unwrap_or(""), buffers.positions.len(), line)?;
    let uv = match fields.next() {
        Some(t) if !t.is_empty() => Some(resolve_index(t, buffers.uvs.len(), line)?),
        _ => None,
    };
    let normal = match fields.next() {
        Some(t) if !t.is_empty() => Some(resolve_index(t, buffers.normals.len(), line)?),
        _ => None,
    };
    Ok(Corner {
        position,
        uv,
        normal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::mesh::VertexAttributeValues;

    fn positions(mesh: &Mesh) -> Vec<[f32; 3]> {
        match mesh.attribute(Mesh::ATTRIBUTE_POSITION) {
            Some(VertexAttributeValues::Float32x3(values)) => values.clone(),
            other => panic!("unexpected positions: {other:?}"),
        }
    }

    fn normals(mesh: &Mesh) -> Vec<[f32; 3]> {
        match mesh.attribute(Mesh::ATTRIBUTE_NORMAL) {
            Some(VertexAttributeValues::Float32x3(values)) => values.clone(),
            other => panic!("unexpected normals: {other:?}"),
        }
    }

    const QUAD: &str = "\
# unit quad on the floor
v 0 0 0
v 1 0 0
v 1 0 1
v 0 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 1 0
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_quad_is_fan_triangulated() {
        let mesh = parse_obj(QUAD).unwrap();
        let positions = positions(&mesh);

        assert_eq!(positions.len(), 6);
        assert_eq!(positions[0], [0.0, 0.0, 0.0]);
        assert_eq!(positions[1], [1.0, 0.0, 0.0]);
        assert_eq!(positions[2], [1.0, 0.0, 1.0]);
        assert_eq!(positions[3], [0.0, 0.0, 0.0]);
        assert_eq!(positions[5], [0.0, 0.0, 1.0]);
        assert!(normals(&mesh).iter().all(|n| *n == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_uvs_are_flipped_vertically() {
        let mesh = parse_obj(QUAD).unwrap();
        let Some(VertexAttributeValues::Float32x2(uvs)) = mesh.attribute(Mesh::ATTRIBUTE_UV_0)
        else {
            panic!("missing uvs");
        };
        assert_eq!(uvs[0], [0.0, 1.0]);
        assert_eq!(uvs[2], [1.0, 0.0]);
    }

    #[test]
    fn test_negative_indices() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        assert_eq!(
            positions(&mesh),
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
        );
    }

    #[test]
    fn test_missing_normals_and_uvs_get_filled_in() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        // Counter-clockwise in XY faces +Z
        for normal in normals(&mesh) {
            assert!(Vec3::from(normal).abs_diff_eq(Vec3::Z, 1e-5));
        }
        let Some(VertexAttributeValues::Float32x2(uvs)) = mesh.attribute(Mesh::ATTRIBUTE_UV_0)
        else {
            panic!("missing uvs");
        };
        assert_eq!(uvs.len(), 3);
    }

    #[test]
    fn test_position_normal_form() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n").unwrap();
        assert_eq!(normals(&mesh).len(), 3);
    }

    #[test]
    fn test_position_uv_form_keeps_uvs_and_computes_normals() {
        let mesh = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1 2/2 3/3\n",
        )
        .unwrap();

        let Some(VertexAttributeValues::Float32x2(uvs)) = mesh.attribute(Mesh::ATTRIBUTE_UV_0)
        else {
            panic!("missing uvs");
        };
        assert_eq!(uvs, &vec![[0.0, 1.0], [1.0, 1.0], [0.0, 0.0]]);

        let normals = normals(&mesh);
        assert_eq!(normals.len(), 3);
        for normal in normals {
            assert!(Vec3::from(normal).abs_diff_eq(Vec3::Z, 1e-5));
        }
    }

    #[test]
    fn test_out_of_range_index_reports_line() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\n\nf 1 2 3\n").unwrap_err();
        assert!(matches!(err, ObjError::Parse { line: 4, .. }));

        let err = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").unwrap_err();
        assert!(matches!(err, ObjError::Parse { line: 4, .. }));
    }

    #[test]
    fn test_malformed_numbers() {
        let err = parse_obj("v 0 zero 0\n").unwrap_err();
        assert!(matches!(err, ObjError::Parse { line: 1, .. }));

        let err = parse_obj("v 0 0\n").unwrap_err();
        assert!(matches!(err, ObjError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_degenerate_face_rejected() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap_err();
        assert!(matches!(err, ObjError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_no_faces_is_empty() {
        assert!(matches!(parse_obj("v 0 0 0\n"), Err(ObjError::Empty)));
        assert!(matches!(parse_obj(""), Err(ObjError::Empty)));
    }

    #[test]
    fn test_unknown_statements_are_ignored() {
        let text = "mtllib board.mtl\no board\ng top\ns off\nusemtl black\n\
                    v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        assert_eq!(positions(&parse_obj(text).unwrap()).len(), 3);
    }
}
