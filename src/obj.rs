//! Wavefront OBJ ingestion for the terrain and the landing pad.
//!
//! Parsing is delegated to `tobj`; its output is converted into an
//! [`ObjScene`], a neutral model with shared attribute arrays, triangle faces
//! and a material table. The two ingestion paths then work on that model
//! alone:
//!
//! - [`terrain_mesh`] flattens every face into one buffer, one vertex per
//!   index slot, with no deduplication.
//! - [`pad_parts`] groups faces by material id and builds one sub-mesh per
//!   group, colored by the material's diffuse RGB.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::error::{Result, ViewerError};
use crate::geometry::MeshData;

/// Normal substituted when a face corner has none.
pub const DEFAULT_NORMAL: Vec3 = Vec3::Z;

/// Color for sub-meshes whose material id does not resolve.
pub const DEFAULT_MATERIAL_COLOR: Vec3 = Vec3::ONE;

/// Material id used for faces without a material.
pub const NO_MATERIAL: i32 = -1;

/// One triangle corner: indices into the scene's attribute arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjIndex {
    pub position: u32,
    pub normal: Option<u32>,
    pub texcoord: Option<u32>,
}

/// A named group of triangles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjShape {
    pub name: String,
    /// Three corners per triangle.
    pub corners: Vec<ObjIndex>,
    /// One material id per triangle, [`NO_MATERIAL`] when unassigned.
    pub material_ids: Vec<i32>,
}

impl ObjShape {
    pub fn face_count(&self) -> usize {
        self.corners.len() / 3
    }
}

/// The parts of an MTL material the viewer uses.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjMaterial {
    pub name: String,
    pub diffuse: Option<Vec3>,
    pub diffuse_texture: Option<String>,
}

/// Parsed OBJ content with attributes shared across all shapes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjScene {
    /// Flat `x, y, z` triples.
    pub positions: Vec<f32>,
    /// Flat `x, y, z` triples.
    pub normals: Vec<f32>,
    /// Flat `u, v` pairs.
    pub texcoords: Vec<f32>,
    pub shapes: Vec<ObjShape>,
    pub materials: Vec<ObjMaterial>,
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: false,
        ..Default::default()
    }
}

impl ObjScene {
    /// Parses an OBJ file and its material library.
    ///
    /// A missing or broken MTL file is not an error; the scene simply has no
    /// materials and every face falls back to the default color.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let (models, materials) =
            tobj::load_obj(path, &load_options()).map_err(|source| ViewerError::ObjParse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_tobj(path, models, materials)
    }

    /// Parses OBJ text from a reader, resolving `mtllib` through `load_mtl`.
    pub fn load_buf<R, F>(label: &str, reader: &mut R, load_mtl: F) -> Result<Self>
    where
        R: BufRead,
        F: Fn(&Path) -> tobj::MTLLoadResult,
    {
        let path = PathBuf::from(label);
        let (models, materials) = tobj::load_obj_buf(reader, &load_options(), load_mtl)
            .map_err(|source| ViewerError::ObjParse {
                path: path.clone(),
                source,
            })?;
        Self::from_tobj(&path, models, materials)
    }

    fn from_tobj(
        path: &Path,
        models: Vec<tobj::Model>,
        materials: std::result::Result<Vec<tobj::Material>, tobj::LoadError>,
    ) -> Result<Self> {
        let materials = materials.unwrap_or_else(|err| {
            log::warn!("Failed to load materials for {}: {err}", path.display());
            Vec::new()
        });

        let mut scene = ObjScene {
            materials: materials
                .into_iter()
                .map(|m| ObjMaterial {
                    name: m.name,
                    diffuse: m.diffuse.map(Vec3::from),
                    diffuse_texture: m.diffuse_texture.filter(|t| !t.is_empty()),
                })
                .collect(),
            ..Default::default()
        };

        for model in models {
            let mesh = model.mesh;
            if let Some(&arity) = mesh.face_arities.iter().find(|&&a| a != 3) {
                return Err(ViewerError::Triangulation {
                    shape: model.name,
                    arity,
                });
            }

            // tobj keeps attributes per model; rebase them onto the shared arrays.
            let position_base = (scene.positions.len() / 3) as u32;
            let normal_base = (scene.normals.len() / 3) as u32;
            let texcoord_base = (scene.texcoords.len() / 2) as u32;
            scene.positions.extend_from_slice(&mesh.positions);
            scene.normals.extend_from_slice(&mesh.normals);
            scene.texcoords.extend_from_slice(&mesh.texcoords);

            let corners: Vec<ObjIndex> = mesh
                .indices
                .iter()
                .enumerate()
                .map(|(slot, &p)| ObjIndex {
                    position: position_base + p,
                    normal: mesh.normal_indices.get(slot).map(|&n| normal_base + n),
                    texcoord: mesh.texcoord_indices.get(slot).map(|&t| texcoord_base + t),
                })
                .collect();

            let material = mesh
                .material_id
                .and_then(|id| i32::try_from(id).ok())
                .unwrap_or(NO_MATERIAL);

            scene.shapes.push(ObjShape {
                name: model.name,
                material_ids: vec![material; corners.len() / 3],
                corners,
            });
        }

        Ok(scene)
    }

    /// Whether the file carries any texture coordinates at all.
    pub fn has_texcoords(&self) -> bool {
        !self.texcoords.is_empty()
    }

    fn position(&self, i: u32) -> Vec3 {
        let i = i as usize * 3;
        match self.positions.get(i..i + 3) {
            Some(p) => Vec3::new(p[0], p[1], p[2]),
            None => Vec3::ZERO,
        }
    }

    fn normal(&self, i: Option<u32>) -> Vec3 {
        i.and_then(|i| {
            let i = i as usize * 3;
            self.normals.get(i..i + 3)
        })
        .map_or(DEFAULT_NORMAL, |n| Vec3::new(n[0], n[1], n[2]))
    }

    fn texcoord(&self, i: Option<u32>) -> [f32; 2] {
        i.and_then(|i| {
            let i = i as usize * 2;
            self.texcoords.get(i..i + 2)
        })
        .map_or([0.0, 0.0], |t| [t[0], t[1]])
    }

    fn push_corner(&self, mesh: &mut MeshData, corner: &ObjIndex) {
        mesh.push_vertex(
            self.position(corner.position),
            self.normal(corner.normal),
            self.texcoord(corner.texcoord),
        );
    }

    /// Diffuse color of a material id, or white when the id is unassigned,
    /// out of range, or the material has no diffuse entry.
    pub fn material_color(&self, id: i32) -> Vec3 {
        usize::try_from(id)
            .ok()
            .and_then(|id| self.materials.get(id))
            .and_then(|m| m.diffuse)
            .unwrap_or(DEFAULT_MATERIAL_COLOR)
    }

    /// Candidate texture files in search order: the first material texture,
    /// resolved against `dir`, then each fallback name in `dir`.
    pub fn texture_candidates(&self, dir: &Path, fallbacks: &[String]) -> Vec<PathBuf> {
        self.materials
            .iter()
            .find_map(|m| m.diffuse_texture.as_deref())
            .map(|name| dir.join(name))
            .into_iter()
            .chain(fallbacks.iter().map(|name| dir.join(name)))
            .collect()
    }
}

/// Flattens every face of every shape into one buffer.
///
/// Indices run `0, 1, 2, ...`; nothing is shared between faces. Fails when the
/// result would be empty.
pub fn terrain_mesh(scene: &ObjScene, path: &Path) -> Result<MeshData> {
    let mut mesh = MeshData::default();
    for shape in &scene.shapes {
        for corner in &shape.corners {
            let index = mesh.vertex_count();
            scene.push_corner(&mut mesh, corner);
            mesh.indices.push(index);
        }
    }

    if mesh.is_empty() {
        return Err(ViewerError::EmptyTerrain {
            path: path.to_path_buf(),
        });
    }
    Ok(mesh)
}

/// One landing-pad sub-mesh: all faces sharing a material.
#[derive(Clone, Debug, PartialEq)]
pub struct PadPart {
    pub material_id: i32,
    pub color: Vec3,
    pub mesh: MeshData,
}

/// Partitions faces by material id, one [`PadPart`] per id in ascending order.
///
/// Faces from different shapes that share a material end up in the same part
/// with indices local to it.
pub fn pad_parts(scene: &ObjScene) -> Vec<PadPart> {
    let mut groups: BTreeMap<i32, MeshData> = BTreeMap::new();

    for shape in &scene.shapes {
        for (face, &material_id) in shape.corners.chunks_exact(3).zip(&shape.material_ids) {
            let mesh = groups.entry(material_id).or_default();
            let base = mesh.vertex_count();
            for corner in face {
                scene.push_corner(mesh, corner);
            }
            mesh.push_triangle(base, base + 1, base + 2);
        }
    }

    groups
        .into_iter()
        .map(|(material_id, mesh)| PadPart {
            material_id,
            color: scene.material_color(material_id),
            mesh,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAD_MTL: &str = "\
newmtl metal
Kd 0.5 0.5 0.6
newmtl paint
Kd 1.0 0.8 0.0
map_Kd stripes.png
";

    const PAD_OBJ: &str = "\
mtllib pad.mtl
v 0 0 0
v 1 0 0
v 1 0 1
v 0 0 1
v 0 1 0
vn 0 1 0
vt 0 0
vt 1 1
usemtl metal
f 1/1/1 2/2/1 3/2/1
usemtl paint
f 1/1/1 3/2/1 4/1/1
usemtl metal
f 1/1/1 4/1/1 5/1/1
";

    fn parse(obj: &str, mtl: &'static str) -> ObjScene {
        ObjScene::load_buf("pad.obj", &mut obj.as_bytes(), |_| {
            tobj::load_mtl_buf(&mut mtl.as_bytes())
        })
        .unwrap()
    }

    fn triangle(material_id: i32, normal: Option<u32>, texcoord: Option<u32>) -> ObjShape {
        ObjShape {
            name: "tri".into(),
            corners: (0..3)
                .map(|p| ObjIndex {
                    position: p,
                    normal,
                    texcoord,
                })
                .collect(),
            material_ids: vec![material_id],
        }
    }

    fn flat_scene(shapes: Vec<ObjShape>) -> ObjScene {
        ObjScene {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals: vec![0.0, 1.0, 0.0],
            texcoords: vec![0.25, 0.75],
            shapes,
            materials: vec![ObjMaterial {
                name: "red".into(),
                diffuse: Some(Vec3::new(1.0, 0.0, 0.0)),
                diffuse_texture: None,
            }],
        }
    }

    #[test]
    fn terrain_indices_are_monotonic() {
        let scene = parse(PAD_OBJ, PAD_MTL);
        let mesh = terrain_mesh(&scene, Path::new("pad.obj")).unwrap();

        assert_eq!(mesh.index_count(), 9);
        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.indices, (0..9).collect::<Vec<u32>>());
        assert!(scene.has_texcoords());
    }

    #[test]
    fn missing_attributes_use_defaults() {
        let scene = flat_scene(vec![triangle(NO_MATERIAL, None, None)]);
        let mesh = terrain_mesh(&scene, Path::new("t.obj")).unwrap();

        for v in &mesh.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
            assert_eq!(v.uv, [0.0, 0.0]);
        }
        assert_eq!(mesh.vertices[1].position, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn present_attributes_are_copied() {
        let scene = flat_scene(vec![triangle(0, Some(0), Some(0))]);
        let mesh = terrain_mesh(&scene, Path::new("t.obj")).unwrap();
        assert_eq!(mesh.vertices[2].normal, [0.0, 1.0, 0.0]);
        assert_eq!(mesh.vertices[2].uv, [0.25, 0.75]);
    }

    #[test]
    fn empty_terrain_is_an_error() {
        let scene = ObjScene::default();
        let err = terrain_mesh(&scene, Path::new("empty.obj")).unwrap_err();
        assert!(matches!(err, ViewerError::EmptyTerrain { .. }));
    }

    #[test]
    fn pad_groups_by_material() {
        let scene = parse(PAD_OBJ, PAD_MTL);
        let parts = pad_parts(&scene);

        assert_eq!(parts.len(), 2);
        let metal = &parts[0];
        assert_eq!(metal.mesh.index_count(), 6);
        assert_eq!(metal.mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(metal.color, Vec3::new(0.5, 0.5, 0.6));

        let paint = &parts[1];
        assert_eq!(paint.mesh.indices, vec![0, 1, 2]);
        assert_eq!(paint.color, Vec3::new(1.0, 0.8, 0.0));
    }

    #[test]
    fn unassigned_and_unknown_materials_are_white() {
        let scene = flat_scene(vec![
            triangle(NO_MATERIAL, None, None),
            triangle(7, None, None),
            triangle(0, None, None),
        ]);
        let parts = pad_parts(&scene);

        let ids: Vec<i32> = parts.iter().map(|p| p.material_id).collect();
        assert_eq!(ids, vec![-1, 0, 7]);
        assert_eq!(parts[0].color, Vec3::ONE);
        assert_eq!(parts[1].color, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(parts[2].color, Vec3::ONE);
    }

    #[test]
    fn quads_are_triangulated() {
        let obj = "v 0 0 0\nv 1 0 0\nv 1 0 1\nv 0 0 1\nf 1 2 3 4\n";
        let scene = ObjScene::load_buf("quad.obj", &mut obj.as_bytes(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })
        .unwrap();

        assert_eq!(scene.shapes.len(), 1);
        assert_eq!(scene.shapes[0].face_count(), 2);
        assert!(scene.materials.is_empty());
        assert!(!scene.has_texcoords());
    }

    #[test]
    fn texture_search_order() {
        let scene = parse(PAD_OBJ, PAD_MTL);
        let fallbacks = vec!["a.jpg".to_string(), "b.png".to_string()];
        let dir = Path::new("assets");

        assert_eq!(
            scene.texture_candidates(dir, &fallbacks),
            vec![
                dir.join("stripes.png"),
                dir.join("a.jpg"),
                dir.join("b.png")
            ]
        );

        let bare = ObjScene::default();
        assert_eq!(bare.texture_candidates(dir, &fallbacks).len(), 2);
    }

    #[test]
    fn reingesting_is_bitwise_stable() {
        let a = terrain_mesh(&parse(PAD_OBJ, PAD_MTL), Path::new("pad.obj")).unwrap();
        let b = terrain_mesh(&parse(PAD_OBJ, PAD_MTL), Path::new("pad.obj")).unwrap();
        let bits = |m: &MeshData| m.as_floats().iter().map(|f| f.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }
}
