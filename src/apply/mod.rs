use fs_err as fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::errors::AssistError;
use crate::scene::{ObjectKind, Scene, PRINCIPLED_BSDF, TEX_IMAGE};
use crate::wire::GeneratedImage;

pub const GENERATED_MATERIAL: &str = "AI_Generated_Material";

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type.split(';').next().unwrap_or("").trim() {
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpeg",
    }
}

/// Write the image under `dir` so the scene can reference it by path.
pub fn persist_image(image: &GeneratedImage, dir: &Path) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.{}", Uuid::new_v4(), extension_for(&image.mime_type)));
    fs::write(&path, &image.bytes)?;
    Ok(path)
}

/// New material whose base color comes from an image-texture node bound to
/// `image_path`. The material name is remembered on the scene for
/// [`apply_generated_material`].
pub fn create_image_material(scene: &mut Scene, image_path: &Path) -> Result<String, AssistError> {
    let image = scene.load_image(image_path);
    let name = scene.new_material(GENERATED_MATERIAL);
    let mat = scene
        .material_mut(&name)
        .ok_or_else(|| AssistError::lookup(format!("material '{name}' not found")))?;
    mat.enable_nodes();
    bind_image_texture(&mut mat.node_tree, &image)?;
    scene.props.generated_material_name = name.clone();
    Ok(name)
}

/// Add an image-texture node for `image` and feed its color into the
/// principled BSDF. There is no fallback if that node is missing.
pub fn bind_image_texture(tree: &mut crate::scene::NodeTree, image: &str) -> Result<String, AssistError> {
    if tree.node(PRINCIPLED_BSDF).is_none() {
        return Err(AssistError::lookup(format!("node '{PRINCIPLED_BSDF}' not found")));
    }
    let tex = tree.add_node(TEX_IMAGE, None, [-300.0, 300.0]);
    if let Some(node) = tree.node_mut(&tex) {
        node.image = Some(image.to_string());
    }
    tree.link(&tex, "Color", PRINCIPLED_BSDF, "Base Color")?;
    Ok(tex)
}

/// Put the last generated material on the active mesh. Every check runs
/// before the scene is modified.
pub fn apply_generated_material(scene: &mut Scene) -> Result<String, AssistError> {
    let mat_name = scene.props.generated_material_name.clone();
    if mat_name.is_empty() || scene.material(&mat_name).is_none() {
        return Err(AssistError::lookup("No valid generated material found"));
    }
    let target = match scene.active_object() {
        Some(obj) if obj.kind == ObjectKind::Mesh => obj.name.clone(),
        _ => return Err(AssistError::lookup("No mesh object selected")),
    };
    scene.assign_material(&target, &mat_name)?;
    Ok(mat_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeTree;
    use bytes::Bytes;

    #[test]
    fn persist_uses_mime_extension() {
        let dir = tempfile::tempdir().unwrap();
        let image = GeneratedImage { bytes: Bytes::from_static(b"\x89PNG"), mime_type: "image/png".into() };
        let path = persist_image(&image, dir.path()).unwrap();
        assert_eq!(path.extension().unwrap(), "png");
        assert_eq!(fs::read(&path).unwrap(), b"\x89PNG");
    }

    #[test]
    fn creates_material_with_texture_into_base_color() {
        let mut scene = Scene::default();
        let name = create_image_material(&mut scene, Path::new("/tmp/tex.jpeg")).unwrap();
        assert_eq!(name, GENERATED_MATERIAL);
        assert_eq!(scene.props.generated_material_name, name);
        let tree = &scene.material(&name).unwrap().node_tree;
        let link = tree.links.iter().find(|l| l.to_socket == "Base Color").unwrap();
        assert_eq!(link.from_socket, "Color");
        assert_eq!(tree.node(&link.from_node).unwrap().image.as_deref(), Some("tex.jpeg"));

        let second = create_image_material(&mut scene, Path::new("/tmp/tex.jpeg")).unwrap();
        assert_eq!(second, "AI_Generated_Material.001");
        assert_eq!(scene.images[1].name, "tex.jpeg.001");
    }

    #[test]
    fn missing_principled_node_is_lookup_error() {
        let mut tree = NodeTree::default();
        let err = bind_image_texture(&mut tree, "img").unwrap_err();
        assert!(matches!(err, AssistError::Lookup(_)));
        assert!(tree.nodes.is_empty());
    }

    #[test]
    fn apply_without_generated_material_changes_nothing() {
        let mut scene = Scene::default();
        scene.add_object("Cube", ObjectKind::Mesh, [0.0; 3]);
        let before = scene.clone();
        let err = apply_generated_material(&mut scene).unwrap_err();
        assert_eq!(err.to_string(), "lookup error: No valid generated material found");
        assert_eq!(scene, before);
    }

    #[test]
    fn apply_to_non_mesh_changes_nothing() {
        let mut scene = Scene::default();
        create_image_material(&mut scene, Path::new("t.jpeg")).unwrap();
        scene.add_object("Sun", ObjectKind::Light, [0.0; 3]);
        let before = scene.clone();
        let err = apply_generated_material(&mut scene).unwrap_err();
        assert_eq!(err.to_string(), "lookup error: No mesh object selected");
        assert_eq!(scene, before);
    }

    #[test]
    fn apply_appends_or_replaces_first_slot() {
        let mut scene = Scene::default();
        scene.add_object("Cube", ObjectKind::Mesh, [0.0; 3]);
        let name = create_image_material(&mut scene, Path::new("t.jpeg")).unwrap();
        apply_generated_material(&mut scene).unwrap();
        assert_eq!(scene.object("Cube").unwrap().material_slots, vec![name.clone()]);

        let other = scene.new_material("Other");
        scene.object_mut("Cube").unwrap().material_slots = vec![other.clone(), other];
        apply_generated_material(&mut scene).unwrap();
        assert_eq!(scene.object("Cube").unwrap().material_slots[0], name);
        assert_eq!(scene.object("Cube").unwrap().material_slots.len(), 2);
    }

    #[test]
    fn apply_fails_when_material_was_removed() {
        let mut scene = Scene::default();
        scene.add_object("Cube", ObjectKind::Mesh, [0.0; 3]);
        create_image_material(&mut scene, Path::new("t.jpeg")).unwrap();
        scene.materials.clear();
        assert!(apply_generated_material(&mut scene).is_err());
    }
}
