//! In-memory scene document standing in for the host's object and
//! material tables. Every pipeline stage receives it explicitly.

use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::cli::GenerationMode;
use crate::errors::AssistError;

pub mod nodes;

pub use nodes::{Node, NodeLink, NodeTree, Socket, SocketValue, MATERIAL_OUTPUT, PRINCIPLED_BSDF, TEX_IMAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObjectKind {
    Mesh,
    Curve,
    Light,
    Camera,
    Empty,
    Text,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Mesh => "MESH",
            ObjectKind::Curve => "CURVE",
            ObjectKind::Light => "LIGHT",
            ObjectKind::Camera => "CAMERA",
            ObjectKind::Empty => "EMPTY",
            ObjectKind::Text => "TEXT",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything the scene summary can describe.
pub trait Positionable {
    fn display_name(&self) -> &str;
    fn type_tag(&self) -> &str;
    fn position(&self) -> [f64; 3];
}

/// A shading node as seen by the node-graph summary.
pub trait HasInputSockets {
    fn display_name(&self) -> &str;
    fn type_tag(&self) -> String;
    fn label(&self) -> &str;
    fn position(&self) -> [f64; 2];
    fn input_sockets(&self) -> &[Socket];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    #[serde(default)]
    pub location: [f64; 3],
    #[serde(default)]
    pub material_slots: Vec<String>,
}

impl Positionable for SceneObject {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn type_tag(&self) -> &str {
        self.kind.as_str()
    }

    fn position(&self) -> [f64; 3] {
        self.location
    }
}

impl HasInputSockets for Node {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn type_tag(&self) -> String {
        Node::type_tag(self)
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn position(&self) -> [f64; 2] {
        self.location
    }

    fn input_sockets(&self) -> &[Socket] {
        &self.inputs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    #[serde(default)]
    pub use_nodes: bool,
    #[serde(default)]
    pub node_tree: NodeTree,
}

impl Material {
    /// Switch the material to node shading. An empty graph gets the host's
    /// default surface (principled BSDF wired to the output).
    pub fn enable_nodes(&mut self) {
        if self.use_nodes {
            return;
        }
        self.use_nodes = true;
        if self.node_tree.nodes.is_empty() {
            self.node_tree = NodeTree::default_surface();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResource {
    pub name: String,
    pub filepath: String,
}

/// Add-on properties stored on the scene, shared between operator runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddonProps {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub mode: GenerationMode,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub texture_prompt: String,
    #[serde(default)]
    pub adjust_prompt: String,
    #[serde(default)]
    pub generated_material_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_api_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub objects: Vec<SceneObject>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub images: Vec<ImageResource>,
    #[serde(default)]
    pub active_object: Option<String>,
    #[serde(default)]
    pub props: AddonProps,
}

/// `base`, or `base.001`, `base.002`, ... whichever is free first.
pub fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}.{n:03}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

impl Scene {
    /// Read a scene document. A missing file is an empty scene.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "scene file missing, starting empty");
            return Ok(Scene::default());
        }
        let s = fs::read_to_string(path)?;
        serde_json::from_str(&s).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    pub fn require_object_mut(&mut self, name: &str) -> Result<&mut SceneObject, AssistError> {
        self.object_mut(name)
            .ok_or_else(|| AssistError::lookup(format!("object '{name}' not found")))
    }

    pub fn active_object(&self) -> Option<&SceneObject> {
        self.active_object.as_deref().and_then(|n| self.object(n))
    }

    pub fn set_active(&mut self, name: &str) -> Result<(), AssistError> {
        if self.object(name).is_none() {
            return Err(AssistError::lookup(format!("object '{name}' not found")));
        }
        self.active_object = Some(name.to_string());
        Ok(())
    }

    /// Add an object; the new object becomes active, as in the host.
    pub fn add_object(&mut self, name: &str, kind: ObjectKind, location: [f64; 3]) -> String {
        let name = unique_name(name, |n| self.object(n).is_some());
        self.objects.push(SceneObject {
            name: name.clone(),
            kind,
            location,
            material_slots: Vec::new(),
        });
        self.active_object = Some(name.clone());
        name
    }

    pub fn remove_object(&mut self, name: &str) -> Result<SceneObject, AssistError> {
        let idx = self
            .objects
            .iter()
            .position(|o| o.name == name)
            .ok_or_else(|| AssistError::lookup(format!("object '{name}' not found")))?;
        if self.active_object.as_deref() == Some(name) {
            self.active_object = None;
        }
        Ok(self.objects.remove(idx))
    }

    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    pub fn material_mut(&mut self, name: &str) -> Option<&mut Material> {
        self.materials.iter_mut().find(|m| m.name == name)
    }

    pub fn new_material(&mut self, name: &str) -> String {
        let name = unique_name(name, |n| self.material(n).is_some());
        self.materials.push(Material {
            name: name.clone(),
            use_nodes: false,
            node_tree: NodeTree::default(),
        });
        name
    }

    /// Name of the active object's active (first) material slot.
    pub fn active_material_name(&self) -> Option<&str> {
        self.active_object()
            .and_then(|o| o.material_slots.first())
            .map(String::as_str)
    }

    pub fn active_material(&self) -> Option<&Material> {
        self.active_material_name().and_then(|n| self.material(n))
    }

    /// Material addressed by name, or the active material when `name` is None.
    pub fn target_material_mut(&mut self, name: Option<&str>) -> Result<&mut Material, AssistError> {
        let name = match name {
            Some(n) => n.to_string(),
            None => self
                .active_material_name()
                .ok_or_else(|| AssistError::lookup("active object has no material"))?
                .to_string(),
        };
        self.material_mut(&name)
            .ok_or_else(|| AssistError::lookup(format!("material '{name}' not found")))
    }

    /// Register an image file with the scene and return its resource name.
    pub fn load_image(&mut self, filepath: &Path) -> String {
        let base = filepath
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Image".to_string());
        let name = unique_name(&base, |n| self.images.iter().any(|i| i.name == n));
        self.images.push(ImageResource {
            name: name.clone(),
            filepath: filepath.display().to_string(),
        });
        name
    }

    /// Put `material` into the object's first slot, or append a slot when
    /// the object has none.
    pub fn assign_material(&mut self, object: &str, material: &str) -> Result<(), AssistError> {
        if self.material(material).is_none() {
            return Err(AssistError::lookup(format!("material '{material}' not found")));
        }
        let obj = self.require_object_mut(object)?;
        match obj.material_slots.first_mut() {
            Some(slot) => *slot = material.to_string(),
            None => obj.material_slots.push(material.to_string()),
        }
        Ok(())
    }
}
