use serde::{Deserialize, Serialize};

use crate::errors::AssistError;

pub const PRINCIPLED_BSDF: &str = "Principled BSDF";
pub const MATERIAL_OUTPUT: &str = "Material Output";
pub const TEX_IMAGE: &str = "ShaderNodeTexImage";

/// Default value carried by an input socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SocketValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Vector(Vec<f64>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Socket {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<SocketValue>,
}

fn default_true() -> bool {
    true
}

impl Socket {
    pub fn new(name: &str, default_value: Option<SocketValue>) -> Self {
        Self { name: name.to_string(), enabled: true, default_value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    /// Host idname, e.g. `ShaderNodeBsdfPrincipled`.
    pub node_type: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub location: [f64; 2],
    #[serde(default)]
    pub inputs: Vec<Socket>,
    #[serde(default)]
    pub outputs: Vec<String>,
    /// Image resource bound to an image-texture node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Node {
    /// Upper snake-case type tag derived from the idname
    /// (`ShaderNodeTexImage` -> `TEX_IMAGE`).
    pub fn type_tag(&self) -> String {
        let short = self.node_type.strip_prefix("ShaderNode").unwrap_or(&self.node_type);
        let mut tag = String::with_capacity(short.len() + 4);
        let mut prev: Option<char> = None;
        for ch in short.chars() {
            if ch.is_ascii_uppercase() && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit()) {
                tag.push('_');
            }
            tag.push(ch.to_ascii_uppercase());
            prev = Some(ch);
        }
        tag
    }

    pub fn input(&self, name: &str) -> Option<&Socket> {
        self.inputs.iter().find(|s| s.name == name)
    }

    pub fn input_mut(&mut self, name: &str) -> Option<&mut Socket> {
        self.inputs.iter_mut().find(|s| s.name == name)
    }

    /// Build a node of `node_type` with the sockets the host would give it.
    pub fn from_template(node_type: &str, name: String, location: [f64; 2]) -> Self {
        let (inputs, outputs): (Vec<Socket>, Vec<&str>) = match node_type {
            "ShaderNodeBsdfPrincipled" => (
                vec![
                    Socket::new("Base Color", Some(SocketValue::Vector(vec![0.8, 0.8, 0.8, 1.0]))),
                    Socket::new("Metallic", Some(SocketValue::Float(0.0))),
                    Socket::new("Roughness", Some(SocketValue::Float(0.5))),
                    Socket::new("IOR", Some(SocketValue::Float(1.5))),
                    Socket::new("Alpha", Some(SocketValue::Float(1.0))),
                    Socket::new("Normal", None),
                    Socket::new("Emission Color", Some(SocketValue::Vector(vec![1.0, 1.0, 1.0, 1.0]))),
                    Socket::new("Emission Strength", Some(SocketValue::Float(0.0))),
                ],
                vec!["BSDF"],
            ),
            "ShaderNodeOutputMaterial" => (
                vec![
                    Socket::new("Surface", None),
                    Socket::new("Volume", None),
                    Socket::new("Displacement", Some(SocketValue::Vector(vec![0.0, 0.0, 0.0]))),
                ],
                vec![],
            ),
            TEX_IMAGE => (vec![Socket::new("Vector", None)], vec!["Color", "Alpha"]),
            "ShaderNodeTexNoise" => (
                vec![
                    Socket::new("Vector", None),
                    Socket::new("Scale", Some(SocketValue::Float(5.0))),
                    Socket::new("Detail", Some(SocketValue::Float(2.0))),
                    Socket::new("Roughness", Some(SocketValue::Float(0.5))),
                ],
                vec!["Fac", "Color"],
            ),
            "ShaderNodeMixRGB" => (
                vec![
                    Socket::new("Fac", Some(SocketValue::Float(0.5))),
                    Socket::new("Color1", Some(SocketValue::Vector(vec![0.5, 0.5, 0.5, 1.0]))),
                    Socket::new("Color2", Some(SocketValue::Vector(vec![0.5, 0.5, 0.5, 1.0]))),
                ],
                vec!["Color"],
            ),
            "ShaderNodeValue" => (vec![], vec!["Value"]),
            _ => (vec![], vec![]),
        };
        Self {
            name,
            node_type: node_type.to_string(),
            label: String::new(),
            location,
            inputs,
            outputs: outputs.into_iter().map(String::from).collect(),
            image: None,
        }
    }
}

/// Display name the host gives a fresh node of `node_type`.
pub fn default_node_name(node_type: &str) -> String {
    match node_type {
        "ShaderNodeBsdfPrincipled" => PRINCIPLED_BSDF.to_string(),
        "ShaderNodeOutputMaterial" => MATERIAL_OUTPUT.to_string(),
        TEX_IMAGE => "Image Texture".to_string(),
        "ShaderNodeTexNoise" => "Noise Texture".to_string(),
        "ShaderNodeMixRGB" => "Mix".to_string(),
        other => other.strip_prefix("ShaderNode").unwrap_or(other).to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLink {
    pub from_node: String,
    pub from_socket: String,
    pub to_node: String,
    pub to_socket: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeTree {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<NodeLink>,
}

impl NodeTree {
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    pub fn is_linked(&self, node: &str, socket: &str) -> bool {
        self.links.iter().any(|l| l.to_node == node && l.to_socket == socket)
    }

    /// Add a node, suffixing the name (`.001`, ...) if it is taken.
    /// Returns the name the node actually received.
    pub fn add_node(&mut self, node_type: &str, name: Option<&str>, location: [f64; 2]) -> String {
        let base = name.map(str::to_string).unwrap_or_else(|| default_node_name(node_type));
        let name = super::unique_name(&base, |n| self.node(n).is_some());
        self.nodes.push(Node::from_template(node_type, name.clone(), location));
        name
    }

    /// Connect an output socket to an input socket. An input accepts one
    /// link, so an existing link into it is replaced.
    pub fn link(
        &mut self,
        from_node: &str,
        from_socket: &str,
        to_node: &str,
        to_socket: &str,
    ) -> Result<(), AssistError> {
        let from = self
            .node(from_node)
            .ok_or_else(|| AssistError::lookup(format!("node '{from_node}' not found")))?;
        if !from.outputs.iter().any(|o| o == from_socket) {
            return Err(AssistError::lookup(format!(
                "node '{from_node}' has no output '{from_socket}'"
            )));
        }
        let to = self
            .node(to_node)
            .ok_or_else(|| AssistError::lookup(format!("node '{to_node}' not found")))?;
        if to.input(to_socket).is_none() {
            return Err(AssistError::lookup(format!(
                "node '{to_node}' has no input '{to_socket}'"
            )));
        }
        self.links.retain(|l| !(l.to_node == to_node && l.to_socket == to_socket));
        self.links.push(NodeLink {
            from_node: from_node.to_string(),
            from_socket: from_socket.to_string(),
            to_node: to_node.to_string(),
            to_socket: to_socket.to_string(),
        });
        Ok(())
    }

    /// The graph a freshly node-enabled material starts with.
    pub fn default_surface() -> Self {
        let mut tree = NodeTree::default();
        tree.add_node("ShaderNodeBsdfPrincipled", None, [10.0, 300.0]);
        tree.add_node("ShaderNodeOutputMaterial", None, [300.0, 300.0]);
        tree.links.push(NodeLink {
            from_node: PRINCIPLED_BSDF.to_string(),
            from_socket: "BSDF".to_string(),
            to_node: MATERIAL_OUTPUT.to_string(),
            to_socket: "Surface".to_string(),
        });
        tree
    }
}
