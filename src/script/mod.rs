//! Scene scripts: the only thing a generated response can make the
//! pipeline do. A script is a JSON list of operations; anything else is
//! rejected before the scene is touched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::errors::AssistError;
use crate::scene::{ObjectKind, Scene, SocketValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    AddObject,
    SetLocation,
    DeleteObject,
    SetActive,
    SetInput,
    SetLabel,
    AddNode,
    LinkNodes,
    AssignMaterial,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::AddObject => "add_object",
            OpKind::SetLocation => "set_location",
            OpKind::DeleteObject => "delete_object",
            OpKind::SetActive => "set_active",
            OpKind::SetInput => "set_input",
            OpKind::SetLabel => "set_label",
            OpKind::AddNode => "add_node",
            OpKind::LinkNodes => "link_nodes",
            OpKind::AssignMaterial => "assign_material",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op")]
#[serde(rename_all = "snake_case")]
pub enum SceneOp {
    AddObject {
        name: String,
        kind: ObjectKind,
        #[serde(default)]
        location: [f64; 3],
    },
    SetLocation {
        object: String,
        location: [f64; 3],
    },
    DeleteObject {
        object: String,
    },
    SetActive {
        object: String,
    },
    SetInput {
        node: String,
        input: String,
        value: SocketValue,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        material: Option<String>,
    },
    SetLabel {
        node: String,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        material: Option<String>,
    },
    AddNode {
        node_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        location: [f64; 2],
        #[serde(default, skip_serializing_if = "Option::is_none")]
        material: Option<String>,
    },
    LinkNodes {
        from_node: String,
        from_socket: String,
        to_node: String,
        to_socket: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        material: Option<String>,
    },
    AssignMaterial {
        object: String,
        material: String,
    },
}

impl SceneOp {
    pub fn kind(&self) -> OpKind {
        match self {
            SceneOp::AddObject { .. } => OpKind::AddObject,
            SceneOp::SetLocation { .. } => OpKind::SetLocation,
            SceneOp::DeleteObject { .. } => OpKind::DeleteObject,
            SceneOp::SetActive { .. } => OpKind::SetActive,
            SceneOp::SetInput { .. } => OpKind::SetInput,
            SceneOp::SetLabel { .. } => OpKind::SetLabel,
            SceneOp::AddNode { .. } => OpKind::AddNode,
            SceneOp::LinkNodes { .. } => OpKind::LinkNodes,
            SceneOp::AssignMaterial { .. } => OpKind::AssignMaterial,
        }
    }

    /// One-line description for previews and logs.
    pub fn describe(&self) -> String {
        match self {
            SceneOp::AddObject { name, kind, location } => {
                format!("add {kind} '{name}' at {location:?}")
            }
            SceneOp::SetLocation { object, location } => format!("move '{object}' to {location:?}"),
            SceneOp::DeleteObject { object } => format!("delete '{object}'"),
            SceneOp::SetActive { object } => format!("make '{object}' active"),
            SceneOp::SetInput { node, input, value, .. } => {
                format!("set {node}.{input} = {}", crate::context::socket_value_text(Some(value)))
            }
            SceneOp::SetLabel { node, label, .. } => format!("label '{node}' as '{label}'"),
            SceneOp::AddNode { node_type, name, .. } => match name {
                Some(n) => format!("add node {node_type} '{n}'"),
                None => format!("add node {node_type}"),
            },
            SceneOp::LinkNodes { from_node, from_socket, to_node, to_socket, .. } => {
                format!("link {from_node}.{from_socket} -> {to_node}.{to_socket}")
            }
            SceneOp::AssignMaterial { object, material } => {
                format!("assign '{material}' to '{object}'")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub ops: Vec<SceneOp>,
}

impl Script {
    /// Accepts a JSON array of ops, `{"ops": [...]}`, or a single op object.
    pub fn parse(code: &str) -> Result<Self, AssistError> {
        let value: Value = serde_json::from_str(code)
            .map_err(|e| AssistError::execution(format!("script is not valid JSON: {e}")))?;
        let ops_value = match value {
            Value::Array(_) => value,
            Value::Object(mut map) if map.contains_key("ops") => map.remove("ops").unwrap_or(Value::Null),
            Value::Object(map) if map.contains_key("op") => Value::Array(vec![Value::Object(map)]),
            _ => {
                return Err(AssistError::execution(
                    "script must be a list of operations",
                ))
            }
        };
        let ops: Vec<SceneOp> = serde_json::from_value(ops_value)
            .map_err(|e| AssistError::execution(format!("invalid operation: {e}")))?;
        Ok(Script { ops })
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub applied: usize,
    pub total: usize,
}

/// Run the ops in order. Stops at the first failure; earlier ops stay
/// applied.
pub fn execute(scene: &mut Scene, script: &Script) -> Result<ExecutionOutcome, AssistError> {
    let total = script.ops.len();
    for (i, op) in script.ops.iter().enumerate() {
        tracing::debug!(index = i + 1, op = %op.kind(), "applying {}", op.describe());
        apply_op(scene, op).map_err(|e| {
            AssistError::execution(format!(
                "operation {} of {} ({}) failed after {} applied: {}",
                i + 1,
                total,
                op.kind(),
                i,
                e
            ))
        })?;
    }
    Ok(ExecutionOutcome { applied: total, total })
}

fn apply_op(scene: &mut Scene, op: &SceneOp) -> Result<(), AssistError> {
    match op {
        SceneOp::AddObject { name, kind, location } => {
            scene.add_object(name, *kind, *location);
        }
        SceneOp::SetLocation { object, location } => {
            scene.require_object_mut(object)?.location = *location;
        }
        SceneOp::DeleteObject { object } => {
            scene.remove_object(object)?;
        }
        SceneOp::SetActive { object } => scene.set_active(object)?,
        SceneOp::SetInput { node, input, value, material } => {
            let mat = scene.target_material_mut(material.as_deref())?;
            let socket = mat
                .node_tree
                .node_mut(node)
                .ok_or_else(|| AssistError::lookup(format!("node '{node}' not found")))?
                .input_mut(input)
                .ok_or_else(|| AssistError::lookup(format!("node '{node}' has no input '{input}'")))?;
            socket.default_value = Some(coerce_value(socket.default_value.as_ref(), value)?);
        }
        SceneOp::SetLabel { node, label, material } => {
            let mat = scene.target_material_mut(material.as_deref())?;
            mat.node_tree
                .node_mut(node)
                .ok_or_else(|| AssistError::lookup(format!("node '{node}' not found")))?
                .label = label.clone();
        }
        SceneOp::AddNode { node_type, name, location, material } => {
            let mat = scene.target_material_mut(material.as_deref())?;
            if !mat.use_nodes {
                return Err(AssistError::execution(format!("material '{}' does not use nodes", mat.name)));
            }
            mat.node_tree.add_node(node_type, name.as_deref(), *location);
        }
        SceneOp::LinkNodes { from_node, from_socket, to_node, to_socket, material } => {
            let mat = scene.target_material_mut(material.as_deref())?;
            mat.node_tree.link(from_node, from_socket, to_node, to_socket)?;
        }
        SceneOp::AssignMaterial { object, material } => scene.assign_material(object, material)?,
    }
    Ok(())
}

fn value_kind(v: &SocketValue) -> &'static str {
    match v {
        SocketValue::Bool(_) => "bool",
        SocketValue::Int(_) => "int",
        SocketValue::Float(_) => "float",
        SocketValue::Vector(_) => "sequence",
        SocketValue::Text(_) => "string",
    }
}

/// Fit a scripted value to the socket's current type the way the host
/// would accept it: ints widen to floats, RGB gains an alpha of 1. Any
/// other type change is rejected, as is a socket without a default.
fn coerce_value(current: Option<&SocketValue>, new: &SocketValue) -> Result<SocketValue, AssistError> {
    let Some(current) = current else {
        return Err(AssistError::execution("input has no default value to set"));
    };
    match (current, new) {
        (SocketValue::Float(_), SocketValue::Float(_))
        | (SocketValue::Int(_), SocketValue::Int(_))
        | (SocketValue::Bool(_), SocketValue::Bool(_))
        | (SocketValue::Text(_), SocketValue::Text(_)) => Ok(new.clone()),
        (SocketValue::Float(_), SocketValue::Int(i)) => Ok(SocketValue::Float(*i as f64)),
        (SocketValue::Vector(cur), SocketValue::Vector(v)) => {
            if v.len() == cur.len() {
                Ok(new.clone())
            } else if cur.len() == 4 && v.len() == 3 {
                let mut rgba = v.clone();
                rgba.push(1.0);
                Ok(SocketValue::Vector(rgba))
            } else {
                Err(AssistError::execution(format!(
                    "expected a sequence of {} values, got {}",
                    cur.len(),
                    v.len()
                )))
            }
        }
        (SocketValue::Vector(cur), _) => Err(AssistError::execution(format!(
            "expected a sequence of {} values, got {}",
            cur.len(),
            value_kind(new)
        ))),
        _ => Err(AssistError::execution(format!(
            "expected {}, got {}",
            value_kind(current),
            value_kind(new)
        ))),
    }
}
