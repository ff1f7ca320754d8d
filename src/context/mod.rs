//! Text summaries of scene state handed to the model. Regenerated for
//! every request; nothing here is cached.

use crate::scene::{HasInputSockets, NodeTree, Positionable, Scene, SocketValue};

pub const NO_NODE_MATERIAL: &str = "No valid material with nodes found.";

pub fn round_to(v: f64, places: usize) -> f64 {
    // The formatter rounds the exact binary value, ties to even.
    format!("{v:.places$}").parse().unwrap_or(v)
}

/// Shortest float form that always keeps a decimal point (`1.0`, `2.35`).
fn num(v: f64) -> String {
    format!("{:?}", v)
}

fn tuple(values: impl IntoIterator<Item = f64>) -> String {
    let parts: Vec<String> = values.into_iter().map(num).collect();
    format!("({})", parts.join(", "))
}

/// One `Name: .., Type: .., Location: (x, y, z)` line per object.
pub fn scene_summary<P: Positionable>(objects: &[P]) -> String {
    objects
        .iter()
        .map(|o| {
            format!(
                "Name: {}, Type: {}, Location: {}",
                o.display_name(),
                o.type_tag(),
                tuple(o.position().into_iter().map(|c| round_to(c, 2)))
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn socket_value_text(value: Option<&SocketValue>) -> String {
    match value {
        None => "None".to_string(),
        Some(SocketValue::Float(f)) => num(round_to(*f, 3)),
        Some(SocketValue::Int(i)) => i.to_string(),
        Some(SocketValue::Bool(b)) => (if *b { "True" } else { "False" }).to_string(),
        Some(SocketValue::Vector(v)) => tuple(v.iter().take(4).map(|c| round_to(*c, 3))),
        Some(SocketValue::Text(s)) => s.clone(),
    }
}

/// Stanza per node; only named, enabled inputs are listed and linked ones
/// say `Linked` instead of their default.
pub fn describe_nodes<N: HasInputSockets>(nodes: &[N], is_linked: impl Fn(&str, &str) -> bool) -> String {
    let mut out = String::new();
    for node in nodes {
        let [x, y] = node.position();
        out.push_str(&format!("\n--- Node: {} ---\n", node.display_name()));
        out.push_str(&format!(
            "Type: {}, Label: {}, Location: {}\n",
            node.type_tag(),
            node.label(),
            tuple([round_to(x, 2), round_to(y, 2)])
        ));
        for socket in node.input_sockets() {
            if socket.name.is_empty() || !socket.enabled {
                continue;
            }
            let value = if is_linked(node.display_name(), &socket.name) {
                "Linked".to_string()
            } else {
                socket_value_text(socket.default_value.as_ref())
            };
            out.push_str(&format!("  Input: {} = {}\n", socket.name, value));
        }
    }
    out
}

pub fn node_tree_summary(tree: &NodeTree) -> String {
    describe_nodes(&tree.nodes, |node, socket| tree.is_linked(node, socket))
}

/// Summary of the active object's active material, or the sentinel when
/// there is nothing node-based to describe.
pub fn node_graph_summary(scene: &Scene) -> String {
    match scene.active_material() {
        Some(mat) if mat.use_nodes => node_tree_summary(&mat.node_tree),
        _ => NO_NODE_MATERIAL.to_string(),
    }
}
