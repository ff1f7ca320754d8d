use crate::script::OpKind;
use crate::wire::{Persona, RequestPayload};

/// Example line shown to the model for each operation.
fn op_example(kind: OpKind) -> &'static str {
    match kind {
        OpKind::AddObject => r#"{"op":"add_object","name":"Cube","kind":"MESH","location":[0,0,0]}   kind: MESH | CURVE | LIGHT | CAMERA | EMPTY | TEXT"#,
        OpKind::SetLocation => r#"{"op":"set_location","object":"Cube","location":[1,2,3]}"#,
        OpKind::SetActive => r#"{"op":"set_active","object":"Cube"}"#,
        OpKind::DeleteObject => r#"{"op":"delete_object","object":"Cube"}"#,
        OpKind::SetInput => r#"{"op":"set_input","node":"Principled BSDF","input":"Roughness","value":0.2}"#,
        OpKind::SetLabel => r#"{"op":"set_label","node":"Principled BSDF","label":"Surface"}"#,
        OpKind::AddNode => r#"{"op":"add_node","node_type":"ShaderNodeTexNoise","name":"Noise","location":[-300,200]}"#,
        OpKind::LinkNodes => r#"{"op":"link_nodes","from_node":"Noise","from_socket":"Color","to_node":"Principled BSDF","to_socket":"Base Color"}"#,
        OpKind::AssignMaterial => r#"{"op":"assign_material","object":"Cube","material":"Metal"}"#,
    }
}

/// Script grammar listing only the operations the executor will accept.
fn script_reference(allowed: &[OpKind]) -> String {
    let mut out = String::from(
        "Scene Script Reference:\n\
- Output a JSON array of operations inside a single ```json fenced block. Nothing outside the block is executed.\n\
- Each operation is an object with an \"op\" field. Only these operations are available:\n",
    );
    for kind in allowed {
        out.push_str("  • ");
        out.push_str(op_example(*kind));
        out.push('\n');
    }
    out.push_str(
        "- Node operations act on the active object's active material unless a \"material\" field names another one.\n\
- Vector values are arrays of numbers; colors are [r, g, b, a] in 0..1. A value must match the input's type.\n\
- Operations run in order; an object created earlier in the script may be referenced later by name.",
    );
    out
}

pub fn system_prompt_steps() -> String {
    "You are a technical assistant for 3D scene scripting. Break down the modeling task into clear, logical steps that directly correspond to scripted operations. Each step should describe exactly what to do using modeling terminology (e.g., \"Add a cube\", \"Scale it on the X axis by 2\", \"Apply a subdivision modifier\"). Do not include any UI instructions or user-facing language. Do not mention the application itself. Just list the modeling steps in sequence for an AI model to turn into code. Give me a clean output without any formatting".to_string()
}

pub fn system_prompt_direct(allowed: &[OpKind]) -> String {
    format!(
        "You are a helpful assistant that writes scene scripts for a 3D application. Modify or add to the scene without deleting existing objects.\n\n{}",
        script_reference(allowed)
    )
}

/// The step breakdown never sees the scene.
pub fn build_steps(prompt: &str) -> RequestPayload {
    RequestPayload {
        persona: Persona::StepDecomposition,
        system_instruction: system_prompt_steps(),
        context_summary: None,
        user_instruction: prompt.to_string(),
    }
}

pub fn build_direct(prompt: &str, scene_summary: &str, allowed: &[OpKind]) -> RequestPayload {
    RequestPayload {
        persona: Persona::DirectCodegen,
        system_instruction: system_prompt_direct(allowed),
        context_summary: Some(scene_summary.to_string()),
        user_instruction: prompt.to_string(),
    }
}

/// Node adjustment goes out as one user message embedding the node info,
/// the instruction and the constraints.
pub fn build_adjust(prompt: &str, node_summary: &str, allowed: &[OpKind]) -> RequestPayload {
    let user = format!(
r#"You are an expert in 3D material scripting. Given this shader node info:

{node_summary}

And this instruction:

{prompt}

Generate a scene script that modifies the active material's nodes.

Constraints:
- Modify existing nodes only (e.g., change Roughness, Metallic, Base Color).
- Do not create new materials.
- Address nodes by the names shown above; omit the "material" field.
- Output only the fenced script. No explanation.

{reference}"#,
        reference = script_reference(allowed)
    );
    RequestPayload {
        persona: Persona::NodeAdjustment,
        system_instruction: String::new(),
        context_summary: None,
        user_instruction: user,
    }
}
