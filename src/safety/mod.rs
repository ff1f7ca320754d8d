use crate::config::Config;
use crate::errors::AssistError;
use crate::script::{OpKind, Script};

/// Returns true if `kind` is on the allowlist.
pub fn op_is_allowed(kind: OpKind, allowlist: &[OpKind]) -> bool {
    allowlist.contains(&kind)
}

/// Reject the whole script before anything runs if it is too long or uses
/// an operation outside the allowlist.
pub fn validate_script(script: &Script, cfg: &Config) -> Result<(), AssistError> {
    if script.len() > cfg.max_ops {
        return Err(AssistError::execution(format!(
            "script has {} operations (limit {})",
            script.len(),
            cfg.max_ops
        )));
    }
    let denied: Vec<&str> = script
        .ops
        .iter()
        .map(|op| op.kind())
        .filter(|k| !op_is_allowed(*k, &cfg.op_allowlist))
        .map(|k| k.as_str())
        .collect();
    if !denied.is_empty() {
        return Err(AssistError::execution(format!(
            "operation not allowed: {} (allowlist: {:?})",
            denied.join(", "),
            cfg.op_allowlist.iter().map(OpKind::as_str).collect::<Vec<_>>()
        )));
    }
    Ok(())
}
