//! Per-transaction request/response artifacts on disk.

use fs_err as fs;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};

use crate::wire::Tx;

#[derive(Debug, Clone, Copy, Default)]
pub struct SaveFlags {
    pub request: bool,
    pub response: bool,
}

#[derive(Debug)]
pub struct SavedPaths {
    pub dir: PathBuf,
    pub request: Option<PathBuf>,
    pub response: Option<PathBuf>,
}

pub fn tx_dir(root: &Path, tx: &Tx) -> PathBuf {
    root.join("tx").join(tx.id.to_string())
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    tx: &'a Tx,
    stage: &'a str,
    body: &'a T,
}

pub fn save_stage<Req: Serialize, Resp: Serialize>(
    root: &Path,
    tx: &Tx,
    stage: &str,
    req: &Req,
    resp: &Resp,
    flags: SaveFlags,
) -> anyhow::Result<SavedPaths> {
    let dir = tx_dir(root, tx);
    let mut request_path = None;
    let mut response_path = None;

    if flags.request || flags.response {
        fs::create_dir_all(&dir)?;
    }

    if flags.request {
        let p = dir.join(format!("{stage}.request.json"));
        fs::write(&p, to_string_pretty(&Envelope { tx, stage, body: req })?)?;
        request_path = Some(p);
    }

    if flags.response {
        let p = dir.join(format!("{stage}.response.json"));
        fs::write(&p, to_string_pretty(&Envelope { tx, stage, body: resp })?)?;
        response_path = Some(p);
    }

    Ok(SavedPaths { dir, request: request_path, response: response_path })
}

pub fn log_saved_paths(stage: &str, saved: &SavedPaths) {
    match &saved.request {
        Some(p) => tracing::debug!(stage, path = %p.display(), "request saved"),
        None => tracing::trace!(stage, "request not saved (flag off)"),
    }
    match &saved.response {
        Some(p) => tracing::debug!(stage, path = %p.display(), "response saved"),
        None => tracing::trace!(stage, "response not saved (flag off)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_only_flagged_files() {
        let dir = tempfile::tempdir().unwrap();
        let tx = Tx::new(false);
        let saved = save_stage(
            dir.path(),
            &tx,
            "direct",
            &"req",
            &"resp",
            SaveFlags { request: true, response: false },
        )
        .unwrap();
        let req = saved.request.unwrap();
        assert!(req.ends_with("direct.request.json"));
        let text = fs::read_to_string(req).unwrap();
        assert!(text.contains(&tx.id.to_string()));
        assert!(saved.response.is_none());
        assert!(!saved.dir.join("direct.response.json").exists());
    }

    #[test]
    fn no_flags_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let saved = save_stage(dir.path(), &Tx::new(true), "s", &1, &2, SaveFlags::default()).unwrap();
        assert!(!saved.dir.exists());
    }
}
