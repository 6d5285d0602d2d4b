use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Short host name to primary address. Ordered so the emitted `hosts` object
/// is stable between runs.
pub type HostMap = BTreeMap<String, String>;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct JsonErr {
    pub ok: bool,
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Device {
    /// Fully qualified MagicDNS name, e.g. `nas.tail1234.ts.net`.
    pub name: String,
    #[serde(default)]
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchKind {
    Add,
    Replace,
}

impl PatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchKind::Add => "add",
            PatchKind::Replace => "replace",
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct PatchReport {
    pub policy: PathBuf,
    pub operation: PatchKind,
    pub host_count: usize,
    /// `false` when the canonical output matched the file and nothing was written.
    pub changed: bool,
}

#[derive(Debug, Serialize)]
pub struct SyncReport {
    #[serde(flatten)]
    pub patch: PatchReport,
    pub hosts: HostMap,
}
