use crate::domain::constants::{EMPTY_POLICY, HOSTS_KEY};
use crate::domain::models::{HostMap, PatchKind, PatchReport};
use crate::hujson::{self, Operation, ParseError, PatchError};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(thiserror::Error, Debug)]
pub enum PolicyError {
    #[error("failed read policy {}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed parse policy {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error("failed to update policy {}", path.display())]
    Patch {
        path: PathBuf,
        #[source]
        source: PatchError,
    },
    #[error("failed to write policy {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PolicyError {
    pub fn code(&self) -> &'static str {
        match self {
            PolicyError::FileAccess { .. } => "POLICY_ACCESS",
            PolicyError::Parse { .. } => "POLICY_PARSE",
            PolicyError::Patch { .. } => "POLICY_PATCH",
            PolicyError::Write { .. } => "POLICY_WRITE",
        }
    }
}

fn access(path: &Path) -> impl FnOnce(io::Error) -> PolicyError + '_ {
    move |source| PolicyError::FileAccess {
        path: path.to_path_buf(),
        source,
    }
}

/// Stats the policy, creating an empty one first if it does not exist.
fn locate(path: &Path) -> Result<fs::Metadata, PolicyError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "policy missing, creating an empty one");
            fs::write(path, EMPTY_POLICY).map_err(access(path))?;
            fs::metadata(path).map_err(access(path))
        }
        Err(e) => Err(access(path)(e)),
    }
}

/// Replaces the whole file through a sibling temp file so a failed write
/// leaves the old contents in place.
fn persist(target: &Path, contents: &str, permissions: fs::Permissions) -> io::Result<()> {
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    fs::set_permissions(tmp.path(), permissions)?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// Sets the top-level `hosts` key of the policy at `path` to exactly `hosts`,
/// leaving every other key's content alone, and rewrites the file in
/// canonical form. Nothing on disk changes unless parsing and patching succeed.
pub fn patch_policy(path: &Path, hosts: &HostMap) -> Result<PatchReport, PolicyError> {
    let meta = locate(path)?;
    // Write through symlinks rather than replacing them.
    let target = fs::canonicalize(path).map_err(access(path))?;
    let original = fs::read(&target).map_err(access(path))?;

    let mut doc = hujson::parse_bytes(&original).map_err(|source| PolicyError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let existing = doc.as_object().and_then(|root| root.get(HOSTS_KEY));
    let operation = match existing {
        Some(member) => {
            debug!(previous = %member.value.to_json(), "replacing hosts");
            PatchKind::Replace
        }
        None => PatchKind::Add,
    };
    let pointer = format!("/{HOSTS_KEY}");
    let value = serde_json::Value::Object(
        hosts
            .iter()
            .map(|(name, addr)| (name.clone(), serde_json::Value::String(addr.clone())))
            .collect(),
    );
    let op = match operation {
        PatchKind::Replace => Operation::Replace {
            path: pointer,
            value,
        },
        PatchKind::Add => Operation::Add {
            path: pointer,
            value,
        },
    };
    debug!(path = %path.display(), ?operation, hosts = hosts.len(), "patching policy");
    hujson::patch(&mut doc, &[op]).map_err(|source| PolicyError::Patch {
        path: path.to_path_buf(),
        source,
    })?;

    let formatted = doc.format();
    let changed = formatted.as_bytes() != original.as_slice();
    if changed {
        persist(&target, &formatted, meta.permissions()).map_err(|source| PolicyError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    } else {
        debug!(path = %path.display(), "policy already up to date");
    }

    Ok(PatchReport {
        policy: path.to_path_buf(),
        operation,
        host_count: hosts.len(),
        changed,
    })
}
