//! File-based installs: copy with backup, and removal.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::types::SyncError;
use crate::consts::BACKUP_SUFFIX;
use crate::util::hash::{ContentHash, fingerprint_path};

fn io_error<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> SyncError + 'a {
  move |source| SyncError::Io {
    action,
    path: path.to_path_buf(),
    source,
  }
}

/// First free backup name for `target`: `<target>.bak`, then `<target>.bak.1`, ...
pub async fn backup_path(target: &Path) -> PathBuf {
  let mut name = target.file_name().unwrap_or_default().to_os_string();
  name.push(".");
  name.push(BACKUP_SUFFIX);
  let base = target.with_file_name(&name);

  let mut candidate = base.clone();
  let mut n = 1;
  while matches!(fs::try_exists(&candidate).await, Ok(true)) {
    let mut numbered = name.clone();
    numbered.push(format!(".{n}"));
    candidate = target.with_file_name(numbered);
    n += 1;
  }
  candidate
}

/// Copy `source` (file or directory tree) to `target`.
///
/// `recorded` is the fingerprint tracked for the previous install. An existing
/// target matching it is an untouched copy and is replaced in place. Any other
/// target whose content differs from `source` is moved to a backup first; its
/// path is returned. An identical target is left alone.
pub async fn install_path(
  source: &Path,
  target: &Path,
  recorded: Option<&ContentHash>,
) -> Result<Option<PathBuf>, SyncError> {
  let metadata = match fs::metadata(source).await {
    Ok(metadata) => metadata,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      return Err(SyncError::MissingSource {
        path: source.to_path_buf(),
      });
    }
    Err(e) => return Err(io_error("read", source)(e)),
  };

  let mut backup = None;
  if fs::symlink_metadata(target).await.is_ok() {
    let existing = fingerprint_path(target);
    if existing.is_some() && existing == fingerprint_path(source) {
      debug!(target = %target.display(), "target already up to date");
      return Ok(None);
    }

    if existing.is_some() && existing.as_ref() == recorded {
      debug!(target = %target.display(), "replacing unmodified previous install");
      remove_path(target).await?;
    } else {
      let path = backup_path(target).await;
      fs::rename(target, &path).await.map_err(io_error("back up", target))?;
      info!(target = %target.display(), backup = %path.display(), "backed up existing target");
      backup = Some(path);
    }
  }

  if let Some(parent) = target.parent() {
    fs::create_dir_all(parent).await.map_err(io_error("create directory", parent))?;
  }

  if metadata.is_dir() {
    copy_tree(source, target).await?;
  } else {
    fs::copy(source, target).await.map_err(io_error("copy to", target))?;
  }

  debug!(source = %source.display(), target = %target.display(), "installed");
  Ok(backup)
}

async fn copy_tree(source: &Path, target: &Path) -> Result<(), SyncError> {
  for entry in WalkDir::new(source).sort_by_file_name() {
    let entry = entry.map_err(|e| {
      let path = e.path().unwrap_or(source).to_path_buf();
      SyncError::Io {
        action: "walk",
        path,
        source: e.into(),
      }
    })?;

    let rel = entry.path().strip_prefix(source).unwrap_or(entry.path());
    let dest = target.join(rel);

    if entry.file_type().is_dir() {
      fs::create_dir_all(&dest).await.map_err(io_error("create directory", &dest))?;
    } else {
      fs::copy(entry.path(), &dest).await.map_err(io_error("copy to", &dest))?;
    }
  }
  Ok(())
}

/// Delete `target` (file or directory tree). Returns whether anything was there.
pub async fn remove_path(target: &Path) -> Result<bool, SyncError> {
  let metadata = match fs::symlink_metadata(target).await {
    Ok(metadata) => metadata,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
    Err(e) => return Err(io_error("read", target)(e)),
  };

  if metadata.is_dir() {
    fs::remove_dir_all(target).await.map_err(io_error("remove", target))?;
  } else {
    fs::remove_file(target).await.map_err(io_error("remove", target))?;
  }

  debug!(target = %target.display(), "removed");
  Ok(true)
}
