//! File persistence: atomic writes, timestamped backups and rotation

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::StorageConfig;
use crate::errors::{AppError, AppResult};

/// `YYYYmmdd_HHMMSS`, appended to backup and report file stems
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone)]
pub struct ChannelStore {
    backup_dir: PathBuf,
    max_backups: usize,
}

impl ChannelStore {
    pub fn new<P: Into<PathBuf>>(backup_dir: P, max_backups: usize) -> Self {
        Self {
            backup_dir: backup_dir.into(),
            max_backups,
        }
    }

    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(storage.backup_dir.clone(), storage.max_backups)
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Read a text file; a missing file reads as empty
    pub fn read_text<P: AsRef<Path>>(&self, path: P) -> AppResult<String> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} does not exist, treating as empty", path.display());
                Ok(String::new())
            }
            Err(e) => Err(AppError::io(path, e)),
        }
    }

    /// Replace `path` with `contents` via a sibling temp file and a rename,
    /// so readers never see a partially written file
    pub fn write_atomic<P: AsRef<Path>>(&self, path: P, contents: &str) -> AppResult<()> {
        write_atomic(path.as_ref(), contents)
    }

    /// Copy `path` into the backup directory and rotate old backups
    ///
    /// Returns `None` when there is nothing to back up.
    pub fn create_backup<P: AsRef<Path>>(&self, path: P) -> AppResult<Option<PathBuf>> {
        self.create_backup_at(path.as_ref(), Local::now())
    }

    pub fn create_backup_at(
        &self,
        path: &Path,
        timestamp: DateTime<Local>,
    ) -> AppResult<Option<PathBuf>> {
        if !path.is_file() {
            return Ok(None);
        }

        std::fs::create_dir_all(&self.backup_dir)
            .map_err(|e| AppError::io(&self.backup_dir, e))?;

        let (stem, extension) = stem_and_extension(path);
        let backup_path = self
            .backup_dir
            .join(timestamped_file_name(&stem, &extension, timestamp));

        std::fs::copy(path, &backup_path).map_err(|e| AppError::io(&backup_path, e))?;
        info!("Created backup: {}", backup_path.display());

        cleanup_old_versions(&self.backup_dir, &stem, &extension, self.max_backups)?;
        Ok(Some(backup_path))
    }

    /// Delete a processed input file; a file that is already gone is fine
    pub fn remove_file<P: AsRef<Path>>(&self, path: P) -> AppResult<bool> {
        let path = path.as_ref();
        match std::fs::remove_file(path) {
            Ok(()) => {
                info!("Removed {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::io(path, e)),
        }
    }
}

pub fn write_atomic(path: &Path, contents: &str) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| AppError::internal(format!("{} is not a file path", path.display())))?;
    let temp_path = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp_path, contents).map_err(|e| AppError::io(&temp_path, e))?;
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(AppError::io(path, e));
    }

    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// `channels.txt` → (`channels`, `.txt`); the extension keeps its dot
pub fn stem_and_extension(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (stem, extension)
}

/// `<stem>_<YYYYmmdd_HHMMSS><extension>`
pub fn timestamped_file_name(stem: &str, extension: &str, timestamp: DateTime<Local>) -> String {
    format!("{}_{}{}", stem, timestamp.format(TIMESTAMP_FORMAT), extension)
}

fn is_timestamp(candidate: &str) -> bool {
    candidate.len() == 15
        && candidate.char_indices().all(|(i, c)| {
            if i == 8 {
                c == '_'
            } else {
                c.is_ascii_digit()
            }
        })
}

/// Remove all but the newest `keep_count` timestamped versions of `stem` in
/// `dir`, returning how many were removed
///
/// Newest is decided by modification time, then by the timestamp in the name.
/// Failure to delete one file is logged and does not stop the rotation.
pub fn cleanup_old_versions(
    dir: &Path,
    stem: &str,
    extension: &str,
    keep_count: usize,
) -> AppResult<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let prefix = format!("{stem}_");
    let mut versions = Vec::new();

    for entry in std::fs::read_dir(dir).map_err(|e| AppError::io(dir, e))? {
        let entry = entry.map_err(|e| AppError::io(dir, e))?;
        let file_name = entry.file_name().to_string_lossy().to_string();

        let is_version = file_name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(extension))
            .is_some_and(is_timestamp);
        if !is_version {
            continue;
        }

        if let Ok(metadata) = entry.metadata() {
            if let Ok(modified) = metadata.modified() {
                versions.push((file_name, modified, entry.path()));
            }
        }
    }

    // Newest first
    versions.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

    let mut removed = 0;
    if versions.len() > keep_count {
        for (_, _, path) in versions.into_iter().skip(keep_count) {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Removed old version {}", path.display());
                    removed += 1;
                }
                Err(e) => warn!("Failed to remove old version {}: {}", path.display(), e),
            }
        }
    }

    Ok(removed)
}
