//! Input discovery and output-tree mirroring.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::types::InputMode;

/// A candidate file and the directory its output lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub source: PathBuf,
    pub dest_dir: PathBuf,
}

impl DiscoveredFile {
    /// File name as shown in the run log.
    pub fn name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// One step of a walk, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEntry {
    /// A visited directory, followed by its files.
    Directory {
        /// Mirrored output directory when `mirrored`, otherwise the source directory.
        path: PathBuf,
        /// Number of files directly inside the source directory.
        file_count: usize,
        mirrored: bool,
    },
    File(DiscoveredFile),
    /// Something that could not be read or created. Not counted as a file.
    Unreadable { path: PathBuf, reason: String },
}

impl WalkEntry {
    /// Line for the run log, if this entry produces one.
    pub fn log_line(&self) -> Option<String> {
        match self {
            Self::Directory {
                path,
                file_count,
                mirrored: true,
            } => Some(format!(
                "INFO: created: {}, path includes {} target files",
                path.display(),
                file_count
            )),
            Self::Directory {
                path,
                file_count,
                mirrored: false,
            } => Some(format!(
                "INFO: scanning: {}, path includes {} target files",
                path.display(),
                file_count
            )),
            Self::Unreadable { path, reason } => Some(format!(
                "WARNING: could not read {}: {}",
                path.display(),
                reason
            )),
            Self::File(_) => None,
        }
    }
}

/// Enumerate every candidate under `inputs`.
///
/// In [`InputMode::Files`] each input is a candidate landing flat in
/// `output_root`. In [`InputMode::Directories`] each input is walked
/// depth-first with entries sorted by name; a directory's files come right
/// after it. With `mirror` on, every visited directory is recreated under
/// `output_root` during the walk, so the whole tree exists before anything
/// is converted. Several directory inputs are mirrored under
/// `output_root/<input name>` each.
pub fn discover(
    inputs: &[PathBuf],
    mode: InputMode,
    output_root: &Path,
    mirror: bool,
) -> Vec<WalkEntry> {
    let mut entries = Vec::new();

    match mode {
        InputMode::Files => {
            for input in inputs {
                if input.is_file() {
                    entries.push(WalkEntry::File(DiscoveredFile {
                        source: input.clone(),
                        dest_dir: output_root.to_path_buf(),
                    }));
                } else {
                    entries.push(WalkEntry::Unreadable {
                        path: input.clone(),
                        reason: "not a regular file".to_string(),
                    });
                }
            }
        }
        InputMode::Directories => {
            let nest = mirror && inputs.len() > 1;
            for input in inputs {
                let base = match input.file_name() {
                    Some(name) if nest => output_root.join(name),
                    _ => output_root.to_path_buf(),
                };
                walk_input(input, &base, output_root, mirror, &mut entries);
            }
        }
    }

    entries
}

fn walk_input(
    input: &Path,
    base: &Path,
    output_root: &Path,
    mirror: bool,
    entries: &mut Vec<WalkEntry>,
) {
    if input.is_file() {
        entries.push(WalkEntry::File(DiscoveredFile {
            source: input.to_path_buf(),
            dest_dir: output_root.to_path_buf(),
        }));
        return;
    }

    let walker = WalkDir::new(input)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.path() != output_root);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(input).to_path_buf();
                warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                entries.push(WalkEntry::Unreadable {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let dir = entry.path();
        let dest_dir = if mirror {
            let relative = dir.strip_prefix(input).unwrap_or(Path::new(""));
            base.join(relative)
        } else {
            output_root.to_path_buf()
        };

        if mirror {
            if let Err(e) = std::fs::create_dir_all(&dest_dir) {
                warn!(path = %dest_dir.display(), error = %e, "Failed to create mirrored directory");
                entries.push(WalkEntry::Unreadable {
                    path: dest_dir.clone(),
                    reason: e.to_string(),
                });
            }
        }

        let (files, errors) = list_files(dir);
        debug!(dir = %dir.display(), files = files.len(), "Visited directory");

        entries.push(WalkEntry::Directory {
            path: if mirror {
                dest_dir.clone()
            } else {
                dir.to_path_buf()
            },
            file_count: files.len(),
            mirrored: mirror,
        });
        entries.extend(errors);
        entries.extend(files.into_iter().map(|source| {
            WalkEntry::File(DiscoveredFile {
                source,
                dest_dir: dest_dir.clone(),
            })
        }));
    }
}

/// Non-directory entries directly inside `dir`, sorted by name.
fn list_files(dir: &Path) -> (Vec<PathBuf>, Vec<WalkEntry>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) if entry.path().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => errors.push(WalkEntry::Unreadable {
                path: e.path().unwrap_or(dir).to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }

    (files, errors)
}
