//! Directory-tree enumeration: the first pipeline step.

use std::fs;
use std::path::{Path, PathBuf};

use super::IngestFailure;

/// Family whose images carry no distinct thumbnail; the primary path
/// doubles as the thumbnail path.
pub const NO_THUMBNAIL_FAMILY: &str = "Frames";

/// Prefix under which stored paths are served.
pub const STORED_PREFIX: &str = "static/images";

const THUMB_MARKER: &str = "_thumb";

/// An image file found on disk, with its taxonomy chain derived from
/// the directory layout and its stored (URL-style) paths precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredImage {
    pub family: String,
    pub group: String,
    pub subgroup: String,
    /// File stem without extension; doubles as the image name.
    pub name: String,
    /// On-disk location of the primary file.
    pub source_path: PathBuf,
    /// Stored relative path, forward slashes.
    pub file_path: String,
    /// Stored thumbnail path; equals `file_path` for the no-thumbnail
    /// family.
    pub thumb_path: String,
}

impl DiscoveredImage {
    pub fn has_distinct_thumbnail(&self) -> bool {
        self.family != NO_THUMBNAIL_FAMILY
    }

    /// On-disk sibling where the thumbnail lives (or should be
    /// generated). Meaningless for the no-thumbnail family.
    pub fn thumb_source_path(&self) -> PathBuf {
        match self.source_path.file_name().and_then(|n| n.to_str()) {
            Some(file_name) => self
                .source_path
                .with_file_name(thumb_file_name(file_name)),
            None => self.source_path.clone(),
        }
    }
}

/// `a.jpg` → `a_thumb.jpg`; extensionless names get the bare suffix.
pub fn thumb_file_name(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}{THUMB_MARKER}.{ext}"),
        None => format!("{file_name}{THUMB_MARKER}"),
    }
}

fn stored_path(family: &str, group: &str, subgroup: &str, file_name: &str) -> String {
    format!("{STORED_PREFIX}/{family}/{group}/{subgroup}/{file_name}")
}

/// Walk `root/{family}/{group}/{subgroup}/*`, collecting image files.
///
/// Non-directories at taxonomy levels and `*_thumb*` files are skipped
/// silently; unreadable directories are recorded as failures and the
/// walk continues.
pub fn enumerate_tree(root: &Path, failures: &mut Vec<IngestFailure>) -> Vec<DiscoveredImage> {
    let mut discovered = Vec::new();

    for family_dir in sorted_dirs(root, failures) {
        let family = family_dir.1;
        for group_dir in sorted_dirs(&family_dir.0, failures) {
            let group = group_dir.1;
            for subgroup_dir in sorted_dirs(&group_dir.0, failures) {
                let subgroup = subgroup_dir.1;
                for (file, file_name) in sorted_files(&subgroup_dir.0, failures) {
                    if file_name.contains(THUMB_MARKER) {
                        continue;
                    }
                    let name = match file_name.rsplit_once('.') {
                        Some((stem, _)) => stem.to_string(),
                        None => file_name.clone(),
                    };
                    let file_path = stored_path(&family, &group, &subgroup, &file_name);
                    let thumb_path = if family == NO_THUMBNAIL_FAMILY {
                        file_path.clone()
                    } else {
                        stored_path(&family, &group, &subgroup, &thumb_file_name(&file_name))
                    };
                    discovered.push(DiscoveredImage {
                        family: family.clone(),
                        group: group.clone(),
                        subgroup: subgroup.clone(),
                        name,
                        source_path: file,
                        file_path,
                        thumb_path,
                    });
                }
            }
        }
    }

    discovered
}

fn sorted_entries(
    dir: &Path,
    want_dirs: bool,
    failures: &mut Vec<IngestFailure>,
) -> Vec<(PathBuf, String)> {
    let reader = match fs::read_dir(dir) {
        Ok(reader) => reader,
        Err(e) => {
            failures.push(IngestFailure {
                path: dir.to_path_buf(),
                reason: format!("unreadable directory: {e}"),
            });
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    for entry in reader {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                failures.push(IngestFailure {
                    path: dir.to_path_buf(),
                    reason: format!("unreadable entry: {e}"),
                });
                continue;
            }
        };
        let path = entry.path();
        if path.is_dir() != want_dirs {
            continue;
        }
        // Entries whose names are not valid UTF-8 cannot become stored
        // paths; skip them rather than mangling the name.
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            failures.push(IngestFailure {
                path,
                reason: "non-UTF-8 file name".to_string(),
            });
            continue;
        };
        entries.push((path, name));
    }
    entries.sort_by(|a, b| a.1.cmp(&b.1));
    entries
}

fn sorted_dirs(dir: &Path, failures: &mut Vec<IngestFailure>) -> Vec<(PathBuf, String)> {
    sorted_entries(dir, true, failures)
}

fn sorted_files(dir: &Path, failures: &mut Vec<IngestFailure>) -> Vec<(PathBuf, String)> {
    sorted_entries(dir, false, failures)
}
