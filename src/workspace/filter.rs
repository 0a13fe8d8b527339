use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Component, Path};

/// Transient directories never carried into an archive
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".bundle", "output", "tmp", "web", "waves", ".git", ".ref", "dist", "log", ".lsf", ".session",
];

/// Decides which workspace paths stay out of a snapshot
///
/// Excluded entries are anchored at the workspace root and matched segment by
/// segment: excluding `tmp` drops `tmp/` but keeps `tmp2/` and `src/tmp/`.
/// Metadata directory names match at any depth.
#[derive(Debug, Clone)]
pub struct PathFilter {
    excluded: BTreeSet<String>,
    metadata_dirs: BTreeSet<String>,
}

impl PathFilter {
    /// Default excluded set unioned with `extra`
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let excluded = DEFAULT_EXCLUDED_DIRS
            .iter()
            .map(|d| d.to_string())
            .chain(extra.into_iter().filter_map(|d| normalize(d.as_ref())))
            .collect();

        Self {
            excluded,
            metadata_dirs: BTreeSet::new(),
        }
    }

    /// Set the directory names stripped at any depth
    pub fn with_metadata_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metadata_dirs = names.into_iter().map(Into::into).collect();
        self
    }

    /// Check a path relative to the workspace root
    pub fn is_excluded(&self, relative: &Path) -> bool {
        is_excluded(relative, &self.excluded)
    }

    /// Check a single directory name against the metadata set
    pub fn is_metadata_dir(&self, name: &OsStr) -> bool {
        name.to_str()
            .map(|n| self.metadata_dirs.contains(n))
            .unwrap_or(false)
    }

    /// Excluded entries in sorted order
    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }

    /// Anchored `--exclude /<dir>` pairs for rsync
    pub fn rsync_excludes(&self) -> Vec<String> {
        self.excluded
            .iter()
            .flat_map(|d| ["--exclude".to_string(), format!("/{}", d)])
            .collect()
    }
}

/// True if `relative` falls under one of the `excluded` root-anchored entries
pub fn is_excluded(relative: &Path, excluded: &BTreeSet<String>) -> bool {
    let segments: Vec<&OsStr> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        return false;
    }

    excluded.iter().any(|entry| {
        let entry_segments: Vec<&str> = entry.split('/').collect();
        entry_segments.len() <= segments.len()
            && entry_segments
                .iter()
                .zip(&segments)
                .all(|(e, s)| OsStr::new(e) == *s)
    })
}

/// Root-anchored form of a user exclude entry
///
/// A leading `/` anchors at the root as in rsync patterns. Entries with `..`,
/// a drive prefix or nothing left after trimming are dropped: they would
/// point outside the tree being filtered.
fn normalize(entry: &str) -> Option<String> {
    let trimmed = entry.trim().trim_matches('/');
    let mut segments = Vec::new();

    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_str()?),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                tracing::warn!(entry, "ignoring exclude entry that leaves the workspace");
                return None;
            }
        }
    }

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}
