//! Preserved-archive scanning.
//!
//! Walks the directory tree the `preserve` command produces
//! (`<root>/<category>/<challenge>/<files...>`), analyses every attachment
//! and aggregates tags per challenge. Analyses are independent, so
//! challenges are scanned in parallel.

use crate::analysis::analyse;
use crate::ranking::{rank, Preferences, ScoreEntry};
use crate::tags::tags_for;
use crate::types::Tag;
use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Marker file whose presence makes a directory a preserved archive.
pub const INSTANCE_FILE: &str = "instance.json";

/// Challenge description file written by `preserve`, never analysed.
pub const DESCRIPTION_FILE: &str = "description";

/// Challenge metadata file written by `preserve`, never analysed.
pub const CHALLENGE_FILE: &str = "challenge.json";

/// Per-challenge metadata files that are never analysed.
pub const RESERVED_FILES: &[&str] = &[DESCRIPTION_FILE, CHALLENGE_FILE];

/// A preserved competition archive on disk.
pub struct Archive {
    root: PathBuf,
}

impl Archive {
    /// Open a preserved archive, failing if the marker file is absent.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            bail!("{} is not a directory", root.display());
        }
        if !root.join(INSTANCE_FILE).is_file() {
            bail!(
                "{} is not a preserved archive ({} missing)",
                root.display(),
                INSTANCE_FILE
            );
        }
        Ok(Archive {
            root: root.to_path_buf(),
        })
    }

    /// Score every challenge in the archive and return them ranked.
    pub fn rank(&self, prefs: &Preferences) -> Result<Vec<ScoreEntry>> {
        let challenges = self.challenge_dirs()?;

        let entries: Vec<ScoreEntry> = challenges
            .par_iter()
            .map(|(name, dir)| {
                let tags = challenge_tags(dir);
                let (score, excluded) = prefs.score(&tags);
                ScoreEntry {
                    name: name.clone(),
                    score,
                    tags,
                    excluded,
                }
            })
            .collect();

        Ok(rank(entries))
    }

    /// Discover challenge directories as `category/challenge` pairs.
    ///
    /// Sorted by name so discovery order is stable across filesystems.
    fn challenge_dirs(&self) -> Result<Vec<(String, PathBuf)>> {
        let mut dirs = Vec::new();

        for category in read_subdirs(&self.root)? {
            let category_name = dir_name(&category);
            for challenge in read_subdirs(&category)? {
                dirs.push((
                    format!("{}/{}", category_name, dir_name(&challenge)),
                    challenge,
                ));
            }
        }

        dirs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(dirs)
    }
}

/// Deduplicated tags of every analysable file in one challenge directory,
/// in first-seen order.
///
/// Reserved metadata files are skipped; a file that cannot be read is
/// reported on stderr and skipped without aborting the batch.
pub fn challenge_tags(dir: &Path) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        if entry.depth() == 1
            && RESERVED_FILES
                .iter()
                .any(|r| entry.file_name().to_string_lossy() == *r)
        {
            continue;
        }

        let analysis = match analyse(entry.path()) {
            Ok(a) => a,
            Err(err) => {
                eprintln!("warning: skipping {}: {err:#}", entry.path().display());
                continue;
            }
        };

        for tag in tags_for(&analysis) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }

    tags
}

fn read_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut subdirs = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            subdirs.push(entry.path());
        }
    }
    subdirs.sort();
    Ok(subdirs)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
