//! Directory tree indexer.
//!
//! An in-memory, owned-recursive view of scanned paths and their catalog
//! tracks. The tree is rebuilt wholesale whenever the catalog changes
//! meaningfully; it is never the source of truth and never touches the
//! catalog itself.

use tempo_core::types::{Track, TrackSortKey};
use std::collections::BTreeMap;
use std::path::Path;

/// One path segment: direct tracks, child directories, and the
/// cumulative track count of the whole subtree.
#[derive(Debug, Default, Clone)]
pub struct DirNode {
    /// Tracks directly inside this directory
    pub tracks: Vec<Track>,

    /// Child directories keyed by segment name
    pub children: BTreeMap<String, DirNode>,

    /// Number of tracks in this node and all descendants
    pub total_tracks: usize,
}

/// A rebuildable tree of scanned paths.
#[derive(Debug, Default, Clone)]
pub struct DirectoryTree {
    root: DirNode,
}

impl DirectoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &DirNode {
        &self.root
    }

    /// Attach a track under its relative path, creating intermediate
    /// directory nodes as needed. Cumulative counts are bumped along the
    /// whole chain from root to the terminal directory.
    pub fn insert(&mut self, relative_path: &Path, track: Track) {
        let mut node = &mut self.root;
        node.total_tracks += 1;

        for segment in directory_segments(relative_path) {
            node = node.children.entry(segment).or_default();
            node.total_tracks += 1;
        }

        node.tracks.push(track);
    }

    /// Register a path's directory shape without attaching a track.
    /// Used by paths-only pre-scans; counts are unchanged.
    pub fn insert_path(&mut self, relative_path: &Path) {
        let mut node = &mut self.root;
        for segment in directory_segments(relative_path) {
            node = node.children.entry(segment).or_default();
        }
    }

    /// Subdirectories with intermediate single-child chains collapsed:
    /// a run of folders that each contain nothing but one subfolder
    /// appears as one combined `a/b/c` segment.
    pub fn flatten(&self) -> Vec<(String, &DirNode)> {
        let mut out = Vec::new();
        flatten_into(&self.root, "", &mut out);
        out
    }

    /// Every track in the tree, ordered by the given key.
    pub fn to_sorted_list(&self, key: TrackSortKey, descending: bool) -> Vec<&Track> {
        let mut tracks = Vec::with_capacity(self.root.total_tracks);
        collect_tracks(&self.root, &mut tracks);

        tracks.sort_by(|a, b| match key {
            TrackSortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            TrackSortKey::Duration => a
                .duration_seconds
                .unwrap_or(0.0)
                .total_cmp(&b.duration_seconds.unwrap_or(0.0)),
            TrackSortKey::AddedAt => a.added_at.unwrap_or(0).cmp(&b.added_at.unwrap_or(0)),
        });

        if descending {
            tracks.reverse();
        }

        tracks
    }
}

/// Directory components of a relative file path (the file name itself is
/// not a tree node).
fn directory_segments(relative_path: &Path) -> Vec<String> {
    let parent = relative_path.parent().unwrap_or_else(|| Path::new(""));
    parent
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(segment) => {
                segment.to_str().map(|s| s.to_string())
            }
            _ => None,
        })
        .collect()
}

fn flatten_into<'a>(node: &'a DirNode, prefix: &str, out: &mut Vec<(String, &'a DirNode)>) {
    for (name, child) in &node.children {
        let mut label = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };
        let mut target = child;

        // Collapse chains of track-less single-child directories
        while target.tracks.is_empty() && target.children.len() == 1 {
            let Some((next_name, next)) = target.children.iter().next() else {
                break;
            };
            label.push('/');
            label.push_str(next_name);
            target = next;
        }

        out.push((label.clone(), target));
        flatten_into(target, &label, out);
    }
}

fn collect_tracks<'a>(node: &'a DirNode, out: &mut Vec<&'a Track>) {
    out.extend(node.tracks.iter());
    for child in node.children.values() {
        collect_tracks(child, out);
    }
}
