//! Folder trees synthesized from flat object keys.
//!
//! The store has no directories, only keys like `shoes/red/1.png`. Every
//! `/`-separated segment before the last one is treated as a folder, and a
//! key contributes one chain of parent→child edges along its segments.
//!
//! Folders live in an arena ([`FolderGraph`]) and edges are [`FolderId`]
//! indices. Under [`FolderIdentity::SegmentName`] two folders with the same
//! name are the same node wherever they appear, so the graph can be a DAG
//! (or even cyclic) before roots are picked:
//!
//! ```text
//! a/x/file1  ─┐        a   b
//! b/x/file2  ─┴──►      \ /
//!                        x
//! ```
//!
//! [`FolderGraph::roots`] returns the nodes not reachable from any other node.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{FolderIdentity, GalleryError, GalleryResult};

/// Handle to a folder inside a [`FolderGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId(usize);

#[derive(Debug, Clone)]
struct FolderEntry {
    name: String,
    children: Vec<FolderId>,
}

/// A folder as handed to callers: `{"name": "...", "nested": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    pub nested: Vec<Folder>,
}

impl Folder {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            nested: Vec::new(),
        }
    }

    pub fn with_nested(mut self, nested: Vec<Folder>) -> Self {
        self.nested = nested;
        self
    }

    /// Direct child by name
    pub fn child(&self, name: &str) -> Option<&Folder> {
        self.nested.iter().find(|f| f.name == name)
    }

    /// Copy with children sorted by name at every level, for order-insensitive comparison
    pub fn normalized(&self) -> Folder {
        let mut nested: Vec<Folder> = self.nested.iter().map(Folder::normalized).collect();
        nested.sort_by(|a, b| a.name.cmp(&b.name));
        Folder {
            name: self.name.clone(),
            nested,
        }
    }
}

/// Arena of folders built from one pass over a key listing
#[derive(Debug, Clone)]
pub struct FolderGraph {
    identity: FolderIdentity,
    nodes: Vec<FolderEntry>,
    registry: HashMap<String, FolderId>,
}

impl FolderGraph {
    pub fn new(identity: FolderIdentity) -> Self {
        Self {
            identity,
            nodes: Vec::new(),
            registry: HashMap::new(),
        }
    }

    /// Build a graph from every key in `keys`
    pub fn from_keys<I, S>(keys: I, identity: FolderIdentity) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut graph = Self::new(identity);
        for key in keys {
            graph.insert_key(key.as_ref());
        }
        graph
    }

    /// Fold one object key into the graph.
    ///
    /// - no `/`: not a folder entry, ignored
    /// - two segments (`a/` or `a/file.png`): registers `a`
    /// - longer keys: edges for each segment pair, walked from the last
    ///   folder boundary back to the first
    pub fn insert_key(&mut self, key: &str) {
        let segments: Vec<&str> = key.split('/').collect();

        match segments.len() {
            0 | 1 => {}
            2 => {
                self.intern(&segments, 0);
            }
            n => {
                for i in (1..n - 1).rev() {
                    let parent = self.intern(&segments, i - 1);
                    let child = self.intern(&segments, i);
                    self.attach(parent, child);
                }
            }
        }
    }

    /// Look up or create the folder for `segments[index]`
    fn intern(&mut self, segments: &[&str], index: usize) -> FolderId {
        let lookup = match self.identity {
            FolderIdentity::SegmentName => segments[index].to_string(),
            FolderIdentity::QualifiedPath => segments[..=index].join("/"),
        };

        if let Some(id) = self.registry.get(&lookup) {
            return *id;
        }

        let id = FolderId(self.nodes.len());
        self.nodes.push(FolderEntry {
            name: segments[index].to_string(),
            children: Vec::new(),
        });
        self.registry.insert(lookup, id);
        id
    }

    /// Record `child` under `parent`. A folder is never its own child, so
    /// `photos/photos/1.png` leaves `photos` a root.
    fn attach(&mut self, parent: FolderId, child: FolderId) {
        if parent == child {
            return;
        }
        let children = &mut self.nodes[parent.0].children;
        if !children.contains(&child) {
            children.push(child);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn name(&self, id: FolderId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn children(&self, id: FolderId) -> &[FolderId] {
        &self.nodes[id.0].children
    }

    /// Every folder currently registered under `name`
    pub fn find(&self, name: &str) -> Vec<FolderId> {
        self.ids().filter(|id| self.name(*id) == name).collect()
    }

    fn ids(&self) -> impl Iterator<Item = FolderId> {
        (0..self.nodes.len()).map(FolderId)
    }

    /// Folders not reachable as a descendant of any other folder, in order
    /// of first registration.
    ///
    /// Every folder starts out as a candidate; walking each candidate's
    /// descendants knocks out everything it reaches. Folders that only sit
    /// on a cycle are reachable from each other and never become roots.
    pub fn roots(&self) -> Vec<FolderId> {
        let mut reachable = vec![false; self.nodes.len()];
        let mut stack = Vec::new();

        for start in self.ids() {
            stack.extend(self.children(start).iter().copied());
            while let Some(id) = stack.pop() {
                if reachable[id.0] {
                    continue;
                }
                reachable[id.0] = true;
                stack.extend(self.children(id).iter().copied());
            }
        }

        self.ids().filter(|id| !reachable[id.0]).collect()
    }

    /// Materialize the subtree under `id`, emitting at most `max_nodes` folders.
    ///
    /// A folder shared by several parents is copied under each of them, so a
    /// heavily merged graph expands far beyond [`len`](Self::len). A child
    /// that already appears on the path from `id` is left out, which is what
    /// keeps cyclic graphs finite.
    pub fn to_folder(&self, id: FolderId, max_nodes: usize) -> GalleryResult<Folder> {
        let mut on_path = vec![false; self.nodes.len()];
        let mut remaining = max_nodes;
        self.materialize(id, &mut on_path, &mut remaining)
            .ok_or_else(|| too_large(max_nodes))
    }

    fn materialize(&self, id: FolderId, on_path: &mut [bool], remaining: &mut usize) -> Option<Folder> {
        *remaining = remaining.checked_sub(1)?;

        on_path[id.0] = true;
        let mut nested = Vec::with_capacity(self.children(id).len());
        for &child in self.children(id) {
            if !on_path[child.0] {
                nested.push(self.materialize(child, on_path, remaining)?);
            }
        }
        on_path[id.0] = false;

        Some(Folder {
            name: self.name(id).to_string(),
            nested,
        })
    }

    /// The root set as nested folders, at most `max_nodes` folders in total
    pub fn into_folders(self, max_nodes: usize) -> GalleryResult<Vec<Folder>> {
        let mut on_path = vec![false; self.nodes.len()];
        let mut remaining = max_nodes;
        self.roots()
            .into_iter()
            .map(|id| {
                self.materialize(id, &mut on_path, &mut remaining)
                    .ok_or_else(|| too_large(max_nodes))
            })
            .collect()
    }
}

fn too_large(max_nodes: usize) -> GalleryError {
    GalleryError::limit(format!("folder tree expands past {} folders", max_nodes))
}

/// Synthesize the root folders for a flat key listing
pub fn build_folders<I, S>(keys: I, identity: FolderIdentity, max_nodes: usize) -> GalleryResult<Vec<Folder>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    FolderGraph::from_keys(keys, identity).into_folders(max_nodes)
}
