//! Arena-backed tree of image entries.
//!
//! Entries live in one vector and refer to each other by [`EntryId`]. The parent
//! link is a plain index, so the tree has a single owner and no reference cycles.

use std::fmt::Write as _;
use std::ops::Index;

use bytes::Bytes;
use log::warn;

use super::entry::{Entry, EntryData, EntryId, EntryKind};
use super::load_exec::LoadExec;
use crate::common::binary::ByteView;
use crate::common::names_match;

/// Name of the structural root directory.
pub const ROOT_NAME: &str = "$";

/// Links pointing at links are followed at most this many times.
const MAX_LINK_HOPS: usize = 8;

/// Directory tree of one image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTree {
    entries: Vec<Entry>,
}

impl ImageTree {
    /// Create a tree holding only the root directory.
    pub(crate) fn new(root_offset: usize, load_exec: LoadExec) -> Self {
        Self {
            entries: vec![Entry {
                name: ROOT_NAME.to_string(),
                offset: Some(root_offset),
                load_exec,
                parent: None,
                data: EntryData::Directory {
                    children: Vec::new(),
                },
            }],
        }
    }

    fn push(&mut self, parent: EntryId, mut entry: Entry) -> EntryId {
        let id = EntryId(self.entries.len());
        entry.parent = Some(parent);
        self.entries.push(entry);
        if let Some(EntryData::Directory { children }) =
            self.entries.get_mut(parent.0).map(|p| &mut p.data)
        {
            children.push(id);
        }
        id
    }

    pub(crate) fn add_directory(
        &mut self,
        parent: EntryId,
        name: String,
        offset: usize,
        load_exec: LoadExec,
    ) -> EntryId {
        self.push(
            parent,
            Entry {
                name,
                offset: Some(offset),
                load_exec,
                parent: None,
                data: EntryData::Directory {
                    children: Vec::new(),
                },
            },
        )
    }

    pub(crate) fn add_file(
        &mut self,
        parent: EntryId,
        name: String,
        offset: usize,
        length: usize,
        load_exec: LoadExec,
    ) -> EntryId {
        self.push(
            parent,
            Entry {
                name,
                offset: Some(offset),
                load_exec,
                parent: None,
                data: EntryData::File { length },
            },
        )
    }

    pub(crate) fn add_link(
        &mut self,
        parent: EntryId,
        name: String,
        target: String,
        load_exec: LoadExec,
    ) -> EntryId {
        self.push(
            parent,
            Entry {
                name,
                offset: None,
                load_exec,
                parent: None,
                data: EntryData::Link { target },
            },
        )
    }

    /// The root directory.
    #[inline]
    pub fn root(&self) -> EntryId {
        EntryId(0)
    }

    /// Number of entries, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a tree has at least its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.0)
    }

    #[inline]
    pub fn children(&self, id: EntryId) -> &[EntryId] {
        self.get(id).map_or(&[], Entry::children)
    }

    #[inline]
    pub fn parent(&self, id: EntryId) -> Option<EntryId> {
        self.get(id).and_then(Entry::parent)
    }

    /// Ascend from `id` to the entry without a parent.
    pub fn structural_root(&self, id: EntryId) -> EntryId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Look up `name` below directory `dir`.
    ///
    /// Direct children are checked first, by their own name or their lookup name,
    /// case-insensitively. Then subdirectories are searched depth-first in on-disk
    /// order; the first match wins.
    pub fn entry(&self, dir: EntryId, name: &str) -> Option<EntryId> {
        let children = self.children(dir);
        let direct = children.iter().copied().find(|&child| {
            self.get(child)
                .is_some_and(|e| names_match(name, &e.name) || names_match(name, &self.lookup_name(child)))
        });
        if direct.is_some() {
            return direct;
        }
        children
            .iter()
            .copied()
            .filter(|&child| self.get(child).is_some_and(Entry::is_directory))
            .find_map(|child| self.entry(child, name))
    }

    /// Look up `name` anywhere in the tree `from` belongs to.
    pub fn global_entry(&self, from: EntryId, name: &str) -> Option<EntryId> {
        self.entry(self.structural_root(from), name)
    }

    /// Concatenated names of the entry and its ancestors, root excluded.
    ///
    /// `Sub` containing `Page` gives `SubPage`, which is what a `Sub.Page`
    /// hyperlink collapses to once its separators are dropped.
    pub fn lookup_name(&self, id: EntryId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let Some(entry) = self.get(cur) else { break };
            if entry.is_root() {
                break;
            }
            parts.push(entry.name.as_str());
            current = entry.parent;
        }
        parts.iter().rev().copied().collect()
    }

    /// Slash-joined path from the root, e.g. `$/Sub/Page`.
    pub fn pathname(&self, id: EntryId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let Some(entry) = self.get(cur) else { break };
            parts.push(entry.name.as_str());
            current = entry.parent;
        }
        parts.reverse();
        parts.join("/")
    }

    /// Pre-order traversal starting at the root.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![self.root()],
        }
    }

    /// The file `id` stands for: itself, or the end of its link chain.
    ///
    /// Directories, dangling links and overlong chains give `None`; the
    /// problem is logged.
    pub fn target(&self, id: EntryId) -> Option<EntryId> {
        let mut current = id;
        for _ in 0..=MAX_LINK_HOPS {
            let entry = self.get(current)?;
            match &entry.data {
                EntryData::File { .. } => return Some(current),
                EntryData::Link { target } => match self.global_entry(current, target) {
                    Some(next) if next != current => current = next,
                    _ => {
                        warn!("Link {} points to missing entry {}", self.pathname(current), target);
                        return None;
                    },
                },
                EntryData::Directory { .. } => {
                    if current != id {
                        warn!("Link {} points to directory {}", self.pathname(id), entry.name);
                    }
                    return None;
                },
            }
        }
        warn!("Link chain starting at {} is too long", self.pathname(id));
        None
    }

    /// Payload of a file or the file a link points to.
    ///
    /// Anything [`target`](Self::target) rejects, and payloads running past
    /// the buffer, yield an empty buffer.
    pub fn file_data(&self, id: EntryId, view: &ByteView) -> Bytes {
        let Some(file) = self.target(id).and_then(|file| self.get(file)) else {
            return Bytes::new();
        };
        let (Some(start), Some(length)) = (file.data_offset(), file.length()) else {
            return Bytes::new();
        };
        view.slice(start, length).unwrap_or_else(|err| {
            warn!("Payload of {} unreadable: {}", file.name, err);
            Bytes::new()
        })
    }

    /// Indented listing of the tree, one entry per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, self.root(), 0);
        out
    }

    fn dump_into(&self, out: &mut String, id: EntryId, indent: usize) {
        let Some(entry) = self.get(id) else { return };
        let label = match entry.kind() {
            EntryKind::Directory => "Dir",
            EntryKind::File => "File",
            EntryKind::Link => "Link",
        };
        let _ = write!(out, "{:indent$}{} {} [{}]", "", label, self.pathname(id), entry.load_exec);
        match &entry.data {
            EntryData::File { length } => {
                let _ = write!(out, " {} bytes", length);
            },
            EntryData::Link { target } => {
                let _ = write!(out, " -> {}", target);
            },
            EntryData::Directory { .. } => {},
        }
        out.push('\n');
        for &child in entry.children() {
            self.dump_into(out, child, indent + 2);
        }
    }
}

impl Index<EntryId> for ImageTree {
    type Output = Entry;

    fn index(&self, id: EntryId) -> &Entry {
        &self.entries[id.0]
    }
}

/// Pre-order iterator over a tree, see [`ImageTree::walk`].
pub struct Walk<'a> {
    tree: &'a ImageTree,
    stack: Vec<EntryId>,
}

impl Iterator for Walk<'_> {
    type Item = EntryId;

    fn next(&mut self) -> Option<EntryId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// $ { A, B, Sub { C, Alias>C }, Other { Deep { C } } }
    fn sample() -> ImageTree {
        let mut tree = ImageTree::new(0, LoadExec::default());
        let root = tree.root();
        tree.add_file(root, "A".into(), 0, 4, LoadExec::default());
        tree.add_file(root, "B".into(), 0, 0, LoadExec::default());
        let sub = tree.add_directory(root, "Sub".into(), 0, LoadExec::default());
        tree.add_file(sub, "C".into(), 8, 2, LoadExec::default());
        tree.add_link(sub, "Alias".into(), "C".into(), LoadExec::default());
        let other = tree.add_directory(root, "Other".into(), 0, LoadExec::default());
        let deep = tree.add_directory(other, "Deep".into(), 0, LoadExec::default());
        tree.add_file(deep, "C".into(), 12, 1, LoadExec::default());
        tree
    }

    #[test]
    fn test_parent_links() {
        let tree = sample();
        for id in tree.walk().skip(1) {
            let parent = tree.parent(id).unwrap();
            assert!(tree.children(parent).contains(&id));
        }
        assert_eq!(tree.walk().count(), tree.len());
        assert!(tree[tree.root()].is_root());
    }

    #[test]
    fn test_entry_lookup() {
        let tree = sample();
        let root = tree.root();
        let sub = tree.entry(root, "sUb").unwrap();
        assert!(tree[sub].is_directory());

        // Recursive search is pre-order: Sub/C is found before Other/Deep/C.
        let c = tree.entry(root, "c").unwrap();
        assert_eq!(tree.pathname(c), "$/Sub/C");

        // Lookup names concatenate ancestors.
        let deep_c = tree.entry(root, "otherdeepc").unwrap();
        assert_eq!(tree.pathname(deep_c), "$/Other/Deep/C");
        assert_eq!(tree.lookup_name(deep_c), "OtherDeepC");
        assert_eq!(tree.lookup_name(root), "");

        assert_eq!(tree.entry(root, "missing"), None);
    }

    #[test]
    fn test_global_entry_from_nested() {
        let tree = sample();
        let deep = tree.entry(tree.root(), "Deep").unwrap();
        assert_eq!(tree.entry(deep, "A"), None);
        let a = tree.global_entry(deep, "A").unwrap();
        assert_eq!(tree.pathname(a), "$/A");
        assert_eq!(tree.structural_root(deep), tree.root());
    }

    #[test]
    fn test_link_data_resolves_globally() {
        let tree = sample();
        let mut buffer = vec![0u8; 20];
        buffer[16] = b'h';
        buffer[17] = b'i';
        let view = ByteView::new(buffer);
        let alias = tree.entry(tree.root(), "Alias").unwrap();
        assert_eq!(tree[alias].link_target(), Some("C"));
        assert_eq!(&tree.file_data(alias, &view)[..], b"hi");
        assert!(tree.file_data(tree.root(), &view).is_empty());
    }

    #[test]
    fn test_dangling_and_self_links_are_empty() {
        let mut tree = sample();
        let root = tree.root();
        let dangling = tree.add_link(root, "Gone".into(), "Nowhere".into(), LoadExec::default());
        let selfish = tree.add_link(root, "Loop".into(), "Loop".into(), LoadExec::default());
        let view = ByteView::new(vec![0u8; 32]);
        assert!(tree.file_data(dangling, &view).is_empty());
        assert!(tree.file_data(selfish, &view).is_empty());
    }

    #[test]
    fn test_out_of_range_payload_is_empty() {
        let tree = sample();
        let view = ByteView::new(vec![0u8; 4]);
        let a = tree.entry(tree.root(), "A").unwrap();
        assert!(tree.file_data(a, &view).is_empty());
    }

    #[test]
    fn test_dump_lists_every_entry() {
        let tree = sample();
        let dump = tree.dump();
        assert_eq!(dump.lines().count(), tree.len());
        assert!(dump.starts_with("Dir $ ["));
        assert!(dump.contains("    File $/Sub/C ["));
        assert!(dump.contains("Link $/Sub/Alias [") && dump.contains("-> C"));
    }
}
