//! Directory, file and link entries of a parsed image.

use super::load_exec::LoadExec;

/// Index of an entry inside its [`ImageTree`](super::ImageTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) usize);

impl EntryId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Entry variant, named after the block marker it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    Link,
}

impl EntryKind {
    /// Block marker of this kind as stored in the image.
    pub const fn marker(self) -> &'static str {
        match self {
            EntryKind::Directory => "DIR$",
            EntryKind::File => "DATA",
            EntryKind::Link => "LINK",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EntryData {
    Directory { children: Vec<EntryId> },
    File { length: usize },
    Link { target: String },
}

/// One node of the image tree.
///
/// Entries are created during parsing and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub(crate) name: String,
    pub(crate) offset: Option<usize>,
    pub(crate) load_exec: LoadExec,
    pub(crate) parent: Option<EntryId>,
    pub(crate) data: EntryData,
}

impl Entry {
    /// Name as stored, case preserved. For links this is the link's own name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> EntryKind {
        match self.data {
            EntryData::Directory { .. } => EntryKind::Directory,
            EntryData::File { .. } => EntryKind::File,
            EntryData::Link { .. } => EntryKind::Link,
        }
    }

    /// Absolute offset of the entry's block in the image; `None` for links.
    #[inline]
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    #[inline]
    pub fn load_exec(&self) -> LoadExec {
        self.load_exec
    }

    #[inline]
    pub fn parent(&self) -> Option<EntryId> {
        self.parent
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub fn is_directory(&self) -> bool {
        matches!(self.data, EntryData::Directory { .. })
    }

    #[inline]
    pub fn is_file(&self) -> bool {
        matches!(self.data, EntryData::File { .. })
    }

    #[inline]
    pub fn is_link(&self) -> bool {
        matches!(self.data, EntryData::Link { .. })
    }

    /// Children in on-disk order; empty for files and links.
    pub fn children(&self) -> &[EntryId] {
        match &self.data {
            EntryData::Directory { children } => children,
            _ => &[],
        }
    }

    /// Payload length of a file, excluding its 8-byte block header.
    pub fn length(&self) -> Option<usize> {
        match self.data {
            EntryData::File { length } => Some(length),
            _ => None,
        }
    }

    /// Offset of the first payload byte of a file.
    pub fn data_offset(&self) -> Option<usize> {
        match self.data {
            EntryData::File { .. } => self.offset.map(|o| o + 8),
            _ => None,
        }
    }

    /// Name a link resolves to, looked up globally at read time.
    pub fn link_target(&self) -> Option<&str> {
        match &self.data {
            EntryData::Link { target } => Some(target),
            _ => None,
        }
    }
}

/// Split a raw link record name `own>target` on the first `>`.
///
/// A name without a usable separator maps to itself on both sides.
pub fn split_link_name(raw: &str) -> (&str, &str, bool) {
    match raw.find('>') {
        Some(index) if index > 0 => (&raw[..index], &raw[index + 1..], true),
        _ => (raw, raw, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_link_name() {
        assert_eq!(split_link_name("Alias>Target"), ("Alias", "Target", true));
        assert_eq!(split_link_name("A>B>C"), ("A", "B>C", true));
        assert_eq!(split_link_name("Plain"), ("Plain", "Plain", false));
        assert_eq!(split_link_name(">Odd"), (">Odd", ">Odd", false));
    }

    #[test]
    fn test_file_offsets() {
        let entry = Entry {
            name: "Page".to_string(),
            offset: Some(100),
            load_exec: LoadExec::default(),
            parent: Some(EntryId(0)),
            data: EntryData::File { length: 12 },
        };
        assert_eq!(entry.kind(), EntryKind::File);
        assert_eq!(entry.kind().marker(), "DATA");
        assert_eq!(entry.data_offset(), Some(108));
        assert_eq!(entry.length(), Some(12));
        assert!(entry.children().is_empty());
        assert!(!entry.is_root());
    }
}
