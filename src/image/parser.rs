//! Directory walker that turns an image buffer into an [`ImageTree`].
//!
//! Directory block layout (`DIR$`):
//!
//! | Offset | Field |
//! |---|---|
//! | +0 | marker `DIR$` |
//! | +4 | allocated block size |
//! | +8 | used bytes |
//! | +12 | first record |
//!
//! Each record is a 24-byte fixed part followed by a NUL-terminated name, padded
//! to a word boundary. A record with object size 0 is a link named `own>target`.

use std::collections::HashSet;

use bytes::Bytes;
use log::{debug, error, warn};
use zerocopy::{FromBytes, LE, U32};
use zerocopy_derive::FromBytes as DeriveFromBytes;

use super::container::unwrap_container;
use super::entry::{EntryId, split_link_name};
use super::file::{HelpImage, ImageHeader};
use super::load_exec::LoadExec;
use super::tree::ImageTree;
use crate::common::binary::{ByteView, align};
use crate::common::encoding::decode_text;
use crate::common::{Error, Result};

const DIR_MARKER: [u8; 4] = *b"DIR$";
const DATA_MARKER: [u8; 4] = *b"DATA";
const FREE_MARKER: [u8; 4] = *b"FREE";

/// Fixed part of a directory record, followed by the entry name.
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawDirRecord {
    /// Absolute offset of the object block
    object_offset: U32<LE>,
    load: U32<LE>,
    exec: U32<LE>,
    /// Size of the object block, 0 for links
    object_size: U32<LE>,
    /// Access attributes
    access: U32<LE>,
    _reserved: U32<LE>,
}

impl RawDirRecord {
    const SIZE: usize = 24;
}

/// Options for [`ImageParser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageParserConfig {
    /// Directories nested deeper than this are treated as corrupt and not read.
    pub max_depth: usize,
    /// Log an indented dump of the tree at debug level after parsing.
    pub log_tree: bool,
}

impl Default for ImageParserConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            log_tree: true,
        }
    }
}

impl ImageParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[inline]
    pub fn with_log_tree(mut self, log_tree: bool) -> Self {
        self.log_tree = log_tree;
        self
    }
}

/// Outcome of reading one record; the stride is known in every case.
enum Record {
    Added(EntryId),
    Skipped,
}

/// Parser for StrongHelp image buffers.
#[derive(Debug, Clone, Default)]
pub struct ImageParser {
    config: ImageParserConfig,
}

impl ImageParser {
    pub fn new(config: ImageParserConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &ImageParserConfig {
        &self.config
    }

    /// Parse an image buffer, unwrapping a ZIP container first if needed.
    ///
    /// Only a missing signature or an unreadable root header fails the parse.
    /// Damage below the root yields a partial tree and is logged.
    pub fn parse(&self, data: impl Into<Bytes>) -> Result<HelpImage> {
        let data = unwrap_container(data.into())?;
        let view = ByteView::new(data);
        let header = ImageHeader::read(&view)?;
        debug!("Size of root block: {}", header.root_block_size);
        debug!("Version: {}", header.version);
        debug!("Offset to first free block: {}", header.first_free_block);
        debug!("Offset to root dir: {}", header.root_directory_offset);

        let mut walker = DirectoryWalker {
            view: &view,
            config: &self.config,
            tree: ImageTree::new(header.root_directory_offset, header.load_exec),
            visited: HashSet::new(),
        };
        walker.visited.insert(header.root_directory_offset);
        let root = walker.tree.root();
        walker.read_directory(root, 0);
        let tree = walker.tree;

        if self.config.log_tree && log::log_enabled!(log::Level::Debug) {
            debug!("Image structure:\n{}", tree.dump());
        }
        Ok(HelpImage { header, tree, view })
    }
}

/// State of one parse: the tree under construction and the directory blocks
/// already claimed by an entry.
struct DirectoryWalker<'a> {
    view: &'a ByteView,
    config: &'a ImageParserConfig,
    tree: ImageTree,
    visited: HashSet<usize>,
}

impl DirectoryWalker<'_> {
    /// Read the directory block of `dir` and append its entries.
    ///
    /// Errors are contained here: whatever was read before the failure stays in
    /// the tree.
    fn read_directory(&mut self, dir: EntryId, depth: usize) {
        if let Err(err) = self.try_read_directory(dir, depth) {
            error!(
                "Directory {} is corrupt, keeping {} entries read so far: {}",
                self.tree.pathname(dir),
                self.tree.children(dir).len(),
                err
            );
        }
    }

    fn try_read_directory(&mut self, dir: EntryId, depth: usize) -> Result<()> {
        if depth > self.config.max_depth {
            return Err(Error::CorruptedFile(format!(
                "directory nesting exceeds {} levels",
                self.config.max_depth
            )));
        }
        let offset = self.tree[dir]
            .offset()
            .ok_or_else(|| Error::CorruptedFile("directory without offset".to_string()))?;
        if self.view.marker(offset)? != DIR_MARKER {
            return Err(Error::CorruptedFile(format!(
                "not a StrongHelp directory at offset {}",
                offset
            )));
        }
        debug!("Parsing dir >{}< from offset {}", self.tree[dir].name(), offset);
        debug!("Size of Dir: {}", self.view.word(offset + 4)?);
        let size_used = self.view.word(offset + 8)?;
        debug!("Size of Dir used: {}", size_used);

        // Records start after the 12-byte header; the last 20 used bytes never
        // hold a complete record.
        let end = offset as i64 + size_used as i64 - 20;
        let mut cursor = offset + 12;
        while (cursor as i64) < end {
            let (record, stride) = self.read_record(dir, cursor, depth)?;
            if let Record::Added(id) = record {
                debug!("Entry found: {} @ {}", self.tree.pathname(id), cursor);
            }
            cursor += stride;
        }
        Ok(())
    }

    /// Read one record at `cursor`, returning the stride to the next one.
    ///
    /// A record whose fixed part or name cannot be read is fatal for the
    /// directory, since the stride is unknown. A record whose object block is
    /// unreadable, unknown or already claimed is skipped.
    fn read_record(&mut self, dir: EntryId, cursor: usize, depth: usize) -> Result<(Record, usize)> {
        let view = self.view;
        let raw = RawDirRecord::read_from_bytes(view.bytes_at(cursor, RawDirRecord::SIZE)?)
            .map_err(|_| Error::CorruptedFile(format!("truncated record at {}", cursor)))?;
        let raw_name = view.bytes_until_nul(cursor + RawDirRecord::SIZE)?;
        let stride = align(RawDirRecord::SIZE + raw_name.len() + 1);
        let name = decode_text(raw_name);
        let load_exec = LoadExec::new(raw.load.get(), raw.exec.get());
        let object_offset = raw.object_offset.get() as usize;
        let object_size = raw.object_size.get() as i32;
        debug!(
            "Record >{}< at {}: object {} size {} access {:#x}",
            name,
            cursor,
            object_offset,
            object_size,
            raw.access.get()
        );

        if object_size <= 0 {
            let (own, target, well_formed) = split_link_name(&name);
            if !well_formed {
                warn!("Link record without target separator: {}", name);
            }
            let id = self
                .tree
                .add_link(dir, own.to_string(), target.to_string(), load_exec);
            return Ok((Record::Added(id), stride));
        }

        let marker = match view.marker(object_offset) {
            Ok(marker) => marker,
            Err(err) => {
                warn!("Skipping entry {}: object block unreadable: {}", name, err);
                return Ok((Record::Skipped, stride));
            },
        };
        let record = match marker {
            DIR_MARKER if !self.visited.insert(object_offset) => {
                warn!(
                    "Skipping entry {}: directory block at {} already in use",
                    name, object_offset
                );
                Record::Skipped
            },
            DIR_MARKER => {
                let id = self.tree.add_directory(dir, name, object_offset, load_exec);
                self.read_directory(id, depth + 1);
                Record::Added(id)
            },
            DATA_MARKER => match view.word(object_offset + 4) {
                Ok(block_size) if block_size >= 8 => {
                    let length = (block_size - 8) as usize;
                    Record::Added(
                        self.tree
                            .add_file(dir, name, object_offset, length, load_exec),
                    )
                },
                Ok(block_size) => {
                    warn!("Skipping entry {}: invalid DATA block size {}", name, block_size);
                    Record::Skipped
                },
                Err(err) => {
                    warn!("Skipping entry {}: {}", name, err);
                    Record::Skipped
                },
            },
            FREE_MARKER => {
                debug!("FREE block found, ignoring.");
                Record::Skipped
            },
            other => {
                warn!(
                    "Unknown entry encountered: marker={}, name={}",
                    decode_text(&other),
                    name
                );
                Record::Skipped
            },
        };
        Ok((record, stride))
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{Node, build_image};
    use super::*;
    use crate::image::EntryKind;

    fn scenario() -> Vec<u8> {
        build_image(&[
            Node::File("A", b"abcd"),
            Node::File("B", b""),
            Node::Dir("Sub", vec![Node::File("C", b"see")]),
        ])
    }

    #[test]
    fn test_scenario_tree() {
        let image = HelpImage::from_bytes(scenario()).unwrap();
        let tree = image.tree();
        let root = tree.root();
        let names: Vec<&str> = tree.children(root).iter().map(|&id| tree[id].name()).collect();
        assert_eq!(names, ["A", "B", "Sub"]);

        let a = image.entry("A").unwrap();
        assert_eq!(&image.data(a)[..], b"abcd");
        let b = image.entry("b").unwrap();
        assert_eq!(tree[b].length(), Some(0));
        assert!(image.data(b).is_empty());

        let c = image.entry("C").unwrap();
        assert_eq!(tree.pathname(c), "$/Sub/C");
        assert_eq!(&image.data(c)[..], b"see");

        let sub = image.entry("SUB").unwrap();
        assert_eq!(tree[sub].kind(), EntryKind::Directory);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_header_fields() {
        let image = HelpImage::from_bytes(scenario()).unwrap();
        let header = image.header();
        assert_eq!(header.version, 275);
        assert_eq!(header.first_free_block, -1);
        assert_eq!(header.load_exec.filetype(), 0x3D6);
        assert_eq!(image.tree()[image.root()].name(), "$");
    }

    #[test]
    fn test_links_free_and_unknown_records() {
        let data = build_image(&[
            Node::File("Target", b"payload"),
            Node::Free("Gap"),
            Node::Link("Alias>Target"),
            Node::Unknown("Odd"),
            Node::Link("Bare"),
            Node::File("Last", b"z"),
        ]);
        let image = HelpImage::from_bytes(data).unwrap();
        let tree = image.tree();
        let names: Vec<&str> = tree.children(image.root()).iter().map(|&id| tree[id].name()).collect();
        assert_eq!(names, ["Target", "Alias", "Bare", "Last"]);

        let alias = image.entry("alias").unwrap();
        assert!(tree[alias].is_link());
        assert_eq!(tree[alias].offset(), None);
        assert_eq!(&image.data(alias)[..], b"payload");

        let bare = image.entry("Bare").unwrap();
        assert_eq!(tree[bare].link_target(), Some("Bare"));
        assert!(image.data(bare).is_empty());
    }

    #[test]
    fn test_stride_with_varied_name_lengths() {
        let data = build_image(&[
            Node::File("abc", b"1"),
            Node::File("abcd", b"2"),
            Node::File("abcdefg", b"3"),
            Node::File("x", b"4"),
        ]);
        let image = HelpImage::from_bytes(data).unwrap();
        for (name, payload) in [("abc", b"1"), ("abcd", b"2"), ("abcdefg", b"3"), ("x", b"4")] {
            let id = image.entry(name).unwrap();
            assert_eq!(&image.data(id)[..], payload);
        }
    }

    #[test]
    fn test_latin1_name_stride_uses_raw_bytes() {
        let mut data = build_image(&[Node::File("Xbc", b"1"), Node::File("Next", b"2")]);
        // Swap the ASCII 'X' for a Latin-1 byte that decodes to two UTF-8 bytes.
        let at = data.windows(3).position(|w| w == b"Xbc").unwrap();
        data[at] = 0xFC;
        let image = HelpImage::from_bytes(data).unwrap();
        assert!(image.entry("übc").is_some());
        assert!(image.entry("Next").is_some());
    }

    #[test]
    fn test_unknown_directory_marker_skips_record() {
        let mut data = build_image(&[
            Node::Dir("Broken", vec![Node::File("Inner", b"x")]),
            Node::File("After", b"y"),
        ]);
        // The first DIR$ after the header belongs to the nested directory.
        let at = data.windows(4).position(|w| w == b"DIR$").unwrap();
        data[at..at + 4].copy_from_slice(b"DIRX");
        let image = HelpImage::from_bytes(data).unwrap();
        assert_eq!(image.tree().len(), 2);
        assert!(image.entry("Broken").is_none());
        assert!(image.entry("Inner").is_none());
        assert!(image.entry("After").is_some());
    }

    #[test]
    fn test_truncated_image_is_partial_not_fatal() {
        let mut data = scenario();
        let root_offset = u32::from_le_bytes(data[16..20].try_into().unwrap()) as usize;
        // Cut inside the root directory's second record.
        data.truncate(root_offset + 12 + 24 + 4 + 10);
        let image = HelpImage::from_bytes(data).unwrap();
        let tree = image.tree();
        assert_eq!(tree.children(tree.root()).len(), 1);
    }

    #[test]
    fn test_missing_signature_is_fatal() {
        let mut data = scenario();
        data[0] = b'X';
        assert!(matches!(HelpImage::from_bytes(data), Err(Error::InvalidFormat(_))));
        assert!(HelpImage::from_bytes(b"HELP".to_vec()).is_err());
    }

    #[test]
    fn test_directory_cycle_is_skipped() {
        let mut data = build_image(&[Node::Dir("Loop", vec![]), Node::File("Page", b"p")]);
        let root_offset = u32::from_le_bytes(data[16..20].try_into().unwrap());
        // Point the child directory record back at the root block.
        let record = root_offset as usize + 12;
        data[record..record + 4].copy_from_slice(&root_offset.to_le_bytes());
        let image = HelpImage::from_bytes(data).unwrap();
        assert_eq!(image.tree().len(), 2);
        assert!(image.entry("Page").is_some());
    }

    #[test]
    fn test_nesting_beyond_max_depth_is_not_read() {
        let data = build_image(&[Node::Dir(
            "One",
            vec![Node::Dir("Two", vec![Node::File("Leaf", b"!")])],
        )]);
        let parser = ImageParser::new(ImageParserConfig::new().with_max_depth(1).with_log_tree(false));
        let image = parser.parse(data).unwrap();
        assert_eq!(image.tree().len(), 3);
        assert!(image.entry("Two").is_some());
        assert!(image.entry("Leaf").is_none());
        assert!(HelpImage::from_bytes(image.view().as_bytes().to_vec())
            .unwrap()
            .entry("Leaf")
            .is_some());
    }

    #[cfg(feature = "zip")]
    #[test]
    fn test_zipped_image() {
        use std::io::Write;
        use zip::write::{SimpleFileOptions, ZipWriter};

        let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer.start_file("Manual", SimpleFileOptions::default()).unwrap();
        writer.write_all(&scenario()).unwrap();
        let zipped = writer.finish().unwrap().into_inner();
        let image = HelpImage::from_bytes(zipped).unwrap();
        assert!(image.entry("C").is_some());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn prop_every_file_record_becomes_an_entry(
                names in proptest::collection::vec("[A-Za-z!][A-Za-z0-9_]{0,12}", 1..12),
            ) {
                let payloads: Vec<Vec<u8>> = names.iter().map(|n| n.as_bytes().to_vec()).collect();
                let nodes: Vec<Node<'_>> = names
                    .iter()
                    .zip(&payloads)
                    .map(|(n, p)| Node::File(n, p))
                    .collect();
                let image = HelpImage::from_bytes(build_image(&nodes)).unwrap();
                let tree = image.tree();
                prop_assert_eq!(tree.children(tree.root()).len(), names.len());
                for id in tree.walk().skip(1) {
                    let parent = tree.parent(id).unwrap();
                    prop_assert!(tree.children(parent).contains(&id));
                }
            }

            #[test]
            fn prop_garbage_never_panics(data in proptest::collection::vec(any::<u8>(), 0..256)) {
                let mut image = b"HELP".to_vec();
                image.extend(data);
                let _ = HelpImage::from_bytes(image);
            }
        }
    }
}
